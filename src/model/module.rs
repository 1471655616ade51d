//! Content modules attached to scenes.
//!
//! The editor core only reads a module's id and kind; the payloads are owned
//! by the per-scene content editor and the playback renderer. The AR variants
//! are the one exception, since their payload is handed to the AR previewer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentModule {
    pub id: String,
    #[serde(flatten)]
    pub body: ModuleBody,
}

impl ContentModule {
    pub fn new(body: ModuleBody) -> Self {
        Self {
            id: format!("mod_{}", uuid::Uuid::new_v4().simple()),
            body,
        }
    }

    pub fn kind(&self) -> ModuleKind {
        self.body.kind()
    }
}

/// Module payload keyed by kind, serialized as `{ "type": ..., "data": ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModuleBody {
    Location(LocationData),
    StoryNarration(NarrationData),
    StoryDialogue(DialogueData),
    Text(TextData),
    Image(MediaData),
    Video(MediaData),
    Audio(MediaData),
    ArRecognize(ArPayload),
    ArTransparent(ArPayload),
    AnsText(AnswerData),
    AnsSingle(OptionsData),
    AnsMulti(OptionsData),
    AnsNumber(NumberLockData),
    AnsImage(ImageLockData),
    AnsPhoto(AnswerData),
    AnsVoice(AnswerData),
    AnsAr(ArPayload),
    Hint(HintData),
}

/// Discriminant of [`ModuleBody`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    Location,
    StoryNarration,
    StoryDialogue,
    Text,
    Image,
    Video,
    Audio,
    ArRecognize,
    ArTransparent,
    AnsText,
    AnsSingle,
    AnsMulti,
    AnsNumber,
    AnsImage,
    AnsPhoto,
    AnsVoice,
    AnsAr,
    Hint,
}

impl ModuleKind {
    pub fn is_answer(self) -> bool {
        matches!(
            self,
            ModuleKind::AnsText
                | ModuleKind::AnsSingle
                | ModuleKind::AnsMulti
                | ModuleKind::AnsNumber
                | ModuleKind::AnsImage
                | ModuleKind::AnsPhoto
                | ModuleKind::AnsVoice
                | ModuleKind::AnsAr
        )
    }

    pub fn is_ar(self) -> bool {
        matches!(self, ModuleKind::ArRecognize | ModuleKind::ArTransparent | ModuleKind::AnsAr)
    }
}

impl ModuleBody {
    pub fn kind(&self) -> ModuleKind {
        match self {
            ModuleBody::Location(_) => ModuleKind::Location,
            ModuleBody::StoryNarration(_) => ModuleKind::StoryNarration,
            ModuleBody::StoryDialogue(_) => ModuleKind::StoryDialogue,
            ModuleBody::Text(_) => ModuleKind::Text,
            ModuleBody::Image(_) => ModuleKind::Image,
            ModuleBody::Video(_) => ModuleKind::Video,
            ModuleBody::Audio(_) => ModuleKind::Audio,
            ModuleBody::ArRecognize(_) => ModuleKind::ArRecognize,
            ModuleBody::ArTransparent(_) => ModuleKind::ArTransparent,
            ModuleBody::AnsText(_) => ModuleKind::AnsText,
            ModuleBody::AnsSingle(_) => ModuleKind::AnsSingle,
            ModuleBody::AnsMulti(_) => ModuleKind::AnsMulti,
            ModuleBody::AnsNumber(_) => ModuleKind::AnsNumber,
            ModuleBody::AnsImage(_) => ModuleKind::AnsImage,
            ModuleBody::AnsPhoto(_) => ModuleKind::AnsPhoto,
            ModuleBody::AnsVoice(_) => ModuleKind::AnsVoice,
            ModuleBody::AnsAr(_) => ModuleKind::AnsAr,
            ModuleBody::Hint(_) => ModuleKind::Hint,
        }
    }

    /// The opaque payload handed to the AR previewer, if this is an AR module
    pub fn ar_payload(&self) -> Option<&ArPayload> {
        match self {
            ModuleBody::ArRecognize(payload)
            | ModuleBody::ArTransparent(payload)
            | ModuleBody::AnsAr(payload) => Some(payload),
            _ => None,
        }
    }
}

/// Keys a payload struct does not name, kept so a load then save leaves them intact
pub type ExtraFields = serde_json::Map<String, serde_json::Value>;

/// A numeric field the content editor may have stored as text (`4` or `"4"`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberField {
    Number(serde_json::Number),
    Text(String),
}

impl NumberField {
    pub fn get(&self) -> Option<u32> {
        match self {
            NumberField::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            NumberField::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl From<u32> for NumberField {
    fn from(value: u32) -> Self {
        NumberField::Number(value.into())
    }
}

/// Text and image shown after a right or wrong answer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Feedback {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_feedback_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_feedback_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incorrect_feedback_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incorrect_feedback_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationData {
    /// Place name or `"lat, lng"` as picked on the map
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl LocationData {
    /// Parses `location` as a `"lat, lng"` pair
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let (lat, lng) = self.location.as_deref()?.split_once(',')?;
        Some((lat.trim().parse().ok()?, lng.trim().parse().ok()?))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueLine {
    /// Character name, or one of the narrator / player pseudo characters
    #[serde(rename = "char", skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueData {
    pub lines: Vec<DialogueLine>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Target image plus the content that appears over it.
///
/// `ANS_AR` modules also carry the success image, the hint shown while
/// searching, and answer feedback.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint_content: Option<String>,
    #[serde(flatten)]
    pub feedback: Feedback,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(flatten)]
    pub feedback: Feedback,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnswerOption {
    /// Options added after creation have no id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
    pub is_correct: bool,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsData {
    pub options: Vec<AnswerOption>,
    #[serde(flatten)]
    pub feedback: Feedback,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberLockData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<NumberField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(flatten)]
    pub feedback: Feedback,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageLockData {
    /// Nine tiles of a 3x3 grid; tiles never uploaded stay `null`
    pub images: Vec<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(flatten)]
    pub feedback: Feedback,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HintEntry {
    pub text: String,
    /// Seconds before the hint unlocks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<NumberField>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HintData {
    pub hints: Vec<HintEntry>,
    #[serde(flatten)]
    pub extra: ExtraFields,
}
