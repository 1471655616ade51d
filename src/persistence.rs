//! Game records: loading a graph into a session and saving it back
//!
//! The record mirrors what the game repository stores. Scene coordinates
//! are optional there; scenes without them get a cascade layout on load.

use bevy::log::{info, warn};
use egui::Pos2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::EditorConfig;
use crate::error::{EditorError, RepositoryError};
use crate::geometry;
use crate::model::{Choice, CompletionMode, ContentModule, Group, NodeId, Scene, StoryGraph, START_SCENE_ID};
use crate::session::EditorSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Draft,
    Review,
    Published,
    Rejected,
    OffShelf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    #[default]
    Adventure,
    Guide,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Character {
    pub id: String,
    pub name: String,
    pub description: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    #[default]
    Image,
    Video,
    Audio,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameAsset {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
}

/// Scene as stored; `x`/`y` may be absent on generated content
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SceneRecord {
    pub id: String,
    pub title: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_keyword: Option<String>,
    pub choices: Vec<Choice>,
    pub is_ending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    pub modules: Vec<ContentModule>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupRecord {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub mode: CompletionMode,
    pub scene_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub choices: Vec<Choice>,
}

/// Persisted game: graph plus the metadata owned by the intro form
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    pub cover_image_keyword: String,
    pub start_scene_id: String,
    pub scenes: Vec<SceneRecord>,
    pub groups: Vec<GroupRecord>,
    #[serde(rename = "type")]
    pub game_type: GameType,
    pub status: GameStatus,
    pub tags: Vec<String>,
    pub language: String,
    pub difficulty: u8,
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub characters: Vec<Character>,
    pub assets: Vec<GameAsset>,
}

/// Metadata edited next to the canvas and merged into the record on save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IntroForm {
    pub title: String,
    pub description: String,
    pub cover: String,
    pub tags: Vec<String>,
    pub language: String,
    pub difficulty: u8,
    pub location: String,
    /// Free text as typed; unparsable input saves as 0
    pub latitude: String,
    pub longitude: String,
    pub game_type: GameType,
}

impl Default for IntroForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            cover: String::new(),
            tags: Vec::new(),
            language: "zh-TW".to_string(),
            difficulty: 3,
            location: String::new(),
            latitude: String::new(),
            longitude: String::new(),
            game_type: GameType::Adventure,
        }
    }
}

impl IntroForm {
    pub fn from_record(record: &GameRecord) -> Self {
        let coordinate = |value: f64| if value == 0.0 { String::new() } else { value.to_string() };
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            cover: record.cover_image_keyword.clone(),
            tags: record.tags.clone(),
            language: if record.language.is_empty() {
                "zh-TW".to_string()
            } else {
                record.language.clone()
            },
            difficulty: if record.difficulty == 0 { 3 } else { record.difficulty },
            location: record.location.clone(),
            latitude: coordinate(record.latitude),
            longitude: coordinate(record.longitude),
            game_type: record.game_type,
        }
    }
}

/// Who is saving; stamped onto the record
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Author {
    pub id: Option<String>,
    pub name: String,
}

impl From<&SceneRecord> for Scene {
    fn from(record: &SceneRecord) -> Self {
        Self {
            id: NodeId::new(record.id.clone()),
            title: record.title.clone(),
            text: record.text.clone(),
            image_keyword: record.image_keyword.clone(),
            is_ending: record.is_ending,
            modules: record.modules.clone(),
            choices: record.choices.clone(),
            position: Pos2::new(record.x.unwrap_or_default(), record.y.unwrap_or_default()),
        }
    }
}

impl From<&Scene> for SceneRecord {
    fn from(scene: &Scene) -> Self {
        Self {
            id: scene.id.to_string(),
            title: scene.title.clone(),
            text: scene.text.clone(),
            image_keyword: scene.image_keyword.clone(),
            choices: scene.choices.clone(),
            is_ending: scene.is_ending,
            x: Some(scene.position.x),
            y: Some(scene.position.y),
            modules: scene.modules.clone(),
        }
    }
}

impl From<&GroupRecord> for Group {
    fn from(record: &GroupRecord) -> Self {
        Self {
            id: NodeId::new(record.id.clone()),
            title: record.title.clone(),
            mode: record.mode,
            scene_ids: record.scene_ids.iter().cloned().map(NodeId::from).collect(),
            color: record.color.clone(),
            choices: record.choices.clone(),
        }
    }
}

impl From<&Group> for GroupRecord {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id.to_string(),
            title: group.title.clone(),
            mode: group.mode,
            scene_ids: group.scene_ids.iter().map(NodeId::to_string).collect(),
            color: group.color.clone(),
            choices: group.choices.clone(),
        }
    }
}

/// Build a graph from stored scenes and groups, as-is.
///
/// Scenes missing either coordinate are laid out on the cascade by their
/// index. No repair is applied; see [`load_graph`].
pub fn graph_from_records(scenes: &[SceneRecord], groups: &[GroupRecord]) -> StoryGraph {
    StoryGraph::new(
        scenes.iter().enumerate().map(|(index, record)| {
            let mut scene = Scene::from(record);
            if record.x.is_none() || record.y.is_none() {
                scene.position = geometry::cascade_position(index);
            }
            scene
        }),
        groups.iter().map(Group::from),
    )
}

/// Graph to edit for a stored record.
///
/// An empty record yields the opening scene. Broken references are repaired
/// rather than rejected.
pub fn load_graph(record: &GameRecord) -> StoryGraph {
    if record.scenes.is_empty() {
        return StoryGraph::opening();
    }
    let mut graph = graph_from_records(&record.scenes, &record.groups);
    let repairs = graph.sanitize();
    if repairs > 0 {
        warn!("repaired {repairs} broken references while loading {}", record.id);
    }
    graph
}

impl EditorSession {
    /// Open a stored game for editing; history starts with one entry
    pub fn open(record: &GameRecord, config: EditorConfig) -> Self {
        let mut session = EditorSession::with_graph(load_graph(record), config);
        session.characters = record.characters.clone();
        session.assets = record.assets.clone();
        info!(
            "opened game {:?} with {} scenes",
            record.title,
            session.graph().scenes.len()
        );
        session
    }

    /// Serialize the session into a draft record.
    ///
    /// `existing_id` keeps the record's identity; a new UUID is assigned
    /// otherwise. A blank title is rejected.
    pub fn to_record(
        &mut self,
        form: &IntroForm,
        existing_id: Option<&str>,
        author: &Author,
    ) -> Result<GameRecord, EditorError> {
        if form.title.trim().is_empty() {
            return Err(self.reject(EditorError::MissingTitle));
        }
        let graph = self.graph();
        let id = existing_id
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let record = GameRecord {
            id,
            title: form.title.clone(),
            description: form.description.clone(),
            author: if author.name.is_empty() {
                "Unknown".to_string()
            } else {
                author.name.clone()
            },
            author_id: author.id.clone(),
            cover_image_keyword: form.cover.clone(),
            start_scene_id: START_SCENE_ID.to_string(),
            scenes: graph.scenes.values().map(SceneRecord::from).collect(),
            groups: graph.groups.values().map(GroupRecord::from).collect(),
            game_type: form.game_type,
            status: GameStatus::Draft,
            tags: form.tags.clone(),
            language: form.language.clone(),
            difficulty: form.difficulty,
            location: form.location.clone(),
            latitude: form.latitude.trim().parse().unwrap_or(0.0),
            longitude: form.longitude.trim().parse().unwrap_or(0.0),
            characters: self.characters.clone(),
            assets: self.assets.clone(),
        };
        info!("saved game {} ({} scenes)", record.id, record.scenes.len());
        Ok(record)
    }

    /// Save through a repository and clear the dirty flag
    pub fn save(
        &mut self,
        repository: &mut dyn GameRepository,
        form: &IntroForm,
        existing_id: Option<&str>,
        author: &Author,
    ) -> Result<String, SaveError> {
        let record = self.to_record(form, existing_id, author)?;
        let id = record.id.clone();
        repository.save(record)?;
        self.mark_clean();
        Ok(id)
    }
}

/// Either half of a save can fail
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Key-value store of game records
pub trait GameRepository: Send + Sync {
    fn load(&self, id: &str) -> Result<GameRecord, RepositoryError>;
    fn save(&mut self, record: GameRecord) -> Result<(), RepositoryError>;
    fn delete(&mut self, id: &str) -> Result<(), RepositoryError>;
    fn ids(&self) -> Vec<String>;
}

/// Repository keeping JSON documents in memory
#[derive(Debug, Default, Clone)]
pub struct InMemoryRepository {
    documents: HashMap<String, String>,
}

impl GameRepository for InMemoryRepository {
    fn load(&self, id: &str) -> Result<GameRecord, RepositoryError> {
        let document = self
            .documents
            .get(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        Ok(serde_json::from_str(document)?)
    }

    fn save(&mut self, record: GameRecord) -> Result<(), RepositoryError> {
        let document = serde_json::to_string(&record)?;
        self.documents.insert(record.id, document);
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<(), RepositoryError> {
        self.documents
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.documents.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_record_loads_the_opening_scene() {
        let session = EditorSession::open(&GameRecord::default(), EditorConfig::default());
        let start = session.graph().scene(&START_SCENE_ID.into()).expect("start scene");
        assert_eq!(start.title, "起始場景");
        assert_eq!(start.position, Pos2::new(100.0, 100.0));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn scenes_without_coordinates_get_cascade_layout() {
        let json = r#"{
            "title": "Generated",
            "scenes": [
                {"id": "s1", "title": "One", "text": "", "choices": [{"text": "go", "nextSceneId": "s2"}]},
                {"id": "s2", "title": "Two", "text": "", "choices": [], "x": 5, "y": 6},
                {"id": "s3", "title": "Three", "text": "", "choices": [], "x": 7}
            ],
            "groups": [{"id": "g", "title": "G", "type": "ANY", "sceneIds": ["s1", "ghost"]}]
        }"#;
        let record: GameRecord = serde_json::from_str(json).expect("record");
        let graph = load_graph(&record);
        let positions: Vec<Pos2> = graph.scenes.values().map(|s| s.position).collect();
        assert_eq!(
            positions,
            vec![Pos2::new(100.0, 100.0), Pos2::new(5.0, 6.0), Pos2::new(400.0, 200.0)]
        );
        let group = graph.group(&"g".into()).expect("group survives");
        assert_eq!(group.mode, CompletionMode::Any);
        assert_eq!(group.scene_ids, vec![NodeId::from("s1")]);
    }

    #[test]
    fn save_requires_a_title_and_assigns_an_id() {
        let mut session = EditorSession::default();
        let mut repository = InMemoryRepository::default();
        let author = Author {
            id: Some("u1".into()),
            name: "Writer".into(),
        };

        let err = session.save(&mut repository, &IntroForm::default(), None, &author);
        assert!(matches!(err, Err(SaveError::Editor(EditorError::MissingTitle))));

        session.add_scene_at(Pos2::new(400.0, 100.0));
        assert!(session.is_dirty());
        let form = IntroForm {
            title: "霧港".into(),
            latitude: "25.03".into(),
            ..IntroForm::default()
        };
        let id = session.save(&mut repository, &form, None, &author).expect("saved");
        assert!(!session.is_dirty());
        assert!(uuid::Uuid::parse_str(&id).is_ok());

        let stored = repository.load(&id).expect("stored");
        assert_eq!(stored.status, GameStatus::Draft);
        assert_eq!(stored.scenes.len(), 2);
        assert_eq!(stored.latitude, 25.03);
        assert_eq!(stored.longitude, 0.0);
        assert_eq!(load_graph(&stored), session.graph().clone());
    }

    #[test]
    fn existing_id_is_kept() {
        let mut session = EditorSession::default();
        let form = IntroForm {
            title: "T".into(),
            ..IntroForm::default()
        };
        let record = session
            .to_record(&form, Some("game-1"), &Author::default())
            .expect("record");
        assert_eq!(record.id, "game-1");
        assert_eq!(record.author, "Unknown");
        assert_eq!(IntroForm::from_record(&record), form);
    }

    #[test]
    fn missing_documents_are_reported() {
        let mut repository = InMemoryRepository::default();
        assert!(matches!(repository.load("nope"), Err(RepositoryError::NotFound(_))));
        assert!(matches!(repository.delete("nope"), Err(RepositoryError::NotFound(_))));
    }
}
