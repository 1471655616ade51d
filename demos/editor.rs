//! Standalone story graph editor.
//!
//! Opens a small sample game, bills AI generation against a local user with
//! a canned generator, and saves to an in-memory repository with Ctrl+S.

use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;
use bevy_storygraph_editor::generation::GenerationFuture;
use bevy_storygraph_editor::hotkeys::TextInputFocus;
use bevy_storygraph_editor::persistence::{Author, GameRecord, GameRepository, InMemoryRepository, IntroForm, SceneRecord};
use bevy_storygraph_editor::{
    ActiveUser, Choice, EditorConfig, EditorSession, GeneratedStory, GeneratorBackend, GraphGenerator, LocalUser,
    StoryGraphEditorPlugin,
};

/// Pretends to call a model: waits a moment, then returns a fixed three-scene story
struct CannedGenerator;

impl GraphGenerator for CannedGenerator {
    fn generate(&self, prompt: &str) -> GenerationFuture {
        let prompt = prompt.to_string();
        Box::pin(async move {
            std::thread::sleep(Duration::from_millis(800));
            let scene = |id: &str, title: String, next: Option<&str>| SceneRecord {
                id: id.to_string(),
                title,
                text: prompt.clone(),
                choices: next.map(|n| vec![Choice::new("繼續", n.into())]).unwrap_or_default(),
                is_ending: next.is_none(),
                ..SceneRecord::default()
            };
            Ok::<_, String>(GeneratedStory {
                title: prompt.clone(),
                scenes: vec![
                    scene("start", "序章".to_string(), Some("middle")),
                    scene("middle", "轉折".to_string(), Some("end")),
                    scene("end", "終章".to_string(), None),
                ],
                groups: Vec::new(),
            })
        })
    }
}

#[derive(Resource, Default)]
struct Library {
    repository: InMemoryRepository,
    current: Option<String>,
}

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(StoryGraphEditorPlugin {
            config: EditorConfig::default(),
        })
        .insert_resource(ActiveUser(Box::new(LocalUser::new("demo", "Demo Writer", 200))))
        .insert_resource(GeneratorBackend(Arc::new(CannedGenerator)))
        .init_resource::<Library>()
        .add_systems(Startup, setup)
        .add_systems(Update, save_on_ctrl_s)
        .run();
}

fn setup(mut commands: Commands, mut session: ResMut<EditorSession>) {
    commands.spawn(Camera2d);

    let sample = GameRecord {
        title: "Lighthouse".to_string(),
        scenes: vec![
            SceneRecord {
                id: "start".to_string(),
                title: "岸邊".to_string(),
                choices: vec![Choice::new("前往 燈塔", "tower".into())],
                x: Some(100.0),
                y: Some(100.0),
                ..SceneRecord::default()
            },
            SceneRecord {
                id: "tower".to_string(),
                title: "燈塔".to_string(),
                is_ending: true,
                x: Some(400.0),
                y: Some(120.0),
                ..SceneRecord::default()
            },
        ],
        ..GameRecord::default()
    };
    *session = EditorSession::open(&sample, session.config().clone());
}

fn save_on_ctrl_s(
    input: Res<ButtonInput<KeyCode>>,
    focus: Res<TextInputFocus>,
    mut session: ResMut<EditorSession>,
    mut library: ResMut<Library>,
) {
    if focus.0 || !(input.pressed(KeyCode::ControlLeft) && input.just_pressed(KeyCode::KeyS)) {
        return;
    }
    let form = IntroForm {
        title: "Lighthouse".to_string(),
        ..IntroForm::default()
    };
    let author = Author {
        id: Some("demo".to_string()),
        name: "Demo Writer".to_string(),
    };
    let Library { repository, current } = &mut *library;
    match session.save(repository, &form, current.as_deref(), &author) {
        Ok(id) => {
            info!("💾 Saved {id} ({} stored games)", repository.ids().len());
            *current = Some(id);
        }
        Err(error) => warn!("save failed: {error}"),
    }
}
