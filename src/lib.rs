//! Bevy Story Graph Editor
//!
//! A node-graph editor for branching, location-based interactive fiction:
//! scenes connected by choices, optional ALL/ANY group gating, undo/redo,
//! multi-select, clipboard and AI generation of whole graphs.
//!
//! The editing core lives in [`EditorSession`], a bevy resource that is also
//! usable on its own. [`EditorCorePlugin`] wires it into an `App` headlessly;
//! [`StoryGraphEditorPlugin`] adds the egui canvas on top.

use bevy::prelude::*;
use bevy_egui::{EguiPlugin, EguiPrimaryContextPass};

// Module declarations
pub mod clipboard;
pub mod config;
pub mod error;
pub mod generation;
pub mod geometry;
pub mod history;
pub mod hotkeys;
pub mod interaction;
pub mod model;
pub mod persistence;
pub mod render;
pub mod session;
pub mod shortcuts;
pub mod ui;

// Re-exports
pub use config::EditorConfig;
pub use error::{EditorError, GenerationError, GraphError, RepositoryError};
pub use generation::{
    ActiveUser, GeneratedStory, GenerationRequested, GeneratorBackend, GraphGenerator, LocalUser, PendingGeneration,
    UserState,
};
pub use interaction::Tool;
pub use model::{Choice, CompletionMode, Group, NodeId, Scene, StoryGraph};
pub use session::{EditorSession, Focus, Selection};
pub use shortcuts::EditorCommand;

/// Observer event: run one editor command against the session
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorCommandIssued {
    pub command: EditorCommand,
}

/// Headless editor: session, commands, hotkeys and generation polling
#[derive(Default)]
pub struct EditorCorePlugin {
    pub config: EditorConfig,
}

impl Plugin for EditorCorePlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<EditorConfig>();

        // Initialize resources
        app.insert_resource(self.config.clone())
            .insert_resource(EditorSession::new(self.config.clone()))
            .init_resource::<hotkeys::TextInputFocus>()
            .init_resource::<PendingGeneration>();

        // Add systems
        app.add_systems(
            Update,
            (
                hotkeys::handle_editor_hotkeys.run_if(resource_exists::<ButtonInput<KeyCode>>),
                apply_config_changes,
                generation::poll_generation,
            ),
        );

        // Add observers
        app.add_observer(apply_editor_command)
            .add_observer(generation::start_generation);
    }
}

/// Full editor: the core plus the egui canvas
#[derive(Default)]
pub struct StoryGraphEditorPlugin {
    pub config: EditorConfig,
}

impl Plugin for StoryGraphEditorPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<EguiPlugin>() {
            app.add_plugins(EguiPlugin::default());
        }
        app.add_plugins(EditorCorePlugin {
            config: self.config.clone(),
        });
        app.add_systems(EguiPrimaryContextPass, ui::editor_ui_system);
    }
}

fn apply_editor_command(event: On<EditorCommandIssued>, mut session: ResMut<EditorSession>) {
    if let Err(error) = session.apply(event.command) {
        debug!("command {:?} refused: {error}", event.command);
    }
}

/// Push edits of the config resource into the live session
fn apply_config_changes(config: Res<EditorConfig>, mut session: ResMut<EditorSession>) {
    if config.is_changed() && !config.is_added() {
        session.set_config(config.clone());
    }
}
