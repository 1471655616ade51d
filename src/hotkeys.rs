//! Keyboard shortcuts for the bevy host
//!
//! This module handles:
//! - Reading bevy key input and folding it into a [`KeyChord`]
//! - Suppressing shortcuts while an egui text field owns the keyboard
//! - Triggering [`EditorCommandIssued`] for each matched chord

use bevy::prelude::*;

use crate::shortcuts::{command_for, KeyChord, ShortcutKey};
use crate::EditorCommandIssued;

/// Set by the UI each frame: true while a text field has keyboard focus
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TextInputFocus(pub bool);

const BINDINGS: [(KeyCode, ShortcutKey); 9] = [
    (KeyCode::KeyZ, ShortcutKey::Z),
    (KeyCode::KeyY, ShortcutKey::Y),
    (KeyCode::KeyC, ShortcutKey::C),
    (KeyCode::KeyX, ShortcutKey::X),
    (KeyCode::KeyV, ShortcutKey::V),
    (KeyCode::KeyG, ShortcutKey::G),
    (KeyCode::Delete, ShortcutKey::Delete),
    (KeyCode::Backspace, ShortcutKey::Backspace),
    (KeyCode::Escape, ShortcutKey::Escape),
];

/// Listens for editor chords; Ctrl and the platform command key are equivalent.
pub fn handle_editor_hotkeys(
    input: Res<ButtonInput<KeyCode>>,
    focus: Res<TextInputFocus>,
    mut commands: Commands,
) {
    let ctrl = input.any_pressed([
        KeyCode::ControlLeft,
        KeyCode::ControlRight,
        KeyCode::SuperLeft,
        KeyCode::SuperRight,
    ]);
    let shift = input.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);

    for (code, key) in BINDINGS {
        if !input.just_pressed(code) {
            continue;
        }
        if let Some(command) = command_for(KeyChord { key, ctrl, shift }, focus.0) {
            commands.trigger(EditorCommandIssued { command });
        }
    }
}
