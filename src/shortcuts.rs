//! Editor commands and their keyboard shortcuts

use bevy::log::debug;
use serde::{Deserialize, Serialize};

use crate::error::EditorError;
use crate::interaction::Tool;
use crate::session::EditorSession;

/// Session-level operations reachable from the keyboard or a toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditorCommand {
    Undo,
    Redo,
    Copy,
    Cut,
    Paste,
    DeleteSelection,
    /// Group the selection, or confirm the staging set in GROUP mode
    GroupSelection,
    UngroupSelection,
    SetTool(Tool),
    Escape,
}

/// Keys the editor binds, independent of any windowing backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutKey {
    Z,
    Y,
    C,
    X,
    V,
    G,
    Delete,
    Backspace,
    Escape,
}

/// A key press plus modifiers. `ctrl` also covers the platform command key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: ShortcutKey,
    pub ctrl: bool,
    pub shift: bool,
}

impl KeyChord {
    pub fn new(key: ShortcutKey) -> Self {
        Self {
            key,
            ctrl: false,
            shift: false,
        }
    }

    pub fn ctrl(key: ShortcutKey) -> Self {
        Self {
            key,
            ctrl: true,
            shift: false,
        }
    }

    pub fn ctrl_shift(key: ShortcutKey) -> Self {
        Self {
            key,
            ctrl: true,
            shift: true,
        }
    }
}

/// Map a chord to a command. Nothing fires while a text field has focus.
pub fn command_for(chord: KeyChord, text_input_focused: bool) -> Option<EditorCommand> {
    if text_input_focused {
        return None;
    }
    let command = match (chord.key, chord.ctrl, chord.shift) {
        (ShortcutKey::Z, true, false) => EditorCommand::Undo,
        (ShortcutKey::Z, true, true) | (ShortcutKey::Y, true, _) => EditorCommand::Redo,
        (ShortcutKey::C, true, _) => EditorCommand::Copy,
        (ShortcutKey::X, true, _) => EditorCommand::Cut,
        (ShortcutKey::V, true, _) => EditorCommand::Paste,
        (ShortcutKey::G, true, false) => EditorCommand::GroupSelection,
        (ShortcutKey::G, true, true) => EditorCommand::UngroupSelection,
        (ShortcutKey::Delete | ShortcutKey::Backspace, _, _) => EditorCommand::DeleteSelection,
        (ShortcutKey::Escape, _, _) => EditorCommand::Escape,
        _ => return None,
    };
    Some(command)
}

impl EditorSession {
    /// Run one command against the session
    pub fn apply(&mut self, command: EditorCommand) -> Result<(), EditorError> {
        debug!("command {command:?}");
        match command {
            EditorCommand::Undo => {
                self.undo();
            }
            EditorCommand::Redo => {
                self.redo();
            }
            EditorCommand::Copy => {
                self.copy();
            }
            EditorCommand::Cut => {
                self.cut()?;
            }
            EditorCommand::Paste => {
                self.paste();
            }
            EditorCommand::DeleteSelection => {
                self.delete_selection()?;
            }
            EditorCommand::GroupSelection if self.tool() == Tool::Group => {
                self.confirm_group();
            }
            EditorCommand::GroupSelection => {
                if self.selection.scenes.len() > 1 {
                    self.group_selection();
                }
            }
            EditorCommand::UngroupSelection => {
                if self.ungroup_selection() > 0 {
                    self.selection.group = None;
                }
            }
            EditorCommand::SetTool(tool) => self.set_tool(tool),
            EditorCommand::Escape => self.escape(),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chords_map_to_commands() {
        assert_eq!(command_for(KeyChord::ctrl(ShortcutKey::Z), false), Some(EditorCommand::Undo));
        assert_eq!(command_for(KeyChord::ctrl_shift(ShortcutKey::Z), false), Some(EditorCommand::Redo));
        assert_eq!(command_for(KeyChord::ctrl(ShortcutKey::Y), false), Some(EditorCommand::Redo));
        assert_eq!(command_for(KeyChord::ctrl(ShortcutKey::G), false), Some(EditorCommand::GroupSelection));
        assert_eq!(
            command_for(KeyChord::ctrl_shift(ShortcutKey::G), false),
            Some(EditorCommand::UngroupSelection)
        );
        assert_eq!(command_for(KeyChord::new(ShortcutKey::Backspace), false), Some(EditorCommand::DeleteSelection));
        assert_eq!(command_for(KeyChord::new(ShortcutKey::Escape), false), Some(EditorCommand::Escape));
        assert_eq!(command_for(KeyChord::new(ShortcutKey::Z), false), None);
    }

    #[test]
    fn text_focus_suppresses_everything() {
        for key in [ShortcutKey::Z, ShortcutKey::V, ShortcutKey::Delete, ShortcutKey::Escape] {
            assert_eq!(command_for(KeyChord::ctrl(key), true), None);
        }
    }

    #[test]
    fn group_shortcut_needs_more_than_one_scene() {
        let mut session = EditorSession::default();
        session.apply(EditorCommand::Paste).expect("empty paste");
        session.selection.select_only("start".into());
        session.apply(EditorCommand::GroupSelection).expect("no-op");
        assert!(session.graph().groups.is_empty());
        assert_eq!(session.history().len(), 1);
    }
}
