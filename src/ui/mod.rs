//! egui front end for the editor session
//!
//! This module handles:
//! - Painting the session's render frame on a central canvas
//! - The toolbar and the focused node inspector
//! - Publishing text focus so hotkeys stay quiet while typing

pub mod canvas;
pub mod painter;

use bevy::prelude::*;
use bevy_egui::{EguiContext, PrimaryEguiContext};

use crate::hotkeys::TextInputFocus;
use crate::session::EditorSession;
use canvas::InspectorDraft;

/// Main UI system, runs in the primary egui context pass
pub fn editor_ui_system(
    mut egui_context: Query<&mut EguiContext, With<PrimaryEguiContext>>,
    mut session: ResMut<EditorSession>,
    mut focus: ResMut<TextInputFocus>,
    mut draft: Local<InspectorDraft>,
    mut prompt: Local<String>,
    mut commands: Commands,
) {
    let Ok(mut egui_context) = egui_context.single_mut() else {
        return;
    };
    let ctx = egui_context.get_mut();

    canvas::show_toolbar(ctx, &session, &mut prompt, &mut commands);
    canvas::show_inspector(ctx, &mut session, &mut draft);
    canvas::show_canvas(ctx, &mut session);

    focus.0 = ctx.wants_keyboard_input();
}
