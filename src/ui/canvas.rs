//! The editor panels: toolbar, inspector and the graph canvas

use bevy::log::debug;
use bevy::prelude::*;
use egui::{Pos2, Sense};

use super::painter::GraphPainter;
use crate::generation::GenerationRequested;
use crate::interaction::{Gesture, PointerModifiers, Tool};
use crate::model::{CompletionMode, NodeId};
use crate::session::{EditorSession, Focus};
use crate::shortcuts::EditorCommand;
use crate::EditorCommandIssued;

/// Text being edited in the inspector, committed when the field loses focus.
///
/// The draft is reseeded when the focus moves or when the committed values
/// change underneath it (undo, redo, a rename from elsewhere).
#[derive(Debug, Default)]
pub struct InspectorDraft {
    target: Option<NodeId>,
    seeded: (String, String),
    title: String,
    text: String,
}

impl InspectorDraft {
    fn sync(&mut self, session: &EditorSession) {
        let focused = session.focus.as_ref().map(Focus::id);
        let committed = committed_text(session);
        if self.target.as_ref() == focused && self.seeded == committed {
            return;
        }
        self.target = focused.cloned();
        (self.title, self.text) = committed.clone();
        self.seeded = committed;
    }
}

/// Title and text of the focused node as the graph holds them
fn committed_text(session: &EditorSession) -> (String, String) {
    let graph = session.graph();
    match &session.focus {
        Some(Focus::Scene(id)) => graph
            .scene(id)
            .map(|s| (s.title.clone(), s.text.clone()))
            .unwrap_or_default(),
        Some(Focus::Group(id)) => (graph.group(id).map(|g| g.title.clone()).unwrap_or_default(), String::new()),
        None => Default::default(),
    }
}

/// Tool buttons, history controls, generation prompt and the last error
pub fn show_toolbar(ctx: &egui::Context, session: &EditorSession, prompt: &mut String, commands: &mut Commands) {
    egui::TopBottomPanel::top("storygraph_toolbar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            for (tool, label) in [
                (Tool::Pointer, "選取"),
                (Tool::Add, "新增"),
                (Tool::Connect, "連線"),
                (Tool::Group, "群組"),
            ] {
                if ui.selectable_label(session.tool() == tool, label).clicked() {
                    commands.trigger(EditorCommandIssued {
                        command: EditorCommand::SetTool(tool),
                    });
                }
            }

            if session.tool() == Tool::Group && !session.staged().is_empty() {
                let label = format!("建立群組 ({})", session.staged().len());
                if ui.button(label).clicked() {
                    commands.trigger(EditorCommandIssued {
                        command: EditorCommand::GroupSelection,
                    });
                }
            }

            ui.separator();
            if ui.add_enabled(session.can_undo(), egui::Button::new("↶")).clicked() {
                commands.trigger(EditorCommandIssued {
                    command: EditorCommand::Undo,
                });
            }
            if ui.add_enabled(session.can_redo(), egui::Button::new("↷")).clicked() {
                commands.trigger(EditorCommandIssued {
                    command: EditorCommand::Redo,
                });
            }

            ui.separator();
            ui.add(egui::TextEdit::singleline(prompt).hint_text("AI 故事提示").desired_width(220.0));
            let idle = !session.is_generating();
            if ui.add_enabled(idle, egui::Button::new("AI 生成")).clicked() {
                commands.trigger(GenerationRequested {
                    prompt: prompt.clone(),
                });
            }
            if !idle {
                ui.spinner();
            }

            if let Some(error) = session.last_error() {
                ui.separator();
                ui.colored_label(egui::Color32::from_rgb(255, 120, 120), error);
            }
        });
    });
}

/// Properties of the focused scene or group
pub fn show_inspector(ctx: &egui::Context, session: &mut EditorSession, draft: &mut InspectorDraft) {
    draft.sync(session);
    let Some(focus) = session.focus.clone() else {
        return;
    };

    egui::SidePanel::right("storygraph_inspector")
        .default_width(260.0)
        .show(ctx, |ui| match focus {
            Focus::Scene(id) => scene_inspector(ui, session, draft, &id),
            Focus::Group(id) => group_inspector(ui, session, draft, &id),
        });
}

fn scene_inspector(ui: &mut egui::Ui, session: &mut EditorSession, draft: &mut InspectorDraft, id: &NodeId) {
    let Some(scene) = session.graph().scene(id).cloned() else {
        return;
    };
    ui.heading("場景");

    let title = ui.text_edit_singleline(&mut draft.title);
    if title.lost_focus() && draft.title != scene.title {
        let _ = session.set_scene_title(id, draft.title.clone());
    }
    let text = ui.add(egui::TextEdit::multiline(&mut draft.text).desired_rows(6));
    if text.lost_focus() && draft.text != scene.text {
        let _ = session.set_scene_text(id, draft.text.clone());
    }

    let mut is_ending = scene.is_ending;
    if ui.checkbox(&mut is_ending, "結局").changed() {
        let _ = session.set_scene_ending(id, is_ending);
    }

    ui.separator();
    let mut removed = None;
    for (index, choice) in scene.choices.iter().enumerate() {
        ui.horizontal(|ui| {
            ui.label(&choice.text);
            ui.weak(format!("→ {}", choice.next_scene_id));
            if ui.small_button("✕").clicked() {
                removed = Some(index);
            }
        });
    }
    if let Some(index) = removed {
        let _ = session.delete_choice(id, index);
    }

    ui.separator();
    if ui.button("刪除場景").clicked() {
        let _ = session.delete_scene(id);
    }
}

fn group_inspector(ui: &mut egui::Ui, session: &mut EditorSession, draft: &mut InspectorDraft, id: &NodeId) {
    let Some(group) = session.graph().group(id).cloned() else {
        return;
    };
    ui.heading("群組");

    let title = ui.text_edit_singleline(&mut draft.title);
    if title.lost_focus() && draft.title != group.title {
        let _ = session.rename_group(id, draft.title.clone());
    }

    ui.horizontal(|ui| {
        for (mode, label) in [(CompletionMode::All, "全部完成"), (CompletionMode::Any, "任一完成")] {
            if ui.selectable_label(group.mode == mode, label).clicked() && group.mode != mode {
                let _ = session.set_group_mode(id, mode);
            }
        }
    });
    ui.label(format!("{} 個場景", group.scene_ids.len()));

    ui.separator();
    if ui.button("刪除群組").clicked() {
        let _ = session.delete_group(id);
    }
}

/// Paint the graph and feed pointer input to the session's state machine
pub fn show_canvas(ctx: &egui::Context, session: &mut EditorSession) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let origin = response.rect.min.to_vec2();
        GraphPainter::new(origin).paint(&painter, &session.render_frame());

        let (pointer, pressed, released, modifiers) = ctx.input(|input| {
            (
                input.pointer.latest_pos(),
                input.pointer.primary_pressed(),
                input.pointer.primary_released(),
                PointerModifiers {
                    shift: input.modifiers.shift,
                    space: input.key_down(egui::Key::Space),
                },
            )
        });
        let Some(pointer) = pointer else {
            return;
        };
        let local = Pos2::new(pointer.x - origin.x, pointer.y - origin.y);

        if pressed && response.hovered() {
            session.pointer_pressed(local, modifiers);
        }
        if session.gesture() != &Gesture::Idle {
            session.pointer_moved(local);
            if released {
                if let Err(error) = session.pointer_released(local) {
                    debug!("pointer release refused: {error}");
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::model::{Scene, StoryGraph};
    use pretty_assertions::assert_eq;

    fn session() -> EditorSession {
        let a = Scene::new(NodeId::from("a"), "Harbour", "Fog rolls in.", Pos2::ZERO);
        let b = Scene::new(NodeId::from("b"), "Tower", "", Pos2::new(400.0, 0.0));
        let mut session = EditorSession::with_graph(StoryGraph::new([a, b], []), EditorConfig::default());
        session.focus = Some(Focus::Scene("a".into()));
        session
    }

    #[test]
    fn draft_follows_focus() {
        let mut session = session();
        let mut draft = InspectorDraft::default();
        draft.sync(&session);
        assert_eq!((draft.title.as_str(), draft.text.as_str()), ("Harbour", "Fog rolls in."));

        session.focus = Some(Focus::Scene("b".into()));
        draft.sync(&session);
        assert_eq!(draft.title, "Tower");
    }

    #[test]
    fn draft_reseeds_after_undo() {
        let mut session = session();
        let mut draft = InspectorDraft::default();
        draft.sync(&session);

        draft.title = "Pier".into();
        session.set_scene_title(&"a".into(), draft.title.clone()).expect("rename");
        draft.sync(&session);
        assert_eq!(draft.title, "Pier");

        assert!(session.undo());
        draft.sync(&session);
        assert_eq!(draft.title, "Harbour");

        assert!(session.redo());
        draft.sync(&session);
        assert_eq!(draft.title, "Pier");
    }

    #[test]
    fn draft_keeps_uncommitted_typing() {
        let session = session();
        let mut draft = InspectorDraft::default();
        draft.sync(&session);
        draft.text.push_str(" A bell rings.");
        draft.sync(&session);
        assert_eq!(draft.text, "Fog rolls in. A bell rings.");
    }
}
