//! Pointer-driven interaction state machine
//!
//! This module handles:
//! - Tool modes (POINTER, ADD, CONNECT, GROUP)
//! - The press / move / release protocol: panning, node and group drags,
//!   marquee selection and click dispatch
//! - The two-click CONNECT protocol
//!
//! Pointer positions arrive in screen space; the viewport pan is removed
//! before anything is hit-tested against the graph.

use bevy::log::debug;
use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::error::EditorError;
use crate::geometry::{self, Direction};
use crate::model::NodeId;
use crate::session::{EditorSession, Focus};

/// Mutually exclusive editing tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tool {
    /// Select, move and edit
    #[default]
    Pointer,
    /// Click to place new scenes, or use the directional add handles
    Add,
    /// Two-click edge creation
    Connect,
    /// Stage scenes, then confirm to create a group
    Group,
}

/// Modifier state sampled at press time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerModifiers {
    pub shift: bool,
    /// Space held; turns any press into a pan
    pub space: bool,
}

/// What sits under the pointer at press time
#[derive(Debug, Clone, PartialEq)]
pub enum PressTarget {
    Scene(NodeId),
    Group(NodeId),
    AddHandle(NodeId, Direction),
    Canvas,
}

/// In-progress pointer gesture
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    /// Viewport pan; `origin` is the screen press point
    Panning { origin: Pos2, initial_pan: Vec2 },
    /// Pressed but not yet past the drag threshold; releases as a click
    Pressed { origin: Pos2, target: PressTarget, shift: bool },
    /// Live node or group drag
    Dragging { origin: Pos2 },
    /// Rubber-band selection in world space
    Marquee { start: Pos2, current: Pos2 },
    /// A press that moved but has no drag meaning for the current tool
    Inert,
}

impl EditorSession {
    /// Convert a screen point to canvas (world) space
    pub fn to_world(&self, screen: Pos2) -> Pos2 {
        screen - self.pan
    }

    /// Current marquee rectangle in world space, if one is being drawn
    pub fn marquee(&self) -> Option<Rect> {
        match &self.gesture {
            Gesture::Marquee { start, current } => Some(geometry::normalized_box(*start, *current)),
            _ => None,
        }
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Hit-test a world point the way a press sees it
    pub fn target_at(&self, world: Pos2) -> PressTarget {
        let graph = self.graph();
        let config = self.config();
        if self.tool == Tool::Add {
            for scene in graph.scenes.values().rev() {
                let node = geometry::node_rect(scene.position, config);
                for direction in Direction::ALL {
                    if geometry::add_handle_rect(node, direction, config).contains(world) {
                        return PressTarget::AddHandle(scene.id.clone(), direction);
                    }
                }
            }
        }
        if let Some(id) = geometry::scene_at(graph, world, config) {
            return PressTarget::Scene(id);
        }
        if let Some(id) = geometry::group_at(graph, world, config) {
            return PressTarget::Group(id);
        }
        PressTarget::Canvas
    }

    pub fn pointer_pressed(&mut self, screen: Pos2, modifiers: PointerModifiers) {
        if modifiers.space {
            self.gesture = Gesture::Panning {
                origin: screen,
                initial_pan: self.pan,
            };
            return;
        }
        let target = self.target_at(self.to_world(screen));
        self.gesture = Gesture::Pressed {
            origin: screen,
            target,
            shift: modifiers.shift,
        };
    }

    pub fn pointer_moved(&mut self, screen: Pos2) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Panning { origin, initial_pan } => {
                self.pan = initial_pan + (screen - origin);
                self.gesture = Gesture::Panning { origin, initial_pan };
            }
            Gesture::Pressed { origin, target, shift } => {
                if (screen - origin).length() <= self.config().drag_threshold {
                    self.gesture = Gesture::Pressed { origin, target, shift };
                    return;
                }
                self.gesture = self.start_drag_gesture(origin, target);
                self.pointer_moved(screen);
            }
            Gesture::Dragging { origin } => {
                self.update_drag(screen - origin);
                self.gesture = Gesture::Dragging { origin };
            }
            Gesture::Marquee { start, .. } => {
                self.gesture = Gesture::Marquee {
                    start,
                    current: self.to_world(screen),
                };
            }
            other => self.gesture = other,
        }
    }

    fn start_drag_gesture(&mut self, origin: Pos2, target: PressTarget) -> Gesture {
        match (self.tool, target) {
            (Tool::Pointer | Tool::Add, PressTarget::Scene(id)) => {
                if self.begin_drag([&id]) {
                    Gesture::Dragging { origin }
                } else {
                    Gesture::Inert
                }
            }
            (Tool::Pointer, PressTarget::Group(id)) => {
                let members = self
                    .graph()
                    .group(&id)
                    .map(|group| group.scene_ids.clone())
                    .unwrap_or_default();
                self.selection.group = Some(id);
                if self.begin_drag(&members) {
                    Gesture::Dragging { origin }
                } else {
                    Gesture::Inert
                }
            }
            (Tool::Pointer | Tool::Group, PressTarget::Canvas) => {
                let start = self.to_world(origin);
                Gesture::Marquee { start, current: start }
            }
            _ => Gesture::Inert,
        }
    }

    /// Finish the gesture. A press that never crossed the drag threshold is
    /// dispatched as a click; only a CONNECT click can be rejected.
    pub fn pointer_released(&mut self, screen: Pos2) -> Result<(), EditorError> {
        match std::mem::take(&mut self.gesture) {
            Gesture::Pressed { target, shift, .. } => self.click(target, self.to_world(screen), shift),
            Gesture::Dragging { .. } => {
                self.commit_drag();
                Ok(())
            }
            Gesture::Marquee { start, .. } => {
                let selection = geometry::normalized_box(start, self.to_world(screen));
                let hits = geometry::scenes_in_box(self.graph(), selection, self.config());
                debug!("marquee hit {} scenes", hits.len());
                if self.tool == Tool::Group {
                    self.staged.extend(hits);
                } else {
                    self.selection.clear();
                    self.selection.scenes.extend(hits);
                }
                Ok(())
            }
            Gesture::Panning { .. } | Gesture::Idle | Gesture::Inert => Ok(()),
        }
    }

    /// Dispatch a click per tool mode
    pub fn click(&mut self, target: PressTarget, world: Pos2, shift: bool) -> Result<(), EditorError> {
        match (self.tool, target) {
            (Tool::Connect, PressTarget::Scene(id) | PressTarget::Group(id)) => self.connect_click(id),
            (Tool::Connect, _) => {
                self.connect_source = None;
                Ok(())
            }
            (Tool::Group, PressTarget::Scene(id)) => {
                if !self.staged.shift_remove(&id) {
                    self.staged.insert(id);
                }
                Ok(())
            }
            (Tool::Group, _) => Ok(()),
            (Tool::Add, PressTarget::AddHandle(source, direction)) => {
                self.add_relative_scene(&source, direction).map(|_| ())
            }
            (Tool::Add, PressTarget::Canvas) => {
                let half = self.config().node_size() / 2.0;
                self.add_scene_at(world - half);
                Ok(())
            }
            (Tool::Add, PressTarget::Group(_)) => Ok(()),
            (_, PressTarget::Scene(id)) => {
                self.focus = Some(Focus::Scene(id.clone()));
                if shift {
                    self.selection.toggle(id);
                } else {
                    self.selection.group = None;
                    self.selection.select_only(id);
                }
                Ok(())
            }
            (_, PressTarget::Group(id)) => {
                self.focus = Some(Focus::Group(id.clone()));
                self.selection.group = Some(id);
                Ok(())
            }
            (_, PressTarget::Canvas) | (_, PressTarget::AddHandle(..)) => {
                self.selection.clear();
                self.focus = None;
                self.connect_source = None;
                Ok(())
            }
        }
    }

    /// One click of the CONNECT protocol.
    ///
    /// The first click arms a source; clicking it again disarms it. Any other
    /// node attempts the edge; success returns to POINTER and a rejection
    /// disarms the source.
    pub fn connect_click(&mut self, id: NodeId) -> Result<(), EditorError> {
        match self.connect_source.take() {
            None => {
                debug!("connect source {id}");
                self.connect_source = Some(id);
                Ok(())
            }
            Some(source) if source == id => Ok(()),
            Some(source) => {
                self.connect(&source, &id)?;
                self.set_tool(Tool::Pointer);
                Ok(())
            }
        }
    }

    /// ESC: abandon whatever is pending and go back to POINTER
    pub fn escape(&mut self) {
        if self.is_dragging() {
            self.cancel_drag();
        }
        self.gesture = Gesture::Idle;
        self.connect_source = None;
        self.set_tool(Tool::Pointer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::model::{Group, Scene, StoryGraph};
    use pretty_assertions::assert_eq;

    fn session() -> EditorSession {
        let graph = StoryGraph::new(
            [
                Scene::new("a".into(), "A", "", Pos2::new(0.0, 0.0)),
                Scene::new("b".into(), "B", "", Pos2::new(300.0, 0.0)),
                Scene::new("c".into(), "C", "", Pos2::new(0.0, 400.0)),
            ],
            [Group::new("g".into(), "G", vec!["a".into(), "b".into()])],
        );
        EditorSession::with_graph(graph, EditorConfig::default())
    }

    fn tap(session: &mut EditorSession, at: Pos2, shift: bool) -> Result<(), EditorError> {
        session.pointer_pressed(at, PointerModifiers { shift, space: false });
        session.pointer_released(at)
    }

    #[test]
    fn shift_click_toggles_multi_select() {
        let mut session = session();
        tap(&mut session, Pos2::new(10.0, 10.0), false).expect("click a");
        tap(&mut session, Pos2::new(310.0, 10.0), true).expect("shift-click b");
        assert_eq!(session.selection.scenes.len(), 2);
        tap(&mut session, Pos2::new(10.0, 10.0), true).expect("shift-click a");
        assert_eq!(session.selection.scenes.iter().collect::<Vec<_>>(), vec![&NodeId::from("b")]);
        tap(&mut session, Pos2::new(900.0, 900.0), false).expect("empty click");
        assert!(session.selection.is_empty());
        assert!(session.focus.is_none());
    }

    #[test]
    fn space_drag_pans_without_touching_the_graph() {
        let mut session = session();
        let before = session.graph().clone();
        session.pointer_pressed(Pos2::new(10.0, 10.0), PointerModifiers { shift: false, space: true });
        session.pointer_moved(Pos2::new(60.0, 30.0));
        session.pointer_released(Pos2::new(60.0, 30.0)).expect("pan");
        assert_eq!(session.pan(), Vec2::new(50.0, 20.0));
        assert_eq!(session.graph(), &before);
        assert_eq!(session.to_world(Pos2::new(60.0, 30.0)), Pos2::new(10.0, 10.0));
    }

    #[test]
    fn small_jitter_is_still_a_click() {
        let mut session = session();
        session.pointer_pressed(Pos2::new(10.0, 10.0), PointerModifiers::default());
        session.pointer_moved(Pos2::new(12.0, 11.0));
        session.pointer_released(Pos2::new(12.0, 11.0)).expect("click");
        assert!(session.selection.contains(&"a".into()));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn group_drag_moves_every_member_once() {
        let mut session = session();
        // Title strip of g, above both members
        let press = Pos2::new(100.0, -30.0);
        session.pointer_pressed(press, PointerModifiers::default());
        session.pointer_moved(press + Vec2::new(20.0, 0.0));
        session.pointer_moved(press + Vec2::new(40.0, 5.0));
        session.pointer_released(press + Vec2::new(40.0, 5.0)).expect("drop");
        assert_eq!(session.graph().scene(&"a".into()).map(|s| s.position), Some(Pos2::new(40.0, 5.0)));
        assert_eq!(session.graph().scene(&"b".into()).map(|s| s.position), Some(Pos2::new(340.0, 5.0)));
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn marquee_selects_in_pointer_and_stages_in_group_mode() {
        let mut session = session();
        session.pointer_pressed(Pos2::new(-50.0, 350.0), PointerModifiers::default());
        session.pointer_moved(Pos2::new(50.0, 450.0));
        assert!(session.marquee().is_some());
        session.pointer_released(Pos2::new(50.0, 450.0)).expect("marquee");
        assert_eq!(session.selection.scenes.len(), 1);

        session.set_tool(Tool::Group);
        session.pointer_pressed(Pos2::new(-50.0, -60.0), PointerModifiers::default());
        session.pointer_moved(Pos2::new(350.0, 20.0));
        session.pointer_released(Pos2::new(350.0, 20.0)).expect("marquee");
        assert_eq!(session.staged().len(), 2);
        assert_eq!(session.graph().groups.len(), 1);
    }

    #[test]
    fn connect_protocol_reverts_to_pointer() {
        let mut session = session();
        session.set_tool(Tool::Connect);
        tap(&mut session, Pos2::new(10.0, 410.0), false).expect("arm c");
        assert_eq!(session.connect_source(), Some(&NodeId::from("c")));
        tap(&mut session, Pos2::new(10.0, 410.0), false).expect("disarm c");
        assert_eq!(session.connect_source(), None);

        tap(&mut session, Pos2::new(10.0, 410.0), false).expect("arm c");
        tap(&mut session, Pos2::new(100.0, -30.0), false).expect("c -> g");
        assert_eq!(session.tool(), Tool::Pointer);
        assert_eq!(session.graph().scene(&"c".into()).map(|s| s.choices.len()), Some(1));
    }

    #[test]
    fn rejected_connect_clears_pending_source() {
        let mut session = session();
        session.set_tool(Tool::Connect);
        tap(&mut session, Pos2::new(10.0, 10.0), false).expect("arm a");
        let result = tap(&mut session, Pos2::new(10.0, 410.0), false);
        assert!(matches!(result, Err(EditorError::InvalidConnection { .. })));
        assert_eq!(session.connect_source(), None);
        assert_eq!(session.tool(), Tool::Connect);
    }

    #[test]
    fn add_tool_places_centred_scene_and_uses_handles() {
        let mut session = session();
        session.set_tool(Tool::Add);
        tap(&mut session, Pos2::new(880.0, 840.0), false).expect("add");
        let added = session.graph().scenes.values().last().map(|s| s.position);
        assert_eq!(added, Some(Pos2::new(800.0, 800.0)));

        // Right-hand handle of c sits just past its right edge
        let handle = geometry::add_handle_rect(
            geometry::node_rect(Pos2::new(0.0, 400.0), session.config()),
            Direction::Right,
            session.config(),
        );
        tap(&mut session, handle.center(), false).expect("add right of c");
        let added = session.graph().scenes.values().last().map(|s| s.position);
        assert_eq!(added, Some(Pos2::new(250.0, 400.0)));
    }

    #[test]
    fn escape_returns_to_pointer() {
        let mut session = session();
        session.set_tool(Tool::Connect);
        tap(&mut session, Pos2::new(10.0, 10.0), false).expect("arm a");
        session.escape();
        assert_eq!(session.tool(), Tool::Pointer);
        assert_eq!(session.connect_source(), None);
    }
}
