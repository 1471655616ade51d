//! Screen-space draw list for the canvas
//!
//! Built fresh from the session every frame. Renderers only paint what is
//! here; they never query the graph themselves.

use egui::{Pos2, Rect};

use crate::geometry::{self, Direction};
use crate::interaction::Tool;
use crate::model::{CompletionMode, NodeId};
use crate::session::{EditorSession, Focus};

#[derive(Debug, Clone, PartialEq)]
pub struct SceneSprite {
    pub id: NodeId,
    pub title: String,
    pub rect: Rect,
    pub selected: bool,
    pub active: bool,
    pub staged: bool,
    pub pending_source: bool,
    pub is_ending: bool,
    pub grouped: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupSprite {
    pub id: NodeId,
    pub title: String,
    pub mode: CompletionMode,
    pub color: Option<String>,
    pub rect: Rect,
    pub selected: bool,
    pub active: bool,
    pub pending_source: bool,
}

/// One choice drawn as a straight segment between anchors
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSegment {
    pub origin: NodeId,
    pub target: NodeId,
    pub label: String,
    pub from: Pos2,
    pub to: Pos2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AddHandle {
    pub direction: Direction,
    pub rect: Rect,
}

/// Everything to paint for one frame, back to front: groups, edges, scenes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderFrame {
    pub groups: Vec<GroupSprite>,
    pub edges: Vec<EdgeSegment>,
    pub scenes: Vec<SceneSprite>,
    pub add_handles: Vec<(NodeId, AddHandle)>,
    pub marquee: Option<Rect>,
    pub tool: Tool,
}

impl EditorSession {
    /// Build the draw list. Choices whose target no longer resolves are skipped.
    pub fn render_frame(&self) -> RenderFrame {
        let graph = self.graph();
        let config = self.config();
        let pan = self.pan();
        let to_screen = |rect: Rect| rect.translate(pan);
        let focused = |id: &NodeId| self.focus.as_ref().is_some_and(|focus| focus.id() == id);
        let pending = |id: &NodeId| self.connect_source() == Some(id);

        let group_rects: Vec<(NodeId, Rect)> = graph
            .groups
            .values()
            .filter_map(|group| geometry::group_bounds(graph, group, config).map(|rect| (group.id.clone(), rect)))
            .collect();

        let groups = graph
            .groups
            .values()
            .filter_map(|group| {
                let rect = group_rects.iter().find(|(id, _)| id == &group.id)?.1;
                Some(GroupSprite {
                    id: group.id.clone(),
                    title: group.title.clone(),
                    mode: group.mode,
                    color: group.color.clone(),
                    rect: to_screen(rect),
                    selected: self.selection.group.as_ref() == Some(&group.id),
                    active: matches!(&self.focus, Some(Focus::Group(id)) if id == &group.id),
                    pending_source: pending(&group.id),
                })
            })
            .collect();

        let world_rect = |id: &NodeId| -> Option<Rect> {
            if let Some(scene) = graph.scene(id) {
                return Some(geometry::node_rect(scene.position, config));
            }
            group_rects.iter().find(|(group, _)| group == id).map(|(_, rect)| *rect)
        };
        let mut edges = Vec::new();
        let sources = graph
            .scenes
            .values()
            .map(|scene| (&scene.id, &scene.choices))
            .chain(graph.groups.values().map(|group| (&group.id, &group.choices)));
        for (origin, choices) in sources {
            let Some(from) = world_rect(origin) else {
                continue;
            };
            for choice in choices {
                let Some(to) = world_rect(&choice.next_scene_id) else {
                    continue;
                };
                edges.push(EdgeSegment {
                    origin: origin.clone(),
                    target: choice.next_scene_id.clone(),
                    label: choice.text.clone(),
                    from: geometry::outgoing_anchor(from) + pan,
                    to: geometry::incoming_anchor(to) + pan,
                });
            }
        }

        let scenes = graph
            .scenes
            .values()
            .map(|scene| SceneSprite {
                id: scene.id.clone(),
                title: scene.title.clone(),
                rect: to_screen(geometry::node_rect(scene.position, config)),
                selected: self.selection.contains(&scene.id),
                active: focused(&scene.id),
                staged: self.staged().contains(&scene.id),
                pending_source: pending(&scene.id),
                is_ending: scene.is_ending,
                grouped: graph.group_of(&scene.id).is_some(),
            })
            .collect();

        let add_handles = if self.tool() == Tool::Add {
            graph
                .scenes
                .values()
                .flat_map(|scene| {
                    let node = geometry::node_rect(scene.position, config);
                    Direction::ALL.into_iter().map(move |direction| {
                        (
                            scene.id.clone(),
                            AddHandle {
                                direction,
                                rect: to_screen(geometry::add_handle_rect(node, direction, config)),
                            },
                        )
                    })
                })
                .collect()
        } else {
            Vec::new()
        };

        RenderFrame {
            groups,
            edges,
            scenes,
            add_handles,
            marquee: self.marquee().map(to_screen),
            tool: self.tool(),
        }
    }
}
