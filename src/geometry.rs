//! Geometry and layout for the node canvas
//!
//! This module handles:
//! - Node footprints and the group bounding box (padding plus title strip)
//! - One-shot overlap avoidance when a node is placed
//! - Marquee hit-testing and point hit-testing
//! - Relative placement and edge anchor points
//!
//! Everything here is derived from scene positions on demand; nothing is
//! cached, so bounds can never go stale after a drag or an undo.

use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::model::{Group, NodeId, StoryGraph};

/// Cardinal direction used by the "add from" handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Right, Direction::Down, Direction::Left, Direction::Up];
}

/// Footprint of a scene node whose top-left corner sits at `position`
pub fn node_rect(position: Pos2, config: &EditorConfig) -> Rect {
    Rect::from_min_size(position, config.node_size())
}

/// Strict AABB overlap; touching edges do not count
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.min.x < b.max.x && a.max.x > b.min.x && a.min.y < b.max.y && a.max.y > b.min.y
}

/// Rectangle spanned by a drag, regardless of drag direction
pub fn normalized_box(start: Pos2, current: Pos2) -> Rect {
    Rect::from_two_pos(start, current)
}

/// Smallest box enclosing every member footprint, grown by the padding and
/// with the title strip added on top. `None` when no member resolves.
pub fn group_bounds(graph: &StoryGraph, group: &Group, config: &EditorConfig) -> Option<Rect> {
    let mut members = group
        .scene_ids
        .iter()
        .filter_map(|id| graph.scene(id))
        .map(|scene| node_rect(scene.position, config));

    let first = members.next()?;
    let enclosing = members.fold(first, |acc, rect| acc.union(rect));
    let padding = config.group_padding;
    Some(Rect::from_min_max(
        enclosing.min - Vec2::new(padding, padding + config.group_header),
        enclosing.max + Vec2::splat(padding),
    ))
}

/// Bounds of the group with the given id
pub fn group_bounds_by_id(graph: &StoryGraph, id: &NodeId, config: &EditorConfig) -> Option<Rect> {
    graph.group(id).and_then(|group| group_bounds(graph, group, config))
}

/// Scenes whose footprint intersects the (already normalized) box, in graph order
pub fn scenes_in_box(graph: &StoryGraph, selection: Rect, config: &EditorConfig) -> Vec<NodeId> {
    graph
        .scenes
        .values()
        .filter(|scene| rects_overlap(node_rect(scene.position, config), selection))
        .map(|scene| scene.id.clone())
        .collect()
}

/// Topmost scene under a canvas point (later scenes draw above earlier ones)
pub fn scene_at(graph: &StoryGraph, point: Pos2, config: &EditorConfig) -> Option<NodeId> {
    graph
        .scenes
        .values()
        .rev()
        .find(|scene| node_rect(scene.position, config).contains(point))
        .map(|scene| scene.id.clone())
}

/// Topmost group whose bounding box contains a canvas point
pub fn group_at(graph: &StoryGraph, point: Pos2, config: &EditorConfig) -> Option<NodeId> {
    graph
        .groups
        .values()
        .rev()
        .find(|group| group_bounds(graph, group, config).is_some_and(|rect| rect.contains(point)))
        .map(|group| group.id.clone())
}

/// Where a node added from `source` in `direction` lands, before overlap avoidance
pub fn relative_position(source: Pos2, direction: Direction, config: &EditorConfig) -> Pos2 {
    let offset = match direction {
        Direction::Right => Vec2::new(config.relative_offset_x, 0.0),
        Direction::Left => Vec2::new(-config.relative_offset_x, 0.0),
        Direction::Down => Vec2::new(0.0, config.relative_offset_y),
        Direction::Up => Vec2::new(0.0, -config.relative_offset_y),
    };
    source + offset
}

/// Clickable add button placed just outside a node footprint
pub fn add_handle_rect(node: Rect, direction: Direction, config: &EditorConfig) -> Rect {
    let size = Vec2::splat(config.add_handle_size);
    let gap = config.add_handle_size * 0.2;
    let center = match direction {
        Direction::Right => Pos2::new(node.max.x + gap + size.x / 2.0, node.center().y),
        Direction::Left => Pos2::new(node.min.x - gap - size.x / 2.0, node.center().y),
        Direction::Down => Pos2::new(node.center().x, node.max.y + gap + size.y / 2.0),
        Direction::Up => Pos2::new(node.center().x, node.min.y - gap - size.y / 2.0),
    };
    Rect::from_center_size(center, size)
}

/// Push neighbours out of the way of a node placed at `placed`.
///
/// Every scene accepted by `movable` that sits within the clearance of the
/// placed node is moved along the axis with the larger offset, so that it
/// ends exactly one clearance away. Identical positions push along +x. This
/// is a single pass: a pushed node may end up overlapping a third one.
/// Returns the ids of the scenes that moved.
pub fn avoid_overlap(
    graph: &mut StoryGraph,
    placed: Pos2,
    movable: impl Fn(&NodeId) -> bool,
    config: &EditorConfig,
) -> Vec<NodeId> {
    let clearance = config.clearance();
    let mut moved = Vec::new();
    for scene in graph.scenes.values_mut() {
        if !movable(&scene.id) {
            continue;
        }
        let mut delta = scene.position - placed;
        if delta.x.abs() >= clearance.x || delta.y.abs() >= clearance.y {
            continue;
        }
        if delta == Vec2::ZERO {
            delta.x = 1.0;
        }
        if delta.x.abs() > delta.y.abs() {
            scene.position.x = placed.x + delta.x.signum() * clearance.x;
        } else {
            scene.position.y = placed.y + delta.y.signum() * clearance.y;
        }
        moved.push(scene.id.clone());
    }
    moved
}

/// Right-center anchor of a rectangle; where outgoing edges start
pub fn outgoing_anchor(rect: Rect) -> Pos2 {
    rect.right_center()
}

/// Left-center anchor of a rectangle; where incoming edges end
pub fn incoming_anchor(rect: Rect) -> Pos2 {
    rect.left_center()
}

/// Default position for the `index`-th scene of a graph that carries no layout
pub fn cascade_position(index: usize) -> Pos2 {
    Pos2::new(100.0 + index as f32 * 150.0, 100.0 + index as f32 * 50.0)
}
