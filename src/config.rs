//! Tunable editor constants

use bevy::prelude::*;
use bevy_reflect::Reflect;

/// Layout, history and cost settings for an editing session.
///
/// Inserted as a resource by the plugin; sessions keep their own copy so
/// they can be driven without an `App`.
#[derive(Resource, Reflect, Debug, Clone, PartialEq)]
#[reflect(Resource)]
pub struct EditorConfig {
    /// Drawn size of a scene node; used for bounds, hit-testing and anchors
    pub node_width: f32,
    pub node_height: f32,
    /// Minimum spacing enforced between a newly placed node and its neighbours
    pub clearance_width: f32,
    pub clearance_height: f32,
    /// Padding around member nodes inside a group's bounding box
    pub group_padding: f32,
    /// Height of the title strip on top of a group's bounding box
    pub group_header: f32,
    /// Offset used when adding a node to the left or right of another
    pub relative_offset_x: f32,
    /// Offset used when adding a node above or below another
    pub relative_offset_y: f32,
    /// Displacement applied to pasted nodes, on both axes
    pub paste_offset: f32,
    /// Pointer travel before a press turns into a drag
    pub drag_threshold: f32,
    /// Size of the directional add buttons shown in ADD mode
    pub add_handle_size: f32,
    /// Maximum number of retained history snapshots
    pub history_depth: usize,
    /// Points charged for one AI generation request
    pub generation_cost: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            node_width: 160.0,
            node_height: 80.0,
            clearance_width: 180.0,
            clearance_height: 100.0,
            group_padding: 20.0,
            group_header: 40.0,
            relative_offset_x: 250.0,
            relative_offset_y: 150.0,
            paste_offset: 50.0,
            drag_threshold: 3.0,
            add_handle_size: 20.0,
            history_depth: 50,
            generation_cost: 50,
        }
    }
}

impl EditorConfig {
    pub fn node_size(&self) -> egui::Vec2 {
        egui::vec2(self.node_width, self.node_height)
    }

    pub fn clearance(&self) -> egui::Vec2 {
        egui::vec2(self.clearance_width, self.clearance_height)
    }

    pub fn paste_delta(&self) -> egui::Vec2 {
        egui::Vec2::splat(self.paste_offset)
    }
}
