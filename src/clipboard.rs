//! Detached scene copies for copy / cut / paste

use egui::Vec2;
use std::collections::HashMap;

use crate::model::{NodeId, Scene, StoryGraph};

/// Scenes captured by the last copy or cut.
///
/// Groups are never copied; a pasted scene starts ungrouped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clipboard {
    scenes: Vec<Scene>,
}

impl Clipboard {
    /// Replace the contents with copies of `ids`, in graph order.
    /// Unknown ids are skipped. Returns how many scenes were captured.
    pub fn capture<'a>(&mut self, graph: &StoryGraph, ids: impl IntoIterator<Item = &'a NodeId>) -> usize {
        let wanted: Vec<&NodeId> = ids.into_iter().collect();
        self.scenes = graph
            .scenes
            .values()
            .filter(|scene| wanted.contains(&&scene.id))
            .cloned()
            .collect();
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn clear(&mut self) {
        self.scenes.clear();
    }

    /// Fresh copies ready to be inserted: new ids, shifted by `offset`.
    ///
    /// Choices between copied scenes are redirected to the new copies;
    /// choices leaving the copied set keep their original target.
    pub fn instantiate(&self, offset: Vec2) -> Vec<Scene> {
        let remap: HashMap<&NodeId, NodeId> = self
            .scenes
            .iter()
            .map(|scene| (&scene.id, NodeId::generate("scene")))
            .collect();

        self.scenes
            .iter()
            .map(|scene| {
                let mut copy = scene.clone();
                if let Some(id) = remap.get(&scene.id) {
                    copy.id = id.clone();
                }
                copy.position = scene.position + offset;
                for choice in &mut copy.choices {
                    if let Some(target) = remap.get(&choice.next_scene_id) {
                        choice.next_scene_id = target.clone();
                    }
                }
                copy
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Choice;
    use egui::Pos2;

    fn graph() -> StoryGraph {
        let mut a = Scene::new("a".into(), "A", "", Pos2::new(0.0, 0.0));
        a.choices.push(Choice::new("to b", "b".into()));
        a.choices.push(Choice::new("to c", "c".into()));
        let b = Scene::new("b".into(), "B", "", Pos2::new(200.0, 0.0));
        let c = Scene::new("c".into(), "C", "", Pos2::new(400.0, 0.0));
        StoryGraph::new([a, b, c], [])
    }

    #[test]
    fn capture_keeps_graph_order_and_skips_unknown() {
        let mut clipboard = Clipboard::default();
        let ids = [NodeId::from("b"), NodeId::from("ghost"), NodeId::from("a")];
        assert_eq!(clipboard.capture(&graph(), &ids), 2);
        let captured: Vec<&str> = clipboard.scenes().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(captured, vec!["a", "b"]);
    }

    #[test]
    fn instantiate_remaps_internal_edges_only() {
        let mut clipboard = Clipboard::default();
        clipboard.capture(&graph(), &[NodeId::from("a"), NodeId::from("b")]);
        let pasted = clipboard.instantiate(Vec2::splat(50.0));
        assert_eq!(pasted.len(), 2);

        let (a, b) = (&pasted[0], &pasted[1]);
        assert_ne!(a.id.as_str(), "a");
        assert_ne!(b.id.as_str(), "b");
        assert_eq!(a.position, Pos2::new(50.0, 50.0));
        assert_eq!(a.choices[0].next_scene_id, b.id);
        assert_eq!(a.choices[1].next_scene_id, NodeId::from("c"));
    }

    #[test]
    fn each_instantiation_yields_fresh_ids() {
        let mut clipboard = Clipboard::default();
        clipboard.capture(&graph(), &[NodeId::from("c")]);
        let first = clipboard.instantiate(Vec2::ZERO);
        let second = clipboard.instantiate(Vec2::ZERO);
        assert_ne!(first[0].id, second[0].id);
    }
}
