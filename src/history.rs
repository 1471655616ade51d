//! Linear undo/redo timeline of whole-graph snapshots

use std::collections::VecDeque;

use crate::model::StoryGraph;

/// Bounded snapshot history with a cursor.
///
/// `record` discards everything after the cursor before appending, and drops
/// the oldest entry once the capacity is exceeded.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<StoryGraph>,
    index: usize,
    capacity: usize,
}

impl History {
    /// A history holding `initial` as its only entry
    pub fn new(initial: StoryGraph, capacity: usize) -> Self {
        let mut entries = VecDeque::with_capacity(capacity.min(64));
        entries.push_back(initial);
        Self {
            entries,
            index: 0,
            capacity: capacity.max(1),
        }
    }

    /// Drop every entry and start over from `initial`
    pub fn reset(&mut self, initial: StoryGraph) {
        self.entries.clear();
        self.entries.push_back(initial);
        self.index = 0;
    }

    pub fn record(&mut self, snapshot: StoryGraph) {
        self.entries.truncate(self.index + 1);
        self.entries.push_back(snapshot);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.index = self.entries.len() - 1;
    }

    /// Step back; `None` when already at the oldest entry
    pub fn undo(&mut self) -> Option<&StoryGraph> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    /// Step forward; `None` when already at the newest entry
    pub fn redo(&mut self) -> Option<&StoryGraph> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// The snapshot under the cursor
    pub fn current(&self) -> Option<&StoryGraph> {
        self.entries.get(self.index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeId, Scene};
    use egui::Pos2;

    fn graph(n: usize) -> StoryGraph {
        StoryGraph::new(
            (0..=n).map(|i| Scene::new(NodeId::new(format!("s{i}")), "", "", Pos2::ZERO)),
            [],
        )
    }

    #[test]
    fn capacity_bounds_retained_entries() {
        let mut history = History::new(graph(0), 50);
        for i in 1..=60 {
            history.record(graph(i));
        }
        assert_eq!(history.len(), 50);
        let mut undos = 0;
        while history.undo().is_some() {
            undos += 1;
        }
        assert_eq!(undos, 49);
        assert_eq!(history.current(), Some(&graph(11)));
    }

    #[test]
    fn recording_after_undo_discards_the_branch() {
        let mut history = History::new(graph(0), 50);
        for i in 1..=10 {
            history.record(graph(i));
        }
        for _ in 0..5 {
            history.undo();
        }
        assert_eq!(history.index(), 5);
        history.record(graph(99));
        assert_eq!(history.len(), 7);
        assert!(!history.can_redo());
        assert!(history.redo().is_none());
        assert_eq!(history.current(), Some(&graph(99)));
    }

    #[test]
    fn undo_and_redo_are_no_ops_at_the_ends() {
        let mut history = History::new(graph(0), 50);
        assert!(!history.can_undo());
        assert!(history.undo().is_none());
        history.record(graph(1));
        assert!(history.redo().is_none());
        assert_eq!(history.undo(), Some(&graph(0)));
        assert_eq!(history.redo(), Some(&graph(1)));
    }
}
