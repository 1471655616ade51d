//! Editing session state and committed graph operations
//!
//! This module handles:
//! - Ownership of the working graph, its history and the clipboard
//! - Selection, active focus and the group staging set
//! - Every committed mutation (one history entry each)
//! - The transient drag tier that only records on release
//!
//! Rejected operations leave the graph, the history and the selection as
//! they were and return an [`EditorError`].

use bevy::log::{debug, info, warn};
use bevy::prelude::Resource;
use egui::{Pos2, Vec2};
use indexmap::IndexSet;
use smallvec::SmallVec;
use std::collections::HashSet;

use crate::clipboard::Clipboard;
use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::generation::GenerationGate;
use crate::geometry::{self, Direction};
use crate::history::History;
use crate::interaction::{Gesture, Tool};
use crate::model::{ArPayload, Choice, CompletionMode, Group, NodeId, Scene, StoryGraph};
use crate::persistence::{Character, GameAsset};

/// The scene or group shown in the inspector
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Focus {
    Scene(NodeId),
    Group(NodeId),
}

impl Focus {
    pub fn id(&self) -> &NodeId {
        match self {
            Focus::Scene(id) | Focus::Group(id) => id,
        }
    }
}

/// Selected scenes (ordered by selection time) and at most one selected group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub scenes: IndexSet<NodeId>,
    pub group: Option<NodeId>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty() && self.group.is_none()
    }

    pub fn clear(&mut self) {
        self.scenes.clear();
        self.group = None;
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.scenes.contains(id)
    }

    /// Make `id` the only selected scene
    pub fn select_only(&mut self, id: NodeId) {
        self.scenes.clear();
        self.scenes.insert(id);
    }

    /// Add or remove `id`; returns whether it is selected afterwards
    pub fn toggle(&mut self, id: NodeId) -> bool {
        if self.scenes.shift_remove(&id) {
            false
        } else {
            self.scenes.insert(id);
            true
        }
    }

    fn retain_existing(&mut self, graph: &StoryGraph) {
        self.scenes.retain(|id| graph.scenes.contains_key(id));
        if self.group.as_ref().is_some_and(|id| !graph.groups.contains_key(id)) {
            self.group = None;
        }
    }
}

/// Positions captured when a drag went live
#[derive(Debug, Clone)]
struct LiveDrag {
    origins: SmallVec<[(NodeId, Pos2); 4]>,
    delta: Vec2,
}

/// Everything an open graph needs while it is being edited
#[derive(Resource, Debug)]
pub struct EditorSession {
    config: EditorConfig,
    graph: StoryGraph,
    history: History,
    clipboard: Clipboard,
    pub selection: Selection,
    pub focus: Option<Focus>,
    pub(crate) tool: Tool,
    pub(crate) connect_source: Option<NodeId>,
    pub(crate) staged: IndexSet<NodeId>,
    pub(crate) pan: Vec2,
    pub(crate) gesture: Gesture,
    drag: Option<LiveDrag>,
    pub(crate) generation: GenerationGate,
    pub characters: Vec<Character>,
    pub assets: Vec<GameAsset>,
    dirty: bool,
    last_error: Option<String>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    /// A fresh session holding only the opening scene
    pub fn new(config: EditorConfig) -> Self {
        Self::with_graph(StoryGraph::opening(), config)
    }

    /// A session over an existing graph, history seeded with it
    pub fn with_graph(graph: StoryGraph, config: EditorConfig) -> Self {
        let history = History::new(graph.clone(), config.history_depth);
        Self {
            config,
            graph,
            history,
            clipboard: Clipboard::default(),
            selection: Selection::default(),
            focus: None,
            tool: Tool::Pointer,
            connect_source: None,
            staged: IndexSet::new(),
            pan: Vec2::ZERO,
            gesture: Gesture::Idle,
            drag: None,
            generation: GenerationGate::default(),
            characters: Vec::new(),
            assets: Vec::new(),
            dirty: false,
            last_error: None,
        }
    }

    pub fn graph(&self) -> &StoryGraph {
        &self.graph
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Swap layout settings; a new history depth applies from the next install
    pub fn set_config(&mut self, config: EditorConfig) {
        self.config = config;
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Pending source of a CONNECT gesture
    pub fn connect_source(&self) -> Option<&NodeId> {
        self.connect_source.as_ref()
    }

    /// Scenes staged for group creation in GROUP mode
    pub fn staged(&self) -> &IndexSet<NodeId> {
        &self.staged
    }

    /// Viewport offset; screen = world + pan
    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn set_pan(&mut self, pan: Vec2) {
        self.pan = pan;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Whether anything was committed since the last load or save
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Message of the most recent rejected operation
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn take_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Switch tools. Leaving CONNECT drops the pending source and leaving
    /// GROUP drops the staging set.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.tool == tool {
            return;
        }
        if self.tool == Tool::Connect {
            self.connect_source = None;
        }
        if self.tool == Tool::Group {
            self.staged.clear();
        }
        debug!("tool {:?} -> {:?}", self.tool, tool);
        self.tool = tool;
    }

    /// Replace the graph wholesale and reseed history with it
    pub fn install(&mut self, graph: StoryGraph) {
        self.history.reset(graph.clone());
        self.graph = graph;
        self.drag = None;
        self.gesture = Gesture::Idle;
        self.selection.clear();
        self.focus = None;
        self.connect_source = None;
        self.staged.clear();
        self.dirty = false;
        info!(
            "installed graph with {} scenes and {} groups",
            self.graph.scenes.len(),
            self.graph.groups.len()
        );
    }

    fn commit(&mut self, next: StoryGraph, what: &str) {
        self.drag = None;
        self.graph = next;
        self.history.record(self.graph.clone());
        self.dirty = true;
        self.settle();
        debug!("committed {what} (history {}/{})", self.history.index() + 1, self.history.len());
    }

    pub(crate) fn reject(&mut self, error: EditorError) -> EditorError {
        warn!("rejected: {error}");
        self.last_error = Some(error.to_string());
        error
    }

    /// Drop references to nodes that no longer exist
    fn settle(&mut self) {
        let graph = &self.graph;
        self.selection.retain_existing(graph);
        self.staged.retain(|id| graph.scenes.contains_key(id));
        if self.focus.as_ref().is_some_and(|focus| !graph.contains_node(focus.id())) {
            self.focus = None;
        }
        if self.connect_source.as_ref().is_some_and(|id| !graph.contains_node(id)) {
            self.connect_source = None;
        }
    }

    // Scenes

    pub fn scene(&self, id: &NodeId) -> Option<&Scene> {
        self.graph.scene(id)
    }

    /// Add a blank scene with its top-left corner at `position`.
    /// Neighbours within the clearance are pushed away.
    pub fn add_scene_at(&mut self, position: Pos2) -> NodeId {
        self.drop_drag();
        let mut scene = Scene::new(NodeId::generate("scene"), "新關卡", "在這裡輸入劇情內容...", position);
        scene.image_keyword = Some("place".to_string());
        let id = scene.id.clone();

        let mut next = self.graph.clone();
        geometry::avoid_overlap(&mut next, position, |_| true, &self.config);
        next.scenes.insert(id.clone(), scene);
        self.commit(next, "add scene");
        self.focus = Some(Focus::Scene(id.clone()));
        id
    }

    /// Add a scene next to `source`; it joins the source's group, if any
    pub fn add_relative_scene(&mut self, source: &NodeId, direction: Direction) -> Result<NodeId, EditorError> {
        self.drop_drag();
        let Some(origin) = self.graph.scene(source) else {
            return Err(self.reject(EditorError::UnknownScene(source.clone())));
        };
        let position = geometry::relative_position(origin.position, direction, &self.config);
        let scene = Scene::new(NodeId::generate("scene"), "新關卡", "...", position);
        let id = scene.id.clone();

        let mut next = self.graph.clone();
        let parent = next.group_of(source).map(|group| group.id.clone());
        if let Some(group) = parent.as_ref().and_then(|group_id| next.group_mut(group_id)) {
            group.scene_ids.push(id.clone());
        }
        geometry::avoid_overlap(&mut next, position, |_| true, &self.config);
        next.scenes.insert(id.clone(), scene);
        self.commit(next, "add relative scene");
        self.focus = Some(Focus::Scene(id.clone()));
        Ok(id)
    }

    /// Delete one scene; the last remaining scene cannot be deleted
    pub fn delete_scene(&mut self, id: &NodeId) -> Result<(), EditorError> {
        self.drop_drag();
        if !self.graph.scenes.contains_key(id) {
            return Err(self.reject(EditorError::UnknownScene(id.clone())));
        }
        if self.graph.scenes.len() <= 1 {
            return Err(self.reject(EditorError::LastScene));
        }
        let mut next = self.graph.clone();
        let removed: HashSet<NodeId> = [id.clone()].into_iter().collect();
        let pruned = next.remove_scenes(&removed);
        if !pruned.is_empty() {
            debug!("pruned empty groups {pruned:?}");
        }
        self.commit(next, "delete scene");
        Ok(())
    }

    /// Apply an in-place edit to one scene as a single committed change
    pub fn edit_scene(&mut self, id: &NodeId, edit: impl FnOnce(&mut Scene)) -> Result<(), EditorError> {
        self.drop_drag();
        let mut next = self.graph.clone();
        let Some(scene) = next.scene_mut(id) else {
            return Err(self.reject(EditorError::UnknownScene(id.clone())));
        };
        edit(scene);
        scene.id = id.clone();
        self.commit(next, "edit scene");
        Ok(())
    }

    pub fn set_scene_title(&mut self, id: &NodeId, title: impl Into<String>) -> Result<(), EditorError> {
        let title = title.into();
        self.edit_scene(id, |scene| scene.title = title)
    }

    pub fn set_scene_text(&mut self, id: &NodeId, text: impl Into<String>) -> Result<(), EditorError> {
        let text = text.into();
        self.edit_scene(id, |scene| scene.text = text)
    }

    pub fn set_scene_ending(&mut self, id: &NodeId, is_ending: bool) -> Result<(), EditorError> {
        self.edit_scene(id, |scene| scene.is_ending = is_ending)
    }

    /// Commit a scene edited elsewhere (the content editor's save callback).
    ///
    /// The scene keeps its current position; choices whose target no longer
    /// resolves are dropped.
    pub fn replace_scene(&mut self, mut scene: Scene) -> Result<(), EditorError> {
        self.drop_drag();
        let Some(current) = self.graph.scene(&scene.id) else {
            return Err(self.reject(EditorError::UnknownScene(scene.id.clone())));
        };
        scene.position = current.position;
        let before = scene.choices.len();
        scene
            .choices
            .retain(|choice| self.graph.contains_node(&choice.next_scene_id));
        if scene.choices.len() != before {
            warn!("dropped {} unresolved choices from {}", before - scene.choices.len(), scene.id);
        }

        let mut next = self.graph.clone();
        next.scenes.insert(scene.id.clone(), scene);
        self.commit(next, "replace scene");
        Ok(())
    }

    /// AR payload of one module of one scene, for the previewer
    pub fn ar_payload(&self, scene: &NodeId, module_id: &str) -> Option<&ArPayload> {
        self.graph
            .scene(scene)?
            .modules
            .iter()
            .find(|module| module.id == module_id)?
            .body
            .ar_payload()
    }

    // Connections

    /// Append a `前往 <target>` choice from `source` to `target`
    pub fn connect(&mut self, source: &NodeId, target: &NodeId) -> Result<(), EditorError> {
        self.drop_drag();
        let label = match self.graph.endpoint(target) {
            Some(endpoint) => format!("前往 {}", endpoint.display_name()),
            None => return Err(self.reject(EditorError::UnknownNode(target.clone()))),
        };
        if !self.graph.contains_node(source) {
            return Err(self.reject(EditorError::UnknownNode(source.clone())));
        }
        if !connection_allowed(&self.graph, source, target) {
            return Err(self.reject(EditorError::InvalidConnection {
                origin: source.clone(),
                target: target.clone(),
            }));
        }
        let choice = Choice::new(label, target.clone());

        let mut next = self.graph.clone();
        if let Some(choices) = next.choices_mut(source) {
            choices.push(choice);
        }
        self.commit(next, "connect");
        Ok(())
    }

    /// Remove the `index`-th choice of a scene or group
    pub fn delete_choice(&mut self, origin: &NodeId, index: usize) -> Result<Choice, EditorError> {
        self.drop_drag();
        let mut next = self.graph.clone();
        let removed = match next.choices_mut(origin) {
            None => return Err(self.reject(EditorError::UnknownNode(origin.clone()))),
            Some(choices) if index >= choices.len() => {
                return Err(self.reject(EditorError::UnknownChoice {
                    origin: origin.clone(),
                    index,
                }))
            }
            Some(choices) => choices.remove(index),
        };
        self.commit(next, "delete choice");
        Ok(removed)
    }

    /// Relabel the `index`-th choice of a scene or group
    pub fn set_choice_text(&mut self, origin: &NodeId, index: usize, text: impl Into<String>) -> Result<(), EditorError> {
        self.drop_drag();
        let mut next = self.graph.clone();
        match next.choices_mut(origin).map(|choices| choices.get_mut(index)) {
            None => return Err(self.reject(EditorError::UnknownNode(origin.clone()))),
            Some(None) => {
                return Err(self.reject(EditorError::UnknownChoice {
                    origin: origin.clone(),
                    index,
                }))
            }
            Some(Some(choice)) => choice.text = text.into(),
        }
        self.commit(next, "edit choice");
        Ok(())
    }

    // Groups

    /// Create a group from the given scenes.
    ///
    /// Unknown and repeated ids are ignored; fewer than two remaining scenes
    /// is a silent no-op. Scenes already in another group move to the new
    /// one, and groups emptied that way are removed.
    pub fn create_group<'a>(&mut self, ids: impl IntoIterator<Item = &'a NodeId>) -> Option<NodeId> {
        self.drop_drag();
        let members: IndexSet<NodeId> = ids
            .into_iter()
            .filter(|id| self.graph.scenes.contains_key(*id))
            .cloned()
            .collect();
        if members.len() < 2 {
            debug!("group creation needs at least two scenes, got {}", members.len());
            return None;
        }

        let mut next = self.graph.clone();
        let mut emptied = HashSet::new();
        for group in next.groups.values_mut() {
            let before = group.scene_ids.len();
            group.scene_ids.retain(|id| !members.contains(id));
            if group.scene_ids.len() != before {
                debug!("moving {} scenes out of group {}", before - group.scene_ids.len(), group.id);
            }
            if group.scene_ids.is_empty() {
                emptied.insert(group.id.clone());
            }
        }
        next.remove_groups(&emptied);

        let group = Group::new(NodeId::generate("group"), "新群組", members.into_iter().collect());
        let id = group.id.clone();
        next.groups.insert(id.clone(), group);
        self.commit(next, "create group");
        Some(id)
    }

    /// Group the selected scenes (needs more than one)
    pub fn group_selection(&mut self) -> Option<NodeId> {
        let ids: Vec<NodeId> = self.selection.scenes.iter().cloned().collect();
        let id = self.create_group(&ids)?;
        self.selection.clear();
        self.set_tool(Tool::Pointer);
        Some(id)
    }

    /// Create a group from the GROUP-mode staging set and return to POINTER
    pub fn confirm_group(&mut self) -> Option<NodeId> {
        let ids: Vec<NodeId> = self.staged.iter().cloned().collect();
        let id = self.create_group(&ids)?;
        self.staged.clear();
        self.selection.clear();
        self.set_tool(Tool::Pointer);
        Some(id)
    }

    /// Dissolve the selected group and every group holding a selected scene.
    /// Member scenes stay; returns how many groups were removed.
    pub fn ungroup_selection(&mut self) -> usize {
        self.drop_drag();
        let mut doomed: HashSet<NodeId> = self
            .selection
            .scenes
            .iter()
            .filter_map(|id| self.graph.group_of(id))
            .map(|group| group.id.clone())
            .collect();
        if let Some(group) = self.selection.group.as_ref().filter(|id| self.graph.groups.contains_key(*id)) {
            doomed.insert(group.clone());
        }
        if doomed.is_empty() {
            return 0;
        }
        let mut next = self.graph.clone();
        next.remove_groups(&doomed);
        self.commit(next, "ungroup");
        doomed.len()
    }

    /// Remove a group; its member scenes stay
    pub fn delete_group(&mut self, id: &NodeId) -> Result<(), EditorError> {
        self.drop_drag();
        if !self.graph.groups.contains_key(id) {
            return Err(self.reject(EditorError::UnknownGroup(id.clone())));
        }
        let mut next = self.graph.clone();
        next.remove_groups(&[id.clone()].into_iter().collect());
        self.commit(next, "delete group");
        Ok(())
    }

    fn edit_group(&mut self, id: &NodeId, edit: impl FnOnce(&mut Group)) -> Result<(), EditorError> {
        self.drop_drag();
        let mut next = self.graph.clone();
        let Some(group) = next.group_mut(id) else {
            return Err(self.reject(EditorError::UnknownGroup(id.clone())));
        };
        edit(group);
        self.commit(next, "edit group");
        Ok(())
    }

    pub fn rename_group(&mut self, id: &NodeId, title: impl Into<String>) -> Result<(), EditorError> {
        let title = title.into();
        self.edit_group(id, |group| group.title = title)
    }

    pub fn set_group_mode(&mut self, id: &NodeId, mode: CompletionMode) -> Result<(), EditorError> {
        self.edit_group(id, |group| group.mode = mode)
    }

    pub fn set_group_color(&mut self, id: &NodeId, color: Option<String>) -> Result<(), EditorError> {
        self.edit_group(id, |group| group.color = color)
    }

    // Clipboard and multi-select

    /// Copy the selected scenes; returns how many were captured
    pub fn copy(&mut self) -> usize {
        if self.selection.scenes.is_empty() {
            return 0;
        }
        let copied = self.clipboard.capture(&self.graph, &self.selection.scenes);
        debug!("copied {copied} scenes");
        copied
    }

    /// Copy, then delete, the selected scenes
    pub fn cut(&mut self) -> Result<usize, EditorError> {
        self.drop_drag();
        if self.selection.scenes.is_empty() {
            return Ok(0);
        }
        if self.selection.scenes.len() >= self.graph.scenes.len() {
            return Err(self.reject(EditorError::LastScene));
        }
        let copied = self.copy();
        self.selection.group = None;
        self.delete_selection()?;
        Ok(copied)
    }

    /// Paste the clipboard as fresh scenes; they become the selection
    pub fn paste(&mut self) -> Vec<NodeId> {
        self.drop_drag();
        if self.clipboard.is_empty() {
            return Vec::new();
        }
        let pasted = self.clipboard.instantiate(self.config.paste_delta());
        let existing: HashSet<NodeId> = self.graph.scenes.keys().cloned().collect();

        let mut next = self.graph.clone();
        let mut ids = Vec::with_capacity(pasted.len());
        for scene in pasted {
            geometry::avoid_overlap(&mut next, scene.position, |id| existing.contains(id), &self.config);
            ids.push(scene.id.clone());
            next.scenes.insert(scene.id.clone(), scene);
        }
        self.commit(next, "paste");
        self.selection.clear();
        self.selection.scenes.extend(ids.iter().cloned());
        ids
    }

    /// Delete the selected scenes and the selected group in one entry.
    ///
    /// Rejected when it would remove every scene. Returns the number of
    /// scenes removed.
    pub fn delete_selection(&mut self) -> Result<usize, EditorError> {
        self.drop_drag();
        if self.selection.is_empty() {
            return Ok(0);
        }
        let scenes: HashSet<NodeId> = self
            .selection
            .scenes
            .iter()
            .filter(|id| self.graph.scenes.contains_key(*id))
            .cloned()
            .collect();
        if !scenes.is_empty() && scenes.len() >= self.graph.scenes.len() {
            return Err(self.reject(EditorError::LastScene));
        }

        let mut next = self.graph.clone();
        next.remove_scenes(&scenes);
        if let Some(group) = self.selection.group.as_ref() {
            next.remove_groups(&[group.clone()].into_iter().collect());
        }
        self.selection.clear();
        self.commit(next, "delete selection");
        Ok(scenes.len())
    }

    // History

    /// Step back one entry; a live drag is abandoned first
    pub fn undo(&mut self) -> bool {
        self.drop_drag();
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.graph = snapshot.clone();
        self.dirty = true;
        self.settle();
        debug!("undo -> {}/{}", self.history.index() + 1, self.history.len());
        true
    }

    /// Step forward one entry; a live drag is abandoned first
    pub fn redo(&mut self) -> bool {
        self.drop_drag();
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.graph = snapshot.clone();
        self.dirty = true;
        self.settle();
        debug!("redo -> {}/{}", self.history.index() + 1, self.history.len());
        true
    }

    /// Abandon a live drag so the next snapshot holds committed positions only
    fn drop_drag(&mut self) {
        if self.drag.is_some() {
            self.cancel_drag();
        }
        self.gesture = Gesture::Idle;
    }

    // Transient drag

    /// Start moving scenes; returns false when none of the ids is a scene
    pub fn begin_drag<'a>(&mut self, ids: impl IntoIterator<Item = &'a NodeId>) -> bool {
        let origins: SmallVec<[(NodeId, Pos2); 4]> = ids
            .into_iter()
            .filter_map(|id| self.graph.scene(id).map(|scene| (id.clone(), scene.position)))
            .collect();
        if origins.is_empty() {
            return false;
        }
        self.drag = Some(LiveDrag {
            origins,
            delta: Vec2::ZERO,
        });
        true
    }

    /// Move the dragged scenes to their origin plus `delta`; not recorded
    pub fn update_drag(&mut self, delta: Vec2) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        drag.delta = delta;
        for (id, origin) in &drag.origins {
            if let Some(scene) = self.graph.scenes.get_mut(id) {
                scene.position = *origin + delta;
            }
        }
    }

    /// Finish the drag with one history entry; false when nothing moved
    pub fn commit_drag(&mut self) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        if drag.delta == Vec2::ZERO {
            return false;
        }
        let next = self.graph.clone();
        self.commit(next, "move");
        true
    }

    /// Put the dragged scenes back where the drag started
    pub fn cancel_drag(&mut self) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        for (id, origin) in drag.origins {
            if let Some(scene) = self.graph.scenes.get_mut(&id) {
                scene.position = origin;
            }
        }
    }
}

/// Whether a new edge from `source` to `target` keeps zones consistent.
///
/// Groups connect to anything. An ungrouped scene connects to groups and to
/// other ungrouped scenes. A grouped scene connects only to scenes of its own
/// group. Self-edges and unknown endpoints are never allowed.
pub fn connection_allowed(graph: &StoryGraph, source: &NodeId, target: &NodeId) -> bool {
    if source == target || !graph.contains_node(target) {
        return false;
    }
    if graph.groups.contains_key(source) {
        return true;
    }
    if !graph.scenes.contains_key(source) {
        return false;
    }
    let target_is_group = graph.groups.contains_key(target);
    match graph.group_of(source) {
        None if target_is_group => true,
        None => graph.group_of(target).is_none(),
        Some(_) if target_is_group => false,
        Some(zone) => zone.contains(target),
    }
}
