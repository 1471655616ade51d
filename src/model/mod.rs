//! Graph data model: scenes, groups and the choices connecting them
//!
//! This module handles:
//! - The scene / group / choice shapes and their identifiers
//! - Pure lookup queries (scene, group, group-of-scene, endpoint resolution)
//! - The group completion predicate used by playback
//! - Strict validation and lenient repair of whole graphs
//!
//! Nothing here has side effects beyond the value being built. The editor
//! session replaces whole `StoryGraph` snapshots; it never patches one that
//! is already recorded in history.

use egui::Pos2;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::GraphError;

pub mod module;

pub use module::*;

/// Identifier shared by scenes and groups; choice targets may name either.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh id with the given prefix (`scene`, `group`, ...)
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{prefix}_{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A labelled, directed edge stored on its source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub text: String,
    pub next_scene_id: NodeId,
}

impl Choice {
    pub fn new(text: impl Into<String>, target: NodeId) -> Self {
        Self {
            text: text.into(),
            next_scene_id: target,
        }
    }
}

/// A single narrative unit
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub id: NodeId,
    pub title: String,
    pub text: String,
    pub image_keyword: Option<String>,
    pub is_ending: bool,
    pub modules: Vec<ContentModule>,
    pub choices: Vec<Choice>,
    /// Top-left corner of the node footprint in canvas space
    pub position: Pos2,
}

impl Scene {
    pub fn new(id: NodeId, title: impl Into<String>, text: impl Into<String>, position: Pos2) -> Self {
        Self {
            id,
            title: title.into(),
            text: text.into(),
            image_keyword: None,
            is_ending: false,
            modules: Vec::new(),
            choices: Vec::new(),
            position,
        }
    }

    /// The scene every new or empty graph starts from
    pub fn opening() -> Self {
        let mut scene = Self::new(
            NodeId::from(START_SCENE_ID),
            "起始場景",
            "這是故事的開始...",
            Pos2::new(100.0, 100.0),
        );
        scene.image_keyword = Some("start".to_string());
        scene
    }
}

/// Id of the default opening scene; also the record's start scene
pub const START_SCENE_ID: &str = "start";

/// How a group decides it has been completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompletionMode {
    /// Every member scene must have been visited
    #[default]
    All,
    /// At least one member scene must have been visited
    Any,
}

/// A set of scenes sharing a completion rule and a set of outgoing choices
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: NodeId,
    pub title: String,
    pub mode: CompletionMode,
    pub scene_ids: Vec<NodeId>,
    pub color: Option<String>,
    pub choices: Vec<Choice>,
}

impl Group {
    pub fn new(id: NodeId, title: impl Into<String>, scene_ids: Vec<NodeId>) -> Self {
        Self {
            id,
            title: title.into(),
            mode: CompletionMode::All,
            scene_ids,
            color: None,
            choices: Vec::new(),
        }
    }

    pub fn contains(&self, scene_id: &NodeId) -> bool {
        self.scene_ids.contains(scene_id)
    }

    /// Whether the group's own choices become playable given the visited scenes
    pub fn is_complete(&self, visited: &HashSet<NodeId>) -> bool {
        let visited_count = self.scene_ids.iter().filter(|id| visited.contains(*id)).count();
        match self.mode {
            CompletionMode::All => visited_count == self.scene_ids.len(),
            CompletionMode::Any => visited_count >= 1,
        }
    }
}

/// Either end of a choice, resolved against the graph
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Endpoint<'a> {
    Scene(&'a Scene),
    Group(&'a Group),
}

impl<'a> Endpoint<'a> {
    pub fn id(&self) -> &'a NodeId {
        match self {
            Endpoint::Scene(scene) => &scene.id,
            Endpoint::Group(group) => &group.id,
        }
    }

    pub fn display_name(&self) -> &'a str {
        match self {
            Endpoint::Scene(scene) => &scene.title,
            Endpoint::Group(group) => &group.title,
        }
    }

    pub fn choices(&self) -> &'a [Choice] {
        match self {
            Endpoint::Scene(scene) => &scene.choices,
            Endpoint::Group(group) => &group.choices,
        }
    }
}

/// One full snapshot of the editable graph
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoryGraph {
    pub scenes: IndexMap<NodeId, Scene>,
    pub groups: IndexMap<NodeId, Group>,
}

impl StoryGraph {
    pub fn new(scenes: impl IntoIterator<Item = Scene>, groups: impl IntoIterator<Item = Group>) -> Self {
        Self {
            scenes: scenes.into_iter().map(|scene| (scene.id.clone(), scene)).collect(),
            groups: groups.into_iter().map(|group| (group.id.clone(), group)).collect(),
        }
    }

    /// A graph holding only the opening scene
    pub fn opening() -> Self {
        Self::new([Scene::opening()], [])
    }

    pub fn scene(&self, id: &NodeId) -> Option<&Scene> {
        self.scenes.get(id)
    }

    pub fn scene_mut(&mut self, id: &NodeId) -> Option<&mut Scene> {
        self.scenes.get_mut(id)
    }

    pub fn group(&self, id: &NodeId) -> Option<&Group> {
        self.groups.get(id)
    }

    pub fn group_mut(&mut self, id: &NodeId) -> Option<&mut Group> {
        self.groups.get_mut(id)
    }

    /// The group a scene belongs to, found by scanning member lists
    pub fn group_of(&self, scene_id: &NodeId) -> Option<&Group> {
        self.groups.values().find(|group| group.contains(scene_id))
    }

    pub fn endpoint(&self, id: &NodeId) -> Option<Endpoint<'_>> {
        if let Some(scene) = self.scenes.get(id) {
            return Some(Endpoint::Scene(scene));
        }
        self.groups.get(id).map(Endpoint::Group)
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.scenes.contains_key(id) || self.groups.contains_key(id)
    }

    /// Mutable access to the choice list of a scene or group
    pub fn choices_mut(&mut self, id: &NodeId) -> Option<&mut Vec<Choice>> {
        if let Some(scene) = self.scenes.get_mut(id) {
            return Some(&mut scene.choices);
        }
        self.groups.get_mut(id).map(|group| &mut group.choices)
    }

    /// Drop every choice (on scenes and groups) whose target is in `removed`
    pub fn prune_choices_to(&mut self, removed: &HashSet<NodeId>) -> usize {
        let mut pruned = 0;
        let lists = self
            .scenes
            .values_mut()
            .map(|scene| &mut scene.choices)
            .chain(self.groups.values_mut().map(|group| &mut group.choices));
        for choices in lists {
            let before = choices.len();
            choices.retain(|choice| !removed.contains(&choice.next_scene_id));
            pruned += before - choices.len();
        }
        pruned
    }

    /// Remove scenes and everything that referred to them.
    ///
    /// Groups left without members are removed too, and choices pointing at
    /// any removed scene or group are dropped. Returns the ids of the groups
    /// that were pruned.
    pub fn remove_scenes(&mut self, ids: &HashSet<NodeId>) -> Vec<NodeId> {
        self.scenes.retain(|id, _| !ids.contains(id));

        let mut pruned_groups = Vec::new();
        for group in self.groups.values_mut() {
            group.scene_ids.retain(|id| !ids.contains(id));
            if group.scene_ids.is_empty() {
                pruned_groups.push(group.id.clone());
            }
        }
        self.groups.retain(|_, group| !group.scene_ids.is_empty());

        let mut removed: HashSet<NodeId> = ids.clone();
        removed.extend(pruned_groups.iter().cloned());
        self.prune_choices_to(&removed);
        pruned_groups
    }

    /// Remove groups (not their members) and every choice pointing at them
    pub fn remove_groups(&mut self, ids: &HashSet<NodeId>) {
        self.groups.retain(|id, _| !ids.contains(id));
        self.prune_choices_to(ids);
    }

    /// Strict check of every structural invariant
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.scenes.is_empty() {
            return Err(GraphError::NoScenes);
        }
        for id in self.groups.keys() {
            if self.scenes.contains_key(id) {
                return Err(GraphError::DuplicateId(id.clone()));
            }
        }

        let mut owner: IndexMap<&NodeId, &NodeId> = IndexMap::new();
        for group in self.groups.values() {
            if group.scene_ids.is_empty() {
                return Err(GraphError::EmptyGroup(group.id.clone()));
            }
            for member in &group.scene_ids {
                if !self.scenes.contains_key(member) {
                    return Err(GraphError::MissingMember {
                        group: group.id.clone(),
                        scene: member.clone(),
                    });
                }
                if let Some(previous) = owner.insert(member, &group.id) {
                    if previous != &group.id {
                        return Err(GraphError::MultipleGroups(member.clone()));
                    }
                }
            }
        }

        let sources = self
            .scenes
            .values()
            .map(|scene| (&scene.id, &scene.choices))
            .chain(self.groups.values().map(|group| (&group.id, &group.choices)));
        for (source, choices) in sources {
            for choice in choices {
                if !self.contains_node(&choice.next_scene_id) {
                    return Err(GraphError::DanglingChoice {
                        origin: source.clone(),
                        target: choice.next_scene_id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Repair a loaded graph in place, returning the number of fixes applied.
    ///
    /// Drops missing and duplicated group members, empty groups and dangling
    /// choices. A scene claimed by several groups stays with the first one.
    pub fn sanitize(&mut self) -> usize {
        let mut repairs = 0;
        let mut claimed: HashSet<NodeId> = HashSet::new();
        for group in self.groups.values_mut() {
            let before = group.scene_ids.len();
            let scenes = &self.scenes;
            group
                .scene_ids
                .retain(|id| scenes.contains_key(id) && claimed.insert(id.clone()));
            repairs += before - group.scene_ids.len();
        }

        let before = self.groups.len();
        self.groups.retain(|_, group| !group.scene_ids.is_empty());
        repairs += before - self.groups.len();

        let known: HashSet<NodeId> = self.scenes.keys().chain(self.groups.keys()).cloned().collect();
        let lists = self
            .scenes
            .values_mut()
            .map(|scene| &mut scene.choices)
            .chain(self.groups.values_mut().map(|group| &mut group.choices));
        for choices in lists {
            let before = choices.len();
            choices.retain(|choice| known.contains(&choice.next_scene_id));
            repairs += before - choices.len();
        }
        repairs
    }
}
