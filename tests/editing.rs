use std::collections::HashSet;

use bevy_storygraph_editor::geometry::Direction;
use bevy_storygraph_editor::{
    Choice, CompletionMode, EditorConfig, EditorError, EditorSession, Group, NodeId, Scene, StoryGraph, Tool,
};
use egui::Pos2;
use pretty_assertions::assert_eq;

fn id(raw: &str) -> NodeId {
    NodeId::from(raw)
}

fn zoned() -> EditorSession {
    let a = Scene::new(id("a"), "A", "", Pos2::new(0.0, 0.0));
    let b = Scene::new(id("b"), "B", "", Pos2::new(300.0, 0.0));
    let c = Scene::new(id("c"), "C", "", Pos2::new(0.0, 400.0));
    let group = Group::new(id("g"), "G", vec![id("a"), id("b")]);
    EditorSession::with_graph(StoryGraph::new([a, b, c], [group]), EditorConfig::default())
}

#[test]
fn opening_scene_to_completed_group() {
    let mut session = EditorSession::default();
    let s0 = id("start");
    assert_eq!(session.scene(&s0).map(|s| s.position), Some(Pos2::new(100.0, 100.0)));

    let s1 = session.add_relative_scene(&s0, Direction::Right).expect("relative scene");
    assert_eq!(session.scene(&s1).map(|s| s.position), Some(Pos2::new(350.0, 100.0)));

    session.set_tool(Tool::Connect);
    session.connect_click(s0.clone()).expect("arm source");
    session.connect_click(s1.clone()).expect("connect");
    let choices = &session.scene(&s0).expect("s0").choices;
    assert_eq!(choices.len(), 1);
    assert_eq!(choices[0].next_scene_id, s1);
    assert_eq!(session.tool(), Tool::Pointer);

    session.selection.select_only(s0.clone());
    session.selection.toggle(s1.clone());
    let group_id = session.group_selection().expect("group");
    session.rename_group(&group_id, "Group ALL").expect("rename");

    let group = session.graph().group(&group_id).expect("group exists").clone();
    assert_eq!(group.title, "Group ALL");
    assert_eq!(group.mode, CompletionMode::All);
    assert_eq!(group.scene_ids, vec![s0.clone(), s1.clone()]);

    let mut visited = HashSet::from([s0]);
    assert!(!group.is_complete(&visited));
    visited.insert(s1);
    assert!(group.is_complete(&visited));
}

#[test]
fn zone_rule_matrix() {
    let mut session = zoned();

    let refused = session.connect(&id("a"), &id("c"));
    assert!(matches!(refused, Err(EditorError::InvalidConnection { .. })));
    assert!(session.scene(&id("a")).expect("a").choices.is_empty());

    session.connect(&id("a"), &id("b")).expect("same group");
    assert!(session.connect(&id("c"), &id("a")).is_err());
    assert!(session.scene(&id("c")).expect("c").choices.is_empty());

    session.connect(&id("c"), &id("g")).expect("into group");
    assert_eq!(session.scene(&id("c")).expect("c").choices[0].text, "前往 G");

    session.connect(&id("g"), &id("c")).expect("group source");
    assert_eq!(session.graph().group(&id("g")).expect("g").choices.len(), 1);
}

#[test]
fn last_scene_survives_delete() {
    let mut session = EditorSession::default();
    assert_eq!(session.delete_scene(&id("start")), Err(EditorError::LastScene));
    assert_eq!(session.graph().scenes.len(), 1);
    assert!(!session.can_undo());
}

#[test]
fn emptied_group_is_pruned() {
    let mut session = zoned();
    session.delete_scene(&id("a")).expect("delete a");
    assert_eq!(session.graph().group(&id("g")).map(|g| g.scene_ids.len()), Some(1));
    session.delete_scene(&id("b")).expect("delete b");
    assert!(session.graph().groups.is_empty());
    assert_eq!(session.graph().scenes.len(), 1);
}

#[test]
fn deleting_a_target_prunes_choices_into_it() {
    let mut session = zoned();
    session.connect(&id("c"), &id("g")).expect("c -> g");
    session.connect(&id("a"), &id("b")).expect("a -> b");
    session.delete_group(&id("g")).expect("delete group");
    assert!(session.scene(&id("c")).expect("c").choices.is_empty());

    session.delete_scene(&id("b")).expect("delete b");
    assert!(session.scene(&id("a")).expect("a").choices.is_empty());
    assert!(session.graph().validate().is_ok());
}

#[test]
fn paste_remaps_internal_edges_and_keeps_external_ones() {
    let mut a = Scene::new(id("a"), "A", "", Pos2::new(0.0, 0.0));
    a.choices.push(Choice::new("to b", id("b")));
    let b = Scene::new(id("b"), "B", "", Pos2::new(600.0, 0.0));
    let mut session = EditorSession::with_graph(StoryGraph::new([a, b], []), EditorConfig::default());

    session.selection.select_only(id("a"));
    assert_eq!(session.copy(), 1);
    let pasted = session.paste();
    assert_eq!(pasted.len(), 1);
    let a_copy = session.scene(&pasted[0]).expect("pasted a");
    assert_ne!(a_copy.id, id("a"));
    assert_eq!(a_copy.position, Pos2::new(50.0, 50.0));
    assert_eq!(a_copy.choices[0].next_scene_id, id("b"));

    session.selection.select_only(id("a"));
    session.selection.toggle(id("b"));
    assert_eq!(session.copy(), 2);
    let pasted = session.paste();
    assert_eq!(pasted.len(), 2);
    let a2 = session.scene(&pasted[0]).expect("a'");
    assert_eq!(a2.title, "A");
    assert_eq!(a2.choices[0].next_scene_id, pasted[1]);
    assert_eq!(session.selection.scenes.len(), 2);
    assert!(pasted.iter().all(|p| session.selection.contains(p)));
}

#[test]
fn paste_is_one_history_entry() {
    let mut session = zoned();
    session.selection.select_only(id("a"));
    session.selection.toggle(id("c"));
    session.copy();
    let before = session.history().len();
    session.paste();
    assert_eq!(session.history().len(), before + 1);
    assert!(session.undo());
    assert_eq!(session.graph().scenes.len(), 3);
}

#[test]
fn empty_paste_is_a_no_op() {
    let mut session = zoned();
    assert!(session.paste().is_empty());
    assert_eq!(session.history().len(), 1);
}

#[test]
fn placing_on_an_occupied_spot_pushes_the_neighbour() {
    let existing = Scene::new(id("old"), "Old", "", Pos2::new(100.0, 100.0));
    let mut session = EditorSession::with_graph(StoryGraph::new([existing], []), EditorConfig::default());

    let placed = session.add_scene_at(Pos2::new(100.0, 100.0));
    assert_eq!(session.scene(&placed).map(|s| s.position), Some(Pos2::new(100.0, 100.0)));
    assert_eq!(session.scene(&id("old")).map(|s| s.position), Some(Pos2::new(280.0, 100.0)));
}

#[test]
fn overlap_push_follows_the_larger_axis() {
    let below = Scene::new(id("below"), "Below", "", Pos2::new(110.0, 150.0));
    let mut session = EditorSession::with_graph(StoryGraph::new([below], []), EditorConfig::default());

    session.add_scene_at(Pos2::new(100.0, 100.0));
    assert_eq!(session.scene(&id("below")).map(|s| s.position), Some(Pos2::new(110.0, 200.0)));
}

#[test]
fn regrouping_moves_scenes_and_prunes_the_old_group() {
    let mut session = zoned();
    let group = session.create_group([&id("a"), &id("b")]).expect("regroup");
    assert!(session.graph().group(&id("g")).is_none());
    assert_eq!(session.graph().group(&group).map(|g| g.scene_ids.len()), Some(2));
}

#[test]
fn replace_scene_keeps_position_and_drops_unresolved_choices() {
    let mut session = zoned();
    let mut edited = session.scene(&id("c")).expect("c").clone();
    edited.title = "Cellar".into();
    edited.position = Pos2::new(9999.0, 9999.0);
    edited.choices.push(Choice::new("to a", id("a")));
    edited.choices.push(Choice::new("nowhere", id("ghost")));

    session.replace_scene(edited).expect("replace");
    let c = session.scene(&id("c")).expect("c");
    assert_eq!(c.title, "Cellar");
    assert_eq!(c.position, Pos2::new(0.0, 400.0));
    assert_eq!(c.choices.len(), 1);
    assert!(session.is_dirty());
}
