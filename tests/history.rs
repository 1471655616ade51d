use bevy_storygraph_editor::geometry::Direction;
use bevy_storygraph_editor::{EditorConfig, EditorSession, NodeId, Scene, StoryGraph};
use egui::{Pos2, Vec2};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add(f32, f32),
    Relative(usize, usize),
    Connect(usize, usize),
    Delete(usize),
    Rename(usize, String),
    Drag(usize, f32, f32),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-800.0f32..800.0, -800.0f32..800.0).prop_map(|(x, y)| Op::Add(x, y)),
        (0usize..16, 0usize..4).prop_map(|(i, d)| Op::Relative(i, d)),
        (0usize..16, 0usize..16).prop_map(|(i, j)| Op::Connect(i, j)),
        (0usize..16).prop_map(Op::Delete),
        (0usize..16, "[a-z]{1,8}").prop_map(|(i, title)| Op::Rename(i, title)),
        (0usize..16, -300.0f32..300.0, -300.0f32..300.0).prop_map(|(i, dx, dy)| Op::Drag(i, dx, dy)),
    ]
}

fn pick(session: &EditorSession, index: usize) -> NodeId {
    let ids: Vec<&NodeId> = session.graph().scenes.keys().collect();
    ids[index % ids.len()].clone()
}

fn run(session: &mut EditorSession, op: &Op) {
    match op {
        Op::Add(x, y) => {
            session.add_scene_at(Pos2::new(*x, *y));
        }
        Op::Relative(i, d) => {
            let source = pick(session, *i);
            let _ = session.add_relative_scene(&source, Direction::ALL[*d % Direction::ALL.len()]);
        }
        Op::Connect(i, j) => {
            let (source, target) = (pick(session, *i), pick(session, *j));
            let _ = session.connect(&source, &target);
        }
        Op::Delete(i) => {
            let target = pick(session, *i);
            let _ = session.delete_scene(&target);
        }
        Op::Rename(i, title) => {
            let target = pick(session, *i);
            let _ = session.set_scene_title(&target, title.clone());
        }
        Op::Drag(i, dx, dy) => {
            let target = pick(session, *i);
            if session.begin_drag([&target]) {
                session.update_drag(Vec2::new(*dx, *dy));
                session.commit_drag();
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn undo_then_redo_walks_the_whole_timeline(ops in prop::collection::vec(op(), 1..40)) {
        let mut session = EditorSession::default();
        let initial = session.graph().clone();
        for op in &ops {
            run(&mut session, op);
        }
        let last = session.graph().clone();
        let committed = session.history().index();

        for _ in 0..committed {
            prop_assert!(session.undo());
        }
        prop_assert!(!session.undo());
        prop_assert_eq!(session.graph(), &initial);

        for _ in 0..committed {
            prop_assert!(session.redo());
        }
        prop_assert!(!session.redo());
        prop_assert_eq!(session.graph(), &last);
    }
}

#[test]
fn sixty_commits_keep_fifty_entries() {
    let mut session = EditorSession::default();
    for i in 0..60 {
        session.add_scene_at(Pos2::new(i as f32 * 1000.0, 0.0));
    }
    assert_eq!(session.history().len(), 50);

    let mut undos = 0;
    while session.undo() {
        undos += 1;
    }
    assert_eq!(undos, 49);
    assert_eq!(session.graph().scenes.len(), 12);
}

#[test]
fn committing_mid_timeline_discards_redo() {
    let mut session = EditorSession::default();
    for i in 0..10 {
        session.add_scene_at(Pos2::new(i as f32 * 1000.0, 2000.0));
    }
    for _ in 0..5 {
        session.undo();
    }
    assert_eq!(session.history().index(), 5);

    session.add_scene_at(Pos2::new(-5000.0, -5000.0));
    assert!(!session.can_redo());
    assert!(!session.redo());
    assert_eq!(session.history().len(), 7);
}

#[test]
fn undo_during_a_live_drag_restores_the_snapshot() {
    let a = Scene::new(NodeId::from("a"), "A", "", Pos2::ZERO);
    let b = Scene::new(NodeId::from("b"), "B", "", Pos2::new(500.0, 0.0));
    let mut session = EditorSession::with_graph(StoryGraph::new([a, b], []), EditorConfig::default());
    session.set_scene_title(&NodeId::from("b"), "Bee").expect("rename");

    assert!(session.begin_drag([&NodeId::from("a")]));
    session.update_drag(Vec2::new(40.0, 40.0));
    assert!(session.undo());
    assert!(!session.is_dragging());
    assert_eq!(session.scene(&NodeId::from("a")).map(|s| s.position), Some(Pos2::ZERO));
    assert_eq!(session.scene(&NodeId::from("b")).map(|s| s.title.as_str()), Some("B"));
}
