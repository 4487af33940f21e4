//! Integration tests: snapshot history through the board engine.
//!
//! Commits come from discrete actions and from pointer gestures; undo and
//! redo restore whole snapshots and reconcile the group color table.

use ib_core::config::BoardConfig;
use ib_core::model::*;
use ib_core::transform::Viewport;
use ib_editor::{BoardEngine, ToolKind};
use pretty_assertions::assert_eq;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn make_engine() -> BoardEngine {
    init_logger();
    BoardEngine::new(BoardConfig::default(), Viewport::default())
}

// ─── Basic undo/redo ────────────────────────────────────────────────────

#[test]
fn undo_all_returns_to_bootstrap_and_redo_all_returns() {
    let mut engine = make_engine();
    let bootstrap = engine.state.clone();

    const N: usize = 7;
    for i in 0..N {
        engine.add_card(i as f32 * 300.0, 0.0);
    }
    let latest = engine.state.clone();

    for _ in 0..N {
        assert!(engine.undo());
    }
    assert_eq!(engine.state, bootstrap);
    assert!(!engine.undo(), "bootstrap is the floor");

    for _ in 0..N {
        assert!(engine.redo());
    }
    assert_eq!(engine.state, latest);
    assert!(!engine.redo());
}

#[test]
fn new_mutation_after_undo_clears_redo() {
    let mut engine = make_engine();
    engine.add_card(0.0, 0.0);
    engine.add_card(300.0, 0.0);
    engine.undo();
    assert!(engine.can_redo());

    engine.add_flow_node(FlowShape::Ellipse, 0.0, 400.0);
    assert!(!engine.can_redo());
    assert!(!engine.redo());
    assert_eq!(engine.state.cards.len(), 1);
    assert_eq!(engine.state.flow_nodes.len(), 1);
}

#[test]
fn undo_restores_stroke_gesture_as_one_step() {
    let mut engine = make_engine();
    engine.set_tool(ToolKind::Draw);
    engine.pointer_down(0.0, 0.0, Some(0.9));
    for i in 1..30 {
        engine.pointer_move(i as f32, i as f32, Some(0.9));
    }
    engine.pointer_up(30.0, 30.0);
    assert_eq!(engine.state.strokes.len(), 1);
    assert_eq!(engine.history().len(), 2);

    engine.undo();
    assert!(engine.state.strokes.is_empty());
    engine.redo();
    assert_eq!(engine.state.strokes[0].points.len(), 30);
}

// ─── History cap ────────────────────────────────────────────────────────

#[test]
fn sixty_commits_keep_fifty_snapshots() {
    let mut engine = make_engine();
    for i in 0..60 {
        engine.add_card(i as f32 * 10.0, 0.0);
    }
    assert_eq!(engine.history().len(), 50);

    let mut undos = 0;
    while engine.undo() {
        undos += 1;
    }
    assert_eq!(undos, 49);
    // The oldest surviving snapshot is the one after the 11th commit.
    assert_eq!(engine.state.cards.len(), 11);
}

#[test]
fn history_limit_comes_from_config() {
    init_logger();
    let config = BoardConfig {
        history_limit: 5,
        ..BoardConfig::default()
    };
    let mut engine = BoardEngine::new(config, Viewport::default());
    for i in 0..10 {
        engine.add_card(i as f32, 0.0);
    }
    assert_eq!(engine.history().len(), 5);
}

// ─── Group colors across restores ───────────────────────────────────────

#[test]
fn undoing_a_connection_prunes_its_color() {
    let mut engine = make_engine();
    let a = engine.add_card(0.0, 0.0);
    let b = engine.add_card(400.0, 0.0);
    engine.connect(AnchorRef::card(a), AnchorRef::card(b)).unwrap();
    assert_eq!(engine.groups.len(), 1);

    engine.undo();
    assert!(engine.state.edges.is_empty());
    assert!(engine.groups.is_empty());

    engine.redo();
    let group = engine.state.card(a).unwrap().group_id.unwrap();
    assert_eq!(
        engine.groups.color(group),
        Some(engine.config().palette[0]),
        "redo brings back the original color"
    );
}

#[test]
fn undoing_a_merge_restores_both_colors() {
    let mut engine = make_engine();
    let a = engine.add_card(0.0, 0.0);
    let b = engine.add_card(300.0, 0.0);
    let c = engine.add_card(0.0, 300.0);
    let d = engine.add_card(300.0, 300.0);
    engine.connect(AnchorRef::card(a), AnchorRef::card(b)).unwrap();
    engine.connect(AnchorRef::card(c), AnchorRef::card(d)).unwrap();
    let g1 = engine.state.card(a).unwrap().group_id.unwrap();
    let g2 = engine.state.card(c).unwrap().group_id.unwrap();
    let colors_before = engine.groups.clone();

    engine.connect(AnchorRef::card(a), AnchorRef::card(c)).unwrap();
    assert_eq!(engine.groups.color(g2), None);

    assert!(engine.undo());
    assert_eq!(engine.state.card(c).unwrap().group_id, Some(g2));
    assert_eq!(engine.groups.color(g1), colors_before.color(g1));
    assert_eq!(engine.groups.color(g2), colors_before.color(g2));
    assert_eq!(engine.groups, colors_before);
}

#[test]
fn undoing_a_clear_restores_group_color() {
    let mut engine = make_engine();
    let a = engine.add_card(0.0, 0.0);
    let b = engine.add_card(300.0, 0.0);
    engine.connect(AnchorRef::card(a), AnchorRef::card(b)).unwrap();
    let group = engine.state.card(a).unwrap().group_id.unwrap();
    let color = engine.groups.color(group);

    assert!(engine.clear_board(true));
    assert!(engine.groups.is_empty());

    assert!(engine.undo());
    assert_eq!(engine.groups.color(group), color);
    assert_eq!(engine.groups.cursor(), 1);
}

#[test]
fn undoing_a_color_cycle_restores_previous_color() {
    let mut engine = make_engine();
    let a = engine.add_card(0.0, 0.0);
    let b = engine.add_card(300.0, 0.0);
    engine.connect(AnchorRef::card(a), AnchorRef::card(b)).unwrap();
    let group = engine.state.card(a).unwrap().group_id.unwrap();
    let color = engine.groups.color(group);

    assert!(engine.cycle_group_color(group));
    assert_ne!(engine.groups.color(group), color);
    assert!(engine.undo());
    assert_eq!(engine.groups.color(group), color);
    assert!(engine.redo());
    assert_ne!(engine.groups.color(group), color);
}

#[test]
fn undoing_a_delete_restores_edges() {
    let mut engine = make_engine();
    let a = engine.add_card(0.0, 0.0);
    let f = engine.add_flow_node(FlowShape::Diamond, 400.0, 0.0);
    engine.connect(AnchorRef::card(a), AnchorRef::flow(f)).unwrap();

    assert!(engine.delete_anchor(AnchorRef::flow(f)));
    assert!(engine.state.edges.is_empty());
    // The card still carries the tag, so the color survives.
    assert_eq!(engine.groups.len(), 1);

    engine.undo();
    assert_eq!(engine.state.edges.len(), 1);
    assert!(engine.state.flow_node(f).is_some());
}
