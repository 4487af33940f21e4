//! Integration tests: pointer gestures driven through the board engine
//! (ib-editor ↔ ib-core ↔ ib-render).

use ib_core::config::BoardConfig;
use ib_core::id::ElementId;
use ib_core::model::*;
use ib_core::persist::{self, BoardStore, LEGACY_STROKES_KEY, MemoryStore};
use ib_core::stroke::EraseMode;
use ib_core::transform::Viewport;
use ib_editor::{BoardEngine, ShortcutAction, ToolKind};
use ib_render::DrawCmd;
use pretty_assertions::assert_eq;

fn make_engine() -> BoardEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    BoardEngine::new(BoardConfig::default(), Viewport::default())
}

/// Draw a straight horizontal stroke of `n` points spaced 10 apart.
fn draw_line(engine: &mut BoardEngine, y: f32, n: usize) {
    engine.set_tool(ToolKind::Draw);
    engine.pointer_down(0.0, y, None);
    for i in 1..n {
        engine.pointer_move(i as f32 * 10.0, y, None);
    }
    engine.pointer_up((n - 1) as f32 * 10.0, y);
}

// ─── Drawing ────────────────────────────────────────────────────────────

#[test]
fn pointer_leave_finalizes_stroke() {
    let mut engine = make_engine();
    engine.set_tool(ToolKind::Draw);
    engine.pointer_down(5.0, 5.0, None);
    engine.pointer_move(6.0, 6.0, None);
    engine.pointer_leave(6.0, 6.0);
    assert_eq!(engine.state.strokes.len(), 1);
    assert!(!engine.is_gesture_active());
}

#[test]
fn single_tap_keeps_a_dot() {
    let mut engine = make_engine();
    engine.set_tool(ToolKind::Draw);
    engine.pointer_down(5.0, 5.0, None);
    engine.pointer_up(5.0, 5.0);
    assert_eq!(engine.state.strokes[0].points.len(), 1);
}

#[test]
fn drawing_respects_camera() {
    let mut engine = make_engine();
    engine.set_zoom(0.5);
    engine.pan_by(100.0, 0.0);
    engine.set_tool(ToolKind::Draw);
    engine.pointer_down(150.0, 50.0, None);
    engine.pointer_up(150.0, 50.0);
    let p = engine.state.strokes[0].points[0];
    assert_eq!((p.x, p.y), (100.0, 100.0));
}

#[test]
fn live_stroke_shows_in_scene() {
    let mut engine = make_engine();
    engine.set_tool(ToolKind::Draw);
    engine.pointer_down(0.0, 0.0, None);
    engine.pointer_move(10.0, 0.0, None);
    assert!(matches!(engine.scene().as_slice(), [DrawCmd::Ink { .. }]));
    assert!(engine.state.strokes.is_empty());
    engine.pointer_up(10.0, 0.0);
}

// ─── Erasing ────────────────────────────────────────────────────────────

#[test]
fn whole_erase_removes_touched_strokes_in_one_commit() {
    let mut engine = make_engine();
    draw_line(&mut engine, 0.0, 5);
    draw_line(&mut engine, 200.0, 5);
    assert_eq!(engine.history().len(), 3);

    engine.set_tool(ToolKind::Erase);
    engine.set_eraser_radius(10.0);
    engine.pointer_down(20.0, 5.0, None);
    engine.pointer_move(20.0, 100.0, None);
    engine.pointer_move(20.0, 195.0, None);
    engine.pointer_up(20.0, 195.0);

    assert!(engine.state.strokes.is_empty());
    assert_eq!(engine.history().len(), 4);
}

#[test]
fn erase_hover_highlights_only() {
    let mut engine = make_engine();
    draw_line(&mut engine, 0.0, 3);
    let id = engine.state.strokes[0].id;

    engine.set_tool(ToolKind::Erase);
    engine.pointer_move(10.0, 4.0, None);
    assert_eq!(engine.overlay().erase_target, Some(id));
    assert_eq!(engine.state.strokes.len(), 1);

    engine.dispatch_action(ShortcutAction::Cancel);
    assert_eq!(engine.overlay().erase_target, None);
}

#[test]
fn trim_erase_splits_stroke() {
    let mut engine = make_engine();
    draw_line(&mut engine, 0.0, 5);
    let original = engine.state.strokes[0].id;

    engine.set_tool(ToolKind::Erase);
    engine.set_erase_mode(EraseMode::Trim);
    engine.set_eraser_radius(4.0);
    engine.pointer_down(20.0, 0.0, None);
    engine.pointer_up(20.0, 0.0);

    assert_eq!(engine.state.strokes.len(), 2);
    for stroke in &engine.state.strokes {
        assert_eq!(stroke.points.len(), 2);
        assert_ne!(stroke.id, original);
    }
}

#[test]
fn toggle_key_switches_erase_mode() {
    let mut engine = make_engine();
    assert_eq!(engine.erase_mode(), EraseMode::Whole);
    engine.handle_key("t", false, false, false, false);
    assert_eq!(engine.erase_mode(), EraseMode::Trim);
}

// ─── Connecting and grouping ────────────────────────────────────────────

#[test]
fn merging_groups_unifies_all_members() {
    let mut engine = make_engine();
    let a = engine.add_card(0.0, 0.0);
    let b = engine.add_card(300.0, 0.0);
    let c = engine.add_flow_node(FlowShape::Box, 0.0, 400.0);
    let d = engine.add_flow_node(FlowShape::Diamond, 300.0, 400.0);
    let e = engine.add_card(600.0, 400.0);

    // G1 = {a, b}, G2 = {c, d, e}
    engine.connect(AnchorRef::card(a), AnchorRef::card(b)).unwrap();
    engine.connect(AnchorRef::flow(c), AnchorRef::flow(d)).unwrap();
    engine.connect(AnchorRef::flow(d), AnchorRef::card(e)).unwrap();
    assert_eq!(engine.groups.len(), 2);
    let g1 = engine.state.card(a).unwrap().group_id.unwrap();

    engine.connect(AnchorRef::card(a), AnchorRef::flow(c)).unwrap();

    assert_eq!(engine.groups.len(), 1);
    let tags: Vec<Option<ElementId>> = engine
        .state
        .cards
        .iter()
        .map(|c| c.group_id)
        .chain(engine.state.flow_nodes.iter().map(|n| n.group_id))
        .chain(engine.state.edges.iter().map(|e| e.group_id))
        .collect();
    assert_eq!(tags.len(), 9);
    assert!(tags.iter().all(|t| *t == Some(g1)), "first argument wins");
}

#[test]
fn connecting_an_anchor_to_itself_is_ignored() {
    let mut engine = make_engine();
    let a = engine.add_card(0.0, 0.0);
    assert_eq!(engine.connect(AnchorRef::card(a), AnchorRef::card(a)), None);
    assert!(engine.groups.is_empty());
    assert_eq!(engine.history().len(), 2);
}

#[test]
fn delete_key_removes_selected_anchor_and_edges() {
    let mut engine = make_engine();
    let a = engine.add_card(0.0, 0.0);
    let b = engine.add_card(400.0, 0.0);
    engine.connect(AnchorRef::card(a), AnchorRef::card(b)).unwrap();

    engine.pointer_down(10.0, 10.0, None);
    engine.pointer_up(10.0, 10.0);
    assert_eq!(engine.selected(), Some(AnchorRef::card(a)));

    engine.handle_key("Delete", false, false, false, false);
    assert!(engine.state.card(a).is_none());
    assert!(engine.state.edges.is_empty());
    assert_eq!(engine.selected(), None);
}

// ─── Minimap ────────────────────────────────────────────────────────────

#[test]
fn minimap_click_guard() {
    let mut engine = make_engine();
    engine.add_card(1200.0, 600.0);
    let before = engine.camera.pan;

    // Far from every card and stroke.
    assert!(!engine.minimap_click(190.0, 5.0));
    assert_eq!(engine.camera.pan, before);

    // On the card: 1200 / 12 = 100, 600 / 12 = 50.
    assert!(engine.minimap_click(100.0, 50.0));
    assert_ne!(engine.camera.pan, before);
}

// ─── Persistence ────────────────────────────────────────────────────────

#[test]
fn load_falls_back_to_legacy_strokes() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut store = MemoryStore::new();
    store
        .set(
            LEGACY_STROKES_KEY,
            r##"[{"id":"old_ink","color":"#000000","width":2,"points":[{"x":1,"y":2},{"x":3,"y":4}]}]"##,
        )
        .unwrap();

    let engine = BoardEngine::load(&store, BoardConfig::default(), Viewport::default());
    assert_eq!(engine.state.strokes.len(), 1);
    assert_eq!(engine.state.strokes[0].points[0].pressure, DEFAULT_PRESSURE);
    assert_eq!(engine.history().len(), 1);
}

#[test]
fn malformed_store_yields_empty_board() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut store = MemoryStore::new();
    store.set(persist::BOARD_KEY, "][").unwrap();
    let engine = BoardEngine::load(&store, BoardConfig::default(), Viewport::default());
    assert!(engine.state.is_empty());
}

#[test]
fn saved_board_round_trips_with_view_and_colors() {
    let mut store = MemoryStore::new();
    let mut engine = make_engine();
    let a = engine.add_card(0.0, 0.0);
    let b = engine.add_card(400.0, 0.0);
    engine.connect(AnchorRef::card(a), AnchorRef::card(b)).unwrap();
    engine.zoom_in();
    engine.pan_by(-40.0, 25.0);
    assert!(engine.flush_to_store(&mut store).unwrap());

    let reloaded = BoardEngine::load(&store, BoardConfig::default(), Viewport::default());
    assert_eq!(reloaded.state, engine.state);
    assert_eq!(reloaded.groups, engine.groups);
    assert_eq!(reloaded.camera.pan, engine.camera.pan);
    assert_eq!(reloaded.camera.zoom(), 1.1);
}
