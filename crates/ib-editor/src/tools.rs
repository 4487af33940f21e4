//! Tool system for board interactions.
//!
//! Each tool translates pointer events into `BoardMutation`s that the
//! `BoardEngine` applies. Tools own only their transient gesture state
//! (the stroke being drawn, a drag record, a pending connection); the
//! board itself is read through `ToolContext`.

use crate::engine::BoardMutation;
use crate::input::InputEvent;
use ib_core::id::ElementId;
use ib_core::model::*;
use ib_core::stroke::{EraseMode, StrokeBuilder, erase_target};
use ib_core::transform::Camera;
use ib_render::Hit;

/// The active tool determines how pointer events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolKind {
    #[default]
    Move,
    Draw,
    Erase,
    Connect,
}

/// Read-only view of the board handed to a tool with each event.
pub struct ToolContext<'a> {
    pub state: &'a BoardState,
    pub camera: &'a Camera,
    /// What lies under the pointer, in world space.
    pub hit: Option<Hit>,
}

impl ToolContext<'_> {
    fn world(&self, event: &InputEvent) -> (f32, f32) {
        let (x, y) = event.position();
        self.camera.to_world(x, y)
    }

    /// The anchor under the pointer, treating a resize handle as its node.
    fn hit_anchor(&self) -> Option<AnchorRef> {
        match self.hit? {
            Hit::Anchor(anchor) => Some(anchor),
            Hit::ResizeHandle(id) => Some(AnchorRef::flow(id)),
        }
    }
}

/// Trait for tools that handle input and produce mutations.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    /// Handle an input event, returning zero or more mutations.
    fn handle(&mut self, event: &InputEvent, ctx: &ToolContext) -> Vec<BoardMutation>;
}

// ─── Move Tool ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct DragRecord {
    anchor: AnchorRef,
    last_x: f32,
    last_y: f32,
}

/// Start of a flow node resize, in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeRecord {
    pub id: ElementId,
    pub start_x: f32,
    pub start_y: f32,
    pub width: f32,
    pub height: f32,
}

/// Drags anchors, resizes flow nodes by their handle, and pans the
/// camera when pressed on empty space.
#[derive(Debug, Default)]
pub struct MoveTool {
    /// Last pressed anchor; target of delete and color cycling.
    pub selected: Option<AnchorRef>,
    drag: Option<DragRecord>,
    resize: Option<ResizeRecord>,
    pan: Option<(f32, f32)>,
}

impl MoveTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.drag.is_some() || self.resize.is_some() || self.pan.is_some()
    }

    pub fn resize_record(&self) -> Option<&ResizeRecord> {
        self.resize.as_ref()
    }
}

impl Tool for MoveTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Move
    }

    fn handle(&mut self, event: &InputEvent, ctx: &ToolContext) -> Vec<BoardMutation> {
        let (sx, sy) = event.position();
        match event {
            InputEvent::PointerDown { .. } => {
                match ctx.hit {
                    Some(Hit::ResizeHandle(id)) => {
                        self.selected = Some(AnchorRef::flow(id));
                        self.resize = ctx.state.flow_node(id).map(|node| ResizeRecord {
                            id,
                            start_x: sx,
                            start_y: sy,
                            width: node.width,
                            height: node.height,
                        });
                    }
                    Some(Hit::Anchor(anchor)) => {
                        self.selected = Some(anchor);
                        self.drag = Some(DragRecord {
                            anchor,
                            last_x: sx,
                            last_y: sy,
                        });
                    }
                    None => {
                        self.selected = None;
                        self.pan = Some((sx, sy));
                    }
                }
                vec![]
            }
            InputEvent::PointerMove { .. } => {
                let zoom = ctx.camera.zoom();
                if let Some(r) = &self.resize {
                    return vec![BoardMutation::ResizeFlow {
                        id: r.id,
                        width: r.width + (sx - r.start_x) / zoom,
                        height: r.height + (sy - r.start_y) / zoom,
                    }];
                }
                if let Some(drag) = &mut self.drag {
                    let dx = (sx - drag.last_x) / zoom;
                    let dy = (sy - drag.last_y) / zoom;
                    drag.last_x = sx;
                    drag.last_y = sy;
                    return vec![BoardMutation::MoveAnchor {
                        anchor: drag.anchor,
                        dx,
                        dy,
                    }];
                }
                if let Some((lx, ly)) = self.pan.replace((sx, sy)) {
                    return vec![BoardMutation::Pan {
                        dx: sx - lx,
                        dy: sy - ly,
                    }];
                }
                vec![]
            }
            _ => {
                self.drag = None;
                self.resize = None;
                self.pan = None;
                vec![]
            }
        }
    }
}

// ─── Draw Tool (freehand) ────────────────────────────────────────────────

/// Builds one ink stroke per press; commits it on release.
#[derive(Debug)]
pub struct DrawTool {
    pub color: Color,
    pub width: f32,
    building: Option<StrokeBuilder>,
}

impl DrawTool {
    pub fn new(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            building: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.building.is_some()
    }

    /// The uncommitted stroke, for rendering.
    pub fn preview(&self) -> Option<Stroke> {
        self.building.as_ref().map(StrokeBuilder::preview)
    }
}

impl Tool for DrawTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Draw
    }

    fn handle(&mut self, event: &InputEvent, ctx: &ToolContext) -> Vec<BoardMutation> {
        let (wx, wy) = ctx.world(event);
        match event {
            InputEvent::PointerDown { pressure, .. } => {
                self.building = Some(StrokeBuilder::begin(
                    ElementId::fresh("stroke"),
                    self.color,
                    self.width,
                    Point::with_pressure(wx, wy, *pressure),
                ));
                vec![]
            }
            InputEvent::PointerMove { pressure, .. } => {
                if let Some(builder) = &mut self.building {
                    builder.extend(Point::with_pressure(wx, wy, *pressure));
                }
                vec![]
            }
            _ => match self.building.take() {
                Some(builder) => vec![BoardMutation::CommitStroke(builder.finish())],
                None => vec![],
            },
        }
    }
}

// ─── Erase Tool ──────────────────────────────────────────────────────────

/// Erases continuously while pressed. Both modes share one radius.
#[derive(Debug)]
pub struct EraseTool {
    pub mode: EraseMode,
    pub radius: f32,
    active: bool,
    cursor: Option<(f32, f32)>,
    /// Stroke a whole-mode erase would remove here (hover only).
    highlight: Option<ElementId>,
}

impl EraseTool {
    pub fn new(radius: f32) -> Self {
        Self {
            mode: EraseMode::default(),
            radius,
            active: false,
            cursor: None,
            highlight: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Eraser outline as world `(x, y, radius)`.
    pub fn cursor(&self) -> Option<(f32, f32, f32)> {
        self.cursor.map(|(x, y)| (x, y, self.radius))
    }

    pub fn highlight(&self) -> Option<ElementId> {
        self.highlight
    }

    /// Drop the hover cursor and highlight.
    pub fn clear_hover(&mut self) {
        self.cursor = None;
        self.highlight = None;
    }

    fn erase(&self, x: f32, y: f32) -> BoardMutation {
        BoardMutation::Erase {
            x,
            y,
            radius: self.radius,
            mode: self.mode,
        }
    }
}

impl Tool for EraseTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Erase
    }

    fn handle(&mut self, event: &InputEvent, ctx: &ToolContext) -> Vec<BoardMutation> {
        let (wx, wy) = ctx.world(event);
        match event {
            InputEvent::PointerDown { .. } => {
                self.active = true;
                self.cursor = Some((wx, wy));
                self.highlight = None;
                vec![self.erase(wx, wy)]
            }
            InputEvent::PointerMove { .. } => {
                self.cursor = Some((wx, wy));
                if self.active {
                    return vec![self.erase(wx, wy)];
                }
                self.highlight = match self.mode {
                    EraseMode::Whole => erase_target(&ctx.state.strokes, wx, wy, self.radius),
                    EraseMode::Trim => None,
                };
                vec![]
            }
            InputEvent::PointerLeave { .. } => {
                self.active = false;
                self.clear_hover();
                vec![]
            }
            _ => {
                self.active = false;
                vec![]
            }
        }
    }
}

// ─── Connect Tool ────────────────────────────────────────────────────────

/// Click one anchor, then another, to link them.
#[derive(Debug, Default)]
pub struct ConnectTool {
    pending: Option<AnchorRef>,
    cursor: (f32, f32),
    hovered: Option<AnchorRef>,
}

impl ConnectTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Origin of the connection in progress.
    pub fn pending(&self) -> Option<AnchorRef> {
        self.pending
    }

    /// Origin plus live cursor, for the elastic line.
    pub fn elastic(&self) -> Option<(AnchorRef, (f32, f32))> {
        self.pending.map(|a| (a, self.cursor))
    }

    pub fn hovered(&self) -> Option<AnchorRef> {
        self.hovered
    }

    pub fn cancel(&mut self) {
        self.pending = None;
        self.hovered = None;
    }
}

impl Tool for ConnectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Connect
    }

    fn handle(&mut self, event: &InputEvent, ctx: &ToolContext) -> Vec<BoardMutation> {
        match event {
            InputEvent::PointerDown { .. } => {
                let Some(target) = ctx.hit_anchor() else {
                    return vec![];
                };
                match self.pending.take() {
                    None => {
                        self.pending = Some(target);
                        self.cursor = ctx.world(event);
                        vec![]
                    }
                    Some(origin) => {
                        self.hovered = None;
                        if origin == target {
                            return vec![];
                        }
                        vec![BoardMutation::Connect {
                            from: origin,
                            to: target,
                        }]
                    }
                }
            }
            InputEvent::PointerMove { .. } => {
                self.cursor = ctx.world(event);
                // Only a pending connection highlights its candidate target.
                self.hovered = self.pending.and(ctx.hit_anchor());
                vec![]
            }
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn down(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerDown {
            x,
            y,
            pressure: None,
        }
    }

    fn moved(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerMove {
            x,
            y,
            pressure: None,
        }
    }

    fn up(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerUp { x, y }
    }

    fn ctx<'a>(state: &'a BoardState, camera: &'a Camera, hit: Option<Hit>) -> ToolContext<'a> {
        ToolContext { state, camera, hit }
    }

    #[test]
    fn move_tool_drag_divides_by_zoom() {
        let state = BoardState::new();
        let mut camera = Camera::new(0.5, 1.8);
        camera.set_zoom(1.25);
        let card = AnchorRef::card(ElementId::intern("drag_card"));
        let mut tool = MoveTool::new();

        let m = tool.handle(&down(100.0, 100.0), &ctx(&state, &camera, Some(Hit::Anchor(card))));
        assert!(m.is_empty());
        assert_eq!(tool.selected, Some(card));

        let m = tool.handle(&moved(112.5, 106.25), &ctx(&state, &camera, None));
        assert_eq!(
            m,
            vec![BoardMutation::MoveAnchor {
                anchor: card,
                dx: 10.0,
                dy: 5.0
            }]
        );

        tool.handle(&up(112.5, 106.25), &ctx(&state, &camera, None));
        assert!(!tool.is_active());
        assert!(tool.handle(&moved(200.0, 200.0), &ctx(&state, &camera, None)).is_empty());
    }

    #[test]
    fn move_tool_resize_tracks_start_record() {
        let mut state = BoardState::new();
        let id = ElementId::intern("resize_node");
        state
            .flow_nodes
            .push(FlowNode::new(id, FlowShape::Box, 0.0, 0.0, 160.0, 96.0));
        let mut camera = Camera::new(0.5, 1.8);
        camera.set_zoom(0.5);
        let mut tool = MoveTool::new();

        tool.handle(&down(80.0, 48.0), &ctx(&state, &camera, Some(Hit::ResizeHandle(id))));
        assert_eq!(tool.resize_record().map(|r| r.width), Some(160.0));

        let m = tool.handle(&moved(90.0, 38.0), &ctx(&state, &camera, None));
        assert_eq!(
            m,
            vec![BoardMutation::ResizeFlow {
                id,
                width: 180.0,
                height: 76.0
            }]
        );
    }

    #[test]
    fn move_tool_pans_on_empty_space() {
        let state = BoardState::new();
        let camera = Camera::new(0.5, 1.8);
        let mut tool = MoveTool::new();
        tool.handle(&down(10.0, 10.0), &ctx(&state, &camera, None));
        assert_eq!(tool.selected, None);
        let m = tool.handle(&moved(25.0, 5.0), &ctx(&state, &camera, None));
        assert_eq!(m, vec![BoardMutation::Pan { dx: 15.0, dy: -5.0 }]);
    }

    #[test]
    fn draw_tool_commits_on_release() {
        let state = BoardState::new();
        let camera = Camera::new(0.5, 1.8);
        let mut tool = DrawTool::new(Color::rgba(0.0, 0.0, 0.0, 1.0), 3.0);

        tool.handle(&down(0.0, 0.0), &ctx(&state, &camera, None));
        tool.handle(&moved(5.0, 0.0), &ctx(&state, &camera, None));
        assert_eq!(tool.preview().map(|s| s.points.len()), Some(2));

        let m = tool.handle(
            &InputEvent::PointerLeave { x: 5.0, y: 0.0 },
            &ctx(&state, &camera, None),
        );
        let [BoardMutation::CommitStroke(stroke)] = m.as_slice() else {
            panic!("expected one committed stroke, got {m:?}");
        };
        assert_eq!(stroke.points.len(), 2);
        assert_eq!(stroke.points[0].pressure, DEFAULT_PRESSURE);
        assert!(!tool.is_active());
    }

    #[test]
    fn erase_tool_hover_highlights_without_mutating() {
        let mut state = BoardState::new();
        state.strokes.push(Stroke::new(
            ElementId::intern("hover_ink"),
            Color::rgba(0.0, 0.0, 0.0, 1.0),
            2.0,
            vec![Point::new(0.0, 0.0)],
        ));
        let camera = Camera::new(0.5, 1.8);
        let mut tool = EraseTool::new(10.0);

        let m = tool.handle(&moved(5.0, 0.0), &ctx(&state, &camera, None));
        assert!(m.is_empty());
        assert_eq!(tool.highlight(), Some(ElementId::intern("hover_ink")));

        let m = tool.handle(&down(5.0, 0.0), &ctx(&state, &camera, None));
        assert_eq!(m.len(), 1);
        let m = tool.handle(&moved(6.0, 0.0), &ctx(&state, &camera, None));
        assert_eq!(m.len(), 1);
        tool.handle(&up(6.0, 0.0), &ctx(&state, &camera, None));
        assert!(!tool.is_active());
    }

    #[test]
    fn connect_tool_state_machine() {
        let state = BoardState::new();
        let camera = Camera::new(0.5, 1.8);
        let a = AnchorRef::card(ElementId::intern("conn_a"));
        let b = AnchorRef::flow(ElementId::intern("conn_b"));
        let mut tool = ConnectTool::new();

        // Empty space does nothing while idle.
        assert!(tool.handle(&down(0.0, 0.0), &ctx(&state, &camera, None)).is_empty());
        assert_eq!(tool.pending(), None);

        // Idle hovering highlights nothing.
        tool.handle(&moved(1.0, 1.0), &ctx(&state, &camera, Some(Hit::Anchor(a))));
        assert_eq!(tool.hovered(), None);

        tool.handle(&down(1.0, 1.0), &ctx(&state, &camera, Some(Hit::Anchor(a))));
        assert_eq!(tool.pending(), Some(a));

        tool.handle(&moved(50.0, 60.0), &ctx(&state, &camera, Some(Hit::Anchor(b))));
        assert_eq!(tool.elastic(), Some((a, (50.0, 60.0))));
        assert_eq!(tool.hovered(), Some(b));

        let m = tool.handle(&down(50.0, 60.0), &ctx(&state, &camera, Some(Hit::Anchor(b))));
        assert_eq!(m, vec![BoardMutation::Connect { from: a, to: b }]);
        assert_eq!(tool.pending(), None);
        assert_eq!(tool.hovered(), None);
    }

    #[test]
    fn connect_tool_same_anchor_cancels() {
        let state = BoardState::new();
        let camera = Camera::new(0.5, 1.8);
        let a = AnchorRef::card(ElementId::intern("conn_same"));
        let mut tool = ConnectTool::new();
        tool.handle(&down(1.0, 1.0), &ctx(&state, &camera, Some(Hit::Anchor(a))));
        tool.handle(&moved(2.0, 2.0), &ctx(&state, &camera, Some(Hit::Anchor(a))));
        assert_eq!(tool.hovered(), Some(a));
        let m = tool.handle(&down(2.0, 2.0), &ctx(&state, &camera, Some(Hit::Anchor(a))));
        assert!(m.is_empty());
        assert_eq!(tool.pending(), None);
        assert_eq!(tool.hovered(), None);
    }
}
