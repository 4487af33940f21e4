//! Board engine: the single owner of board state.
//!
//! Pointer events are routed to the active tool, which answers with
//! `BoardMutation`s. Mutations apply live; the history only sees the
//! result once the gesture ends (pointer up, cancel, or leave), so a drag
//! across a hundred frames is one undo step. Discrete actions (add a card,
//! delete an anchor, connect) commit immediately unless a gesture is in
//! flight, in which case they fold into its commit.
//!
//! The store is written only from `flush_to_store`, and only between
//! gestures, once per committed change.

use crate::commands::{History, Snapshot};
use crate::input::InputEvent;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::tools::{ConnectTool, DrawTool, EraseTool, MoveTool, Tool, ToolContext, ToolKind};
use ib_core::config::BoardConfig;
use ib_core::graph;
use ib_core::group::GroupTable;
use ib_core::id::ElementId;
use ib_core::lint::{LintSeverity, lint_board};
use ib_core::minimap::{Minimap, MinimapLayout};
use ib_core::model::*;
use ib_core::persist::{self, BoardDocument, BoardStore, PersistError};
use ib_core::stroke::{self, EraseMode};
use ib_core::transform::{Camera, Viewport};
use ib_render::{DrawCmd, SceneOverlay, build_scene, hit_test};

/// A change to the board, produced by tools or discrete actions.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardMutation {
    CommitStroke(Stroke),
    Erase {
        x: f32,
        y: f32,
        radius: f32,
        mode: EraseMode,
    },
    MoveAnchor {
        anchor: AnchorRef,
        dx: f32,
        dy: f32,
    },
    /// Set a flow node's size; the engine applies the minimum.
    ResizeFlow {
        id: ElementId,
        width: f32,
        height: f32,
    },
    Connect {
        from: AnchorRef,
        to: AnchorRef,
    },
    /// Camera pan in screen pixels.
    Pan {
        dx: f32,
        dy: f32,
    },
    AddCard(Box<Card>),
    UpdateCard {
        id: ElementId,
        title: String,
        content: String,
        media_url: Option<String>,
    },
    SetCardDoodle {
        id: ElementId,
        doodle: Option<Vec<Stroke>>,
    },
    AddFlowNode(FlowNode),
    SetFlowText {
        id: ElementId,
        text: String,
    },
    SetFlowShape {
        id: ElementId,
        shape: FlowShape,
    },
    SetEdgeLabel {
        id: ElementId,
        label: Option<String>,
    },
    DeleteAnchor(AnchorRef),
    DeleteEdge(ElementId),
    CycleGroupColor(ElementId),
    /// Remove every entity and group color.
    Clear,
}

pub struct BoardEngine {
    /// The live board (single source of truth).
    pub state: BoardState,
    /// Group colors and palette cursor.
    pub groups: GroupTable,
    pub camera: Camera,
    pub viewport: Viewport,
    config: BoardConfig,
    minimap: Minimap,
    history: History,

    tool: ToolKind,
    move_tool: MoveTool,
    draw_tool: DrawTool,
    erase_tool: EraseTool,
    connect_tool: ConnectTool,

    /// A pointer is down and its gesture has not ended.
    gesture_active: bool,
    /// Board state changed since the last commit.
    gesture_dirty: bool,
    /// The persisted document is stale.
    doc_dirty: bool,
    last_pointer: (f32, f32),
}

impl BoardEngine {
    /// An empty board.
    pub fn new(config: BoardConfig, viewport: Viewport) -> Self {
        Self::from_document(BoardDocument::default(), config, viewport)
    }

    /// Build an engine around a loaded document. The group table is
    /// reconciled with the entities and the history is bootstrapped with
    /// exactly one snapshot.
    pub fn from_document(doc: BoardDocument, config: BoardConfig, viewport: Viewport) -> Self {
        let config = config.normalized();
        let (state, mut groups, pan, zoom) = doc.into_parts();

        for diag in lint_board(&state, &groups) {
            match diag.severity {
                LintSeverity::Warning => log::warn!("[{}] {}", diag.rule, diag.message),
                LintSeverity::Info => log::info!("[{}] {}", diag.rule, diag.message),
            }
        }
        groups.reconcile(&state, &config.palette);

        let mut camera = Camera::new(config.zoom_min, config.zoom_max);
        camera.pan = pan;
        camera.set_zoom(zoom);

        log::debug!(
            "board loaded: {} cards, {} flow nodes, {} edges, {} strokes",
            state.cards.len(),
            state.flow_nodes.len(),
            state.edges.len(),
            state.strokes.len()
        );

        Self {
            history: History::new(
                config.history_limit,
                Snapshot::new(state.clone(), groups.clone()),
            ),
            minimap: Minimap::new(&config),
            move_tool: MoveTool::new(),
            draw_tool: DrawTool::new(config.stroke_color, config.stroke_width),
            erase_tool: EraseTool::new(config.eraser_radius),
            connect_tool: ConnectTool::new(),
            tool: ToolKind::default(),
            state,
            groups,
            camera,
            viewport,
            config,
            gesture_active: false,
            gesture_dirty: false,
            doc_dirty: false,
            last_pointer: (0.0, 0.0),
        }
    }

    /// Load from a store. Absent or malformed data yields an empty board.
    pub fn load(store: &dyn BoardStore, config: BoardConfig, viewport: Viewport) -> Self {
        let doc = persist::load(store).unwrap_or_else(|| {
            log::info!("no saved board; starting empty");
            BoardDocument::default()
        });
        Self::from_document(doc, config, viewport)
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// The anchor last pressed with the move tool.
    pub fn selected(&self) -> Option<AnchorRef> {
        self.move_tool.selected
    }

    pub fn select(&mut self, anchor: Option<AnchorRef>) {
        self.move_tool.selected = anchor.filter(|a| graph::resolve_anchor(&self.state, a).is_some());
    }

    pub fn pending_connection(&self) -> Option<AnchorRef> {
        self.connect_tool.pending()
    }

    pub fn erase_mode(&self) -> EraseMode {
        self.erase_tool.mode
    }

    pub fn eraser_radius(&self) -> f32 {
        self.erase_tool.radius
    }

    pub fn is_gesture_active(&self) -> bool {
        self.gesture_active
    }

    /// True if the stored document is behind the live board.
    pub fn has_unsaved_changes(&self) -> bool {
        self.doc_dirty
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ─── Tool settings ───────────────────────────────────────────────────

    /// Switch tools. Any gesture in flight is finalized first.
    pub fn set_tool(&mut self, kind: ToolKind) {
        if kind == self.tool {
            return;
        }
        self.cancel_gesture();
        self.connect_tool.cancel();
        self.erase_tool.clear_hover();
        log::debug!("tool {:?} → {:?}", self.tool, kind);
        self.tool = kind;
    }

    pub fn set_erase_mode(&mut self, mode: EraseMode) {
        self.erase_tool.mode = mode;
        self.erase_tool.clear_hover();
    }

    pub fn toggle_erase_mode(&mut self) -> EraseMode {
        self.set_erase_mode(self.erase_tool.mode.toggled());
        self.erase_tool.mode
    }

    /// Set the shared eraser radius, clamped to the configured range.
    pub fn set_eraser_radius(&mut self, radius: f32) -> f32 {
        self.erase_tool.radius = self.config.clamp_eraser_radius(radius);
        self.erase_tool.radius
    }

    pub fn set_stroke_style(&mut self, color: Color, width: f32) {
        self.draw_tool.color = color;
        if width.is_finite() && width > 0.0 {
            self.draw_tool.width = width;
        }
    }

    // ─── Pointer routing ─────────────────────────────────────────────────

    pub fn pointer_down(&mut self, x: f32, y: f32, pressure: Option<f32>) -> bool {
        self.dispatch(InputEvent::PointerDown { x, y, pressure })
    }

    pub fn pointer_move(&mut self, x: f32, y: f32, pressure: Option<f32>) -> bool {
        self.dispatch(InputEvent::PointerMove { x, y, pressure })
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) -> bool {
        self.dispatch(InputEvent::PointerUp { x, y })
    }

    pub fn pointer_cancel(&mut self, x: f32, y: f32) -> bool {
        self.dispatch(InputEvent::PointerCancel { x, y })
    }

    pub fn pointer_leave(&mut self, x: f32, y: f32) -> bool {
        self.dispatch(InputEvent::PointerLeave { x, y })
    }

    /// Route one event through the active tool. Returns true if the board
    /// or camera changed.
    pub fn dispatch(&mut self, event: InputEvent) -> bool {
        if matches!(event, InputEvent::PointerDown { .. }) {
            if self.gesture_active {
                // A press without a matching release; close the old gesture.
                self.end_gesture();
            }
            self.gesture_active = true;
        }
        self.last_pointer = event.position();

        let (sx, sy) = event.position();
        let (wx, wy) = self.camera.to_world(sx, sy);
        let ctx = ToolContext {
            state: &self.state,
            camera: &self.camera,
            hit: hit_test(&self.state, wx, wy, self.config.resize_handle_size),
        };
        let tool: &mut dyn Tool = match self.tool {
            ToolKind::Move => &mut self.move_tool,
            ToolKind::Draw => &mut self.draw_tool,
            ToolKind::Erase => &mut self.erase_tool,
            ToolKind::Connect => &mut self.connect_tool,
        };
        let mutations = tool.handle(&event, &ctx);

        let mut changed = false;
        for mutation in mutations {
            changed |= self.apply_mutation(mutation);
        }
        if event.is_release() {
            self.end_gesture();
        }
        changed
    }

    /// Finish any gesture in flight through the normal release path.
    pub fn cancel_gesture(&mut self) -> bool {
        if !self.gesture_active {
            return false;
        }
        let (x, y) = self.last_pointer;
        self.pointer_cancel(x, y)
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Apply a mutation live, without committing. Returns true if anything
    /// visible changed.
    pub fn apply_mutation(&mut self, mutation: BoardMutation) -> bool {
        let state_changed = match mutation {
            BoardMutation::CommitStroke(stroke) => {
                self.state.strokes.push(stroke);
                true
            }
            BoardMutation::Erase { x, y, radius, mode } => {
                stroke::erase_at(&mut self.state.strokes, mode, x, y, radius)
            }
            BoardMutation::MoveAnchor { anchor, dx, dy } => {
                graph::move_anchor(&mut self.state, &anchor, dx, dy)
            }
            BoardMutation::ResizeFlow { id, width, height } => graph::resize_flow_node(
                &mut self.state,
                id,
                width,
                height,
                self.config.flow_min_width,
                self.config.flow_min_height,
            ),
            BoardMutation::Connect { from, to } => graph::connect(
                &mut self.state,
                &mut self.groups,
                from,
                to,
                &self.config.palette,
            )
            .is_some(),
            BoardMutation::Pan { dx, dy } => {
                self.camera.pan_by(dx, dy);
                self.doc_dirty = true;
                return dx != 0.0 || dy != 0.0;
            }
            BoardMutation::AddCard(card) => {
                self.state.cards.push(*card);
                true
            }
            BoardMutation::UpdateCard {
                id,
                title,
                content,
                media_url,
            } => match self.state.card_mut(id) {
                Some(card) => {
                    card.title = title;
                    card.content = content;
                    card.media_url = media_url;
                    true
                }
                None => false,
            },
            BoardMutation::SetCardDoodle { id, doodle } => match self.state.card_mut(id) {
                Some(card) => {
                    card.doodle = doodle;
                    true
                }
                None => false,
            },
            BoardMutation::AddFlowNode(node) => {
                self.state.flow_nodes.push(node);
                true
            }
            BoardMutation::SetFlowText { id, text } => match self.state.flow_node_mut(id) {
                Some(node) => {
                    node.text = text;
                    true
                }
                None => false,
            },
            BoardMutation::SetFlowShape { id, shape } => match self.state.flow_node_mut(id) {
                Some(node) => {
                    node.shape = shape;
                    true
                }
                None => false,
            },
            BoardMutation::SetEdgeLabel { id, label } => match self.state.edge_mut(id) {
                Some(edge) => {
                    edge.label = label.filter(|l| !l.trim().is_empty());
                    true
                }
                None => false,
            },
            BoardMutation::DeleteAnchor(anchor) => {
                let removed = graph::delete_anchor(&mut self.state, &mut self.groups, &anchor);
                if removed {
                    self.forget_anchor(anchor);
                }
                removed
            }
            BoardMutation::DeleteEdge(id) => graph::delete_edge(&mut self.state, &mut self.groups, id),
            BoardMutation::CycleGroupColor(group) => {
                self.groups.cycle_color(group, &self.config.palette)
            }
            BoardMutation::Clear => {
                let had_content = !self.state.is_empty() || !self.groups.is_empty();
                self.state = BoardState::new();
                self.groups.clear();
                self.move_tool.selected = None;
                self.connect_tool.cancel();
                had_content
            }
        };
        if state_changed {
            self.gesture_dirty = true;
        }
        state_changed
    }

    /// Close the current gesture. Pushes one snapshot if the board changed
    /// since the last commit. Returns true if a snapshot was pushed.
    pub fn end_gesture(&mut self) -> bool {
        self.gesture_active = false;
        if !std::mem::take(&mut self.gesture_dirty) {
            return false;
        }
        self.doc_dirty = true;
        if self
            .history
            .current()
            .is_some_and(|s| s.state == self.state && s.groups == self.groups)
        {
            return false;
        }
        self.history
            .push(Snapshot::new(self.state.clone(), self.groups.clone()));
        log::debug!(
            "committed snapshot {}/{}",
            self.history.cursor() + 1,
            self.history.len()
        );
        true
    }

    /// Apply a discrete action and commit it, unless a gesture is in
    /// flight (then it lands in that gesture's commit).
    fn commit(&mut self, mutation: BoardMutation) -> bool {
        let changed = self.apply_mutation(mutation);
        if !self.gesture_active {
            self.end_gesture();
        }
        changed
    }

    fn forget_anchor(&mut self, anchor: AnchorRef) {
        if self.move_tool.selected == Some(anchor) {
            self.move_tool.selected = None;
        }
        if self.connect_tool.pending() == Some(anchor) {
            self.connect_tool.cancel();
        }
    }

    // ─── Discrete actions ────────────────────────────────────────────────

    /// Add an empty card with its top-left corner at world `(x, y)`.
    pub fn add_card(&mut self, x: f32, y: f32) -> ElementId {
        let card = Card::new(ElementId::fresh("card"), x, y);
        let id = card.id;
        self.commit(BoardMutation::AddCard(Box::new(card)));
        id
    }

    pub fn update_card(
        &mut self,
        id: ElementId,
        title: &str,
        content: &str,
        media_url: Option<&str>,
    ) -> bool {
        self.commit(BoardMutation::UpdateCard {
            id,
            title: title.to_string(),
            content: content.to_string(),
            media_url: media_url.filter(|u| !u.is_empty()).map(str::to_string),
        })
    }

    /// Replace a card's private doodle. Points are card-local.
    pub fn set_card_doodle(&mut self, id: ElementId, doodle: Option<Vec<Stroke>>) -> bool {
        self.commit(BoardMutation::SetCardDoodle { id, doodle })
    }

    /// Add a flow node of the default size at world `(x, y)`.
    pub fn add_flow_node(&mut self, shape: FlowShape, x: f32, y: f32) -> ElementId {
        let node = FlowNode::new(
            ElementId::fresh("flow"),
            shape,
            x,
            y,
            self.config.flow_default_width,
            self.config.flow_default_height,
        );
        let id = node.id;
        self.commit(BoardMutation::AddFlowNode(node));
        id
    }

    pub fn set_flow_text(&mut self, id: ElementId, text: &str) -> bool {
        self.commit(BoardMutation::SetFlowText {
            id,
            text: text.to_string(),
        })
    }

    pub fn set_flow_shape(&mut self, id: ElementId, shape: FlowShape) -> bool {
        self.commit(BoardMutation::SetFlowShape { id, shape })
    }

    /// Set or clear (`None` or blank) an edge label.
    pub fn set_edge_label(&mut self, id: ElementId, label: Option<&str>) -> bool {
        self.commit(BoardMutation::SetEdgeLabel {
            id,
            label: label.map(str::to_string),
        })
    }

    /// Connect two anchors and merge their groups. Returns the new edge id.
    pub fn connect(&mut self, from: AnchorRef, to: AnchorRef) -> Option<ElementId> {
        if !self.commit(BoardMutation::Connect { from, to }) {
            return None;
        }
        self.state.edges.last().map(|e| e.id)
    }

    pub fn delete_anchor(&mut self, anchor: AnchorRef) -> bool {
        self.commit(BoardMutation::DeleteAnchor(anchor))
    }

    pub fn delete_edge(&mut self, id: ElementId) -> bool {
        self.commit(BoardMutation::DeleteEdge(id))
    }

    /// Advance a group's color. Recolors every member at once.
    pub fn cycle_group_color(&mut self, group: ElementId) -> bool {
        self.commit(BoardMutation::CycleGroupColor(group))
    }

    /// Delete the selected anchor, if any.
    pub fn delete_selected(&mut self) -> bool {
        match self.move_tool.selected {
            Some(anchor) => self.delete_anchor(anchor),
            None => false,
        }
    }

    /// Cycle the color of the selected anchor's group, if it has one.
    pub fn cycle_selected_group_color(&mut self) -> bool {
        let group = self
            .move_tool
            .selected
            .and_then(|a| graph::resolve_anchor(&self.state, &a))
            .and_then(|a| a.group_id);
        match group {
            Some(group) => self.cycle_group_color(group),
            None => false,
        }
    }

    /// Remove everything. Does nothing unless the user confirmed.
    pub fn clear_board(&mut self, confirmed: bool) -> bool {
        if !confirmed {
            log::debug!("clear board declined");
            return false;
        }
        self.cancel_gesture();
        self.commit(BoardMutation::Clear)
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.cancel_gesture();
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.state = snapshot.state.clone();
        self.groups = snapshot.groups.clone();
        self.after_restore();
        log::debug!("undo → snapshot {}", self.history.cursor());
        true
    }

    pub fn redo(&mut self) -> bool {
        self.cancel_gesture();
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.state = snapshot.state.clone();
        self.groups = snapshot.groups.clone();
        self.after_restore();
        log::debug!("redo → snapshot {}", self.history.cursor());
        true
    }

    fn after_restore(&mut self) {
        self.connect_tool.cancel();
        self.erase_tool.clear_hover();
        if let Some(selected) = self.move_tool.selected
            && graph::resolve_anchor(&self.state, &selected).is_none()
        {
            self.move_tool.selected = None;
        }
        self.doc_dirty = true;
    }

    // ─── Camera ──────────────────────────────────────────────────────────

    pub fn zoom_in(&mut self) -> bool {
        self.step_zoom(self.config.zoom_step)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.step_zoom(-self.config.zoom_step)
    }

    fn step_zoom(&mut self, delta: f32) -> bool {
        let changed = self.camera.step_zoom(delta);
        self.doc_dirty |= changed;
        changed
    }

    /// Set the zoom, clamped to the configured range.
    pub fn set_zoom(&mut self, zoom: f32) -> bool {
        let before = self.camera.zoom();
        self.camera.set_zoom(zoom);
        let changed = self.camera.zoom() != before;
        self.doc_dirty |= changed;
        changed
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) -> bool {
        self.apply_mutation(BoardMutation::Pan { dx, dy })
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport { width, height };
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Resolve a key event and run its action. Returns the action so the
    /// host can update its UI.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let action = ShortcutMap::resolve(key, ctrl, shift, alt, meta)?;
        self.dispatch_action(action);
        Some(action)
    }

    /// Run a shortcut action. Returns true if anything changed.
    pub fn dispatch_action(&mut self, action: ShortcutAction) -> bool {
        match action {
            ShortcutAction::ToolMove => self.switch_tool(ToolKind::Move),
            ShortcutAction::ToolDraw => self.switch_tool(ToolKind::Draw),
            ShortcutAction::ToolErase => self.switch_tool(ToolKind::Erase),
            ShortcutAction::ToolConnect => self.switch_tool(ToolKind::Connect),
            ShortcutAction::ToggleEraseMode => {
                self.toggle_erase_mode();
                true
            }
            ShortcutAction::EraserSmaller => {
                let before = self.erase_tool.radius;
                self.set_eraser_radius(before - self.config.eraser_radius_step) != before
            }
            ShortcutAction::EraserLarger => {
                let before = self.erase_tool.radius;
                self.set_eraser_radius(before + self.config.eraser_radius_step) != before
            }
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::Delete => self.delete_selected(),
            ShortcutAction::CycleGroupColor => self.cycle_selected_group_color(),
            ShortcutAction::ZoomIn => self.zoom_in(),
            ShortcutAction::ZoomOut => self.zoom_out(),
            ShortcutAction::Cancel => {
                let had_overlay =
                    self.connect_tool.pending().is_some() || self.erase_tool.cursor().is_some();
                self.connect_tool.cancel();
                self.erase_tool.clear_hover();
                self.cancel_gesture() || had_overlay
            }
        }
    }

    fn switch_tool(&mut self, kind: ToolKind) -> bool {
        let changed = kind != self.tool;
        self.set_tool(kind);
        changed
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Transient state for the renderer.
    pub fn overlay(&self) -> SceneOverlay {
        let mut overlay = SceneOverlay {
            selected: self.move_tool.selected,
            ..SceneOverlay::default()
        };
        match self.tool {
            ToolKind::Move => {}
            ToolKind::Draw => overlay.live_stroke = self.draw_tool.preview(),
            ToolKind::Erase => {
                overlay.eraser = self.erase_tool.cursor();
                overlay.erase_target = self.erase_tool.highlight();
            }
            ToolKind::Connect => {
                overlay.elastic = self.connect_tool.elastic();
                overlay.hovered = self.connect_tool.hovered();
            }
        }
        overlay
    }

    /// The display list for the main viewport, in world coordinates.
    pub fn scene(&self) -> Vec<DrawCmd> {
        build_scene(
            &self.state,
            &self.groups,
            &self.overlay(),
            self.config.resize_handle_size,
        )
    }

    pub fn minimap_layout(&self) -> MinimapLayout {
        self.minimap
            .layout(&self.state, &self.groups, &self.camera, self.viewport)
    }

    /// Recenter on a minimap click, if it lands near content.
    pub fn minimap_click(&mut self, mx: f32, my: f32) -> bool {
        let moved = self
            .minimap
            .click(&self.state, &mut self.camera, self.viewport, mx, my);
        self.doc_dirty |= moved;
        moved
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    pub fn to_document(&self) -> BoardDocument {
        BoardDocument::from_parts(&self.state, &self.groups, self.camera.pan, self.camera.zoom())
    }

    /// Write the document if it is stale and no gesture is in flight.
    /// Returns true if a write happened.
    pub fn flush_to_store(&mut self, store: &mut dyn BoardStore) -> Result<bool, PersistError> {
        if !self.doc_dirty || self.gesture_active {
            return Ok(false);
        }
        persist::save(store, &self.to_document())?;
        self.doc_dirty = false;
        log::trace!("board saved");
        Ok(true)
    }
}
