//! WASM bridge for the idea board. Exposes the Rust board engine to
//! JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The host page owns the DOM
//! (toolbar, card editor, confirm dialogs) and forwards pointer and key
//! events here; the board is saved to `localStorage` after every commit.

mod render2d;

use ib_core::config::BoardConfig;
use ib_core::id::ElementId;
use ib_core::lint::LintSeverity;
use ib_core::model::{AnchorKind, AnchorRef, FlowShape};
use ib_core::persist::{BoardStore, PersistError};
use ib_core::stroke::EraseMode;
use ib_core::transform::Viewport;
use ib_editor::{BoardEngine, ShortcutAction, ShortcutMap, ToolKind};
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// The main WASM-facing board controller.
///
/// All interaction from the host page goes through this struct.
#[wasm_bindgen]
pub struct BoardCanvas {
    engine: BoardEngine,
    store: LocalStorageStore,
    width: f64,
    height: f64,
    /// Dark mode flag: `false` = light (default), `true` = dark.
    dark_mode: bool,
}

#[wasm_bindgen]
impl BoardCanvas {
    /// Create a controller and load the saved board, if any.
    ///
    /// `config_json` overrides the defaults; unknown fields are ignored and
    /// a malformed object falls back to the defaults with a warning.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64, config_json: Option<String>) -> Self {
        console_error_panic_hook_setup();
        console_logger_setup();

        let config = match config_json.as_deref() {
            Some(json) => BoardConfig::from_json(json).unwrap_or_else(|e| {
                log::warn!("ignoring board config: {e}");
                BoardConfig::default()
            }),
            None => BoardConfig::default(),
        };
        let viewport = Viewport {
            width: width as f32,
            height: height as f32,
        };
        let store = LocalStorageStore;
        let engine = BoardEngine::load(&store, config, viewport);

        Self {
            engine,
            store,
            width,
            height,
            dark_mode: false,
        }
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Render the board to a Canvas2D context.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) {
        let theme = self.theme();
        render2d::render_board(
            ctx,
            &self.engine.scene(),
            &self.engine.camera,
            self.width,
            self.height,
            &theme,
        );
    }

    /// Render the minimap to its own Canvas2D context.
    pub fn render_minimap(&self, ctx: &CanvasRenderingContext2d) {
        let theme = self.theme();
        render2d::render_minimap(ctx, &self.engine.minimap_layout(), &theme);
    }

    /// Set the canvas theme.
    pub fn set_theme(&mut self, is_dark: bool) {
        self.dark_mode = is_dark;
    }

    /// Resize the canvas.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.engine.resize(width as f32, height as f32);
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    /// Handle pointer down. Returns true if the canvas needs a repaint.
    pub fn handle_pointer_down(&mut self, x: f32, y: f32, pressure: Option<f32>) -> bool {
        self.engine.pointer_down(x, y, pressure)
    }

    /// Handle pointer move. Returns true if the canvas needs a repaint.
    pub fn handle_pointer_move(&mut self, x: f32, y: f32, pressure: Option<f32>) -> bool {
        self.engine.pointer_move(x, y, pressure)
    }

    /// Handle pointer up. Returns JSON: `{"changed":bool,"saved":bool}`.
    pub fn handle_pointer_up(&mut self, x: f32, y: f32) -> String {
        let changed = self.engine.pointer_up(x, y);
        self.release_result(changed)
    }

    /// Handle pointer cancel. Same result shape as `handle_pointer_up`.
    pub fn handle_pointer_cancel(&mut self, x: f32, y: f32) -> String {
        let changed = self.engine.pointer_cancel(x, y);
        self.release_result(changed)
    }

    /// Handle the pointer leaving the canvas. Same result shape as
    /// `handle_pointer_up`.
    pub fn handle_pointer_leave(&mut self, x: f32, y: f32) -> String {
        let changed = self.engine.pointer_leave(x, y);
        self.release_result(changed)
    }

    // ─── Keyboard and tools ──────────────────────────────────────────────

    /// Handle a keyboard event.
    ///
    /// Returns JSON: `{"changed":bool,"action":"name","tool":"name"}`.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let Some(action) = ShortcutMap::resolve(key, ctrl, shift, alt, meta) else {
            return r#"{"changed":false,"action":"none","tool":""}"#.to_string();
        };
        let changed = self.engine.dispatch_action(action);
        self.flush();
        serde_json::json!({
            "changed": changed,
            "action": action_to_name(action),
            "tool": tool_kind_to_name(self.engine.tool()),
        })
        .to_string()
    }

    /// Switch tools by name. Returns false for an unknown name.
    pub fn set_tool(&mut self, name: &str) -> bool {
        match tool_name_to_kind(name) {
            Some(kind) => {
                self.engine.set_tool(kind);
                self.flush();
                true
            }
            None => false,
        }
    }

    pub fn get_tool_name(&self) -> String {
        tool_kind_to_name(self.engine.tool()).to_string()
    }

    /// Set the erase mode: `"whole"` or `"trim"`.
    pub fn set_erase_mode(&mut self, mode: &str) -> bool {
        let mode = match mode {
            "whole" => EraseMode::Whole,
            "trim" => EraseMode::Trim,
            _ => return false,
        };
        self.engine.set_erase_mode(mode);
        true
    }

    pub fn get_erase_mode(&self) -> String {
        erase_mode_to_name(self.engine.erase_mode()).to_string()
    }

    /// Set the eraser radius. Returns the clamped value.
    pub fn set_eraser_radius(&mut self, radius: f32) -> f32 {
        self.engine.set_eraser_radius(radius)
    }

    pub fn get_eraser_radius(&self) -> f32 {
        self.engine.eraser_radius()
    }

    /// Set the ink color (`#RRGGBB`) and base width for new strokes.
    pub fn set_stroke_style(&mut self, color: &str, width: f32) -> bool {
        match ib_core::model::Color::from_hex(color) {
            Some(c) => {
                self.engine.set_stroke_style(c, width);
                true
            }
            None => false,
        }
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        let changed = self.engine.undo();
        self.flush();
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.engine.redo();
        self.flush();
        changed
    }

    pub fn can_undo(&self) -> bool {
        self.engine.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.engine.can_redo()
    }

    // ─── Cards ───────────────────────────────────────────────────────────

    /// Add a blank card at a screen position. Returns the new card id.
    pub fn add_card(&mut self, x: f32, y: f32) -> String {
        let (wx, wy) = self.engine.camera.to_world(x, y);
        let id = self.engine.add_card(wx, wy);
        self.flush();
        id.as_str().to_string()
    }

    /// Replace a card's text fields. An empty `media_url` clears it.
    pub fn update_card(&mut self, id: &str, title: &str, content: &str, media_url: Option<String>) -> bool {
        let changed = self.engine.update_card(
            ElementId::intern(id),
            title,
            content,
            media_url.as_deref(),
        );
        self.flush();
        changed
    }

    /// Replace a card's doodle from a JSON stroke array; `null` clears it.
    pub fn set_card_doodle(&mut self, id: &str, strokes_json: &str) -> bool {
        let doodle = match serde_json::from_str(strokes_json) {
            Ok(doodle) => doodle,
            Err(e) => {
                log::warn!("rejecting doodle for {id}: {e}");
                return false;
            }
        };
        let changed = self.engine.set_card_doodle(ElementId::intern(id), doodle);
        self.flush();
        changed
    }

    // ─── Flow nodes and edges ────────────────────────────────────────────

    /// Add a flow node at a screen position. Returns the new id, or an
    /// empty string for an unknown shape.
    pub fn add_flow_node(&mut self, shape: &str, x: f32, y: f32) -> String {
        let Some(shape) = parse_shape(shape) else {
            return String::new();
        };
        let (wx, wy) = self.engine.camera.to_world(x, y);
        let id = self.engine.add_flow_node(shape, wx, wy);
        self.flush();
        id.as_str().to_string()
    }

    pub fn set_flow_text(&mut self, id: &str, text: &str) -> bool {
        let changed = self.engine.set_flow_text(ElementId::intern(id), text);
        self.flush();
        changed
    }

    pub fn set_flow_shape(&mut self, id: &str, shape: &str) -> bool {
        let Some(shape) = parse_shape(shape) else {
            return false;
        };
        let changed = self.engine.set_flow_shape(ElementId::intern(id), shape);
        self.flush();
        changed
    }

    /// Set or clear (`None` or empty) an edge label.
    pub fn set_edge_label(&mut self, id: &str, label: Option<String>) -> bool {
        let changed = self
            .engine
            .set_edge_label(ElementId::intern(id), label.as_deref());
        self.flush();
        changed
    }

    /// Connect two anchors by kind (`"card"` / `"flow"`) and id. Returns the
    /// new edge id, or an empty string if nothing was connected.
    pub fn connect(&mut self, from_kind: &str, from_id: &str, to_kind: &str, to_id: &str) -> String {
        let (Some(from), Some(to)) = (parse_anchor(from_kind, from_id), parse_anchor(to_kind, to_id))
        else {
            return String::new();
        };
        let edge = self.engine.connect(from, to);
        self.flush();
        edge.map(|id| id.as_str().to_string()).unwrap_or_default()
    }

    pub fn delete_edge(&mut self, id: &str) -> bool {
        let changed = self.engine.delete_edge(ElementId::intern(id));
        self.flush();
        changed
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// The selected anchor as JSON `{"kind":"card","id":"..."}`, or `null`.
    pub fn get_selected(&self) -> String {
        match self.engine.selected() {
            Some(anchor) => serde_json::json!({
                "kind": anchor_kind_to_name(anchor.kind),
                "id": anchor.id.as_str(),
            })
            .to_string(),
            None => "null".to_string(),
        }
    }

    pub fn delete_selected(&mut self) -> bool {
        let changed = self.engine.delete_selected();
        self.flush();
        changed
    }

    pub fn cycle_selected_group_color(&mut self) -> bool {
        let changed = self.engine.cycle_selected_group_color();
        self.flush();
        changed
    }

    /// Erase the whole board. The host asks the user first and passes the
    /// answer; `false` leaves the board untouched.
    pub fn clear_board(&mut self, confirmed: bool) -> bool {
        let changed = self.engine.clear_board(confirmed);
        self.flush();
        changed
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn zoom_in(&mut self) -> bool {
        let changed = self.engine.zoom_in();
        self.flush();
        changed
    }

    pub fn zoom_out(&mut self) -> bool {
        let changed = self.engine.zoom_out();
        self.flush();
        changed
    }

    pub fn set_zoom(&mut self, zoom: f32) -> bool {
        let changed = self.engine.set_zoom(zoom);
        self.flush();
        changed
    }

    pub fn get_zoom(&self) -> f32 {
        self.engine.camera.zoom()
    }

    /// Recenter on a minimap click (minimap pixels).
    pub fn minimap_click(&mut self, x: f32, y: f32) -> bool {
        let moved = self.engine.minimap_click(x, y);
        self.flush();
        moved
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// The persisted document as JSON.
    pub fn get_document_json(&self) -> String {
        self.engine
            .to_document()
            .to_json()
            .unwrap_or_else(|e| {
                log::error!("failed to serialize board: {e}");
                "{}".to_string()
            })
    }

    /// Write the board now if it has unsaved changes. Returns true if a
    /// write happened.
    pub fn save(&mut self) -> bool {
        self.flush()
    }

    /// Lint findings as a JSON array.
    pub fn get_diagnostics(&self) -> String {
        let diagnostics: Vec<serde_json::Value> =
            ib_core::lint::lint_board(&self.engine.state, &self.engine.groups)
                .into_iter()
                .map(|d| {
                    serde_json::json!({
                        "element": d.element.as_str(),
                        "message": d.message,
                        "severity": match d.severity {
                            LintSeverity::Warning => "warning",
                            LintSeverity::Info => "info",
                        },
                        "rule": d.rule,
                    })
                })
                .collect();
        serde_json::Value::Array(diagnostics).to_string()
    }
}

impl BoardCanvas {
    fn theme(&self) -> render2d::CanvasTheme {
        if self.dark_mode {
            render2d::CanvasTheme::dark()
        } else {
            render2d::CanvasTheme::light()
        }
    }

    fn flush(&mut self) -> bool {
        match self.engine.flush_to_store(&mut self.store) {
            Ok(saved) => saved,
            Err(e) => {
                log::warn!("board not saved: {e}");
                false
            }
        }
    }

    fn release_result(&mut self, changed: bool) -> String {
        let saved = self.flush();
        serde_json::json!({ "changed": changed, "saved": saved }).to_string()
    }
}

// ─── localStorage ────────────────────────────────────────────────────────

/// `BoardStore` over the browser's `localStorage`.
struct LocalStorageStore;

impl LocalStorageStore {
    fn storage(&self) -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

impl BoardStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        let storage = self.storage().ok_or_else(|| PersistError::Storage {
            key: key.to_string(),
            reason: "localStorage unavailable".to_string(),
        })?;
        storage
            .set_item(key, value)
            .map_err(|e| PersistError::Storage {
                key: key.to_string(),
                reason: e.as_string().unwrap_or_else(|| format!("{e:?}")),
            })
    }
}

// ─── Name helpers ────────────────────────────────────────────────────────

fn tool_kind_to_name(kind: ToolKind) -> &'static str {
    match kind {
        ToolKind::Move => "move",
        ToolKind::Draw => "draw",
        ToolKind::Erase => "erase",
        ToolKind::Connect => "connect",
    }
}

fn tool_name_to_kind(name: &str) -> Option<ToolKind> {
    match name {
        "move" => Some(ToolKind::Move),
        "draw" => Some(ToolKind::Draw),
        "erase" => Some(ToolKind::Erase),
        "connect" => Some(ToolKind::Connect),
        _ => None,
    }
}

fn erase_mode_to_name(mode: EraseMode) -> &'static str {
    match mode {
        EraseMode::Whole => "whole",
        EraseMode::Trim => "trim",
    }
}

fn anchor_kind_to_name(kind: AnchorKind) -> &'static str {
    match kind {
        AnchorKind::Card => "card",
        AnchorKind::Flow => "flow",
    }
}

fn action_to_name(action: ShortcutAction) -> &'static str {
    match action {
        ShortcutAction::ToolMove => "toolMove",
        ShortcutAction::ToolDraw => "toolDraw",
        ShortcutAction::ToolErase => "toolErase",
        ShortcutAction::ToolConnect => "toolConnect",
        ShortcutAction::ToggleEraseMode => "toggleEraseMode",
        ShortcutAction::EraserSmaller => "eraserSmaller",
        ShortcutAction::EraserLarger => "eraserLarger",
        ShortcutAction::Undo => "undo",
        ShortcutAction::Redo => "redo",
        ShortcutAction::Delete => "delete",
        ShortcutAction::CycleGroupColor => "cycleGroupColor",
        ShortcutAction::ZoomIn => "zoomIn",
        ShortcutAction::ZoomOut => "zoomOut",
        ShortcutAction::Cancel => "cancel",
    }
}

fn parse_anchor(kind: &str, id: &str) -> Option<AnchorRef> {
    if id.is_empty() {
        return None;
    }
    let id = ElementId::intern(id);
    match kind {
        "card" => Some(AnchorRef::card(id)),
        "flow" => Some(AnchorRef::flow(id)),
        _ => None,
    }
}

fn parse_shape(name: &str) -> Option<FlowShape> {
    match name {
        "box" => Some(FlowShape::Box),
        "diamond" => Some(FlowShape::Diamond),
        "ellipse" => Some(FlowShape::Ellipse),
        _ => None,
    }
}

// ─── Console plumbing ────────────────────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("idea board panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

/// Routes `log` records to the browser console.
#[cfg(target_arch = "wasm32")]
struct ConsoleLogger;

#[cfg(target_arch = "wasm32")]
impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Info
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg: JsValue = format!("[{}] {}", record.target(), record.args()).into();
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&msg),
            log::Level::Warn => web_sys::console::warn_1(&msg),
            _ => web_sys::console::log_1(&msg),
        }
    }

    fn flush(&self) {}
}

fn console_logger_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        static LOGGER: ConsoleLogger = ConsoleLogger;
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(log::LevelFilter::Info);
        }
    }
}
