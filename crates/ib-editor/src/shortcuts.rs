//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. The map
//! lives in Rust so every host resolves keys the same way.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Tool switching ──
    ToolMove,
    ToolDraw,
    ToolErase,
    ToolConnect,

    // ── Eraser ──
    /// Switch between whole-stroke and trim erasing.
    ToggleEraseMode,
    EraserSmaller,
    EraserLarger,

    // ── Edit ──
    Undo,
    Redo,
    /// Delete the selected anchor and its edges.
    Delete,
    /// Advance the selected anchor's group to the next palette color.
    CycleGroupColor,

    // ── View ──
    ZoomIn,
    ZoomOut,

    // ── UI ──
    /// Abandon a pending connection and finish any gesture in flight.
    Cancel,
}

/// Resolves key events into shortcut actions.
///
/// On macOS `meta` is ⌘; elsewhere `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        if cmd && shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                "+" => Some(ShortcutAction::ZoomIn),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                _ => None,
            };
        }

        if alt {
            return None;
        }

        match key {
            "v" | "V" => Some(ShortcutAction::ToolMove),
            "p" | "P" => Some(ShortcutAction::ToolDraw),
            "e" | "E" => Some(ShortcutAction::ToolErase),
            "c" | "C" => Some(ShortcutAction::ToolConnect),
            "t" | "T" => Some(ShortcutAction::ToggleEraseMode),
            "[" => Some(ShortcutAction::EraserSmaller),
            "]" => Some(ShortcutAction::EraserLarger),
            "g" | "G" => Some(ShortcutAction::CycleGroupColor),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Cancel),
            _ => None,
        }
    }
}
