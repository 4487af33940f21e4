//! Input abstraction layer.
//!
//! Normalizes mouse, touch, and stylus pointer events into a unified
//! `InputEvent` consumed by tools. Coordinates are screen-space; tools
//! convert through the camera themselves.

/// A normalized pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start, pen contact).
    PointerDown {
        x: f32,
        y: f32,
        /// Device pressure in `[0, 1]`, if the device reports one.
        pressure: Option<f32>,
    },

    /// Pointer moved, pressed or not.
    PointerMove {
        x: f32,
        y: f32,
        pressure: Option<f32>,
    },

    /// Pointer released.
    PointerUp { x: f32, y: f32 },

    /// The platform aborted the gesture.
    PointerCancel { x: f32, y: f32 },

    /// Pointer left the surface.
    PointerLeave { x: f32, y: f32 },
}

impl InputEvent {
    /// Screen position of the event.
    pub fn position(&self) -> (f32, f32) {
        match *self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y }
            | Self::PointerCancel { x, y }
            | Self::PointerLeave { x, y } => (x, y),
        }
    }

    pub fn pressure(&self) -> Option<f32> {
        match *self {
            Self::PointerDown { pressure, .. } | Self::PointerMove { pressure, .. } => pressure,
            _ => None,
        }
    }

    /// Up, cancel, and leave all end a gesture the same way.
    pub fn is_release(&self) -> bool {
        matches!(
            self,
            Self::PointerUp { .. } | Self::PointerCancel { .. } | Self::PointerLeave { .. }
        )
    }
}
