//! Notifications a host delivers to a mounted effect.

use serde::{Deserialize, Serialize};

/// Input from the host environment, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// The pointer moved to `(x, y)` relative to the effect's container.
    PointerMove { x: f32, y: f32 },
    /// The pointer left the view.
    PointerLeave,
    /// A pointer button went down.
    PointerDown,
    /// A pointer button was released.
    PointerUp,
    /// The pointer entered (`active`) or left an interactive element.
    Hover { active: bool },
    /// The container was resized.
    Resize { width: u32, height: u32 },
}
