//! Explicitly owned pointer state shared between a host and its effects.
//!
//! The host writes through [`PointerState::move_to`] on every pointer-move
//! notification; effects read [`PointerState::position`] once per frame.
//! Button and hover flags travel the same way.
//! Everything runs on one thread, so the handle is a plain `Rc<Cell<_>>`.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;

/// Position reported while no pointer is over the page.
///
/// Far enough outside any viewport that no repulsion radius reaches it.
pub const POINTER_ABSENT: Vec2 = Vec2::new(-10_000.0, -10_000.0);

/// Cloneable handle to one animation instance's pointer.
///
/// Clones share the same state. Create one per mounted view and pass a
/// clone to each effect at construction.
#[derive(Debug, Clone)]
pub struct PointerState {
    position: Rc<Cell<Vec2>>,
    pressed: Rc<Cell<bool>>,
    /// Over something interactive.
    hovering: Rc<Cell<bool>>,
}

impl Default for PointerState {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerState {
    /// Starts with the pointer absent.
    pub fn new() -> Self {
        Self {
            position: Rc::new(Cell::new(POINTER_ABSENT)),
            pressed: Rc::new(Cell::new(false)),
            hovering: Rc::new(Cell::new(false)),
        }
    }

    /// Records a pointer-move notification. Non-finite coordinates are
    /// treated as the pointer leaving.
    pub fn move_to(&self, x: f32, y: f32) {
        let p = Vec2::new(x, y);
        self.position
            .set(if p.is_finite() { p } else { POINTER_ABSENT });
    }

    /// Marks the pointer as gone from the view. Hover ends with it; the
    /// button state is kept until the host reports the release.
    pub fn leave(&self) {
        self.position.set(POINTER_ABSENT);
        self.hovering.set(false);
    }

    pub fn press(&self) {
        self.pressed.set(true);
    }

    pub fn release(&self) {
        self.pressed.set(false);
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed.get()
    }

    /// Records whether the pointer is over an interactive element.
    pub fn set_hovering(&self, hovering: bool) {
        self.hovering.set(hovering);
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering.get()
    }

    /// Most recent pointer position, or [`POINTER_ABSENT`].
    pub fn position(&self) -> Vec2 {
        self.position.get()
    }

    pub fn is_present(&self) -> bool {
        self.position.get() != POINTER_ABSENT
    }
}
