//! The `Effect` trait every particle animation implements.
//!
//! The trait is object-safe so hosts can mount `Box<dyn Effect>` and switch
//! effects at runtime.

use serde_json::Value;

use crate::error::FxError;
use crate::surface::Surface;

/// A self-contained per-frame animation that owns its point set.
///
/// Hosts call [`step`](Effect::step) then [`render`](Effect::render) once per
/// animation frame, never reentrantly.
pub trait Effect {
    /// Registry name, e.g. `"ambient"`.
    fn name(&self) -> &'static str;

    /// Advances the physics by one frame.
    ///
    /// `elapsed_ms` is the time since the effect was mounted; effects with
    /// time-gated behaviour (the text reveal) read it, others ignore it.
    fn step(&mut self, elapsed_ms: f64) -> Result<(), FxError>;

    /// Draws the current frame. Implementations clear the surface first.
    fn render(&mut self, surface: &mut Surface);

    /// Reacts to a container resize (logical pixels).
    fn resize(&mut self, width: u32, height: u32);

    /// Effective parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Every parameter with its type, default, range and description.
    fn param_schema(&self) -> Value;
}
