#![deny(unsafe_code)]
//! Core types for the sandfx particle effects.
//!
//! Provides the `Effect` trait, the `Surface` raster effects draw into,
//! explicitly owned `PointerState`, `HostEvent` notifications, the
//! `AnimationLoop` repeating task with its `CancellationToken`, the
//! `GlyphRasterizer` capability, shared `physics` impulses, `Srgb` tones,
//! the `Xorshift64` PRNG, reproducible `Scene`s, and params helpers.

pub mod cancel;
pub mod color;
pub mod effect;
pub mod error;
pub mod event;
pub mod frame;
pub mod glyph;
pub mod params;
pub mod physics;
pub mod pointer;
pub mod prng;
pub mod scene;
pub mod surface;

pub use cancel::CancellationToken;
pub use color::Srgb;
pub use effect::Effect;
pub use error::FxError;
pub use event::HostEvent;
pub use frame::{AnimationLoop, FixedStepClock, FrameClock, LoopState, WallClock};
pub use glyph::{BitmapFontRasterizer, FontDescriptor, GlyphRasterizer, OpacityMask};
pub use pointer::{PointerState, POINTER_ABSENT};
pub use prng::Xorshift64;
pub use scene::{Scene, TimedEvent};
pub use surface::Surface;
