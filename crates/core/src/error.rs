//! Error types for sandfx.

use thiserror::Error;

/// Errors produced by surfaces, rasterizers, scenes and the effect registry.
///
/// None of these are fatal to a running page: an effect that fails to mount
/// simply renders nothing.
#[derive(Debug, Error)]
pub enum FxError {
    /// Width or height was zero (or overflowed) when creating a surface or mask.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// No effect is registered under the requested name.
    #[error("unknown effect: {0}")]
    UnknownEffect(String),

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A scene description failed validation.
    #[error("invalid scene: {0}")]
    InvalidScene(String),

    /// Writing a snapshot or reading a scene failed.
    #[error("io error: {0}")]
    Io(String),
}
