//! PNG snapshots of a [`Surface`].
//!
//! Feature-gated behind `png` (default on) so embedders that only need raw
//! pixels do not pull in the `image` crate. The compositing itself lives in
//! [`crate::pixel`].

use sandfx_core::{FxError, Srgb, Surface};
use std::path::Path;

use crate::pixel::composite_over;

/// Writes `surface` composited over `background` as a PNG at device
/// resolution.
///
/// Returns `FxError::InvalidDimensions` if the backing size overflows `u32`,
/// or `FxError::Io` on write failure.
pub fn write_png(surface: &Surface, background: Srgb, path: &Path) -> Result<(), FxError> {
    let rgba = composite_over(surface, background);
    let w = u32::try_from(surface.pixel_width()).map_err(|_| FxError::InvalidDimensions)?;
    let h = u32::try_from(surface.pixel_height()).map_err(|_| FxError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| FxError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path)
        .map_err(|e| FxError::Io(format!("{}: {e}", path.display())))?;
    log::debug!("wrote {w}x{h} snapshot to {}", path.display());
    Ok(())
}
