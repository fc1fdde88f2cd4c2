//! Glyph mask layout and sampling.

use glam::Vec2;
use sandfx_core::glyph::{FontDescriptor, GlyphRasterizer, OpacityMask};

/// Font size for `text` in a container `width` logical pixels wide.
///
/// Starts at `width * scale` capped at `max_px`, then shrinks until the text
/// spans at most `fit` of the container width.
pub fn font_size_for(
    text: &str,
    width: u32,
    font: &FontDescriptor,
    rasterizer: &dyn GlyphRasterizer,
    scale: f32,
    max_px: f32,
    fit: f32,
) -> f32 {
    let size = (width as f32 * scale).min(max_px);
    if size <= 0.0 {
        return 0.0;
    }
    let measured = rasterizer.measure(text, &font.clone().with_size(size)).x;
    let room = width as f32 * fit;
    if measured > room && measured > 0.0 {
        size * room / measured
    } else {
        size
    }
}

/// Mask coordinates on a `stride` grid whose alpha exceeds `threshold`, in
/// row-major raster order.
pub fn sample_origins(mask: &OpacityMask, stride: usize, threshold: u8) -> Vec<Vec2> {
    let stride = stride.max(1);
    (0..mask.height())
        .step_by(stride)
        .flat_map(|y| {
            (0..mask.width())
                .step_by(stride)
                .filter(move |&x| mask.alpha(x, y) > threshold)
                .map(move |x| Vec2::new(x as f32, y as f32))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sandfx_core::BitmapFontRasterizer;

    fn serif(size: f32) -> FontDescriptor {
        FontDescriptor::new("serif", size)
    }

    #[test]
    fn font_size_is_proportional_to_width() {
        let r = BitmapFontRasterizer;
        let size = font_size_for("AB", 400, &serif(0.0), &r, 0.25, 140.0, 0.9);
        assert_eq!(size, 100.0);
    }

    #[test]
    fn font_size_is_capped() {
        let r = BitmapFontRasterizer;
        let size = font_size_for("A", 2000, &serif(0.0), &r, 0.25, 140.0, 0.9);
        assert_eq!(size, 140.0);
    }

    #[test]
    fn long_text_shrinks_to_fit() {
        let r = BitmapFontRasterizer;
        let size = font_size_for("PORTFOLIO", 400, &serif(0.0), &r, 0.25, 140.0, 0.9);
        let width = r.measure("PORTFOLIO", &serif(size)).x;
        assert!(size < 100.0);
        assert!(width <= 360.0 + 1e-3, "text {width}px wide");
    }

    #[test]
    fn samples_only_opaque_pixels_on_grid() {
        let mut mask = OpacityMask::new(10, 10).unwrap();
        mask.set(0, 0, 255);
        mask.set(4, 0, 129);
        mask.set(8, 4, 128);
        mask.set(3, 3, 255);
        mask.set(4, 8, 200);
        let origins = sample_origins(&mask, 4, 128);
        assert_eq!(origins, vec![Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::new(4.0, 8.0)]);
    }

    #[test]
    fn zero_stride_is_treated_as_one() {
        let mut mask = OpacityMask::new(3, 1).unwrap();
        mask.set(1, 0, 255);
        assert_eq!(sample_origins(&mask, 0, 128), vec![Vec2::new(1.0, 0.0)]);
    }

    #[test]
    fn blank_mask_has_no_origins() {
        let mask = OpacityMask::new(32, 32).unwrap();
        assert!(sample_origins(&mask, 4, 128).is_empty());
    }
}
