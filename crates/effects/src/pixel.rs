//! Flattening a transparent [`Surface`] onto a solid page background.
//!
//! Always available (no feature gate) so hosts without the `png` feature can
//! still get final pixels.

use sandfx_core::{Srgb, Surface};

/// Composites `surface` over `background`, producing opaque RGBA8 at device
/// resolution. The buffer length is `pixel_width * pixel_height * 4`.
pub fn composite_over(surface: &Surface, background: Srgb) -> Vec<u8> {
    let bg = [background.r, background.g, background.b];
    surface
        .pixels()
        .chunks_exact(4)
        .flat_map(|px| {
            let a = px[3] as f32 / 255.0;
            let mix = |c: u8, b: u8| (c as f32 * a + b as f32 * (1.0 - a)).round() as u8;
            [mix(px[0], bg[0]), mix(px[1], bg[1]), mix(px[2], bg[2]), 255u8]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use sandfx_core::color::{GOLD, NIGHT, WHITE};

    #[test]
    fn length_matches_device_pixels() {
        let surface = Surface::with_device_pixel_ratio(10, 5, 2.0).unwrap();
        assert_eq!(composite_over(&surface, NIGHT).len(), 20 * 10 * 4);
    }

    #[test]
    fn empty_surface_is_background() {
        let surface = Surface::new(4, 4).unwrap();
        for px in composite_over(&surface, NIGHT).chunks(4) {
            assert_eq!(px, &[0x0a, 0x0a, 0x0a, 255]);
        }
    }

    #[test]
    fn opaque_paint_replaces_background() {
        let mut surface = Surface::new(4, 4).unwrap();
        surface.fill_square(Vec2::ZERO, 4.0, GOLD, 1.0);
        for px in composite_over(&surface, NIGHT).chunks(4) {
            assert_eq!(px, &[GOLD.r, GOLD.g, GOLD.b, 255]);
        }
    }

    #[test]
    fn half_alpha_mixes_evenly() {
        let mut surface = Surface::new(1, 1).unwrap();
        surface.fill_square(Vec2::ZERO, 1.0, WHITE, 0.5);
        let px = composite_over(&surface, Srgb::new(0, 0, 0));
        for c in &px[..3] {
            assert!((127..=128).contains(c), "channel {c}");
        }
        assert_eq!(px[3], 255);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn output_is_opaque_and_between_paint_and_background(
                bg in any::<[u8; 3]>(),
                paint in any::<[u8; 3]>(),
                alpha in 0.0_f32..=1.0,
            ) {
                let mut surface = Surface::new(2, 2).unwrap();
                let color = Srgb::new(paint[0], paint[1], paint[2]);
                surface.fill_square(Vec2::ZERO, 1.0, color, alpha);
                let out = composite_over(&surface, Srgb::new(bg[0], bg[1], bg[2]));
                for px in out.chunks(4) {
                    prop_assert_eq!(px[3], 255);
                }
                for c in 0..3 {
                    let (lo, hi) = (paint[c].min(bg[c]), paint[c].max(bg[c]));
                    prop_assert!((lo..=hi).contains(&out[c]));
                }
            }
        }
    }
}
