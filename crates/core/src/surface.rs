//! In-memory RGBA raster that effects draw into.
//!
//! A [`Surface`] has a logical size (CSS pixels of its container) and a
//! device pixel ratio; the backing buffer is `ceil(logical * dpr)` pixels on
//! each axis. All drawing calls take logical coordinates and composite with
//! straight-alpha source-over, the same way a 2D canvas context does.

use glam::Vec2;

use crate::color::Srgb;
use crate::error::FxError;

/// Largest device pixel ratio a surface will honour.
pub const MAX_DEVICE_PIXEL_RATIO: f32 = 2.0;

/// RGBA8 raster with logical dimensions and a device pixel ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    width: u32,
    height: u32,
    device_pixel_ratio: f32,
    pixel_width: usize,
    pixel_height: usize,
    pixels: Vec<u8>,
}

impl Surface {
    /// Creates a transparent surface at a device pixel ratio of 1.
    pub fn new(width: u32, height: u32) -> Result<Self, FxError> {
        Self::with_device_pixel_ratio(width, height, 1.0)
    }

    /// Creates a transparent surface for a container of `width` x `height`
    /// logical pixels on a display with the given pixel ratio.
    ///
    /// The ratio is clamped to [`MAX_DEVICE_PIXEL_RATIO`]; non-finite or
    /// non-positive ratios are treated as 1. Returns
    /// `FxError::InvalidDimensions` for a zero-sized container.
    pub fn with_device_pixel_ratio(
        width: u32,
        height: u32,
        device_pixel_ratio: f32,
    ) -> Result<Self, FxError> {
        let dpr = clamp_device_pixel_ratio(device_pixel_ratio);
        let (pixel_width, pixel_height, len) = backing_size(width, height, dpr)?;
        Ok(Self {
            width,
            height,
            device_pixel_ratio: dpr,
            pixel_width,
            pixel_height,
            pixels: vec![0; len],
        })
    }

    /// Logical width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Logical height.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    /// Width of the backing buffer in device pixels.
    pub fn pixel_width(&self) -> usize {
        self.pixel_width
    }

    /// Height of the backing buffer in device pixels.
    pub fn pixel_height(&self) -> usize {
        self.pixel_height
    }

    /// Row-major RGBA8 bytes, `pixel_width * pixel_height * 4` long.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA of a device pixel, or `None` outside the buffer.
    pub fn pixel(&self, px: usize, py: usize) -> Option<[u8; 4]> {
        if px >= self.pixel_width || py >= self.pixel_height {
            return None;
        }
        let i = (py * self.pixel_width + px) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Resets every pixel to transparent black.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// Reallocates the buffer for a new container size, keeping the pixel
    /// ratio. Contents are cleared.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), FxError> {
        let (pixel_width, pixel_height, len) = backing_size(width, height, self.device_pixel_ratio)?;
        self.width = width;
        self.height = height;
        self.pixel_width = pixel_width;
        self.pixel_height = pixel_height;
        self.pixels.clear();
        self.pixels.resize(len, 0);
        Ok(())
    }

    /// Fills a circle of logical `radius` centred at `center`.
    ///
    /// A pixel is covered when its centre lies inside the circle. Circles too
    /// small to cover any pixel centre still light the pixel under `center`,
    /// so sub-pixel dust stays visible.
    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Srgb, alpha: f32) {
        if !center.is_finite() || !radius.is_finite() || radius <= 0.0 {
            return;
        }
        let c = center * self.device_pixel_ratio;
        let r = radius * self.device_pixel_ratio;
        let r2 = r * r;

        let x0 = (c.x - r).floor().max(0.0) as usize;
        let y0 = (c.y - r).floor().max(0.0) as usize;
        let x1 = ((c.x + r).ceil().max(0.0) as usize).min(self.pixel_width);
        let y1 = ((c.y + r).ceil().max(0.0) as usize).min(self.pixel_height);

        let mut covered = false;
        for py in y0..y1 {
            for px in x0..x1 {
                let d = Vec2::new(px as f32 + 0.5, py as f32 + 0.5) - c;
                if d.length_squared() <= r2 {
                    self.blend(px, py, color, alpha);
                    covered = true;
                }
            }
        }
        if !covered && c.x >= 0.0 && c.y >= 0.0 {
            self.blend(c.x as usize, c.y as usize, color, alpha);
        }
    }

    /// Fills an axis-aligned square whose top-left corner is `origin`.
    pub fn fill_square(&mut self, origin: Vec2, size: f32, color: Srgb, alpha: f32) {
        self.fill_rect(origin, Vec2::splat(size), color, alpha);
    }

    /// Fills an axis-aligned rectangle whose top-left corner is `origin`.
    ///
    /// Edges snap outward to whole device pixels, so any non-empty rectangle
    /// touching the buffer covers at least one pixel.
    pub fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Srgb, alpha: f32) {
        if !origin.is_finite() || !size.is_finite() || size.x <= 0.0 || size.y <= 0.0 {
            return;
        }
        let lo = origin * self.device_pixel_ratio;
        let hi = (origin + size) * self.device_pixel_ratio;
        if hi.x <= 0.0 || hi.y <= 0.0 {
            return;
        }
        let x0 = lo.x.floor().max(0.0) as usize;
        let y0 = lo.y.floor().max(0.0) as usize;
        let x1 = (hi.x.ceil() as usize).min(self.pixel_width);
        let y1 = (hi.y.ceil() as usize).min(self.pixel_height);
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, color, alpha);
            }
        }
    }

    /// Fills a square rotated 45 degrees: every pixel whose centre is within
    /// `half_diagonal` of `center` in the L1 norm.
    pub fn fill_diamond(&mut self, center: Vec2, half_diagonal: f32, color: Srgb, alpha: f32) {
        if !center.is_finite() || !half_diagonal.is_finite() || half_diagonal <= 0.0 {
            return;
        }
        let c = center * self.device_pixel_ratio;
        let h = half_diagonal * self.device_pixel_ratio;
        let (xs, ys) = self.device_span(c, h);
        for py in ys {
            for px in xs.clone() {
                let d = Vec2::new(px as f32 + 0.5, py as f32 + 0.5) - c;
                if d.x.abs() + d.y.abs() <= h {
                    self.blend(px, py, color, alpha);
                }
            }
        }
    }

    /// Strokes a circle outline of logical `radius` and line `width`.
    ///
    /// With `dashes > 0` the ring is split into `dashes` equal arcs each
    /// followed by an equal gap, starting at angle `phase` (radians,
    /// clockwise in screen space).
    #[allow(clippy::too_many_arguments)]
    pub fn stroke_ring(
        &mut self,
        center: Vec2,
        radius: f32,
        width: f32,
        color: Srgb,
        alpha: f32,
        dashes: u32,
        phase: f32,
    ) {
        if !center.is_finite() || !(radius > 0.0 && width > 0.0) || !radius.is_finite() {
            return;
        }
        let c = center * self.device_pixel_ratio;
        let r = radius * self.device_pixel_ratio;
        let half = width * self.device_pixel_ratio / 2.0;
        let segment = if dashes > 0 {
            std::f32::consts::PI / dashes as f32
        } else {
            0.0
        };
        let (xs, ys) = self.device_span(c, r + half);
        for py in ys {
            for px in xs.clone() {
                let d = Vec2::new(px as f32 + 0.5, py as f32 + 0.5) - c;
                if (d.length() - r).abs() > half {
                    continue;
                }
                if dashes > 0 {
                    let angle = (d.y.atan2(d.x) - phase).rem_euclid(std::f32::consts::TAU);
                    if (angle / segment) as u32 % 2 == 1 {
                        continue;
                    }
                }
                self.blend(px, py, color, alpha);
            }
        }
    }

    /// Device pixel ranges covering a box of half-size `extent` around `c`.
    fn device_span(&self, c: Vec2, extent: f32) -> (std::ops::Range<usize>, std::ops::Range<usize>) {
        let x0 = (c.x - extent).floor().max(0.0) as usize;
        let y0 = (c.y - extent).floor().max(0.0) as usize;
        let x1 = ((c.x + extent).ceil().max(0.0) as usize).min(self.pixel_width);
        let y1 = ((c.y + extent).ceil().max(0.0) as usize).min(self.pixel_height);
        (x0..x1, y0..y1)
    }

    /// Source-over composite of one device pixel.
    fn blend(&mut self, px: usize, py: usize, color: Srgb, alpha: f32) {
        if px >= self.pixel_width || py >= self.pixel_height {
            return;
        }
        let sa = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 0.0 };
        if sa == 0.0 {
            return;
        }
        let i = (py * self.pixel_width + px) * 4;
        let dst = &mut self.pixels[i..i + 4];
        let da = dst[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        let src = [color.r, color.g, color.b];
        for (d, s) in dst.iter_mut().take(3).zip(src) {
            let mixed = (s as f32 * sa + *d as f32 * da * (1.0 - sa)) / out_a;
            *d = mixed.round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}

/// Clamps a reported device pixel ratio into (0, [`MAX_DEVICE_PIXEL_RATIO`]].
pub fn clamp_device_pixel_ratio(dpr: f32) -> f32 {
    if dpr.is_finite() && dpr > 0.0 {
        dpr.min(MAX_DEVICE_PIXEL_RATIO)
    } else {
        1.0
    }
}

fn backing_size(width: u32, height: u32, dpr: f32) -> Result<(usize, usize, usize), FxError> {
    if width == 0 || height == 0 {
        return Err(FxError::InvalidDimensions);
    }
    let pw = ((width as f32 * dpr).ceil() as usize).max(1);
    let ph = ((height as f32 * dpr).ceil() as usize).max(1);
    let len = pw
        .checked_mul(ph)
        .and_then(|n| n.checked_mul(4))
        .ok_or(FxError::InvalidDimensions)?;
    Ok((pw, ph, len))
}
