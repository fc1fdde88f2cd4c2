#![deny(unsafe_code)]
//! Text dissolution effect.
//!
//! A string is rasterized into an opacity mask the size of its container and
//! the mask is sampled on a fixed grid; every opaque sample becomes a glyph
//! point whose origin is that mask coordinate and whose start position is a
//! random spot around the container. Over the reveal duration points are
//! switched on in index order, each springing from its start position back to
//! its origin. Once revealed, points keep reacting to the pointer and settle
//! back onto the glyphs when it leaves.
//!
//! Only active points are updated and drawn, so the reveal never changes the
//! physics of points that are already visible.

pub mod reveal;
pub mod sample;

use glam::Vec2;
use sandfx_core::color::{Srgb, GOLD, PALE_GOLD, WHITE};
use sandfx_core::glyph::{BitmapFontRasterizer, FontDescriptor, GlyphRasterizer};
use sandfx_core::params::{param_f32, param_f32_in, param_string, param_usize, param_usize_in};
use sandfx_core::surface::clamp_device_pixel_ratio;
use sandfx_core::physics::{repel, spring};
use sandfx_core::pointer::PointerState;
use sandfx_core::prng::Xorshift64;
use sandfx_core::{Effect, FxError, Surface};
use serde_json::{json, Value};

pub use reveal::{active_count, reveal_progress, RevealOrder};
pub use sample::{font_size_for, sample_origins};

/// Mask sampling grid spacing in logical pixels.
const DEFAULT_STRIDE: usize = 2;
const MAX_STRIDE: usize = 64;
/// Mask alpha a sample must exceed to become a point.
const DEFAULT_ALPHA_THRESHOLD: u8 = 128;
/// Time for every point to become active.
const DEFAULT_REVEAL_MS: f32 = 2500.0;
const DEFAULT_REPULSION_RADIUS: f32 = 100.0;
const DEFAULT_REPULSION_STRENGTH: f32 = 2.0;
/// Restoring impulse per pixel of displacement.
const DEFAULT_SPRING: f32 = 0.05;
const DEFAULT_DAMPING: f32 = 0.9;
/// Per-point, per-frame probability of a white sparkle.
const DEFAULT_FLASH_CHANCE: f32 = 0.02;
/// Tone draws above this are pale gold.
const DEFAULT_PALE_THRESHOLD: f32 = 0.8;
/// Tone draws above this are white.
const DEFAULT_WHITE_THRESHOLD: f32 = 0.95;
/// Font size as a fraction of container width.
const DEFAULT_FONT_SCALE: f32 = 0.25;
const DEFAULT_MAX_FONT_PX: f32 = 140.0;
/// Vertical shift of the text from the container centre; leaves room for
/// descenders.
const DEFAULT_TEXT_OFFSET_Y: f32 = -10.0;
/// Widest the text may be, as a fraction of container width.
const TEXT_FIT: f32 = 0.9;
const DEFAULT_FONT_FAMILY: &str = "serif";
const MIN_POINT_SIZE: f32 = 0.5;
const MAX_POINT_SIZE: f32 = 2.0;

/// Color tier of a glyph point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Gold,
    Pale,
    White,
}

impl Tone {
    /// Picks a tier from a uniform draw in [0, 1).
    pub fn from_draw(draw: f32, pale_threshold: f32, white_threshold: f32) -> Self {
        if draw > white_threshold {
            Tone::White
        } else if draw > pale_threshold {
            Tone::Pale
        } else {
            Tone::Gold
        }
    }

    pub fn color(self) -> Srgb {
        match self {
            Tone::Gold => GOLD,
            Tone::Pale => PALE_GOLD,
            Tone::White => WHITE,
        }
    }
}

/// Tuning for sampling, reveal and physics.
#[derive(Debug, Clone, PartialEq)]
pub struct DissolveParams {
    pub stride: usize,
    pub alpha_threshold: u8,
    pub reveal_ms: f32,
    pub repulsion_radius: f32,
    pub repulsion_strength: f32,
    pub spring: f32,
    pub damping: f32,
    pub flash_chance: f32,
    pub pale_threshold: f32,
    pub white_threshold: f32,
    pub font_scale: f32,
    pub max_font_px: f32,
    pub text_offset_y: f32,
    pub font_family: String,
    pub bold: bool,
    pub reveal_order: RevealOrder,
    /// Backing-store scale the mask is rasterized and sampled at.
    pub device_pixel_ratio: f32,
}

impl Default for DissolveParams {
    fn default() -> Self {
        Self {
            stride: DEFAULT_STRIDE,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
            reveal_ms: DEFAULT_REVEAL_MS,
            repulsion_radius: DEFAULT_REPULSION_RADIUS,
            repulsion_strength: DEFAULT_REPULSION_STRENGTH,
            spring: DEFAULT_SPRING,
            damping: DEFAULT_DAMPING,
            flash_chance: DEFAULT_FLASH_CHANCE,
            pale_threshold: DEFAULT_PALE_THRESHOLD,
            white_threshold: DEFAULT_WHITE_THRESHOLD,
            font_scale: DEFAULT_FONT_SCALE,
            max_font_px: DEFAULT_MAX_FONT_PX,
            text_offset_y: DEFAULT_TEXT_OFFSET_Y,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            bold: true,
            reveal_order: RevealOrder::Raster,
            device_pixel_ratio: 1.0,
        }
    }
}

impl DissolveParams {
    /// Reads overrides from a JSON object, keeping defaults for anything
    /// missing or out of range.
    pub fn from_json(params: &Value) -> Self {
        let stride = param_usize_in(params, "stride", DEFAULT_STRIDE, 1, MAX_STRIDE);
        let alpha_threshold = u8::try_from(param_usize(
            params,
            "alpha_threshold",
            DEFAULT_ALPHA_THRESHOLD as usize,
        ))
        .unwrap_or(DEFAULT_ALPHA_THRESHOLD);
        let reveal_order = RevealOrder::from_name(&param_string(params, "reveal_order", "raster"))
            .unwrap_or_default();
        Self {
            stride,
            alpha_threshold,
            reveal_ms: param_f32_in(params, "reveal_ms", DEFAULT_REVEAL_MS, 0.0, f32::MAX),
            repulsion_radius: param_f32_in(
                params,
                "repulsion_radius",
                DEFAULT_REPULSION_RADIUS,
                0.0,
                f32::MAX,
            ),
            repulsion_strength: param_f32(params, "repulsion_strength", DEFAULT_REPULSION_STRENGTH),
            spring: param_f32_in(params, "spring", DEFAULT_SPRING, 0.0, 1.0),
            damping: param_f32_in(params, "damping", DEFAULT_DAMPING, 0.0, 1.0),
            flash_chance: param_f32_in(params, "flash_chance", DEFAULT_FLASH_CHANCE, 0.0, 1.0),
            pale_threshold: param_f32_in(params, "pale_threshold", DEFAULT_PALE_THRESHOLD, 0.0, 1.0),
            white_threshold: param_f32_in(
                params,
                "white_threshold",
                DEFAULT_WHITE_THRESHOLD,
                0.0,
                1.0,
            ),
            font_scale: param_f32_in(params, "font_scale", DEFAULT_FONT_SCALE, 0.0, 10.0),
            max_font_px: param_f32_in(params, "max_font_px", DEFAULT_MAX_FONT_PX, 0.0, f32::MAX),
            text_offset_y: param_f32(params, "text_offset_y", DEFAULT_TEXT_OFFSET_Y),
            font_family: param_string(params, "font_family", DEFAULT_FONT_FAMILY),
            bold: params.get("bold").and_then(Value::as_bool).unwrap_or(true),
            reveal_order,
            device_pixel_ratio: clamp_device_pixel_ratio(param_f32(
                params,
                "device_pixel_ratio",
                1.0,
            )),
        }
    }
}

/// One sampled pixel of the text, animated as a particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphPoint {
    pub position: Vec2,
    /// Mask coordinate the point settles on.
    pub origin: Vec2,
    pub velocity: Vec2,
    /// Side of the rendered square in logical pixels.
    pub size: f32,
    pub tone: Tone,
}

impl GlyphPoint {
    /// A point at rest on its origin.
    pub fn at_origin(origin: Vec2) -> Self {
        Self {
            position: origin,
            origin,
            velocity: Vec2::ZERO,
            size: MIN_POINT_SIZE,
            tone: Tone::Gold,
        }
    }

    pub fn distance_to_origin(&self) -> f32 {
        self.position.distance(self.origin)
    }
}

/// Advances one active glyph point by one frame: pointer repulsion, spring
/// towards the origin, damping, then integration.
pub fn integrate(point: &mut GlyphPoint, pointer: Vec2, params: &DissolveParams) {
    repel(
        point.position,
        &mut point.velocity,
        pointer,
        params.repulsion_radius,
        params.repulsion_strength,
    );
    spring(point.position, &mut point.velocity, point.origin, params.spring);
    point.velocity *= params.damping;
    point.position += point.velocity;
}

/// The text dissolution effect.
pub struct TextDissolve {
    text: String,
    width: u32,
    height: u32,
    font_px: f32,
    points: Vec<GlyphPoint>,
    active: usize,
    /// Elapsed time at which the current text started revealing.
    reveal_started_ms: f64,
    last_elapsed_ms: f64,
    params: DissolveParams,
    pointer: PointerState,
    rasterizer: Box<dyn GlyphRasterizer>,
    rng: Xorshift64,
}

impl TextDissolve {
    /// Samples `text` for a `width` x `height` container.
    ///
    /// Returns `FxError::InvalidDimensions` if the rasterizer cannot produce a
    /// mask of that size. Empty or whitespace-only text yields no points.
    pub fn new(
        text: &str,
        width: u32,
        height: u32,
        seed: u64,
        params: DissolveParams,
        pointer: PointerState,
        rasterizer: Box<dyn GlyphRasterizer>,
    ) -> Result<Self, FxError> {
        let mut effect = Self {
            text: String::new(),
            width,
            height,
            font_px: 0.0,
            points: Vec::new(),
            active: 0,
            reveal_started_ms: 0.0,
            last_elapsed_ms: 0.0,
            params,
            pointer,
            rasterizer,
            rng: Xorshift64::new(seed),
        };
        effect.sample(text)?;
        Ok(effect)
    }

    /// Builds the effect with the bundled bitmap font and JSON params.
    pub fn from_json(
        text: &str,
        width: u32,
        height: u32,
        seed: u64,
        json_params: &Value,
        pointer: PointerState,
    ) -> Result<Self, FxError> {
        Self::new(
            text,
            width,
            height,
            seed,
            DissolveParams::from_json(json_params),
            pointer,
            Box::new(BitmapFontRasterizer),
        )
    }

    /// Replaces the text, re-sampling at the current container size and
    /// restarting the reveal from the next frame.
    pub fn set_text(&mut self, text: &str) -> Result<(), FxError> {
        self.sample(text)?;
        self.reveal_started_ms = self.last_elapsed_ms;
        Ok(())
    }

    fn sample(&mut self, text: &str) -> Result<(), FxError> {
        let family = FontDescriptor::new(self.params.font_family.clone(), 0.0)
            .with_bold(self.params.bold);
        self.font_px = font_size_for(
            text,
            self.width,
            &family,
            self.rasterizer.as_ref(),
            self.params.font_scale,
            self.params.max_font_px,
            TEXT_FIT,
        );
        // Rasterize at backing-store resolution, then map samples back to
        // logical pixels.
        let dpr = self.params.device_pixel_ratio;
        let font = family
            .with_size(self.font_px * dpr)
            .with_offset(Vec2::new(0.0, self.params.text_offset_y * dpr));
        let mask_width = (self.width as f32 * dpr).round() as u32;
        let mask_height = (self.height as f32 * dpr).round() as u32;
        let mask = self
            .rasterizer
            .rasterize(text, &font, mask_width, mask_height)?;
        let device_stride = (self.params.stride as f32 * dpr).round().max(1.0) as usize;
        let mut origins: Vec<Vec2> = sample_origins(&mask, device_stride, self.params.alpha_threshold)
            .into_iter()
            .map(|p| p / dpr)
            .collect();
        self.params.reveal_order.arrange(&mut origins, &mut self.rng);

        let w = self.width as f32;
        let h = self.height as f32;
        let rng = &mut self.rng;
        let (pale, white) = (self.params.pale_threshold, self.params.white_threshold);
        self.points = origins
            .into_iter()
            .map(|origin| GlyphPoint {
                position: Vec2::new(rng.next_range(-0.5 * w, 1.5 * w), rng.next_range(-0.5 * h, 1.5 * h)),
                origin,
                velocity: Vec2::ZERO,
                size: rng.next_range(MIN_POINT_SIZE, MAX_POINT_SIZE),
                tone: Tone::from_draw(rng.next_f32(), pale, white),
            })
            .collect();
        self.text = text.to_string();
        self.active = 0;
        log::debug!(
            "dissolve: sampled {} points from {:?} at {:.1}px in {}x{}",
            self.points.len(),
            self.text,
            self.font_px,
            self.width,
            self.height
        );
        Ok(())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Font size the current text was rasterized at.
    pub fn font_px(&self) -> f32 {
        self.font_px
    }

    pub fn points(&self) -> &[GlyphPoint] {
        &self.points
    }

    pub fn total_points(&self) -> usize {
        self.points.len()
    }

    /// Points revealed as of the last step.
    pub fn active_points(&self) -> usize {
        self.active
    }

    /// Reveal progress in [0, 1] as of the last step.
    pub fn reveal_progress(&self) -> f64 {
        reveal_progress(
            self.last_elapsed_ms - self.reveal_started_ms,
            self.params.reveal_ms as f64,
        )
    }

    pub fn dissolve_params(&self) -> &DissolveParams {
        &self.params
    }
}

impl Effect for TextDissolve {
    fn name(&self) -> &'static str {
        "dissolve"
    }

    fn step(&mut self, elapsed_ms: f64) -> Result<(), FxError> {
        self.last_elapsed_ms = elapsed_ms;
        let since_reveal = elapsed_ms - self.reveal_started_ms;
        self.active = active_count(self.points.len(), since_reveal, self.params.reveal_ms as f64)
            .max(self.active);
        let pointer = self.pointer.position();
        for point in &mut self.points[..self.active] {
            integrate(point, pointer, &self.params);
        }
        Ok(())
    }

    fn render(&mut self, surface: &mut Surface) {
        surface.clear();
        let flash = self.params.flash_chance as f64;
        for point in &self.points[..self.active] {
            let color = if self.rng.chance(flash) {
                WHITE
            } else {
                point.tone.color()
            };
            surface.fill_square(point.position, point.size, color, 1.0);
        }
    }

    /// Records the new container size for the next `set_text`; existing
    /// points are not re-sampled.
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn params(&self) -> Value {
        let p = &self.params;
        json!({
            "stride": p.stride,
            "alpha_threshold": p.alpha_threshold,
            "reveal_ms": p.reveal_ms,
            "repulsion_radius": p.repulsion_radius,
            "repulsion_strength": p.repulsion_strength,
            "spring": p.spring,
            "damping": p.damping,
            "flash_chance": p.flash_chance,
            "pale_threshold": p.pale_threshold,
            "white_threshold": p.white_threshold,
            "font_scale": p.font_scale,
            "max_font_px": p.max_font_px,
            "text_offset_y": p.text_offset_y,
            "font_family": p.font_family,
            "bold": p.bold,
            "reveal_order": p.reveal_order.name(),
            "device_pixel_ratio": p.device_pixel_ratio,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "stride": {
                "type": "integer",
                "default": DEFAULT_STRIDE,
                "min": 1,
                "max": MAX_STRIDE,
                "description": "Mask sampling grid spacing in pixels"
            },
            "alpha_threshold": {
                "type": "integer",
                "default": DEFAULT_ALPHA_THRESHOLD,
                "min": 0,
                "max": 255,
                "description": "Mask alpha a sample must exceed to become a point"
            },
            "reveal_ms": {
                "type": "number",
                "default": DEFAULT_REVEAL_MS,
                "min": 0.0,
                "description": "Time until every point is active"
            },
            "repulsion_radius": {
                "type": "number",
                "default": DEFAULT_REPULSION_RADIUS,
                "min": 0.0,
                "description": "Pointer distance (px) inside which points are pushed away"
            },
            "repulsion_strength": {
                "type": "number",
                "default": DEFAULT_REPULSION_STRENGTH,
                "description": "Impulse applied at zero distance from the pointer"
            },
            "spring": {
                "type": "number",
                "default": DEFAULT_SPRING,
                "min": 0.0,
                "max": 1.0,
                "description": "Restoring impulse per pixel of displacement from the origin"
            },
            "damping": {
                "type": "number",
                "default": DEFAULT_DAMPING,
                "min": 0.0,
                "max": 1.0,
                "description": "Fraction of velocity kept each frame"
            },
            "flash_chance": {
                "type": "number",
                "default": DEFAULT_FLASH_CHANCE,
                "min": 0.0,
                "max": 1.0,
                "description": "Per-frame probability that a point sparkles white"
            },
            "pale_threshold": {
                "type": "number",
                "default": DEFAULT_PALE_THRESHOLD,
                "min": 0.0,
                "max": 1.0,
                "description": "Tone draws above this are pale gold"
            },
            "white_threshold": {
                "type": "number",
                "default": DEFAULT_WHITE_THRESHOLD,
                "min": 0.0,
                "max": 1.0,
                "description": "Tone draws above this are white"
            },
            "font_scale": {
                "type": "number",
                "default": DEFAULT_FONT_SCALE,
                "min": 0.0,
                "max": 10.0,
                "description": "Font size as a fraction of container width"
            },
            "max_font_px": {
                "type": "number",
                "default": DEFAULT_MAX_FONT_PX,
                "min": 0.0,
                "description": "Upper bound on the font size"
            },
            "text_offset_y": {
                "type": "number",
                "default": DEFAULT_TEXT_OFFSET_Y,
                "description": "Vertical shift of the text from the container centre (px)"
            },
            "device_pixel_ratio": {
                "type": "number",
                "default": 1.0,
                "min": 0.0,
                "max": sandfx_core::surface::MAX_DEVICE_PIXEL_RATIO,
                "description": "Backing-store scale the text mask is sampled at"
            },
            "font_family": {
                "type": "string",
                "default": DEFAULT_FONT_FAMILY,
                "description": "Requested font family (the bitmap font ignores it)"
            },
            "bold": {
                "type": "boolean",
                "default": true,
                "description": "Thicken glyph strokes"
            },
            "reveal_order": {
                "type": "string",
                "default": "raster",
                "enum": ["raster", "left_to_right", "random"],
                "description": "Which points are revealed first"
            }
        })
    }
}
