//! Glyph rasterization capability.
//!
//! Text effects only need an opacity mask of a string; how that mask is
//! produced is behind [`GlyphRasterizer`]. The bundled backend,
//! [`BitmapFontRasterizer`], scales the public-domain 8x8 `font8x8` glyphs with
//! nearest-neighbour sampling and needs no system fonts.

use font8x8::legacy::BASIC_LEGACY;
use glam::Vec2;

use crate::error::FxError;

/// Glyph cells per character on each axis.
const GLYPH_CELLS: usize = 8;
/// Vertical advance between lines, in glyph cells.
const LINE_ADVANCE_CELLS: f32 = 10.0;

/// What to draw the text with.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    /// Requested family. Backends without font selection ignore it.
    pub family: String,
    /// Em height in logical pixels.
    pub size_px: f32,
    pub bold: bool,
    /// Shift of the text block from the mask centre, in mask pixels.
    /// Negative `y` moves it up.
    pub offset: Vec2,
}

impl FontDescriptor {
    pub fn new(family: impl Into<String>, size_px: f32) -> Self {
        Self {
            family: family.into(),
            size_px,
            bold: false,
            offset: Vec2::ZERO,
        }
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_size(mut self, size_px: f32) -> Self {
        self.size_px = size_px;
        self
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }
}

/// Row-major 8-bit opacity grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpacityMask {
    width: u32,
    height: u32,
    alpha: Vec<u8>,
}

impl OpacityMask {
    /// Fully transparent mask. Zero-sized masks are rejected.
    pub fn new(width: u32, height: u32) -> Result<Self, FxError> {
        if width == 0 || height == 0 {
            return Err(FxError::InvalidDimensions);
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or(FxError::InvalidDimensions)?;
        Ok(Self {
            width,
            height,
            alpha: vec![0; len],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Opacity at `(x, y)`; zero outside the mask.
    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.alpha[y as usize * self.width as usize + x as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, alpha: u8) {
        if x < self.width && y < self.height {
            self.alpha[y as usize * self.width as usize + x as usize] = alpha;
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.alpha
    }

    /// Number of pixels strictly above `threshold`.
    pub fn coverage(&self, threshold: u8) -> usize {
        self.alpha.iter().filter(|&&a| a > threshold).count()
    }
}

/// Turns a string into an opacity mask.
pub trait GlyphRasterizer {
    /// Bounding box of `text` laid out with `font`, in logical pixels.
    fn measure(&self, text: &str, font: &FontDescriptor) -> Vec2;

    /// Draws `text` centred in a `width` x `height` mask.
    fn rasterize(
        &self,
        text: &str,
        font: &FontDescriptor,
        width: u32,
        height: u32,
    ) -> Result<OpacityMask, FxError>;
}

/// Nearest-neighbour scaled 8x8 bitmap font.
///
/// Lines split on `'\n'` and are centred independently. Characters outside
/// ASCII render as `'?'`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapFontRasterizer;

impl BitmapFontRasterizer {
    fn cell_size(font: &FontDescriptor) -> f32 {
        if font.size_px.is_finite() && font.size_px > 0.0 {
            font.size_px / GLYPH_CELLS as f32
        } else {
            0.0
        }
    }
}

impl GlyphRasterizer for BitmapFontRasterizer {
    fn measure(&self, text: &str, font: &FontDescriptor) -> Vec2 {
        let cell = Self::cell_size(font);
        let lines: Vec<&str> = text.split('\n').collect();
        let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        if widest == 0 || cell == 0.0 {
            return Vec2::ZERO;
        }
        let width = (widest * GLYPH_CELLS) as f32 * cell + if font.bold { cell } else { 0.0 };
        let height = ((lines.len() - 1) as f32 * LINE_ADVANCE_CELLS + GLYPH_CELLS as f32) * cell;
        Vec2::new(width, height)
    }

    fn rasterize(
        &self,
        text: &str,
        font: &FontDescriptor,
        width: u32,
        height: u32,
    ) -> Result<OpacityMask, FxError> {
        let mut mask = OpacityMask::new(width, height)?;
        let cell = Self::cell_size(font);
        if cell == 0.0 {
            return Ok(mask);
        }

        let block = self.measure(text, font);
        let top = (height as f32 - block.y) / 2.0 + font.offset.y;
        for (row, line) in text.split('\n').enumerate() {
            let line_width = (line.chars().count() * GLYPH_CELLS) as f32 * cell;
            let left = (width as f32 - line_width) / 2.0 + font.offset.x;
            let y0 = top + row as f32 * LINE_ADVANCE_CELLS * cell;
            for (col, ch) in line.chars().enumerate() {
                let x0 = left + (col * GLYPH_CELLS) as f32 * cell;
                for (gy, bits) in glyph_rows(ch, font.bold).iter().enumerate() {
                    for gx in 0..=GLYPH_CELLS {
                        if bits & (1 << gx) != 0 {
                            let origin = Vec2::new(x0 + gx as f32 * cell, y0 + gy as f32 * cell);
                            fill_cell(&mut mask, origin, cell);
                        }
                    }
                }
            }
        }
        Ok(mask)
    }
}

/// Bitmap rows for `ch`; bit `n` is column `n` from the left. Bold widens
/// every stroke one column to the right.
fn glyph_rows(ch: char, bold: bool) -> [u16; GLYPH_CELLS] {
    let index = if ch.is_whitespace() {
        b' ' as usize
    } else if ch.is_ascii() {
        ch as usize
    } else {
        b'?' as usize
    };
    let mut rows = [0u16; GLYPH_CELLS];
    for (row, &bits) in rows.iter_mut().zip(BASIC_LEGACY[index].iter()) {
        let bits = bits as u16;
        *row = if bold { bits | (bits << 1) } else { bits };
    }
    rows
}

/// Sets every mask pixel whose centre falls inside the square cell.
fn fill_cell(mask: &mut OpacityMask, origin: Vec2, cell: f32) {
    let span = |lo: f32, limit: u32| {
        let start = (lo - 0.5).ceil().max(0.0) as u32;
        let end = ((lo + cell - 0.5).ceil().max(0.0) as u32).min(limit);
        start..end
    };
    for y in span(origin.y, mask.height) {
        for x in span(origin.x, mask.width) {
            mask.set(x, y, u8::MAX);
        }
    }
}
