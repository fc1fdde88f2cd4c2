//! 8-bit sRGB colors and the gold-dust tone set.
//!
//! Colors serialize as `"#rrggbb"` strings so scenes and params stay
//! human-editable.

use crate::error::FxError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Warm metallic gold, the dominant particle tone.
pub const GOLD: Srgb = Srgb::new(0xd4, 0xaf, 0x37);
/// Pale champagne gold used for the secondary tone.
pub const PALE_GOLD: Srgb = Srgb::new(0xfc, 0xf6, 0xba);
/// Bright white used for the rarest tier and for sparkle flashes.
pub const WHITE: Srgb = Srgb::new(0xff, 0xff, 0xff);
/// Default page background snapshots are composited over.
pub const NIGHT: Srgb = Srgb::new(0x0a, 0x0a, 0x0a);

/// sRGB color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Srgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Srgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `"#d4af37"` or `"d4af37"` (case insensitive).
    ///
    /// Returns `FxError::InvalidColor` unless the input is exactly six hex digits.
    pub fn from_hex(hex: &str) -> Result<Srgb, FxError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(FxError::InvalidColor(format!(
                "expected 6 hex digits, got '{hex}'"
            )));
        }
        let channel = |range: std::ops::Range<usize>, label: &str| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|e| FxError::InvalidColor(format!("invalid {label} component: {e}")))
        };
        Ok(Srgb {
            r: channel(0..2, "red")?,
            g: channel(2..4, "green")?,
            b: channel(4..6, "blue")?,
        })
    }

    /// Formats as lowercase `"#rrggbb"`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Components as `[r, g, b]` in [0, 1].
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

impl Serialize for Srgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Srgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Srgb::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
