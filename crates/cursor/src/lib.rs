#![deny(unsafe_code)]
//! Magic cursor.
//!
//! A small gold diamond trails the pointer on a stiff, slightly overdamped
//! spring, so it snaps to where the pointer went without overshooting. Two
//! rings circle it: a dashed inner ring that turns clockwise and gently
//! pulses, and a faint solid outer ring that turns the other way at half the
//! speed. The whole group grows while the pointer is over something
//! interactive and shrinks while a button is held.
//!
//! The follower starts at the top-left corner. When the pointer leaves the
//! view it keeps heading for the last position it saw.

use std::f32::consts::TAU;
use std::ops::{Add, Mul, Sub};

use glam::Vec2;
use sandfx_core::color::{Srgb, GOLD, PALE_GOLD};
use sandfx_core::params::{param_color, param_f32_in, param_usize_in};
use sandfx_core::pointer::PointerState;
use sandfx_core::{Effect, FxError, Surface};
use serde_json::{json, Value};

/// Diamond outline.
pub const BRONZE: Srgb = Srgb::new(0xaa, 0x77, 0x1c);
/// Outer ring.
pub const DEEP_GOLD: Srgb = Srgb::new(0x8f, 0x72, 0x18);

const DEFAULT_STIFFNESS: f32 = 1200.0;
const DEFAULT_DAMPING: f32 = 40.0;
const DEFAULT_MASS: f32 = 0.3;
const DEFAULT_HOVER_SCALE: f32 = 1.5;
const DEFAULT_PRESS_SCALE: f32 = 0.7;
const DEFAULT_INNER_PERIOD_MS: f32 = 4000.0;
const DEFAULT_OUTER_PERIOD_MS: f32 = 8000.0;
const DEFAULT_PULSE_PERIOD_MS: f32 = 1000.0;
const DEFAULT_PULSE_AMOUNT: f32 = 0.1;
const DEFAULT_DASHES: usize = 16;
const MAX_DASHES: usize = 256;

/// Spring that animates the group scale between its states.
const SCALE_SPRING: Spring = Spring {
    stiffness: 500.0,
    damping: 25.0,
    mass: 1.0,
};

/// Longest integration substep in seconds.
const MAX_SUBSTEP_S: f32 = 0.001;
/// Frame gaps longer than this (a backgrounded tab) are treated as this long.
const MAX_FRAME_S: f32 = 0.1;

/// Side of the unrotated diamond square, logical px.
const DIAMOND_SIDE: f32 = 12.0;
const BORDER: f32 = 1.0;
const INNER_RING_DIAMETER: f32 = 32.0;
const OUTER_RING_DIAMETER: f32 = 48.0;
const INNER_RING_ALPHA: f32 = 0.3;
const OUTER_RING_ALPHA: f32 = 0.12;
const GLOW_REACH: f32 = 14.0;
const GLOW_ALPHA: f32 = 0.8;
const GLOW_LAYERS: usize = 6;

/// A damped harmonic spring, in units of px and seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
}

impl Spring {
    /// Damping ratio; above 1 the spring settles without overshoot.
    pub fn damping_ratio(&self) -> f32 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }

    /// One semi-implicit Euler step of `dt` seconds towards `target`.
    pub fn advance<T>(&self, value: &mut T, velocity: &mut T, target: T, dt: f32)
    where
        T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f32, Output = T>,
    {
        let force = (target - *value) * self.stiffness - *velocity * self.damping;
        *velocity = *velocity + force * (dt / self.mass);
        *value = *value + *velocity * dt;
    }
}

/// Tunables for the cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorParams {
    pub follow: Spring,
    pub hover_scale: f32,
    pub press_scale: f32,
    pub inner_period_ms: f32,
    pub outer_period_ms: f32,
    pub pulse_period_ms: f32,
    pub pulse_amount: f32,
    pub dashes: usize,
    pub core_tone: Srgb,
    pub edge_tone: Srgb,
    pub ring_tone: Srgb,
    pub outer_ring_tone: Srgb,
}

impl Default for CursorParams {
    fn default() -> Self {
        Self {
            follow: Spring {
                stiffness: DEFAULT_STIFFNESS,
                damping: DEFAULT_DAMPING,
                mass: DEFAULT_MASS,
            },
            hover_scale: DEFAULT_HOVER_SCALE,
            press_scale: DEFAULT_PRESS_SCALE,
            inner_period_ms: DEFAULT_INNER_PERIOD_MS,
            outer_period_ms: DEFAULT_OUTER_PERIOD_MS,
            pulse_period_ms: DEFAULT_PULSE_PERIOD_MS,
            pulse_amount: DEFAULT_PULSE_AMOUNT,
            dashes: DEFAULT_DASHES,
            core_tone: PALE_GOLD,
            edge_tone: BRONZE,
            ring_tone: GOLD,
            outer_ring_tone: DEEP_GOLD,
        }
    }
}

impl CursorParams {
    /// Reads overrides from a JSON object; anything missing or out of range
    /// keeps its default.
    pub fn from_json(params: &Value) -> Self {
        let positive = |name: &str, default: f32| {
            let v = param_f32_in(params, name, default, 0.0, f32::MAX);
            if v > 0.0 {
                v
            } else {
                default
            }
        };
        Self {
            follow: Spring {
                stiffness: positive("stiffness", DEFAULT_STIFFNESS),
                damping: param_f32_in(params, "damping", DEFAULT_DAMPING, 0.0, f32::MAX),
                mass: positive("mass", DEFAULT_MASS),
            },
            hover_scale: positive("hover_scale", DEFAULT_HOVER_SCALE),
            press_scale: positive("press_scale", DEFAULT_PRESS_SCALE),
            inner_period_ms: positive("inner_period_ms", DEFAULT_INNER_PERIOD_MS),
            outer_period_ms: positive("outer_period_ms", DEFAULT_OUTER_PERIOD_MS),
            pulse_period_ms: positive("pulse_period_ms", DEFAULT_PULSE_PERIOD_MS),
            pulse_amount: param_f32_in(params, "pulse_amount", DEFAULT_PULSE_AMOUNT, 0.0, 1.0),
            dashes: param_usize_in(params, "dashes", DEFAULT_DASHES, 0, MAX_DASHES),
            core_tone: param_color(params, "core_tone", PALE_GOLD),
            edge_tone: param_color(params, "edge_tone", BRONZE),
            ring_tone: param_color(params, "ring_tone", GOLD),
            outer_ring_tone: param_color(params, "outer_ring_tone", DEEP_GOLD),
        }
    }
}

/// Position of `elapsed_ms` within a repeating period, in `[0, 1)`.
fn cycle(elapsed_ms: f64, period_ms: f32) -> f32 {
    (elapsed_ms / period_ms as f64).rem_euclid(1.0) as f32
}

/// The cursor effect.
pub struct MagicCursor {
    params: CursorParams,
    pointer: PointerState,
    target: Vec2,
    position: Vec2,
    velocity: Vec2,
    scale: f32,
    scale_velocity: f32,
    last_elapsed_ms: Option<f64>,
    elapsed_ms: f64,
}

impl MagicCursor {
    pub fn new(params: CursorParams, pointer: PointerState) -> Self {
        if params.follow.damping_ratio() < 1.0 {
            log::debug!(
                "cursor: follow spring is underdamped (ratio {:.3})",
                params.follow.damping_ratio()
            );
        }
        Self {
            params,
            pointer,
            target: Vec2::ZERO,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            scale: 1.0,
            scale_velocity: 0.0,
            last_elapsed_ms: None,
            elapsed_ms: 0.0,
        }
    }

    /// Builds the cursor from a JSON params object.
    pub fn from_json(json_params: &Value, pointer: PointerState) -> Self {
        Self::new(CursorParams::from_json(json_params), pointer)
    }

    /// Centre of the diamond in logical pixels.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Where the follower is heading.
    pub fn target(&self) -> Vec2 {
        self.target
    }

    /// Current group scale.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Scale the group is animating towards. A held button wins over hover.
    pub fn target_scale(&self) -> f32 {
        if self.pointer.is_pressed() {
            self.params.press_scale
        } else if self.pointer.is_hovering() {
            self.params.hover_scale
        } else {
            1.0
        }
    }

    /// Rotation of the inner and outer rings in radians. The inner ring turns
    /// clockwise in screen space, the outer one counter-clockwise.
    pub fn ring_angles(&self) -> (f32, f32) {
        (
            TAU * cycle(self.elapsed_ms, self.params.inner_period_ms),
            -TAU * cycle(self.elapsed_ms, self.params.outer_period_ms),
        )
    }

    /// Extra scale of the inner ring, rising from 1 to `1 + pulse_amount` and
    /// back once per pulse period.
    pub fn pulse(&self) -> f32 {
        let t = cycle(self.elapsed_ms, self.params.pulse_period_ms);
        1.0 + self.params.pulse_amount * (1.0 - (TAU * t).cos()) / 2.0
    }

    pub fn cursor_params(&self) -> &CursorParams {
        &self.params
    }

    fn frame_seconds(&self, elapsed_ms: f64) -> f32 {
        match self.last_elapsed_ms {
            Some(prev) => {
                let dt = ((elapsed_ms - prev) / 1000.0) as f32;
                if dt.is_finite() {
                    dt.clamp(0.0, MAX_FRAME_S)
                } else {
                    0.0
                }
            }
            None => 0.0,
        }
    }
}

impl Effect for MagicCursor {
    fn name(&self) -> &'static str {
        "cursor"
    }

    fn step(&mut self, elapsed_ms: f64) -> Result<(), FxError> {
        let dt = self.frame_seconds(elapsed_ms);
        if elapsed_ms.is_finite() {
            self.last_elapsed_ms = Some(elapsed_ms);
            self.elapsed_ms = elapsed_ms;
        }
        if self.pointer.is_present() {
            self.target = self.pointer.position();
        }
        let target_scale = self.target_scale();
        let substeps = (dt / MAX_SUBSTEP_S).ceil() as u32;
        if substeps == 0 {
            return Ok(());
        }
        let h = dt / substeps as f32;
        for _ in 0..substeps {
            self.params
                .follow
                .advance(&mut self.position, &mut self.velocity, self.target, h);
            SCALE_SPRING.advance(&mut self.scale, &mut self.scale_velocity, target_scale, h);
        }
        Ok(())
    }

    fn render(&mut self, surface: &mut Surface) {
        surface.clear();
        let c = self.position;
        let s = self.scale;
        let half_diagonal = DIAMOND_SIDE / 2.0 * std::f32::consts::SQRT_2;

        for layer in 0..GLOW_LAYERS {
            let reach = GLOW_REACH * (1.0 - layer as f32 / GLOW_LAYERS as f32);
            surface.fill_circle(
                c,
                (DIAMOND_SIDE / 2.0 + reach) * s,
                self.params.ring_tone,
                GLOW_ALPHA / GLOW_LAYERS as f32,
            );
        }

        let (inner_angle, outer_angle) = self.ring_angles();
        surface.stroke_ring(
            c,
            (OUTER_RING_DIAMETER / 2.0 - BORDER / 2.0) * s,
            BORDER * s,
            self.params.outer_ring_tone,
            OUTER_RING_ALPHA,
            0,
            outer_angle,
        );
        let inner_scale = s * self.pulse();
        surface.stroke_ring(
            c,
            (INNER_RING_DIAMETER / 2.0 - BORDER / 2.0) * inner_scale,
            BORDER * inner_scale,
            self.params.ring_tone,
            INNER_RING_ALPHA,
            self.params.dashes as u32,
            inner_angle,
        );

        surface.fill_diamond(c, half_diagonal * s, self.params.edge_tone, 1.0);
        surface.fill_diamond(
            c,
            (half_diagonal - BORDER * std::f32::consts::SQRT_2) * s,
            self.params.core_tone,
            1.0,
        );
    }

    fn resize(&mut self, _width: u32, _height: u32) {}

    fn params(&self) -> Value {
        json!({
            "stiffness": self.params.follow.stiffness,
            "damping": self.params.follow.damping,
            "mass": self.params.follow.mass,
            "hover_scale": self.params.hover_scale,
            "press_scale": self.params.press_scale,
            "inner_period_ms": self.params.inner_period_ms,
            "outer_period_ms": self.params.outer_period_ms,
            "pulse_period_ms": self.params.pulse_period_ms,
            "pulse_amount": self.params.pulse_amount,
            "dashes": self.params.dashes,
            "core_tone": self.params.core_tone,
            "edge_tone": self.params.edge_tone,
            "ring_tone": self.params.ring_tone,
            "outer_ring_tone": self.params.outer_ring_tone,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "stiffness": {
                "type": "number",
                "default": DEFAULT_STIFFNESS,
                "min": 0.0,
                "description": "Follow spring constant"
            },
            "damping": {
                "type": "number",
                "default": DEFAULT_DAMPING,
                "min": 0.0,
                "description": "Follow spring damping"
            },
            "mass": {
                "type": "number",
                "default": DEFAULT_MASS,
                "min": 0.0,
                "description": "Mass on the follow spring"
            },
            "hover_scale": {
                "type": "number",
                "default": DEFAULT_HOVER_SCALE,
                "min": 0.0,
                "description": "Scale while over something interactive"
            },
            "press_scale": {
                "type": "number",
                "default": DEFAULT_PRESS_SCALE,
                "min": 0.0,
                "description": "Scale while a button is held"
            },
            "inner_period_ms": {
                "type": "number",
                "default": DEFAULT_INNER_PERIOD_MS,
                "min": 0.0,
                "description": "One clockwise turn of the dashed ring"
            },
            "outer_period_ms": {
                "type": "number",
                "default": DEFAULT_OUTER_PERIOD_MS,
                "min": 0.0,
                "description": "One counter-clockwise turn of the outer ring"
            },
            "pulse_period_ms": {
                "type": "number",
                "default": DEFAULT_PULSE_PERIOD_MS,
                "min": 0.0,
                "description": "Length of one inner ring pulse"
            },
            "pulse_amount": {
                "type": "number",
                "default": DEFAULT_PULSE_AMOUNT,
                "min": 0.0,
                "max": 1.0,
                "description": "Extra inner ring scale at the top of a pulse"
            },
            "dashes": {
                "type": "integer",
                "default": DEFAULT_DASHES,
                "min": 0,
                "max": MAX_DASHES,
                "description": "Dashes on the inner ring; 0 draws it solid"
            },
            "core_tone": {
                "type": "color",
                "default": PALE_GOLD,
                "description": "Diamond fill"
            },
            "edge_tone": {
                "type": "color",
                "default": BRONZE,
                "description": "Diamond outline"
            },
            "ring_tone": {
                "type": "color",
                "default": GOLD,
                "description": "Glow and inner ring"
            },
            "outer_ring_tone": {
                "type": "color",
                "default": DEEP_GOLD,
                "description": "Outer ring"
            }
        })
    }
}
