#![deny(unsafe_code)]
//! Ambient gold-dust field.
//!
//! A fixed population of points drifts over the whole viewport. Each frame a
//! point inside the repulsion radius of the pointer is pushed directly away
//! from it, then the point moves, its velocity decays, and any coordinate
//! that left the viewport jumps to the opposite edge. Points are drawn as
//! small circles in one of two gold tones with a fresh random alpha every
//! frame, which reads as flicker.

use glam::Vec2;
use sandfx_core::color::{Srgb, GOLD, PALE_GOLD};
use sandfx_core::params::{param_color, param_f32, param_f32_in, param_usize_in};
use sandfx_core::physics::repel;
use sandfx_core::pointer::PointerState;
use sandfx_core::prng::Xorshift64;
use sandfx_core::{Effect, FxError, Surface};
use serde_json::{json, Value};

/// Number of points in the field.
const DEFAULT_POPULATION: usize = 200;
/// Largest population a params override may request.
pub const MAX_POPULATION: usize = 10_000;
/// Distance within which the pointer pushes points away.
const DEFAULT_REPULSION_RADIUS: f32 = 150.0;
/// Impulse at zero distance; falls off linearly to 0 at the radius.
const DEFAULT_REPULSION_STRENGTH: f32 = 0.5;
/// Per-frame velocity retention.
const DEFAULT_DAMPING: f32 = 0.96;
/// Lowest flicker alpha; the highest is 1.
const DEFAULT_MIN_ALPHA: f32 = 0.3;
/// Spawn speed bound per axis.
const SPAWN_SPEED: f32 = 0.25;
/// Radius range for spawned points.
const MIN_RADIUS: f32 = 0.0;
const MAX_RADIUS: f32 = 2.0;

/// Integrator constants for the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientParams {
    pub population: usize,
    pub repulsion_radius: f32,
    pub repulsion_strength: f32,
    pub damping: f32,
    pub min_alpha: f32,
    pub tones: [Srgb; 2],
}

impl Default for AmbientParams {
    fn default() -> Self {
        Self {
            population: DEFAULT_POPULATION,
            repulsion_radius: DEFAULT_REPULSION_RADIUS,
            repulsion_strength: DEFAULT_REPULSION_STRENGTH,
            damping: DEFAULT_DAMPING,
            min_alpha: DEFAULT_MIN_ALPHA,
            tones: [GOLD, PALE_GOLD],
        }
    }
}

impl AmbientParams {
    /// Reads overrides from a JSON object; anything missing or out of range
    /// keeps its default.
    pub fn from_json(params: &Value) -> Self {
        Self {
            population: param_usize_in(params, "population", DEFAULT_POPULATION, 0, MAX_POPULATION),
            repulsion_radius: param_f32_in(
                params,
                "repulsion_radius",
                DEFAULT_REPULSION_RADIUS,
                0.0,
                f32::MAX,
            ),
            repulsion_strength: param_f32(params, "repulsion_strength", DEFAULT_REPULSION_STRENGTH),
            damping: param_f32_in(params, "damping", DEFAULT_DAMPING, 0.0, 1.0),
            min_alpha: param_f32_in(params, "min_alpha", DEFAULT_MIN_ALPHA, 0.0, 1.0),
            tones: [
                param_color(params, "tone", GOLD),
                param_color(params, "secondary_tone", PALE_GOLD),
            ],
        }
    }
}

/// One drifting speck of dust.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientPoint {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Render radius in logical pixels.
    pub radius: f32,
    /// Index into [`AmbientParams::tones`].
    pub tone: usize,
}

impl AmbientPoint {
    /// A point at rest with the primary tone.
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            radius: 1.0,
            tone: 0,
        }
    }
}

/// Advances one point by one frame inside a viewport of size `extent`.
pub fn integrate(point: &mut AmbientPoint, pointer: Vec2, extent: Vec2, params: &AmbientParams) {
    repel(
        point.position,
        &mut point.velocity,
        pointer,
        params.repulsion_radius,
        params.repulsion_strength,
    );
    point.position += point.velocity;
    point.velocity *= params.damping;
    point.position.x = wrap_edge(point.position.x, extent.x);
    point.position.y = wrap_edge(point.position.y, extent.y);
}

/// Moves a coordinate that left `[0, extent]` to the opposite edge.
fn wrap_edge(v: f32, extent: f32) -> f32 {
    if v < 0.0 {
        extent
    } else if v > extent {
        0.0
    } else {
        v
    }
}

/// The ambient field effect.
pub struct AmbientField {
    points: Vec<AmbientPoint>,
    extent: Vec2,
    params: AmbientParams,
    pointer: PointerState,
    rng: Xorshift64,
}

impl AmbientField {
    /// Spawns `params.population` points (at most [`MAX_POPULATION`]) uniformly
    /// over a `width` x `height` viewport with small random velocities.
    pub fn new(width: u32, height: u32, seed: u64, params: AmbientParams, pointer: PointerState) -> Self {
        let params = AmbientParams {
            population: params.population.min(MAX_POPULATION),
            ..params
        };
        let extent = Vec2::new(width as f32, height as f32);
        let mut rng = Xorshift64::new(seed);
        let points = (0..params.population)
            .map(|_| AmbientPoint {
                position: Vec2::new(rng.next_f32() * extent.x, rng.next_f32() * extent.y),
                velocity: Vec2::new(
                    rng.next_range(-SPAWN_SPEED, SPAWN_SPEED),
                    rng.next_range(-SPAWN_SPEED, SPAWN_SPEED),
                ),
                radius: rng.next_range(MIN_RADIUS, MAX_RADIUS),
                tone: rng.next_usize(2),
            })
            .collect();
        log::debug!(
            "ambient: spawned {} points over {width}x{height}",
            params.population
        );
        Self {
            points,
            extent,
            params,
            pointer,
            rng,
        }
    }

    /// Builds the field from a JSON params object.
    pub fn from_json(width: u32, height: u32, seed: u64, json_params: &Value, pointer: PointerState) -> Self {
        Self::new(width, height, seed, AmbientParams::from_json(json_params), pointer)
    }

    /// A field with exactly the given points, e.g. to replay a captured state.
    pub fn from_points(
        points: Vec<AmbientPoint>,
        width: u32,
        height: u32,
        seed: u64,
        params: AmbientParams,
        pointer: PointerState,
    ) -> Self {
        let params = AmbientParams {
            population: points.len(),
            ..params
        };
        Self {
            points,
            extent: Vec2::new(width as f32, height as f32),
            params,
            pointer,
            rng: Xorshift64::new(seed),
        }
    }

    pub fn points(&self) -> &[AmbientPoint] {
        &self.points
    }

    /// Current viewport size in logical pixels.
    pub fn extent(&self) -> Vec2 {
        self.extent
    }

    pub fn ambient_params(&self) -> &AmbientParams {
        &self.params
    }
}

impl Effect for AmbientField {
    fn name(&self) -> &'static str {
        "ambient"
    }

    fn step(&mut self, _elapsed_ms: f64) -> Result<(), FxError> {
        let pointer = self.pointer.position();
        for point in &mut self.points {
            integrate(point, pointer, self.extent, &self.params);
        }
        Ok(())
    }

    fn render(&mut self, surface: &mut Surface) {
        surface.clear();
        for point in &self.points {
            let alpha = self.rng.next_range(self.params.min_alpha, 1.0);
            let tone = self.params.tones[point.tone.min(1)];
            surface.fill_circle(point.position, point.radius, tone, alpha);
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.extent = Vec2::new(width as f32, height as f32);
    }

    fn params(&self) -> Value {
        json!({
            "population": self.params.population,
            "repulsion_radius": self.params.repulsion_radius,
            "repulsion_strength": self.params.repulsion_strength,
            "damping": self.params.damping,
            "min_alpha": self.params.min_alpha,
            "tone": self.params.tones[0],
            "secondary_tone": self.params.tones[1],
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "population": {
                "type": "integer",
                "default": DEFAULT_POPULATION,
                "min": 0,
                "max": MAX_POPULATION,
                "description": "Number of drifting points, fixed for the life of the field"
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
            "damping": {
                "type": "number",
                "default": DEFAULT_DAMPING,
                "min": 0.0,
                "max": 1.0,
                "description": "Fraction of velocity kept each frame"
            },
            "min_alpha": {
                "type": "number",
                "default": DEFAULT_MIN_ALPHA,
                "min": 0.0,
                "max": 1.0,
                "description": "Lower bound of the per-frame flicker alpha"
            },
            "tone": {
                "type": "color",
                "default": GOLD,
                "description": "Primary point color"
            },
            "secondary_tone": {
                "type": "color",
                "default": PALE_GOLD,
                "description": "Secondary point color"
            }
        })
    }
}
