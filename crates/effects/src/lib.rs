#![deny(unsafe_code)]
//! Effect registry: maps effect names to implementations, replays scenes and
//! turns surfaces into opaque pixels.
//!
//! This crate sits between `sandfx-core` (which defines the `Effect` trait)
//! and the individual effect crates so the CLI has a single place to dispatch
//! on an effect name.

pub mod pixel;
pub mod scene;

#[cfg(feature = "png")]
pub mod snapshot;

use sandfx_ambient::AmbientField;
use sandfx_core::{Effect, FxError, PointerState, Scene, Surface};
use sandfx_cursor::MagicCursor;
use sandfx_dissolve::TextDissolve;
use serde_json::{json, Value};

/// All available effect names.
const EFFECT_NAMES: &[&str] = &["ambient", "dissolve", "cursor"];

/// Every effect this build knows how to run.
///
/// Use [`EffectKind::from_name`] for string-based construction.
pub enum EffectKind {
    /// Drifting gold dust over the viewport.
    Ambient(AmbientField),
    /// Text sampled into particles that spring onto the glyphs.
    Dissolve(TextDissolve),
    /// Spring-follower diamond with counter-rotating rings.
    Cursor(MagicCursor),
}

impl EffectKind {
    /// Constructs an effect by name. `text` is only used by text effects.
    ///
    /// Returns `FxError::UnknownEffect` if the name is not recognized.
    pub fn from_name(
        name: &str,
        width: u32,
        height: u32,
        seed: u64,
        params: &Value,
        text: &str,
        pointer: PointerState,
    ) -> Result<Self, FxError> {
        match name {
            "ambient" => Ok(EffectKind::Ambient(AmbientField::from_json(
                width, height, seed, params, pointer,
            ))),
            "dissolve" => Ok(EffectKind::Dissolve(TextDissolve::from_json(
                text, width, height, seed, params, pointer,
            )?)),
            "cursor" => Ok(EffectKind::Cursor(MagicCursor::from_json(params, pointer))),
            _ => Err(EffectKind::unknown(name)),
        }
    }

    /// Constructs the effect a scene names. The scene's device pixel ratio
    /// is passed on unless the params already set one.
    pub fn from_scene(scene: &Scene, pointer: PointerState) -> Result<Self, FxError> {
        let mut params = scene.params.clone();
        if let Value::Object(map) = &mut params {
            map.entry("device_pixel_ratio")
                .or_insert_with(|| json!(scene.device_pixel_ratio));
        }
        Self::from_name(
            &scene.effect,
            scene.width,
            scene.height,
            scene.seed,
            &params,
            &scene.text,
            pointer,
        )
    }

    /// Returns a slice of all recognized effect names.
    pub fn list_effects() -> &'static [&'static str] {
        EFFECT_NAMES
    }

    fn unknown(name: &str) -> FxError {
        log::debug!("unknown effect {name:?}; known: {}", EFFECT_NAMES.join(", "));
        FxError::UnknownEffect(name.to_string())
    }
}

impl Effect for EffectKind {
    fn name(&self) -> &'static str {
        match self {
            EffectKind::Ambient(e) => e.name(),
            EffectKind::Dissolve(e) => e.name(),
            EffectKind::Cursor(e) => e.name(),
        }
    }

    fn step(&mut self, elapsed_ms: f64) -> Result<(), FxError> {
        match self {
            EffectKind::Ambient(e) => e.step(elapsed_ms),
            EffectKind::Dissolve(e) => e.step(elapsed_ms),
            EffectKind::Cursor(e) => e.step(elapsed_ms),
        }
    }

    fn render(&mut self, surface: &mut Surface) {
        match self {
            EffectKind::Ambient(e) => e.render(surface),
            EffectKind::Dissolve(e) => e.render(surface),
            EffectKind::Cursor(e) => e.render(surface),
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        match self {
            EffectKind::Ambient(e) => e.resize(width, height),
            EffectKind::Dissolve(e) => e.resize(width, height),
            EffectKind::Cursor(e) => e.resize(width, height),
        }
    }

    fn params(&self) -> Value {
        match self {
            EffectKind::Ambient(e) => e.params(),
            EffectKind::Dissolve(e) => e.params(),
            EffectKind::Cursor(e) => e.params(),
        }
    }

    fn param_schema(&self) -> Value {
        match self {
            EffectKind::Ambient(e) => e.param_schema(),
            EffectKind::Dissolve(e) => e.param_schema(),
            EffectKind::Cursor(e) => e.param_schema(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(name: &str) -> Result<EffectKind, FxError> {
        EffectKind::from_name(name, 120, 60, 42, &json!({}), "HI", PointerState::new())
    }

    #[test]
    fn from_name_builds_every_listed_effect() {
        for name in EffectKind::list_effects() {
            let effect = build(name).unwrap();
            assert_eq!(effect.name(), *name);
        }
    }

    #[test]
    fn from_name_unknown_returns_error() {
        let result = build("fireworks");
        assert!(matches!(result, Err(FxError::UnknownEffect(n)) if n == "fireworks"));
    }

    #[test]
    fn dissolve_receives_text() {
        let Ok(EffectKind::Dissolve(d)) = build("dissolve") else {
            panic!("expected dissolve");
        };
        assert_eq!(d.text(), "HI");
        assert!(d.total_points() > 0);
    }

    #[test]
    fn dissolve_rejects_zero_width() {
        let result = EffectKind::from_name(
            "dissolve",
            0,
            60,
            1,
            &json!({}),
            "HI",
            PointerState::new(),
        );
        assert!(matches!(result, Err(FxError::InvalidDimensions)));
    }

    #[test]
    fn from_scene_uses_scene_fields() {
        let scene = Scene::new("ambient", 300, 200, 7);
        let Ok(EffectKind::Ambient(field)) = EffectKind::from_scene(&scene, PointerState::new())
        else {
            panic!("expected ambient");
        };
        assert_eq!(field.extent().x, 300.0);
        assert_eq!(field.extent().y, 200.0);
    }

    #[test]
    fn from_scene_passes_device_pixel_ratio_to_dissolve() {
        let mut scene = Scene::new("dissolve", 200, 80, 7).with_text("HI");
        scene.device_pixel_ratio = 2.0;
        let Ok(EffectKind::Dissolve(d)) = EffectKind::from_scene(&scene, PointerState::new()) else {
            panic!("expected dissolve");
        };
        assert_eq!(d.params()["device_pixel_ratio"], 2.0);

        scene.params = json!({"device_pixel_ratio": 1.5});
        let Ok(EffectKind::Dissolve(d)) = EffectKind::from_scene(&scene, PointerState::new()) else {
            panic!("expected dissolve");
        };
        assert_eq!(d.params()["device_pixel_ratio"], 1.5);
    }

    #[test]
    fn cursor_is_registered() {
        let Ok(EffectKind::Cursor(c)) = build("cursor") else {
            panic!("expected cursor");
        };
        assert_eq!(c.scale(), 1.0);
    }

    #[test]
    fn delegation_params_and_schema() {
        for name in EffectKind::list_effects() {
            let effect = build(name).unwrap();
            let params = effect.params();
            let schema = effect.param_schema();
            for key in params.as_object().unwrap().keys() {
                assert!(schema.get(key).is_some(), "{name}: schema missing {key}");
            }
        }
    }

    #[test]
    fn same_seed_renders_same_pixels() {
        for name in EffectKind::list_effects() {
            let mut a = build(name).unwrap();
            let mut b = build(name).unwrap();
            let mut sa = Surface::new(120, 60).unwrap();
            let mut sb = Surface::new(120, 60).unwrap();
            for frame in 0..20 {
                let t = frame as f64 * 16.0;
                a.step(t).unwrap();
                b.step(t).unwrap();
                a.render(&mut sa);
                b.render(&mut sb);
            }
            assert_eq!(sa.pixels(), sb.pixels(), "{name} diverged");
        }
    }

    #[test]
    fn object_safety() {
        let effect = build("ambient").unwrap();
        let boxed: Box<dyn Effect> = Box::new(effect);
        assert_eq!(boxed.name(), "ambient");
    }
}
