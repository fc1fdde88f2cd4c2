//! Reproducible description of an offline effect run.
//!
//! A [`Scene`] captures everything needed to replay an effect frame for
//! frame: which effect, container size, pixel ratio, text, params, PRNG seed,
//! frame count and interval, and the host events delivered along the way.

use serde::{Deserialize, Serialize};

use crate::error::FxError;
use crate::event::HostEvent;
use crate::frame::FRAME_MS_60HZ;

/// A host event delivered just before frame `frame` (0-based) runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub frame: u64,
    pub event: HostEvent,
}

/// Serializable effect run. Same scene, same binary, same pixels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scene {
    pub effect: String,
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_device_pixel_ratio")]
    pub device_pixel_ratio: f32,
    /// Text for text effects; ignored by the others.
    #[serde(default)]
    pub text: String,
    #[serde(default = "empty_params")]
    pub params: serde_json::Value,
    pub seed: u64,
    pub frames: u64,
    #[serde(default = "default_frame_ms")]
    pub frame_ms: f64,
    #[serde(default)]
    pub events: Vec<TimedEvent>,
}

fn default_device_pixel_ratio() -> f32 {
    1.0
}

fn default_frame_ms() -> f64 {
    FRAME_MS_60HZ
}

fn empty_params() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Scene {
    /// A scene with no text, default params, no events, zero frames at 60 Hz.
    pub fn new(effect: &str, width: u32, height: u32, seed: u64) -> Self {
        Self {
            effect: effect.to_string(),
            width,
            height,
            device_pixel_ratio: default_device_pixel_ratio(),
            text: String::new(),
            params: empty_params(),
            seed,
            frames: 0,
            frame_ms: default_frame_ms(),
            events: Vec::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_frames(mut self, frames: u64) -> Self {
        self.frames = frames;
        self
    }

    pub fn with_event(mut self, frame: u64, event: HostEvent) -> Self {
        self.events.push(TimedEvent { frame, event });
        self
    }

    /// Checks dimensions, frame interval and that params is an object.
    pub fn validate(&self) -> Result<(), FxError> {
        if self.width == 0 || self.height == 0 {
            return Err(FxError::InvalidDimensions);
        }
        if !(self.frame_ms.is_finite() && self.frame_ms > 0.0) {
            return Err(FxError::InvalidScene(format!(
                "frame_ms must be a positive number, got {}",
                self.frame_ms
            )));
        }
        if !self.params.is_object() {
            return Err(FxError::InvalidScene("params must be a JSON object".into()));
        }
        Ok(())
    }

    /// Events due before frame `frame`, in the order they were listed.
    pub fn events_at(&self, frame: u64) -> impl Iterator<Item = &HostEvent> + '_ {
        self.events
            .iter()
            .filter(move |e| e.frame == frame)
            .map(|e| &e.event)
    }

    /// Parses and validates a scene from JSON.
    pub fn from_json(json: &str) -> Result<Self, FxError> {
        let scene: Scene =
            serde_json::from_str(json).map_err(|e| FxError::InvalidScene(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_has_defaults() {
        let s = Scene::new("ambient", 800, 600, 42);
        assert_eq!(s.effect, "ambient");
        assert_eq!(s.device_pixel_ratio, 1.0);
        assert_eq!(s.params, serde_json::json!({}));
        assert_eq!(s.frames, 0);
        assert!((s.frame_ms - 16.666).abs() < 0.01);
        assert!(s.events.is_empty());
    }

    #[test]
    fn json_round_trip_with_events() {
        let scene = Scene::new("dissolve", 400, 200, 7)
            .with_text("AB")
            .with_frames(180)
            .with_event(10, HostEvent::PointerMove { x: 200.0, y: 100.0 })
            .with_event(90, HostEvent::PointerLeave);
        let json = serde_json::to_string_pretty(&scene).unwrap();
        assert_eq!(Scene::from_json(&json).unwrap(), scene);
    }

    #[test]
    fn minimal_json_fills_defaults() {
        let scene =
            Scene::from_json(r#"{"effect":"ambient","width":10,"height":10,"seed":1,"frames":3}"#)
                .unwrap();
        assert_eq!(scene.text, "");
        assert_eq!(scene.device_pixel_ratio, 1.0);
        assert!(scene.params.is_object());
    }

    #[test]
    fn events_at_filters_by_frame() {
        let scene = Scene::new("ambient", 10, 10, 1)
            .with_event(2, HostEvent::PointerLeave)
            .with_event(5, HostEvent::PointerMove { x: 1.0, y: 1.0 })
            .with_event(2, HostEvent::PointerMove { x: 3.0, y: 3.0 });
        let at_two: Vec<_> = scene.events_at(2).collect();
        assert_eq!(at_two.len(), 2);
        assert_eq!(*at_two[0], HostEvent::PointerLeave);
        assert_eq!(scene.events_at(3).count(), 0);
    }

    #[test]
    fn validate_rejects_zero_dimensions() {
        assert!(matches!(
            Scene::new("ambient", 0, 10, 1).validate(),
            Err(FxError::InvalidDimensions)
        ));
    }

    #[test]
    fn validate_rejects_bad_frame_interval() {
        let mut scene = Scene::new("ambient", 10, 10, 1);
        scene.frame_ms = 0.0;
        assert!(matches!(scene.validate(), Err(FxError::InvalidScene(_))));
        scene.frame_ms = f64::NAN;
        assert!(scene.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_object_params() {
        let mut scene = Scene::new("ambient", 10, 10, 1);
        scene.params = serde_json::json!([1, 2]);
        assert!(matches!(scene.validate(), Err(FxError::InvalidScene(_))));
    }

    #[test]
    fn from_json_reports_parse_errors_as_invalid_scene() {
        assert!(matches!(
            Scene::from_json("{not json"),
            Err(FxError::InvalidScene(_))
        ));
    }
}
