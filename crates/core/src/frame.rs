//! Repeating animation task bound to a cancellation token.
//!
//! [`AnimationLoop`] mounts one [`Effect`] on its own [`Surface`] and runs
//! frames strictly one after another: the next frame is only requested once
//! the previous [`tick`](AnimationLoop::tick) has returned. Pointer and resize
//! notifications are applied between frames through
//! [`handle_event`](AnimationLoop::handle_event).
//!
//! Teardown revokes the token. After that no frame runs and no event reaches
//! the effect or its pointer state, which is what a host needs to avoid
//! leaking callbacks past the life of the view.

use std::time::{Duration, Instant};

use crate::cancel::CancellationToken;
use crate::effect::Effect;
use crate::error::FxError;
use crate::event::HostEvent;
use crate::pointer::PointerState;
use crate::surface::Surface;

/// Nominal frame interval of a 60 Hz display.
pub const FRAME_MS_60HZ: f64 = 1000.0 / 60.0;

/// Outcome of one scheduling attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// A frame ran; request another.
    Continue,
    /// No render surface could be acquired at mount; frames are no-ops.
    Blank,
    /// The token was revoked; stop scheduling.
    Cancelled,
}

/// Source of frame timestamps in milliseconds.
pub trait FrameClock {
    /// Timestamp of the frame about to run.
    fn now_ms(&mut self) -> f64;

    /// Called after a frame completes, before the next `now_ms`.
    fn wait_for_next_frame(&mut self) {}
}

/// Deterministic clock that advances by a fixed interval per frame.
///
/// The first frame is stamped 0.
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    frame_ms: f64,
    next_ms: f64,
}

impl FixedStepClock {
    pub fn new(frame_ms: f64) -> Self {
        Self {
            frame_ms,
            next_ms: 0.0,
        }
    }
}

impl Default for FixedStepClock {
    fn default() -> Self {
        Self::new(FRAME_MS_60HZ)
    }
}

impl FrameClock for FixedStepClock {
    fn now_ms(&mut self) -> f64 {
        let now = self.next_ms;
        self.next_ms += self.frame_ms;
        now
    }
}

/// Real-time clock that sleeps to hold a target frame interval.
#[derive(Debug, Clone)]
pub struct WallClock {
    start: Instant,
    frame: Duration,
    last_frame: Instant,
}

impl WallClock {
    /// A clock pacing frames `frame_ms` apart. Non-finite or negative
    /// intervals run unpaced.
    pub fn new(frame_ms: f64) -> Self {
        let now = Instant::now();
        let frame_ms = if frame_ms.is_finite() { frame_ms.max(0.0) } else { 0.0 };
        Self {
            start: now,
            frame: Duration::from_secs_f64(frame_ms / 1000.0),
            last_frame: now,
        }
    }
}

impl FrameClock for WallClock {
    fn now_ms(&mut self) -> f64 {
        self.last_frame = Instant::now();
        self.last_frame.duration_since(self.start).as_secs_f64() * 1000.0
    }

    fn wait_for_next_frame(&mut self) {
        let spent = self.last_frame.elapsed();
        if spent < self.frame {
            std::thread::sleep(self.frame - spent);
        }
    }
}

/// One mounted effect with its surface, pointer and cancellation token.
pub struct AnimationLoop<E: Effect> {
    effect: E,
    surface: Option<Surface>,
    pointer: PointerState,
    token: CancellationToken,
    mounted_at_ms: Option<f64>,
    frames: u64,
}

impl<E: Effect> AnimationLoop<E> {
    /// Mounts `effect` into a `width` x `height` container.
    ///
    /// `pointer` must be the same handle the effect was constructed with.
    /// If the surface cannot be created the loop still mounts, logs a warning,
    /// and renders nothing for its whole life.
    pub fn mount(
        effect: E,
        width: u32,
        height: u32,
        device_pixel_ratio: f32,
        pointer: PointerState,
    ) -> Self {
        let surface = match Surface::with_device_pixel_ratio(width, height, device_pixel_ratio) {
            Ok(surface) => Some(surface),
            Err(e) => {
                log::warn!(
                    "{}: no render surface for {width}x{height} container ({e}); effect disabled",
                    effect.name()
                );
                None
            }
        };
        log::debug!(
            "{}: mounted at {width}x{height} (dpr {device_pixel_ratio})",
            effect.name()
        );
        Self {
            effect,
            surface,
            pointer,
            token: CancellationToken::new(),
            mounted_at_ms: None,
            frames: 0,
        }
    }

    /// A handle that can revoke this loop from elsewhere.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn effect(&self) -> &E {
        &self.effect
    }

    pub fn effect_mut(&mut self) -> &mut E {
        &mut self.effect
    }

    /// The render surface, if one was acquired.
    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Applies a host notification. Ignored once the loop is torn down.
    pub fn handle_event(&mut self, event: &HostEvent) {
        if self.token.is_cancelled() {
            return;
        }
        match *event {
            HostEvent::PointerMove { x, y } => self.pointer.move_to(x, y),
            HostEvent::PointerLeave => self.pointer.leave(),
            HostEvent::PointerDown => self.pointer.press(),
            HostEvent::PointerUp => self.pointer.release(),
            HostEvent::Hover { active } => self.pointer.set_hovering(active),
            HostEvent::Resize { width, height } => {
                let Some(surface) = self.surface.as_mut() else {
                    return;
                };
                match surface.resize(width, height) {
                    Ok(()) => {
                        log::debug!("{}: resized to {width}x{height}", self.effect.name());
                        self.effect.resize(width, height);
                    }
                    Err(e) => log::warn!(
                        "{}: ignoring resize to {width}x{height}: {e}",
                        self.effect.name()
                    ),
                }
            }
        }
    }

    /// Runs one frame stamped `now_ms` unless the loop was cancelled.
    ///
    /// Elapsed time is measured from the first frame after mount.
    pub fn tick(&mut self, now_ms: f64) -> Result<LoopState, FxError> {
        if self.token.is_cancelled() {
            return Ok(LoopState::Cancelled);
        }
        let Some(surface) = self.surface.as_mut() else {
            return Ok(LoopState::Blank);
        };
        let mounted_at = *self.mounted_at_ms.get_or_insert(now_ms);
        let elapsed = (now_ms - mounted_at).max(0.0);
        self.effect.step(elapsed)?;
        self.effect.render(surface);
        self.frames += 1;
        log::trace!("{}: frame {} at {elapsed:.1} ms", self.effect.name(), self.frames);
        Ok(LoopState::Continue)
    }

    /// Drives frames from `clock` until cancelled or `max_frames` have been
    /// attempted. `on_frame` sees each rendered frame and may revoke the
    /// loop through its token.
    ///
    /// Returns the number of frames rendered by this call.
    pub fn run<C, F>(&mut self, clock: &mut C, max_frames: u64, mut on_frame: F) -> Result<u64, FxError>
    where
        C: FrameClock,
        F: FnMut(u64, &Surface) -> Result<(), FxError>,
    {
        let start = self.frames;
        for _ in 0..max_frames {
            match self.tick(clock.now_ms())? {
                LoopState::Continue => {
                    if let Some(surface) = self.surface.as_ref() {
                        on_frame(self.frames, surface)?;
                    }
                }
                LoopState::Blank => {}
                LoopState::Cancelled => break,
            }
            clock.wait_for_next_frame();
        }
        Ok(self.frames - start)
    }

    /// Revokes the token and detaches the pointer. Idempotent.
    pub fn teardown(&mut self) {
        if !self.token.is_cancelled() {
            log::debug!("{}: teardown after {} frames", self.effect.name(), self.frames);
        }
        self.token.cancel();
        self.pointer.leave();
    }
}

impl<E: Effect> Drop for AnimationLoop<E> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::WHITE;
    use glam::Vec2;
    use serde_json::{json, Value};

    /// Draws one dot at the pointer and records what it was told.
    #[derive(Default)]
    struct Recorder {
        steps: Vec<f64>,
        renders: u32,
        size: Option<(u32, u32)>,
        pointer: PointerState,
    }

    impl Effect for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn step(&mut self, elapsed_ms: f64) -> Result<(), FxError> {
            self.steps.push(elapsed_ms);
            Ok(())
        }

        fn render(&mut self, surface: &mut Surface) {
            surface.clear();
            surface.fill_square(self.pointer.position(), 1.0, WHITE, 1.0);
            self.renders += 1;
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.size = Some((width, height));
        }

        fn params(&self) -> Value {
            json!({})
        }

        fn param_schema(&self) -> Value {
            json!({})
        }
    }

    fn mounted(width: u32, height: u32) -> AnimationLoop<Recorder> {
        let pointer = PointerState::new();
        let recorder = Recorder {
            pointer: pointer.clone(),
            ..Recorder::default()
        };
        AnimationLoop::mount(recorder, width, height, 1.0, pointer)
    }

    #[test]
    fn fixed_step_clock_starts_at_zero() {
        let mut clock = FixedStepClock::new(10.0);
        assert_eq!(clock.now_ms(), 0.0);
        assert_eq!(clock.now_ms(), 10.0);
        assert_eq!(clock.now_ms(), 20.0);
    }

    #[test]
    fn wall_clock_advances_and_paces_frames() {
        let mut clock = WallClock::new(5.0);
        let started = Instant::now();
        let mut stamps = Vec::new();
        for _ in 0..4 {
            stamps.push(clock.now_ms());
            clock.wait_for_next_frame();
        }
        assert!(stamps.windows(2).all(|w| w[1] > w[0]), "{stamps:?}");
        assert!(stamps[3] - stamps[0] >= 15.0, "{stamps:?}");
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn wall_clock_tolerates_bad_intervals() {
        for frame_ms in [f64::INFINITY, f64::NAN, -5.0] {
            let mut clock = WallClock::new(frame_ms);
            let before = Instant::now();
            clock.now_ms();
            clock.wait_for_next_frame();
            assert!(before.elapsed() < Duration::from_secs(1));
        }
    }

    #[test]
    fn run_on_wall_clock_reports_real_elapsed_time() {
        let mut anim = mounted(10, 10);
        anim.run(&mut WallClock::new(4.0), 3, |_, _| Ok(())).unwrap();
        let steps = &anim.effect().steps;
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0], 0.0);
        assert!(steps[2] >= 8.0, "{steps:?}");
    }

    #[test]
    fn elapsed_is_measured_from_first_frame() {
        let mut anim = mounted(10, 10);
        anim.tick(1000.0).unwrap();
        anim.tick(1016.0).unwrap();
        assert_eq!(anim.effect().steps, vec![0.0, 16.0]);
    }

    #[test]
    fn run_renders_requested_frames() {
        let mut anim = mounted(10, 10);
        let mut seen = Vec::new();
        let n = anim
            .run(&mut FixedStepClock::new(16.0), 5, |frame, _| {
                seen.push(frame);
                Ok(())
            })
            .unwrap();
        assert_eq!(n, 5);
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
        assert_eq!(anim.effect().renders, 5);
    }

    #[test]
    fn cancellation_from_callback_stops_scheduling() {
        let mut anim = mounted(10, 10);
        let token = anim.token();
        let n = anim
            .run(&mut FixedStepClock::default(), 100, |frame, _| {
                if frame == 3 {
                    token.cancel();
                }
                Ok(())
            })
            .unwrap();
        assert_eq!(n, 3);
        assert_eq!(anim.tick(0.0).unwrap(), LoopState::Cancelled);
        assert_eq!(anim.effect().renders, 3);
    }

    #[test]
    fn pointer_moves_reach_next_frame() {
        let mut anim = mounted(10, 10);
        anim.handle_event(&HostEvent::PointerMove { x: 4.0, y: 6.0 });
        anim.tick(0.0).unwrap();
        assert_eq!(anim.effect().pointer.position(), Vec2::new(4.0, 6.0));
        assert_eq!(anim.surface().unwrap().pixel(4, 6).unwrap()[3], 255);
    }

    #[test]
    fn button_and_hover_events_reach_pointer() {
        let mut anim = mounted(10, 10);
        anim.handle_event(&HostEvent::PointerDown);
        anim.handle_event(&HostEvent::Hover { active: true });
        assert!(anim.pointer().is_pressed());
        assert!(anim.effect().pointer.is_hovering());
        anim.handle_event(&HostEvent::PointerUp);
        anim.handle_event(&HostEvent::Hover { active: false });
        assert!(!anim.pointer().is_pressed());
        assert!(!anim.pointer().is_hovering());
    }

    #[test]
    fn teardown_detaches_events() {
        let mut anim = mounted(10, 10);
        anim.handle_event(&HostEvent::PointerMove { x: 1.0, y: 1.0 });
        anim.teardown();
        assert!(!anim.pointer().is_present());

        anim.handle_event(&HostEvent::PointerMove { x: 2.0, y: 2.0 });
        anim.handle_event(&HostEvent::Resize {
            width: 50,
            height: 50,
        });
        assert!(!anim.pointer().is_present());
        assert_eq!(anim.effect().size, None);
        assert_eq!(anim.tick(0.0).unwrap(), LoopState::Cancelled);
    }

    #[test]
    fn drop_revokes_outstanding_tokens() {
        let anim = mounted(10, 10);
        let token = anim.token();
        drop(anim);
        assert!(token.is_cancelled());
    }

    #[test]
    fn resize_reaches_surface_and_effect() {
        let mut anim = mounted(10, 10);
        anim.handle_event(&HostEvent::Resize {
            width: 30,
            height: 20,
        });
        assert_eq!(anim.surface().unwrap().width(), 30);
        assert_eq!(anim.effect().size, Some((30, 20)));
    }

    #[test]
    fn zero_size_resize_is_ignored() {
        let mut anim = mounted(10, 10);
        anim.handle_event(&HostEvent::Resize {
            width: 0,
            height: 20,
        });
        assert_eq!(anim.surface().unwrap().width(), 10);
        assert_eq!(anim.effect().size, None);
    }

    #[test]
    fn missing_surface_degrades_to_blank() {
        let mut anim = mounted(0, 10);
        assert!(anim.surface().is_none());
        assert_eq!(anim.tick(0.0).unwrap(), LoopState::Blank);
        let n = anim
            .run(&mut FixedStepClock::default(), 10, |_, _| Ok(()))
            .unwrap();
        assert_eq!(n, 0);
        assert!(anim.effect().steps.is_empty());
    }
}
