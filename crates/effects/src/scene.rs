//! Deterministic replay of a [`Scene`].

use sandfx_core::{
    AnimationLoop, Effect, FixedStepClock, FrameClock, FxError, LoopState, PointerState, Scene,
    Surface,
};

use crate::EffectKind;

/// Mounts the scene's effect and runs `scene.frames` frames on a fixed-step
/// clock, delivering each timed event just before its frame.
///
/// `on_frame` sees every rendered frame with its 1-based index. The mounted
/// loop is returned so callers can inspect the final surface and effect.
pub fn run_scene<F>(scene: &Scene, on_frame: F) -> Result<AnimationLoop<EffectKind>, FxError>
where
    F: FnMut(u64, &Surface) -> Result<(), FxError>,
{
    run_scene_with(scene, &mut FixedStepClock::new(scene.frame_ms), on_frame)
}

/// Like [`run_scene`] but timed by `clock`, which also paces the frames.
///
/// With a [`sandfx_core::WallClock`] the effect sees real elapsed time, so
/// the output is no longer reproducible.
pub fn run_scene_with<C, F>(
    scene: &Scene,
    clock: &mut C,
    mut on_frame: F,
) -> Result<AnimationLoop<EffectKind>, FxError>
where
    C: FrameClock,
    F: FnMut(u64, &Surface) -> Result<(), FxError>,
{
    scene.validate()?;
    let pointer = PointerState::new();
    let effect = EffectKind::from_scene(scene, pointer.clone())?;
    let mut anim = AnimationLoop::mount(
        effect,
        scene.width,
        scene.height,
        scene.device_pixel_ratio,
        pointer,
    );

    for frame in 0..scene.frames {
        for event in scene.events_at(frame) {
            anim.handle_event(event);
        }
        match anim.tick(clock.now_ms())? {
            LoopState::Continue => {
                if let Some(surface) = anim.surface() {
                    on_frame(anim.frames(), surface)?;
                }
            }
            LoopState::Blank => {}
            LoopState::Cancelled => break,
        }
        clock.wait_for_next_frame();
    }
    log::debug!(
        "{}: scene finished after {} frames",
        anim.effect().name(),
        anim.frames()
    );
    Ok(anim)
}
