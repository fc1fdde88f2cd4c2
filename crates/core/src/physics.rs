//! Per-frame impulses shared by the particle effects.

use glam::Vec2;

/// Pushes `velocity` away from `pointer` when `position` is within `radius`.
///
/// The impulse is `(radius - dist) / radius * strength`, directed along the
/// angle from the point to the pointer and subtracted. A point sitting exactly
/// on the pointer has angle 0 and is pushed towards -x.
pub fn repel(position: Vec2, velocity: &mut Vec2, pointer: Vec2, radius: f32, strength: f32) {
    let delta = pointer - position;
    let dist = delta.length();
    if dist < radius {
        let force = (radius - dist) / radius * strength;
        let angle = delta.y.atan2(delta.x);
        *velocity -= Vec2::new(angle.cos(), angle.sin()) * force;
    }
}

/// Adds a restoring impulse proportional to the displacement from `origin`.
pub fn spring(position: Vec2, velocity: &mut Vec2, origin: Vec2, stiffness: f32) {
    *velocity += (origin - position) * stiffness;
}
