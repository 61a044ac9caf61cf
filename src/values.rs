//! Interpolation primitives for keyframe values.

use glam::{Quat, Vec3};

/// A value a [`KeyframeTrack`](crate::tracks::KeyframeTrack) can sample.
///
/// Vector channels blend linearly; orientation channels take the shortest
/// spherical arc. The parameter `t` is the local ratio between two keyframes
/// and is deliberately not clamped — sampling outside a track's time domain
/// resolves against the first keyframe pair (see the track documentation).
pub trait Interpolatable: Copy {
    fn interpolate(start: Self, end: Self, t: f32) -> Self;
}

impl Interpolatable for f32 {
    fn interpolate(start: Self, end: Self, t: f32) -> Self {
        start + (end - start) * t
    }
}

impl Interpolatable for Vec3 {
    fn interpolate(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t)
    }
}

impl Interpolatable for Quat {
    fn interpolate(start: Self, end: Self, t: f32) -> Self {
        start.slerp(end, t)
    }
}
