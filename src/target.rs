//! The seam between the player and the scene graph.

use glam::{Quat, Vec3};

/// A scene-graph transform node the player writes sampled values into.
///
/// The scene keeps ownership of its nodes; the player borrows the node
/// table for the duration of one update call and addresses it by the
/// indices carried on each keyframe track.
///
/// `request_transform_update` marks the node's world matrix stale. It must
/// be idempotent and cheap, as the player calls it once per bound node per
/// applied clip even when nothing changed.
pub trait TransformNode {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);

    fn rotation(&self) -> Quat;
    fn set_rotation(&mut self, x: f32, y: f32, z: f32, w: f32);

    fn scale(&self) -> Vec3;
    fn set_scale(&mut self, scale: Vec3);

    fn request_transform_update(&mut self);
}

/// Minimal transform node: local TRS plus a staleness flag.
///
/// Hosts with their own scene graph implement [`TransformNode`] on their
/// node type instead; this one backs the tests and demos.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    needs_update: bool,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            needs_update: false,
        }
    }

    /// Whether a transform update was requested since the last
    /// [`clear_update_flag`](Self::clear_update_flag).
    #[must_use]
    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Acknowledges the staleness flag, typically after the world matrix
    /// was recomputed.
    pub fn clear_update_flag(&mut self) {
        self.needs_update = false;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformNode for Transform {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn set_rotation(&mut self, x: f32, y: f32, z: f32, w: f32) {
        self.rotation = Quat::from_xyzw(x, y, z, w);
    }

    fn scale(&self) -> Vec3 {
        self.scale
    }

    fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    fn request_transform_update(&mut self) {
        self.needs_update = true;
    }
}
