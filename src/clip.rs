//! Animation clips: a named bundle of keyframe tracks plus timed callbacks.

use std::fmt;
use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::tracks::KeyframeTrack;

/// Zero-argument callback fired when the time cursor passes its key.
pub type ActionCallback = Arc<dyn Fn() + Send + Sync>;

/// Sparse, ordered list of timed callbacks embedded in a clip.
#[derive(Default, Clone)]
pub struct ActionTrack {
    times: Vec<f32>,
    actions: Vec<ActionCallback>,
}

impl ActionTrack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a callback at `time`. Keys are expected in ascending order.
    pub fn push(&mut self, time: f32, action: impl Fn() + Send + Sync + 'static) {
        self.times.push(time);
        self.actions.push(Arc::new(action));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f32, &ActionCallback)> {
        self.times.iter().copied().zip(self.actions.iter())
    }
}

impl fmt::Debug for ActionTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionTrack")
            .field("times", &self.times)
            .field("actions", &self.actions.len())
            .finish()
    }
}

/// An immutable bundle of keyframe tracks, timed callbacks and a duration.
///
/// Built by the asset loader and shared as `Arc<AnimationClip>`; the clip
/// holds no scene references, so one clip can drive multiple players bound
/// to different node tables.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    name: String,
    translation_tracks: Vec<KeyframeTrack<Vec3>>,
    rotation_tracks: Vec<KeyframeTrack<Quat>>,
    scale_tracks: Vec<KeyframeTrack<Vec3>>,
    action_track: ActionTrack,
    duration: f32,
}

impl AnimationClip {
    /// Bundles the given tracks; the clip duration is the maximum over all
    /// track durations.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        translation_tracks: Vec<KeyframeTrack<Vec3>>,
        rotation_tracks: Vec<KeyframeTrack<Quat>>,
        scale_tracks: Vec<KeyframeTrack<Vec3>>,
        action_track: ActionTrack,
    ) -> Self {
        let duration = translation_tracks
            .iter()
            .map(KeyframeTrack::duration)
            .chain(rotation_tracks.iter().map(KeyframeTrack::duration))
            .chain(scale_tracks.iter().map(KeyframeTrack::duration))
            .fold(0.0_f32, f32::max);

        Self {
            name: name.into(),
            translation_tracks,
            rotation_tracks,
            scale_tracks,
            action_track,
            duration,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[must_use]
    pub fn translation_tracks(&self) -> &[KeyframeTrack<Vec3>] {
        &self.translation_tracks
    }

    #[must_use]
    pub fn rotation_tracks(&self) -> &[KeyframeTrack<Quat>] {
        &self.rotation_tracks
    }

    #[must_use]
    pub fn scale_tracks(&self) -> &[KeyframeTrack<Vec3>] {
        &self.scale_tracks
    }

    #[must_use]
    pub fn action_track(&self) -> &ActionTrack {
        &self.action_track
    }
}
