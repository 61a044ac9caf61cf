//! Keyframe tracks: ordered (time, value) samples for one channel of one
//! target node.

use crate::values::Interpolatable;

/// Zero-width keyframe intervals below this are treated as a step.
const MIN_INTERVAL: f32 = 1e-6;

/// How values between two keyframes are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
    /// Hold the left keyframe value over the whole interval.
    Step,
}

/// One channel's ordered keyframes for one target node.
///
/// Tracks are built once by the loader and never mutated during playback.
/// `node_index` addresses the player's node table, not the clip; a clip
/// therefore holds no scene references and can drive many players.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    times: Vec<f32>,
    values: Vec<T>,
    in_tangents: Option<Vec<T>>,
    out_tangents: Option<Vec<T>>,
    interpolation: Interpolation,
    node_index: usize,
    duration: f32,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    /// Builds a track from parallel time and value sequences.
    ///
    /// # Panics
    /// If the sequences are empty or their lengths differ. Times must be
    /// non-decreasing; duplicates are only meaningful at the endpoints.
    #[must_use]
    pub fn new(
        node_index: usize,
        times: Vec<f32>,
        values: Vec<T>,
        interpolation: Interpolation,
    ) -> Self {
        assert!(!times.is_empty(), "a keyframe track cannot be empty");
        assert_eq!(
            times.len(),
            values.len(),
            "keyframe times and values must be parallel"
        );
        let duration = times.last().copied().unwrap_or(0.0);
        Self {
            times,
            values,
            in_tangents: None,
            out_tangents: None,
            interpolation,
            node_index,
            duration,
        }
    }

    /// Attaches in/out tangent sequences. Sampling does not use them yet;
    /// they are carried for future spline interpolation modes.
    #[must_use]
    pub fn with_tangents(mut self, in_tangents: Vec<T>, out_tangents: Vec<T>) -> Self {
        self.in_tangents = Some(in_tangents);
        self.out_tangents = Some(out_tangents);
        self
    }

    /// Index into the player's node table this track drives.
    #[must_use]
    pub fn node_index(&self) -> usize {
        self.node_index
    }

    /// Time of the last keyframe.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[must_use]
    pub fn times(&self) -> &[f32] {
        &self.times
    }

    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Samples the track at `time`.
    ///
    /// A single-keyframe track is a constant channel and returns its only
    /// value for every `time`. Otherwise the keyframe pair around `time` is
    /// located by binary search; any `time` outside the track's domain
    /// resolves to index `0` and is interpolated against the first keyframe
    /// pair with the unclamped local ratio. That is the channel's documented
    /// out-of-domain policy, matched by the playback layer which keeps its
    /// cursor inside `[0, duration]`.
    #[must_use]
    pub fn sample(&self, time: f32) -> T {
        if self.values.len() == 1 {
            return self.values[0];
        }

        let index = self.first_keyframe_index(time);
        let value = self.values[index];
        let next = index + 1;
        if next >= self.values.len() {
            return value;
        }

        match self.interpolation {
            Interpolation::Step => value,
            Interpolation::Linear => {
                let t0 = self.times[index];
                let dt = self.times[next] - t0;
                if dt < MIN_INTERVAL {
                    return value;
                }
                T::interpolate(value, self.values[next], (time - t0) / dt)
            }
        }
    }

    /// Finds the first keyframe index just before `time`, or `0` when `time`
    /// is outside the keyframe range.
    fn first_keyframe_index(&self, time: f32) -> usize {
        let last = self.times.len() - 1;
        if last == 0 || time < self.times[0] || time > self.times[last] {
            return 0;
        }

        let mut min = 0;
        let mut max = last;
        while min < max {
            let i = (min + max) / 2;
            if time > self.times[i + 1] {
                min = i + 1;
            } else if time < self.times[i] {
                max = i.saturating_sub(1);
            } else {
                return i;
            }
        }
        min
    }
}
