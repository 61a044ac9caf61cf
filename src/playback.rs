//! Playback state: one clip bound to a time cursor, speed and loop budget.

use std::fmt;
use std::sync::Arc;

use crate::clip::AnimationClip;

/// Effective durations below this are treated as a single complete loop
/// per advance rather than a division by zero.
const ZERO_DURATION: f32 = 1e-6;

/// Where a playback slot gets its clip from.
///
/// `Pending` supports serialized scenes where the clip asset may not be
/// ready when the slot is created; the player retries the lookup at the top
/// of every update until the clip appears in its library.
#[derive(Clone)]
pub enum ClipSource {
    Bound(Arc<AnimationClip>),
    Pending(String),
}

impl fmt::Debug for ClipSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bound(clip) => f.debug_tuple("Bound").field(&clip.name()).finish(),
            Self::Pending(name) => f.debug_tuple("Pending").field(name).finish(),
        }
    }
}

impl From<Arc<AnimationClip>> for ClipSource {
    fn from(clip: Arc<AnimationClip>) -> Self {
        Self::Bound(clip)
    }
}

impl From<&str> for ClipSource {
    fn from(name: &str) -> Self {
        Self::Pending(name.to_owned())
    }
}

/// Listener informed when a playback state crosses a loop boundary or
/// exhausts its loop budget.
#[allow(unused_variables)]
pub trait PlaybackEvents: Send + Sync {
    fn on_loop(&self, state: &PlaybackState) {}
    fn on_end(&self, state: &PlaybackState) {}
}

impl<T: PlaybackEvents + ?Sized> PlaybackEvents for Arc<T> {
    fn on_loop(&self, state: &PlaybackState) {
        (**self).on_loop(state);
    }

    fn on_end(&self, state: &PlaybackState) {
        (**self).on_end(state);
    }
}

/// How a clip should be played.
///
/// A duration of `-1.0` (any negative value) means "play to the end of the
/// clip, minus the offset". A negative loop count loops forever.
#[derive(Clone)]
pub struct PlayParams {
    pub loop_count: i32,
    pub speed: f32,
    pub duration: f32,
    pub offset: f32,
    pub listener: Option<Arc<dyn PlaybackEvents>>,
}

impl PlayParams {
    /// Play the clip once at normal speed.
    #[must_use]
    pub fn once() -> Self {
        Self {
            loop_count: 1,
            speed: 1.0,
            duration: -1.0,
            offset: 0.0,
            listener: None,
        }
    }

    /// Loop the clip continuously at normal speed.
    #[must_use]
    pub fn looping() -> Self {
        Self {
            loop_count: -1,
            ..Self::once()
        }
    }

    #[must_use]
    pub fn with_loop_count(mut self, loop_count: i32) -> Self {
        self.loop_count = loop_count;
        self
    }

    /// Playback speed; negative plays in reverse. Zero is a caller error.
    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn with_listener(mut self, listener: impl PlaybackEvents + 'static) -> Self {
        self.listener = Some(Arc::new(listener));
        self
    }
}

impl Default for PlayParams {
    fn default() -> Self {
        Self::once()
    }
}

impl fmt::Debug for PlayParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayParams")
            .field("loop_count", &self.loop_count)
            .field("speed", &self.speed)
            .field("duration", &self.duration)
            .field("offset", &self.offset)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

/// Outcome of advancing a playback state by one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Advance {
    /// Delta the state could not consume within its loop budget; `0.0`
    /// while still animating. The player hands this to a queued clip
    /// within the same frame.
    pub overflow: f32,
    /// Loop boundaries crossed with budget still remaining.
    pub looped: u32,
    /// The loop budget ran out during this call.
    pub ended: bool,
}

/// Mutable runtime cursor bound to one clip instance.
///
/// States are drawn from the player's [`StatePool`](crate::pool::StatePool)
/// when a clip starts and released back when it stops or is replaced.
#[derive(Clone)]
pub struct PlaybackState {
    source: ClipSource,
    /// Playback speed; negative plays in reverse. Zero stalls the cursor
    /// and is a caller error, not validated here.
    pub speed: f32,
    /// Current time within `[0, effective_duration()]`.
    pub time: f32,
    /// Offset in seconds into the clip (clip time = offset + time).
    pub offset: f32,
    duration: f32,
    /// Remaining loops: `0` stopped, `> 0` finite, `< 0` infinite.
    pub loop_count: i32,
    previous_time: f32,
    listener: Option<Arc<dyn PlaybackEvents>>,
}

impl PlaybackState {
    #[must_use]
    pub fn new(source: ClipSource, params: PlayParams) -> Self {
        let mut state = Self {
            source,
            speed: params.speed,
            time: 0.0,
            offset: params.offset,
            duration: params.duration,
            loop_count: params.loop_count,
            previous_time: 0.0,
            listener: params.listener,
        };
        if state.speed < 0.0 {
            state.time = state.effective_duration();
        }
        state
    }

    #[must_use]
    pub fn source(&self) -> &ClipSource {
        &self.source
    }

    /// The bound clip, or `None` while resolution is pending.
    #[must_use]
    pub fn clip(&self) -> Option<&Arc<AnimationClip>> {
        match &self.source {
            ClipSource::Bound(clip) => Some(clip),
            ClipSource::Pending(_) => None,
        }
    }

    /// Time cursor before the last advance, used for action-event range
    /// tests.
    #[must_use]
    pub fn previous_time(&self) -> f32 {
        self.previous_time
    }

    /// The raw duration override; negative means "until the end of the
    /// clip".
    #[must_use]
    pub fn duration_override(&self) -> f32 {
        self.duration
    }

    /// The duration the loop arithmetic runs against: the explicit override,
    /// or `clip.duration - offset` while the override is negative. Zero for
    /// an unresolved pending clip.
    #[must_use]
    pub fn effective_duration(&self) -> f32 {
        if self.duration < 0.0 {
            self.clip().map_or(0.0, |clip| clip.duration() - self.offset)
        } else {
            self.duration
        }
    }

    #[must_use]
    pub fn listener(&self) -> Option<Arc<dyn PlaybackEvents>> {
        self.listener.clone()
    }

    /// Resolves a pending source to a loaded clip. A reverse-speed state
    /// that has not moved yet starts from the far boundary, as it would
    /// have had the clip been bound at creation.
    pub(crate) fn bind(&mut self, clip: Arc<AnimationClip>) {
        self.source = ClipSource::Bound(clip);
        if self.speed < 0.0 && self.time == 0.0 {
            self.time = self.effective_duration();
        }
    }

    /// Advances the time cursor by `delta` seconds (scaled by `speed`),
    /// consuming whole loops against the remaining loop budget.
    ///
    /// When the budget runs out mid-consumption, the cursor snaps to the
    /// boundary (`effective_duration()` playing forward, `0` backward) and
    /// the unconsumed remainder is reported as overflow so the player can
    /// splice in a queued clip within the same frame. A stopped or unbound
    /// state consumes nothing and reports the whole `delta` as overflow.
    pub fn advance(&mut self, delta: f32) -> Advance {
        self.previous_time = self.time;

        if self.loop_count == 0 || self.clip().is_none() {
            return Advance {
                overflow: delta,
                looped: 0,
                ended: false,
            };
        }

        let diff = self.speed * delta;
        let duration = self.effective_duration();

        let loops = if duration.abs() > ZERO_DURATION {
            self.time += diff;
            let mut loops = (self.time / duration).abs() as i32;
            if self.time < 0.0 {
                // Reverse wraparound: one extra boundary was crossed, and
                // the cursor folds back into [0, duration].
                loops += 1;
                while self.time < 0.0 {
                    self.time += duration;
                }
            }
            self.time = (self.time % duration).abs();
            loops
        } else {
            1
        };

        let mut looped = 0;
        for i in 0..loops {
            if self.loop_count > 0 {
                self.loop_count -= 1;
            }
            if self.loop_count != 0 {
                looped += 1;
            }
            if self.loop_count == 0 {
                let boundary = if diff < 0.0 {
                    duration - self.time
                } else {
                    self.time
                };
                let overflow = (loops - 1 - i) as f32 * duration + boundary;
                self.time = if diff < 0.0 { 0.0 } else { duration };
                return Advance {
                    overflow,
                    looped,
                    ended: true,
                };
            }
        }

        Advance {
            overflow: 0.0,
            looped,
            ended: false,
        }
    }
}

impl fmt::Debug for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackState")
            .field("source", &self.source)
            .field("speed", &self.speed)
            .field("time", &self.time)
            .field("offset", &self.offset)
            .field("duration", &self.duration)
            .field("loop_count", &self.loop_count)
            .finish()
    }
}
