//! The animation player: slot state machine, cross-fade blending and
//! action-event dispatch.

use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::clip::AnimationClip;
use crate::errors::{KinemaError, Result};
use crate::playback::{ClipSource, PlayParams, PlaybackState};
use crate::pool::{StateKey, StatePool};
use crate::target::TransformNode;

/// Blend weights above this are an effective overwrite; the accumulator
/// skips the interpolation step.
const WEIGHT_ONE: f32 = 0.999_999;

/// Plays animation clips onto a table of transform nodes.
///
/// One player drives one animated scene object. Up to three playback
/// slots are live at a time: `current`, the `previous` clip being faded
/// out, and a `queued` clip waiting for `current` to finish. A one-shot
/// action additionally parks a copy of the interrupted state in the
/// queued slot so it resumes afterwards.
///
/// The node table is not owned by the player; it is borrowed per
/// [`update`](Self::update) call and addressed by the node indices carried
/// on each keyframe track.
pub struct AnimationPlayer {
    pool: StatePool,
    current: Option<StateKey>,
    previous: Option<StateKey>,
    queued: Option<StateKey>,
    queued_transition_time: f32,
    transition_current_time: f32,
    transition_target_time: f32,
    in_action: bool,
    /// When true a call to [`update`](Self::update) is a no-op.
    pub paused: bool,
    /// Whether replaying the clip that is already current restarts it.
    /// When false, the new state inherits the old time cursor.
    pub allow_same_animation: bool,
    animations: Vec<Arc<AnimationClip>>,
    blend_positions: Vec<Option<Vec3>>,
    blend_rotations: Vec<Option<Quat>>,
    blend_scales: Vec<Option<Vec3>>,
    applying: bool,
}

impl AnimationPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pool: StatePool::new(),
            current: None,
            previous: None,
            queued: None,
            queued_transition_time: 0.0,
            transition_current_time: 0.0,
            transition_target_time: 0.0,
            in_action: false,
            paused: false,
            allow_same_animation: true,
            animations: Vec::new(),
            blend_positions: Vec::new(),
            blend_rotations: Vec::new(),
            blend_scales: Vec::new(),
            applying: false,
        }
    }

    // ─── Clip library ─────────────────────────────────────────────────────

    /// Registers a clip for by-name playback and lazy resolution.
    pub fn add_animation(&mut self, clip: Arc<AnimationClip>) {
        self.animations.push(clip);
    }

    #[must_use]
    pub fn animations(&self) -> &[Arc<AnimationClip>] {
        &self.animations
    }

    /// Strict by-name lookup.
    pub fn get_animation(&self, name: &str) -> Result<Arc<AnimationClip>> {
        self.find_animation(name)
            .ok_or_else(|| KinemaError::AnimationNotFound(name.to_owned()))
    }

    /// Tolerant by-name lookup.
    #[must_use]
    pub fn find_animation(&self, name: &str) -> Option<Arc<AnimationClip>> {
        self.animations
            .iter()
            .find(|clip| clip.name() == name)
            .cloned()
    }

    // ─── Slot inspection ──────────────────────────────────────────────────

    #[must_use]
    pub fn current(&self) -> Option<&PlaybackState> {
        self.current.and_then(|key| self.pool.get(key))
    }

    #[must_use]
    pub fn previous(&self) -> Option<&PlaybackState> {
        self.previous.and_then(|key| self.pool.get(key))
    }

    #[must_use]
    pub fn queued(&self) -> Option<&PlaybackState> {
        self.queued.and_then(|key| self.pool.get(key))
    }

    #[must_use]
    pub fn in_action(&self) -> bool {
        self.in_action
    }

    /// The playback-state arena; its length is the number of live slots.
    #[must_use]
    pub fn pool(&self) -> &StatePool {
        &self.pool
    }

    // ─── Playback operations ──────────────────────────────────────────────

    /// Sets the active animation, replacing any current animation with no
    /// blending. The previous and queued slots are untouched.
    pub fn set_animation(&mut self, clip: &Arc<AnimationClip>, params: PlayParams) {
        let state = self.obtain(ClipSource::Bound(clip.clone()), params);
        self.replace_current(state);
    }

    /// Like [`set_animation`](Self::set_animation), resolving the clip by
    /// name. An unknown name is not an error: the slot stays pending and
    /// resolution is retried every frame until the clip is registered.
    pub fn set_animation_by_name(&mut self, name: &str, params: PlayParams) {
        let source = self.source_for(name);
        let state = self.obtain(source, params);
        self.replace_current(state);
    }

    /// Changes the current animation, cross-fading the new one on top of
    /// the old over `transition_time` seconds.
    pub fn animate(&mut self, clip: &Arc<AnimationClip>, transition_time: f32, params: PlayParams) {
        let state = self.obtain(ClipSource::Bound(clip.clone()), params);
        self.animate_state(state, transition_time);
    }

    /// By-name variant of [`animate`](Self::animate); unknown names stay
    /// pending like [`set_animation_by_name`](Self::set_animation_by_name).
    pub fn animate_by_name(&mut self, name: &str, transition_time: f32, params: PlayParams) {
        let source = self.source_for(name);
        let state = self.obtain(source, params);
        self.animate_state(state, transition_time);
    }

    /// Queues an animation to play when the current one finishes. A
    /// continuously looping current animation is forced to exactly one
    /// remaining loop so the queued clip activates at the next boundary;
    /// a stopped current is replaced immediately.
    pub fn queue(&mut self, clip: &Arc<AnimationClip>, transition_time: f32, params: PlayParams) {
        let state = self.obtain(ClipSource::Bound(clip.clone()), params);
        self.queue_state(state, transition_time);
    }

    /// By-name variant of [`queue`](Self::queue).
    pub fn queue_by_name(&mut self, name: &str, transition_time: f32, params: PlayParams) {
        let source = self.source_for(name);
        let state = self.obtain(source, params);
        self.queue_state(state, transition_time);
    }

    /// Plays a one-shot action on top of the current animation. The
    /// interrupted state is parked in the queued slot and resumes when the
    /// action finishes.
    ///
    /// An action must run out: a negative (infinite) loop count is rejected
    /// before any slot is touched.
    pub fn action(
        &mut self,
        clip: &Arc<AnimationClip>,
        transition_time: f32,
        params: PlayParams,
    ) -> Result<()> {
        if params.loop_count < 0 {
            return Err(KinemaError::ContinuousAction(clip.name().to_owned()));
        }
        let state = self.obtain(ClipSource::Bound(clip.clone()), params);
        self.action_state(state, transition_time);
        Ok(())
    }

    /// By-name variant of [`action`](Self::action).
    pub fn action_by_name(
        &mut self,
        name: &str,
        transition_time: f32,
        params: PlayParams,
    ) -> Result<()> {
        if params.loop_count < 0 {
            return Err(KinemaError::ContinuousAction(name.to_owned()));
        }
        let source = self.source_for(name);
        let state = self.obtain(source, params);
        self.action_state(state, transition_time);
        Ok(())
    }

    // ─── Per-frame update ─────────────────────────────────────────────────

    /// Advances playback by `delta` seconds and writes sampled transforms
    /// into `nodes`. The one per-frame entry point.
    pub fn update<N: TransformNode>(&mut self, delta: f32, nodes: &mut [N]) {
        if self.paused {
            return;
        }

        self.transition_current_time += delta;

        if self.previous.is_some() && self.transition_current_time >= self.transition_target_time {
            if let Some(previous) = self.previous.take() {
                self.pool.release(previous);
            }
        }

        self.resolve_pending();

        let Some(current_key) = self.current else {
            return;
        };
        let advance = {
            let Some(current) = self.pool.get_mut(current_key) else {
                return;
            };
            if current.loop_count == 0 || current.clip().is_none() {
                return;
            }
            current.advance(delta)
        };

        if advance.looped > 0 || advance.ended {
            if let Some(state) = self.pool.get(current_key) {
                if let Some(listener) = state.listener() {
                    for _ in 0..advance.looped {
                        listener.on_loop(state);
                    }
                    if advance.ended {
                        listener.on_end(state);
                    }
                }
            }
        }

        if advance.overflow != 0.0 && self.queued.is_some() {
            // Splice the queued clip in within the same frame instead of
            // losing the rest of the delta.
            self.in_action = false;
            if let Some(queued) = self.queued.take() {
                self.animate_state(queued, self.queued_transition_time);
            }
            self.update(advance.overflow, nodes);
            return;
        }

        if self.previous.is_some() {
            let weight = self.transition_current_time / self.transition_target_time;
            let first = self.previous.and_then(|key| self.clip_and_time(key));
            let second = self.clip_and_time(current_key);
            self.apply_blended(first, second, weight, nodes);
        } else if let Some((clip, time)) = self.clip_and_time(current_key) {
            self.apply_single(&clip, time, nodes);
        }

        self.fire_action_events(current_key, delta);
    }

    // ─── Slot transitions ─────────────────────────────────────────────────

    fn obtain(&mut self, source: ClipSource, params: PlayParams) -> StateKey {
        self.pool.acquire(PlaybackState::new(source, params))
    }

    /// Acquires a fresh state replaying `key`'s request from the start.
    fn obtain_copy(&mut self, key: StateKey) -> Option<StateKey> {
        let params = {
            let state = self.pool.get(key)?;
            PlayParams {
                loop_count: state.loop_count,
                speed: state.speed,
                duration: state.duration_override(),
                offset: state.offset,
                listener: state.listener(),
            }
        };
        let source = self.pool.get(key)?.source().clone();
        Some(self.obtain(source, params))
    }

    fn source_for(&self, name: &str) -> ClipSource {
        match self.find_animation(name) {
            Some(clip) => ClipSource::Bound(clip),
            None => ClipSource::Pending(name.to_owned()),
        }
    }

    fn replace_current(&mut self, state: StateKey) {
        if let Some(old) = self.current.take() {
            self.carry_time_if_same(old, state);
            self.pool.release(old);
        }
        self.current = Some(state);
    }

    fn animate_state(&mut self, state: StateKey, transition_time: f32) {
        let Some(current) = self.current else {
            self.current = Some(state);
            return;
        };
        if self.in_action {
            self.queue_state(state, transition_time);
            return;
        }
        if !self.allow_same_animation && self.same_clip(current, state) {
            self.carry_time_if_same(current, state);
            self.pool.release(current);
            self.current = Some(state);
            return;
        }
        if let Some(previous) = self.previous.take() {
            self.pool.release(previous);
        }
        self.previous = Some(current);
        self.current = Some(state);
        self.transition_current_time = 0.0;
        self.transition_target_time = transition_time;
    }

    fn queue_state(&mut self, state: StateKey, transition_time: f32) {
        if self.current_stopped() {
            self.animate_state(state, transition_time);
            return;
        }
        if let Some(old) = self.queued.take() {
            self.pool.release(old);
        }
        self.queued = Some(state);
        self.queued_transition_time = transition_time;
        if let Some(current) = self.current.and_then(|key| self.pool.get_mut(key)) {
            // Sync the handover to the next loop boundary.
            if current.loop_count < 0 {
                current.loop_count = 1;
            }
        }
    }

    fn action_state(&mut self, state: StateKey, transition_time: f32) {
        if self.current_stopped() {
            self.animate_state(state, transition_time);
            return;
        }
        let to_queue = if self.in_action {
            None
        } else {
            self.current.and_then(|key| self.obtain_copy(key))
        };
        self.in_action = false;
        self.animate_state(state, transition_time);
        self.in_action = true;
        if let Some(restore) = to_queue {
            self.queue_state(restore, transition_time);
        }
    }

    fn current_stopped(&self) -> bool {
        self.current
            .and_then(|key| self.pool.get(key))
            .is_none_or(|state| state.loop_count == 0)
    }

    fn same_clip(&self, a: StateKey, b: StateKey) -> bool {
        match (self.pool.get(a), self.pool.get(b)) {
            (Some(a), Some(b)) => match (a.source(), b.source()) {
                (ClipSource::Bound(a), ClipSource::Bound(b)) => Arc::ptr_eq(a, b),
                (ClipSource::Pending(a), ClipSource::Pending(b)) => a == b,
                _ => false,
            },
            _ => false,
        }
    }

    fn carry_time_if_same(&mut self, old: StateKey, new: StateKey) {
        if self.allow_same_animation || !self.same_clip(old, new) {
            return;
        }
        let time = self.pool.get(old).map_or(0.0, |state| state.time);
        if let Some(state) = self.pool.get_mut(new) {
            state.time = time;
        }
    }

    /// Retries the by-name lookup for a pending current slot. Not an error
    /// while the clip is still missing; assets may load out of order.
    fn resolve_pending(&mut self) {
        let Some(key) = self.current else {
            return;
        };
        let name = match self.pool.get(key).map(PlaybackState::source) {
            Some(ClipSource::Pending(name)) => name.clone(),
            _ => return,
        };
        if let Some(clip) = self.find_animation(&name) {
            if let Some(state) = self.pool.get_mut(key) {
                state.bind(clip);
            }
        }
    }

    fn clip_and_time(&self, key: StateKey) -> Option<(Arc<AnimationClip>, f32)> {
        let state = self.pool.get(key)?;
        let clip = state.clip()?.clone();
        Some((clip, state.offset + state.time))
    }

    // ─── Blending ─────────────────────────────────────────────────────────

    /// Applies two animations, blending the second onto the first by
    /// `weight`. A weight of exactly `0` or `1` short-circuits to a direct
    /// apply of the respective animation.
    fn apply_blended<N: TransformNode>(
        &mut self,
        first: Option<(Arc<AnimationClip>, f32)>,
        second: Option<(Arc<AnimationClip>, f32)>,
        weight: f32,
        nodes: &mut [N],
    ) {
        match (first, second) {
            (Some((clip, time)), None) => self.apply_single(&clip, time, nodes),
            (Some((clip, time)), Some(_)) if weight == 0.0 => {
                self.apply_single(&clip, time, nodes);
            }
            (None, Some((clip, time))) => self.apply_single(&clip, time, nodes),
            (Some(_), Some((clip, time))) if weight == 1.0 => {
                self.apply_single(&clip, time, nodes);
            }
            (Some((first_clip, first_time)), Some((second_clip, second_time))) => {
                self.begin(nodes.len());
                self.apply(&first_clip, first_time, 1.0, nodes);
                self.apply(&second_clip, second_time, weight, nodes);
                self.end(nodes);
            }
            (None, None) => {}
        }
    }

    /// Applies a single animation directly to the nodes.
    fn apply_single<N: TransformNode>(&mut self, clip: &AnimationClip, time: f32, nodes: &mut [N]) {
        assert!(
            !self.applying,
            "apply_single() must not be called between begin() and end()"
        );
        self.apply_clip(false, 1.0, clip, time, nodes);
    }

    /// Begins accumulating multiple weighted animations; must be paired
    /// with [`end`](Self::end).
    fn begin(&mut self, node_count: usize) {
        assert!(!self.applying, "begin() called twice without end()");
        self.applying = true;
        self.blend_positions.clear();
        self.blend_positions.resize(node_count, None);
        self.blend_rotations.clear();
        self.blend_rotations.resize(node_count, None);
        self.blend_scales.clear();
        self.blend_scales.resize(node_count, None);
    }

    /// Accumulates one animation into the blend scratch at `weight`
    /// relative to previously applied animations.
    fn apply<N: TransformNode>(
        &mut self,
        clip: &AnimationClip,
        time: f32,
        weight: f32,
        nodes: &mut [N],
    ) {
        assert!(self.applying, "apply() called without begin()");
        self.apply_clip(true, weight, clip, time, nodes);
    }

    /// Writes accumulated values back to the nodes and clears the scratch.
    fn end<N: TransformNode>(&mut self, nodes: &mut [N]) {
        assert!(self.applying, "end() called without begin()");

        for (index, slot) in self.blend_positions.iter_mut().enumerate() {
            if let Some(position) = slot.take() {
                if let Some(node) = nodes.get_mut(index) {
                    node.set_position(position);
                }
            }
        }
        for (index, slot) in self.blend_rotations.iter_mut().enumerate() {
            if let Some(rotation) = slot.take() {
                if let Some(node) = nodes.get_mut(index) {
                    node.set_rotation(rotation.x, rotation.y, rotation.z, rotation.w);
                }
            }
        }
        for (index, slot) in self.blend_scales.iter_mut().enumerate() {
            if let Some(scale) = slot.take() {
                if let Some(node) = nodes.get_mut(index) {
                    node.set_scale(scale);
                }
            }
        }

        self.applying = false;
    }

    /// Samples every track of `clip` at `time` and either writes the values
    /// straight to the nodes or folds them into the blend scratch.
    ///
    /// Tracks whose node index falls outside the bound node table are
    /// logged and skipped; playback continues for all other tracks.
    fn apply_clip<N: TransformNode>(
        &mut self,
        blending: bool,
        alpha: f32,
        clip: &AnimationClip,
        time: f32,
        nodes: &mut [N],
    ) {
        for track in clip.translation_tracks() {
            let index = track.node_index();
            let target = track.sample(time);
            if blending {
                let Some(slot) = self.blend_positions.get_mut(index) else {
                    warn_missing_node(index, nodes.len());
                    continue;
                };
                // First contributor seeds from the node's current value;
                // later contributors fold into the accumulator.
                let seed = slot.take().unwrap_or_else(|| nodes[index].position());
                *slot = Some(if alpha > WEIGHT_ONE {
                    target
                } else {
                    seed.lerp(target, alpha)
                });
            } else {
                let Some(node) = nodes.get_mut(index) else {
                    warn_missing_node(index, nodes.len());
                    continue;
                };
                node.set_position(target);
            }
        }

        for track in clip.rotation_tracks() {
            let index = track.node_index();
            let target = track.sample(time);
            if blending {
                let Some(slot) = self.blend_rotations.get_mut(index) else {
                    warn_missing_node(index, nodes.len());
                    continue;
                };
                let seed = slot.take().unwrap_or_else(|| nodes[index].rotation());
                *slot = Some(if alpha > WEIGHT_ONE {
                    target
                } else {
                    seed.slerp(target, alpha)
                });
            } else {
                let Some(node) = nodes.get_mut(index) else {
                    warn_missing_node(index, nodes.len());
                    continue;
                };
                node.set_rotation(target.x, target.y, target.z, target.w);
            }
        }

        for track in clip.scale_tracks() {
            let index = track.node_index();
            let target = track.sample(time);
            if blending {
                let Some(slot) = self.blend_scales.get_mut(index) else {
                    warn_missing_node(index, nodes.len());
                    continue;
                };
                let seed = slot.take().unwrap_or_else(|| nodes[index].scale());
                *slot = Some(if alpha > WEIGHT_ONE {
                    target
                } else {
                    seed.lerp(target, alpha)
                });
            } else {
                let Some(node) = nodes.get_mut(index) else {
                    warn_missing_node(index, nodes.len());
                    continue;
                };
                node.set_scale(target);
            }
        }

        for node in nodes.iter_mut() {
            node.request_transform_update();
        }
    }

    // ─── Action events ────────────────────────────────────────────────────

    /// Fires every timed callback the current state's cursor passed this
    /// frame, each at most once.
    ///
    /// The covered segment is direction-aware and includes the wrapped part
    /// when a loop boundary was crossed: playing forward across the
    /// boundary fires `[previous_time, duration]` and `[0, time]`. When a
    /// frame spans more than one whole loop, each callback still fires at
    /// most once.
    fn fire_action_events(&self, key: StateKey, delta: f32) {
        let Some(state) = self.pool.get(key) else {
            return;
        };
        let Some(clip) = state.clip().cloned() else {
            return;
        };
        let track = clip.action_track();
        if track.is_empty() {
            return;
        }

        let previous = state.previous_time();
        let time = state.time;
        let reversed = state.speed * delta < 0.0;
        let wrapped = if reversed {
            time > previous
        } else {
            time < previous
        };

        for (key_time, action) in track.iter() {
            let fire = match (wrapped, reversed) {
                (false, false) => key_time >= previous && key_time <= time,
                (false, true) => key_time >= time && key_time <= previous,
                (true, false) => key_time >= previous || key_time <= time,
                (true, true) => key_time <= previous || key_time >= time,
            };
            if fire {
                action();
            }
        }
    }
}

impl Default for AnimationPlayer {
    fn default() -> Self {
        Self::new()
    }
}

fn warn_missing_node(index: usize, bound: usize) {
    log::warn!("animation track targets node {index}, but only {bound} nodes are bound");
}
