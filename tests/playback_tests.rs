//! Playback-state time arithmetic and pool tests.
//!
//! Covers:
//! - loop counting with positive and negative speed
//! - overflow reporting when the loop budget runs out mid-frame
//! - effective-duration resolution (override vs clip duration minus offset)
//! - the zero-duration single-loop policy
//! - StatePool acquire/release slot reuse

use std::sync::Arc;

use glam::Vec3;

use kinema::{
    ActionTrack, AnimationClip, ClipSource, Interpolation, KeyframeTrack, PlayParams,
    PlaybackState, StatePool,
};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// A clip of the given duration with one linear translation track.
fn clip(duration: f32) -> Arc<AnimationClip> {
    Arc::new(AnimationClip::new(
        "clip",
        vec![KeyframeTrack::new(
            0,
            vec![0.0, duration],
            vec![Vec3::ZERO, Vec3::X],
            Interpolation::Linear,
        )],
        vec![],
        vec![],
        ActionTrack::new(),
    ))
}

fn state(clip_duration: f32, params: PlayParams) -> PlaybackState {
    PlaybackState::new(ClipSource::Bound(clip(clip_duration)), params)
}

// ============================================================================
// Loop counting
// ============================================================================

#[test]
fn infinite_loop_never_overflows() {
    let mut state = state(1.0, PlayParams::looping());

    for delta in [0.1, 10.0, 1.0e4, -3.5, 0.0] {
        let advance = state.advance(delta);
        assert!(
            approx(advance.overflow, 0.0),
            "delta {delta} produced overflow {}",
            advance.overflow
        );
        assert!(!advance.ended);
        assert!(state.loop_count < 0);
    }
}

#[test]
fn single_loop_overflow_pins_time_at_forward_boundary() {
    // Clip A: duration 2 s, loop count 1, speed 1; advance(3.0).
    let mut state = state(2.0, PlayParams::once());

    let advance = state.advance(3.0);
    assert!(approx(state.time, 2.0), "time = {}", state.time);
    assert!(approx(advance.overflow, 1.0), "overflow = {}", advance.overflow);
    assert_eq!(state.loop_count, 0);
    assert!(advance.ended);
}

#[test]
fn single_loop_overflow_pins_time_at_backward_boundary() {
    let mut state = state(2.0, PlayParams::once().with_speed(-1.0));
    assert!(approx(state.time, 2.0), "reverse playback starts at the end");

    let advance = state.advance(3.0);
    assert!(approx(state.time, 0.0), "time = {}", state.time);
    assert!(approx(advance.overflow, 1.0), "overflow = {}", advance.overflow);
    assert_eq!(state.loop_count, 0);
}

#[test]
fn multiple_loops_consumed_in_one_frame() {
    let mut state = state(1.0, PlayParams::once().with_loop_count(2));

    // 3.5 s against a 2-loop budget of 1 s each: 2.0 consumed, 1.5 left.
    let advance = state.advance(3.5);
    assert!(approx(advance.overflow, 1.5), "overflow = {}", advance.overflow);
    assert!(approx(state.time, 1.0));
    assert_eq!(state.loop_count, 0);
}

#[test]
fn partial_advance_reports_no_overflow() {
    let mut state = state(2.0, PlayParams::once());

    let advance = state.advance(0.75);
    assert!(approx(advance.overflow, 0.0));
    assert!(approx(state.time, 0.75));
    assert_eq!(state.loop_count, 1);
    assert!(approx(state.previous_time(), 0.0));
}

#[test]
fn stopped_state_returns_delta_unchanged() {
    let mut state = state(2.0, PlayParams::once().with_loop_count(0));

    let advance = state.advance(0.5);
    assert!(approx(advance.overflow, 0.5));
    assert!(approx(state.time, 0.0));
}

#[test]
fn looping_reports_crossed_boundaries() {
    let mut state = state(1.0, PlayParams::looping());

    let advance = state.advance(2.5);
    assert_eq!(advance.looped, 2);
    assert!(approx(state.time, 0.5));
}

#[test]
fn reverse_speed_wraps_below_zero() {
    let mut state = state(2.0, PlayParams::looping().with_speed(-1.0));
    assert!(approx(state.time, 2.0));

    let advance = state.advance(3.0);
    // 2.0 - 3.0 = -1.0 folds back to 1.0 with one boundary crossed.
    assert!(approx(state.time, 1.0), "time = {}", state.time);
    assert!(approx(advance.overflow, 0.0));
    assert_eq!(advance.looped, 1);
}

// ============================================================================
// Effective duration
// ============================================================================

#[test]
fn negative_duration_uses_clip_duration_minus_offset() {
    let state = state(3.0, PlayParams::once().with_offset(1.0));
    assert!(approx(state.effective_duration(), 2.0));
}

#[test]
fn explicit_duration_override_wins() {
    let state = state(3.0, PlayParams::once().with_duration(0.5));
    assert!(approx(state.effective_duration(), 0.5));
}

#[test]
fn zero_duration_counts_as_one_loop_without_time_movement() {
    // A clip whose only keyframe sits at t = 0 has zero duration.
    let zero = Arc::new(AnimationClip::new(
        "pose",
        vec![KeyframeTrack::new(
            0,
            vec![0.0],
            vec![Vec3::ONE],
            Interpolation::Linear,
        )],
        vec![],
        vec![],
        ActionTrack::new(),
    ));
    let mut state = PlaybackState::new(
        ClipSource::Bound(zero),
        PlayParams::once().with_loop_count(3),
    );

    state.advance(0.5);
    assert_eq!(state.loop_count, 2);
    assert!(approx(state.time, 0.0));

    state.advance(0.5);
    state.advance(0.5);
    assert_eq!(state.loop_count, 0);
}

// ============================================================================
// Pending clip sources
// ============================================================================

#[test]
fn pending_state_consumes_nothing() {
    let mut state = PlaybackState::new(ClipSource::from("not-loaded-yet"), PlayParams::once());
    assert!(state.clip().is_none());
    assert!(approx(state.effective_duration(), 0.0));

    let advance = state.advance(0.25);
    assert!(approx(advance.overflow, 0.25));
    assert!(approx(state.time, 0.0));
}

// ============================================================================
// StatePool
// ============================================================================

#[test]
fn pool_reuses_released_slots() {
    let mut pool = StatePool::new();

    let a = pool.acquire(state(1.0, PlayParams::once()));
    let b = pool.acquire(state(1.0, PlayParams::looping()));
    assert_eq!(pool.len(), 2);

    pool.release(a);
    assert_eq!(pool.len(), 1);
    assert!(pool.get(a).is_none(), "released keys must go stale");
    assert!(pool.get(b).is_some());

    let c = pool.acquire(state(2.0, PlayParams::once()));
    assert_eq!(pool.len(), 2);
    assert!(pool.get(c).is_some());
}

#[test]
fn double_release_is_ignored() {
    let mut pool = StatePool::new();
    let a = pool.acquire(state(1.0, PlayParams::once()));

    pool.release(a);
    pool.release(a);
    assert!(pool.is_empty());
}
