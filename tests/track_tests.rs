//! Keyframe track sampling tests.
//!
//! Covers:
//! - single-keyframe constant channels
//! - binary-search keyframe lookup and exact-keyframe hits
//! - the index-0 out-of-domain policy
//! - Linear vs Step interpolation, Vec3 lerp and Quat slerp
//! - degenerate zero-width intervals from duplicate endpoint keys

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};

use kinema::{Interpolation, KeyframeTrack};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

// ============================================================================
// Single keyframe: constant channel
// ============================================================================

#[test]
fn single_keyframe_is_constant_for_any_time() {
    let track = KeyframeTrack::new(
        0,
        vec![0.5],
        vec![Vec3::new(1.0, 2.0, 3.0)],
        Interpolation::Linear,
    );

    for time in [-1000.0, -0.1, 0.0, 0.5, 3.0, 1.0e9] {
        assert_eq!(track.sample(time), Vec3::new(1.0, 2.0, 3.0), "t = {time}");
    }
}

// ============================================================================
// Exact keyframe hits
// ============================================================================

#[test]
fn sample_at_exact_keyframe_times() {
    let track = KeyframeTrack::new(
        0,
        vec![0.0, 1.0, 2.0, 3.0],
        vec![0.0_f32, 10.0, 20.0, 30.0],
        Interpolation::Linear,
    );

    assert!(approx(track.sample(0.0), 0.0));
    assert!(approx(track.sample(1.0), 10.0));
    assert!(approx(track.sample(2.0), 20.0));
    assert!(approx(track.sample(3.0), 30.0));
}

#[test]
fn sample_midway_interpolates_linearly() {
    let track = KeyframeTrack::new(
        0,
        vec![0.0, 1.0, 2.0],
        vec![0.0_f32, 10.0, 30.0],
        Interpolation::Linear,
    );

    assert!(approx(track.sample(0.5), 5.0));
    assert!(approx(track.sample(1.5), 20.0));
    assert!(approx(track.sample(1.25), 15.0));
}

// ============================================================================
// Out-of-domain policy: resolve to the first keyframe pair
// ============================================================================

#[test]
fn before_first_keyframe_resolves_to_first_pair() {
    // Domain starts at t = 1; sampling at t = 0.5 resolves to index 0 and
    // interpolates the first pair with the unclamped local ratio -0.5.
    let track = KeyframeTrack::new(
        0,
        vec![1.0, 2.0],
        vec![10.0_f32, 20.0],
        Interpolation::Linear,
    );

    assert!(approx(track.sample(0.5), 5.0));
}

#[test]
fn after_last_keyframe_resolves_to_first_pair() {
    let track = KeyframeTrack::new(
        0,
        vec![0.0, 1.0],
        vec![0.0_f32, 10.0],
        Interpolation::Linear,
    );

    // Local ratio 5.0 against the first pair.
    assert!(approx(track.sample(5.0), 50.0));
}

#[test]
fn out_of_domain_step_holds_first_value() {
    let track = KeyframeTrack::new(
        0,
        vec![1.0, 2.0, 3.0],
        vec![10.0_f32, 20.0, 30.0],
        Interpolation::Step,
    );

    assert!(approx(track.sample(0.0), 10.0));
    assert!(approx(track.sample(9.0), 10.0));
}

// ============================================================================
// Step interpolation
// ============================================================================

#[test]
fn step_holds_left_keyframe_over_interval() {
    let track = KeyframeTrack::new(
        0,
        vec![0.0, 1.0, 2.0],
        vec![0.0_f32, 100.0, 200.0],
        Interpolation::Step,
    );

    assert!(approx(track.sample(0.0), 0.0));
    assert!(approx(track.sample(0.99), 0.0));
    assert!(approx(track.sample(1.0), 100.0));
    assert!(approx(track.sample(1.5), 100.0));
    // The last keyframe time resolves to the closing interval, whose left
    // value a step track holds.
    assert!(approx(track.sample(2.0), 100.0));
}

// ============================================================================
// Vector and orientation channels
// ============================================================================

#[test]
fn vec3_midpoint_lerp() {
    let track = KeyframeTrack::new(
        2,
        vec![0.0, 2.0],
        vec![Vec3::ZERO, Vec3::new(2.0, 4.0, -6.0)],
        Interpolation::Linear,
    );

    assert!(approx_vec3(track.sample(1.0), Vec3::new(1.0, 2.0, -3.0)));
    assert_eq!(track.node_index(), 2);
}

#[test]
fn quat_slerp_takes_shortest_arc() {
    let track = KeyframeTrack::new(
        0,
        vec![0.0, 1.0],
        vec![Quat::IDENTITY, Quat::from_rotation_z(FRAC_PI_2)],
        Interpolation::Linear,
    );

    let halfway = track.sample(0.5);
    let expected = Quat::from_rotation_z(FRAC_PI_2 / 2.0);
    assert!(halfway.dot(expected).abs() > 1.0 - EPSILON);
}

// ============================================================================
// Degenerate intervals
// ============================================================================

#[test]
fn duplicate_endpoint_keys_do_not_divide_by_zero() {
    let track = KeyframeTrack::new(
        0,
        vec![0.0, 0.0, 1.0, 1.0],
        vec![1.0_f32, 2.0, 3.0, 4.0],
        Interpolation::Linear,
    );

    let value = track.sample(0.0);
    assert!(value.is_finite());
    let value = track.sample(1.0);
    assert!(value.is_finite());
}

// ============================================================================
// Metadata
// ============================================================================

#[test]
fn duration_is_last_keyframe_time() {
    let track = KeyframeTrack::new(
        0,
        vec![0.0, 0.25, 1.75],
        vec![Vec3::ZERO, Vec3::ONE, Vec3::ZERO],
        Interpolation::Linear,
    );

    assert!(approx(track.duration(), 1.75));
}

#[test]
#[should_panic(expected = "parallel")]
fn mismatched_times_and_values_panic() {
    let _ = KeyframeTrack::new(0, vec![0.0, 1.0], vec![Vec3::ZERO], Interpolation::Linear);
}
