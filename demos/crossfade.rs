//! Cross-fades a looping walk onto an idle pose, queues a stop, and fires
//! a footstep callback embedded in the walk clip.
//!
//! Run with `RUST_LOG=debug cargo run --example crossfade`.

use std::sync::Arc;

use glam::{Quat, Vec3};

use kinema::{
    ActionTrack, AnimationClip, AnimationPlayer, Interpolation, KeyframeTrack, PlayParams,
    Transform,
};

fn idle_clip() -> Arc<AnimationClip> {
    Arc::new(AnimationClip::new(
        "idle",
        vec![KeyframeTrack::new(
            0,
            vec![0.0],
            vec![Vec3::ZERO],
            Interpolation::Linear,
        )],
        vec![],
        vec![],
        ActionTrack::new(),
    ))
}

fn walk_clip() -> Arc<AnimationClip> {
    let mut actions = ActionTrack::new();
    actions.push(0.5, || println!("  [footstep]"));

    Arc::new(AnimationClip::new(
        "walk",
        vec![KeyframeTrack::new(
            0,
            vec![0.0, 0.5, 1.0],
            vec![Vec3::ZERO, Vec3::new(0.5, 0.1, 0.0), Vec3::X],
            Interpolation::Linear,
        )],
        vec![KeyframeTrack::new(
            0,
            vec![0.0, 1.0],
            vec![Quat::IDENTITY, Quat::from_rotation_y(0.3)],
            Interpolation::Linear,
        )],
        vec![],
        actions,
    ))
}

fn main() {
    env_logger::init();

    let mut nodes = vec![Transform::new()];
    let mut player = AnimationPlayer::new();
    player.add_animation(idle_clip());
    player.add_animation(walk_clip());

    player.set_animation_by_name("idle", PlayParams::looping());

    let dt = 1.0 / 30.0;
    for frame in 0..90 {
        match frame {
            15 => {
                println!("-- fading to walk");
                player.animate_by_name("walk", 0.3, PlayParams::looping());
            }
            60 => {
                println!("-- queueing idle after the current loop");
                player.queue_by_name("idle", 0.2, PlayParams::looping());
            }
            _ => {}
        }

        player.update(dt, &mut nodes);
        nodes[0].clear_update_flag();

        if frame % 10 == 0 {
            let name = player
                .current()
                .and_then(|state| state.clip())
                .map_or("-", |clip| clip.name());
            println!(
                "frame {frame:3} clip {name:5} position {:?}",
                nodes[0].position
            );
        }
    }
}
