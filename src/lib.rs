#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Transform-animation playback and blending.
//!
//! The crate samples keyframe tracks (translation, rotation, scale) and
//! drives a table of scene-graph transform nodes. An [`AnimationPlayer`]
//! owns the runtime state: the currently playing clip, an optional previous
//! clip it is cross-fading from, a queued follow-up clip, and one-shot
//! "action" clips layered over a looping base clip. Discrete timed callbacks
//! embedded in a clip fire as the time cursor passes them.
//!
//! The scene graph itself is an external collaborator: nodes are consumed
//! through the [`TransformNode`] trait and borrowed per update call, so the
//! scene keeps ownership of its own data.
//!
//! ```
//! use std::sync::Arc;
//! use glam::Vec3;
//! use kinema::{
//!     ActionTrack, AnimationClip, AnimationPlayer, Interpolation,
//!     KeyframeTrack, PlayParams, Transform,
//! };
//!
//! let slide = Arc::new(AnimationClip::new(
//!     "slide",
//!     vec![KeyframeTrack::new(
//!         0,
//!         vec![0.0, 1.0],
//!         vec![Vec3::ZERO, Vec3::X],
//!         Interpolation::Linear,
//!     )],
//!     vec![],
//!     vec![],
//!     ActionTrack::new(),
//! ));
//!
//! let mut nodes = vec![Transform::new()];
//! let mut player = AnimationPlayer::new();
//! player.set_animation(&slide, PlayParams::looping());
//! player.update(0.5, &mut nodes);
//! assert_eq!(nodes[0].position, Vec3::new(0.5, 0.0, 0.0));
//! ```

pub mod clip;
pub mod errors;
pub mod playback;
pub mod player;
pub mod pool;
pub mod target;
pub mod tracks;
pub mod values;

pub use clip::{ActionCallback, ActionTrack, AnimationClip};
pub use errors::{KinemaError, Result};
pub use playback::{Advance, ClipSource, PlayParams, PlaybackEvents, PlaybackState};
pub use player::AnimationPlayer;
pub use pool::{StateKey, StatePool};
pub use target::{Transform, TransformNode};
pub use tracks::{Interpolation, KeyframeTrack};
pub use values::Interpolatable;
