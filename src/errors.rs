//! Crate error types.

use thiserror::Error;

/// Alias used by all fallible public APIs.
pub type Result<T> = std::result::Result<T, KinemaError>;

/// Errors reported by the animation player.
///
/// Recoverable per-frame conditions (a track addressing a node outside the
/// bound node table, an unresolved clip name) are logged and skipped rather
/// than surfaced here; this enum covers the calls where the caller holds a
/// bad argument.
#[derive(Error, Debug)]
pub enum KinemaError {
    /// Strict by-name lookup failed. Use
    /// [`AnimationPlayer::find_animation`](crate::AnimationPlayer::find_animation)
    /// when absence is expected.
    #[error("animation \"{0}\" is not found")]
    AnimationNotFound(String),

    /// A clip configured for infinite looping was passed to
    /// [`AnimationPlayer::action`](crate::AnimationPlayer::action).
    /// An action is a one-shot overlay and must have a finite loop budget.
    #[error("animation \"{0}\" cannot be an action: an action cannot loop continuously")]
    ContinuousAction(String),
}
