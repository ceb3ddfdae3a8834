//! Time-based interpolation tasks.
//!
//! A [`Tween`] animates a set of relative property deltas over a duration.
//! It does not own its target: every [`Tween::advance`] call returns the
//! increments applied during that tick and the owner adds them to its own
//! fields. Completion is observable both by polling [`Tween::state`] and via
//! single-shot hooks fired synchronously on the completing tick.

mod ease;
mod task;

pub use ease::{lerp, Ease};
pub use task::{Repeat, Tween, TweenProp, TweenState, TweenStep};
