//! Domless engine crate.
//!
//! This crate owns the host-side pieces the widget layer runs on: geometry,
//! colors, input state, frame timing, interpolation tasks, text metrics and
//! the camera / paint-order / draw-stream scene types. It is headless; a
//! platform runtime feeds it input and consumes its draw list.

pub mod input;
pub mod time;
pub mod tween;

pub mod logging;
pub mod coords;
pub mod paint;
pub mod scene;
pub mod text;
