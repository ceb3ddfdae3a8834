//! Time subsystem.
//!
//! Provides frame timing without coupling to a runtime. Widgets and tweens
//! consume milliseconds; `FrameTime::dt_ms` bridges the two.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
