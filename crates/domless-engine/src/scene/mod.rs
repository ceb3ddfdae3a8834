//! Scene types the widget layer draws into.
//!
//! Responsibilities:
//! - the camera (viewport size + vertical scroll)
//! - paint-order depth allocation
//! - the process-wide cache of generated outline/fill primitives
//! - renderer-agnostic draw commands with deterministic ordering

mod cache;
mod camera;
mod cmd;
mod depth;
mod key;
mod list;
mod z_index;

pub use cache::{PrimitiveCache, PrimitiveKey, Shape, TextureId};
pub use camera::Camera;
pub use cmd::{DrawCmd, RectCmd, SpriteCmd, TextCmd};
pub use depth::DepthStack;
pub use key::SortKey;
pub use list::{DrawItem, DrawList};
pub use z_index::ZIndex;
