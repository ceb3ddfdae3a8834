//! Paint model shared between the widget layer and the host renderer.
//!
//! Colors are linear premultiplied RGBA. Widgets mostly configure colors as
//! `0xRRGGBB` hex literals; see [`Color::from_hex`].

pub mod color;

pub use color::Color;
