//! Text styling, measurement and word wrapping.
//!
//! Widgets never rasterize text; they only need metrics. [`TextMeasure`] is
//! the seam: [`FontSystem`] answers from real font data via `fontdue`, and
//! [`MonospaceMetrics`] answers deterministically for headless hosts.

mod font_system;
mod measure;
mod style;
mod wrap;

pub use font_system::{FontId, FontLoadError, FontSystem};
pub use measure::{MonospaceMetrics, TextMeasure};
pub use style::{Padding, TextAlign, TextStyle};
pub use wrap::{wrap_text, WrappedLine};
