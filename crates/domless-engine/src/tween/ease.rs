/// Easing curve: maps linear progress in `[0, 1]` to eased progress in `[0, 1]`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Ease {
    #[default]
    Linear,
    /// Quadratic, slow start.
    QuadIn,
    /// Quadratic, slow end.
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    /// Slow start and end; the curve used by every slide and page scroll.
    CubicInOut,
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::QuadIn => t * t,
            Ease::QuadOut => t * (2.0 - t),
            Ease::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Ease::CubicIn => t * t * t,
            Ease::CubicOut => {
                let t = t - 1.0;
                t * t * t + 1.0
            }
            Ease::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let t = t - 1.0;
                    1.0 + 4.0 * t * t * t
                }
            }
        }
    }
}

/// Linearly interpolate between two f32 values
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
