use serde::{Deserialize, Serialize};

/// Shaping curve applied to the normalised progress of a transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
}

impl Easing {
    /// Maps `t` onto the curve. `t` is clamped to `[0, 1]` first, so the
    /// result always starts at 0 and ends at 1.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => out_quad(t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// Quadratic ease-out without clamping.
pub fn out_quad(t: f64) -> f64 {
    1.0 - (1.0 - t) * (1.0 - t)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 7] = [
        Easing::Linear,
        Easing::InQuad,
        Easing::OutQuad,
        Easing::InOutQuad,
        Easing::InCubic,
        Easing::OutCubic,
        Easing::InOutCubic,
    ];

    #[test]
    fn every_curve_is_anchored_at_both_ends() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?}");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-12, "{easing:?}");
        }
    }

    #[test]
    fn clamps_progress_outside_unit_range() {
        assert_eq!(Easing::OutQuad.apply(-3.0), 0.0);
        assert_eq!(Easing::InCubic.apply(7.5), 1.0);
    }

    #[test]
    fn out_quad_front_loads_motion() {
        assert_eq!(Easing::OutQuad.apply(0.5), 0.75);
        assert_eq!(Easing::InQuad.apply(0.5), 0.25);
        assert_eq!(Easing::InOutQuad.apply(0.5), 0.5);
    }
}
