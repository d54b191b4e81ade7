//! Scoring Engine: distance decay kernels and the fuzzy combination rule.
//!
//! Pure numeric helpers, free of grid and tiling dependencies; the only
//! entry point touching the table is [`score_grid`].

use crate::grid::{Grid, Rock};

/// Distance-decay kernel, fixed once at configuration time.
///
/// Both variants satisfy the same boundary contract: membership 1 at
/// `d = 0`, monotonically non-increasing in `d`, and a characteristic drop
/// at `d = d0_m` (`e^-1` for Gaussian, `0` for linear).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DecayKernel {
    /// `exp(-(d/d0)^alpha)`.
    Gaussian {
        /// Fall-off distance in metres.
        d0_m: f64,
        /// Shape exponent controlling fall-off steepness.
        alpha: f64,
    },
    /// `clip(1 - d/d0, 0, 1)`; reaches zero at `d0` and stays there.
    Linear {
        /// Fall-off distance in metres.
        d0_m: f64,
    },
}

impl DecayKernel {
    /// Membership in `[0, 1]` for a distance in metres.
    ///
    /// An undefined distance (`None`) means "as far as possible" and maps to
    /// membership 0, never 1.
    pub fn membership(self, dist_m: Option<f64>) -> f64 {
        match dist_m {
            Some(d) => self.eval(d),
            None => 0.0,
        }
    }

    /// Kernel value for a defined, non-negative distance.
    pub fn eval(self, dist_m: f64) -> f64 {
        match self {
            DecayKernel::Gaussian { d0_m, alpha } => (-(dist_m / d0_m).powf(alpha)).exp(),
            DecayKernel::Linear { d0_m } => (1.0 - dist_m / d0_m).clamp(0.0, 1.0),
        }
    }
}

/// Weighted fuzzy AND: the weighted geometric mean `mu_a^w * mu_b^(1-w)`.
///
/// Rewards cells where both memberships are simultaneously high far more
/// than an average would, and degrades to either pure membership at the
/// weight extremes. Inputs and weight are clipped to `[0, 1]` before
/// exponentiation so floating-point overshoot can never produce complex or
/// out-of-range results.
///
/// # Examples
/// ```
/// # use prospectivity::score::weighted_and;
/// assert_eq!(weighted_and(0.7, 0.3, 1.0), 0.7);
/// assert_eq!(weighted_and(0.7, 0.3, 0.0), 0.3);
/// assert!((weighted_and(0.4, 0.9, 0.5) - (0.4f64 * 0.9).sqrt()).abs() < 1e-12);
/// ```
pub fn weighted_and(mu_a: f64, mu_b: f64, weight_a: f64) -> f64 {
    let mu_a = mu_a.clamp(0.0, 1.0);
    let mu_b = mu_b.clamp(0.0, 1.0);
    let w = weight_a.clamp(0.0, 1.0);
    mu_a.powf(w) * mu_b.powf(1.0 - w)
}

/// Fills the score column from the two distance columns.
///
/// Pass-through of the intersection flags and distances; no filtering or
/// thresholding happens here.
pub fn score_grid(grid: &mut Grid, kernel: DecayKernel, weight_a: f64) {
    for record in grid.records_mut() {
        let mu_a = kernel.membership(record.dist(Rock::A));
        let mu_b = kernel.membership(record.dist(Rock::B));
        record.score = weighted_and(mu_a, mu_b, weight_a);
    }
}
