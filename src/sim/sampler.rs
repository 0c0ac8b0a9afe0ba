//! Crash value sampling for the pre-committed outcome strategy
//!
//! Small crashes are common, huge ones rare. The value is drawn once when a
//! round enters Waiting and never changes afterwards.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::round2;

/// Lowest crash value the weighted distribution can produce
pub const WEIGHTED_FLOOR: f64 = 1.1;

/// Tier table: (cumulative probability, low, high)
pub const TIERS: [(f64, f64, f64); 5] = [
    (0.35, 1.0, 1.5),
    (0.55, 1.5, 2.5),
    (0.75, 2.5, 5.0),
    (0.90, 5.0, 15.0),
    (1.00, 15.0, 100.0),
];

/// Crash value distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CrashDistribution {
    /// max(1.10, round2(1.15 + 34 * (1 - u)^3))
    #[default]
    Weighted,
    /// Five probability bands, uniform inside each
    Tiered,
}

impl CrashDistribution {
    /// Draw a crash value
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            CrashDistribution::Weighted => weighted_crash(rng.random::<f64>()),
            CrashDistribution::Tiered => {
                let u = rng.random::<f64>();
                let v = rng.random::<f64>();
                tiered_crash(u, v)
            }
        }
    }
}

/// Weighted crash value for a uniform draw `u` in [0, 1)
pub fn weighted_crash(u: f64) -> f64 {
    let w = (1.0 - u.clamp(0.0, 1.0)).powi(3);
    round2(1.15 + w * 34.0).max(WEIGHTED_FLOOR)
}

/// Tiered crash value: `u` picks the band, `v` the position inside it
pub fn tiered_crash(u: f64, v: f64) -> f64 {
    let u = u.clamp(0.0, 1.0);
    let v = v.clamp(0.0, 1.0);
    let (_, low, high) = TIERS
        .iter()
        .copied()
        .find(|&(cumulative, _, _)| u < cumulative)
        .unwrap_or(TIERS[TIERS.len() - 1]);
    let value = low + v * (high - low);
    // Keep the band half-open even when v rounds up to 1.0
    if value >= high { low.max(high - 1e-9) } else { value }
}
