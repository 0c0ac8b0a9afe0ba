//! Multiplier growth laws
//!
//! Both laws start at exactly 1.0 and never decrease. Values stay at full
//! precision here; rounding is a display concern.

use serde::{Deserialize, Serialize};

/// Elapsed flying time (seconds) to multiplier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GrowthLaw {
    /// m = 1 + e*a + e^2*b
    Polynomial { a: f64, b: f64 },
    /// m = max(1, base^(e*rate))
    Exponential { base: f64, rate: f64 },
}

impl Default for GrowthLaw {
    fn default() -> Self {
        GrowthLaw::Polynomial { a: 0.95, b: 0.18 }
    }
}

impl GrowthLaw {
    /// Exponential law used by the hazard-flight variant
    pub fn exponential() -> Self {
        GrowthLaw::Exponential {
            base: 1.06,
            rate: 2.0,
        }
    }

    /// Multiplier after `elapsed` seconds of flight
    pub fn multiplier(&self, elapsed: f64) -> f64 {
        let e = elapsed.max(0.0);
        match *self {
            GrowthLaw::Polynomial { a, b } => 1.0 + e * a + e * e * b,
            GrowthLaw::Exponential { base, rate } => base.powf(e * rate).max(1.0),
        }
    }

    /// Earliest flight time at which the multiplier reaches `target`
    pub fn time_to_reach(&self, target: f64) -> f64 {
        if target <= 1.0 {
            return 0.0;
        }
        match *self {
            GrowthLaw::Polynomial { a, b } => {
                let c = target - 1.0;
                if b == 0.0 {
                    c / a
                } else {
                    // Positive root of b*e^2 + a*e - c = 0
                    (-a + (a * a + 4.0 * b * c).sqrt()) / (2.0 * b)
                }
            }
            GrowthLaw::Exponential { base, rate } => target.ln() / (base.ln() * rate),
        }
    }

    /// Parameters must give strictly increasing growth
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            GrowthLaw::Polynomial { a, b } => {
                if !(a.is_finite() && b.is_finite()) || a < 0.0 || b < 0.0 || (a == 0.0 && b == 0.0)
                {
                    return Err(format!("polynomial growth needs a, b >= 0 and not both 0 (a={a}, b={b})"));
                }
            }
            GrowthLaw::Exponential { base, rate } => {
                if !(base.is_finite() && rate.is_finite()) || base <= 1.0 || rate <= 0.0 {
                    return Err(format!(
                        "exponential growth needs base > 1 and rate > 0 (base={base}, rate={rate})"
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_starts_at_one() {
        assert_eq!(GrowthLaw::default().multiplier(0.0), 1.0);
        assert_eq!(GrowthLaw::exponential().multiplier(0.0), 1.0);
        assert_eq!(GrowthLaw::default().multiplier(-3.0), 1.0);
    }

    #[test]
    fn test_polynomial_values() {
        let law = GrowthLaw::default();
        // 1 + 2*0.95 + 4*0.18
        assert!((law.multiplier(2.0) - 3.62).abs() < 1e-12);
    }

    #[test]
    fn test_exponential_crossing_for_two_fifty() {
        let law = GrowthLaw::exponential();
        let t = law.time_to_reach(2.5);
        assert!((t - 7.862).abs() < 0.01, "t = {t}");
        assert!(law.multiplier(t + 1e-9) >= 2.5);
        assert!(law.multiplier(t - 1e-3) < 2.5);
    }

    #[test]
    fn test_polynomial_inverse() {
        let law = GrowthLaw::default();
        for target in [1.1, 2.0, 7.5, 35.0] {
            let t = law.time_to_reach(target);
            assert!((law.multiplier(t) - target).abs() < 1e-9);
        }
        assert_eq!(law.time_to_reach(0.5), 0.0);
    }

    #[test]
    fn test_validate() {
        assert!(GrowthLaw::default().validate().is_ok());
        assert!(GrowthLaw::Exponential { base: 1.0, rate: 2.0 }.validate().is_err());
        assert!(GrowthLaw::Polynomial { a: 0.0, b: 0.0 }.validate().is_err());
    }

    proptest! {
        #[test]
        fn prop_polynomial_monotonic(e1 in 0.0f64..120.0, delta in 0.0f64..30.0) {
            let law = GrowthLaw::default();
            prop_assert!(law.multiplier(e1 + delta) >= law.multiplier(e1));
            prop_assert!(law.multiplier(e1) >= 1.0);
        }

        #[test]
        fn prop_exponential_monotonic(e1 in 0.0f64..120.0, delta in 0.0f64..30.0) {
            let law = GrowthLaw::exponential();
            prop_assert!(law.multiplier(e1 + delta) >= law.multiplier(e1));
            prop_assert!(law.multiplier(e1) >= 1.0);
        }
    }
}
