//! Engine configuration
//!
//! Loaded from JSON by the driver; every field has a default matching the
//! shipped game.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::growth::GrowthLaw;
use crate::sim::sampler::CrashDistribution;

/// Where hazard overlap is computed in hazard mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HazardGeometry {
    /// Engine simulates the hazard field itself
    #[default]
    Internal,
    /// Renderer runs the collision test and calls `report_hazard_hit`
    Reported,
}

/// How a round decides to terminate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutcomeMode {
    /// Crash value sampled when Waiting begins, fixed before takeoff
    PreCommitted { distribution: CrashDistribution },
    /// Round ends on the first hazard hit
    Hazard { geometry: HazardGeometry },
}

impl Default for OutcomeMode {
    fn default() -> Self {
        OutcomeMode::PreCommitted {
            distribution: CrashDistribution::Weighted,
        }
    }
}

impl OutcomeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeMode::PreCommitted { .. } => "precommitted",
            OutcomeMode::Hazard { .. } => "hazard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "precommitted" | "pre-committed" | "weighted" => Some(OutcomeMode::default()),
            "tiered" => Some(OutcomeMode::PreCommitted {
                distribution: CrashDistribution::Tiered,
            }),
            "hazard" => Some(OutcomeMode::Hazard {
                geometry: HazardGeometry::Internal,
            }),
            "reported" => Some(OutcomeMode::Hazard {
                geometry: HazardGeometry::Reported,
            }),
            _ => None,
        }
    }

    pub fn is_hazard(&self) -> bool {
        matches!(self, OutcomeMode::Hazard { .. })
    }
}

/// Hazard field balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardTuning {
    /// Lateral half-width of the lane
    pub lane_half_width: f64,
    /// Approach distance at which hazards appear
    pub spawn_distance: f64,
    /// Hazards behind this distance past the player are discarded
    pub trailing_bound: f64,
    /// Approach half-depth of the player's hit band
    pub hit_depth: f64,
    /// Lateral distance below which an overlapping hazard hits
    pub hit_radius: f64,
    /// Spawn interval: max(min_interval, base_interval - m * interval_slope)
    pub base_interval: f64,
    pub interval_slope: f64,
    pub min_interval: f64,
    /// Closing speed: base_speed + m * speed_slope + noise
    pub base_speed: f64,
    pub speed_slope: f64,
    pub speed_noise: f64,
    /// Chance a spawn is placed opposite the player's offset
    pub opposite_bias: f64,
}

impl Default for HazardTuning {
    fn default() -> Self {
        Self {
            lane_half_width: 2.0,
            spawn_distance: 12.0,
            trailing_bound: 2.0,
            hit_depth: 0.3,
            hit_radius: 0.45,
            base_interval: 0.8,
            interval_slope: 0.04,
            min_interval: 0.3,
            base_speed: 3.0,
            speed_slope: 0.5,
            speed_noise: 1.0,
            opposite_bias: 0.7,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Waiting phase length
    pub wait_seconds: f64,
    /// Crashed phase length
    pub crash_pause_seconds: f64,
    /// Multiplier growth law
    pub growth: GrowthLaw,
    /// Multiplier ceiling; a round still flying there crashes at it
    pub max_multiplier: f64,
    /// Crash determination strategy
    pub outcome: OutcomeMode,
    /// Stake bounds
    pub min_stake: f64,
    pub max_stake: f64,
    /// Completed rounds retained in history
    pub history_len: usize,
    /// Hazard field balance (hazard mode only)
    pub hazard: HazardTuning,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            wait_seconds: WAIT_SECONDS,
            crash_pause_seconds: CRASH_PAUSE_SECONDS,
            growth: GrowthLaw::default(),
            max_multiplier: MAX_MULTIPLIER,
            outcome: OutcomeMode::default(),
            min_stake: MIN_STAKE,
            max_stake: MAX_STAKE,
            history_len: HISTORY_LEN,
            hazard: HazardTuning::default(),
        }
    }
}

impl EngineConfig {
    /// Default config with a different outcome strategy
    pub fn with_outcome(outcome: OutcomeMode) -> Self {
        Self {
            outcome,
            ..Self::default()
        }
    }

    /// Reject configurations the engine cannot run
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
            }
        }

        positive("wait_seconds", self.wait_seconds)?;
        if !(self.crash_pause_seconds.is_finite() && self.crash_pause_seconds >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "crash_pause_seconds must be >= 0, got {}",
                self.crash_pause_seconds
            )));
        }
        positive("min_stake", self.min_stake)?;
        if !(self.max_stake.is_finite() && self.max_stake >= self.min_stake) {
            return Err(ConfigError::Invalid(format!(
                "max_stake {} below min_stake {}",
                self.max_stake, self.min_stake
            )));
        }
        if !(1..=MAX_HISTORY_LEN).contains(&self.history_len) {
            return Err(ConfigError::Invalid(format!(
                "history_len must be within [1, {MAX_HISTORY_LEN}], got {}",
                self.history_len
            )));
        }
        if !(self.max_multiplier.is_finite() && self.max_multiplier > 1.0) {
            return Err(ConfigError::Invalid(format!(
                "max_multiplier must be finite and above 1, got {}",
                self.max_multiplier
            )));
        }
        self.growth.validate().map_err(ConfigError::Invalid)?;

        if self.outcome.is_hazard() {
            let h = &self.hazard;
            positive("hazard.lane_half_width", h.lane_half_width)?;
            positive("hazard.spawn_distance", h.spawn_distance)?;
            positive("hazard.trailing_bound", h.trailing_bound)?;
            positive("hazard.hit_depth", h.hit_depth)?;
            positive("hazard.hit_radius", h.hit_radius)?;
            positive("hazard.min_interval", h.min_interval)?;
            positive("hazard.base_speed", h.base_speed)?;
            if !(0.0..=1.0).contains(&h.opposite_bias) {
                return Err(ConfigError::Invalid(format!(
                    "hazard.opposite_bias must be within [0, 1], got {}",
                    h.opposite_bias
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Save config as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Engine config saved to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
        assert!(
            EngineConfig::with_outcome(OutcomeMode::Hazard {
                geometry: HazardGeometry::Internal
            })
            .validate()
            .is_ok()
        );
    }

    #[test]
    fn test_json_round_trip_keeps_strategies() {
        let config = EngineConfig {
            growth: GrowthLaw::Exponential {
                base: 1.06,
                rate: 2.0,
            },
            outcome: OutcomeMode::PreCommitted {
                distribution: CrashDistribution::Tiered,
            },
            history_len: 14,
            ..EngineConfig::default()
        };
        let json = config.to_json().unwrap();
        let parsed = EngineConfig::from_json(&json).unwrap();
        assert_eq!(parsed.growth, config.growth);
        assert_eq!(parsed.outcome, config.outcome);
        assert_eq!(parsed.history_len, 14);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let parsed = EngineConfig::from_json(r#"{ "wait_seconds": 5.0 }"#).unwrap();
        assert_eq!(parsed.wait_seconds, 5.0);
        assert_eq!(parsed.crash_pause_seconds, CRASH_PAUSE_SECONDS);
        assert_eq!(parsed.max_stake, MAX_STAKE);
    }

    #[test]
    fn test_tagged_outcome_json() {
        let parsed =
            EngineConfig::from_json(r#"{ "outcome": { "kind": "hazard", "geometry": "reported" } }"#)
                .unwrap();
        assert_eq!(
            parsed.outcome,
            OutcomeMode::Hazard {
                geometry: HazardGeometry::Reported
            }
        );
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let bad_wait = EngineConfig {
            wait_seconds: 0.0,
            ..EngineConfig::default()
        };
        assert!(matches!(bad_wait.validate(), Err(ConfigError::Invalid(_))));

        let bad_stakes = EngineConfig {
            min_stake: 10.0,
            max_stake: 5.0,
            ..EngineConfig::default()
        };
        assert!(bad_stakes.validate().is_err());

        let bad_history = EngineConfig {
            history_len: 0,
            ..EngineConfig::default()
        };
        assert!(bad_history.validate().is_err());

        let bad_ceiling = EngineConfig {
            max_multiplier: f64::INFINITY,
            ..EngineConfig::default()
        };
        assert!(matches!(bad_ceiling.validate(), Err(ConfigError::Invalid(_))));

        assert!(matches!(
            EngineConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_oversized_history_rejected() {
        let huge = format!(r#"{{ "history_len": {} }}"#, usize::MAX);
        assert!(matches!(
            EngineConfig::from_json(&huge),
            Err(ConfigError::Invalid(_))
        ));
        let parsed = EngineConfig::from_json(&format!(r#"{{ "history_len": {MAX_HISTORY_LEN} }}"#));
        assert_eq!(parsed.map(|c| c.history_len).ok(), Some(MAX_HISTORY_LEN));
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!(OutcomeMode::from_str("HAZARD").map(|m| m.as_str()), Some("hazard"));
        assert_eq!(
            OutcomeMode::from_str("tiered"),
            Some(OutcomeMode::PreCommitted {
                distribution: CrashDistribution::Tiered
            })
        );
        assert!(OutcomeMode::from_str("provably-fair").is_none());
    }
}
