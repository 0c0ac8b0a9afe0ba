//! Error types
//!
//! Every bet error is recoverable: the action is declined and the round
//! carries on untouched.

use thiserror::Error;

use crate::sim::RoundPhase;

/// Why a player action was declined.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BetError {
    #[error("cannot {action} while round is {phase:?}")]
    InvalidPhase {
        action: &'static str,
        phase: RoundPhase,
    },

    #[error("stake {amount} outside [{min}, {max}]")]
    InvalidAmount { amount: f64, min: f64, max: f64 },

    #[error("auto-cashout target {target} outside [{min}, {max}]")]
    InvalidAutoCashout { target: f64, min: f64, max: f64 },

    #[error("slot {0:?} already holds a wager this round")]
    DuplicateWager(String),

    #[error("slot {0:?} has no wager this round")]
    UnknownSlot(String),

    #[error("slot {0:?} already cashed out")]
    AlreadyCashedOut(String),
}

/// Errors loading or validating an engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
