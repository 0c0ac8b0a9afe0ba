//! Flamingo Odds - round engine for a crash-style multiplier game
//!
//! Core modules:
//! - `sim`: Round simulation (phase machine, growth, crash sampling, hazards, bets)
//! - `history`: Bounded record of completed rounds
//! - `config`: Data-driven engine configuration
//! - `error`: Declined-action and configuration errors

pub mod config;
pub mod error;
pub mod history;
pub mod sim;

pub use config::{EngineConfig, HazardGeometry, HazardTuning, OutcomeMode};
pub use error::{BetError, ConfigError};
pub use history::{CrashTier, HistoryEntry, HistoryStats, RoundHistory};
pub use sim::{RoundEngine, RoundInput, RoundPhase, Snapshot};

/// Game configuration constants
pub mod consts {
    /// Seconds between the start of Waiting and takeoff
    pub const WAIT_SECONDS: f64 = 4.5;
    /// Seconds the crashed round stays on screen
    pub const CRASH_PAUSE_SECONDS: f64 = 2.2;

    /// Stake bounds
    pub const MIN_STAKE: f64 = 1.0;
    pub const MAX_STAKE: f64 = 10_000.0;
    /// Quick-pick stake buttons offered by the bet panels
    pub const BET_PRESETS: [f64; 4] = [5.0, 25.0, 100.0, 250.0];

    /// Auto-cashout target bounds
    pub const MIN_AUTO_CASHOUT: f64 = 1.01;
    pub const MAX_AUTO_CASHOUT: f64 = 1000.0;

    /// Ceiling on the multiplier; a round still flying there crashes
    pub const MAX_MULTIPLIER: f64 = 1000.0;

    /// Completed rounds kept in history
    pub const HISTORY_LEN: usize = 20;
    /// Largest configurable history length
    pub const MAX_HISTORY_LEN: usize = 1000;

    /// Fixed hazard integration step (120 Hz)
    pub const HAZARD_DT: f64 = 1.0 / 120.0;
}

/// Round to 2 decimal places (display and crash-value quantization only)
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a multiplier the way the HUD shows it ("2.50")
#[inline]
pub fn display_multiplier(value: f64) -> String {
    format!("{value:.2}")
}
