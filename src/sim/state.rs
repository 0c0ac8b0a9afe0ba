//! Round state and player actions
//!
//! `RoundEngine` is the single owner of the round, its wagers, the hazard
//! field and the history. Phase transitions happen in `tick.rs`; this file
//! holds construction, entry actions and the synchronous player actions.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::hazard::HazardField;
use super::ledger::{BetLedger, Cashout, Settlement, Wager};
use crate::config::{EngineConfig, HazardGeometry, OutcomeMode};
use crate::error::{BetError, ConfigError};
use crate::history::{HistoryEntry, RoundHistory};

/// Current phase of the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Taking bets, counting down to takeoff
    Waiting,
    /// Multiplier climbing, cash-outs open
    Flying,
    /// Round over, multiplier frozen at the crash value
    Crashed,
}

impl RoundPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundPhase::Waiting => "waiting",
            RoundPhase::Flying => "flying",
            RoundPhase::Crashed => "crashed",
        }
    }
}

/// The round engine
#[derive(Debug, Clone)]
pub struct RoundEngine {
    pub(super) config: EngineConfig,
    /// Run seed for reproducibility
    seed: u64,
    pub(super) rng: Pcg32,
    pub(super) round_id: u64,
    pub(super) phase: RoundPhase,
    /// Full precision; 1.0 while Waiting
    pub(super) multiplier: f64,
    /// Threshold sampled at Waiting entry (pre-committed mode only)
    pub(super) committed_crash: Option<f64>,
    /// Set on entry into Crashed
    pub(super) crash_value: Option<f64>,
    /// None until the first advance fixes the clock origin
    pub(super) started_at: Option<f64>,
    pub(super) flying_started_at: f64,
    pub(super) crashed_at: f64,
    pub(super) last_tick: Option<f64>,
    pub(super) ledger: BetLedger,
    pub(super) hazards: HazardField,
    pub(super) history: RoundHistory,
    pub(super) last_settlement: Option<Settlement>,
}

impl RoundEngine {
    /// Create an engine with a validated config
    pub fn new(config: EngineConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, seed))
    }

    /// Create an engine with the default config
    pub fn with_defaults(seed: u64) -> Self {
        Self::build(EngineConfig::default(), seed)
    }

    fn build(config: EngineConfig, seed: u64) -> Self {
        let ledger = BetLedger::new(config.min_stake, config.max_stake);
        let history = RoundHistory::new(config.history_len);
        let mut engine = Self {
            config,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            round_id: 0,
            phase: RoundPhase::Waiting,
            multiplier: 1.0,
            committed_crash: None,
            crash_value: None,
            started_at: None,
            flying_started_at: 0.0,
            crashed_at: 0.0,
            last_tick: None,
            ledger,
            hazards: HazardField::new(),
            history,
            last_settlement: None,
        };
        log::info!(
            "Round engine ready: mode={}, growth={:?}, seed={}",
            engine.config.outcome.as_str(),
            engine.config.growth,
            seed
        );
        engine.enter_waiting(None);
        engine
    }

    // === Entry actions ===

    /// Waiting: reset multiplier, arm the outcome, clear wagers and hazards
    pub(super) fn enter_waiting(&mut self, started_at: Option<f64>) {
        self.round_id += 1;
        self.phase = RoundPhase::Waiting;
        self.multiplier = 1.0;
        self.crash_value = None;
        self.started_at = started_at;
        self.committed_crash = match self.config.outcome {
            OutcomeMode::PreCommitted { distribution } => Some(distribution.sample(&mut self.rng)),
            OutcomeMode::Hazard { .. } => None,
        };
        self.ledger.clear();
        self.hazards.reset(&self.config.hazard);
        log::info!("Round {} waiting", self.round_id);
    }

    /// Flying: record the takeoff time
    pub(super) fn enter_flying(&mut self, at: f64) {
        self.phase = RoundPhase::Flying;
        self.flying_started_at = at;
        self.multiplier = 1.0;
        log::info!(
            "Round {} takeoff with {} wagers",
            self.round_id,
            self.ledger.len()
        );
    }

    /// Crashed: freeze the multiplier, settle wagers, record history
    pub(super) fn enter_crashed(&mut self, crash_value: f64, at: f64) {
        self.phase = RoundPhase::Crashed;
        self.multiplier = crash_value;
        self.crash_value = Some(crash_value);
        self.crashed_at = at;

        let settlement = self.ledger.settle();
        self.history.push(HistoryEntry {
            id: self.round_id,
            crash_value,
            timestamp: at,
        });
        log::info!(
            "Round {} crashed at {}x: {} wagers, staked {:.2}, paid {:.2}, {} lost",
            self.round_id,
            crate::display_multiplier(crash_value),
            settlement.wagers,
            settlement.staked,
            settlement.paid_out,
            settlement.lost
        );
        self.last_settlement = Some(settlement);
    }

    // === Player actions ===

    /// Stake `amount` on `slot` for the round about to fly
    pub fn place(&mut self, slot: &str, amount: f64) -> Result<(), BetError> {
        self.place_with_auto(slot, amount, None)
    }

    /// Stake with an optional auto-cashout target
    pub fn place_with_auto(
        &mut self,
        slot: &str,
        amount: f64,
        auto_cashout: Option<f64>,
    ) -> Result<(), BetError> {
        let result = self.ledger.place(self.phase, slot, amount, auto_cashout);
        match &result {
            Ok(()) => log::debug!("Round {}: {} staked {:.2}", self.round_id, slot, amount),
            Err(e) => log::debug!("Round {}: place declined: {}", self.round_id, e),
        }
        result
    }

    /// Withdraw a wager before takeoff
    pub fn cancel(&mut self, slot: &str) -> Result<Wager, BetError> {
        let result = self.ledger.cancel(self.phase, slot);
        if let Err(e) = &result {
            log::debug!("Round {}: cancel declined: {}", self.round_id, e);
        }
        result
    }

    /// Cash out at the multiplier of the last tick
    pub fn cash_out(&mut self, slot: &str) -> Result<Cashout, BetError> {
        let result = self.ledger.cash_out(self.phase, slot, self.multiplier);
        match &result {
            Ok(c) => log::info!(
                "Round {}: {} cashed out at {}x for {:.2}",
                self.round_id,
                slot,
                crate::display_multiplier(c.multiplier),
                c.payout
            ),
            Err(e) => log::debug!("Round {}: cash out declined: {}", self.round_id, e),
        }
        result
    }

    /// Move the player's evasive offset (clamped to the lane)
    pub fn steer(&mut self, offset: f64) {
        self.hazards.steer(offset, &self.config.hazard);
    }

    /// Collision signal from a renderer running its own overlap test.
    /// Returns true if it ended the round.
    pub fn report_hazard_hit(&mut self) -> bool {
        if !self.config.outcome.is_hazard() || self.phase != RoundPhase::Flying {
            log::debug!(
                "Ignoring hazard hit (mode={}, phase={})",
                self.config.outcome.as_str(),
                self.phase.as_str()
            );
            return false;
        }
        if !self.hazards.latch() {
            return false;
        }
        let at = self.last_tick.unwrap_or(self.flying_started_at);
        self.enter_crashed(self.multiplier, at);
        true
    }

    /// Replace the committed crash value of the waiting round (replays and
    /// scripted demos). Pre-committed mode only.
    pub fn force_crash_value(&mut self, crash_value: f64) -> bool {
        if self.phase != RoundPhase::Waiting
            || self.committed_crash.is_none()
            || !crash_value.is_finite()
            || crash_value < 1.0
        {
            return false;
        }
        self.committed_crash = Some(crash_value);
        true
    }

    // === Queries ===

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn round_id(&self) -> u64 {
        self.round_id
    }

    /// Full-precision multiplier
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Crash value of the current round, once crashed
    pub fn crash_value(&self) -> Option<f64> {
        self.crash_value
    }

    pub fn ledger(&self) -> &BetLedger {
        &self.ledger
    }

    pub fn history(&self) -> &RoundHistory {
        &self.history
    }

    pub fn hazards(&self) -> &HazardField {
        &self.hazards
    }

    /// Totals of the most recently crashed round
    pub fn last_settlement(&self) -> Option<Settlement> {
        self.last_settlement
    }

    /// Seconds until takeoff (Waiting only)
    pub fn countdown_remaining(&self) -> Option<f64> {
        if self.phase != RoundPhase::Waiting {
            return None;
        }
        let elapsed = match (self.started_at, self.last_tick) {
            (Some(start), Some(now)) => (now - start).max(0.0),
            _ => 0.0,
        };
        Some((self.config.wait_seconds - elapsed).max(0.0))
    }

    pub(super) fn simulates_hazards(&self) -> bool {
        matches!(
            self.config.outcome,
            OutcomeMode::Hazard {
                geometry: HazardGeometry::Internal
            }
        )
    }
}
