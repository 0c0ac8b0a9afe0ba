//! Bet ledger for the current round
//!
//! Every mutation is gated on the round phase passed in by the engine. A
//! declined action leaves the ledger untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::state::RoundPhase;
use crate::consts::{MAX_AUTO_CASHOUT, MIN_AUTO_CASHOUT};
use crate::error::BetError;

/// Lifecycle of a single wager
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WagerState {
    /// Riding the multiplier
    Open,
    /// Locked in at `multiplier`
    CashedOut { multiplier: f64 },
    /// Still open when the round crashed
    Lost,
}

/// A stake held by one slot for the current round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wager {
    pub amount: f64,
    /// Cash out automatically once the multiplier reaches this value
    pub auto_cashout: Option<f64>,
    pub state: WagerState,
}

impl Wager {
    pub fn is_open(&self) -> bool {
        self.state == WagerState::Open
    }

    pub fn cashed_out(&self) -> bool {
        matches!(self.state, WagerState::CashedOut { .. })
    }

    pub fn cashout_multiplier(&self) -> Option<f64> {
        match self.state {
            WagerState::CashedOut { multiplier } => Some(multiplier),
            _ => None,
        }
    }

    /// Realized payout (stake x cashout multiplier), None unless cashed out
    pub fn payout(&self) -> Option<f64> {
        self.cashout_multiplier().map(|m| self.amount * m)
    }
}

/// Result of an accepted cash-out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cashout {
    pub multiplier: f64,
    pub payout: f64,
}

/// Round totals computed when the round crashes
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Settlement {
    pub wagers: usize,
    pub staked: f64,
    pub paid_out: f64,
    pub lost: usize,
}

/// Wagers keyed by slot id (BTreeMap for stable iteration order)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetLedger {
    wagers: BTreeMap<String, Wager>,
    min_stake: f64,
    max_stake: f64,
}

impl BetLedger {
    pub fn new(min_stake: f64, max_stake: f64) -> Self {
        Self {
            wagers: BTreeMap::new(),
            min_stake,
            max_stake,
        }
    }

    pub fn get(&self, slot: &str) -> Option<&Wager> {
        self.wagers.get(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Wager)> {
        self.wagers.iter().map(|(slot, wager)| (slot.as_str(), wager))
    }

    pub fn len(&self) -> usize {
        self.wagers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wagers.is_empty()
    }

    /// Stake `amount` on `slot` for the upcoming round
    pub fn place(
        &mut self,
        phase: RoundPhase,
        slot: &str,
        amount: f64,
        auto_cashout: Option<f64>,
    ) -> Result<(), BetError> {
        if phase != RoundPhase::Waiting {
            return Err(BetError::InvalidPhase {
                action: "place",
                phase,
            });
        }
        if !amount.is_finite() || amount < self.min_stake || amount > self.max_stake {
            return Err(BetError::InvalidAmount {
                amount,
                min: self.min_stake,
                max: self.max_stake,
            });
        }
        if let Some(target) = auto_cashout {
            if !target.is_finite() || !(MIN_AUTO_CASHOUT..=MAX_AUTO_CASHOUT).contains(&target) {
                return Err(BetError::InvalidAutoCashout {
                    target,
                    min: MIN_AUTO_CASHOUT,
                    max: MAX_AUTO_CASHOUT,
                });
            }
        }
        if self.wagers.contains_key(slot) {
            return Err(BetError::DuplicateWager(slot.to_string()));
        }

        self.wagers.insert(
            slot.to_string(),
            Wager {
                amount,
                auto_cashout,
                state: WagerState::Open,
            },
        );
        Ok(())
    }

    /// Withdraw a wager before takeoff
    pub fn cancel(&mut self, phase: RoundPhase, slot: &str) -> Result<Wager, BetError> {
        if phase != RoundPhase::Waiting {
            return Err(BetError::InvalidPhase {
                action: "cancel",
                phase,
            });
        }
        self.wagers
            .remove(slot)
            .ok_or_else(|| BetError::UnknownSlot(slot.to_string()))
    }

    /// Lock in `slot` at `multiplier`
    pub fn cash_out(
        &mut self,
        phase: RoundPhase,
        slot: &str,
        multiplier: f64,
    ) -> Result<Cashout, BetError> {
        if phase != RoundPhase::Flying {
            return Err(BetError::InvalidPhase {
                action: "cash out",
                phase,
            });
        }
        let wager = self
            .wagers
            .get_mut(slot)
            .ok_or_else(|| BetError::UnknownSlot(slot.to_string()))?;
        if !wager.is_open() {
            return Err(BetError::AlreadyCashedOut(slot.to_string()));
        }

        wager.state = WagerState::CashedOut { multiplier };
        Ok(Cashout {
            multiplier,
            payout: wager.amount * multiplier,
        })
    }

    /// Slots whose auto-cashout target has been reached
    pub fn auto_cashout_due(&self, multiplier: f64) -> Vec<String> {
        self.wagers
            .iter()
            .filter(|(_, w)| w.is_open() && w.auto_cashout.is_some_and(|t| multiplier >= t))
            .map(|(slot, _)| slot.clone())
            .collect()
    }

    /// Mark every open wager lost and total up the round
    pub fn settle(&mut self) -> Settlement {
        let mut settlement = Settlement::default();
        for wager in self.wagers.values_mut() {
            if wager.is_open() {
                wager.state = WagerState::Lost;
            }
            settlement.wagers += 1;
            settlement.staked += wager.amount;
            match wager.state {
                WagerState::CashedOut { multiplier } => settlement.paid_out += wager.amount * multiplier,
                WagerState::Lost => settlement.lost += 1,
                WagerState::Open => {}
            }
        }
        settlement
    }

    pub fn clear(&mut self) {
        self.wagers.clear();
    }
}
