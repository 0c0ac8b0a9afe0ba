//! Read-only view of the engine handed to the presentation layer each tick

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::hazard::Hazard;
use super::ledger::Wager;
use super::state::{RoundEngine, RoundPhase};
use crate::history::HistoryEntry;

/// Per-slot wager view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WagerView {
    pub amount: f64,
    pub auto_cashout: Option<f64>,
    pub cashed_out: bool,
    pub cashout_multiplier: Option<f64>,
    /// Open when the round crashed
    pub lost: bool,
}

impl From<&Wager> for WagerView {
    fn from(wager: &Wager) -> Self {
        Self {
            amount: wager.amount,
            auto_cashout: wager.auto_cashout,
            cashed_out: wager.cashed_out(),
            cashout_multiplier: wager.cashout_multiplier(),
            lost: wager.state == super::ledger::WagerState::Lost,
        }
    }
}

/// Everything a frame needs to draw the round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: RoundPhase,
    pub round_id: u64,
    /// Full precision
    pub multiplier: f64,
    /// Two decimals, e.g. "2.50"
    pub display_multiplier: String,
    /// Seconds to takeoff (Waiting only)
    pub countdown_remaining: Option<f64>,
    /// Whole seconds shown on the status line, never below 1 (Waiting only)
    pub countdown_display: Option<u32>,
    /// Set once the round has crashed
    pub crash_value: Option<f64>,
    /// Newest first
    pub history: Vec<HistoryEntry>,
    pub wagers: BTreeMap<String, WagerView>,
    pub hazards: Vec<Hazard>,
    pub evasive_offset: f64,
}

impl RoundEngine {
    pub fn snapshot(&self) -> Snapshot {
        let countdown_remaining = self.countdown_remaining();
        Snapshot {
            phase: self.phase,
            round_id: self.round_id,
            multiplier: self.multiplier,
            display_multiplier: crate::display_multiplier(self.multiplier),
            countdown_remaining,
            countdown_display: countdown_remaining.map(|r| r.ceil().max(1.0) as u32),
            crash_value: self.crash_value,
            history: self.history.to_vec(),
            wagers: self
                .ledger
                .iter()
                .map(|(slot, wager)| (slot.to_string(), WagerView::from(wager)))
                .collect(),
            hazards: self.hazards.hazards.clone(),
            evasive_offset: self.hazards.evasive_offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_serializes() {
        let mut engine = RoundEngine::with_defaults(3);
        engine.place("primary", 5.0).unwrap();
        engine.place_with_auto("side", 2.5, Some(2.5)).unwrap();
        let snap = engine.advance(0.0);

        assert_eq!(snap.display_multiplier, "1.00");
        assert_eq!(snap.wagers.len(), 2);
        assert_eq!(snap.wagers["side"].auto_cashout, Some(2.5));
        assert!(!snap.wagers["primary"].cashed_out);

        let json = serde_json::to_string(&snap).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }
}
