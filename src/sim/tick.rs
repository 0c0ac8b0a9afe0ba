//! Clock-driven round advancement
//!
//! `advance` is the only place phases change on their own. Elapsed time is
//! always derived from timestamps, so irregular call intervals never drift
//! the round schedule.

use super::snapshot::Snapshot;
use super::state::{RoundEngine, RoundPhase};

/// Rounds a single advance may complete before the schedule is resynced
pub const MAX_CATCHUP_ROUNDS: u32 = 64;

/// Player intents delivered with a tick
#[derive(Debug, Clone, Default)]
pub struct RoundInput {
    /// Slots to cash out this tick (after auto-cashouts, before crash detection)
    pub cash_outs: Vec<String>,
    /// New evasive offset for the player
    pub steer: Option<f64>,
    /// Renderer-detected hazard collision
    pub hazard_hit: bool,
}

impl RoundInput {
    pub fn cash_out(slot: impl Into<String>) -> Self {
        Self {
            cash_outs: vec![slot.into()],
            ..Default::default()
        }
    }
}

impl RoundEngine {
    /// Advance to clock time `now` (seconds) with no player input
    pub fn advance(&mut self, now: f64) -> Snapshot {
        self.advance_with(now, &RoundInput::default())
    }

    /// Advance to clock time `now` (seconds), applying `input` in the first
    /// Flying tick reached
    pub fn advance_with(&mut self, now: f64, input: &RoundInput) -> Snapshot {
        let now = match self.last_tick {
            _ if !now.is_finite() => {
                log::warn!("Ignoring non-finite clock value {}", now);
                return self.snapshot();
            }
            Some(last) if now < last => {
                log::warn!("Clock went backwards ({:.3} < {:.3}), holding", now, last);
                last
            }
            _ => now,
        };

        if let Some(offset) = input.steer {
            self.steer(offset);
        }

        // Input belongs to the round in progress when the call was made
        let input_round = self.round_id;
        let mut pending = Some(input);
        let mut completed = 0u32;
        loop {
            match self.phase {
                RoundPhase::Waiting => {
                    let start = *self.started_at.get_or_insert(now);
                    let takeoff = start + self.config.wait_seconds;
                    if now < takeoff {
                        break;
                    }
                    self.enter_flying(takeoff);
                }
                RoundPhase::Flying => {
                    let input = pending.take().filter(|_| self.round_id == input_round);
                    self.tick_flying(now, input);
                    if self.phase == RoundPhase::Flying {
                        break;
                    }
                }
                RoundPhase::Crashed => {
                    let resume = self.crashed_at + self.config.crash_pause_seconds;
                    if now < resume {
                        break;
                    }
                    completed += 1;
                    if completed >= MAX_CATCHUP_ROUNDS {
                        log::warn!(
                            "Clock jumped {:.1}s past schedule, resyncing",
                            now - resume
                        );
                        self.enter_waiting(Some(now));
                        break;
                    }
                    self.enter_waiting(Some(resume));
                }
            }
        }

        self.last_tick = Some(now);
        self.snapshot()
    }

    /// One Flying tick. Order: multiplier, auto-cashouts, manual cash-outs,
    /// reported hits, crash detection. Internal hazards are integrated before
    /// the multiplier is fixed; a hit caps it like a committed crash.
    fn tick_flying(&mut self, now: f64, input: Option<&RoundInput>) {
        let growth = self.config.growth;
        let elapsed = now - self.flying_started_at;
        let ceiling = self.ceiling();
        let ceiling_at = growth.time_to_reach(ceiling);

        let hit_at = if self.simulates_hazards() {
            self.hazards.advance_to(
                elapsed.min(ceiling_at),
                |t| growth.multiplier(t),
                &self.config.hazard,
                &mut self.rng,
            )
        } else {
            None
        };

        let raw = growth.multiplier(elapsed);
        // Never report past the crash
        let multiplier = match hit_at {
            Some(t) => growth.multiplier(t),
            None => raw,
        }
        .min(ceiling);
        self.multiplier = multiplier;

        for slot in self.ledger.auto_cashout_due(multiplier) {
            if let Ok(c) = self.ledger.cash_out(RoundPhase::Flying, &slot, multiplier) {
                log::info!(
                    "Round {}: {} auto cashed out at {}x for {:.2}",
                    self.round_id,
                    slot,
                    crate::display_multiplier(c.multiplier),
                    c.payout
                );
            }
        }

        if let Some(input) = input {
            for slot in &input.cash_outs {
                match self.ledger.cash_out(RoundPhase::Flying, slot, multiplier) {
                    Ok(c) => log::info!(
                        "Round {}: {} cashed out at {}x for {:.2}",
                        self.round_id,
                        slot,
                        crate::display_multiplier(c.multiplier),
                        c.payout
                    ),
                    Err(e) => log::debug!("Round {}: cash out declined: {}", self.round_id, e),
                }
            }
        }

        if let Some(t) = hit_at {
            self.enter_crashed(multiplier, (self.flying_started_at + t).min(now));
        } else if self.config.outcome.is_hazard()
            && input.is_some_and(|i| i.hazard_hit)
            && self.hazards.latch()
        {
            self.enter_crashed(multiplier, now);
        } else if raw >= ceiling {
            // Full-precision comparison against the raw curve
            self.enter_crashed(ceiling, (self.flying_started_at + ceiling_at).min(now));
        }
    }

    /// Multiplier at which the round ends if nothing else ends it first
    fn ceiling(&self) -> f64 {
        match self.committed_crash {
            Some(crash) => crash.min(self.config.max_multiplier),
            None => self.config.max_multiplier,
        }
    }
}
