//! Round simulation module
//!
//! All round logic lives here. This module must stay free of scheduling
//! and rendering concerns:
//! - Time only enters through `advance(now)`
//! - Seeded RNG only
//! - Stable iteration order (wagers by slot, hazards by id)

pub mod growth;
pub mod hazard;
pub mod ledger;
pub mod sampler;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use growth::GrowthLaw;
pub use hazard::{Hazard, HazardField, spawn_interval};
pub use ledger::{BetLedger, Cashout, Settlement, Wager, WagerState};
pub use sampler::{CrashDistribution, tiered_crash, weighted_crash};
pub use snapshot::{Snapshot, WagerView};
pub use state::{RoundEngine, RoundPhase};
pub use tick::{MAX_CATCHUP_ROUNDS, RoundInput};
