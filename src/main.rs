//! Flamingo Odds headless driver
//!
//! Drives the round engine from a synthetic frame clock with two bet panels
//! playing, and prints every completed round.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use flamingo_odds::consts::BET_PRESETS;
use flamingo_odds::sim::{GrowthLaw, Snapshot};
use flamingo_odds::{
    CrashTier, EngineConfig, HazardGeometry, OutcomeMode, RoundEngine, RoundInput, RoundPhase,
};

#[derive(Parser)]
#[command(name = "flamingo-odds", about = "Headless crash round simulator")]
struct Cli {
    /// Rounds to play
    #[arg(long, default_value_t = 10)]
    rounds: u64,
    /// Engine RNG seed
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Outcome mode: precommitted, tiered, hazard, reported
    #[arg(long)]
    mode: Option<String>,
    /// Use the exponential growth law
    #[arg(long)]
    exponential: bool,
    /// JSON engine config
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the effective config to this path and exit
    #[arg(long)]
    dump_config: Option<PathBuf>,
    /// Simulated frames per second
    #[arg(long, default_value_t = 60.0)]
    fps: f64,
    /// Auto-cashout target for the primary panel
    #[arg(long, default_value_t = 2.5)]
    target: f64,
    /// Manual cash-out point for the side panel
    #[arg(long, default_value_t = 1.8)]
    side_cashout: f64,
}

/// Upper bound on simulated time per round before giving up
const MAX_ROUND_SECONDS: f64 = 600.0;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(mode) = &cli.mode {
        config.outcome = OutcomeMode::from_str(mode)
            .with_context(|| format!("unknown mode {mode:?}"))?;
    }
    if cli.exponential {
        config.growth = GrowthLaw::exponential();
    }
    if let Some(path) = &cli.dump_config {
        config.save(path)?;
        println!("Config written to {}", path.display());
        return Ok(());
    }
    if !(cli.fps.is_finite() && cli.fps > 0.0) {
        bail!("fps must be positive, got {}", cli.fps);
    }

    let mut engine = RoundEngine::new(config, cli.seed)?;
    // Stand-in for the renderer's own collision test in reported mode
    let mut renderer_rng = Pcg32::seed_from_u64(cli.seed ^ 0x5eed);
    let reported = matches!(
        engine.config().outcome,
        OutcomeMode::Hazard {
            geometry: HazardGeometry::Reported
        }
    );

    log::info!(
        "Flamingo Odds starting: {} rounds, mode={}",
        cli.rounds,
        engine.config().outcome.as_str()
    );

    let dt = 1.0 / cli.fps;
    let mut now = 0.0;
    let mut played = 0u64;
    let mut staked = 0.0;
    let mut paid = 0.0;
    let mut last_phase = RoundPhase::Crashed;
    let mut round_started = 0.0;

    while played < cli.rounds {
        let snap = engine.snapshot();
        let mut input = RoundInput::default();

        match snap.phase {
            RoundPhase::Waiting if last_phase != RoundPhase::Waiting => {
                let stake = BET_PRESETS[(snap.round_id as usize) % BET_PRESETS.len()];
                if let Err(e) = engine.place_with_auto("primary", stake, Some(cli.target)) {
                    log::warn!("Primary bet declined: {}", e);
                }
                if let Err(e) = engine.place("side", 2.5) {
                    log::warn!("Side bet declined: {}", e);
                }
                round_started = now;
            }
            RoundPhase::Flying => {
                let side_open = snap.wagers.get("side").is_some_and(|w| !w.cashed_out);
                if side_open && snap.multiplier >= cli.side_cashout {
                    input.cash_outs.push("side".into());
                }
                input.steer = Some(dodge(&snap));
                input.hazard_hit = reported && renderer_rng.random_bool(0.005);
            }
            _ => {}
        }
        last_phase = snap.phase;

        now += dt;
        let snap = engine.advance_with(now, &input);

        if snap.phase == RoundPhase::Crashed && last_phase != RoundPhase::Crashed {
            played += 1;
            report_round(&engine, &snap);
            if let Some(settlement) = engine.last_settlement() {
                staked += settlement.staked;
                paid += settlement.paid_out;
            }
        }
        last_phase = snap.phase;

        if now - round_started > MAX_ROUND_SECONDS {
            bail!("round {} did not finish within {}s", snap.round_id, MAX_ROUND_SECONDS);
        }
    }

    let stats = engine.history().stats();
    println!();
    println!("Rounds played:  {}", played);
    if let (Some(highest), Some(average)) = (stats.highest, stats.average) {
        println!("Highest crash:  {:.2}x (last {} rounds)", highest, stats.rounds);
        println!("Average crash:  {:.2}x", average);
    }
    println!("Longest streak: {} rounds at 2.00x+", stats.longest_streak);
    println!("Total staked:   {:.2}", staked);
    println!("Total paid:     {:.2}", paid);
    Ok(())
}

/// Steer away from the closest hazard bearing down on the player. Reacts
/// late and slowly so faster hazards eventually connect.
fn dodge(snap: &Snapshot) -> f64 {
    let current = snap.evasive_offset;
    let threat = snap
        .hazards
        .iter()
        .filter(|h| h.pos.y > 0.0 && h.pos.y < 4.0 && (h.pos.x - current).abs() < 0.8)
        .min_by(|a, b| a.pos.y.partial_cmp(&b.pos.y).unwrap_or(std::cmp::Ordering::Equal));

    match threat {
        Some(h) if h.pos.x >= current => current - 0.04,
        Some(_) => current + 0.04,
        // Drift back to the lane center
        None => current * 0.98,
    }
}

fn report_round(engine: &RoundEngine, snap: &Snapshot) {
    let crash = snap.crash_value.unwrap_or(snap.multiplier);
    let wagers: Vec<String> = snap
        .wagers
        .iter()
        .map(|(slot, w)| match w.cashout_multiplier {
            Some(m) => format!("{slot} {:.2} -> {:.2}x ({:.2})", w.amount, m, w.amount * m),
            None => format!("{slot} {:.2} lost", w.amount),
        })
        .collect();
    println!(
        "Round #{:<4} {:>7}x [{}]  {}",
        snap.round_id,
        snap.display_multiplier,
        CrashTier::classify(crash).as_str(),
        wagers.join(", ")
    );
    log::debug!("History now holds {} rounds", engine.history().len());
}
