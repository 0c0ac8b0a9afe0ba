use flamingo_odds::sim::{GrowthLaw, WagerState};
use flamingo_odds::{BetError, EngineConfig, RoundEngine, RoundInput, RoundPhase};

const FRAME: f64 = 1.0 / 60.0;

#[test]
fn exponential_round_crashes_at_committed_threshold() {
    let config = EngineConfig {
        wait_seconds: 5.0,
        growth: GrowthLaw::exponential(),
        ..EngineConfig::default()
    };
    let mut engine = RoundEngine::new(config, 11).unwrap();
    assert!(engine.force_crash_value(2.50));
    engine.advance(0.0);

    let crossing = 5.0 + GrowthLaw::exponential().time_to_reach(2.50);
    let mut t = 0.0;
    let mut last_flying = None;
    while engine.phase() != RoundPhase::Crashed {
        t += FRAME;
        let snap = engine.advance(t);
        if snap.phase == RoundPhase::Flying {
            assert!(snap.multiplier < 2.50);
            last_flying = Some(t);
        }
    }

    assert!(last_flying.unwrap() < crossing + 1e-9);
    assert!(t >= crossing - 1e-9 && t < crossing + FRAME + 1e-9);
    let snap = engine.snapshot();
    assert_eq!(snap.crash_value, Some(2.50));
    assert_eq!(snap.multiplier, 2.50);
    assert_eq!(snap.display_multiplier, "2.50");
}

#[test]
fn cash_out_payout_is_stake_times_multiplier() {
    let mut engine = RoundEngine::with_defaults(5);
    assert!(engine.force_crash_value(3.40));
    engine.place("primary", 25.0).unwrap();
    engine.advance(0.0);
    engine.advance(5.0);

    // Cash-out lands in the crash tick, at the frozen 3.40
    let snap = engine.advance_with(7.0, &RoundInput::cash_out("primary"));
    assert_eq!(snap.phase, RoundPhase::Crashed);
    let wager = engine.ledger().get("primary").unwrap();
    assert_eq!(wager.cashout_multiplier(), Some(3.40));
    assert_eq!(format!("{:.2}", wager.payout().unwrap()), "85.00");
}

#[test]
fn manual_cash_out_between_ticks_uses_last_multiplier() {
    let mut engine = RoundEngine::with_defaults(8);
    assert!(engine.force_crash_value(20.0));
    engine.place("side", 10.0).unwrap();
    engine.advance(0.0);
    let snap = engine.advance(6.5);
    assert_eq!(snap.phase, RoundPhase::Flying);

    let cashout = engine.cash_out("side").unwrap();
    assert_eq!(cashout.multiplier, snap.multiplier);
    assert!((cashout.payout - 10.0 * snap.multiplier).abs() < 1e-9);
    assert_eq!(
        engine.cash_out("side"),
        Err(BetError::AlreadyCashedOut("side".into()))
    );
}

#[test]
fn unclaimed_wager_is_lost_then_cleared() {
    let mut engine = RoundEngine::with_defaults(21);
    assert!(engine.force_crash_value(1.5));
    engine.place("primary", 100.0).unwrap();
    engine.advance(0.0);

    let mut t = 0.0;
    while engine.phase() != RoundPhase::Crashed {
        t += FRAME;
        engine.advance(t);
    }
    assert_eq!(engine.ledger().get("primary").unwrap().state, WagerState::Lost);
    assert!(engine.snapshot().wagers["primary"].lost);

    while engine.phase() != RoundPhase::Waiting {
        t += FRAME;
        engine.advance(t);
    }
    assert!(engine.ledger().get("primary").is_none());
    assert!(engine.snapshot().wagers.is_empty());
}

#[test]
fn duplicate_place_is_rejected_without_side_effects() {
    let mut engine = RoundEngine::with_defaults(2);
    engine.place("primary", 5.0).unwrap();
    assert_eq!(
        engine.place("primary", 25.0),
        Err(BetError::DuplicateWager("primary".into()))
    );
    assert_eq!(engine.ledger().len(), 1);
    assert_eq!(engine.ledger().get("primary").unwrap().amount, 5.0);
}

#[test]
fn actions_are_gated_by_phase() {
    let mut engine = RoundEngine::with_defaults(3);
    assert!(matches!(
        engine.cash_out("primary"),
        Err(BetError::InvalidPhase { phase: RoundPhase::Waiting, .. })
    ));
    engine.place("primary", 5.0).unwrap();
    engine.advance(0.0);
    engine.advance(4.6);
    assert_eq!(engine.phase(), RoundPhase::Flying);
    assert!(matches!(
        engine.place("side", 5.0),
        Err(BetError::InvalidPhase { phase: RoundPhase::Flying, .. })
    ));
    assert!(matches!(
        engine.cancel("primary"),
        Err(BetError::InvalidPhase { .. })
    ));
    assert!(matches!(
        engine.cash_out("side"),
        Err(BetError::UnknownSlot(_))
    ));
}

#[test]
fn history_is_capped_newest_first() {
    let config = EngineConfig {
        history_len: 20,
        ..EngineConfig::default()
    };
    let mut engine = RoundEngine::new(config, 404).unwrap();
    engine.advance(0.0);

    let mut t = 0.0;
    let mut completed = 0;
    let mut last_phase = engine.phase();
    while completed < 25 {
        t += FRAME;
        let snap = engine.advance(t);
        if snap.phase == RoundPhase::Crashed && last_phase != RoundPhase::Crashed {
            completed += 1;
            assert_eq!(snap.history[0].id, snap.round_id);
            assert_eq!(snap.history[0].crash_value, snap.crash_value.unwrap());
        }
        last_phase = snap.phase;
    }

    let history = engine.history();
    assert_eq!(history.len(), 20);
    assert_eq!(history.latest().map(|e| e.id), Some(25));
    let ids: Vec<u64> = history.iter().map(|e| e.id).collect();
    assert!(ids.windows(2).all(|w| w[0] > w[1]));
}

#[test]
fn round_ids_are_stable_within_a_round() {
    let mut engine = RoundEngine::with_defaults(17);
    assert!(engine.force_crash_value(2.0));
    engine.advance(0.0);
    let mut t = 0.0;
    let mut seen = Vec::new();
    while engine.round_id() == 1 {
        t += FRAME;
        let snap = engine.advance(t);
        if snap.round_id == 1 && seen.last() != Some(&snap.phase) {
            seen.push(snap.phase);
        }
    }
    assert_eq!(seen, vec![RoundPhase::Waiting, RoundPhase::Flying, RoundPhase::Crashed]);
    assert_eq!(engine.phase(), RoundPhase::Waiting);
}
