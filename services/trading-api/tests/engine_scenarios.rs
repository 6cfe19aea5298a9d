//! Decision engine scenarios and property sweeps
//!
//! Drives the public engine API end to end: DNA + snapshot + position in,
//! decision and trace out.

use market_data::{MacdReading, MarketSnapshot, MovingAverages};
use rand::{rngs::StdRng, SeedableRng};
use trading_api::brain::{
    decide, AgentDna, BrainEngine, DecisionMode, EngineConfig, Personality, PositionState,
    SequenceRandom, TradeAction,
};

const PERSONALITIES: [Personality; 6] = [
    Personality::Aggressive,
    Personality::Cautious,
    Personality::Deceptive,
    Personality::Chaotic,
    Personality::Calculating,
    Personality::Adaptive,
];

fn scenario_dna() -> AgentDna {
    AgentDna::new(50.0, 50.0, 80.0, 20.0, 20.0)
}

fn oversold_market() -> MarketSnapshot {
    MarketSnapshot::new("BTC", 100.0, -3.0)
        .with_range(95.0, 110.0)
        .with_rsi(25.0)
}

fn overbought_market() -> MarketSnapshot {
    MarketSnapshot::new("BTC", 120.0, 8.0)
        .with_range(100.0, 121.0)
        .with_rsi(78.0)
}

/// Bullish snapshot with a full technical panel
fn bullish_panel() -> MarketSnapshot {
    MarketSnapshot::new("ETH", 105.0, 6.0)
        .with_range(90.0, 110.0)
        .with_rsi(45.0)
        .with_macd(MacdReading { value: 2.0, signal: 1.0, histogram: 1.0 })
        .with_moving_averages(MovingAverages { ma20: 100.0, ma50: 95.0, ma200: 80.0 })
}

/// A spread of snapshots: both modes, both directions, degenerate inputs
fn market_grid() -> Vec<MarketSnapshot> {
    let mut markets = vec![
        oversold_market(),
        overbought_market(),
        bullish_panel(),
        MarketSnapshot::new("SOL", 50.0, 0.0),
        MarketSnapshot::new("SOL", 50.0, -12.0).with_range(40.0, 60.0),
        MarketSnapshot::new("SOL", 50.0, 2.5).with_range(50.0, 50.0),
        MarketSnapshot::new("SOL", 0.0, 0.0).with_range(0.0, 0.0),
        MarketSnapshot::new("SOL", f64::NAN, f64::INFINITY).with_rsi(f64::NAN),
        MarketSnapshot::new("ETH", 80.0, -7.0)
            .with_range(78.0, 95.0)
            .with_rsi(22.0)
            .with_macd(MacdReading { value: -3.0, signal: -1.0, histogram: -2.0 })
            .with_moving_averages(MovingAverages { ma20: 90.0, ma50: 95.0, ma200: 100.0 }),
    ];
    for change in [-6.0, -1.5, 1.0, 4.0, 9.0] {
        markets.push(MarketSnapshot::new("BTC", 100.0, change).with_range(90.0, 115.0));
    }
    markets
}

fn dna_grid() -> Vec<AgentDna> {
    let levels = [0.0, 35.0, 61.0, 100.0];
    let mut grid = Vec::new();
    for &risk in &levels {
        for &timing in &levels {
            for &contrarian in &levels {
                grid.push(AgentDna::new(risk, 100.0 - risk, 50.0 + (risk - 50.0) / 2.0, timing, contrarian));
            }
        }
    }
    grid.push(AgentDna::new(-20.0, 150.0, f64::NAN, 50.0, 50.0));
    grid
}

fn position_grid() -> Vec<PositionState> {
    vec![
        PositionState::flat(1000.0),
        PositionState::flat(0.0),
        PositionState::holding(5.0, 100.0, 0.0),
        PositionState::holding(0.5, 100.0, 250.0),
    ]
}

#[test]
fn test_oversold_buy_scenario() {
    let mut rng = StdRng::seed_from_u64(7);
    let decision = decide(
        &scenario_dna(),
        &oversold_market(),
        &PositionState::flat(1000.0),
        Personality::Adaptive,
        &mut rng,
    );

    assert_eq!(decision.action, TradeAction::Buy);
    assert!(decision.suggested_amount > 0.0 && decision.suggested_amount <= 50.0);
    let (sl, tp) = (decision.stop_loss.unwrap(), decision.take_profit.unwrap());
    assert!(sl < 100.0 && 100.0 < tp);
    assert!(!decision.reasoning.is_empty());
}

#[test]
fn test_overbought_sell_while_holding_scenario() {
    let mut rng = StdRng::seed_from_u64(7);
    let decision = decide(
        &scenario_dna(),
        &overbought_market(),
        &PositionState::holding(5.0, 120.0, 0.0),
        Personality::Adaptive,
        &mut rng,
    );

    assert_eq!(decision.action, TradeAction::Sell);
    let (sl, tp) = (decision.stop_loss.unwrap(), decision.take_profit.unwrap());
    assert!(tp < 120.0 && 120.0 < sl);
}

#[test]
fn test_contrarian_fade_scenario() {
    let engine = BrainEngine::default();
    let follower = AgentDna::new(50.0, 50.0, 50.0, 20.0, 10.0);
    let contrarian = AgentDna { contrarian_bias: 90.0, ..follower };
    let flat = PositionState::flat(1000.0);

    let with_trend = engine.evaluate(&follower, &bullish_panel(), &flat, Personality::Calculating, &mut SequenceRandom::constant(0.9));
    let against = engine.evaluate(&contrarian, &bullish_panel(), &flat, Personality::Calculating, &mut SequenceRandom::constant(0.9));

    assert_eq!(with_trend.trace.mode, DecisionMode::Full);
    assert_eq!(with_trend.decision.action, TradeAction::Buy);
    assert_ne!(against.decision.action, TradeAction::Buy);
    assert!(against.trace.weighted.raw_signal < 0.0);

    // Holding, the faded read turns into an exit
    let holding = PositionState::holding(2.0, 105.0, 0.0);
    let exit = engine.decide(&contrarian, &bullish_panel(), &holding, Personality::Calculating, &mut SequenceRandom::constant(0.9));
    assert_eq!(exit.action, TradeAction::Sell);
}

#[test]
fn test_levels_direction_at_100() {
    let engine = BrainEngine::new(EngineConfig::deterministic());
    let market = MarketSnapshot::new("BTC", 100.0, -3.0)
        .with_range(95.0, 110.0)
        .with_rsi(25.0);
    let buy = engine.decide(&scenario_dna(), &market, &PositionState::flat(500.0), Personality::Adaptive, &mut SequenceRandom::constant(0.5));
    assert_eq!(buy.action, TradeAction::Buy);
    assert!(buy.stop_loss.unwrap() < 100.0 && 100.0 < buy.take_profit.unwrap());

    let market = MarketSnapshot::new("BTC", 100.0, 8.0)
        .with_range(80.0, 101.0)
        .with_rsi(80.0);
    let sell = engine.decide(&scenario_dna(), &market, &PositionState::holding(3.0, 100.0, 0.0), Personality::Adaptive, &mut SequenceRandom::constant(0.5));
    assert_eq!(sell.action, TradeAction::Sell);
    assert!(sell.take_profit.unwrap() < 100.0 && 100.0 < sell.stop_loss.unwrap());
}

#[test]
fn test_range_invariants_hold_everywhere() {
    let engine = BrainEngine::default();
    let mut rng = StdRng::seed_from_u64(42);

    for dna in dna_grid() {
        for market in market_grid() {
            for position in position_grid() {
                for personality in PERSONALITIES {
                    let d = engine.decide(&dna, &market, &position, personality, &mut rng);

                    assert!((10.0..=98.0).contains(&d.confidence), "confidence {}", d.confidence);
                    assert!((0.0..=50.0).contains(&d.suggested_amount), "amount {}", d.suggested_amount);
                    if d.action == TradeAction::Hold {
                        assert_eq!(d.suggested_amount, 0.0);
                        assert!(d.stop_loss.is_none() && d.take_profit.is_none());
                    } else {
                        assert!(d.stop_loss.is_some() && d.take_profit.is_some());
                    }
                }
            }
        }
    }
}

#[test]
fn test_flat_position_never_sells() {
    let engine = BrainEngine::default();
    let mut rng = StdRng::seed_from_u64(3);
    let flats = [PositionState::flat(1000.0), PositionState::flat(0.0), PositionState::default()];

    for dna in dna_grid() {
        for market in market_grid() {
            for position in &flats {
                for personality in PERSONALITIES {
                    let d = engine.decide(&dna, &market, position, personality, &mut rng);
                    assert_ne!(d.action, TradeAction::Sell);
                }
            }
        }
    }
}

#[test]
fn test_same_random_stream_same_decision() {
    let engine = BrainEngine::default();
    for personality in PERSONALITIES {
        for market in market_grid() {
            let a = engine.decide(&scenario_dna(), &market, &PositionState::flat(1000.0), personality, &mut StdRng::seed_from_u64(11));
            let b = engine.decide(&scenario_dna(), &market, &PositionState::flat(1000.0), personality, &mut StdRng::seed_from_u64(11));
            assert_eq!(a, b);
        }
    }
}

#[test]
fn test_deterministic_config_ignores_the_stream() {
    let engine = BrainEngine::new(EngineConfig::deterministic());
    let deterministic = [Personality::Aggressive, Personality::Cautious, Personality::Calculating, Personality::Adaptive];

    for personality in deterministic {
        for market in market_grid() {
            for position in position_grid() {
                let a = engine.decide(&scenario_dna(), &market, &position, personality, &mut StdRng::seed_from_u64(1));
                let b = engine.decide(&scenario_dna(), &market, &position, personality, &mut StdRng::seed_from_u64(999));
                assert_eq!(a, b);
            }
        }
    }
}

#[test]
fn test_contrarian_inversion_only_above_cutoff() {
    let engine = BrainEngine::new(EngineConfig::deterministic());
    let flat = PositionState::flat(1000.0);

    for contrarian in [0.0, 30.0, 60.0, 61.0, 75.0, 100.0] {
        let dna = AgentDna { contrarian_bias: contrarian, ..AgentDna::default() };
        for market in market_grid() {
            let w = engine
                .evaluate(&dna, &market, &flat, Personality::Adaptive, &mut SequenceRandom::constant(0.5))
                .trace
                .weighted;
            if contrarian <= 60.0 {
                assert_eq!(w.raw_signal, w.pre_contrarian);
                assert!(w.contrarian_factor.is_none());
            } else if w.pre_contrarian != 0.0 {
                assert!(w.raw_signal.signum() == -w.pre_contrarian.signum());
                assert!(w.raw_signal.abs() <= w.pre_contrarian.abs() + 1e-12);
            }
        }
    }
}

#[test]
fn test_threshold_monotone_in_timing() {
    let engine = BrainEngine::new(EngineConfig::deterministic());
    let mut last_threshold = f64::MIN;
    let mut last_holds = 0;

    for timing in (0..=100).step_by(10) {
        let dna = AgentDna { timing_sensitivity: timing as f64, ..scenario_dna() };
        let mut holds = 0;
        let mut threshold = 0.0;

        for market in market_grid() {
            for position in position_grid() {
                let eval = engine.evaluate(&dna, &market, &position, Personality::Adaptive, &mut SequenceRandom::constant(0.5));
                threshold = eval.trace.weighted.action_threshold;
                if eval.decision.action == TradeAction::Hold {
                    holds += 1;
                }
            }
        }

        assert!(threshold > last_threshold);
        assert!(holds >= last_holds, "timing {}: {} holds < {}", timing, holds, last_holds);
        last_threshold = threshold;
        last_holds = holds;
    }
}

#[test]
fn test_degenerate_market_is_safe() {
    let engine = BrainEngine::default();
    let zero = MarketSnapshot::new("BTC", 100.0, 0.0).with_range(100.0, 100.0);
    let eval = engine.evaluate(&AgentDna::default(), &zero, &PositionState::flat(10.0), Personality::Chaotic, &mut StdRng::seed_from_u64(5));

    assert_eq!(eval.trace.signals.volatility, 0.0);
    assert_eq!(eval.trace.signals.price_position, 0.5);
    assert!(eval.trace.final_signal.is_finite());
    assert!(eval.decision.confidence.is_finite());
}

#[test]
fn test_activity_bias_produces_minor_trades() {
    let engine = BrainEngine::default();
    // Low aggression and high risk tolerance leave 48% of the range unclaimed by either zone
    let dna = AgentDna::new(100.0, 0.0, 50.0, 50.0, 0.0);
    let quiet = MarketSnapshot::new("BTC", 102.0, 0.2).with_range(90.0, 115.0);
    let flat = PositionState::flat(1000.0);

    // First draw under 0.30 nudges past the threshold
    let eval = engine.evaluate(&dna, &quiet, &flat, Personality::Adaptive, &mut SequenceRandom::new(vec![0.1]));
    assert!(eval.trace.activity_nudge);
    assert_eq!(eval.decision.action, TradeAction::Buy);

    let eval = engine.evaluate(&dna, &quiet, &flat, Personality::Adaptive, &mut SequenceRandom::new(vec![0.9]));
    assert!(!eval.trace.activity_nudge);
    assert_eq!(eval.decision.action, TradeAction::Hold);
}

#[test]
fn test_basic_rules_decide_direction() {
    let engine = BrainEngine::new(EngineConfig::deterministic());
    let dna = AgentDna::new(50.0, 50.0, 50.0, 50.0, 0.0);
    let flat = PositionState::flat(1000.0);
    let mut rng = SequenceRandom::constant(0.5);

    // Dip crossed, price in the upper part of the range
    let dip = MarketSnapshot::new("BTC", 106.0, -5.0).with_range(100.0, 110.0);
    let eval = engine.evaluate(&dna, &dip, &flat, Personality::Adaptive, &mut rng);
    assert_eq!(eval.trace.mode, DecisionMode::Basic);
    assert_eq!(eval.decision.action, TradeAction::Buy);

    // Only the buy zone, at the highest threshold
    let patient = AgentDna { timing_sensitivity: 100.0, ..dna };
    let zone = MarketSnapshot::new("BTC", 104.0, 0.0).with_range(100.0, 110.0);
    let eval = engine.evaluate(&patient, &zone, &flat, Personality::Adaptive, &mut rng);
    assert_eq!(eval.decision.action, TradeAction::Buy);
    assert!(eval.trace.final_signal > eval.trace.weighted.action_threshold);

    // Profit crossed while holding, price low in the range
    let rally = MarketSnapshot::new("BTC", 103.0, 6.0).with_range(100.0, 110.0);
    let holding = PositionState::holding(4.0, 103.0, 0.0);
    let eval = engine.evaluate(&dna, &rally, &holding, Personality::Adaptive, &mut rng);
    assert_eq!(eval.decision.action, TradeAction::Sell);
    assert!(eval.decision.reasoning.contains("profit-taking rule"));

    // Same rally while flat has nothing to sell
    let eval = engine.evaluate(&dna, &rally, &flat, Personality::Adaptive, &mut rng);
    assert_eq!(eval.decision.action, TradeAction::Hold);
}

#[test]
fn test_hold_reasoning_never_claims_activity_trade() {
    let engine = BrainEngine::default();
    let mut rng = StdRng::seed_from_u64(21);

    for dna in dna_grid() {
        for market in market_grid() {
            for position in position_grid() {
                for personality in PERSONALITIES {
                    let eval = engine.evaluate(&dna, &market, &position, personality, &mut rng);
                    if eval.decision.action == TradeAction::Hold {
                        assert!(!eval.trace.activity_nudge);
                        assert!(!eval.decision.reasoning.contains("activity bias"), "{}", eval.decision.reasoning);
                    }
                }
            }
        }
    }
}
