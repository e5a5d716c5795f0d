//! No-mock tests for the stake advisor against real engines and the real
//! Monte Carlo runner.

use rand::rngs::StdRng;
use rand::SeedableRng;
use wr_common::Error;
use wr_config::Policy;
use wr_core::advisor::{OverallRecommendation, StakeAdvisor};
use wr_core::advisory::{EvAdvice, KellyAdvice, RiskLevel};
use wr_core::engine::PosteriorEngine;
use wr_core::simulate::SimulationConfig;

fn engine(wins: i64, losses: i64) -> PosteriorEngine {
    let mut engine = PosteriorEngine::default();
    engine.update(wins, losses).unwrap();
    engine
}

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

#[test]
fn kelly_even_odds_matches_closed_form() {
    let e = engine(60, 40);
    let p = e.win_probability();
    let kelly = StakeAdvisor::new(&e).kelly_criterion(2.0).unwrap();
    assert!(approx_eq(kelly.kelly_fraction, 2.0 * p - 1.0, 1e-12));
    assert!(approx_eq(
        kelly.conservative_bet_percentage,
        kelly.recommended_bet_percentage / 2.0,
        1e-12
    ));
    assert!(kelly.expected_growth_rate > 0.0);
    assert_eq!(kelly.advice, KellyAdvice::SignificantEdge);
}

#[test]
fn kelly_without_edge_is_zero() {
    let e = engine(40, 60);
    let kelly = StakeAdvisor::new(&e).kelly_criterion(2.0).unwrap();
    assert_eq!(kelly.kelly_fraction, 0.0);
    assert_eq!(kelly.expected_growth_rate, 0.0);
    assert_eq!(kelly.advice, KellyAdvice::DoNotBet);

    // Odds at or below 1 never pay a profit.
    let e = engine(90, 10);
    let kelly = StakeAdvisor::new(&e).kelly_criterion(1.0).unwrap();
    assert_eq!(kelly.kelly_fraction, 0.0);
}

#[test]
fn kelly_rejects_non_positive_odds() {
    let e = engine(5, 5);
    let advisor = StakeAdvisor::new(&e);
    assert!(matches!(
        advisor.kelly_criterion(0.0),
        Err(Error::InvalidOdds { .. })
    ));
    assert!(advisor.kelly_criterion(-2.0).is_err());
    assert!(advisor.kelly_criterion_with_loss(2.0, 0.0).is_err());
}

#[test]
fn expected_value_of_sixty_forty_even_bet() {
    let e = engine(60, 40);
    let ev = StakeAdvisor::new(&e)
        .expected_value_analysis(100.0, 200.0, None)
        .unwrap();
    let p = 61.0 / 102.0;
    assert!(approx_eq(ev.expected_value, 100.0 * p - 100.0 * (1.0 - p), 1e-9));
    assert!(approx_eq(ev.ev_percentage, ev.expected_value, 1e-9));
    assert!(ev.positive_ev);
    assert_eq!(ev.advice, EvAdvice::HighlyRecommended);
    assert!(ev.ev_credible_interval.0 < ev.expected_value);
    assert!(ev.expected_value < ev.ev_credible_interval.1);
}

#[test]
fn expected_value_with_explicit_loss() {
    // Beta(60, 40) has mean exactly 0.6.
    let e = engine(59, 39);
    let ev = StakeAdvisor::new(&e)
        .expected_value_analysis(100.0, 250.0, Some(100.0))
        .unwrap();
    assert!(approx_eq(ev.expected_value, 50.0, 1e-9));
    assert!(approx_eq(ev.ev_percentage, 50.0, 1e-9));
    assert!(ev.positive_ev);
}

#[test]
fn kelly_negative_edge_clamps_to_zero() {
    let e = engine(30, 70);
    let kelly = StakeAdvisor::new(&e).kelly_criterion(1.5).unwrap();
    assert_eq!(kelly.kelly_fraction, 0.0);
    assert_eq!(kelly.recommended_bet_percentage, 0.0);
}

#[test]
fn expected_value_rejects_bad_amounts() {
    let e = engine(1, 1);
    let advisor = StakeAdvisor::new(&e);
    assert!(matches!(
        advisor.expected_value_analysis(0.0, 10.0, None),
        Err(Error::InvalidBetSize { .. })
    ));
    assert!(matches!(
        advisor.expected_value_analysis(10.0, -1.0, None),
        Err(Error::InvalidOdds { .. })
    ));
    assert!(advisor.expected_value_analysis(10.0, 20.0, Some(-5.0)).is_err());
}

#[test]
fn ruin_short_circuits_when_bet_covers_bankroll() {
    let e = engine(99, 1);
    let risk = StakeAdvisor::new(&e)
        .risk_assessment(100.0, 100.0, 50)
        .unwrap();
    assert!(risk.short_circuited);
    assert_eq!(risk.risk_of_ruin, 1.0);
    assert_eq!(risk.risk_level, RiskLevel::Extreme);
    assert_eq!(risk.trials, 0);
}

#[test]
fn ruin_is_reproducible_for_a_seed() {
    let e = engine(55, 45);
    let a = StakeAdvisor::new(&e)
        .with_simulation(SimulationConfig::seeded(9).with_workers(1))
        .risk_assessment(1000.0, 100.0, 100)
        .unwrap();
    let b = StakeAdvisor::new(&e)
        .with_simulation(SimulationConfig::seeded(9).with_workers(3))
        .risk_assessment(1000.0, 100.0, 100)
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn ruin_strictly_grows_with_stake_ratio_at_even_odds() {
    // Beta(51, 51) has mean exactly 0.5.
    let e = engine(50, 50);
    assert_eq!(e.win_probability(), 0.5);
    for seed in [1u64, 2, 3, 4, 5] {
        let advisor =
            StakeAdvisor::new(&e).with_simulation(SimulationConfig::seeded(seed));
        let small = advisor.risk_assessment(1000.0, 50.0, 100).unwrap();
        let medium = advisor.risk_assessment(1000.0, 100.0, 100).unwrap();
        let large = advisor.risk_assessment(1000.0, 200.0, 100).unwrap();
        assert!(small.risk_of_ruin > 0.0, "seed {seed}");
        assert!(small.risk_of_ruin < medium.risk_of_ruin, "seed {seed}");
        assert!(medium.risk_of_ruin < large.risk_of_ruin, "seed {seed}");
    }
}

#[test]
fn kelly_loss_odds_leave_sizing_unchanged() {
    let e = engine(60, 40);
    let advisor = StakeAdvisor::new(&e).with_simulation(SimulationConfig::seeded(3));
    let plain = advisor.kelly_criterion(2.0).unwrap();
    let with_loss = advisor.kelly_criterion_with_loss(2.0, 0.5).unwrap();
    assert_eq!(with_loss.kelly_fraction, plain.kelly_fraction);
    assert_eq!(with_loss.expected_growth_rate, plain.expected_growth_rate);
    assert!(approx_eq(plain.kelly_fraction, 2.0 * e.win_probability() - 1.0, 1e-12));
}

#[test]
fn injected_rng_ruin_matches_bounds() {
    let e = engine(70, 30);
    let mut rng = StdRng::seed_from_u64(123);
    let risk = StakeAdvisor::new(&e)
        .simulate_ruin_with(&mut rng, 1000.0, 10.0, 100, 2_000)
        .unwrap();
    // Ruin needs every one of the 100 games lost.
    assert!(risk.risk_of_ruin < 0.01);
    assert_eq!(risk.trials, 2_000);
    assert!(!risk.short_circuited);
}

#[test]
fn zero_trials_is_an_error() {
    let e = engine(1, 1);
    let mut rng = StdRng::seed_from_u64(0);
    let err = StakeAdvisor::new(&e)
        .simulate_ruin_with(&mut rng, 100.0, 1.0, 10, 0)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidSimulation(_)));
}

#[test]
fn report_with_edge_recommends_conservative_stake() {
    let e = engine(60, 40);
    let report = StakeAdvisor::new(&e)
        .with_simulation(SimulationConfig::seeded(5))
        .generate_investment_report(1000.0, 2.0)
        .unwrap();
    let kelly = report.kelly_analysis.kelly_fraction;
    let full = report.full_kelly.unwrap();
    let half = report.half_kelly.unwrap();

    assert!(!report.is_no_bet());
    assert!(approx_eq(full.bet_size, 1000.0 * kelly, 1e-9));
    assert!(approx_eq(half.bet_size, full.bet_size / 2.0, 1e-9));
    assert!(half.risk.risk_of_ruin <= full.risk.risk_of_ruin);
    assert_eq!(half.risk.n_games, Policy::default().simulation.risk_horizon_games);
    match report.recommendation {
        OverallRecommendation::Bet {
            conservative_percentage,
            risk_level,
            expected_return_percentage,
        } => {
            assert!(approx_eq(conservative_percentage, kelly * 50.0, 1e-9));
            assert_eq!(risk_level, half.risk.risk_level);
            assert!(expected_return_percentage.is_some());
        }
        OverallRecommendation::DoNotBet => panic!("expected a bet"),
    }
}

#[test]
fn report_without_edge_is_no_bet() {
    let e = engine(30, 70);
    let report = StakeAdvisor::new(&e)
        .generate_investment_report(1000.0, 2.0)
        .unwrap();
    assert!(report.is_no_bet());
    assert!(report.full_kelly.is_none());
    assert!(report.half_kelly.is_none());
    assert_eq!(report.kelly_analysis.kelly_fraction, 0.0);
}

#[test]
fn report_rejects_bad_bankroll() {
    let e = engine(60, 40);
    let advisor = StakeAdvisor::new(&e);
    assert!(matches!(
        advisor.generate_investment_report(0.0, 2.0),
        Err(Error::InvalidBankroll { .. })
    ));
    assert!(advisor.generate_investment_report(-5.0, 2.0).is_err());
}

#[test]
fn custom_policy_controls_stake_multiplier() {
    let e = engine(60, 40);
    let mut policy = Policy::default();
    policy.half_kelly_multiplier = 0.25;
    policy.simulation.ruin_trials = 500;
    policy.simulation.seed = Some(1);
    let report = StakeAdvisor::with_policy(&e, policy)
        .generate_investment_report(1000.0, 2.0)
        .unwrap();
    let full = report.full_kelly.unwrap();
    let half = report.half_kelly.unwrap();
    assert!(approx_eq(half.bet_size, full.bet_size * 0.25, 1e-9));
    assert_eq!(half.risk.trials, 500);
}

#[test]
fn advisor_sees_engine_after_reborrow() {
    let mut e = engine(40, 60);
    assert!(StakeAdvisor::new(&e)
        .generate_investment_report(100.0, 2.0)
        .unwrap()
        .is_no_bet());
    e.update(80, 0).unwrap();
    let report = StakeAdvisor::new(&e)
        .with_simulation(SimulationConfig::seeded(2))
        .generate_investment_report(100.0, 2.0)
        .unwrap();
    assert!(!report.is_no_bet());
}
