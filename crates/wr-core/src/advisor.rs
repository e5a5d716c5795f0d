//! Stake advisor: Kelly sizing, ruin risk and expected value.
//!
//! The advisor borrows a [`PosteriorEngine`] and reads its current belief on
//! every call. Holding the borrow freezes the engine, so an advisor can never
//! report on a stale posterior; re-borrow after feeding new observations.

use rand::rngs::StdRng;
use rand::Rng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use wr_common::{Error, Result};
use wr_config::Policy;

use crate::advisory::{EvAdvice, KellyAdvice, RiskLevel};
use crate::engine::PosteriorEngine;
use crate::log_event;
use crate::logging::{event_names, Stage};
use crate::simulate::{run_chunked, SimulationConfig};

/// Kelly sizing for one set of odds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KellyRecommendation {
    pub win_probability: f64,
    /// Payout multiple on a win, stake included.
    pub win_odds: f64,
    /// Loss multiple as supplied; does not change the sizing.
    pub loss_odds: f64,
    pub kelly_fraction: f64,
    pub recommended_bet_percentage: f64,
    pub conservative_bet_percentage: f64,
    /// Expected log-growth per bet at `kelly_fraction`.
    pub expected_growth_rate: f64,
    pub advice: KellyAdvice,
}

/// Risk of ruin for a fixed stake over a fixed horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    pub risk_of_ruin: f64,
    pub bet_to_bankroll_ratio: f64,
    pub n_games: u32,
    /// Simulated random walks; 0 when short-circuited.
    pub trials: usize,
    /// Stake was at least the bankroll, so ruin is certain.
    pub short_circuited: bool,
}

/// Expected value of one bet, with the credible-interval range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExpectedValueResult {
    pub bet_amount: f64,
    /// Total returned on a win, stake included.
    pub win_return: f64,
    pub loss_amount: f64,
    pub expected_value: f64,
    pub ev_percentage: f64,
    /// EV at the lower and upper credible bounds of the win probability.
    pub ev_credible_interval: (f64, f64),
    pub credible_level: f64,
    pub win_probability: f64,
    pub positive_ev: bool,
    pub advice: EvAdvice,
}

/// Risk and value of one candidate stake.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StakeAnalysis {
    pub bet_size: f64,
    pub risk: RiskAssessment,
    pub expected_value: ExpectedValueResult,
}

/// Synthesised recommendation of an investment report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum OverallRecommendation {
    /// Kelly fraction is not positive.
    DoNotBet,
    /// Bet the conservative fraction.
    Bet {
        conservative_percentage: f64,
        /// Risk level of the conservative stake.
        risk_level: RiskLevel,
        /// Present only when the conservative stake has positive EV.
        expected_return_percentage: Option<f64>,
    },
}

/// Kelly, risk and EV composed for one bankroll and one set of odds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InvestmentReport {
    pub bankroll: f64,
    pub win_odds: f64,
    pub win_probability: f64,
    pub credible_interval: (f64, f64),
    pub credible_level: f64,
    pub kelly_analysis: KellyRecommendation,
    /// Absent when there is no edge.
    pub full_kelly: Option<StakeAnalysis>,
    pub half_kelly: Option<StakeAnalysis>,
    pub recommendation: OverallRecommendation,
}

impl InvestmentReport {
    pub fn is_no_bet(&self) -> bool {
        matches!(self.recommendation, OverallRecommendation::DoNotBet)
    }
}

/// Turns the engine's belief into stake guidance.
#[derive(Debug, Clone)]
pub struct StakeAdvisor<'a> {
    engine: &'a PosteriorEngine,
    policy: Policy,
    sim: SimulationConfig,
}

impl<'a> StakeAdvisor<'a> {
    /// Advisor with the default policy.
    pub fn new(engine: &'a PosteriorEngine) -> Self {
        Self::with_policy(engine, Policy::default())
    }

    /// Advisor with explicit thresholds; simulation settings come from
    /// `policy.simulation`.
    pub fn with_policy(engine: &'a PosteriorEngine, policy: Policy) -> Self {
        let sim = SimulationConfig::from_policy(&policy.simulation);
        StakeAdvisor {
            engine,
            policy,
            sim,
        }
    }

    /// Override seed and worker count.
    pub fn with_simulation(mut self, sim: SimulationConfig) -> Self {
        self.sim = sim;
        self
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Kelly fraction at the usual loss of one stake.
    pub fn kelly_criterion(&self, win_odds: f64) -> Result<KellyRecommendation> {
        self.kelly_criterion_with_loss(win_odds, 1.0)
    }

    /// Kelly fraction with an explicit loss multiple.
    ///
    /// `loss_odds` is validated and echoed; the sizing is the classical
    /// `max(0, (b·p - q)/b)` with `b = win_odds - 1`, or 0 when `b <= 0`.
    /// No upper clamp is applied: `f = p - q/b < 1` whenever `p < 1`, so the
    /// growth rate stays finite.
    pub fn kelly_criterion_with_loss(
        &self,
        win_odds: f64,
        loss_odds: f64,
    ) -> Result<KellyRecommendation> {
        check_odds(win_odds)?;
        check_odds(loss_odds)?;

        let p = self.engine.win_probability();
        let q = 1.0 - p;
        let b = win_odds - 1.0;

        let kelly_fraction = if b > 0.0 {
            ((b * p - q) / b).max(0.0)
        } else {
            0.0
        };
        let expected_growth_rate = if kelly_fraction <= 0.0 {
            0.0
        } else if kelly_fraction >= 1.0 {
            f64::NEG_INFINITY
        } else {
            p * (b * kelly_fraction).ln_1p() + q * (-kelly_fraction).ln_1p()
        };

        let multiplier = self.policy.half_kelly_multiplier;
        let rec = KellyRecommendation {
            win_probability: p,
            win_odds,
            loss_odds,
            kelly_fraction,
            recommended_bet_percentage: kelly_fraction * 100.0,
            conservative_bet_percentage: kelly_fraction * multiplier * 100.0,
            expected_growth_rate,
            advice: KellyAdvice::classify(kelly_fraction, &self.policy.kelly_tiers),
        };
        log_event!(
            DEBUG,
            event_names::ADVISOR_KELLY_COMPUTED,
            Stage::Advise,
            "kelly fraction computed",
            win_odds = win_odds,
            kelly_fraction = kelly_fraction
        );
        Ok(rec)
    }

    /// Monte Carlo risk of ruin for betting `bet_size` each game.
    ///
    /// The win probability is the posterior mean, held fixed across games.
    pub fn risk_assessment(
        &self,
        bankroll: f64,
        bet_size: f64,
        n_games: u32,
    ) -> Result<RiskAssessment> {
        let trials = self.policy.simulation.ruin_trials;
        self.assess_risk(bankroll, bet_size, n_games, trials, |p| {
            let counts = run_chunked(&self.sim, trials, |rng: &mut StdRng, len| {
                count_ruins(rng, p, bankroll, bet_size, n_games, len)
            })?;
            Ok(counts.into_iter().sum())
        })
    }

    /// Single-threaded ruin simulation over an injected random source.
    pub fn simulate_ruin_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        bankroll: f64,
        bet_size: f64,
        n_games: u32,
        trials: usize,
    ) -> Result<RiskAssessment> {
        self.assess_risk(bankroll, bet_size, n_games, trials, |p| {
            Ok(count_ruins(rng, p, bankroll, bet_size, n_games, trials))
        })
    }

    fn assess_risk(
        &self,
        bankroll: f64,
        bet_size: f64,
        n_games: u32,
        trials: usize,
        count: impl FnOnce(f64) -> Result<usize>,
    ) -> Result<RiskAssessment> {
        check_bankroll(bankroll)?;
        check_bet(bet_size)?;
        let ratio = bet_size / bankroll;

        if bet_size >= bankroll {
            log_event!(
                WARN,
                event_names::ADVISOR_RISK_SHORT_CIRCUIT,
                Stage::Advise,
                "bet size covers the whole bankroll; ruin is certain",
                bankroll = bankroll,
                bet_size = bet_size
            );
            return Ok(RiskAssessment {
                risk_level: RiskLevel::Extreme,
                risk_of_ruin: 1.0,
                bet_to_bankroll_ratio: ratio,
                n_games,
                trials: 0,
                short_circuited: true,
            });
        }
        if trials == 0 {
            return Err(Error::InvalidSimulation(
                "ruin trials must be positive".to_string(),
            ));
        }

        let p = self.engine.win_probability();
        let ruins = count(p)?;
        let risk_of_ruin = ruins as f64 / trials as f64;
        let risk_level = RiskLevel::classify(risk_of_ruin, &self.policy.risk_tiers);

        log_event!(
            DEBUG,
            event_names::ADVISOR_RISK_SIMULATED,
            Stage::Simulate,
            "ruin risk simulated",
            trials = trials as u64,
            ruins = ruins as u64,
            risk_of_ruin = risk_of_ruin
        );
        Ok(RiskAssessment {
            risk_level,
            risk_of_ruin,
            bet_to_bankroll_ratio: ratio,
            n_games,
            trials,
            short_circuited: false,
        })
    }

    /// Expected value of one bet.
    ///
    /// `win_return` is the total paid on a win, stake included;
    /// `loss_amount` defaults to `bet_amount`.
    pub fn expected_value_analysis(
        &self,
        bet_amount: f64,
        win_return: f64,
        loss_amount: Option<f64>,
    ) -> Result<ExpectedValueResult> {
        check_bet(bet_amount)?;
        if !win_return.is_finite() || win_return < 0.0 {
            return Err(Error::InvalidOdds {
                odds: win_return / bet_amount,
            });
        }
        let loss_amount = loss_amount.unwrap_or(bet_amount);
        if !loss_amount.is_finite() || loss_amount < 0.0 {
            return Err(Error::InvalidBetSize {
                bet_size: loss_amount,
            });
        }

        let level = self.policy.credible_level;
        let p = self.engine.win_probability();
        let (lower, upper) = self.engine.credible_interval(level)?;

        let net_win = win_return - bet_amount;
        let ev_at = |prob: f64| prob * net_win - (1.0 - prob) * loss_amount;
        let expected_value = ev_at(p);
        let ev_percentage = expected_value / bet_amount * 100.0;

        log_event!(
            DEBUG,
            event_names::ADVISOR_EV_COMPUTED,
            Stage::Advise,
            "expected value computed",
            bet_amount = bet_amount,
            expected_value = expected_value
        );
        Ok(ExpectedValueResult {
            bet_amount,
            win_return,
            loss_amount,
            expected_value,
            ev_percentage,
            ev_credible_interval: (ev_at(lower), ev_at(upper)),
            credible_level: level,
            win_probability: p,
            positive_ev: expected_value > 0.0,
            advice: EvAdvice::classify(ev_percentage, &self.policy.ev_tiers),
        })
    }

    /// Kelly sizing, then risk and EV for the full and conservative stakes.
    pub fn generate_investment_report(
        &self,
        bankroll: f64,
        win_odds: f64,
    ) -> Result<InvestmentReport> {
        check_bankroll(bankroll)?;
        let kelly = self.kelly_criterion(win_odds)?;
        let level = self.policy.credible_level;
        let credible_interval = self.engine.credible_interval(level)?;

        let full_stake = bankroll * kelly.kelly_fraction;
        let half_stake = full_stake * self.policy.half_kelly_multiplier;

        let mut report = InvestmentReport {
            bankroll,
            win_odds,
            win_probability: self.engine.win_probability(),
            credible_interval,
            credible_level: level,
            kelly_analysis: kelly,
            full_kelly: None,
            half_kelly: None,
            recommendation: OverallRecommendation::DoNotBet,
        };

        if kelly.kelly_fraction <= 0.0 {
            log_event!(
                WARN,
                event_names::ADVISOR_NO_EDGE,
                Stage::Advise,
                "no positive edge at these odds",
                win_odds = win_odds,
                win_probability = report.win_probability
            );
            return Ok(report);
        }
        if half_stake <= 0.0 {
            // Positive edge, but the bankroll is too small to express a stake.
            return Err(Error::InvalidBankroll { bankroll });
        }

        let full = self.analyze_stake(bankroll, full_stake, win_odds)?;
        let half = self.analyze_stake(bankroll, half_stake, win_odds)?;
        report.recommendation = OverallRecommendation::Bet {
            conservative_percentage: kelly.conservative_bet_percentage,
            risk_level: half.risk.risk_level,
            expected_return_percentage: half
                .expected_value
                .positive_ev
                .then_some(half.expected_value.ev_percentage),
        };
        report.full_kelly = Some(full);
        report.half_kelly = Some(half);

        log_event!(
            INFO,
            event_names::REPORT_GENERATED,
            Stage::Report,
            "investment report generated",
            bankroll = bankroll,
            kelly_fraction = kelly.kelly_fraction,
            half_kelly_bet = half_stake
        );
        Ok(report)
    }

    fn analyze_stake(&self, bankroll: f64, stake: f64, win_odds: f64) -> Result<StakeAnalysis> {
        let horizon = self.policy.simulation.risk_horizon_games;
        Ok(StakeAnalysis {
            bet_size: stake,
            risk: self.risk_assessment(bankroll, stake, horizon)?,
            expected_value: self.expected_value_analysis(stake, stake * win_odds, None)?,
        })
    }
}

/// Count ruined walks among `trials`.
///
/// A walk starts at `bankroll`, moves by `±bet_size` per game, and is ruined
/// the first time its balance is at or below zero.
fn count_ruins<R: Rng + ?Sized>(
    rng: &mut R,
    p: f64,
    bankroll: f64,
    bet_size: f64,
    n_games: u32,
    trials: usize,
) -> usize {
    (0..trials)
        .filter(|_| {
            let mut balance = bankroll;
            for _ in 0..n_games {
                if rng.random::<f64>() < p {
                    balance += bet_size;
                } else {
                    balance -= bet_size;
                }
                if balance <= 0.0 {
                    return true;
                }
            }
            false
        })
        .count()
}

fn check_odds(odds: f64) -> Result<()> {
    if !odds.is_finite() || odds <= 0.0 {
        return Err(Error::InvalidOdds { odds });
    }
    Ok(())
}

fn check_bankroll(bankroll: f64) -> Result<()> {
    if !bankroll.is_finite() || bankroll <= 0.0 {
        return Err(Error::InvalidBankroll { bankroll });
    }
    Ok(())
}

fn check_bet(bet_size: f64) -> Result<()> {
    if !bet_size.is_finite() || bet_size <= 0.0 {
        return Err(Error::InvalidBetSize { bet_size });
    }
    Ok(())
}
