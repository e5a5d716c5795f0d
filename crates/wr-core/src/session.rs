//! Named play sessions feeding one posterior.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use wr_common::{Error, Result};

use crate::engine::{PosteriorEngine, Prediction, SUMMARY_CREDIBLE_LEVEL};
use crate::log_event;
use crate::logging::{event_names, Stage};
use crate::simulate::SimulationConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SessionRecord {
    pub name: String,
    pub wins: u64,
    pub losses: u64,
    /// Raw win rate of this session alone; 0 for an empty session.
    pub win_rate: f64,
}

/// Totals across all sessions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OverallStats {
    pub total_sessions: usize,
    pub total_games: u64,
    pub total_wins: u64,
    pub total_losses: u64,
    /// Frequentist `wins / games`; 0 with no games.
    pub simple_win_rate: f64,
    /// Posterior mean.
    pub bayesian_win_rate: f64,
    pub credible_interval: (f64, f64),
}

/// Break-even analysis for a fixed reward/penalty per game.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BreakEven {
    pub break_even_rate: f64,
    pub current_rate: f64,
    pub above_break_even: bool,
    pub expected_value_per_game: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SessionLog {
    engine: PosteriorEngine,
    sessions: Vec<SessionRecord>,
}

impl SessionLog {
    pub fn new(engine: PosteriorEngine) -> Self {
        SessionLog {
            engine,
            sessions: Vec::new(),
        }
    }

    pub fn engine(&self) -> &PosteriorEngine {
        &self.engine
    }

    /// Record a session and feed it to the engine.
    ///
    /// Unnamed sessions are called "Session N". Invalid counts leave both the
    /// log and the engine unchanged.
    pub fn add_session(
        &mut self,
        wins: i64,
        losses: i64,
        name: Option<&str>,
    ) -> Result<&SessionRecord> {
        self.engine.update(wins, losses)?;

        // update() has already rejected negatives.
        let (wins, losses) = (wins as u64, losses as u64);
        let total = wins + losses;
        let name = match name {
            Some(n) => n.to_string(),
            None => format!("Session {}", self.sessions.len() + 1),
        };
        let win_rate = if total > 0 {
            wins as f64 / total as f64
        } else {
            0.0
        };
        log_event!(
            DEBUG,
            event_names::SESSION_ADDED,
            Stage::Ingest,
            "session recorded",
            session = name.as_str(),
            wins = wins,
            losses = losses
        );

        let index = self.sessions.len();
        self.sessions.push(SessionRecord {
            name,
            wins,
            losses,
            win_rate,
        });
        Ok(&self.sessions[index])
    }

    pub fn sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }

    pub fn overall_stats(&self) -> OverallStats {
        let total_wins: u64 = self.sessions.iter().map(|s| s.wins).sum();
        let total_losses: u64 = self.sessions.iter().map(|s| s.losses).sum();
        let total_games = total_wins + total_losses;
        OverallStats {
            total_sessions: self.sessions.len(),
            total_games,
            total_wins,
            total_losses,
            simple_win_rate: if total_games > 0 {
                total_wins as f64 / total_games as f64
            } else {
                0.0
            },
            bayesian_win_rate: self.engine.win_probability(),
            credible_interval: self
                .engine
                .posterior()
                .credible_interval(SUMMARY_CREDIBLE_LEVEL),
        }
    }

    /// Probability of `n` straight wins at the posterior mean.
    pub fn streak_probability(&self, n: u32) -> f64 {
        self.engine.win_probability().powf(f64::from(n))
    }

    /// Break-even win rate `loss / (win + loss)` against the current rate.
    pub fn break_even(&self, win_reward: f64, loss_penalty: f64) -> Result<BreakEven> {
        if !win_reward.is_finite() || win_reward <= 0.0 {
            return Err(Error::InvalidOdds { odds: win_reward });
        }
        if !loss_penalty.is_finite() || loss_penalty <= 0.0 {
            return Err(Error::InvalidBetSize {
                bet_size: loss_penalty,
            });
        }
        let break_even_rate = loss_penalty / (win_reward + loss_penalty);
        let current_rate = self.engine.win_probability();
        Ok(BreakEven {
            break_even_rate,
            current_rate,
            above_break_even: current_rate > break_even_rate,
            expected_value_per_game: current_rate * win_reward
                - (1.0 - current_rate) * loss_penalty,
        })
    }

    pub fn predict_future(
        &self,
        n_games: u64,
        n_simulations: usize,
        sim: &SimulationConfig,
    ) -> Result<Prediction> {
        self.engine.predict_next_n(n_games, n_simulations, sim)
    }

    /// Posterior probability that the true win rate exceeds `target`.
    pub fn confidence_above(&self, target: f64) -> Result<f64> {
        if !(target > 0.0 && target < 1.0) {
            return Err(Error::InvalidConfidence { confidence: target });
        }
        Ok(self.engine.probability_above(target))
    }

    /// Drop all sessions and reset the engine to its prior.
    pub fn reset(&mut self) {
        self.sessions.clear();
        self.engine.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_default_session_names() {
        let mut log = SessionLog::default();
        log.add_session(15, 10, None).unwrap();
        log.add_session(20, 15, Some("evening")).unwrap();
        log.add_session(1, 1, None).unwrap();
        let names: Vec<&str> = log.sessions().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Session 1", "evening", "Session 3"]);
    }

    #[test]
    fn test_empty_session_rate_is_zero() {
        let mut log = SessionLog::default();
        let rec = log.add_session(0, 0, None).unwrap();
        assert_eq!(rec.win_rate, 0.0);
    }

    #[test]
    fn test_invalid_session_is_not_recorded() {
        let mut log = SessionLog::default();
        assert!(log.add_session(-1, 3, None).is_err());
        assert!(log.sessions().is_empty());
        assert!(log.engine().history().is_empty());
    }

    #[test]
    fn test_overall_stats() {
        let mut log = SessionLog::default();
        log.add_session(15, 10, None).unwrap();
        log.add_session(20, 15, None).unwrap();
        let stats = log.overall_stats();
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.total_games, 60);
        assert_eq!(stats.total_wins, 35);
        assert!(approx_eq(stats.simple_win_rate, 35.0 / 60.0, 1e-12));
        assert!(approx_eq(stats.bayesian_win_rate, 36.0 / 62.0, 1e-12));
        assert!(stats.credible_interval.0 < stats.bayesian_win_rate);
    }

    #[test]
    fn test_streak_probability() {
        let mut log = SessionLog::default();
        log.add_session(2, 0, None).unwrap();
        // Beta(3, 1) has mean 0.75.
        assert!(approx_eq(log.streak_probability(2), 0.5625, 1e-12));
        assert_eq!(log.streak_probability(0), 1.0);
    }

    #[test]
    fn test_break_even() {
        let log = SessionLog::default();
        let be = log.break_even(3.0, 1.0).unwrap();
        assert!(approx_eq(be.break_even_rate, 0.25, 1e-12));
        assert!(be.above_break_even);
        assert!(approx_eq(be.expected_value_per_game, 1.0, 1e-12));
        assert!(log.break_even(0.0, 1.0).is_err());
        assert!(log.break_even(1.0, -1.0).is_err());
    }

    #[test]
    fn test_confidence_above() {
        let log = SessionLog::default();
        assert!(approx_eq(log.confidence_above(0.25).unwrap(), 0.75, 1e-9));
        assert!(log.confidence_above(1.2).is_err());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut log = SessionLog::default();
        log.add_session(5, 1, None).unwrap();
        log.reset();
        assert!(log.sessions().is_empty());
        assert_eq!(log.overall_stats().total_games, 0);
        assert_eq!(log.engine().win_probability(), 0.5);
    }

    #[test]
    fn test_predict_future_delegates() {
        let mut log = SessionLog::default();
        log.add_session(8, 2, None).unwrap();
        let pred = log
            .predict_future(10, 500, &SimulationConfig::seeded(3))
            .unwrap();
        assert!(pred.max_wins <= 10);
        assert_eq!(pred.win_probability, log.engine().win_probability());
    }
}
