//! Posterior engine: Beta-Binomial belief over a fixed win probability.
//!
//! Observing `w` wins and `l` losses maps `Beta(α, β)` to `Beta(α + w, β + l)`.
//! The prior is fixed at construction; the posterior only grows until an
//! explicit [`PosteriorEngine::reset`].

use rand::rngs::StdRng;
use rand::Rng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use wr_common::{Error, Result};
use wr_config::Priors;
use wr_math::conjugate::{predictive_count_mean, predictive_count_variance};
use wr_math::{sample, summarize_counts, BetaParams};

use crate::log_event;
use crate::logging::{event_names, Stage};
use crate::simulate::{run_chunked, SimulationConfig};

/// Credible level used by [`PosteriorEngine::summary`].
pub const SUMMARY_CREDIBLE_LEVEL: f64 = 0.95;

/// One `update` call, with the posterior it produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UpdateRecord {
    pub wins: u64,
    pub losses: u64,
    pub alpha_after: f64,
    pub beta_after: f64,
}

/// Posterior-predictive summary of win counts over the next `n_games`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Prediction {
    pub n_games: u64,
    pub n_simulations: usize,
    pub expected_wins: f64,
    pub median_wins: f64,
    /// Population standard deviation of the simulated counts.
    pub std_wins: f64,
    pub min_wins: u64,
    pub max_wins: u64,
    /// Posterior mean, not the simulated mean.
    pub win_probability: f64,
}

/// Closed-form Beta-Binomial predictive moments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PredictiveMoments {
    pub n_games: u64,
    pub mean: f64,
    pub variance: f64,
}

/// Read-only view of the current belief.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PosteriorSummary {
    pub total_games: u64,
    pub wins: u64,
    pub losses: u64,
    pub win_probability: f64,
    /// 95% equal-tailed interval.
    pub credible_interval: (f64, f64),
    pub posterior_alpha: f64,
    pub posterior_beta: f64,
    pub posterior_std: f64,
}

#[derive(Debug, Clone)]
pub struct PosteriorEngine {
    prior: BetaParams,
    posterior: BetaParams,
    wins: u64,
    losses: u64,
    history: Vec<UpdateRecord>,
}

impl Default for PosteriorEngine {
    fn default() -> Self {
        Self::with_prior(BetaParams::uniform())
    }
}

impl PosteriorEngine {
    /// Engine with prior `Beta(prior_alpha, prior_beta)`.
    ///
    /// Fails with `InvalidPrior` unless both are positive and finite.
    pub fn new(prior_alpha: f64, prior_beta: f64) -> Result<Self> {
        let prior = BetaParams::new(prior_alpha, prior_beta).ok_or(Error::InvalidPrior {
            alpha: prior_alpha,
            beta: prior_beta,
        })?;
        log_event!(
            DEBUG,
            event_names::ENGINE_CREATED,
            Stage::Init,
            "posterior engine created",
            prior_alpha = prior_alpha,
            prior_beta = prior_beta
        );
        Ok(Self::with_prior(prior))
    }

    pub fn from_priors(priors: &Priors) -> Result<Self> {
        Self::new(priors.prior_alpha, priors.prior_beta)
    }

    fn with_prior(prior: BetaParams) -> Self {
        PosteriorEngine {
            prior,
            posterior: prior,
            wins: 0,
            losses: 0,
            history: Vec::new(),
        }
    }

    pub fn prior(&self) -> BetaParams {
        self.prior
    }

    pub fn posterior(&self) -> BetaParams {
        self.posterior
    }

    /// Cumulative wins since the prior.
    pub fn wins(&self) -> u64 {
        self.wins
    }

    /// Cumulative losses since the prior.
    pub fn losses(&self) -> u64 {
        self.losses
    }

    pub fn history(&self) -> &[UpdateRecord] {
        &self.history
    }

    /// Add observed wins and losses.
    ///
    /// Both counts are validated before anything changes, so a failed call
    /// leaves the posterior and history untouched.
    pub fn update(&mut self, wins: i64, losses: i64) -> Result<()> {
        let (w, l) = match (u64::try_from(wins), u64::try_from(losses)) {
            (Ok(w), Ok(l)) => (w, l),
            _ => return Err(Error::InvalidObservation { wins, losses }),
        };

        self.posterior = self.posterior.updated(w as f64, l as f64);
        self.wins = self.wins.saturating_add(w);
        self.losses = self.losses.saturating_add(l);
        self.history.push(UpdateRecord {
            wins: w,
            losses: l,
            alpha_after: self.posterior.alpha,
            beta_after: self.posterior.beta,
        });

        log_event!(
            DEBUG,
            event_names::ENGINE_UPDATED,
            Stage::Ingest,
            "posterior updated",
            wins = w,
            losses = l,
            alpha = self.posterior.alpha,
            beta = self.posterior.beta
        );
        Ok(())
    }

    /// Posterior mean `α / (α + β)`.
    pub fn win_probability(&self) -> f64 {
        self.posterior.mean()
    }

    /// Equal-tailed interval from the exact Beta quantile.
    pub fn credible_interval(&self, confidence: f64) -> Result<(f64, f64)> {
        if !(confidence > 0.0 && confidence < 1.0) {
            return Err(Error::InvalidConfidence { confidence });
        }
        Ok(self.posterior.credible_interval(confidence))
    }

    /// `P(p > target)` under the posterior.
    pub fn probability_above(&self, target: f64) -> f64 {
        if target.is_nan() {
            return f64::NAN;
        }
        1.0 - self.posterior.cdf(target.clamp(0.0, 1.0))
    }

    /// `n_points` evenly spaced `(x, pdf(x))` pairs over `[0, 1]`.
    ///
    /// The iterator snapshots the current posterior; clone it to replay.
    pub fn probability_density(&self, n_points: usize) -> DensityPoints {
        DensityPoints {
            params: self.posterior,
            n_points,
            next: 0,
        }
    }

    /// Posterior-predictive simulation of wins over the next `n_games`.
    ///
    /// Each simulation draws `p ~ Beta(α, β)` and then `k ~ Binomial(n, p)`.
    pub fn predict_next_n(
        &self,
        n_games: u64,
        n_simulations: usize,
        sim: &SimulationConfig,
    ) -> Result<Prediction> {
        check_simulations(n_simulations)?;
        let params = self.posterior;
        let chunks = run_chunked(sim, n_simulations, |rng: &mut StdRng, len| {
            draw_predictive(rng, &params, n_games, len)
        })?;
        let counts: Vec<u64> = chunks.into_iter().flatten().collect();
        self.prediction_from(n_games, &counts)
    }

    /// Single-threaded [`predict_next_n`](Self::predict_next_n) over an
    /// injected random source.
    pub fn predict_next_n_with<R: Rng + ?Sized>(
        &self,
        n_games: u64,
        n_simulations: usize,
        rng: &mut R,
    ) -> Result<Prediction> {
        check_simulations(n_simulations)?;
        let counts = draw_predictive(rng, &self.posterior, n_games, n_simulations);
        self.prediction_from(n_games, &counts)
    }

    fn prediction_from(&self, n_games: u64, counts: &[u64]) -> Result<Prediction> {
        let stats = summarize_counts(counts)
            .ok_or_else(|| Error::InvalidSimulation("no simulated outcomes".to_string()))?;
        let prediction = Prediction {
            n_games,
            n_simulations: stats.count,
            expected_wins: stats.mean,
            median_wins: stats.median,
            std_wins: stats.std_dev,
            min_wins: stats.min,
            max_wins: stats.max,
            win_probability: self.win_probability(),
        };
        log_event!(
            DEBUG,
            event_names::INFER_PREDICTED,
            Stage::Infer,
            "posterior predictive simulated",
            n_games = n_games,
            n_simulations = stats.count as u64,
            expected_wins = prediction.expected_wins
        );
        Ok(prediction)
    }

    /// Analytic mean and variance of future wins.
    pub fn predictive_moments(&self, n_games: u64) -> PredictiveMoments {
        let n = n_games as f64;
        PredictiveMoments {
            n_games,
            mean: predictive_count_mean(&self.posterior, n),
            variance: predictive_count_variance(&self.posterior, n),
        }
    }

    /// Restore the prior and clear history. Idempotent.
    pub fn reset(&mut self) {
        self.posterior = self.prior;
        self.wins = 0;
        self.losses = 0;
        self.history.clear();
        log_event!(
            DEBUG,
            event_names::ENGINE_RESET,
            Stage::Ingest,
            "posterior reset to prior"
        );
    }

    pub fn summary(&self) -> PosteriorSummary {
        PosteriorSummary {
            total_games: self.wins.saturating_add(self.losses),
            wins: self.wins,
            losses: self.losses,
            win_probability: self.win_probability(),
            credible_interval: self.posterior.credible_interval(SUMMARY_CREDIBLE_LEVEL),
            posterior_alpha: self.posterior.alpha,
            posterior_beta: self.posterior.beta,
            posterior_std: self.posterior.std_dev(),
        }
    }
}

fn check_simulations(n_simulations: usize) -> Result<()> {
    if n_simulations == 0 {
        return Err(Error::InvalidSimulation(
            "n_simulations must be positive".to_string(),
        ));
    }
    Ok(())
}

fn draw_predictive<R: Rng + ?Sized>(
    rng: &mut R,
    params: &BetaParams,
    n_games: u64,
    len: usize,
) -> Vec<u64> {
    (0..len)
        .map(|_| {
            let p = sample::beta(rng, params.alpha, params.beta);
            sample::binomial(rng, n_games, p)
        })
        .collect()
}

/// Lazy grid of `(x, density)` points; see
/// [`PosteriorEngine::probability_density`].
#[derive(Debug, Clone)]
pub struct DensityPoints {
    params: BetaParams,
    n_points: usize,
    next: usize,
}

impl Iterator for DensityPoints {
    type Item = (f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.n_points {
            return None;
        }
        let x = if self.n_points == 1 {
            0.0
        } else {
            self.next as f64 / (self.n_points - 1) as f64
        };
        self.next += 1;
        Some((x, self.params.pdf(x)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.n_points - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DensityPoints {}
