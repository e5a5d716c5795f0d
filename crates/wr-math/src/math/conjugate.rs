//! Beta-Binomial conjugate model for win/loss records.
//!
//! - Prior: `p ~ Beta(α, β)`
//! - Likelihood: `wins | p ~ Binomial(wins + losses, p)`
//! - Posterior: `p | data ~ Beta(α + wins, β + losses)`
//!
//! Future game counts follow the Beta-Binomial predictive distribution.

use serde::{Deserialize, Serialize};

use super::beta::{beta_cdf, beta_inv_cdf, beta_pdf};
use super::stable::{log_beta, log_choose};

/// Shape parameters of a Beta distribution over the win probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaParams {
    /// Prior pseudo-wins plus observed wins.
    pub alpha: f64,
    /// Prior pseudo-losses plus observed losses.
    pub beta: f64,
}

impl BetaParams {
    /// Create new Beta parameters with validation.
    ///
    /// Returns None if either shape is non-positive, infinite or NaN.
    pub fn new(alpha: f64, beta: f64) -> Option<Self> {
        if !alpha.is_finite() || !beta.is_finite() || alpha <= 0.0 || beta <= 0.0 {
            return None;
        }
        Some(Self { alpha, beta })
    }

    /// Beta(1, 1), the uniform prior.
    pub fn uniform() -> Self {
        Self {
            alpha: 1.0,
            beta: 1.0,
        }
    }

    /// E[p] = α / (α + β).
    pub fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    /// Var[p] = αβ / ((α+β)²(α+β+1)).
    pub fn variance(&self) -> f64 {
        let sum = self.alpha + self.beta;
        (self.alpha * self.beta) / (sum * sum * (sum + 1.0))
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Total pseudo-count α + β.
    pub fn effective_sample_size(&self) -> f64 {
        self.alpha + self.beta
    }

    /// Posterior after adding `wins` and `losses` to the shapes.
    pub fn updated(&self, wins: f64, losses: f64) -> Self {
        Self {
            alpha: self.alpha + wins,
            beta: self.beta + losses,
        }
    }

    pub fn pdf(&self, x: f64) -> f64 {
        beta_pdf(x, self.alpha, self.beta)
    }

    pub fn cdf(&self, x: f64) -> f64 {
        beta_cdf(x, self.alpha, self.beta)
    }

    pub fn quantile(&self, p: f64) -> f64 {
        beta_inv_cdf(p, self.alpha, self.beta)
    }

    /// Equal-tailed credible interval at `level`.
    ///
    /// Returns `(NaN, NaN)` unless `0 < level < 1`.
    pub fn credible_interval(&self, level: f64) -> (f64, f64) {
        if level.is_nan() || level <= 0.0 || level >= 1.0 {
            return (f64::NAN, f64::NAN);
        }
        let tail = (1.0 - level) / 2.0;
        (self.quantile(tail), self.quantile(1.0 - tail))
    }
}

impl Default for BetaParams {
    fn default() -> Self {
        Self::uniform()
    }
}

/// Log PMF of the Beta-Binomial predictive: P(k wins in n future games).
///
/// P(k | n) = C(n, k) · B(α + k, β + n - k) / B(α, β)
pub fn log_predictive_pmf(posterior: &BetaParams, k: f64, n: f64) -> f64 {
    if k.is_nan() || n.is_nan() {
        return f64::NAN;
    }
    if k < 0.0 || n < 0.0 || k > n {
        return f64::NEG_INFINITY;
    }
    log_choose(n, k) + log_beta(posterior.alpha + k, posterior.beta + (n - k))
        - log_beta(posterior.alpha, posterior.beta)
}

/// E[k | n] = n · α / (α + β).
pub fn predictive_count_mean(posterior: &BetaParams, n: f64) -> f64 {
    n * posterior.mean()
}

/// Var[k | n] = n · (αβ / (α+β)²) · ((α+β+n) / (α+β+1)).
pub fn predictive_count_variance(posterior: &BetaParams, n: f64) -> f64 {
    let sum = posterior.alpha + posterior.beta;
    n * (posterior.alpha * posterior.beta / (sum * sum)) * ((sum + n) / (sum + 1.0))
}
