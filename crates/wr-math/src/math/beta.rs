//! Beta distribution kernels for win-probability posteriors.
//!
//! Provides PDF, CDF and the exact inverse CDF. The CDF is the regularized
//! incomplete beta function evaluated by Lentz's continued fraction
//! (Numerical Recipes `betacf`); the quantile inverts it by bisection, so it
//! stays exact for the skewed posteriors produced by small samples.
//!
//! Invalid parameters (NaN, non-positive shapes) yield NaN rather than
//! panicking; callers that need typed errors validate before calling.

use super::stable::log_beta;

const BETACF_MAX_ITERS: usize = 10_000;
const BETACF_EPS: f64 = 1.0e-15;
const BETACF_FPMIN: f64 = 1.0e-300;

const QUANTILE_MAX_ITERS: usize = 200;
const QUANTILE_X_TOL: f64 = 1.0e-15;

fn invalid_shape(alpha: f64, beta: f64) -> bool {
    alpha.is_nan() || beta.is_nan() || alpha <= 0.0 || beta <= 0.0
}

/// Mean of Beta(alpha, beta) = alpha / (alpha + beta).
pub fn beta_mean(alpha: f64, beta: f64) -> f64 {
    if invalid_shape(alpha, beta) {
        return f64::NAN;
    }
    alpha / (alpha + beta)
}

/// Variance of Beta(alpha, beta).
pub fn beta_var(alpha: f64, beta: f64) -> f64 {
    if invalid_shape(alpha, beta) {
        return f64::NAN;
    }
    let sum = alpha + beta;
    (alpha * beta) / (sum * sum * (sum + 1.0))
}

/// Log of the Beta PDF at x.
pub fn log_beta_pdf(x: f64, alpha: f64, beta: f64) -> f64 {
    if x.is_nan() || invalid_shape(alpha, beta) {
        return f64::NAN;
    }
    if !(0.0..=1.0).contains(&x) {
        return f64::NEG_INFINITY;
    }
    if x == 0.0 {
        return match alpha.partial_cmp(&1.0) {
            Some(std::cmp::Ordering::Less) => f64::INFINITY,
            Some(std::cmp::Ordering::Greater) => f64::NEG_INFINITY,
            _ => -log_beta(1.0, beta),
        };
    }
    if x == 1.0 {
        return match beta.partial_cmp(&1.0) {
            Some(std::cmp::Ordering::Less) => f64::INFINITY,
            Some(std::cmp::Ordering::Greater) => f64::NEG_INFINITY,
            _ => -log_beta(alpha, 1.0),
        };
    }
    (alpha - 1.0) * x.ln() + (beta - 1.0) * (-x).ln_1p() - log_beta(alpha, beta)
}

/// Beta PDF at x.
pub fn beta_pdf(x: f64, alpha: f64, beta: f64) -> f64 {
    let log_pdf = log_beta_pdf(x, alpha, beta);
    if log_pdf.is_nan() {
        return f64::NAN;
    }
    if log_pdf == f64::NEG_INFINITY {
        return 0.0;
    }
    log_pdf.exp()
}

/// Regularized incomplete beta function I_x(alpha, beta), i.e. the Beta CDF.
pub fn beta_cdf(x: f64, alpha: f64, beta: f64) -> f64 {
    if x.is_nan() || invalid_shape(alpha, beta) {
        return f64::NAN;
    }
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let log_front = alpha * x.ln() + beta * (-x).ln_1p() - log_beta(alpha, beta);
    let front = log_front.exp();
    // The continued fraction converges fastest below the mean-ish split point.
    let threshold = (alpha + 1.0) / (alpha + beta + 2.0);
    let cdf = if x < threshold {
        front * betacf(alpha, beta, x) / alpha
    } else {
        1.0 - front * betacf(beta, alpha, 1.0 - x) / beta
    };
    cdf.clamp(0.0, 1.0)
}

/// Inverse CDF (quantile) of Beta(alpha, beta).
///
/// Bisection on x against the exact CDF. `p` outside `(0, 1)` maps to the
/// support boundaries.
pub fn beta_inv_cdf(p: f64, alpha: f64, beta: f64) -> f64 {
    if p.is_nan() || invalid_shape(alpha, beta) {
        return f64::NAN;
    }
    if p <= 0.0 {
        return 0.0;
    }
    if p >= 1.0 {
        return 1.0;
    }

    let mut low = 0.0_f64;
    let mut high = 1.0_f64;
    for _ in 0..QUANTILE_MAX_ITERS {
        let mid = 0.5 * (low + high);
        let cdf = beta_cdf(mid, alpha, beta);
        if cdf.is_nan() {
            return f64::NAN;
        }
        if cdf < p {
            low = mid;
        } else {
            high = mid;
        }
        if high - low <= QUANTILE_X_TOL {
            break;
        }
    }
    0.5 * (low + high)
}

fn betacf(alpha: f64, beta: f64, x: f64) -> f64 {
    let qab = alpha + beta;
    let qap = alpha + 1.0;
    let qam = alpha - 1.0;
    let mut c = 1.0;
    let mut d = guard(1.0 - qab * x / qap);
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=BETACF_MAX_ITERS {
        let m_f = m as f64;
        let m2 = 2.0 * m_f;

        let aa = m_f * (beta - m_f) * x / ((qam + m2) * (alpha + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        h *= d * c;

        let aa = -(alpha + m_f) * (qab + m_f) * x / ((alpha + m2) * (qap + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        let del = d * c;
        h *= del;
        if (del - 1.0).abs() < BETACF_EPS {
            break;
        }
    }

    h
}

#[inline]
fn guard(v: f64) -> f64 {
    if v.abs() < BETACF_FPMIN {
        BETACF_FPMIN
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        (a - b).abs() <= tol
    }

    #[test]
    fn mean_and_var_match_closed_form() {
        assert!(approx_eq(beta_mean(61.0, 41.0), 61.0 / 102.0, 1e-12));
        assert!(approx_eq(beta_var(2.0, 5.0), 10.0 / 392.0, 1e-12));
    }

    #[test]
    fn invalid_shapes_are_nan() {
        assert!(beta_mean(0.0, 1.0).is_nan());
        assert!(beta_var(1.0, -2.0).is_nan());
        assert!(beta_cdf(0.5, f64::NAN, 1.0).is_nan());
        assert!(beta_inv_cdf(0.5, 1.0, 0.0).is_nan());
    }

    #[test]
    fn pdf_uniform_is_one() {
        assert!(approx_eq(beta_pdf(0.33, 1.0, 1.0), 1.0, 1e-12));
        assert!(approx_eq(beta_pdf(0.0, 1.0, 1.0), 1.0, 1e-12));
        assert!(approx_eq(beta_pdf(1.0, 1.0, 1.0), 1.0, 1e-12));
    }

    #[test]
    fn pdf_known_value_beta_2_5() {
        assert!(approx_eq(beta_pdf(0.2, 2.0, 5.0), 2.4576, 1e-9));
    }

    #[test]
    fn pdf_outside_support_is_zero() {
        assert_eq!(beta_pdf(-0.1, 2.0, 2.0), 0.0);
        assert_eq!(beta_pdf(1.1, 2.0, 2.0), 0.0);
    }

    #[test]
    fn pdf_boundary_divergence() {
        assert!(beta_pdf(0.0, 0.5, 2.0).is_infinite());
        assert_eq!(beta_pdf(1.0, 2.0, 3.0), 0.0);
    }

    #[test]
    fn cdf_uniform_is_identity() {
        for x in [0.1, 0.42, 0.9] {
            assert!(approx_eq(beta_cdf(x, 1.0, 1.0), x, 1e-12));
        }
    }

    #[test]
    fn cdf_beta_2_2_closed_form() {
        // I_x(2,2) = 3x^2 - 2x^3
        let x: f64 = 0.3;
        let expected = 3.0 * x.powi(2) - 2.0 * x.powi(3);
        assert!(approx_eq(beta_cdf(x, 2.0, 2.0), expected, 1e-12));
    }

    #[test]
    fn cdf_monotone() {
        assert!(beta_cdf(0.2, 2.0, 5.0) < beta_cdf(0.7, 2.0, 5.0));
    }

    #[test]
    fn inv_cdf_uniform() {
        assert!(approx_eq(beta_inv_cdf(0.73, 1.0, 1.0), 0.73, 1e-12));
    }

    #[test]
    fn inv_cdf_inverts_cdf_on_skewed_posterior() {
        // Few observations: Beta(2, 9) is strongly right-skewed.
        for p in [0.025, 0.5, 0.975] {
            let x = beta_inv_cdf(p, 2.0, 9.0);
            assert!(approx_eq(beta_cdf(x, 2.0, 9.0), p, 1e-10));
        }
    }

    #[test]
    fn inv_cdf_symmetric_posterior_median() {
        let median = beta_inv_cdf(0.5, 51.0, 51.0);
        assert!(approx_eq(median, 0.5, 1e-12));
    }

    #[test]
    fn inv_cdf_large_counts() {
        let (a, b) = (6_001.0, 4_001.0);
        let lower = beta_inv_cdf(0.025, a, b);
        let upper = beta_inv_cdf(0.975, a, b);
        let mean = beta_mean(a, b);
        assert!(lower < mean && mean < upper);
        assert!(upper - lower < 0.02);
    }
}
