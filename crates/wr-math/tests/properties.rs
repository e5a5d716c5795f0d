//! Property-based tests for wr-math numerical functions.
//!
//! Uses proptest to verify mathematical properties hold across many random inputs.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use wr_math::conjugate::log_predictive_pmf;
use wr_math::{beta_cdf, beta_inv_cdf, log_gamma, sample, summarize_counts, BetaParams};

/// Extended tolerance for log_gamma where Lanczos approximation has some error.
const LGAMMA_TOL: f64 = 1e-8;

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    if a.is_nan() || b.is_nan() {
        return false;
    }
    (a - b).abs() <= tol.max(tol * a.abs().max(b.abs()))
}

// ============================================================================
// Special functions
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Gamma(x+1) = x Gamma(x).
    #[test]
    fn log_gamma_recurrence(x in 0.01..200.0f64) {
        let lhs = log_gamma(x + 1.0);
        let rhs = log_gamma(x) + x.ln();
        prop_assert!(approx_eq(lhs, rhs, LGAMMA_TOL), "x={} lhs={} rhs={}", x, lhs, rhs);
    }
}

// ============================================================================
// Beta CDF / quantile
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// The quantile is the exact inverse of the CDF.
    #[test]
    fn quantile_inverts_cdf(a in 0.5..500.0f64, b in 0.5..500.0f64, p in 0.001..0.999f64) {
        let x = beta_inv_cdf(p, a, b);
        prop_assert!((0.0..=1.0).contains(&x));
        let back = beta_cdf(x, a, b);
        prop_assert!((back - p).abs() < 1e-9, "a={} b={} p={} x={} cdf={}", a, b, p, x, back);
    }

    /// CDF is non-decreasing in x.
    #[test]
    fn cdf_monotone(a in 0.5..100.0f64, b in 0.5..100.0f64, x1 in 0.0..1.0f64, x2 in 0.0..1.0f64) {
        let (lo, hi) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        prop_assert!(beta_cdf(lo, a, b) <= beta_cdf(hi, a, b) + 1e-12);
    }

    /// Wider credible levels give nested intervals.
    #[test]
    fn credible_intervals_nest(
        wins in 0u32..500,
        losses in 0u32..500,
        l1 in 0.05..0.99f64,
        l2 in 0.05..0.99f64,
    ) {
        let post = BetaParams::uniform().updated(wins as f64, losses as f64);
        let (narrow, wide) = if l1 <= l2 { (l1, l2) } else { (l2, l1) };
        let (n_lo, n_hi) = post.credible_interval(narrow);
        let (w_lo, w_hi) = post.credible_interval(wide);
        prop_assert!(n_lo <= n_hi);
        prop_assert!(w_lo <= n_lo + 1e-12 && n_hi <= w_hi + 1e-12);
    }
}

// ============================================================================
// Conjugate update
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// The posterior mean lies between the prior mean and the observed rate.
    #[test]
    fn posterior_mean_shrinks_toward_prior(
        alpha in 0.5..50.0f64,
        beta in 0.5..50.0f64,
        wins in 0u32..1000,
        losses in 0u32..1000,
    ) {
        prop_assume!(wins + losses > 0);
        let prior = BetaParams::new(alpha, beta).unwrap();
        let post = prior.updated(wins as f64, losses as f64);
        let observed = wins as f64 / (wins + losses) as f64;
        let (lo, hi) = if prior.mean() <= observed {
            (prior.mean(), observed)
        } else {
            (observed, prior.mean())
        };
        prop_assert!(post.mean() >= lo - 1e-12 && post.mean() <= hi + 1e-12);
    }

    /// Beta-Binomial predictive PMF sums to one.
    #[test]
    fn predictive_pmf_normalized(alpha in 0.5..50.0f64, beta in 0.5..50.0f64, n in 0u32..40) {
        let post = BetaParams::new(alpha, beta).unwrap();
        let total: f64 = (0..=n)
            .map(|k| log_predictive_pmf(&post, k as f64, n as f64).exp())
            .sum();
        prop_assert!(approx_eq(total, 1.0, 1e-8), "total={}", total);
    }
}

// ============================================================================
// Samplers and summaries
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn binomial_within_trials(seed in any::<u64>(), n in 0u64..5_000, p in 0.0..=1.0f64) {
        let mut rng = StdRng::seed_from_u64(seed);
        prop_assert!(sample::binomial(&mut rng, n, p) <= n);
    }

    #[test]
    fn beta_draw_in_support(seed in any::<u64>(), a in 0.05..1000.0f64, b in 0.05..1000.0f64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let x = sample::beta(&mut rng, a, b);
        prop_assert!((0.0..=1.0).contains(&x));
    }

    #[test]
    fn summary_is_ordered(samples in prop::collection::vec(0u64..10_000, 1..200)) {
        let s = summarize_counts(&samples).unwrap();
        let (min, max) = (s.min as f64, s.max as f64);
        prop_assert!(min <= s.median && s.median <= max);
        prop_assert!(min <= s.mean + 1e-9 && s.mean <= max + 1e-9);
        prop_assert!(s.std_dev >= 0.0);
        prop_assert_eq!(s.count, samples.len());
    }
}
