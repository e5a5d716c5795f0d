//! Random variate generators driven by a caller-supplied RNG.
//!
//! All samplers are exact (no normal approximations), so Monte Carlo results
//! depend only on the RNG stream. Callers own seeding.

use std::f64::consts::PI;

use rand::Rng;

/// Binomial draws with `n` at or below this are counted directly.
const BINOMIAL_DIRECT_MAX: u64 = 64;

/// Uniform draw on (0, 1].
#[inline]
fn open_unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    1.0 - rng.random::<f64>()
}

/// Standard normal via Box-Muller.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1 = open_unit(rng);
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Gamma(shape, 1) via Marsaglia-Tsang.
///
/// Shapes below one are boosted: `Gamma(k) = Gamma(k + 1) · U^(1/k)`.
/// Returns NaN for non-positive or non-finite shapes.
pub fn gamma<R: Rng + ?Sized>(rng: &mut R, shape: f64) -> f64 {
    if !shape.is_finite() || shape <= 0.0 {
        return f64::NAN;
    }
    if shape < 1.0 {
        let boost = open_unit(rng).powf(1.0 / shape);
        return gamma(rng, shape + 1.0) * boost;
    }

    let d = shape - 1.0 / 3.0;
    let c = 1.0 / (9.0 * d).sqrt();
    loop {
        let x = standard_normal(rng);
        let t = 1.0 + c * x;
        if t <= 0.0 {
            continue;
        }
        let v = t * t * t;
        let u = open_unit(rng);
        if u.ln() < 0.5 * x * x + d - d * v + d * v.ln() {
            return d * v;
        }
    }
}

/// Beta(alpha, beta) as the ratio of two Gamma draws.
pub fn beta<R: Rng + ?Sized>(rng: &mut R, alpha: f64, beta: f64) -> f64 {
    let x = gamma(rng, alpha);
    let y = gamma(rng, beta);
    if x.is_nan() || y.is_nan() {
        return f64::NAN;
    }
    let sum = x + y;
    if sum <= 0.0 {
        // Both draws underflowed; tiny shapes put all mass at the endpoints.
        return if rng.random::<f64>() < alpha / (alpha + beta) {
            1.0
        } else {
            0.0
        };
    }
    x / sum
}

/// Binomial(n, p) count of successes.
///
/// Large `n` is reduced by order-statistic splitting: the median uniform of
/// the `n` trials is a Beta draw, and only the side containing `p` needs
/// further sampling. Small remainders are counted trial by trial.
pub fn binomial<R: Rng + ?Sized>(rng: &mut R, n: u64, p: f64) -> u64 {
    if n == 0 || p.is_nan() || p <= 0.0 {
        return 0;
    }
    if p >= 1.0 {
        return n;
    }

    let mut successes = 0u64;
    let mut remaining = n;
    let mut prob = p;
    while remaining > BINOMIAL_DIRECT_MAX {
        let a = remaining / 2 + 1;
        let b = remaining + 1 - a;
        let split = beta(rng, a as f64, b as f64);
        if split >= prob {
            remaining = a - 1;
            prob /= split;
        } else {
            successes += a;
            remaining = b - 1;
            prob = (prob - split) / (1.0 - split);
        }
    }

    successes
        + (0..remaining)
            .filter(|_| rng.random::<f64>() < prob)
            .count() as u64
}
