//! Fuzz target for the Beta quantile and its CDF inversion.
//!
//! For any valid shape and probability the quantile stays in [0, 1] and the
//! CDF maps it back close to the requested probability.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use wr_math::{beta_cdf, beta_inv_cdf};

#[derive(Debug, Arbitrary)]
struct Input {
    alpha: f64,
    beta: f64,
    p: f64,
}

fuzz_target!(|input: Input| {
    let Input { alpha, beta, p } = input;
    let q = beta_inv_cdf(p, alpha, beta);

    let valid_shape = alpha.is_finite() && beta.is_finite() && alpha > 0.0 && beta > 0.0;
    if !valid_shape || !(0.0..=1.0).contains(&p) {
        return;
    }
    assert!((0.0..=1.0).contains(&q), "q={q} for p={p} a={alpha} b={beta}");

    // Round-trip only where the shape is numerically tame.
    if (0.5..=500.0).contains(&alpha)
        && (0.5..=500.0).contains(&beta)
        && (1e-3..=0.999).contains(&p)
    {
        let back = beta_cdf(q, alpha, beta);
        assert!((back - p).abs() < 1e-6, "p={p} back={back} a={alpha} b={beta}");
    }
});
