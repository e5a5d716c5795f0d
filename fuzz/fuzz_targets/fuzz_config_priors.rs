//! Fuzz target for priors.json parsing and validation.
//!
//! Arbitrary bytes must produce a value or an error, never a panic. Anything
//! that validates must describe a usable Beta prior.

#![no_main]

use libfuzzer_sys::fuzz_target;
use wr_config::priors::Priors;
use wr_config::validate::validate_priors;

fuzz_target!(|data: &[u8]| {
    let Ok(priors) = serde_json::from_slice::<Priors>(data) else {
        return;
    };
    if validate_priors(&priors).is_ok() {
        assert!(priors.prior_alpha > 0.0 && priors.prior_alpha.is_finite());
        assert!(priors.prior_beta > 0.0 && priors.prior_beta.is_finite());
        let mean = priors.prior_mean();
        assert!((0.0..=1.0).contains(&mean));
    }
});
