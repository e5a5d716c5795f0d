//! Fuzz target for policy.json parsing and validation.

#![no_main]

use libfuzzer_sys::fuzz_target;
use wr_config::policy::Policy;
use wr_config::validate::validate_policy;

fuzz_target!(|data: &[u8]| {
    let Ok(policy) = serde_json::from_slice::<Policy>(data) else {
        return;
    };
    if validate_policy(&policy).is_ok() {
        assert!(policy.credible_level > 0.0 && policy.credible_level < 1.0);
        assert!(policy.simulation.ruin_trials > 0);
        let k = &policy.kelly_tiers;
        assert!(k.moderate < k.significant && k.significant < k.strong);
    }
});
