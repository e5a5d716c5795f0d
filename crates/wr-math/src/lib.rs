//! Winrate analyzer math utilities.

pub mod math;

pub use math::beta::*;
pub use math::conjugate::{self, BetaParams};
pub use math::sample;
pub use math::stable::*;
pub use math::summary::{summarize_counts, SampleSummary};
