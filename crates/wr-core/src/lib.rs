//! Winrate Analyzer Core Library
//!
//! This library provides the core functionality of the analyzer:
//! - Posterior engine over an unknown win probability
//! - Stake advisor (Kelly sizing, ruin risk, expected value)
//! - Seeded, chunked Monte Carlo runner
//! - Session bookkeeping
//! - Report rendering, logging and exit codes for the CLI
//!
//! The binary entry point is in `main.rs`.

pub mod advisor;
pub mod advisory;
pub mod engine;
pub mod exit_codes;
pub mod logging;
pub mod output;
pub mod session;
pub mod simulate;

pub use advisor::{InvestmentReport, StakeAdvisor};
pub use engine::PosteriorEngine;
pub use session::SessionLog;
pub use simulate::SimulationConfig;
