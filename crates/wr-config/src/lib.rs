//! Winrate analyzer configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for priors.json and policy.json
//! - Config resolution (CLI → env → XDG → /etc → defaults)
//! - Semantic validation
//! - Config snapshots recording which files produced a report

pub mod load;
pub mod policy;
pub mod priors;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use load::{load_config, ConfigError, ConfigKind, LoadedConfig};
pub use policy::{EvTiers, KellyTiers, Policy, RiskTiers, SimulationPolicy};
pub use priors::Priors;
pub use resolve::{resolve_config, ConfigPaths, ConfigSource};
pub use snapshot::ConfigSnapshot;
pub use validate::{ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = wr_common::SCHEMA_VERSION;
