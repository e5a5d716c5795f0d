//! Winrate analyzer common types and errors.
//!
//! This crate provides the foundational types shared across the workspace:
//! - The error taxonomy with stable codes
//! - CLI output formats

pub mod error;
pub mod output;

pub use error::{format_error_human, Error, ErrorCategory, Result, StructuredError, SuggestedAction};
pub use output::OutputFormat;

/// Version stamp carried by config files and JSON reports.
pub const SCHEMA_VERSION: &str = "1.0.0";
