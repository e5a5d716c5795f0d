//! Error types for the winrate analyzer.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Remediation suggestions for humans
//! - Suggested actions for agents
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Invalid Odds
//!   Reason: invalid odds 0: win odds must be positive
//!   Fix: Pass the payout multiple on a win, e.g. '--odds 2.0' for even money.
//! ```
//!
//! # Agent-Facing Output
//!
//! ```json
//! {
//!   "code": 13,
//!   "category": "input",
//!   "message": "invalid odds 0: win odds must be positive",
//!   "recoverable": true,
//!   "suggested_action": "fix_input",
//!   "context": { "odds": 0.0 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for winrate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Caller-supplied values outside their domain.
    Input,
    /// Priors/policy file errors.
    Config,
    /// Monte Carlo setup errors.
    Simulation,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Simulation => write!(f, "simulation"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Suggested actions for agents to take in response to errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    /// Correct the offending argument and call again.
    FixInput,
    /// Run `winrate config check`.
    RunCheck,
    /// Remove the config file to fall back to defaults.
    ResetConfig,
    /// Retry the operation.
    Retry,
    /// Manual intervention required.
    ManualIntervention,
}

impl std::fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestedAction::FixInput => write!(f, "fix_input"),
            SuggestedAction::RunCheck => write!(f, "run_check"),
            SuggestedAction::ResetConfig => write!(f, "reset_config"),
            SuggestedAction::Retry => write!(f, "retry"),
            SuggestedAction::ManualIntervention => write!(f, "manual_intervention"),
        }
    }
}

/// Unified error type for the winrate analyzer.
#[derive(Error, Debug)]
pub enum Error {
    // Input errors (10-19)
    #[error("invalid prior Beta({alpha}, {beta}): both parameters must be positive and finite")]
    InvalidPrior { alpha: f64, beta: f64 },

    #[error("invalid observation ({wins} wins, {losses} losses): counts must be non-negative")]
    InvalidObservation { wins: i64, losses: i64 },

    #[error("invalid confidence {confidence}: must lie strictly between 0 and 1")]
    InvalidConfidence { confidence: f64 },

    #[error("invalid odds {odds}: win odds must be positive")]
    InvalidOdds { odds: f64 },

    #[error("invalid bankroll {bankroll}: must be positive")]
    InvalidBankroll { bankroll: f64 },

    #[error("invalid bet size {bet_size}: must be positive")]
    InvalidBetSize { bet_size: f64 },

    // Configuration errors (20-29)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid priors file: {0}")]
    InvalidPriors(String),

    #[error("invalid policy file: {0}")]
    InvalidPolicy(String),

    // Simulation errors (30-39)
    #[error("invalid simulation setup: {0}")]
    InvalidSimulation(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Input errors
    /// - 20-29: Configuration errors
    /// - 30-39: Simulation errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidPrior { .. } => 10,
            Error::InvalidObservation { .. } => 11,
            Error::InvalidConfidence { .. } => 12,
            Error::InvalidOdds { .. } => 13,
            Error::InvalidBankroll { .. } => 14,
            Error::InvalidBetSize { .. } => 15,
            Error::Config(_) => 20,
            Error::InvalidPriors(_) => 21,
            Error::InvalidPolicy(_) => 22,
            Error::InvalidSimulation(_) => 30,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidPrior { .. }
            | Error::InvalidObservation { .. }
            | Error::InvalidConfidence { .. }
            | Error::InvalidOdds { .. }
            | Error::InvalidBankroll { .. }
            | Error::InvalidBetSize { .. } => ErrorCategory::Input,

            Error::Config(_) | Error::InvalidPriors(_) | Error::InvalidPolicy(_) => {
                ErrorCategory::Config
            }

            Error::InvalidSimulation(_) => ErrorCategory::Simulation,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable.
    ///
    /// Every variant is a local failure raised before any state changes, so
    /// correcting the input or config and retrying always makes progress.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::Json(_))
    }

    /// Returns the suggested action for agents.
    pub fn suggested_action(&self) -> SuggestedAction {
        match self {
            Error::InvalidPrior { .. }
            | Error::InvalidObservation { .. }
            | Error::InvalidConfidence { .. }
            | Error::InvalidOdds { .. }
            | Error::InvalidBankroll { .. }
            | Error::InvalidBetSize { .. }
            | Error::InvalidSimulation(_) => SuggestedAction::FixInput,

            Error::Config(_) => SuggestedAction::RunCheck,
            Error::InvalidPriors(_) | Error::InvalidPolicy(_) => SuggestedAction::ResetConfig,

            Error::Io(_) => SuggestedAction::Retry,
            Error::Json(_) => SuggestedAction::ManualIntervention,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::InvalidPrior { .. } => {
                "Use positive prior parameters, e.g. Beta(1, 1) for a uniform prior or Beta(0.5, 0.5) for Jeffreys."
            }
            Error::InvalidObservation { .. } => {
                "Win and loss counts are tallies of games; pass zero or a positive whole number."
            }
            Error::InvalidConfidence { .. } => {
                "Pass a credible level such as 0.95 (strictly between 0 and 1)."
            }
            Error::InvalidOdds { .. } => {
                "Pass the payout multiple on a win, e.g. '--odds 2.0' for even money."
            }
            Error::InvalidBankroll { .. } => "Pass a positive bankroll, e.g. '--bankroll 1000'.",
            Error::InvalidBetSize { .. } => {
                "Pass a positive stake. A stake of zero means no bet; nothing needs simulating."
            }

            Error::Config(_) => {
                "Run 'winrate config check' to see which files are loaded and what is wrong with them."
            }
            Error::InvalidPriors(_) => {
                "Run 'winrate config check', or delete priors.json to fall back to the uniform prior."
            }
            Error::InvalidPolicy(_) => {
                "Run 'winrate config check', or delete policy.json to fall back to the built-in thresholds."
            }

            Error::InvalidSimulation(_) => {
                "Use at least one trial and one simulation; check '--workers' and the policy simulation table."
            }

            Error::Io(_) => "Check that the path exists and is readable, then retry.",
            Error::Json(_) => {
                "Invalid JSON in file. Check syntax with 'jq . <file>' or restore from backup."
            }
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::InvalidPrior { .. } => "Invalid Prior",
            Error::InvalidObservation { .. } => "Invalid Observation",
            Error::InvalidConfidence { .. } => "Invalid Confidence Level",
            Error::InvalidOdds { .. } => "Invalid Odds",
            Error::InvalidBankroll { .. } => "Invalid Bankroll",
            Error::InvalidBetSize { .. } => "Invalid Bet Size",
            Error::Config(_) => "Configuration Error",
            Error::InvalidPriors(_) => "Invalid Priors Configuration",
            Error::InvalidPolicy(_) => "Invalid Policy Configuration",
            Error::InvalidSimulation(_) => "Invalid Simulation Setup",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Suggested action for agents.
    pub suggested_action: SuggestedAction,

    /// Offending values, keyed by argument name.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::InvalidPrior { alpha, beta } => {
                context.insert("alpha".to_string(), serde_json::json!(alpha));
                context.insert("beta".to_string(), serde_json::json!(beta));
            }
            Error::InvalidObservation { wins, losses } => {
                context.insert("wins".to_string(), serde_json::json!(wins));
                context.insert("losses".to_string(), serde_json::json!(losses));
            }
            Error::InvalidConfidence { confidence } => {
                context.insert("confidence".to_string(), serde_json::json!(confidence));
            }
            Error::InvalidOdds { odds } => {
                context.insert("odds".to_string(), serde_json::json!(odds));
            }
            Error::InvalidBankroll { bankroll } => {
                context.insert("bankroll".to_string(), serde_json::json!(bankroll));
            }
            Error::InvalidBetSize { bet_size } => {
                context.insert("bet_size".to_string(), serde_json::json!(bet_size));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }

    /// Serialize to pretty JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json())
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(Error::InvalidPrior { alpha: 0.0, beta: 1.0 }.code(), 10);
        assert_eq!(Error::InvalidOdds { odds: -1.0 }.code(), 13);
        assert_eq!(Error::InvalidPolicy("x".into()).code(), 22);
        assert_eq!(Error::InvalidSimulation("x".into()).code(), 30);
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            Error::InvalidObservation { wins: -1, losses: 0 }.category(),
            ErrorCategory::Input
        );
        assert_eq!(Error::Config("x".into()).category(), ErrorCategory::Config);
        assert_eq!(
            Error::InvalidSimulation("x".into()).category(),
            ErrorCategory::Simulation
        );
    }

    #[test]
    fn test_codes_fall_in_category_ranges() {
        let errors = [
            Error::InvalidPrior { alpha: 0.0, beta: 0.0 },
            Error::InvalidObservation { wins: -1, losses: 0 },
            Error::InvalidConfidence { confidence: 1.0 },
            Error::InvalidOdds { odds: 0.0 },
            Error::InvalidBankroll { bankroll: 0.0 },
            Error::InvalidBetSize { bet_size: 0.0 },
            Error::Config("x".into()),
            Error::InvalidPriors("x".into()),
            Error::InvalidPolicy("x".into()),
            Error::InvalidSimulation("x".into()),
        ];
        for err in &errors {
            let range = match err.category() {
                ErrorCategory::Input => 10..20,
                ErrorCategory::Config => 20..30,
                ErrorCategory::Simulation => 30..40,
                ErrorCategory::Io => 60..70,
            };
            assert!(range.contains(&err.code()), "{err:?}");
        }
    }

    #[test]
    fn test_suggested_action() {
        assert_eq!(
            Error::InvalidBankroll { bankroll: -5.0 }.suggested_action(),
            SuggestedAction::FixInput
        );
        assert_eq!(
            Error::InvalidPriors("x".into()).suggested_action(),
            SuggestedAction::ResetConfig
        );
    }

    #[test]
    fn test_structured_error_from_error() {
        let err = Error::InvalidObservation { wins: 3, losses: -2 };
        let structured = StructuredError::from(&err);

        assert_eq!(structured.code, 11);
        assert_eq!(structured.category, ErrorCategory::Input);
        assert!(structured.recoverable);
        assert_eq!(structured.context.get("losses"), Some(&serde_json::json!(-2)));
    }

    #[test]
    fn test_structured_error_json() {
        let err = Error::InvalidConfidence { confidence: 1.5 };
        let json = StructuredError::from(&err).with_context("flag", "--target").to_json();

        assert!(json.contains(r#""code":12"#));
        assert!(json.contains(r#""category":"input""#));
        assert!(json.contains(r#""suggested_action":"fix_input""#));
        assert!(json.contains(r#""flag":"--target""#));
    }

    #[test]
    fn test_format_error_human() {
        let err = Error::InvalidOdds { odds: 0.0 };
        let formatted = format_error_human(&err, false);

        assert!(formatted.contains("Invalid Odds"));
        assert!(formatted.contains("win odds must be positive"));
        assert!(formatted.contains("--odds 2.0"));
        assert!(!formatted.contains("\x1b["));
    }

    #[test]
    fn test_display_impls() {
        assert_eq!(ErrorCategory::Simulation.to_string(), "simulation");
        assert_eq!(SuggestedAction::FixInput.to_string(), "fix_input");
    }
}
