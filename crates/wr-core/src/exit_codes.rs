//! Exit codes for the `winrate` CLI.
//!
//! Exit code ranges:
//! - 0-1: operational outcomes (read the outcome from the code, not the output)
//! - 10-19: user/environment errors, fixable by the caller
//! - 20-29: internal errors

use wr_common::{Error, ErrorCategory};

/// Stable exit code contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command completed; any recommendation is a bet.
    Clean = 0,

    /// Command completed; the recommendation is not to bet.
    NoBet = 1,

    /// Invalid arguments or observation values.
    ArgsError = 10,

    /// Priors or policy file could not be used.
    ConfigError = 11,

    /// Internal error (bug).
    InternalError = 20,

    /// I/O or serialization failure.
    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Codes 0-1 are outcomes, not failures.
    pub fn is_success(self) -> bool {
        (self as i32) < 10
    }

    /// Name used in JSON output.
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::NoBet => "OK_NO_BET",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err.category() {
            ErrorCategory::Input | ErrorCategory::Simulation => ExitCode::ArgsError,
            ErrorCategory::Config => ExitCode::ConfigError,
            ErrorCategory::Io => ExitCode::IoError,
        }
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ExitCode::Clean.as_i32(), 0);
        assert_eq!(ExitCode::NoBet.as_i32(), 1);
        assert_eq!(ExitCode::ArgsError.as_i32(), 10);
        assert_eq!(ExitCode::ConfigError.as_i32(), 11);
        assert_eq!(ExitCode::InternalError.as_i32(), 20);
        assert_eq!(ExitCode::IoError.as_i32(), 21);
    }

    #[test]
    fn test_outcome_codes_are_success() {
        assert!(ExitCode::Clean.is_success());
        assert!(ExitCode::NoBet.is_success());
        assert!(!ExitCode::ArgsError.is_success());
        assert!(!ExitCode::IoError.is_success());
    }

    #[test]
    fn test_error_mapping() {
        let err = Error::InvalidOdds { odds: 0.0 };
        assert_eq!(ExitCode::from(&err), ExitCode::ArgsError);
        let err = Error::InvalidPolicy("bad".into());
        assert_eq!(ExitCode::from(&err), ExitCode::ConfigError);
        let err = Error::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(ExitCode::from(&err), ExitCode::IoError);
    }

    #[test]
    fn test_display() {
        assert_eq!(ExitCode::NoBet.to_string(), "OK_NO_BET (1)");
    }
}
