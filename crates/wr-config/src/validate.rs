//! Configuration validation errors and semantic validation.

use thiserror::Error;

use crate::policy::Policy;
use crate::priors::Priors;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

fn check_version(actual: &str) -> ValidationResult<()> {
    if actual != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(())
}

/// Validate priors configuration semantically.
pub fn validate_priors(priors: &Priors) -> ValidationResult<()> {
    check_version(&priors.schema_version)?;
    validate_positive("prior_alpha", priors.prior_alpha)?;
    validate_positive("prior_beta", priors.prior_beta)?;
    Ok(())
}

/// Validate policy configuration semantically.
pub fn validate_policy(policy: &Policy) -> ValidationResult<()> {
    check_version(&policy.schema_version)?;

    if !(policy.credible_level > 0.0 && policy.credible_level < 1.0) {
        return Err(ValidationError::InvalidValue {
            field: "credible_level".to_string(),
            message: format!("Must be in (0, 1), got {}", policy.credible_level),
        });
    }

    if !(policy.half_kelly_multiplier > 0.0 && policy.half_kelly_multiplier <= 1.0) {
        return Err(ValidationError::InvalidValue {
            field: "half_kelly_multiplier".to_string(),
            message: format!("Must be in (0, 1], got {}", policy.half_kelly_multiplier),
        });
    }

    let sim = &policy.simulation;
    if sim.ruin_trials == 0 {
        return Err(ValidationError::InvalidValue {
            field: "simulation.ruin_trials".to_string(),
            message: "Must be > 0".to_string(),
        });
    }
    if sim.predictive_simulations == 0 {
        return Err(ValidationError::InvalidValue {
            field: "simulation.predictive_simulations".to_string(),
            message: "Must be > 0".to_string(),
        });
    }
    if sim.risk_horizon_games == 0 {
        return Err(ValidationError::InvalidValue {
            field: "simulation.risk_horizon_games".to_string(),
            message: "Must be > 0".to_string(),
        });
    }
    if sim.workers == Some(0) {
        return Err(ValidationError::InvalidValue {
            field: "simulation.workers".to_string(),
            message: "Must be > 0 when set".to_string(),
        });
    }

    let k = &policy.kelly_tiers;
    validate_increasing("kelly_tiers", &[0.0, k.moderate, k.significant, k.strong])?;

    let r = &policy.risk_tiers;
    validate_increasing("risk_tiers", &[0.0, r.low, r.moderate, r.high])?;
    if r.high > 1.0 {
        return Err(ValidationError::InvalidValue {
            field: "risk_tiers.high".to_string(),
            message: format!("Must be <= 1, got {}", r.high),
        });
    }

    let e = &policy.ev_tiers;
    validate_increasing(
        "ev_tiers",
        &[e.strongly_negative, e.negative, e.marginal, e.recommended],
    )?;

    Ok(())
}

fn validate_positive(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: format!("Must be positive and finite, got {}", value),
        });
    }
    Ok(())
}

/// Thresholds must be finite and strictly increasing.
fn validate_increasing(table: &str, bounds: &[f64]) -> ValidationResult<()> {
    if bounds.iter().any(|b| !b.is_finite()) {
        return Err(ValidationError::SemanticError(format!(
            "{} thresholds must be finite, got {:?}",
            table, bounds
        )));
    }
    if bounds.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ValidationError::SemanticError(format!(
            "{} thresholds must be strictly increasing, got {:?}",
            table, bounds
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_priors(&Priors::default()).is_ok());
        assert!(validate_policy(&Policy::default()).is_ok());
    }

    #[test]
    fn test_prior_validation() {
        let mut priors = Priors::default();
        priors.prior_beta = 0.0;
        assert!(matches!(
            validate_priors(&priors),
            Err(ValidationError::InvalidValue { .. })
        ));

        priors.prior_beta = f64::INFINITY;
        assert!(validate_priors(&priors).is_err());
    }

    #[test]
    fn test_version_mismatch() {
        let mut priors = Priors::default();
        priors.schema_version = "0.9.0".to_string();
        let err = validate_priors(&priors).unwrap_err();
        assert_eq!(err.code(), 66);
    }

    #[test]
    fn test_non_increasing_tiers_rejected() {
        let mut policy = Policy::default();
        policy.kelly_tiers.significant = 0.05;
        assert!(matches!(
            validate_policy(&policy),
            Err(ValidationError::SemanticError(_))
        ));
    }

    #[test]
    fn test_zero_trials_rejected() {
        let mut policy = Policy::default();
        policy.simulation.ruin_trials = 0;
        assert!(validate_policy(&policy).is_err());

        let mut policy = Policy::default();
        policy.simulation.workers = Some(0);
        assert!(validate_policy(&policy).is_err());
    }

    #[test]
    fn test_credible_level_bounds() {
        let mut policy = Policy::default();
        policy.credible_level = 1.0;
        assert!(validate_policy(&policy).is_err());
        policy.credible_level = f64::NAN;
        assert!(validate_policy(&policy).is_err());
    }
}
