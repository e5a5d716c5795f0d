//! Prior configuration for the win-probability model.

use serde::{Deserialize, Serialize};

/// Beta prior over the win probability, as stored in priors.json.
///
/// ```json
/// { "schema_version": "1.0.0", "prior_alpha": 1.0, "prior_beta": 1.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Priors {
    pub schema_version: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Pseudo-wins before any observation.
    pub prior_alpha: f64,

    /// Pseudo-losses before any observation.
    pub prior_beta: f64,
}

impl Default for Priors {
    fn default() -> Self {
        Self::uniform()
    }
}

impl Priors {
    /// Beta(1, 1): every win probability equally plausible.
    pub fn uniform() -> Self {
        Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            description: Some("uniform".to_string()),
            prior_alpha: 1.0,
            prior_beta: 1.0,
        }
    }

    /// Load priors from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, crate::validate::ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::validate::ValidationError::IoError(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::parse_json(&content)
    }

    /// Parse priors from a JSON string.
    pub fn parse_json(json: &str) -> Result<Self, crate::validate::ValidationError> {
        serde_json::from_str(json).map_err(|e| {
            crate::validate::ValidationError::ParseError(format!("Invalid JSON: {}", e))
        })
    }

    /// Prior mean alpha / (alpha + beta).
    pub fn prior_mean(&self) -> f64 {
        self.prior_alpha / (self.prior_alpha + self.prior_beta)
    }
}
