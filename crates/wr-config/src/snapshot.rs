//! Configuration snapshots for report provenance.
//!
//! A snapshot captures which files produced a report and their exact
//! content hashes, so a recommendation can be reproduced later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::resolve::ConfigPaths;
use crate::{Policy, Priors};

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    pub schema_version: String,

    /// SHA-256 hash of the priors JSON content.
    #[serde(default)]
    pub priors_hash: Option<String>,

    #[serde(default)]
    pub priors_path: Option<String>,

    pub priors_source: String,

    /// SHA-256 hash of the policy JSON content.
    #[serde(default)]
    pub policy_hash: Option<String>,

    #[serde(default)]
    pub policy_path: Option<String>,

    pub policy_source: String,

    /// Combined hash of all config files (for quick comparison).
    pub combined_hash: String,

    /// Key configuration values for quick reference.
    pub summary: ConfigSummary,
}

/// Summary of key configuration values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub prior_alpha: f64,
    pub prior_beta: f64,
    pub credible_level: f64,
    pub half_kelly_multiplier: f64,
    pub ruin_trials: usize,
    pub predictive_simulations: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl ConfigSnapshot {
    /// Create a new snapshot from loaded configuration.
    pub fn new(
        priors: &Priors,
        policy: &Policy,
        paths: &ConfigPaths,
        priors_json: Option<&str>,
        policy_json: Option<&str>,
    ) -> Self {
        let priors_hash = priors_json.map(hash_content);
        let policy_hash = policy_json.map(hash_content);

        let combined = format!(
            "{}:{}",
            priors_hash.as_deref().unwrap_or("none"),
            policy_hash.as_deref().unwrap_or("none")
        );

        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            priors_hash,
            priors_path: paths.priors.as_ref().map(|p| p.display().to_string()),
            priors_source: paths.priors_source.to_string(),
            policy_hash,
            policy_path: paths.policy.as_ref().map(|p| p.display().to_string()),
            policy_source: paths.policy_source.to_string(),
            combined_hash: hash_content(&combined),
            summary: ConfigSummary::from_config(priors, policy),
        }
    }

    /// Create a snapshot with only defaults (no config files loaded).
    pub fn defaults_only() -> Self {
        Self::new(
            &Priors::default(),
            &Policy::default(),
            &ConfigPaths::default(),
            None,
            None,
        )
    }

    /// Serialize snapshot to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check if this snapshot matches another (same config).
    pub fn matches(&self, other: &ConfigSnapshot) -> bool {
        self.combined_hash == other.combined_hash
    }

    /// Get a short identifier for this snapshot (first 12 chars of hash).
    pub fn short_id(&self) -> &str {
        &self.combined_hash[..12.min(self.combined_hash.len())]
    }
}

impl ConfigSummary {
    fn from_config(priors: &Priors, policy: &Policy) -> Self {
        ConfigSummary {
            prior_alpha: priors.prior_alpha,
            prior_beta: priors.prior_beta,
            credible_level: policy.credible_level,
            half_kelly_multiplier: policy.half_kelly_multiplier,
            ruin_trials: policy.simulation.ruin_trials,
            predictive_simulations: policy.simulation.predictive_simulations,
            seed: policy.simulation.seed,
        }
    }
}

/// Hash content with SHA-256 and return hex string.
pub(crate) fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_snapshot() {
        let snapshot = ConfigSnapshot::defaults_only();
        assert_eq!(snapshot.schema_version, crate::CONFIG_SCHEMA_VERSION);
        assert!(snapshot.priors_hash.is_none());
        assert!(snapshot.policy_hash.is_none());
        assert_eq!(snapshot.priors_source, "builtin default");
        assert_eq!(snapshot.summary.prior_alpha, 1.0);
        assert_eq!(snapshot.summary.ruin_trials, 10_000);
    }

    #[test]
    fn test_snapshot_short_id() {
        let snapshot = ConfigSnapshot::defaults_only();
        assert_eq!(snapshot.short_id().len(), 12);
    }

    #[test]
    fn test_snapshot_matches_on_content_only() {
        let s1 = ConfigSnapshot::defaults_only();
        let s2 = ConfigSnapshot::defaults_only();
        assert!(s1.matches(&s2));

        let s3 = ConfigSnapshot::new(
            &Priors::default(),
            &Policy::default(),
            &ConfigPaths::default(),
            Some(r#"{"schema_version":"1.0.0","prior_alpha":1,"prior_beta":1}"#),
            None,
        );
        assert!(!s1.matches(&s3));
    }

    #[test]
    fn test_hash_content() {
        let hash1 = hash_content("test");
        assert_eq!(hash1, hash_content("test"));
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let snapshot = ConfigSnapshot::defaults_only();
        let json = snapshot.to_json().unwrap();
        let restored = ConfigSnapshot::from_json(&json).unwrap();
        assert!(snapshot.matches(&restored));
        assert_eq!(snapshot.summary, restored.summary);
    }
}
