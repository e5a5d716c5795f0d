//! Advisory policy: credible level, stake scaling, simulation sizes and the
//! threshold tables behind every tiered recommendation.

use serde::{Deserialize, Serialize};

/// Complete policy configuration (policy.json).
///
/// Every field except `schema_version` may be omitted; omitted fields take
/// the built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub schema_version: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Credible level used by reports and EV bounds.
    #[serde(default = "default_credible_level")]
    pub credible_level: f64,

    /// Fraction of full Kelly used for the conservative stake.
    #[serde(default = "default_half_kelly_multiplier")]
    pub half_kelly_multiplier: f64,

    #[serde(default)]
    pub simulation: SimulationPolicy,

    #[serde(default)]
    pub kelly_tiers: KellyTiers,

    #[serde(default)]
    pub risk_tiers: RiskTiers,

    #[serde(default)]
    pub ev_tiers: EvTiers,
}

/// Monte Carlo sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationPolicy {
    /// Random-walk trials per risk assessment.
    pub ruin_trials: usize,

    /// Posterior-predictive draws per forecast.
    pub predictive_simulations: usize,

    /// Betting rounds per ruin trial in reports.
    pub risk_horizon_games: u32,

    /// Fixed seed for reproducible runs; `None` draws one per call.
    pub seed: Option<u64>,

    /// Worker threads; `None` uses available parallelism.
    pub workers: Option<usize>,
}

impl Default for SimulationPolicy {
    fn default() -> Self {
        Self {
            ruin_trials: 10_000,
            predictive_simulations: 10_000,
            risk_horizon_games: 100,
            seed: None,
            workers: None,
        }
    }
}

/// Lower bounds of the Kelly fraction tiers. `f <= 0` is always "do not bet".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KellyTiers {
    pub moderate: f64,
    pub significant: f64,
    pub strong: f64,
}

impl Default for KellyTiers {
    fn default() -> Self {
        Self {
            moderate: 0.05,
            significant: 0.15,
            strong: 0.30,
        }
    }
}

/// Upper (exclusive) bounds of the ruin-probability tiers; anything at or
/// above `high` is extreme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskTiers {
    pub low: f64,
    pub moderate: f64,
    pub high: f64,
}

impl Default for RiskTiers {
    fn default() -> Self {
        Self {
            low: 0.01,
            moderate: 0.05,
            high: 0.20,
        }
    }
}

/// EV-percentage tier boundaries.
///
/// `ev% <= strongly_negative` → strongly not recommended, `< negative` → not
/// recommended, `< marginal` → marginal, `< recommended` → recommended,
/// otherwise highly recommended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvTiers {
    pub strongly_negative: f64,
    pub negative: f64,
    pub marginal: f64,
    pub recommended: f64,
}

impl Default for EvTiers {
    fn default() -> Self {
        Self {
            strongly_negative: -10.0,
            negative: 0.0,
            marginal: 5.0,
            recommended: 15.0,
        }
    }
}

fn default_credible_level() -> f64 {
    0.95
}

fn default_half_kelly_multiplier() -> f64 {
    0.5
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            description: None,
            credible_level: default_credible_level(),
            half_kelly_multiplier: default_half_kelly_multiplier(),
            simulation: SimulationPolicy::default(),
            kelly_tiers: KellyTiers::default(),
            risk_tiers: RiskTiers::default(),
            ev_tiers: EvTiers::default(),
        }
    }
}

impl Policy {
    /// Load policy from a JSON file.
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

    /// Parse policy from a JSON string.
    pub fn parse_json(json: &str) -> Result<Self, crate::validate::ValidationError> {
        serde_json::from_str(json).map_err(|e| {
            crate::validate::ValidationError::ParseError(format!("Invalid JSON: {}", e))
        })
    }
}
