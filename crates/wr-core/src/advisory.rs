//! Tiered advisories as tagged outcomes.
//!
//! Classification is a pure function of a metric and a threshold table from
//! the policy. Human-readable wording lives in [`display`] and can be
//! swapped without touching the numbers.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use wr_config::{EvTiers, KellyTiers, RiskTiers};

/// Stake advice keyed on the Kelly fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum KellyAdvice {
    DoNotBet,
    MinimalEdge,
    ModerateEdge,
    SignificantEdge,
    StrongEdge,
}

impl KellyAdvice {
    pub fn classify(fraction: f64, tiers: &KellyTiers) -> Self {
        if fraction.is_nan() || fraction <= 0.0 {
            KellyAdvice::DoNotBet
        } else if fraction < tiers.moderate {
            KellyAdvice::MinimalEdge
        } else if fraction < tiers.significant {
            KellyAdvice::ModerateEdge
        } else if fraction < tiers.strong {
            KellyAdvice::SignificantEdge
        } else {
            KellyAdvice::StrongEdge
        }
    }
}

/// Ruin-risk bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Extreme,
}

impl RiskLevel {
    pub fn classify(risk_of_ruin: f64, tiers: &RiskTiers) -> Self {
        if risk_of_ruin < tiers.low {
            RiskLevel::Low
        } else if risk_of_ruin < tiers.moderate {
            RiskLevel::Moderate
        } else if risk_of_ruin < tiers.high {
            RiskLevel::High
        } else {
            // NaN lands here too.
            RiskLevel::Extreme
        }
    }

    /// LOW and MODERATE are acceptable for the overall recommendation.
    pub fn is_acceptable(self) -> bool {
        matches!(self, RiskLevel::Low | RiskLevel::Moderate)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::High => "HIGH",
            RiskLevel::Extreme => "EXTREME",
        };
        f.write_str(s)
    }
}

/// Advice keyed on expected value as a percentage of the stake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EvAdvice {
    StronglyNotRecommended,
    NotRecommended,
    Marginal,
    Recommended,
    HighlyRecommended,
}

impl EvAdvice {
    pub fn classify(ev_percentage: f64, tiers: &EvTiers) -> Self {
        if ev_percentage.is_nan() || ev_percentage <= tiers.strongly_negative {
            EvAdvice::StronglyNotRecommended
        } else if ev_percentage < tiers.negative {
            EvAdvice::NotRecommended
        } else if ev_percentage < tiers.marginal {
            EvAdvice::Marginal
        } else if ev_percentage < tiers.recommended {
            EvAdvice::Recommended
        } else {
            EvAdvice::HighlyRecommended
        }
    }
}

/// English wording for advisories and the overall recommendation.
pub mod display {
    use super::{EvAdvice, KellyAdvice, RiskLevel};
    use crate::advisor::{OverallRecommendation, RiskAssessment};

    pub fn kelly_text(advice: KellyAdvice) -> &'static str {
        match advice {
            KellyAdvice::DoNotBet => "Do not bet - negative expected value",
            KellyAdvice::MinimalEdge => "Very small bet - minimal edge",
            KellyAdvice::ModerateEdge => "Moderate bet - decent edge",
            KellyAdvice::SignificantEdge => "Larger bet - significant edge",
            KellyAdvice::StrongEdge => "Large bet - strong edge, but be cautious",
        }
    }

    pub fn risk_level_text(level: RiskLevel) -> &'static str {
        match level {
            RiskLevel::Low => "Acceptable risk",
            RiskLevel::Moderate => "Moderate risk - monitor carefully",
            RiskLevel::High => "High risk - consider reducing bet",
            RiskLevel::Extreme => "Extreme risk - strongly reduce bet",
        }
    }

    pub fn risk_text(assessment: &RiskAssessment) -> &'static str {
        if assessment.short_circuited {
            "Bet size too large - reduce immediately"
        } else {
            risk_level_text(assessment.risk_level)
        }
    }

    pub fn ev_text(advice: EvAdvice) -> &'static str {
        match advice {
            EvAdvice::StronglyNotRecommended => "Strongly not recommended - large expected loss",
            EvAdvice::NotRecommended => "Not recommended - negative EV",
            EvAdvice::Marginal => "Marginal bet - small positive EV",
            EvAdvice::Recommended => "Recommended - good EV",
            EvAdvice::HighlyRecommended => "Highly recommended - excellent EV",
        }
    }

    /// Recommendation lines, in display order.
    pub fn overall_lines(overall: &OverallRecommendation) -> Vec<String> {
        match overall {
            OverallRecommendation::DoNotBet => vec![
                "Overall: Do not bet. Current data shows negative expected value.".to_string(),
            ],
            OverallRecommendation::Bet {
                conservative_percentage,
                risk_level,
                expected_return_percentage,
            } => {
                let mut lines = vec![format!(
                    "Recommend using {:.1}% of bankroll (conservative Kelly)",
                    conservative_percentage
                )];
                if risk_level.is_acceptable() {
                    lines.push(format!("Risk level: {} - Acceptable", risk_level));
                } else {
                    lines.push(format!("Warning: Risk level {}", risk_level));
                }
                if let Some(ev) = expected_return_percentage {
                    lines.push(format!("Expected return: +{:.2}%", ev));
                }
                lines
            }
        }
    }

    pub fn overall_text(overall: &OverallRecommendation) -> String {
        overall_lines(overall).join("\n")
    }
}
