//! Decision matrix: indicator phrases per complexity tier.
//!
//! The matrix is configuration data. Loading it from disk is an
//! infrastructure concern; validating it is a domain one, so a bad matrix is
//! rejected the same way no matter where it came from.

use crate::core::error::ConfigurationError;
use crate::evaluation::Complexity;
use serde::{Deserialize, Serialize};

/// Indicator phrases that place a task in one tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRule {
    pub tier: Complexity,
    pub indicators: Vec<String>,
    #[serde(default)]
    pub description: String,
}

/// The full decision matrix
///
/// ```toml
/// [[tiers]]
/// tier = "simple"
/// indicators = ["fix typo", "rename"]
///
/// [[tiers]]
/// tier = "very_complex"
/// indicators = ["distributed consensus"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecisionMatrix {
    #[serde(default)]
    pub tiers: Vec<TierRule>,
}

impl DecisionMatrix {
    /// Check the matrix and lowercase its indicators.
    ///
    /// Rejects a matrix with no tiers, a tier listed twice, or a tier with
    /// no non-blank indicators.
    pub fn validated(mut self) -> Result<Self, ConfigurationError> {
        if self.tiers.is_empty() {
            return Err(ConfigurationError::MalformedMatrix(
                "matrix defines no tiers".to_string(),
            ));
        }

        let mut seen = Vec::new();
        for rule in &mut self.tiers {
            if seen.contains(&rule.tier) {
                return Err(ConfigurationError::DuplicateTier(rule.tier.to_string()));
            }
            seen.push(rule.tier);

            rule.indicators = rule
                .indicators
                .iter()
                .map(|i| i.trim().to_lowercase())
                .filter(|i| !i.is_empty())
                .collect();
            if rule.indicators.is_empty() {
                return Err(ConfigurationError::EmptyTier(rule.tier.to_string()));
            }
        }

        Ok(self)
    }

    /// Indicators of `tier` found in the (lowercased) task text
    pub fn matches<'a>(&'a self, tier: Complexity, lowered_task: &str) -> Vec<&'a str> {
        self.tiers
            .iter()
            .filter(|rule| rule.tier == tier)
            .flat_map(|rule| rule.indicators.iter())
            .filter(|indicator| lowered_task.contains(indicator.as_str()))
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(tier: Complexity, indicators: &[&str]) -> TierRule {
        TierRule {
            tier,
            indicators: indicators.iter().map(|s| s.to_string()).collect(),
            description: String::new(),
        }
    }

    #[test]
    fn test_validated_lowercases_indicators() {
        let matrix = DecisionMatrix {
            tiers: vec![rule(Complexity::Simple, &["Fix Typo", "  "])],
        }
        .validated()
        .unwrap();
        assert_eq!(matrix.tiers[0].indicators, vec!["fix typo"]);
    }

    #[test]
    fn test_empty_matrix_rejected() {
        assert!(matches!(
            DecisionMatrix::default().validated(),
            Err(ConfigurationError::MalformedMatrix(_))
        ));
    }

    #[test]
    fn test_duplicate_tier_rejected() {
        let matrix = DecisionMatrix {
            tiers: vec![
                rule(Complexity::Simple, &["a"]),
                rule(Complexity::Simple, &["b"]),
            ],
        };
        assert_eq!(
            matrix.validated(),
            Err(ConfigurationError::DuplicateTier("simple".to_string()))
        );
    }

    #[test]
    fn test_blank_tier_rejected() {
        let matrix = DecisionMatrix {
            tiers: vec![rule(Complexity::Complex, &[" "])],
        };
        assert_eq!(
            matrix.validated(),
            Err(ConfigurationError::EmptyTier("complex".to_string()))
        );
    }

    #[test]
    fn test_matches() {
        let matrix = DecisionMatrix {
            tiers: vec![rule(Complexity::Complex, &["oauth", "migration"])],
        }
        .validated()
        .unwrap();
        assert_eq!(
            matrix.matches(Complexity::Complex, "add oauth login"),
            vec!["oauth"]
        );
        assert!(matrix.matches(Complexity::Simple, "add oauth login").is_empty());
    }
}
