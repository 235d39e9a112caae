//! Cost configuration from TOML (`[cost]` section)

use council_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// Raw cost configuration
///
/// `budget = 0` means no budget: no damping, no cost warnings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCostConfig {
    pub budget: f64,
    /// Estimated price per 1000 tokens of prompt plus response
    pub price_per_1k_tokens: f64,
}

impl FileCostConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        for (field, value) in [
            ("cost.budget", self.budget),
            ("cost.price_per_1k_tokens", self.price_per_1k_tokens),
        ] {
            if value < 0.0 || value.is_nan() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::OutOfRange {
                        field: field.to_string(),
                    },
                    format!("{field} cannot be negative (got {value})"),
                ));
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_values_rejected() {
        let config = FileCostConfig {
            budget: -1.0,
            price_per_1k_tokens: -0.5,
        };
        assert_eq!(config.validate().len(), 2);
        assert!(FileCostConfig::default().validate().is_empty());
    }
}
