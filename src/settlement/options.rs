//! Settlement configuration

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::{SettlementError, SettlementResult};

/// What to do with an expense record that fails validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidExpensePolicy {
    /// Fail the whole run on the first invalid record
    #[default]
    Reject,
    /// Leave invalid records out, log them, and list them in the report
    Skip,
}

/// Tunables of a settlement run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementOptions {
    /// Balances within this distance of zero count as settled
    pub tolerance: BigDecimal,
    /// Decimal places transfer amounts are rounded to (0 = whole units)
    pub rounding_scale: i64,
    pub invalid_expense_policy: InvalidExpensePolicy,
}

impl Default for SettlementOptions {
    fn default() -> Self {
        Self {
            tolerance: BigDecimal::from(1) / BigDecimal::from(100),
            rounding_scale: 0,
            invalid_expense_policy: InvalidExpensePolicy::Reject,
        }
    }
}

impl SettlementOptions {
    /// Default options with the skip policy
    pub fn permissive() -> Self {
        Self {
            invalid_expense_policy: InvalidExpensePolicy::Skip,
            ..Self::default()
        }
    }

    pub fn with_rounding_scale(mut self, rounding_scale: i64) -> Self {
        self.rounding_scale = rounding_scale;
        self
    }

    pub fn with_tolerance(mut self, tolerance: BigDecimal) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Check the options before a run
    pub fn validate(&self) -> SettlementResult<()> {
        if self.tolerance < BigDecimal::from(0) {
            return Err(SettlementError::Validation(format!(
                "Settlement tolerance cannot be negative: {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_defaults() {
        let options = SettlementOptions::default();
        assert_eq!(options.tolerance, BigDecimal::from_str("0.01").unwrap());
        assert_eq!(options.rounding_scale, 0);
        assert_eq!(options.invalid_expense_policy, InvalidExpensePolicy::Reject);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let options: SettlementOptions =
            serde_json::from_str(r#"{"invalid_expense_policy":"skip"}"#).unwrap();
        assert_eq!(options.invalid_expense_policy, InvalidExpensePolicy::Skip);
        assert_eq!(options.rounding_scale, 0);
        assert_eq!(options, SettlementOptions::permissive());
    }

    #[test]
    fn test_tolerance_validation() {
        let options: SettlementOptions = serde_json::from_str(r#"{"tolerance":"0"}"#).unwrap();
        assert_eq!(options.tolerance, BigDecimal::from(0));
        assert!(options.validate().is_ok());

        let negative = SettlementOptions::default().with_tolerance(BigDecimal::from(-1));
        assert!(matches!(
            negative.validate(),
            Err(SettlementError::Validation(_))
        ));
    }
}
