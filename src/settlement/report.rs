//! Settlement results and their presentation

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Expense left out of a run under the skip policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedExpense {
    pub expense_id: String,
    pub reason: String,
}

/// Full outcome of a settlement run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementReport {
    /// Net positions before any transfer, in roster order
    pub balances: Vec<ParticipantBalance>,
    pub transfers: Vec<Transfer>,
    pub rejected: Vec<RejectedExpense>,
}

impl SettlementReport {
    /// Nothing left to pay
    pub fn is_settled(&self) -> bool {
        self.transfers.is_empty()
    }

    pub fn balance_of(&self, participant: &str) -> Option<&BigDecimal> {
        self.balances
            .iter()
            .find(|b| b.participant == participant)
            .map(|b| &b.balance)
    }

    /// Sum of all suggested transfers
    pub fn total_transferred(&self) -> BigDecimal {
        self.transfers.iter().map(|t| &t.amount).sum()
    }
}

/// Render transfers as "Alice owes Bob 42" using member display names
///
/// Participants without a member entry are shown by their raw id.
pub fn describe_transfers(transfers: &[Transfer], members: &[Member]) -> Vec<String> {
    let name_of = |id: &str| -> String {
        members
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| id.to_string())
    };

    transfers
        .iter()
        .map(|t| format!("{} owes {} {}", name_of(&t.from), name_of(&t.to), t.amount))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_transfers() {
        let members = vec![Member::new("m1", "Alice"), Member::new("m2", "Bob")];
        let transfers = vec![
            Transfer {
                from: "m1".to_string(),
                to: "m2".to_string(),
                amount: BigDecimal::from(42),
            },
            Transfer {
                from: "ghost".to_string(),
                to: "m1".to_string(),
                amount: BigDecimal::from(7),
            },
        ];

        assert_eq!(
            describe_transfers(&transfers, &members),
            vec!["Alice owes Bob 42".to_string(), "ghost owes Alice 7".to_string()]
        );
    }

    #[test]
    fn test_report_helpers() {
        let report = SettlementReport {
            balances: vec![
                ParticipantBalance {
                    participant: "a".to_string(),
                    balance: BigDecimal::from(10),
                },
                ParticipantBalance {
                    participant: "b".to_string(),
                    balance: BigDecimal::from(-10),
                },
            ],
            transfers: vec![Transfer {
                from: "b".to_string(),
                to: "a".to_string(),
                amount: BigDecimal::from(10),
            }],
            rejected: Vec::new(),
        };

        assert!(!report.is_settled());
        assert_eq!(report.balance_of("b"), Some(&BigDecimal::from(-10)));
        assert_eq!(report.total_transferred(), BigDecimal::from(10));
    }
}
