//! Core types and data structures for trip expense settlement

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::currency::{CurrencyError, CurrencySettings};

/// Opaque identifier of a trip participant
pub type ParticipantId = String;

/// Raw payer value used by persisted records for pooled expenses
pub const POOLED_PAYER_SENTINEL: &str = "ALL";

/// Who fronted the money for an expense
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Payer {
    /// A single participant paid and is credited with the full amount
    Single(ParticipantId),
    /// Paid from a communal pool; nobody is credited
    Pooled,
}

impl Payer {
    /// The credited participant, if any
    pub fn participant(&self) -> Option<&str> {
        match self {
            Payer::Single(id) => Some(id),
            Payer::Pooled => None,
        }
    }
}

impl From<&str> for Payer {
    fn from(raw: &str) -> Self {
        if raw == POOLED_PAYER_SENTINEL {
            Payer::Pooled
        } else {
            Payer::Single(raw.to_string())
        }
    }
}

impl From<String> for Payer {
    fn from(raw: String) -> Self {
        if raw == POOLED_PAYER_SENTINEL {
            Payer::Pooled
        } else {
            Payer::Single(raw)
        }
    }
}

/// A single shared cost on a trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Unique identifier for the expense
    pub id: String,
    /// Date the cost was incurred
    pub date: NaiveDate,
    /// What was paid for
    pub description: String,
    /// Non-negative amount in `currency` (or the trip currency when unset)
    pub amount: BigDecimal,
    /// Currency code of `amount`; `None` means the trip currency
    pub currency: Option<String>,
    /// Free-form category (food, transport, lodging, ...)
    pub category: Option<String>,
    /// Who fronted the money
    pub payer: Payer,
    /// Participants owing an equal share
    pub targets: Vec<ParticipantId>,
}

impl ExpenseRecord {
    /// Create a new expense with a generated id
    pub fn new(
        date: NaiveDate,
        description: String,
        amount: BigDecimal,
        payer: Payer,
        targets: Vec<ParticipantId>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date,
            description,
            amount,
            currency: None,
            category: None,
            payer,
            targets,
        }
    }

    /// Check the record against the settlement preconditions
    pub fn validate(&self) -> SettlementResult<()> {
        if self.targets.is_empty() {
            return Err(SettlementError::invalid(
                &self.id,
                InvalidExpenseReason::EmptyTargets,
            ));
        }

        if self.amount < BigDecimal::from(0) {
            return Err(SettlementError::invalid(
                &self.id,
                InvalidExpenseReason::NegativeAmount,
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for target in &self.targets {
            if !seen.insert(target.as_str()) {
                return Err(SettlementError::invalid(
                    &self.id,
                    InvalidExpenseReason::DuplicateTarget(target.clone()),
                ));
            }
        }

        Ok(())
    }

    /// Equal share owed by each target
    pub fn share(&self) -> SettlementResult<BigDecimal> {
        if self.targets.is_empty() {
            return Err(SettlementError::invalid(
                &self.id,
                InvalidExpenseReason::EmptyTargets,
            ));
        }
        Ok(&self.amount / BigDecimal::from(self.targets.len() as u64))
    }

    /// Every participant id this record mentions
    pub fn participants(&self) -> impl Iterator<Item = &str> {
        self.payer
            .participant()
            .into_iter()
            .chain(self.targets.iter().map(String::as_str))
    }
}

/// A suggested payment settling part of the balances
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transfer {
    /// Debtor who pays
    pub from: ParticipantId,
    /// Creditor who receives
    pub to: ParticipantId,
    /// Strictly positive amount, rounded to the configured scale
    pub amount: BigDecimal,
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.from, self.to, self.amount)
    }
}

/// Net position of a participant after all expenses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantBalance {
    pub participant: ParticipantId,
    /// Positive: is owed money. Negative: owes money.
    pub balance: BigDecimal,
}

/// Trip companion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: ParticipantId,
    /// Display name
    pub name: String,
    pub email: Option<String>,
}

impl Member {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: None,
        }
    }
}

/// Persisted trip header; expenses are stored separately in entry order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub id: String,
    pub name: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Roster of participants
    pub companions: Vec<Member>,
    pub currency: CurrencySettings,
    pub last_modified: NaiveDateTime,
}

impl TripRecord {
    /// Create a new trip with a generated id and no companions
    pub fn new(
        name: String,
        destination: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        currency: CurrencySettings,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            destination,
            start_date,
            end_date,
            companions: Vec::new(),
            currency,
            last_modified: chrono::Utc::now().naive_utc(),
        }
    }

    /// Participant ids of all companions, in roster order
    pub fn roster(&self) -> Vec<ParticipantId> {
        self.companions.iter().map(|m| m.id.clone()).collect()
    }

    pub fn member(&self, id: &str) -> Option<&Member> {
        self.companions.iter().find(|m| m.id == id)
    }

    pub fn touch(&mut self) {
        self.last_modified = chrono::Utc::now().naive_utc();
    }
}

/// Why an expense record cannot take part in settlement
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidExpenseReason {
    #[error("targets must not be empty")]
    EmptyTargets,
    #[error("amount must not be negative")]
    NegativeAmount,
    #[error("amount must be finite")]
    NonFiniteAmount,
    #[error("target '{0}' appears more than once")]
    DuplicateTarget(String),
}

/// Errors that can occur while tracking or settling expenses
#[derive(Debug, thiserror::Error)]
pub enum SettlementError {
    #[error("Invalid expense {expense_id}: {reason}")]
    InvalidExpense {
        expense_id: String,
        reason: InvalidExpenseReason,
    },
    #[error("Unknown participant '{participant}' in expense {expense_id}")]
    UnknownParticipant {
        expense_id: String,
        participant: ParticipantId,
    },
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Trip not found: {0}")]
    TripNotFound(String),
    #[error("Expense not found: {0}")]
    ExpenseNotFound(String),
    #[error(transparent)]
    Currency(#[from] CurrencyError),
}

impl SettlementError {
    pub(crate) fn invalid(expense_id: &str, reason: InvalidExpenseReason) -> Self {
        SettlementError::InvalidExpense {
            expense_id: expense_id.to_string(),
            reason,
        }
    }
}

/// Result type for settlement operations
pub type SettlementResult<T> = Result<T, SettlementError>;
