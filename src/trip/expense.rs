//! Expense construction

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::types::*;

/// Builder for expense records
#[derive(Debug)]
pub struct ExpenseBuilder {
    expense: ExpenseRecord,
}

impl ExpenseBuilder {
    /// Start an expense paid by `payer`
    pub fn new(date: NaiveDate, description: String, amount: BigDecimal, payer: Payer) -> Self {
        Self {
            expense: ExpenseRecord::new(date, description, amount, payer, Vec::new()),
        }
    }

    /// Use an existing id instead of a generated one
    pub fn id(mut self, id: String) -> Self {
        self.expense.id = id;
        self
    }

    pub fn currency(mut self, currency: String) -> Self {
        self.expense.currency = Some(currency);
        self
    }

    pub fn category(mut self, category: String) -> Self {
        self.expense.category = Some(category);
        self
    }

    /// Add a participant owing a share
    pub fn target(mut self, participant: ParticipantId) -> Self {
        self.expense.targets.push(participant);
        self
    }

    /// Add several participants owing a share
    pub fn targets<I>(mut self, participants: I) -> Self
    where
        I: IntoIterator<Item = ParticipantId>,
    {
        self.expense.targets.extend(participants);
        self
    }

    /// Build the expense
    pub fn build(self) -> SettlementResult<ExpenseRecord> {
        self.expense.validate()?;
        Ok(self.expense)
    }
}

/// Common expense patterns
pub mod patterns {
    use super::*;

    /// Payer covers everyone on the roster, themselves included
    pub fn split_equally(
        date: NaiveDate,
        description: String,
        amount: BigDecimal,
        payer: ParticipantId,
        roster: &[ParticipantId],
    ) -> SettlementResult<ExpenseRecord> {
        ExpenseBuilder::new(date, description, amount, Payer::Single(payer))
            .targets(roster.iter().cloned())
            .build()
    }

    /// Payer covers the others only and takes no share
    pub fn pay_for_others(
        date: NaiveDate,
        description: String,
        amount: BigDecimal,
        payer: ParticipantId,
        roster: &[ParticipantId],
    ) -> SettlementResult<ExpenseRecord> {
        let others: Vec<ParticipantId> =
            roster.iter().filter(|p| **p != payer).cloned().collect();
        ExpenseBuilder::new(date, description, amount, Payer::Single(payer))
            .targets(others)
            .build()
    }

    /// Paid from the communal pool by everyone on the roster
    pub fn pooled_expense(
        date: NaiveDate,
        description: String,
        amount: BigDecimal,
        roster: &[ParticipantId],
    ) -> SettlementResult<ExpenseRecord> {
        ExpenseBuilder::new(date, description, amount, Payer::Pooled)
            .targets(roster.iter().cloned())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, 20).unwrap()
    }

    fn roster() -> Vec<ParticipantId> {
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    }

    #[test]
    fn test_builder() {
        let expense = ExpenseBuilder::new(
            date(),
            "Ferry".to_string(),
            BigDecimal::from(60),
            Payer::from("a"),
        )
        .id("exp-1".to_string())
        .category("transport".to_string())
        .currency("EUR".to_string())
        .target("b".to_string())
        .target("c".to_string())
        .build()
        .unwrap();

        assert_eq!(expense.id, "exp-1");
        assert_eq!(expense.targets, vec!["b".to_string(), "c".to_string()]);
        assert_eq!(expense.category.as_deref(), Some("transport"));
        assert_eq!(expense.currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn test_builder_requires_targets() {
        let result = ExpenseBuilder::new(
            date(),
            "Ferry".to_string(),
            BigDecimal::from(60),
            Payer::from("a"),
        )
        .build();

        assert!(matches!(
            result,
            Err(SettlementError::InvalidExpense {
                reason: InvalidExpenseReason::EmptyTargets,
                ..
            })
        ));
    }

    #[test]
    fn test_patterns() {
        let everyone = patterns::split_equally(
            date(),
            "Dinner".to_string(),
            BigDecimal::from(90),
            "a".to_string(),
            &roster(),
        )
        .unwrap();
        assert_eq!(everyone.targets, roster());

        let others = patterns::pay_for_others(
            date(),
            "Gift".to_string(),
            BigDecimal::from(90),
            "a".to_string(),
            &roster(),
        )
        .unwrap();
        assert_eq!(others.targets, vec!["b".to_string(), "c".to_string()]);

        let pooled =
            patterns::pooled_expense(date(), "Tips".to_string(), BigDecimal::from(9), &roster())
                .unwrap();
        assert_eq!(pooled.payer, Payer::Pooled);

        assert!(patterns::pay_for_others(
            date(),
            "Solo".to_string(),
            BigDecimal::from(5),
            "a".to_string(),
            &["a".to_string()],
        )
        .is_err());
    }
}
