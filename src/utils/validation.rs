//! Validation utilities

use bigdecimal::BigDecimal;

use crate::traits::*;
use crate::types::*;

/// Convert a floating point amount from an upstream source
///
/// NaN and infinities cannot be represented and are rejected as invalid input.
pub fn amount_from_f64(expense_id: &str, value: f64) -> SettlementResult<BigDecimal> {
    if !value.is_finite() {
        return Err(SettlementError::invalid(
            expense_id,
            InvalidExpenseReason::NonFiniteAmount,
        ));
    }

    // Display of a finite f64 is always plain decimal notation
    value
        .to_string()
        .parse::<BigDecimal>()
        .map_err(|_| SettlementError::invalid(expense_id, InvalidExpenseReason::NonFiniteAmount))
}

/// Validate that a participant ID is valid
pub fn validate_participant_id(participant: &str) -> SettlementResult<()> {
    if participant.trim().is_empty() {
        return Err(SettlementError::Validation(
            "Participant ID cannot be empty".to_string(),
        ));
    }

    if participant.len() > 64 {
        return Err(SettlementError::Validation(
            "Participant ID cannot exceed 64 characters".to_string(),
        ));
    }

    if participant == POOLED_PAYER_SENTINEL {
        return Err(SettlementError::Validation(format!(
            "Participant ID '{}' is reserved for pooled payments",
            participant
        )));
    }

    Ok(())
}

/// Validate that an expense description is valid
pub fn validate_expense_description(description: &str) -> SettlementResult<()> {
    if description.trim().is_empty() {
        return Err(SettlementError::Validation(
            "Expense description cannot be empty".to_string(),
        ));
    }

    if description.len() > 500 {
        return Err(SettlementError::Validation(
            "Expense description cannot exceed 500 characters".to_string(),
        ));
    }

    Ok(())
}

/// Check every participant of an expense against the roster
pub fn validate_roster_membership(
    expense: &ExpenseRecord,
    roster: &[ParticipantId],
) -> SettlementResult<()> {
    for participant in expense.participants() {
        if !roster.iter().any(|member| member == participant) {
            return Err(SettlementError::UnknownParticipant {
                expense_id: expense.id.clone(),
                participant: participant.to_string(),
            });
        }
    }
    Ok(())
}

/// Strict validator: well-formed records whose participants are all on the roster
pub struct StrictExpenseValidator;

impl ExpenseValidator for StrictExpenseValidator {
    fn validate_expense(&self, expense: &ExpenseRecord) -> SettlementResult<()> {
        expense.validate()?;

        validate_expense_description(&expense.description)?;
        for participant in expense.participants() {
            validate_participant_id(participant)?;
        }

        Ok(())
    }

    fn validate_participants(
        &self,
        expense: &ExpenseRecord,
        roster: &[ParticipantId],
    ) -> SettlementResult<()> {
        validate_roster_membership(expense, roster)
    }
}
