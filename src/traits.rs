//! Traits for storage abstraction and extensibility

use async_trait::async_trait;

use crate::types::*;

/// Storage abstraction for trips and their expense lists
///
/// The settlement engine never touches storage; this trait is the boundary a
/// host application implements (browser local storage, SQLite, a spreadsheet
/// sync, ...) so the trip book can load a snapshot and settle it.
#[async_trait]
pub trait TripStorage: Send + Sync {
    /// Save a new trip
    async fn save_trip(&mut self, trip: &TripRecord) -> SettlementResult<()>;

    /// Get a trip by ID
    async fn get_trip(&self, trip_id: &str) -> SettlementResult<Option<TripRecord>>;

    /// List all trips
    async fn list_trips(&self) -> SettlementResult<Vec<TripRecord>>;

    /// Update an existing trip
    async fn update_trip(&mut self, trip: &TripRecord) -> SettlementResult<()>;

    /// Delete a trip together with its expenses
    async fn delete_trip(&mut self, trip_id: &str) -> SettlementResult<()>;

    /// Append an expense to a trip
    async fn save_expense(&mut self, trip_id: &str, expense: &ExpenseRecord)
        -> SettlementResult<()>;

    /// Expenses of a trip in the order they were recorded
    async fn get_expenses(&self, trip_id: &str) -> SettlementResult<Vec<ExpenseRecord>>;

    /// Replace an expense in place, keeping its position
    async fn update_expense(
        &mut self,
        trip_id: &str,
        expense: &ExpenseRecord,
    ) -> SettlementResult<()>;

    /// Remove an expense from a trip
    async fn delete_expense(&mut self, trip_id: &str, expense_id: &str) -> SettlementResult<()>;
}

/// Trait for implementing custom expense validation rules
pub trait ExpenseValidator: Send + Sync {
    /// Validate a single record before it contributes to any balance
    fn validate_expense(&self, expense: &ExpenseRecord) -> SettlementResult<()>;

    /// Validate the participants an expense references against the roster
    fn validate_participants(
        &self,
        expense: &ExpenseRecord,
        roster: &[ParticipantId],
    ) -> SettlementResult<()>;
}

/// Default expense validator: settlement preconditions only
///
/// Participants missing from the roster are tolerated and settle from a zero
/// starting balance.
pub struct DefaultExpenseValidator;

impl ExpenseValidator for DefaultExpenseValidator {
    fn validate_expense(&self, expense: &ExpenseRecord) -> SettlementResult<()> {
        expense.validate()
    }

    fn validate_participants(
        &self,
        _expense: &ExpenseRecord,
        _roster: &[ParticipantId],
    ) -> SettlementResult<()> {
        Ok(())
    }
}
