//! Trip book orchestrating storage, validation and settlement

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::currency::CurrencySettings;
use crate::settlement::{SettlementEngine, SettlementOptions, SettlementReport};
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::{validate_participant_id, validate_roster_membership};

/// Category used for expenses recorded without one
pub const DEFAULT_CATEGORY: &str = "other";

/// Main entry point for tracking a group's trips and settling their expenses
pub struct TripBook<S: TripStorage> {
    storage: S,
    validator: Box<dyn ExpenseValidator>,
    engine: SettlementEngine,
}

impl<S: TripStorage> TripBook<S> {
    /// Create a new trip book with the given storage backend
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultExpenseValidator),
            engine: SettlementEngine::new(),
        }
    }

    /// Create a new trip book with a custom validator and settlement options
    pub fn with_settings(
        storage: S,
        validator: Box<dyn ExpenseValidator>,
        options: SettlementOptions,
    ) -> Self {
        Self {
            storage,
            validator,
            engine: SettlementEngine::with_options(options),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    // Trip operations
    /// Create and store a new trip
    pub async fn create_trip(
        &mut self,
        name: String,
        destination: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        currency: CurrencySettings,
    ) -> SettlementResult<TripRecord> {
        if name.trim().is_empty() {
            return Err(SettlementError::Validation(
                "Trip name cannot be empty".to_string(),
            ));
        }

        if end_date < start_date {
            return Err(SettlementError::Validation(format!(
                "Trip ends ({}) before it starts ({})",
                end_date, start_date
            )));
        }

        currency.validate()?;

        let trip = TripRecord::new(name, destination, start_date, end_date, currency);
        self.storage.save_trip(&trip).await?;

        tracing::debug!(trip_id = %trip.id, "trip created");
        Ok(trip)
    }

    /// Get a trip by ID
    pub async fn get_trip(&self, trip_id: &str) -> SettlementResult<Option<TripRecord>> {
        self.storage.get_trip(trip_id).await
    }

    /// Get a trip by ID, returning an error if not found
    pub async fn get_trip_required(&self, trip_id: &str) -> SettlementResult<TripRecord> {
        self.storage
            .get_trip(trip_id)
            .await?
            .ok_or_else(|| SettlementError::TripNotFound(trip_id.to_string()))
    }

    /// List all trips, most recently modified first
    pub async fn list_trips(&self) -> SettlementResult<Vec<TripRecord>> {
        self.storage.list_trips().await
    }

    /// Delete a trip and its expenses
    pub async fn delete_trip(&mut self, trip_id: &str) -> SettlementResult<()> {
        self.storage.delete_trip(trip_id).await
    }

    /// Add a companion to the trip roster
    pub async fn add_companion(
        &mut self,
        trip_id: &str,
        member: Member,
    ) -> SettlementResult<TripRecord> {
        validate_participant_id(&member.id)?;

        let mut trip = self.get_trip_required(trip_id).await?;
        if trip.member(&member.id).is_some() {
            return Err(SettlementError::Validation(format!(
                "Companion '{}' is already on trip '{}'",
                member.id, trip.name
            )));
        }

        trip.companions.push(member);
        trip.touch();
        self.storage.update_trip(&trip).await?;

        Ok(trip)
    }

    // Expense operations
    /// Record a new expense on a trip
    pub async fn record_expense(
        &mut self,
        trip_id: &str,
        expense: ExpenseRecord,
    ) -> SettlementResult<()> {
        let trip = self.check_expense(trip_id, &expense).await?;

        self.storage.save_expense(trip_id, &expense).await?;
        self.touch_trip(trip).await
    }

    /// Replace an existing expense
    pub async fn update_expense(
        &mut self,
        trip_id: &str,
        expense: &ExpenseRecord,
    ) -> SettlementResult<()> {
        let trip = self.check_expense(trip_id, expense).await?;

        self.storage.update_expense(trip_id, expense).await?;
        self.touch_trip(trip).await
    }

    /// Remove an expense from a trip
    pub async fn delete_expense(
        &mut self,
        trip_id: &str,
        expense_id: &str,
    ) -> SettlementResult<()> {
        let trip = self.get_trip_required(trip_id).await?;

        self.storage.delete_expense(trip_id, expense_id).await?;
        self.touch_trip(trip).await
    }

    /// Expenses of a trip in entry order
    pub async fn list_expenses(&self, trip_id: &str) -> SettlementResult<Vec<ExpenseRecord>> {
        self.storage.get_expenses(trip_id).await
    }

    // Reporting and settlement
    /// Totals of a trip's spending in trip and home currency
    pub async fn summarize_expenses(&self, trip_id: &str) -> SettlementResult<ExpenseSummary> {
        let trip = self.get_trip_required(trip_id).await?;
        let expenses = self.normalized_expenses(&trip).await?;

        let mut total = BigDecimal::from(0);
        let mut by_category: BTreeMap<String, BigDecimal> = BTreeMap::new();
        let mut by_payer: BTreeMap<String, BigDecimal> = BTreeMap::new();

        for expense in &expenses {
            total += &expense.amount;

            let category = expense
                .category
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
            *by_category
                .entry(category)
                .or_insert_with(|| BigDecimal::from(0)) += &expense.amount;

            let payer = expense
                .payer
                .participant()
                .unwrap_or(POOLED_PAYER_SENTINEL)
                .to_string();
            *by_payer
                .entry(payer)
                .or_insert_with(|| BigDecimal::from(0)) += &expense.amount;
        }

        Ok(ExpenseSummary {
            trip_id: trip.id.clone(),
            currency: trip.currency.currency.clone(),
            home_currency: trip.currency.home_currency.clone(),
            expense_count: expenses.len(),
            total_home: trip.currency.to_home(&total),
            total,
            by_category,
            by_payer,
        })
    }

    /// Settle a snapshot of the trip's current roster and expenses
    pub async fn settle_trip(&self, trip_id: &str) -> SettlementResult<SettlementReport> {
        let trip = self.get_trip_required(trip_id).await?;
        let expenses = self.normalized_expenses(&trip).await?;

        let report = self.engine.settle_report(&trip.roster(), &expenses)?;

        tracing::debug!(
            trip_id = %trip.id,
            expenses = expenses.len(),
            transfers = report.transfers.len(),
            rejected = report.rejected.len(),
            "trip settled"
        );
        Ok(report)
    }

    async fn normalized_expenses(&self, trip: &TripRecord) -> SettlementResult<Vec<ExpenseRecord>> {
        let expenses = self.storage.get_expenses(&trip.id).await?;
        let converter = trip.currency.converter()?;
        Ok(converter.normalize_expenses(&expenses)?)
    }

    async fn check_expense(
        &self,
        trip_id: &str,
        expense: &ExpenseRecord,
    ) -> SettlementResult<TripRecord> {
        let trip = self.get_trip_required(trip_id).await?;
        let roster = trip.roster();

        self.validator.validate_expense(expense)?;
        self.validator.validate_participants(expense, &roster)?;

        // Recorded expenses must only involve companions of the trip
        validate_roster_membership(expense, &roster)?;

        if let Some(currency) = expense.currency.as_deref() {
            trip.currency.converter()?.rate(currency)?;
        }

        Ok(trip)
    }

    async fn touch_trip(&mut self, mut trip: TripRecord) -> SettlementResult<()> {
        trip.touch();
        self.storage.update_trip(&trip).await
    }
}

/// Spending overview of a trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSummary {
    pub trip_id: String,
    pub currency: String,
    pub home_currency: String,
    pub expense_count: usize,
    /// Total spent in the trip currency
    pub total: BigDecimal,
    /// Total spent in the home currency
    pub total_home: BigDecimal,
    pub by_category: BTreeMap<String, BigDecimal>,
    /// Keyed by payer id; pooled spending is keyed by the pooled sentinel
    pub by_payer: BTreeMap<String, BigDecimal>,
}
