//! In-memory storage implementation for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::traits::*;
use crate::types::*;

fn poisoned<T>(_: T) -> SettlementError {
    SettlementError::Storage("storage lock poisoned".to_string())
}

/// In-memory storage implementation for testing and development
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    trips: Arc<RwLock<HashMap<String, TripRecord>>>,
    expenses: Arc<RwLock<HashMap<String, Vec<ExpenseRecord>>>>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self {
            trips: Arc::new(RwLock::new(HashMap::new())),
            expenses: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> SettlementResult<()> {
        self.trips.write().map_err(poisoned)?.clear();
        self.expenses.write().map_err(poisoned)?.clear();
        Ok(())
    }

    fn ensure_trip(&self, trip_id: &str) -> SettlementResult<()> {
        if self.trips.read().map_err(poisoned)?.contains_key(trip_id) {
            Ok(())
        } else {
            Err(SettlementError::TripNotFound(trip_id.to_string()))
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TripStorage for MemoryStorage {
    async fn save_trip(&mut self, trip: &TripRecord) -> SettlementResult<()> {
        self.trips
            .write()
            .map_err(poisoned)?
            .insert(trip.id.clone(), trip.clone());
        self.expenses
            .write()
            .map_err(poisoned)?
            .entry(trip.id.clone())
            .or_default();
        Ok(())
    }

    async fn get_trip(&self, trip_id: &str) -> SettlementResult<Option<TripRecord>> {
        Ok(self.trips.read().map_err(poisoned)?.get(trip_id).cloned())
    }

    async fn list_trips(&self) -> SettlementResult<Vec<TripRecord>> {
        let mut trips: Vec<TripRecord> = self
            .trips
            .read()
            .map_err(poisoned)?
            .values()
            .cloned()
            .collect();
        trips.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        Ok(trips)
    }

    async fn update_trip(&mut self, trip: &TripRecord) -> SettlementResult<()> {
        let mut trips = self.trips.write().map_err(poisoned)?;
        match trips.get_mut(&trip.id) {
            Some(existing) => {
                *existing = trip.clone();
                Ok(())
            }
            None => Err(SettlementError::TripNotFound(trip.id.clone())),
        }
    }

    async fn delete_trip(&mut self, trip_id: &str) -> SettlementResult<()> {
        if self.trips.write().map_err(poisoned)?.remove(trip_id).is_some() {
            self.expenses.write().map_err(poisoned)?.remove(trip_id);
            Ok(())
        } else {
            Err(SettlementError::TripNotFound(trip_id.to_string()))
        }
    }

    async fn save_expense(
        &mut self,
        trip_id: &str,
        expense: &ExpenseRecord,
    ) -> SettlementResult<()> {
        self.ensure_trip(trip_id)?;
        self.expenses
            .write()
            .map_err(poisoned)?
            .entry(trip_id.to_string())
            .or_default()
            .push(expense.clone());
        Ok(())
    }

    async fn get_expenses(&self, trip_id: &str) -> SettlementResult<Vec<ExpenseRecord>> {
        self.ensure_trip(trip_id)?;
        Ok(self
            .expenses
            .read()
            .map_err(poisoned)?
            .get(trip_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_expense(
        &mut self,
        trip_id: &str,
        expense: &ExpenseRecord,
    ) -> SettlementResult<()> {
        self.ensure_trip(trip_id)?;
        let mut expenses = self.expenses.write().map_err(poisoned)?;
        let existing = expenses
            .get_mut(trip_id)
            .and_then(|list| list.iter_mut().find(|e| e.id == expense.id))
            .ok_or_else(|| SettlementError::ExpenseNotFound(expense.id.clone()))?;
        *existing = expense.clone();
        Ok(())
    }

    async fn delete_expense(&mut self, trip_id: &str, expense_id: &str) -> SettlementResult<()> {
        self.ensure_trip(trip_id)?;
        let mut expenses = self.expenses.write().map_err(poisoned)?;
        let list = expenses
            .get_mut(trip_id)
            .ok_or_else(|| SettlementError::ExpenseNotFound(expense_id.to_string()))?;
        let before = list.len();
        list.retain(|e| e.id != expense_id);
        if list.len() == before {
            return Err(SettlementError::ExpenseNotFound(expense_id.to_string()));
        }
        Ok(())
    }
}
