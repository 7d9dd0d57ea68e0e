//! Exchange rate table and expense normalization into a single settlement currency

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::ExpenseRecord;

/// Currency configuration of a trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencySettings {
    /// Currency expenses are settled in (the destination currency, e.g. "JPY")
    pub currency: String,
    /// Currency the travellers think in (e.g. "TWD")
    pub home_currency: String,
    /// Units of home currency per unit of `currency`
    pub exchange_rate: BigDecimal,
}

impl CurrencySettings {
    /// Settings for a trip that spends and thinks in one currency
    pub fn single(currency: impl Into<String>) -> Self {
        let currency = currency.into();
        Self {
            home_currency: currency.clone(),
            currency,
            exchange_rate: BigDecimal::from(1),
        }
    }

    pub fn new(
        currency: impl Into<String>,
        home_currency: impl Into<String>,
        exchange_rate: BigDecimal,
    ) -> Result<Self, CurrencyError> {
        let settings = Self {
            currency: currency.into(),
            home_currency: home_currency.into(),
            exchange_rate,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), CurrencyError> {
        if self.currency.trim().is_empty() || self.home_currency.trim().is_empty() {
            return Err(CurrencyError::InvalidRate(
                "Currency codes cannot be empty".to_string(),
            ));
        }

        if self.exchange_rate <= BigDecimal::from(0) {
            return Err(CurrencyError::InvalidRate(format!(
                "Exchange rate must be positive: {}",
                self.exchange_rate
            )));
        }

        if self.currency == self.home_currency && self.exchange_rate != BigDecimal::from(1) {
            return Err(CurrencyError::InvalidRate(format!(
                "{} converts to itself at 1, not {}",
                self.currency, self.exchange_rate
            )));
        }

        Ok(())
    }

    /// Express an amount in the trip currency in home currency
    pub fn to_home(&self, amount: &BigDecimal) -> BigDecimal {
        amount * &self.exchange_rate
    }

    /// Converter settling into the trip currency
    pub fn converter(&self) -> Result<CurrencyConverter, CurrencyError> {
        self.validate()?;
        let mut converter = CurrencyConverter::new(self.currency.clone());
        if self.home_currency != self.currency {
            // One unit of home currency buys 1 / exchange_rate units of trip currency
            let rate = BigDecimal::from(1) / &self.exchange_rate;
            converter.rates.insert(self.home_currency.clone(), rate);
        }
        Ok(converter)
    }
}

/// Converts amounts between currencies and a base currency
#[derive(Debug, Clone)]
pub struct CurrencyConverter {
    base: String,
    /// Units of base currency per unit of the keyed currency
    rates: HashMap<String, BigDecimal>,
}

impl CurrencyConverter {
    /// Create a converter with no foreign rates
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            rates: HashMap::new(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Register the rate for a foreign currency
    pub fn set_rate(
        &mut self,
        currency: impl Into<String>,
        rate: BigDecimal,
    ) -> Result<(), CurrencyError> {
        let currency = currency.into();
        if rate <= BigDecimal::from(0) {
            return Err(CurrencyError::InvalidRate(format!(
                "Rate for {} must be positive: {}",
                currency, rate
            )));
        }
        self.rates.insert(currency, rate);
        Ok(())
    }

    /// Rate for a currency; the base currency always converts at 1
    pub fn rate(&self, currency: &str) -> Result<BigDecimal, CurrencyError> {
        if currency == self.base {
            return Ok(BigDecimal::from(1));
        }
        self.rates
            .get(currency)
            .cloned()
            .ok_or_else(|| CurrencyError::UnknownCurrency(currency.to_string()))
    }

    /// Convert an amount from `currency` into the base currency
    pub fn convert(
        &self,
        amount: &BigDecimal,
        currency: &str,
    ) -> Result<BigDecimal, CurrencyError> {
        Ok(amount * self.rate(currency)?)
    }

    /// Copy the expenses with every amount expressed in the base currency
    pub fn normalize_expenses(
        &self,
        expenses: &[ExpenseRecord],
    ) -> Result<Vec<ExpenseRecord>, CurrencyError> {
        expenses
            .iter()
            .map(|expense| {
                let mut normalized = expense.clone();
                if let Some(currency) = expense.currency.as_deref() {
                    normalized.amount = self.convert(&expense.amount, currency)?;
                }
                normalized.currency = Some(self.base.clone());
                Ok(normalized)
            })
            .collect()
    }
}

/// Currency conversion errors
#[derive(Debug, thiserror::Error)]
pub enum CurrencyError {
    #[error("Invalid exchange rate: {0}")]
    InvalidRate(String),
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
}
