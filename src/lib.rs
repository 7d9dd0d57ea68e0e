//! # Tripsplit Core
//!
//! Shared expense tracking for group trips, with deterministic debt settlement.
//!
//! ## Features
//!
//! - **Debt settlement**: greedy matching of the largest debts with the largest credits
//! - **Expense model**: equal splits across any subset of companions, single or pooled payers
//! - **Currency normalization**: expenses in foreign currencies settled in the trip currency
//! - **Expense summaries**: totals by category and payer, in trip and home currency
//! - **Storage abstraction**: storage-agnostic design with trait-based storage
//!
//! ## Quick Start
//!
//! ```rust
//! use tripsplit_core::{settle, ExpenseRecord, Payer};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! let roster = vec!["alice".to_string(), "bob".to_string(), "chen".to_string()];
//! let dinner = ExpenseRecord::new(
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     "Dinner".to_string(),
//!     BigDecimal::from(90),
//!     Payer::from("alice"),
//!     roster.clone(),
//! );
//!
//! let transfers = settle(&roster, &[dinner]).unwrap();
//! assert_eq!(transfers.len(), 2);
//! assert!(transfers.iter().all(|t| t.to == "alice"));
//! ```

pub mod currency;
pub mod settlement;
pub mod traits;
pub mod trip;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use currency::*;
pub use settlement::*;
pub use traits::*;
pub use trip::*;
pub use types::*;

// Re-export expense patterns for convenience
pub use trip::expense::patterns;
