//! Currency handling for trip expenses

pub mod exchange;

pub use exchange::*;
