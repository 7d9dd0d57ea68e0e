//! Debt settlement engine

pub mod balance;
pub mod engine;
pub mod options;
pub mod report;

pub use balance::*;
pub use engine::*;
pub use options::*;
pub use report::*;
