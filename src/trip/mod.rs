//! Trip expense tracking

pub mod book;
pub mod expense;

pub use book::*;
pub use expense::*;
