//! Core domain types and logic.

pub mod coins;
pub mod error;
pub mod exchange;
pub mod portfolio;
pub mod raw;
pub mod table;
pub mod transaction;
pub mod wallet;
