//!
//! Utility module for the account sync engine.
//!
//! Re-exports formatting helpers used when reporting balances.
/// Utility functions for formatting and display
pub mod index;

pub use index::format_token_amount;
