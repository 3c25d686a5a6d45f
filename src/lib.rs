//! Light-client account sync engine.
//!
//! Keeps one account's block height, nonce, balances and transaction history fresh by
//! polling remote data providers, with an independent cadence per data kind.

pub mod provider;
pub mod tokens;
pub mod utils;
pub mod wallet;
