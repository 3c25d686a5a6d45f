//!
//! Token metadata for assets tracked beside the primary currency.
//!
//! The sync engine only needs a token's contract address; decimals and names are used for display.
/// Token metadata lookup and the built-in token table
pub mod metadata;

pub use metadata::{PRIMARY_CURRENCY_DECIMALS, StaticTokenTable, TokenInfo, TokenMetadata};
