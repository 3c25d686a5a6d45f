//! Provider integration module
//!
//! This module provides the gateway seam through which the sync engine reaches remote
//! account data providers, the default Etherscan-compatible client, the request catalogue
//! and the validator that checks response shapes before the engine trusts them.

/// HTTP client and the `ProviderGateway` trait
mod client;
/// Response shape validation
mod schema;
/// Request, response and error types
mod types;

pub use client::{EtherscanClient, ProviderGateway};
pub use schema::{EtherscanSchemaValidator, ResponseSchema, SchemaValidator};
pub use types::*;
