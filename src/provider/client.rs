//!
//! HTTP client for Etherscan-compatible account data providers.
//!
//! This module provides the `ProviderGateway` seam used by the sync engine and its default
//! implementation, `EtherscanClient`, which carries every `ProviderRequest` over a single
//! Etherscan-style query API. Responses are returned as raw JSON; checking their shape is
//! the job of the schema validator.

use super::types::*;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Invoke a remote provider method and return its raw response.
///
/// Implementations hide which endpoint answered. Timeouts, if any, belong here.
#[async_trait::async_trait]
pub trait ProviderGateway: Send + Sync {
	async fn invoke(&self, request: ProviderRequest) -> Result<serde_json::Value, ProviderError>;
}

/// Highest block accepted by the history endpoint as an open upper bound.
const END_BLOCK: u64 = 999_999_999;

/// Etherscan-compatible provider client
#[derive(Clone)]
pub struct EtherscanClient {
	/// The underlying HTTP client.
	http_client: Client,
	/// Base URL of the query API, e.g. `https://api.etherscan.io/api`.
	api_url: String,
	/// Optional API key appended to every request.
	api_key: Option<String>,
}

impl EtherscanClient {
	/// Create a new provider client.
	///
	/// # Arguments
	/// * `api_url` - The query API endpoint.
	/// * `api_key` - Optional API key.
	pub fn new(api_url: String, api_key: Option<String>) -> Result<Self, ProviderError> {
		let http_client = Client::builder().timeout(Duration::from_secs(30)).build()?;

		Ok(Self {
			http_client,
			api_url,
			api_key,
		})
	}

	/// Translate a request into Etherscan query parameters.
	fn query_params(&self, request: &ProviderRequest) -> Vec<(&'static str, String)> {
		let mut params = match request {
			ProviderRequest::BlockNumber => vec![
				("module", "proxy".to_string()),
				("action", "eth_blockNumber".to_string()),
			],
			ProviderRequest::TransactionCount { address } => vec![
				("module", "proxy".to_string()),
				("action", "eth_getTransactionCount".to_string()),
				("address", address.clone()),
				("tag", "latest".to_string()),
			],
			ProviderRequest::Balance { address } => vec![
				("module", "account".to_string()),
				("action", "balance".to_string()),
				("address", address.clone()),
				("tag", "latest".to_string()),
			],
			ProviderRequest::TokenBalance {
				address,
				contract_address,
			} => vec![
				("module", "account".to_string()),
				("action", "tokenbalance".to_string()),
				("contractaddress", contract_address.clone()),
				("address", address.clone()),
				("tag", "latest".to_string()),
			],
			ProviderRequest::Transactions {
				address,
				start_block,
				page,
				offset,
				contract_address,
			} => {
				let action = if contract_address.is_some() {
					"tokentx"
				} else {
					"txlist"
				};
				let mut params = vec![
					("module", "account".to_string()),
					("action", action.to_string()),
					("address", address.clone()),
					("startblock", start_block.to_string()),
					("endblock", END_BLOCK.to_string()),
					("page", page.to_string()),
					("offset", offset.to_string()),
					("sort", "asc".to_string()),
				];
				if let Some(contract) = contract_address {
					params.push(("contractaddress", contract.clone()));
				}
				params
			}
		};

		if let Some(key) = &self.api_key {
			params.push(("apikey", key.clone()));
		}
		params
	}
}

#[async_trait::async_trait]
impl ProviderGateway for EtherscanClient {
	async fn invoke(&self, request: ProviderRequest) -> Result<serde_json::Value, ProviderError> {
		debug!("Invoking provider method {}", request.method());

		let response = self
			.http_client
			.get(&self.api_url)
			.query(&self.query_params(&request))
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(ProviderError::StatusError(response.status().as_u16()));
		}

		let response_json: serde_json::Value = response.json().await?;
		check_api_errors(&response_json)?;

		Ok(response_json)
	}
}

/// Surface error payloads that arrive with a successful HTTP status.
///
/// Proxy calls report failures as JSON-RPC `error` objects. Account calls use
/// `status: "0"` with an explanatory string `result`; an empty history list also comes
/// back with status "0" and is not an error.
fn check_api_errors(response: &serde_json::Value) -> Result<(), ProviderError> {
	if let Some(error) = response.get("error") {
		let code = error.get("code").and_then(|c| c.as_i64()).unwrap_or(0);
		let message = error
			.get("message")
			.and_then(|m| m.as_str())
			.unwrap_or("Unknown RPC error")
			.to_string();
		return Err(ProviderError::RpcError { code, message });
	}

	if response.get("status").and_then(|s| s.as_str()) == Some("0") {
		return match response.get("result") {
			Some(serde_json::Value::Array(_)) => Ok(()),
			Some(serde_json::Value::String(reason)) => Err(ProviderError::ApiError(reason.clone())),
			_ => Err(ProviderError::NoData),
		};
	}

	Ok(())
}
