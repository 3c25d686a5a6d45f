//! Types for provider requests, raw response shapes and provider errors

use serde::{Deserialize, Serialize};

/// A single remote call the sync engine needs answered.
///
/// Each variant corresponds to one provider method. The gateway decides how the call is
/// carried over the wire; the engine only cares about the method and its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderRequest {
	/// Current block number of the chain.
	BlockNumber,
	/// Number of transactions sent from an address, i.e. the next nonce.
	TransactionCount { address: String },
	/// Native (primary asset) balance of an address.
	Balance { address: String },
	/// ERC-20 balance of an address for the given token contract.
	TokenBalance {
		address: String,
		contract_address: String,
	},
	/// One page of transaction history starting at `start_block`.
	///
	/// `contract_address` is set for token transfers and absent for the primary asset.
	Transactions {
		address: String,
		start_block: u64,
		page: u32,
		offset: u32,
		contract_address: Option<String>,
	},
}

impl ProviderRequest {
	/// Name of the remote method, used for logging and diagnostics.
	pub fn method(&self) -> &'static str {
		match self {
			ProviderRequest::BlockNumber => "eth_blockNumber",
			ProviderRequest::TransactionCount { .. } => "eth_getTransactionCount",
			ProviderRequest::Balance { .. } => "eth_getBalance",
			ProviderRequest::TokenBalance { .. } => "getTokenBalance",
			ProviderRequest::Transactions { .. } => "getTransactions",
		}
	}
}

/// Raw transaction record as returned by an Etherscan-compatible history endpoint.
///
/// Both the plain and the token transfer lists share these fields. Token transfers
/// additionally carry the contract address and token symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtherscanTransaction {
	pub block_number: String,
	pub time_stamp: String,
	pub hash: String,
	pub from: String,
	pub to: String,
	pub value: String,
	pub gas_price: String,
	pub gas_used: String,
	/// "1" when execution failed. Absent on token transfer lists.
	#[serde(default)]
	pub is_error: Option<String>,
	#[serde(default)]
	pub contract_address: Option<String>,
	#[serde(default)]
	pub token_symbol: Option<String>,
}

/// Error types for provider gateway operations
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
	#[error("HTTP error: {0}")]
	HttpError(#[from] reqwest::Error),

	#[error("HTTP status {0}")]
	StatusError(u16),

	#[error("JSON parse error: {0}")]
	JsonError(#[from] serde_json::Error),

	#[error("RPC error {code}: {message}")]
	RpcError { code: i64, message: String },

	#[error("API error: {0}")]
	ApiError(String),

	#[error("No data returned")]
	NoData,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn method_names_follow_provider_catalogue() {
		assert_eq!(ProviderRequest::BlockNumber.method(), "eth_blockNumber");
		let request = ProviderRequest::Transactions {
			address: "0xabc".to_string(),
			start_block: 0,
			page: 1,
			offset: 50,
			contract_address: None,
		};
		assert_eq!(request.method(), "getTransactions");
	}

	#[test]
	fn etherscan_transaction_tolerates_missing_optional_fields() {
		let raw = serde_json::json!({
			"blockNumber": "100",
			"timeStamp": "1600000000",
			"hash": "0xAA",
			"from": "0x1",
			"to": "0x2",
			"value": "10",
			"gasPrice": "2",
			"gasUsed": "3"
		});
		let tx: EtherscanTransaction = serde_json::from_value(raw).unwrap();
		assert_eq!(tx.block_number, "100");
		assert!(tx.is_error.is_none());
		assert!(tx.contract_address.is_none());
	}
}
