use crate::provider::ProviderError;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Local view of one account's on-chain state.
///
/// The sync engine mutates this only from its reconcile step. The owner reads `dirty`
/// to decide when a write-back is due and clears it after persisting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletState {
	pub block_height: u64,
	address: String,
	pub enabled_tokens: Vec<String>,
	/// Next transaction sequence number to use
	pub nonce: u64,
	/// Per-token high-water mark for transaction history scans
	pub last_query_height: HashMap<String, u64>,
	/// Latest known balance per token, as a decimal string
	pub balances: HashMap<String, String>,
	#[serde(skip)]
	pub dirty: bool,
}

/// Wallet state shared between the sync engine and its owner.
pub type SharedWalletState = Arc<Mutex<WalletState>>;

impl WalletState {
	/// Create state for `address` tracking `enabled_tokens`, in order, without duplicates.
	pub fn new(address: &str, enabled_tokens: &[&str]) -> Result<Self, WalletSyncError> {
		let bytes = hex::decode(address.trim_start_matches("0x"))
			.map_err(|e| WalletSyncError::InvalidAddress(format!("{}: {}", address, e)))?;
		if bytes.len() != 20 {
			return Err(WalletSyncError::InvalidAddress(format!(
				"{}: expected 20 bytes, got {}",
				address,
				bytes.len()
			)));
		}

		let mut state = Self {
			block_height: 0,
			address: address.to_lowercase(),
			enabled_tokens: Vec::new(),
			nonce: 0,
			last_query_height: HashMap::new(),
			balances: HashMap::new(),
			dirty: false,
		};
		for token in enabled_tokens {
			state.enable_token(token);
		}
		state.dirty = false;
		Ok(state)
	}

	pub fn address(&self) -> &str {
		&self.address
	}

	pub fn into_shared(self) -> SharedWalletState {
		Arc::new(Mutex::new(self))
	}

	/// Start tracking a token. Returns false if it was already enabled.
	pub fn enable_token(&mut self, currency_code: &str) -> bool {
		if self.enabled_tokens.iter().any(|t| t == currency_code) {
			return false;
		}
		self.enabled_tokens.push(currency_code.to_string());
		self.dirty = true;
		true
	}

	/// Stop tracking a token. Balances and scan heights are kept.
	pub fn disable_token(&mut self, currency_code: &str) -> bool {
		let before = self.enabled_tokens.len();
		self.enabled_tokens.retain(|t| t != currency_code);
		let removed = self.enabled_tokens.len() != before;
		self.dirty |= removed;
		removed
	}

	pub fn balance(&self, currency_code: &str) -> Option<&str> {
		self.balances.get(currency_code).map(String::as_str)
	}

	pub fn last_query_height(&self, currency_code: &str) -> u64 {
		self.last_query_height.get(currency_code).copied().unwrap_or(0)
	}

	/// Clear the dirty flag, returning whether it was set.
	pub fn take_dirty(&mut self) -> bool {
		std::mem::take(&mut self.dirty)
	}
}

/// Lock shared wallet state. A poisoned lock still yields the state: every merge
/// writes whole fields, so a panic elsewhere cannot leave a half-written value.
pub fn lock_state(state: &Mutex<WalletState>) -> MutexGuard<'_, WalletState> {
	state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A transaction as reported to the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
	pub txid: String,
	pub currency_code: String,
	pub block_height: u64,
	/// Unix timestamp in seconds
	pub date: u64,
	/// Signed decimal amount relative to the wallet
	pub native_amount: String,
	pub network_fee: String,
	pub from: String,
	pub to: String,
	pub is_error: bool,
}

/// Error types for engine setup and configuration
#[derive(Debug, thiserror::Error)]
pub enum WalletSyncError {
	#[error("Provider error: {0}")]
	ProviderError(#[from] ProviderError),

	#[error("Invalid address: {0}")]
	InvalidAddress(String),

	#[error("Config error: {0}")]
	ConfigError(String),

	#[error("Event handler error: {0}")]
	HandlerError(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),

	#[error("JSON error: {0}")]
	JsonError(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
	use super::*;

	const ADDRESS: &str = "0x00000000000000000000000000000000000000AA";

	#[test]
	fn new_state_is_clean_and_dedups_tokens() {
		let state = WalletState::new(ADDRESS, &["ETH", "USDT", "ETH"]).unwrap();
		assert_eq!(state.enabled_tokens, vec!["ETH", "USDT"]);
		assert_eq!(state.address(), "0x00000000000000000000000000000000000000aa");
		assert!(!state.dirty);
	}

	#[test]
	fn rejects_malformed_addresses() {
		assert!(matches!(
			WalletState::new("0x1234", &[]),
			Err(WalletSyncError::InvalidAddress(_))
		));
		assert!(WalletState::new("not-hex", &[]).is_err());
	}

	#[test]
	fn token_changes_mark_dirty() {
		let mut state = WalletState::new(ADDRESS, &["ETH"]).unwrap();
		assert!(!state.enable_token("ETH"));
		assert!(!state.dirty);
		assert!(state.enable_token("DAI"));
		assert!(state.take_dirty());
		assert!(!state.dirty);
		assert!(state.disable_token("DAI"));
		assert!(state.dirty);
	}
}
