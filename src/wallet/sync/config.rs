//! Polling cadences and scan parameters for the sync engine.

use crate::wallet::WalletSyncError;

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Blocks re-scanned behind the last scan boundary, roughly one week of blocks.
pub const DEFAULT_LOOKBACK_BLOCKS: u64 = 4 * 60 * 24 * 7;

/// Configuration for the sync engine
///
/// Poll intervals are milliseconds. A data kind is due once strictly more than its
/// interval has elapsed since its last successful check.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
	pub block_height_poll: u64,
	pub nonce_poll: u64,
	pub balance_poll: u64,
	pub transactions_poll: u64,
	/// Pause between ticks
	pub tick_interval: u64,
	pub lookback_blocks: u64,
	/// Records requested per history page
	pub page_size: u32,
	pub primary_currency: String,
}

impl Default for SyncConfig {
	fn default() -> Self {
		Self {
			block_height_poll: 20_000,
			nonce_poll: 20_000,
			balance_poll: 20_000,
			transactions_poll: 20_000,
			tick_interval: 1_000,
			lookback_blocks: DEFAULT_LOOKBACK_BLOCKS,
			page_size: 50,
			primary_currency: "ETH".to_string(),
		}
	}
}

impl SyncConfig {
	/// Load a config from a JSON file. Missing fields keep their defaults.
	pub fn from_json_file(path: &Path) -> Result<Self, WalletSyncError> {
		let content = std::fs::read_to_string(path)?;
		let config: SyncConfig = serde_json::from_str(&content)?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<(), WalletSyncError> {
		if self.page_size == 0 {
			return Err(WalletSyncError::ConfigError(
				"page_size must be greater than zero".to_string(),
			));
		}
		if self.primary_currency.is_empty() {
			return Err(WalletSyncError::ConfigError(
				"primary_currency must not be empty".to_string(),
			));
		}
		Ok(())
	}

	pub fn tick_interval(&self) -> Duration {
		Duration::from_millis(self.tick_interval)
	}

	/// First block of a history scan for a token last scanned at `last_query_height`.
	pub fn scan_start_block(&self, last_query_height: u64) -> u64 {
		last_query_height.saturating_sub(self.lookback_blocks)
	}
}
