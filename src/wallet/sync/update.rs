use crate::provider::ProviderError;
use crate::wallet::TransactionRecord;

use std::collections::HashMap;

/// Transactions found by one history scan, with the block the scan started from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionBatch {
	pub start_block: u64,
	pub transactions: Vec<TransactionRecord>,
}

/// Sparse result of one check. Only the fields the check is responsible for are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialUpdate {
	pub block_height: Option<u64>,
	pub nonce: Option<u64>,
	pub balances: HashMap<String, String>,
	pub transactions: HashMap<String, TransactionBatch>,
}

impl PartialUpdate {
	pub fn block_height(block_height: u64) -> Self {
		Self {
			block_height: Some(block_height),
			..Self::default()
		}
	}

	pub fn nonce(nonce: u64) -> Self {
		Self {
			nonce: Some(nonce),
			..Self::default()
		}
	}

	pub fn balance(currency_code: &str, balance: String) -> Self {
		Self {
			balances: HashMap::from([(currency_code.to_string(), balance)]),
			..Self::default()
		}
	}

	pub fn transactions(currency_code: &str, batch: TransactionBatch) -> Self {
		Self {
			transactions: HashMap::from([(currency_code.to_string(), batch)]),
			..Self::default()
		}
	}

	pub fn is_empty(&self) -> bool {
		self.block_height.is_none()
			&& self.nonce.is_none()
			&& self.balances.is_empty()
			&& self.transactions.is_empty()
	}
}

/// Reasons a check produced no data
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
	#[error("Provider error: {0}")]
	ProviderError(#[from] ProviderError),

	#[error("Response to {0} failed schema validation")]
	SchemaMismatch(&'static str),

	#[error("No contract address known for token {0}")]
	UnknownToken(String),

	#[error("Decode error: {0}")]
	DecodeError(String),
}

/// Result of running one checker.
///
/// `Empty` and `Failed` merge identically; they differ only in what gets logged.
#[derive(Debug)]
pub enum CheckOutcome {
	Updated(PartialUpdate),
	Empty,
	Failed(CheckError),
}

impl CheckOutcome {
	pub fn into_update(self) -> PartialUpdate {
		match self {
			CheckOutcome::Updated(update) => update,
			CheckOutcome::Empty | CheckOutcome::Failed(_) => PartialUpdate::default(),
		}
	}

	pub fn status(&self) -> CheckStatus {
		match self {
			CheckOutcome::Updated(_) => CheckStatus::Updated,
			CheckOutcome::Empty => CheckStatus::Empty,
			CheckOutcome::Failed(_) => CheckStatus::Failed,
		}
	}
}

/// Outcome label kept in tick reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
	Updated,
	Empty,
	Failed,
}
