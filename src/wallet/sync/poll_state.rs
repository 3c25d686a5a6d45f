//! Poll bookkeeping for the sync engine.
//!
//! This module provides `PollState`, which remembers when each data kind last produced
//! data, and `CheckKind`, the key it is indexed by. Block height and nonce have one key
//! each; balances and transactions have one key per token. The scheduler asks `is_due`
//! every tick and the reconciler calls `mark_checked` once a kind's update has been merged.

use crate::wallet::sync::config::SyncConfig;

use std::collections::HashMap;
use std::fmt;

/// One independently paced data kind
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CheckKind {
	BlockHeight,
	Nonce,
	Balance(String),
	Transactions(String),
}

impl CheckKind {
	/// Poll interval for this kind in milliseconds.
	pub fn interval(&self, config: &SyncConfig) -> u64 {
		match self {
			CheckKind::BlockHeight => config.block_height_poll,
			CheckKind::Nonce => config.nonce_poll,
			CheckKind::Balance(_) => config.balance_poll,
			CheckKind::Transactions(_) => config.transactions_poll,
		}
	}
}

impl fmt::Display for CheckKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CheckKind::BlockHeight => write!(f, "block height"),
			CheckKind::Nonce => write!(f, "nonce"),
			CheckKind::Balance(token) => write!(f, "{} balance", token),
			CheckKind::Transactions(token) => write!(f, "{} transactions", token),
		}
	}
}

/// Last successful check time per data kind.
///
/// A kind that has never been checked counts as checked at time zero, so it is due on the
/// first tick.
#[derive(Debug, Clone, Default)]
pub struct PollState {
	last_checked: HashMap<CheckKind, u64>,
}

impl PollState {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn last_checked(&self, kind: &CheckKind) -> u64 {
		self.last_checked.get(kind).copied().unwrap_or(0)
	}

	/// True once strictly more than `interval` ms have passed since the last check.
	pub fn is_due(&self, kind: &CheckKind, interval: u64, now: u64) -> bool {
		now.saturating_sub(self.last_checked(kind)) > interval
	}

	pub fn mark_checked(&mut self, kind: CheckKind, now: u64) {
		self.last_checked.insert(kind, now);
	}
}
