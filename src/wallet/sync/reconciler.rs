//! Merge step of the sync engine.
//!
//! The `Reconciler` is the only code that writes to `WalletState` and `PollState`. Each
//! call to `apply` merges one checker's `PartialUpdate` under the wallet lock, collects the
//! resulting events, releases the lock and only then dispatches the events to handlers.

use crate::wallet::sync::events::{EventDispatcher, SyncEvent};
use crate::wallet::sync::poll_state::{CheckKind, PollState};
use crate::wallet::sync::update::PartialUpdate;
use crate::wallet::{TransactionRecord, WalletState, lock_state};

use std::collections::HashSet;
use std::sync::Mutex;
use tracing::{debug, info};

pub struct Reconciler {
	dispatcher: EventDispatcher,
	/// Tokens whose history has been scanned successfully at least once
	checked_tokens: HashSet<String>,
	addresses_checked: bool,
	/// Transactions waiting to be reported to handlers
	pending_transactions: Vec<TransactionRecord>,
}

impl Reconciler {
	pub fn new(dispatcher: EventDispatcher) -> Self {
		Self {
			dispatcher,
			checked_tokens: HashSet::new(),
			addresses_checked: false,
			pending_transactions: Vec::new(),
		}
	}

	/// True once a history scan for `currency_code` has been merged.
	pub fn is_token_checked(&self, currency_code: &str) -> bool {
		self.checked_tokens.contains(currency_code)
	}

	/// Merge `update`, checked at `now`, into wallet and poll state.
	///
	/// `pre_update_height` is the block height snapshot taken at the start of the tick.
	/// Transaction scans record it as the token's scan boundary.
	pub fn apply(
		&mut self,
		update: PartialUpdate,
		now: u64,
		pre_update_height: u64,
		wallet: &Mutex<WalletState>,
		poll_state: &mut PollState,
	) {
		if update.is_empty() {
			return;
		}

		let mut events = Vec::new();
		{
			let mut state = lock_state(wallet);
			self.merge(update, now, pre_update_height, &mut state, poll_state, &mut events);
		}

		if !self.pending_transactions.is_empty() {
			events.push(SyncEvent::TransactionsChanged {
				transactions: std::mem::take(&mut self.pending_transactions),
			});
		}

		for event in &events {
			self.dispatcher.dispatch(event);
		}
	}

	fn merge(
		&mut self,
		update: PartialUpdate,
		now: u64,
		pre_update_height: u64,
		state: &mut WalletState,
		poll_state: &mut PollState,
		events: &mut Vec<SyncEvent>,
	) {
		if let Some(block_height) = update.block_height {
			// An unchanged height leaves the poll timestamp alone, so it is asked again next tick.
			if state.block_height != block_height {
				info!("Block height changed {} -> {}", state.block_height, block_height);
				poll_state.mark_checked(CheckKind::BlockHeight, now);
				state.block_height = block_height;
				state.dirty = true;
				events.push(SyncEvent::DroppedTransactionsRecheckRequested);
				events.push(SyncEvent::BlockHeightChanged { block_height });
			} else {
				debug!("Block height still {}", block_height);
			}
		}

		if let Some(nonce) = update.nonce {
			poll_state.mark_checked(CheckKind::Nonce, now);
			if state.nonce != nonce {
				info!("Nonce changed {} -> {}", state.nonce, nonce);
			}
			state.nonce = nonce;
			state.dirty = true;
		}

		for (currency_code, balance) in update.balances {
			poll_state.mark_checked(CheckKind::Balance(currency_code.clone()), now);
			if state.balance(&currency_code) != Some(balance.as_str()) {
				info!("{} balance is now {}", currency_code, balance);
				events.push(SyncEvent::BalanceChanged {
					currency_code: currency_code.clone(),
					balance: balance.clone(),
				});
			}
			state.balances.insert(currency_code, balance);
			state.dirty = true;
		}

		if update.transactions.is_empty() {
			return;
		}

		for (currency_code, batch) in update.transactions {
			poll_state.mark_checked(CheckKind::Transactions(currency_code.clone()), now);
			info!(
				"Merged {} {} transactions scanned from block {}",
				batch.transactions.len(),
				currency_code,
				batch.start_block
			);
			self.pending_transactions.extend(batch.transactions);
			state
				.last_query_height
				.insert(currency_code.clone(), pre_update_height);
			state.dirty = true;
			self.checked_tokens.insert(currency_code);
		}

		if !self.addresses_checked
			&& state
				.enabled_tokens
				.iter()
				.all(|token| self.checked_tokens.contains(token))
		{
			info!("All enabled tokens have been scanned");
			self.addresses_checked = true;
			events.push(SyncEvent::AddressesChecked);
		}
	}
}
