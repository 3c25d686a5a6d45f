//! Event system for account synchronization.
//!
//! This module defines the notifications the sync engine emits to its owner, the handler
//! trait the owner implements, and the dispatcher that fans each event out to every
//! registered handler. The reconciler is the only producer of events; it dispatches them
//! after its merge step, once the shared wallet state is no longer locked.

use crate::wallet::{TransactionRecord, WalletSyncError};

/// Events that occur during account synchronization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
	/// The stored block height changed
	BlockHeightChanged { block_height: u64 },
	/// A token balance changed value
	BalanceChanged {
		currency_code: String,
		balance: String,
	},
	/// A batch of transactions was found by one or more history scans
	TransactionsChanged {
		transactions: Vec<TransactionRecord>,
	},
	/// Every enabled token has completed at least one history scan
	AddressesChecked,
	/// The block height moved, so pending outgoing transactions should be rechecked
	DroppedTransactionsRecheckRequested,
}

/// Trait for handling sync events.
///
/// Handlers run on the engine's task between checks, so they should return quickly.
pub trait SyncEventHandler: Send {
	/// Handle a sync event.
	fn handle(&mut self, event: &SyncEvent) -> Result<(), WalletSyncError>;

	/// Get the name of this handler for logging and diagnostics.
	fn name(&self) -> &'static str;
}

/// Event dispatcher that manages multiple event handlers.
#[derive(Default)]
pub struct EventDispatcher {
	handlers: Vec<Box<dyn SyncEventHandler>>,
}

impl EventDispatcher {
	/// Create a new, empty event dispatcher.
	pub fn new() -> Self {
		Self {
			handlers: Vec::new(),
		}
	}

	/// Register a new event handler.
	///
	/// Handlers are called in the order they are registered.
	pub fn register_handler(&mut self, handler: Box<dyn SyncEventHandler>) {
		self.handlers.push(handler);
	}

	/// Dispatch an event to all registered handlers.
	///
	/// Errors from handlers are logged, but do not stop other handlers from running.
	pub fn dispatch(&mut self, event: &SyncEvent) {
		for handler in &mut self.handlers {
			if let Err(e) = handler.handle(event) {
				tracing::error!("Handler {} failed to process event: {}", handler.name(), e);
			}
		}
	}
}
