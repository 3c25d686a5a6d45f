//! Account Synchronization Module
//!
//! This module provides the polling and reconciliation engine that keeps one account's
//! local state fresh. It is composed of several submodules, each responsible for a specific
//! aspect of the sync process:
//!
//! - `orchestrator`: The engine itself. Runs ticks, decides which checks are due and in what order.
//! - `checkers`: One checker per data kind (block height, nonce, balance, transactions).
//! - `reconciler`: Merges checker results into wallet and poll state and emits events.
//! - `poll_state`: Per-kind last-checked timestamps and the due test.
//! - `events`: Event types, the handler trait and the dispatcher.
//! - `transaction_processor`: Shapes raw history records into transaction records.
//! - `update`: Partial updates and checker outcomes.
//! - `config`: Poll cadences, lookback window and page size.
//! - `clock`: Time source, injectable for tests.
//!
//! Checks run strictly one after another; each result is merged before the next check starts,
//! so wallet state never sees concurrent writers.

/// Time source
pub mod clock;
/// Per-kind checkers
pub mod checkers;
/// Engine configuration
pub mod config;
/// Event system for notifying the wallet owner
pub mod events;
/// Main coordinator for the polling loop
pub mod orchestrator;
/// Per-kind poll timestamps
pub mod poll_state;
/// Merge step for checker results
pub mod reconciler;
/// Transaction record shaping
pub mod transaction_processor;
/// Partial updates and check outcomes
pub mod update;

pub use clock::{Clock, SystemClock};
pub use config::SyncConfig;
pub use events::{EventDispatcher, SyncEvent, SyncEventHandler};
pub use orchestrator::*;
pub use poll_state::{CheckKind, PollState};
pub use transaction_processor::{EtherscanTransactionShaper, TransactionShaper};
pub use update::{CheckError, CheckOutcome, CheckStatus, PartialUpdate, TransactionBatch};
