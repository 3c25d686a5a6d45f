//! Account sync engine and integration point for all sync services.
//!
//! This module defines the `SyncEngine`, which keeps one account's local state fresh by
//! polling the provider gateway. Each tick it evaluates every data kind against its own
//! cadence, runs the checkers that are due one after another, and hands each result to the
//! reconciler before the next checker starts.
//!
//! The engine is responsible for:
//! - Snapshotting the block height at the start of every tick
//! - Ordering checks: block height, nonce, then balance and transactions per enabled token
//! - Computing the lookback-adjusted start block of every history scan
//! - Driving ticks until its cancellation token fires
//!
//! `tick` performs a single pass and never sleeps, so tests can drive the engine with a
//! fake clock and gateway. `run` wraps it in the production loop.

use crate::provider::{ProviderGateway, SchemaValidator};
use crate::tokens::TokenMetadata;
use crate::wallet::sync::{
	checkers::{
		BlockHeightChecker, CheckContext, Checker, NonceChecker, TokenBalanceChecker,
		TokenTransactionsChecker, run_checker,
	},
	clock::Clock,
	config::SyncConfig,
	events::EventDispatcher,
	poll_state::{CheckKind, PollState},
	reconciler::Reconciler,
	transaction_processor::TransactionShaper,
	update::CheckStatus,
};
use crate::wallet::{SharedWalletState, WalletSyncError, lock_state};

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Collaborators the engine depends on.
#[derive(Clone)]
pub struct SyncContext {
	pub gateway: Arc<dyn ProviderGateway>,
	pub validator: Arc<dyn SchemaValidator>,
	pub tokens: Arc<dyn TokenMetadata>,
	pub shaper: Arc<dyn TransactionShaper>,
	pub clock: Arc<dyn Clock>,
}

/// Checks invoked during one tick, in invocation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
	pub checks: Vec<(CheckKind, CheckStatus)>,
}

impl TickReport {
	pub fn invoked(&self, kind: &CheckKind) -> bool {
		self.checks.iter().any(|(k, _)| k == kind)
	}

	pub fn status(&self, kind: &CheckKind) -> Option<CheckStatus> {
		self.checks
			.iter()
			.find(|(k, _)| k == kind)
			.map(|(_, status)| *status)
	}
}

/// Polling and reconciliation engine for one account.
pub struct SyncEngine {
	context: SyncContext,
	config: SyncConfig,
	wallet: SharedWalletState,
	poll_state: PollState,
	reconciler: Reconciler,
}

impl SyncEngine {
	/// Create an engine for `wallet`. Fails if `config` does not pass validation.
	pub fn new(
		context: SyncContext,
		config: SyncConfig,
		wallet: SharedWalletState,
		dispatcher: EventDispatcher,
	) -> Result<Self, WalletSyncError> {
		config.validate()?;
		Ok(Self {
			context,
			config,
			wallet,
			poll_state: PollState::new(),
			reconciler: Reconciler::new(dispatcher),
		})
	}

	pub fn wallet(&self) -> &SharedWalletState {
		&self.wallet
	}

	pub fn poll_state(&self) -> &PollState {
		&self.poll_state
	}

	pub fn config(&self) -> &SyncConfig {
		&self.config
	}

	/// Run ticks until `shutdown` is cancelled.
	///
	/// The token is only observed between ticks; a tick in progress always completes.
	pub async fn run(&mut self, shutdown: CancellationToken) {
		info!(
			"Starting account sync for {}",
			lock_state(&self.wallet).address()
		);

		while !shutdown.is_cancelled() {
			let report = self.tick().await;
			if !report.checks.is_empty() {
				debug!("Tick ran {} checks", report.checks.len());
			}

			tokio::select! {
				_ = shutdown.cancelled() => break,
				_ = tokio::time::sleep(self.config.tick_interval()) => {}
			}
		}

		info!("Account sync stopped");
	}

	/// Evaluate every data kind once and run the checks that are due.
	pub async fn tick(&mut self) -> TickReport {
		let (pre_update_height, address, enabled_tokens) = {
			let state = lock_state(&self.wallet);
			(
				state.block_height,
				state.address().to_string(),
				state.enabled_tokens.clone(),
			)
		};

		let mut report = TickReport::default();
		self.evaluate(&BlockHeightChecker, &address, pre_update_height, &mut report)
			.await;
		self.evaluate(&NonceChecker, &address, pre_update_height, &mut report)
			.await;

		for currency_code in enabled_tokens {
			let balance = TokenBalanceChecker {
				currency_code: currency_code.clone(),
			};
			self.evaluate(&balance, &address, pre_update_height, &mut report)
				.await;

			let last_query_height = lock_state(&self.wallet).last_query_height(&currency_code);
			let transactions = TokenTransactionsChecker {
				start_block: self.config.scan_start_block(last_query_height),
				currency_code,
			};
			self.evaluate(&transactions, &address, pre_update_height, &mut report)
				.await;
		}

		report
	}

	/// Run `checker` if its kind is due, then merge what it returned.
	async fn evaluate(
		&mut self,
		checker: &dyn Checker,
		address: &str,
		pre_update_height: u64,
		report: &mut TickReport,
	) {
		let kind = checker.kind();
		let now = self.context.clock.now_millis();
		if !self
			.poll_state
			.is_due(&kind, kind.interval(&self.config), now)
		{
			return;
		}

		let ctx = CheckContext {
			address,
			config: &self.config,
			gateway: self.context.gateway.as_ref(),
			validator: self.context.validator.as_ref(),
			tokens: self.context.tokens.as_ref(),
			shaper: self.context.shaper.as_ref(),
		};
		let outcome = run_checker(checker, &ctx).await;
		report.checks.push((kind, outcome.status()));

		self.reconciler.apply(
			outcome.into_update(),
			now,
			pre_update_height,
			&self.wallet,
			&mut self.poll_state,
		);
	}
}
