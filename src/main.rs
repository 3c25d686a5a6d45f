use eth_account_sync::provider::{EtherscanClient, EtherscanSchemaValidator};
use eth_account_sync::tokens::{PRIMARY_CURRENCY_DECIMALS, StaticTokenTable, TokenMetadata};
use eth_account_sync::utils::format_token_amount;
use eth_account_sync::wallet::sync::{
	EtherscanTransactionShaper, EventDispatcher, SyncConfig, SyncContext, SyncEvent,
	SyncEventHandler, SystemClock,
};
use eth_account_sync::wallet::{SyncEngine, WalletState, WalletSyncError, lock_state};

use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

const DEFAULT_API_URL: &str = "https://api.etherscan.io/api";

#[tokio::main(flavor = "current_thread")]
async fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::from_default_env()
				.add_directive(tracing::Level::INFO.into()),
		)
		.with_target(false)
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_file(false)
		.with_line_number(false)
		.with_timer(tracing_subscriber::fmt::time::time())
		.init();

	if let Err(e) = run().await {
		error!("Account sync failed: {}", e);
		std::process::exit(1);
	}
}

async fn run() -> Result<(), WalletSyncError> {
	let config = match std::env::var_os("ETH_SYNC_CONFIG") {
		Some(path) => SyncConfig::from_json_file(Path::new(&path))?,
		None => SyncConfig::default(),
	};

	let address = std::env::var("ETH_SYNC_ADDRESS")
		.map_err(|_| WalletSyncError::ConfigError("ETH_SYNC_ADDRESS is not set".to_string()))?;
	let api_url = std::env::var("ETH_SYNC_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
	let api_key = std::env::var("ETH_SYNC_API_KEY").ok();
	let token_list =
		std::env::var("ETH_SYNC_TOKENS").unwrap_or_else(|_| config.primary_currency.clone());
	let enabled_tokens: Vec<&str> = token_list
		.split(',')
		.map(str::trim)
		.filter(|t| !t.is_empty())
		.collect();

	let wallet = WalletState::new(&address, &enabled_tokens)?.into_shared();
	info!("Tracking {} for {:?}", address, enabled_tokens);

	let token_table = Arc::new(StaticTokenTable::mainnet());
	let context = SyncContext {
		gateway: Arc::new(EtherscanClient::new(api_url, api_key)?),
		validator: Arc::new(EtherscanSchemaValidator),
		tokens: token_table.clone(),
		shaper: Arc::new(EtherscanTransactionShaper),
		clock: Arc::new(SystemClock),
	};

	let mut dispatcher = EventDispatcher::new();
	dispatcher.register_handler(Box::new(LoggingHandler));

	let primary_currency = config.primary_currency.clone();
	let mut engine = SyncEngine::new(context, config, wallet.clone(), dispatcher)?;

	let shutdown = CancellationToken::new();
	let signal_token = shutdown.clone();
	tokio::spawn(async move {
		match tokio::signal::ctrl_c().await {
			Ok(()) => info!("Shutdown requested"),
			Err(e) => error!("Failed to listen for shutdown signal: {}", e),
		}
		signal_token.cancel();
	});

	engine.run(shutdown).await;

	let state = lock_state(&wallet);
	info!(
		"Final state: block height {}, next nonce {}",
		state.block_height, state.nonce
	);
	for token in &state.enabled_tokens {
		let decimals = if *token == primary_currency {
			Some(PRIMARY_CURRENCY_DECIMALS)
		} else {
			token_table.token_info(token).map(|info| info.decimals)
		};
		match (state.balance(token), decimals) {
			(Some(balance), Some(decimals)) => {
				info!("{} balance: {}", token, format_token_amount(balance, decimals))
			}
			(Some(balance), None) => info!("{} balance: {} (base units)", token, balance),
			(None, _) => info!("{} balance: unknown", token),
		}
	}

	Ok(())
}

/// Logs every engine event.
struct LoggingHandler;

impl SyncEventHandler for LoggingHandler {
	fn handle(&mut self, event: &SyncEvent) -> Result<(), WalletSyncError> {
		match event {
			SyncEvent::BlockHeightChanged { block_height } => {
				info!("Block height changed to {}", block_height)
			}
			SyncEvent::BalanceChanged {
				currency_code,
				balance,
			} => info!("{} balance changed to {}", currency_code, balance),
			SyncEvent::TransactionsChanged { transactions } => {
				info!("{} transactions changed", transactions.len());
				for tx in transactions {
					info!(
						"  {} {} {} at block {}",
						tx.txid, tx.native_amount, tx.currency_code, tx.block_height
					);
				}
			}
			SyncEvent::AddressesChecked => info!("All addresses checked"),
			SyncEvent::DroppedTransactionsRecheckRequested => {
				info!("Dropped transaction recheck requested")
			}
		}
		Ok(())
	}

	fn name(&self) -> &'static str {
		"LoggingHandler"
	}
}
