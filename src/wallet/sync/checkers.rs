//! Per-kind checkers.
//!
//! Each checker asks the provider gateway for one kind of data, validates the raw response
//! and shapes it into a `PartialUpdate` holding only that kind's field. Checkers never
//! touch wallet state; `run_checker` turns their result into a `CheckOutcome` and logs it.

use crate::provider::{
	ProviderGateway, ProviderRequest, ResponseSchema, SchemaValidator,
};
use crate::tokens::TokenMetadata;
use crate::wallet::sync::config::SyncConfig;
use crate::wallet::sync::poll_state::CheckKind;
use crate::wallet::sync::transaction_processor::TransactionShaper;
use crate::wallet::sync::update::{CheckError, CheckOutcome, PartialUpdate, TransactionBatch};

use alloy_primitives::U256;
use std::str::FromStr;
use tracing::{debug, warn};

/// Everything a checker may consult. Borrowed for the duration of one check.
pub struct CheckContext<'a> {
	pub address: &'a str,
	pub config: &'a SyncConfig,
	pub gateway: &'a dyn ProviderGateway,
	pub validator: &'a dyn SchemaValidator,
	pub tokens: &'a dyn TokenMetadata,
	pub shaper: &'a dyn TransactionShaper,
}

impl CheckContext<'_> {
	/// Invoke the gateway and reject responses that do not match `schema`.
	async fn fetch(
		&self,
		request: ProviderRequest,
		schema: ResponseSchema,
	) -> Result<serde_json::Value, CheckError> {
		let method = request.method();
		let raw = self.gateway.invoke(request).await?;
		if !self.validator.validate(schema, &raw) {
			return Err(CheckError::SchemaMismatch(method));
		}
		Ok(raw)
	}

	fn contract_address(&self, currency_code: &str) -> Result<String, CheckError> {
		self.tokens
			.token_info(currency_code)
			.map(|info| info.contract_address)
			.ok_or_else(|| CheckError::UnknownToken(currency_code.to_string()))
	}

	fn is_primary(&self, currency_code: &str) -> bool {
		currency_code == self.config.primary_currency
	}
}

/// A check for one data kind.
#[async_trait::async_trait]
pub trait Checker: Send + Sync {
	/// Fetch this kind's data. `Ok(None)` means nothing new.
	async fn check(&self, ctx: &CheckContext<'_>) -> Result<Option<PartialUpdate>, CheckError>;

	/// The poll key this checker serves.
	fn kind(&self) -> CheckKind;
}

/// Run a checker and classify its result. Never fails.
pub async fn run_checker(checker: &dyn Checker, ctx: &CheckContext<'_>) -> CheckOutcome {
	match checker.check(ctx).await {
		Ok(Some(update)) => {
			debug!("Check {} returned data", checker.kind());
			CheckOutcome::Updated(update)
		}
		Ok(None) => {
			debug!("Check {} found nothing new", checker.kind());
			CheckOutcome::Empty
		}
		Err(e) => {
			warn!("Check {} failed: {}", checker.kind(), e);
			CheckOutcome::Failed(e)
		}
	}
}

fn string_result(raw: &serde_json::Value) -> Result<&str, CheckError> {
	raw.get("result")
		.and_then(|r| r.as_str())
		.ok_or_else(|| CheckError::DecodeError("missing string result".to_string()))
}

/// Fetches the current block number.
pub struct BlockHeightChecker;

#[async_trait::async_trait]
impl Checker for BlockHeightChecker {
	async fn check(&self, ctx: &CheckContext<'_>) -> Result<Option<PartialUpdate>, CheckError> {
		let raw = ctx
			.fetch(ProviderRequest::BlockNumber, ResponseSchema::BlockHeight)
			.await?;
		let hex = string_result(&raw)?;
		let block_height = u64::from_str_radix(hex.trim_start_matches("0x"), 16)
			.map_err(|e| CheckError::DecodeError(format!("block height {}: {}", hex, e)))?;
		Ok(Some(PartialUpdate::block_height(block_height)))
	}

	fn kind(&self) -> CheckKind {
		CheckKind::BlockHeight
	}
}

/// Fetches the account's transaction count, which is the next nonce to use.
pub struct NonceChecker;

#[async_trait::async_trait]
impl Checker for NonceChecker {
	async fn check(&self, ctx: &CheckContext<'_>) -> Result<Option<PartialUpdate>, CheckError> {
		let request = ProviderRequest::TransactionCount {
			address: ctx.address.to_string(),
		};
		let raw = ctx.fetch(request, ResponseSchema::AccountNonce).await?;
		let count = string_result(&raw)?;
		let nonce = U256::from_str(count)
			.map_err(|e| CheckError::DecodeError(format!("nonce {}: {}", count, e)))?;
		if nonce > U256::from(u64::MAX) {
			return Err(CheckError::DecodeError(format!("nonce {} out of range", nonce)));
		}
		Ok(Some(PartialUpdate::nonce(nonce.to::<u64>())))
	}

	fn kind(&self) -> CheckKind {
		CheckKind::Nonce
	}
}

/// Fetches the balance of one token, or of the primary asset.
pub struct TokenBalanceChecker {
	pub currency_code: String,
}

#[async_trait::async_trait]
impl Checker for TokenBalanceChecker {
	async fn check(&self, ctx: &CheckContext<'_>) -> Result<Option<PartialUpdate>, CheckError> {
		let address = ctx.address.to_string();
		let request = if ctx.is_primary(&self.currency_code) {
			ProviderRequest::Balance { address }
		} else {
			ProviderRequest::TokenBalance {
				address,
				contract_address: ctx.contract_address(&self.currency_code)?,
			}
		};

		let raw = ctx.fetch(request, ResponseSchema::AccountBalance).await?;
		let balance = string_result(&raw)?;
		let balance = U256::from_str_radix(balance, 10)
			.map_err(|e| CheckError::DecodeError(format!("balance {}: {}", balance, e)))?;
		Ok(Some(PartialUpdate::balance(
			&self.currency_code,
			balance.to_string(),
		)))
	}

	fn kind(&self) -> CheckKind {
		CheckKind::Balance(self.currency_code.clone())
	}
}

/// Pages through a token's transaction history from `start_block`.
pub struct TokenTransactionsChecker {
	pub currency_code: String,
	pub start_block: u64,
}

#[async_trait::async_trait]
impl Checker for TokenTransactionsChecker {
	async fn check(&self, ctx: &CheckContext<'_>) -> Result<Option<PartialUpdate>, CheckError> {
		let is_primary = ctx.is_primary(&self.currency_code);
		let (schema, contract_address) = if is_primary {
			(ResponseSchema::Transactions, None)
		} else {
			(
				ResponseSchema::TokenTransactions,
				Some(ctx.contract_address(&self.currency_code)?),
			)
		};

		let page_size = ctx.config.page_size;
		let mut transactions = Vec::new();
		let mut page = 1u32;

		// A failed page ends the scan; whatever was gathered before it still counts.
		let scan_error = loop {
			let request = ProviderRequest::Transactions {
				address: ctx.address.to_string(),
				start_block: self.start_block,
				page,
				offset: page_size,
				contract_address: contract_address.clone(),
			};
			let raw = match ctx.fetch(request, schema).await {
				Ok(raw) => raw,
				Err(e) => break Some(e),
			};

			let records = raw
				.get("result")
				.and_then(|r| r.as_array())
				.map(Vec::as_slice)
				.unwrap_or_default();
			for record in records {
				match ctx.shaper.shape(record, &self.currency_code, is_primary, ctx.address) {
					Some(tx) => transactions.push(tx),
					None => debug!("Skipped unusable {} history record", self.currency_code),
				}
			}

			if records.is_empty() || records.len() < page_size as usize {
				break None;
			}
			page += 1;
		};

		if transactions.is_empty() {
			return match scan_error {
				Some(e) => Err(e),
				None => Ok(None),
			};
		}

		if let Some(e) = scan_error {
			warn!(
				"{} history scan ended early at page {} with {} records: {}",
				self.currency_code,
				page,
				transactions.len(),
				e
			);
		}

		debug!(
			"Found {} {} transactions from block {}",
			transactions.len(),
			self.currency_code,
			self.start_block
		);
		Ok(Some(PartialUpdate::transactions(
			&self.currency_code,
			TransactionBatch {
				start_block: self.start_block,
				transactions,
			},
		)))
	}

	fn kind(&self) -> CheckKind {
		CheckKind::Transactions(self.currency_code.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::provider::{EtherscanSchemaValidator, ProviderError};
	use crate::tokens::StaticTokenTable;
	use crate::wallet::sync::transaction_processor::EtherscanTransactionShaper;
	use serde_json::json;
	use std::collections::VecDeque;
	use std::sync::Mutex;

	const WALLET: &str = "0x00000000000000000000000000000000000000aa";

	/// Replays canned responses in order and records every request.
	#[derive(Default)]
	struct ScriptedGateway {
		responses: Mutex<VecDeque<Result<serde_json::Value, ProviderError>>>,
		requests: Mutex<Vec<ProviderRequest>>,
	}

	impl ScriptedGateway {
		fn new(responses: Vec<Result<serde_json::Value, ProviderError>>) -> Self {
			Self {
				responses: Mutex::new(responses.into()),
				requests: Mutex::default(),
			}
		}

		fn requests(&self) -> Vec<ProviderRequest> {
			self.requests.lock().unwrap().clone()
		}
	}

	#[async_trait::async_trait]
	impl ProviderGateway for ScriptedGateway {
		async fn invoke(
			&self,
			request: ProviderRequest,
		) -> Result<serde_json::Value, ProviderError> {
			self.requests.lock().unwrap().push(request);
			self.responses
				.lock()
				.unwrap()
				.pop_front()
				.unwrap_or(Err(ProviderError::NoData))
		}
	}

	fn page(len: usize, first_block: usize) -> serde_json::Value {
		let result: Vec<_> = (0..len)
			.map(|i| {
				json!({
					"blockNumber": (first_block + i).to_string(),
					"timeStamp": "1600000000",
					"hash": format!("0x{:x}", first_block + i),
					"from": "0x00000000000000000000000000000000000000bb",
					"to": WALLET,
					"value": "1",
					"gasPrice": "1",
					"gasUsed": "1",
					"contractAddress": "0xdac17f958d2ee523a2206206994597c13d831ec7"
				})
			})
			.collect();
		json!({ "status": "1", "result": result })
	}

	async fn run(gateway: &ScriptedGateway, checker: &dyn Checker) -> CheckOutcome {
		run_with_config(gateway, checker, SyncConfig::default()).await
	}

	async fn run_with_config(
		gateway: &ScriptedGateway,
		checker: &dyn Checker,
		config: SyncConfig,
	) -> CheckOutcome {
		let tokens = StaticTokenTable::mainnet();
		let shaper = EtherscanTransactionShaper;
		let ctx = CheckContext {
			address: WALLET,
			config: &config,
			gateway,
			validator: &EtherscanSchemaValidator,
			tokens: &tokens,
			shaper: &shaper,
		};
		run_checker(checker, &ctx).await
	}

	fn transactions_checker(token: &str, start_block: u64) -> TokenTransactionsChecker {
		TokenTransactionsChecker {
			currency_code: token.to_string(),
			start_block,
		}
	}

	#[tokio::test]
	async fn block_height_decodes_hex() {
		let gateway = ScriptedGateway::new(vec![Ok(json!({"jsonrpc": "2.0", "result": "0xcd"}))]);
		let update = run(&gateway, &BlockHeightChecker).await.into_update();
		assert_eq!(update.block_height, Some(205));
		assert_eq!(gateway.requests(), vec![ProviderRequest::BlockNumber]);
	}

	#[tokio::test]
	async fn nonce_normalizes_hex_count() {
		let gateway = ScriptedGateway::new(vec![Ok(json!({"result": "0x06"}))]);
		let update = run(&gateway, &NonceChecker).await.into_update();
		assert_eq!(update.nonce, Some(6));
		assert_eq!(
			gateway.requests(),
			vec![ProviderRequest::TransactionCount {
				address: WALLET.to_string()
			}]
		);
	}

	#[tokio::test]
	async fn schema_mismatch_is_a_failed_outcome() {
		let gateway = ScriptedGateway::new(vec![Ok(json!({"result": "not-hex"}))]);
		let outcome = run(&gateway, &BlockHeightChecker).await;
		assert!(matches!(
			outcome,
			CheckOutcome::Failed(CheckError::SchemaMismatch("eth_blockNumber"))
		));
	}

	#[tokio::test]
	async fn transport_failure_is_a_failed_outcome() {
		let gateway = ScriptedGateway::new(vec![Err(ProviderError::StatusError(503))]);
		let outcome = run(&gateway, &NonceChecker).await;
		assert!(matches!(
			outcome,
			CheckOutcome::Failed(CheckError::ProviderError(_))
		));
	}

	#[tokio::test]
	async fn primary_balance_uses_native_method() {
		let gateway = ScriptedGateway::new(vec![Ok(json!({"status": "1", "result": "000123"}))]);
		let checker = TokenBalanceChecker {
			currency_code: "ETH".to_string(),
		};
		let update = run(&gateway, &checker).await.into_update();
		assert_eq!(update.balances.get("ETH").map(String::as_str), Some("123"));
		assert_eq!(
			gateway.requests(),
			vec![ProviderRequest::Balance {
				address: WALLET.to_string()
			}]
		);
	}

	#[tokio::test]
	async fn token_balance_resolves_contract() {
		let gateway = ScriptedGateway::new(vec![Ok(json!({"status": "1", "result": "5000000"}))]);
		let checker = TokenBalanceChecker {
			currency_code: "USDT".to_string(),
		};
		let update = run(&gateway, &checker).await.into_update();
		assert_eq!(update.balances.get("USDT").map(String::as_str), Some("5000000"));
		assert_eq!(
			gateway.requests(),
			vec![ProviderRequest::TokenBalance {
				address: WALLET.to_string(),
				contract_address: "0xdac17f958d2ee523a2206206994597c13d831ec7".to_string(),
			}]
		);
	}

	#[tokio::test]
	async fn unknown_token_fails_without_calling_provider() {
		let gateway = ScriptedGateway::new(vec![]);
		let checker = TokenBalanceChecker {
			currency_code: "NOPE".to_string(),
		};
		let outcome = run(&gateway, &checker).await;
		assert!(matches!(
			outcome,
			CheckOutcome::Failed(CheckError::UnknownToken(_))
		));
		let outcome = run(&gateway, &transactions_checker("NOPE", 0)).await;
		assert!(matches!(
			outcome,
			CheckOutcome::Failed(CheckError::UnknownToken(_))
		));
		assert!(gateway.requests().is_empty());
	}

	#[tokio::test]
	async fn pagination_stops_on_short_page() {
		let gateway =
			ScriptedGateway::new(vec![Ok(page(50, 0)), Ok(page(50, 50)), Ok(page(13, 100))]);
		let update = run(&gateway, &transactions_checker("ETH", 59680))
			.await
			.into_update();

		assert_eq!(gateway.requests().len(), 3);
		let batch = &update.transactions["ETH"];
		assert_eq!(batch.start_block, 59680);
		assert_eq!(batch.transactions.len(), 113);
		assert_eq!(batch.transactions[112].block_height, 112);
	}

	#[tokio::test]
	async fn pagination_stops_on_empty_page() {
		let gateway = ScriptedGateway::new(vec![
			Ok(page(50, 0)),
			Ok(page(50, 50)),
			Ok(page(50, 100)),
			Ok(page(0, 0)),
		]);
		let update = run(&gateway, &transactions_checker("USDT", 0))
			.await
			.into_update();

		let requests = gateway.requests();
		assert_eq!(requests.len(), 4);
		assert_eq!(update.transactions["USDT"].transactions.len(), 150);
		match &requests[3] {
			ProviderRequest::Transactions {
				page,
				offset,
				contract_address,
				..
			} => {
				assert_eq!(*page, 4);
				assert_eq!(*offset, 50);
				assert!(contract_address.is_some());
			}
			other => panic!("unexpected request {:?}", other),
		}
	}

	#[tokio::test]
	async fn empty_page_ends_scan_for_any_page_size() {
		let gateway = ScriptedGateway::new(vec![Ok(page(0, 0)), Ok(page(0, 0))]);
		let config = SyncConfig {
			page_size: 0,
			..SyncConfig::default()
		};
		let outcome = run_with_config(&gateway, &transactions_checker("ETH", 0), config).await;
		assert_eq!(gateway.requests().len(), 1);
		assert!(matches!(outcome, CheckOutcome::Empty));
	}

	#[tokio::test]
	async fn mid_scan_failure_keeps_gathered_records() {
		let gateway = ScriptedGateway::new(vec![
			Ok(page(50, 0)),
			Err(ProviderError::StatusError(502)),
		]);
		let outcome = run(&gateway, &transactions_checker("ETH", 0)).await;
		assert_eq!(gateway.requests().len(), 2);
		match outcome {
			CheckOutcome::Updated(update) => {
				assert_eq!(update.transactions["ETH"].transactions.len(), 50)
			}
			other => panic!("unexpected outcome {:?}", other),
		}
	}

	#[tokio::test]
	async fn invalid_page_ends_scan() {
		let gateway = ScriptedGateway::new(vec![
			Ok(page(50, 0)),
			Ok(json!({"result": "garbage"})),
			Ok(page(10, 50)),
		]);
		let update = run(&gateway, &transactions_checker("ETH", 0))
			.await
			.into_update();
		assert_eq!(gateway.requests().len(), 2);
		assert_eq!(update.transactions["ETH"].transactions.len(), 50);
	}

	#[tokio::test]
	async fn empty_history_is_empty_outcome() {
		let gateway = ScriptedGateway::new(vec![Ok(
			json!({"status": "0", "message": "No transactions found", "result": []}),
		)]);
		let outcome = run(&gateway, &transactions_checker("ETH", 0)).await;
		assert!(matches!(outcome, CheckOutcome::Empty));
	}
}
