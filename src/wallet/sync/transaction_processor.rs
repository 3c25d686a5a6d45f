use crate::provider::EtherscanTransaction;
use crate::wallet::TransactionRecord;

use alloy_primitives::U256;
use tracing::debug;

/// Shapes a raw provider history record into a `TransactionRecord`.
pub trait TransactionShaper: Send + Sync {
	/// `is_primary` marks records of the asset fees are paid in.
	/// Returns `None` when the record cannot be interpreted; the caller skips it.
	fn shape(
		&self,
		raw: &serde_json::Value,
		currency_code: &str,
		is_primary: bool,
		address: &str,
	) -> Option<TransactionRecord>;
}

/// Shaper for Etherscan history records.
#[derive(Debug, Clone, Copy, Default)]
pub struct EtherscanTransactionShaper;

impl EtherscanTransactionShaper {
	fn parse_u256(field: &str, value: &str) -> Option<U256> {
		U256::from_str_radix(value, 10)
			.map_err(|e| debug!("Unparseable {} {:?}: {}", field, value, e))
			.ok()
	}
}

impl TransactionShaper for EtherscanTransactionShaper {
	fn shape(
		&self,
		raw: &serde_json::Value,
		currency_code: &str,
		is_primary: bool,
		address: &str,
	) -> Option<TransactionRecord> {
		let tx: EtherscanTransaction = serde_json::from_value(raw.clone())
			.map_err(|e| debug!("Skipping malformed history record: {}", e))
			.ok()?;

		let value = Self::parse_u256("value", &tx.value)?;
		let gas_price = Self::parse_u256("gasPrice", &tx.gas_price)?;
		let gas_used = Self::parse_u256("gasUsed", &tx.gas_used)?;
		let block_height = tx.block_number.parse::<u64>().ok()?;
		let date = tx.time_stamp.parse::<u64>().ok()?;

		let sent = tx.from.eq_ignore_ascii_case(address);
		let received = tx.to.eq_ignore_ascii_case(address);
		let fee = gas_price.saturating_mul(gas_used);

		// Fees are paid in the primary asset, so only primary amounts include them.
		let native_amount = match (sent, received) {
			(true, true) if is_primary => signed(fee, true),
			(true, true) => "0".to_string(),
			(true, false) if is_primary => signed(value.saturating_add(fee), true),
			(true, false) => signed(value, true),
			_ => signed(value, false),
		};
		let network_fee = if sent { fee } else { U256::ZERO };

		Some(TransactionRecord {
			txid: tx.hash.to_lowercase(),
			currency_code: currency_code.to_string(),
			block_height,
			date,
			native_amount,
			network_fee: network_fee.to_string(),
			from: tx.from.to_lowercase(),
			to: tx.to.to_lowercase(),
			is_error: tx.is_error.as_deref() == Some("1"),
		})
	}
}

fn signed(amount: U256, negative: bool) -> String {
	if negative && !amount.is_zero() {
		format!("-{}", amount)
	} else {
		amount.to_string()
	}
}
