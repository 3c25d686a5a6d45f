//! Response shape validation for provider replies.

use super::types::EtherscanTransaction;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Expected shape of a provider response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSchema {
	BlockHeight,
	AccountNonce,
	AccountBalance,
	Transactions,
	TokenTransactions,
}

/// Checks whether a raw response matches the shape expected for a method.
///
/// Validators are pure: no I/O, no state.
pub trait SchemaValidator: Send + Sync {
	fn validate(&self, schema: ResponseSchema, raw: &serde_json::Value) -> bool;
}

#[derive(Deserialize)]
struct StringResult {
	result: String,
}

#[derive(Deserialize)]
struct TransactionList {
	result: Vec<EtherscanTransaction>,
}

/// Validator for Etherscan-compatible responses, built on typed deserialization.
#[derive(Debug, Clone, Copy, Default)]
pub struct EtherscanSchemaValidator;

impl EtherscanSchemaValidator {
	fn parse<T: DeserializeOwned>(raw: &serde_json::Value) -> Option<T> {
		T::deserialize(raw).ok()
	}
}

impl SchemaValidator for EtherscanSchemaValidator {
	fn validate(&self, schema: ResponseSchema, raw: &serde_json::Value) -> bool {
		match schema {
			ResponseSchema::BlockHeight | ResponseSchema::AccountNonce => {
				Self::parse::<StringResult>(raw).is_some_and(|r| is_hex_quantity(&r.result))
			}
			ResponseSchema::AccountBalance => {
				Self::parse::<StringResult>(raw).is_some_and(|r| is_decimal(&r.result))
			}
			ResponseSchema::Transactions => Self::parse::<TransactionList>(raw).is_some(),
			ResponseSchema::TokenTransactions => Self::parse::<TransactionList>(raw)
				.is_some_and(|list| list.result.iter().all(|tx| tx.contract_address.is_some())),
		}
	}
}

fn is_hex_quantity(value: &str) -> bool {
	value
		.strip_prefix("0x")
		.is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit()))
}

fn is_decimal(value: &str) -> bool {
	!value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn tx(contract: Option<&str>) -> serde_json::Value {
		let mut value = json!({
			"blockNumber": "1", "timeStamp": "2", "hash": "0x3", "from": "0x4",
			"to": "0x5", "value": "6", "gasPrice": "7", "gasUsed": "8"
		});
		if let Some(contract) = contract {
			value["contractAddress"] = json!(contract);
		}
		value
	}

	#[test]
	fn block_height_requires_hex_result() {
		let v = EtherscanSchemaValidator;
		assert!(v.validate(ResponseSchema::BlockHeight, &json!({"result": "0xcd"})));
		assert!(!v.validate(ResponseSchema::BlockHeight, &json!({"result": "205"})));
		assert!(!v.validate(ResponseSchema::BlockHeight, &json!({"result": "0x"})));
		assert!(!v.validate(ResponseSchema::BlockHeight, &json!({"status": "1"})));
	}

	#[test]
	fn balance_requires_decimal_result() {
		let v = EtherscanSchemaValidator;
		assert!(v.validate(ResponseSchema::AccountBalance, &json!({"status": "1", "result": "12345"})));
		assert!(!v.validate(ResponseSchema::AccountBalance, &json!({"result": "0x10"})));
		assert!(!v.validate(ResponseSchema::AccountBalance, &json!({"result": 10})));
	}

	#[test]
	fn transaction_lists_check_record_shape() {
		let v = EtherscanSchemaValidator;
		assert!(v.validate(ResponseSchema::Transactions, &json!({"result": [tx(None)]})));
		assert!(v.validate(ResponseSchema::Transactions, &json!({"status": "0", "result": []})));
		assert!(!v.validate(ResponseSchema::Transactions, &json!({"result": [{"hash": "0x1"}]})));
		assert!(!v.validate(ResponseSchema::TokenTransactions, &json!({"result": [tx(None)]})));
		assert!(v.validate(ResponseSchema::TokenTransactions, &json!({"result": [tx(Some("0xc"))]})));
	}
}
