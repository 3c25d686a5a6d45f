use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Decimal places of the primary asset (wei per ether).
pub const PRIMARY_CURRENCY_DECIMALS: u32 = 18;

/// Metadata for a token tracked alongside the primary asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
	pub currency_code: String,
	pub currency_name: String,
	pub contract_address: String,
	pub decimals: u32,
}

/// Lookup of token metadata by currency code.
pub trait TokenMetadata: Send + Sync {
	fn token_info(&self, currency_code: &str) -> Option<TokenInfo>;
}

/// In-memory token table.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenTable {
	tokens: HashMap<String, TokenInfo>,
}

impl StaticTokenTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Well-known ERC-20 tokens on Ethereum mainnet.
	pub fn mainnet() -> Self {
		[
			("REP", "Augur", "0x1985365e9f78359a9B6AD760e32412f4a445E862", 18),
			("REPV2", "Augur v2", "0x221657776846890989a759BA2973e427DfF5C9bB", 18),
			("DAI", "Dai Stablecoin", "0x6B175474E89094C44Da98b954EedeAC495271d0F", 18),
			("WINGS", "Wings", "0x667088b212ce3d06a1b553a7221E1fD19000d9aF", 18),
			("AGLD", "Adventure Gold", "0xd668dab892f1b702a6b9ee01342508b14d4e62c5", 18),
			("USDT", "Tether", "0xdac17f958d2ee523a2206206994597c13d831ec7", 6),
			("USDC", "USD Coin", "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", 6),
			("LINK", "Chainlink", "0x514910771af9ca656af840dff83e8264ecf986ca", 18),
			("WBTC", "Wrapped Bitcoin", "0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599", 8),
			("UNI", "Uniswap", "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984", 18),
		]
		.into_iter()
		.fold(Self::new(), |table, (code, name, contract, decimals)| {
			table.with_token(TokenInfo {
				currency_code: code.to_string(),
				currency_name: name.to_string(),
				contract_address: contract.to_string(),
				decimals,
			})
		})
	}

	/// Add or replace a token entry.
	pub fn with_token(mut self, info: TokenInfo) -> Self {
		self.tokens.insert(info.currency_code.clone(), info);
		self
	}
}

impl TokenMetadata for StaticTokenTable {
	fn token_info(&self, currency_code: &str) -> Option<TokenInfo> {
		self.tokens.get(currency_code).cloned()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn mainnet_table_resolves_known_tokens() {
		let table = StaticTokenTable::mainnet();
		let usdt = table.token_info("USDT").unwrap();
		assert_eq!(usdt.contract_address, "0xdac17f958d2ee523a2206206994597c13d831ec7");
		assert_eq!(usdt.decimals, 6);
		assert!(table.token_info("ETH").is_none());
		assert!(table.token_info("usdt").is_none());
	}

	#[test]
	fn custom_tokens_override_builtins() {
		let table = StaticTokenTable::mainnet().with_token(TokenInfo {
			currency_code: "DAI".to_string(),
			currency_name: "Test Dai".to_string(),
			contract_address: "0x0000000000000000000000000000000000000001".to_string(),
			decimals: 18,
		});
		assert_eq!(table.token_info("DAI").unwrap().currency_name, "Test Dai");
	}
}
