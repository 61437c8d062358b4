//! Static token catalog and the advisory rate table.
//!
//! Exactly two tokens per network: the native asset and USDC. The rate table
//! is a fixed set of constants used for the destination-amount estimate shown
//! to the user; it is display-only and is not a quote from any liquidity
//! source.

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two networks this client bridges between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainId {
    Base,
    Solana,
}

impl ChainId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainId::Base => "base",
            ChainId::Solana => "solana",
        }
    }

    /// The opposite side of the bridge.
    pub fn other(&self) -> ChainId {
        match self {
            ChainId::Base => ChainId::Solana,
            ChainId::Solana => ChainId::Base,
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base" => Ok(ChainId::Base),
            "solana" | "sol" => Ok(ChainId::Solana),
            other => Err(anyhow::anyhow!("Unknown chain: {}", other)),
        }
    }
}

/// How a token is referenced on its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetRef {
    /// The chain's base currency.
    Native,
    /// ERC-20 contract address on the EVM side.
    Contract(&'static str),
    /// SPL mint address on the Solana side.
    Mint(&'static str),
}

impl AssetRef {
    pub fn is_native(&self) -> bool {
        matches!(self, AssetRef::Native)
    }
}

/// Immutable token descriptor from the static catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub symbol: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub asset: AssetRef,
    pub decimals: u8,
    pub chain: ChainId,
}

pub static BASE_TOKENS: [Token; 2] = [
    Token {
        symbol: "ETH",
        name: "Ethereum",
        icon: "https://cryptologos.cc/logos/ethereum-eth-logo.png",
        asset: AssetRef::Native,
        decimals: 18,
        chain: ChainId::Base,
    },
    Token {
        symbol: "USDC",
        name: "USD Coin",
        icon: "https://cryptologos.cc/logos/usd-coin-usdc-logo.png",
        asset: AssetRef::Contract("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
        decimals: 6,
        chain: ChainId::Base,
    },
];

pub static SOLANA_TOKENS: [Token; 2] = [
    Token {
        symbol: "SOL",
        name: "Solana",
        icon: "https://cryptologos.cc/logos/solana-sol-logo.png",
        asset: AssetRef::Native,
        decimals: 9,
        chain: ChainId::Solana,
    },
    Token {
        symbol: "USDC",
        name: "USD Coin",
        icon: "https://cryptologos.cc/logos/usd-coin-usdc-logo.png",
        asset: AssetRef::Mint("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"),
        decimals: 6,
        chain: ChainId::Solana,
    },
];

/// All catalog entries for a chain (exactly two per network).
pub fn tokens_for(chain: ChainId) -> &'static [Token] {
    match chain {
        ChainId::Base => &BASE_TOKENS,
        ChainId::Solana => &SOLANA_TOKENS,
    }
}

/// The default selection for a chain, used after connect and direction swaps.
pub fn default_token(chain: ChainId) -> &'static Token {
    &tokens_for(chain)[0]
}

/// Finds a catalog token by symbol on a given chain.
pub fn find_token(chain: ChainId, symbol: &str) -> Option<&'static Token> {
    tokens_for(chain).iter().find(|t| t.symbol.eq_ignore_ascii_case(symbol))
}

/// Fixed directional rates. Placeholder constants, not live quotes.
pub static ETH_TO_SOL: Lazy<Decimal> = Lazy::new(|| Decimal::new(185, 1)); // 18.5
pub static SOL_TO_ETH: Lazy<Decimal> = Lazy::new(|| Decimal::new(54, 3)); // 0.054
pub static USDC_TO_USDC: Lazy<Decimal> = Lazy::new(|| Decimal::ONE);

/// Liquidity-provider fee, display only (0.1%).
pub static BRIDGE_FEE_PERCENT: Lazy<Decimal> = Lazy::new(|| Decimal::new(1, 3));

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_shape() {
        for chain in [ChainId::Base, ChainId::Solana] {
            let tokens = tokens_for(chain);
            assert_eq!(tokens.len(), 2);
            assert!(tokens[0].asset.is_native());
            assert!(tokens.iter().all(|t| t.chain == chain));
        }
        assert_eq!(default_token(ChainId::Base).symbol, "ETH");
        assert_eq!(default_token(ChainId::Solana).symbol, "SOL");
    }

    #[test]
    fn test_find_token() {
        assert_eq!(find_token(ChainId::Base, "usdc").unwrap().decimals, 6);
        assert!(find_token(ChainId::Solana, "ETH").is_none());
    }

    #[test]
    fn test_chain_id_parsing() {
        assert_eq!("base".parse::<ChainId>().unwrap(), ChainId::Base);
        assert_eq!("SOL".parse::<ChainId>().unwrap(), ChainId::Solana);
        assert!("bitcoin".parse::<ChainId>().is_err());
        assert_eq!(ChainId::Base.other(), ChainId::Solana);
    }

    #[test]
    fn test_rates() {
        assert_eq!(ETH_TO_SOL.to_string(), "18.5");
        assert_eq!(SOL_TO_ETH.to_string(), "0.054");
        assert_eq!(*USDC_TO_USDC, Decimal::ONE);
    }
}
