use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// EVM network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvmNetworkConfig {
    #[serde(default = "EvmNetworkConfig::default_name")]
    pub name: String,

    #[serde(default = "EvmNetworkConfig::default_rpc_url")]
    pub rpc_url: String,

    #[serde(default = "EvmNetworkConfig::default_chain_id")]
    pub chain_id: u64,

    #[serde(default = "EvmNetworkConfig::default_explorer_url")]
    pub explorer_url: String,

    #[serde(default = "EvmNetworkConfig::default_currency_symbol")]
    pub currency_symbol: String,

    #[serde(default = "EvmNetworkConfig::default_currency_decimals")]
    pub currency_decimals: u8,
}

impl EvmNetworkConfig {
    fn default_name() -> String {
        "Base Mainnet".to_string()
    }
    fn default_rpc_url() -> String {
        "https://mainnet.base.org".to_string()
    }
    fn default_chain_id() -> u64 {
        8453
    }
    fn default_explorer_url() -> String {
        "https://basescan.org".to_string()
    }
    fn default_currency_symbol() -> String {
        "ETH".to_string()
    }
    fn default_currency_decimals() -> u8 {
        18
    }
}

impl Default for EvmNetworkConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            rpc_url: Self::default_rpc_url(),
            chain_id: Self::default_chain_id(),
            explorer_url: Self::default_explorer_url(),
            currency_symbol: Self::default_currency_symbol(),
            currency_decimals: Self::default_currency_decimals(),
        }
    }
}

/// Solana network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolanaNetworkConfig {
    #[serde(default = "SolanaNetworkConfig::default_rpc_url")]
    pub rpc_url: String,

    #[serde(default = "SolanaNetworkConfig::default_explorer_url")]
    pub explorer_url: String,

    #[serde(default = "SolanaNetworkConfig::default_commitment")]
    pub commitment: String,
}

impl SolanaNetworkConfig {
    fn default_rpc_url() -> String {
        "https://api.mainnet-beta.solana.com".to_string()
    }
    fn default_explorer_url() -> String {
        "https://solscan.io".to_string()
    }
    fn default_commitment() -> String {
        "confirmed".to_string()
    }
}

impl Default for SolanaNetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: Self::default_rpc_url(),
            explorer_url: Self::default_explorer_url(),
            commitment: Self::default_commitment(),
        }
    }
}

/// Assistant endpoint configuration. The API key is only ever read from the
/// environment, never from a config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "AssistantConfig::default_api_url")]
    pub api_url: String,

    #[serde(default = "AssistantConfig::default_model")]
    pub model: String,

    #[serde(skip)]
    pub api_key: Option<String>,
}

impl AssistantConfig {
    fn default_api_url() -> String {
        "https://generativelanguage.googleapis.com/v1beta".to_string()
    }
    fn default_model() -> String {
        "gemini-2.5-flash".to_string()
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self { api_url: Self::default_api_url(), model: Self::default_model(), api_key: None }
    }
}

/// Top-level client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub evm: EvmNetworkConfig,

    #[serde(default)]
    pub solana: SolanaNetworkConfig,

    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Destination vault on the EVM side. Funds sent here are picked up by the
    /// bridge operator; this client never waits for the destination leg.
    #[serde(default = "BridgeConfig::default_evm_vault")]
    pub evm_vault_address: String,

    /// Destination vault on the Solana side.
    #[serde(default = "BridgeConfig::default_solana_vault")]
    pub solana_vault_address: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            evm: EvmNetworkConfig::default(),
            solana: SolanaNetworkConfig::default(),
            assistant: AssistantConfig::default(),
            evm_vault_address: Self::default_evm_vault(),
            solana_vault_address: Self::default_solana_vault(),
        }
    }
}

impl BridgeConfig {
    fn default_evm_vault() -> String {
        "0x000000000000000000000000000000000000dEaD".to_string()
    }
    fn default_solana_vault() -> String {
        "11111111111111111111111111111111".to_string()
    }

    /// Loads configuration from an optional TOML file, then applies
    /// environment overrides. Missing file fields fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config: BridgeConfig = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p).map_err(|e| {
                    anyhow::anyhow!("Failed to read config file {}: {}", p.display(), e)
                })?;
                toml::from_str(&raw)
                    .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", p.display(), e))?
            }
            None => BridgeConfig::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("VOLTBRIDGE_EVM_RPC_URL") {
            if !url.trim().is_empty() {
                self.evm.rpc_url = url.trim().to_string();
            }
        }
        if let Ok(url) = std::env::var("VOLTBRIDGE_SOLANA_RPC_URL") {
            if !url.trim().is_empty() {
                self.solana.rpc_url = url.trim().to_string();
            }
        }
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                self.assistant.api_key = Some(key.trim().to_string());
            }
        }
    }
}
