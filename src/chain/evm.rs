//! EVM-side adapter. Wraps an EIP-1193 shaped wallet provider: account
//! access, network switch/add, read-only calls, and transaction submission
//! all go through the provider so the user's wallet stays in control of keys.

use async_trait::async_trait;
use ethers::types::{Address, Bytes, U256};
use ethers::utils::{format_ether, format_units, parse_ether, parse_units};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

use super::{map_provider_error, ChainAdapter, ConnectedAccount, ProviderRpcError, CODE_UNRECOGNIZED_CHAIN, CODE_USER_REJECTED};
use crate::core::abi;
use crate::core::config::EvmNetworkConfig;
use crate::core::errors::BridgeError;
use crate::core::validation;
use crate::tokens::{AssetRef, ChainId, Token};

/// Network registration parameters for `wallet_addEthereumChain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainRegistration {
    pub chain_id: u64,
    pub chain_name: String,
    pub rpc_url: String,
    pub explorer_url: String,
    pub currency_symbol: String,
    pub currency_decimals: u8,
}

impl ChainRegistration {
    pub fn from_config(config: &EvmNetworkConfig) -> Self {
        Self {
            chain_id: config.chain_id,
            chain_name: config.name.clone(),
            rpc_url: config.rpc_url.clone(),
            explorer_url: config.explorer_url.clone(),
            currency_symbol: config.currency_symbol.clone(),
            currency_decimals: config.currency_decimals,
        }
    }
}

/// Transaction submission request handed to the wallet provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub to: Address,
    pub value: U256,
    pub data: Option<Bytes>,
}

/// Capability interface over an injected EVM wallet.
#[async_trait]
pub trait EvmWalletProvider: Send + Sync {
    /// Prompts for account access and returns the authorized accounts.
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderRpcError>;

    /// The wallet's currently active chain id.
    async fn chain_id(&self) -> Result<u64, ProviderRpcError>;

    /// Requests a switch to `chain_id`. Fails with code 4902 when the wallet
    /// does not know the chain.
    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderRpcError>;

    /// Registers a network with the wallet.
    async fn add_chain(&self, registration: &ChainRegistration) -> Result<(), ProviderRpcError>;

    /// Native balance of `address` in wei.
    async fn get_balance(&self, address: Address) -> Result<U256, ProviderRpcError>;

    /// Read-only contract call (eth_call) against the active network.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderRpcError>;

    /// Signs and broadcasts a transaction, returning the hash immediately.
    async fn send_transaction(&self, request: &TransferRequest) -> Result<String, ProviderRpcError>;
}

/// Adapter over the EVM wallet provider for the Base side of the bridge.
pub struct EvmAdapter {
    provider: Option<Arc<dyn EvmWalletProvider>>,
    config: EvmNetworkConfig,
    vault_address: String,
}

impl EvmAdapter {
    pub fn new(
        provider: Option<Arc<dyn EvmWalletProvider>>,
        config: EvmNetworkConfig,
        vault_address: String,
    ) -> Self {
        Self { provider, config, vault_address }
    }

    pub fn required_chain_id(&self) -> u64 {
        self.config.chain_id
    }

    fn provider(&self) -> Result<&Arc<dyn EvmWalletProvider>, BridgeError> {
        self.provider.as_ref().ok_or_else(|| {
            BridgeError::WalletNotFound(
                "No EVM wallet found. Install a compatible wallet or configure a signing key."
                    .to_string(),
            )
        })
    }

    fn vault(&self) -> Result<Address, BridgeError> {
        validation::validate_evm_address(&self.vault_address)
            .map_err(|e| BridgeError::AddressError(e.to_string()))?;
        parse_address(&self.vault_address)
    }

    /// Reads `decimals()` from a token contract.
    async fn token_decimals(&self, contract: Address) -> Result<u8, BridgeError> {
        let provider = self.provider()?;
        let calldata = abi::abi_pack(abi::selector_from_signature("decimals()"), &[]);
        let raw = provider
            .call(contract, Bytes::from(calldata))
            .await
            .map_err(map_provider_error)?;
        abi::decode_uint8(&raw)
            .map_err(|e| BridgeError::RpcError(format!("Bad decimals() response: {}", e)))
    }
}

#[async_trait]
impl ChainAdapter for EvmAdapter {
    fn network(&self) -> ChainId {
        ChainId::Base
    }

    fn native_symbol(&self) -> &'static str {
        "ETH"
    }

    async fn connect(&self) -> Result<ConnectedAccount, BridgeError> {
        let provider = self.provider()?;

        let accounts = provider.request_accounts().await.map_err(map_provider_error)?;
        let address = accounts
            .into_iter()
            .next()
            .ok_or_else(|| BridgeError::ProviderError("Wallet returned no accounts".to_string()))?;
        validation::validate_evm_address(&address)
            .map_err(|e| BridgeError::AddressError(e.to_string()))?;
        let chain_id = provider.chain_id().await.map_err(map_provider_error)?;

        info!(address = %address, chain_id, "EVM wallet connected");
        Ok(ConnectedAccount { address, chain_id: Some(chain_id) })
    }

    async fn ensure_correct_network(&self) -> Result<(), BridgeError> {
        let provider = self.provider()?;
        let required = self.config.chain_id;

        match provider.switch_chain(required).await {
            Ok(()) => Ok(()),
            Err(e) if e.code == CODE_UNRECOGNIZED_CHAIN => {
                // The wallet has never seen this network; register it first.
                debug!(chain_id = required, "Chain unknown to wallet, requesting registration");
                let registration = ChainRegistration::from_config(&self.config);
                provider.add_chain(&registration).await.map_err(map_provider_error)
            }
            Err(e) => Err(map_provider_error(e)),
        }
    }

    async fn get_balance(&self, address: &str, token: &Token) -> Result<String, BridgeError> {
        let provider = self.provider()?;
        let owner = parse_address(address)?;

        match token.asset {
            AssetRef::Native => {
                let wei = provider.get_balance(owner).await.map_err(map_provider_error)?;
                Ok(format_ether(wei))
            }
            AssetRef::Contract(contract_addr) => {
                let contract = parse_address(contract_addr)?;
                let decimals = self.token_decimals(contract).await?;
                let calldata = abi::abi_pack(
                    abi::selector_from_signature("balanceOf(address)"),
                    &[abi::abi_word_address(address)?],
                );
                let raw = provider
                    .call(contract, Bytes::from(calldata))
                    .await
                    .map_err(map_provider_error)?;
                let balance = abi::decode_uint256(&raw)
                    .map_err(|e| BridgeError::RpcError(format!("Bad balanceOf response: {}", e)))?;
                format_units(balance, u32::from(decimals))
                    .map_err(|e| BridgeError::ValidationError(format!("Format failure: {}", e)))
            }
            AssetRef::Mint(_) => Err(BridgeError::ValidationError(format!(
                "Token {} does not live on {}",
                token.symbol,
                self.network()
            ))),
        }
    }

    async fn send_transfer(&self, amount: &str, token: &Token) -> Result<String, BridgeError> {
        let provider = self.provider()?;
        let vault = self.vault()?;

        let request = match token.asset {
            AssetRef::Native => {
                let value = parse_ether(amount).map_err(|e| {
                    BridgeError::ValidationError(format!("Invalid amount '{}': {}", amount, e))
                })?;
                TransferRequest { to: vault, value, data: None }
            }
            AssetRef::Contract(contract_addr) => {
                let contract = parse_address(contract_addr)?;
                let decimals = self.token_decimals(contract).await?;
                let value: U256 =
                    parse_units(amount, u32::from(decimals))
                        .map_err(|e| {
                            BridgeError::ValidationError(format!(
                                "Invalid amount '{}': {}",
                                amount, e
                            ))
                        })?
                        .into();
                let calldata = abi::abi_pack(
                    abi::selector_from_signature("transfer(address,uint256)"),
                    &[abi::abi_word_address(&self.vault_address)?, abi::abi_word_uint256(value)],
                );
                TransferRequest { to: contract, value: U256::zero(), data: Some(Bytes::from(calldata)) }
            }
            AssetRef::Mint(_) => {
                return Err(BridgeError::ValidationError(format!(
                    "Token {} does not live on {}",
                    token.symbol,
                    self.network()
                )))
            }
        };

        info!(amount = %amount, token = %token.symbol, "Submitting EVM bridge transfer");
        let tx_hash = provider.send_transaction(&request).await.map_err(map_provider_error)?;
        info!(tx_hash = %tx_hash, "EVM transfer broadcast");
        Ok(tx_hash)
    }
}

fn parse_address(address: &str) -> Result<Address, BridgeError> {
    Address::from_str(address)
        .map_err(|e| BridgeError::AddressError(format!("Invalid EVM address '{}': {}", address, e)))
}
