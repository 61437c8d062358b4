//! Solana-side adapter. Balance reads and broadcast go through the public
//! RPC endpoint; account access and signing stay with the wallet provider.

pub mod rpc;
pub mod signer;
pub mod wire;

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

use super::{map_provider_error, ChainAdapter, ConnectedAccount, ProviderRpcError};
use crate::core::config::SolanaNetworkConfig;
use crate::core::errors::BridgeError;
use crate::core::validation;
use crate::tokens::{AssetRef, ChainId, Token, LAMPORTS_PER_SOL};
use rpc::SolanaRpcClient;

/// Capability interface over an injected Solana wallet.
#[async_trait]
pub trait SolanaWalletProvider: Send + Sync {
    /// Prompts for connection and returns the active base58 public key.
    async fn connect(&self) -> Result<String, ProviderRpcError>;

    /// Signs raw message bytes with the active key.
    async fn sign_message(&self, message: &[u8]) -> Result<[u8; 64], ProviderRpcError>;
}

pub struct SolanaAdapter {
    provider: Option<Arc<dyn SolanaWalletProvider>>,
    rpc: SolanaRpcClient,
    vault_address: String,
}

impl SolanaAdapter {
    pub fn new(
        provider: Option<Arc<dyn SolanaWalletProvider>>,
        config: &SolanaNetworkConfig,
        vault_address: String,
    ) -> Self {
        let rpc = SolanaRpcClient::new(&config.rpc_url, &config.commitment);
        Self { provider, rpc, vault_address }
    }

    /// Variant for tests that need to point the RPC client elsewhere.
    pub fn with_rpc(
        provider: Option<Arc<dyn SolanaWalletProvider>>,
        rpc: SolanaRpcClient,
        vault_address: String,
    ) -> Self {
        Self { provider, rpc, vault_address }
    }

    fn provider(&self) -> Result<&Arc<dyn SolanaWalletProvider>, BridgeError> {
        self.provider.as_ref().ok_or_else(|| {
            BridgeError::WalletNotFound(
                "Solana wallet not found. Install a compatible wallet or configure a signing key."
                    .to_string(),
            )
        })
    }

    fn lamports_from_amount(amount: &str) -> Result<u64, BridgeError> {
        let value = validation::parse_amount(amount)
            .map_err(|e| BridgeError::ValidationError(e.to_string()))?;
        let lamports = (value * Decimal::from(LAMPORTS_PER_SOL)).floor();
        lamports.to_u64().ok_or_else(|| {
            BridgeError::ValidationError(format!("Amount '{}' exceeds the representable range", amount))
        })
    }
}

#[async_trait]
impl ChainAdapter for SolanaAdapter {
    fn network(&self) -> ChainId {
        ChainId::Solana
    }

    fn native_symbol(&self) -> &'static str {
        "SOL"
    }

    async fn connect(&self) -> Result<ConnectedAccount, BridgeError> {
        let provider = self.provider()?;
        let address = provider.connect().await.map_err(map_provider_error)?;
        validation::validate_solana_address(&address)
            .map_err(|e| BridgeError::AddressError(e.to_string()))?;

        info!(address = %address, "Solana wallet connected");
        Ok(ConnectedAccount { address, chain_id: None })
    }

    async fn get_balance(&self, address: &str, token: &Token) -> Result<String, BridgeError> {
        match token.asset {
            AssetRef::Native => {
                let lamports = self.rpc.get_balance(address).await?;
                let sol = Decimal::from(lamports) / Decimal::from(LAMPORTS_PER_SOL);
                Ok(sol.normalize().to_string())
            }
            AssetRef::Mint(mint) => {
                // First token account for the mint, or zero when none exists.
                let amount = self.rpc.get_token_account_ui_amount(address, mint).await?;
                Ok(amount.unwrap_or_else(|| "0".to_string()))
            }
            AssetRef::Contract(_) => Err(BridgeError::ValidationError(format!(
                "Token {} does not live on {}",
                token.symbol,
                self.network()
            ))),
        }
    }

    async fn send_transfer(&self, amount: &str, token: &Token) -> Result<String, BridgeError> {
        match token.asset {
            AssetRef::Native => {}
            AssetRef::Mint(_) => {
                // Mint transfers would require the token-program instruction
                // set; this workflow deliberately refuses them.
                return Err(BridgeError::UnsupportedOperation(
                    "SPL token transfers are not supported on the Solana leg. Bridge SOL instead."
                        .to_string(),
                ));
            }
            AssetRef::Contract(_) => {
                return Err(BridgeError::ValidationError(format!(
                    "Token {} does not live on {}",
                    token.symbol,
                    self.network()
                )))
            }
        }

        let provider = self.provider()?;
        let lamports = Self::lamports_from_amount(amount)?;

        let payer = provider.connect().await.map_err(map_provider_error)?;
        let from = wire::pubkey_bytes(&payer)
            .map_err(|e| BridgeError::AddressError(e.to_string()))?;
        let to = wire::pubkey_bytes(&self.vault_address)
            .map_err(|e| BridgeError::AddressError(e.to_string()))?;

        let blockhash = self.rpc.get_latest_blockhash().await?;
        let message = wire::build_transfer_message(&from, &to, lamports, &blockhash);
        let signature = provider.sign_message(&message).await.map_err(map_provider_error)?;
        let wire_tx = wire::assemble_transaction(&signature, &message);

        info!(amount = %amount, lamports, "Submitting Solana bridge transfer");
        let tx_signature = self.rpc.send_transaction(&wire_tx).await?;
        info!(signature = %tx_signature, "Solana transfer broadcast");
        Ok(tx_signature)
    }
}
