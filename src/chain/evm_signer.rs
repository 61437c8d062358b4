//! Local-key implementation of [`EvmWalletProvider`].
//!
//! Stands in for a browser wallet extension when the client runs from a
//! terminal: an `ethers` HTTP provider plus a `LocalWallet` signing key.
//! The signer is pinned to one configured chain, so switch requests succeed
//! only for that chain.

use anyhow::Result;
use async_trait::async_trait;
use ethers::{
    middleware::SignerMiddleware,
    prelude::Middleware,
    providers::{Http, Provider},
    signers::{LocalWallet, Signer},
    types::{
        transaction::eip2718::TypedTransaction, Address, Bytes, Eip1559TransactionRequest,
        NameOrAddress, TransactionRequest, U256,
    },
    utils::to_checksum,
};
use std::time::Duration;
use tracing::{debug, info};

use super::evm::{ChainRegistration, EvmWalletProvider, TransferRequest};
use super::ProviderRpcError;

/// Internal JSON-RPC error code used for transport-level failures.
const CODE_INTERNAL: i64 = -32603;

pub struct LocalEvmSigner {
    provider: Provider<Http>,
    wallet: LocalWallet,
    chain_id: u64,
}

impl LocalEvmSigner {
    /// Builds a signer from an RPC URL and a 32-byte hex private key.
    pub fn new(rpc_url: &str, chain_id: u64, private_key_hex: &str) -> Result<Self> {
        let rpc_url_clean = rpc_url.trim();
        let parsed_url = reqwest::Url::parse(rpc_url_clean)
            .map_err(|e| anyhow::anyhow!("Invalid EVM RPC URL '{}': {}", rpc_url_clean, e))?;

        // Short timeout; allow proxy environment vars.
        let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(10));
        if let Ok(proxy) = std::env::var("HTTPS_PROXY").or_else(|_| std::env::var("HTTP_PROXY")) {
            if let Ok(p) = reqwest::Proxy::all(proxy) {
                builder = builder.proxy(p);
            }
        }
        let client =
            builder.build().map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
        let provider = Provider::new(Http::new_with_client(parsed_url, client));

        let key = private_key_hex.trim().strip_prefix("0x").unwrap_or(private_key_hex.trim());
        let wallet = key
            .parse::<LocalWallet>()
            .map_err(|e| anyhow::anyhow!("Invalid EVM private key: {}", e))?
            .with_chain_id(chain_id);

        info!(address = %to_checksum(&wallet.address(), None), chain_id, "Local EVM signer ready");
        Ok(Self { provider, wallet, chain_id })
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    fn rpc_error(context: &str, e: impl std::fmt::Display) -> ProviderRpcError {
        ProviderRpcError::new(CODE_INTERNAL, format!("{}: {}", context, e))
    }

    /// EIP-1559 fee caps derived from the node's gas price. The priority fee
    /// targets 10% of gas price with a 1 gwei floor, clamped to the max fee:
    /// L2s like Base quote well under a gwei, and an unclamped floor would
    /// produce priority > max_fee, which nodes reject as invalid.
    fn fee_caps(gas_price: U256) -> (U256, U256) {
        let max_fee_per_gas = gas_price.saturating_mul(U256::from(2u64));
        let max_priority_fee_per_gas = (gas_price / U256::from(10u64))
            .max(U256::from(1_000_000_000u64))
            .min(max_fee_per_gas);
        (max_fee_per_gas, max_priority_fee_per_gas)
    }
}

#[async_trait]
impl EvmWalletProvider for LocalEvmSigner {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderRpcError> {
        Ok(vec![to_checksum(&self.wallet.address(), None)])
    }

    async fn chain_id(&self) -> Result<u64, ProviderRpcError> {
        // Report the chain the signer is pinned to; the RPC endpoint is
        // expected to match, which send_transaction verifies implicitly
        // through the signed chain id.
        Ok(self.chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderRpcError> {
        if chain_id == self.chain_id {
            Ok(())
        } else {
            Err(ProviderRpcError::new(
                CODE_INTERNAL,
                format!("Local signer is pinned to chain {}, cannot switch to {}", self.chain_id, chain_id),
            ))
        }
    }

    async fn add_chain(&self, registration: &ChainRegistration) -> Result<(), ProviderRpcError> {
        Err(ProviderRpcError::new(
            CODE_INTERNAL,
            format!("Local signer cannot register chain {}", registration.chain_id),
        ))
    }

    async fn get_balance(&self, address: Address) -> Result<U256, ProviderRpcError> {
        debug!(address = %to_checksum(&address, None), "Reading native balance");
        self.provider
            .get_balance(address, None)
            .await
            .map_err(|e| Self::rpc_error("Failed to get balance", e))
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ProviderRpcError> {
        let tx: TypedTransaction =
            TransactionRequest::new().to(NameOrAddress::Address(to)).data(data).into();
        self.provider.call(&tx, None).await.map_err(|e| Self::rpc_error("eth_call failed", e))
    }

    async fn send_transaction(&self, request: &TransferRequest) -> Result<String, ProviderRpcError> {
        let gas_price = self
            .provider
            .get_gas_price()
            .await
            .map_err(|e| Self::rpc_error("Failed to get gas price", e))?;
        debug!("send_transaction: gas_price = 0x{:x}", gas_price);

        let (max_fee_per_gas, max_priority_fee_per_gas) = Self::fee_caps(gas_price);

        let tx = Eip1559TransactionRequest {
            to: Some(NameOrAddress::Address(request.to)),
            value: Some(request.value),
            data: request.data.clone(),
            max_fee_per_gas: Some(max_fee_per_gas),
            max_priority_fee_per_gas: Some(max_priority_fee_per_gas),
            ..Default::default()
        };

        // Gas and nonce are filled by the middleware.
        let client = SignerMiddleware::new(self.provider.clone(), self.wallet.clone());
        let pending_tx = client
            .send_transaction(tx, None)
            .await
            .map_err(|e| Self::rpc_error("Failed to send transaction", e))?;

        let tx_hash = format!("0x{}", hex::encode(pending_tx.tx_hash().as_bytes()));
        info!(tx_hash = %tx_hash, "Transaction sent");
        Ok(tx_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_signer() -> LocalEvmSigner {
        // Throwaway test key, never funded.
        let key = "0x1111111111111111111111111111111111111111111111111111111111111111";
        LocalEvmSigner::new("http://127.0.0.1:8545", 8453, key).expect("signer")
    }

    #[test]
    fn test_fee_caps_sub_gwei_gas_price() {
        // 0.05 gwei, typical for Base: the 1 gwei priority floor must clamp
        // to the max fee instead of exceeding it.
        let (max_fee, priority) = LocalEvmSigner::fee_caps(U256::from(50_000_000u64));
        assert_eq!(max_fee, U256::from(100_000_000u64));
        assert_eq!(priority, max_fee);
        assert!(priority <= max_fee);
    }

    #[test]
    fn test_fee_caps_mainnet_gas_price() {
        // 20 gwei: max fee doubles, priority is 10% of gas price.
        let (max_fee, priority) = LocalEvmSigner::fee_caps(U256::from(20_000_000_000u64));
        assert_eq!(max_fee, U256::from(40_000_000_000u64));
        assert_eq!(priority, U256::from(2_000_000_000u64));
    }

    #[test]
    fn test_fee_caps_priority_floor() {
        // 5 gwei: 10% would be 0.5 gwei, the floor lifts it to 1 gwei.
        let (max_fee, priority) = LocalEvmSigner::fee_caps(U256::from(5_000_000_000u64));
        assert_eq!(priority, U256::from(1_000_000_000u64));
        assert!(priority <= max_fee);
    }

    #[test]
    fn test_new_rejects_bad_inputs() {
        assert!(LocalEvmSigner::new("not a url", 8453, "0x11").is_err());
        assert!(LocalEvmSigner::new("http://127.0.0.1:8545", 8453, "too-short").is_err());
    }

    #[tokio::test]
    async fn test_accounts_and_chain_pinning() {
        let signer = make_signer();
        let accounts = signer.request_accounts().await.unwrap();
        assert_eq!(accounts.len(), 1);
        assert!(accounts[0].starts_with("0x"));
        assert_eq!(signer.chain_id().await.unwrap(), 8453);

        assert!(signer.switch_chain(8453).await.is_ok());
        let err = signer.switch_chain(1).await.unwrap_err();
        assert!(err.message.contains("pinned"));
        assert!(!err.is_user_rejection());
    }
}
