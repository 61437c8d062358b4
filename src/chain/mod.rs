pub mod evm;
pub mod evm_signer;
pub mod solana;

use async_trait::async_trait;

use crate::core::errors::BridgeError;
use crate::tokens::{ChainId, Token};

/// EIP-1193 error code for a user-rejected request.
pub const CODE_USER_REJECTED: i64 = 4001;
/// EIP-3085/3326 error code for a chain the wallet does not know.
pub const CODE_UNRECOGNIZED_CHAIN: i64 = 4902;

/// Error surfaced by a wallet provider, carrying the provider's numeric code.
#[derive(Debug, Clone, thiserror::Error)]
#[error("provider error {code}: {message}")]
pub struct ProviderRpcError {
    pub code: i64,
    pub message: String,
}

impl ProviderRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == CODE_USER_REJECTED
    }
}

/// Maps a provider-surfaced error onto the crate error type, preserving the
/// user-rejection distinction.
pub fn map_provider_error(e: ProviderRpcError) -> BridgeError {
    if e.is_user_rejection() {
        BridgeError::UserRejected(e.message)
    } else {
        BridgeError::ProviderError(e.message)
    }
}

/// Result of a successful wallet connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedAccount {
    pub address: String,
    /// Numeric chain id for EVM networks; `None` where the network has no
    /// such notion (Solana).
    pub chain_id: Option<u64>,
}

/// Standard interface the workflow uses to talk to either network.
///
/// Adapters are stateless beyond the provider handle they wrap; all mutable
/// state lives in the workflow controller.
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    /// Which side of the bridge this adapter serves.
    fn network(&self) -> ChainId;

    /// Symbol of the chain's base currency.
    fn native_symbol(&self) -> &'static str;

    /// Requests account access from the wallet provider.
    async fn connect(&self) -> Result<ConnectedAccount, BridgeError>;

    /// Asks the wallet to switch to the required network, registering it
    /// first when the wallet does not know it. Networks without a switching
    /// concept return Ok.
    async fn ensure_correct_network(&self) -> Result<(), BridgeError> {
        Ok(())
    }

    /// Reads a formatted balance for `address`. Read-only.
    async fn get_balance(&self, address: &str, token: &Token) -> Result<String, BridgeError>;

    /// Submits a transfer of `amount` to the network's vault address and
    /// returns the transaction identifier at broadcast. Does not wait for
    /// confirmation.
    async fn send_transfer(&self, amount: &str, token: &Token) -> Result<String, BridgeError>;
}
