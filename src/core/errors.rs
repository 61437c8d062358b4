use std::fmt;

/// Custom error type for bridge client operations.
#[derive(Debug)]
pub enum BridgeError {
    /// Required wallet provider is not present.
    WalletNotFound(String),
    /// The user declined a wallet prompt.
    UserRejected(String),
    /// The wallet is on a different network than required.
    NetworkMismatch(String),
    /// Operation is intentionally not supported (e.g. SPL mint transfers).
    UnsupportedOperation(String),
    /// Failure surfaced by a wallet provider.
    ProviderError(String),
    /// Chain RPC endpoint failure.
    RpcError(String),
    /// Validation errors.
    ValidationError(String),
    /// Address parsing/format errors.
    AddressError(String),
    /// Configuration-related errors.
    ConfigError(String),
    /// Assistant endpoint failure or missing credential.
    AssistantUnavailable(String),
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::WalletNotFound(msg) => write!(f, "Wallet not found: {}", msg),
            BridgeError::UserRejected(msg) => write!(f, "Request rejected: {}", msg),
            BridgeError::NetworkMismatch(msg) => write!(f, "Network mismatch: {}", msg),
            BridgeError::UnsupportedOperation(msg) => write!(f, "Unsupported operation: {}", msg),
            BridgeError::ProviderError(msg) => write!(f, "Wallet provider error: {}", msg),
            BridgeError::RpcError(msg) => write!(f, "RPC error: {}", msg),
            BridgeError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            BridgeError::AddressError(msg) => write!(f, "Address error: {}", msg),
            BridgeError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            BridgeError::AssistantUnavailable(msg) => write!(f, "Assistant unavailable: {}", msg),
        }
    }
}

impl std::error::Error for BridgeError {}

impl BridgeError {
    /// Errors a user could reasonably retry by re-invoking the action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BridgeError::RpcError(_) | BridgeError::AssistantUnavailable(_))
    }
}

impl From<anyhow::Error> for BridgeError {
    fn from(err: anyhow::Error) -> Self {
        BridgeError::ValidationError(err.to_string())
    }
}

impl From<reqwest::Error> for BridgeError {
    fn from(err: reqwest::Error) -> Self {
        BridgeError::RpcError(err.to_string())
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::RpcError(format!("malformed response: {}", err))
    }
}
