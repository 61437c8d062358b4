//! Thin JSON-RPC 2.0 client over the public Solana endpoint. Only the four
//! methods the adapter needs.

use base64::Engine as _;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::core::errors::BridgeError;

pub struct SolanaRpcClient {
    http: reqwest::Client,
    url: String,
    commitment: String,
    next_id: AtomicU64,
}

impl SolanaRpcClient {
    pub fn new(url: &str, commitment: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            url: url.trim_end_matches('/').to_string(),
            commitment: commitment.to_string(),
            next_id: AtomicU64::new(1),
        }
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, BridgeError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(method, id, "Solana RPC request");

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BridgeError::RpcError(format!("{} request failed: {}", method, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::RpcError(format!("{} returned HTTP {}", method, status)));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| BridgeError::RpcError(format!("{} returned malformed JSON: {}", method, e)))?;

        if let Some(error) = payload.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message =
                error.get("message").and_then(Value::as_str).unwrap_or("unknown error");
            return Err(BridgeError::RpcError(format!("{} failed ({}): {}", method, code, message)));
        }

        payload
            .get("result")
            .cloned()
            .ok_or_else(|| BridgeError::RpcError(format!("{} response missing result", method)))
    }

    /// Account balance in lamports.
    pub async fn get_balance(&self, address: &str) -> Result<u64, BridgeError> {
        let result = self
            .request("getBalance", json!([address, {"commitment": self.commitment}]))
            .await?;
        result
            .get("value")
            .and_then(Value::as_u64)
            .ok_or_else(|| BridgeError::RpcError("getBalance response missing value".to_string()))
    }

    /// First parsed token account owned by `owner` for `mint`; `None` when
    /// the owner holds no account for that mint.
    pub async fn get_token_account_ui_amount(
        &self,
        owner: &str,
        mint: &str,
    ) -> Result<Option<String>, BridgeError> {
        let result = self
            .request(
                "getTokenAccountsByOwner",
                json!([
                    owner,
                    {"mint": mint},
                    {"encoding": "jsonParsed", "commitment": self.commitment}
                ]),
            )
            .await?;

        let accounts = result
            .get("value")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                BridgeError::RpcError("getTokenAccountsByOwner response missing value".to_string())
            })?;

        let Some(first) = accounts.first() else {
            return Ok(None);
        };
        let ui_amount = first
            .pointer("/account/data/parsed/info/tokenAmount/uiAmountString")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                BridgeError::RpcError("Token account missing parsed amount".to_string())
            })?;
        Ok(Some(ui_amount.to_string()))
    }

    /// Latest blockhash as raw 32 bytes.
    pub async fn get_latest_blockhash(&self) -> Result<[u8; 32], BridgeError> {
        let result = self
            .request("getLatestBlockhash", json!([{"commitment": self.commitment}]))
            .await?;
        let blockhash = result
            .pointer("/value/blockhash")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                BridgeError::RpcError("getLatestBlockhash response missing blockhash".to_string())
            })?;
        super::wire::pubkey_bytes(blockhash)
            .map_err(|e| BridgeError::RpcError(format!("Bad blockhash: {}", e)))
    }

    /// Broadcasts a signed wire transaction, returning the signature.
    pub async fn send_transaction(&self, wire_tx: &[u8]) -> Result<String, BridgeError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(wire_tx);
        let result = self
            .request(
                "sendTransaction",
                json!([encoded, {"encoding": "base64", "preflightCommitment": self.commitment}]),
            )
            .await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| BridgeError::RpcError("sendTransaction returned no signature".to_string()))
    }
}
