//! Transfer workflow controller.
//!
//! Owns every piece of mutable client state — the two wallet records, the
//! form, and the transfer status — and mutates them only through the
//! transition methods here. Adapters and the assistant never touch this
//! state directly.

use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::chain::ChainAdapter;
use crate::core::config::BridgeConfig;
use crate::core::errors::BridgeError;
use crate::core::validation;
use crate::tokens::{self, ChainId, Token, ETH_TO_SOL, SOL_TO_ETH, USDC_TO_USDC};

/// Per-network wallet connection state. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletState {
    pub address: Option<String>,
    pub connected: bool,
    pub chain_id: Option<String>,
    /// Formatted balance; "..." while a refresh is pending.
    pub balance: String,
    /// Always true for Solana, which has no network-switching concept.
    pub is_correct_chain: bool,
}

impl WalletState {
    fn disconnected(chain_id: Option<&str>, is_correct_chain: bool) -> Self {
        Self {
            address: None,
            connected: false,
            chain_id: chain_id.map(str::to_string),
            balance: "0".to_string(),
            is_correct_chain,
        }
    }
}

/// Lifecycle of a single transfer attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    Idle,
    /// Waiting on the wallet prompt / network re-check.
    Approving,
    /// Transaction handed to the network, waiting for the broadcast result.
    Bridging,
    Completed,
    Failed,
}

/// Pure destination-amount estimate against the fixed rate table.
///
/// Advisory display only: same-symbol stablecoin pairs are 1:1, native pairs
/// use a fixed directional constant, anything else passes through. Returns
/// `None` for an empty or unparseable amount.
pub fn estimate_receive_amount(
    amount: &str,
    token: &Token,
    from_chain: ChainId,
) -> Option<String> {
    let value = Decimal::from_str(amount.trim()).ok()?;
    let rate = if token.symbol == "USDC" {
        *USDC_TO_USDC
    } else if from_chain == ChainId::Base && token.symbol == "ETH" {
        *ETH_TO_SOL
    } else if from_chain == ChainId::Solana && token.symbol == "SOL" {
        *SOL_TO_ETH
    } else {
        Decimal::ONE
    };
    Some(format!("{:.4}", value * rate))
}

pub struct BridgeWorkflow {
    evm: Arc<dyn ChainAdapter>,
    solana: Arc<dyn ChainAdapter>,
    config: BridgeConfig,

    evm_wallet: WalletState,
    sol_wallet: WalletState,

    from_chain: ChainId,
    token: &'static Token,
    amount: String,

    status: TransferStatus,
    tx_id: Option<String>,
    last_error: Option<String>,
}

impl BridgeWorkflow {
    pub fn new(
        evm: Arc<dyn ChainAdapter>,
        solana: Arc<dyn ChainAdapter>,
        config: BridgeConfig,
    ) -> Self {
        Self {
            evm,
            solana,
            config,
            evm_wallet: WalletState::disconnected(None, false),
            sol_wallet: WalletState::disconnected(Some("solana"), true),
            from_chain: ChainId::Base,
            token: tokens::default_token(ChainId::Base),
            amount: String::new(),
            status: TransferStatus::Idle,
            tx_id: None,
            last_error: None,
        }
    }

    // --- read-only views ---

    pub fn evm_wallet(&self) -> &WalletState {
        &self.evm_wallet
    }

    pub fn solana_wallet(&self) -> &WalletState {
        &self.sol_wallet
    }

    pub fn from_chain(&self) -> ChainId {
        self.from_chain
    }

    pub fn to_chain(&self) -> ChainId {
        self.from_chain.other()
    }

    pub fn selected_token(&self) -> &'static Token {
        self.token
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn status(&self) -> TransferStatus {
        self.status
    }

    pub fn tx_id(&self) -> Option<&str> {
        self.tx_id.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Readiness to submit: both wallets connected, a strictly-formatted
    /// positive amount within the token's precision, and (for a Base source)
    /// the EVM wallet on the required network. Derived from current state on
    /// every call, never stored.
    pub fn is_ready(&self) -> bool {
        self.evm_wallet.connected
            && self.sol_wallet.connected
            && validation::validate_amount_strict(&self.amount, usize::from(self.token.decimals))
                .is_ok()
            && (self.from_chain == ChainId::Solana || self.evm_wallet.is_correct_chain)
    }

    /// Symbol the user receives on the destination side.
    pub fn destination_symbol(&self) -> &'static str {
        if self.token.symbol == "USDC" {
            "USDC"
        } else {
            match self.to_chain() {
                ChainId::Base => "ETH",
                ChainId::Solana => "SOL",
            }
        }
    }

    /// Estimated destination amount for the current form.
    pub fn estimated_receive(&self) -> Option<String> {
        estimate_receive_amount(&self.amount, self.token, self.from_chain)
    }

    /// Block-explorer link for the completed transfer, when one exists.
    pub fn explorer_link(&self) -> Option<String> {
        let tx_id = self.tx_id.as_deref()?;
        let base = match self.from_chain {
            ChainId::Base => &self.config.evm.explorer_url,
            ChainId::Solana => &self.config.solana.explorer_url,
        };
        Some(format!("{}/tx/{}", base.trim_end_matches('/'), tx_id))
    }

    // --- transitions ---

    /// Connects the EVM wallet, switching it to the required network when it
    /// reports a different one, then refreshes the default-token balance.
    pub async fn connect_evm(&mut self) -> Result<(), BridgeError> {
        self.last_error = None;
        let result = self.try_connect_evm().await;
        if let Err(e) = &result {
            self.last_error = Some(e.to_string());
        }
        result
    }

    async fn try_connect_evm(&mut self) -> Result<(), BridgeError> {
        let adapter = Arc::clone(&self.evm);
        let account = adapter.connect().await?;
        let required = self.config.evm.chain_id;
        let is_correct = account.chain_id == Some(required);

        self.evm_wallet = WalletState {
            address: Some(account.address),
            connected: true,
            chain_id: account.chain_id.map(|id| id.to_string()),
            balance: "...".to_string(),
            is_correct_chain: is_correct,
        };

        if !is_correct {
            adapter.ensure_correct_network().await?;
            self.evm_wallet.is_correct_chain = true;
            self.evm_wallet.chain_id = Some(required.to_string());
        }

        self.refresh_wallet_balance(ChainId::Base, tokens::default_token(ChainId::Base)).await;
        Ok(())
    }

    /// Connects the Solana wallet and refreshes its default-token balance.
    pub async fn connect_solana(&mut self) -> Result<(), BridgeError> {
        self.last_error = None;
        let adapter = Arc::clone(&self.solana);
        let account = match adapter.connect().await {
            Ok(account) => account,
            Err(e) => {
                self.last_error = Some(e.to_string());
                return Err(e);
            }
        };

        self.sol_wallet = WalletState {
            address: Some(account.address),
            connected: true,
            chain_id: Some(ChainId::Solana.to_string()),
            balance: "...".to_string(),
            is_correct_chain: true,
        };

        self.refresh_wallet_balance(ChainId::Solana, tokens::default_token(ChainId::Solana)).await;
        Ok(())
    }

    pub fn disconnect(&mut self, chain: ChainId) {
        let wallet = match chain {
            ChainId::Base => &mut self.evm_wallet,
            ChainId::Solana => &mut self.sol_wallet,
        };
        wallet.connected = false;
        wallet.address = None;
    }

    pub fn set_amount(&mut self, amount: &str) {
        self.amount = amount.trim().to_string();
    }

    /// Selects a token from the source chain's catalog and refreshes the
    /// balance display for it.
    pub async fn select_token(&mut self, token: &'static Token) -> Result<(), BridgeError> {
        if token.chain != self.from_chain {
            return Err(BridgeError::ValidationError(format!(
                "Token {} belongs to {}, not the current source chain {}",
                token.symbol, token.chain, self.from_chain
            )));
        }
        self.token = token;
        self.refresh_balance().await;
        Ok(())
    }

    /// Swaps source and destination. The selected token resets to the new
    /// source chain's default and the amount is cleared.
    pub async fn swap_direction(&mut self) {
        self.from_chain = self.from_chain.other();
        self.token = tokens::default_token(self.from_chain);
        self.amount.clear();
        self.refresh_balance().await;
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    /// Refreshes the source wallet's balance for the selected token.
    /// Failures are logged and leave the previous balance untouched.
    pub async fn refresh_balance(&mut self) {
        self.refresh_wallet_balance(self.from_chain, self.token).await;
    }

    async fn refresh_wallet_balance(&mut self, chain: ChainId, token: &'static Token) {
        let adapter = match chain {
            ChainId::Base => Arc::clone(&self.evm),
            ChainId::Solana => Arc::clone(&self.solana),
        };
        let wallet = match chain {
            ChainId::Base => &self.evm_wallet,
            ChainId::Solana => &self.sol_wallet,
        };
        if !wallet.connected {
            return;
        }
        let Some(address) = wallet.address.clone() else {
            return;
        };

        match adapter.get_balance(&address, token).await {
            Ok(balance) => {
                let wallet = match chain {
                    ChainId::Base => &mut self.evm_wallet,
                    ChainId::Solana => &mut self.sol_wallet,
                };
                wallet.balance = balance;
            }
            Err(e) => {
                // Silent: the prior balance stays on display.
                warn!(chain = %chain, token = %token.symbol, "Failed to refresh balance: {}", e);
            }
        }
    }

    /// Submits the transfer on the source chain.
    ///
    /// idle -> approving -> bridging -> completed, or failed from any
    /// non-idle state. The entered amount survives a failure; only
    /// [`reset`](Self::reset) clears it.
    pub async fn execute_bridge(&mut self) -> Result<String, BridgeError> {
        if self.status != TransferStatus::Idle {
            return Err(BridgeError::ValidationError(
                "A transfer is already in progress; reset first".to_string(),
            ));
        }
        if !self.is_ready() {
            return Err(BridgeError::ValidationError(
                "Bridge is not ready: connect both wallets and enter a positive amount"
                    .to_string(),
            ));
        }

        self.last_error = None;
        self.status = TransferStatus::Approving;

        match self.submit_transfer().await {
            Ok(tx_id) => {
                info!(tx_id = %tx_id, from = %self.from_chain, "Bridge transfer initiated");
                self.tx_id = Some(tx_id.clone());
                self.status = TransferStatus::Completed;
                Ok(tx_id)
            }
            Err(e) => {
                self.status = TransferStatus::Failed;
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn submit_transfer(&mut self) -> Result<String, BridgeError> {
        let adapter = match self.from_chain {
            ChainId::Base => Arc::clone(&self.evm),
            ChainId::Solana => Arc::clone(&self.solana),
        };

        // The EVM wallet must be on the required network before submission;
        // switch it when the tracked state says it is not.
        if self.from_chain == ChainId::Base && !self.evm_wallet.is_correct_chain {
            adapter.ensure_correct_network().await?;
            self.evm_wallet.is_correct_chain = true;
        }

        self.status = TransferStatus::Bridging;
        adapter.send_transfer(&self.amount, self.token).await
    }

    /// Returns a finished (completed or failed) workflow to idle, clearing
    /// the amount and transaction id.
    pub fn reset(&mut self) {
        if matches!(self.status, TransferStatus::Completed | TransferStatus::Failed) {
            self.status = TransferStatus::Idle;
            self.amount.clear();
            self.tx_id = None;
            self.last_error = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("1", "ETH", ChainId::Base, "18.5000" ; "eth to sol at directional rate")]
    #[test_case("2", "ETH", ChainId::Base, "37.0000" ; "eth scales linearly")]
    #[test_case("1", "SOL", ChainId::Solana, "0.0540" ; "sol to eth at directional rate")]
    #[test_case("100", "USDC", ChainId::Base, "100.0000" ; "usdc is one to one from base")]
    #[test_case("0.5", "USDC", ChainId::Solana, "0.5000" ; "usdc is one to one from solana")]
    fn estimate_rates(amount: &str, symbol: &str, from: ChainId, expected: &str) {
        let token = tokens::find_token(from, symbol).expect("catalog token");
        assert_eq!(estimate_receive_amount(amount, token, from).unwrap(), expected);
    }

    #[test]
    fn estimate_passthrough_and_invalid() {
        // A SOL token quoted from the Base direction has no table entry and
        // passes through unchanged.
        let sol = tokens::find_token(ChainId::Solana, "SOL").unwrap();
        assert_eq!(estimate_receive_amount("3", sol, ChainId::Base).unwrap(), "3.0000");

        let eth = tokens::find_token(ChainId::Base, "ETH").unwrap();
        assert_eq!(estimate_receive_amount("", eth, ChainId::Base), None);
        assert_eq!(estimate_receive_amount("abc", eth, ChainId::Base), None);
    }
}
