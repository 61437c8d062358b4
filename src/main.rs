// src/main.rs
//! VoltBridge terminal client entry point.
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use voltbridge::assistant::{AssistantClient, ChatRole, ChatTranscript};
use voltbridge::chain::evm::EvmAdapter;
use voltbridge::chain::evm_signer::LocalEvmSigner;
use voltbridge::chain::solana::signer::LocalSolanaSigner;
use voltbridge::chain::solana::SolanaAdapter;
use voltbridge::core::config::BridgeConfig;
use voltbridge::tokens::{self, ChainId};
use voltbridge::workflow::BridgeWorkflow;

#[derive(Parser)]
#[command(name = "voltbridge")]
#[command(about = "Bridge assets between Base and Solana from the terminal")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// EVM signing key, 32-byte hex (env: VOLTBRIDGE_EVM_KEY)
    #[arg(long, global = true)]
    evm_key: Option<String>,

    /// Solana signing key, base58 32-byte seed (env: VOLTBRIDGE_SOLANA_KEY)
    #[arg(long, global = true)]
    solana_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show connected-wallet balances for the selected token
    Balance {
        /// Token symbol from the catalog
        #[arg(long, default_value = "ETH")]
        token: String,
        /// Source chain: base or solana
        #[arg(long, default_value = "base")]
        from: String,
    },
    /// Estimate the destination amount for a transfer
    Quote {
        #[arg(long)]
        amount: String,
        #[arg(long, default_value = "ETH")]
        token: String,
        #[arg(long, default_value = "base")]
        from: String,
    },
    /// Submit a bridge transfer on the source chain
    Bridge {
        #[arg(long)]
        amount: String,
        #[arg(long, default_value = "ETH")]
        token: String,
        #[arg(long, default_value = "base")]
        from: String,
    },
    /// Ask the bridge assistant a question
    Ask {
        question: Vec<String>,
    },
    /// List the supported token catalog
    Tokens,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging()?;
    info!("Starting VoltBridge v{}", env!("CARGO_PKG_VERSION"));

    let config = BridgeConfig::load(args.config.as_deref())?;

    match args.command {
        Commands::Tokens => {
            for chain in [ChainId::Base, ChainId::Solana] {
                println!("{}:", chain);
                for token in tokens::tokens_for(chain) {
                    println!("  {:<6} {} ({} decimals)", token.symbol, token.name, token.decimals);
                }
            }
        }
        Commands::Quote { amount, token, from } => {
            let from_chain = ChainId::from_str(&from)?;
            let token = tokens::find_token(from_chain, &token)
                .ok_or_else(|| anyhow::anyhow!("Unknown token '{}' on {}", token, from_chain))?;
            match voltbridge::workflow::estimate_receive_amount(&amount, token, from_chain) {
                Some(estimate) => {
                    println!(
                        "{} {} on {} -> ~{} on {} (fixed-rate estimate, {}% LP fee not included)",
                        amount,
                        token.symbol,
                        from_chain,
                        estimate,
                        from_chain.other(),
                        *tokens::BRIDGE_FEE_PERCENT * rust_decimal::Decimal::from(100)
                    );
                }
                None => anyhow::bail!("Invalid amount '{}'", amount),
            }
        }
        Commands::Ask { question } => {
            let question = question.join(" ");
            if question.trim().is_empty() {
                anyhow::bail!("Ask a question, e.g. `voltbridge ask how long does bridging take?`");
            }
            let client = AssistantClient::new(&config.assistant);
            let mut transcript = ChatTranscript::new();
            transcript.push(ChatRole::User, &question);
            let answer = client.ask(&question).await;
            transcript.push(ChatRole::Model, &answer);
            println!("{}", answer);
        }
        Commands::Balance { token, from } => {
            let from_chain = ChainId::from_str(&from)?;
            let mut workflow = build_workflow(&args.evm_key, &args.solana_key, config)?;
            connect_both(&mut workflow).await;
            if from_chain != workflow.from_chain() {
                workflow.swap_direction().await;
            }
            let token = tokens::find_token(from_chain, &token)
                .ok_or_else(|| anyhow::anyhow!("Unknown token '{}' on {}", token, from_chain))?;
            workflow.select_token(token).await?;

            let wallet = match from_chain {
                ChainId::Base => workflow.evm_wallet(),
                ChainId::Solana => workflow.solana_wallet(),
            };
            match &wallet.address {
                Some(address) => {
                    println!("{} {} ({}, {})", wallet.balance, token.symbol, from_chain, address)
                }
                None => println!("{} wallet is not connected", from_chain),
            }
        }
        Commands::Bridge { amount, token, from } => {
            let from_chain = ChainId::from_str(&from)?;
            let mut workflow = build_workflow(&args.evm_key, &args.solana_key, config)?;

            workflow.connect_evm().await?;
            workflow.connect_solana().await?;
            if from_chain != workflow.from_chain() {
                workflow.swap_direction().await;
            }
            let token = tokens::find_token(from_chain, &token)
                .ok_or_else(|| anyhow::anyhow!("Unknown token '{}' on {}", token, from_chain))?;
            workflow.select_token(token).await?;
            workflow.set_amount(&amount);

            if !workflow.is_ready() {
                anyhow::bail!("Bridge is not ready: check wallets and amount");
            }

            if let Some(estimate) = workflow.estimated_receive() {
                println!(
                    "Bridging {} {} from {} -> ~{} {} on {}",
                    amount,
                    token.symbol,
                    from_chain,
                    estimate,
                    workflow.destination_symbol(),
                    workflow.to_chain()
                );
            }

            match workflow.execute_bridge().await {
                Ok(tx_id) => {
                    println!("Bridge initiated: {}", tx_id);
                    if let Some(link) = workflow.explorer_link() {
                        println!("View on explorer: {}", link);
                    }
                }
                Err(e) if e.is_retryable() => {
                    anyhow::bail!("Transfer failed: {} (transient, retrying may succeed)", e)
                }
                Err(e) => anyhow::bail!("Transfer failed: {}", e),
            }
        }
    }

    Ok(())
}

/// Builds the workflow with local-key providers when keys are supplied, and
/// absent providers (connect fails with WalletNotFound) otherwise.
fn build_workflow(
    evm_key: &Option<String>,
    solana_key: &Option<String>,
    config: BridgeConfig,
) -> Result<BridgeWorkflow> {
    let evm_key = evm_key.clone().or_else(|| std::env::var("VOLTBRIDGE_EVM_KEY").ok());
    let solana_key = solana_key.clone().or_else(|| std::env::var("VOLTBRIDGE_SOLANA_KEY").ok());

    let evm_provider = match evm_key {
        Some(key) => Some(Arc::new(LocalEvmSigner::new(
            &config.evm.rpc_url,
            config.evm.chain_id,
            &key,
        )?) as Arc<dyn voltbridge::chain::evm::EvmWalletProvider>),
        None => None,
    };
    let solana_provider = match solana_key {
        Some(key) => Some(Arc::new(LocalSolanaSigner::from_base58(&key)?)
            as Arc<dyn voltbridge::chain::solana::SolanaWalletProvider>),
        None => None,
    };

    let evm_adapter = Arc::new(EvmAdapter::new(
        evm_provider,
        config.evm.clone(),
        config.evm_vault_address.clone(),
    ));
    let solana_adapter = Arc::new(SolanaAdapter::new(
        solana_provider,
        &config.solana,
        config.solana_vault_address.clone(),
    ));

    Ok(BridgeWorkflow::new(evm_adapter, solana_adapter, config))
}

/// Connects whichever wallets have providers, reporting failures without
/// aborting; `balance` should still work one-sided.
async fn connect_both(workflow: &mut BridgeWorkflow) {
    if let Err(e) = workflow.connect_evm().await {
        tracing::warn!("EVM wallet unavailable: {}", e);
    }
    if let Err(e) = workflow.connect_solana().await {
        tracing::warn!("Solana wallet unavailable: {}", e);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=info,h2=info"));

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;
    Ok(())
}
