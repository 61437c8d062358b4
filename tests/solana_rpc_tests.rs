// tests/solana_rpc_tests.rs - RPC client and adapter against a mock endpoint

use httpmock::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

use voltbridge::chain::solana::signer::LocalSolanaSigner;
use voltbridge::chain::solana::{rpc::SolanaRpcClient, SolanaAdapter, SolanaWalletProvider};
use voltbridge::chain::ChainAdapter;
use voltbridge::core::errors::BridgeError;
use voltbridge::tokens::{self, ChainId};

const OWNER: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
const VAULT: &str = "11111111111111111111111111111111";

fn client_for(server: &MockServer) -> SolanaRpcClient {
    SolanaRpcClient::new(&server.base_url(), "confirmed")
}

#[tokio::test(flavor = "current_thread")]
async fn get_balance_returns_lamports() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).body_contains("getBalance");
        then.status(200)
            .json_body(json!({"jsonrpc": "2.0", "id": 1, "result": {"context": {"slot": 1}, "value": 1_500_000_000u64}}));
    });

    let lamports = client_for(&server).get_balance(OWNER).await.unwrap();
    assert_eq!(lamports, 1_500_000_000);
    mock.assert();
}

#[tokio::test(flavor = "current_thread")]
async fn rpc_error_object_is_surfaced() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST);
        then.status(200).json_body(
            json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32602, "message": "Invalid param: WrongSize"}}),
        );
    });

    let err = client_for(&server).get_balance("not-a-key").await.unwrap_err();
    match err {
        BridgeError::RpcError(msg) => {
            assert!(msg.contains("-32602"));
            assert!(msg.contains("Invalid param: WrongSize"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test(flavor = "current_thread")]
async fn http_failure_is_an_rpc_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST);
        then.status(503).body("upstream unavailable");
    });

    let err = client_for(&server).get_balance(OWNER).await.unwrap_err();
    assert!(matches!(err, BridgeError::RpcError(_)));
}

#[tokio::test(flavor = "current_thread")]
async fn token_account_amount_is_extracted() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).body_contains("getTokenAccountsByOwner");
        then.status(200).json_body(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {"context": {"slot": 1}, "value": [{
                "pubkey": "9zEKJXWiDUNRLRvYGd8G2MvYr35DhUQ9KyQBfbXUPvnG",
                "account": {"data": {"parsed": {"info": {
                    "mint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
                    "tokenAmount": {"amount": "12500000", "decimals": 6, "uiAmountString": "12.5"}
                }}}}
            }]}
        }));
    });

    let amount = client_for(&server)
        .get_token_account_ui_amount(OWNER, "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v")
        .await
        .unwrap();
    assert_eq!(amount.as_deref(), Some("12.5"));
}

#[tokio::test(flavor = "current_thread")]
async fn missing_token_account_reads_as_none() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).body_contains("getTokenAccountsByOwner");
        then.status(200).json_body(
            json!({"jsonrpc": "2.0", "id": 1, "result": {"context": {"slot": 1}, "value": []}}),
        );
    });

    let amount = client_for(&server)
        .get_token_account_ui_amount(OWNER, "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v")
        .await
        .unwrap();
    assert_eq!(amount, None);

    // At the adapter level an absent account displays as zero.
    let adapter = SolanaAdapter::with_rpc(None, client_for(&server), VAULT.to_string());
    let usdc = tokens::find_token(ChainId::Solana, "USDC").unwrap();
    assert_eq!(adapter.get_balance(OWNER, usdc).await.unwrap(), "0");
}

#[tokio::test(flavor = "current_thread")]
async fn native_balance_normalizes_to_sol() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).body_contains("getBalance");
        then.status(200).json_body(
            json!({"jsonrpc": "2.0", "id": 1, "result": {"context": {"slot": 1}, "value": 2_250_000_000u64}}),
        );
    });

    let adapter = SolanaAdapter::with_rpc(None, client_for(&server), VAULT.to_string());
    let sol = tokens::find_token(ChainId::Solana, "SOL").unwrap();
    assert_eq!(adapter.get_balance(OWNER, sol).await.unwrap(), "2.25");
}

#[tokio::test(flavor = "current_thread")]
async fn native_transfer_signs_and_broadcasts() {
    let server = MockServer::start();
    let blockhash = bs58::encode([7u8; 32]).into_string();
    let blockhash_mock = server.mock(|when, then| {
        when.method(POST).body_contains("getLatestBlockhash");
        then.status(200).json_body(json!({
            "jsonrpc": "2.0", "id": 1,
            "result": {"context": {"slot": 1}, "value": {"blockhash": blockhash, "lastValidBlockHeight": 100}}
        }));
    });
    let send_mock = server.mock(|when, then| {
        when.method(POST)
            .body_contains("sendTransaction")
            .body_contains("\"encoding\":\"base64\"");
        then.status(200).json_body(json!({
            "jsonrpc": "2.0", "id": 2,
            "result": "5j7s6NiJS3JAkvgkoc18WVAsiSaci2pxB2A6ueCJP4tprA2TFg9wSyTLeYouxPBJEMzJinENTkpA52YStRW5Dia7"
        }));
    });

    let signer: Arc<dyn SolanaWalletProvider> = Arc::new(LocalSolanaSigner::from_seed([9u8; 32]));
    let adapter = SolanaAdapter::with_rpc(Some(signer), client_for(&server), VAULT.to_string());
    let sol = tokens::find_token(ChainId::Solana, "SOL").unwrap();

    let signature = adapter.send_transfer("0.1", sol).await.unwrap();
    assert!(signature.starts_with("5j7s6NiJS3"));
    blockhash_mock.assert();
    send_mock.assert();
}

#[tokio::test(flavor = "current_thread")]
async fn broadcast_failure_surfaces_preflight_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).body_contains("getLatestBlockhash");
        then.status(200).json_body(json!({
            "jsonrpc": "2.0", "id": 1,
            "result": {"context": {"slot": 1}, "value": {"blockhash": bs58::encode([7u8; 32]).into_string(), "lastValidBlockHeight": 100}}
        }));
    });
    server.mock(|when, then| {
        when.method(POST).body_contains("sendTransaction");
        then.status(200).json_body(json!({
            "jsonrpc": "2.0", "id": 2,
            "error": {"code": -32002, "message": "Transaction simulation failed: insufficient funds"}
        }));
    });

    let signer: Arc<dyn SolanaWalletProvider> = Arc::new(LocalSolanaSigner::from_seed([9u8; 32]));
    let adapter = SolanaAdapter::with_rpc(Some(signer), client_for(&server), VAULT.to_string());
    let sol = tokens::find_token(ChainId::Solana, "SOL").unwrap();

    let err = adapter.send_transfer("100000", sol).await.unwrap_err();
    match err {
        BridgeError::RpcError(msg) => assert!(msg.contains("insufficient funds")),
        other => panic!("unexpected error: {:?}", other),
    }
}
