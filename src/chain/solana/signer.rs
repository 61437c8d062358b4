//! Local-key implementation of [`SolanaWalletProvider`] for terminal use.

use anyhow::Result;
use async_trait::async_trait;
use ed25519_dalek::{Signer as _, SigningKey};
use rand::rngs::OsRng;

use super::SolanaWalletProvider;
use crate::chain::ProviderRpcError;

pub struct LocalSolanaSigner {
    key: SigningKey,
    address: String,
}

impl LocalSolanaSigner {
    /// Builds a signer from a base58-encoded 32-byte ed25519 secret key.
    pub fn from_base58(secret: &str) -> Result<Self> {
        let bytes = bs58::decode(secret.trim())
            .into_vec()
            .map_err(|e| anyhow::anyhow!("Invalid base58 Solana key: {}", e))?;
        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|_| anyhow::anyhow!("Solana key must be a 32-byte seed"))?;
        Ok(Self::from_seed(seed))
    }

    pub fn from_seed(seed: [u8; 32]) -> Self {
        let key = SigningKey::from_bytes(&seed);
        let address = bs58::encode(key.verifying_key().to_bytes()).into_string();
        Self { key, address }
    }

    /// Fresh throwaway keypair, useful for tests and dry runs.
    pub fn generate() -> Self {
        let key = SigningKey::generate(&mut OsRng);
        let address = bs58::encode(key.verifying_key().to_bytes()).into_string();
        Self { key, address }
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

#[async_trait]
impl SolanaWalletProvider for LocalSolanaSigner {
    async fn connect(&self) -> Result<String, ProviderRpcError> {
        Ok(self.address.clone())
    }

    async fn sign_message(&self, message: &[u8]) -> Result<[u8; 64], ProviderRpcError> {
        Ok(self.key.sign(message).to_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Verifier, VerifyingKey};

    #[tokio::test]
    async fn test_sign_roundtrip() {
        let signer = LocalSolanaSigner::from_seed([7u8; 32]);
        let address = signer.connect().await.unwrap();
        assert_eq!(address, signer.address());

        let message = b"voltbridge test message";
        let signature = signer.sign_message(message).await.unwrap();

        let pubkey_bytes = bs58::decode(&address).into_vec().unwrap();
        let verifying = VerifyingKey::from_bytes(&pubkey_bytes.try_into().unwrap()).unwrap();
        assert!(verifying.verify(message, &ed25519_dalek::Signature::from_bytes(&signature)).is_ok());
    }

    #[test]
    fn test_from_base58_rejects_bad_keys() {
        assert!(LocalSolanaSigner::from_base58("not-base58!").is_err());
        assert!(LocalSolanaSigner::from_base58("abc").is_err());
    }
}
