//! Local secp256k1 wallet standing in for a browser wallet connection.

use crate::application::{Account, Connection, MessageSigner, WalletConnector, WalletError};
use ethers_core::k256::ecdsa::SigningKey;
use ethers_core::utils::{hash_message, secret_key_to_address, to_checksum};
use std::sync::Arc;

/// Signs personal messages with a private key held in memory.
pub struct PrivateKeyWallet {
    key: SigningKey,
    address: String,
}

impl PrivateKeyWallet {
    /// Parses a hex private key, with or without the `0x` prefix.
    pub fn from_hex(private_key: &str) -> Result<Self, WalletError> {
        let trimmed = private_key.trim();
        let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(trimmed).map_err(|e| WalletError::InvalidKey(e.to_string()))?;
        let key = SigningKey::from_slice(&bytes).map_err(|e| WalletError::InvalidKey(e.to_string()))?;
        let address = to_checksum(&secret_key_to_address(&key), None);
        Ok(Self { key, address })
    }
}

impl MessageSigner for PrivateKeyWallet {
    fn address(&self) -> &str {
        &self.address
    }

    fn sign_message(&self, message: &[u8]) -> Result<String, WalletError> {
        let hash = hash_message(message);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(hash.as_bytes())
            .map_err(|e| WalletError::Signing(e.to_string()))?;

        let mut bytes = signature.to_bytes().to_vec();
        bytes.push(recovery_id.to_byte() + 27);
        Ok(format!("0x{}", hex::encode(bytes)))
    }
}

/// Connects the wallet configured through the environment, if any.
pub struct LocalWalletConnector {
    private_key: Option<String>,
}

impl LocalWalletConnector {
    pub fn new(private_key: Option<String>) -> Self {
        Self { private_key }
    }
}

impl WalletConnector for LocalWalletConnector {
    fn connect(&self) -> Connection {
        match &self.private_key {
            None => Connection::Disconnected,
            Some(key) => match PrivateKeyWallet::from_hex(key) {
                Ok(wallet) => Connection::Ready(Account::new(Arc::new(wallet))),
                Err(e) => Connection::ConnectionError(e.to_string()),
            },
        }
    }
}
