//! Seams to the external collaborators: the wallet and the invoicing client.

use super::errors::{ClientError, WalletError};
use crate::domain::{CreateRequestParameters, RequestResult};
use std::sync::Arc;

/// Signing capability of a connected wallet.
pub trait MessageSigner: Send + Sync {
    /// Checksummed address of the signing account.
    fn address(&self) -> &str;

    /// Signs `message` with the personal-message prefix and returns the
    /// `0x`-prefixed 65-byte signature.
    fn sign_message(&self, message: &[u8]) -> Result<String, WalletError>;
}

/// A connected wallet account.
#[derive(Clone)]
pub struct Account {
    pub address: String,
    pub signer: Arc<dyn MessageSigner>,
}

impl Account {
    pub fn new(signer: Arc<dyn MessageSigner>) -> Self {
        Self {
            address: signer.address().to_string(),
            signer,
        }
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account").field("address", &self.address).finish()
    }
}

/// Wallet connection status.
#[derive(Debug, Clone)]
pub enum Connection {
    Disconnected,
    Connecting,
    ConnectionError(String),
    Ready(Account),
}

impl Connection {
    pub fn account(&self) -> Option<&Account> {
        match self {
            Connection::Ready(account) => Some(account),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Connection::Ready(_))
    }
}

/// Supplies wallet connections; never managed beyond `connect`.
pub trait WalletConnector {
    fn connect(&self) -> Connection;
}

/// A created request whose persistence may still be pending.
pub trait RequestHandle: Send {
    /// Request data as currently known.
    fn data(&self) -> RequestResult;

    /// Blocks until the request is anchored on-chain.
    fn wait_for_confirmation(self: Box<Self>) -> Result<RequestResult, ClientError>;
}

/// The invoicing network's create-request call.
pub trait RequestClient: Send + Sync {
    fn create_request(
        &self,
        gateway: &str,
        parameters: &CreateRequestParameters,
        signer: &dyn MessageSigner,
    ) -> Result<Box<dyn RequestHandle>, ClientError>;
}
