use crate::domain::DomainError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WalletError {
    #[error("Invalid private key: {0}")]
    InvalidKey(String),
    #[error("Signing failed: {0}")]
    Signing(String),
}

/// Errors reported by the invoicing client while creating or confirming a request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("Gateway returned {status}: {body}")]
    Gateway { status: u16, body: String },
    #[error("Malformed gateway response: {0}")]
    Serialization(String),
    #[error("Request not confirmed after {attempts} attempts")]
    ConfirmationTimeout { attempts: u32 },
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// Anything that ends a submission attempt in the `Failed` state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Client(#[from] ClientError),
}
