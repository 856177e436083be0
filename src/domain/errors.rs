use thiserror::Error;

/// Errors raised by the pure request-building rules.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
    #[error("Unknown storage chain: {0}")]
    UnknownStorageChain(String),
    #[error("Invalid reference data: {0}")]
    InvalidReferenceData(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
