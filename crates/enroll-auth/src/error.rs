//! Error types for the registration pipeline and its collaborators.
//!
//! None of these carry plaintext secrets or key material.
use thiserror::Error;

/// Why a registration did not produce a token.
#[derive(Debug, Error)]
pub enum RegisterError {
    /// The identifier already belongs to an account.
    #[error("identifier already registered")]
    DuplicateIdentifier,
    /// The account store could not be reached. Retryable.
    #[error("account store unavailable: {0}")]
    StoreUnavailable(String),
    /// The store was reachable but refused the insert. Retryable.
    #[error("account persistence failed: {0}")]
    PersistenceFailed(String),
    /// The secret could not be hashed.
    #[error("secret transform failed: {0}")]
    TransformFailed(String),
    /// The token could not be signed. Configuration fault.
    #[error("token signing failed: {0}")]
    SigningFailed(String),
}

impl RegisterError {
    /// Whether the client can fix this by changing its request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::DuplicateIdentifier)
    }
    /// Whether the same request may succeed later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::PersistenceFailed(_))
    }
}

/// Failures reported by an account store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The uniqueness constraint on the identifier rejected the row.
    #[error("identifier already present")]
    Duplicate,
    /// The store could not be reached or timed out.
    #[error("store unreachable: {0}")]
    Unavailable(String),
    /// The store answered with an error.
    #[error("store rejected operation: {0}")]
    Failed(String),
}

/// Failures while hashing a secret.
#[derive(Debug, Error)]
pub enum HashError {
    #[error("entropy source failed: {0}")]
    Entropy(String),
    #[error("hash computation failed: {0}")]
    Compute(String),
}

impl From<HashError> for RegisterError {
    fn from(e: HashError) -> Self {
        Self::TransformFailed(e.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for RegisterError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::SigningFailed(e.to_string())
    }
}

/// The signing key was missing or empty.
#[derive(Debug, Error)]
#[error("signing key must not be empty")]
pub struct EmptyKey;
