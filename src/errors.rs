//! Error types for `WebAuthn` verification
//!
//! Every decode and verify operation in this crate reports failure through
//! [`WebAuthnError`]. Callers should treat any of them as a rejected ceremony.

use thiserror::Error;

/// Errors raised while decoding or verifying authenticator responses
#[derive(Debug, Error)]
pub enum WebAuthnError {
    /// Structural CBOR or binary violation (type mismatch, truncation, bad argument)
    #[error("Malformed item: {0}")]
    MalformedItem(String),

    /// Valid encoding that this decoder does not implement
    #[error("Unsupported item: {0}")]
    UnsupportedItem(String),

    /// Decoded value does not fit the target type
    #[error("Value out of range")]
    Overflow,

    /// COSE key is missing a required parameter or carries an unusable one
    #[error("Malformed COSE key: {0}")]
    MalformedCoseKey(String),

    /// COSE algorithm identifier this crate does not know
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(i64),

    /// Signature mismatch or attestation certificate policy violation
    #[error("Invalid attestation: {0}")]
    InvalidAttestation(String),

    /// Generic protocol-level decode or verify failure
    #[error("WebAuthn error: {0}")]
    Protocol(String),

    /// Precondition violation on an input argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation is not valid for the state of the value it was called on
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Operation not supported
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Ceremony check failed (client data type, challenge, origin, RP ID, flags)
    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    /// Configuration error (e.g., invalid settings)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Failure inside the native cryptographic provider
    #[error("Cryptographic error: {0}")]
    Crypto(#[from] openssl::error::ErrorStack),
}

impl WebAuthnError {
    /// Stable short name of the error kind, for diagnostics
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedItem(_) => "malformed_item",
            Self::UnsupportedItem(_) => "unsupported_item",
            Self::Overflow => "overflow",
            Self::MalformedCoseKey(_) => "malformed_cose_key",
            Self::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            Self::InvalidAttestation(_) => "invalid_attestation",
            Self::Protocol(_) => "protocol",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::InvalidOperation(_) => "invalid_operation",
            Self::NotSupported(_) => "not_supported",
            Self::VerificationFailed(_) => "verification_failed",
            Self::Configuration(_) => "configuration",
            Self::Crypto(_) => "crypto",
        }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedItem(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedItem(msg.into())
    }

    pub(crate) fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    pub(crate) fn attestation(msg: impl Into<String>) -> Self {
        Self::InvalidAttestation(msg.into())
    }
}

/// Result alias used throughout the crate
pub type Result<T, E = WebAuthnError> = std::result::Result<T, E>;
