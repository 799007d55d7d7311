//! COSE algorithm, key type and curve identifiers (RFC 9053)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, WebAuthnError};

/// COSE key type (label `1`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    Okp,
    Ec2,
    Rsa,
}

impl KeyType {
    #[must_use]
    pub fn id(self) -> i64 {
        match self {
            Self::Okp => 1,
            Self::Ec2 => 2,
            Self::Rsa => 3,
        }
    }
}

impl TryFrom<i64> for KeyType {
    type Error = WebAuthnError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            1 => Ok(Self::Okp),
            2 => Ok(Self::Ec2),
            3 => Ok(Self::Rsa),
            other => Err(WebAuthnError::MalformedCoseKey(format!(
                "unsupported key type {other}"
            ))),
        }
    }
}

/// COSE elliptic curve (label `-1` of EC2 and OKP keys)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EllipticCurve {
    P256,
    P384,
    P521,
    Ed25519,
}

impl EllipticCurve {
    #[must_use]
    pub fn id(self) -> i64 {
        match self {
            Self::P256 => 1,
            Self::P384 => 2,
            Self::P521 => 3,
            Self::Ed25519 => 6,
        }
    }

    /// Byte length of one affine coordinate
    #[must_use]
    pub fn coordinate_len(self) -> usize {
        match self {
            Self::P256 | Self::Ed25519 => 32,
            Self::P384 => 48,
            Self::P521 => 66,
        }
    }
}

impl TryFrom<i64> for EllipticCurve {
    type Error = WebAuthnError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            1 => Ok(Self::P256),
            2 => Ok(Self::P384),
            3 => Ok(Self::P521),
            6 => Ok(Self::Ed25519),
            other => Err(WebAuthnError::MalformedCoseKey(format!(
                "unsupported curve {other}"
            ))),
        }
    }
}

/// Digest used by a signature algorithm or by client data hashing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Digest output length in bytes
    #[must_use]
    pub fn output_len(self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }
}

/// RSA signature padding scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsaPadding {
    Pkcs1v15,
    Pss,
}

/// COSE signature algorithm (label `3`, and `alg` in attestation statements)
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    ES256,
    ES384,
    ES512,
    EdDSA,
    PS256,
    PS384,
    PS512,
    RS256,
    RS384,
    RS512,
}

impl SignatureAlgorithm {
    /// COSE algorithm identifier
    #[must_use]
    pub fn id(self) -> i64 {
        match self {
            Self::ES256 => -7,
            Self::EdDSA => -8,
            Self::ES384 => -35,
            Self::ES512 => -36,
            Self::PS256 => -37,
            Self::PS384 => -38,
            Self::PS512 => -39,
            Self::RS256 => -257,
            Self::RS384 => -258,
            Self::RS512 => -259,
        }
    }

    /// Digest applied before signing. `None` for `EdDSA`, which signs the message itself.
    #[must_use]
    pub fn hash(self) -> Option<HashAlgorithm> {
        match self {
            Self::ES256 | Self::PS256 | Self::RS256 => Some(HashAlgorithm::Sha256),
            Self::ES384 | Self::PS384 | Self::RS384 => Some(HashAlgorithm::Sha384),
            Self::ES512 | Self::PS512 | Self::RS512 => Some(HashAlgorithm::Sha512),
            Self::EdDSA => None,
        }
    }

    /// Padding for RSA algorithms
    #[must_use]
    pub fn rsa_padding(self) -> Option<RsaPadding> {
        match self {
            Self::RS256 | Self::RS384 | Self::RS512 => Some(RsaPadding::Pkcs1v15),
            Self::PS256 | Self::PS384 | Self::PS512 => Some(RsaPadding::Pss),
            _ => None,
        }
    }

    /// Key type able to produce signatures with this algorithm
    #[must_use]
    pub fn key_type(self) -> KeyType {
        match self {
            Self::ES256 | Self::ES384 | Self::ES512 => KeyType::Ec2,
            Self::EdDSA => KeyType::Okp,
            _ => KeyType::Rsa,
        }
    }
}

impl TryFrom<i64> for SignatureAlgorithm {
    type Error = WebAuthnError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            -7 => Ok(Self::ES256),
            -8 => Ok(Self::EdDSA),
            -35 => Ok(Self::ES384),
            -36 => Ok(Self::ES512),
            -37 => Ok(Self::PS256),
            -38 => Ok(Self::PS384),
            -39 => Ok(Self::PS512),
            -257 => Ok(Self::RS256),
            -258 => Ok(Self::RS384),
            -259 => Ok(Self::RS512),
            other => Err(WebAuthnError::UnsupportedAlgorithm(other)),
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?} ({})", self.id())
    }
}
