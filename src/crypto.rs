//! Cryptography operations
//!
//! Digests for client data and signature checks against native public key
//! handles. Key handles are `openssl` `PKey` values and are released on drop.

use log::debug;
use openssl::hash::MessageDigest;
use openssl::pkey::{Id, PKeyRef, Public};
use openssl::rsa::Padding;
use openssl::sign::{RsaPssSaltlen, Verifier};
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::cose::{HashAlgorithm, KeyType, RsaPadding, SignatureAlgorithm};
use crate::errors::{Result, WebAuthnError};

/// Hash `data` with the given algorithm
#[must_use]
pub fn digest(algorithm: HashAlgorithm, data: &[u8]) -> Vec<u8> {
    match algorithm {
        HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
        HashAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
        HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
    }
}

/// Hash data using SHA-256
#[must_use]
pub fn sha256(data: &[u8]) -> Vec<u8> {
    digest(HashAlgorithm::Sha256, data)
}

fn message_digest(algorithm: HashAlgorithm) -> MessageDigest {
    match algorithm {
        HashAlgorithm::Sha256 => MessageDigest::sha256(),
        HashAlgorithm::Sha384 => MessageDigest::sha384(),
        HashAlgorithm::Sha512 => MessageDigest::sha512(),
    }
}

fn key_type_of(key: &PKeyRef<Public>) -> Option<KeyType> {
    match key.id() {
        Id::EC => Some(KeyType::Ec2),
        Id::RSA => Some(KeyType::Rsa),
        Id::ED25519 => Some(KeyType::Okp),
        _ => None,
    }
}

/// Verify `signature` over `data`
///
/// ECDSA signatures are expected as DER `ECDSA-Sig-Value`. RSA uses PKCS#1 v1.5
/// or PSS (salt length equal to the digest length) as the algorithm dictates.
/// A signature the provider cannot parse is reported as `Ok(false)`.
///
/// # Errors
/// Returns `Protocol` if the key cannot produce `algorithm` signatures, `Crypto`
/// if the provider fails to set up verification
pub fn verify_signature(
    key: &PKeyRef<Public>,
    algorithm: SignatureAlgorithm,
    data: &[u8],
    signature: &[u8],
) -> Result<bool> {
    if key_type_of(key) != Some(algorithm.key_type()) {
        return Err(WebAuthnError::protocol(format!(
            "algorithm {algorithm} does not match the {:?} key",
            key.id()
        )));
    }

    let Some(hash) = algorithm.hash() else {
        let mut verifier = Verifier::new_without_digest(key)?;
        return Ok(verifier.verify_oneshot(signature, data).unwrap_or(false));
    };

    let md = message_digest(hash);
    let mut verifier = Verifier::new(md, key)?;
    if algorithm.rsa_padding() == Some(RsaPadding::Pss) {
        verifier.set_rsa_padding(Padding::PKCS1_PSS)?;
        verifier.set_rsa_pss_saltlen(RsaPssSaltlen::DIGEST_LENGTH)?;
        verifier.set_rsa_mgf1_md(md)?;
    }
    verifier.update(data)?;

    match verifier.verify(signature) {
        Ok(valid) => Ok(valid),
        Err(e) => {
            debug!("Signature rejected by provider: {e}");
            Ok(false)
        }
    }
}
