//! Client data
//!
//! The client data JSON is hashed once at construction; the digest is what
//! authenticators sign over. The JSON itself is only parsed on demand for
//! ceremony checks.

use serde::{Deserialize, Serialize};

use crate::cose::HashAlgorithm;
use crate::crypto;
use crate::errors::{Result, WebAuthnError};

/// `type` of client data produced by `navigator.credentials.create()`
pub const CEREMONY_CREATE: &str = "webauthn.create";
/// `type` of client data produced by `navigator.credentials.get()`
pub const CEREMONY_GET: &str = "webauthn.get";

/// Raw client data JSON together with its digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientData {
    json: Vec<u8>,
    hash_algorithm: HashAlgorithm,
    hash: Vec<u8>,
}

/// Fields of the client data JSON used by ceremony checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedClientData {
    /// `type`, or `typ` in legacy U2F client data
    #[serde(rename = "type", alias = "typ")]
    pub ceremony_type: String,
    /// Base64url challenge as echoed by the client
    pub challenge: String,
    pub origin: String,
    #[serde(rename = "crossOrigin", default)]
    pub cross_origin: bool,
    #[serde(rename = "topOrigin", default, skip_serializing_if = "Option::is_none")]
    pub top_origin: Option<String>,
}

impl ClientData {
    /// Wrap client data JSON and hash it with `hash_algorithm`
    #[must_use]
    pub fn new(json: Vec<u8>, hash_algorithm: HashAlgorithm) -> Self {
        let hash = crypto::digest(hash_algorithm, &json);
        Self {
            json,
            hash_algorithm,
            hash,
        }
    }

    /// Wrap client data JSON hashed with SHA-256, as `WebAuthn` clients do
    #[must_use]
    pub fn from_json(json: Vec<u8>) -> Self {
        Self::new(json, HashAlgorithm::Sha256)
    }

    #[must_use]
    pub fn json(&self) -> &[u8] {
        &self.json
    }

    #[must_use]
    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm
    }

    /// Digest of the JSON bytes
    #[must_use]
    pub fn hash(&self) -> &[u8] {
        &self.hash
    }

    /// Parse the JSON into its collected fields
    ///
    /// # Errors
    /// Returns `Protocol` if the JSON is invalid or lacks `type`, `challenge` or `origin`
    pub fn collected(&self) -> Result<CollectedClientData> {
        serde_json::from_slice(&self.json)
            .map_err(|e| WebAuthnError::protocol(format!("Invalid client data JSON: {e}")))
    }

    /// Check ceremony type, challenge and origin
    ///
    /// # Arguments
    /// * `expected_type` - [`CEREMONY_CREATE`] or [`CEREMONY_GET`]
    /// * `expected_challenge` - Base64url challenge issued to the client
    /// * `expected_origin` - Relying party origin
    ///
    /// # Errors
    /// Returns `VerificationFailed` on any mismatch, or `Protocol` if the JSON
    /// cannot be parsed
    pub fn verify(
        &self,
        expected_type: &str,
        expected_challenge: &str,
        expected_origin: &str,
    ) -> Result<CollectedClientData> {
        let collected = self.collected()?;

        if collected.ceremony_type != expected_type {
            return Err(WebAuthnError::VerificationFailed(format!(
                "Invalid type, expected {expected_type}"
            )));
        }

        if collected.challenge != expected_challenge {
            return Err(WebAuthnError::VerificationFailed(
                "Challenge mismatch".to_string(),
            ));
        }

        if collected.origin != expected_origin {
            return Err(WebAuthnError::VerificationFailed(
                "Origin mismatch".to_string(),
            ));
        }

        Ok(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    const U2F_CLIENT_DATA: &str = concat!(
        r#"{"typ":"navigator.id.finishEnrollment","#,
        r#""challenge":"vqrS6WXDe1JUs5_c3i4-LkKIHRr-3XVb3azuA5TifHo","#,
        r#""cid_pubkey":{"kty":"EC","crv":"P-256","#,
        r#""x":"HzQwlfXX7Q4S5MtCCnZUNBw3RMzPO9tOyWjBqRl4tJ8","#,
        r#""y":"XVguGFLIZx1fXg3wNqfdbn75hi4-_7-BxhMljw42Ht4"},"#,
        r#""origin":"http://example.com"}"#
    );
    const CREATE: &[u8] = include_bytes!("../../tests/fixtures/client_data_create.json");

    #[test]
    fn test_u2f_sample_hash() {
        let client_data = ClientData::from_json(U2F_CLIENT_DATA.as_bytes().to_vec());
        assert_eq!(client_data.hash_algorithm(), HashAlgorithm::Sha256);
        assert_eq!(
            STANDARD.encode(client_data.hash()),
            "QULSHADZT/udUEraj5m3IfSxka5ON8oBQPaWtpg8+ss="
        );
    }

    #[test]
    fn test_u2f_legacy_type_field() {
        let client_data = ClientData::from_json(U2F_CLIENT_DATA.as_bytes().to_vec());
        let collected = client_data.collected().unwrap();
        assert_eq!(collected.ceremony_type, "navigator.id.finishEnrollment");
        assert_eq!(collected.origin, "http://example.com");
        assert!(!collected.cross_origin);
    }

    #[test]
    fn test_hash_algorithms() {
        let json = b"{}".to_vec();
        assert_eq!(ClientData::new(json.clone(), HashAlgorithm::Sha384).hash().len(), 48);
        assert_eq!(ClientData::new(json, HashAlgorithm::Sha512).hash().len(), 64);
    }

    #[test]
    fn test_verify_registration_client_data() {
        let client_data = ClientData::from_json(CREATE.to_vec());
        let challenge = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .encode("fixture-registration-challenge");

        let collected = client_data
            .verify(CEREMONY_CREATE, &challenge, "https://example.com")
            .unwrap();
        assert_eq!(collected.challenge, challenge);

        let wrong_type = client_data.verify(CEREMONY_GET, &challenge, "https://example.com");
        assert!(matches!(wrong_type, Err(WebAuthnError::VerificationFailed(_))));

        let wrong_challenge = client_data.verify(CEREMONY_CREATE, "AAAA", "https://example.com");
        assert!(matches!(
            wrong_challenge,
            Err(WebAuthnError::VerificationFailed(m)) if m == "Challenge mismatch"
        ));

        let wrong_origin = client_data.verify(CEREMONY_CREATE, &challenge, "https://evil.example");
        assert!(matches!(
            wrong_origin,
            Err(WebAuthnError::VerificationFailed(m)) if m == "Origin mismatch"
        ));
    }

    #[test]
    fn test_invalid_json() {
        let client_data = ClientData::from_json(b"not json".to_vec());
        assert!(matches!(client_data.collected(), Err(WebAuthnError::Protocol(_))));

        let missing_origin =
            ClientData::from_json(br#"{"type":"webauthn.get","challenge":"x"}"#.to_vec());
        assert!(matches!(missing_origin.collected(), Err(WebAuthnError::Protocol(_))));
    }
}
