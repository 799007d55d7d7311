//! Registered credentials
//!
//! A [`Credential`] is decoded once from an attestation object and is
//! immutable afterwards. [`Credential::verify`] has no side effects.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use log::debug;
use serde::{Deserialize, Serialize};

use super::attestation::{AttestationStatement, FORMAT_NONE};
use super::authenticator_data::AuthenticatorData;
use super::client_data::ClientData;
use crate::cbor::CborReader;
use crate::cose::CosePublicKey;
use crate::errors::{Result, WebAuthnError};

/// Opaque credential identifier, compared byte-wise
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct CredentialId(Vec<u8>);

impl CredentialId {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode from base64url (unpadded) or standard base64
    ///
    /// # Errors
    /// Returns `InvalidArgument` if neither alphabet decodes the input
    pub fn from_base64(encoded: &str) -> Result<Self> {
        URL_SAFE_NO_PAD
            .decode(encoded)
            .or_else(|_| STANDARD.decode(encoded))
            .map(Self)
            .map_err(|e| {
                WebAuthnError::InvalidArgument(format!("invalid credential ID encoding: {e}"))
            })
    }

    /// Base64url (unpadded) form, as used in `WebAuthn` JSON
    #[must_use]
    pub fn to_base64(&self) -> String {
        URL_SAFE_NO_PAD.encode(&self.0)
    }
}

impl From<Vec<u8>> for CredentialId {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for CredentialId {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for CredentialId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

impl fmt::Debug for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CredentialId({})", self.to_base64())
    }
}

/// Transport the authenticator was reached over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Usb,
    Nfc,
    Ble,
    Internal,
    Hybrid,
}

impl Transport {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Usb => "usb",
            Self::Nfc => "nfc",
            Self::Ble => "ble",
            Self::Internal => "internal",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transport {
    type Err = WebAuthnError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "usb" => Ok(Self::Usb),
            "nfc" => Ok(Self::Nfc),
            "ble" => Ok(Self::Ble),
            "internal" => Ok(Self::Internal),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(WebAuthnError::InvalidArgument(format!(
                "unknown transport '{other}'"
            ))),
        }
    }
}

/// Credential created by a registration ceremony
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    format: String,
    id: CredentialId,
    authenticator_data: AuthenticatorData,
    attestation_statement: Option<AttestationStatement>,
    client_data: ClientData,
    transport: Transport,
}

impl Credential {
    /// Decode an attestation object `{fmt, attStmt, authData}`
    ///
    /// `fmt` must precede `attStmt`, as in the CTAP2 canonical encoding, because
    /// the format selects how the statement is decoded.
    ///
    /// # Errors
    /// - `Protocol` if `fmt` or `authData` is missing, `attStmt` precedes `fmt`,
    ///   the format is not supported, or an attested format has no `attStmt`
    /// - `MalformedItem` for bytes after the attestation object map
    /// - CBOR, authenticator data and COSE key errors from the nested decoders
    pub fn decode(
        attestation_object: &[u8],
        client_data: ClientData,
        credential_id: CredentialId,
        transport: Transport,
    ) -> Result<Self> {
        let (count, mut cursor) = CborReader::new(attestation_object).read_map_start()?;
        let mut format: Option<&str> = None;
        let mut statement = None;
        let mut authenticator_data = None;
        let mut read = 0;

        while !cursor.at_collection_end(count, read) {
            let (key, value) = cursor.read_text_string()?;
            cursor = match key {
                "fmt" => {
                    let (fmt, next) = value.read_text_string()?;
                    format = Some(fmt);
                    next
                }
                "attStmt" => {
                    let Some(fmt) = format else {
                        return Err(WebAuthnError::protocol(
                            "attStmt encountered before fmt in attestation object",
                        ));
                    };
                    let (decoded, next) = AttestationStatement::decode(fmt, value)?;
                    statement = decoded;
                    next
                }
                "authData" => {
                    let (raw, next) = value.read_byte_string()?;
                    authenticator_data = Some(AuthenticatorData::parse(raw)?);
                    next
                }
                other => {
                    debug!("Skipping attestation object entry '{other}'");
                    value.skip()?
                }
            };
            read += 1;
        }
        let rest = cursor.end_collection(count)?;
        if rest.can_read() {
            return Err(WebAuthnError::malformed(format!(
                "{} trailing bytes after attestation object",
                rest.remaining_len()
            )));
        }

        let format = format
            .ok_or_else(|| WebAuthnError::protocol("attestation object is missing fmt"))?;
        let authenticator_data = authenticator_data
            .ok_or_else(|| WebAuthnError::protocol("attestation object is missing authData"))?;
        if !AttestationStatement::is_supported_format(format) {
            return Err(WebAuthnError::protocol(format!(
                "malformed attestation statement: unsupported format '{format}'"
            )));
        }
        if format != FORMAT_NONE && statement.is_none() {
            return Err(WebAuthnError::protocol(
                "malformed attestation statement: missing attStmt",
            ));
        }

        debug!(
            "Decoded credential {credential_id} (format: {format}, transport: {transport})"
        );
        Ok(Self {
            format: format.to_string(),
            id: credential_id,
            authenticator_data,
            attestation_statement: statement,
            client_data,
            transport,
        })
    }

    /// Verify the attestation signature and certificate constraints
    ///
    /// # Errors
    /// - `Protocol` for unattested (`"none"`) credentials
    /// - any error from [`AttestationStatement::verify`]
    pub fn verify(&self) -> Result<()> {
        let statement = self.attestation_statement.as_ref().ok_or_else(|| {
            WebAuthnError::protocol(format!(
                "credential with attestation format '{}' cannot be verified",
                self.format
            ))
        })?;
        statement.verify(&self.authenticator_data, &self.client_data)
    }

    #[must_use]
    pub fn format(&self) -> &str {
        &self.format
    }

    #[must_use]
    pub fn id(&self) -> &CredentialId {
        &self.id
    }

    #[must_use]
    pub fn authenticator_data(&self) -> &AuthenticatorData {
        &self.authenticator_data
    }

    #[must_use]
    pub fn attestation_statement(&self) -> Option<&AttestationStatement> {
        self.attestation_statement.as_ref()
    }

    #[must_use]
    pub fn client_data(&self) -> &ClientData {
        &self.client_data
    }

    #[must_use]
    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// Credential public key from the attested credential data, if present
    #[must_use]
    pub fn public_key(&self) -> Option<&CosePublicKey> {
        self.authenticator_data
            .attested_credential_data()
            .map(super::authenticator_data::AttestedCredentialData::public_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    use ciborium::value::Value;

    const CREDENTIAL_KEY: &[u8] = include_bytes!("../../tests/fixtures/credential_cose_key.cbor");

    fn hash_of(id: &CredentialId) -> u64 {
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        hasher.finish()
    }

    fn auth_data() -> Vec<u8> {
        let mut data = vec![0x10; 32];
        data.push(0x41);
        data.extend_from_slice(&[0, 0, 0, 3]);
        data.extend_from_slice(&[0; 16]);
        data.extend_from_slice(&[0, 2, 0xca, 0xfe]);
        data.extend_from_slice(CREDENTIAL_KEY);
        data
    }

    fn attestation_object(entries: Vec<(&str, Value)>) -> Vec<u8> {
        let map = entries
            .into_iter()
            .map(|(k, v)| (Value::Text(k.to_string()), v))
            .collect();
        let mut buf = Vec::new();
        ciborium::into_writer(&Value::Map(map), &mut buf).unwrap();
        buf
    }

    fn decode(object: &[u8]) -> Result<Credential> {
        Credential::decode(
            object,
            ClientData::from_json(b"{}".to_vec()),
            CredentialId::from(vec![0xca, 0xfe]),
            Transport::Usb,
        )
    }

    #[test]
    fn test_credential_id_equality_and_hash() {
        let a = CredentialId::from(vec![1, 2, 3]);
        let b = CredentialId::from(&[1u8, 2, 3][..]);
        let c = CredentialId::from(vec![3, 2, 1]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, c);
        // XOR-folding would collide on permutations
        assert_ne!(hash_of(&a), hash_of(&c));
    }

    #[test]
    fn test_credential_id_base64() {
        let id = CredentialId::from_base64("tT1Pfo0jI0Jv2/WeerlsKuUjGgJItRILNuNAAWLLkfY=").unwrap();
        assert_eq!(id.len(), 32);
        assert_eq!(id.to_string(), "tT1Pfo0jI0Jv2_WeerlsKuUjGgJItRILNuNAAWLLkfY");
        assert_eq!(CredentialId::from_base64(&id.to_base64()).unwrap(), id);
        assert!(CredentialId::from_base64("not base64!").is_err());
    }

    #[test]
    fn test_transport_parsing() {
        assert_eq!("nfc".parse::<Transport>().unwrap(), Transport::Nfc);
        assert_eq!(Transport::Hybrid.to_string(), "hybrid");
        assert!("carrier-pigeon".parse::<Transport>().is_err());
    }

    #[test]
    fn test_decode_none_format() {
        let object = attestation_object(vec![
            ("fmt", Value::Text("none".to_string())),
            ("attStmt", Value::Map(vec![])),
            ("authData", Value::Bytes(auth_data())),
        ]);
        let credential = decode(&object).unwrap();
        assert_eq!(credential.format(), "none");
        assert!(credential.attestation_statement().is_none());
        assert_eq!(credential.authenticator_data().sign_count(), 3);
        assert!(credential.public_key().is_some());
        assert_eq!(credential.transport(), Transport::Usb);
        assert!(matches!(credential.verify(), Err(WebAuthnError::Protocol(_))));
    }

    #[test]
    fn test_missing_fmt_or_auth_data() {
        let without_fmt = attestation_object(vec![("authData", Value::Bytes(auth_data()))]);
        assert!(matches!(decode(&without_fmt), Err(WebAuthnError::Protocol(_))));

        let without_auth_data = attestation_object(vec![
            ("fmt", Value::Text("none".to_string())),
            ("attStmt", Value::Map(vec![])),
        ]);
        assert!(matches!(decode(&without_auth_data), Err(WebAuthnError::Protocol(_))));
    }

    #[test]
    fn test_attested_format_requires_statement() {
        for format in ["packed", "fido-u2f"] {
            let object = attestation_object(vec![
                ("fmt", Value::Text(format.to_string())),
                ("authData", Value::Bytes(auth_data())),
            ]);
            let err = decode(&object).unwrap_err();
            assert!(
                matches!(err, WebAuthnError::Protocol(ref m) if m.contains("missing attStmt")),
                "{format}: {err:?}"
            );
        }

        // "none" may omit the statement
        let none = attestation_object(vec![
            ("fmt", Value::Text("none".to_string())),
            ("authData", Value::Bytes(auth_data())),
        ]);
        assert!(decode(&none).unwrap().attestation_statement().is_none());
    }

    #[test]
    fn test_trailing_bytes_after_object() {
        let mut object = attestation_object(vec![
            ("fmt", Value::Text("none".to_string())),
            ("attStmt", Value::Map(vec![])),
            ("authData", Value::Bytes(auth_data())),
        ]);
        object.extend_from_slice(&[0xde, 0xad]);
        assert!(matches!(decode(&object), Err(WebAuthnError::MalformedItem(_))));
    }

    #[test]
    fn test_att_stmt_before_fmt() {
        let object = attestation_object(vec![
            ("attStmt", Value::Map(vec![])),
            ("fmt", Value::Text("none".to_string())),
            ("authData", Value::Bytes(auth_data())),
        ]);
        assert!(matches!(decode(&object), Err(WebAuthnError::Protocol(_))));
    }

    #[test]
    fn test_unsupported_format() {
        let object = attestation_object(vec![
            ("fmt", Value::Text("tpm".to_string())),
            ("attStmt", Value::Map(vec![])),
            ("authData", Value::Bytes(auth_data())),
        ]);
        assert!(matches!(decode(&object), Err(WebAuthnError::Protocol(_))));

        let without_statement = attestation_object(vec![
            ("fmt", Value::Text("android-key".to_string())),
            ("authData", Value::Bytes(auth_data())),
        ]);
        assert!(matches!(decode(&without_statement), Err(WebAuthnError::Protocol(_))));
    }

    #[test]
    fn test_unknown_scalar_entries_are_skipped() {
        let object = attestation_object(vec![
            ("fmt", Value::Text("none".to_string())),
            ("epAtt", Value::Bool(false)),
            ("attStmt", Value::Map(vec![])),
            ("authData", Value::Bytes(auth_data())),
            ("largeBlobKey", Value::Bytes(vec![7; 32])),
        ]);
        assert!(decode(&object).is_ok());
    }

    #[test]
    fn test_not_a_map() {
        assert!(matches!(
            decode(&[0x80]),
            Err(WebAuthnError::MalformedItem(_))
        ));
    }
}
