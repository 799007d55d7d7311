//! `WebAuthn` attestation statements
//!
//! Decodes the `attStmt` map of an attestation object for the `none`,
//! `fido-u2f` and `packed` formats, and verifies the attestation signature
//! against the format's signature base.

use log::debug;

use super::authenticator_data::AuthenticatorData;
use super::certificate::AttestationCertificate;
use super::client_data::ClientData;
use crate::cbor::CborReader;
use crate::cose::SignatureAlgorithm;
use crate::errors::{Result, WebAuthnError};

pub const FORMAT_NONE: &str = "none";
pub const FORMAT_FIDO_U2F: &str = "fido-u2f";
pub const FORMAT_PACKED: &str = "packed";

const SUPPORTED_FORMATS: [&str; 3] = [FORMAT_NONE, FORMAT_FIDO_U2F, FORMAT_PACKED];

/// Reserved byte that starts a U2F registration signature base
const U2F_RESERVED_BYTE: u8 = 0x00;

/// Signed attestation carried by a registration response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationStatement {
    algorithm: SignatureAlgorithm,
    signature: Vec<u8>,
    certificate_chain: Option<Vec<Vec<u8>>>,
    is_fido_u2f: bool,
}

/// Raw `attStmt` entries before format rules are applied
#[derive(Default)]
struct StatementFields {
    alg: Option<i64>,
    sig: Option<Vec<u8>>,
    x5c: Option<Vec<Vec<u8>>>,
}

impl AttestationStatement {
    /// Whether `format` is one this crate can decode
    #[must_use]
    pub fn is_supported_format(format: &str) -> bool {
        SUPPORTED_FORMATS.contains(&format)
    }

    /// Decode the `attStmt` map at `reader` for the given attestation format
    ///
    /// Returns `None` for the `none` format, and a reader positioned after the map.
    /// Values under unrecognized keys are skipped.
    ///
    /// # Errors
    /// - `Protocol` for unknown formats, a missing `sig`, a missing or
    ///   unrecognized `alg` in `packed`, or an empty `x5c`
    /// - `UnsupportedItem` if an unrecognized key holds a composite value
    /// - CBOR decoding errors for structurally invalid input
    pub fn decode<'a>(
        format: &str,
        reader: CborReader<'a>,
    ) -> Result<(Option<Self>, CborReader<'a>)> {
        if !Self::is_supported_format(format) {
            return Err(WebAuthnError::protocol(format!(
                "malformed attestation statement: unsupported format '{format}'"
            )));
        }

        let (fields, rest) = StatementFields::decode(reader)?;
        let statement = match format {
            FORMAT_FIDO_U2F => Some(Self::fido_u2f(fields)?),
            FORMAT_PACKED => Some(Self::packed(fields)?),
            _ => None,
        };
        Ok((statement, rest))
    }

    fn fido_u2f(fields: StatementFields) -> Result<Self> {
        if let Some(alg) = fields.alg.filter(|alg| *alg != SignatureAlgorithm::ES256.id()) {
            return Err(WebAuthnError::protocol(format!(
                "malformed attestation statement: fido-u2f requires ES256, got {alg}"
            )));
        }
        let signature = fields.sig.ok_or_else(|| {
            WebAuthnError::protocol("malformed attestation statement: missing sig")
        })?;
        Ok(Self {
            algorithm: SignatureAlgorithm::ES256,
            signature,
            certificate_chain: fields.x5c,
            is_fido_u2f: true,
        })
    }

    fn packed(fields: StatementFields) -> Result<Self> {
        let Some(alg) = fields.alg else {
            return Err(WebAuthnError::protocol(
                "malformed attestation statement: missing alg",
            ));
        };
        let algorithm = SignatureAlgorithm::try_from(alg).map_err(|_| {
            WebAuthnError::protocol(format!(
                "malformed attestation statement: unrecognized alg {alg}"
            ))
        })?;
        let signature = fields.sig.ok_or_else(|| {
            WebAuthnError::protocol("malformed attestation statement: missing sig")
        })?;
        Ok(Self {
            algorithm,
            signature,
            certificate_chain: fields.x5c,
            is_fido_u2f: false,
        })
    }

    /// Verify the attestation against the authenticator data and client data it covers
    ///
    /// # Errors
    /// - `NotSupported` for self-attestation (no certificate chain)
    /// - `InvalidOperation` if a U2F statement covers authenticator data without
    ///   an attested EC2 credential key
    /// - `InvalidAttestation` for a signature mismatch, an unusable certificate
    ///   (including a key that cannot produce `alg` signatures), a CA or
    ///   unconstrained `packed` certificate, or an AAGUID mismatch
    pub fn verify(
        &self,
        authenticator_data: &AuthenticatorData,
        client_data: &ClientData,
    ) -> Result<()> {
        let Some(leaf) = self.certificate() else {
            return Err(WebAuthnError::NotSupported(
                "self-attestation verification is not supported".to_string(),
            ));
        };
        let certificate = AttestationCertificate::from_der(leaf)?;

        let base = if self.is_fido_u2f {
            u2f_signature_base(authenticator_data, client_data)?
        } else {
            authenticator_data.signature_base(client_data.hash())
        };
        let matches = certificate
            .verify_signature(self.algorithm, &base, &self.signature)
            .map_err(|e| match e {
                WebAuthnError::Protocol(msg) => WebAuthnError::attestation(format!(
                    "unusable attestation certificate: {msg}"
                )),
                other => other,
            })?;
        if !matches {
            return Err(WebAuthnError::attestation(
                "attestation signature does not match",
            ));
        }

        if !self.is_fido_u2f {
            match certificate.is_ca() {
                Some(false) => {}
                Some(true) => {
                    return Err(WebAuthnError::attestation(
                        "attestation certificate must not be a CA certificate",
                    ));
                }
                None => {
                    return Err(WebAuthnError::attestation(
                        "attestation certificate is missing basic constraints",
                    ));
                }
            }
        }

        if let Some(aaguid) = certificate.aaguid()? {
            let attested = authenticator_data
                .attested_credential_data()
                .map(super::authenticator_data::AttestedCredentialData::aaguid);
            if attested != Some(aaguid) {
                return Err(WebAuthnError::attestation(format!(
                    "AAGUID mismatch between certificate ({aaguid}) and authenticator data"
                )));
            }
        }

        debug!(
            "Attestation verified ({}, algorithm {})",
            if self.is_fido_u2f { FORMAT_FIDO_U2F } else { FORMAT_PACKED },
            self.algorithm
        );
        Ok(())
    }

    /// Self-attested statements carry no certificate chain
    #[must_use]
    pub fn is_self_attested(&self) -> bool {
        self.certificate_chain.is_none()
    }

    /// Leaf attestation certificate (DER), the first chain entry
    #[must_use]
    pub fn certificate(&self) -> Option<&[u8]> {
        self.certificate_chain
            .as_ref()
            .and_then(|chain| chain.first())
            .map(Vec::as_slice)
    }

    /// Certificate chain, leaf first
    #[must_use]
    pub fn certificate_chain(&self) -> Option<&[Vec<u8>]> {
        self.certificate_chain.as_deref()
    }

    #[must_use]
    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    #[must_use]
    pub fn is_fido_u2f(&self) -> bool {
        self.is_fido_u2f
    }
}

impl StatementFields {
    fn decode(reader: CborReader<'_>) -> Result<(Self, CborReader<'_>)> {
        let mut fields = Self::default();
        let (count, mut cursor) = reader.read_map_start()?;
        let mut read = 0;

        while !cursor.at_collection_end(count, read) {
            let (key, value) = cursor.read_text_string()?;
            cursor = match key {
                "alg" => {
                    let (alg, next) = value.read_integer()?;
                    fields.alg = Some(alg);
                    next
                }
                "sig" => {
                    let (sig, next) = value.read_byte_string()?;
                    fields.sig = Some(sig.to_vec());
                    next
                }
                "x5c" => {
                    let (chain, next) = read_certificate_chain(value)?;
                    fields.x5c = Some(chain);
                    next
                }
                other => {
                    debug!("Skipping attestation statement entry '{other}'");
                    value.skip()?
                }
            };
            read += 1;
        }

        Ok((fields, cursor.end_collection(count)?))
    }
}

fn read_certificate_chain(reader: CborReader<'_>) -> Result<(Vec<Vec<u8>>, CborReader<'_>)> {
    let (count, mut cursor) = reader.read_array_start()?;
    let mut chain = Vec::new();
    let mut read = 0;
    while !cursor.at_collection_end(count, read) {
        let (der, next) = cursor.read_byte_string()?;
        chain.push(der.to_vec());
        cursor = next;
        read += 1;
    }
    if chain.is_empty() {
        return Err(WebAuthnError::protocol(
            "malformed attestation statement: empty x5c",
        ));
    }
    Ok((chain, cursor.end_collection(count)?))
}

/// `0x00 || rpIdHash || clientDataHash || credentialId || 0x04 || X || Y`
fn u2f_signature_base(
    authenticator_data: &AuthenticatorData,
    client_data: &ClientData,
) -> Result<Vec<u8>> {
    let attested = authenticator_data.attested_credential_data().ok_or_else(|| {
        WebAuthnError::InvalidOperation(
            "fido-u2f attestation requires attested credential data".to_string(),
        )
    })?;
    let point = attested.public_key().uncompressed_point().ok_or_else(|| {
        WebAuthnError::InvalidOperation(
            "fido-u2f attestation requires an EC2 credential key".to_string(),
        )
    })?;

    let credential_id = attested.credential_id().as_bytes();
    let mut base = Vec::with_capacity(
        1 + authenticator_data.rp_id_hash().len()
            + client_data.hash().len()
            + credential_id.len()
            + point.len(),
    );
    base.push(U2F_RESERVED_BYTE);
    base.extend_from_slice(authenticator_data.rp_id_hash());
    base.extend_from_slice(client_data.hash());
    base.extend_from_slice(credential_id);
    base.extend_from_slice(&point);
    Ok(base)
}
