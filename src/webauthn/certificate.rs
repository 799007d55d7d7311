//! Attestation certificates
//!
//! Only the structural checks needed by attestation verification are done here:
//! the leaf certificate's public key, its Basic Constraints `CA` flag and the
//! FIDO AAGUID extension. Chain-of-trust evaluation is left to the caller.

use log::debug;
use openssl::pkey::{PKey, Public};
use openssl::x509::X509;
use uuid::Uuid;
use x509_parser::certificate::X509Certificate;
use x509_parser::prelude::FromDer;

use crate::cose::SignatureAlgorithm;
use crate::crypto;
use crate::errors::{Result, WebAuthnError};

/// `id-fido-gen-ce-aaguid`
pub const OID_FIDO_GEN_CE_AAGUID: &str = "1.3.6.1.4.1.45724.1.1.4";

/// DER header of the extension value: OCTET STRING of 16 bytes
const AAGUID_EXTENSION_PREFIX: [u8; 2] = [0x04, 0x10];

/// Leaf certificate of an attestation statement
pub struct AttestationCertificate {
    public_key: PKey<Public>,
    ca: Option<bool>,
    aaguid_extension: Option<Vec<u8>>,
}

impl AttestationCertificate {
    /// Parse a DER encoded X.509 certificate
    ///
    /// # Errors
    /// Returns `InvalidAttestation` if the certificate or its extensions cannot
    /// be parsed
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let public_key = X509::from_der(der)
            .and_then(|cert| cert.public_key())
            .map_err(|e| {
                WebAuthnError::attestation(format!("failed to parse attestation certificate: {e}"))
            })?;

        let (_, cert) = X509Certificate::from_der(der).map_err(|e| {
            WebAuthnError::attestation(format!("failed to parse attestation certificate: {e}"))
        })?;
        let ca = cert
            .basic_constraints()
            .map_err(|e| WebAuthnError::attestation(format!("invalid basic constraints: {e}")))?
            .map(|ext| ext.value.ca);
        let aaguid_extension = cert
            .extensions()
            .iter()
            .find(|ext| ext.oid.to_id_string() == OID_FIDO_GEN_CE_AAGUID)
            .map(|ext| ext.value.to_vec());

        debug!(
            "Parsed attestation certificate (CA: {ca:?}, AAGUID extension: {})",
            aaguid_extension.is_some()
        );
        Ok(Self {
            public_key,
            ca,
            aaguid_extension,
        })
    }

    /// Basic Constraints `CA` flag, `None` when the extension is absent
    #[must_use]
    pub fn is_ca(&self) -> Option<bool> {
        self.ca
    }

    /// AAGUID carried by the `id-fido-gen-ce-aaguid` extension, if present
    ///
    /// # Errors
    /// Returns `InvalidAttestation` if the extension is not a 16-byte OCTET STRING
    pub fn aaguid(&self) -> Result<Option<Uuid>> {
        let Some(value) = self.aaguid_extension.as_deref() else {
            return Ok(None);
        };
        match value.strip_prefix(&AAGUID_EXTENSION_PREFIX[..]) {
            Some(aaguid) if aaguid.len() == 16 => {
                Uuid::from_slice(aaguid)
                    .map(Some)
                    .map_err(|e| {
                        WebAuthnError::attestation(format!("invalid AAGUID extension: {e}"))
                    })
            }
            _ => Err(WebAuthnError::attestation(
                "AAGUID extension is not a 16-byte octet string",
            )),
        }
    }

    /// Check `signature` over `data` with the certificate's public key
    ///
    /// # Errors
    /// Returns `Protocol` if the key cannot produce `algorithm` signatures
    pub fn verify_signature(
        &self,
        algorithm: SignatureAlgorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<bool> {
        crypto::verify_signature(&self.public_key, algorithm, data, signature)
    }
}
