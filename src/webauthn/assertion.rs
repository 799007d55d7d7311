//! Authentication assertions

use log::debug;

use super::authenticator_data::AuthenticatorData;
use super::client_data::ClientData;
use super::credential::{Credential, CredentialId};
use crate::errors::{Result, WebAuthnError};

/// Signed response of an authentication ceremony
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    client_data: ClientData,
    authenticator_data: AuthenticatorData,
    user_id: Option<Vec<u8>>,
    credential_id: CredentialId,
    signature: Vec<u8>,
}

impl Assertion {
    #[must_use]
    pub fn new(
        client_data: ClientData,
        authenticator_data: AuthenticatorData,
        user_id: Option<Vec<u8>>,
        credential_id: CredentialId,
        signature: Vec<u8>,
    ) -> Self {
        Self {
            client_data,
            authenticator_data,
            user_id,
            credential_id,
            signature,
        }
    }

    /// Build an assertion from the raw authenticator data bytes
    ///
    /// # Errors
    /// Returns any error from [`AuthenticatorData::parse`]
    pub fn decode(
        client_data: ClientData,
        authenticator_data: &[u8],
        user_id: Option<Vec<u8>>,
        credential_id: CredentialId,
        signature: Vec<u8>,
    ) -> Result<Self> {
        let authenticator_data = AuthenticatorData::parse(authenticator_data)?;
        Ok(Self::new(
            client_data,
            authenticator_data,
            user_id,
            credential_id,
            signature,
        ))
    }

    /// Verify the signature over `authenticatorData || clientDataHash` with the
    /// credential's public key
    ///
    /// # Errors
    /// - `InvalidAttestation` if the credential has no public key or the
    ///   signature does not match
    /// - `Protocol` if the assertion names a different credential
    pub fn verify(&self, credential: &Credential) -> Result<()> {
        let Some(public_key) = credential.public_key() else {
            return Err(WebAuthnError::attestation("no public key available"));
        };

        if &self.credential_id != credential.id() {
            return Err(WebAuthnError::protocol(format!(
                "assertion for credential {} presented against credential {}",
                self.credential_id,
                credential.id()
            )));
        }

        let base = self.authenticator_data.signature_base(self.client_data.hash());
        if !public_key.verify_signature(&base, &self.signature)? {
            return Err(WebAuthnError::attestation("assertion signature does not match"));
        }

        debug!(
            "Assertion verified for credential {} (sign count {})",
            self.credential_id,
            self.sign_count()
        );
        Ok(())
    }

    /// Signature counter reported by the authenticator
    #[must_use]
    pub fn sign_count(&self) -> u32 {
        self.authenticator_data.sign_count()
    }

    #[must_use]
    pub fn client_data(&self) -> &ClientData {
        &self.client_data
    }

    #[must_use]
    pub fn authenticator_data(&self) -> &AuthenticatorData {
        &self.authenticator_data
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&[u8]> {
        self.user_id.as_deref()
    }

    #[must_use]
    pub fn credential_id(&self) -> &CredentialId {
        &self.credential_id
    }

    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }
}
