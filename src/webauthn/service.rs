//! `WebAuthn` relying party service
//!
//! This module ties decoding and verification together with the relying
//! party's policy for registration and authentication ceremonies.

use super::assertion::Assertion;
use super::attestation::FORMAT_NONE;
use super::authenticator_data::AuthenticatorData;
use super::client_data::{ClientData, CEREMONY_CREATE, CEREMONY_GET};
use super::credential::{Credential, CredentialId, Transport};
use super::settings::RelyingPartySettings;
use crate::errors::{Result, WebAuthnError};
use crate::utils::logging::LoggingHelper;

const REGISTRATION: &str = "Registration";
const AUTHENTICATION: &str = "Authentication";

/// Core relying party service
pub struct RelyingParty {
    settings: RelyingPartySettings,
    rp_id_hash: Vec<u8>,
}

impl RelyingParty {
    /// Create a new `RelyingParty` with the given settings
    ///
    /// # Errors
    /// Returns `Configuration` if the settings fail validation
    pub fn new(settings: RelyingPartySettings) -> Result<Self> {
        settings.validate()?;
        let rp_id_hash = settings.rp_id_hash();
        Ok(Self {
            settings,
            rp_id_hash,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &RelyingPartySettings {
        &self.settings
    }

    /// Complete registration with the authenticator's response
    ///
    /// # Arguments
    /// * `attestation_object` - CBOR attestation object
    /// * `client_data_json` - Client data JSON bytes
    /// * `credential_id` - Raw credential ID reported by the client
    /// * `transport` - Transport the authenticator was reached over
    /// * `expected_challenge` - Base64url challenge issued for this ceremony
    ///
    /// # Returns
    /// * `Ok(Credential)` - The registered credential
    /// * `Err(WebAuthnError)` - If registration fails
    ///
    /// # Errors
    /// Returns a `WebAuthnError` if decoding, client data checks, authenticator
    /// data checks, the format policy or attestation verification fail
    pub fn finish_registration(
        &self,
        attestation_object: &[u8],
        client_data_json: &[u8],
        credential_id: CredentialId,
        transport: Transport,
        expected_challenge: &str,
    ) -> Result<Credential> {
        self.register(
            attestation_object,
            client_data_json,
            credential_id,
            transport,
            expected_challenge,
        )
        .inspect_err(|e| LoggingHelper::log_rejection(REGISTRATION, e))
    }

    fn register(
        &self,
        attestation_object: &[u8],
        client_data_json: &[u8],
        credential_id: CredentialId,
        transport: Transport,
        expected_challenge: &str,
    ) -> Result<Credential> {
        let client_data = ClientData::from_json(client_data_json.to_vec());
        client_data.verify(CEREMONY_CREATE, expected_challenge, &self.settings.rp_origin)?;

        let credential =
            Credential::decode(attestation_object, client_data, credential_id, transport)?;
        self.check_authenticator_data(credential.authenticator_data())?;

        let Some(attested) = credential.authenticator_data().attested_credential_data() else {
            return Err(WebAuthnError::VerificationFailed(
                "Missing attested credential data".to_string(),
            ));
        };
        if attested.credential_id() != credential.id() {
            return Err(WebAuthnError::VerificationFailed(
                "Credential ID mismatch".to_string(),
            ));
        }

        if !self.settings.accepts_format(credential.format()) {
            return Err(WebAuthnError::VerificationFailed(format!(
                "Attestation format {} is not accepted",
                credential.format()
            )));
        }

        if credential.format() == FORMAT_NONE {
            if !self.settings.allow_unattested {
                return Err(WebAuthnError::VerificationFailed(
                    "Unattested credentials are not accepted".to_string(),
                ));
            }
            LoggingHelper::log_unattested_accepted(credential.id());
        } else {
            credential.verify()?;
        }

        LoggingHelper::log_registration_verified(credential.id(), credential.format());
        Ok(credential)
    }

    /// Complete authentication against a registered credential
    ///
    /// # Returns
    /// * `Ok(u32)` - The sign count reported by the authenticator. Comparing it
    ///   with the stored count is left to the caller.
    /// * `Err(WebAuthnError)` - If authentication fails
    ///
    /// # Errors
    /// Returns a `WebAuthnError` if client data checks, authenticator data checks
    /// or signature verification fail
    pub fn finish_authentication(
        &self,
        assertion: &Assertion,
        credential: &Credential,
        expected_challenge: &str,
    ) -> Result<u32> {
        self.authenticate(assertion, credential, expected_challenge)
            .inspect_err(|e| LoggingHelper::log_rejection(AUTHENTICATION, e))
    }

    fn authenticate(
        &self,
        assertion: &Assertion,
        credential: &Credential,
        expected_challenge: &str,
    ) -> Result<u32> {
        assertion.client_data().verify(
            CEREMONY_GET,
            expected_challenge,
            &self.settings.rp_origin,
        )?;
        self.check_authenticator_data(assertion.authenticator_data())?;
        assertion.verify(credential)?;

        let sign_count = assertion.sign_count();
        LoggingHelper::log_authentication_verified(credential.id(), sign_count);
        Ok(sign_count)
    }

    fn check_authenticator_data(&self, authenticator_data: &AuthenticatorData) -> Result<()> {
        if authenticator_data.rp_id_hash()[..] != self.rp_id_hash[..] {
            return Err(WebAuthnError::VerificationFailed(
                "RP ID hash mismatch".to_string(),
            ));
        }

        let flags = authenticator_data.flags();
        if !flags.user_present() {
            return Err(WebAuthnError::VerificationFailed(
                "User presence flag not set".to_string(),
            ));
        }
        if self.settings.require_user_verification && !flags.user_verified() {
            return Err(WebAuthnError::VerificationFailed(
                "User verification required".to_string(),
            ));
        }

        Ok(())
    }
}
