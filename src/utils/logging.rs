// Centralized logging for ceremony outcomes
use log::{info, warn};

use crate::errors::WebAuthnError;
use crate::webauthn::CredentialId;

pub struct LoggingHelper;

impl LoggingHelper {
    /// Log a rejected ceremony with the error kind for diagnostics
    pub fn log_rejection(ceremony: &str, error: &WebAuthnError) {
        warn!("❌ {} rejected [{}]: {}", ceremony, error.kind(), error);
    }

    /// Log a verified registration
    pub fn log_registration_verified(credential_id: &CredentialId, format: &str) {
        info!("✅ Registered credential {} (attestation: {})", credential_id, format);
    }

    /// Log that an unattested credential was accepted without statement verification
    pub fn log_unattested_accepted(credential_id: &CredentialId) {
        info!(
            "⏭️  Credential {} is unattested, skipping attestation verification",
            credential_id
        );
    }

    /// Log a verified authentication
    pub fn log_authentication_verified(credential_id: &CredentialId, sign_count: u32) {
        info!("✅ Authenticated credential {} (sign count: {})", credential_id, sign_count);
    }
}
