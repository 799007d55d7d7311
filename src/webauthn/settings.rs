//! Relying party settings
//!
//! Settings are read from TOML with `basic-toml`. Missing keys take their
//! defaults, and `RP_ID` / `RP_ORIGIN` environment variables override the file.

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use super::attestation::{FORMAT_FIDO_U2F, FORMAT_NONE, FORMAT_PACKED};
use crate::crypto;
use crate::errors::{Result, WebAuthnError};

/// Relying party verification policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelyingPartySettings {
    /// Relying Party ID (usually the domain)
    pub rp_id: String,
    /// Relying Party origin (e.g., <https://example.com>)
    pub rp_origin: String,
    /// Reject responses without the UV flag
    pub require_user_verification: bool,
    /// Accept `none` attestation at registration without verifying a statement
    pub allow_unattested: bool,
    /// Attestation formats accepted at registration
    pub accepted_formats: Vec<String>,
}

impl Default for RelyingPartySettings {
    fn default() -> Self {
        Self {
            rp_id: "localhost".to_string(),
            rp_origin: "https://localhost".to_string(),
            require_user_verification: false,
            allow_unattested: true,
            accepted_formats: [FORMAT_NONE, FORMAT_FIDO_U2F, FORMAT_PACKED]
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl RelyingPartySettings {
    /// Parse settings from TOML text
    ///
    /// # Errors
    /// Returns `Configuration` if the TOML is invalid or fails [`Self::validate`]
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let settings: Self = basic_toml::from_str(toml)
            .map_err(|e| WebAuthnError::Configuration(format!("invalid settings TOML: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file, then apply environment overrides
    ///
    /// # Errors
    /// Returns `Configuration` if the file cannot be read or the settings are invalid
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    /// [`Self::load`] with overrides taken from `lookup` instead of the process environment
    ///
    /// # Errors
    /// Returns `Configuration` if the file cannot be read or the settings are invalid
    pub fn load_with(
        path: impl AsRef<Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let toml = fs::read_to_string(path).map_err(|e| {
            WebAuthnError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        let mut settings: Self = basic_toml::from_str(&toml)
            .map_err(|e| WebAuthnError::Configuration(format!("invalid settings TOML: {e}")))?;
        settings.apply_env_overrides(lookup);
        settings.validate()?;
        debug!("Loaded relying party settings from {}", path.display());
        Ok(settings)
    }

    /// Override `rp_id` and `rp_origin` from `RP_ID` and `RP_ORIGIN`
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(rp_id) = lookup("RP_ID") {
            self.rp_id = rp_id;
        }
        if let Some(rp_origin) = lookup("RP_ORIGIN") {
            self.rp_origin = rp_origin;
        }
    }

    /// Check the settings are usable
    ///
    /// # Errors
    /// Returns `Configuration` for an empty RP ID, a non-HTTPS origin other than
    /// localhost, or an unknown attestation format
    pub fn validate(&self) -> Result<()> {
        if self.rp_id.trim().is_empty() {
            return Err(WebAuthnError::Configuration(
                "rp_id must not be empty".to_string(),
            ));
        }

        if !self.rp_origin.starts_with("https://") && !is_localhost_origin(&self.rp_origin) {
            return Err(WebAuthnError::Configuration(format!(
                "rp_origin must use https, got {}",
                self.rp_origin
            )));
        }

        if let Some(format) = self
            .accepted_formats
            .iter()
            .find(|f| ![FORMAT_NONE, FORMAT_FIDO_U2F, FORMAT_PACKED].contains(&f.as_str()))
        {
            return Err(WebAuthnError::Configuration(format!(
                "unknown attestation format '{format}'"
            )));
        }

        Ok(())
    }

    /// SHA-256 of the RP ID, as carried in authenticator data
    #[must_use]
    pub fn rp_id_hash(&self) -> Vec<u8> {
        crypto::sha256(self.rp_id.as_bytes())
    }

    #[must_use]
    pub fn accepts_format(&self, format: &str) -> bool {
        self.accepted_formats.iter().any(|f| f == format)
    }
}

/// `http://localhost` with an optional numeric port
fn is_localhost_origin(origin: &str) -> bool {
    match origin.strip_prefix("http://localhost") {
        Some("") => true,
        Some(rest) => rest
            .strip_prefix(':')
            .is_some_and(|port| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit())),
        None => false,
    }
}
