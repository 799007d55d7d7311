//! `WebAuthn` registration and authentication verification
//!
//! Decodes authenticator responses into credentials and assertions and verifies
//! their signatures. [`RelyingParty`] adds the ceremony checks (client data,
//! RP ID, user presence) on top.

mod assertion;
mod attestation;
mod authenticator_data;
mod certificate;
mod client_data;
mod credential;
mod service;
mod settings;

// Re-exports for public use
pub use assertion::Assertion;
pub use attestation::{AttestationStatement, FORMAT_FIDO_U2F, FORMAT_NONE, FORMAT_PACKED};
pub use authenticator_data::{
    AttestedCredentialData, AuthenticatorData, AuthenticatorFlags, AUTHENTICATOR_DATA_MIN_LEN,
    RP_ID_HASH_LEN,
};
pub use certificate::{AttestationCertificate, OID_FIDO_GEN_CE_AAGUID};
pub use client_data::{ClientData, CollectedClientData, CEREMONY_CREATE, CEREMONY_GET};
pub use credential::{Credential, CredentialId, Transport};
pub use service::RelyingParty;
pub use settings::RelyingPartySettings;
