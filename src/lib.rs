#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

//! FIDO2 / `WebAuthn` response verification
//!
//! Decodes attestation objects and authenticator data, and verifies attestation
//! and assertion signatures for relying parties.

/// Version of the fido2-verify library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cbor;
pub mod cose;
pub mod crypto;
pub mod errors;
pub mod utils;
pub mod webauthn;

/// Re-export commonly used items
pub use cbor::CborReader;
pub use cose::{CosePublicKey, HashAlgorithm, SignatureAlgorithm};
pub use errors::{Result, WebAuthnError};
pub use webauthn::{
    Assertion, AttestationStatement, AuthenticatorData, ClientData, Credential, CredentialId,
    RelyingParty, RelyingPartySettings, Transport,
};
