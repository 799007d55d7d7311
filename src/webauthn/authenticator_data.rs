//! Authenticator data parsing
//!
//! Layout:
//! - 32 bytes: RP ID hash
//! - 1 byte: flags
//! - 4 bytes: signature counter (big-endian)
//! - variable: attested credential data (if the AT flag is set)
//!   - 16 bytes: AAGUID
//!   - 2 bytes: credential ID length (L)
//!   - L bytes: credential ID
//!   - variable: COSE public key
//! - variable: extension data, kept uninterpreted

use std::fmt;
use std::ops::BitOr;

use uuid::Uuid;

use super::credential::CredentialId;
use crate::cbor::CborReader;
use crate::cose::CosePublicKey;
use crate::errors::{Result, WebAuthnError};
use crate::utils::bytes;

/// Length of the RP ID hash
pub const RP_ID_HASH_LEN: usize = 32;

/// Length of the fixed header (RP ID hash, flags, counter)
pub const AUTHENTICATOR_DATA_MIN_LEN: usize = 37;

const AAGUID_LEN: usize = 16;

/// Authenticator data flags byte
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AuthenticatorFlags(u8);

impl AuthenticatorFlags {
    pub const USER_PRESENT: Self = Self(0x01);
    pub const USER_VERIFIED: Self = Self(0x04);
    pub const BACKUP_ELIGIBLE: Self = Self(0x08);
    pub const BACKED_UP: Self = Self(0x10);
    pub const ATTESTED_CREDENTIAL_DATA_INCLUDED: Self = Self(0x40);
    pub const EXTENSION_DATA_INCLUDED: Self = Self(0x80);

    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn user_present(self) -> bool {
        self.contains(Self::USER_PRESENT)
    }

    #[must_use]
    pub const fn user_verified(self) -> bool {
        self.contains(Self::USER_VERIFIED)
    }

    #[must_use]
    pub const fn backup_eligible(self) -> bool {
        self.contains(Self::BACKUP_ELIGIBLE)
    }

    #[must_use]
    pub const fn backed_up(self) -> bool {
        self.contains(Self::BACKED_UP)
    }

    #[must_use]
    pub const fn attested_credential_data_included(self) -> bool {
        self.contains(Self::ATTESTED_CREDENTIAL_DATA_INCLUDED)
    }

    #[must_use]
    pub const fn extension_data_included(self) -> bool {
        self.contains(Self::EXTENSION_DATA_INCLUDED)
    }
}

impl BitOr for AuthenticatorFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for AuthenticatorFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::USER_PRESENT, "UP"),
            (Self::USER_VERIFIED, "UV"),
            (Self::BACKUP_ELIGIBLE, "BE"),
            (Self::BACKED_UP, "BS"),
            (Self::ATTESTED_CREDENTIAL_DATA_INCLUDED, "AT"),
            (Self::EXTENSION_DATA_INCLUDED, "ED"),
        ];
        let set: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "AuthenticatorFlags({:#04x}: {})", self.0, set.join("|"))
    }
}

/// Credential material present in registration responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestedCredentialData {
    aaguid: Uuid,
    credential_id: CredentialId,
    public_key: CosePublicKey,
}

impl AttestedCredentialData {
    /// Parse from the start of `buffer`, returning the number of bytes consumed
    fn parse(buffer: &[u8]) -> Result<(Self, usize)> {
        let aaguid = Uuid::from_bytes(bytes::read_array::<AAGUID_LEN>(buffer, 0)?);
        let id_len = usize::from(bytes::read_u16_be(buffer, AAGUID_LEN)?);
        let id_offset = AAGUID_LEN + 2;
        let credential_id = CredentialId::from(bytes::read_slice(buffer, id_offset, id_len)?);

        let key_offset = id_offset + id_len;
        let reader = CborReader::with_range(buffer, key_offset, buffer.len() - key_offset)?;
        let (public_key, rest) = CosePublicKey::decode(reader)?;

        Ok((
            Self {
                aaguid,
                credential_id,
                public_key,
            },
            rest.offset(),
        ))
    }

    #[must_use]
    pub fn aaguid(&self) -> Uuid {
        self.aaguid
    }

    #[must_use]
    pub fn credential_id(&self) -> &CredentialId {
        &self.credential_id
    }

    #[must_use]
    pub fn public_key(&self) -> &CosePublicKey {
        &self.public_key
    }
}

/// Parsed authenticator data, keeping the raw bytes it was parsed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatorData {
    raw: Vec<u8>,
    rp_id_hash: [u8; RP_ID_HASH_LEN],
    flags: AuthenticatorFlags,
    sign_count: u32,
    attested_credential_data: Option<AttestedCredentialData>,
    extensions_offset: Option<usize>,
}

impl AuthenticatorData {
    /// Parse an authenticator data record
    ///
    /// Attested credential data is parsed only when the AT flag is set and bytes
    /// remain after the 37-byte header. Anything after the COSE key is kept as
    /// extension data.
    ///
    /// # Errors
    /// - `InvalidArgument` if `raw` is shorter than 37 bytes
    /// - `MalformedItem` if the attested credential data is truncated
    /// - COSE key errors for the embedded public key
    pub fn parse(raw: &[u8]) -> Result<Self> {
        if raw.len() < AUTHENTICATOR_DATA_MIN_LEN {
            return Err(WebAuthnError::InvalidArgument(format!(
                "authenticator data must be at least {AUTHENTICATOR_DATA_MIN_LEN} bytes, got {}",
                raw.len()
            )));
        }

        let rp_id_hash = bytes::read_array::<RP_ID_HASH_LEN>(raw, 0)?;
        let flags = AuthenticatorFlags::from_bits(bytes::read_u8(raw, RP_ID_HASH_LEN)?);
        let sign_count = bytes::read_u32_be(raw, RP_ID_HASH_LEN + 1)?;

        let mut offset = AUTHENTICATOR_DATA_MIN_LEN;
        let attested_credential_data =
            if flags.attested_credential_data_included() && raw.len() > offset {
                let (data, consumed) = AttestedCredentialData::parse(&raw[offset..])?;
                offset += consumed;
                Some(data)
            } else {
                None
            };
        let extensions_offset = (offset < raw.len()).then_some(offset);

        Ok(Self {
            raw: raw.to_vec(),
            rp_id_hash,
            flags,
            sign_count,
            attested_credential_data,
            extensions_offset,
        })
    }

    /// The bytes this record was parsed from
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    #[must_use]
    pub fn rp_id_hash(&self) -> &[u8; RP_ID_HASH_LEN] {
        &self.rp_id_hash
    }

    #[must_use]
    pub fn flags(&self) -> AuthenticatorFlags {
        self.flags
    }

    /// Signature counter. Monotonicity is not enforced here.
    #[must_use]
    pub fn sign_count(&self) -> u32 {
        self.sign_count
    }

    #[must_use]
    pub fn attested_credential_data(&self) -> Option<&AttestedCredentialData> {
        self.attested_credential_data.as_ref()
    }

    /// Trailing extension bytes, uninterpreted
    #[must_use]
    pub fn extension_data(&self) -> Option<&[u8]> {
        self.extensions_offset.map(|offset| &self.raw[offset..])
    }

    /// `authenticatorData || clientDataHash`, the signed payload of assertions
    /// and packed attestations
    #[must_use]
    pub fn signature_base(&self, client_data_hash: &[u8]) -> Vec<u8> {
        let mut base = Vec::with_capacity(self.raw.len() + client_data_hash.len());
        base.extend_from_slice(&self.raw);
        base.extend_from_slice(client_data_hash);
        base
    }
}

impl TryFrom<&[u8]> for AuthenticatorData {
    type Error = WebAuthnError;

    fn try_from(raw: &[u8]) -> Result<Self> {
        Self::parse(raw)
    }
}
