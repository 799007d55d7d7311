//! COSE_Key decoding and signature verification
//!
//! Keys are decoded in two passes over the same map: the first locates the key
//! type (label `1`) and algorithm (label `3`), the second interprets the
//! type-specific parameters. Map order therefore does not matter.

use std::fmt;

use log::debug;
use openssl::bn::BigNum;
use openssl::ec::{EcGroup, EcKey};
use openssl::nid::Nid;
use openssl::pkey::{Id, PKey, Public};
use openssl::rsa::Rsa;

use super::algorithm::{EllipticCurve, KeyType, SignatureAlgorithm};
use crate::cbor::{CborReader, MajorType};
use crate::crypto;
use crate::errors::{Result, WebAuthnError};

const LABEL_KTY: i64 = 1;
const LABEL_ALG: i64 = 3;
const LABEL_CRV_OR_N: i64 = -1;
const LABEL_X_OR_E: i64 = -2;
const LABEL_Y: i64 = -3;

/// Map key of a COSE_Key entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label<'a> {
    Int(i64),
    Text(&'a str),
}

fn read_label<'a>(reader: CborReader<'a>) -> Result<(Label<'a>, CborReader<'a>)> {
    match reader.major_type()? {
        MajorType::UnsignedInteger | MajorType::NegativeInteger => {
            let (label, next) = reader.read_integer()?;
            Ok((Label::Int(label), next))
        }
        MajorType::TextString => {
            let (label, next) = reader.read_text_string()?;
            Ok((Label::Text(label), next))
        }
        other => Err(WebAuthnError::malformed(format!(
            "COSE key label must be an integer or text, found {other}"
        ))),
    }
}

/// Walk every entry of the map at `reader`
///
/// `visit` receives the label and a reader at the value, and returns the reader
/// positioned after the value. Returns the reader after the whole map.
fn for_each_entry<'a, F>(reader: CborReader<'a>, mut visit: F) -> Result<CborReader<'a>>
where
    F: FnMut(Label<'a>, CborReader<'a>) -> Result<CborReader<'a>>,
{
    let (count, mut cursor) = reader.read_map_start()?;
    let mut read = 0;
    while !cursor.at_collection_end(count, read) {
        let (label, value) = read_label(cursor)?;
        cursor = visit(label, value)?;
        read += 1;
    }
    cursor.end_collection(count)
}

/// Type-specific public key parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoseKeyParameters {
    Ec2 {
        curve: EllipticCurve,
        x: Vec<u8>,
        y: Vec<u8>,
    },
    Rsa {
        modulus: Vec<u8>,
        exponent: Vec<u8>,
    },
    Okp {
        curve: EllipticCurve,
        x: Vec<u8>,
    },
}

impl CoseKeyParameters {
    #[must_use]
    pub fn key_type(&self) -> KeyType {
        match self {
            Self::Ec2 { .. } => KeyType::Ec2,
            Self::Rsa { .. } => KeyType::Rsa,
            Self::Okp { .. } => KeyType::Okp,
        }
    }
}

/// Public key decoded from a COSE_Key map
///
/// Holds a native verification key handle that is released when the value is
/// dropped.
#[derive(Clone)]
pub struct CosePublicKey {
    algorithm: SignatureAlgorithm,
    parameters: CoseKeyParameters,
    encoded: Vec<u8>,
    handle: PKey<Public>,
}

impl CosePublicKey {
    /// Decode the COSE_Key map at `reader`
    ///
    /// Returns the key and a reader positioned after the map.
    ///
    /// # Errors
    /// - `MalformedCoseKey` if label `1` or `3` is missing, a type-specific
    ///   parameter is missing, or the parameters do not form a valid key
    /// - `UnsupportedAlgorithm` for unknown algorithm identifiers
    /// - CBOR decoding errors for structurally invalid input
    pub fn decode(reader: CborReader<'_>) -> Result<(Self, CborReader<'_>)> {
        // Pass 1: key type and algorithm
        let mut kty = None;
        let mut alg = None;
        let end = for_each_entry(reader, |label, value| match label {
            Label::Int(LABEL_KTY) => {
                let (v, next) = value.read_integer()?;
                kty = Some(v);
                Ok(next)
            }
            Label::Int(LABEL_ALG) => {
                let (v, next) = value.read_integer()?;
                alg = Some(v);
                Ok(next)
            }
            _ => value.skip(),
        })?;

        let kty = kty.ok_or_else(|| {
            WebAuthnError::MalformedCoseKey("missing key type (label 1)".to_string())
        })?;
        let alg = alg.ok_or_else(|| {
            WebAuthnError::MalformedCoseKey("missing algorithm (label 3)".to_string())
        })?;
        let key_type = KeyType::try_from(kty)?;
        let algorithm = SignatureAlgorithm::try_from(alg)?;
        if algorithm.key_type() != key_type {
            return Err(WebAuthnError::MalformedCoseKey(format!(
                "algorithm {algorithm} cannot be used with key type {kty}"
            )));
        }

        // Pass 2: type-specific parameters
        let parameters = Self::decode_parameters(reader, key_type)?;
        let handle = native_key(&parameters)?;
        let encoded = reader.consumed_until(&end).to_vec();
        debug!("Decoded COSE {key_type:?} key with algorithm {algorithm}");

        Ok((
            Self {
                algorithm,
                parameters,
                encoded,
                handle,
            },
            end,
        ))
    }

    /// Decode a buffer holding exactly one COSE_Key
    ///
    /// # Errors
    /// As [`CosePublicKey::decode`], plus `MalformedItem` for trailing bytes
    pub fn from_cose(bytes: &[u8]) -> Result<Self> {
        let (key, rest) = Self::decode(CborReader::new(bytes))?;
        if rest.can_read() {
            return Err(WebAuthnError::malformed(format!(
                "{} trailing bytes after COSE key",
                rest.remaining_len()
            )));
        }
        Ok(key)
    }

    fn decode_parameters(reader: CborReader<'_>, key_type: KeyType) -> Result<CoseKeyParameters> {
        let mut curve = None;
        let mut first: Option<&[u8]> = None;
        let mut second: Option<&[u8]> = None;
        let mut third: Option<&[u8]> = None;

        for_each_entry(reader, |label, value| match (key_type, label) {
            (KeyType::Ec2 | KeyType::Okp, Label::Int(LABEL_CRV_OR_N)) => {
                let (v, next) = value.read_integer()?;
                curve = Some(v);
                Ok(next)
            }
            (KeyType::Rsa, Label::Int(LABEL_CRV_OR_N)) => {
                let (v, next) = value.read_byte_string()?;
                first = Some(v);
                Ok(next)
            }
            (_, Label::Int(LABEL_X_OR_E)) => {
                let (v, next) = value.read_byte_string()?;
                second = Some(v);
                Ok(next)
            }
            (KeyType::Ec2, Label::Int(LABEL_Y)) => {
                let (v, next) = value.read_byte_string()?;
                third = Some(v);
                Ok(next)
            }
            _ => value.skip(),
        })?;

        let missing = |what: &str| WebAuthnError::MalformedCoseKey(format!("missing {what}"));
        match key_type {
            KeyType::Ec2 => {
                let curve =
                    EllipticCurve::try_from(curve.ok_or_else(|| missing("curve (label -1)"))?)?;
                let x = second.ok_or_else(|| missing("x coordinate (label -2)"))?;
                let y = third.ok_or_else(|| missing("y coordinate (label -3)"))?;
                if curve == EllipticCurve::Ed25519 {
                    return Err(WebAuthnError::MalformedCoseKey(
                        "Ed25519 is not an EC2 curve".to_string(),
                    ));
                }
                let expected = curve.coordinate_len();
                if x.len() != expected || y.len() != expected {
                    return Err(WebAuthnError::MalformedCoseKey(format!(
                        "{curve:?} coordinates must be {expected} bytes"
                    )));
                }
                Ok(CoseKeyParameters::Ec2 {
                    curve,
                    x: x.to_vec(),
                    y: y.to_vec(),
                })
            }
            KeyType::Rsa => Ok(CoseKeyParameters::Rsa {
                modulus: first.ok_or_else(|| missing("modulus (label -1)"))?.to_vec(),
                exponent: second.ok_or_else(|| missing("exponent (label -2)"))?.to_vec(),
            }),
            KeyType::Okp => {
                let curve =
                    EllipticCurve::try_from(curve.ok_or_else(|| missing("curve (label -1)"))?)?;
                if curve != EllipticCurve::Ed25519 {
                    return Err(WebAuthnError::MalformedCoseKey(format!(
                        "{curve:?} is not an OKP curve"
                    )));
                }
                let x = second.ok_or_else(|| missing("public key (label -2)"))?;
                Ok(CoseKeyParameters::Okp {
                    curve,
                    x: x.to_vec(),
                })
            }
        }
    }

    #[must_use]
    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    #[must_use]
    pub fn key_type(&self) -> KeyType {
        self.parameters.key_type()
    }

    #[must_use]
    pub fn parameters(&self) -> &CoseKeyParameters {
        &self.parameters
    }

    /// The COSE_Key bytes this key was decoded from
    #[must_use]
    pub fn as_cose(&self) -> &[u8] {
        &self.encoded
    }

    /// SEC1 uncompressed point `0x04 || X || Y` of an EC2 key
    #[must_use]
    pub fn uncompressed_point(&self) -> Option<Vec<u8>> {
        match &self.parameters {
            CoseKeyParameters::Ec2 { x, y, .. } => {
                let mut point = Vec::with_capacity(1 + x.len() + y.len());
                point.push(0x04);
                point.extend_from_slice(x);
                point.extend_from_slice(y);
                Some(point)
            }
            _ => None,
        }
    }

    /// Check `signature` over `data` with this key's algorithm
    ///
    /// EC2 signatures must be DER encoded; RSA uses PKCS#1 v1.5 for `RS*` and PSS
    /// for `PS*`.
    ///
    /// # Errors
    /// Returns `Crypto` if the provider cannot set up verification
    pub fn verify_signature(&self, data: &[u8], signature: &[u8]) -> Result<bool> {
        crypto::verify_signature(&self.handle, self.algorithm, data, signature)
    }
}

impl PartialEq for CosePublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.algorithm == other.algorithm && self.parameters == other.parameters
    }
}

impl Eq for CosePublicKey {}

impl fmt::Debug for CosePublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CosePublicKey")
            .field("algorithm", &self.algorithm)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

fn native_key(parameters: &CoseKeyParameters) -> Result<PKey<Public>> {
    match parameters {
        CoseKeyParameters::Ec2 { curve, x, y } => {
            let nid = match curve {
                EllipticCurve::P256 => Nid::X9_62_PRIME256V1,
                EllipticCurve::P384 => Nid::SECP384R1,
                EllipticCurve::P521 => Nid::SECP521R1,
                EllipticCurve::Ed25519 => {
                    return Err(WebAuthnError::MalformedCoseKey(
                        "Ed25519 is not an EC2 curve".to_string(),
                    ))
                }
            };
            let group = EcGroup::from_curve_name(nid)?;
            let x = BigNum::from_slice(x)?;
            let y = BigNum::from_slice(y)?;
            let key = EcKey::from_public_key_affine_coordinates(&group, &x, &y).map_err(|e| {
                WebAuthnError::MalformedCoseKey(format!("invalid {curve:?} point: {e}"))
            })?;
            Ok(PKey::from_ec_key(key)?)
        }
        CoseKeyParameters::Rsa { modulus, exponent } => {
            let key = Rsa::from_public_components(
                BigNum::from_slice(modulus)?,
                BigNum::from_slice(exponent)?,
            )
            .map_err(|e| WebAuthnError::MalformedCoseKey(format!("invalid RSA key: {e}")))?;
            Ok(PKey::from_rsa(key)?)
        }
        CoseKeyParameters::Okp { x, .. } => PKey::public_key_from_raw_bytes(x, Id::ED25519)
            .map_err(|e| WebAuthnError::MalformedCoseKey(format!("invalid Ed25519 key: {e}"))),
    }
}
