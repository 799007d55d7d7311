//! COSE public keys (RFC 9052 §7, RFC 9053 §7)

mod algorithm;
mod key;

pub use algorithm::{EllipticCurve, HashAlgorithm, KeyType, RsaPadding, SignatureAlgorithm};
pub use key::{CoseKeyParameters, CosePublicKey};
