//! Minimal CBOR (RFC 8949) decoder for `WebAuthn` structures
//!
//! Only decoding is provided. Floating point values, indefinite-length strings
//! and skipping of composite items are reported as `UnsupportedItem`.

mod reader;

pub use reader::{CborReader, MajorType, BREAK, SIMPLE_FALSE, SIMPLE_NULL, SIMPLE_TRUE};
