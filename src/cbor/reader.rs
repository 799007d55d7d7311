//! Value-typed CBOR cursor
//!
//! A [`CborReader`] is a view of `(buffer, offset, length)`. Reading never
//! mutates the view; each read returns the decoded value together with a new
//! reader positioned after the consumed item. Collections report their element
//! count, or `None` for indefinite length, and the caller walks the elements with
//! the returned reader.

use std::fmt;

use crate::errors::{Result, WebAuthnError};
use crate::utils::bytes;

/// Additional information value marking indefinite length (or break in type 7)
const INDEFINITE: u8 = 31;

/// Encoded break stop code
pub const BREAK: u8 = 0xff;

/// Simple value `false`
pub const SIMPLE_FALSE: u8 = 20;
/// Simple value `true`
pub const SIMPLE_TRUE: u8 = 21;
/// Simple value `null`
pub const SIMPLE_NULL: u8 = 22;

/// CBOR major type (high 3 bits of the initial byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MajorType {
    UnsignedInteger,
    NegativeInteger,
    ByteString,
    TextString,
    Array,
    Map,
    Tag,
    Simple,
}

impl MajorType {
    #[must_use]
    pub fn from_initial_byte(byte: u8) -> Self {
        match byte >> 5 {
            0 => Self::UnsignedInteger,
            1 => Self::NegativeInteger,
            2 => Self::ByteString,
            3 => Self::TextString,
            4 => Self::Array,
            5 => Self::Map,
            6 => Self::Tag,
            _ => Self::Simple,
        }
    }
}

impl fmt::Display for MajorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UnsignedInteger => "unsigned integer",
            Self::NegativeInteger => "negative integer",
            Self::ByteString => "byte string",
            Self::TextString => "text string",
            Self::Array => "array",
            Self::Map => "map",
            Self::Tag => "tag",
            Self::Simple => "simple value",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy)]
enum Argument {
    Value(u64),
    Indefinite,
}

/// Read-only cursor over one CBOR item sequence
///
/// Invariant: `offset + length <= buffer.len()`.
#[derive(Debug, Clone, Copy)]
pub struct CborReader<'a> {
    buffer: &'a [u8],
    offset: usize,
    length: usize,
}

impl<'a> CborReader<'a> {
    /// Reader over the whole buffer
    #[must_use]
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            offset: 0,
            length: buffer.len(),
        }
    }

    /// Reader over `buffer[offset..offset + length]`
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the range does not fit inside `buffer`
    pub fn with_range(buffer: &'a [u8], offset: usize, length: usize) -> Result<Self> {
        match offset.checked_add(length) {
            Some(end) if end <= buffer.len() => Ok(Self {
                buffer,
                offset,
                length,
            }),
            _ => Err(WebAuthnError::InvalidArgument(format!(
                "range {offset}+{length} exceeds buffer of {} bytes",
                buffer.len()
            ))),
        }
    }

    #[must_use]
    pub fn can_read(&self) -> bool {
        self.length > 0
    }

    /// Absolute offset of the current item within the underlying buffer
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of unread bytes
    #[must_use]
    pub fn remaining_len(&self) -> usize {
        self.length
    }

    /// Unread bytes, starting at the current item
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.buffer[self.offset..self.offset + self.length]
    }

    /// Bytes between this reader and a reader derived from it
    #[must_use]
    pub fn consumed_until(&self, later: &Self) -> &'a [u8] {
        let end = later.offset.clamp(self.offset, self.offset + self.length);
        &self.buffer[self.offset..end]
    }

    fn initial_byte(&self) -> Result<u8> {
        self.remaining()
            .first()
            .copied()
            .ok_or_else(|| WebAuthnError::malformed("unexpected end of CBOR input"))
    }

    /// Major type of the item at the current position
    ///
    /// # Errors
    /// Returns `MalformedItem` if no bytes remain
    pub fn major_type(&self) -> Result<MajorType> {
        self.initial_byte().map(MajorType::from_initial_byte)
    }

    /// Low 5 bits of the initial byte
    ///
    /// # Errors
    /// Returns `MalformedItem` if no bytes remain
    pub fn additional_information(&self) -> Result<u8> {
        self.initial_byte().map(|b| b & 0x1f)
    }

    /// Whether the current item is the break stop code
    #[must_use]
    pub fn is_break(&self) -> bool {
        self.remaining().first() == Some(&BREAK)
    }

    fn advance(&self, count: usize) -> Self {
        debug_assert!(count <= self.length);
        Self {
            buffer: self.buffer,
            offset: self.offset + count,
            length: self.length - count,
        }
    }

    fn take(&self, count: usize) -> Result<(&'a [u8], Self)> {
        let data = bytes::read_slice(self.remaining(), 0, count)?;
        Ok((data, self.advance(count)))
    }

    fn check_major(&self, expected: MajorType) -> Result<()> {
        let found = self.major_type()?;
        if found == expected {
            Ok(())
        } else {
            Err(WebAuthnError::malformed(format!(
                "expected {expected}, found {found} at offset {}",
                self.offset
            )))
        }
    }

    fn read_argument(&self) -> Result<(Argument, Self)> {
        let window = self.remaining();
        let info = self.additional_information()?;
        let (argument, consumed) = match info {
            0..=23 => (Argument::Value(u64::from(info)), 1),
            24 => (Argument::Value(u64::from(bytes::read_u8(window, 1)?)), 2),
            25 => (Argument::Value(u64::from(bytes::read_u16_be(window, 1)?)), 3),
            26 => (Argument::Value(u64::from(bytes::read_u32_be(window, 1)?)), 5),
            27 => (Argument::Value(bytes::read_u64_be(window, 1)?), 9),
            INDEFINITE => (Argument::Indefinite, 1),
            _ => {
                return Err(WebAuthnError::malformed(format!(
                    "reserved additional information {info} at offset {}",
                    self.offset
                )))
            }
        };
        Ok((argument, self.advance(consumed)))
    }

    fn read_definite(&self, expected: MajorType) -> Result<(u64, Self)> {
        self.check_major(expected)?;
        match self.read_argument()? {
            (Argument::Value(value), next) => Ok((value, next)),
            (Argument::Indefinite, _) => Err(WebAuthnError::malformed(format!(
                "{expected} cannot have indefinite length"
            ))),
        }
    }

    fn read_length(&self, expected: MajorType) -> Result<(Option<u64>, Self)> {
        self.check_major(expected)?;
        Ok(match self.read_argument()? {
            (Argument::Value(count), next) => (Some(count), next),
            (Argument::Indefinite, next) => (None, next),
        })
    }

    fn read_string(&self, expected: MajorType) -> Result<(&'a [u8], Self)> {
        let (length, next) = self.read_length(expected)?;
        let Some(length) = length else {
            return Err(WebAuthnError::unsupported(format!(
                "indefinite-length {expected}"
            )));
        };
        let length = usize::try_from(length).map_err(|_| WebAuthnError::Overflow)?;
        next.take(length)
    }

    /// # Errors
    /// Returns `MalformedItem` on type mismatch or truncation
    pub fn read_unsigned(&self) -> Result<(u64, Self)> {
        self.read_definite(MajorType::UnsignedInteger)
    }

    /// Decode a negative integer as `-1 - argument`
    ///
    /// # Errors
    /// Returns `MalformedItem` on type mismatch, `Overflow` if the value is below `i64::MIN`
    pub fn read_negative(&self) -> Result<(i64, Self)> {
        let (argument, next) = self.read_definite(MajorType::NegativeInteger)?;
        let argument = i64::try_from(argument).map_err(|_| WebAuthnError::Overflow)?;
        Ok((-1 - argument, next))
    }

    /// Decode either integer major type into an `i64`
    ///
    /// # Errors
    /// Returns `MalformedItem` if the item is not an integer, `Overflow` if it does not fit
    pub fn read_integer(&self) -> Result<(i64, Self)> {
        match self.major_type()? {
            MajorType::UnsignedInteger => {
                let (value, next) = self.read_unsigned()?;
                let value = i64::try_from(value).map_err(|_| WebAuthnError::Overflow)?;
                Ok((value, next))
            }
            MajorType::NegativeInteger => self.read_negative(),
            other => Err(WebAuthnError::malformed(format!(
                "expected integer, found {other} at offset {}",
                self.offset
            ))),
        }
    }

    /// Borrow the content of a definite-length byte string
    ///
    /// # Errors
    /// `MalformedItem` on mismatch or truncation, `UnsupportedItem` for indefinite length
    pub fn read_byte_string(&self) -> Result<(&'a [u8], Self)> {
        self.read_string(MajorType::ByteString)
    }

    /// Borrow the content of a definite-length UTF-8 text string
    ///
    /// # Errors
    /// `MalformedItem` on mismatch, truncation or invalid UTF-8,
    /// `UnsupportedItem` for indefinite length
    pub fn read_text_string(&self) -> Result<(&'a str, Self)> {
        let (raw, next) = self.read_string(MajorType::TextString)?;
        let text = std::str::from_utf8(raw)
            .map_err(|e| WebAuthnError::malformed(format!("invalid UTF-8 in text string: {e}")))?;
        Ok((text, next))
    }

    /// Start an array; returns the element count (`None` if indefinite)
    ///
    /// # Errors
    /// Returns `MalformedItem` on type mismatch or truncation
    pub fn read_array_start(&self) -> Result<(Option<u64>, Self)> {
        self.read_length(MajorType::Array)
    }

    /// Start a map; returns the pair count (`None` if indefinite)
    ///
    /// # Errors
    /// Returns `MalformedItem` on type mismatch or truncation
    pub fn read_map_start(&self) -> Result<(Option<u64>, Self)> {
        self.read_length(MajorType::Map)
    }

    /// Read a tag number; the returned reader points at the tagged item
    ///
    /// # Errors
    /// Returns `MalformedItem` on type mismatch or truncation
    pub fn read_tag(&self) -> Result<(u64, Self)> {
        self.read_definite(MajorType::Tag)
    }

    /// Read a simple value (major type 7). Break decodes as `31`.
    ///
    /// # Errors
    /// `UnsupportedItem` for floating point, `MalformedItem` otherwise
    pub fn read_simple(&self) -> Result<(u8, Self)> {
        self.check_major(MajorType::Simple)?;
        match self.additional_information()? {
            info @ (0..=23 | INDEFINITE) => Ok((info, self.advance(1))),
            24 => {
                let value = bytes::read_u8(self.remaining(), 1)?;
                Ok((value, self.advance(2)))
            }
            25..=27 => Err(WebAuthnError::unsupported("floating point values")),
            info => Err(WebAuthnError::malformed(format!(
                "reserved simple value encoding {info}"
            ))),
        }
    }

    /// # Errors
    /// Returns `MalformedItem` if the item is not `true` or `false`
    pub fn read_bool(&self) -> Result<(bool, Self)> {
        match self.read_simple()? {
            (SIMPLE_FALSE, next) => Ok((false, next)),
            (SIMPLE_TRUE, next) => Ok((true, next)),
            (other, _) => Err(WebAuthnError::malformed(format!(
                "expected boolean, found simple value {other}"
            ))),
        }
    }

    /// Consume a break stop code
    ///
    /// # Errors
    /// Returns `MalformedItem` if the current byte is not `0xff`
    pub fn read_break(&self) -> Result<Self> {
        if self.is_break() {
            Ok(self.advance(1))
        } else {
            Err(WebAuthnError::malformed(format!(
                "expected break at offset {}",
                self.offset
            )))
        }
    }

    /// Whether a collection with `count` elements is exhausted after `read` of them
    #[must_use]
    pub fn at_collection_end(&self, count: Option<u64>, read: u64) -> bool {
        match count {
            Some(count) => read >= count,
            None => self.is_break(),
        }
    }

    /// Finish a collection, consuming the break of an indefinite one
    ///
    /// # Errors
    /// Returns `MalformedItem` if an indefinite collection is not terminated here
    pub fn end_collection(self, count: Option<u64>) -> Result<Self> {
        match count {
            Some(_) => Ok(self),
            None => self.read_break(),
        }
    }

    /// Skip one scalar item (integer, string, simple value or break)
    ///
    /// # Errors
    /// `UnsupportedItem` for arrays, maps and tags; read errors otherwise
    pub fn skip(&self) -> Result<Self> {
        match self.major_type()? {
            major @ (MajorType::UnsignedInteger | MajorType::NegativeInteger) => {
                self.read_definite(major).map(|(_, next)| next)
            }
            major @ (MajorType::ByteString | MajorType::TextString) => {
                self.read_string(major).map(|(_, next)| next)
            }
            MajorType::Simple => self.read_simple().map(|(_, next)| next),
            major @ (MajorType::Array | MajorType::Map | MajorType::Tag) => Err(
                WebAuthnError::unsupported(format!("skipping a {major} item")),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unsigned(bytes: &[u8]) -> u64 {
        let (value, next) = CborReader::new(bytes).read_unsigned().unwrap();
        assert!(!next.can_read());
        value
    }

    fn integer(bytes: &[u8]) -> Result<i64> {
        CborReader::new(bytes).read_integer().map(|(value, _)| value)
    }

    #[test]
    fn test_unsigned_vectors() {
        assert_eq!(unsigned(&[0x00]), 0);
        assert_eq!(unsigned(&[0x01]), 1);
        assert_eq!(unsigned(&[0x0a]), 10);
        assert_eq!(unsigned(&[0x17]), 23);
        assert_eq!(unsigned(&[0x18, 0x18]), 24);
        assert_eq!(unsigned(&[0x18, 0x19]), 25);
        assert_eq!(unsigned(&[0x18, 0x64]), 100);
        assert_eq!(unsigned(&[0x19, 0x03, 0xe8]), 1000);
        assert_eq!(unsigned(&[0x1a, 0x00, 0x0f, 0x42, 0x40]), 1_000_000);
        assert_eq!(
            unsigned(&[0x1b, 0x00, 0x00, 0x00, 0xe8, 0xd4, 0xa5, 0x10, 0x00]),
            1_000_000_000_000
        );
        assert_eq!(
            unsigned(&[0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]),
            u64::MAX
        );
    }

    #[test]
    fn test_negative_vectors() {
        assert_eq!(integer(&[0x20]).unwrap(), -1);
        assert_eq!(integer(&[0x29]).unwrap(), -10);
        assert_eq!(integer(&[0x38, 0x63]).unwrap(), -100);
        assert_eq!(integer(&[0x39, 0x03, 0xe7]).unwrap(), -1000);
        assert_eq!(
            integer(&[0x3b, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]).unwrap(),
            i64::MIN
        );
    }

    #[test]
    fn test_integer_overflow() {
        let big_negative = [0x3b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
        assert!(matches!(integer(&big_negative), Err(WebAuthnError::Overflow)));
        let big_unsigned = [0x1b, 0x80, 0, 0, 0, 0, 0, 0, 0];
        assert!(matches!(integer(&big_unsigned), Err(WebAuthnError::Overflow)));
    }

    #[test]
    fn test_argument_errors() {
        // reserved additional information 28..=30
        assert!(matches!(
            CborReader::new(&[0x1c]).read_unsigned(),
            Err(WebAuthnError::MalformedItem(_))
        ));
        // truncated 2-byte argument
        assert!(matches!(
            CborReader::new(&[0x19, 0x03]).read_unsigned(),
            Err(WebAuthnError::MalformedItem(_))
        ));
        // indefinite integer
        assert!(matches!(
            CborReader::new(&[0x1f]).read_unsigned(),
            Err(WebAuthnError::MalformedItem(_))
        ));
        // empty input
        assert!(matches!(
            CborReader::new(&[]).read_unsigned(),
            Err(WebAuthnError::MalformedItem(_))
        ));
    }

    #[test]
    fn test_type_mismatch() {
        let err = CborReader::new(&[0x61, 0x61]).read_byte_string().unwrap_err();
        assert!(matches!(err, WebAuthnError::MalformedItem(_)));
        assert!(CborReader::new(&[0x40]).read_integer().is_err());
    }

    #[test]
    fn test_strings() {
        let (bytes, next) = CborReader::new(&[0x40]).read_byte_string().unwrap();
        assert!(bytes.is_empty());
        assert!(!next.can_read());

        let (bytes, _) = CborReader::new(&[0x44, 0x01, 0x02, 0x03, 0x04])
            .read_byte_string()
            .unwrap();
        assert_eq!(bytes, &[1, 2, 3, 4]);

        let (text, _) = CborReader::new(&[0x60]).read_text_string().unwrap();
        assert_eq!(text, "");
        let (text, _) = CborReader::new(&[0x64, 0x49, 0x45, 0x54, 0x46])
            .read_text_string()
            .unwrap();
        assert_eq!(text, "IETF");
        let (text, _) = CborReader::new(&[0x62, 0x22, 0x5c]).read_text_string().unwrap();
        assert_eq!(text, "\"\\");
        let (text, _) = CborReader::new(&[0x62, 0xc3, 0xbc]).read_text_string().unwrap();
        assert_eq!(text, "\u{00fc}");
    }

    #[test]
    fn test_string_errors() {
        // declared length runs past the buffer
        assert!(matches!(
            CborReader::new(&[0x45, 0x01, 0x02]).read_byte_string(),
            Err(WebAuthnError::MalformedItem(_))
        ));
        // indefinite-length byte string (_ h'0102', h'030405')
        let indefinite = [0x5f, 0x42, 0x01, 0x02, 0x43, 0x03, 0x04, 0x05, 0xff];
        assert!(matches!(
            CborReader::new(&indefinite).read_byte_string(),
            Err(WebAuthnError::UnsupportedItem(_))
        ));
        assert!(matches!(
            CborReader::new(&[0x7f, 0x61, 0x61, 0xff]).read_text_string(),
            Err(WebAuthnError::UnsupportedItem(_))
        ));
        assert!(matches!(
            CborReader::new(&[0x62, 0xff, 0xfe]).read_text_string(),
            Err(WebAuthnError::MalformedItem(_))
        ));
    }

    #[test]
    fn test_definite_array() {
        let data = [0x83, 0x01, 0x02, 0x03];
        let (count, mut reader) = CborReader::new(&data).read_array_start().unwrap();
        assert_eq!(count, Some(3));
        let mut values = Vec::new();
        let mut read = 0;
        while !reader.at_collection_end(count, read) {
            let (value, next) = reader.read_unsigned().unwrap();
            values.push(value);
            reader = next;
            read += 1;
        }
        let reader = reader.end_collection(count).unwrap();
        assert_eq!(values, vec![1, 2, 3]);
        assert!(!reader.can_read());
    }

    #[test]
    fn test_indefinite_array_stops_at_break() {
        // [_ 1, 2, 3] followed by a trailing item
        let data = [0x9f, 0x01, 0x02, 0x03, 0xff, 0x18, 0x2a];
        let (count, mut reader) = CborReader::new(&data).read_array_start().unwrap();
        assert_eq!(count, None);
        let mut read = 0;
        while !reader.at_collection_end(count, read) {
            reader = reader.skip().unwrap();
            read += 1;
        }
        assert_eq!(read, 3);
        let reader = reader.end_collection(count).unwrap();
        assert_eq!(reader.offset(), 5);
        assert_eq!(reader.read_unsigned().unwrap().0, 42);
    }

    #[test]
    fn test_indefinite_array_without_break_fails() {
        let data = [0x9f, 0x01, 0x02];
        let (count, mut reader) = CborReader::new(&data).read_array_start().unwrap();
        let mut result = Ok(());
        let mut read = 0;
        while !reader.at_collection_end(count, read) {
            match reader.read_unsigned() {
                Ok((_, next)) => reader = next,
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
            read += 1;
        }
        assert!(matches!(result, Err(WebAuthnError::MalformedItem(_))));
    }

    #[test]
    fn test_indefinite_map() {
        // {_ "Fun": true, "Amt": -2}
        let data = [
            0xbf, 0x63, 0x46, 0x75, 0x6e, 0xf5, 0x63, 0x41, 0x6d, 0x74, 0x21, 0xff,
        ];
        let (count, reader) = CborReader::new(&data).read_map_start().unwrap();
        assert_eq!(count, None);
        let (key, reader) = reader.read_text_string().unwrap();
        assert_eq!(key, "Fun");
        let (fun, reader) = reader.read_bool().unwrap();
        assert!(fun);
        let (key, reader) = reader.read_text_string().unwrap();
        assert_eq!(key, "Amt");
        let (amt, reader) = reader.read_integer().unwrap();
        assert_eq!(amt, -2);
        assert!(reader.at_collection_end(count, 2));
        assert!(!reader.end_collection(count).unwrap().can_read());
    }

    #[test]
    fn test_definite_map_count() {
        let data = [0xa2, 0x01, 0x02, 0x03, 0x04];
        let (count, _) = CborReader::new(&data).read_map_start().unwrap();
        assert_eq!(count, Some(2));
        let (count, _) = CborReader::new(&[0xa0]).read_map_start().unwrap();
        assert_eq!(count, Some(0));
    }

    #[test]
    fn test_tags() {
        // 32("a")
        let data = [0xd8, 0x20, 0x61, 0x61];
        let (tag, inner) = CborReader::new(&data).read_tag().unwrap();
        assert_eq!(tag, 32);
        assert_eq!(inner.read_text_string().unwrap().0, "a");

        // 1(1363896240)
        let data = [0xc1, 0x1a, 0x51, 0x4b, 0x67, 0xb0];
        let (tag, inner) = CborReader::new(&data).read_tag().unwrap();
        assert_eq!(tag, 1);
        assert_eq!(inner.read_unsigned().unwrap().0, 1_363_896_240);
    }

    #[test]
    fn test_simple_values() {
        assert_eq!(CborReader::new(&[0xf4]).read_simple().unwrap().0, SIMPLE_FALSE);
        assert_eq!(CborReader::new(&[0xf5]).read_simple().unwrap().0, SIMPLE_TRUE);
        assert_eq!(CborReader::new(&[0xf6]).read_simple().unwrap().0, SIMPLE_NULL);
        assert_eq!(CborReader::new(&[0xf0]).read_simple().unwrap().0, 16);
        assert_eq!(CborReader::new(&[0xf8, 0xff]).read_simple().unwrap().0, 255);
        assert_eq!(CborReader::new(&[0xff]).read_simple().unwrap().0, 31);
        assert!(CborReader::new(&[0xf6]).read_bool().is_err());
    }

    #[test]
    fn test_floats_unsupported() {
        for data in [
            &[0xf9, 0x3c, 0x00][..],
            &[0xfa, 0x47, 0xc3, 0x50, 0x00][..],
            &[0xfb, 0x3f, 0xf1, 0x99, 0x99, 0x99, 0x99, 0x99, 0x9a][..],
        ] {
            assert!(matches!(
                CborReader::new(data).read_simple(),
                Err(WebAuthnError::UnsupportedItem(_))
            ));
            assert!(matches!(
                CborReader::new(data).skip(),
                Err(WebAuthnError::UnsupportedItem(_))
            ));
        }
    }

    #[test]
    fn test_skip_matches_full_read() {
        // 1000, -100, h'01020304', "IETF", true, 255(simple), 24
        let data = [
            0x19, 0x03, 0xe8, 0x38, 0x63, 0x44, 0x01, 0x02, 0x03, 0x04, 0x64, 0x49, 0x45, 0x54,
            0x46, 0xf5, 0xf8, 0xff, 0x18, 0x18,
        ];
        let start = CborReader::new(&data);

        let after_unsigned = start.read_unsigned().unwrap().1;
        assert_eq!(start.skip().unwrap().offset(), after_unsigned.offset());

        let after_negative = after_unsigned.read_integer().unwrap().1;
        assert_eq!(after_unsigned.skip().unwrap().offset(), after_negative.offset());

        let after_bytes = after_negative.read_byte_string().unwrap().1;
        assert_eq!(after_negative.skip().unwrap().offset(), after_bytes.offset());

        let after_text = after_bytes.read_text_string().unwrap().1;
        assert_eq!(after_bytes.skip().unwrap().offset(), after_text.offset());

        let after_bool = after_text.read_simple().unwrap().1;
        assert_eq!(after_text.skip().unwrap().offset(), after_bool.offset());

        let after_simple = after_bool.read_simple().unwrap().1;
        assert_eq!(after_bool.skip().unwrap().offset(), after_simple.offset());

        let skipped = after_simple.skip().unwrap();
        assert_eq!(after_simple.read_unsigned().unwrap().0, 24);
        assert!(!skipped.can_read());
    }

    #[test]
    fn test_skip_composite_unsupported() {
        for data in [&[0x80][..], &[0xa0][..], &[0xc0, 0x00][..]] {
            assert!(matches!(
                CborReader::new(data).skip(),
                Err(WebAuthnError::UnsupportedItem(_))
            ));
        }
    }

    #[test]
    fn test_sub_range() {
        let data = [0xff, 0x18, 0x64, 0x01];
        let reader = CborReader::with_range(&data, 1, 2).unwrap();
        let (value, next) = reader.read_unsigned().unwrap();
        assert_eq!(value, 100);
        assert!(!next.can_read());
        assert_eq!(reader.consumed_until(&next), &[0x18, 0x64]);

        // the range hides the trailing byte
        let truncated = CborReader::with_range(&data, 1, 1).unwrap();
        assert!(truncated.read_unsigned().is_err());
        assert!(matches!(
            CborReader::with_range(&data, 3, 2),
            Err(WebAuthnError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_reader_is_a_value() {
        let data = [0x01, 0x02];
        let reader = CborReader::new(&data);
        let (first, _) = reader.read_unsigned().unwrap();
        let (again, _) = reader.read_unsigned().unwrap();
        assert_eq!(first, again);
        assert_eq!(reader.offset(), 0);
        assert_eq!(reader.remaining_len(), 2);
    }
}
