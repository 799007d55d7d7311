//! Big-endian fixed-width readers over borrowed byte buffers
//!
//! All readers are bounds checked and report truncation as
//! [`WebAuthnError::MalformedItem`].

use crate::errors::{Result, WebAuthnError};

/// Borrow `len` bytes starting at `offset`
///
/// # Errors
/// Returns `MalformedItem` if the range extends past the end of `buffer`
pub fn read_slice(buffer: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| buffer.get(offset..end))
        .ok_or_else(|| {
            WebAuthnError::malformed(format!(
                "need {len} bytes at offset {offset}, buffer holds {}",
                buffer.len()
            ))
        })
}

/// Read a fixed-size array starting at `offset`
///
/// # Errors
/// Returns `MalformedItem` if the buffer is too short
pub fn read_array<const N: usize>(buffer: &[u8], offset: usize) -> Result<[u8; N]> {
    let slice = read_slice(buffer, offset, N)?;
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    Ok(out)
}

/// # Errors
/// Returns `MalformedItem` if `offset` is out of bounds
pub fn read_u8(buffer: &[u8], offset: usize) -> Result<u8> {
    Ok(read_array::<1>(buffer, offset)?[0])
}

/// # Errors
/// Returns `MalformedItem` if fewer than 2 bytes remain at `offset`
pub fn read_u16_be(buffer: &[u8], offset: usize) -> Result<u16> {
    read_array(buffer, offset).map(u16::from_be_bytes)
}

/// # Errors
/// Returns `MalformedItem` if fewer than 4 bytes remain at `offset`
pub fn read_u32_be(buffer: &[u8], offset: usize) -> Result<u32> {
    read_array(buffer, offset).map(u32::from_be_bytes)
}

/// # Errors
/// Returns `MalformedItem` if fewer than 8 bytes remain at `offset`
pub fn read_u64_be(buffer: &[u8], offset: usize) -> Result<u64> {
    read_array(buffer, offset).map(u64::from_be_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_readers() {
        let buf = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09];
        assert_eq!(read_u8(&buf, 8).unwrap(), 0x09);
        assert_eq!(read_u16_be(&buf, 0).unwrap(), 0x0102);
        assert_eq!(read_u32_be(&buf, 1).unwrap(), 0x0203_0405);
        assert_eq!(read_u64_be(&buf, 1).unwrap(), 0x0203_0405_0607_0809);
    }

    #[test]
    fn test_truncated_reads_fail() {
        let buf = [0xaa, 0xbb, 0xcc];
        assert!(matches!(read_u32_be(&buf, 0), Err(WebAuthnError::MalformedItem(_))));
        assert!(matches!(read_u16_be(&buf, 2), Err(WebAuthnError::MalformedItem(_))));
        assert!(matches!(read_u8(&buf, 3), Err(WebAuthnError::MalformedItem(_))));
        assert!(read_slice(&buf, usize::MAX, 2).is_err());
    }

    #[test]
    fn test_read_slice_borrows_range() {
        let buf = [1, 2, 3, 4, 5];
        assert_eq!(read_slice(&buf, 1, 3).unwrap(), &[2, 3, 4]);
        assert_eq!(read_slice(&buf, 5, 0).unwrap(), &[] as &[u8]);
    }
}
