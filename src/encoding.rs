//! Length tags
//!
//! A record's payload length is stored as an unsigned LEB128 varint: seven
//! value bits per byte, low group first, high bit set on every byte but the
//! last. Only the shortest form is accepted, so decoding is the exact
//! inverse of encoding.

use crate::error::{Result, StackError};

/// Longest tag we ever write or accept (enough for a u64)
pub const MAX_TAG_LEN: usize = 10;

const CONTINUATION: u8 = 0x80;
const VALUE_BITS: u8 = 0x7f;

/// A decoded length tag
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tag {
    /// Payload length in bytes
    pub len: usize,
    /// Bytes occupied by the tag itself
    pub size: usize,
}

/// Number of bytes the tag for `len` occupies
pub fn tag_size(len: usize) -> usize {
    let mut value = len as u64;
    let mut size = 1;
    while value >= u64::from(CONTINUATION) {
        value >>= 7;
        size += 1;
    }
    size
}

/// Encode `len` into `out`, returning the number of bytes written
pub fn encode_len(len: usize, out: &mut [u8; MAX_TAG_LEN]) -> usize {
    let mut value = len as u64;
    let mut i = 0;
    loop {
        let byte = (value as u8) & VALUE_BITS;
        value >>= 7;
        if value == 0 {
            out[i] = byte;
            return i + 1;
        }
        out[i] = byte | CONTINUATION;
        i += 1;
    }
}

/// Decode the tag starting at `buf[at]`
///
/// Every failure mode (running off the buffer, overflow, a padded encoding)
/// is reported as `CorruptEncoding` with the offset of the tag.
pub fn decode_len(buf: &[u8], at: usize) -> Result<Tag> {
    let mut value: u64 = 0;

    for i in 0..MAX_TAG_LEN {
        let byte = *buf
            .get(at + i)
            .ok_or_else(|| StackError::corrupt(at, "tag runs past end of buffer"))?;

        // The tenth byte only has room for the top bit of a u64
        if i == MAX_TAG_LEN - 1 && byte > 1 {
            return Err(StackError::corrupt(at, "tag overflows 64 bits"));
        }

        value |= u64::from(byte & VALUE_BITS) << (7 * i);

        if byte & CONTINUATION == 0 {
            if i > 0 && byte == 0 {
                return Err(StackError::corrupt(at, "non-canonical tag"));
            }
            let len = usize::try_from(value)
                .map_err(|_| StackError::corrupt(at, "tag exceeds addressable size"))?;
            return Ok(Tag { len, size: i + 1 });
        }
    }

    Err(StackError::corrupt(at, "tag longer than 10 bytes"))
}
