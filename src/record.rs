//! Record boundaries within a buffer
//!
//! Records are laid out `tag ‖ payload` in increasing address order. A span
//! is only ever produced by [`RecordSpan::locate`], which checks it against
//! the bound it was located in.

use std::ops::Range;

use crate::encoding::decode_len;
use crate::error::{Result, StackError};

/// Position of one record inside a buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordSpan {
    /// Index of the first tag byte
    pub start: usize,
    /// Tag size in bytes
    pub tag_size: usize,
    /// Payload size in bytes
    pub payload_len: usize,
}

impl RecordSpan {
    /// Decode the record whose tag starts at `at`, requiring it to end at or
    /// before `bound`
    pub fn locate(buf: &[u8], at: usize, bound: usize) -> Result<Self> {
        let tag = decode_len(&buf[..bound.min(buf.len())], at)?;
        let span = RecordSpan {
            start: at,
            tag_size: tag.size,
            payload_len: tag.len,
        };

        match span.checked_end() {
            Some(end) if end <= bound => Ok(span),
            _ => Err(StackError::corrupt(at, "payload extends past end of buffer")),
        }
    }

    /// Tag plus payload
    pub fn total_len(&self) -> usize {
        self.tag_size + self.payload_len
    }

    /// One past the last payload byte
    pub fn end(&self) -> usize {
        self.start + self.total_len()
    }

    pub fn payload(&self) -> Range<usize> {
        self.start + self.tag_size..self.end()
    }

    fn checked_end(&self) -> Option<usize> {
        self.start
            .checked_add(self.tag_size)?
            .checked_add(self.payload_len)
    }
}

/// Walk an image (top record first) and count its records
///
/// Fails unless the records tile `image` exactly.
pub fn count_records(image: &[u8]) -> Result<usize> {
    let mut pos = 0;
    let mut count = 0;
    while pos < image.len() {
        let span = RecordSpan::locate(image, pos, image.len())?;
        pos = span.end();
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_single_record() {
        let buf = b"\x05HELLO";
        let span = RecordSpan::locate(buf, 0, buf.len()).unwrap();
        assert_eq!(span.tag_size, 1);
        assert_eq!(span.payload_len, 5);
        assert_eq!(span.end(), 6);
        assert_eq!(&buf[span.payload()], b"HELLO");
    }

    #[test]
    fn test_locate_empty_payload() {
        let buf = b"\x00";
        let span = RecordSpan::locate(buf, 0, 1).unwrap();
        assert_eq!(span.total_len(), 1);
        assert!(span.payload().is_empty());
    }

    #[test]
    fn test_locate_respects_bound() {
        // Payload would run into bytes outside the bound
        let buf = b"\x03ABCDEF";
        assert!(RecordSpan::locate(buf, 0, 3).is_err());
        assert!(RecordSpan::locate(buf, 0, 4).is_ok());
    }

    #[test]
    fn test_count_records() {
        assert_eq!(count_records(b"").unwrap(), 0);
        assert_eq!(count_records(b"\x02BB\x01A").unwrap(), 2);
        assert_eq!(count_records(b"\x00\x00\x00").unwrap(), 3);
    }

    #[test]
    fn test_count_records_rejects_trailing_garbage() {
        let err = count_records(b"\x01A\x05XY").unwrap_err();
        assert!(matches!(err, StackError::CorruptEncoding { offset: 2, .. }));
    }
}
