//! Length-tagged record stack
//!
//! One owned byte buffer that fills from the top of its allocation downward.
//! `head` indexes the tag of the most recently pushed record; the stack is
//! empty when `head == buf.len()`.
//!
//! ```text
//!  buf: [ free ............ | tag A' payload A' | tag B payload B ... ]
//!                           ^ head (top record)                       ^ buf.len()
//! ```
//!
//! Every mutating operation validates before it touches the buffer, so a
//! failed call leaves the stack exactly as it was.

use std::collections::TryReserveError;

use tracing::{debug, trace, warn};

use crate::config::StackConfig;
use crate::encoding::{MAX_TAG_LEN, encode_len, tag_size};
use crate::error::{Result, StackError};
use crate::record::{RecordSpan, count_records};

/// Smallest reallocation when a growable stack runs out of room
const MIN_GROWTH: usize = 64;

#[derive(Clone, Debug)]
pub struct RecordStack {
    buf: Vec<u8>,
    head: usize,
    count: usize,
    max_capacity: usize,
}

impl RecordStack {
    /// Empty stack with a fixed hard capacity of `capacity` bytes
    ///
    /// Fails with `InvalidCapacity` if the buffer cannot be allocated.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self {
            buf: zeroed(capacity).map_err(|e| unallocatable(capacity, e))?,
            head: capacity,
            count: 0,
            max_capacity: capacity,
        })
    }

    /// Empty stack allocating `initial_capacity` up front and growing on
    /// demand up to `max_capacity`
    pub fn new(config: StackConfig) -> Result<Self> {
        config.validate()?;
        let mut stack = Self::with_capacity(config.initial_capacity)?;
        stack.max_capacity = config.max_capacity;
        Ok(stack)
    }

    /// Rebuild a stack from the bytes returned by [`as_bytes`](Self::as_bytes)
    pub fn from_image(image: &[u8], config: StackConfig) -> Result<Self> {
        config.validate()?;
        if image.len() > config.max_capacity {
            return Err(StackError::CapacityExceeded {
                requested: image.len(),
                available: config.max_capacity,
            });
        }
        let count = count_records(image)?;

        let allocated = config.initial_capacity.max(image.len());
        let mut buf = zeroed(allocated).map_err(|e| unallocatable(allocated, e))?;
        let head = allocated - image.len();
        buf[head..].copy_from_slice(image);
        debug!(records = count, bytes = image.len(), "loaded stack image");

        Ok(Self {
            buf,
            head,
            count,
            max_capacity: config.max_capacity,
        })
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Hard capacity in bytes
    pub fn capacity(&self) -> usize {
        self.max_capacity
    }

    /// Bytes currently allocated for the buffer
    pub fn allocated(&self) -> usize {
        self.buf.len()
    }

    /// Bytes used by all records, tags included
    pub fn occupied(&self) -> usize {
        self.buf.len() - self.head
    }

    pub fn room_left(&self) -> usize {
        self.max_capacity - self.occupied()
    }

    /// Offset of the top record's tag within the allocation
    pub fn head(&self) -> usize {
        self.head
    }

    /// Occupied region, top record first
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[self.head..]
    }

    /// Append one record
    pub fn push(&mut self, payload: &[u8]) -> Result<()> {
        let mut tag = [0u8; MAX_TAG_LEN];
        let tag_len = encode_len(payload.len(), &mut tag);
        let total = record_size(payload.len())?;

        self.reserve(total)?;
        self.write_record(&tag[..tag_len], payload);
        trace!(len = payload.len(), head = self.head, "push");
        Ok(())
    }

    /// Append several records, the first deepest and the last on top
    ///
    /// Either every record is pushed or none is.
    pub fn push_many<P: AsRef<[u8]>>(&mut self, payloads: &[P]) -> Result<()> {
        let total = payloads.iter().try_fold(0usize, |acc, p| {
            acc.checked_add(record_size(p.as_ref().len())?)
                .ok_or_else(overflow)
        })?;

        self.reserve(total)?;
        let mut tag = [0u8; MAX_TAG_LEN];
        for payload in payloads {
            let payload = payload.as_ref();
            let tag_len = encode_len(payload.len(), &mut tag);
            self.write_record(&tag[..tag_len], payload);
        }
        Ok(())
    }

    /// Append already-encoded records
    ///
    /// `raw` is laid out the way [`as_bytes`](Self::as_bytes) returns it: the
    /// record that ends up on top comes first. The whole image is validated
    /// before anything is written.
    pub fn push_raw(&mut self, raw: &[u8]) -> Result<()> {
        let added = count_records(raw)?;
        self.reserve(raw.len())?;

        let start = self.head - raw.len();
        self.buf[start..self.head].copy_from_slice(raw);
        self.head = start;
        self.count += added;
        Ok(())
    }

    /// Remove the top record and return its payload
    pub fn pop(&mut self) -> Result<Vec<u8>> {
        self.require(1)?;
        let top = self.span_at(self.head)?;
        let payload = self.buf[top.payload()].to_vec();
        self.head = top.end();
        self.count -= 1;
        Ok(payload)
    }

    /// Remove the top `n` records, returned top first
    pub fn pop_many(&mut self, n: usize) -> Result<Vec<Vec<u8>>> {
        let spans = self.top_spans(n)?;
        let payloads: Vec<Vec<u8>> = spans
            .iter()
            .map(|span| self.buf[span.payload()].to_vec())
            .collect();
        self.discard(&spans);
        Ok(payloads)
    }

    /// Discard the top `n` records
    pub fn drop_top(&mut self, n: usize) -> Result<()> {
        let spans = self.top_spans(n)?;
        self.discard(&spans);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.head = self.buf.len();
        self.count = 0;
    }

    /// Borrow the top payload
    pub fn peek(&self) -> Result<&[u8]> {
        self.get(0)
    }

    /// Borrow the payload `depth` records below the top
    pub fn get(&self, depth: usize) -> Result<&[u8]> {
        let spans = self.top_spans(depth.saturating_add(1))?;
        Ok(&self.buf[spans[depth].payload()])
    }

    /// Borrow the top `n` payloads, top first
    pub fn peek_many(&self, n: usize) -> Result<Vec<&[u8]>> {
        let spans = self.top_spans(n)?;
        Ok(spans.iter().map(|span| &self.buf[span.payload()]).collect())
    }

    /// Exchange the top two records in place
    ///
    /// Occupancy, record count and everything below the second record are
    /// unchanged. Needs no room beyond the current occupancy, so a full
    /// stack can always be swapped.
    pub fn swap(&mut self) -> Result<()> {
        self.require(2)?;
        let first = self.span_at(self.head)?;
        let second = self.span_at(first.end())?;

        // [first | second] -> [second | first]
        self.buf[first.start..second.end()].rotate_left(first.total_len());

        trace!(
            first_len = first.payload_len,
            second_len = second.payload_len,
            "swap"
        );
        Ok(())
    }

    /// Discard `count` records ending at depth `skip` and extending toward
    /// the top, i.e. depths `skip + 1 - count ..= skip`
    ///
    /// Records above the removed run shift down to close the gap. The top
    /// record itself can never be removed this way, so `count <= skip`.
    pub fn drop_inside(&mut self, skip: usize, count: usize) -> Result<()> {
        if skip == 0 || count == 0 {
            return Ok(());
        }
        self.require(skip.saturating_add(1))?;
        if count > skip {
            return Err(StackError::InvalidRange { skip, count });
        }

        let spans = self.top_spans(skip + 1)?;
        let first_removed = spans[skip + 1 - count];
        let gap_start = first_removed.start;
        let gap_end = spans[skip].end();
        let removed = gap_end - gap_start;

        // Overlap-safe: the kept top records move toward the bottom
        self.buf.copy_within(self.head..gap_start, self.head + removed);
        self.head += removed;
        self.count -= count;
        Ok(())
    }

    /// Payloads from top to bottom
    pub fn iter(&self) -> Records<'_> {
        Records {
            buf: &self.buf,
            pos: self.head,
            remaining: self.count,
        }
    }

    /// Walk every record and check that the cached count and occupancy
    /// agree with the buffer contents
    pub fn verify(&self) -> Result<()> {
        let counted = count_records(self.as_bytes()).map_err(|e| match e {
            StackError::CorruptEncoding { offset, reason } => StackError::CorruptEncoding {
                offset: offset + self.head,
                reason,
            },
            other => other,
        })?;
        if counted != self.count {
            return Err(StackError::corrupt(self.head, "record count mismatch"));
        }
        if self.buf.len() > self.max_capacity {
            return Err(StackError::corrupt(self.head, "allocation exceeds capacity"));
        }
        Ok(())
    }

    fn require(&self, needed: usize) -> Result<()> {
        if self.count < needed {
            return Err(StackError::InsufficientElements {
                needed,
                found: self.count,
            });
        }
        Ok(())
    }

    fn span_at(&self, at: usize) -> Result<RecordSpan> {
        RecordSpan::locate(&self.buf, at, self.buf.len())
    }

    /// Spans of the top `n` records, top first
    fn top_spans(&self, n: usize) -> Result<Vec<RecordSpan>> {
        self.require(n)?;
        let mut spans = Vec::with_capacity(n);
        let mut pos = self.head;
        for _ in 0..n {
            let span = self.span_at(pos)?;
            pos = span.end();
            spans.push(span);
        }
        Ok(spans)
    }

    /// Forget the given spans, which must be the top records in order
    fn discard(&mut self, spans: &[RecordSpan]) {
        if let Some(last) = spans.last() {
            self.head = last.end();
            self.count -= spans.len();
        }
    }

    /// Make sure `additional` bytes fit below `head`, growing if allowed
    fn reserve(&mut self, additional: usize) -> Result<()> {
        if additional <= self.head {
            return Ok(());
        }

        let occupied = self.occupied();
        let required = occupied
            .checked_add(additional)
            .filter(|&r| r <= self.max_capacity)
            .ok_or_else(|| StackError::CapacityExceeded {
                requested: additional,
                available: self.room_left(),
            })?;

        let allocated = required
            .max(self.buf.len().saturating_mul(2))
            .max(MIN_GROWTH)
            .min(self.max_capacity);

        let mut grown = zeroed(allocated).map_err(|_| StackError::CapacityExceeded {
            requested: additional,
            available: self.room_left(),
        })?;
        let head = allocated - occupied;
        grown[head..].copy_from_slice(&self.buf[self.head..]);
        debug!(from = self.buf.len(), to = allocated, occupied, "grew stack buffer");

        self.buf = grown;
        self.head = head;
        Ok(())
    }

    /// Write one record directly below `head`; room must already be reserved
    fn write_record(&mut self, tag: &[u8], payload: &[u8]) {
        let start = self.head - tag.len() - payload.len();
        let payload_start = start + tag.len();
        self.buf[start..payload_start].copy_from_slice(tag);
        self.buf[payload_start..self.head].copy_from_slice(payload);
        self.head = start;
        self.count += 1;
    }
}

/// Zero-filled buffer of `len` bytes, reporting allocation failure instead
/// of aborting
fn zeroed(len: usize) -> std::result::Result<Vec<u8>, TryReserveError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)?;
    buf.resize(len, 0);
    Ok(buf)
}

fn unallocatable(len: usize, err: TryReserveError) -> StackError {
    StackError::InvalidCapacity(format!("cannot allocate {} bytes: {}", len, err))
}

/// Bytes a record with a `len`-byte payload occupies
fn record_size(len: usize) -> Result<usize> {
    len.checked_add(tag_size(len)).ok_or_else(overflow)
}

fn overflow() -> StackError {
    StackError::CapacityExceeded {
        requested: usize::MAX,
        available: 0,
    }
}

/// Iterator over payloads, top to bottom
pub struct Records<'a> {
    buf: &'a [u8],
    pos: usize,
    remaining: usize,
}

impl<'a> Iterator for Records<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        if self.remaining == 0 {
            return None;
        }
        match RecordSpan::locate(self.buf, self.pos, self.buf.len()) {
            Ok(span) => {
                self.pos = span.end();
                self.remaining -= 1;
                Some(&self.buf[span.payload()])
            }
            Err(e) => {
                warn!(error = %e, "stopping record iteration");
                self.remaining = 0;
                None
            }
        }
    }

    // Lower bound stays 0: a record that fails to decode ends iteration early
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl<'a> IntoIterator for &'a RecordStack {
    type Item = &'a [u8];
    type IntoIter = Records<'a>;

    fn into_iter(self) -> Records<'a> {
        self.iter()
    }
}
