use std::io::BufRead;

use crate::error::Result;
use crate::stack::RecordStack;

/// Reads records from input, splitting on the specified delimiter
pub struct RecordReader<R> {
    reader: R,
    delimiter: u8,
    buffer: Vec<u8>,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(reader: R, delimiter: u8) -> Self {
        Self {
            reader,
            delimiter,
            buffer: Vec::new(),
        }
    }

    /// Read the next record, returning None at EOF
    pub fn read_record(&mut self) -> std::io::Result<Option<&[u8]>> {
        self.buffer.clear();
        let bytes_read = self.reader.read_until(self.delimiter, &mut self.buffer)?;

        if bytes_read == 0 {
            return Ok(None);
        }

        // Strip delimiter if present at end
        if self.buffer.last() == Some(&self.delimiter) {
            self.buffer.pop();
        }

        Ok(Some(&self.buffer))
    }
}

/// Push every record from a reader, so the last one read ends up on top
///
/// Returns the number of records pushed. A record that does not fit fails
/// with `CapacityExceeded`; the records pushed before it stay on the stack.
pub fn push_all_records<R: BufRead>(
    reader: R,
    delimiter: u8,
    stack: &mut RecordStack,
) -> Result<usize> {
    let mut rec_reader = RecordReader::new(reader, delimiter);
    let mut pushed = 0;

    while let Some(record) = rec_reader.read_record()? {
        stack.push(record)?;
        pushed += 1;
    }

    Ok(pushed)
}
