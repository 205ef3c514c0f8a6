use std::io::{self, Write};

use bstr::ByteSlice;

use crate::record::RecordSpan;
use crate::stack::RecordStack;

/// Dump the buffer layout of a stack, one line per record, top first
///
/// Format:
/// - a summary line with record count, occupancy and allocation
/// - `@OFFSET tag HEX len N "payload"` for each record, OFFSET being the
///   position of the tag within the allocation
pub fn debug_stack<W: Write>(writer: &mut W, stack: &RecordStack) -> io::Result<()> {
    writeln!(
        writer,
        "stack: {} record(s), {}/{} bytes occupied, {} allocated",
        stack.len(),
        stack.occupied(),
        stack.capacity(),
        stack.allocated()
    )?;

    let image = stack.as_bytes();
    let mut pos = 0;
    while pos < image.len() {
        match RecordSpan::locate(image, pos, image.len()) {
            Ok(span) => {
                debug_record(writer, image, &span, stack.head())?;
                pos = span.end();
            }
            Err(e) => {
                writeln!(writer, "@{} ^ {}", stack.head() + pos, e)?;
                break;
            }
        }
    }

    Ok(())
}

fn debug_record<W: Write>(
    writer: &mut W,
    image: &[u8],
    span: &RecordSpan,
    base: usize,
) -> io::Result<()> {
    let tag: Vec<String> = image[span.start..span.start + span.tag_size]
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect();
    let payload = image[span.payload()].as_bstr();

    writeln!(
        writer,
        "@{} tag {} len {} {:?}",
        base + span.start,
        tag.join(" "),
        span.payload_len,
        payload
    )
}
