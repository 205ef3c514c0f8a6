use std::fs::File;
use std::io::{self, BufWriter, Write};

use crate::config::Config;
use crate::error::Result;
use crate::stack::RecordStack;

/// Write stack records to output, top to bottom unless `config.reverse`
///
/// The stack is verified first, so a damaged buffer is reported instead of
/// being written out truncated.
pub fn write_records<W: Write>(
    writer: W,
    stack: &RecordStack,
    config: &Config,
) -> Result<()> {
    stack.verify()?;
    let mut writer = BufWriter::new(writer);
    let delimiter = config.record_delimiter;

    if config.reverse {
        let records: Vec<&[u8]> = stack.iter().collect();
        write_all(&mut writer, records.into_iter().rev(), delimiter)?;
    } else {
        write_all(&mut writer, stack.iter(), delimiter)?;
    }

    writer.flush()?;
    Ok(())
}

fn write_all<'a, W: Write>(
    writer: &mut W,
    records: impl Iterator<Item = &'a [u8]>,
    delimiter: u8,
) -> io::Result<()> {
    for record in records {
        writer.write_all(record)?;
        writer.write_all(&[delimiter])?;
    }
    Ok(())
}

/// Open output file or return stdout
pub fn open_output(config: &Config) -> io::Result<Box<dyn Write>> {
    match &config.output_file {
        Some(path) => {
            let file = File::create(path)?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdout())),
    }
}
