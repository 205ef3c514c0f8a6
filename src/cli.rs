use clap::Parser;

use crate::config::DEFAULT_CAPACITY;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "recstack",
    about = "Push delimited records onto a length-tagged stack and rearrange them"
)]
pub struct Args {
    /// Bytes to allocate for the stack buffer
    #[arg(short = 'c', long, value_name = "BYTES", default_value_t = DEFAULT_CAPACITY)]
    pub capacity: usize,

    /// Let the buffer grow up to BYTES (defaults to --capacity)
    #[arg(short = 'm', long = "max-capacity", value_name = "BYTES")]
    pub max_capacity: Option<usize>,

    /// Apply OP after loading input (swap, pop, pop:N, drop:SKIP,COUNT, push:TEXT, clear)
    #[arg(short = 'e', long = "exec", value_name = "OP")]
    pub ops: Vec<String>,

    /// Write records bottom to top instead of top to bottom
    #[arg(short = 'r', long)]
    pub reverse: bool,

    /// Use NUL as record delimiter
    #[arg(short = 'z', long = "zero-terminated")]
    pub zero_terminated: bool,

    /// Write result to FILE instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<String>,

    /// Dump the buffer layout to stderr
    #[arg(long)]
    pub debug: bool,

    /// Input files
    #[arg(value_name = "FILE")]
    pub files: Vec<String>,
}

impl Args {
    /// Get the record delimiter (newline or NUL)
    pub fn record_delimiter(&self) -> u8 {
        if self.zero_terminated {
            0u8
        } else {
            b'\n'
        }
    }
}
