use crate::cli::Args;
use crate::error::{Result, StackError};
use crate::ops::Op;

/// Default allocation for a new stack, in bytes
pub const DEFAULT_CAPACITY: usize = 4096;

/// Buffer sizing for a [`RecordStack`](crate::stack::RecordStack)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StackConfig {
    /// Bytes allocated when the stack is created
    pub initial_capacity: usize,
    /// Occupancy the stack may never exceed
    pub max_capacity: usize,
}

impl StackConfig {
    /// A buffer that never reallocates
    pub fn fixed(capacity: usize) -> Self {
        Self {
            initial_capacity: capacity,
            max_capacity: capacity,
        }
    }

    /// A buffer that starts at `initial` bytes and may grow to `max`
    pub fn growable(initial: usize, max: usize) -> Self {
        Self {
            initial_capacity: initial,
            max_capacity: max,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity > self.max_capacity {
            return Err(StackError::InvalidCapacity(format!(
                "initial capacity {} is larger than maximum {}",
                self.initial_capacity, self.max_capacity
            )));
        }
        Ok(())
    }
}

impl Default for StackConfig {
    fn default() -> Self {
        Self::fixed(DEFAULT_CAPACITY)
    }
}

/// Runtime configuration derived from CLI arguments
#[derive(Clone, Debug)]
pub struct Config {
    pub stack: StackConfig,
    pub ops: Vec<Op>,
    pub reverse: bool,
    pub debug: bool,
    pub record_delimiter: u8,
    pub output_file: Option<String>,
    pub input_files: Vec<String>,
}

impl Config {
    /// Build configuration from parsed CLI arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        let ops: Result<Vec<Op>> = args.ops.iter().map(|s| Op::parse(s)).collect();

        let stack = StackConfig::growable(
            args.capacity,
            args.max_capacity.unwrap_or(args.capacity),
        );
        stack.validate()?;

        Ok(Config {
            stack,
            ops: ops?,
            reverse: args.reverse,
            debug: args.debug,
            record_delimiter: args.record_delimiter(),
            output_file: args.output.clone(),
            input_files: args.files.clone(),
        })
    }
}
