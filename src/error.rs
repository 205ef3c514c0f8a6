use thiserror::Error;

#[derive(Error, Debug)]
pub enum StackError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("insufficient elements: need {needed} record(s), stack holds {found}")]
    InsufficientElements { needed: usize, found: usize },

    #[error("capacity exceeded: requested {requested} bytes, {available} bytes available")]
    CapacityExceeded { requested: usize, available: usize },

    #[error("corrupt record encoding at offset {offset}: {reason}")]
    CorruptEncoding { offset: usize, reason: &'static str },

    #[error("invalid range: cannot drop {count} record(s) ending at depth {skip}")]
    InvalidRange { skip: usize, count: usize },

    #[error("invalid capacity: {0}")]
    InvalidCapacity(String),

    #[error("invalid operation: {0}")]
    InvalidOp(String),
}

impl StackError {
    /// Nonzero status code for callers that speak in integer statuses
    pub fn status(&self) -> i32 {
        match self {
            StackError::InsufficientElements { .. } => 2,
            StackError::CapacityExceeded { .. } => 3,
            StackError::CorruptEncoding { .. } => 4,
            _ => 1,
        }
    }

    pub(crate) fn corrupt(offset: usize, reason: &'static str) -> Self {
        StackError::CorruptEncoding { offset, reason }
    }
}

pub type Result<T> = std::result::Result<T, StackError>;
