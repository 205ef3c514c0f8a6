//! Length-tagged byte records on a single downward-growing buffer
//!
//! [`RecordStack`] keeps variable-length records contiguously, each prefixed
//! by a LEB128 length tag, and rearranges them in place: [`RecordStack::swap`]
//! exchanges the top two records without scratch space.

pub mod cli;
pub mod config;
pub mod debug;
pub mod encoding;
pub mod error;
pub mod input;
pub mod ops;
pub mod output;
pub mod record;
pub mod stack;

pub use config::StackConfig;
pub use error::{Result, StackError};
pub use stack::RecordStack;
