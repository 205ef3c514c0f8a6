use tracing::debug;

use crate::error::{Result, StackError};
use crate::stack::RecordStack;

/// A stack operation given with -e
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    /// Exchange the top two records
    Swap,
    /// Discard the top N records
    Pop(usize),
    /// Discard COUNT records ending at depth SKIP
    Drop { skip: usize, count: usize },
    /// Push a literal record
    Push(Vec<u8>),
    /// Discard everything
    Clear,
}

impl Op {
    /// Parse an operation like "swap", "pop:2", "drop:3,2", "push:text"
    ///
    /// Format: NAME[:ARG]
    pub fn parse(s: &str) -> Result<Self> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };

        match (name, arg) {
            ("swap", None) => Ok(Op::Swap),
            ("clear", None) => Ok(Op::Clear),
            ("pop", None) => Ok(Op::Pop(1)),
            ("pop", Some(n)) => Ok(Op::Pop(parse_count(n)?)),
            ("drop", Some(range)) => {
                let (skip, count) = range
                    .split_once(',')
                    .ok_or_else(|| StackError::InvalidOp(format!("expected SKIP,COUNT: {}", range)))?;
                Ok(Op::Drop {
                    skip: parse_count(skip)?,
                    count: parse_count(count)?,
                })
            }
            ("push", Some(text)) => Ok(Op::Push(text.as_bytes().to_vec())),
            _ => Err(StackError::InvalidOp(s.to_string())),
        }
    }

    /// Run the operation against a stack
    pub fn apply(&self, stack: &mut RecordStack) -> Result<()> {
        debug!(op = ?self, records = stack.len(), "apply");
        match self {
            Op::Swap => stack.swap(),
            Op::Pop(n) => stack.drop_top(*n),
            Op::Drop { skip, count } => stack.drop_inside(*skip, *count),
            Op::Push(payload) => stack.push(payload),
            Op::Clear => {
                stack.clear();
                Ok(())
            }
        }
    }
}

fn parse_count(s: &str) -> Result<usize> {
    s.parse()
        .map_err(|_| StackError::InvalidOp(format!("invalid count: {}", s)))
}

/// Apply operations in order, stopping at the first failure
pub fn apply_all(ops: &[Op], stack: &mut RecordStack) -> Result<()> {
    for op in ops {
        op.apply(stack)?;
    }
    Ok(())
}
