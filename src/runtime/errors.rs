//! Runtime errors.

use std::fmt;

use starkbench_core::Felt;
use thiserror::Error;

use super::memory::MemoryError;

/// What went wrong inside the VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionErrorKind {
    AssertEq,
    DivisionByZero,
    Memory,
    AssertNotZero,
    AssertNotEqual,
    RangeCheck,
    /// An operand had the wrong shape, e.g. a felt where a pointer was expected.
    InvalidOperand,
    StepLimit,
    CallDepth,
    ContractNotFound,
    EntryPointNotFound,
    /// The bytecode itself is inconsistent (bad jump target, stack underflow).
    InvalidProgram,
}

/// A failed transaction.
///
/// `error_attrs` holds the `with_attr error_message(...)` texts that were in scope at the failure, outermost first.
/// `trace` holds one `file:line:column` entry per active frame when the program has debug info, innermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionError {
    pub kind: ExecutionErrorKind,
    pub message: String,
    pub error_attrs: Vec<String>,
    pub trace: Vec<String>,
}

impl ExecutionError {
    pub fn new(kind: ExecutionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            error_attrs: Vec::new(),
            trace: Vec::new(),
        }
    }

    /// Innermost `with_attr` message, the one users see first.
    pub fn error_message(&self) -> Option<&str> {
        self.error_attrs.last().map(String::as_str)
    }
}

impl From<MemoryError> for ExecutionError {
    fn from(err: MemoryError) -> Self {
        let kind = match err {
            MemoryError::InconsistentWrite { .. } => ExecutionErrorKind::AssertEq,
            _ => ExecutionErrorKind::Memory,
        };
        ExecutionError::new(kind, err.to_string())
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for attr in self.error_attrs.iter().rev() {
            writeln!(f, "Error message: {attr}")?;
        }
        write!(f, "{}", self.message)?;
        for location in &self.trace {
            write!(f, "\n  at {location}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ExecutionError {}

/// Errors from the runtime API.
#[derive(Debug, Error)]
pub enum StarknetError {
    #[error("No contract is deployed at address {0:#x}")]
    ContractNotFound(Felt),

    #[error("Entry point {selector:#x} not found in contract {contract:#x}")]
    EntryPointNotFound { contract: Felt, selector: Felt },

    #[error("Contract has no function named '{name}'")]
    UnknownFunction { name: String },

    #[error("Invalid arguments for '{function}': {reason}")]
    InvalidArguments { function: String, reason: String },

    #[error("A contract is already deployed at address {0:#x}")]
    AddressOccupied(Felt),

    #[error("Failed to serialize contract definition: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transaction failed: {0}")]
    Execution(#[from] ExecutionError),
}

impl StarknetError {
    /// The VM error behind a failed transaction, if that is what this is.
    pub fn execution(&self) -> Option<&ExecutionError> {
        match self {
            StarknetError::Execution(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_attrs_and_trace() {
        let mut err = ExecutionError::new(ExecutionErrorKind::AssertNotZero, "assert_not_zero failed: value is zero");
        err.error_attrs = vec!["outer".to_string(), "inner".to_string()];
        err.trace = vec!["contracts/a.cairo:4:9".to_string()];
        assert_eq!(
            err.to_string(),
            "Error message: inner\nError message: outer\nassert_not_zero failed: value is zero\n  at contracts/a.cairo:4:9"
        );
        assert_eq!(err.error_message(), Some("inner"));
    }

    #[test]
    fn test_memory_error_conversion() {
        let err: ExecutionError = MemoryError::UnknownSegment(3).into();
        assert_eq!(err.kind, ExecutionErrorKind::Memory);
    }
}
