use std::fmt;

use crate::Kind;

/// Every condition that stops the interpreter.
///
/// The interpreter itself never exits the process, the binary decides what
/// to do with an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    FileNotFound { path: String },
    FilePermission { path: String },
    RecursionLimitExceeded { limit: usize },
    MemoryAccessOutOfBounds { address: usize, size: usize },
    EmptyStackAccess,
    StackOverflow { limit: usize },
    BadType { expected: Kind, got: Kind },
    IndexOutOfBounds { index: i64, len: usize },
    DivisionByZero,
    UnsupportedSerialization { kind: Kind },
    InvalidOpcode { opcode: u8, index: usize },
    UndefinedError { reason: &'static str },
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileNotFound { path } => {
                write!(f, "File not found: {path}")
            }
            Self::FilePermission { path } => {
                write!(
                    f,
                    "Failed to open file, please check permissions: {path}"
                )
            }
            Self::RecursionLimitExceeded { limit } => {
                write!(f, "Maximum recursion depth exceeded ({limit})")
            }
            Self::MemoryAccessOutOfBounds { address, size } => {
                write!(
                    f,
                    "Memory access out of bounds ({size} bytes at {address})"
                )
            }
            Self::EmptyStackAccess => {
                write!(f, "Attempted to access an empty stack")
            }
            Self::StackOverflow { limit } => {
                write!(f, "Operand stack overflow ({limit} slots)")
            }
            Self::BadType { expected, got } => write!(
                f,
                "Tried to store incorrect type, casting not possible \
                 (expected {}, got {})",
                expected.name(),
                got.name()
            ),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "Index out of bounds ({index} not in 0..{len})")
            }
            Self::DivisionByZero => write!(f, "Integer division by zero"),
            Self::UnsupportedSerialization { kind } => write!(
                f,
                "Attempted to write a complex structure in an unsupported \
                 format ({})",
                kind.name()
            ),
            Self::InvalidOpcode { opcode, index } => {
                write!(f, "Invalid opcode 0x{opcode:02X} at instruction {index}")
            }
            Self::UndefinedError { reason } => {
                write!(f, "Undefined error: {reason}")
            }
        }
    }
}

impl std::error::Error for ExecutionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_lead_with_the_error_kind() {
        assert_eq!(
            ExecutionError::EmptyStackAccess.to_string(),
            "Attempted to access an empty stack"
        );
        assert_eq!(
            ExecutionError::IndexOutOfBounds { index: 3, len: 3 }.to_string(),
            "Index out of bounds (3 not in 0..3)"
        );
        assert_eq!(
            ExecutionError::InvalidOpcode { opcode: 0x42, index: 7 }.to_string(),
            "Invalid opcode 0x42 at instruction 7"
        );
    }
}
