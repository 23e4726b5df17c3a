use std::{fs, io, path::Path};

use crate::{ExecutionError, INSTRUCTION_SIZE, Instruction};

/// A loaded program image: the instruction sequence the interpreter runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Decodes a flat image of 5-byte instructions. A trailing partial
    /// instruction is ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ExecutionError> {
        let instructions = bytes
            .chunks_exact(INSTRUCTION_SIZE)
            .enumerate()
            .map(|(index, chunk)| {
                let mut raw = [0u8; INSTRUCTION_SIZE];
                raw.copy_from_slice(chunk);
                Instruction::decode(raw)
                    .map_err(|opcode| ExecutionError::InvalidOpcode { opcode, index })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { instructions })
    }

    /// Reads and decodes the program file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ExecutionError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|err| {
            let path = path.display().to_string();
            match err.kind() {
                io::ErrorKind::NotFound => ExecutionError::FileNotFound { path },
                io::ErrorKind::PermissionDenied => {
                    ExecutionError::FilePermission { path }
                }
                _ => ExecutionError::UndefinedError {
                    reason: "failed to read program file",
                },
            }
        })?;
        log::info!(
            "loaded {} instructions from {}",
            bytes.len() / INSTRUCTION_SIZE,
            path.display()
        );
        Self::from_bytes(&bytes)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.instructions
            .iter()
            .flat_map(|instruction| instruction.encode())
            .collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Instruction> {
        self.instructions.get(index).copied()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }
}
