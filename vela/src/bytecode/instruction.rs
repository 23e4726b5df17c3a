use core::fmt;

use crate::Op;

/// Bytes per encoded instruction: opcode + 32-bit argument.
pub const INSTRUCTION_SIZE: usize = 5;

/// Index argument of [`Op::ListGet`] / [`Op::ListSet`] meaning "pop the
/// index from the stack" (-1 as an unsigned payload).
pub const POP_INDEX: u32 = u32::MAX;

/// A decoded instruction. The argument is a raw payload, each opcode decides
/// how to read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub op: Op,
    pub arg: u32,
}

impl Instruction {
    pub const fn new(op: Op, arg: u32) -> Self {
        Self { op, arg }
    }

    #[inline]
    pub const fn arg_usize(self) -> usize {
        self.arg as usize
    }

    pub fn encode(self) -> [u8; INSTRUCTION_SIZE] {
        let [a, b, c, d] = self.arg.to_le_bytes();
        [self.op as u8, a, b, c, d]
    }

    /// Decodes one instruction, handing back the raw opcode when it is not
    /// defined.
    pub fn decode(bytes: [u8; INSTRUCTION_SIZE]) -> Result<Self, u8> {
        let op = Op::try_from(bytes[0])?;
        let arg = u32::from_le_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
        Ok(Self { op, arg })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.op.mnemonic();
        match self.op {
            Op::PushFloat => write!(f, "{name} {}", f32::from_bits(self.arg)),
            Op::PushChar => write!(f, "{name} 0x{:08x}", self.arg),
            Op::ListGet | Op::ListSet if self.arg == POP_INDEX => {
                write!(f, "{name} <pop>")
            }
            Op::PushInt => write!(f, "{name} {}", self.arg as i32),
            _ if self.op.binary().is_some() => write!(f, "{name}"),
            Op::EnterScope | Op::ExitScope | Op::Return => write!(f, "{name}"),
            _ => write!(f, "{name} {}", self.arg),
        }
    }
}
