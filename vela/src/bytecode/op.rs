use crate::BinaryOp;

/// Bytecode opcodes.
///
/// Every instruction is one opcode byte followed by a 32-bit little endian
/// argument. Opcodes below [`Op::PushInt`] are dyadic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Op {
    Add = 0x01,
    Sub = 0x02,
    Mul = 0x03,
    Div = 0x04,
    Mod = 0x05,
    And = 0x06,
    Or = 0x07,
    /// Unary: only the left operand is popped.
    Not = 0x08,
    Eq = 0x09,
    Neq = 0x0A,
    Lt = 0x0B,
    Gt = 0x0C,
    Le = 0x0D,
    Ge = 0x0E,

    /// Push the argument as an `Int`.
    PushInt = 0x0F,
    /// Push the argument as a `Float` bit pattern.
    PushFloat = 0x10,
    /// Pop a value into global slot `arg`.
    StoreGlobal = 0x11,
    /// Push global slot `arg`.
    LoadGlobal = 0x12,
    /// Jump to instruction index `arg`.
    Jump = 0x13,
    /// Pop a value, jump to `arg` if it is truthy.
    JumpIf = 0x14,
    /// Open a lexical scope with fresh locals.
    EnterScope = 0x15,
    /// Close the innermost scope.
    ExitScope = 0x16,
    /// Call the function starting at instruction `arg`.
    Call = 0x17,
    /// Pop a value into local slot `arg`.
    StoreLocal = 0x18,
    /// Push local slot `arg`.
    LoadLocal = 0x19,
    /// Return from the innermost call.
    Return = 0x1A,
    /// Build a list from `arg` popped values.
    BuildList = 0x1B,
    /// Push `array[index]`. Index is `arg`, or popped when `arg` is -1.
    ListGet = 0x1C,
    /// Pop a value into `array[index]`. Index as for [`Op::ListGet`].
    ListSet = 0x1D,
    /// Build a string from `arg` popped chars.
    BuildStr = 0x1E,
    /// Push the argument as a `Char`.
    PushChar = 0x1F,
    /// Register an object type with `arg` popped field kinds.
    DefineType = 0x20,
    /// Allocate an object of type `arg` from popped field values.
    New = 0x21,
    /// Pop an object and a value, store the value into field `arg`.
    StoreHeap = 0x22,
    /// Pop an object, push its field `arg`.
    LoadHeap = 0x23,

    /// Call built-in method `arg` on a popped array.
    ObjCall = 0xFE,
    /// Call host service `arg`.
    Syscall = 0xFF,
}

impl Op {
    /// Operator for the dyadic opcodes, `None` for everything else.
    pub const fn binary(self) -> Option<BinaryOp> {
        Some(match self {
            Op::Add => BinaryOp::Add,
            Op::Sub => BinaryOp::Sub,
            Op::Mul => BinaryOp::Mul,
            Op::Div => BinaryOp::Div,
            Op::Mod => BinaryOp::Mod,
            Op::And => BinaryOp::And,
            Op::Or => BinaryOp::Or,
            Op::Not => BinaryOp::Not,
            Op::Eq => BinaryOp::Eq,
            Op::Neq => BinaryOp::Neq,
            Op::Lt => BinaryOp::Lt,
            Op::Gt => BinaryOp::Gt,
            Op::Le => BinaryOp::Le,
            Op::Ge => BinaryOp::Ge,
            _ => return None,
        })
    }

    pub const fn mnemonic(self) -> &'static str {
        match self {
            Op::Add => "ADD",
            Op::Sub => "SUB",
            Op::Mul => "MUL",
            Op::Div => "DIV",
            Op::Mod => "MOD",
            Op::And => "AND",
            Op::Or => "OR",
            Op::Not => "NOT",
            Op::Eq => "EQ",
            Op::Neq => "NEQ",
            Op::Lt => "LT",
            Op::Gt => "GT",
            Op::Le => "LE",
            Op::Ge => "GE",
            Op::PushInt => "STORE",
            Op::PushFloat => "STORE_FLOAT",
            Op::StoreGlobal => "STORE_MEM",
            Op::LoadGlobal => "LOAD",
            Op::Jump => "JUMP",
            Op::JumpIf => "JUMP_IF",
            Op::EnterScope => "CREATE_SCOPE",
            Op::ExitScope => "DEL_SCOPE",
            Op::Call => "CALL",
            Op::StoreLocal => "STORE_LOCAL",
            Op::LoadLocal => "LOAD_LOCAL",
            Op::Return => "RETURN",
            Op::BuildList => "BUILD_LIST",
            Op::ListGet => "LIST_ACCESS",
            Op::ListSet => "LIST_SET",
            Op::BuildStr => "BUILD_STR",
            Op::PushChar => "STORE_CHAR",
            Op::DefineType => "DEFINE_TYPE",
            Op::New => "NEW",
            Op::StoreHeap => "STORE_HEAP",
            Op::LoadHeap => "LOAD_HEAP",
            Op::ObjCall => "OBJCALL",
            Op::Syscall => "SYSCALL",
        }
    }
}

impl TryFrom<u8> for Op {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, u8> {
        Ok(match byte {
            0x01 => Op::Add,
            0x02 => Op::Sub,
            0x03 => Op::Mul,
            0x04 => Op::Div,
            0x05 => Op::Mod,
            0x06 => Op::And,
            0x07 => Op::Or,
            0x08 => Op::Not,
            0x09 => Op::Eq,
            0x0A => Op::Neq,
            0x0B => Op::Lt,
            0x0C => Op::Gt,
            0x0D => Op::Le,
            0x0E => Op::Ge,
            0x0F => Op::PushInt,
            0x10 => Op::PushFloat,
            0x11 => Op::StoreGlobal,
            0x12 => Op::LoadGlobal,
            0x13 => Op::Jump,
            0x14 => Op::JumpIf,
            0x15 => Op::EnterScope,
            0x16 => Op::ExitScope,
            0x17 => Op::Call,
            0x18 => Op::StoreLocal,
            0x19 => Op::LoadLocal,
            0x1A => Op::Return,
            0x1B => Op::BuildList,
            0x1C => Op::ListGet,
            0x1D => Op::ListSet,
            0x1E => Op::BuildStr,
            0x1F => Op::PushChar,
            0x20 => Op::DefineType,
            0x21 => Op::New,
            0x22 => Op::StoreHeap,
            0x23 => Op::LoadHeap,
            0xFE => Op::ObjCall,
            0xFF => Op::Syscall,
            other => return Err(other),
        })
    }
}
