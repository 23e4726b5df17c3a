mod builder;
mod instruction;
mod op;
mod program;

pub use builder::{BytecodeBuilder, Label};
pub use instruction::{INSTRUCTION_SIZE, Instruction, POP_INDEX};
pub use op::Op;
pub use program::Program;
