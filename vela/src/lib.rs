mod activation;
pub mod alu;
mod arrays;
mod bytecode;
mod dump;
mod error;
pub mod format;
mod heap;
pub mod host;
mod interpreter;
mod primitives;
mod stack;
mod storage;
mod value;

pub use activation::*;
pub use alu::BinaryOp;
pub use arrays::{CHARS_PER_WORD, DynamicArray, MIN_CAPACITY};
pub use bytecode::*;
pub use dump::StateDump;
pub use error::ExecutionError;
pub use heap::{Heap, HeapBlock, TypeSignature};
pub use host::{Host, StdHost};
pub use interpreter::*;
pub use primitives::{
    PRIMITIVES, PrimitiveContext, PrimitiveFunction, PrimitiveMessage, call_primitive,
    primitive_index,
};
pub use stack::OperandStack;
pub use storage::ArrayStorage;
pub use value::*;
