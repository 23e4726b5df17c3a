use crate::{Instruction, Op, POP_INDEX, Program};

/// An instruction whose target has not been resolved yet.
///
/// Created by the `*_forward` emitters, resolve it with
/// [`BytecodeBuilder::bind`].
#[derive(Debug)]
#[must_use]
pub struct Label {
    /// Index of the instruction whose argument gets patched.
    index: usize,
}

/// Assembles a [`Program`] in memory.
#[derive(Debug, Default)]
pub struct BytecodeBuilder {
    instructions: Vec<Instruction>,
}

impl BytecodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the next emitted instruction will have.
    pub fn current_index(&self) -> u32 {
        self.instructions.len() as u32
    }

    pub fn finish(self) -> Program {
        Program::new(self.instructions)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.finish().to_bytes()
    }

    pub fn emit(&mut self, op: Op, arg: u32) -> &mut Self {
        self.instructions.push(Instruction::new(op, arg));
        self
    }

    fn emit_forward(&mut self, op: Op) -> Label {
        let index = self.instructions.len();
        self.emit(op, 0);
        Label { index }
    }

    /// Points `label` at the next instruction.
    pub fn bind(&mut self, label: Label) {
        let target = self.current_index();
        self.instructions[label.index].arg = target;
    }

    // ── operators ─────────────────────────────────────────────────

    pub fn add(&mut self) -> &mut Self {
        self.emit(Op::Add, 0)
    }

    pub fn sub(&mut self) -> &mut Self {
        self.emit(Op::Sub, 0)
    }

    pub fn mul(&mut self) -> &mut Self {
        self.emit(Op::Mul, 0)
    }

    pub fn div(&mut self) -> &mut Self {
        self.emit(Op::Div, 0)
    }

    pub fn not(&mut self) -> &mut Self {
        self.emit(Op::Not, 0)
    }

    pub fn op(&mut self, op: Op) -> &mut Self {
        debug_assert!(op.binary().is_some(), "{op:?} is not an operator");
        self.emit(op, 0)
    }

    // ── constants and storage ─────────────────────────────────────

    pub fn push_int(&mut self, value: i32) -> &mut Self {
        self.emit(Op::PushInt, value as u32)
    }

    pub fn push_float(&mut self, value: f32) -> &mut Self {
        self.emit(Op::PushFloat, value.to_bits())
    }

    pub fn push_char(&mut self, value: u8) -> &mut Self {
        self.emit(Op::PushChar, u32::from(value))
    }

    /// Pushes `text` as a string: one char per instruction, then `BuildStr`.
    pub fn push_str(&mut self, text: &str) -> &mut Self {
        // the first popped char becomes element 0
        for &byte in text.as_bytes().iter().rev() {
            self.push_char(byte);
        }
        self.emit(Op::BuildStr, text.len() as u32)
    }

    /// Pushes `values` as a list, element 0 first.
    pub fn push_list(&mut self, values: &[i32]) -> &mut Self {
        for &value in values.iter().rev() {
            self.push_int(value);
        }
        self.emit(Op::BuildList, values.len() as u32)
    }

    pub fn store_global(&mut self, slot: u32) -> &mut Self {
        self.emit(Op::StoreGlobal, slot)
    }

    pub fn load_global(&mut self, slot: u32) -> &mut Self {
        self.emit(Op::LoadGlobal, slot)
    }

    pub fn store_local(&mut self, slot: u32) -> &mut Self {
        self.emit(Op::StoreLocal, slot)
    }

    pub fn load_local(&mut self, slot: u32) -> &mut Self {
        self.emit(Op::LoadLocal, slot)
    }

    // ── control flow ──────────────────────────────────────────────

    pub fn jump(&mut self, target: u32) -> &mut Self {
        self.emit(Op::Jump, target)
    }

    pub fn jump_forward(&mut self) -> Label {
        self.emit_forward(Op::Jump)
    }

    pub fn jump_if(&mut self, target: u32) -> &mut Self {
        self.emit(Op::JumpIf, target)
    }

    pub fn jump_if_forward(&mut self) -> Label {
        self.emit_forward(Op::JumpIf)
    }

    pub fn call(&mut self, target: u32) -> &mut Self {
        self.emit(Op::Call, target)
    }

    pub fn call_forward(&mut self) -> Label {
        self.emit_forward(Op::Call)
    }

    pub fn ret(&mut self) -> &mut Self {
        self.emit(Op::Return, 0)
    }

    pub fn enter_scope(&mut self) -> &mut Self {
        self.emit(Op::EnterScope, 0)
    }

    pub fn exit_scope(&mut self) -> &mut Self {
        self.emit(Op::ExitScope, 0)
    }

    // ── arrays and objects ────────────────────────────────────────

    pub fn build_list(&mut self, count: u32) -> &mut Self {
        self.emit(Op::BuildList, count)
    }

    pub fn build_str(&mut self, count: u32) -> &mut Self {
        self.emit(Op::BuildStr, count)
    }

    /// `None` pops the index at run time.
    pub fn list_get(&mut self, index: Option<u32>) -> &mut Self {
        self.emit(Op::ListGet, index.unwrap_or(POP_INDEX))
    }

    /// `None` pops the index at run time.
    pub fn list_set(&mut self, index: Option<u32>) -> &mut Self {
        self.emit(Op::ListSet, index.unwrap_or(POP_INDEX))
    }

    pub fn define_type(&mut self, field_count: u32) -> &mut Self {
        self.emit(Op::DefineType, field_count)
    }

    pub fn new_object(&mut self, type_id: u32) -> &mut Self {
        self.emit(Op::New, type_id)
    }

    pub fn store_heap(&mut self, field: u32) -> &mut Self {
        self.emit(Op::StoreHeap, field)
    }

    pub fn load_heap(&mut self, field: u32) -> &mut Self {
        self.emit(Op::LoadHeap, field)
    }

    pub fn objcall(&mut self, method: u32) -> &mut Self {
        self.emit(Op::ObjCall, method)
    }

    pub fn syscall(&mut self, id: u32) -> &mut Self {
        self.emit(Op::Syscall, id)
    }
}
