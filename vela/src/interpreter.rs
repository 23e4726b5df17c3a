use crate::{
    ActivationStack, ActivationType, ArrayHandle, ArrayStorage, BinaryOp, CHARS_PER_WORD,
    DataSegment, DynamicArray, ExecutionError, Heap, Host, Kind, MIN_CAPACITY, ObjectHandle, Op,
    OperandStack, POP_INDEX, Program, StateDump, TypeSignature, Value, alu, format, primitives,
};

/// Sizing of a fresh [`Interpreter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VMCreateInfo {
    /// operand stack slots
    pub stack_size: usize,
    /// maximum depth of nested calls and scopes
    pub recursion_limit: usize,
    /// initial reservation of globals and of every frame's locals
    pub data_segment_capacity: usize,
}

impl Default for VMCreateInfo {
    fn default() -> Self {
        Self {
            stack_size: 256,
            recursion_limit: 128,
            data_segment_capacity: 512,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    Normal,
    /// the program asked to terminate with a status
    Exit(i32),
}

/// How a completed [`Interpreter::run`] ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// ran off the end of the program
    Finished,
    Exited(i32),
}

pub struct Interpreter {
    pub program: Program,
    pub pc: usize,
    pub stack: OperandStack,
    pub frames: ActivationStack,
    pub globals: DataSegment,
    pub heap: Heap,
    pub arrays: ArrayStorage,
    trace: bool,
}

impl Interpreter {
    pub fn new(program: Program, info: &VMCreateInfo) -> Self {
        Self {
            program,
            pc: 0,
            stack: OperandStack::new(info.stack_size),
            frames: ActivationStack::new(info.recursion_limit, info.data_segment_capacity),
            globals: DataSegment::with_capacity(info.data_segment_capacity),
            heap: Heap::new(),
            arrays: ArrayStorage::new(),
            trace: false,
        }
    }

    /// Dump the VM state through the host before every instruction and once
    /// after the run.
    pub fn set_trace(&mut self, trace: bool) {
        self.trace = trace;
    }

    pub fn dump(&self) -> StateDump<'_> {
        StateDump::new(self)
    }

    /// Runs from the current program counter until the program ends or
    /// exits.
    pub fn run(&mut self, host: &mut dyn Host) -> Result<RunOutcome, ExecutionError> {
        let result = self.execute(host, None)?;
        Ok(match result {
            ExecutionResult::Normal => {
                if self.trace {
                    host.write_str(&self.dump().to_string())?;
                }
                RunOutcome::Finished
            }
            ExecutionResult::Exit(status) => RunOutcome::Exited(status),
        })
    }

    /// Calls the function at `entry` with `argument` from inside an
    /// instruction and runs it to its matching return. The result is left
    /// on the operand stack.
    ///
    /// The nested run shares every resource with the caller, including the
    /// recursion limit.
    pub fn invoke(
        &mut self,
        host: &mut dyn Host,
        entry: usize,
        argument: Value,
    ) -> Result<ExecutionResult, ExecutionError> {
        self.stack.push(argument)?;
        let floor = self.frames.depth();
        self.frames.new_activation(ActivationType::Call, self.pc)?;
        self.pc = entry;
        self.execute(host, Some(floor))
    }

    // with a floor, stops once the frame depth drops back to it
    fn execute(
        &mut self,
        host: &mut dyn Host,
        floor: Option<usize>,
    ) -> Result<ExecutionResult, ExecutionError> {
        loop {
            match floor {
                Some(floor) if self.frames.depth() <= floor => {
                    return Ok(ExecutionResult::Normal);
                }
                Some(_) if self.pc >= self.program.len() => {
                    return Err(ExecutionError::UndefinedError {
                        reason: "function ran past the end of the program",
                    });
                }
                None if self.pc >= self.program.len() => {
                    return Ok(ExecutionResult::Normal);
                }
                _ => {}
            }

            if self.trace {
                host.write_str(&self.dump().to_string())?;
            }

            if let ExecutionResult::Exit(status) = self.step(host)? {
                return Ok(ExecutionResult::Exit(status));
            }
        }
    }

    /// Executes the instruction at the program counter.
    pub fn step(&mut self, host: &mut dyn Host) -> Result<ExecutionResult, ExecutionError> {
        let index = self.pc;
        let instruction = self
            .program
            .get(index)
            .ok_or(ExecutionError::UndefinedError {
                reason: "program counter out of range",
            })?;
        log::trace!("{index:04} {instruction}");
        self.pc += 1;

        let arg = instruction.arg;
        match instruction.op {
            op @ (Op::Add
            | Op::Sub
            | Op::Mul
            | Op::Div
            | Op::Mod
            | Op::And
            | Op::Or
            | Op::Not
            | Op::Eq
            | Op::Neq
            | Op::Lt
            | Op::Gt
            | Op::Le
            | Op::Ge) => {
                if let Some(binary) = op.binary() {
                    self.dyadic(binary)?;
                }
            }
            Op::PushInt => self.stack.push(Value::Int(arg as i32))?,
            Op::PushFloat => self.stack.push(Value::Float(arg))?,
            Op::PushChar => self.stack.push(Value::Char(arg))?,
            Op::StoreGlobal => {
                let value = self.stack.pop()?;
                self.globals.store(instruction.arg_usize(), value)?;
            }
            Op::LoadGlobal => {
                let value = self.globals.load(instruction.arg_usize())?;
                self.stack.push(value)?;
            }
            Op::Jump => self.pc = instruction.arg_usize(),
            Op::JumpIf => {
                if self.stack.pop()?.is_truthy() {
                    self.pc = instruction.arg_usize();
                }
            }
            Op::EnterScope => self.frames.new_activation(ActivationType::Scope, self.pc)?,
            Op::ExitScope => {
                self.frames.pop()?;
            }
            Op::Call => {
                self.frames.new_activation(ActivationType::Call, self.pc)?;
                self.pc = instruction.arg_usize();
            }
            Op::StoreLocal => {
                let value = self.stack.pop()?;
                self.frames.locals_mut()?.store(instruction.arg_usize(), value)?;
            }
            Op::LoadLocal => {
                let value = self.frames.locals()?.load(instruction.arg_usize())?;
                self.stack.push(value)?;
            }
            Op::Return => self.pc = self.frames.unwind_call()?,
            Op::BuildList => self.build_list(instruction.arg_usize())?,
            Op::BuildStr => self.build_str(instruction.arg_usize())?,
            Op::ListGet => {
                let index = self.index_operand(arg)?;
                let array = self.pop_array()?;
                let value = self.arrays.get(array)?.get(index)?;
                self.stack.push(value)?;
            }
            Op::ListSet => {
                let index = self.index_operand(arg)?;
                let array = self.pop_array()?;
                let value = self.stack.pop()?;
                self.arrays.get_mut(array)?.set(index, value)?;
            }
            Op::DefineType => self.define_type(instruction.arg_usize())?,
            Op::New => {
                let field_count = self.heap.signature(arg)?.fields().len();
                let values = self.stack.pop_n(field_count)?;
                let object = self.heap.allocate_object(arg, &values)?;
                self.stack.push(Value::Object(object))?;
            }
            Op::StoreHeap => {
                let object = self.pop_object()?;
                let value = self.stack.pop()?;
                self.heap.store_field(object, instruction.arg_usize(), value)?;
            }
            Op::LoadHeap => {
                let object = self.pop_object()?;
                let value = self.heap.load_field(object, instruction.arg_usize())?;
                self.stack.push(value)?;
            }
            Op::ObjCall => return primitives::call_primitive(self, host, arg),
            Op::Syscall => return host.syscall(self, arg),
        }
        Ok(ExecutionResult::Normal)
    }

    // numbers go to the ALU, an array operand turns the operator into an
    // append onto that array
    fn dyadic(&mut self, op: BinaryOp) -> Result<(), ExecutionError> {
        let right = if op.is_unary() {
            Value::Int(0)
        } else {
            self.stack.pop()?
        };
        let left = self.stack.pop()?;

        let result = match (left, right) {
            (Value::Array(left), Value::Array(right)) => {
                self.arrays.concat(left, right)?;
                Value::Array(left)
            }
            (Value::Array(array), scalar) | (scalar, Value::Array(array)) => {
                let target = self.arrays.get_mut(array)?;
                if target.is_char() {
                    format::push_scalar(target, scalar)?;
                } else {
                    target.append(scalar)?;
                }
                Value::Array(array)
            }
            _ => alu::evaluate(op, left, right)?,
        };
        self.stack.push(result)
    }

    fn build_list(&mut self, count: usize) -> Result<(), ExecutionError> {
        let values = self.stack.pop_n(count)?;
        let capacity = count.next_multiple_of(CHARS_PER_WORD).max(MIN_CAPACITY);
        let mut array = DynamicArray::with_capacity(capacity);
        for value in values {
            array.append(value)?;
        }
        let handle = self.arrays.allocate(array);
        self.stack.push(Value::Array(handle))
    }

    fn build_str(&mut self, count: usize) -> Result<(), ExecutionError> {
        let values = self.stack.pop_n(count)?;
        let capacity = count.next_multiple_of(CHARS_PER_WORD).max(MIN_CAPACITY);
        let mut array = DynamicArray::with_kind(Kind::Char, capacity);
        for value in values {
            array.append(value)?;
        }
        let handle = self.arrays.allocate(array);
        self.stack.push(Value::Array(handle))
    }

    fn define_type(&mut self, field_count: usize) -> Result<(), ExecutionError> {
        let codes = self.stack.pop_n(field_count)?;
        let fields = codes
            .into_iter()
            .map(|code| Kind::try_from(code.coerce_to(Kind::Int)?))
            .collect::<Result<Vec<_>, _>>()?;
        let type_id = self.heap.define_type(TypeSignature::new(fields));
        log::debug!("defined object type {type_id} with {field_count} fields");
        Ok(())
    }

    fn index_operand(&mut self, arg: u32) -> Result<i32, ExecutionError> {
        if arg == POP_INDEX {
            self.pop_int()
        } else {
            Ok(arg as i32)
        }
    }

    /// Pops an `Int`, truncating a `Float`.
    pub fn pop_int(&mut self) -> Result<i32, ExecutionError> {
        Ok(self.stack.pop()?.coerce_to(Kind::Int)? as i32)
    }

    pub fn pop_array(&mut self) -> Result<ArrayHandle, ExecutionError> {
        match self.stack.pop()? {
            Value::Array(handle) => Ok(handle),
            other => Err(ExecutionError::BadType {
                expected: Kind::Array,
                got: other.kind(),
            }),
        }
    }

    pub fn pop_object(&mut self) -> Result<ObjectHandle, ExecutionError> {
        match self.stack.pop()? {
            Value::Object(handle) => Ok(handle),
            other => Err(ExecutionError::BadType {
                expected: Kind::Object,
                got: other.kind(),
            }),
        }
    }

    /// Allocates `array` and pushes a reference to it.
    pub fn push_array(&mut self, array: DynamicArray) -> Result<ArrayHandle, ExecutionError> {
        let handle = self.arrays.allocate(array);
        self.stack.push(Value::Array(handle))?;
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::{BytecodeBuilder, StdHost};

    type TestHost = StdHost<Cursor<Vec<u8>>, Vec<u8>>;

    fn host() -> TestHost {
        StdHost::new(Cursor::new(Vec::new()), Vec::new())
    }

    fn run(builder: BytecodeBuilder) -> Result<Interpreter, ExecutionError> {
        run_with(builder, &VMCreateInfo::default())
    }

    fn run_with(
        builder: BytecodeBuilder,
        info: &VMCreateInfo,
    ) -> Result<Interpreter, ExecutionError> {
        let mut vm = Interpreter::new(builder.finish(), info);
        vm.run(&mut host())?;
        Ok(vm)
    }

    fn top(vm: &Interpreter) -> Value {
        vm.stack.get_nth(0).unwrap()
    }

    fn text_of(vm: &Interpreter, value: Value) -> String {
        format::render(&vm.arrays, value).unwrap()
    }

    #[test]
    fn arithmetic_pops_right_operand_first() {
        let mut b = BytecodeBuilder::new();
        b.push_int(10).push_int(3).sub();
        b.push_int(7).push_int(2).op(Op::Mod);
        let vm = run(b).unwrap();
        assert_eq!(vm.stack.as_slice(), &[Value::Int(7), Value::Int(1)]);
    }

    #[test]
    fn mixed_operands_promote_to_float() {
        let mut b = BytecodeBuilder::new();
        b.push_int(1).push_float(0.5).add();
        let vm = run(b).unwrap();
        assert_eq!(top(&vm), Value::from_f32(1.5));
    }

    #[test]
    fn not_only_pops_one_operand() {
        let mut b = BytecodeBuilder::new();
        b.push_int(9).push_int(0).not();
        let vm = run(b).unwrap();
        assert_eq!(vm.stack.as_slice(), &[Value::Int(9), Value::Int(1)]);
    }

    #[test]
    fn integer_division_by_zero_fails() {
        let mut b = BytecodeBuilder::new();
        b.push_int(1).push_int(0).div();
        assert_eq!(run(b).err(), Some(ExecutionError::DivisionByZero));
    }

    #[test]
    fn globals_store_and_load() {
        let mut b = BytecodeBuilder::new();
        b.push_int(42).store_global(3).load_global(3).load_global(0);
        let vm = run(b).unwrap();
        assert_eq!(vm.stack.as_slice(), &[Value::Int(42), Value::Int(0)]);

        let mut b = BytecodeBuilder::new();
        b.load_global(0);
        assert_eq!(
            run(b).err(),
            Some(ExecutionError::MemoryAccessOutOfBounds { address: 0, size: 1 })
        );
    }

    #[test]
    fn countdown_loop_with_conditional_jump() {
        // n = 5; do { n = n - 1 } while (n > 0)
        let mut b = BytecodeBuilder::new();
        b.push_int(5).store_global(0);
        let head = b.current_index();
        b.load_global(0).push_int(1).sub().store_global(0);
        b.load_global(0).push_int(0).op(Op::Gt).jump_if(head);
        b.load_global(0);
        let vm = run(b).unwrap();
        assert_eq!(vm.stack.as_slice(), &[Value::Int(0)]);
    }

    #[test]
    fn forward_jump_skips_code() {
        let mut b = BytecodeBuilder::new();
        let skip = b.jump_forward();
        b.push_int(1);
        b.bind(skip);
        b.push_int(2);
        let vm = run(b).unwrap();
        assert_eq!(vm.stack.as_slice(), &[Value::Int(2)]);
    }

    #[test]
    fn call_frame_locals_are_isolated() {
        let mut b = BytecodeBuilder::new();
        b.enter_scope().push_int(1).store_local(0);
        let call = b.call_forward();
        b.load_local(0);
        let end = b.jump_forward();

        // fn: writes its own slot 0 and 1, returns 99
        b.bind(call);
        b.push_int(5).store_local(0).push_int(6).store_local(1);
        b.push_int(99).ret();
        b.bind(end);

        let vm = run(b).unwrap();
        assert_eq!(vm.stack.as_slice(), &[Value::Int(99), Value::Int(1)]);
        assert_eq!(vm.frames.depth(), 1);
        assert!(vm.frames.locals().unwrap().load(1).is_err());
    }

    #[test]
    fn exit_scope_restores_the_outer_locals() {
        let mut b = BytecodeBuilder::new();
        b.enter_scope().push_int(1).store_local(0);
        b.enter_scope().push_int(2).store_local(0).load_local(0);
        b.exit_scope();
        b.load_local(0);
        let vm = run(b).unwrap();
        assert_eq!(vm.stack.as_slice(), &[Value::Int(2), Value::Int(1)]);
        assert_eq!(vm.frames.depth(), 1);
        assert_eq!(vm.frames.locals().unwrap().pointer(), 1);
    }

    #[test]
    fn exit_scope_falls_through() {
        let mut b = BytecodeBuilder::new();
        b.enter_scope().exit_scope().exit_scope();
        let mut vm = Interpreter::new(b.finish(), &VMCreateInfo::default());
        let mut host = host();
        vm.step(&mut host).unwrap();
        assert_eq!((vm.pc, vm.frames.depth()), (1, 1));
        vm.step(&mut host).unwrap();
        assert_eq!((vm.pc, vm.frames.depth()), (2, 0));
        assert_eq!(vm.step(&mut host), Err(ExecutionError::EmptyStackAccess));
    }

    #[test]
    fn scopes_count_against_the_recursion_limit() {
        let info = VMCreateInfo {
            recursion_limit: 2,
            ..Default::default()
        };
        let mut b = BytecodeBuilder::new();
        b.enter_scope().enter_scope().enter_scope();
        assert_eq!(
            run_with(b, &info).err(),
            Some(ExecutionError::RecursionLimitExceeded { limit: 2 })
        );
    }

    #[test]
    fn return_discards_scopes_opened_by_the_function() {
        let mut b = BytecodeBuilder::new();
        b.enter_scope().push_int(1).store_local(0);
        let call = b.call_forward();
        b.load_local(0);
        let end = b.jump_forward();

        b.bind(call);
        b.enter_scope().enter_scope().push_int(3).ret();
        b.bind(end);

        let vm = run(b).unwrap();
        assert_eq!(vm.stack.as_slice(), &[Value::Int(3), Value::Int(1)]);
        assert_eq!(vm.frames.depth(), 1);
    }

    #[test]
    fn absolute_jump_survives_encoding() {
        let mut b = BytecodeBuilder::new();
        b.push_int(1).jump(3).push_int(2).push_int(3);
        let program = Program::from_bytes(&b.into_bytes()).unwrap();
        let mut vm = Interpreter::new(program, &VMCreateInfo::default());
        assert_eq!(vm.run(&mut host()), Ok(RunOutcome::Finished));
        assert_eq!(vm.stack.as_slice(), &[Value::Int(1), Value::Int(3)]);
    }

    fn recursive_program(depth: i32) -> BytecodeBuilder {
        // count(n): if n == 0 return 0 else return count(n - 1) + 1
        let mut b = BytecodeBuilder::new();
        b.push_int(depth);
        let main_call = b.call_forward();
        let end = b.jump_forward();

        let entry = b.current_index();
        b.bind(main_call);
        b.store_local(0);
        b.load_local(0).push_int(0).op(Op::Eq);
        let base = b.jump_if_forward();
        b.load_local(0).push_int(1).sub().call(entry);
        b.push_int(1).add().ret();
        b.bind(base);
        b.push_int(0).ret();
        b.bind(end);
        b
    }

    #[test]
    fn recursion_returns_through_every_frame() {
        let vm = run(recursive_program(20)).unwrap();
        assert_eq!(vm.stack.as_slice(), &[Value::Int(20)]);
        assert_eq!(vm.frames.depth(), 0);
    }

    #[test]
    fn recursion_limit_is_enforced() {
        let info = VMCreateInfo {
            recursion_limit: 8,
            ..Default::default()
        };
        let mut vm = Interpreter::new(recursive_program(50).finish(), &info);
        assert_eq!(
            vm.run(&mut host()),
            Err(ExecutionError::RecursionLimitExceeded { limit: 8 })
        );
        assert_eq!(vm.frames.depth(), 8);
    }

    #[test]
    fn return_without_frame_fails() {
        let mut b = BytecodeBuilder::new();
        b.ret();
        assert_eq!(run(b).err(), Some(ExecutionError::EmptyStackAccess));

        let mut b = BytecodeBuilder::new();
        b.load_local(0);
        assert!(matches!(
            run(b).err(),
            Some(ExecutionError::MemoryAccessOutOfBounds { .. })
        ));
    }

    #[test]
    fn build_list_keeps_push_order() {
        let mut b = BytecodeBuilder::new();
        b.push_list(&[1, 2, 3, 4, 5]);
        let vm = run(b).unwrap();
        let Value::Array(handle) = top(&vm) else {
            panic!("expected an array");
        };
        let array = vm.arrays.get(handle).unwrap();
        assert_eq!(array.words(), &[1, 2, 3, 4, 5]);
        assert_eq!(array.capacity(), 8);
    }

    #[test]
    fn array_plus_array_concatenates_in_place() {
        let mut b = BytecodeBuilder::new();
        b.push_list(&[1, 2]).push_list(&[3]).add();
        let vm = run(b).unwrap();
        assert_eq!(top(&vm), Value::Array(ArrayHandle(0)));
        assert_eq!(vm.arrays.get(ArrayHandle(0)).unwrap().words(), &[1, 2, 3]);
    }

    #[test]
    fn string_concat_keeps_zero_characters() {
        let mut b = BytecodeBuilder::new();
        b.load_global(0).load_global(1).add();
        let mut vm = Interpreter::new(b.finish(), &VMCreateInfo::default());
        let left = vm.arrays.allocate(DynamicArray::from_text("x"));
        let right = vm.arrays.allocate(DynamicArray::from_text("a\0b"));
        vm.globals.store(0, Value::Array(left)).unwrap();
        vm.globals.store(1, Value::Array(right)).unwrap();
        vm.run(&mut host()).unwrap();

        let joined = vm.arrays.get(left).unwrap();
        assert_eq!(joined.len(), 4);
        assert_eq!(joined.text(), "xa\0b");
    }

    #[test]
    fn build_str_unpacks_literals() {
        let mut b = BytecodeBuilder::new();
        b.push_char(b'c').push_char(b'b').push_char(b'a').build_str(3);
        b.emit(Op::PushChar, u32::from_le_bytes(*b"hi\0\0")).build_str(1);
        let vm = run(b).unwrap();
        assert_eq!(text_of(&vm, vm.stack.as_slice()[0]), "abc");
        assert_eq!(text_of(&vm, top(&vm)), "hi");
        assert_eq!(vm.arrays.get(ArrayHandle(1)).unwrap().len(), 2);
    }

    #[test]
    fn scalar_plus_string_formats_the_number() {
        let mut b = BytecodeBuilder::new();
        b.push_str("n=").push_int(-42).add();
        b.push_float(0.25).add();
        let vm = run(b).unwrap();
        assert_eq!(text_of(&vm, top(&vm)), "n=-420.25");
    }

    #[test]
    fn scalar_plus_list_appends_either_side() {
        let mut b = BytecodeBuilder::new();
        b.push_int(7).push_list(&[1]).add().push_int(8).add();
        let vm = run(b).unwrap();
        assert_eq!(text_of(&vm, top(&vm)), "[1,7,8]");
    }

    #[test]
    fn list_get_and_set_with_immediate_and_popped_index() {
        let mut b = BytecodeBuilder::new();
        b.push_list(&[10, 20, 30]).store_global(0);
        // list[1] = 99
        b.push_int(99).load_global(0).list_set(Some(1));
        // push list[2] with a popped index
        b.load_global(0).push_int(2).list_get(None);
        b.load_global(0).list_get(Some(1));
        let vm = run(b).unwrap();
        assert_eq!(vm.stack.as_slice(), &[Value::Int(30), Value::Int(99)]);
    }

    #[test]
    fn list_get_out_of_range_fails() {
        let mut b = BytecodeBuilder::new();
        b.push_list(&[1, 2]).list_get(Some(2));
        assert_eq!(
            run(b).err(),
            Some(ExecutionError::IndexOutOfBounds { index: 2, len: 2 })
        );
    }

    #[test]
    fn strings_are_indexed_by_character() {
        let mut b = BytecodeBuilder::new();
        b.push_str("hello").list_get(Some(4));
        let vm = run(b).unwrap();
        assert_eq!(top(&vm), Value::Char(u32::from(b'o')));
    }

    #[test]
    fn objects_store_and_load_fields() {
        let mut b = BytecodeBuilder::new();
        // type 0 { int, char, float }: first popped code is field 0
        b.push_int(1).push_int(2).push_int(0).define_type(3);
        b.push_float(1.5).push_char(b'z').push_int(7).new_object(0);
        b.store_global(0);
        b.push_int(3).load_global(0).store_heap(2);
        b.load_global(0).load_heap(0);
        b.load_global(0).load_heap(1);
        b.load_global(0).load_heap(2);
        let vm = run(b).unwrap();
        assert_eq!(
            vm.stack.as_slice(),
            &[
                Value::Int(7),
                Value::Char(u32::from(b'z')),
                Value::from_f32(3.0)
            ]
        );
    }

    #[test]
    fn object_field_kind_is_checked() {
        let mut b = BytecodeBuilder::new();
        b.push_int(0).define_type(1);
        b.push_str("no").new_object(0);
        assert_eq!(
            run(b).err(),
            Some(ExecutionError::BadType {
                expected: Kind::Int,
                got: Kind::Array
            })
        );

        let mut b = BytecodeBuilder::new();
        b.new_object(3);
        assert!(matches!(
            run(b).err(),
            Some(ExecutionError::UndefinedError { .. })
        ));
    }

    #[test]
    fn empty_program_finishes() {
        let mut vm = Interpreter::new(Program::default(), &VMCreateInfo::default());
        assert_eq!(vm.run(&mut host()), Ok(RunOutcome::Finished));
    }

    #[test]
    fn trace_dumps_before_each_instruction_and_at_the_end() {
        let mut b = BytecodeBuilder::new();
        b.push_int(1).push_int(2);
        let mut vm = Interpreter::new(b.finish(), &VMCreateInfo::default());
        vm.set_trace(true);
        let mut host = StdHost::new(std::io::empty(), Vec::new());
        vm.run(&mut host).unwrap();
        let output = String::from_utf8(host.into_output()).unwrap();
        assert_eq!(output.matches("pc: ").count(), 3);
    }

    #[test]
    fn operand_stack_overflow_is_reported() {
        let info = VMCreateInfo {
            stack_size: 2,
            ..Default::default()
        };
        let mut b = BytecodeBuilder::new();
        b.push_int(1).push_int(2).push_int(3);
        assert_eq!(
            run_with(b, &info).err(),
            Some(ExecutionError::StackOverflow { limit: 2 })
        );
    }
}
