use crate::{DynamicArray, ElementKind, ExecutionError, ExecutionResult, Kind, PrimitiveContext, Value};

// ( value -- ) | rec: array
pub fn append(ctx: &mut PrimitiveContext) -> Result<ExecutionResult, ExecutionError> {
    let value = ctx.interpreter.stack.pop()?;
    ctx.interpreter.arrays.get_mut(ctx.receiver)?.append(value)?;
    Ok(ExecutionResult::Normal)
}

// ( -- size ) | rec: array
pub fn size(ctx: &mut PrimitiveContext) -> Result<ExecutionResult, ExecutionError> {
    let len = ctx.interpreter.arrays.get(ctx.receiver)?.len();
    ctx.interpreter.stack.push(Value::Int(len as i32))?;
    Ok(ExecutionResult::Normal)
}

// ( index -- ) | rec: array
pub fn remove_at(ctx: &mut PrimitiveContext) -> Result<ExecutionResult, ExecutionError> {
    let index = ctx.interpreter.pop_int()?;
    ctx.interpreter.arrays.get_mut(ctx.receiver)?.remove_at(index)?;
    Ok(ExecutionResult::Normal)
}

// ( -- ) | rec: array
pub fn pop(ctx: &mut PrimitiveContext) -> Result<ExecutionResult, ExecutionError> {
    ctx.interpreter.arrays.get_mut(ctx.receiver)?.remove_last();
    Ok(ExecutionResult::Normal)
}

// ( -- bool ) | rec: array
pub fn is_empty(ctx: &mut PrimitiveContext) -> Result<ExecutionResult, ExecutionError> {
    let empty = ctx.interpreter.arrays.get(ctx.receiver)?.is_empty();
    ctx.interpreter.stack.push(Value::Int(i32::from(empty)))?;
    Ok(ExecutionResult::Normal)
}

// ( from to -- array ) | rec: array
pub fn slice(ctx: &mut PrimitiveContext) -> Result<ExecutionResult, ExecutionError> {
    let to = ctx.interpreter.pop_int()?;
    let from = ctx.interpreter.pop_int()?;
    let sliced = ctx.interpreter.arrays.get(ctx.receiver)?.slice(from, to)?;
    ctx.interpreter.push_array(sliced)?;
    Ok(ExecutionResult::Normal)
}

fn pop_entry(ctx: &mut PrimitiveContext) -> Result<usize, ExecutionError> {
    let entry = ctx.interpreter.pop_int()?;
    usize::try_from(entry).map_err(|_| ExecutionError::UndefinedError {
        reason: "negative function entry",
    })
}

struct Snapshot {
    kind: ElementKind,
    capacity: usize,
    values: Vec<Value>,
}

// receiver elements, copied out so the callback may touch the receiver
fn snapshot(ctx: &PrimitiveContext) -> Result<Snapshot, ExecutionError> {
    let array = ctx.interpreter.arrays.get(ctx.receiver)?;
    let values = match array.kind().kind() {
        Some(kind) => array
            .elements()
            .map(|payload| Value::from_parts(kind, payload))
            .collect(),
        None => Vec::new(),
    };
    Ok(Snapshot {
        kind: array.kind(),
        capacity: array.capacity(),
        values,
    })
}

// ( fn -- array ) | rec: array
pub fn map(ctx: &mut PrimitiveContext) -> Result<ExecutionResult, ExecutionError> {
    let entry = pop_entry(ctx)?;
    let receiver = snapshot(ctx)?;

    let mut mapped = DynamicArray::with_capacity(receiver.capacity);
    for value in receiver.values {
        match ctx.call(entry, value)? {
            Ok(result) => mapped.append_element(result)?,
            Err(status) => return Ok(ExecutionResult::Exit(status)),
        }
    }

    ctx.interpreter.push_array(mapped)?;
    Ok(ExecutionResult::Normal)
}

// ( fn -- array ) | rec: array
pub fn filter(ctx: &mut PrimitiveContext) -> Result<ExecutionResult, ExecutionError> {
    let entry = pop_entry(ctx)?;
    let receiver = snapshot(ctx)?;

    let mut filtered = DynamicArray::with_capacity(receiver.capacity);
    filtered.set_kind(receiver.kind);
    for value in receiver.values {
        match ctx.call(entry, value)? {
            Ok(keep) if keep.is_truthy() => filtered.append_element(value)?,
            Ok(_) => {}
            Err(status) => return Ok(ExecutionResult::Exit(status)),
        }
    }

    ctx.interpreter.push_array(filtered)?;
    Ok(ExecutionResult::Normal)
}

// payloads compare as signed 32-bit integers, whatever the element kind
fn extreme(
    ctx: &mut PrimitiveContext,
    pick: fn(i32, i32) -> i32,
) -> Result<ExecutionResult, ExecutionError> {
    let array = ctx.interpreter.arrays.get(ctx.receiver)?;
    let best = array
        .elements()
        .map(|payload| payload as i32)
        .reduce(pick)
        .ok_or(ExecutionError::IndexOutOfBounds { index: 0, len: 0 })?;
    let kind = array.kind().kind().unwrap_or(Kind::Int);
    ctx.interpreter
        .stack
        .push(Value::from_parts(kind, best as u32))?;
    Ok(ExecutionResult::Normal)
}

// ( -- value ) | rec: array
pub fn min(ctx: &mut PrimitiveContext) -> Result<ExecutionResult, ExecutionError> {
    extreme(ctx, i32::min)
}

// ( -- value ) | rec: array
pub fn max(ctx: &mut PrimitiveContext) -> Result<ExecutionResult, ExecutionError> {
    extreme(ctx, i32::max)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use crate::{
        ArrayHandle, BytecodeBuilder, DynamicArray, ExecutionError, Interpreter, Kind, Op,
        RunOutcome, StdHost, VMCreateInfo, Value, format, host::SYS_EXIT,
    };

    fn run(b: BytecodeBuilder) -> Result<Interpreter, ExecutionError> {
        let mut vm = Interpreter::new(b.finish(), &VMCreateInfo::default());
        vm.run(&mut StdHost::new(Cursor::new(Vec::new()), Vec::new()))?;
        Ok(vm)
    }

    fn rendered_top(vm: &Interpreter) -> String {
        format::render(&vm.arrays, vm.stack.get_nth(0).unwrap()).unwrap()
    }

    #[test]
    fn append_adopts_kind_then_coerces() {
        let mut b = BytecodeBuilder::new();
        b.build_list(0).store_global(0);
        b.push_int(5).load_global(0).objcall(0);
        b.push_float(2.9).load_global(0).objcall(0);
        b.load_global(0);
        let vm = run(b).unwrap();
        let array = vm.arrays.get(ArrayHandle(0)).unwrap();
        assert_eq!(array.kind().kind(), Some(Kind::Int));
        assert_eq!(array.words(), &[5, 2]);
    }

    #[test]
    fn append_array_onto_string_is_rejected() {
        let mut b = BytecodeBuilder::new();
        b.push_list(&[1]).push_str("ab").objcall(0);
        assert_eq!(
            run(b).err(),
            Some(ExecutionError::BadType {
                expected: Kind::Char,
                got: Kind::Array
            })
        );
    }

    #[test]
    fn size_and_is_empty() {
        let mut b = BytecodeBuilder::new();
        b.push_str("hello").objcall(1);
        b.build_list(0).objcall(4);
        b.push_list(&[1]).objcall(4);
        let vm = run(b).unwrap();
        assert_eq!(
            vm.stack.as_slice(),
            &[Value::Int(5), Value::Int(1), Value::Int(0)]
        );
    }

    #[test]
    fn remove_at_and_pop() {
        let mut b = BytecodeBuilder::new();
        b.push_list(&[1, 2, 3, 4]).store_global(0);
        b.push_int(1).load_global(0).objcall(2);
        b.load_global(0).objcall(3);
        b.load_global(0);
        let vm = run(b).unwrap();
        assert_eq!(rendered_top(&vm), "[1,3]");

        let mut b = BytecodeBuilder::new();
        b.push_int(2).push_list(&[1, 2]).objcall(2);
        assert_eq!(
            run(b).err(),
            Some(ExecutionError::IndexOutOfBounds { index: 2, len: 2 })
        );
    }

    #[test]
    fn pop_on_empty_is_a_no_op() {
        let mut b = BytecodeBuilder::new();
        b.build_list(0).objcall(3);
        assert!(run(b).is_ok());
    }

    #[test]
    fn slice_string_by_characters() {
        let mut b = BytecodeBuilder::new();
        b.push_int(1).push_int(4).push_str("abcde").objcall(5);
        let vm = run(b).unwrap();
        assert_eq!(rendered_top(&vm), "bcd");

        let mut b = BytecodeBuilder::new();
        b.push_int(0).push_int(6).push_str("abcde").objcall(5);
        assert_eq!(
            run(b).err(),
            Some(ExecutionError::IndexOutOfBounds { index: 6, len: 5 })
        );
    }

    // fn(x) = x * 10, laid out after a jump over it
    fn with_times_ten(b: &mut BytecodeBuilder) -> i32 {
        let over = b.jump_forward();
        let entry = b.current_index();
        b.push_int(10).mul().ret();
        b.bind(over);
        entry as i32
    }

    #[test]
    fn map_keeps_order_and_length() {
        let mut b = BytecodeBuilder::new();
        let entry = with_times_ten(&mut b);
        b.push_int(entry).push_list(&[1, 2, 3]).objcall(6);
        b.push_int(4);
        let vm = run(b).unwrap();
        assert_eq!(vm.stack.depth(), 2);
        assert_eq!(vm.stack.get_nth(0), Some(Value::Int(4)));
        let mapped = vm.stack.get_nth(1).unwrap();
        assert_eq!(format::render(&vm.arrays, mapped).unwrap(), "[10,20,30]");
        assert_eq!(vm.frames.depth(), 0);
    }

    #[test]
    fn filter_drops_only_zero_results() {
        // keep(x) = x % 2
        let mut b = BytecodeBuilder::new();
        let over = b.jump_forward();
        let entry = b.current_index() as i32;
        b.push_int(2).op(Op::Mod).ret();
        b.bind(over);
        b.push_int(entry).push_list(&[1, 2, 3, 4, 5, -7]).objcall(7);
        let vm = run(b).unwrap();
        assert_eq!(rendered_top(&vm), "[1,3,5,-7]");
    }

    #[test]
    fn filter_keeps_zero_characters() {
        // keep(x) = 1
        let mut b = BytecodeBuilder::new();
        let over = b.jump_forward();
        let entry = b.current_index() as i32;
        b.store_local(0).push_int(1).ret();
        b.bind(over);
        b.push_int(entry).load_global(0).objcall(7);

        let mut vm = Interpreter::new(b.finish(), &VMCreateInfo::default());
        let text = vm.arrays.allocate(DynamicArray::from_text("a\0b"));
        vm.globals.store(0, Value::Array(text)).unwrap();
        vm.run(&mut StdHost::new(Cursor::new(Vec::new()), Vec::new()))
            .unwrap();

        let Some(Value::Array(kept)) = vm.stack.get_nth(0) else {
            panic!("expected an array");
        };
        let kept = vm.arrays.get(kept).unwrap();
        assert_eq!(kept.len(), 3);
        assert_eq!(kept.text(), "a\0b");
    }

    #[test]
    fn map_respects_the_recursion_limit() {
        let mut b = BytecodeBuilder::new();
        let entry = with_times_ten(&mut b);
        b.push_int(entry).push_list(&[1]).objcall(6);
        let info = VMCreateInfo {
            recursion_limit: 0,
            ..Default::default()
        };
        let mut vm = Interpreter::new(b.finish(), &info);
        let mut host = StdHost::new(Cursor::new(Vec::new()), Vec::new());
        assert_eq!(
            vm.run(&mut host),
            Err(ExecutionError::RecursionLimitExceeded { limit: 0 })
        );
    }

    #[test]
    fn exit_inside_map_ends_the_program() {
        let mut b = BytecodeBuilder::new();
        let over = b.jump_forward();
        let entry = b.current_index() as i32;
        b.syscall(SYS_EXIT);
        b.bind(over);
        b.push_int(entry).push_list(&[6, 7]).objcall(6);
        b.push_int(1);

        let mut vm = Interpreter::new(b.finish(), &VMCreateInfo::default());
        let mut host = StdHost::new(Cursor::new(Vec::new()), Vec::new());
        assert_eq!(vm.run(&mut host), Ok(RunOutcome::Exited(6)));
    }

    #[test]
    fn min_and_max_compare_signed() {
        let mut b = BytecodeBuilder::new();
        b.push_list(&[3, -4, 9, 0]).store_global(0);
        b.load_global(0).objcall(8);
        b.load_global(0).objcall(9);
        let vm = run(b).unwrap();
        assert_eq!(vm.stack.as_slice(), &[Value::Int(-4), Value::Int(9)]);

        let mut b = BytecodeBuilder::new();
        b.build_list(0).objcall(8);
        assert_eq!(
            run(b).err(),
            Some(ExecutionError::IndexOutOfBounds { index: 0, len: 0 })
        );
    }
}
