use crate::{ArrayHandle, ExecutionError, ExecutionResult, Host, Interpreter, Kind, Value};

mod list;
mod string;

pub type PrimitiveFunction = fn(&mut PrimitiveContext) -> Result<ExecutionResult, ExecutionError>;

// the receiver does not count as input
// e.g. `slice` => `from to <array> OBJCALL 5` has inputs: 2
#[derive(Debug, Copy, Clone)]
pub struct PrimitiveMessage<'a> {
    pub name: &'a str,
    pub inputs: usize,
    pub outputs: usize,
    pub ptr: PrimitiveFunction,
}

impl<'a> PrimitiveMessage<'a> {
    pub const fn new(name: &'a str, inputs: usize, outputs: usize, ptr: PrimitiveFunction) -> Self {
        Self {
            name,
            inputs,
            outputs,
            ptr,
        }
    }
}

pub struct PrimitiveContext<'ex> {
    pub interpreter: &'ex mut Interpreter,
    pub host: &'ex mut dyn Host,
    pub receiver: ArrayHandle,
}

impl PrimitiveContext<'_> {
    /// Runs the function at `entry` on `argument` and pops its result.
    ///
    /// `Err(status)` means the program exited while inside the function.
    pub fn call(&mut self, entry: usize, argument: Value) -> Result<Result<Value, i32>, ExecutionError> {
        match self.interpreter.invoke(self.host, entry, argument)? {
            ExecutionResult::Normal => Ok(Ok(self.interpreter.stack.pop()?)),
            ExecutionResult::Exit(status) => Ok(Err(status)),
        }
    }
}

// indexed by the OBJCALL argument
pub const PRIMITIVES: &[PrimitiveMessage] = &[
    PrimitiveMessage::new("append", 1, 0, list::append),
    PrimitiveMessage::new("size", 0, 1, list::size),
    PrimitiveMessage::new("remove_at", 1, 0, list::remove_at),
    PrimitiveMessage::new("pop", 0, 0, list::pop),
    PrimitiveMessage::new("is_empty", 0, 1, list::is_empty),
    PrimitiveMessage::new("slice", 2, 1, list::slice),
    PrimitiveMessage::new("map", 1, 1, list::map),
    PrimitiveMessage::new("filter", 1, 1, list::filter),
    PrimitiveMessage::new("min", 0, 1, list::min),
    PrimitiveMessage::new("max", 0, 1, list::max),
    PrimitiveMessage::new("lower", 0, 1, string::lower),
    PrimitiveMessage::new("upper", 0, 1, string::upper),
    PrimitiveMessage::new("toString", 0, 1, string::to_string),
];

pub fn primitive_index(name: &str) -> Option<u32> {
    PRIMITIVES
        .iter()
        .position(|message| message.name == name)
        .map(|index| index as u32)
}

/// Handles `OBJCALL selector`.
///
/// The receiver is popped before the selector is looked up. An unknown
/// selector is reported and skipped, it never stops the program.
pub fn call_primitive(
    interpreter: &mut Interpreter,
    host: &mut dyn Host,
    selector: u32,
) -> Result<ExecutionResult, ExecutionError> {
    let receiver = interpreter.stack.pop()?;
    let Some(message) = PRIMITIVES.get(selector as usize) else {
        log::warn!("unknown objcall selector {selector}");
        host.write_str(&format!("Unknown objcall: {}\n", selector as i32))?;
        return Ok(ExecutionResult::Normal);
    };
    let Value::Array(receiver) = receiver else {
        return Err(ExecutionError::BadType {
            expected: Kind::Array,
            got: receiver.kind(),
        });
    };

    log::trace!("objcall {} on array #{}", message.name, receiver.0);
    let mut ctx = PrimitiveContext {
        interpreter,
        host,
        receiver,
    };
    (message.ptr)(&mut ctx)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::{BytecodeBuilder, StdHost, VMCreateInfo};

    #[test]
    fn table_keeps_selector_numbering() {
        assert_eq!(PRIMITIVES.len(), 13);
        assert_eq!(primitive_index("append"), Some(0));
        assert_eq!(primitive_index("slice"), Some(5));
        assert_eq!(primitive_index("map"), Some(6));
        assert_eq!(primitive_index("toString"), Some(12));
        assert_eq!(primitive_index("sort"), None);
    }

    #[test]
    fn unknown_selector_pops_receiver_and_continues() {
        let mut b = BytecodeBuilder::new();
        b.push_int(1).push_list(&[5]).objcall(42).push_int(2);
        let mut vm = Interpreter::new(b.finish(), &VMCreateInfo::default());
        let mut host = StdHost::new(Cursor::new(Vec::new()), Vec::new());
        vm.run(&mut host).unwrap();

        assert_eq!(vm.stack.as_slice(), &[Value::Int(1), Value::Int(2)]);
        let output = String::from_utf8(host.into_output()).unwrap();
        assert_eq!(output, "Unknown objcall: 42\n");
    }

    #[test]
    fn receiver_must_be_an_array() {
        let mut b = BytecodeBuilder::new();
        b.push_int(3).objcall(1);
        let mut vm = Interpreter::new(b.finish(), &VMCreateInfo::default());
        let mut host = StdHost::new(Cursor::new(Vec::new()), Vec::new());
        assert_eq!(
            vm.run(&mut host),
            Err(ExecutionError::BadType {
                expected: Kind::Array,
                got: Kind::Int
            })
        );
    }
}
