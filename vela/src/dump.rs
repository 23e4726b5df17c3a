//! Human readable VM state, printed by the debug trace.
use std::fmt;

use crate::{Interpreter, Value};

// arrays longer than this are cut off in the dump
const ARRAY_PRINT_LIMIT: usize = 16;

pub struct StateDump<'a> {
    vm: &'a Interpreter,
}

impl<'a> StateDump<'a> {
    pub fn new(vm: &'a Interpreter) -> Self {
        Self { vm }
    }

    fn write_values(f: &mut fmt::Formatter<'_>, values: &[Value]) -> fmt::Result {
        let depth = values.len();
        for (i, value) in values.iter().rev().enumerate() {
            writeln!(f, "[{:02}] {value}", depth - i - 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for StateDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vm = self.vm;
        writeln!(
            f,
            "=== pc: {} sp: {} fp: {} asp: {} ===",
            vm.pc,
            vm.stack.depth(),
            vm.frames.depth(),
            vm.arrays.pointer()
        )?;
        if let Some(instruction) = vm.program.get(vm.pc) {
            writeln!(f, "next: {instruction}")?;
        }

        writeln!(f, "--- Datastack ({}):", vm.stack.depth())?;
        Self::write_values(f, vm.stack.as_slice())?;

        if let Some(frame) = vm.frames.current() {
            let locals = frame.locals.as_slice();
            writeln!(f, "--- Locals ({:?}, {}):", frame.ty, locals.len())?;
            Self::write_values(f, locals)?;
        }

        writeln!(f, "--- Arrays ({}):", vm.arrays.pointer())?;
        for (handle, array) in vm.arrays.iter() {
            let kind = array.kind().kind().map_or("unassigned", |kind| kind.name());
            write!(f, "#{} {kind} {}/{}:", handle.0, array.len(), array.capacity())?;
            if array.is_char() {
                writeln!(f, " {:?}", array.text())?;
                continue;
            }
            for payload in array.elements().take(ARRAY_PRINT_LIMIT) {
                write!(f, " {payload:#010x}")?;
            }
            if array.len() > ARRAY_PRINT_LIMIT {
                write!(f, " ...")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
