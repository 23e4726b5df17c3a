//! Host services reached through `SYSCALL`.
use std::io::{self, BufRead, Stdout, Write};

use crate::{DynamicArray, ExecutionError, ExecutionResult, Interpreter, Value, format};

pub const SYS_EXIT: u32 = 0;
pub const SYS_PRINT: u32 = 1;
pub const SYS_INPUT: u32 = 2;
pub const SYS_TYPE: u32 = 4;

/// Everything the interpreter needs from the outside world.
pub trait Host {
    /// Runs host service `id` against the VM's operand stack.
    fn syscall(
        &mut self,
        vm: &mut Interpreter,
        id: u32,
    ) -> Result<ExecutionResult, ExecutionError>;

    /// Writes program visible text (diagnostics, the debug trace).
    fn write_str(&mut self, text: &str) -> Result<(), ExecutionError>;
}

/// Host backed by a line reader and a writer, normally stdin/stdout.
#[derive(Debug)]
pub struct StdHost<R, W> {
    input: R,
    output: W,
}

impl StdHost<io::StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R, W> StdHost<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

fn write_failed(err: io::Error) -> ExecutionError {
    log::error!("host write failed: {err}");
    ExecutionError::UndefinedError {
        reason: "failed to write output",
    }
}

/// Kind name as `type` reports it. Char arrays are strings.
fn type_name(vm: &Interpreter, value: Value) -> Result<&'static str, ExecutionError> {
    Ok(match value {
        Value::Array(handle) if vm.arrays.get(handle)?.is_char() => "string",
        other => other.kind().name(),
    })
}

impl<R: BufRead, W: Write> Host for StdHost<R, W> {
    fn syscall(
        &mut self,
        vm: &mut Interpreter,
        id: u32,
    ) -> Result<ExecutionResult, ExecutionError> {
        match id {
            SYS_EXIT => {
                let status = vm.pop_int()?;
                log::info!("program exited with status {status}");
                return Ok(ExecutionResult::Exit(status));
            }
            SYS_PRINT => {
                let value = vm.stack.pop()?;
                let text = format::render(&vm.arrays, value)?;
                writeln!(self.output, "{text}").map_err(write_failed)?;
            }
            SYS_INPUT => {
                let mut line = String::new();
                self.input.read_line(&mut line).map_err(|err| {
                    log::error!("host read failed: {err}");
                    ExecutionError::UndefinedError {
                        reason: "failed to read input",
                    }
                })?;
                let line = line.trim_end_matches(['\n', '\r']);
                let handle = vm.arrays.allocate(DynamicArray::from_text(line));
                vm.stack.push(Value::Array(handle))?;
            }
            SYS_TYPE => {
                let value = vm.stack.pop()?;
                let name = type_name(vm, value)?;
                let handle = vm.arrays.allocate(DynamicArray::from_text(name));
                vm.stack.push(Value::Array(handle))?;
            }
            unknown => {
                log::warn!("unknown syscall {unknown}");
                self.write_str(&format!("Unknown syscall: {unknown}\n"))?;
            }
        }
        Ok(ExecutionResult::Normal)
    }

    fn write_str(&mut self, text: &str) -> Result<(), ExecutionError> {
        self.output.write_all(text.as_bytes()).map_err(write_failed)
    }
}
