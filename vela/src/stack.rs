use crate::{ExecutionError, Value};

/// Bounded operand stack.
///
/// The backing storage is reserved up front; `limit` is the hard bound,
/// pushing past it is [`ExecutionError::StackOverflow`].
#[derive(Debug, Clone)]
pub struct OperandStack {
    stack: Vec<Value>,
    limit: usize,
}

impl OperandStack {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            stack: Vec::with_capacity(limit),
            limit,
        }
    }

    /// Returns the active portion of the stack, bottom first
    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.stack
    }

    /// Returns the current stack depth
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Pushes a value onto the stack
    pub fn push(&mut self, value: Value) -> Result<(), ExecutionError> {
        if self.stack.len() >= self.limit {
            return Err(ExecutionError::StackOverflow { limit: self.limit });
        }
        self.stack.push(value);
        Ok(())
    }

    /// Pops a value from the stack
    pub fn pop(&mut self) -> Result<Value, ExecutionError> {
        self.stack.pop().ok_or(ExecutionError::EmptyStackAccess)
    }

    /// Gets the nth value from the top of the stack (0-indexed)
    #[must_use]
    pub fn get_nth(&self, n: usize) -> Option<Value> {
        let idx = self.stack.len().checked_sub(n + 1)?;
        self.stack.get(idx).copied()
    }

    /// Removes the top n elements, the top of the stack comes first.
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<Value>, ExecutionError> {
        if self.stack.len() < n {
            return Err(ExecutionError::EmptyStackAccess);
        }
        let start = self.stack.len() - n;
        let mut values = self.stack.split_off(start);
        values.reverse();
        Ok(values)
    }
}
