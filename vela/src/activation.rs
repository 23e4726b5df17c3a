use crate::{ExecutionError, Value};

/// Flat, slot addressed storage used for globals and for every frame's
/// locals.
#[derive(Debug, Clone, Default)]
pub struct DataSegment {
    data: Vec<Value>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ActivationType {
    /// lexical scope, exited with `ExitScope`
    Scope,
    /// function call, exited with `Return`
    Call,
}

#[derive(Debug, Clone)]
pub struct Activation {
    pub locals: DataSegment,
    pub ty: ActivationType,
    /// instruction to resume at after `Return`
    pub return_address: usize,
}

/// Bounded stack of activations. Depth is capped by the recursion limit.
#[derive(Debug)]
pub struct ActivationStack {
    activations: Vec<Activation>,
    limit: usize,
    locals_capacity: usize,
}

impl DataSegment {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Append cursor: one past the highest slot written.
    #[inline]
    pub fn pointer(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Value] {
        &self.data
    }

    /// Stores into `address`. Storing past the end grows the segment, the
    /// gap is filled with `Int(0)`.
    pub fn store(&mut self, address: usize, value: Value) -> Result<(), ExecutionError> {
        if address >= self.data.len() {
            let reserved = address
                .checked_add(1)
                .map(|new_len| self.data.try_reserve(new_len - self.data.len()));
            if !matches!(reserved, Some(Ok(()))) {
                return Err(ExecutionError::UndefinedError {
                    reason: "data segment allocation failed",
                });
            }
            self.data.resize(address + 1, Value::Int(0));
        }
        self.data[address] = value;
        Ok(())
    }

    pub fn load(&self, address: usize) -> Result<Value, ExecutionError> {
        self.data
            .get(address)
            .copied()
            .ok_or(ExecutionError::MemoryAccessOutOfBounds { address, size: 1 })
    }
}

impl ActivationStack {
    pub fn new(limit: usize, locals_capacity: usize) -> Self {
        Self {
            activations: Vec::new(),
            limit,
            locals_capacity,
        }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.activations.len()
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn current(&self) -> Option<&Activation> {
        self.activations.last()
    }

    pub fn current_mut(&mut self) -> Option<&mut Activation> {
        self.activations.last_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Activation> {
        self.activations.iter()
    }

    /// Pushes an activation with a fresh, empty locals segment.
    pub fn new_activation(
        &mut self,
        ty: ActivationType,
        return_address: usize,
    ) -> Result<(), ExecutionError> {
        if self.activations.len() >= self.limit {
            return Err(ExecutionError::RecursionLimitExceeded { limit: self.limit });
        }
        log::debug!(
            "enter {ty:?} at depth {} (returns to {return_address})",
            self.activations.len()
        );
        self.activations.push(Activation {
            locals: DataSegment::with_capacity(self.locals_capacity),
            ty,
            return_address,
        });
        Ok(())
    }

    /// Pops the top activation and frees its locals.
    pub fn pop(&mut self) -> Result<Activation, ExecutionError> {
        let activation = self
            .activations
            .pop()
            .ok_or(ExecutionError::EmptyStackAccess)?;
        log::debug!("leave {:?} at depth {}", activation.ty, self.activations.len());
        Ok(activation)
    }

    /// Pops activations down to and including the innermost call, returning
    /// its return address. Scopes still open inside the function are
    /// discarded with it.
    pub fn unwind_call(&mut self) -> Result<usize, ExecutionError> {
        loop {
            let activation = self.pop()?;
            if activation.ty == ActivationType::Call {
                return Ok(activation.return_address);
            }
        }
    }

    /// Locals of the innermost activation.
    pub fn locals(&self) -> Result<&DataSegment, ExecutionError> {
        self.current()
            .map(|activation| &activation.locals)
            .ok_or(ExecutionError::MemoryAccessOutOfBounds { address: 0, size: 0 })
    }

    pub fn locals_mut(&mut self) -> Result<&mut DataSegment, ExecutionError> {
        self.current_mut()
            .map(|activation| &mut activation.locals)
            .ok_or(ExecutionError::MemoryAccessOutOfBounds { address: 0, size: 0 })
    }
}
