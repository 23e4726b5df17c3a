//! Array storage table: the arena owning every live array and string.
//!
//! Values refer to arrays by [`ArrayHandle`] only. Handles are handed out
//! in increasing order and never reused, there is no reclamation.
use crate::{ArrayHandle, DynamicArray, ExecutionError};

#[derive(Debug, Default)]
pub struct ArrayStorage {
    arrays: Vec<DynamicArray>,
}

impl ArrayStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// One past the highest handle in use.
    #[inline]
    pub fn pointer(&self) -> usize {
        self.arrays.len()
    }

    pub fn allocate(&mut self, array: DynamicArray) -> ArrayHandle {
        let idx = u32::try_from(self.arrays.len()).unwrap_or(u32::MAX);
        self.arrays.push(array);
        ArrayHandle(idx)
    }

    pub fn get(&self, handle: ArrayHandle) -> Result<&DynamicArray, ExecutionError> {
        self.arrays
            .get(handle.0 as usize)
            .ok_or(ExecutionError::UndefinedError {
                reason: "dangling array handle",
            })
    }

    pub fn get_mut(
        &mut self,
        handle: ArrayHandle,
    ) -> Result<&mut DynamicArray, ExecutionError> {
        self.arrays
            .get_mut(handle.0 as usize)
            .ok_or(ExecutionError::UndefinedError {
                reason: "dangling array handle",
            })
    }

    /// Appends every element of `right` onto `left`. `left` keeps its
    /// handle.
    pub fn concat(
        &mut self,
        left: ArrayHandle,
        right: ArrayHandle,
    ) -> Result<(), ExecutionError> {
        // `x + x` reads and writes the same array
        let right = self.get(right)?.clone();
        self.get_mut(left)?.extend_from(&right)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ArrayHandle, &DynamicArray)> {
        self.arrays
            .iter()
            .enumerate()
            .map(|(idx, array)| (ArrayHandle(idx as u32), array))
    }
}
