//! Heap of independently growable byte blocks backing user objects.
//!
//! Every object lives in its own block. A block carries a per-byte kind
//! table next to the raw bytes so a field can be read back with the kind it
//! was written with.
use crate::{ExecutionError, Kind, ObjectHandle, Value};

#[derive(Debug, Clone, Default)]
pub struct HeapBlock {
    data: Vec<u8>,
    table_type: Vec<Option<Kind>>,
}

/// Field layout of a user defined object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSignature {
    fields: Vec<Kind>,
}

#[derive(Debug, Default)]
pub struct Heap {
    blocks: Vec<HeapBlock>,
    // type id each block was allocated for
    block_types: Vec<u32>,
    signatures: Vec<TypeSignature>,
}

fn check_width(size: usize, address: usize) -> Result<(), ExecutionError> {
    if size == 0 || size > 4 {
        return Err(ExecutionError::MemoryAccessOutOfBounds { address, size });
    }
    Ok(())
}

impl HeapBlock {
    /// Declared size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Grows the block to `new_size` bytes. Never shrinks.
    pub fn expand(&mut self, new_size: usize) -> Result<(), ExecutionError> {
        if new_size <= self.data.len() {
            return Ok(());
        }
        let additional = new_size - self.data.len();
        if self.data.try_reserve(additional).is_err()
            || self.table_type.try_reserve(additional).is_err()
        {
            return Err(ExecutionError::UndefinedError {
                reason: "heap block allocation failed",
            });
        }
        self.data.resize(new_size, 0);
        self.table_type.resize(new_size, None);
        Ok(())
    }

    /// Writes the low `size` bytes of `value`, little endian.
    pub fn write(
        &mut self,
        offset: usize,
        value: u32,
        size: usize,
        kind: Kind,
    ) -> Result<(), ExecutionError> {
        check_width(size, offset)?;
        if offset + size > self.data.len() {
            return Err(ExecutionError::MemoryAccessOutOfBounds {
                address: offset,
                size,
            });
        }
        let bytes = value.to_le_bytes();
        self.data[offset..offset + size].copy_from_slice(&bytes[..size]);
        self.table_type[offset..offset + size].fill(Some(kind));
        Ok(())
    }

    pub fn read(&self, offset: usize, size: usize) -> Result<u32, ExecutionError> {
        check_width(size, offset)?;
        if offset + size > self.data.len() {
            return Err(ExecutionError::MemoryAccessOutOfBounds {
                address: offset,
                size,
            });
        }
        let mut bytes = [0u8; 4];
        bytes[..size].copy_from_slice(&self.data[offset..offset + size]);
        Ok(u32::from_le_bytes(bytes))
    }

    /// Kind last written at `offset`, if any.
    pub fn kind_at(&self, offset: usize) -> Option<Kind> {
        self.table_type.get(offset).copied().flatten()
    }
}

impl TypeSignature {
    pub fn new(fields: Vec<Kind>) -> Self {
        Self { fields }
    }

    #[inline]
    pub fn fields(&self) -> &[Kind] {
        &self.fields
    }

    /// Bytes a field of `kind` occupies.
    #[inline]
    pub const fn width(kind: Kind) -> usize {
        match kind {
            Kind::Char => 1,
            _ => 4,
        }
    }

    /// `(offset, width, kind)` of field `index`.
    pub fn field(&self, index: usize) -> Option<(usize, usize, Kind)> {
        let kind = *self.fields.get(index)?;
        let offset = self.fields[..index]
            .iter()
            .map(|&kind| Self::width(kind))
            .sum();
        Some((offset, Self::width(kind), kind))
    }

    pub fn byte_size(&self) -> usize {
        self.fields.iter().map(|&kind| Self::width(kind)).sum()
    }
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Appends an empty block allocated for type `type_id`.
    pub fn add_block(&mut self, type_id: u32) -> Result<ObjectHandle, ExecutionError> {
        if self.blocks.try_reserve(1).is_err() || self.block_types.try_reserve(1).is_err() {
            return Err(ExecutionError::UndefinedError {
                reason: "heap allocation failed",
            });
        }
        let idx = u32::try_from(self.blocks.len()).map_err(|_| {
            ExecutionError::UndefinedError {
                reason: "heap is full",
            }
        })?;
        self.blocks.push(HeapBlock::default());
        self.block_types.push(type_id);
        Ok(ObjectHandle(idx))
    }

    pub fn block(&self, handle: ObjectHandle) -> Result<&HeapBlock, ExecutionError> {
        self.blocks
            .get(handle.0 as usize)
            .ok_or(ExecutionError::UndefinedError {
                reason: "undefined heap block",
            })
    }

    fn block_mut(&mut self, handle: ObjectHandle) -> Result<&mut HeapBlock, ExecutionError> {
        self.blocks
            .get_mut(handle.0 as usize)
            .ok_or(ExecutionError::UndefinedError {
                reason: "undefined heap block",
            })
    }

    /// Writes `size` bytes of `value` at `offset`, expanding the block first
    /// when needed.
    pub fn write(
        &mut self,
        handle: ObjectHandle,
        value: u32,
        offset: usize,
        size: usize,
        kind: Kind,
    ) -> Result<(), ExecutionError> {
        let block = self.block_mut(handle)?;
        check_width(size, offset)?;
        block.expand(offset + size)?;
        block.write(offset, value, size, kind)
    }

    /// Reads `size` bytes at `offset`. Never expands.
    pub fn read(
        &self,
        handle: ObjectHandle,
        offset: usize,
        size: usize,
    ) -> Result<u32, ExecutionError> {
        self.block(handle)?.read(offset, size)
    }

    // ── object types ──────────────────────────────────────────────

    /// Registers a type signature, ids are handed out in order from 0.
    pub fn define_type(&mut self, signature: TypeSignature) -> u32 {
        let id = self.signatures.len() as u32;
        self.signatures.push(signature);
        id
    }

    pub fn signature(&self, type_id: u32) -> Result<&TypeSignature, ExecutionError> {
        self.signatures
            .get(type_id as usize)
            .ok_or(ExecutionError::UndefinedError {
                reason: "undefined object type",
            })
    }

    pub fn type_of(&self, handle: ObjectHandle) -> Result<u32, ExecutionError> {
        self.block_types
            .get(handle.0 as usize)
            .copied()
            .ok_or(ExecutionError::UndefinedError {
                reason: "undefined heap block",
            })
    }

    fn field_of(
        &self,
        handle: ObjectHandle,
        field: usize,
    ) -> Result<(usize, usize, Kind), ExecutionError> {
        let signature = self.signature(self.type_of(handle)?)?;
        signature
            .field(field)
            .ok_or(ExecutionError::MemoryAccessOutOfBounds {
                address: field,
                size: signature.fields().len(),
            })
    }

    /// Allocates an object of `type_id` with `values` as its fields.
    pub fn allocate_object(
        &mut self,
        type_id: u32,
        values: &[Value],
    ) -> Result<ObjectHandle, ExecutionError> {
        let signature = self.signature(type_id)?.clone();
        if values.len() != signature.fields().len() {
            return Err(ExecutionError::UndefinedError {
                reason: "field count does not match object type",
            });
        }
        let handle = self.add_block(type_id)?;
        self.block_mut(handle)?.expand(signature.byte_size())?;
        for (index, &value) in values.iter().enumerate() {
            self.store_field(handle, index, value)?;
        }
        Ok(handle)
    }

    /// Stores `value` into `field`, coerced to the declared field kind.
    pub fn store_field(
        &mut self,
        handle: ObjectHandle,
        field: usize,
        value: Value,
    ) -> Result<(), ExecutionError> {
        let (offset, width, kind) = self.field_of(handle, field)?;
        let payload = value.coerce_to(kind)?;
        self.write(handle, payload, offset, width, kind)
    }

    pub fn load_field(&self, handle: ObjectHandle, field: usize) -> Result<Value, ExecutionError> {
        let (offset, width, kind) = self.field_of(handle, field)?;
        let payload = self.read(handle, offset, width)?;
        Ok(Value::from_parts(kind, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_expands_and_read_round_trips() {
        let mut heap = Heap::new();
        let block = heap.add_block(0).unwrap();
        heap.write(block, 0xDEAD_BEEF, 2, 4, Kind::Int).unwrap();
        assert_eq!(heap.block(block).unwrap().size(), 6);
        assert_eq!(heap.read(block, 2, 4), Ok(0xDEAD_BEEF));
        assert_eq!(heap.read(block, 2, 2), Ok(0xBEEF));
        assert_eq!(heap.block(block).unwrap().kind_at(3), Some(Kind::Int));
    }

    #[test]
    fn read_past_declared_size_fails_without_mutating() {
        let mut heap = Heap::new();
        let block = heap.add_block(0).unwrap();
        heap.write(block, 7, 0, 1, Kind::Char).unwrap();
        assert_eq!(
            heap.read(block, 0, 4),
            Err(ExecutionError::MemoryAccessOutOfBounds { address: 0, size: 4 })
        );
        assert_eq!(heap.block(block).unwrap().size(), 1);
    }

    #[test]
    fn block_write_does_not_expand() {
        let mut block = HeapBlock::default();
        assert!(block.write(0, 1, 4, Kind::Int).is_err());
        block.expand(4).unwrap();
        block.expand(2).unwrap();
        assert_eq!(block.size(), 4);
        assert!(block.write(0, 1, 4, Kind::Int).is_ok());
    }

    #[test]
    fn invalid_block_index_is_undefined() {
        let mut heap = Heap::new();
        assert!(matches!(
            heap.write(ObjectHandle(0), 1, 0, 4, Kind::Int),
            Err(ExecutionError::UndefinedError { .. })
        ));
        assert!(matches!(
            heap.read(ObjectHandle(9), 0, 4),
            Err(ExecutionError::UndefinedError { .. })
        ));
    }

    #[test]
    fn objects_lay_out_fields_by_width() {
        let mut heap = Heap::new();
        let point = heap.define_type(TypeSignature::new(vec![
            Kind::Int,
            Kind::Char,
            Kind::Float,
        ]));
        let obj = heap
            .allocate_object(point, &[
                Value::Int(-4),
                Value::Char(u32::from(b'p')),
                Value::Int(2),
            ])
            .unwrap();

        assert_eq!(heap.block(obj).unwrap().size(), 9);
        assert_eq!(heap.load_field(obj, 0), Ok(Value::Int(-4)));
        assert_eq!(heap.load_field(obj, 1), Ok(Value::Char(u32::from(b'p'))));
        assert_eq!(heap.load_field(obj, 2), Ok(Value::from_f32(2.0)));

        assert_eq!(
            heap.store_field(obj, 0, Value::Char(1)),
            Err(ExecutionError::BadType {
                expected: Kind::Int,
                got: Kind::Char
            })
        );
        assert!(matches!(
            heap.load_field(obj, 3),
            Err(ExecutionError::MemoryAccessOutOfBounds { .. })
        ));
    }
}
