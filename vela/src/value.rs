//! Value: a tagged 32-bit payload. The tag decides how the payload is read.
//!
//! Int: two's complement integer
//! Float: IEEE-754 bit pattern, never converted numerically when stored
//! Char: packed bytes, low byte first
//! Array / Object: handles into the array storage table and the heap
use std::fmt;

use crate::ExecutionError;

#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    Int = 0,
    Float = 1,
    Char = 2,
    Array = 3,
    Object = 4,
}

/// Index into the [`ArrayStorage`](crate::ArrayStorage) table.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ArrayHandle(pub u32);

/// Index of a heap block.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub u32);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i32),
    /// raw bits of an `f32`
    Float(u32),
    Char(u32),
    Array(ArrayHandle),
    Object(ObjectHandle),
}

/// The kind an array is committed to. Starts out [`ElementKind::Unassigned`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ElementKind {
    #[default]
    Unassigned,
    Assigned(Kind),
}

impl Kind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Char => "char",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    #[inline]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }
}

impl TryFrom<u32> for Kind {
    type Error = ExecutionError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Int),
            1 => Ok(Self::Float),
            2 => Ok(Self::Char),
            3 => Ok(Self::Array),
            4 => Ok(Self::Object),
            _ => Err(ExecutionError::UndefinedError {
                reason: "unknown kind code",
            }),
        }
    }
}

impl Value {
    #[inline]
    pub fn from_f32(value: f32) -> Self {
        Self::Float(value.to_bits())
    }

    /// Rebuilds a value from a kind and a raw payload, as stored in arrays
    /// and heap blocks.
    #[inline]
    pub const fn from_parts(kind: Kind, payload: u32) -> Self {
        match kind {
            Kind::Int => Self::Int(payload as i32),
            Kind::Float => Self::Float(payload),
            Kind::Char => Self::Char(payload),
            Kind::Array => Self::Array(ArrayHandle(payload)),
            Kind::Object => Self::Object(ObjectHandle(payload)),
        }
    }

    #[inline]
    pub const fn kind(self) -> Kind {
        match self {
            Self::Int(_) => Kind::Int,
            Self::Float(_) => Kind::Float,
            Self::Char(_) => Kind::Char,
            Self::Array(_) => Kind::Array,
            Self::Object(_) => Kind::Object,
        }
    }

    #[inline]
    pub const fn payload(self) -> u32 {
        match self {
            Self::Int(value) => value as u32,
            Self::Float(bits) | Self::Char(bits) => bits,
            Self::Array(handle) => handle.0,
            Self::Object(handle) => handle.0,
        }
    }

    #[inline]
    pub const fn is_numeric(self) -> bool {
        self.kind().is_numeric()
    }

    /// Nonzero payload is true.
    #[inline]
    pub const fn is_truthy(self) -> bool {
        self.payload() != 0
    }

    /// Numeric view used by the ALU. Ints widen, floats are reinterpreted.
    #[inline]
    pub fn as_f32(self) -> Option<f32> {
        match self {
            Self::Int(value) => Some(value as f32),
            Self::Float(bits) => Some(f32::from_bits(bits)),
            _ => None,
        }
    }

    /// Converts `self` into a payload storable under `kind`.
    ///
    /// Int and Float convert into each other (float to int truncates toward
    /// zero), every other mismatch is [`ExecutionError::BadType`].
    pub fn coerce_to(self, kind: Kind) -> Result<u32, ExecutionError> {
        match (kind, self) {
            (kind, value) if value.kind() == kind => Ok(value.payload()),
            (Kind::Int, Self::Float(bits)) => Ok(f32::from_bits(bits) as i32 as u32),
            (Kind::Float, Self::Int(value)) => Ok((value as f32).to_bits()),
            (expected, value) => Err(ExecutionError::BadType {
                expected,
                got: value.kind(),
            }),
        }
    }
}

impl ElementKind {
    #[inline]
    pub const fn kind(self) -> Option<Kind> {
        match self {
            Self::Unassigned => None,
            Self::Assigned(kind) => Some(kind),
        }
    }

    #[inline]
    pub const fn is_char(self) -> bool {
        matches!(self, Self::Assigned(Kind::Char))
    }
}

impl From<Kind> for ElementKind {
    fn from(kind: Kind) -> Self {
        Self::Assigned(kind)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "int {value}"),
            Self::Float(bits) => write!(f, "float {}", f32::from_bits(*bits)),
            Self::Char(bits) => write!(f, "char 0x{bits:08x}"),
            Self::Array(handle) => write!(f, "array #{}", handle.0),
            Self::Object(handle) => write!(f, "object #{}", handle.0),
        }
    }
}
