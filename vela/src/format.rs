//! Text rendering straight into packed Char arrays.
//!
//! Numbers are emitted digit by digit through [`DynamicArray::push_char`],
//! so they interleave with whatever characters the target already holds.
use crate::{ArrayHandle, ArrayStorage, DynamicArray, ExecutionError, Kind, Value};

// nested list rendering gives up past this depth (self-referencing lists)
const MAX_RENDER_DEPTH: usize = 64;
// fractional digits stop once the remainder drops below this
const FRACTION_EPSILON: f32 = 0.0001;
const MAX_FRACTION_DIGITS: usize = 8;

pub fn push_int(array: &mut DynamicArray, value: i32) {
    let mut magnitude = i64::from(value);
    if magnitude < 0 {
        array.push_char(b'-');
        magnitude = -magnitude;
    }

    let mut digits = [0u8; 10];
    let mut count = 0;
    loop {
        digits[count] = b'0' + (magnitude % 10) as u8;
        count += 1;
        magnitude /= 10;
        if magnitude == 0 {
            break;
        }
    }

    for &digit in digits[..count].iter().rev() {
        array.push_char(digit);
    }
}

/// Fixed-point rendering of the float whose bit pattern is `bits`.
pub fn push_float(array: &mut DynamicArray, bits: u32) {
    let mut value = f32::from_bits(bits);
    if value < 0.0 {
        array.push_char(b'-');
        value = -value;
    }

    let integer = value as i32;
    let mut fraction = value - integer as f32;
    push_int(array, integer);

    if fraction > 0.0 {
        array.push_char(b'.');
        for _ in 0..MAX_FRACTION_DIGITS {
            if fraction <= FRACTION_EPSILON {
                break;
            }
            fraction *= 10.0;
            let digit = (fraction as i32).clamp(0, 9);
            array.push_char(b'0' + digit as u8);
            fraction -= digit as f32;
        }
    }
}

/// Appends a scalar as text. Chars are copied as they are.
pub fn push_scalar(array: &mut DynamicArray, value: Value) -> Result<(), ExecutionError> {
    match value {
        Value::Int(value) => push_int(array, value),
        Value::Float(bits) => push_float(array, bits),
        Value::Char(packed) => array.push_packed(packed),
        other => {
            return Err(ExecutionError::BadType {
                expected: Kind::Char,
                got: other.kind(),
            });
        }
    }
    Ok(())
}

/// Renders `array` as `[a,b,c]`, recursing into nested arrays.
///
/// Char arrays are copied verbatim, objects cannot be rendered.
pub fn push_array(
    storage: &ArrayStorage,
    array: &DynamicArray,
    out: &mut DynamicArray,
) -> Result<(), ExecutionError> {
    push_array_at_depth(storage, array, out, 0)
}

fn push_array_at_depth(
    storage: &ArrayStorage,
    array: &DynamicArray,
    out: &mut DynamicArray,
    depth: usize,
) -> Result<(), ExecutionError> {
    if depth > MAX_RENDER_DEPTH {
        return Err(ExecutionError::UnsupportedSerialization {
            kind: Kind::Array,
        });
    }
    if array.is_char() {
        for byte in array.chars() {
            out.push_char(byte);
        }
        return Ok(());
    }

    out.push_char(b'[');
    let kind = array.kind().kind();
    for (i, payload) in array.elements().enumerate() {
        if i > 0 {
            out.push_char(b',');
        }
        match kind {
            Some(Kind::Int) => push_int(out, payload as i32),
            Some(Kind::Float) => push_float(out, payload),
            Some(Kind::Char) => out.push_packed(payload),
            Some(Kind::Array) => {
                let nested = storage.get(ArrayHandle(payload))?;
                push_array_at_depth(storage, nested, out, depth + 1)?;
            }
            Some(Kind::Object) => {
                return Err(ExecutionError::UnsupportedSerialization {
                    kind: Kind::Object,
                });
            }
            None => {}
        }
    }
    out.push_char(b']');
    Ok(())
}

/// Text of any value, the way `print` shows it.
pub fn render(storage: &ArrayStorage, value: Value) -> Result<String, ExecutionError> {
    let mut out = DynamicArray::with_kind(Kind::Char, 4);
    match value {
        Value::Array(handle) => push_array(storage, storage.get(handle)?, &mut out)?,
        Value::Object(handle) => return Ok(format!("<object #{}>", handle.0)),
        scalar => push_scalar(&mut out, scalar)?,
    }
    Ok(out.text())
}
