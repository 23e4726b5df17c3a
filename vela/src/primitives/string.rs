use crate::{DynamicArray, ExecutionError, ExecutionResult, Kind, PrimitiveContext, Value, format};

fn fold_case(
    ctx: &mut PrimitiveContext,
    fold: fn(u8) -> u8,
) -> Result<ExecutionResult, ExecutionError> {
    let array = ctx.interpreter.arrays.get(ctx.receiver)?;
    if !array.is_char() {
        ctx.interpreter.stack.push(Value::Array(ctx.receiver))?;
        return Ok(ExecutionResult::Normal);
    }
    let folded = array.map_chars(fold);
    ctx.interpreter.push_array(folded)?;
    Ok(ExecutionResult::Normal)
}

// ( -- string ) | rec: array
pub fn lower(ctx: &mut PrimitiveContext) -> Result<ExecutionResult, ExecutionError> {
    fold_case(ctx, |byte| byte.to_ascii_lowercase())
}

// ( -- string ) | rec: array
pub fn upper(ctx: &mut PrimitiveContext) -> Result<ExecutionResult, ExecutionError> {
    fold_case(ctx, |byte| byte.to_ascii_uppercase())
}

// ( -- string ) | rec: array
pub fn to_string(ctx: &mut PrimitiveContext) -> Result<ExecutionResult, ExecutionError> {
    let storage = &ctx.interpreter.arrays;
    let array = storage.get(ctx.receiver)?;
    if array.is_char() {
        ctx.interpreter.stack.push(Value::Array(ctx.receiver))?;
        return Ok(ExecutionResult::Normal);
    }

    let mut text = DynamicArray::with_kind(Kind::Char, 4);
    format::push_array(storage, array, &mut text)?;
    ctx.interpreter.push_array(text)?;
    Ok(ExecutionResult::Normal)
}
