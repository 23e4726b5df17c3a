use crate::{ExecutionError, Kind, Value};

/// Operators routed through the ALU when both operands are numeric.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    /// unary, the right operand is always `Int(0)`
    Not,
    Eq,
    Neq,
    Lt,
    Gt,
    Le,
    Ge,
}

// the three units an operator can run on
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Unit {
    Arithmetic(Arithmetic),
    Comparison(Comparison),
    Logic(Logic),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Arithmetic {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Comparison {
    Eq,
    Neq,
    Lt,
    Gt,
    Le,
    Ge,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Logic {
    And,
    Or,
    Not,
}

impl BinaryOp {
    #[inline]
    pub const fn is_unary(self) -> bool {
        matches!(self, Self::Not)
    }

    const fn unit(self) -> Unit {
        match self {
            Self::Add => Unit::Arithmetic(Arithmetic::Add),
            Self::Sub => Unit::Arithmetic(Arithmetic::Sub),
            Self::Mul => Unit::Arithmetic(Arithmetic::Mul),
            Self::Div => Unit::Arithmetic(Arithmetic::Div),
            Self::Mod => Unit::Arithmetic(Arithmetic::Mod),
            Self::Eq => Unit::Comparison(Comparison::Eq),
            Self::Neq => Unit::Comparison(Comparison::Neq),
            Self::Lt => Unit::Comparison(Comparison::Lt),
            Self::Gt => Unit::Comparison(Comparison::Gt),
            Self::Le => Unit::Comparison(Comparison::Le),
            Self::Ge => Unit::Comparison(Comparison::Ge),
            Self::And => Unit::Logic(Logic::And),
            Self::Or => Unit::Logic(Logic::Or),
            Self::Not => Unit::Logic(Logic::Not),
        }
    }
}

/// Evaluates `left op right`.
///
/// Int op Int stays integral (wrapping), any Float operand promotes the
/// operation to `f32`. Comparisons and logic always produce `Int` 0 or 1.
pub fn evaluate(
    op: BinaryOp,
    left: Value,
    right: Value,
) -> Result<Value, ExecutionError> {
    for operand in [left, right] {
        if !operand.is_numeric() {
            return Err(ExecutionError::BadType {
                expected: Kind::Int,
                got: operand.kind(),
            });
        }
    }

    match (op.unit(), left, right) {
        (Unit::Logic(op), _, _) => Ok(logic_unit(op, left, right)),
        (Unit::Arithmetic(op), Value::Int(a), Value::Int(b)) => int_alu(op, a, b),
        (Unit::Comparison(op), Value::Int(a), Value::Int(b)) => Ok(compare(op, a, b)),
        (unit, _, _) => {
            // both operands were checked numeric above
            let a = left.as_f32().unwrap_or_default();
            let b = right.as_f32().unwrap_or_default();
            Ok(match unit {
                Unit::Arithmetic(op) => float_alu(op, a, b),
                Unit::Comparison(op) => compare(op, a, b),
                Unit::Logic(op) => logic_unit(op, left, right),
            })
        }
    }
}

fn bool_value(value: bool) -> Value {
    Value::Int(i32::from(value))
}

fn logic_unit(op: Logic, left: Value, right: Value) -> Value {
    let (a, b) = (left.is_truthy(), right.is_truthy());
    bool_value(match op {
        Logic::And => a && b,
        Logic::Or => a || b,
        Logic::Not => !a,
    })
}

fn compare<T: PartialOrd>(op: Comparison, a: T, b: T) -> Value {
    bool_value(match op {
        Comparison::Eq => a == b,
        Comparison::Neq => a != b,
        Comparison::Lt => a < b,
        Comparison::Gt => a > b,
        Comparison::Le => a <= b,
        Comparison::Ge => a >= b,
    })
}

fn int_alu(op: Arithmetic, a: i32, b: i32) -> Result<Value, ExecutionError> {
    let res = match op {
        Arithmetic::Add => a.wrapping_add(b),
        Arithmetic::Sub => a.wrapping_sub(b),
        Arithmetic::Mul => a.wrapping_mul(b),
        Arithmetic::Div | Arithmetic::Mod if b == 0 => {
            return Err(ExecutionError::DivisionByZero);
        }
        Arithmetic::Div => a.wrapping_div(b),
        Arithmetic::Mod => a.wrapping_rem(b),
    };
    Ok(Value::Int(res))
}

fn float_alu(op: Arithmetic, a: f32, b: f32) -> Value {
    Value::from_f32(match op {
        Arithmetic::Add => a + b,
        Arithmetic::Sub => a - b,
        Arithmetic::Mul => a * b,
        Arithmetic::Div => a / b,
        // fmod semantics
        Arithmetic::Mod => a % b,
    })
}
