//! Polymorphic arithmetic operators.
//!
//! Each operator dispatches on the runtime pair of operand variants. Only the
//! listed combinations are legal; everything else is a type error naming both
//! operand types. Undefined operands produce [`Value::Undefined`].

use crate::error::{CypherError, Result};
use crate::values::temporal::plus_duration;
use crate::values::Value;

/// `lhs + rhs`. The first matching rule wins:
///
/// 1. number + number
/// 2. list + list (concatenation), list + value (append), value + list (prepend)
/// 3. text + text
/// 4. text + printable scalar, either side
/// 5. temporal + duration, duration + temporal, duration + duration
pub fn add(lhs: &Value, rhs: &Value) -> Result<Value> {
    use Value::*;
    Ok(match (lhs, rhs) {
        (Undefined, _) | (_, Undefined) => Undefined,
        (Integer(a), Integer(b)) => {
            Integer(a.checked_add(*b).ok_or_else(|| CypherError::overflow("addition"))?)
        }
        (Integer(_) | Float(_), Integer(_) | Float(_)) => Float(float(lhs) + float(rhs)),
        (List(a), List(b)) => List(a.concat(b)),
        (List(a), other) => List(a.clone().append(other.clone())),
        (other, List(b)) => List(b.prepend(other.clone())),
        (Text(a), Text(b)) => {
            let mut joined = String::with_capacity(a.len() + b.len());
            joined.push_str(a);
            joined.push_str(b);
            Value::text(joined)
        }
        (Text(a), other) if other.pretty_print().is_some() => {
            Value::text(format!("{a}{}", other.pretty_print().unwrap_or_default()))
        }
        (other, Text(b)) if other.pretty_print().is_some() => {
            Value::text(format!("{}{b}", other.pretty_print().unwrap_or_default()))
        }
        (Duration(a), Duration(b)) => Duration(a.checked_add(b)?),
        (t, Duration(d)) if t.is_temporal() => plus_duration(t, d)?,
        (Duration(d), t) if t.is_temporal() => plus_duration(t, d)?,
        _ => return Err(mismatch("+", lhs, rhs)),
    })
}

/// `lhs - rhs`: number - number, temporal - duration, duration - duration.
pub fn subtract(lhs: &Value, rhs: &Value) -> Result<Value> {
    use Value::*;
    Ok(match (lhs, rhs) {
        (Undefined, _) | (_, Undefined) => Undefined,
        (Integer(a), Integer(b)) => {
            Integer(a.checked_sub(*b).ok_or_else(|| CypherError::overflow("subtraction"))?)
        }
        (Integer(_) | Float(_), Integer(_) | Float(_)) => Float(float(lhs) - float(rhs)),
        (Duration(a), Duration(b)) => Duration(a.checked_sub(b)?),
        (t, Duration(d)) if t.is_temporal() => plus_duration(t, &d.checked_neg()?)?,
        _ => return Err(mismatch("-", lhs, rhs)),
    })
}

/// `lhs * rhs`: number * number, duration * number in either order.
pub fn multiply(lhs: &Value, rhs: &Value) -> Result<Value> {
    use Value::*;
    Ok(match (lhs, rhs) {
        (Undefined, _) | (_, Undefined) => Undefined,
        (Integer(a), Integer(b)) => {
            Integer(a.checked_mul(*b).ok_or_else(|| CypherError::overflow("multiplication"))?)
        }
        (Integer(_) | Float(_), Integer(_) | Float(_)) => Float(float(lhs) * float(rhs)),
        (Duration(d), n) | (n, Duration(d)) if n.is_number() => Duration(d.mul(n)?),
        _ => return Err(mismatch("*", lhs, rhs)),
    })
}

/// `lhs / rhs`: number / number, duration / number.
///
/// Integer division truncates toward zero. An integer zero divisor is an
/// arithmetic error, raised before undefined operands are considered.
pub fn divide(lhs: &Value, rhs: &Value) -> Result<Value> {
    use Value::*;
    if matches!(rhs, Integer(0)) && !matches!(lhs, Float(_)) {
        return Err(CypherError::division_by_zero());
    }
    Ok(match (lhs, rhs) {
        (Undefined, _) | (_, Undefined) => Undefined,
        (Integer(a), Integer(b)) => {
            Integer(a.checked_div(*b).ok_or_else(|| CypherError::overflow("division"))?)
        }
        (Integer(_) | Float(_), Integer(_) | Float(_)) => Float(float(lhs) / float(rhs)),
        (Duration(d), n) if n.is_number() => Duration(d.div(n)?),
        _ => return Err(mismatch("/", lhs, rhs)),
    })
}

/// Eager divide-by-zero check for callers that short-circuit undefined
/// operands themselves.
///
/// Fails when `rhs` is the integer zero, whatever `lhs` is; otherwise reports
/// whether either operand is undefined.
pub fn divide_check_for_null(lhs: &Value, rhs: &Value) -> Result<bool> {
    if matches!(rhs, Value::Integer(0)) {
        return Err(CypherError::division_by_zero());
    }
    Ok(lhs.is_undefined() || rhs.is_undefined())
}

/// `lhs % rhs`: integer modulo for two integers, float modulo otherwise.
pub fn modulo(lhs: &Value, rhs: &Value) -> Result<Value> {
    use Value::*;
    Ok(match (lhs, rhs) {
        (Undefined, _) | (_, Undefined) => Undefined,
        (Integer(_), Integer(0)) => return Err(CypherError::division_by_zero()),
        // i64::MIN % -1 overflows in two's complement; the mathematical result is 0.
        (Integer(a), Integer(b)) => Integer(a.checked_rem(*b).unwrap_or(0)),
        (Integer(_) | Float(_), Integer(_) | Float(_)) => Float(float(lhs) % float(rhs)),
        _ => return Err(mismatch("%", lhs, rhs)),
    })
}

/// `lhs ^ rhs`, always a float.
pub fn pow(lhs: &Value, rhs: &Value) -> Result<Value> {
    use Value::*;
    Ok(match (lhs, rhs) {
        (Undefined, _) | (_, Undefined) => Undefined,
        (Integer(_) | Float(_), Integer(_) | Float(_)) => Float(float(lhs).powf(float(rhs))),
        _ => return Err(mismatch("^", lhs, rhs)),
    })
}

/// Unary minus.
pub fn negate(value: &Value) -> Result<Value> {
    Ok(match value {
        Value::Undefined => Value::Undefined,
        Value::Integer(i) => {
            Value::Integer(i.checked_neg().ok_or_else(|| CypherError::overflow("negation"))?)
        }
        Value::Float(f) => Value::Float(-f),
        Value::Duration(d) => Value::Duration(d.checked_neg()?),
        other => {
            return Err(CypherError::type_error(format!(
                "cannot negate a value of type {}",
                other.type_name()
            )))
        }
    })
}

fn float(value: &Value) -> f64 {
    value.as_f64().unwrap_or(f64::NAN)
}

fn mismatch(op: &str, lhs: &Value, rhs: &Value) -> CypherError {
    CypherError::type_mismatch(op, &lhs.type_name(), &rhs.type_name())
}
