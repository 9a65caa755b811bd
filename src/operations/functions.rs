//! The pure part of the Cypher function library.
//!
//! Functions validate their operand variants and raise a type error naming
//! the function otherwise. Callers filter [`Value::Undefined`] before calling
//! unless a function documents how it treats it. Functions that need graph
//! access live in [`super::entity`].

use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode};
use num_traits::ToPrimitive;

use crate::error::{CypherError, Result};
use crate::operations::boolean::as_list;
use crate::values::{ListValue, PointValue, Value};

fn number(function: &str, value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| CypherError::needs_numbers(&format!("{function}()")))
}

fn int_arg(function: &str, what: &str, value: &Value) -> Result<i64> {
    value.as_i64().ok_or_else(|| {
        CypherError::type_error(format!(
            "Invalid input for {what} value in function '{function}()': Expected a numeric value but got: {value}"
        ))
    })
}

fn text<'v>(function: &str, value: &'v Value) -> Result<&'v str> {
    value
        .as_str()
        .ok_or_else(|| CypherError::not_a_string(function, value))
}

fn float_fn(function: &str, value: &Value, f: impl FnOnce(f64) -> f64) -> Result<Value> {
    Ok(Value::Float(f(number(function, value)?)))
}

/// `sin(x)`.
pub fn sin(value: &Value) -> Result<Value> {
    float_fn("sin", value, f64::sin)
}

/// `cos(x)`.
pub fn cos(value: &Value) -> Result<Value> {
    float_fn("cos", value, f64::cos)
}

/// `tan(x)`.
pub fn tan(value: &Value) -> Result<Value> {
    float_fn("tan", value, f64::tan)
}

/// `cot(x)`.
pub fn cot(value: &Value) -> Result<Value> {
    float_fn("cot", value, |x| 1.0 / x.tan())
}

/// `asin(x)`.
pub fn asin(value: &Value) -> Result<Value> {
    float_fn("asin", value, f64::asin)
}

/// `acos(x)`.
pub fn acos(value: &Value) -> Result<Value> {
    float_fn("acos", value, f64::acos)
}

/// `atan(x)`.
pub fn atan(value: &Value) -> Result<Value> {
    float_fn("atan", value, f64::atan)
}

/// `atan2(y, x)`.
pub fn atan2(y: &Value, x: &Value) -> Result<Value> {
    Ok(Value::Float(number("atan2", y)?.atan2(number("atan2", x)?)))
}

/// `haversin(x)`, half the versine.
pub fn haversin(value: &Value) -> Result<Value> {
    float_fn("haversin", value, |x| (1.0 - x.cos()) / 2.0)
}

/// `ceil(x)`.
pub fn ceil(value: &Value) -> Result<Value> {
    float_fn("ceil", value, f64::ceil)
}

/// `floor(x)`.
pub fn floor(value: &Value) -> Result<Value> {
    float_fn("floor", value, f64::floor)
}

/// `sqrt(x)`.
pub fn sqrt(value: &Value) -> Result<Value> {
    float_fn("sqrt", value, f64::sqrt)
}

/// `exp(x)`.
pub fn exp(value: &Value) -> Result<Value> {
    float_fn("exp", value, f64::exp)
}

/// `log(x)`, the natural logarithm.
pub fn log(value: &Value) -> Result<Value> {
    float_fn("log", value, f64::ln)
}

/// `log10(x)`.
pub fn log10(value: &Value) -> Result<Value> {
    float_fn("log10", value, f64::log10)
}

/// `toDegrees(x)`.
pub fn to_degrees(value: &Value) -> Result<Value> {
    float_fn("toDegrees", value, f64::to_degrees)
}

/// `toRadians(x)`.
pub fn to_radians(value: &Value) -> Result<Value> {
    float_fn("toRadians", value, f64::to_radians)
}

/// `signum(x)` as an integer.
pub fn signum(value: &Value) -> Result<Value> {
    Ok(match value {
        Value::Integer(i) => Value::Integer(i.signum()),
        other => {
            let f = number("signum", other)?;
            Value::Integer(if f > 0.0 {
                1
            } else if f < 0.0 {
                -1
            } else {
                0
            })
        }
    })
}

/// `abs(x)`, preserving integer-ness.
pub fn abs(value: &Value) -> Result<Value> {
    match value {
        Value::Integer(i) => i
            .checked_abs()
            .map(Value::Integer)
            .ok_or_else(|| CypherError::overflow("abs")),
        other => float_fn("abs", other, f64::abs),
    }
}

/// `e()`.
pub fn e() -> Value {
    Value::Float(std::f64::consts::E)
}

/// `pi()`.
pub fn pi() -> Value {
    Value::Float(std::f64::consts::PI)
}

/// `rand()`: uniform in `[0, 1)`.
pub fn rand() -> Value {
    Value::Float(rand::random::<f64>())
}

/// `randomUUID()`.
pub fn random_uuid() -> Value {
    Value::text(uuid::Uuid::new_v4().to_string())
}

/// `round(x)`: nearest integer, ties toward positive infinity.
pub fn round(value: &Value) -> Result<Value> {
    round_with(value, &Value::Integer(0), None)
}

/// `round(x, precision)` with half-up rounding.
pub fn round_with_precision(value: &Value, precision: &Value) -> Result<Value> {
    round_with(value, precision, None)
}

/// `round(x, precision, mode)` with an explicit rounding mode:
/// `CEILING`, `FLOOR`, `UP`, `DOWN`, `HALF_EVEN`, `HALF_UP`, `HALF_DOWN` or
/// `UNNECESSARY`.
pub fn round_with_mode(value: &Value, precision: &Value, mode: &Value) -> Result<Value> {
    let mode = match mode {
        Value::Text(name) => name.clone(),
        other => {
            return Err(CypherError::type_error(format!(
                "Expected a string value for `round`, but got: {other}."
            )))
        }
    };
    round_with(value, precision, Some(&*mode))
}

fn round_with(value: &Value, precision: &Value, mode: Option<&str>) -> Result<Value> {
    let parsed_mode = match mode {
        None => None,
        Some(name) => Some(parse_rounding_mode(name)?),
    };
    let (x, precision) = match (value.as_f64(), precision.as_i64()) {
        (Some(x), Some(p)) => (x, p),
        _ => return Err(CypherError::needs_numbers("round()")),
    };
    if precision < 0 {
        return Err(CypherError::invalid_argument(
            "Precision argument to 'round()' cannot be negative",
        ));
    }
    if precision == 0 && parsed_mode.is_none() {
        return Ok(Value::Float(round_half_up(x)));
    }
    // Decimal rounding only makes sense for finite inputs.
    let Ok(decimal) = BigDecimal::from_str(&format!("{x}")) else {
        return Ok(Value::Float(x));
    };
    let (_, scale) = decimal.as_bigint_and_exponent();
    let new_scale = scale.min(precision);
    let rounded = match parsed_mode {
        Some(Some(mode)) => decimal.with_scale_round(new_scale, mode),
        Some(None) => {
            let truncated = decimal.with_scale(new_scale);
            if truncated != decimal {
                return Err(CypherError::arithmetic("Rounding necessary"));
            }
            truncated
        }
        None => decimal.with_scale_round(new_scale, RoundingMode::HalfUp),
    };
    Ok(Value::Float(rounded.to_string().parse::<f64>().unwrap_or(x)))
}

/// Nearest integer with ties toward positive infinity, saturating at the
/// `i64` range. NaN rounds to zero.
fn round_half_up(x: f64) -> f64 {
    let floor = x.floor();
    let rounded = if x - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded as i64 as f64
}

/// `None` stands for `UNNECESSARY`.
fn parse_rounding_mode(name: &str) -> Result<Option<RoundingMode>> {
    Ok(Some(match name {
        "CEILING" => RoundingMode::Ceiling,
        "FLOOR" => RoundingMode::Floor,
        "UP" => RoundingMode::Up,
        "DOWN" => RoundingMode::Down,
        "HALF_EVEN" => RoundingMode::HalfEven,
        "HALF_UP" => RoundingMode::HalfUp,
        "HALF_DOWN" => RoundingMode::HalfDown,
        "UNNECESSARY" => return Ok(None),
        _ => {
            return Err(CypherError::invalid_argument(
                "Unknown rounding mode. Valid values are: CEILING, FLOOR, UP, DOWN, HALF_EVEN, HALF_UP, HALF_DOWN, UNNECESSARY.",
            ))
        }
    }))
}

/// `range(start, end)`.
pub fn range(start: &Value, end: &Value) -> Result<Value> {
    range_with_step(start, end, &Value::Integer(1))
}

/// `range(start, end, step)`: a lazy inclusive integer sequence.
pub fn range_with_step(start: &Value, end: &Value, step: &Value) -> Result<Value> {
    let start = int_arg("range", "start", start)?;
    let end = int_arg("range", "end", end)?;
    let step = int_arg("range", "step", step)?;
    if step == 0 {
        return Err(CypherError::invalid_argument("step argument to range() can't be 0"));
    }
    Ok(Value::List(ListValue::range(start, end, step)?))
}

/// `head(list)`: first element or undefined.
pub fn head(container: &Value) -> Result<Value> {
    let list = sequence("head", container)?;
    Ok(list.get(0).unwrap_or(Value::Undefined))
}

/// `last(list)`: last element or undefined.
pub fn last(container: &Value) -> Result<Value> {
    let list = sequence("last", container)?;
    Ok(list
        .len()
        .checked_sub(1)
        .and_then(|idx| list.get(idx))
        .unwrap_or(Value::Undefined))
}

/// `tail(list)`: everything but the first element; non-lists give `[]`.
pub fn tail(container: &Value) -> Value {
    match container {
        Value::List(list) => Value::List(list.tail()),
        _ => Value::List(ListValue::empty()),
    }
}

fn sequence(function: &str, value: &Value) -> Result<ListValue> {
    match value {
        Value::List(list) => Ok(list.clone()),
        other => Err(CypherError::type_error(format!(
            "Invalid input for function '{function}()': Expected {other} to be a list"
        ))),
    }
}

/// `size(x)`: characters of a text, elements of a list, `1` for other scalars.
///
/// Paths are rejected; use [`length`].
pub fn size(item: &Value) -> Result<Value> {
    Ok(Value::Integer(match item {
        Value::Text(s) => s.chars().count() as i64,
        Value::List(list) => list.len() as i64,
        Value::Path(_) | Value::Map(_) | Value::Node(_) | Value::Relationship(_) | Value::Undefined => {
            return Err(CypherError::type_error(format!(
                "Invalid input for function 'size()': Expected a String or List, got: {item}"
            )))
        }
        _ => 1,
    }))
}

/// `length(x)`: relationships of a path; otherwise as [`size`].
pub fn length(item: &Value) -> Result<Value> {
    match item {
        Value::Path(path) => Ok(Value::Integer(path.length() as i64)),
        Value::Map(_) | Value::Node(_) | Value::Relationship(_) | Value::Undefined => {
            Err(CypherError::type_error(format!(
                "Invalid input for function 'length()': Expected a Path, String or List, got: {item}"
            )))
        }
        other => size(other),
    }
}

/// `isEmpty(x)` for lists, maps and text.
pub fn is_empty(item: &Value) -> Result<Value> {
    Ok(Value::Boolean(match item {
        Value::List(list) => list.is_empty(),
        Value::Map(map) => map.is_empty(),
        Value::Text(s) => s.is_empty(),
        other => {
            return Err(CypherError::type_error(format!(
                "Invalid input for function 'isEmpty()': Expected a List, Map, or String, got: {other}"
            )))
        }
    }))
}

/// `reverse(x)` for text and lists.
pub fn reverse(original: &Value) -> Result<Value> {
    match original {
        Value::Text(s) => Ok(Value::text(s.chars().rev().collect::<String>())),
        Value::List(list) => Ok(Value::List(list.reverse())),
        _ => Err(CypherError::type_error(
            "Invalid input for function 'reverse()': Expected a string or a list; consider converting the value to a string with toString() or creating a list.",
        )),
    }
}

/// `left(text, n)`: the first `n` characters.
pub fn left(original: &Value, length: &Value) -> Result<Value> {
    let s = text("left", original)?;
    let n = int_arg("left", "length", length)?;
    if n < 0 {
        return Err(CypherError::invalid_argument("negative length"));
    }
    Ok(Value::text(s.chars().take(n as usize).collect::<String>()))
}

/// `right(text, n)`: the last `n` characters.
pub fn right(original: &Value, length: &Value) -> Result<Value> {
    let s = text("right", original)?;
    let n = int_arg("right", "length", length)?;
    if n < 0 {
        return Err(CypherError::invalid_argument("negative length"));
    }
    let count = s.chars().count();
    let skip = count.saturating_sub(n as usize);
    Ok(Value::text(s.chars().skip(skip).collect::<String>()))
}

/// `substring(text, start)`.
pub fn substring(original: &Value, start: &Value) -> Result<Value> {
    let s = text("substring", original)?;
    let start = non_negative("substring", "start", start)?;
    Ok(Value::text(s.chars().skip(start).collect::<String>()))
}

/// `substring(text, start, length)`.
pub fn substring_with_length(original: &Value, start: &Value, length: &Value) -> Result<Value> {
    let s = text("substring", original)?;
    let start = non_negative("substring", "start", start)?;
    let length = non_negative("substring", "length", length)?;
    Ok(Value::text(s.chars().skip(start).take(length).collect::<String>()))
}

fn non_negative(function: &str, what: &str, value: &Value) -> Result<usize> {
    let n = int_arg(function, what, value)?;
    usize::try_from(n).map_err(|_| {
        CypherError::invalid_argument(format!("negative {what} in function '{function}()': {n}"))
    })
}

/// `trim(text)`.
pub fn trim(value: &Value) -> Result<Value> {
    Ok(Value::text(text("trim", value)?.trim()))
}

/// `ltrim(text)`.
pub fn ltrim(value: &Value) -> Result<Value> {
    Ok(Value::text(text("ltrim", value)?.trim_start()))
}

/// `rtrim(text)`.
pub fn rtrim(value: &Value) -> Result<Value> {
    Ok(Value::text(text("rtrim", value)?.trim_end()))
}

/// `toLower(text)`.
pub fn to_lower(value: &Value) -> Result<Value> {
    Ok(Value::text(text("toLower", value)?.to_lowercase()))
}

/// `toUpper(text)`.
pub fn to_upper(value: &Value) -> Result<Value> {
    Ok(Value::text(text("toUpper", value)?.to_uppercase()))
}

/// `replace(text, search, replacement)`.
pub fn replace(original: &Value, search: &Value, replacement: &Value) -> Result<Value> {
    let s = text("replace", original)?;
    let search = text("replace", search)?;
    let replacement = text("replace", replacement)?;
    Ok(Value::text(s.replace(search, replacement)))
}

/// `split(text, separator)` where `separator` is a text or a list of texts.
///
/// An empty input yields `[""]`; an empty separator splits into characters.
pub fn split(original: &Value, separator: &Value) -> Result<Value> {
    let s = text("split", original)?;
    if s.is_empty() {
        return Ok(Value::list([Value::text("")]));
    }
    let separators: Vec<String> = match separator {
        Value::List(list) => list
            .iter()
            .map(|sep| text("split", &sep).map(str::to_string))
            .collect::<Result<_>>()?,
        other => vec![text("split", other)?.to_string()],
    };
    Ok(Value::list(split_any(s, &separators).into_iter().map(Value::text)))
}

fn split_any<'s>(s: &'s str, separators: &[String]) -> Vec<&'s str> {
    if separators.iter().all(String::is_empty) {
        return s
            .char_indices()
            .map(|(idx, c)| &s[idx..idx + c.len_utf8()])
            .collect();
    }
    let mut parts = Vec::new();
    let mut start = 0;
    let mut idx = 0;
    while idx < s.len() {
        let rest = &s[idx..];
        match separators
            .iter()
            .filter(|sep| !sep.is_empty())
            .find(|sep| rest.starts_with(sep.as_str()))
        {
            Some(sep) => {
                parts.push(&s[start..idx]);
                idx += sep.len();
                start = idx;
            }
            None => idx += rest.chars().next().map_or(1, char::len_utf8),
        }
    }
    parts.push(&s[start..]);
    parts
}

/// `toBoolean(x)`: booleans pass, text parses leniently, integers test non-zero.
pub fn to_boolean(value: &Value) -> Result<Value> {
    match value {
        Value::Boolean(_) => Ok(value.clone()),
        Value::Text(s) => Ok(match s.trim().to_ascii_lowercase().as_str() {
            "true" => Value::Boolean(true),
            "false" => Value::Boolean(false),
            _ => Value::Undefined,
        }),
        Value::Integer(i) => Ok(Value::Boolean(*i != 0)),
        other => Err(CypherError::type_error(format!(
            "Invalid input for function 'toBoolean()': Expected a Boolean, Integer or String, got: {other}"
        ))),
    }
}

/// `toBooleanOrNull(x)`: undefined instead of a type error.
pub fn to_boolean_or_null(value: &Value) -> Value {
    to_boolean(value).unwrap_or(Value::Undefined)
}

/// `toFloat(x)`.
pub fn to_float(value: &Value) -> Result<Value> {
    match value {
        Value::Float(_) => Ok(value.clone()),
        Value::Integer(i) => Ok(Value::Float(*i as f64)),
        Value::Text(s) => Ok(s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or(Value::Undefined)),
        other => Err(CypherError::type_error(format!(
            "Invalid input for function 'toFloat()': Expected a String or Number, got: {other}"
        ))),
    }
}

/// `toFloatOrNull(x)`.
pub fn to_float_or_null(value: &Value) -> Value {
    to_float(value).unwrap_or(Value::Undefined)
}

/// `toInteger(x)`.
///
/// Text that is not plain `i64` syntax is reparsed as an arbitrary-precision
/// decimal and truncated toward zero; a value outside the `i64` range fails.
pub fn to_integer(value: &Value) -> Result<Value> {
    match value {
        Value::Integer(_) => Ok(value.clone()),
        Value::Float(f) => Ok(Value::Integer(*f as i64)),
        Value::Boolean(b) => Ok(Value::Integer(i64::from(*b))),
        Value::Text(s) => parse_integer(s),
        other => Err(CypherError::type_error(format!(
            "Invalid input for function 'toInteger()': Expected a String, Number or Boolean, got: {other}"
        ))),
    }
}

/// Decimal digits in `i64::MAX`.
const I64_DIGITS: i128 = 19;

fn parse_integer(s: &str) -> Result<Value> {
    if let Ok(i) = s.parse::<i64>() {
        return Ok(Value::Integer(i));
    }
    let Ok(decimal) = BigDecimal::from_str(s) else {
        return Ok(Value::Undefined);
    };
    let too_large = || CypherError::type_error(format!("integer, {s}, is too large"));
    // Range checks happen on the digit count first so an exponent like
    // `1e100000000` is never expanded.
    let (_, scale) = decimal.as_bigint_and_exponent();
    let integral_digits = i128::from(decimal.digits()) - i128::from(scale);
    if integral_digits <= 0 {
        return Ok(Value::Integer(0));
    }
    if integral_digits > I64_DIGITS
        || decimal < BigDecimal::from(i64::MIN)
        || decimal > BigDecimal::from(i64::MAX)
    {
        return Err(too_large());
    }
    decimal
        .with_scale_round(0, RoundingMode::Down)
        .to_i64()
        .map(Value::Integer)
        .ok_or_else(too_large)
}

/// `toIntegerOrNull(x)`.
pub fn to_integer_or_null(value: &Value) -> Value {
    to_integer(value).unwrap_or(Value::Undefined)
}

/// `toString(x)` for printable scalars.
pub fn to_string(value: &Value) -> Result<Value> {
    match value {
        Value::Text(_) => Ok(value.clone()),
        other => other.pretty_print().map(Value::text).ok_or_else(|| {
            CypherError::type_error(format!(
                "Invalid input for function 'toString()': Expected a String, Number, Boolean, Temporal or Duration, got: {other}"
            ))
        }),
    }
}

/// `toStringOrNull(x)`.
pub fn to_string_or_null(value: &Value) -> Value {
    to_string(value).unwrap_or(Value::Undefined)
}

fn convert_list(function: &str, value: &Value, convert: fn(&Value) -> Value) -> Result<Value> {
    match value {
        Value::List(list) => Ok(Value::list(list.iter().map(|v| match v {
            Value::Undefined => Value::Undefined,
            other => convert(&other),
        }))),
        other => Err(CypherError::type_error(format!(
            "Invalid input for function '{function}()': Expected a List, got: {other}"
        ))),
    }
}

/// `toBooleanList(list)`.
pub fn to_boolean_list(value: &Value) -> Result<Value> {
    convert_list("toBooleanList", value, to_boolean_or_null)
}

/// `toFloatList(list)`.
pub fn to_float_list(value: &Value) -> Result<Value> {
    convert_list("toFloatList", value, to_float_or_null)
}

/// `toIntegerList(list)`.
pub fn to_integer_list(value: &Value) -> Result<Value> {
    convert_list("toIntegerList", value, to_integer_or_null)
}

/// `toStringList(list)`.
pub fn to_string_list(value: &Value) -> Result<Value> {
    convert_list("toStringList", value, to_string_or_null)
}

/// `list[from..]`. Negative indices count from the end.
pub fn from_slice(collection: &Value, from: &Value) -> Result<Value> {
    let list = as_list(collection);
    let from = relative(int_arg("fromSlice", "from", from)?, &list);
    Ok(Value::List(list.drop_first(from)))
}

/// `list[..to]`. Negative indices count from the end.
pub fn to_slice(collection: &Value, to: &Value) -> Result<Value> {
    let list = as_list(collection);
    let to = relative(int_arg("toSlice", "to", to)?, &list);
    Ok(Value::List(list.take(to)))
}

/// `list[from..to]`. Negative indices count from the end.
pub fn full_slice(collection: &Value, from: &Value, to: &Value) -> Result<Value> {
    let list = as_list(collection);
    let from = relative(int_arg("fullSlice", "from", from)?, &list);
    let to = relative(int_arg("fullSlice", "to", to)?, &list);
    Ok(Value::List(list.slice(from, to)))
}

fn relative(index: i64, list: &ListValue) -> i64 {
    if index < 0 {
        list.len() as i64 + index
    } else {
        index
    }
}

/// `asList(x)`: see [`as_list`].
pub fn as_list_value(collection: &Value) -> Value {
    Value::List(as_list(collection))
}

/// `distance(a, b)`: undefined unless both are points in the same CRS.
pub fn distance(lhs: &Value, rhs: &Value) -> Value {
    match (lhs, rhs) {
        (Value::Point(a), Value::Point(b)) => a.distance(b).map_or(Value::Undefined, Value::Float),
        _ => Value::Undefined,
    }
}

/// `point.withinBBox(p, lowerLeft, upperRight)`.
pub fn within_bbox(point: &Value, lower_left: &Value, upper_right: &Value) -> Value {
    match (point, lower_left, upper_right) {
        (Value::Point(p), Value::Point(ll), Value::Point(ur)) => {
            p.within_bbox(ll, ur).map_or(Value::Undefined, Value::Boolean)
        }
        _ => Value::Undefined,
    }
}

/// `point(map)`: undefined when any entry is undefined.
pub fn point_from_map(value: &Value) -> Result<Value> {
    match value {
        Value::Map(map) if map.contains_undefined() => Ok(Value::Undefined),
        Value::Map(map) => Ok(Value::Point(PointValue::from_map(map)?)),
        other => Err(CypherError::type_error(format!(
            "Invalid input for function 'point()': Expected a map but got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Value {
        Value::list(values.iter().map(|i| Value::Integer(*i)))
    }

    #[test]
    fn range_is_inclusive() {
        let r = range_with_step(&Value::Integer(1), &Value::Integer(10), &Value::Integer(3)).unwrap();
        assert_eq!(r, ints(&[1, 4, 7, 10]));
        let err = range_with_step(&Value::Integer(1), &Value::Integer(2), &Value::Integer(0)).unwrap_err();
        assert_eq!(err.code(), "InvalidArgument");
    }

    #[test]
    fn rounding() {
        assert_eq!(round(&Value::Float(-2.5)).unwrap(), Value::Float(-2.0));
        assert_eq!(round(&Value::Float(2.5)).unwrap(), Value::Float(3.0));
        let p = round_with_precision(&Value::Float(3.14159), &Value::Integer(2)).unwrap();
        assert_eq!(p, Value::Float(3.14));
        let even = round_with_mode(&Value::Float(2.5), &Value::Integer(0), &Value::text("HALF_EVEN")).unwrap();
        assert_eq!(even, Value::Float(2.0));
        assert!(round_with_mode(&Value::Float(2.5), &Value::Integer(0), &Value::text("NOPE")).is_err());
        assert!(round_with_mode(&Value::Float(2.5), &Value::Integer(0), &Value::text("UNNECESSARY")).is_err());
    }

    #[test]
    fn size_and_length_asymmetry() {
        let path = Value::Path(
            crate::values::PathValue::new(
                vec![crate::values::NodeValue::new(0)],
                vec![],
            )
            .unwrap(),
        );
        assert!(size(&path).is_err());
        assert_eq!(length(&path).unwrap(), Value::Integer(0));
        assert_eq!(size(&Value::text("héllo")).unwrap(), Value::Integer(5));
        assert_eq!(size(&Value::Integer(42)).unwrap(), Value::Integer(1));
    }

    #[test]
    fn text_functions() {
        assert_eq!(right(&Value::text("hello"), &Value::Integer(3)).unwrap(), Value::text("llo"));
        assert_eq!(right(&Value::text("hi"), &Value::Integer(5)).unwrap(), Value::text("hi"));
        assert_eq!(right(&Value::text("hi"), &Value::Integer(-1)).unwrap_err().code(), "InvalidArgument");
        assert_eq!(
            substring_with_length(&Value::text("hello"), &Value::Integer(1), &Value::Integer(3)).unwrap(),
            Value::text("ell")
        );
        assert_eq!(
            split(&Value::text("a,b;c"), &Value::list([Value::text(","), Value::text(";")])).unwrap(),
            Value::list([Value::text("a"), Value::text("b"), Value::text("c")])
        );
        assert_eq!(split(&Value::text(""), &Value::text(",")).unwrap(), Value::list([Value::text("")]));
        assert!(trim(&Value::Integer(1)).is_err());
    }

    #[test]
    fn casts() {
        assert_eq!(to_integer(&Value::text("42")).unwrap(), Value::Integer(42));
        assert_eq!(to_integer(&Value::text("4.9")).unwrap(), Value::Integer(4));
        assert_eq!(to_integer(&Value::text("nope")).unwrap(), Value::Undefined);
        assert!(to_integer(&Value::text("99999999999999999999")).is_err());
        assert_eq!(to_integer_or_null(&Value::text("99999999999999999999")), Value::Undefined);
        assert_eq!(to_boolean(&Value::Integer(0)).unwrap(), Value::Boolean(false));
        assert_eq!(to_float(&Value::text("1.5")).unwrap(), Value::Float(1.5));
        assert_eq!(to_string(&Value::Float(1.0)).unwrap(), Value::text("1.0"));
        assert!(to_string(&Value::list([])).is_err());
        let list = Value::list([Value::text("1"), Value::Undefined, Value::text("x")]);
        assert_eq!(
            to_integer_list(&list).unwrap(),
            Value::list([Value::Integer(1), Value::Undefined, Value::Undefined])
        );
    }

    #[test]
    fn slices_count_from_end() {
        let list = ints(&[1, 2, 3, 4]);
        assert_eq!(from_slice(&list, &Value::Integer(-1)).unwrap(), ints(&[4]));
        assert_eq!(to_slice(&list, &Value::Integer(-1)).unwrap(), ints(&[1, 2, 3]));
        assert_eq!(full_slice(&list, &Value::Integer(1), &Value::Integer(-1)).unwrap(), ints(&[2, 3]));
        assert_eq!(from_slice(&Value::Undefined, &Value::Integer(0)).unwrap(), ints(&[]));
    }

    #[test]
    fn distance_requires_same_crs() {
        let a = Value::Point(PointValue::cartesian(0.0, 0.0));
        let b = Value::Point(PointValue::cartesian(3.0, 4.0));
        assert_eq!(distance(&a, &b), Value::Float(5.0));
        assert_eq!(distance(&a, &Value::Integer(1)), Value::Undefined);
    }
}
