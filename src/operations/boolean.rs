//! Three-valued boolean operators.
//!
//! Every comparison returns an [`Equality`] rather than a `bool` so that
//! NULL propagation survives composition.

use std::cmp::Ordering;

use regex::Regex;
use tracing::debug;

use crate::error::{CypherError, Result};
use crate::values::{ternary_compare, ternary_equals, Equality, ListValue, Value};

/// `lhs = rhs`.
pub fn equals(lhs: &Value, rhs: &Value) -> Equality {
    ternary_equals(lhs, rhs)
}

/// `lhs <> rhs`.
pub fn not_equals(lhs: &Value, rhs: &Value) -> Equality {
    ternary_equals(lhs, rhs).negate()
}

/// `lhs < rhs`.
pub fn less_than(lhs: &Value, rhs: &Value) -> Equality {
    ordered(lhs, rhs, Ordering::is_lt)
}

/// `lhs <= rhs`.
pub fn less_than_or_equal(lhs: &Value, rhs: &Value) -> Equality {
    ordered(lhs, rhs, Ordering::is_le)
}

/// `lhs > rhs`.
pub fn greater_than(lhs: &Value, rhs: &Value) -> Equality {
    ordered(lhs, rhs, Ordering::is_gt)
}

/// `lhs >= rhs`.
pub fn greater_than_or_equal(lhs: &Value, rhs: &Value) -> Equality {
    ordered(lhs, rhs, Ordering::is_ge)
}

fn ordered(lhs: &Value, rhs: &Value, accept: fn(Ordering) -> bool) -> Equality {
    // NaN against any number is false, never undefined.
    if (lhs.is_nan() && rhs.is_number()) || (rhs.is_nan() && lhs.is_number()) {
        return Equality::False;
    }
    match ternary_compare(lhs, rhs) {
        Some(ordering) => Equality::from_bool(accept(ordering)),
        None => Equality::Undefined,
    }
}

/// `NOT v`: undefined stays undefined, otherwise the negation of `v = true`.
pub fn not(value: &Value) -> Equality {
    match value {
        Value::Undefined => Equality::Undefined,
        other => Equality::from_bool(!is_true(other)),
    }
}

/// `lhs XOR rhs` over the `= true` projection of each operand.
pub fn xor(lhs: &Value, rhs: &Value) -> Equality {
    Equality::from_bool(is_true(lhs) ^ is_true(rhs))
}

/// `a AND b AND ...`: false dominates, then undefined.
pub fn and(values: &[Value]) -> Result<Equality> {
    let mut result = Equality::True;
    for value in values {
        match coerce_to_boolean(value)? {
            Equality::False => return Ok(Equality::False),
            Equality::Undefined => result = Equality::Undefined,
            Equality::True => {}
        }
    }
    Ok(result)
}

/// `a OR b OR ...`: true dominates, then undefined.
pub fn or(values: &[Value]) -> Result<Equality> {
    let mut result = Equality::False;
    for value in values {
        match coerce_to_boolean(value)? {
            Equality::True => return Ok(Equality::True),
            Equality::Undefined => result = Equality::Undefined,
            Equality::False => {}
        }
    }
    Ok(result)
}

fn is_true(value: &Value) -> bool {
    matches!(value, Value::Boolean(true))
}

/// Truthiness used by predicates.
///
/// Paths and lists are true when non-empty; booleans pass through; any other
/// concrete value is a type error.
pub fn coerce_to_boolean(value: &Value) -> Result<Equality> {
    match value {
        Value::Undefined => Ok(Equality::Undefined),
        Value::Boolean(b) => Ok(Equality::from_bool(*b)),
        Value::List(list) => Ok(Equality::from_bool(!list.is_empty())),
        // A path always holds at least its start node.
        Value::Path(_) => Ok(Equality::True),
        other => Err(CypherError::type_error(format!(
            "Don't know how to treat a predicate: {other}"
        ))),
    }
}

/// `find IN look_in`.
///
/// An empty list answers `False` even for an undefined `find`; an undefined
/// list answers `Undefined`. Non-list containers are treated as a single
/// element list.
pub fn in_list(find: &Value, look_in: &Value) -> Equality {
    if look_in.is_undefined() {
        return Equality::Undefined;
    }
    let list = as_list(look_in);
    if list.is_empty() {
        return Equality::False;
    }
    if find.is_undefined() {
        return Equality::Undefined;
    }
    let mut saw_undefined = false;
    for element in list.iter() {
        match ternary_equals(&element, find) {
            Equality::True => return Equality::True,
            Equality::Undefined => saw_undefined = true,
            Equality::False => {}
        }
    }
    if saw_undefined {
        Equality::Undefined
    } else {
        Equality::False
    }
}

/// Uniform list view: lists as themselves, undefined as the empty list,
/// anything else (paths included) as a one-element list.
pub fn as_list(value: &Value) -> ListValue {
    match value {
        Value::List(list) => list.clone(),
        Value::Undefined => ListValue::empty(),
        other => ListValue::from_vec(vec![other.clone()]),
    }
}

/// A full-string regular expression compiled once and reused across rows.
#[derive(Clone, Debug)]
pub struct CompiledPattern {
    source: String,
    regex: Regex,
}

impl CompiledPattern {
    /// Compiles `pattern` anchored at both ends.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|err| {
            debug!(pattern, error = %err, "regex.compile_failed");
            CypherError::InvalidRegex {
                pattern: pattern.to_string(),
                reason: err.to_string(),
            }
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Matches `text` against the pattern; non-text is undefined.
    pub fn matches(&self, text: &Value) -> Equality {
        match text {
            Value::Text(s) => Equality::from_bool(self.regex.is_match(s)),
            _ => Equality::Undefined,
        }
    }
}

/// `text =~ pattern` with a pattern supplied per row.
pub fn regex(text: &Value, pattern: &Value) -> Result<Equality> {
    match pattern {
        Value::Text(p) => Ok(CompiledPattern::new(p)?.matches(text)),
        Value::Undefined => Ok(Equality::Undefined),
        other => Err(CypherError::not_a_string("=~", other)),
    }
}
