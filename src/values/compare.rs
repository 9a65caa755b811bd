use std::cmp::Ordering;

use super::{ListValue, MapValue, Value};

/// Three-valued truth.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Equality {
    /// Definitely true.
    True,
    /// Definitely false.
    False,
    /// Unknown: NULL propagation or incomparable operands.
    Undefined,
}

impl Equality {
    /// Lifts a boolean.
    pub fn from_bool(value: bool) -> Self {
        if value {
            Equality::True
        } else {
            Equality::False
        }
    }

    /// Three-valued negation.
    pub fn negate(self) -> Self {
        match self {
            Equality::True => Equality::False,
            Equality::False => Equality::True,
            Equality::Undefined => Equality::Undefined,
        }
    }
}

/// Cypher equality.
///
/// Returns [`Equality::Undefined`] when either side is undefined or the sides
/// belong to different comparability kinds. Integers and floats compare by
/// exact numeric value; NaN equals nothing. Containers are equal when every
/// element pair is equal; a single unequal pair decides `False` even if other
/// pairs are undefined.
pub fn ternary_equals(lhs: &Value, rhs: &Value) -> Equality {
    use Value::*;
    match (lhs, rhs) {
        (Undefined, _) | (_, Undefined) => Equality::Undefined,
        (Boolean(a), Boolean(b)) => Equality::from_bool(a == b),
        (Integer(a), Integer(b)) => Equality::from_bool(a == b),
        (Float(a), Float(b)) => Equality::from_bool(a == b),
        (Integer(i), Float(f)) | (Float(f), Integer(i)) => {
            Equality::from_bool(compare_int_float(*i, *f) == Some(Ordering::Equal))
        }
        (Text(a), Text(b)) => Equality::from_bool(a == b),
        (Date(a), Date(b)) => Equality::from_bool(a == b),
        (Time(a), Time(b)) => Equality::from_bool(a.utc_nanos() == b.utc_nanos()),
        (LocalTime(a), LocalTime(b)) => Equality::from_bool(a == b),
        (DateTime(a), DateTime(b)) => Equality::from_bool(a == b),
        (LocalDateTime(a), LocalDateTime(b)) => Equality::from_bool(a == b),
        (Duration(a), Duration(b)) => Equality::from_bool(a == b),
        (Point(a), Point(b)) => Equality::from_bool(a == b),
        (List(a), List(b)) => lists_equal(a, b),
        (Map(a), Map(b)) => maps_equal(a, b),
        (Node(a), Node(b)) => Equality::from_bool(a.id == b.id),
        (Relationship(a), Relationship(b)) => Equality::from_bool(a.id() == b.id()),
        (Path(a), Path(b)) => Equality::from_bool(
            a.nodes().len() == b.nodes().len()
                && a.nodes().iter().zip(b.nodes()).all(|(x, y)| x.id == y.id)
                && a
                    .relationships()
                    .iter()
                    .zip(b.relationships())
                    .all(|(x, y)| x.id() == y.id()),
        ),
        _ => Equality::Undefined,
    }
}

fn lists_equal(a: &ListValue, b: &ListValue) -> Equality {
    if a.len() != b.len() {
        return Equality::False;
    }
    let mut result = Equality::True;
    for (x, y) in a.iter().zip(b.iter()) {
        match ternary_equals(&x, &y) {
            Equality::False => return Equality::False,
            Equality::Undefined => result = Equality::Undefined,
            Equality::True => {}
        }
    }
    result
}

fn maps_equal(a: &MapValue, b: &MapValue) -> Equality {
    if a.len() != b.len() || a.iter().any(|(k, _)| !b.contains_key(k)) {
        return Equality::False;
    }
    let mut result = Equality::True;
    for (k, x) in a.iter() {
        match ternary_equals(x, &b.get(k)) {
            Equality::False => return Equality::False,
            Equality::Undefined => result = Equality::Undefined,
            Equality::True => {}
        }
    }
    result
}

/// Exact comparison of an integer with a float; `None` for NaN.
pub(crate) fn compare_int_float(i: i64, f: f64) -> Option<Ordering> {
    if f.is_nan() {
        return None;
    }
    // 2^63 is exactly representable; anything at or above is beyond i64.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f >= LIMIT {
        return Some(Ordering::Less);
    }
    if f < -LIMIT {
        return Some(Ordering::Greater);
    }
    let whole = f.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0f64.partial_cmp(&(f - whole)),
        other => Some(other),
    }
}

/// Cypher ordering.
///
/// `None` means the comparison is undefined: an undefined operand, NaN,
/// different kinds, or a kind without an order (durations, points, maps,
/// graph entities). Lists compare lexicographically.
pub fn ternary_compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    use Value::*;
    match (lhs, rhs) {
        (Boolean(a), Boolean(b)) => Some(a.cmp(b)),
        (Integer(a), Integer(b)) => Some(a.cmp(b)),
        (Float(a), Float(b)) => a.partial_cmp(b),
        (Integer(i), Float(f)) => compare_int_float(*i, *f),
        (Float(f), Integer(i)) => compare_int_float(*i, *f).map(Ordering::reverse),
        (Text(a), Text(b)) => Some(a.cmp(b)),
        (Date(a), Date(b)) => Some(a.cmp(b)),
        (Time(a), Time(b)) => Some(a.utc_nanos().cmp(&b.utc_nanos())),
        (LocalTime(a), LocalTime(b)) => Some(a.cmp(b)),
        (DateTime(a), DateTime(b)) => Some(a.cmp(b)),
        (LocalDateTime(a), LocalDateTime(b)) => Some(a.cmp(b)),
        (List(a), List(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                match ternary_compare(&x, &y)? {
                    Ordering::Equal => continue,
                    other => return Some(other),
                }
            }
            Some(a.len().cmp(&b.len()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_and_cross_kind_are_undefined() {
        assert_eq!(
            ternary_equals(&Value::Undefined, &Value::Integer(1)),
            Equality::Undefined
        );
        assert_eq!(
            ternary_equals(&Value::text("1"), &Value::Integer(1)),
            Equality::Undefined
        );
        assert_eq!(ternary_compare(&Value::text("a"), &Value::Integer(1)), None);
    }

    #[test]
    fn numbers_compare_exactly() {
        assert_eq!(
            ternary_equals(&Value::Integer(1), &Value::Float(1.0)),
            Equality::True
        );
        assert_eq!(
            ternary_equals(&Value::Integer(i64::MAX), &Value::Float(i64::MAX as f64)),
            Equality::False
        );
        assert_eq!(
            ternary_compare(&Value::Float(1.5), &Value::Integer(1)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            ternary_equals(&Value::Float(f64::NAN), &Value::Float(f64::NAN)),
            Equality::False
        );
    }

    #[test]
    fn list_equality_prefers_false_over_undefined() {
        let a = Value::list([Value::Undefined, Value::Integer(1)]);
        let b = Value::list([Value::Integer(1), Value::Integer(2)]);
        assert_eq!(ternary_equals(&a, &b), Equality::False);
        let c = Value::list([Value::Undefined, Value::Integer(2)]);
        assert_eq!(ternary_equals(&c, &b), Equality::Undefined);
    }

    #[test]
    fn lists_order_lexicographically() {
        let a = Value::list([Value::Integer(1), Value::Integer(2)]);
        let b = Value::list([Value::Integer(1), Value::Integer(3)]);
        let c = Value::list([Value::Integer(1)]);
        assert_eq!(ternary_compare(&a, &b), Some(Ordering::Less));
        assert_eq!(ternary_compare(&c, &a), Some(Ordering::Less));
    }

    #[test]
    fn unordered_kinds() {
        assert_eq!(ternary_compare(&Value::node(1), &Value::node(2)), None);
        assert_eq!(
            ternary_equals(&Value::node(1), &Value::node(1)),
            Equality::True
        );
    }
}
