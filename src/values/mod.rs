//! The closed value model every operation works on.
//!
//! [`Value`] is an immutable tagged union. Containers and text sit behind
//! [`Arc`] so values are cheap to clone as they flow through a row.
//! Graph entities carry identity only; their properties are fetched on
//! demand through [`crate::storage::ReadAccess`].

pub(crate) mod compare;
mod duration;
mod graph;
mod list;
mod map;
mod point;
pub(crate) mod temporal;

use std::fmt;
use std::sync::Arc;

use time::{Date, OffsetDateTime, PrimitiveDateTime};

pub use compare::{ternary_compare, ternary_equals, Equality};
pub use duration::DurationValue;
pub use graph::{NodeValue, PathValue, RelationshipData, RelationshipValue};
pub use list::{IterationPreference, ListIter, ListValue};
pub use map::MapValue;
pub use point::{Crs, PointValue};
pub use temporal::{format_offset, format_time, TimeValue};

/// A Cypher runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    /// The NO-VALUE sentinel, distinct from every other value.
    Undefined,
    /// Boolean.
    Boolean(bool),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit IEEE float.
    Float(f64),
    /// Unicode text.
    Text(Arc<str>),
    /// Calendar date.
    Date(Date),
    /// Time of day with a UTC offset.
    Time(TimeValue),
    /// Time of day without offset.
    LocalTime(time::Time),
    /// Instant with a UTC offset.
    DateTime(OffsetDateTime),
    /// Date and time without offset.
    LocalDateTime(PrimitiveDateTime),
    /// Calendar-aware amount of time.
    Duration(DurationValue),
    /// Spatial point.
    Point(PointValue),
    /// Ordered sequence.
    List(ListValue),
    /// String-keyed, insertion-ordered map.
    Map(MapValue),
    /// Node reference.
    Node(NodeValue),
    /// Relationship reference.
    Relationship(RelationshipValue),
    /// Alternating node/relationship sequence.
    Path(PathValue),
}

/// Comparability class of a value; values of different kinds never compare.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ValueKind {
    /// [`Value::Undefined`].
    Undefined,
    /// [`Value::Boolean`].
    Boolean,
    /// [`Value::Integer`] and [`Value::Float`].
    Number,
    /// [`Value::Text`].
    Text,
    /// [`Value::Date`].
    Date,
    /// [`Value::Time`].
    Time,
    /// [`Value::LocalTime`].
    LocalTime,
    /// [`Value::DateTime`].
    DateTime,
    /// [`Value::LocalDateTime`].
    LocalDateTime,
    /// [`Value::Duration`].
    Duration,
    /// [`Value::Point`].
    Point,
    /// [`Value::List`].
    List,
    /// [`Value::Map`].
    Map,
    /// [`Value::Node`].
    Node,
    /// [`Value::Relationship`].
    Relationship,
    /// [`Value::Path`].
    Path,
}

impl ValueKind {
    /// Single-bit mask identifying this kind.
    pub fn bit(self) -> u32 {
        1 << (self as u8)
    }
}

impl Value {
    /// Builds a text value.
    pub fn text(s: impl AsRef<str>) -> Self {
        Value::Text(Arc::from(s.as_ref()))
    }

    /// Builds a materialised list value.
    pub fn list(values: impl IntoIterator<Item = Value>) -> Self {
        Value::List(ListValue::from_vec(values.into_iter().collect()))
    }

    /// Builds a map value from key/value pairs; later duplicates win.
    pub fn map<K: AsRef<str>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Map(MapValue::from_entries(entries))
    }

    /// Node reference with the given id.
    pub fn node(id: u64) -> Self {
        Value::Node(NodeValue::new(id))
    }

    /// Whether this is the NO-VALUE sentinel.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Whether this is an integer or float.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// Whether this is a float holding NaN.
    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Float(f) if f.is_nan())
    }

    /// Floating-point projection of a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Integer projection of a number, truncating floats.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    /// Borrowed text, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Sequence view of lists and paths.
    ///
    /// A path becomes its alternating node/relationship list.
    pub fn as_sequence(&self) -> Option<ListValue> {
        match self {
            Value::List(list) => Some(list.clone()),
            Value::Path(path) => Some(path.as_list()),
            _ => None,
        }
    }

    /// Comparability class.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Undefined => ValueKind::Undefined,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Integer(_) | Value::Float(_) => ValueKind::Number,
            Value::Text(_) => ValueKind::Text,
            Value::Date(_) => ValueKind::Date,
            Value::Time(_) => ValueKind::Time,
            Value::LocalTime(_) => ValueKind::LocalTime,
            Value::DateTime(_) => ValueKind::DateTime,
            Value::LocalDateTime(_) => ValueKind::LocalDateTime,
            Value::Duration(_) => ValueKind::Duration,
            Value::Point(_) => ValueKind::Point,
            Value::List(_) => ValueKind::List,
            Value::Map(_) => ValueKind::Map,
            Value::Node(_) => ValueKind::Node,
            Value::Relationship(_) => ValueKind::Relationship,
            Value::Path(_) => ValueKind::Path,
        }
    }

    /// User-facing type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "NULL",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::Text(_) => "String",
            Value::Date(_) => "Date",
            Value::Time(_) => "Time",
            Value::LocalTime(_) => "LocalTime",
            Value::DateTime(_) => "DateTime",
            Value::LocalDateTime(_) => "LocalDateTime",
            Value::Duration(_) => "Duration",
            Value::Point(_) => "Point",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
            Value::Node(_) => "Node",
            Value::Relationship(_) => "Relationship",
            Value::Path(_) => "Path",
        }
    }

    /// Whether the value is a temporal instant or time of day.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            Value::Date(_)
                | Value::Time(_)
                | Value::LocalTime(_)
                | Value::DateTime(_)
                | Value::LocalDateTime(_)
        )
    }

    /// Pretty-printed form of a printable scalar, used by string concatenation
    /// and `toString`.
    ///
    /// Returns `None` for lists, maps, graph entities and [`Value::Undefined`].
    pub fn pretty_print(&self) -> Option<String> {
        match self {
            Value::Boolean(b) => Some(b.to_string()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Float(f) => Some(format_float(*f)),
            Value::Text(s) => Some(s.to_string()),
            Value::Date(_)
            | Value::Time(_)
            | Value::LocalTime(_)
            | Value::DateTime(_)
            | Value::LocalDateTime(_)
            | Value::Duration(_)
            | Value::Point(_) => Some(self.to_string()),
            _ => None,
        }
    }

    /// Rough number of heap bytes retained by this value.
    pub fn estimated_heap_usage(&self) -> usize {
        const SHALLOW: usize = std::mem::size_of::<Value>();
        match self {
            Value::Text(s) => SHALLOW + s.len(),
            Value::Point(p) => SHALLOW + p.coordinates().len() * 8,
            Value::List(list) => SHALLOW + list.estimated_heap_usage(),
            Value::Map(map) => SHALLOW + map.estimated_heap_usage(),
            Value::Path(path) => SHALLOW + path.estimated_heap_usage(),
            _ => SHALLOW,
        }
    }
}

/// Formats a float the way query results print it: always with a decimal
/// point or exponent, `Infinity`/`-Infinity`/`NaN` for the specials.
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else {
        format!("{f:?}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "NO_VALUE"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{}", format_float(*v)),
            Value::Text(s) => write!(f, "'{s}'"),
            Value::Date(d) => write!(f, "{d}"),
            Value::Time(t) => write!(f, "{t}"),
            Value::LocalTime(t) => write!(f, "{}", format_time(*t)),
            Value::DateTime(dt) => write!(
                f,
                "{}T{}{}",
                dt.date(),
                format_time(dt.time()),
                format_offset(dt.offset())
            ),
            Value::LocalDateTime(dt) => write!(f, "{}T{}", dt.date(), format_time(dt.time())),
            Value::Duration(d) => write!(f, "{d}"),
            Value::Point(p) => write!(f, "{p}"),
            Value::List(list) => {
                write!(f, "[")?;
                for (idx, value) in list.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
            Value::Map(map) => write!(f, "{map}"),
            Value::Node(node) => write!(f, "{node}"),
            Value::Relationship(rel) => write!(f, "{rel}"),
            Value::Path(path) => write!(f, "{path}"),
        }
    }
}

/// Structural equality: `Undefined == Undefined`, and integers never equal
/// floats. Cypher equality lives in [`ternary_equals`].
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::LocalTime(a), Value::LocalTime(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b && a.offset() == b.offset(),
            (Value::LocalDateTime(a), Value::LocalDateTime(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Point(a), Value::Point(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Node(a), Value::Node(b)) => a == b,
            (Value::Relationship(a), Value::Relationship(b)) => a.id() == b.id(),
            (Value::Path(a), Value::Path(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::text(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(Arc::from(value))
    }
}

impl From<ListValue> for Value {
    fn from(value: ListValue) -> Self {
        Value::List(value)
    }
}

impl From<MapValue> for Value {
    fn from(value: MapValue) -> Self {
        Value::Map(value)
    }
}

impl From<Equality> for Value {
    fn from(value: Equality) -> Self {
        match value {
            Equality::True => Value::Boolean(true),
            Equality::False => Value::Boolean(false),
            Equality::Undefined => Value::Undefined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_formatting() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(1.5), "1.5");
        assert_eq!(format_float(f64::INFINITY), "Infinity");
        assert_eq!(format_float(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_float(f64::NAN), "NaN");
    }

    #[test]
    fn structural_equality_keeps_number_kinds_apart() {
        assert_eq!(Value::Undefined, Value::Undefined);
        assert_ne!(Value::Integer(1), Value::Float(1.0));
        assert_eq!(Value::list([Value::Integer(1)]), Value::list([Value::Integer(1)]));
    }

    #[test]
    fn display_uses_literal_syntax() {
        let v = Value::list([
            Value::Integer(1),
            Value::text("a"),
            Value::map([("k", Value::Boolean(true))]),
        ]);
        assert_eq!(v.to_string(), "[1, 'a', {k: true}]");
    }

    #[test]
    fn pretty_print_only_for_scalars() {
        assert_eq!(Value::Float(2.0).pretty_print().as_deref(), Some("2.0"));
        assert_eq!(Value::text("x").pretty_print().as_deref(), Some("x"));
        assert!(Value::list([]).pretty_print().is_none());
        assert!(Value::node(1).pretty_print().is_none());
    }

    #[test]
    fn kinds_group_numbers() {
        assert_eq!(Value::Integer(1).kind(), Value::Float(1.0).kind());
        assert_ne!(ValueKind::Number.bit(), ValueKind::Text.bit());
    }
}
