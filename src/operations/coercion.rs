//! Coercion of dynamically-typed values to declared parameter types.

use std::fmt;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{CypherError, Result};
use crate::operations::entity::EntityAccess;
use crate::values::{IterationPreference, ListValue, Value};

/// A statically-declared Cypher type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CypherType {
    /// Accepts every value.
    Any,
    /// `STRING`.
    Text,
    /// `INTEGER`.
    Integer,
    /// `FLOAT`.
    Float,
    /// `NUMBER`: integer or float.
    Number,
    /// `BOOLEAN`.
    Boolean,
    /// `MAP`; nodes and relationships coerce to their properties.
    Map,
    /// `NODE`.
    Node,
    /// `RELATIONSHIP`.
    Relationship,
    /// `PATH`.
    Path,
    /// `POINT`.
    Point,
    /// `DATE`.
    Date,
    /// `TIME`.
    Time,
    /// `LOCAL TIME`.
    LocalTime,
    /// `DATETIME`.
    DateTime,
    /// `LOCAL DATETIME`.
    LocalDateTime,
    /// `DURATION`.
    Duration,
    /// `LIST<T>`.
    List(Box<CypherType>),
}

impl CypherType {
    /// `LIST<inner>`.
    pub fn list_of(inner: CypherType) -> Self {
        CypherType::List(Box::new(inner))
    }

    fn tag(&self) -> TypeTag {
        match self {
            CypherType::Any => TypeTag::Any,
            CypherType::Text => TypeTag::Text,
            CypherType::Integer => TypeTag::Integer,
            CypherType::Float => TypeTag::Float,
            CypherType::Number => TypeTag::Number,
            CypherType::Boolean => TypeTag::Boolean,
            CypherType::Map => TypeTag::Map,
            CypherType::Node => TypeTag::Node,
            CypherType::Relationship => TypeTag::Relationship,
            CypherType::Path => TypeTag::Path,
            CypherType::Point => TypeTag::Point,
            CypherType::Date => TypeTag::Date,
            CypherType::Time => TypeTag::Time,
            CypherType::LocalTime => TypeTag::LocalTime,
            CypherType::DateTime => TypeTag::DateTime,
            CypherType::LocalDateTime => TypeTag::LocalDateTime,
            CypherType::Duration => TypeTag::Duration,
            CypherType::List(_) => TypeTag::List,
        }
    }
}

impl fmt::Display for CypherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CypherType::Any => write!(f, "ANY"),
            CypherType::Text => write!(f, "STRING"),
            CypherType::Integer => write!(f, "INTEGER"),
            CypherType::Float => write!(f, "FLOAT"),
            CypherType::Number => write!(f, "NUMBER"),
            CypherType::Boolean => write!(f, "BOOLEAN"),
            CypherType::Map => write!(f, "MAP"),
            CypherType::Node => write!(f, "NODE"),
            CypherType::Relationship => write!(f, "RELATIONSHIP"),
            CypherType::Path => write!(f, "PATH"),
            CypherType::Point => write!(f, "POINT"),
            CypherType::Date => write!(f, "DATE"),
            CypherType::Time => write!(f, "TIME"),
            CypherType::LocalTime => write!(f, "LOCAL TIME"),
            CypherType::DateTime => write!(f, "DATETIME"),
            CypherType::LocalDateTime => write!(f, "LOCAL DATETIME"),
            CypherType::Duration => write!(f, "DURATION"),
            CypherType::List(inner) => write!(f, "LIST<{inner}>"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum TypeTag {
    Any,
    Text,
    Integer,
    Float,
    Number,
    Boolean,
    Map,
    Node,
    Relationship,
    Path,
    Point,
    Date,
    Time,
    LocalTime,
    DateTime,
    LocalDateTime,
    Duration,
    List,
}

type Converter = fn(&Value, &dyn EntityAccess) -> Option<Result<Value>>;

/// Immutable registry of per-type converters.
///
/// Build once and share by reference. Converters return `None` when the
/// value's variant cannot be coerced, which becomes a type error naming the
/// value and the target type.
pub struct CypherCoercions {
    converters: FxHashMap<TypeTag, Converter>,
}

impl CypherCoercions {
    /// Registers the converter for every scalar target type.
    pub fn new() -> Self {
        let mut converters: FxHashMap<TypeTag, Converter> = FxHashMap::default();
        converters.insert(TypeTag::Any, |v, _| Some(Ok(v.clone())));
        converters.insert(TypeTag::Text, |v, _| matches!(v, Value::Text(_)).then(|| Ok(v.clone())));
        converters.insert(TypeTag::Integer, |v, _| match v {
            Value::Integer(_) => Some(Ok(v.clone())),
            Value::Float(f) => Some(Ok(Value::Integer(*f as i64))),
            _ => None,
        });
        converters.insert(TypeTag::Float, |v, _| match v {
            Value::Float(_) => Some(Ok(v.clone())),
            Value::Integer(i) => Some(Ok(Value::Float(*i as f64))),
            _ => None,
        });
        converters.insert(TypeTag::Number, |v, _| v.is_number().then(|| Ok(v.clone())));
        converters.insert(TypeTag::Boolean, |v, _| matches!(v, Value::Boolean(_)).then(|| Ok(v.clone())));
        converters.insert(TypeTag::Map, |v, access| match v {
            Value::Map(_) => Some(Ok(v.clone())),
            Value::Node(n) => Some(access.node_properties(n.id).map(Value::Map)),
            Value::Relationship(r) => Some(access.relationship_properties(r.id()).map(Value::Map)),
            _ => None,
        });
        converters.insert(TypeTag::Node, |v, _| matches!(v, Value::Node(_)).then(|| Ok(v.clone())));
        converters.insert(TypeTag::Relationship, |v, _| {
            matches!(v, Value::Relationship(_)).then(|| Ok(v.clone()))
        });
        converters.insert(TypeTag::Path, |v, _| matches!(v, Value::Path(_)).then(|| Ok(v.clone())));
        converters.insert(TypeTag::Point, |v, _| matches!(v, Value::Point(_)).then(|| Ok(v.clone())));
        converters.insert(TypeTag::Date, |v, _| matches!(v, Value::Date(_)).then(|| Ok(v.clone())));
        converters.insert(TypeTag::Time, |v, _| matches!(v, Value::Time(_)).then(|| Ok(v.clone())));
        converters.insert(TypeTag::LocalTime, |v, _| {
            matches!(v, Value::LocalTime(_)).then(|| Ok(v.clone()))
        });
        converters.insert(TypeTag::DateTime, |v, _| {
            matches!(v, Value::DateTime(_)).then(|| Ok(v.clone()))
        });
        converters.insert(TypeTag::LocalDateTime, |v, _| {
            matches!(v, Value::LocalDateTime(_)).then(|| Ok(v.clone()))
        });
        converters.insert(TypeTag::Duration, |v, _| {
            matches!(v, Value::Duration(_)).then(|| Ok(v.clone()))
        });
        Self { converters }
    }

    /// Coerces `value` to `target`.
    ///
    /// Undefined stays undefined. Lists of `ANY` accept lists and paths as
    /// they are; other lists coerce each element in order.
    pub fn coerce(&self, value: &Value, target: &CypherType, access: &dyn EntityAccess) -> Result<Value> {
        if value.is_undefined() {
            return Ok(Value::Undefined);
        }
        if let CypherType::List(inner) = target {
            return self.coerce_list(value, target, inner, access);
        }
        let converter = self.converters.get(&target.tag()).ok_or_else(|| {
            CypherError::ContractViolation(format!("no converter registered for {target}"))
        })?;
        match converter(value, access) {
            Some(result) => result,
            None => Err(cant_coerce(value, target)),
        }
    }

    fn coerce_list(
        &self,
        value: &Value,
        target: &CypherType,
        inner: &CypherType,
        access: &dyn EntityAccess,
    ) -> Result<Value> {
        let list = match value {
            Value::List(list) => list.clone(),
            Value::Path(path) => path.as_list(),
            other => return Err(cant_coerce(other, target)),
        };
        if *inner == CypherType::Any {
            return Ok(Value::List(list));
        }
        let mut out = Vec::with_capacity(list.len());
        match list.iteration_preference() {
            IterationPreference::RandomAccess => {
                for idx in 0..list.len() {
                    let element = list.get(idx).unwrap_or(Value::Undefined);
                    out.push(self.coerce(&element, inner, access)?);
                }
            }
            IterationPreference::Iteration => {
                for element in list.iter() {
                    out.push(self.coerce(&element, inner, access)?);
                }
            }
        }
        Ok(Value::List(ListValue::from_vec(out)))
    }
}

impl Default for CypherCoercions {
    fn default() -> Self {
        Self::new()
    }
}

fn cant_coerce(value: &Value, target: &CypherType) -> CypherError {
    debug!(from = value.type_name(), to = %target, "coercion.failed");
    CypherError::type_error(format!("Can't coerce `{value}` to {target}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::entity::NoEntityAccess;

    #[test]
    fn narrows_numbers() {
        let c = CypherCoercions::new();
        assert_eq!(
            c.coerce(&Value::Float(2.7), &CypherType::Integer, &NoEntityAccess).unwrap(),
            Value::Integer(2)
        );
        assert_eq!(
            c.coerce(&Value::Integer(2), &CypherType::Float, &NoEntityAccess).unwrap(),
            Value::Float(2.0)
        );
        let err = c.coerce(&Value::text("x"), &CypherType::Integer, &NoEntityAccess).unwrap_err();
        assert!(err.to_string().contains("INTEGER"));
    }

    #[test]
    fn list_elements_coerce_in_order() {
        let c = CypherCoercions::new();
        let target = CypherType::list_of(CypherType::Float);
        let value = Value::list([Value::Integer(1), Value::Undefined, Value::Float(2.5)]);
        assert_eq!(
            c.coerce(&value, &target, &NoEntityAccess).unwrap(),
            Value::list([Value::Float(1.0), Value::Undefined, Value::Float(2.5)])
        );
        let bad = Value::list([Value::Integer(1), Value::text("x")]);
        let err = c
            .coerce(&bad, &CypherType::list_of(CypherType::Integer), &NoEntityAccess)
            .unwrap_err();
        assert_eq!(err.code(), "TypeError");
    }

    #[test]
    fn any_list_accepts_paths() {
        let c = CypherCoercions::new();
        let path = crate::values::PathValue::new(vec![crate::values::NodeValue::new(1)], vec![]).unwrap();
        let coerced = c
            .coerce(&Value::Path(path), &CypherType::list_of(CypherType::Any), &NoEntityAccess)
            .unwrap();
        assert_eq!(coerced, Value::list([Value::node(1)]));
    }
}
