use std::fmt;
use std::sync::Arc;

use super::{ListValue, Value};

/// Immutable string-keyed map preserving insertion order.
#[derive(Clone, Debug, Default)]
pub struct MapValue(Arc<Vec<(Arc<str>, Value)>>);

impl MapValue {
    /// The empty map.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a map; a repeated key keeps its first position and last value.
    pub fn from_entries<K: AsRef<str>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        let mut out: Vec<(Arc<str>, Value)> = Vec::new();
        for (key, value) in entries {
            let key = key.as_ref();
            match out.iter_mut().find(|(existing, _)| &**existing == key) {
                Some(slot) => slot.1 = value,
                None => out.push((Arc::from(key), value)),
            }
        }
        MapValue(Arc::new(out))
    }

    /// Value stored under `key`, or [`Value::Undefined`].
    pub fn get(&self, key: &str) -> Value {
        self.0
            .iter()
            .find(|(k, _)| &**k == key)
            .map(|(_, v)| v.clone())
            .unwrap_or(Value::Undefined)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| &**k == key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (&**k, v))
    }

    /// Keys as a list of text values.
    pub fn keys(&self) -> ListValue {
        self.0.iter().map(|(k, _)| Value::Text(k.clone())).collect()
    }

    /// Whether any value is [`Value::Undefined`].
    pub fn contains_undefined(&self) -> bool {
        self.0.iter().any(|(_, v)| v.is_undefined())
    }

    pub(crate) fn estimated_heap_usage(&self) -> usize {
        self.0
            .iter()
            .map(|(k, v)| k.len() + 16 + v.estimated_heap_usage())
            .sum()
    }
}

impl PartialEq for MapValue {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.contains_key(k) && other.get(k) == *v)
    }
}

impl fmt::Display for MapValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (idx, (k, v)) in self.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}: {v}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order_and_unique_keys() {
        let map = MapValue::from_entries([
            ("b", Value::Integer(1)),
            ("a", Value::Integer(2)),
            ("b", Value::Integer(3)),
        ]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("b"), Value::Integer(3));
        let keys: Vec<_> = map.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert!(map.get("missing").is_undefined());
    }

    #[test]
    fn equality_ignores_order() {
        let left = MapValue::from_entries([("a", Value::Integer(1)), ("b", Value::Integer(2))]);
        let right = MapValue::from_entries([("b", Value::Integer(2)), ("a", Value::Integer(1))]);
        assert_eq!(left, right);
    }
}
