use std::sync::Arc;

use super::Value;
use crate::error::{CypherError, Result};

/// How a list prefers to be traversed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IterationPreference {
    /// `get(i)` is cheap; index directly.
    RandomAccess,
    /// Walk with [`ListValue::iter`]; indexing may be linear.
    Iteration,
}

/// Immutable, cheaply clonable list.
///
/// Several representations share one surface: materialised arrays, lazy
/// integer ranges, slice and reversed views over another list, and
/// concatenations. Derived lists never copy their source.
#[derive(Clone, Debug)]
pub struct ListValue(Arc<Repr>);

#[derive(Debug)]
enum Repr {
    Array(Vec<Value>),
    Range {
        start: i64,
        step: i64,
        len: usize,
    },
    Slice {
        inner: ListValue,
        from: usize,
        len: usize,
    },
    Reversed(ListValue),
    Concat {
        parts: Vec<ListValue>,
        len: usize,
    },
}

impl ListValue {
    /// The empty list.
    pub fn empty() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Wraps a vector.
    pub fn from_vec(values: Vec<Value>) -> Self {
        ListValue(Arc::new(Repr::Array(values)))
    }

    /// Lazy integer range from `start` to `end` inclusive, moving by `step`.
    ///
    /// The sequence is empty when `step` points away from `end`. `step` must be
    /// non-zero; callers validate it.
    pub fn range(start: i64, end: i64, step: i64) -> Result<Self> {
        let (start_w, end_w, step_w) = (start as i128, end as i128, step as i128);
        let len = if (step_w > 0 && start_w <= end_w) || (step_w < 0 && start_w >= end_w) {
            usize::try_from((end_w - start_w) / step_w + 1).map_err(|_| {
                CypherError::invalid_argument(format!(
                    "range({start}, {end}, {step}) has too many elements"
                ))
            })?
        } else {
            0
        };
        Ok(ListValue(Arc::new(Repr::Range { start, step, len })))
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match &*self.0 {
            Repr::Array(values) => values.len(),
            Repr::Range { len, .. } => *len,
            Repr::Slice { len, .. } => *len,
            Repr::Reversed(inner) => inner.len(),
            Repr::Concat { len, .. } => *len,
        }
    }

    /// Whether the list has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`, if in bounds.
    pub fn get(&self, index: usize) -> Option<Value> {
        if index >= self.len() {
            return None;
        }
        match &*self.0 {
            Repr::Array(values) => values.get(index).cloned(),
            Repr::Range { start, step, .. } => {
                let value = *start as i128 + index as i128 * *step as i128;
                Some(Value::Integer(value as i64))
            }
            Repr::Slice { inner, from, .. } => inner.get(from + index),
            Repr::Reversed(inner) => inner.get(inner.len() - 1 - index),
            Repr::Concat { parts, .. } => {
                let mut offset = index;
                for part in parts {
                    if offset < part.len() {
                        return part.get(offset);
                    }
                    offset -= part.len();
                }
                None
            }
        }
    }

    /// Preferred traversal style.
    pub fn iteration_preference(&self) -> IterationPreference {
        match &*self.0 {
            Repr::Concat { .. } => IterationPreference::Iteration,
            Repr::Slice { inner, .. } | Repr::Reversed(inner) => inner.iteration_preference(),
            _ => IterationPreference::RandomAccess,
        }
    }

    /// Forward iterator over the elements.
    pub fn iter(&self) -> ListIter {
        ListIter::new(self.clone())
    }

    /// Identity of the underlying allocation; equal for clones of one list.
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    /// Whether both handles refer to the same list instance.
    pub fn same_instance(&self, other: &ListValue) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Materialises the elements.
    pub fn to_vec(&self) -> Vec<Value> {
        match &*self.0 {
            Repr::Array(values) => values.clone(),
            _ => self.iter().collect(),
        }
    }

    /// Elements from `from` (inclusive) to `to` (exclusive), clamped to bounds.
    pub fn slice(&self, from: i64, to: i64) -> ListValue {
        let len = self.len() as i64;
        let from = from.clamp(0, len);
        let to = to.clamp(0, len);
        if from >= to {
            return ListValue::empty();
        }
        if from == 0 && to == len {
            return self.clone();
        }
        ListValue(Arc::new(Repr::Slice {
            inner: self.clone(),
            from: from as usize,
            len: (to - from) as usize,
        }))
    }

    /// Drops the first `n` elements.
    pub fn drop_first(&self, n: i64) -> ListValue {
        self.slice(n, self.len() as i64)
    }

    /// Keeps the first `n` elements.
    pub fn take(&self, n: i64) -> ListValue {
        self.slice(0, n)
    }

    /// All elements but the first.
    pub fn tail(&self) -> ListValue {
        self.drop_first(1)
    }

    /// Elements in reverse order.
    pub fn reverse(&self) -> ListValue {
        if let Repr::Reversed(inner) = &*self.0 {
            return inner.clone();
        }
        ListValue(Arc::new(Repr::Reversed(self.clone())))
    }

    /// Concatenation of `self` and `other`.
    pub fn concat(&self, other: &ListValue) -> ListValue {
        self.clone().into_concat(other)
    }

    /// Concatenation of `self` and `other`, extending `self` in place when it
    /// is a concatenation nothing else holds.
    pub fn into_concat(mut self, other: &ListValue) -> ListValue {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self;
        }
        if let Some(Repr::Concat { parts, len }) = Arc::get_mut(&mut self.0) {
            parts.push(other.clone());
            *len += other.len();
            return self;
        }
        let mut parts = match &*self.0 {
            Repr::Concat { parts, .. } => parts.clone(),
            _ => vec![self.clone()],
        };
        parts.push(other.clone());
        let len = self.len() + other.len();
        ListValue(Arc::new(Repr::Concat { parts, len }))
    }

    /// `self` with `value` appended.
    pub fn append(self, value: Value) -> ListValue {
        self.into_concat(&ListValue::from_vec(vec![value]))
    }

    /// `self` with `value` prepended.
    pub fn prepend(&self, value: Value) -> ListValue {
        ListValue::from_vec(vec![value]).concat(self)
    }

    pub(crate) fn estimated_heap_usage(&self) -> usize {
        match &*self.0 {
            Repr::Array(values) => values.iter().map(Value::estimated_heap_usage).sum(),
            Repr::Range { .. } => 24,
            Repr::Slice { .. } | Repr::Reversed(_) => 32,
            Repr::Concat { parts, .. } => 16 + parts.len() * 8,
        }
    }
}

impl Default for ListValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromIterator<Value> for ListValue {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        ListValue::from_vec(iter.into_iter().collect())
    }
}

impl IntoIterator for ListValue {
    type Item = Value;
    type IntoIter = ListIter;

    fn into_iter(self) -> ListIter {
        ListIter::new(self)
    }
}

impl IntoIterator for &ListValue {
    type Item = Value;
    type IntoIter = ListIter;

    fn into_iter(self) -> ListIter {
        self.iter()
    }
}

/// Owning forward iterator over a [`ListValue`].
///
/// Concatenations are walked part by part so each step is O(1).
#[derive(Clone, Debug)]
pub struct ListIter {
    parts: Vec<ListValue>,
    part: usize,
    pos: usize,
}

impl ListIter {
    fn new(list: ListValue) -> Self {
        let parts = match &*list.0 {
            Repr::Concat { parts, .. } => parts.clone(),
            _ => vec![list],
        };
        Self {
            parts,
            part: 0,
            pos: 0,
        }
    }
}

impl Iterator for ListIter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        while let Some(current) = self.parts.get(self.part) {
            if let Some(value) = current.get(self.pos) {
                self.pos += 1;
                return Some(value);
            }
            self.part += 1;
            self.pos = 0;
        }
        None
    }
}
