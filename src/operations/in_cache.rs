//! Memoized `value IN list` checks against a stable list instance.
//!
//! The same right-hand list is usually evaluated once per row with a varying
//! left-hand value. [`InCache`] remembers, per list instance, which elements
//! have already been looked at (as a hash set) and where the walk over the
//! rest of the list stopped, so each element is pulled at most once.

use std::iter::Peekable;
use std::mem::size_of;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::error::Result;
use crate::memory::{MemoryTracker, ScopedMemoryTracker};
use crate::metrics::{default_metrics, EvalMetrics};
use crate::operations::boolean::in_list;
use crate::options::EvalOptions;
use crate::values::{ternary_equals, DurationValue, Equality, ListIter, ListValue, Value};

/// Hashable stand-in for a value whose equality is a plain identity check.
///
/// Two keys are equal exactly when the values they came from compare `True`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum MembershipKey {
    Boolean(bool),
    Integer(i64),
    FloatBits(u64),
    Text(Arc<str>),
    Date(time::Date),
    Time(i64),
    LocalTime(time::Time),
    DateTime(i128),
    LocalDateTime(time::PrimitiveDateTime),
    Duration(DurationValue),
    Node(u64),
    Relationship(u64),
}

const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

impl MembershipKey {
    /// `None` for values compared structurally (containers, points) and NaN.
    fn of(value: &Value) -> Option<Self> {
        Some(match value {
            Value::Boolean(b) => MembershipKey::Boolean(*b),
            Value::Integer(i) => MembershipKey::Integer(*i),
            Value::Float(f) if f.is_nan() => return None,
            Value::Float(f) if f.fract() == 0.0 && *f >= -I64_LIMIT && *f < I64_LIMIT => {
                MembershipKey::Integer(*f as i64)
            }
            Value::Float(f) => MembershipKey::FloatBits(f.to_bits()),
            Value::Text(s) => MembershipKey::Text(s.clone()),
            Value::Date(d) => MembershipKey::Date(*d),
            Value::Time(t) => MembershipKey::Time(t.utc_nanos()),
            Value::LocalTime(t) => MembershipKey::LocalTime(*t),
            Value::DateTime(dt) => MembershipKey::DateTime(dt.unix_timestamp_nanos()),
            Value::LocalDateTime(dt) => MembershipKey::LocalDateTime(*dt),
            Value::Duration(d) => MembershipKey::Duration(*d),
            Value::Node(n) => MembershipKey::Node(n.id.0),
            Value::Relationship(r) => MembershipKey::Relationship(r.id().0),
            _ => return None,
        })
    }
}

/// State kept for one list instance.
struct Entry {
    list: ListValue,
    visited: FxHashSet<MembershipKey>,
    /// Pulled elements that need a full three-valued comparison.
    structural: Vec<Value>,
    /// Kinds of every pulled element held in `visited` or skipped as NaN.
    kinds: u32,
    saw_undefined: bool,
    pending: Option<Peekable<ListIter>>,
    bytes: usize,
}

const ENTRY_OVERHEAD: usize = size_of::<Entry>() + size_of::<usize>();

impl Entry {
    fn new(list: ListValue) -> Self {
        Self {
            pending: Some(list.iter().peekable()),
            list,
            visited: FxHashSet::default(),
            structural: Vec::new(),
            kinds: 0,
            saw_undefined: false,
            bytes: ENTRY_OVERHEAD,
        }
    }

    fn check(&mut self, find: &Value, memory: &dyn MemoryTracker) -> Result<Equality> {
        let key = MembershipKey::of(find);
        if let Some(key) = &key {
            if self.visited.contains(key) {
                return Ok(Equality::True);
            }
        }
        let mut undefined = self.saw_undefined || self.kinds & !find.kind().bit() != 0;
        for element in &self.structural {
            match ternary_equals(element, find) {
                Equality::True => return Ok(Equality::True),
                Equality::Undefined => undefined = true,
                Equality::False => {}
            }
        }
        // An element leaves `pending` only once its memory is accounted.
        while let Some(element) = self.pending.as_mut().and_then(|p| p.peek().cloned()) {
            let outcome = ternary_equals(&element, find);
            self.remember(element, memory)?;
            if let Some(pending) = self.pending.as_mut() {
                pending.next();
            }
            match outcome {
                Equality::True => return Ok(Equality::True),
                Equality::Undefined => undefined = true,
                Equality::False => {}
            }
        }
        self.pending = None;
        Ok(if undefined {
            Equality::Undefined
        } else {
            Equality::False
        })
    }

    fn remember(&mut self, element: Value, memory: &dyn MemoryTracker) -> Result<()> {
        if element.is_undefined() {
            self.saw_undefined = true;
            return Ok(());
        }
        let bytes = element.estimated_heap_usage() + size_of::<MembershipKey>();
        memory.allocate_heap(bytes)?;
        self.bytes += bytes;
        match MembershipKey::of(&element) {
            Some(key) => {
                self.kinds |= element.kind().bit();
                self.visited.insert(key);
            }
            None if element.is_nan() => self.kinds |= element.kind().bit(),
            None => self.structural.push(element),
        }
        Ok(())
    }
}

/// Bounded LRU of per-list membership state, keyed by list instance.
///
/// Answers agree with [`in_list`] for every input. Retained memory is
/// accounted through a scope over the tracker passed at construction and
/// is released by [`InCache::close`] or on drop.
pub struct InCache<'t> {
    cache: LruCache<usize, Entry>,
    memory: ScopedMemoryTracker<'t>,
    metrics: Arc<dyn EvalMetrics>,
}

impl<'t> InCache<'t> {
    /// Creates a cache remembering at most `capacity` lists.
    pub fn new(capacity: NonZeroUsize, memory: &'t dyn MemoryTracker) -> Self {
        Self {
            cache: LruCache::new(capacity),
            memory: ScopedMemoryTracker::new(memory),
            metrics: default_metrics(),
        }
    }

    /// Creates a cache sized by [`EvalOptions::in_cache_capacity`].
    pub fn with_options(options: &EvalOptions, memory: &'t dyn MemoryTracker) -> Self {
        Self::new(options.in_cache_capacity, memory)
    }

    /// Routes lookup and eviction counts to `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<dyn EvalMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Three-valued `value IN list`.
    ///
    /// Only list values are memoized; any other right-hand side is answered
    /// directly. Fails with [`crate::CypherError::MemoryLimitExceeded`] when
    /// remembering pulled elements exceeds the budget.
    pub fn check(&mut self, value: &Value, list: &Value) -> Result<Equality> {
        let Value::List(list) = list else {
            return Ok(in_list(value, list));
        };
        if list.is_empty() {
            return Ok(Equality::False);
        }
        if value.is_undefined() {
            return Ok(Equality::Undefined);
        }
        let identity = list.identity();
        let cached = matches!(self.cache.peek(&identity), Some(e) if e.list.same_instance(list));
        self.metrics.in_cache_lookup(cached);
        if !cached {
            self.insert(identity, list.clone())?;
        }
        match self.cache.get_mut(&identity) {
            Some(entry) => entry.check(value, &self.memory),
            None => Ok(in_list(value, &Value::List(list.clone()))),
        }
    }

    fn insert(&mut self, identity: usize, list: ListValue) -> Result<()> {
        self.memory.allocate_heap(ENTRY_OVERHEAD)?;
        trace!(identity, len = list.len(), "in_cache.entry_created");
        let replaced_same_key = self.cache.contains(&identity);
        if let Some((evicted_key, evicted)) = self.cache.push(identity, Entry::new(list)) {
            if !replaced_same_key {
                self.metrics.in_cache_eviction();
                trace!(identity = evicted_key, bytes = evicted.bytes, "in_cache.entry_evicted");
            }
            self.memory.release_heap(evicted.bytes);
        }
        Ok(())
    }

    /// Number of lists currently remembered.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Whether no list is remembered.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Bytes currently accounted by this cache.
    pub fn estimated_heap_memory(&self) -> usize {
        self.memory.estimated_heap_memory()
    }

    /// Forgets every list and releases all accounted memory.
    pub fn close(&mut self) {
        if !self.cache.is_empty() {
            debug!(entries = self.cache.len(), bytes = self.memory.estimated_heap_memory(), "in_cache.closed");
        }
        self.cache.clear();
        self.memory.close();
    }
}

impl Drop for InCache<'_> {
    fn drop(&mut self) {
        self.close();
    }
}
