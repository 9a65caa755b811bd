//! Evaluation options shared by the stateful operators.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::error::{CypherError, Result};

/// Default number of distinct lists tracked by a membership cache.
pub const DEFAULT_IN_CACHE_CAPACITY: usize = 16;

/// Configuration supplied to operators that hold state across rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalOptions {
    /// Maximum number of list identities a membership cache remembers.
    pub in_cache_capacity: NonZeroUsize,
    /// Optional heap budget, in bytes, enforced by [`crate::memory::LocalMemoryTracker`].
    pub memory_limit: Option<usize>,
    /// Whether property reads raise on references deleted earlier in the transaction.
    pub raise_on_deleted_entity: bool,
}

impl EvalOptions {
    /// Creates options with default settings.
    pub fn new() -> Self {
        Self {
            in_cache_capacity: NonZeroUsize::new(DEFAULT_IN_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            memory_limit: None,
            raise_on_deleted_entity: true,
        }
    }

    /// Sets the membership cache capacity; zero is rejected.
    pub fn in_cache_capacity(mut self, capacity: usize) -> Result<Self> {
        self.in_cache_capacity = NonZeroUsize::new(capacity)
            .ok_or_else(|| CypherError::Config("in_cache_capacity must be non-zero".into()))?;
        Ok(self)
    }

    /// Sets the heap budget in bytes.
    pub fn memory_limit(mut self, bytes: usize) -> Self {
        self.memory_limit = Some(bytes);
        self
    }

    /// Enables or disables strict handling of same-transaction deletions.
    pub fn raise_on_deleted_entity(mut self, enabled: bool) -> Self {
        self.raise_on_deleted_entity = enabled;
        self
    }

    /// Parses options from a TOML document, filling omitted keys with defaults.
    ///
    /// ```
    /// use cypher_runtime::EvalOptions;
    ///
    /// let opts = EvalOptions::from_toml_str("in_cache_capacity = 4").unwrap();
    /// assert_eq!(opts.in_cache_capacity.get(), 4);
    /// assert!(opts.raise_on_deleted_entity);
    /// ```
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let raw: RawOptions =
            toml::from_str(contents).map_err(|err| CypherError::Config(err.to_string()))?;
        let mut opts = Self::new();
        if let Some(capacity) = raw.in_cache_capacity {
            opts = opts.in_cache_capacity(capacity)?;
        }
        opts.memory_limit = raw.memory_limit;
        if let Some(strict) = raw.raise_on_deleted_entity {
            opts.raise_on_deleted_entity = strict;
        }
        Ok(opts)
    }

    /// Renders the options as a TOML document.
    pub fn to_toml_string(&self) -> Result<String> {
        let raw = RawOptions {
            in_cache_capacity: Some(self.in_cache_capacity.get()),
            memory_limit: self.memory_limit,
            raise_on_deleted_entity: Some(self.raise_on_deleted_entity),
        };
        toml::to_string_pretty(&raw).map_err(|err| CypherError::Config(err.to_string()))
    }
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    in_cache_capacity: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    memory_limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    raise_on_deleted_entity: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = EvalOptions::default();
        assert_eq!(opts.in_cache_capacity.get(), DEFAULT_IN_CACHE_CAPACITY);
        assert_eq!(opts.memory_limit, None);
        assert!(opts.raise_on_deleted_entity);
    }

    #[test]
    fn toml_overrides_and_round_trips() -> Result<()> {
        let opts = EvalOptions::from_toml_str(
            "in_cache_capacity = 2\nmemory_limit = 4096\nraise_on_deleted_entity = false\n",
        )?;
        assert_eq!(opts.in_cache_capacity.get(), 2);
        assert_eq!(opts.memory_limit, Some(4096));
        assert!(!opts.raise_on_deleted_entity);
        let again = EvalOptions::from_toml_str(&opts.to_toml_string()?)?;
        assert_eq!(again, opts);
        Ok(())
    }

    #[test]
    fn rejects_zero_capacity_and_unknown_keys() {
        assert!(matches!(
            EvalOptions::from_toml_str("in_cache_capacity = 0"),
            Err(CypherError::Config(_))
        ));
        assert!(matches!(
            EvalOptions::from_toml_str("bogus = 1"),
            Err(CypherError::Config(_))
        ));
    }
}
