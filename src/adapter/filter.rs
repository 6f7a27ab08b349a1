//! Record filtering for selective listing.
//!
//! # Design
//!
//! - **Pure Matchers**: [`FlagsFilter`] and [`NameRegexFilter`] only answer
//!   "does this record match?" without include/exclude semantics.
//! - **Filter Chain**: [`FilterChain`] combines matchers:
//!   - Exclude filters: AND logic (must pass ALL excludes)
//!   - Include filters: OR logic (pass ANY include, empty = match all)

use std::collections::HashSet;

use regex::Regex;

use super::{AdapterFlags, AdapterRecord};

/// Trait for filtering adapter records.
///
/// Filters must be `Send + Sync` so a chain can be shared with the registry
/// across threads.
pub trait AdapterFilter: Send + Sync {
    /// Returns `true` if the record matches.
    fn matches(&self, record: &AdapterRecord) -> bool;
}

/// Matches records whose flags are contained in the configured set.
///
/// # Examples
///
/// ```
/// use npf_adinfo::adapter::filter::{AdapterFilter, FlagsFilter};
/// use npf_adinfo::adapter::{AdapterFlags, AdapterRecord};
///
/// let filter = FlagsFilter::new([AdapterFlags::DoNotExport]);
///
/// assert!(filter.matches(&AdapterRecord::do_not_export("\\Device\\NPF_{A}")));
/// assert!(!filter.matches(&AdapterRecord::new("\\Device\\NPF_{B}")));
/// ```
#[derive(Debug, Clone)]
pub struct FlagsFilter {
    flags: HashSet<AdapterFlags>,
}

impl FlagsFilter {
    /// Creates a filter matching any of the given flags.
    #[must_use]
    pub fn new(flags: impl IntoIterator<Item = AdapterFlags>) -> Self {
        Self {
            flags: flags.into_iter().collect(),
        }
    }

    /// Returns true if no flags are configured (matches nothing).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl AdapterFilter for FlagsFilter {
    fn matches(&self, record: &AdapterRecord) -> bool {
        self.flags.contains(&record.flags)
    }
}

/// Matches records by name or description pattern.
///
/// # Examples
///
/// ```
/// use npf_adinfo::adapter::filter::{AdapterFilter, NameRegexFilter};
/// use npf_adinfo::adapter::AdapterRecord;
///
/// let filter = NameRegexFilter::new(r"(?i)loopback").unwrap();
///
/// let mut loopback = AdapterRecord::new("\\Device\\NPF_Loopback");
/// loopback.set_description("Npcap Loopback Adapter");
/// let ethernet = AdapterRecord::new("\\Device\\NPF_{0A1B}");
///
/// assert!(filter.matches(&loopback));
/// assert!(!filter.matches(&ethernet));
/// ```
#[derive(Debug)]
pub struct NameRegexFilter {
    pattern: Regex,
}

impl NameRegexFilter {
    /// Creates a name filter with the given regex pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the regex pattern is invalid.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// Returns a reference to the regex pattern.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Regex is not a const type
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

impl AdapterFilter for NameRegexFilter {
    fn matches(&self, record: &AdapterRecord) -> bool {
        self.pattern.is_match(&record.name) || self.pattern.is_match(&record.description)
    }
}

/// Filter chain with include/exclude semantics.
///
/// Evaluation order:
/// 1. **Exclude filters (AND)**: Any match → reject.
/// 2. **Include filters (OR)**: Any match → accept. Empty includes = match all.
#[derive(Default)]
pub struct FilterChain {
    includes: Vec<Box<dyn AdapterFilter>>,
    excludes: Vec<Box<dyn AdapterFilter>>,
}

impl FilterChain {
    /// Creates an empty filter chain (matches all records).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an include filter (OR semantics).
    #[must_use]
    pub fn include<F: AdapterFilter + 'static>(mut self, filter: F) -> Self {
        self.includes.push(Box::new(filter));
        self
    }

    /// Adds an exclude filter (any match rejects).
    #[must_use]
    pub fn exclude<F: AdapterFilter + 'static>(mut self, filter: F) -> Self {
        self.excludes.push(Box::new(filter));
        self
    }

    /// Returns the number of include filters.
    #[must_use]
    pub fn include_count(&self) -> usize {
        self.includes.len()
    }

    /// Returns the number of exclude filters.
    #[must_use]
    pub fn exclude_count(&self) -> usize {
        self.excludes.len()
    }

    /// Returns true if no filters are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }

    /// Keeps the records that pass the chain, preserving order.
    pub fn apply<I, R>(&self, records: I) -> Vec<R>
    where
        I: IntoIterator<Item = R>,
        R: std::ops::Deref<Target = AdapterRecord>,
    {
        records
            .into_iter()
            .filter(|record| self.matches(record))
            .collect()
    }
}

impl AdapterFilter for FilterChain {
    fn matches(&self, record: &AdapterRecord) -> bool {
        if self.excludes.iter().any(|f| f.matches(record)) {
            return false;
        }

        self.includes.is_empty() || self.includes.iter().any(|f| f.matches(record))
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("include_count", &self.includes.len())
            .field("exclude_count", &self.excludes.len())
            .finish()
    }
}

impl<T: AdapterFilter + ?Sized> AdapterFilter for &T {
    fn matches(&self, record: &AdapterRecord) -> bool {
        (*self).matches(record)
    }
}

impl AdapterFilter for Box<dyn AdapterFilter> {
    fn matches(&self, record: &AdapterRecord) -> bool {
        self.as_ref().matches(record)
    }
}
