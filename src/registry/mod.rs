//! The shared adapter registry.
//!
//! # Locking
//!
//! - `rebuild` serializes whole passes ([`AdapterRegistry::populate`] and
//!   [`AdapterRegistry::update`]).
//! - `state` guards the record list. Scanners do their slow I/O without it
//!   and take it only for the duplicate check and the insert.
//!
//! [`AdapterRegistry::find`] reads without the rebuild lock. Two callers
//! finding an empty registry may both populate it; the second pass simply
//! rebuilds the same content.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use crate::adapter::AdapterRecord;
use crate::discovery::{
    AdapterScanner, AdapterSink, PrimarySourceScanner, ScanError, ScanOptions,
    SecondarySourceScanner,
};
use crate::source::SystemSources;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

/// What [`AdapterRegistry::update`] did.
///
/// Both outcomes are successful; whether the adapter exists afterwards is
/// answered by [`AdapterRegistry::find`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The primary scan rebuilt the record.
    Refreshed,
    /// The primary scan could not rebuild it; the secondary scan was re-run.
    Rescanned,
}

#[derive(Debug, Default)]
struct RegistryState {
    records: Vec<Arc<AdapterRecord>>,
    loopback_name: Option<String>,
}

impl RegistryState {
    fn contains(&self, name: &str) -> bool {
        self.records.iter().any(|record| record.name == name)
    }
}

/// Shared store of adapter records, rebuilt from live system sources.
///
/// Records are handed out as `Arc<AdapterRecord>` snapshots; the registry
/// never mutates a record after inserting it.
///
/// # Examples
///
/// ```
/// use npf_adinfo::discovery::ScanOptions;
/// use npf_adinfo::registry::AdapterRegistry;
/// use npf_adinfo::source::platform::system_sources;
///
/// let registry = AdapterRegistry::new(system_sources(), ScanOptions::default());
/// registry.populate();
///
/// for record in registry.records() {
///     println!("{} {}", record.name, record.description);
/// }
/// ```
pub struct AdapterRegistry {
    primary: PrimarySourceScanner,
    secondary: Option<SecondarySourceScanner>,
    vendors: Vec<Box<dyn AdapterScanner>>,
    rebuild: Mutex<()>,
    state: RwLock<RegistryState>,
}

impl AdapterRegistry {
    /// Creates an empty registry reading from the given sources.
    ///
    /// The secondary scanner is included when `options.secondary_scan` is set.
    #[must_use]
    pub fn new(sources: SystemSources, options: ScanOptions) -> Self {
        let secondary = options
            .secondary_scan
            .then(|| SecondarySourceScanner::new(sources.clone(), options.clone()));

        Self {
            primary: PrimarySourceScanner::new(sources, options),
            secondary,
            vendors: Vec::new(),
            rebuild: Mutex::new(()),
            state: RwLock::new(RegistryState::default()),
        }
    }

    /// Appends a vendor scanner, run after the built-in scanners.
    #[must_use]
    pub fn with_scanner<S: AdapterScanner + 'static>(mut self, scanner: S) -> Self {
        self.vendors.push(Box::new(scanner));
        self
    }

    /// Discards every record and rebuilds the registry from all scanners.
    ///
    /// Unavailable sources are skipped; the result may be empty.
    pub fn populate(&self) {
        let _rebuild = self.lock_rebuild();
        *self.write() = RegistryState::default();

        let writer = RegistryWriter { state: &self.state };
        self.run(&self.primary, &writer);
        if let Some(secondary) = &self.secondary {
            self.run(secondary, &writer);
        }
        for vendor in &self.vendors {
            self.run(vendor.as_ref(), &writer);
        }

        info!(adapters = self.len(), "registry populated");
    }

    /// Looks up a record by exact name, populating an empty registry first.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<Arc<AdapterRecord>> {
        if self.is_empty() {
            debug!("registry empty, populating before lookup");
            self.populate();
        }

        self.read()
            .records
            .iter()
            .find(|record| record.name == name)
            .cloned()
    }

    /// Replaces the record for `name` with a freshly scanned one.
    ///
    /// The old record is removed first. If the primary scan cannot rebuild
    /// the adapter, the secondary scan is re-run over the whole system.
    pub fn update(&self, name: &str) -> UpdateOutcome {
        let _rebuild = self.lock_rebuild();
        {
            let mut state = self.write();
            let before = state.records.len();
            state.records.retain(|record| record.name != name);
            debug!(adapter = %name, removed = before - state.records.len(), "stale record removed");
        }

        let writer = RegistryWriter { state: &self.state };
        match self.primary.scan_adapter(name, &writer) {
            Ok(admission) if admission.is_stored() => {
                debug!(adapter = %name, ?admission, "adapter refreshed");
                return UpdateOutcome::Refreshed;
            }
            Ok(admission) => debug!(adapter = %name, ?admission, "adapter not rebuilt"),
            Err(error) => debug!(adapter = %name, %error, "adapter not rebuilt"),
        }

        if let Some(secondary) = &self.secondary {
            self.run(secondary, &writer);
        }
        UpdateOutcome::Rescanned
    }

    /// Snapshot of every record, in insertion order.
    #[must_use]
    pub fn records(&self) -> Vec<Arc<AdapterRecord>> {
        self.read().records.clone()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    /// Returns true when the registry holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().records.is_empty()
    }

    /// Name of the adapter designated as loopback by the last rebuild.
    #[must_use]
    pub fn loopback_name(&self) -> Option<String> {
        self.read().loopback_name.clone()
    }

    fn run(&self, scanner: &dyn AdapterScanner, writer: &RegistryWriter<'_>) {
        let before = self.len();
        match scanner.scan(writer) {
            Ok(()) => info!(
                scanner = scanner.name(),
                added = self.len().saturating_sub(before),
                "scan pass complete"
            ),
            Err(error @ ScanError::SourceUnavailable { .. }) => {
                warn!(scanner = scanner.name(), %error, "source skipped");
            }
            Err(error) => warn!(scanner = scanner.name(), %error, "scan pass aborted"),
        }
    }

    fn lock_rebuild(&self) -> MutexGuard<'_, ()> {
        self.rebuild.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        read_state(&self.state)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        write_state(&self.state)
    }
}

/// Lock access that survives poisoning.
fn read_state(state: &RwLock<RegistryState>) -> RwLockReadGuard<'_, RegistryState> {
    state.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_state(state: &RwLock<RegistryState>) -> RwLockWriteGuard<'_, RegistryState> {
    state.write().unwrap_or_else(PoisonError::into_inner)
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("adapters", &self.len())
            .field("secondary", &self.secondary.is_some())
            .field("vendor_scanners", &self.vendors.len())
            .finish_non_exhaustive()
    }
}

/// The sink scanners write through; each call takes the state lock briefly.
struct RegistryWriter<'a> {
    state: &'a RwLock<RegistryState>,
}

impl AdapterSink for RegistryWriter<'_> {
    fn contains(&self, name: &str) -> bool {
        read_state(self.state).contains(name)
    }

    fn insert(&self, record: AdapterRecord) -> bool {
        let mut state = write_state(self.state);
        if state.contains(&record.name) {
            debug!(adapter = %record.name, "duplicate discarded");
            return false;
        }
        state.records.push(Arc::new(record));
        true
    }

    fn loopback_name(&self) -> Option<String> {
        read_state(self.state).loopback_name.clone()
    }

    fn set_loopback_name(&self, name: &str) {
        write_state(self.state).loopback_name = Some(name.to_string());
    }
}
