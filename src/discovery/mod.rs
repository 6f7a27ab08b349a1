//! Adapter discovery: scanners that turn system sources into records.
//!
//! # Architecture
//!
//! - [`PrimarySourceScanner`]: device-class store (or the legacy binding
//!   list), opening every candidate for a full record.
//! - [`SecondarySourceScanner`]: the network stack's structured view,
//!   adding what the primary pass missed with a narrower record.
//! - [`AddressParser`] and [`LinkLayerProbe`]: shared by both scanners.
//!
//! Scanners never touch registry storage directly. They write through an
//! [`AdapterSink`], which performs the idempotent insert under the
//! registry lock.

mod address;
mod error;
mod link;
mod primary;
mod secondary;

#[cfg(test)]
pub(crate) mod test_sink;

pub use address::{AddressParser, split_multi_sz};
pub use error::ScanError;
pub use link::LinkLayerProbe;
pub use primary::PrimarySourceScanner;
pub use secondary::SecondarySourceScanner;

use crate::adapter::AdapterRecord;

/// Canonical transport namespace prepended to raw adapter identifiers.
pub const DEFAULT_DEVICE_PREFIX: &str = "\\Device\\NPF_";

/// Component-id substring identifying firewire adapters.
pub const DEFAULT_FIREWIRE_MARKER: &str = "1394";

/// Device path every linkage export starts with.
pub const DEVICE_PATH: &str = "\\Device\\";

/// Where scanned records go.
///
/// Implemented by the registry; every method takes the registry lock only
/// for its own duration.
pub trait AdapterSink {
    /// Returns true if a record with this name is already stored.
    fn contains(&self, name: &str) -> bool;

    /// Stores the record unless one with the same name exists.
    ///
    /// Returns false when the record was discarded as a duplicate.
    fn insert(&self, record: AdapterRecord) -> bool;

    /// Name of the adapter that reported the null medium, if any.
    fn loopback_name(&self) -> Option<String>;

    /// Designates the loopback adapter.
    fn set_loopback_name(&self, name: &str);
}

/// A source of adapter records run during every full populate.
pub trait AdapterScanner: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Scans the source and inserts every adapter found.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] when the whole pass had to stop; per-candidate
    /// failures are logged and skipped.
    fn scan(&self, sink: &dyn AdapterSink) -> Result<(), ScanError>;
}

/// What happened to one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// A new record was stored.
    Inserted,
    /// A record with the same name was already stored.
    AlreadyPresent,
    /// The candidate is deliberately not represented by this scanner.
    Skipped,
}

impl Admission {
    /// Returns true when the registry now holds a record for the candidate.
    #[must_use]
    pub const fn is_stored(self) -> bool {
        matches!(self, Self::Inserted | Self::AlreadyPresent)
    }
}

/// Naming and classification rules shared by the scanners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Transport namespace prepended to raw identifiers.
    pub device_prefix: String,
    /// Case-insensitive component-id marker for firewire adapters.
    pub firewire_marker: String,
    /// Whether the secondary scanner runs.
    pub secondary_scan: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            device_prefix: DEFAULT_DEVICE_PREFIX.to_string(),
            firewire_marker: DEFAULT_FIREWIRE_MARKER.to_string(),
            secondary_scan: true,
        }
    }
}

impl ScanOptions {
    /// Forms the canonical adapter name for a raw identifier.
    #[must_use]
    pub fn adapter_name(&self, raw_id: &str) -> String {
        format!("{}{raw_id}", self.device_prefix)
    }

    /// Forms the canonical name from a linkage export (`\Device\{GUID}`).
    ///
    /// Returns `None` when the export is outside the device namespace.
    #[must_use]
    pub fn name_from_export(&self, export: &str) -> Option<String> {
        export
            .strip_prefix(DEVICE_PATH)
            .map(|raw_id| self.adapter_name(raw_id))
    }

    /// Recovers the interface identifier used by the TCP/IP store and the
    /// network stack: the last path component without the device-name
    /// prefix.
    #[must_use]
    pub fn interface_id<'a>(&self, name: &'a str) -> &'a str {
        let tail = name.rsplit('\\').next().unwrap_or(name);
        let namespace = self.device_prefix.rsplit('\\').next().unwrap_or_default();
        if namespace.is_empty() {
            return tail;
        }
        tail.strip_prefix(namespace).unwrap_or(tail)
    }

    /// Returns true when the component id marks a firewire adapter.
    #[must_use]
    pub fn is_firewire(&self, component_id: &str) -> bool {
        component_id
            .to_ascii_lowercase()
            .contains(&self.firewire_marker.to_ascii_lowercase())
    }
}

/// Allocates a zeroed probe buffer, reporting exhaustion instead of aborting.
pub(crate) fn zeroed_buffer(len: usize) -> Result<Vec<u8>, ScanError> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len)?;
    buffer.resize(len, 0);
    Ok(buffer)
}
