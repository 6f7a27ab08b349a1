//! Platform implementations of the system sources.
//!
//! # Platform Support
//!
//! - **Windows**: the NPF driver for adapter handles, the registry for the
//!   device-class and TCP/IP stores, and `GetAdaptersAddresses` for the
//!   network stack view.
//! - **Other platforms**: every source reports itself unsupported, so a
//!   registry built from [`system_sources`] is simply empty.

#[cfg(windows)]
mod windows;

mod unsupported;

#[cfg(windows)]
pub use windows::{IpHelperStack, NpfTransport, RegistryDeviceStore, RegistryTcpipStore};

pub use unsupported::UnsupportedSource;

use std::sync::Arc;

use super::SystemSources;

/// Builds the sources of the running system.
#[must_use]
#[cfg(windows)]
pub fn system_sources() -> SystemSources {
    SystemSources {
        transport: Arc::new(NpfTransport::new()),
        device_store: Arc::new(RegistryDeviceStore::new()),
        tcpip: Arc::new(RegistryTcpipStore::new()),
        network_stack: Arc::new(IpHelperStack::new()),
    }
}

/// Builds the sources of the running system.
#[must_use]
#[cfg(not(windows))]
pub fn system_sources() -> SystemSources {
    unsupported_sources()
}

/// Sources that all report themselves unsupported.
///
/// A registry built from these holds only what vendor scanners add.
#[must_use]
pub fn unsupported_sources() -> SystemSources {
    let source = Arc::new(UnsupportedSource::new());
    SystemSources {
        transport: source.clone(),
        device_store: source.clone(),
        tcpip: source.clone(),
        network_stack: source,
    }
}
