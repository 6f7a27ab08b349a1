//! Sources for platforms without an NPF driver.

use crate::source::{
    AdapterHandle, AdapterTransport, DeviceClassStore, DeviceEntry, InterfaceParameters,
    NetworkStackApi, SourceError, StackInterface, TcpipConfigStore,
};

/// Implements every source trait by reporting it unsupported.
#[derive(Debug, Clone, Default)]
pub struct UnsupportedSource {
    _private: (),
}

impl UnsupportedSource {
    /// Creates the source.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl AdapterTransport for UnsupportedSource {
    fn open(&self, _name: &str) -> Result<Box<dyn AdapterHandle + '_>, SourceError> {
        Err(SourceError::unsupported("adapter transport"))
    }
}

impl DeviceClassStore for UnsupportedSource {
    fn device_entries(&self) -> Result<Vec<DeviceEntry>, SourceError> {
        Err(SourceError::unsupported("device class store"))
    }

    fn binding_list(&self) -> Result<Vec<u8>, SourceError> {
        Err(SourceError::unsupported("binding list"))
    }
}

impl TcpipConfigStore for UnsupportedSource {
    fn interface_parameters(&self, _interface_id: &str) -> Result<InterfaceParameters, SourceError> {
        Err(SourceError::unsupported("tcpip configuration"))
    }
}

impl NetworkStackApi for UnsupportedSource {
    fn interfaces(&self) -> Result<Vec<StackInterface>, SourceError> {
        Err(SourceError::unsupported("network stack"))
    }
}
