//! System sources the discovery engine reads adapter information from.
//!
//! Every source is a trait so the engine can be driven by the live system
//! ([`platform`]) or by fakes in tests:
//! - [`AdapterTransport`] / [`AdapterHandle`]: open an adapter and issue
//!   OID-style property requests
//! - [`DeviceClassStore`]: the network device-class configuration store and
//!   its legacy binding list
//! - [`TcpipConfigStore`]: per-interface TCP/IP text configuration
//! - [`NetworkStackApi`]: the structured per-interface view of the network stack

mod error;
pub mod platform;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::SourceError;

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

/// Property codes understood by [`AdapterHandle::request`].
pub mod oid {
    /// Medium currently in use (4-byte code).
    pub const GEN_MEDIA_IN_USE: u32 = 0x0001_0104;
    /// Vendor description string.
    pub const GEN_VENDOR_DESCRIPTION: u32 = 0x0001_010D;
    /// Transmit and receive link speed (two 8-byte values).
    pub const GEN_LINK_SPEED_EX: u32 = 0x0001_0207;
    /// Current 802.3 station address.
    pub const CURRENT_802_3_ADDRESS: u32 = 0x0101_0102;
}

/// Interface type codes reported by the network stack.
pub mod if_type {
    /// Ethernet.
    pub const ETHERNET_CSMACD: u32 = 6;
    /// Point-to-point protocol.
    pub const PPP: u32 = 23;
    /// Software loopback.
    pub const SOFTWARE_LOOPBACK: u32 = 24;
    /// Serial line IP.
    pub const SLIP: u32 = 28;
    /// 802.11 wireless.
    pub const IEEE80211: u32 = 71;

    /// Returns true for point-to-point and serial interfaces.
    #[must_use]
    pub const fn is_point_to_point(if_type: u32) -> bool {
        matches!(if_type, PPP | SLIP)
    }
}

/// Direction of a property request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Read the property into the buffer.
    Query,
    /// Write the buffer to the property.
    Set,
}

/// An open adapter. Dropping the handle closes it.
pub trait AdapterHandle {
    /// Issues a property request against the adapter.
    ///
    /// For [`RequestKind::Query`] the buffer is filled with the property
    /// value; for [`RequestKind::Set`] it supplies the value.
    ///
    /// # Returns
    ///
    /// The number of meaningful bytes in `buffer`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the driver rejects the request.
    fn request(&mut self, kind: RequestKind, oid: u32, buffer: &mut [u8])
    -> Result<usize, SourceError>;
}

/// The capture transport used to open adapters by canonical name.
pub trait AdapterTransport: Send + Sync {
    /// Opens the adapter with the given canonical name.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the adapter does not exist or cannot
    /// be opened (for example because it is disabled).
    fn open(&self, name: &str) -> Result<Box<dyn AdapterHandle + '_>, SourceError>;
}

/// One entry of the network device-class configuration store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceEntry {
    /// Name of the entry inside the store (for diagnostics).
    pub key: String,
    /// Component or hardware class identifier, if readable.
    pub component_id: Option<String>,
    /// Interface type code, if the entry records one.
    pub if_type: Option<u32>,
    /// Linkage export name (`\Device\{GUID}`), if readable.
    pub export: Option<String>,
}

/// Read-only access to the network device-class configuration store.
pub trait DeviceClassStore: Send + Sync {
    /// Enumerates every entry of the network device class.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the store itself cannot be opened.
    fn device_entries(&self) -> Result<Vec<DeviceEntry>, SourceError>;

    /// Reads the legacy binding list: NUL-terminated device paths,
    /// terminated by an extra NUL.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the binding list cannot be read.
    fn binding_list(&self) -> Result<Vec<u8>, SourceError>;
}

/// Raw per-interface TCP/IP configuration values.
///
/// Address values are multi-strings of dotted-decimal text, exactly as
/// stored by the system.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceParameters {
    /// `EnableDHCP`.
    pub enable_dhcp: Option<u32>,
    /// `UseZeroBroadcast`.
    pub use_zero_broadcast: Option<u32>,
    /// `IPAddress`.
    pub ip_address: Option<Vec<u8>>,
    /// `SubnetMask`.
    pub subnet_mask: Option<Vec<u8>>,
    /// `DhcpIPAddress`.
    pub dhcp_ip_address: Option<Vec<u8>>,
    /// `DhcpSubnetMask`.
    pub dhcp_subnet_mask: Option<Vec<u8>>,
}

/// Read-only access to per-interface TCP/IP text configuration.
pub trait TcpipConfigStore: Send + Sync {
    /// Reads the parameters of the interface with the given identifier
    /// (the adapter name without device path and namespace prefix).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the interface has no configuration.
    fn interface_parameters(&self, interface_id: &str) -> Result<InterfaceParameters, SourceError>;
}

/// One interface as reported by the network stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackInterface {
    /// Raw adapter identifier (`{GUID}`).
    pub adapter_name: String,
    /// Interface type code (see [`if_type`]).
    pub if_type: u32,
    /// Adapter description.
    pub description: String,
    /// Physical address bytes.
    pub physical_address: Vec<u8>,
    /// IPv4 `(address, mask)` pairs.
    pub ipv4: Vec<(Ipv4Addr, Ipv4Addr)>,
    /// Every unicast address, both families.
    pub unicast: Vec<IpAddr>,
}

/// The higher-level network-stack adapter API.
pub trait NetworkStackApi: Send + Sync {
    /// Lists every interface visible to the network stack.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Unsupported`] when the API is absent and
    /// other variants when the call fails.
    fn interfaces(&self) -> Result<Vec<StackInterface>, SourceError>;
}

/// The complete set of sources one registry reads from.
#[derive(Clone)]
pub struct SystemSources {
    /// Adapter transport.
    pub transport: Arc<dyn AdapterTransport>,
    /// Device-class configuration store.
    pub device_store: Arc<dyn DeviceClassStore>,
    /// Per-interface TCP/IP configuration.
    pub tcpip: Arc<dyn TcpipConfigStore>,
    /// Network-stack adapter API.
    pub network_stack: Arc<dyn NetworkStackApi>,
}

impl std::fmt::Debug for SystemSources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemSources").finish_non_exhaustive()
    }
}
