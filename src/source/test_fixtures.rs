//! Shared fakes for every system source, used by discovery and registry tests.

use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{
    AdapterHandle, AdapterTransport, DeviceClassStore, DeviceEntry, InterfaceParameters,
    NetworkStackApi, RequestKind, SourceError, StackInterface, SystemSources, TcpipConfigStore,
    oid,
};

/// Transport namespace used throughout the tests.
pub const PREFIX: &str = "\\Device\\NPF_";

/// Builds a canonical adapter name from a raw interface id.
pub fn npf_name(id: &str) -> String {
    format!("{PREFIX}{id}")
}

/// Packs strings into a double-NUL-terminated multi-string.
pub fn multi_sz(items: &[&str]) -> Vec<u8> {
    let mut out = Vec::new();
    for item in items {
        out.extend_from_slice(item.as_bytes());
        out.push(0);
    }
    out.push(0);
    out
}

/// What a fake adapter answers to property requests.
#[derive(Debug, Clone, Default)]
pub struct FakeAdapter {
    /// Media code; `None` makes the media query fail.
    pub medium: Option<u32>,
    /// Transmit and receive speeds; `None` makes the speed query fail.
    pub link_speed: Option<(u64, u64)>,
    /// Station address; `None` makes the address query fail.
    pub mac: Option<Vec<u8>>,
    /// Vendor description; `None` makes the description query fail.
    pub description: Option<String>,
}

impl FakeAdapter {
    /// An Ethernet adapter answering every query.
    pub fn ethernet(description: &str, mac: [u8; 6]) -> Self {
        Self {
            medium: Some(0),
            link_speed: Some((1_000_000_000, 1_000_000_000)),
            mac: Some(mac.to_vec()),
            description: Some(description.to_string()),
        }
    }

    /// A loopback adapter reporting the null medium.
    pub fn null_medium(description: &str) -> Self {
        Self {
            medium: Some(u32::MAX),
            link_speed: None,
            mac: None,
            description: Some(description.to_string()),
        }
    }
}

/// Fake transport counting opens, closes, and requests.
#[derive(Debug, Default)]
pub struct FakeTransport {
    adapters: Mutex<HashMap<String, FakeAdapter>>,
    opened: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
    successful_opens: AtomicUsize,
    closes: AtomicUsize,
    requests: AtomicUsize,
}

impl FakeTransport {
    pub fn set_adapter(&self, name: &str, adapter: FakeAdapter) {
        self.adapters
            .lock()
            .unwrap()
            .insert(name.to_string(), adapter);
    }

    pub fn remove_adapter(&self, name: &str) {
        self.adapters.lock().unwrap().remove(name);
    }

    /// Makes the next open of `name` fail; later opens succeed again.
    pub fn fail_next_open(&self, name: &str) {
        self.failing.lock().unwrap().insert(name.to_string());
    }

    /// Names passed to `open`, in call order (including failed opens).
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    /// Number of successful opens.
    pub fn successful_opens(&self) -> usize {
        self.successful_opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

struct FakeHandle<'a> {
    adapter: FakeAdapter,
    transport: &'a FakeTransport,
}

impl AdapterHandle for FakeHandle<'_> {
    fn request(
        &mut self,
        _kind: RequestKind,
        code: u32,
        buffer: &mut [u8],
    ) -> Result<usize, SourceError> {
        self.transport.requests.fetch_add(1, Ordering::SeqCst);

        let payload: Vec<u8> = match code {
            oid::GEN_MEDIA_IN_USE => self.adapter.medium.map(|m| m.to_le_bytes().to_vec()),
            oid::GEN_LINK_SPEED_EX => self.adapter.link_speed.map(|(xmit, rcv)| {
                let mut bytes = xmit.to_le_bytes().to_vec();
                bytes.extend_from_slice(&rcv.to_le_bytes());
                bytes
            }),
            oid::CURRENT_802_3_ADDRESS => self.adapter.mac.clone(),
            oid::GEN_VENDOR_DESCRIPTION => self.adapter.description.as_ref().map(|d| {
                let mut bytes = d.as_bytes().to_vec();
                bytes.push(0);
                bytes
            }),
            _ => None,
        }
        .ok_or_else(|| SourceError::not_found(format!("oid {code:#x}")))?;

        if payload.len() > buffer.len() {
            return Err(SourceError::Platform {
                message: "buffer too small".to_string(),
            });
        }
        buffer[..payload.len()].copy_from_slice(&payload);
        Ok(payload.len())
    }
}

impl Drop for FakeHandle<'_> {
    fn drop(&mut self) {
        self.transport.closes.fetch_add(1, Ordering::SeqCst);
    }
}

impl AdapterTransport for FakeTransport {
    fn open(&self, name: &str) -> Result<Box<dyn AdapterHandle + '_>, SourceError> {
        self.opened.lock().unwrap().push(name.to_string());
        if self.failing.lock().unwrap().remove(name) {
            return Err(SourceError::not_found(name));
        }
        let adapter = self
            .adapters
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| SourceError::not_found(name))?;
        self.successful_opens.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(FakeHandle {
            adapter,
            transport: self,
        }))
    }
}

/// Fake device-class store; `None` means the store is missing.
#[derive(Debug, Default)]
pub struct FakeDeviceStore {
    entries: Mutex<Option<Vec<DeviceEntry>>>,
    bindings: Mutex<Option<Vec<u8>>>,
}

impl FakeDeviceStore {
    pub fn set_entries(&self, entries: Vec<DeviceEntry>) {
        *self.entries.lock().unwrap() = Some(entries);
    }

    pub fn set_bindings(&self, bindings: Vec<u8>) {
        *self.bindings.lock().unwrap() = Some(bindings);
    }
}

impl DeviceClassStore for FakeDeviceStore {
    fn device_entries(&self) -> Result<Vec<DeviceEntry>, SourceError> {
        self.entries
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SourceError::unsupported("device class store"))
    }

    fn binding_list(&self) -> Result<Vec<u8>, SourceError> {
        self.bindings
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SourceError::not_found("Tcpip\\Linkage\\Bind"))
    }
}

/// A device-class entry exporting `\Device\<id>`.
pub fn device_entry(id: &str) -> DeviceEntry {
    DeviceEntry {
        key: "0001".to_string(),
        component_id: Some("pci\\ven_8086&dev_15b8".to_string()),
        if_type: Some(6),
        export: Some(format!("\\Device\\{id}")),
    }
}

/// Fake per-interface TCP/IP store.
#[derive(Debug, Default)]
pub struct FakeTcpip {
    params: Mutex<HashMap<String, InterfaceParameters>>,
}

impl FakeTcpip {
    pub fn set(&self, interface_id: &str, params: InterfaceParameters) {
        self.params
            .lock()
            .unwrap()
            .insert(interface_id.to_string(), params);
    }
}

impl TcpipConfigStore for FakeTcpip {
    fn interface_parameters(&self, interface_id: &str) -> Result<InterfaceParameters, SourceError> {
        self.params
            .lock()
            .unwrap()
            .get(interface_id)
            .cloned()
            .ok_or_else(|| SourceError::not_found(interface_id))
    }
}

/// Static IPv4 configuration for the fake TCP/IP store.
pub fn static_params(addresses: &[&str], masks: &[&str]) -> InterfaceParameters {
    InterfaceParameters {
        enable_dhcp: Some(0),
        use_zero_broadcast: Some(0),
        ip_address: Some(multi_sz(addresses)),
        subnet_mask: Some(multi_sz(masks)),
        dhcp_ip_address: None,
        dhcp_subnet_mask: None,
    }
}

/// Fake network-stack API; `None` means the API is missing.
#[derive(Debug, Default)]
pub struct FakeNetworkStack {
    interfaces: Mutex<Option<Vec<StackInterface>>>,
    calls: AtomicUsize,
}

impl FakeNetworkStack {
    pub fn set_interfaces(&self, interfaces: Vec<StackInterface>) {
        *self.interfaces.lock().unwrap() = Some(interfaces);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl NetworkStackApi for FakeNetworkStack {
    fn interfaces(&self) -> Result<Vec<StackInterface>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.interfaces
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| SourceError::unsupported("network stack"))
    }
}

/// A stack interface with one IPv4 address and the given extra unicast addresses.
pub fn stack_interface(id: &str, ipv4: Option<(&str, &str)>, extra: &[&str]) -> StackInterface {
    let mut unicast: Vec<IpAddr> = extra.iter().map(|a| a.parse().unwrap()).collect();
    let ipv4: Vec<(Ipv4Addr, Ipv4Addr)> = ipv4
        .map(|(a, m)| (a.parse().unwrap(), m.parse().unwrap()))
        .into_iter()
        .collect();
    for (address, _) in &ipv4 {
        unicast.insert(0, IpAddr::V4(*address));
    }

    StackInterface {
        adapter_name: id.to_string(),
        if_type: 6,
        description: format!("Stack adapter {id}"),
        physical_address: vec![0x02, 0x00, 0x00, 0x00, 0x00, 0x01],
        ipv4,
        unicast,
    }
}

/// Every fake source, shared with the engine through [`SystemSources`].
#[derive(Debug, Default)]
pub struct FakeSystem {
    pub transport: Arc<FakeTransport>,
    pub device_store: Arc<FakeDeviceStore>,
    pub tcpip: Arc<FakeTcpip>,
    pub network_stack: Arc<FakeNetworkStack>,
}

impl FakeSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sources(&self) -> SystemSources {
        SystemSources {
            transport: self.transport.clone(),
            device_store: self.device_store.clone(),
            tcpip: self.tcpip.clone(),
            network_stack: self.network_stack.clone(),
        }
    }
}
