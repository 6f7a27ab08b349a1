//! Network-stack view via `GetAdaptersAddresses`.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use windows::Win32::Foundation::{ERROR_BUFFER_OVERFLOW, NO_ERROR, WIN32_ERROR};
use windows::Win32::NetworkManagement::IpHelper::{
    GAA_FLAG_SKIP_ANYCAST, GAA_FLAG_SKIP_DNS_SERVER, GAA_FLAG_SKIP_MULTICAST,
    GET_ADAPTERS_ADDRESSES_FLAGS, GetAdaptersAddresses, IP_ADAPTER_ADDRESSES_LH,
    IP_ADAPTER_UNICAST_ADDRESS_LH,
};
use windows::Win32::Networking::WinSock::{AF_INET, AF_INET6, AF_UNSPEC, SOCKADDR_IN, SOCKADDR_IN6};

use crate::adapter::MAX_MAC_ADDR_LENGTH;
use crate::source::{NetworkStackApi, SourceError, StackInterface};

/// The API reports the required size when this is too small.
const INITIAL_BUFFER_SIZE: u32 = 16384;

/// [`NetworkStackApi`] backed by `GetAdaptersAddresses`.
#[derive(Debug, Clone, Default)]
pub struct IpHelperStack {
    _private: (),
}

impl IpHelperStack {
    /// Creates the source.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl NetworkStackApi for IpHelperStack {
    fn interfaces(&self) -> Result<Vec<StackInterface>, SourceError> {
        let buffer = adapter_addresses()?;

        let mut interfaces = Vec::new();
        #[allow(clippy::cast_ptr_alignment)]
        let mut current = buffer.as_ptr().cast::<IP_ADAPTER_ADDRESSES_LH>();

        // SAFETY: the linked list lives inside `buffer`, which outlives the loop.
        while !current.is_null() {
            let adapter = unsafe { &*current };
            if let Some(interface) = parse_adapter(adapter) {
                interfaces.push(interface);
            }
            current = adapter.Next;
        }

        Ok(interfaces)
    }
}

fn adapter_addresses() -> Result<Vec<u8>, SourceError> {
    let flags = GAA_FLAG_SKIP_ANYCAST | GAA_FLAG_SKIP_MULTICAST | GAA_FLAG_SKIP_DNS_SERVER;
    let family = u32::from(AF_UNSPEC.0);

    let mut buffer = vec![0u8; INITIAL_BUFFER_SIZE as usize];
    let mut size = INITIAL_BUFFER_SIZE;

    let mut result = call_api(family, flags, &mut buffer, &mut size);
    if result == ERROR_BUFFER_OVERFLOW.0 {
        buffer.resize(size as usize, 0);
        result = call_api(family, flags, &mut buffer, &mut size);
    }
    if result != NO_ERROR.0 {
        return Err(windows::core::Error::from(WIN32_ERROR(result)).into());
    }

    Ok(buffer)
}

#[cfg(not(tarpaulin_include))]
fn call_api(
    family: u32,
    flags: GET_ADAPTERS_ADDRESSES_FLAGS,
    buffer: &mut [u8],
    size: &mut u32,
) -> u32 {
    // SAFETY: `buffer` holds `size` writable bytes; the API updates `size`
    // with the required length on overflow.
    unsafe {
        GetAdaptersAddresses(
            family,
            flags,
            None,
            Some(buffer.as_mut_ptr().cast()),
            &raw mut *size,
        )
    }
}

fn parse_adapter(adapter: &IP_ADAPTER_ADDRESSES_LH) -> Option<StackInterface> {
    // SAFETY: both strings point into the API buffer.
    let adapter_name = unsafe { adapter.AdapterName.to_string().ok()? };
    let description = unsafe { adapter.Description.to_string() }.unwrap_or_default();

    let len = (adapter.PhysicalAddressLength as usize).min(MAX_MAC_ADDR_LENGTH);
    let physical_address = adapter.PhysicalAddress[..len].to_vec();

    let mut interface = StackInterface {
        adapter_name,
        if_type: adapter.IfType,
        description,
        physical_address,
        ipv4: Vec::new(),
        unicast: Vec::new(),
    };

    let mut unicast = adapter.FirstUnicastAddress;
    while !unicast.is_null() {
        // SAFETY: entries live inside the API buffer.
        let entry = unsafe { &*unicast };
        collect_unicast(entry, &mut interface);
        unicast = entry.Next;
    }

    Some(interface)
}

#[allow(clippy::cast_ptr_alignment)]
fn collect_unicast(entry: &IP_ADAPTER_UNICAST_ADDRESS_LH, interface: &mut StackInterface) {
    // SAFETY: `lpSockaddr` points to a SOCKADDR_IN or SOCKADDR_IN6 chosen by `sa_family`.
    let Some(sockaddr) = (unsafe { entry.Address.lpSockaddr.as_ref() }) else {
        return;
    };

    if sockaddr.sa_family == AF_INET {
        let sockaddr_in = unsafe { &*(std::ptr::from_ref(sockaddr).cast::<SOCKADDR_IN>()) };
        let octets = unsafe { sockaddr_in.sin_addr.S_un.S_un_b };
        let address = Ipv4Addr::new(octets.s_b1, octets.s_b2, octets.s_b3, octets.s_b4);
        interface
            .ipv4
            .push((address, prefix_to_mask(entry.OnLinkPrefixLength)));
        interface.unicast.push(IpAddr::V4(address));
    } else if sockaddr.sa_family == AF_INET6 {
        let sockaddr_in6 = unsafe { &*(std::ptr::from_ref(sockaddr).cast::<SOCKADDR_IN6>()) };
        let octets = unsafe { sockaddr_in6.sin6_addr.u.Byte };
        interface.unicast.push(IpAddr::V6(Ipv6Addr::from(octets)));
    }
}

/// Converts an on-link prefix length to a dotted mask.
fn prefix_to_mask(prefix: u8) -> Ipv4Addr {
    let prefix = u32::from(prefix.min(32));
    let bits = u32::MAX.checked_shl(32 - prefix).unwrap_or(0);
    Ipv4Addr::from(bits)
}
