//! Address resolution from the TCP/IP text configuration and the network stack.

use std::net::{IpAddr, Ipv4Addr};

use tracing::debug;

use crate::adapter::NetworkAddress;
use crate::source::{InterfaceParameters, NetworkStackApi, StackInterface, TcpipConfigStore};

use super::ScanError;

/// Splits a NUL-separated, double-NUL-terminated string list.
///
/// Iteration stops at the first empty segment; an unterminated trailing
/// segment is still yielded.
pub fn split_multi_sz(bytes: &[u8]) -> impl Iterator<Item = &[u8]> {
    bytes.split(|&b| b == 0).take_while(|segment| !segment.is_empty())
}

/// Builds address lists for one adapter.
///
/// Two shapes are understood:
/// - the text pair (`IPAddress`/`SubnetMask`, or the DHCP pair) walked in
///   lockstep, all-or-nothing
/// - the structured unicast list of the network stack, from which IPv6
///   entries are appended
pub struct AddressParser<'a> {
    tcpip: &'a dyn TcpipConfigStore,
    network_stack: &'a dyn NetworkStackApi,
}

impl<'a> AddressParser<'a> {
    /// Creates a parser over the given sources.
    #[must_use]
    pub fn new(tcpip: &'a dyn TcpipConfigStore, network_stack: &'a dyn NetworkStackApi) -> Self {
        Self {
            tcpip,
            network_stack,
        }
    }

    /// Resolves every address of the interface: IPv4 entries from the text
    /// configuration first, then IPv6 entries from the network stack.
    ///
    /// The text path is skipped when the network stack reports no IPv4
    /// address for the interface. A missing text configuration yields no
    /// IPv4 entries.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::EntryMalformed`] when the text configuration is
    /// inconsistent, in which case the caller must expose no address at all.
    pub fn resolve(&self, interface_id: &str) -> Result<Vec<NetworkAddress>, ScanError> {
        let interfaces = self.network_stack.interfaces();
        let ipv4_enabled = match &interfaces {
            Ok(list) => has_ipv4(list, interface_id),
            Err(error) if error.is_unsupported() => true,
            Err(error) => {
                debug!(interface = interface_id, %error, "IPv4 check failed");
                false
            }
        };

        let mut addresses = if ipv4_enabled {
            match self.tcpip.interface_parameters(interface_id) {
                Ok(params) => Self::parse_text(interface_id, &params)?,
                Err(error) => {
                    debug!(interface = interface_id, %error, "no TCP/IP text configuration");
                    Vec::new()
                }
            }
        } else {
            debug!(interface = interface_id, "IPv4 disabled, skipping text configuration");
            Vec::new()
        };

        if let Ok(list) = &interfaces {
            let ipv6 = Self::ipv6_entries(list, interface_id);
            addresses.try_reserve(ipv6.len())?;
            addresses.extend(ipv6);
        }

        Ok(addresses)
    }

    /// Parses the text address pair selected by `EnableDHCP`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::EntryMalformed`] when a list is missing, an
    /// entry is not a dotted-quad address, or the address and mask counts
    /// differ.
    pub fn parse_text(
        interface_id: &str,
        params: &InterfaceParameters,
    ) -> Result<Vec<NetworkAddress>, ScanError> {
        let dhcp = params.enable_dhcp.unwrap_or(0) != 0;
        let (address_list, mask_list, label) = if dhcp {
            (&params.dhcp_ip_address, &params.dhcp_subnet_mask, "DhcpIPAddress")
        } else {
            (&params.ip_address, &params.subnet_mask, "IPAddress")
        };

        let (Some(address_list), Some(mask_list)) = (address_list, mask_list) else {
            return Err(ScanError::malformed(
                interface_id,
                format!("{label} or its mask list is missing"),
            ));
        };

        let addresses = parse_ipv4_list(interface_id, address_list)?;
        let masks = parse_ipv4_list(interface_id, mask_list)?;
        if addresses.len() != masks.len() {
            return Err(ScanError::malformed(
                interface_id,
                format!("{} addresses but {} masks", addresses.len(), masks.len()),
            ));
        }

        let broadcast = if params.use_zero_broadcast.unwrap_or(0) == 0 {
            Ipv4Addr::BROADCAST
        } else {
            Ipv4Addr::UNSPECIFIED
        };

        let mut entries = Vec::new();
        entries.try_reserve_exact(addresses.len())?;
        entries.extend(
            addresses
                .into_iter()
                .zip(masks)
                .map(|(address, mask)| NetworkAddress::v4(address, mask, broadcast)),
        );
        Ok(entries)
    }

    /// IPv6 unicast entries of the matching interface, in stack order.
    #[must_use]
    pub fn ipv6_entries(interfaces: &[StackInterface], interface_id: &str) -> Vec<NetworkAddress> {
        interfaces
            .iter()
            .filter(|interface| interface.adapter_name == interface_id)
            .flat_map(|interface| &interface.unicast)
            .filter_map(|address| match address {
                IpAddr::V6(v6) => Some(NetworkAddress::v6(*v6)),
                IpAddr::V4(_) => None,
            })
            .collect()
    }
}

fn has_ipv4(interfaces: &[StackInterface], interface_id: &str) -> bool {
    interfaces
        .iter()
        .filter(|interface| interface.adapter_name == interface_id)
        .any(|interface| interface.unicast.iter().any(IpAddr::is_ipv4))
}

fn parse_ipv4_list(interface_id: &str, bytes: &[u8]) -> Result<Vec<Ipv4Addr>, ScanError> {
    split_multi_sz(bytes)
        .map(|segment| {
            std::str::from_utf8(segment)
                .ok()
                .and_then(|text| text.trim().parse::<Ipv4Addr>().ok())
                .ok_or_else(|| {
                    ScanError::malformed(
                        interface_id,
                        format!("bad address {:?}", String::from_utf8_lossy(segment)),
                    )
                })
        })
        .collect()
}

#[cfg(test)]
#[path = "address_tests.rs"]
mod tests;
