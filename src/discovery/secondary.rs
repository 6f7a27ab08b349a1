//! Secondary scan: the network stack's structured interface list.

use std::net::Ipv4Addr;

use tracing::{debug, info};

use crate::adapter::{AdapterRecord, MAX_NAME_LENGTH, MacAddress, Medium, NetworkAddress};
use crate::source::{StackInterface, SystemSources, if_type};

use super::{AdapterScanner, AdapterSink, AddressParser, Admission, ScanError, ScanOptions};

/// Adds adapters the primary scan missed, from the network stack's view.
///
/// Records carry description, station address, and addresses only; the
/// link layer is left at its default unless the adapter is the designated
/// loopback.
#[derive(Debug, Clone)]
pub struct SecondarySourceScanner {
    sources: SystemSources,
    options: ScanOptions,
}

impl SecondarySourceScanner {
    /// Creates a scanner over the given sources.
    #[must_use]
    pub const fn new(sources: SystemSources, options: ScanOptions) -> Self {
        Self { sources, options }
    }

    fn admit(
        &self,
        interface: &StackInterface,
        interfaces: &[StackInterface],
        loopback: Option<&str>,
        sink: &dyn AdapterSink,
    ) -> Result<Admission, ScanError> {
        let name = self.options.adapter_name(&interface.adapter_name);
        if name.len() > MAX_NAME_LENGTH {
            return Err(ScanError::malformed(name, "name too long"));
        }
        if sink.contains(&name) {
            return Ok(Admission::AlreadyPresent);
        }
        if if_type::is_point_to_point(interface.if_type) {
            debug!(adapter = %name, if_type = interface.if_type, "point-to-point interface skipped");
            return Ok(Admission::Skipped);
        }

        // Opening only verifies the adapter; the handle is dropped at once.
        drop(
            self.sources
                .transport
                .open(&name)
                .map_err(|source| ScanError::TransportUnopenable {
                    name: name.clone(),
                    source,
                })?,
        );

        let mut record = AdapterRecord::new(name);
        record.set_description(&interface.description);
        record.mac_address = MacAddress::from_slice(&interface.physical_address);

        let ipv6 = AddressParser::ipv6_entries(interfaces, &interface.adapter_name);
        record
            .addresses
            .try_reserve_exact(interface.ipv4.len() + ipv6.len())?;
        record.addresses.extend(interface.ipv4.iter().map(|&(address, mask)| {
            NetworkAddress::v4(address, mask, Ipv4Addr::BROADCAST)
        }));
        record.addresses.extend(ipv6);

        if loopback == Some(record.name.as_str()) {
            record.link_layer.link_type = Medium::Null;
        }

        debug!(
            adapter = %record.name,
            addresses = record.addresses.len(),
            "interface probed"
        );
        if sink.insert(record) {
            Ok(Admission::Inserted)
        } else {
            Ok(Admission::AlreadyPresent)
        }
    }
}

impl AdapterScanner for SecondarySourceScanner {
    fn name(&self) -> &str {
        "secondary"
    }

    fn scan(&self, sink: &dyn AdapterSink) -> Result<(), ScanError> {
        let interfaces = self
            .sources
            .network_stack
            .interfaces()
            .map_err(|source| ScanError::SourceUnavailable {
                source_name: "network stack",
                source,
            })?;
        let loopback = sink.loopback_name();
        info!(interfaces = interfaces.len(), "scanning network stack");

        for interface in &interfaces {
            match self.admit(interface, &interfaces, loopback.as_deref(), sink) {
                Ok(admission) => debug!(interface = %interface.adapter_name, ?admission, "interface processed"),
                Err(error) if error.aborts_scan() => return Err(error),
                Err(error) => debug!(interface = %interface.adapter_name, %error, "interface skipped"),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "secondary_tests.rs"]
mod tests;
