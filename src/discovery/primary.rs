//! Primary scan: device-class store, opening every candidate.

use tracing::{debug, info, warn};

use crate::adapter::{AdapterRecord, MAX_NAME_LENGTH, MacAddress};
use crate::source::{AdapterHandle, DeviceEntry, RequestKind, SystemSources, if_type, oid};

use super::{
    AdapterScanner, AdapterSink, AddressParser, Admission, LinkLayerProbe, ScanError, ScanOptions,
    split_multi_sz, zeroed_buffer,
};

/// Reply buffer for the description and station-address queries.
const PROBE_BUFFER_LEN: usize = 256;

/// Length of an 802.3 station address.
const ETHERNET_ADDR_LEN: usize = 6;

/// Builds full records from the device-class store.
///
/// Falls back to the legacy binding list when the store cannot be read.
#[derive(Debug, Clone)]
pub struct PrimarySourceScanner {
    sources: SystemSources,
    options: ScanOptions,
}

impl PrimarySourceScanner {
    /// Creates a scanner over the given sources.
    #[must_use]
    pub const fn new(sources: SystemSources, options: ScanOptions) -> Self {
        Self { sources, options }
    }

    /// Re-discovers a single adapter by canonical name.
    ///
    /// The device-class entry for the name, if any, is processed with the
    /// same rules as a full scan; otherwise the adapter is opened directly.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] when the adapter cannot be rebuilt.
    pub fn scan_adapter(&self, name: &str, sink: &dyn AdapterSink) -> Result<Admission, ScanError> {
        if let Ok(entries) = self.sources.device_store.device_entries() {
            let entry = entries.iter().find(|entry| {
                entry
                    .export
                    .as_deref()
                    .and_then(|export| self.options.name_from_export(export))
                    .is_some_and(|candidate| candidate == name)
            });
            if let Some(entry) = entry {
                return self.admit_entry(entry, sink);
            }
        }

        self.admit_name(name, sink)
    }

    fn scan_device_class(&self, entries: &[DeviceEntry], sink: &dyn AdapterSink) -> Result<(), ScanError> {
        for entry in entries {
            match self.admit_entry(entry, sink) {
                Ok(admission) => debug!(key = %entry.key, ?admission, "device class entry processed"),
                Err(error) if error.aborts_scan() => return Err(error),
                Err(error) => debug!(key = %entry.key, %error, "device class entry skipped"),
            }
        }
        Ok(())
    }

    fn scan_binding_list(&self, sink: &dyn AdapterSink) -> Result<(), ScanError> {
        let bindings = self
            .sources
            .device_store
            .binding_list()
            .map_err(|source| ScanError::SourceUnavailable {
                source_name: "binding list",
                source,
            })?;

        for binding in split_multi_sz(&bindings) {
            let binding = String::from_utf8_lossy(binding);
            let Some(name) = self.options.name_from_export(&binding) else {
                debug!(%binding, "binding outside the device namespace skipped");
                continue;
            };
            match self.admit_name(&name, sink) {
                Ok(admission) => debug!(adapter = %name, ?admission, "binding processed"),
                Err(error) if error.aborts_scan() => return Err(error),
                Err(error) => debug!(adapter = %name, %error, "binding skipped"),
            }
        }
        Ok(())
    }

    fn admit_entry(&self, entry: &DeviceEntry, sink: &dyn AdapterSink) -> Result<Admission, ScanError> {
        let export = entry
            .export
            .as_deref()
            .ok_or_else(|| ScanError::malformed(&entry.key, "no linkage export"))?;
        let name = self
            .options
            .name_from_export(export)
            .ok_or_else(|| ScanError::malformed(&entry.key, format!("export {export:?} outside \\Device\\")))?;
        check_name_length(&name)?;

        if sink.contains(&name) {
            return Ok(Admission::AlreadyPresent);
        }

        if entry
            .component_id
            .as_deref()
            .is_some_and(|id| self.options.is_firewire(id))
        {
            debug!(adapter = %name, "firewire adapter recorded without opening");
            return Ok(insert(sink, AdapterRecord::do_not_export(name)));
        }

        if entry.if_type.is_some_and(if_type::is_point_to_point) {
            debug!(adapter = %name, if_type = ?entry.if_type, "point-to-point adapter skipped");
            return Ok(Admission::Skipped);
        }

        let record = self.build_record(&name)?;
        Ok(store(sink, record))
    }

    fn admit_name(&self, name: &str, sink: &dyn AdapterSink) -> Result<Admission, ScanError> {
        check_name_length(name)?;
        if sink.contains(name) {
            return Ok(Admission::AlreadyPresent);
        }

        let stack_type = self.stack_if_type(name);
        if stack_type.is_some_and(if_type::is_point_to_point) {
            debug!(adapter = %name, if_type = ?stack_type, "point-to-point adapter skipped");
            return Ok(Admission::Skipped);
        }

        let record = self.build_record(name)?;
        Ok(store(sink, record))
    }

    /// Interface type the network stack reports for the adapter, if it knows it.
    fn stack_if_type(&self, name: &str) -> Option<u32> {
        let id = self.options.interface_id(name);
        self.sources
            .network_stack
            .interfaces()
            .ok()?
            .into_iter()
            .find(|interface| interface.adapter_name == id)
            .map(|interface| interface.if_type)
    }

    /// Opens the adapter and probes everything the record needs.
    ///
    /// The handle is released before addresses are resolved; every early
    /// return drops it as well.
    fn build_record(&self, name: &str) -> Result<AdapterRecord, ScanError> {
        let mut record = AdapterRecord::new(name);
        {
            let mut handle = self
                .sources
                .transport
                .open(name)
                .map_err(|source| ScanError::TransportUnopenable {
                    name: name.to_string(),
                    source,
                })?;

            if let Some(description) = probe_description(handle.as_mut())? {
                record.set_description(&description);
            }
            record.link_layer = LinkLayerProbe::probe(handle.as_mut())?;
            record.mac_address = probe_mac_address(handle.as_mut())?;
        }

        let parser = AddressParser::new(
            self.sources.tcpip.as_ref(),
            self.sources.network_stack.as_ref(),
        );
        record.addresses = match parser.resolve(self.options.interface_id(name)) {
            Ok(addresses) => addresses,
            Err(error) if error.aborts_scan() => return Err(error),
            Err(error) => {
                debug!(adapter = %name, %error, "addresses discarded");
                Vec::new()
            }
        };

        debug!(
            adapter = %name,
            medium = %record.link_layer.link_type,
            speed = record.link_layer.link_speed,
            addresses = record.addresses.len(),
            "adapter probed"
        );
        Ok(record)
    }
}

impl AdapterScanner for PrimarySourceScanner {
    fn name(&self) -> &str {
        "primary"
    }

    fn scan(&self, sink: &dyn AdapterSink) -> Result<(), ScanError> {
        match self.sources.device_store.device_entries() {
            Ok(entries) => {
                info!(entries = entries.len(), "scanning device class store");
                self.scan_device_class(&entries, sink)
            }
            Err(error) => {
                warn!(%error, "device class store unavailable, using binding list");
                self.scan_binding_list(sink)
            }
        }
    }
}

fn check_name_length(name: &str) -> Result<(), ScanError> {
    if name.len() > MAX_NAME_LENGTH {
        return Err(ScanError::malformed(
            name,
            format!("name exceeds {MAX_NAME_LENGTH} bytes"),
        ));
    }
    Ok(())
}

/// Inserts a probed record, designating it loopback if it reports the null medium.
fn store(sink: &dyn AdapterSink, record: AdapterRecord) -> Admission {
    if record.link_layer.link_type.is_null() {
        debug!(adapter = %record.name, "designated loopback adapter");
        sink.set_loopback_name(&record.name);
    }
    insert(sink, record)
}

fn insert(sink: &dyn AdapterSink, record: AdapterRecord) -> Admission {
    if sink.insert(record) {
        Admission::Inserted
    } else {
        Admission::AlreadyPresent
    }
}

/// Vendor description; `None` when the query fails or returns nothing.
fn probe_description(handle: &mut dyn AdapterHandle) -> Result<Option<String>, ScanError> {
    let mut buffer = zeroed_buffer(PROBE_BUFFER_LEN)?;
    let Ok(len) = handle.request(RequestKind::Query, oid::GEN_VENDOR_DESCRIPTION, &mut buffer)
    else {
        return Ok(None);
    };

    let text = &buffer[..len.min(buffer.len())];
    let end = text.iter().position(|&b| b == 0).unwrap_or(text.len());
    if end == 0 {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&text[..end]).into_owned()))
}

/// 802.3 station address; empty when the query fails.
fn probe_mac_address(handle: &mut dyn AdapterHandle) -> Result<MacAddress, ScanError> {
    let mut buffer = zeroed_buffer(PROBE_BUFFER_LEN)?;
    match handle.request(RequestKind::Query, oid::CURRENT_802_3_ADDRESS, &mut buffer) {
        Ok(len) if len >= ETHERNET_ADDR_LEN => Ok(MacAddress::from_slice(&buffer[..ETHERNET_ADDR_LEN])),
        _ => Ok(MacAddress::default()),
    }
}

#[cfg(test)]
#[path = "primary_tests.rs"]
mod tests;
