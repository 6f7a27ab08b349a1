//! Tests for the secondary scanner.

use std::net::{IpAddr, Ipv4Addr};

use super::*;
use crate::discovery::test_sink::MemorySink;
use crate::source::test_fixtures::{FakeAdapter, FakeSystem, npf_name, stack_interface};

const ETH: &str = "{6A9F2C1E-0001}";
const MAC: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];

fn scanner(system: &FakeSystem) -> SecondarySourceScanner {
    SecondarySourceScanner::new(system.sources(), ScanOptions::default())
}

fn scan_into(system: &FakeSystem, sink: &MemorySink) {
    scanner(system).scan(sink).unwrap();
}

#[test]
fn builds_narrow_record_with_all_ones_broadcast() {
    let system = FakeSystem::new();
    system.network_stack.set_interfaces(vec![stack_interface(
        ETH,
        Some(("192.168.1.7", "255.255.255.0")),
        &["fe80::7"],
    )]);
    system
        .transport
        .set_adapter(&npf_name(ETH), FakeAdapter::ethernet("unused", MAC));
    let sink = MemorySink::default();

    scan_into(&system, &sink);

    let record = sink.get(&npf_name(ETH)).unwrap();
    assert_eq!(record.description, format!("Stack adapter {ETH}"));
    assert_eq!(record.mac_address.as_bytes(), &MAC);
    assert_eq!(record.link_layer.link_type, Medium::Ethernet);
    assert_eq!(record.addresses.len(), 2);
    assert_eq!(record.addresses[0].broadcast, IpAddr::V4(Ipv4Addr::BROADCAST));
    assert_eq!(
        record.addresses[0].subnet_mask,
        IpAddr::V4(Ipv4Addr::new(255, 255, 255, 0))
    );
    assert!(!record.addresses[1].is_ipv4());
}

#[test]
fn primary_record_is_retained() {
    let system = FakeSystem::new();
    system
        .network_stack
        .set_interfaces(vec![stack_interface(ETH, None, &[])]);
    system
        .transport
        .set_adapter(&npf_name(ETH), FakeAdapter::ethernet("unused", MAC));
    let sink = MemorySink::default();
    let mut primary = AdapterRecord::new(npf_name(ETH));
    primary.set_description("from primary");
    sink.insert(primary);

    scan_into(&system, &sink);

    assert_eq!(sink.records().len(), 1);
    assert_eq!(
        sink.get(&npf_name(ETH)).unwrap().description,
        "from primary"
    );
    assert!(system.transport.opened().is_empty());
}

#[test]
fn point_to_point_interfaces_are_not_added() {
    let system = FakeSystem::new();
    let mut ppp = stack_interface("{PPP}", None, &[]);
    ppp.if_type = 23;
    let mut slip = stack_interface("{SLIP}", None, &[]);
    slip.if_type = 28;
    system.network_stack.set_interfaces(vec![ppp, slip]);
    system
        .transport
        .set_adapter(&npf_name("{PPP}"), FakeAdapter::ethernet("ppp", MAC));
    let sink = MemorySink::default();

    scan_into(&system, &sink);

    assert!(sink.records().is_empty());
    assert!(system.transport.opened().is_empty());
}

#[test]
fn unopenable_interface_is_skipped() {
    let system = FakeSystem::new();
    system
        .network_stack
        .set_interfaces(vec![stack_interface(ETH, None, &[])]);
    let sink = MemorySink::default();

    scan_into(&system, &sink);

    assert!(sink.records().is_empty());
    assert_eq!(system.transport.opened(), vec![npf_name(ETH)]);
}

#[test]
fn verification_handle_is_closed() {
    let system = FakeSystem::new();
    system
        .network_stack
        .set_interfaces(vec![stack_interface(ETH, None, &[])]);
    system
        .transport
        .set_adapter(&npf_name(ETH), FakeAdapter::ethernet("eth", MAC));
    let sink = MemorySink::default();

    scan_into(&system, &sink);

    assert_eq!(system.transport.closes(), 1);
    assert_eq!(system.transport.requests(), 0);
}

#[test]
fn designated_loopback_gets_null_medium() {
    let system = FakeSystem::new();
    system
        .network_stack
        .set_interfaces(vec![stack_interface("Loopback", None, &["::1"])]);
    system
        .transport
        .set_adapter(&npf_name("Loopback"), FakeAdapter::null_medium("lo"));
    let sink = MemorySink::default();
    sink.set_loopback_name(&npf_name("Loopback"));

    scan_into(&system, &sink);

    let record = sink.get(&npf_name("Loopback")).unwrap();
    assert_eq!(record.link_layer.link_type, Medium::Null);
}

#[test]
fn physical_address_is_capped() {
    let system = FakeSystem::new();
    let mut interface = stack_interface(ETH, None, &[]);
    interface.physical_address = vec![0xAA; 12];
    system.network_stack.set_interfaces(vec![interface]);
    system
        .transport
        .set_adapter(&npf_name(ETH), FakeAdapter::ethernet("eth", MAC));
    let sink = MemorySink::default();

    scan_into(&system, &sink);

    let record = sink.get(&npf_name(ETH)).unwrap();
    assert_eq!(record.mac_address.len(), crate::adapter::MAX_MAC_ADDR_LENGTH);
}

#[test]
fn unavailable_stack_is_reported() {
    let system = FakeSystem::new();
    let sink = MemorySink::default();

    let result = scanner(&system).scan(&sink);

    assert!(matches!(result, Err(ScanError::SourceUnavailable { .. })));
}
