//! npf-adinfo: packet-capture adapter discovery
//!
//! A library that discovers the network adapters a packet-capture driver can
//! open, probes each one for its description, medium, link speed, station
//! address and bound addresses, and keeps the results in a shared registry
//! that can be rebuilt wholesale or refreshed one adapter at a time.
//!
//! - [`source`]: the system sources discovery reads from
//! - [`discovery`]: the primary and secondary scanners
//! - [`registry`]: the shared [`registry::AdapterRegistry`]
//! - [`adapter`]: record types and listing filters
//! - [`config`]: CLI and TOML configuration for the binary

pub mod adapter;
pub mod config;
pub mod discovery;
pub mod registry;
pub mod source;
