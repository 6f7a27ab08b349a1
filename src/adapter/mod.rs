//! Adapter layer: the record types the registry stores and the filters
//! used to select records for display.
//!
//! This module provides:
//! - Adapter records ([`AdapterRecord`], [`NetworkAddress`], [`MacAddress`])
//! - Link-layer classification ([`Medium`], [`LinkLayer`])
//! - Usage flags ([`AdapterFlags`])
//! - Record filtering ([`filter`])

pub mod filter;
mod record;

#[cfg(test)]
mod filter_tests;

pub use record::{
    AdapterFlags, AdapterRecord, LinkLayer, MAX_DESCRIPTION_LENGTH, MAX_MAC_ADDR_LENGTH,
    MAX_NAME_LENGTH, MacAddress, Medium, NetworkAddress,
};
