//! Default values for configuration options.
//!
//! Centralized constants to avoid magic strings scattered across the codebase.

use crate::discovery::{DEFAULT_DEVICE_PREFIX, DEFAULT_FIREWIRE_MARKER};

/// Transport namespace prefixed to raw interface ids.
pub const DEVICE_PREFIX: &str = DEFAULT_DEVICE_PREFIX;

/// Component-id substring marking firewire adapters.
pub const FIREWIRE_MARKER: &str = DEFAULT_FIREWIRE_MARKER;

/// Whether the network-stack scan runs after the device-class scan.
pub const SECONDARY_SCAN: bool = true;

/// Output format name used when neither CLI nor TOML picks one.
pub const OUTPUT_FORMAT: &str = "table";
