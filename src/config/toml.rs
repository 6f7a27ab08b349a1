//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Discovery configuration section
    #[serde(default)]
    pub discovery: DiscoverySection,

    /// Adapter filter configuration
    #[serde(default)]
    pub filter: FilterSection,

    /// Output configuration
    #[serde(default)]
    pub output: OutputSection,
}

/// Discovery configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoverySection {
    /// Transport namespace prefixed to raw interface ids
    pub device_prefix: Option<String>,

    /// Component-id substring marking firewire adapters
    pub firewire_marker: Option<String>,

    /// Run the network-stack scan after the device-class scan
    pub secondary_scan: Option<bool>,
}

/// Adapter filter configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSection {
    /// Regex patterns for adapters to include
    #[serde(default)]
    pub include: Vec<String>,

    /// Regex patterns for adapters to exclude
    #[serde(default)]
    pub exclude: Vec<String>,

    /// List adapters recorded as not exported
    #[serde(default)]
    pub show_hidden: bool,
}

/// Output configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    /// "table" or "json"
    pub format: Option<String>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# npf-adinfo Configuration File

[discovery]
# Transport namespace prefixed to raw interface ids
# (default: "\\Device\\NPF_", can be overridden by --device-prefix)
# device_prefix = "\\Device\\NPF_"

# Component-id substring marking firewire adapters; these are recorded
# but never opened (default: "1394")
# firewire_marker = "1394"

# Run the network-stack scan after the device-class scan
# (default: true, --no-secondary disables it)
secondary_scan = true

[filter]
# Regex patterns matched against adapter name or description (empty = all)
# Note: CLI patterns REPLACE these entirely (not merged)
# include = ["Ethernet", "Wi-?Fi"]

# Regex patterns for adapters to hide
# Note: CLI patterns REPLACE these entirely (not merged)
# exclude = ["(?i)virtual"]

# List adapters recorded as not exported (e.g. firewire)
# show_hidden = false

[output]
# "table" or "json" (--json overrides)
format = "table"
"#
    .to_string()
}
