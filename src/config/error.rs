//! Error types for configuration parsing and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for configuration operations.
///
/// Covers errors from parsing, validation, and file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to write configuration file (for init command).
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid regex pattern for adapter filtering.
    #[error("Invalid regex pattern '{pattern}': {source}")]
    InvalidRegex {
        /// The invalid pattern
        pattern: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// A discovery setting that must not be empty was empty.
    #[error("Invalid value for {field}: must not be empty")]
    EmptyValue {
        /// Name of the field
        field: &'static str,
    },

    /// Unknown output format.
    #[error("Invalid output format '{value}': expected table or json")]
    InvalidOutputFormat {
        /// The invalid value provided
        value: String,
    },
}

/// Well-known field names for `EmptyValue` errors.
pub mod field {
    /// The transport namespace prefix.
    pub const DEVICE_PREFIX: &str = "device_prefix";
    /// The firewire component-id marker.
    pub const FIREWIRE_MARKER: &str = "firewire_marker";
}

impl ConfigError {
    /// Creates an `EmptyValue` error for a field.
    #[must_use]
    pub const fn empty(field: &'static str) -> Self {
        Self::EmptyValue { field }
    }
}
