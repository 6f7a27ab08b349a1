//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::adapter::AdapterFlags;
use crate::adapter::filter::{FilterChain, FlagsFilter, NameRegexFilter};
use crate::discovery::ScanOptions;

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// How adapters are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One human-readable block per adapter.
    #[default]
    Table,
    /// A JSON array of records.
    Json,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "text" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidOutputFormat {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Options handed to the discovery engine
    pub scan_options: ScanOptions,

    /// Filter applied to listed adapters
    pub filter: FilterChain,

    /// Whether adapters recorded as not exported are listed
    pub show_hidden: bool,

    /// Output format
    pub output: OutputFormat,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ device_prefix: {}, firewire_marker: {}, secondary_scan: {}, \
             show_hidden: {}, output: {}, filters: {}+{} }}",
            self.scan_options.device_prefix,
            self.scan_options.firewire_marker,
            self.scan_options.secondary_scan,
            self.show_hidden,
            self.output,
            self.filter.include_count(),
            self.filter.exclude_count(),
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Regex patterns are invalid
    /// - The device prefix or firewire marker is empty
    /// - The output format is unknown
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let scan_options = Self::resolve_scan_options(cli, toml)?;
        let show_hidden = cli.show_hidden || toml.is_some_and(|t| t.filter.show_hidden);
        let filter = Self::build_filter(cli, toml, show_hidden)?;
        let output = Self::resolve_output(cli, toml)?;

        Ok(Self {
            scan_options,
            filter,
            show_hidden,
            output,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    fn resolve_scan_options(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<ScanOptions, ConfigError> {
        let discovery = toml.map(|t| &t.discovery);

        // Priority: CLI explicit > TOML > default
        let device_prefix = cli
            .device_prefix
            .as_deref()
            .or_else(|| discovery.and_then(|d| d.device_prefix.as_deref()))
            .unwrap_or(defaults::DEVICE_PREFIX);
        if device_prefix.is_empty() {
            return Err(ConfigError::empty(field::DEVICE_PREFIX));
        }

        let firewire_marker = discovery
            .and_then(|d| d.firewire_marker.as_deref())
            .unwrap_or(defaults::FIREWIRE_MARKER);
        if firewire_marker.is_empty() {
            return Err(ConfigError::empty(field::FIREWIRE_MARKER));
        }

        // --no-secondary only disables
        let secondary_scan = !cli.no_secondary
            && discovery
                .and_then(|d| d.secondary_scan)
                .unwrap_or(defaults::SECONDARY_SCAN);

        Ok(ScanOptions {
            device_prefix: device_prefix.to_string(),
            firewire_marker: firewire_marker.to_string(),
            secondary_scan,
        })
    }

    fn build_filter(
        cli: &Cli,
        toml: Option<&TomlConfig>,
        show_hidden: bool,
    ) -> Result<FilterChain, ConfigError> {
        let mut filter = FilterChain::new();

        if !show_hidden {
            filter = filter.exclude(FlagsFilter::new([AdapterFlags::DoNotExport]));
        }

        // CLI patterns replace TOML patterns, independently for include and exclude
        let includes = if cli.include_adapters.is_empty() {
            toml.map_or(&[][..], |t| t.filter.include.as_slice())
        } else {
            cli.include_adapters.as_slice()
        };
        for pattern in includes {
            filter = filter.include(regex_filter(pattern)?);
        }

        let excludes = if cli.exclude_adapters.is_empty() {
            toml.map_or(&[][..], |t| t.filter.exclude.as_slice())
        } else {
            cli.exclude_adapters.as_slice()
        };
        for pattern in excludes {
            filter = filter.exclude(regex_filter(pattern)?);
        }

        Ok(filter)
    }

    fn resolve_output(cli: &Cli, toml: Option<&TomlConfig>) -> Result<OutputFormat, ConfigError> {
        if cli.json {
            return Ok(OutputFormat::Json);
        }

        toml.and_then(|t| t.output.format.as_deref())
            .unwrap_or(defaults::OUTPUT_FORMAT)
            .parse()
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

fn regex_filter(pattern: &str) -> Result<NameRegexFilter, ConfigError> {
    NameRegexFilter::new(pattern).map_err(|e| ConfigError::InvalidRegex {
        pattern: pattern.to_string(),
        source: e,
    })
}
