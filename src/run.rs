//! Application execution logic.
//!
//! Builds the adapter registry from the live system, runs the requested
//! subcommand against it, and renders the result as a table or JSON.

use std::io::Write;
use std::sync::Arc;

use thiserror::Error;

use npf_adinfo::adapter::AdapterRecord;
use npf_adinfo::config::{Command, OutputFormat, ValidatedConfig};
use npf_adinfo::registry::AdapterRegistry;
use npf_adinfo::source::platform::system_sources;

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The named adapter is not in the registry.
    #[error("Adapter not found: {name}")]
    NotFound {
        /// Requested adapter name
        name: String,
    },

    /// Failed to encode records as JSON.
    #[error("Failed to encode adapters as JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to write to stdout.
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl RunError {
    /// Returns true when the error means the adapter does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Runs `command` against the live system and prints to stdout.
///
/// # Errors
///
/// Returns an error if a named adapter does not exist or output fails.
///
/// # Coverage Note
///
/// Excluded from coverage because it reads the real system sources.
#[cfg(not(tarpaulin_include))]
pub fn execute(command: &Command, config: &ValidatedConfig) -> Result<(), RunError> {
    let registry = AdapterRegistry::new(system_sources(), config.scan_options.clone());
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_command(&registry, command, config, &mut out)
}

/// Runs `command` against `registry`, writing the rendered result to `out`.
fn run_command<W: Write>(
    registry: &AdapterRegistry,
    command: &Command,
    config: &ValidatedConfig,
    out: &mut W,
) -> Result<(), RunError> {
    match command {
        Command::List => {
            registry.populate();
            let records = config.filter.apply(registry.records());
            tracing::debug!(
                total = registry.len(),
                shown = records.len(),
                "adapters filtered"
            );
            render(&records, config.output, out)
        }
        Command::Show { name } => {
            let record = find(registry, name)?;
            render(&[record], config.output, out)
        }
        Command::Update { name } => {
            let outcome = registry.update(name);
            tracing::info!(adapter = %name, ?outcome, "adapter updated");
            let record = find(registry, name)?;
            render(&[record], config.output, out)
        }
        // Handled before configuration is loaded.
        Command::Init { .. } => Ok(()),
    }
}

fn find(registry: &AdapterRegistry, name: &str) -> Result<Arc<AdapterRecord>, RunError> {
    registry.find(name).ok_or_else(|| RunError::NotFound {
        name: name.to_string(),
    })
}

fn render<W: Write>(
    records: &[Arc<AdapterRecord>],
    format: OutputFormat,
    out: &mut W,
) -> Result<(), RunError> {
    match format {
        OutputFormat::Json => {
            let plain: Vec<&AdapterRecord> = records.iter().map(Arc::as_ref).collect();
            serde_json::to_writer_pretty(&mut *out, &plain)?;
            writeln!(out)?;
        }
        OutputFormat::Table => {
            if records.is_empty() {
                writeln!(out, "No adapters found.")?;
            }
            for (i, record) in records.iter().enumerate() {
                if i > 0 {
                    writeln!(out)?;
                }
                write_block(record, out)?;
            }
        }
    }
    Ok(())
}

fn write_block<W: Write>(record: &AdapterRecord, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{}", record.name)?;
    writeln!(out, "    Description: {}", record.description)?;
    if !record.mac_address.is_empty() {
        writeln!(out, "    MAC:         {}", record.mac_address)?;
    }
    writeln!(out, "    Medium:      {}", record.link_layer.link_type)?;
    writeln!(out, "    Speed:       {}", format_speed(record.link_layer.link_speed))?;
    writeln!(out, "    Flags:       {}", record.flags)?;
    for address in &record.addresses {
        if address.is_ipv4() {
            writeln!(
                out,
                "    Address:     {} mask {} broadcast {}",
                address.ip_address, address.subnet_mask, address.broadcast
            )?;
        } else {
            writeln!(out, "    Address:     {}", address.ip_address)?;
        }
    }
    Ok(())
}

fn format_speed(bits_per_second: u64) -> String {
    match bits_per_second {
        0 => "unknown".to_string(),
        bps if bps % 1_000_000_000 == 0 => format!("{} Gbps", bps / 1_000_000_000),
        bps if bps % 1_000_000 == 0 => format!("{} Mbps", bps / 1_000_000),
        bps => format!("{bps} bps"),
    }
}
