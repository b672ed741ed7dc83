//! CLI commands for data export
//!
//! Writes a group's ledger as CSV or JSON, to a file or to stdout.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

use crate::error::{PayupError, PayupResult};
use crate::export::{export_group_csv, export_group_json};
use crate::storage::Storage;

use super::resolve_group;

/// Export format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    /// CSV, one row per settlement
    Csv,
    /// JSON, the full group ledger
    Json,
}

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export one group's ledger
    Group {
        /// Group name or ID
        group: String,

        /// Export format
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,

        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

/// Handle export commands
pub fn handle_export_command(storage: &Storage, cmd: ExportCommands) -> PayupResult<()> {
    match cmd {
        ExportCommands::Group {
            group,
            format,
            output,
            pretty,
        } => {
            let group = resolve_group(storage, &group)?;

            let writer: Box<dyn Write> = match &output {
                Some(path) => {
                    let file = File::create(path).map_err(|e| {
                        PayupError::Export(format!(
                            "Failed to create file {}: {}",
                            path.display(),
                            e
                        ))
                    })?;
                    Box::new(file)
                }
                None => Box::new(io::stdout().lock()),
            };
            let mut writer = BufWriter::new(writer);

            match format {
                ExportFormat::Csv => export_group_csv(storage, group.id, &mut writer)?,
                ExportFormat::Json => {
                    export_group_json(storage, group.id, &mut writer, pretty)?;
                    writeln!(writer)?;
                }
            }
            writer.flush()?;

            if let Some(path) = output {
                println!("Exported {} to: {}", group.name, path.display());
            }
        }
    }

    Ok(())
}
