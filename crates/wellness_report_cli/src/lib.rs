//! Command-line front end: generate, browse and export archived reports.

pub mod error;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{debug, warn};
use wellness_report_core::archiver::Archiver;
use wellness_report_core::config::ReportConfig;
use wellness_report_core::export::write_export;
use wellness_report_core::pipeline::ReportGenerator;
use wellness_report_core::store::FileStore;
use wellness_report_core::{HealthReport, Identity, ReportIndexEntry, report_json_schema};

pub use error::{CliError, CliResult};

#[derive(Parser, Debug)]
#[command(
    name = "wellness-report",
    version,
    about = "Generate, archive and export personal health reports"
)]
pub struct Cli {
    /// Overrides WELLNESS_REPORT_DATA_DIR for this invocation.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Identity used for per-user sources; overrides WELLNESS_REPORT_USER_ID.
    #[arg(long, global = true)]
    pub user_id: Option<String>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Collect all domains, score them and archive the report.
    Generate {
        /// Also write the text export into this directory.
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },
    /// List archived reports, newest first.
    List,
    /// Print an archived report.
    Show { id: String },
    /// Write an archived report as `health_report_<date>.md`.
    Export {
        id: String,
        /// Target directory (default: current directory).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Delete an archived report.
    Delete { id: String },
    /// Print the JSON schema of a stored report.
    Schema,
}

/// Apply command-line overrides on top of the environment configuration.
pub fn apply_overrides(cli: &Cli, mut config: ReportConfig) -> ReportConfig {
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(user) = &cli.user_id {
        config.user_id = Some(user.clone());
    }
    config
}

/// Execute one command and return what should be printed on stdout.
pub async fn run(cli: Cli, config: ReportConfig) -> CliResult<String> {
    let config = apply_overrides(&cli, config);
    debug!(data_dir = %config.data_dir.display(), command = ?cli.command, "running command");
    let archiver = Archiver::new(Arc::new(FileStore::new(config.reports_dir())));

    match cli.command {
        Command::Generate { export_dir } => {
            let identity = config.user_id.as_deref().map(Identity::new);
            let report = ReportGenerator::from_config(&config)
                .generate(identity.as_ref())
                .await?;
            // a failed save still leaves the report exportable
            let saved = archiver.save(&report).await;
            let exported = match &export_dir {
                Some(dir) => match write_export(&report, dir).await {
                    Ok(path) => Some(path),
                    Err(e) if saved.is_err() => {
                        warn!(error = %e, "export after failed save also failed");
                        None
                    }
                    Err(e) => return Err(e.into()),
                },
                None => None,
            };
            let id = match saved {
                Ok(id) => id,
                Err(e) => {
                    warn!(
                        report_id = %report.id,
                        exported = ?exported,
                        "report generated but not archived"
                    );
                    return Err(e.into());
                }
            };
            if cli.json {
                return Ok(serde_json::to_string_pretty(&report)?);
            }
            let mut out = format!(
                "Saved report {id}\nOverall Wellness: {}/100 ({})",
                report.derived_scores.overall_wellness,
                report.derived_scores.band()
            );
            if let Some(path) = exported {
                out.push_str(&format!("\nExported to {}", path.display()));
            }
            Ok(out)
        }
        Command::List => {
            let entries = archiver.list().await?;
            if cli.json {
                return Ok(serde_json::to_string_pretty(&entries)?);
            }
            Ok(render_index(&entries))
        }
        Command::Show { id } => {
            let report = archiver.load(&id).await?;
            if cli.json {
                return Ok(serde_json::to_string_pretty(&report)?);
            }
            Ok(archiver.export_text(&report))
        }
        Command::Export { id, dir } => {
            let report = archiver.load(&id).await?;
            let dir = dir.unwrap_or_else(|| PathBuf::from("."));
            let path = write_export(&report, &dir).await?;
            Ok(export_message(&report, &path))
        }
        Command::Delete { id } => {
            archiver.delete(&id).await?;
            Ok(format!("Deleted report {id}"))
        }
        Command::Schema => Ok(serde_json::to_string_pretty(&report_json_schema()?)?),
    }
}

fn render_index(entries: &[ReportIndexEntry]) -> String {
    if entries.is_empty() {
        return "No reports saved.".to_string();
    }
    entries
        .iter()
        .map(|e| format!("{}  {}", e.id, e.display_name))
        .collect::<Vec<_>>()
        .join("\n")
}

fn export_message(report: &HealthReport, path: &std::path::Path) -> String {
    format!("Exported report {} to {}", report.id, path.display())
}
