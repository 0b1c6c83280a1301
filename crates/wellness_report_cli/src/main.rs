use std::io::Write;

use anyhow::Context;
use clap::Parser;
use wellness_report_cli::{Cli, run};
use wellness_report_core::config::ReportConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configure logging from env var `WELLNESS_REPORT_LOG_LEVEL` (or fallback to `RUST_LOG`, default `info`).
    let log_env = std::env::var("WELLNESS_REPORT_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    tracing::debug!("wellness-report: log filter: {}", log_env);

    let cli = Cli::parse();
    let result = match ReportConfig::from_env() {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(output) => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{output}").context("writing command output")?;
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {}", e.user_message());
            std::process::exit(1);
        }
    }
}
