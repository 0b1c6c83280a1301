use std::sync::Arc;

use wellness_report_core::archiver::Archiver;
use wellness_report_core::config::ReportConfig;
use wellness_report_core::pipeline::ReportGenerator;
use wellness_report_core::store::FileStore;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: reads WELLNESS_REPORT_* from env, defaults to ./wellness-data
    let cfg = match ReportConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(());
        }
    };
    let generator = ReportGenerator::from_config(&cfg);
    let report = generator.generate(None).await?;

    let archiver = Archiver::new(Arc::new(FileStore::new(cfg.reports_dir())));
    let id = archiver.save(&report).await?;
    println!(
        "Saved {} ({}/100, {})",
        id,
        report.derived_scores.overall_wellness,
        report.derived_scores.band()
    );
    println!("{}", archiver.export_text(&report));
    Ok(())
}
