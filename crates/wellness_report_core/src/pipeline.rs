//! Collect, score and assemble a report under a time bound.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::collector::{Collector, RetentionPolicy};
use crate::config::ReportConfig;
use crate::http_source::RestMentalHealthSource;
use crate::model::{HealthReport, Identity};
use crate::retry::RetryPolicy;
use crate::scorer::derive_scores;
use crate::source::{DomainProvider, JsonFileSource};
use crate::synthetic::{
    DefaultMentalHealthSource, SyntheticHydrationSource, SyntheticSleepSource,
    SyntheticWeightSource,
};
use crate::{ReportError, ReportResult};

pub const FACIAL_SCANS_FILE: &str = "facial_scans.json";
pub const MENTAL_HEALTH_FILE: &str = "mental_health.json";
pub const PROFILE_FILE: &str = "profile.json";
pub const PROFILE_EXERCISE_KEY: &str = "exerciseLog";
pub const HYDRATION_FILE: &str = "hydration.json";
pub const SLEEP_FILE: &str = "sleep.json";
pub const WEIGHT_FILE: &str = "weight.json";

pub struct ReportGenerator {
    collector: Collector,
    timeout: Duration,
}

impl ReportGenerator {
    pub fn new(collector: Collector, timeout: Duration) -> Self {
        Self { collector, timeout }
    }

    /// Wire the provider chains described by `config`.
    ///
    /// Local files under `sources/` come first for every domain, preceded by
    /// the remote row store for mental health when one is configured.
    /// Placeholder generators close the chains when enabled.
    pub fn from_config(config: &ReportConfig) -> Self {
        let retention = RetentionPolicy {
            daily_window_days: config.daily_window_days,
            ..RetentionPolicy::default()
        };
        let dir = config.sources_dir();
        let file = |name: &str| dir.join(name);

        let mut collector = Collector::new(retention, RetryPolicy::default())
            .with_facial_scans(DomainProvider::real(JsonFileSource::new(file(
                FACIAL_SCANS_FILE,
            ))));
        if let Some(remote) = &config.remote {
            collector = collector.with_mental_health(DomainProvider::real(
                RestMentalHealthSource::new(&remote.base_url, remote.api_key.clone()),
            ));
        }
        collector = collector
            .with_mental_health(DomainProvider::real(JsonFileSource::new(file(
                MENTAL_HEALTH_FILE,
            ))))
            .with_exercise(DomainProvider::real(
                JsonFileSource::new(file(PROFILE_FILE)).at_key(PROFILE_EXERCISE_KEY),
            ))
            .with_hydration(DomainProvider::real(JsonFileSource::new(file(HYDRATION_FILE))))
            .with_sleep(DomainProvider::real(JsonFileSource::new(file(SLEEP_FILE))))
            .with_weight(DomainProvider::real(JsonFileSource::new(file(WEIGHT_FILE))));

        if config.synthetic_placeholders {
            collector = with_placeholders(collector, config);
        }
        Self::new(collector, config.generation_timeout)
    }

    pub async fn generate(&self, identity: Option<&Identity>) -> ReportResult<HealthReport> {
        self.generate_at(identity, Utc::now()).await
    }

    /// Generate relative to a fixed instant.
    pub async fn generate_at(
        &self,
        identity: Option<&Identity>,
        now: DateTime<Utc>,
    ) -> ReportResult<HealthReport> {
        let collect = self.collector.collect(identity, now);
        let snapshots = match tokio::time::timeout(self.timeout, collect).await {
            Ok(snapshots) => snapshots,
            Err(_) => {
                warn!(timeout = ?self.timeout, "report generation timed out");
                return Err(ReportError::Timeout(self.timeout));
            }
        };
        let scores = derive_scores(&snapshots);
        let report = HealthReport::new(
            identity.map(|i| i.user_id.clone()),
            snapshots,
            scores,
            now,
        );
        info!(
            report_id = %report.id,
            overall = report.derived_scores.overall_wellness,
            "report generated"
        );
        Ok(report)
    }
}

fn with_placeholders(collector: Collector, config: &ReportConfig) -> Collector {
    collector
        .with_mental_health(DomainProvider::synthetic(DefaultMentalHealthSource))
        .with_hydration(DomainProvider::synthetic(SyntheticHydrationSource::new(
            config.hydration_goal_ml,
        )))
        .with_sleep(DomainProvider::synthetic(SyntheticSleepSource))
        .with_weight(DomainProvider::synthetic(SyntheticWeightSource::new(
            config.weight_baseline_kg,
        )))
}

/// Write `records` as the local history file `name` under `sources_dir`.
pub async fn write_source_file<T: serde::Serialize>(
    sources_dir: &Path,
    name: &str,
    records: &T,
) -> ReportResult<()> {
    tokio::fs::create_dir_all(sources_dir)
        .await
        .map_err(|e| ReportError::Persistence(format!("create {}: {e}", sources_dir.display())))?;
    let path = sources_dir.join(name);
    let body = serde_json::to_string_pretty(records)?;
    tokio::fs::write(&path, body)
        .await
        .map_err(|e| ReportError::Persistence(format!("write {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Provenance, SleepRecord};
    use chrono::NaiveDate;

    fn config(dir: &Path, synthetic: bool) -> ReportConfig {
        ReportConfig {
            data_dir: dir.to_path_buf(),
            synthetic_placeholders: synthetic,
            ..ReportConfig::default()
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-10T12:00:00Z")
            .expect("ts")
            .with_timezone(&Utc)
    }

    #[tokio::test]
    async fn placeholders_fill_empty_data_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let generator = ReportGenerator::from_config(&config(dir.path(), true));
        let report = generator.generate_at(None, now()).await.expect("generate");

        let s = &report.domain_snapshots;
        assert_eq!(s.hydration.provenance, Provenance::Synthetic);
        assert_eq!(s.sleep.provenance, Provenance::Synthetic);
        assert_eq!(s.weight.provenance, Provenance::Synthetic);
        assert_eq!(s.mental_health.provenance, Provenance::Synthetic);
        assert_eq!(s.facial_scan.provenance, Provenance::Measured);
        assert!(s.facial_scan.is_empty());
        // default mental record: stress 35 -> 65; facial default 75
        assert_eq!(report.derived_scores.mental_composite_score, 65.0);
        assert_eq!(report.derived_scores.overall_wellness, 70);
        assert!(report.owner_ref.is_none());
    }

    #[tokio::test]
    async fn without_placeholders_empty_dir_scores_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let generator = ReportGenerator::from_config(&config(dir.path(), false));
        let report = generator.generate_at(None, now()).await.expect("generate");
        assert_eq!(report.derived_scores.facial_composite_score, 75.0);
        assert_eq!(report.derived_scores.mental_composite_score, 70.0);
        assert_eq!(report.derived_scores.overall_wellness, 73);
        assert!(!report.domain_snapshots.hydration.is_synthetic());
    }

    #[tokio::test]
    async fn local_history_wins_over_placeholders() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = config(dir.path(), true);
        let day = NaiveDate::from_ymd_opt(2026, 3, 9).expect("date");
        let records = vec![SleepRecord {
            date: day,
            duration_hours: 6.5,
            quality: 72.0,
        }];
        write_source_file(&cfg.sources_dir(), SLEEP_FILE, &records)
            .await
            .expect("write");

        let report = ReportGenerator::from_config(&cfg)
            .generate_at(Some(&Identity::new("u-1")), now())
            .await
            .expect("generate");
        assert_eq!(report.domain_snapshots.sleep.provenance, Provenance::Measured);
        assert_eq!(report.domain_snapshots.sleep.records, records);
        assert_eq!(report.owner_ref.as_deref(), Some("u-1"));
    }
}
