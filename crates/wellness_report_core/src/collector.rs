//! Per-domain collection with isolated failure handling.
//!
//! Each domain has an ordered provider chain. The first provider that yields
//! valid records within the retention window wins; failures are logged and
//! counted, never propagated.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::SourceError;
use crate::model::{
    Domain, DomainRecord, DomainSnapshot, DomainSnapshots, ExerciseRecord, FacialScanRecord,
    HydrationRecord, Identity, MentalHealthRecord, SleepRecord, WeightRecord,
};
use crate::observability;
use crate::retry::RetryPolicy;
use crate::source::{DomainProvider, FetchRequest};
use crate::utils::window_start;

/// How many records each domain keeps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub facial_scans: usize,
    pub mental_health: usize,
    pub exercise: usize,
    /// Trailing window for hydration, sleep and weight, today inclusive.
    pub daily_window_days: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            facial_scans: 10,
            mental_health: 5,
            exercise: 20,
            daily_window_days: 7,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Retention {
    Latest(usize),
    TrailingDays(u32),
}

impl Retention {
    fn fetch_limit(self) -> usize {
        match self {
            Retention::Latest(n) => n,
            Retention::TrailingDays(days) => days as usize,
        }
    }

    /// Sort most recent first and cut to the window.
    fn apply<R: DomainRecord>(self, mut records: Vec<R>, today: NaiveDate) -> Vec<R> {
        records.sort_by_key(|r| std::cmp::Reverse(r.date()));
        match self {
            Retention::Latest(n) => {
                records.truncate(n);
                records
            }
            Retention::TrailingDays(days) => {
                let start = window_start(today, days);
                records
                    .into_iter()
                    .filter(|r| r.date() >= start && r.date() <= today)
                    .collect()
            }
        }
    }
}

fn validate_all<R: DomainRecord>(records: Vec<R>) -> Result<Vec<R>, SourceError> {
    for r in &records {
        r.validate()
            .map_err(|msg| SourceError::Malformed(format!("record dated {}: {msg}", r.date())))?;
    }
    Ok(records)
}

#[derive(Clone, Default)]
pub struct Collector {
    facial_scans: Vec<DomainProvider<FacialScanRecord>>,
    mental_health: Vec<DomainProvider<MentalHealthRecord>>,
    exercise: Vec<DomainProvider<ExerciseRecord>>,
    hydration: Vec<DomainProvider<HydrationRecord>>,
    sleep: Vec<DomainProvider<SleepRecord>>,
    weight: Vec<DomainProvider<WeightRecord>>,
    retention: RetentionPolicy,
    retry: RetryPolicy,
}

impl Collector {
    pub fn new(retention: RetentionPolicy, retry: RetryPolicy) -> Self {
        Self {
            retention,
            retry,
            ..Self::default()
        }
    }

    pub fn with_facial_scans(mut self, provider: DomainProvider<FacialScanRecord>) -> Self {
        self.facial_scans.push(provider);
        self
    }

    pub fn with_mental_health(mut self, provider: DomainProvider<MentalHealthRecord>) -> Self {
        self.mental_health.push(provider);
        self
    }

    pub fn with_exercise(mut self, provider: DomainProvider<ExerciseRecord>) -> Self {
        self.exercise.push(provider);
        self
    }

    pub fn with_hydration(mut self, provider: DomainProvider<HydrationRecord>) -> Self {
        self.hydration.push(provider);
        self
    }

    pub fn with_sleep(mut self, provider: DomainProvider<SleepRecord>) -> Self {
        self.sleep.push(provider);
        self
    }

    pub fn with_weight(mut self, provider: DomainProvider<WeightRecord>) -> Self {
        self.weight.push(provider);
        self
    }

    /// Gather every domain concurrently relative to `now`.
    pub async fn collect(
        &self,
        identity: Option<&Identity>,
        now: DateTime<Utc>,
    ) -> DomainSnapshots {
        let today = now.date_naive();
        let r = &self.retention;
        let facial = Retention::Latest(r.facial_scans);
        let mental = Retention::Latest(r.mental_health);
        let sessions = Retention::Latest(r.exercise);
        let daily = Retention::TrailingDays(r.daily_window_days);
        let (facial_scan, mental_health, exercise, hydration, sleep, weight) = tokio::join!(
            self.collect_domain(&self.facial_scans, identity, today, facial),
            self.collect_domain(&self.mental_health, identity, today, mental),
            self.collect_domain(&self.exercise, identity, today, sessions),
            self.collect_domain(&self.hydration, identity, today, daily),
            self.collect_domain(&self.sleep, identity, today, daily),
            self.collect_domain(&self.weight, identity, today, daily),
        );
        DomainSnapshots {
            facial_scan,
            mental_health,
            exercise,
            hydration,
            sleep,
            weight,
        }
    }

    async fn collect_domain<R>(
        &self,
        providers: &[DomainProvider<R>],
        identity: Option<&Identity>,
        today: NaiveDate,
        retention: Retention,
    ) -> DomainSnapshot<R>
    where
        R: DomainRecord + Send + 'static,
    {
        let domain = R::DOMAIN;
        let request = FetchRequest {
            identity,
            limit: retention.fetch_limit(),
            today,
        };
        let mut answered = false;

        for provider in providers {
            let source = provider.source();
            if source.requires_identity() && identity.is_none() {
                debug!(%domain, source = source.name(), "skipping source that needs an identity");
                continue;
            }
            let fetched = if provider.is_synthetic() {
                source.fetch_recent(&request).await
            } else {
                self.retry
                    .retry_when(|| source.fetch_recent(&request), SourceError::is_transient)
                    .await
            };
            match fetched.and_then(validate_all) {
                Ok(records) => {
                    answered = true;
                    let records = retention.apply(records, today);
                    if records.is_empty() {
                        debug!(
                            %domain,
                            source = source.name(),
                            "source has no records in window"
                        );
                        continue;
                    }
                    debug!(
                        %domain,
                        source = source.name(),
                        count = records.len(),
                        "domain collected"
                    );
                    if provider.is_synthetic() {
                        observability::record_synthetic_snapshot(domain);
                    }
                    return DomainSnapshot {
                        provenance: provider.provenance(),
                        records,
                    };
                }
                Err(e) => {
                    warn!(%domain, source = source.name(), error = %e, "domain source unavailable");
                    observability::record_source_failure(domain);
                }
            }
        }

        if answered {
            DomainSnapshot::measured(Vec::new())
        } else {
            DomainSnapshot::unavailable()
        }
    }
}
