use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use criterion::{Criterion, criterion_group, criterion_main};
use tokio::runtime::Builder;
use wellness_report_core::archiver::Archiver;
use wellness_report_core::collector::{Collector, RetentionPolicy};
use wellness_report_core::export::render_report;
use wellness_report_core::model::{FacialScanRecord, MentalHealthRecord};
use wellness_report_core::retry::RetryPolicy;
use wellness_report_core::scorer::derive_scores;
use wellness_report_core::source::DomainProvider;
use wellness_report_core::store::MemoryStore;
use wellness_report_core::synthetic::{
    DefaultMentalHealthSource, SyntheticHydrationSource, SyntheticSleepSource,
    SyntheticWeightSource,
};
use wellness_report_core::{DomainSnapshot, DomainSnapshots, HealthReport};

fn full_snapshots() -> DomainSnapshots {
    let day = NaiveDate::from_ymd_opt(2026, 3, 1).expect("date");
    DomainSnapshots {
        facial_scan: DomainSnapshot::measured(
            (0..10)
                .map(|i| FacialScanRecord {
                    date: day,
                    stress_level: 20.0 + f64::from(i),
                    sleep_quality: 70.0,
                    hydration_level: 65.0,
                    skin_health: 80.0,
                })
                .collect(),
        ),
        mental_health: DomainSnapshot::measured(vec![MentalHealthRecord {
            date: day,
            emotional_state: "Steady".into(),
            stress_level: 45.0,
            recommendations: vec!["Stretch in the morning".into()],
        }]),
        ..DomainSnapshots::default()
    }
}

fn bench_score_and_render(c: &mut Criterion) {
    let snapshots = full_snapshots();
    c.bench_function("derive_scores", |b| b.iter(|| derive_scores(&snapshots)));

    let scores = derive_scores(&snapshots);
    let report = HealthReport::new(None, snapshots.clone(), scores, Utc::now());
    c.bench_function("render_report", |b| b.iter(|| render_report(&report)));
}

fn bench_generate_and_save(c: &mut Criterion) {
    let rt = Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");

    let collector = Collector::new(RetentionPolicy::default(), RetryPolicy::none())
        .with_mental_health(DomainProvider::synthetic(DefaultMentalHealthSource))
        .with_hydration(DomainProvider::synthetic(SyntheticHydrationSource::default()))
        .with_sleep(DomainProvider::synthetic(SyntheticSleepSource))
        .with_weight(DomainProvider::synthetic(SyntheticWeightSource::default()));

    c.bench_function("collect_score_save", |b| {
        b.to_async(&rt).iter(|| {
            let collector = collector.clone();
            // fresh store so the index does not grow across iterations
            let archiver = Archiver::new(Arc::new(MemoryStore::new()));
            async move {
                let snapshots = collector.collect(None, Utc::now()).await;
                let scores = derive_scores(&snapshots);
                let report = HealthReport::new(None, snapshots, scores, Utc::now());
                archiver.save(&report).await.expect("save");
            }
        })
    });
}

criterion_group!(benches, bench_score_and_render, bench_generate_and_save);
criterion_main!(benches);
