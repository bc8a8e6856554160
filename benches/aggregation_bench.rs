use std::rc::Rc;

use chrono::{Duration, NaiveDate};
use criterion::{Criterion, criterion_group, criterion_main};
use forecast_conditions::api::{
    DisplayOverride, StrategyKind, VisualConfig, build_draw_plan, create,
};
use forecast_conditions::core::{CanonicalDataset, RawRecord, aggregate};
use forecast_conditions::interaction::{InteractionLog, InteractionTrigger, ManualClock};
use forecast_conditions::render::ElementId;
use std::hint::black_box;

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date") + Duration::days(365)
}

fn ensemble_records(scenarios: usize, horizon: usize) -> Vec<RawRecord> {
    let start = start_date();
    let mut records = Vec::with_capacity(2 * (365 + scenarios * horizon));
    for (group, base) in [("City A", 100.0), ("City B", 250.0)] {
        for i in 0..365 {
            let date = start - Duration::days(365 - i);
            records.push(RawRecord::historical(date, group, base + (i as f64 * 0.1).sin()));
        }
        for scenario in 0..scenarios {
            for step in 0..horizon {
                let value = base + step as f64 * 0.05 + (scenario as f64 * 0.37).cos();
                records.push(RawRecord::prediction(
                    start + Duration::days(step as i64),
                    group,
                    format!("scenario_{}", scenario + 1),
                    value,
                ));
            }
        }
    }
    records
}

fn bench_aggregate_100_scenarios(c: &mut Criterion) {
    let records = ensemble_records(100, 90);
    let start = start_date();

    c.bench_function("aggregate_2x100_scenarios_90_days", |b| {
        b.iter(|| {
            let _ = aggregate(black_box(&records), black_box(start))
                .expect("aggregation should succeed");
        })
    });
}

fn bench_combined_draw_plan(c: &mut Criterion) {
    let dataset: CanonicalDataset =
        aggregate(&ensemble_records(100, 90), start_date()).expect("aggregate");
    let config = VisualConfig::default();
    let display = DisplayOverride::default();

    c.bench_function("combined_draw_plan_2x100", |b| {
        b.iter(|| {
            let _ = build_draw_plan(
                black_box(StrategyKind::Combined),
                black_box(&dataset),
                black_box(&config),
                black_box(&display),
            )
            .expect("plan should build");
        })
    });
}

fn bench_hover_round_trip(c: &mut Criterion) {
    let dataset = Rc::new(aggregate(&ensemble_records(50, 30), start_date()).expect("aggregate"));
    let clock = ManualClock::new();
    let log = InteractionLog::new(Rc::new(clock.clone()));
    let mut strategy = create(
        StrategyKind::EnsembleHover.index(),
        dataset,
        VisualConfig::default(),
        &log,
    )
    .expect("create");
    strategy.attach_interactions().expect("attach");
    let zone = ElementId::new("zone/City A");
    let enter = InteractionTrigger::enter(zone.clone());
    let leave = InteractionTrigger::leave(zone);

    c.bench_function("ensemble_hover_enter_leave", |b| {
        b.iter(|| {
            strategy.handle(black_box(&enter));
            clock.advance_ms(16.0);
            strategy.handle(black_box(&leave));
            if log.len() > 10_000 {
                log.reset();
            }
        })
    });
}

criterion_group!(
    benches,
    bench_aggregate_100_scenarios,
    bench_combined_draw_plan,
    bench_hover_round_trip
);
criterion_main!(benches);
