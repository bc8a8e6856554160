use std::rc::Rc;

use chrono::NaiveDate;
use forecast_conditions::api::{
    DisplayOverride, GroupDisplay, StrategyFactory, StrategyKind, StrategyPhase, VisualConfig,
    condition_info, create,
};
use forecast_conditions::core::{CanonicalDataset, GroupId, RawRecord, ScenarioId, aggregate};
use forecast_conditions::error::ConditionError;
use forecast_conditions::interaction::{InteractionLog, ManualClock};
use forecast_conditions::render::{
    DrawKind, ElementId, NullRenderer, PlanLayer, StrokePattern, ZoneTrigger,
};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).expect("valid date")
}

fn study_dataset(start: u32) -> CanonicalDataset {
    let mut records = Vec::new();
    for (group, offset) in [("City A", 0.0), ("City B", 10.0)] {
        for d in 1..=4 {
            records.push(RawRecord::historical(day(d), group, 9.0 + f64::from(d) + offset));
        }
        for scenario in 1..=10 {
            for d in 5..=6 {
                let value = 10.0 + f64::from(d) + f64::from(scenario) * 0.2 + offset;
                records.push(RawRecord::prediction(
                    day(d),
                    group,
                    format!("scenario_{scenario}"),
                    value,
                ));
            }
        }
    }
    aggregate(&records, day(start)).expect("aggregate fixture")
}

fn log() -> InteractionLog {
    InteractionLog::new(Rc::new(ManualClock::new()))
}

#[test]
fn every_known_index_renders_identical_plans_twice() {
    let dataset = Rc::new(study_dataset(5));
    let log = log();
    for info in condition_info() {
        let mut strategy = create(info.index, Rc::clone(&dataset), VisualConfig::default(), &log)
            .expect("create strategy");
        let first = strategy.render().expect("first render").clone();
        let second = strategy.render().expect("second render").clone();
        assert_eq!(first, second, "strategy {} must render idempotently", info.slug);
        assert_eq!(first.strategy, info.slug);
        first.validate().expect("valid plan");

        let mut fresh = create(info.index, Rc::clone(&dataset), VisualConfig::default(), &log)
            .expect("create fresh strategy");
        assert_eq!(fresh.render().expect("fresh render"), &first);
    }
    assert_eq!(condition_info().len(), 17);
}

#[test]
fn unknown_index_fails_without_plan_or_log_entries() {
    let dataset = Rc::new(study_dataset(5));
    let log = log();
    let err = create(999, dataset, VisualConfig::default(), &log).expect_err("999 is unknown");
    assert!(matches!(err, ConditionError::InvalidConfiguration(_)));
    assert!(log.is_empty());
    assert!(StrategyKind::from_index(17).is_err());
}

#[test]
fn plans_draw_the_series_of_their_condition_in_layer_order() {
    let dataset = Rc::new(study_dataset(5));
    let log = log();
    let city_a = GroupId::new("City A");
    let scenario_3 = ElementId::scenario(&city_a, &ScenarioId::new("scenario_3"));

    let plan_for = |kind: StrategyKind| {
        let mut strategy = create(kind.index(), Rc::clone(&dataset), VisualConfig::default(), &log)
            .expect("create");
        strategy.render().expect("render").clone()
    };

    let historical_only = plan_for(StrategyKind::HistoricalOnly);
    assert_eq!(historical_only.len(), 2);
    assert!(historical_only.contains(&ElementId::historical(&city_a)));

    let baseline = plan_for(StrategyKind::Baseline);
    let aggregated = baseline
        .instruction(&ElementId::aggregated(&city_a))
        .expect("aggregated line");
    assert_eq!(
        aggregated.style.pattern,
        StrokePattern::Dashed {
            dash_px: 5.0,
            gap_px: 5.0
        }
    );
    assert!(matches!(aggregated.kind, DrawKind::Line { anchored: true, .. }));

    let band = plan_for(StrategyKind::ConfidenceBand);
    let bounds = band
        .instruction(&ElementId::bounds(&city_a))
        .expect("bounds area");
    assert!(matches!(bounds.kind, DrawKind::Area { .. }));
    assert_eq!(bounds.opacity, 0.2);
    assert!(bounds.initially_visible);

    let ensemble = plan_for(StrategyKind::Ensemble);
    assert_eq!(ensemble.in_layer(PlanLayer::Scenarios).count(), 20);
    assert!(ensemble.instruction(&scenario_3).expect("line").initially_visible);

    let hover = plan_for(StrategyKind::EnsembleHover);
    assert!(!hover.instruction(&scenario_3).expect("line").initially_visible);
    assert_eq!(hover.in_layer(PlanLayer::HitZones).count(), 2);

    let band_hover = plan_for(StrategyKind::BandHover);
    assert!(!band_hover
        .instruction(&ElementId::bounds(&city_a))
        .expect("bounds")
        .initially_visible);

    let morph = plan_for(StrategyKind::BandToEnsemble);
    assert!(morph.instruction(&ElementId::bounds(&city_a)).expect("bounds").initially_visible);
    assert!(!morph.instruction(&scenario_3).expect("line").initially_visible);

    let broken = plan_for(StrategyKind::Broken);
    let zone = broken.instruction(&ElementId::zone(&city_a)).expect("zone");
    assert!(matches!(
        zone.kind,
        DrawKind::HitZone { offset_px, trigger: ZoneTrigger::Hover, .. } if offset_px == (50.0, 0.0)
    ));

    let poor = plan_for(StrategyKind::Poor);
    let zone = poor.instruction(&ElementId::zone(&city_a)).expect("zone");
    assert!(matches!(zone.kind, DrawKind::HitZone { trigger: ZoneTrigger::Click, .. }));
    assert_eq!(zone.style.stroke_width, 20.0);

    let combined = plan_for(StrategyKind::Combined);
    let layers: Vec<PlanLayer> = combined.instructions.iter().map(|i| i.layer).collect();
    let first_scenario = layers.iter().position(|l| *l == PlanLayer::Scenarios);
    let last_bounds = layers.iter().rposition(|l| *l == PlanLayer::Bounds);
    let first_aggregated = layers.iter().position(|l| *l == PlanLayer::Aggregated);
    let last_scenario = layers.iter().rposition(|l| *l == PlanLayer::Scenarios);
    assert!(last_bounds < first_scenario);
    assert!(last_scenario < first_aggregated);

    let sequential = plan_for(StrategyKind::SequentialReveal);
    let control = sequential
        .instruction(&ElementId::next_line_control())
        .expect("next line control");
    assert!(matches!(&control.kind, DrawKind::Control { label, .. } if label == "Next Line"));
    assert_eq!(sequential.element_ids().last(), Some(&&ElementId::next_line_control()));
}

#[test]
fn parameterized_display_selects_region_or_line_subsets_per_group() {
    let dataset = study_dataset(5);
    let factory = StrategyFactory::new(dataset, VisualConfig::default(), log()).expect("factory");
    let city_a = GroupId::new("City A");
    let city_b = GroupId::new("City B");

    let display = DisplayOverride::new()
        .with_group("City A", GroupDisplay::Region)
        .with_group("City B", GroupDisplay::Lines { count: 5 });
    let mut strategy = factory
        .create_with_display(StrategyKind::Parameterized.index(), display)
        .expect("create");
    let plan = strategy.render().expect("render").clone();

    assert!(plan.contains(&ElementId::bounds(&city_a)));
    assert!(!plan.contains(&ElementId::bounds(&city_b)));
    let lines_b: Vec<String> = plan
        .in_layer(PlanLayer::Scenarios)
        .map(|instruction| instruction.element.to_string())
        .collect();
    assert_eq!(
        lines_b,
        [1, 2, 3, 5, 8]
            .iter()
            .map(|n| format!("scenario/City B/scenario_{n}"))
            .collect::<Vec<_>>()
    );

    let all_lines = DisplayOverride::new().with_group("City A", GroupDisplay::Lines { count: 10 });
    let mut strategy = factory
        .create_with_display(StrategyKind::Parameterized.index(), all_lines)
        .expect("create");
    let plan = strategy.render().expect("render").clone();
    assert_eq!(plan.in_layer(PlanLayer::Scenarios).count(), 10);
    // Groups without an override draw the aggregated line alone.
    assert!(plan.contains(&ElementId::aggregated(&city_b)));
    assert!(!plan.contains(&ElementId::bounds(&city_b)));
}

#[test]
fn malformed_display_overrides_are_rejected() {
    let factory =
        StrategyFactory::new(study_dataset(5), VisualConfig::default(), log()).expect("factory");
    let zero = DisplayOverride::new().with_group("City A", GroupDisplay::Lines { count: 0 });
    assert!(matches!(
        factory.create_with_display(11, zero),
        Err(ConditionError::InvalidConfiguration(_))
    ));

    let unknown = DisplayOverride::new().with_group("City Z", GroupDisplay::Region);
    assert!(factory.create_with_display(11, unknown).is_err());

    let misplaced = DisplayOverride::new().with_group("City A", GroupDisplay::Region);
    assert!(factory.create_with_display(3, misplaced).is_err());
}

#[test]
fn malformed_visual_config_is_rejected_at_construction() {
    let dataset = Rc::new(study_dataset(5));
    let log = log();
    let config = VisualConfig::default().with_shade_opacity(1.5);
    assert!(matches!(
        create(2, Rc::clone(&dataset), config, &log),
        Err(ConditionError::InvalidConfiguration(_))
    ));
    let config = VisualConfig::default().with_fade_durations(-1.0, 200.0);
    assert!(create(4, dataset, config, &log).is_err());
}

#[test]
fn null_renderer_resolves_every_series_of_a_plan() {
    let dataset = Rc::new(study_dataset(5));
    let log = log();
    let mut strategy = create(9, Rc::clone(&dataset), VisualConfig::default(), &log)
        .expect("create combined");
    let mut renderer = NullRenderer::default();
    strategy.render_with(&mut renderer).expect("render");

    assert_eq!(renderer.render_count, 1);
    assert_eq!(renderer.last_area_count, 2);
    // historical + aggregated + ten scenarios per group
    assert_eq!(renderer.last_line_count, 24);
    assert_eq!(renderer.last_hit_zone_count, 0);
}

#[test]
fn mounting_over_a_slot_tears_down_the_previous_strategy() {
    let clock = ManualClock::new();
    let log = InteractionLog::new(Rc::new(clock.clone()));
    let mut factory =
        StrategyFactory::new(study_dataset(5), VisualConfig::default(), log.clone())
            .expect("factory");

    let poor = factory.mount("main", StrategyKind::Poor.index()).expect("mount poor");
    assert_eq!(poor.phase(), StrategyPhase::Attached);
    assert_eq!(poor.pending_timer_count(), 1);

    let ensemble = factory
        .mount("main", StrategyKind::Ensemble.index())
        .expect("mount ensemble");
    assert_eq!(ensemble.kind(), StrategyKind::Ensemble);
    assert_eq!(factory.mounted_slots(), vec!["main"]);

    let before = log.len();
    clock.advance_ms(60_000.0);
    assert_eq!(factory.run_due_timers(), 0);
    assert_eq!(log.len(), before, "no jitter may fire after the switch");

    assert!(factory.unmount("main"));
    assert!(!factory.unmount("main"));
}

#[test]
fn replacing_the_dataset_remounts_every_slot() {
    let mut factory =
        StrategyFactory::new(study_dataset(5), VisualConfig::default(), log()).expect("factory");
    factory.mount("left", 3).expect("mount ensemble");
    factory.mount("right", 10).expect("mount sequential");

    factory
        .replace_dataset(study_dataset(6))
        .expect("replace dataset");
    assert_eq!(factory.mounted_slots(), vec!["left", "right"]);
    let left = factory.strategy("left").expect("left slot");
    assert_eq!(left.kind(), StrategyKind::Ensemble);
    assert_eq!(left.dataset().start_date(), day(6));
    let historical = left
        .dataset()
        .group(&GroupId::new("City A"))
        .expect("group")
        .historical
        .len();
    assert_eq!(historical, 4);
    assert_eq!(factory.strategy("right").expect("right").phase(), StrategyPhase::Attached);

    assert_eq!(factory.cleanup_all(), 2);
    assert!(factory.mounted_slots().is_empty());
}
