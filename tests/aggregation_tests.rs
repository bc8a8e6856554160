use approx::assert_relative_eq;
use chrono::NaiveDate;
use forecast_conditions::core::{
    AggregationConfig, CoveragePolicy, GroupId, RawRecord, ResolvedSeries, ScenarioId,
    ScenarioSelection, SeriesRef, aggregate, aggregate_from_cutoff, aggregate_with_config,
};
use forecast_conditions::error::ConditionError;

const DAY5: [f64; 10] = [14.0, 14.2, 14.4, 14.6, 14.8, 15.2, 15.4, 15.6, 15.8, 16.0];
const DAY6: [f64; 10] = [15.0, 15.5, 16.0, 16.5, 17.0, 17.0, 17.5, 18.0, 18.5, 19.0];

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).expect("valid date")
}

fn study_records() -> Vec<RawRecord> {
    let mut records = Vec::new();
    for (group, offset) in [("City A", 0.0), ("City B", 10.0)] {
        for (i, value) in [10.0, 11.0, 12.0, 13.0].into_iter().enumerate() {
            records.push(RawRecord::historical(day(i as u32 + 1), group, value + offset));
        }
        for (k, (d5, d6)) in DAY5.iter().zip(DAY6.iter()).enumerate() {
            let scenario = format!("scenario_{}", k + 1);
            records.push(RawRecord::prediction(day(5), group, scenario.clone(), d5 + offset));
            records.push(RawRecord::prediction(day(6), group, scenario, d6 + offset));
        }
    }
    records
}

#[test]
fn end_to_end_fixture_aggregates_mean_bounds_and_shared_scale() {
    let dataset = aggregate(&study_records(), day(5)).expect("aggregate");
    let city_a = GroupId::new("City A");

    let group = dataset.group(&city_a).expect("group A");
    let historical: Vec<f64> = group.historical.iter().map(|p| p.value).collect();
    assert_eq!(historical, vec![10.0, 11.0, 12.0, 13.0]);
    assert_eq!(group.alternatives.len(), 10);

    let aggregated = dataset.aggregated(&city_a).expect("aggregated");
    let expected_day5 = DAY5.iter().sum::<f64>() / 10.0;
    assert_eq!(aggregated.len(), 2);
    assert_eq!(aggregated[0].date, day(5));
    assert_relative_eq!(aggregated[0].value, expected_day5, epsilon = 1e-9);
    assert_relative_eq!(aggregated[0].value, 15.0, epsilon = 1e-9);
    assert_relative_eq!(aggregated[1].value, 17.0, epsilon = 1e-9);

    let bounds = dataset.confidence_bounds(&city_a).expect("bounds");
    assert_eq!(bounds[0].min, 14.0);
    assert_eq!(bounds[0].max, 16.0);
    assert_eq!(bounds[1].min, 15.0);
    assert_eq!(bounds[1].max, 19.0);

    // Observed extent across both groups is [10, 29]; 5% symmetric padding.
    let (domain_min, domain_max) = dataset.shared_value_scale().domain();
    assert_relative_eq!(domain_min, 10.0 - 19.0 * 0.05, epsilon = 1e-9);
    assert_relative_eq!(domain_max, 29.0 + 19.0 * 0.05, epsilon = 1e-9);
    assert!(dataset.coverage_warnings().is_empty());
}

#[test]
fn groups_and_scenarios_are_ordered_naturally() {
    let dataset = aggregate(&study_records(), day(5)).expect("aggregate");
    let groups: Vec<&str> = dataset.group_ids().map(GroupId::as_str).collect();
    assert_eq!(groups, vec!["City A", "City B"]);

    let scenarios: Vec<&str> = dataset
        .alternative_lines()
        .filter(|(group, _)| group.as_str() == "City A")
        .map(|(_, series)| series.scenario.as_str())
        .collect();
    assert_eq!(scenarios[1], "scenario_2");
    assert_eq!(scenarios[9], "scenario_10");
    assert_eq!(dataset.alternative_lines().count(), 20);
}

#[test]
fn unequal_scenario_coverage_fails_by_default() {
    let mut records = study_records();
    records.retain(|record| {
        !(record.group.as_str() == "City B"
            && record.date == day(6)
            && record.scenario.as_ref().map(ScenarioId::as_str) == Some("scenario_4"))
    });

    let err = aggregate(&records, day(5)).expect_err("unequal coverage must fail");
    let message = match err {
        ConditionError::DataIntegrity(message) => message,
        other => panic!("expected a data integrity error, got {other:?}"),
    };
    assert!(message.contains("scenario_4"));
}

#[test]
fn lenient_coverage_aggregates_and_reports_short_dates() {
    let mut records = study_records();
    records.retain(|record| {
        !(record.group.as_str() == "City A"
            && record.date == day(6)
            && record.scenario.as_ref().map(ScenarioId::as_str) == Some("scenario_10"))
    });
    let config =
        AggregationConfig::default().with_coverage_policy(CoveragePolicy::WarnAndAggregate);

    let dataset = aggregate_with_config(&records, day(5), &config).expect("aggregate");
    let warnings = dataset.coverage_warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].group.as_str(), "City A");
    assert_eq!(warnings[0].date, day(6));
    assert_eq!(warnings[0].contributing, 9);
    assert_eq!(warnings[0].expected, 10);

    let aggregated = dataset
        .aggregated(&GroupId::new("City A"))
        .expect("aggregated");
    let expected = DAY6[..9].iter().sum::<f64>() / 9.0;
    assert_relative_eq!(aggregated[1].value, expected, epsilon = 1e-9);
}

#[test]
fn group_without_historical_points_fails() {
    let records = vec![
        RawRecord::historical(day(1), "City A", 10.0),
        RawRecord::prediction(day(5), "City A", "scenario_1", 12.0),
        RawRecord::prediction(day(5), "City B", "scenario_1", 12.0),
    ];
    let err = aggregate(&records, day(5)).expect_err("empty history must fail");
    assert!(matches!(err, ConditionError::DataIntegrity(message) if message.contains("City B")));
}

#[test]
fn historical_records_on_or_after_start_date_are_dropped() {
    let mut records = study_records();
    records.push(RawRecord::historical(day(5), "City A", 99.0));
    let dataset = aggregate(&records, day(5)).expect("aggregate");
    let group = dataset.group(&GroupId::new("City A")).expect("group");
    assert_eq!(group.historical.len(), 4);
    assert!(dataset.shared_value_scale().domain().1 < 99.0);
}

#[test]
fn scenario_selection_limits_the_ensemble() {
    let selection = ScenarioSelection::Only(vec![
        ScenarioId::new("scenario_1"),
        ScenarioId::new("scenario_10"),
        ScenarioId::new("scenario_99"),
    ]);
    let config = AggregationConfig::default().with_scenario_selection(selection);
    let dataset = aggregate_with_config(&study_records(), day(5), &config).expect("aggregate");

    let city_a = GroupId::new("City A");
    assert_eq!(dataset.scenario_count(&city_a), 2);
    let aggregated = dataset.aggregated(&city_a).expect("aggregated");
    assert_relative_eq!(aggregated[0].value, 15.0, epsilon = 1e-9);
}

#[test]
fn fixed_value_domain_pins_the_shared_axis() {
    let config = AggregationConfig::default().with_fixed_value_domain(0.0, 150.0);
    let dataset = aggregate_with_config(&study_records(), day(5), &config).expect("aggregate");
    assert_eq!(dataset.shared_value_scale().domain(), (0.0, 150.0));

    let invalid = AggregationConfig::default().with_value_padding_ratio(0.75);
    let err = aggregate_with_config(&study_records(), day(5), &invalid).expect_err("bad padding");
    assert!(matches!(err, ConditionError::InvalidConfiguration(_)));
}

#[test]
fn padding_ratio_is_checked_even_when_the_domain_is_pinned() {
    for ratio in [0.75, -0.1, f64::NAN] {
        let config = AggregationConfig::default()
            .with_fixed_value_domain(0.0, 150.0)
            .with_value_padding_ratio(ratio);
        let err = aggregate_with_config(&study_records(), day(5), &config)
            .expect_err("bad padding with a pinned domain");
        assert!(matches!(err, ConditionError::InvalidConfiguration(_)));
    }

    let inverted = AggregationConfig::default().with_fixed_value_domain(10.0, 5.0);
    assert!(inverted.validate().is_err());
    assert!(aggregate_with_config(&study_records(), day(5), &inverted).is_err());
}

#[test]
fn month_day_cutoff_resolves_in_the_data_year() {
    let config = AggregationConfig::default();
    let dataset = aggregate_from_cutoff(&study_records(), "03/05", &config).expect("aggregate");
    assert_eq!(dataset.start_date(), day(5));
    assert_eq!(dataset, aggregate(&study_records(), day(5)).expect("aggregate"));

    for cutoff in ["3-5", "02/30", ""] {
        let err = aggregate_from_cutoff(&study_records(), cutoff, &config).expect_err("bad cutoff");
        assert!(matches!(err, ConditionError::InvalidConfiguration(_)));
    }
    let err = aggregate_from_cutoff(&[], "05/01", &config).expect_err("no records");
    assert!(matches!(err, ConditionError::DataIntegrity(_)));
}

#[test]
fn anchored_series_start_at_the_last_historical_point() {
    let dataset = aggregate(&study_records(), day(5)).expect("aggregate");
    let city_b = GroupId::new("City B");

    let Some(ResolvedSeries::Line(points)) =
        dataset.resolve(&SeriesRef::Aggregated(city_b.clone()), true)
    else {
        panic!("aggregated series should resolve to a line");
    };
    assert_eq!(points.len(), 3);
    assert_eq!(points[0].date, day(4));
    assert_eq!(points[0].value, 23.0);

    let Some(ResolvedSeries::Band(band)) = dataset.resolve(&SeriesRef::Bounds(city_b), true)
    else {
        panic!("bounds should resolve to a band");
    };
    assert_eq!((band[0].min, band[0].max), (23.0, 23.0));
    assert_eq!((band[1].min, band[1].max), (24.0, 26.0));
}

#[test]
fn raw_records_accept_legacy_column_names() {
    let input = r#"[
        {"date": "2025-03-01", "city": "City A", "price": 10.0, "series": "historical"},
        {"date": "2025-03-05", "stock": "City A", "value": 14.0,
         "series": "prediction", "scenario": "scenario_1"}
    ]"#;
    let records: Vec<RawRecord> = serde_json::from_str(input).expect("parse records");
    let dataset = aggregate(&records, day(5)).expect("aggregate");
    assert_eq!(dataset.scenario_count(&GroupId::new("City A")), 1);
}

#[test]
fn scenario_ids_with_oversized_numeric_suffixes_aggregate_cleanly() {
    let ids = [
        "s2",
        "s100",
        "s18446744073709551616",
        "s007",
        "s99999999999999999999999",
        "s",
    ];
    let mut records = vec![RawRecord::historical(day(1), "A", 10.0)];
    for (k, id) in ids.iter().enumerate() {
        for d in 5..=7 {
            records.push(RawRecord::prediction(day(d), "A", *id, 10.0 + k as f64));
        }
    }

    let dataset = aggregate(&records, day(5)).expect("fully covered input aggregates");
    let group = GroupId::new("A");
    assert_eq!(dataset.scenario_count(&group), ids.len());
    let ordered: Vec<&str> = dataset
        .alternative_lines()
        .map(|(_, series)| series.scenario.as_str())
        .collect();
    assert_eq!(
        ordered,
        vec![
            "s",
            "s2",
            "s007",
            "s100",
            "s18446744073709551616",
            "s99999999999999999999999"
        ]
    );
}
