use chrono::{Duration, NaiveDate};
use forecast_conditions::core::{GroupId, RawRecord, ScenarioId, aggregate};
use forecast_conditions::interaction::RevealState;
use proptest::prelude::*;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date")
}

proptest! {
    #[test]
    fn aggregated_mean_lies_within_bounds_that_enclose_every_scenario(
        history in proptest::collection::vec(-500.0f64..500.0, 1..8),
        scenario_count in 1usize..12,
        horizon in 1usize..6,
        seed_values in proptest::collection::vec(-1_000.0f64..1_000.0, 72)
    ) {
        let start = base_date() + Duration::days(history.len() as i64);
        let mut records = Vec::new();
        for (offset, value) in history.iter().enumerate() {
            records.push(RawRecord::historical(
                base_date() + Duration::days(offset as i64),
                "A",
                *value,
            ));
        }
        for scenario in 0..scenario_count {
            for step in 0..horizon {
                let value = seed_values[(scenario * horizon + step) % seed_values.len()];
                records.push(RawRecord::prediction(
                    start + Duration::days(step as i64),
                    "A",
                    format!("scenario_{}", scenario + 1),
                    value,
                ));
            }
        }

        let dataset = aggregate(&records, start).expect("aggregate");
        let group_id = GroupId::new("A");
        let group = dataset.group(&group_id).expect("group");
        let aggregated = dataset.aggregated(&group_id).expect("aggregated");
        let bounds = dataset.confidence_bounds(&group_id).expect("bounds");
        prop_assert_eq!(aggregated.len(), horizon);
        prop_assert_eq!(bounds.len(), horizon);

        for (index, (mean, envelope)) in aggregated.iter().zip(bounds).enumerate() {
            let values: Vec<f64> = group
                .alternatives
                .iter()
                .map(|series| series.points[index].value)
                .collect();
            let expected = values.iter().sum::<f64>() / values.len() as f64;
            prop_assert!((mean.value - expected).abs() <= 1e-9 * expected.abs().max(1.0));
            prop_assert!(envelope.min <= mean.value + 1e-9);
            prop_assert!(mean.value <= envelope.max + 1e-9);
            for value in values {
                prop_assert!(envelope.contains(value));
            }
        }

        let scale = dataset.shared_value_scale();
        for value in history.iter().chain(bounds.iter().flat_map(|b| [&b.min, &b.max])) {
            prop_assert!(scale.contains(*value));
        }
    }

    #[test]
    fn reveal_state_reaches_terminal_after_exactly_total_advances(
        total in 0usize..64,
        extra in 0usize..8
    ) {
        let mut state = RevealState::new(total);
        for expected in 0..total {
            prop_assert!(!state.is_terminal());
            prop_assert_eq!(state.advance(), Some(expected));
        }
        prop_assert!(state.is_terminal());
        for _ in 0..extra {
            prop_assert_eq!(state.advance(), None);
        }
        prop_assert_eq!(state.revealed_count(), total);
    }

    #[test]
    fn scenario_ordering_is_a_total_order(
        a in "[a-c_]{0,2}[0-9]{0,24}",
        b in "[a-c_]{0,2}[0-9]{0,24}",
        c in "[a-c_]{0,2}[0-9]{0,24}"
    ) {
        let (a, b, c) = (ScenarioId::new(a), ScenarioId::new(b), ScenarioId::new(c));
        prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
        prop_assert_eq!(a.cmp(&b).is_eq(), a == b);
        if a <= b && b <= c {
            prop_assert!(a <= c);
        }
        if a >= b && b >= c {
            prop_assert!(a >= c);
        }
    }
}
