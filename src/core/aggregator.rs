use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
#[cfg(feature = "parallel-aggregation")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::scale::DEFAULT_VALUE_PADDING_RATIO;
use crate::core::windowing::points_before;
use crate::core::{
    BoundsPoint, CanonicalDataset, CoverageWarning, GroupId, GroupSeries, RawRecord, ScenarioId,
    ScenarioSeries, SeriesKind, ValuePoint, ValueScale, parse_month_day,
};
use crate::error::{ConditionError, ConditionResult};

/// How aggregation treats scenarios with mismatched date coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CoveragePolicy {
    /// Unequal coverage fails with `DataIntegrity`.
    #[default]
    Strict,
    /// Aggregates over the available sample and records a `CoverageWarning`
    /// for every short date.
    WarnAndAggregate,
}

/// Which scenarios take part in aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ScenarioSelection {
    #[default]
    All,
    /// Keeps only the listed scenarios; ids absent from the data are ignored.
    Only(Vec<ScenarioId>),
}

impl ScenarioSelection {
    fn includes(&self, scenario: &ScenarioId) -> bool {
        match self {
            Self::All => true,
            Self::Only(allowed) => allowed.contains(scenario),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationConfig {
    #[serde(default = "default_value_padding_ratio")]
    pub value_padding_ratio: f64,
    #[serde(default)]
    pub coverage_policy: CoveragePolicy,
    #[serde(default)]
    pub scenario_selection: ScenarioSelection,
    /// Pins the shared axis instead of deriving it from the data extent.
    #[serde(default)]
    pub fixed_value_domain: Option<(f64, f64)>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            value_padding_ratio: default_value_padding_ratio(),
            coverage_policy: CoveragePolicy::default(),
            scenario_selection: ScenarioSelection::default(),
            fixed_value_domain: None,
        }
    }
}

impl AggregationConfig {
    #[must_use]
    pub fn with_coverage_policy(mut self, policy: CoveragePolicy) -> Self {
        self.coverage_policy = policy;
        self
    }

    #[must_use]
    pub fn with_scenario_selection(mut self, selection: ScenarioSelection) -> Self {
        self.scenario_selection = selection;
        self
    }

    #[must_use]
    pub fn with_value_padding_ratio(mut self, ratio: f64) -> Self {
        self.value_padding_ratio = ratio;
        self
    }

    #[must_use]
    pub fn with_fixed_value_domain(mut self, min: f64, max: f64) -> Self {
        self.fixed_value_domain = Some((min, max));
        self
    }

    /// Checks the padding ratio and any pinned domain before aggregating,
    /// whichever of the two ends up shaping the axis.
    pub fn validate(&self) -> ConditionResult<()> {
        let ratio = self.value_padding_ratio;
        if !ratio.is_finite() || !(0.0..0.5).contains(&ratio) {
            return Err(ConditionError::InvalidConfiguration(format!(
                "value padding ratio must be finite and in [0, 0.5), got {ratio}"
            )));
        }
        if let Some((min, max)) = self.fixed_value_domain {
            ValueScale::new(min, max)?;
        }
        Ok(())
    }
}

fn default_value_padding_ratio() -> f64 {
    DEFAULT_VALUE_PADDING_RATIO
}

/// Aggregates raw records with the default configuration.
pub fn aggregate(
    records: &[RawRecord],
    start_date: NaiveDate,
) -> ConditionResult<CanonicalDataset> {
    aggregate_with_config(records, start_date, &AggregationConfig::default())
}

/// Aggregates with an `MM/DD` cutoff, resolved in the year of the earliest
/// record.
pub fn aggregate_from_cutoff(
    records: &[RawRecord],
    cutoff: &str,
    config: &AggregationConfig,
) -> ConditionResult<CanonicalDataset> {
    let Some(earliest) = records.iter().map(|record| record.date).min() else {
        return Err(ConditionError::DataIntegrity("raw dataset contains no records".to_owned()));
    };
    let start_date = parse_month_day(cutoff, earliest.year())?;
    aggregate_with_config(records, start_date, config)
}

/// Converts flat records into the canonical dataset.
///
/// Historical points are those dated strictly before `start_date`. Groups are
/// aggregated independently and only combined into the shared value scale at
/// the end, so one group's failure never leaves partial state behind.
pub fn aggregate_with_config(
    records: &[RawRecord],
    start_date: NaiveDate,
    config: &AggregationConfig,
) -> ConditionResult<CanonicalDataset> {
    config.validate()?;
    if records.is_empty() {
        return Err(ConditionError::DataIntegrity("raw dataset contains no records".to_owned()));
    }

    let mut partitions: IndexMap<GroupId, Vec<&RawRecord>> = IndexMap::new();
    for record in records {
        record.validate()?;
        partitions
            .entry(record.group.clone())
            .or_default()
            .push(record);
    }
    partitions.sort_keys();
    let partitions: Vec<(GroupId, Vec<&RawRecord>)> = partitions.into_iter().collect();

    #[cfg(feature = "parallel-aggregation")]
    let results: Vec<ConditionResult<GroupAggregate>> = partitions
        .par_iter()
        .map(|(group, rows)| aggregate_group(group, rows, start_date, config))
        .collect();

    #[cfg(not(feature = "parallel-aggregation"))]
    let results: Vec<ConditionResult<GroupAggregate>> = partitions
        .iter()
        .map(|(group, rows)| aggregate_group(group, rows, start_date, config))
        .collect();

    let aggregates = results.into_iter().collect::<ConditionResult<Vec<_>>>()?;

    let mut groups = IndexMap::with_capacity(aggregates.len());
    let mut aggregated = IndexMap::with_capacity(aggregates.len());
    let mut confidence_bounds = IndexMap::with_capacity(aggregates.len());
    let mut coverage_warnings = Vec::new();
    let mut extent_min = f64::INFINITY;
    let mut extent_max = f64::NEG_INFINITY;

    for item in aggregates {
        extent_min = extent_min.min(item.extent.0);
        extent_max = extent_max.max(item.extent.1);
        coverage_warnings.extend(item.warnings);
        aggregated.insert(item.group.clone(), item.aggregated);
        confidence_bounds.insert(item.group.clone(), item.bounds);
        groups.insert(item.group, item.series);
    }

    let shared_value_scale = match config.fixed_value_domain {
        Some((min, max)) => {
            let scale = ValueScale::new(min, max)?;
            if !scale.contains(extent_min) || !scale.contains(extent_max) {
                warn!(
                    domain_min = min,
                    domain_max = max,
                    extent_min,
                    extent_max,
                    "fixed value domain does not cover the observed values"
                );
            }
            scale
        }
        None => ValueScale::from_extent(extent_min, extent_max, config.value_padding_ratio)?,
    };

    debug!(
        record_count = records.len(),
        group_count = groups.len(),
        coverage_warning_count = coverage_warnings.len(),
        "aggregated canonical dataset"
    );

    Ok(CanonicalDataset::from_parts(
        start_date,
        groups,
        aggregated,
        confidence_bounds,
        shared_value_scale,
        coverage_warnings,
    ))
}

#[derive(Debug)]
struct GroupAggregate {
    group: GroupId,
    series: GroupSeries,
    aggregated: Vec<ValuePoint>,
    bounds: Vec<BoundsPoint>,
    warnings: Vec<CoverageWarning>,
    extent: (f64, f64),
}

fn aggregate_group(
    group: &GroupId,
    rows: &[&RawRecord],
    start_date: NaiveDate,
    config: &AggregationConfig,
) -> ConditionResult<GroupAggregate> {
    let mut historical: Vec<ValuePoint> = rows
        .iter()
        .filter(|row| row.series == SeriesKind::Historical)
        .map(|row| ValuePoint::new(row.date, row.value))
        .collect();
    historical.sort_by_key(|point| point.date);
    let historical = points_before(&historical, start_date);
    ensure_unique_dates(&historical, || format!("historical series of group `{group}`"))?;
    if historical.is_empty() {
        return Err(ConditionError::DataIntegrity(format!(
            "group `{group}` has no historical points before {start_date}"
        )));
    }

    let mut by_scenario: BTreeMap<ScenarioId, Vec<ValuePoint>> = BTreeMap::new();
    for row in rows.iter().filter(|row| row.series == SeriesKind::Prediction) {
        let Some(scenario) = &row.scenario else {
            continue;
        };
        if !config.scenario_selection.includes(scenario) {
            continue;
        }
        by_scenario
            .entry(scenario.clone())
            .or_default()
            .push(ValuePoint::new(row.date, row.value));
    }

    let mut alternatives = Vec::with_capacity(by_scenario.len());
    for (scenario, mut points) in by_scenario {
        points.sort_by_key(|point| point.date);
        ensure_unique_dates(&points, || {
            format!("scenario `{scenario}` of group `{group}`")
        })?;
        alternatives.push(ScenarioSeries { scenario, points });
    }

    let horizon: BTreeSet<NaiveDate> = alternatives
        .iter()
        .flat_map(|series| series.points.iter().map(|point| point.date))
        .collect();

    if config.coverage_policy == CoveragePolicy::Strict {
        for series in &alternatives {
            if series.points.len() != horizon.len() {
                let missing = horizon.len() - series.points.len();
                return Err(ConditionError::DataIntegrity(format!(
                    "scenario `{}` of group `{group}` is missing {missing} of {} prediction dates",
                    series.scenario,
                    horizon.len()
                )));
            }
        }
    }

    let mut values_by_date: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for series in &alternatives {
        for point in &series.points {
            values_by_date.entry(point.date).or_default().push(point.value);
        }
    }

    let expected = alternatives.len();
    let mut aggregated = Vec::with_capacity(values_by_date.len());
    let mut bounds = Vec::with_capacity(values_by_date.len());
    let mut warnings = Vec::new();
    for (date, values) in &values_by_date {
        if values.len() < expected {
            warn!(
                group = %group,
                %date,
                contributing = values.len(),
                expected,
                "aggregating prediction date over an unequal scenario sample"
            );
            warnings.push(CoverageWarning {
                group: group.clone(),
                date: *date,
                contributing: values.len(),
                expected,
            });
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let (min, max) = value_extent(values.iter().copied()).unwrap_or((mean, mean));
        aggregated.push(ValuePoint::new(*date, mean));
        bounds.push(BoundsPoint::new(*date, min, max));
    }

    let all_values = historical
        .iter()
        .map(|point| point.value)
        .chain(values_by_date.values().flatten().copied());
    let extent = value_extent(all_values).ok_or_else(|| {
        ConditionError::DataIntegrity(format!("group `{group}` has no values"))
    })?;

    if alternatives.is_empty() {
        debug!(group = %group, "group has no prediction scenarios");
    }

    Ok(GroupAggregate {
        group: group.clone(),
        series: GroupSeries {
            historical,
            alternatives,
        },
        aggregated,
        bounds,
        warnings,
        extent,
    })
}

fn ensure_unique_dates(
    points: &[ValuePoint],
    describe: impl FnOnce() -> String,
) -> ConditionResult<()> {
    if let Some(pair) = points.windows(2).find(|pair| pair[0].date == pair[1].date) {
        return Err(ConditionError::DataIntegrity(format!(
            "{} has duplicate entries for {}",
            describe(),
            pair[0].date
        )));
    }
    Ok(())
}

fn value_extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let values: Vec<OrderedFloat<f64>> = values.map(OrderedFloat).collect();
    let min = values.iter().min()?;
    let max = values.iter().max()?;
    Some((min.0, max.0))
}

#[cfg(test)]
mod tests {
    use super::{AggregationConfig, CoveragePolicy, aggregate, aggregate_with_config};
    use crate::core::RawRecord;
    use crate::error::ConditionError;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).expect("valid date")
    }

    #[test]
    fn historical_points_on_or_after_cutoff_are_excluded() {
        let records = vec![
            RawRecord::historical(day(1), "A", 1.0),
            RawRecord::historical(day(2), "A", 2.0),
            RawRecord::historical(day(3), "A", 3.0),
            RawRecord::prediction(day(3), "A", "scenario_1", 4.0),
        ];
        let dataset = aggregate(&records, day(3)).expect("aggregate");
        let group = dataset.groups().values().next().expect("group");
        assert_eq!(group.historical.len(), 2);
    }

    #[test]
    fn duplicate_scenario_dates_are_rejected() {
        let records = vec![
            RawRecord::historical(day(1), "A", 1.0),
            RawRecord::prediction(day(2), "A", "scenario_1", 4.0),
            RawRecord::prediction(day(2), "A", "scenario_1", 5.0),
        ];
        let err = aggregate(&records, day(2)).expect_err("duplicate must fail");
        assert!(matches!(err, ConditionError::DataIntegrity(_)));
    }

    #[test]
    fn lenient_policy_still_rejects_missing_scenario_ids() {
        let mut record = RawRecord::prediction(day(2), "A", "scenario_1", 4.0);
        record.scenario = None;
        let records = vec![RawRecord::historical(day(1), "A", 1.0), record];
        let config =
            AggregationConfig::default().with_coverage_policy(CoveragePolicy::WarnAndAggregate);
        let err = aggregate_with_config(&records, day(2), &config).expect_err("must fail");
        assert!(matches!(err, ConditionError::DataIntegrity(_)));
    }
}
