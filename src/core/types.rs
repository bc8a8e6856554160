use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ConditionError, ConditionResult};

/// Identifier of one compared entity (for example city A/B).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of one ensemble member.
///
/// Ordering is natural: a trailing numeric suffix compares numerically, so
/// `scenario_2` sorts before `scenario_10`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioId(String);

impl ScenarioId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trailing number of the id, if any (`scenario_7` -> 7).
    #[must_use]
    pub fn ordinal(&self) -> Option<u64> {
        self.split_digit_suffix().1.and_then(|digits| digits.parse().ok())
    }

    /// Human label used by reveal status lines and tooltips.
    #[must_use]
    pub fn label(&self) -> String {
        match self.ordinal() {
            Some(number) => format!("Scenario {number}"),
            None => self.0.clone(),
        }
    }

    fn split_digit_suffix(&self) -> (&str, Option<&str>) {
        let digits = self
            .0
            .bytes()
            .rev()
            .take_while(u8::is_ascii_digit)
            .count();
        if digits == 0 {
            return (&self.0, None);
        }
        let (stem, suffix) = self.0.split_at(self.0.len() - digits);
        (stem, Some(suffix))
    }

    /// Sort key: stem, then the digit suffix by magnitude (length without
    /// leading zeros, then digits), then the raw id. Any suffix length works.
    fn natural_key(&self) -> (&str, Option<(usize, &str)>, &str) {
        let (stem, suffix) = self.split_digit_suffix();
        let magnitude = suffix.map(|digits| {
            let significant = digits.trim_start_matches('0');
            (significant.len(), significant)
        });
        (stem, magnitude, &self.0)
    }
}

impl Ord for ScenarioId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.natural_key().cmp(&other.natural_key())
    }
}

impl PartialOrd for ScenarioId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Historical,
    Prediction,
}

/// One flat input row as produced by the data-generation scripts.
///
/// Field aliases accept the `stock`/`city` and `price` column names used by
/// older study datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub date: NaiveDate,
    #[serde(alias = "stock", alias = "city")]
    pub group: GroupId,
    #[serde(alias = "price")]
    pub value: f64,
    pub series: SeriesKind,
    #[serde(default)]
    pub scenario: Option<ScenarioId>,
}

impl RawRecord {
    #[must_use]
    pub fn historical(date: NaiveDate, group: impl Into<String>, value: f64) -> Self {
        Self {
            date,
            group: GroupId::new(group),
            value,
            series: SeriesKind::Historical,
            scenario: None,
        }
    }

    #[must_use]
    pub fn prediction(
        date: NaiveDate,
        group: impl Into<String>,
        scenario: impl Into<String>,
        value: f64,
    ) -> Self {
        Self {
            date,
            group: GroupId::new(group),
            value,
            series: SeriesKind::Prediction,
            scenario: Some(ScenarioId::new(scenario)),
        }
    }

    /// Checks the per-record invariants: finite value and scenario presence
    /// matching the series kind.
    pub fn validate(&self) -> ConditionResult<()> {
        if !self.value.is_finite() {
            return Err(ConditionError::DataIntegrity(format!(
                "record for group `{}` on {} has a non-finite value",
                self.group, self.date
            )));
        }
        match (self.series, &self.scenario) {
            (SeriesKind::Prediction, None) => Err(ConditionError::DataIntegrity(format!(
                "prediction record for group `{}` on {} lacks a scenario id",
                self.group, self.date
            ))),
            (SeriesKind::Historical, Some(scenario)) => {
                Err(ConditionError::DataIntegrity(format!(
                    "historical record for group `{}` on {} carries scenario `{scenario}`",
                    self.group, self.date
                )))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuePoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl ValuePoint {
    #[must_use]
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Per-date envelope across scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsPoint {
    pub date: NaiveDate,
    pub min: f64,
    pub max: f64,
}

impl BoundsPoint {
    #[must_use]
    pub fn new(date: NaiveDate, min: f64, max: f64) -> Self {
        Self { date, min, max }
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[cfg(test)]
mod tests {
    use super::{RawRecord, ScenarioId};
    use crate::error::ConditionError;
    use chrono::NaiveDate;

    #[test]
    fn scenario_ids_sort_naturally() {
        let mut ids = vec![
            ScenarioId::new("scenario_10"),
            ScenarioId::new("scenario_2"),
            ScenarioId::new("scenario_1"),
        ];
        ids.sort();
        let raw: Vec<&str> = ids.iter().map(ScenarioId::as_str).collect();
        assert_eq!(raw, vec!["scenario_1", "scenario_2", "scenario_10"]);
    }

    #[test]
    fn suffixes_beyond_u64_still_order_by_magnitude() {
        let small = ScenarioId::new("s2");
        let mid = ScenarioId::new("s100");
        let huge = ScenarioId::new("s18446744073709551616");
        assert!(small < mid);
        assert!(mid < huge);
        assert!(small < huge);
        assert_eq!(huge.ordinal(), None);
        assert!(ScenarioId::new("s007") > ScenarioId::new("s7"));
        assert!(ScenarioId::new("s007") < ScenarioId::new("s8"));
        assert!(ScenarioId::new("s") < ScenarioId::new("s0"));
    }

    #[test]
    fn historical_record_with_scenario_is_rejected() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 1).expect("valid date");
        let mut record = RawRecord::historical(date, "A", 1.0);
        record.scenario = Some(ScenarioId::new("scenario_1"));
        let err = record.validate().expect_err("must fail");
        assert!(matches!(err, ConditionError::DataIntegrity(_)));
    }
}
