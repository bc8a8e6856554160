use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{BoundsPoint, GroupId, ScenarioId, ValuePoint, ValueScale};

/// One ensemble member's trajectory over the prediction horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSeries {
    pub scenario: ScenarioId,
    pub points: Vec<ValuePoint>,
}

/// Historical series plus every scenario trajectory of one group.
///
/// `alternatives` is ordered by scenario id (natural order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSeries {
    pub historical: Vec<ValuePoint>,
    pub alternatives: Vec<ScenarioSeries>,
}

impl GroupSeries {
    #[must_use]
    pub fn last_historical(&self) -> Option<ValuePoint> {
        self.historical.last().copied()
    }

    #[must_use]
    pub fn scenario(&self, scenario: &ScenarioId) -> Option<&ScenarioSeries> {
        self.alternatives
            .iter()
            .find(|series| &series.scenario == scenario)
    }
}

/// A prediction date aggregated over fewer scenarios than the group has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageWarning {
    pub group: GroupId,
    pub date: NaiveDate,
    pub contributing: usize,
    pub expected: usize,
}

/// Addresses one derived series of a canonical dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesRef {
    Historical(GroupId),
    Aggregated(GroupId),
    Bounds(GroupId),
    Scenario(GroupId, ScenarioId),
}

impl SeriesRef {
    #[must_use]
    pub fn group(&self) -> &GroupId {
        match self {
            Self::Historical(group)
            | Self::Aggregated(group)
            | Self::Bounds(group)
            | Self::Scenario(group, _) => group,
        }
    }
}

/// Point list materialized for a `SeriesRef`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResolvedSeries {
    Line(Vec<ValuePoint>),
    Band(Vec<BoundsPoint>),
}

impl ResolvedSeries {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Line(points) => points.len(),
            Self::Band(points) => points.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shape every rendering strategy consumes.
///
/// Built once per render cycle by the aggregator and never mutated afterwards;
/// strategies share it read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalDataset {
    start_date: NaiveDate,
    groups: IndexMap<GroupId, GroupSeries>,
    aggregated: IndexMap<GroupId, Vec<ValuePoint>>,
    confidence_bounds: IndexMap<GroupId, Vec<BoundsPoint>>,
    shared_value_scale: ValueScale,
    coverage_warnings: Vec<CoverageWarning>,
}

impl CanonicalDataset {
    pub(crate) fn from_parts(
        start_date: NaiveDate,
        groups: IndexMap<GroupId, GroupSeries>,
        aggregated: IndexMap<GroupId, Vec<ValuePoint>>,
        confidence_bounds: IndexMap<GroupId, Vec<BoundsPoint>>,
        shared_value_scale: ValueScale,
        coverage_warnings: Vec<CoverageWarning>,
    ) -> Self {
        Self {
            start_date,
            groups,
            aggregated,
            confidence_bounds,
            shared_value_scale,
            coverage_warnings,
        }
    }

    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Groups in ascending id order.
    #[must_use]
    pub fn groups(&self) -> &IndexMap<GroupId, GroupSeries> {
        &self.groups
    }

    pub fn group_ids(&self) -> impl Iterator<Item = &GroupId> {
        self.groups.keys()
    }

    #[must_use]
    pub fn group(&self, group: &GroupId) -> Option<&GroupSeries> {
        self.groups.get(group)
    }

    #[must_use]
    pub fn group_index(&self, group: &GroupId) -> Option<usize> {
        self.groups.get_index_of(group)
    }

    #[must_use]
    pub fn aggregated(&self, group: &GroupId) -> Option<&[ValuePoint]> {
        self.aggregated.get(group).map(Vec::as_slice)
    }

    #[must_use]
    pub fn confidence_bounds(&self, group: &GroupId) -> Option<&[BoundsPoint]> {
        self.confidence_bounds.get(group).map(Vec::as_slice)
    }

    #[must_use]
    pub fn shared_value_scale(&self) -> ValueScale {
        self.shared_value_scale
    }

    /// Dates aggregated over an unequal scenario sample (lenient policy only).
    #[must_use]
    pub fn coverage_warnings(&self) -> &[CoverageWarning] {
        &self.coverage_warnings
    }

    #[must_use]
    pub fn scenario_count(&self, group: &GroupId) -> usize {
        self.groups
            .get(group)
            .map_or(0, |series| series.alternatives.len())
    }

    /// Every individually addressable alternative line in stable order:
    /// groups ascending, then scenario id ascending within a group.
    pub fn alternative_lines(&self) -> impl Iterator<Item = (&GroupId, &ScenarioSeries)> {
        self.groups.iter().flat_map(|(group, series)| {
            series
                .alternatives
                .iter()
                .map(move |scenario| (group, scenario))
        })
    }

    /// Materializes a series, optionally anchored to the group's last
    /// historical point so forecasts start where history ends.
    #[must_use]
    pub fn resolve(&self, series: &SeriesRef, anchored: bool) -> Option<ResolvedSeries> {
        let group = self.groups.get(series.group())?;
        let anchor = if anchored {
            group.last_historical()
        } else {
            None
        };

        let with_anchor = |points: &[ValuePoint]| {
            let mut out = Vec::with_capacity(points.len() + 1);
            out.extend(anchor);
            out.extend_from_slice(points);
            out
        };

        match series {
            SeriesRef::Historical(_) => Some(ResolvedSeries::Line(group.historical.clone())),
            SeriesRef::Aggregated(group_id) => self
                .aggregated
                .get(group_id)
                .map(|points| ResolvedSeries::Line(with_anchor(points))),
            SeriesRef::Scenario(_, scenario) => group
                .scenario(scenario)
                .map(|scenario| ResolvedSeries::Line(with_anchor(&scenario.points))),
            SeriesRef::Bounds(group_id) => self.confidence_bounds.get(group_id).map(|bounds| {
                let mut out = Vec::with_capacity(bounds.len() + 1);
                out.extend(
                    anchor.map(|point| BoundsPoint::new(point.date, point.value, point.value)),
                );
                out.extend_from_slice(bounds);
                ResolvedSeries::Band(out)
            }),
        }
    }
}
