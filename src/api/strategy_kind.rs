use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::GroupId;
use crate::error::{ConditionError, ConditionResult};

/// Closed set of rendering conditions, indexed by experimental assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    HistoricalOnly,
    Baseline,
    ConfidenceBand,
    Ensemble,
    EnsembleHover,
    BandHover,
    BandToEnsemble,
    Broken,
    Poor,
    Combined,
    SequentialReveal,
    Parameterized,
    Checklist,
    EscapingAggregate,
    ShuffledHover,
    CompactChecklist,
    MisroutedChecklist,
}

impl StrategyKind {
    pub const ALL: [Self; 17] = [
        Self::HistoricalOnly,
        Self::Baseline,
        Self::ConfidenceBand,
        Self::Ensemble,
        Self::EnsembleHover,
        Self::BandHover,
        Self::BandToEnsemble,
        Self::Broken,
        Self::Poor,
        Self::Combined,
        Self::SequentialReveal,
        Self::Parameterized,
        Self::Checklist,
        Self::EscapingAggregate,
        Self::ShuffledHover,
        Self::CompactChecklist,
        Self::MisroutedChecklist,
    ];

    /// Maps an assignment index; unknown indices never fall back to a default.
    pub fn from_index(index: usize) -> ConditionResult<Self> {
        Self::ALL.get(index).copied().ok_or_else(|| {
            ConditionError::InvalidConfiguration(format!(
                "unknown strategy index {index} (expected 0..={})",
                Self::ALL.len() - 1
            ))
        })
    }

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::HistoricalOnly => "historical-only",
            Self::Baseline => "baseline",
            Self::ConfidenceBand => "confidence-band",
            Self::Ensemble => "ensemble",
            Self::EnsembleHover => "ensemble-hover",
            Self::BandHover => "band-hover",
            Self::BandToEnsemble => "band-to-ensemble",
            Self::Broken => "broken",
            Self::Poor => "poor",
            Self::Combined => "combined",
            Self::SequentialReveal => "sequential-reveal",
            Self::Parameterized => "parameterized",
            Self::Checklist => "checklist",
            Self::EscapingAggregate => "escaping-aggregate",
            Self::ShuffledHover => "shuffled-hover",
            Self::CompactChecklist => "compact-checklist",
            Self::MisroutedChecklist => "misrouted-checklist",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::HistoricalOnly => "Historical Only",
            Self::Baseline => "Baseline",
            Self::ConfidenceBand => "PI Plot",
            Self::Ensemble => "Ensemble",
            Self::EnsembleHover => "Ensemble + Hover",
            Self::BandHover => "PI Plot + Hover",
            Self::BandToEnsemble => "PI Plot to Ensemble",
            Self::Broken => "Buggy Control",
            Self::Poor => "Bad Control",
            Self::Combined => "Combined",
            Self::SequentialReveal => "Next Line",
            Self::Parameterized => "Per-City Display",
            Self::Checklist => "Checkbox Selection",
            Self::EscapingAggregate => "Escaping Aggregation",
            Self::ShuffledHover => "Inconsistent Shape",
            Self::CompactChecklist => "Tiny Checkbox Strip",
            Self::MisroutedChecklist => "Buggy Checkbox",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::HistoricalOnly => "Only historical data, no predictions",
            Self::Baseline => "Historical data with the aggregated prediction",
            Self::ConfidenceBand => "Aggregated prediction with a min/max prediction interval",
            Self::Ensemble => "Aggregated prediction with every scenario line",
            Self::EnsembleHover => "Scenario lines appear while hovering the prediction",
            Self::BandHover => "Prediction interval appears while hovering the prediction",
            Self::BandToEnsemble => "Hovering turns the prediction interval into scenario lines",
            Self::Broken => "Hover targets are offset and reveal the other group's lines",
            Self::Poor => "Click-gated, delayed reveals with jittering lines and short tooltips",
            Self::Combined => "Prediction interval and scenario lines together",
            Self::SequentialReveal => "A button reveals one scenario line at a time",
            Self::Parameterized => "Region or line subsets chosen per group",
            Self::Checklist => "One checkbox per scenario line plus select-all",
            Self::EscapingAggregate => {
                "Hovering hides the aggregated line behind one random scenario"
            }
            Self::ShuffledHover => "Each hover shows a different random subset of scenario lines",
            Self::CompactChecklist => "The checkbox list squeezed into a tiny control strip",
            Self::MisroutedChecklist => "Ticking a checkbox toggles the next line instead",
        }
    }

    /// Whether the kind attaches an interaction machine.
    #[must_use]
    pub const fn is_interactive(self) -> bool {
        matches!(
            self,
            Self::EnsembleHover
                | Self::BandHover
                | Self::BandToEnsemble
                | Self::Broken
                | Self::Poor
                | Self::SequentialReveal
                | Self::Checklist
                | Self::EscapingAggregate
                | Self::ShuffledHover
                | Self::CompactChecklist
                | Self::MisroutedChecklist
        )
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// One row of the condition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConditionInfo {
    pub index: usize,
    pub kind: StrategyKind,
    pub slug: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub interactive: bool,
}

#[must_use]
pub fn condition_info() -> Vec<ConditionInfo> {
    StrategyKind::ALL
        .iter()
        .map(|&kind| ConditionInfo {
            index: kind.index(),
            kind,
            slug: kind.slug(),
            name: kind.name(),
            description: kind.description(),
            interactive: kind.is_interactive(),
        })
        .collect()
}

/// Display format of one group in the parameterized condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum GroupDisplay {
    /// Bounds area under the aggregated line.
    Region,
    /// `1` draws the aggregated line alone; `n` adds `n` sampled scenario
    /// lines, and counts at or above the scenario total draw every scenario.
    Lines { count: usize },
}

impl Default for GroupDisplay {
    fn default() -> Self {
        Self::Lines { count: 1 }
    }
}

/// Per-group display assignment supplied by the condition selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayOverride {
    groups: IndexMap<GroupId, GroupDisplay>,
}

impl DisplayOverride {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>, display: GroupDisplay) -> Self {
        self.groups.insert(GroupId::new(group), display);
        self
    }

    #[must_use]
    pub fn display_for(&self, group: &GroupId) -> GroupDisplay {
        self.groups.get(group).copied().unwrap_or_default()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&GroupId, &GroupDisplay)> {
        self.groups.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
