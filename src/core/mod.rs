pub mod aggregator;
pub mod dataset;
pub mod primitives;
pub mod scale;
pub mod types;
pub mod windowing;

pub use aggregator::{
    AggregationConfig, CoveragePolicy, ScenarioSelection, aggregate, aggregate_from_cutoff,
    aggregate_with_config,
};
pub use dataset::{
    CanonicalDataset, CoverageWarning, GroupSeries, ResolvedSeries, ScenarioSeries, SeriesRef,
};
pub use primitives::parse_month_day;
pub use scale::{DEFAULT_VALUE_PADDING_RATIO, ValueScale};
pub use types::{BoundsPoint, GroupId, RawRecord, ScenarioId, SeriesKind, ValuePoint};
