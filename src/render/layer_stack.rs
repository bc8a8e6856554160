use serde::{Deserialize, Serialize};

/// Draw layers of one condition, bottom to top.
///
/// Uncertainty encodings sit under the summary forecast: bounds under
/// scenario lines under the aggregated line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlanLayer {
    Historical,
    Bounds,
    Scenarios,
    Aggregated,
    HitZones,
    Controls,
}

impl PlanLayer {
    #[must_use]
    pub const fn canonical_order() -> [Self; 6] {
        [
            Self::Historical,
            Self::Bounds,
            Self::Scenarios,
            Self::Aggregated,
            Self::HitZones,
            Self::Controls,
        ]
    }
}
