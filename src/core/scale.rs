use serde::{Deserialize, Serialize};

use crate::error::{ConditionError, ConditionResult};

/// Symmetric padding applied around the observed value extent.
pub const DEFAULT_VALUE_PADDING_RATIO: f64 = 0.05;

const MIN_SPAN_ABSOLUTE: f64 = 0.000_001;

/// Single value-axis range shared by every group of a dataset.
///
/// Strategies read it but never rescale it per group, so all groups stay
/// visually comparable on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueScale {
    domain_start: f64,
    domain_end: f64,
}

impl ValueScale {
    pub fn new(domain_start: f64, domain_end: f64) -> ConditionResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() || domain_start >= domain_end {
            return Err(ConditionError::InvalidConfiguration(format!(
                "value domain must be finite and increasing, got [{domain_start}, {domain_end}]"
            )));
        }

        Ok(Self {
            domain_start,
            domain_end,
        })
    }

    /// Builds the padded domain for an observed `[min, max]` extent.
    ///
    /// A degenerate extent (`min == max`) is widened to a minimal span before
    /// padding so the scale never collapses.
    pub fn from_extent(min: f64, max: f64, padding_ratio: f64) -> ConditionResult<Self> {
        if !padding_ratio.is_finite() || !(0.0..0.5).contains(&padding_ratio) {
            return Err(ConditionError::InvalidConfiguration(
                "value padding ratio must be finite and in [0, 0.5)".to_owned(),
            ));
        }
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(ConditionError::DataIntegrity(format!(
                "value extent must be finite and ordered, got [{min}, {max}]"
            )));
        }

        let (base_min, base_max) = normalize_range(min, max);
        let span = base_max - base_min;
        let padding = span * padding_ratio;
        Self::new(base_min - padding, base_max + padding)
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.domain_end - self.domain_start
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        value >= self.domain_start && value <= self.domain_end
    }
}

fn normalize_range(min: f64, max: f64) -> (f64, f64) {
    if max - min >= MIN_SPAN_ABSOLUTE {
        return (min, max);
    }
    let center = 0.5 * (min + max);
    let half = 0.5 * MIN_SPAN_ABSOLUTE.max(center.abs() * MIN_SPAN_ABSOLUTE);
    (center - half, center + half)
}
