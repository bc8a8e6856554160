use chrono::NaiveDate;

use crate::core::ValuePoint;

/// Returns points strictly before `cutoff`, preserving order.
#[must_use]
pub fn points_before(points: &[ValuePoint], cutoff: NaiveDate) -> Vec<ValuePoint> {
    points
        .iter()
        .copied()
        .filter(|point| point.date < cutoff)
        .collect()
}
