use chrono::NaiveDate;

use crate::error::{ConditionError, ConditionResult};

/// Parses a `MM/DD` cutoff (the study UI format) into a date of `year`.
pub fn parse_month_day(input: &str, year: i32) -> ConditionResult<NaiveDate> {
    let invalid = || {
        ConditionError::InvalidConfiguration(format!(
            "start date `{input}` must use the MM/DD format"
        ))
    };
    let (month, day) = input.trim().split_once('/').ok_or_else(invalid)?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let day: u32 = day.parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}
