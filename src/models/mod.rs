pub mod comments;
pub mod posts;
pub mod users;

use chrono::{DateTime, NaiveDate, Utc};

use crate::pagination::DateRangeFilter;

/// Trim `value` and check it holds between 1 and `max` characters.
pub fn validate_text(field: &str, value: &str, max: usize) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    if trimmed.chars().count() > max {
        return Err(format!("{field} must not exceed {max} characters"));
    }
    Ok(trimmed.to_string())
}

/// Start of `date` in UTC.
pub fn start_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}

/// Last millisecond of `date` in UTC.
pub fn end_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_milli_opt(23, 59, 59, 999).map(|dt| dt.and_utc())
}

/// `createdFrom` / `createdTo` query parameters as an inclusive range on `createdAt`.
pub fn created_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Option<DateRangeFilter> {
    let range = DateRangeFilter::new(
        "createdAt",
        from.and_then(start_of_day),
        to.and_then(end_of_day),
    );
    (!range.is_open()).then_some(range)
}
