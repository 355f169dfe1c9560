//! Common validation utilities.

use chrono::NaiveDate;
use validator::ValidationError;

/// Format of calendar dates exchanged with clients ("YYYY-MM-DD").
pub const CALENDAR_DATE_FORMAT: &str = "%Y-%m-%d";

/// Returns the trimmed value if it contains anything besides whitespace.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parses a "YYYY-MM-DD" calendar date.
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    // chrono accepts single-digit months and days, clients never send those
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, CALENDAR_DATE_FORMAT).ok()
}

/// Validates that a string is a calendar date without a time component.
pub fn validate_calendar_date(value: &str) -> Result<(), ValidationError> {
    if parse_calendar_date(value).is_some() {
        Ok(())
    } else {
        let mut err = ValidationError::new("calendar_date");
        err.message = Some("Date must use the YYYY-MM-DD format".into());
        Err(err)
    }
}

/// Validates that a timestamp in milliseconds since epoch is positive.
pub fn validate_epoch_millis(timestamp_millis: i64) -> Result<(), ValidationError> {
    if timestamp_millis > 0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("timestamp_invalid");
        err.message = Some("Timestamp must be a positive number of milliseconds".into());
        Err(err)
    }
}
