use chrono::{Duration, NaiveDate};

use crate::error::ApiError;

/// How far back the schedule can be browsed.
pub const MAX_DAYS_BACK: i64 = 14;
/// How far ahead the schedule can be browsed.
pub const MAX_DAYS_AHEAD: i64 = 28;

pub fn validate_class_type(value: i32) -> Result<i32, ApiError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(ApiError::BadRequest("class_type must be positive".into()))
    }
}

pub fn validate_date(date: NaiveDate, today: NaiveDate) -> Result<NaiveDate, ApiError> {
    if date < today - Duration::days(MAX_DAYS_BACK) {
        return Err(ApiError::BadRequest(format!(
            "date cannot be more than {MAX_DAYS_BACK} days in the past"
        )));
    }
    if date > today + Duration::days(MAX_DAYS_AHEAD) {
        return Err(ApiError::BadRequest(format!(
            "date cannot be more than {MAX_DAYS_AHEAD} days ahead"
        )));
    }
    Ok(date)
}
