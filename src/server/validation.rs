use chrono::{DateTime, Utc};

use crate::server::response::ApiError;

const MAX_NAME_LEN: usize = 255;
const MAX_NOTES_LEN: usize = 1000;
const WEIGHT_PRECISION: usize = 10;
const WEIGHT_SCALE: usize = 2;

fn validate_name(name: &str, entity: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::bad_request(format!("{entity} name is required")));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::bad_request(format!(
            "{entity} name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_workout_name(name: &str) -> Result<(), ApiError> {
    validate_name(name, "Workout")
}

pub fn validate_exercise_name(name: &str) -> Result<(), ApiError> {
    validate_name(name, "Exercise")
}

pub fn validate_notes(notes: Option<&str>) -> Result<(), ApiError> {
    if let Some(notes) = notes {
        if notes.chars().count() > MAX_NOTES_LEN {
            return Err(ApiError::bad_request(format!(
                "Notes cannot exceed {MAX_NOTES_LEN} characters"
            )));
        }
    }
    Ok(())
}

pub fn validate_id(id: i64, entity: &str) -> Result<(), ApiError> {
    if id <= 0 {
        return Err(ApiError::bad_request(format!(
            "{entity} id must be a positive integer"
        )));
    }
    Ok(())
}

pub fn validate_reps(reps: Option<i64>) -> Result<(), ApiError> {
    if let Some(reps) = reps {
        if reps < 0 {
            return Err(ApiError::bad_request("Reps cannot be negative"));
        }
    }
    Ok(())
}

/// Weight is an exact decimal carried as a string: digits with at most one
/// decimal point, no sign, at most 10 digits total and 2 after the point.
pub fn validate_weight(weight: Option<&str>) -> Result<(), ApiError> {
    let Some(weight) = weight else {
        return Ok(());
    };

    let (int_part, frac_part) = match weight.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (weight, None),
    };

    let digits_only =
        |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    if !digits_only(int_part) || !frac_part.is_none_or(digits_only) {
        return Err(ApiError::bad_request("Weight must be a decimal number"));
    }

    let frac_len = frac_part.map_or(0, str::len);
    if frac_len > WEIGHT_SCALE {
        return Err(ApiError::bad_request(format!(
            "Weight cannot have more than {WEIGHT_SCALE} decimal places"
        )));
    }
    if int_part.len() + frac_len > WEIGHT_PRECISION {
        return Err(ApiError::bad_request(format!(
            "Weight cannot exceed {WEIGHT_PRECISION} digits"
        )));
    }

    Ok(())
}

pub fn parse_timestamp(value: &str, field: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            ApiError::bad_request(format!("{field} must be a valid RFC 3339 timestamp"))
        })
}
