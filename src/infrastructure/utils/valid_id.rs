use crate::errors::AppError;

/// Parses a record id taken from the URL path. Ids that cannot exist are
/// reported as missing records rather than bad input.
pub fn valid_id(id: &str, resource: &str) -> Result<i64, AppError> {
    id.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::NotFound(format!("{resource} not found")))
}
