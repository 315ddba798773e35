use chrono::{DateTime, FixedOffset};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::services::error::ApiError;

/// Parses an ISO-8601 timestamp as returned by the API.
///
/// Accepts RFC 3339 (`2024-03-01T10:00:00Z`, `...+03:00`) and naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]` values, which are taken as UTC. Returns `None`
/// for empty or unrecognised input.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed);
    }

    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Converts projected records (e.g. the output of `get_campaigns`) into typed
/// models.
pub fn parse_list<T: DeserializeOwned>(values: Vec<Value>) -> Result<Vec<T>, ApiError> {
    values
        .into_iter()
        .map(|value| {
            T::deserialize(&value).map_err(|e| ApiError::Parse {
                message: format!("Unexpected record shape: {e}"),
                status: None,
                body: value.to_string(),
            })
        })
        .collect()
}
