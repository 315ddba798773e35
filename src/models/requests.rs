use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::error::ApiError;

pub const DEFAULT_METRICS: [&str; 4] = ["clicks", "impressions", "spent", "orders"];

/// Date window and metric names for a `.../stats` request.
///
/// Both dates are inclusive and serialize as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsQuery {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub metrics: Vec<String>,
}

impl StatsQuery {
    pub fn new<S: Into<String>>(
        date_from: NaiveDate,
        date_to: NaiveDate,
        metrics: impl IntoIterator<Item = S>,
    ) -> Result<Self, ApiError> {
        if date_from > date_to {
            return Err(ApiError::invalid_request(format!(
                "date_from ({date_from}) is after date_to ({date_to})"
            )));
        }

        let metrics: Vec<String> = metrics.into_iter().map(Into::into).collect();
        if metrics.is_empty() {
            return Err(ApiError::invalid_request(
                "At least one metric is required",
            ));
        }

        Ok(StatsQuery {
            date_from,
            date_to,
            metrics,
        })
    }

    /// Parses `YYYY-MM-DD` strings.
    pub fn from_strings<S: Into<String>>(
        date_from: &str,
        date_to: &str,
        metrics: impl IntoIterator<Item = S>,
    ) -> Result<Self, ApiError> {
        Self::new(parse_date(date_from)?, parse_date(date_to)?, metrics)
    }

    pub fn to_body(&self) -> Result<Value, ApiError> {
        serde_json::to_value(self)
            .map_err(|e| ApiError::invalid_request(format!("Invalid stats query: {e}")))
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| ApiError::invalid_request(format!("Invalid date '{raw}': {e}")))
}
