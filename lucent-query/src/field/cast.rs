//! Raw value casting per field kind.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::FieldKind;
use crate::error::{SearchError, SearchResult};
use crate::value::FilterValue;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

impl FieldKind {
    /// Cast a raw value into the kind's native type.
    ///
    /// Textual kinds pass the value through unchanged.
    pub fn cast(&self, field: &str, raw: &str) -> SearchResult<FilterValue> {
        match self {
            Self::Generic | Self::Char | Self::FullText => Ok(FilterValue::from(raw)),
            Self::Integer => raw
                .trim()
                .parse::<i64>()
                .map(FilterValue::Int)
                .map_err(|_| SearchError::cast_value(field, raw, "integer")),
            Self::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(FilterValue::Float)
                .ok_or_else(|| SearchError::cast_value(field, raw, "float")),
            Self::Boolean => match raw.trim().to_lowercase().as_str() {
                "true" => Ok(FilterValue::Bool(true)),
                "false" => Ok(FilterValue::Bool(false)),
                _ => Err(SearchError::cast_value(field, raw, "boolean")),
            },
            Self::NullBoolean => match raw.trim().to_lowercase().as_str() {
                "true" => Ok(FilterValue::Bool(true)),
                "false" => Ok(FilterValue::Bool(false)),
                "null" => Ok(FilterValue::Null),
                _ => Err(SearchError::cast_value(field, raw, "nullable boolean")),
            },
            Self::Timestamp => parse_timestamp(raw.trim())
                .map(FilterValue::Timestamp)
                .ok_or_else(|| SearchError::cast_value(field, raw, "timestamp")),
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
