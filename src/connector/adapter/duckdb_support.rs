//! Column conversions shared by the DuckDB adapters.

use chrono::{DateTime, Utc};
use duckdb::types::Type;

use crate::domain::DomainError;

/// Timestamps are stored as microseconds since the epoch.
pub(crate) fn to_micros(at: DateTime<Utc>) -> i64 {
    at.timestamp_micros()
}

pub(crate) fn from_micros(micros: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(micros).unwrap_or_default()
}

pub(crate) fn encode_features(features: &[String]) -> Result<String, DomainError> {
    serde_json::to_string(features)
        .map_err(|e| DomainError::storage(format!("Failed to encode features: {}", e)))
}

/// Decodes the JSON features column; malformed JSON fails the row.
pub(crate) fn decode_features(column: usize, json: &str) -> duckdb::Result<Vec<String>> {
    serde_json::from_str(json).map_err(|e| duckdb::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

/// Parses an enum stored as text; an unknown value fails the row.
pub(crate) fn parse_text<T>(column: usize, raw: &str, parse: impl Fn(&str) -> Option<T>) -> duckdb::Result<T> {
    parse(raw).ok_or_else(|| {
        duckdb::Error::FromSqlConversionFailure(
            column,
            Type::Text,
            format!("unexpected value '{}' in column {}", raw, column).into(),
        )
    })
}
