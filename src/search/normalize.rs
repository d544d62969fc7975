//! Result normalization
//!
//! Maps raw provider records into the fixed [`SearchResult`] shape. Absent,
//! empty or non-string fields fall back to the documented placeholders, the
//! list is capped at [`MAX_RESULTS`], and provider order is kept.

use serde_json::Value;
use crate::config::MAX_RESULTS;
use crate::models::{SearchResult, DEFAULT_LINK, DEFAULT_SNIPPET, DEFAULT_TITLE};
use super::SearchError;

/// Key holding the organic result list in a Serper payload
pub const ORGANIC_KEY: &str = "organic";

/// Pulls the organic record list out of a provider payload.
///
/// A missing key yields an empty slice; anything other than an object
/// payload or an array under the key is malformed.
pub fn organic_records(payload: &Value) -> Result<&[Value], SearchError> {
    let object = payload.as_object().ok_or_else(|| {
        SearchError::MalformedResult(format!("expected a JSON object payload, got {}", kind(payload)))
    })?;

    match object.get(ORGANIC_KEY) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(records)) => Ok(records.as_slice()),
        Some(other) => Err(SearchError::MalformedResult(format!(
            "expected `{}` to be an array, got {}",
            ORGANIC_KEY,
            kind(other)
        ))),
    }
}

/// Normalizes at most `limit` records (never more than [`MAX_RESULTS`]).
///
/// Only the records that survive truncation are inspected; a non-object
/// record among them fails the whole batch.
pub fn normalize(records: &[Value], limit: usize) -> Result<Vec<SearchResult>, SearchError> {
    records
        .iter()
        .take(limit.min(MAX_RESULTS))
        .enumerate()
        .map(|(index, record)| normalize_record(index, record))
        .collect()
}

fn normalize_record(index: usize, record: &Value) -> Result<SearchResult, SearchError> {
    let object = record.as_object().ok_or_else(|| {
        SearchError::MalformedResult(format!(
            "result {} is {}, expected an object",
            index,
            kind(record)
        ))
    })?;

    let field = |key: &str, default: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(default)
            .to_string()
    };

    Ok(SearchResult {
        title: field("title", DEFAULT_TITLE),
        link: field("link", DEFAULT_LINK),
        snippet: field("snippet", DEFAULT_SNIPPET),
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
