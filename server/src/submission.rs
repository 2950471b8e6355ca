use chrono::Utc;
use common::{ScoreEntry, ScoreSubmission};
use serde_json::{Map, Value};
use thiserror::Error;

/// Why a submission body was turned away. Every variant maps to a 400.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("Invalid JSON")]
    InvalidJson,
    #[error("Missing required fields")]
    MissingFields,
    #[error("Field '{0}' is not a number")]
    NotANumber(&'static str),
    #[error("Field '{0}' must not be negative")]
    Negative(&'static str),
}

/// Parses a raw request body into a submission.
///
/// `name` must be present and truthy; it is coerced to a string. `score` and
/// `level` must be present and are coerced to integers the lenient way: a
/// number is truncated, a string contributes its leading sign and digits.
pub fn parse_submission(body: &[u8]) -> Result<ScoreSubmission, SubmissionError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| SubmissionError::InvalidJson)?;
    let empty = Map::new();
    let fields = value.as_object().unwrap_or(&empty);

    let name = fields.get("name").and_then(coerce_name);
    let (Some(name), Some(score), Some(level)) = (name, fields.get("score"), fields.get("level"))
    else {
        return Err(SubmissionError::MissingFields);
    };

    Ok(ScoreSubmission {
        name,
        score: coerce_count("score", score)?,
        level: coerce_count("level", level)?,
    })
}

/// The entry a service stores for an accepted submission, stamped now.
pub fn into_entry(submission: &ScoreSubmission) -> ScoreEntry {
    ScoreEntry::with_timestamp(&submission.name, submission.score, submission.level, Utc::now())
}

fn coerce_name(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn coerce_count(field: &'static str, value: &Value) -> Result<u32, SubmissionError> {
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(text) => leading_integer(text),
        _ => None,
    };
    let parsed = parsed.ok_or(SubmissionError::NotANumber(field))?;

    if parsed < 0 {
        return Err(SubmissionError::Negative(field));
    }
    u32::try_from(parsed).map_err(|_| SubmissionError::NotANumber(field))
}

/// Optional leading whitespace and sign, then at least one digit. Anything
/// after the digits is ignored.
fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, rest) = match text.chars().next() {
        Some('-') => (true, &text[1..]),
        Some('+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }

    let magnitude: i64 = rest[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
