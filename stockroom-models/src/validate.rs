//! Field validation rules.
//!
//! Every rule takes a raw JSON value and either returns the typed value or a
//! [`ValidationError`] naming the field. Presence and type are always checked before
//! content, so the first violated condition is the one reported. Nothing is coerced:
//! `"5"` is not a number and `5` is not a string.

use bson::Uuid;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use thiserror::Error;
use url::Url;

/// Minimum length of every required string unless a rule says otherwise.
pub const MIN_LEN: usize = 3;

pub const SKU_MAX_LEN: usize = 30;

pub const IMAGE_EXTENSIONS: [&str; 6] = [".jpg", ".jpeg", ".png", ".gif", ".webp", ".svg"];

static SKU_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z0-9_-]+$").expect("sku pattern compiles"));

static BARCODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{13}$").expect("barcode pattern compiles"));

/// A field failed a validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { field: field.into(), reason: reason.into() }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Looks up a payload field, treating a missing field (or a non-object payload) as null.
pub fn field<'p>(payload: &'p Value, name: &str) -> &'p Value {
    payload.get(name).unwrap_or(&Value::Null)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

pub fn required_string(value: &Value, label: &str, min_len: usize) -> ValidationResult<String> {
    if is_falsy(value) {
        return Err(ValidationError::new(label, "is required"));
    }

    let Value::String(s) = value else {
        return Err(ValidationError::new(label, "must be a string"));
    };

    if s.chars().count() < min_len {
        return Err(ValidationError::new(
            label,
            format!("must be at least {min_len} characters long"),
        ));
    }

    Ok(s.clone())
}

/// Three characters is the whole policy; this is not a strength check.
pub fn password(value: &Value) -> ValidationResult<String> {
    required_string(value, "password", MIN_LEN)
}

/// Only presence and length are checked, never the address format.
pub fn email(value: &Value) -> ValidationResult<String> {
    required_string(value, "email", MIN_LEN)
}

pub fn token(value: &Value) -> ValidationResult<String> {
    required_string(value, "token", MIN_LEN).map_err(|err| {
        if err.reason.starts_with("must be at least") {
            ValidationError::new("token", "mismatch")
        } else {
            err
        }
    })
}

pub fn sku(value: &Value) -> ValidationResult<String> {
    let sku = required_string(value, "sku", MIN_LEN)?;

    if sku.chars().count() > SKU_MAX_LEN {
        return Err(ValidationError::new(
            "sku",
            format!("must be at most {SKU_MAX_LEN} characters long"),
        ));
    }

    if !SKU_PATTERN.is_match(&sku) {
        return Err(ValidationError::new(
            "sku",
            "may only contain letters, digits, underscores and hyphens",
        ));
    }

    Ok(sku)
}

/// Rejects missing, non-numeric and zero values.
///
/// Negative numbers pass. Stock and prices are never meant to be negative, but callers
/// rely on the rule exactly as it stands.
pub fn positive_number(value: &Value, label: &str) -> ValidationResult<f64> {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(n) if n == 0.0 => Err(ValidationError::new(label, "must be greater than 0")),
            Some(n) => Ok(n),
            None => Err(ValidationError::new(label, "must be a number")),
        },
        v if is_falsy(v) => Err(ValidationError::new(label, "is required")),
        _ => Err(ValidationError::new(label, "must be a number")),
    }
}

/// Accepts an RFC 3339 timestamp, a `YYYY-MM-DD` date, a `YYYY-MM-DDTHH:MM:SS` local
/// timestamp (read as UTC) or a number of milliseconds since the Unix epoch.
pub fn date_like(value: &Value, label: &str) -> ValidationResult<DateTime<Utc>> {
    let parsed = match value {
        Value::Null => return Err(ValidationError::new(label, "is required")),
        Value::String(s) => parse_date(s.trim()),
        Value::Number(n) => n
            .as_f64()
            .filter(|ms| ms.is_finite())
            .and_then(|ms| DateTime::from_timestamp_millis(ms as i64)),
        _ => return Err(ValidationError::new(label, "must be a date")),
    };

    parsed.ok_or_else(|| ValidationError::new(label, "must be a valid date"))
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

pub fn image_url(value: &Value, label: &str) -> ValidationResult<String> {
    let raw = required_string(value, label, MIN_LEN)?;
    let url = Url::parse(&raw).map_err(|_| ValidationError::new(label, "must be a valid URL"))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::new(label, "must use http or https"));
    }

    let path = url.path().to_ascii_lowercase();

    if !IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return Err(ValidationError::new(
            label,
            format!("must point to an image ({})", IMAGE_EXTENSIONS.join(", ")),
        ));
    }

    Ok(raw)
}

pub fn image_url_array(values: &Value, label: &str) -> ValidationResult<Vec<String>> {
    let Value::Array(items) = values else {
        return Err(ValidationError::new(label, "must be an array"));
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| image_url(item, &format!("{label}[{i}]")))
        .collect()
}

pub fn barcode(value: &Value) -> ValidationResult<String> {
    let barcode = required_string(value, "barcode", MIN_LEN)?;

    if !BARCODE_PATTERN.is_match(&barcode) {
        return Err(ValidationError::new("barcode", "must be exactly 13 digits"));
    }

    Ok(barcode)
}

/// Accepts only one of the listed spellings and returns the matching value.
pub fn one_of<T: Copy>(value: &Value, label: &str, options: &[(&str, T)]) -> ValidationResult<T> {
    let raw = required_string(value, label, 1)?;

    options
        .iter()
        .find(|(name, _)| *name == raw)
        .map(|(_, v)| *v)
        .ok_or_else(|| {
            let allowed: Vec<&str> = options.iter().map(|(name, _)| *name).collect();
            ValidationError::new(
                label,
                format!("value `{raw}` is not one of {}", allowed.join(", ")),
            )
        })
}

/// Validates a record identifier.
pub fn identifier(value: &Value) -> ValidationResult<Uuid> {
    let raw = required_string(value, "id", MIN_LEN)?;

    Uuid::parse_str(&raw).map_err(|_| ValidationError::new("id", "must be a valid identifier"))
}

/// Expected JSON type of a field in an embedded sub-record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    String,
    Number,
}

impl Shape {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Shape::String => value.is_string(),
            Shape::Number => value.is_number(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Shape::String => "a string",
            Shape::Number => "a number",
        }
    }
}

/// Checks an array of embedded sub-records field by field.
///
/// Only presence and JSON type are checked; extra fields are dropped.
pub fn record_array(
    values: &Value,
    label: &str,
    shape: &[(&str, Shape)],
) -> ValidationResult<Vec<Map<String, Value>>> {
    let Value::Array(items) = values else {
        return Err(ValidationError::new(label, "must be an array"));
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let Value::Object(object) = item else {
                return Err(ValidationError::new(format!("{label}[{i}]"), "must be an object"));
            };

            let mut record = Map::new();

            for (name, kind) in shape {
                match object.get(*name) {
                    Some(v) if kind.accepts(v) => {
                        record.insert((*name).to_string(), v.clone());
                    }
                    _ => {
                        return Err(ValidationError::new(
                            format!("{label}[{i}].{name}"),
                            format!("must be {}", kind.name()),
                        ));
                    }
                }
            }

            Ok(record)
        })
        .collect()
}

pub const VARIANT_SHAPE: [(&str, Shape); 4] = [
    ("name", Shape::String),
    ("sku", Shape::String),
    ("price", Shape::Number),
    ("stock", Shape::Number),
];

pub fn variant_array(values: &Value) -> ValidationResult<Vec<Map<String, Value>>> {
    record_array(values, "variants", &VARIANT_SHAPE)
}

/// The declared type of a value used in a field lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
}

impl FieldType {
    /// Parses a type tag; only `"string"` and `"number"` are supported.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "string" => Some(FieldType::String),
            "number" => Some(FieldType::Number),
            _ => None,
        }
    }

    /// Validates a lookup value and converts it to the stored representation.
    pub fn validate(self, value: &Value, label: &str) -> ValidationResult<bson::Bson> {
        Ok(match self {
            FieldType::String => bson::Bson::String(required_string(value, label, MIN_LEN)?),
            FieldType::Number => bson::Bson::Double(positive_number(value, label)?),
        })
    }
}
