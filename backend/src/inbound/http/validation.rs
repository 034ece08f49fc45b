//! Shared request parsing helpers for inbound HTTP adapters.
//!
//! Path segments arrive as raw strings so a malformed identifier becomes a
//! structured `invalid_request` error rather than Actix's plain-text 404.

use std::str::FromStr;

use serde_json::json;

use crate::domain::{ChainageRange, Error};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    MissingField,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::MissingField => "missing_field",
        }
    }
}

/// Newtype wrapper for wire field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": ErrorCode::InvalidUuid.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("missing required field: {field}")).with_details(json!({
        "field": field,
        "code": ErrorCode::MissingField.as_str(),
    }))
}

/// Parse a typed identifier from a path segment.
pub(crate) fn parse_id<T: FromStr>(value: &str, field: FieldName) -> Result<T, Error> {
    value
        .parse()
        .map_err(|_| invalid_uuid_error(field, value))
}

/// Build a range from request bounds; the registry validates it.
pub(crate) fn requested_range(
    start: Option<f64>,
    end: Option<f64>,
) -> Result<ChainageRange, Error> {
    let start = start.ok_or_else(|| missing_field_error(FieldName::new("start")))?;
    let end = end.ok_or_else(|| missing_field_error(FieldName::new("end")))?;
    Ok(ChainageRange::unchecked(start, end))
}
