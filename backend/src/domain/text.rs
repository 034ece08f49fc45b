//! Required free-text fields shared by the entity drafts.

use serde_json::json;

use super::Error;

/// A required text field was blank once trimmed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} must not be empty")]
pub struct BlankFieldError {
    /// Wire name of the offending field.
    pub field: &'static str,
}

impl From<BlankFieldError> for Error {
    fn from(value: BlankFieldError) -> Self {
        Self::invalid_request(value.to_string())
            .with_details(json!({ "field": value.field, "code": "empty_field" }))
    }
}

/// Trim `value`, rejecting it when nothing remains.
pub(crate) fn required(field: &'static str, value: &str) -> Result<String, BlankFieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BlankFieldError { field });
    }
    Ok(trimmed.to_owned())
}

/// Trim optional remarks, collapsing blank input to `None`.
pub(crate) fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}
