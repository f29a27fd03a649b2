//! Field-level validation collection.
//!
//! Domain drafts validate every field before failing so clients receive the
//! full list of problems in one response.

use std::collections::BTreeMap;

use serde_json::Value;

/// Ordered map of field name to validation message.
///
/// ## Invariants
/// - At most one message is kept per field; the first one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Record a failure for `field` unless one is already present.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Record the error from `result`, returning the success value if any.
    pub fn check<T, E: std::fmt::Display>(
        &mut self,
        field: &str,
        result: Result<T, E>,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.add(field, err.to_string());
                None
            }
        }
    }

    /// True when no failures were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Message recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Fail with `self` when any error was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Render as a JSON object `{field: message}`.
    pub fn into_json(self) -> Value {
        Value::Object(
            self.0
                .into_iter()
                .map(|(field, message)| (field, Value::String(message)))
                .collect(),
        )
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// Trim `value` and reject blanks or strings over `max` characters.
pub(crate) fn required_text(value: &str, label: &str, max: usize) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{label} is required"));
    }
    if trimmed.chars().count() > max {
        return Err(format!("{label} must be at most {max} characters"));
    }
    Ok(trimmed.to_owned())
}

/// Like [`required_text`] but blank input becomes `None`.
pub(crate) fn optional_text(
    value: Option<&str>,
    label: &str,
    max: usize,
) -> Result<Option<String>, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => required_text(text, label, max).map(Some),
    }
}
