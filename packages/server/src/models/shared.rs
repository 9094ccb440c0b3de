use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AppError;

/// Plain `{"message": ...}` acknowledgement body.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Assignment deleted successfully!")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Collects field-level validation messages, in field-name order.
#[derive(Debug, Default)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(())` when nothing was recorded, otherwise a 422 carrying every message.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            return Ok(());
        }
        let summary = self
            .0
            .iter()
            .flat_map(|(field, msgs)| msgs.iter().map(move |m| format!("{field} {m}")))
            .collect::<Vec<_>>()
            .join(", ");
        Err(AppError::Validation {
            message: summary,
            errors: Some(self.0),
        })
    }
}

/// A 422 for a single field.
pub fn field_error(field: &str, message: impl Into<String>) -> AppError {
    let mut errors = BTreeMap::new();
    let message = message.into();
    errors.insert(field.to_string(), vec![message.clone()]);
    AppError::Validation {
        message: format!("{field} {message}"),
        errors: Some(errors),
    }
}

/// Require a present, non-blank string of at most `max` characters.
pub fn check_required_text(errors: &mut FieldErrors, field: &str, value: Option<&str>, max: usize) {
    match value.map(str::trim) {
        None | Some("") => errors.add(field, "can't be blank"),
        Some(v) if v.chars().count() > max => {
            errors.add(field, format!("is too long (maximum is {max} characters)"))
        }
        Some(_) => {}
    }
}

/// Reject a present value below `min`.
pub fn check_min(errors: &mut FieldErrors, field: &str, value: Option<i32>, min: i32) {
    if let Some(v) = value
        && v < min
    {
        errors.add(field, format!("must be greater than or equal to {min}"));
    }
}
