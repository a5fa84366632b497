pub mod job;
pub mod research;
pub mod skill;

use crate::errors::ValidationError;

/// Trims a required form field, rejecting blank input.
pub(crate) fn require_text(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(value.to_string())
}
