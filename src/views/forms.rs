use crate::services::{ApiError, FieldErrors};

/// One line per field: `Field: first message, second message`
///
/// Only the first letter of the field key is capitalised, the rest is kept as sent.
pub fn format_field_errors(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("{}: {}", capitalize(field), messages.join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Message shown under a login or sign-up form
pub fn form_error_message(err: &ApiError) -> String {
    match err {
        ApiError::ValidationFailed(fields) if !fields.is_empty() => format_field_errors(fields),
        ApiError::Unauthorized => "Invalid username or password".to_string(),
        ApiError::Network(_) => "Could not reach the server".to_string(),
        _ => "An unexpected error occurred".to_string(),
    }
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
