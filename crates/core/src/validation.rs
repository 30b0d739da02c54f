//! Rendering of `validator` errors into flat message lists.
//!
//! Request DTOs derive [`Validate`]; handlers call [`validate_input`] and the
//! resulting [`CoreError::InvalidFields`] carries one message per failed
//! rule, ready for the UI to list.

use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::error::CoreError;

/// Run the derived validation rules and convert failures into a [`CoreError`].
pub fn validate_input<T: Validate>(input: &T) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|errors| CoreError::InvalidFields(collect_messages(&errors)))
}

/// Flatten nested validation errors into sorted `path: message` strings.
pub fn collect_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages = Vec::new();
    push_messages(errors, "", &mut messages);
    messages.sort();
    messages
}

fn push_messages(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for err in field_errors {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    out.push(format!("{path}: {message}"));
                }
            }
            ValidationErrorsKind::Struct(inner) => push_messages(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    push_messages(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}
