//! Field validation: a structured list of field/message pairs.
//!
//! Every input shape gets an explicit `validate()` that collects *all*
//! violations before reporting, so callers can show them at once.

use serde::{Deserialize, Serialize};

/// A single violated field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Accumulated field violations for one input.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    pub fn require_non_blank(&mut self, field: &str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.push(field, message);
        }
    }

    pub fn max_len(&mut self, field: &str, value: Option<&str>, max: usize, message: &str) {
        if value.is_some_and(|v| v.chars().count() > max) {
            self.push(field, message);
        }
    }
}

impl core::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for e in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
            first = false;
        }
        Ok(())
    }
}

/// Loose email shape check: one `@`, non-empty local part, dotted domain.
pub fn is_plausible_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|part| !part.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_violation() {
        let mut errors = FieldErrors::new();
        errors.require_non_blank("name", "  ", "Name is required");
        errors.max_len("phone", Some("0123456789012345678901"), 20, "Phone too long");
        errors.max_len("city", None, 100, "City too long");

        assert_eq!(errors.len(), 2);
        assert!(errors.contains("name"));
        assert!(errors.contains("phone"));
        assert_eq!(errors.to_string(), "name: Name is required; phone: Phone too long");
    }

    #[test]
    fn email_shape() {
        assert!(is_plausible_email("sales@acme.com"));
        assert!(!is_plausible_email("acme.com"));
        assert!(!is_plausible_email("a@b"));
        assert!(!is_plausible_email("a b@acme.com"));
        assert!(!is_plausible_email("@acme.com"));
    }
}
