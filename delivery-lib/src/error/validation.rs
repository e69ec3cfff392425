//! Validation error types

/// Error information for a specific field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValidationError {
    /// The field that failed validation.
    pub field: String,
    /// Human-readable validation error message.
    pub message: String,
}

impl FieldValidationError {
    /// Creates a new field validation error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A payload failed one or more field checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Validation failed: {}", .errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", "))]
pub struct ValidationError {
    errors: Vec<FieldValidationError>,
}

impl ValidationError {
    /// Returns the individual field errors.
    pub fn errors(&self) -> &[FieldValidationError] {
        &self.errors
    }

    /// Returns `true` if the given field has an error.
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

/// Collects field errors; converts into `Err(ValidationError)` when non-empty.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldValidationError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails `field` when `value` is empty or whitespace.
    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors
                .push(FieldValidationError::new(field, "is required"));
        }
        self
    }

    /// Fails `field` when `value` is `None`.
    pub fn present<T>(&mut self, field: &str, value: Option<T>) -> &mut Self {
        if value.is_none() {
            self.errors
                .push(FieldValidationError::new(field, "is required"));
        }
        self
    }

    /// Fails `field` when `value` is below `min`.
    pub fn min(&mut self, field: &str, value: i64, min: i64) -> &mut Self {
        if value < min {
            self.errors.push(FieldValidationError::new(
                field,
                format!("must be at least {}", min),
            ));
        }
        self
    }

    /// Fails `field` when `value` is negative.
    pub fn non_negative(&mut self, field: &str, value: f64) -> &mut Self {
        if value < 0.0 || value.is_nan() {
            self.errors
                .push(FieldValidationError::new(field, "must not be negative"));
        }
        self
    }

    /// Fails `field` when a non-empty `value` does not look like an email.
    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        let value = value.trim();
        if value.is_empty() {
            return self;
        }
        let valid = value
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty() && !domain.contains('@'));
        if !valid {
            self.errors
                .push(FieldValidationError::new(field, "is not a valid email"));
        }
        self
    }

    /// Fails `field` with `message` when `ok` is false.
    pub fn check(&mut self, field: &str, ok: bool, message: &str) -> &mut Self {
        if !ok {
            self.errors.push(FieldValidationError::new(field, message));
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                errors: std::mem::take(&mut self.errors),
            })
        }
    }
}

/// Client-side checks run before a payload is sent.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_all_errors() {
        let err = Validator::new()
            .required("name", "  ")
            .min("quantity", 0, 1)
            .email("email", "nope")
            .finish()
            .unwrap_err();
        assert_eq!(err.errors().len(), 3);
        assert!(err.has_field("name"));
        assert!(err.has_field("quantity"));
        assert!(err.has_field("email"));
    }

    #[test]
    fn test_empty_email_is_not_checked() {
        assert!(Validator::new().email("email", "").finish().is_ok());
        assert!(Validator::new().email("email", "ana@mail.com").finish().is_ok());
        assert!(Validator::new().email("email", "a@b@c").finish().is_err());
    }
}
