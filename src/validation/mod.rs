// Declarative request validation: required/non-empty rules checked before any
// write, failing with the full field-level error list.
use serde::Serialize;

use crate::error::ApiError;

/// One field-level validation failure, serialized as `{"msg", "param"}`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub msg: String,
    pub param: String,
}

impl FieldError {
    pub fn new(msg: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            param: param.into(),
        }
    }
}

/// Accumulates rule failures; `finish` short-circuits the handler with a 400
/// carrying every failed rule.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field must be present and non-empty after trimming.
    pub fn require(mut self, param: &str, value: Option<&str>, msg: &str) -> Self {
        if value.map_or(true, |v| v.trim().is_empty()) {
            self.errors.push(FieldError::new(msg, param));
        }
        self
    }

    /// Field must be present and contain an `@` with text on both sides.
    pub fn require_email(mut self, param: &str, value: Option<&str>, msg: &str) -> Self {
        let ok = value.is_some_and(|v| {
            v.split_once('@')
                .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'))
        });
        if !ok {
            self.errors.push(FieldError::new(msg, param));
        }
        self
    }

    /// Field must be present with at least `min` characters.
    pub fn require_min_length(mut self, param: &str, value: Option<&str>, min: usize, msg: &str) -> Self {
        if value.map_or(true, |v| v.chars().count() < min) {
            self.errors.push(FieldError::new(msg, param));
        }
        self
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error(self.errors))
        }
    }
}

/// Normalize a comma-separated skills string into trimmed tokens,
/// order preserved.
pub fn parse_skills(raw: &str) -> Vec<String> {
    raw.split(',').map(|skill| skill.trim().to_string()).collect()
}
