//! Request Validation
//! Mission: Reject malformed input before it reaches the stores

use crate::error::{ApiError, FieldError};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Accumulates field errors; `finish` turns any into a 400
#[derive(Debug, Default)]
pub struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, param: &str, value: &str, msg: &str) -> Self {
        if value.trim().is_empty() {
            self.errors.push(FieldError::new(param, msg));
        }
        self
    }

    pub fn email(mut self, param: &str, value: &str, msg: &str) -> Self {
        if !is_valid_email(value) {
            self.errors.push(FieldError::new(param, msg));
        }
        self
    }

    pub fn min_len(mut self, param: &str, value: &str, min: usize, msg: &str) -> Self {
        if value.chars().count() < min {
            self.errors.push(FieldError::new(param, msg));
        }
        self
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }
}

/// Syntactic email check: one `@`, non-empty local part, dotted domain
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|l| {
            !l.is_empty()
                && !l.starts_with('-')
                && !l.ends_with('-')
                && l.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

/// GitHub login names: alphanumerics and single hyphens, at most 39 chars
pub fn is_valid_github_username(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 39
        && !name.starts_with('-')
        && !name.ends_with('-')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
