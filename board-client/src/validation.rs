use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inclusive character-count bounds for a text field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthLimits {
    pub min_length: usize,
    pub max_length: usize,
}

impl LengthLimits {
    pub const fn new(min_length: usize, max_length: usize) -> Self {
        Self {
            min_length,
            max_length,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min_length <= self.max_length
    }

    /// Check `value` against the bounds. Length is counted in characters.
    pub fn check(&self, field: &'static str, value: &str) -> Result<(), ValidationError> {
        let len = value.chars().count();
        if len < self.min_length {
            return Err(ValidationError::TooShort {
                field,
                min: self.min_length,
            });
        }
        if len > self.max_length {
            return Err(ValidationError::TooLong {
                field,
                max: self.max_length,
            });
        }
        Ok(())
    }
}

/// Client-side input errors; these never reach the network
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} is not a valid email address")]
    InvalidEmail { field: &'static str },

    #[error("Passwords do not match")]
    PasswordMismatch,
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::InvalidEmail { field } => field,
            ValidationError::PasswordMismatch => "confirm_password",
        }
    }
}

pub const POST_TITLE_LIMITS: LengthLimits = LengthLimits::new(5, 20);
pub const POST_CONTENT_LIMITS: LengthLimits = LengthLimits::new(10, 500);
pub const EMAIL_LIMITS: LengthLimits = LengthLimits::new(5, 50);
pub const LOGIN_PASSWORD_LIMITS: LengthLimits = LengthLimits::new(8, 30);
pub const USERNAME_LIMITS: LengthLimits = LengthLimits::new(2, 5);
pub const SIGNUP_PASSWORD_LIMITS: LengthLimits = LengthLimits::new(8, 20);

fn email_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        // Dot-separated atoms on both sides of a single @, no leading, trailing
        // or doubled dots, and an alphabetic top-level domain
        Regex::new(
            r"^[A-Za-z0-9_'+\-]+(?:\.[A-Za-z0-9_'+\-]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}$",
        )
        .expect("email pattern is valid")
    })
}

/// Length bounds plus an address shape check
pub fn check_email(field: &'static str, value: &str) -> Result<(), ValidationError> {
    EMAIL_LIMITS.check(field, value)?;
    if email_regex().is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail { field })
    }
}
