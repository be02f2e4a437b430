//! Boundary validation for request bodies.
//!
//! Handlers run these checks before touching the store. Failures are collected
//! per field so a client sees every problem with a form at once.

use axum::extract::{FromRequest, FromRequestParts};
use serde_json::Value;

use crate::error::{AppError, AppResult, FieldError};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A request body field kept as raw JSON so a missing value or a wrong type is
/// reported per field instead of rejecting the whole body.
pub type RawField = Option<Value>;

/// JSON extractor whose rejections use the application error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Accumulates field errors and converts them into [`AppError::Validation`].
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Reads a required string. On failure the field error is recorded and an
    /// empty string returned; callers must [`finish`](Self::finish) before using it.
    pub fn string(&mut self, field: &str, raw: &RawField) -> String {
        match raw {
            Some(Value::String(s)) => s.clone(),
            None | Some(Value::Null) => {
                self.push(field, format!("{} is required", field));
                String::new()
            }
            Some(_) => {
                self.push(field, format!("{} must be a string", field));
                String::new()
            }
        }
    }

    /// Reads a required integer. JSON numbers without a fractional part and
    /// strings of digits are accepted.
    pub fn integer(&mut self, field: &str, raw: &RawField) -> i64 {
        match raw {
            None | Some(Value::Null) => {
                self.push(field, format!("{} is required", field));
                0
            }
            Some(value) => self.parse_integer(field, value).unwrap_or(0),
        }
    }

    /// Like [`integer`](Self::integer), but an absent or null value is `None`.
    pub fn optional_integer(&mut self, field: &str, raw: &RawField) -> Option<i64> {
        match raw {
            None | Some(Value::Null) => None,
            Some(value) => self.parse_integer(field, value),
        }
    }

    /// Reads an optional flag, defaulting to `false`.
    pub fn flag(&mut self, field: &str, raw: &RawField) -> bool {
        match raw {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(_) => {
                self.push(field, format!("{} must be a boolean", field));
                false
            }
        }
    }

    fn parse_integer(&mut self, field: &str, value: &Value) -> Option<i64> {
        let parsed = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.push(field, format!("{} must be an integer", field));
        }
        parsed
    }

    /// Requires a value that is non-empty after trimming.
    pub fn not_blank(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.push(field, format!("{} is required", field));
        }
        self
    }

    pub fn min_chars(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
        if value.chars().count() < min {
            self.push(field, format!("{} must be at least {} characters", field, min));
        }
        self
    }

    pub fn positive_id(&mut self, field: &str, value: i64) -> &mut Self {
        if value <= 0 {
            self.push(field, format!("{} must be a positive integer", field));
        }
        self
    }

    pub fn non_negative(&mut self, field: &str, value: i64) -> &mut Self {
        if value < 0 {
            self.push(field, format!("{} must be a non-negative integer", field));
        }
        self
    }

    pub fn finish(&mut self) -> AppResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}

/// Path extractor whose rejections use the application error envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
