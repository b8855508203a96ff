/// Request validation helpers
///
/// Each request type has an explicit rule function that collects every
/// failing field into [`FieldErrors`] before anything is written. Length,
/// email and confirmation rules come from `validator` derives; enum, date,
/// UUID and existence rules are checked here because they need field-level
/// messages that serde cannot produce.

use chrono::NaiveDate;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::error::{ApiError, ApiResult, ValidationErrorDetail};

/// Accumulated field errors for one request
#[derive(Debug, Default)]
pub struct FieldErrors {
    details: Vec<ValidationErrorDetail>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the `validator` derive rules of `value`
    ///
    /// Fields that already carry an error (usually "required") are skipped,
    /// so each field reports its first failure.
    pub fn validate<T: Validate>(&mut self, value: &T) -> &mut Self {
        if let Err(e) = value.validate() {
            let fresh: Vec<_> = from_validator(&e)
                .into_iter()
                .filter(|d| !self.has(&d.field))
                .collect();
            self.details.extend(fresh);
        }
        self
    }

    /// Flags a required string that is absent, `null` or blank
    pub fn required(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if value.map_or(true, |v| v.trim().is_empty()) {
            self.push(field, format!("The {} field is required.", label(field)));
        }
        self
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.details.push(ValidationErrorDetail::new(field, message));
    }

    pub fn has(&self, field: &str) -> bool {
        self.details.iter().any(|d| d.field == field)
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    pub fn into_details(self) -> Vec<ValidationErrorDetail> {
        self.details
    }

    /// `Ok(())` when no rule failed, otherwise a 422
    pub fn into_result(self) -> ApiResult<()> {
        if self.details.is_empty() {
            Ok(())
        } else {
            Err(ApiError::ValidationError(self.details))
        }
    }

    /// Parses one of an enum's wire values
    pub fn choice<T: FromStr>(&mut self, field: &str, value: Option<&str>) -> Option<T> {
        let value = value?;
        match value.parse() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                self.push(field, format!("The selected {} is invalid.", label(field)));
                None
            }
        }
    }

    /// Parses a `YYYY-MM-DD` calendar date
    pub fn date(&mut self, field: &str, value: Option<&str>) -> Option<NaiveDate> {
        let value = value?;
        match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                self.push(
                    field,
                    format!("The {} must be a valid date in the format YYYY-MM-DD.", label(field)),
                );
                None
            }
        }
    }

    pub fn uuid(&mut self, field: &str, value: Option<&str>) -> Option<Uuid> {
        let value = value?;
        match Uuid::parse_str(value) {
            Ok(id) => Some(id),
            Err(_) => {
                self.push(field, format!("The {} must be a valid UUID.", label(field)));
                None
            }
        }
    }
}

/// Converts `validator` output into field errors, ordered by field name
pub fn from_validator(errors: &ValidationErrors) -> Vec<ValidationErrorDetail> {
    let mut details: Vec<ValidationErrorDetail> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("The {} field is invalid.", label(field))),
            })
        })
        .collect();

    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

/// Human form of a field name: `assigned_to` -> `assigned to`
fn label(field: &str) -> String {
    field.replace('_', " ")
}

/// Parses a path id; anything that is not a UUID cannot name a record
pub fn parse_id(raw: &str, resource: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(format!("{} not found", resource)))
}
