//! Form validation, run before anything is sent or stored.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::messages::{LoginRequest, NewSchedule, NewUser};

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please fill in all required fields (missing: {0})")]
    MissingField(&'static str),

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Unknown {kind}: {id}")]
    UnknownReference { kind: &'static str, id: String },

    #[error("User {0} is not a technician")]
    NotATechnician(String),
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

fn required(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

/// Turn blank optional input into `None`
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required(&self.email, "email")?;
        required(&self.password, "password")
    }
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required(&self.name, "name")?;
        required(&self.email, "email")?;
        if self.role.is_none() {
            return Err(ValidationError::MissingField("role"));
        }
        required(&self.password, "password")?;
        if !is_valid_email(self.email.trim()) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }
}

impl NewSchedule {
    /// Checks presence only; references are resolved by the repository
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.date.is_none() {
            return Err(ValidationError::MissingField("date"));
        }
        if self.time.is_none() {
            return Err(ValidationError::MissingField("time"));
        }
        required(&self.customer_id, "customer")?;
        required(&self.technician_id, "technician")?;
        required(&self.equipment_id, "equipment")
    }
}
