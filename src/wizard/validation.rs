use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

use crate::domain::{is_membership_id, ApplicationRecord, FieldValue};

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Field name to message, in field-name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrorSet {
    errors: BTreeMap<String, String>,
}

impl ValidationErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        // First failure for a field wins; later checks would only repeat it.
        self.errors
            .entry(field.into())
            .or_insert_with(|| message.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.errors.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors
            .iter()
            .map(|(field, message)| (field.as_str(), message.as_str()))
    }
}

/// Format checks applied to a value once it is present.
#[derive(Clone)]
pub enum Validator {
    None,
    Email,
    MinLength(usize),
    Phone,
    Year,
    PositiveNumber,
    PositiveInteger,
    Date,
    OneOf(Vec<String>),
    MembershipId,
    MustAccept,
    Matches {
        field: &'static str,
        label: &'static str,
    },
}

impl Validator {
    pub fn validate(
        &self,
        value: &FieldValue,
        record: &ApplicationRecord,
    ) -> Result<(), ValidationError> {
        match self {
            Validator::None => Ok(()),
            Validator::Email => {
                let text = require_text(value)?;
                match text.split_once('@') {
                    Some((local, domain))
                        if !local.is_empty() && !domain.is_empty() && !text.contains(' ') =>
                    {
                        Ok(())
                    }
                    _ => Err(ValidationError::new("Enter a valid email address")),
                }
            }
            Validator::MinLength(min) => {
                let text = require_text(value)?;
                let length = text.chars().count();
                if length < *min {
                    Err(ValidationError::new(format!(
                        "Must be at least {} characters (got {})",
                        min, length
                    )))
                } else {
                    Ok(())
                }
            }
            Validator::Phone => {
                let text = require_text(value)?;
                let digits = text
                    .strip_prefix('+')
                    .unwrap_or(text)
                    .chars()
                    .filter(|ch| !matches!(ch, ' ' | '-'))
                    .collect::<String>();
                if (7..=15).contains(&digits.len()) && digits.chars().all(|ch| ch.is_ascii_digit()) {
                    Ok(())
                } else {
                    Err(ValidationError::new(
                        "Enter a phone number of 7 to 15 digits (e.g., +234 803 000 0000)",
                    ))
                }
            }
            Validator::Year => require_text(value)?
                .parse::<u16>()
                .ok()
                .filter(|year| (1900..=2100).contains(year))
                .map(|_| ())
                .ok_or_else(|| ValidationError::new("Enter a four-digit year (e.g., 2019)")),
            Validator::PositiveNumber => require_text(value)?
                .parse::<f64>()
                .map_err(|_| ValidationError::new("Enter a numeric value"))
                .and_then(|v| {
                    if !v.is_finite() {
                        Err(ValidationError::new("Enter a numeric value"))
                    } else if v > 0.0 {
                        Ok(())
                    } else {
                        Err(ValidationError::new("Value must be greater than zero"))
                    }
                }),
            Validator::PositiveInteger => require_text(value)?
                .parse::<u32>()
                .map_err(|_| ValidationError::new("Enter a whole number (1 or greater)"))
                .and_then(|v| {
                    if v == 0 {
                        Err(ValidationError::new("Value must be at least 1"))
                    } else {
                        Ok(())
                    }
                }),
            Validator::Date => NaiveDate::parse_from_str(require_text(value)?, "%Y-%m-%d")
                .map(|_| ())
                .map_err(|_| ValidationError::new("Use YYYY-MM-DD format")),
            Validator::OneOf(options) => {
                let text = require_text(value)?;
                if options.iter().any(|option| option == text) {
                    Ok(())
                } else {
                    Err(ValidationError::new(format!(
                        "Value must be one of: {}",
                        options.join(", ")
                    )))
                }
            }
            Validator::MembershipId => {
                let text = require_text(value)?;
                if is_membership_id(text) {
                    Ok(())
                } else {
                    Err(ValidationError::new(
                        "Membership ID must look like TPA3620001234",
                    ))
                }
            }
            Validator::MustAccept => match value {
                FieldValue::Flag(true) => Ok(()),
                _ => Err(ValidationError::new("This declaration must be accepted")),
            },
            Validator::Matches { field, label } => {
                if record.get(field) == Some(value) {
                    Ok(())
                } else {
                    Err(ValidationError::new(format!("Must match {}", label)))
                }
            }
        }
    }
}

fn require_text(value: &FieldValue) -> Result<&str, ValidationError> {
    value
        .as_text()
        .map(str::trim)
        .ok_or_else(|| ValidationError::new("Expected a text value"))
}
