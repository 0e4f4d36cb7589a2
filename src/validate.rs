//! Form validation run on user input before it is handed to a repository. The repositories do not
//! repeat these checks.

use crate::model::{Cents, NewExpense, NewSubscription, DATE_FORMAT};
use chrono::NaiveDate;
use std::fmt::{Display, Formatter};

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_CATEGORY_LEN: usize = 100;
pub const MAX_NOTES_LEN: usize = 1000;
pub const MAX_URL_LEN: usize = 500;

/// A rejected form field.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(
            "name",
            "Bitte geben Sie einen Namen ein.",
        ));
    }
    max_len("name", value, MAX_NAME_LEN)
}

pub fn category(value: &str) -> Result<(), ValidationError> {
    max_len("category", value, MAX_CATEGORY_LEN)
}

pub fn notes(value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(notes) => max_len("notes", notes, MAX_NOTES_LEN),
        None => Ok(()),
    }
}

pub fn amount(value: Cents) -> Result<(), ValidationError> {
    if value.is_positive() {
        Ok(())
    } else {
        Err(ValidationError::new(
            "amount_cents",
            "Bitte geben Sie einen gültigen Betrag ein (> 0).",
        ))
    }
}

/// Blank URLs are allowed and mean "no URL".
pub fn cancel_url(value: Option<&str>) -> Result<(), ValidationError> {
    let url = match value.map(str::trim) {
        Some(url) if !url.is_empty() => url,
        _ => return Ok(()),
    };
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ValidationError::new(
            "cancel_url",
            "Die URL muss mit http:// oder https:// beginnen.",
        ));
    }
    max_len("cancel_url", url, MAX_URL_LEN)
}

pub fn start_date(value: &str) -> Result<(), ValidationError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| {
            ValidationError::new(
                "start_date",
                "Ungültiges Datumsformat. Erwartet: YYYY-MM-DD",
            )
        })
}

pub fn subscription(new: &NewSubscription) -> Result<(), ValidationError> {
    name(&new.name)?;
    category(&new.category)?;
    amount(new.amount_cents)?;
    start_date(&new.start_date)?;
    notes(new.notes.as_deref())?;
    cancel_url(new.cancel_url.as_deref())
}

pub fn expense(new: &NewExpense) -> Result<(), ValidationError> {
    name(&new.name)?;
    category(&new.category)?;
    amount(new.amount_cents)?;
    notes(new.notes.as_deref())
}

fn max_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        Err(ValidationError::new(
            field,
            format!("Darf höchstens {max} Zeichen lang sein."),
        ))
    } else {
        Ok(())
    }
}
