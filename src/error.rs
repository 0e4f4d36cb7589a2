//! The public error type of this crate.
//!
//! Internally, functions return `Res<T>` (an `anyhow::Result`) and attach context as errors
//! bubble up. At the public boundary (commands and data-access operations) errors are classified
//! with an `ErrorType` using `IntoResult::pub_result`.

use crate::api::ApiError;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};

/// The internal result type.
pub(crate) type Res<T> = anyhow::Result<T>;

/// The public result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the kind of failure that occurred.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The configuration file or home directory is missing or invalid.
    Config,
    /// Reading or writing the on-device store failed.
    Storage,
    /// The remote API failed and there was no fallback.
    Api,
    /// User input was rejected before reaching the data-access layer.
    Validation,
    /// Writing or reading an export file failed.
    Backup,
    /// Notification planning failed.
    Notification,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// The public error type. It carries an `ErrorType` and the underlying error chain.
pub struct Error {
    error_type: ErrorType,
    inner: anyhow::Error,
}

impl Error {
    pub fn new(error_type: ErrorType, e: impl Into<anyhow::Error>) -> Self {
        Self {
            error_type,
            inner: e.into(),
        }
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    /// Returns the typed remote error if this error was caused by one.
    pub fn api_error(&self) -> Option<&ApiError> {
        self.inner.downcast_ref::<ApiError>()
    }

    /// A message suitable for showing to the user. Remote errors use their localized message.
    pub fn user_message(&self) -> String {
        match self.api_error() {
            Some(api_error) => api_error.user_message(),
            None => format!("{:#}", self.inner),
        }
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {:?}", self.error_type, self.inner)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.inner)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

/// Converts a result with any error convertible to `anyhow::Error` into the public `Result`.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| Error::new(error_type, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ErrorCode;
    use anyhow::Context;

    #[test]
    fn test_pub_result_keeps_context() {
        let res: Res<()> = Err(anyhow::anyhow!("disk full")).context("Unable to save store");
        let err = res.pub_result(ErrorType::Storage).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Storage);
        assert_eq!(err.to_string(), "Unable to save store: disk full");
        assert!(err.api_error().is_none());
    }

    #[test]
    fn test_api_error_is_recoverable() {
        let res: std::result::Result<(), ApiError> = Err(ApiError::timeout());
        let err = res.pub_result(ErrorType::Api).unwrap_err();
        assert_eq!(err.api_error().unwrap().code(), ErrorCode::TimeoutError);
        assert_eq!(
            err.user_message(),
            "Die Anfrage hat zu lange gedauert. Bitte versuchen Sie es erneut."
        );
    }

    #[test]
    fn test_error_type_display() {
        assert_eq!(ErrorType::Validation.to_string(), "validation");
        assert_eq!("api".parse::<ErrorType>().unwrap(), ErrorType::Api);
    }
}
