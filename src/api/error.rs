//! The typed error returned by every remote API call.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Classifies a failed API call.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No response was received.
    NetworkError,
    /// The server answered with a non-success status.
    HttpError,
    /// The server rejected the payload field by field.
    ValidationError,
    /// The request did not complete within the configured timeout.
    TimeoutError,
    NotFound,
    DatabaseError,
    /// The server answered with a body that could not be decoded.
    InvalidResponse,
    UnknownError,
}

serde_plain::derive_display_from_serialize!(ErrorCode);
serde_plain::derive_fromstr_from_deserialize!(ErrorCode);

impl ErrorCode {
    /// Parses a code sent by the server. Codes this client does not know become `UnknownError`.
    pub fn from_wire(code: &str) -> Self {
        code.parse().unwrap_or(ErrorCode::UnknownError)
    }
}

/// An error from the remote API.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    status: Option<u16>,
    details: Option<Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            details: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, message)
    }

    pub fn timeout() -> Self {
        Self::new(ErrorCode::TimeoutError, "Zeitüberschreitung der Anfrage")
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidResponse, message)
    }

    /// The error reported when no API base URL is configured. No request is attempted in that case.
    pub fn unconfigured() -> Self {
        Self::network("Keine API-URL konfiguriert")
    }

    /// Builds an error from a non-success response.
    ///
    /// - A structured `{"error": {"code", "message", "details"}}` envelope is used as-is.
    /// - A `detail` array (field validation errors) becomes `ValidationError` with the `msg` of
    ///   each entry joined by ", ".
    /// - A `detail` string becomes the message of an `HttpError`.
    /// - Anything else becomes `HTTP <status> Fehler`.
    ///
    /// A 404 without an envelope is reported as `NotFound`.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<Value>(body).ok();
        let fallback_code = if status == 404 {
            ErrorCode::NotFound
        } else {
            ErrorCode::HttpError
        };

        if let Some(envelope) = parsed
            .as_ref()
            .and_then(|v| v.get("error"))
            .filter(|e| e.is_object())
        {
            let code = envelope
                .get("code")
                .and_then(Value::as_str)
                .map(ErrorCode::from_wire)
                .unwrap_or(ErrorCode::HttpError);
            let message = envelope
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Ein Fehler ist aufgetreten");
            return Self {
                code,
                message: message.to_string(),
                status: Some(status),
                details: envelope.get("details").filter(|d| !d.is_null()).cloned(),
            };
        }

        match parsed.as_ref().and_then(|v| v.get("detail")) {
            Some(Value::Array(items)) => {
                let message = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join(", ");
                Self {
                    code: ErrorCode::ValidationError,
                    message,
                    status: Some(status),
                    details: Some(Value::Array(items.clone())),
                }
            }
            Some(Value::String(detail)) => Self {
                code: fallback_code,
                message: detail.clone(),
                status: Some(status),
                details: None,
            },
            _ => Self {
                code: fallback_code,
                message: format!("HTTP {status} Fehler"),
                status: Some(status),
                details: None,
            },
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The HTTP status, if a response was received.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::NotFound
    }

    /// The German message shown to the user.
    pub fn user_message(&self) -> String {
        let or = |default: &str| {
            if self.message.is_empty() {
                default.to_string()
            } else {
                self.message.clone()
            }
        };
        match self.code {
            ErrorCode::ValidationError => {
                or("Ungültige Eingabe. Bitte überprüfen Sie Ihre Daten.")
            }
            ErrorCode::NotFound => or("Der gesuchte Eintrag wurde nicht gefunden."),
            ErrorCode::DatabaseError => {
                "Ein Fehler ist beim Speichern aufgetreten. Bitte versuchen Sie es erneut."
                    .to_string()
            }
            ErrorCode::HttpError => or("Ein Netzwerkfehler ist aufgetreten."),
            ErrorCode::NetworkError => {
                "Keine Verbindung zum Server. Bitte überprüfen Sie Ihre Internetverbindung."
                    .to_string()
            }
            ErrorCode::TimeoutError => {
                "Die Anfrage hat zu lange gedauert. Bitte versuchen Sie es erneut.".to_string()
            }
            ErrorCode::InvalidResponse | ErrorCode::UnknownError => {
                or("Ein unerwarteter Fehler ist aufgetreten.")
            }
        }
    }
}
