//! Error types shared by every tool.

use thiserror::Error;

use crate::credential::CredentialError;

/// Errors produced while translating, sending, or normalizing a tool call.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SheetsError {
    /// No usable authorization handle could be constructed.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// A sheet addressed by title does not exist in the spreadsheet.
    #[error("sheet '{title}' not found in spreadsheet {spreadsheet_id}")]
    SheetNotFound {
        title: String,
        spreadsheet_id: String,
    },

    /// Caller input was rejected before any request was sent.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The remote service answered with a non-success status.
    #[error("Google {service} API request failed ({status}): {body}")]
    Remote {
        service: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    /// The request never produced a decodable response.
    #[error("Google {service} API request could not be completed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The response decoded but lacks a field the tool depends on.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

impl SheetsError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Returns `true` when the error stems from caller input rather than the
    /// remote service or local configuration.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::SheetNotFound { .. })
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = SheetsError> = std::result::Result<T, E>;

/// Returns a [`SheetsError::Validation`] from the enclosing function when the
/// condition does not hold.
macro_rules! ensure_input {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::SheetsError::Validation(format!($($arg)+)));
        }
    };
}

pub(crate) use ensure_input;

#[cfg(test)]
mod tests {
    use super::*;

    fn check_positive(value: i64) -> Result<i64> {
        ensure_input!(value > 0, "value must be positive, got {value}");
        Ok(value)
    }

    #[test]
    fn test_ensure_input_returns_validation_error() {
        let err = check_positive(-2).unwrap_err();
        assert!(matches!(err, SheetsError::Validation(_)));
        assert_eq!(err.to_string(), "invalid input: value must be positive, got -2");
    }

    #[test]
    fn test_ensure_input_passes_through() {
        assert_eq!(check_positive(3).unwrap(), 3);
    }

    #[test]
    fn test_sheet_not_found_names_title_and_spreadsheet() {
        let err = SheetsError::SheetNotFound {
            title: "Budget".to_string(),
            spreadsheet_id: "abc123".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("Budget"));
        assert!(message.contains("abc123"));
        assert!(err.is_caller_error());
    }

    #[test]
    fn test_remote_error_carries_body_verbatim() {
        let err = SheetsError::Remote {
            service: "Sheets",
            status: reqwest::StatusCode::BAD_REQUEST,
            body: r#"{"error":{"message":"Unable to parse range: Nope!A1"}}"#.to_string(),
        };
        assert!(err.to_string().contains("Unable to parse range: Nope!A1"));
        assert!(!err.is_caller_error());
    }
}
