use clinic_core::{BookingError, FieldErrors, StatusError};
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(FieldErrors),
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("could not reach clinic API at {0}")]
    Connection(String),
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("HTTP client error: {0}")]
    HttpClient(String),
    #[error("failed to parse response: {0}")]
    ResponseParsing(String),
    #[error("invalid client configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Booking(#[from] BookingError),
    #[error(transparent)]
    Status(#[from] StatusError),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Picks the message shown to the user for a failed response.
///
/// Uses the JSON body's `error` string when there is one, then the raw body text, then the
/// status reason phrase.
pub fn extract_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("error").and_then(serde_json::Value::as_str) {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}
