//! OpenAI API data models not shared with the core

use serde::Deserialize;

/// OpenAI Error Response
#[derive(Debug, Deserialize)]
pub struct OpenAiError {
    pub error: ErrorDetails,
}

/// Error details
#[derive(Debug, Deserialize)]
pub struct ErrorDetails {
    pub message: String,
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl OpenAiError {
    /// Best-effort message from an error body, tagged with the error type (or
    /// code); the raw text when it is not the documented shape
    pub fn message_from_body(body: &str) -> String {
        match serde_json::from_str::<OpenAiError>(body) {
            Ok(OpenAiError { error }) => match error.r#type.or(error.code) {
                Some(kind) => format!("{} ({})", error.message, kind),
                None => error.message,
            },
            Err(_) if body.trim().is_empty() => "Unknown error".to_string(),
            Err(_) => body.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_from_body() {
        let body = r#"{"error": {"message": "Invalid model", "type": "invalid_request_error", "code": "model_not_found"}}"#;
        assert_eq!(OpenAiError::message_from_body(body), "Invalid model (invalid_request_error)");

        let body = r#"{"error": {"message": "Slow down", "code": "rate_limit_exceeded"}}"#;
        assert_eq!(OpenAiError::message_from_body(body), "Slow down (rate_limit_exceeded)");

        let body = r#"{"error": {"message": "Server overloaded"}}"#;
        assert_eq!(OpenAiError::message_from_body(body), "Server overloaded");

        assert_eq!(OpenAiError::message_from_body("<html>bad gateway</html>"), "<html>bad gateway</html>");
        assert_eq!(OpenAiError::message_from_body(""), "Unknown error");
    }
}
