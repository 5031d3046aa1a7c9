//! Core data types for Agrogate

use serde::{Deserialize, Serialize};

/// Text returned by [`CompletionResponse::first_response`] when the remote
/// produced no usable answer.
pub const NO_ANSWER_TEXT: &str = "Sorry, I couldn't generate a response at this time.";

/// Role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A message in an outbound completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Request body sent to the remote chat-completion endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    /// Build a request holding an optional system message followed by exactly
    /// one user message.
    pub fn new(
        model: impl Into<String>,
        system_prompt: Option<&str>,
        prompt: impl Into<String>,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system_prompt {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(prompt));

        Self {
            model: model.into(),
            messages,
            max_tokens,
            temperature,
        }
    }

    /// Content of the user message, if any
    pub fn user_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }

    /// Whether the request carries a system message
    pub fn has_system_prompt(&self) -> bool {
        self.messages.first().map_or(false, |m| m.role == Role::System)
    }
}

/// Response returned by the remote chat-completion endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<u64>,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Usage,
}

impl CompletionResponse {
    /// Content of the first choice, or [`NO_ANSWER_TEXT`] when the response
    /// has no choices or the first one carries no content.
    pub fn first_response(&self) -> &str {
        self.answer().unwrap_or(NO_ANSWER_TEXT)
    }

    /// Content of the first choice, if there is one
    pub fn answer(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
    }

    /// True when the remote answered without any usable content
    pub fn is_no_answer(&self) -> bool {
        self.answer().is_none()
    }
}

/// Individual choice in a completion response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub message: Option<ResponseMessage>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Message inside a choice
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage reported by the remote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Read-only snapshot of the rate window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitStatus {
    pub current_requests: u32,
    pub max_requests: u32,
    pub millis_until_reset: u64,
}

impl RateLimitStatus {
    pub fn limit_exceeded(&self) -> bool {
        self.current_requests >= self.max_requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let request = CompletionRequest::new("gpt-3.5-turbo", Some("be brief"), "hello", 1000, 0.7);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["model"], "gpt-3.5-turbo");
        assert_eq!(value["max_tokens"], 1000);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["messages"][1]["content"], "hello");
        assert!(request.has_system_prompt());
        assert_eq!(request.user_prompt(), Some("hello"));
    }

    #[test]
    fn test_request_without_system_prompt() {
        let request = CompletionRequest::new("m", None, "hi", 10, 0.1);
        assert_eq!(request.messages.len(), 1);
        assert!(!request.has_system_prompt());
    }

    #[test]
    fn test_first_response() {
        let response: CompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1700000000,
            "model": "gpt-3.5-turbo",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Rotate your crops."},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16}
        }))
        .unwrap();

        assert_eq!(response.first_response(), "Rotate your crops.");
        assert_eq!(response.usage.total_tokens, 16);
        assert!(!response.is_no_answer());
    }

    #[test]
    fn test_empty_choices_is_no_answer() {
        let response: CompletionResponse =
            serde_json::from_value(json!({"id": "x", "model": "m", "choices": []})).unwrap();
        assert!(response.is_no_answer());
        assert_eq!(response.first_response(), NO_ANSWER_TEXT);

        let response: CompletionResponse = serde_json::from_value(json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": null}}]
        }))
        .unwrap();
        assert_eq!(response.first_response(), NO_ANSWER_TEXT);
    }

    #[test]
    fn test_rate_limit_status() {
        let status = RateLimitStatus { current_requests: 60, max_requests: 60, millis_until_reset: 0 };
        assert!(status.limit_exceeded());
    }
}
