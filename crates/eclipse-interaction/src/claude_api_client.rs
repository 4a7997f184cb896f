//! Anthropic Messages API client.

use async_trait::async_trait;
use eclipse_core::chat::Message;
use eclipse_core::completion::{CompletionClient, CompletionRequest};
use eclipse_core::config::{ApiConfig, DEFAULT_ANTHROPIC_VERSION, DEFAULT_API_URL};
use eclipse_core::error::RemoteError;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// Completion client that posts the whole chat history to the Messages API.
///
/// A client without a key still constructs; every request then fails with a
/// `RemoteError` so the caller records a fallback reply.
#[derive(Clone)]
pub struct ClaudeApiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    anthropic_version: String,
}

impl ClaudeApiClient {
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        anthropic_version: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.into(),
            anthropic_version: anthropic_version.into(),
        }
    }

    /// Creates a client pointed at the endpoint named in `[api]`.
    pub fn from_config(api_key: Option<String>, config: &ApiConfig) -> Self {
        Self::new(api_key, &config.base_url, &config.anthropic_version)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn send_request(&self, body: &CreateMessageRequest<'_>) -> Result<String, RemoteError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| RemoteError::transport("No Anthropic API key configured"))?;

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.anthropic_version)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| RemoteError::transport(format!("Claude API request failed: {err}")))?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|err| RemoteError::http(status.as_u16(), format!("Failed to read body: {err}")))?;

        if !status.is_success() {
            return Err(map_http_error(status, &body_text));
        }

        parse_response(status, &body_text)
    }
}

impl Default for ClaudeApiClient {
    fn default() -> Self {
        Self::new(None, DEFAULT_API_URL, DEFAULT_ANTHROPIC_VERSION)
    }
}

impl std::fmt::Debug for ClaudeApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaudeApiClient")
            .field("base_url", &self.base_url)
            .field("anthropic_version", &self.anthropic_version)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

#[async_trait]
impl CompletionClient for ClaudeApiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Message, RemoteError> {
        let body = CreateMessageRequest::from_request(&request);
        tracing::debug!(
            "[ClaudeApiClient] Sending {} message(s) to {}",
            body.messages.len(),
            body.model
        );
        let text = self.send_request(&body).await?;
        Ok(Message::assistant(text))
    }
}

#[derive(Serialize)]
struct CreateMessageRequest<'a> {
    model: &'static str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<WireMessage<'a>>,
}

impl<'a> CreateMessageRequest<'a> {
    fn from_request(request: &'a CompletionRequest) -> Self {
        Self {
            model: request.model.as_str(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: request
                .messages()
                .map(|message| WireMessage {
                    role: message.role.as_str(),
                    content: &message.content,
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlockResponse>,
}

#[derive(Deserialize)]
struct ContentBlockResponse {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Takes the text of the first content block.
fn parse_response(status: StatusCode, body: &str) -> Result<String, RemoteError> {
    let parsed: CreateMessageResponse = serde_json::from_str(body).map_err(|err| {
        RemoteError::http(status.as_u16(), format!("Failed to parse Claude response: {err}"))
    })?;

    parsed
        .content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .ok_or_else(|| {
            RemoteError::http(
                status.as_u16(),
                "Claude API returned no text in the first content block",
            )
        })
}

fn map_http_error(status: StatusCode, body: &str) -> RemoteError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.to_string());
    RemoteError::http(status.as_u16(), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eclipse_core::settings::{ModelId, Settings};
    use serde_json::json;

    #[test]
    fn test_request_body_wire_format() {
        let settings = Settings {
            temperature: 0.5,
            max_tokens: 1000,
            model: ModelId::Claude3Haiku,
        };
        let history = vec![Message::user("Hello"), Message::error("sorry")];
        let request = CompletionRequest::new(&settings, history, Message::user("again"));

        let body = serde_json::to_value(CreateMessageRequest::from_request(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "claude-3-haiku-20240307",
                "max_tokens": 1000,
                "temperature": 0.5,
                "messages": [
                    {"role": "user", "content": "Hello"},
                    {"role": "assistant", "content": "sorry"},
                    {"role": "user", "content": "again"},
                ]
            })
        );
    }

    #[test]
    fn test_parse_response_takes_first_block() {
        let body = r#"{"content":[{"type":"text","text":"Hi there"},{"type":"text","text":"x"}]}"#;
        assert_eq!(parse_response(StatusCode::OK, body).unwrap(), "Hi there");
    }

    #[test]
    fn test_parse_response_rejects_empty_content() {
        let err = parse_response(StatusCode::OK, r#"{"content":[]}"#).unwrap_err();
        assert_eq!(err.status, Some(200));
    }

    #[test]
    fn test_parse_response_rejects_garbage() {
        assert!(parse_response(StatusCode::OK, "<html>").is_err());
    }

    #[test]
    fn test_map_http_error_extracts_message() {
        let body = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        let err = map_http_error(StatusCode::from_u16(529).unwrap(), body);
        assert_eq!(err, RemoteError::http(529, "Overloaded"));
    }

    #[test]
    fn test_map_http_error_keeps_raw_body() {
        let err = map_http_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.cause, "upstream down");
        assert_eq!(err.status, Some(502));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        let client = ClaudeApiClient::default();
        assert!(!client.has_api_key());
        let request = CompletionRequest::new(&Settings::default(), Vec::new(), Message::user("hi"));
        let err = client.complete(request).await.unwrap_err();
        assert_eq!(err.status, None);
    }
}
