//! Minimal Groq chat-completions API client.
//!
//! Groq serves an OpenAI-compatible `chat/completions` endpoint. This crate
//! covers the part of it a conversational front end needs:
//! - Non-streaming completions with system/user/assistant messages
//! - A typed catalogue of the hosted models
//! - Provider error bodies surfaced in [`Error::Api`]

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const API_BASE: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MAX_TOKENS: usize = 500;

/// Errors that can occur when using the Groq client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("API key not configured")]
    NoApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Groq API client.
#[derive(Clone)]
pub struct Groq {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl fmt::Debug for Groq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Groq")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Groq {
    /// Create a new Groq client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_key: api_key.into(),
            model: Model::default().id().to_string(),
            base_url: API_BASE.to_string(),
        }
    }

    /// Create a Groq client from the GROQ_API_KEY environment variable.
    pub fn from_env() -> Result<Self, Error> {
        match std::env::var("GROQ_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key)),
            _ => Err(Error::NoApiKey),
        }
    }

    /// Set the default model for this client.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at another OpenAI-compatible base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The model used when a request does not name one.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a completion request and return the full response.
    pub async fn complete(&self, request: Request) -> Result<Response, Error> {
        let api_request = self.build_api_request(&request);
        let headers = self.build_headers()?;

        tracing::debug!(
            model = %api_request.model,
            messages = api_request.messages.len(),
            max_tokens = api_request.max_tokens,
            "sending chat completion"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .headers(headers)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: error_message(&body),
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        let response = parse_response(api_response);
        tracing::debug!(
            id = %response.id,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            "chat completion received"
        );
        Ok(response)
    }

    fn build_headers(&self) -> Result<HeaderMap, Error> {
        if self.api_key.trim().is_empty() {
            return Err(Error::NoApiKey);
        }
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| Error::Config(format!("Invalid API key: {e}")))?,
        );
        Ok(headers)
    }

    fn build_api_request(&self, request: &Request) -> ApiRequest {
        ApiRequest {
            model: request.model.clone().unwrap_or_else(|| self.model.clone()),
            messages: request
                .messages
                .iter()
                .map(|m| ApiMessage {
                    role: m.role.as_str(),
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

/// Pull `error.message` out of an OpenAI-style error body, falling back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

fn parse_response(api_response: ApiResponse) -> Response {
    let choices = api_response
        .choices
        .into_iter()
        .map(|c| Choice {
            content: c.message.content,
            finish_reason: c.finish_reason.as_deref().map(FinishReason::from_api),
        })
        .collect();

    let usage = api_response.usage.unwrap_or_default();

    Response {
        id: api_response.id,
        model: api_response.model,
        choices,
        usage: Usage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
        },
    }
}

// ============================================================================
// Public types
// ============================================================================

/// Models hosted by Groq that the front ends offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Model {
    /// `llama3-8b-8192`, the fast option.
    Llama3_8b,
    /// `llama3-70b-8192`, the smart option.
    #[default]
    Llama3_70b,
}

impl Model {
    pub const ALL: [Model; 2] = [Model::Llama3_8b, Model::Llama3_70b];

    /// API identifier of the model.
    pub fn id(&self) -> &'static str {
        match self {
            Model::Llama3_8b => "llama3-8b-8192",
            Model::Llama3_70b => "llama3-70b-8192",
        }
    }

    /// Short human description.
    pub fn tagline(&self) -> &'static str {
        match self {
            Model::Llama3_8b => "Fast",
            Model::Llama3_70b => "Smart",
        }
    }

    /// Label in the form `"<id> - <tagline>"`.
    pub fn label(&self) -> String {
        format!("{} - {}", self.id(), self.tagline())
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Model {
    type Err = Error;

    /// Accepts the id, the tagline, or the full label (`"llama3-8b-8192 - Fast"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.split(" - ").next().unwrap_or(s).trim().to_lowercase();
        Model::ALL
            .into_iter()
            .find(|m| m.id() == id || m.tagline().eq_ignore_ascii_case(&id))
            .ok_or_else(|| Error::Config(format!("unknown model: {s}")))
    }
}

/// A completion request to send to Groq.
#[derive(Debug, Clone)]
pub struct Request {
    pub model: Option<String>,
    pub max_tokens: usize,
    pub messages: Vec<Message>,
    pub temperature: Option<f32>,
}

impl Request {
    /// Create a new request with the given messages.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            model: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            messages,
            temperature: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature.clamp(0.0, 2.0));
        self
    }
}

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: text.into(),
        }
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
        }
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A completion response from Groq.
#[derive(Debug, Clone)]
pub struct Response {
    pub id: String,
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Usage,
}

impl Response {
    /// Text of the first choice, or an empty string when there is none.
    pub fn text(&self) -> String {
        self.choices
            .first()
            .and_then(|c| c.content.clone())
            .unwrap_or_default()
    }
}

/// One generated alternative.
#[derive(Debug, Clone)]
pub struct Choice {
    pub content: Option<String>,
    pub finish_reason: Option<FinishReason>,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    Other(String),
}

impl FinishReason {
    fn from_api(s: &str) -> Self {
        match s {
            "stop" => FinishReason::Stop,
            "length" => FinishReason::Length,
            other => FinishReason::Other(other.to_string()),
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
}

// ============================================================================
// Internal API types
// ============================================================================

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    messages: Vec<ApiMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = Groq::new("test-key");
        assert_eq!(client.model, "llama3-70b-8192");
        assert_eq!(client.base_url, API_BASE);
    }

    #[test]
    fn test_client_with_model_and_base_url() {
        let client = Groq::new("test-key")
            .with_model("llama3-8b-8192")
            .with_base_url("http://localhost:8080/v1/");
        assert_eq!(client.model(), "llama3-8b-8192");
        assert_eq!(client.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = Groq::new("super-secret");
        assert!(!format!("{client:?}").contains("super-secret"));
    }

    #[test]
    fn test_request_builder() {
        let request = Request::new(vec![Message::system("Be brief")])
            .with_model("llama3-8b-8192")
            .with_max_tokens(550)
            .with_temperature(0.7);

        assert_eq!(request.max_tokens, 550);
        assert_eq!(request.model.as_deref(), Some("llama3-8b-8192"));
        assert_eq!(request.temperature, Some(0.7));
    }

    #[test]
    fn test_request_defaults_to_client_model() {
        let client = Groq::new("k").with_model("llama3-8b-8192");
        let api = client.build_api_request(&Request::new(vec![Message::user("hi")]));
        assert_eq!(api.model, "llama3-8b-8192");
        assert_eq!(api.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(api.messages[0].role, "user");
    }

    #[test]
    fn test_empty_key_rejected() {
        let client = Groq::new("  ");
        assert!(matches!(client.build_headers(), Err(Error::NoApiKey)));
    }

    #[test]
    fn test_model_parsing() {
        assert_eq!("llama3-8b-8192".parse::<Model>().unwrap(), Model::Llama3_8b);
        assert_eq!(
            "llama3-70b-8192 - Smart".parse::<Model>().unwrap(),
            Model::Llama3_70b
        );
        assert_eq!("fast".parse::<Model>().unwrap(), Model::Llama3_8b);
        assert!("gpt-4".parse::<Model>().is_err());
        assert_eq!(Model::Llama3_8b.label(), "llama3-8b-8192 - Fast");
    }

    #[test]
    fn test_error_message_extraction() {
        let body = r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error"}}"#;
        assert_eq!(error_message(body), "Invalid API Key");
        assert_eq!(error_message("gateway timeout"), "gateway timeout");
    }

    #[test]
    fn test_response_text_without_choices() {
        let response = parse_response(ApiResponse {
            id: "x".into(),
            model: "m".into(),
            choices: vec![],
            usage: None,
        });
        assert_eq!(response.text(), "");
        assert_eq!(response.usage.prompt_tokens, 0);
    }
}
