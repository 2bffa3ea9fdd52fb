//! OpenAI adapter for chat completions and embeddings.
//!
//! One HTTP attempt per call. Status codes and transport failures are mapped
//! onto [`AIError`]; the funnel decides what to say when a call fails.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, EmbeddingProvider, MessageRole,
    ProviderInfo,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_RETRY_AFTER_SECS: u32 = 30;

#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    api_key: Secret<String>,
    pub model: String,
    pub embedding_model: String,
    /// No trailing slash.
    pub base_url: String,
    pub timeout: Duration,
}

impl OpenAIConfig {
    /// Defaults to `gpt-4.1-nano` and `text-embedding-ada-002`.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4.1-nano".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key.expose_secret())
    }
}

/// Talks to `/chat/completions` and `/embeddings` under the configured base URL.
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self { config, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }

    fn chat_body(&self, request: &CompletionRequest) -> ChatRequest {
        let system = request.system_prompt.iter().map(|prompt| ChatMessage {
            role: "system".to_string(),
            content: Some(prompt.clone()),
        });
        let turns = request.messages.iter().map(|message| ChatMessage {
            role: role_name(message.role).to_string(),
            content: Some(message.content.clone()),
        });

        ChatRequest {
            model: self.config.model.clone(),
            messages: system.chain(turns).collect(),
            max_completion_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Response, AIError> {
        let response = self
            .client
            .post(self.endpoint(path))
            .header("Authorization", self.config.bearer())
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response.text().await.unwrap_or_default();
        Err(status_error(status, detail))
    }

    fn transport_error(&self, error: reqwest::Error) -> AIError {
        if error.is_timeout() {
            return AIError::Timeout {
                timeout_secs: self.config.timeout.as_secs() as u32,
            };
        }
        if error.is_connect() {
            return AIError::network(format!("connection failed: {}", error));
        }
        AIError::network(error.to_string())
    }
}

fn role_name(role: MessageRole) -> &'static str {
    match role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    }
}

fn status_error(status: StatusCode, detail: String) -> AIError {
    match status {
        StatusCode::UNAUTHORIZED => AIError::AuthenticationFailed,
        StatusCode::TOO_MANY_REQUESTS => AIError::rate_limited(retry_after(&detail)),
        StatusCode::BAD_REQUEST => AIError::InvalidRequest(detail),
        s if s.is_server_error() => AIError::unavailable(format!("{}: {}", s, detail)),
        s => AIError::network(format!("unexpected status {}: {}", s, detail)),
    }
}

/// Seconds from a "try again in Ns" hint in a 429 body, else 30.
fn retry_after(body: &str) -> u32 {
    const HINT: &str = "try again in ";

    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value["error"]["message"].as_str().map(str::to_owned))
        .and_then(|message| {
            let start = message.find(HINT)? + HINT.len();
            let digits: String = message[start..]
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            digits.parse().ok()
        })
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

#[async_trait]
impl AIProvider for OpenAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let response = self.post("chat/completions", &self.chat_body(&request)).await?;

        let ChatResponse { model, choices } = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("chat completion body: {}", e)))?;

        let first = choices
            .into_iter()
            .next()
            .ok_or_else(|| AIError::parse("chat completion had no choices"))?;

        Ok(CompletionResponse::new(
            first.message.content.unwrap_or_default(),
            model,
        ))
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("openai", &self.config.model)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AIError> {
        let body = EmbeddingRequest {
            model: &self.config.embedding_model,
            input: text,
        };
        let response = self.post("embeddings", &body).await?;

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("embedding body: {}", e)))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .ok_or_else(|| AIError::parse("embedding response had no data"))
    }
}

// ----- Wire types -----

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    /// Serves `router` on an ephemeral port and returns its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn provider(base_url: &str) -> OpenAIProvider {
        OpenAIProvider::new(OpenAIConfig::new("sk-test").with_base_url(base_url)).unwrap()
    }

    #[test]
    fn config_builder_trims_base_url() {
        let config = OpenAIConfig::new("test-key")
            .with_model("gpt-4o-mini")
            .with_embedding_model("text-embedding-3-small")
            .with_base_url("https://custom.api.com/v1/")
            .with_timeout(Duration::from_secs(30));

        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.embedding_model, "text-embedding-3-small");
        assert_eq!(config.base_url, "https://custom.api.com/v1");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.bearer(), "Bearer test-key");
    }

    #[test]
    fn request_puts_system_prompt_first() {
        let provider = provider("http://localhost");
        let request = CompletionRequest::new()
            .with_system_prompt("Você é um atendente")
            .with_message(MessageRole::User, "Oi")
            .with_max_tokens(150)
            .with_temperature(0.7);

        let body = serde_json::to_value(provider.chat_body(&request)).unwrap();

        assert_eq!(body["model"], "gpt-4.1-nano");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Oi");
        assert_eq!(body["max_completion_tokens"], 150);
    }

    #[test]
    fn provider_info_reports_chat_model() {
        let info = provider("http://localhost").provider_info();
        assert_eq!(info, ProviderInfo::new("openai", "gpt-4.1-nano"));
    }

    #[test]
    fn retry_after_reads_hint_or_defaults() {
        let error = r#"{"error":{"message":"Rate limit reached. Please try again in 20s."}}"#;
        assert_eq!(retry_after(error), 20);
        assert_eq!(retry_after(r#"{"error":{"message":"slow down"}}"#), 30);
        assert_eq!(retry_after("not json"), 30);
    }

    #[tokio::test]
    async fn complete_returns_first_choice() {
        let router = Router::new().route(
            "/chat/completions",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["messages"][0]["role"], "system");
                Json(json!({
                    "model": "gpt-4.1-nano",
                    "choices": [{"message": {"role": "assistant", "content": "Prazer, Maria!"}}]
                }))
            }),
        );
        let base = serve(router).await;

        let response = provider(&base)
            .complete(CompletionRequest::new().with_system_prompt("x"))
            .await
            .unwrap();

        assert_eq!(response.content, "Prazer, Maria!");
        assert_eq!(response.model, "gpt-4.1-nano");
    }

    #[tokio::test]
    async fn null_content_becomes_empty_string() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async {
                Json(json!({
                    "model": "gpt-4.1-nano",
                    "choices": [{"message": {"role": "assistant", "content": null}}]
                }))
            }),
        );
        let base = serve(router).await;

        let response = provider(&base).complete(CompletionRequest::new()).await.unwrap();
        assert_eq!(response.content, "");
    }

    #[tokio::test]
    async fn status_codes_map_to_errors() {
        let router = Router::new()
            .route("/unauthorized/chat/completions", post(|| async { StatusCode::UNAUTHORIZED }))
            .route(
                "/limited/chat/completions",
                post(|| async { (StatusCode::TOO_MANY_REQUESTS, "{}") }),
            )
            .route(
                "/down/chat/completions",
                post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
            );
        let base = serve(router).await;

        let err = provider(&format!("{base}/unauthorized"))
            .complete(CompletionRequest::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AIError::AuthenticationFailed));

        let err = provider(&format!("{base}/limited"))
            .complete(CompletionRequest::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AIError::RateLimited { retry_after_secs: 30 }));

        let err = provider(&format!("{base}/down"))
            .complete(CompletionRequest::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AIError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn embed_returns_first_vector() {
        let router = Router::new().route(
            "/embeddings",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "text-embedding-ada-002");
                assert_eq!(body["input"], "Tenho diabetes");
                Json(json!({"data": [{"embedding": [0.25, -0.5, 1.0]}]}))
            }),
        );
        let base = serve(router).await;

        let vector = provider(&base).embed("Tenho diabetes").await.unwrap();
        assert_eq!(vector, vec![0.25, -0.5, 1.0]);
    }

    #[tokio::test]
    async fn embed_without_data_is_parse_error() {
        let router = Router::new().route("/embeddings", post(|| async { Json(json!({"data": []})) }));
        let base = serve(router).await;

        let err = provider(&base).embed("x").await.unwrap_err();
        assert!(matches!(err, AIError::Parse(_)));
    }
}
