use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::LlmError;

/// System message sent ahead of every prompt.
pub const SYSTEM_PROMPT: &str = "You are a knowledgeable and professional financial assistant. Your role is to provide helpful advice and recommendations on personal finance topics such as budgeting, saving, investing, retirement planning, tax strategies, and more. You have access to a financial API that can provide real-time stock prices, company information, and market data. Always aim to provide actionable and practical guidance tailored to the user's specific situation.";

/// Text chunks in arrival order. Finite, and not restartable.
pub type ChunkStream = BoxStream<'static, Result<String, LlmError>>;

/// Configuration for LLM service
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "nvidia".to_string(),
            api_key: None,
            base_url: "https://integrate.api.nvidia.com/v1".to_string(),
            model: "meta/llama3-8b-instruct".to_string(),
            max_tokens: 1024,
            temperature: 0.5,
        }
    }
}

impl LlmConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            provider: std::env::var("LLM_PROVIDER").unwrap_or(defaults.provider),
            api_key: std::env::var("NVIDIA_API_KEY").ok(),
            base_url: std::env::var("LLM_BASE_URL").unwrap_or(defaults.base_url),
            model: std::env::var("LLM_MODEL").unwrap_or(defaults.model),
            max_tokens: std::env::var("LLM_MAX_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_tokens),
            temperature: std::env::var("LLM_TEMPERATURE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.temperature),
        }
    }
}

/// Produces narrative text for a prompt as a stream of chunks.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, prompt: String) -> Result<ChunkStream, LlmError>;
}

/// Drain a generator's stream, concatenating chunks in arrival order.
pub async fn collect_narrative(
    generator: &dyn NarrativeGenerator,
    prompt: String,
) -> Result<String, LlmError> {
    let mut chunks = generator.generate(prompt).await?;
    let mut text = String::new();
    while let Some(chunk) = chunks.next().await {
        text.push_str(&chunk?);
    }
    Ok(text)
}

/// OpenAI-compatible chat completion request/response structures
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChatChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChunkChoice {
    #[serde(default)]
    delta: ChatDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChatDelta {
    content: Option<String>,
}

/// Splits a server-sent event byte stream into the content deltas of chat
/// completion chunks. Lines can arrive split across network reads, so
/// partial lines are buffered until their newline shows up.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<String>, LlmError> {
        self.buffer.extend_from_slice(bytes);
        let mut deltas = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim();

            let Some(data) = line.strip_prefix("data:") else {
                continue;
            };
            let data = data.trim();

            if self.done || data.is_empty() {
                continue;
            }
            if data == "[DONE]" {
                self.done = true;
                continue;
            }

            let chunk: ChatChunk = serde_json::from_str(data)
                .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
            deltas.extend(
                chunk
                    .choices
                    .into_iter()
                    .filter_map(|c| c.delta.content)
                    .filter(|c| !c.is_empty()),
            );
        }

        Ok(deltas)
    }

    /// Flush a final line the server sent without a trailing newline.
    pub fn finish(&mut self) -> Result<Vec<String>, LlmError> {
        if self.buffer.is_empty() {
            return Ok(Vec::new());
        }
        self.push(b"\n")
    }
}

/// NVIDIA-hosted (OpenAI-compatible) chat completion provider
pub struct NvidiaProvider {
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: usize,
    temperature: f32,
    client: Client,
}

impl NvidiaProvider {
    pub fn new(config: &LlmConfig, api_key: String) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            client,
        }
    }
}

#[async_trait]
impl NarrativeGenerator for NvidiaProvider {
    async fn generate(&self, prompt: String) -> Result<ChunkStream, LlmError> {
        info!(
            "Streaming LLM completion (model: {}, prompt: {} chars)",
            self.model,
            prompt.len()
        );

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: true,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "text/event-stream")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::ApiError(format!("HTTP {}: {}", status, error_text)));
        }

        let mut decoder = SseDecoder::default();
        // `None` marks the end of the body so the decoder can flush.
        let chunks = response
            .bytes_stream()
            .map(Some)
            .chain(stream::once(async { None }))
            .map(move |item| match item {
                Some(Ok(bytes)) => decoder.push(&bytes),
                Some(Err(e)) => Err(LlmError::NetworkError(e.to_string())),
                None => decoder.finish(),
            })
            .map_ok(|deltas| stream::iter(deltas.into_iter().map(Ok::<String, LlmError>)))
            .try_flatten()
            .boxed();

        Ok(chunks)
    }
}

/// LLM service with provider selection. Without an API key every call
/// fails with [`LlmError::Disabled`].
pub struct LlmService {
    provider: Option<Arc<dyn NarrativeGenerator>>,
}

impl LlmService {
    pub fn new(config: LlmConfig) -> Self {
        let provider = match config.api_key.as_deref() {
            Some(key) if !key.is_empty() => match config.provider.as_str() {
                "nvidia" | "openai-compatible" => {
                    info!(
                        "Initializing LLM service with provider: {} ({})",
                        config.provider, config.model
                    );
                    Some(Arc::new(NvidiaProvider::new(&config, key.to_string()))
                        as Arc<dyn NarrativeGenerator>)
                }
                other => {
                    warn!("Unknown LLM provider: {}. LLM features disabled.", other);
                    None
                }
            },
            Some(_) => {
                warn!("LLM API key is empty. LLM features disabled.");
                None
            }
            None => {
                warn!("NVIDIA_API_KEY not configured. LLM features disabled.");
                None
            }
        };

        Self { provider }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }
}

#[async_trait]
impl NarrativeGenerator for LlmService {
    async fn generate(&self, prompt: String) -> Result<ChunkStream, LlmError> {
        let provider = self.provider.as_ref().ok_or(LlmError::Disabled)?;
        provider.generate(prompt).await
    }
}
