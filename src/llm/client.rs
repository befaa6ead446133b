//! Chat client used by the translator
//!
//! Speaks the Anthropic messages API or any OpenAI-compatible chat
//! completions endpoint, picked from the URL. Requests are single-turn,
//! temperature 0, and capped at a small token budget; the only expected
//! reply is one JSON object.

use crate::core::error::{DispatchError, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Enough for a single `{instruction, params}` object
const MAX_TOKENS: u32 = 150;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

impl ApiFormat {
    fn for_url(url: &str) -> Self {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            ApiFormat::OpenAI
        }
    }
}

pub struct LlmClient {
    http: Client,
    api_key: String,
    api_url: String,
    model: String,
    format: ApiFormat,
}

impl LlmClient {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            http: Client::new(),
            format: ApiFormat::for_url(&api_url),
            api_key,
            api_url,
            model,
        }
    }

    /// Build a client from `LLM_API_KEY` (or `OPENAI_API_KEY`), `LLM_API_URL`
    /// and `LLM_MODEL`
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("LLM_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .map_err(|_| DispatchError::LlmError("LLM_API_KEY not set".into()))?;
        let api_url = std::env::var("LLM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        Ok(Self::new(api_key, api_url, model))
    }

    /// Send one system + user exchange and return the reply text
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        tracing::debug!(model = %self.model, format = ?self.format, "llm request");
        let request = ChatRequest::new(self.format, &self.model, system, user);
        let builder = self.http.post(&self.api_url).json(&request);

        let text = match self.format {
            ApiFormat::Anthropic => {
                let reply: AnthropicReply = send(
                    builder
                        .header("x-api-key", &self.api_key)
                        .header("anthropic-version", ANTHROPIC_VERSION),
                )
                .await?;
                reply.content.into_iter().next().map(|block| block.text)
            }
            ApiFormat::OpenAI => {
                let reply: OpenAIReply = send(builder.bearer_auth(&self.api_key)).await?;
                reply.choices.into_iter().next().map(|choice| choice.message.content)
            }
        };
        text.ok_or_else(|| DispatchError::LlmError("Empty response".into()))
    }
}

async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T> {
    let response = builder
        .send()
        .await
        .map_err(|e| DispatchError::LlmError(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(DispatchError::LlmError(format!(
            "API error ({}): {}",
            status, error_text
        )));
    }

    response
        .json()
        .await
        .map_err(|e| DispatchError::LlmError(e.to_string()))
}

/// Request body shared by both formats; Anthropic carries the system prompt
/// as a top-level field, OpenAI as the first message.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
}

impl<'a> ChatRequest<'a> {
    fn new(format: ApiFormat, model: &'a str, system: &'a str, user: &'a str) -> Self {
        let user = Message {
            role: "user",
            content: user,
        };
        let (system, messages) = match format {
            ApiFormat::Anthropic => (Some(system), vec![user]),
            ApiFormat::OpenAI => (
                None,
                vec![
                    Message {
                        role: "system",
                        content: system,
                    },
                    user,
                ],
            ),
        };
        Self {
            model,
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
            system,
            messages,
        }
    }
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct AnthropicReply {
    content: Vec<TextBlock>,
}

#[derive(Deserialize)]
struct TextBlock {
    text: String,
}

#[derive(Deserialize)]
struct OpenAIReply {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}
