//! LLM client: OpenAI-compatible chat completions (tool_calls supported).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CompletionError;
use crate::session::{ChatMessage, ToolCallOut};
use crate::tools::ToolDefinition;

/// One assistant reply: final text, requested tool invocations, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AssistantTurn {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCallOut>>,
}

impl AssistantTurn {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: None,
        }
    }

    pub fn tools(calls: Vec<ToolCallOut>) -> Self {
        Self {
            content: None,
            tool_calls: Some(calls),
        }
    }

    /// Requested invocations; any entry makes the turn non-final.
    pub fn invocations(&self) -> &[ToolCallOut] {
        self.tool_calls.as_deref().unwrap_or_default()
    }

    pub fn is_final(&self) -> bool {
        self.invocations().is_empty()
    }

    /// Transcript record of this turn, kept verbatim.
    pub fn to_message(&self) -> ChatMessage {
        ChatMessage::Assistant {
            content: self.content.clone(),
            tool_calls: self.tool_calls.clone().filter(|calls| !calls.is_empty()),
        }
    }
}

/// Completion capability consumed by the orchestration loop. Stateless per call.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// `tools: None` requests a plain completion with no tool schema attached.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<AssistantTurn, CompletionError>;
}

/// Request body for chat completions (OpenAI format).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    temperature: f32,
    max_tokens: u32,
}

/// Response: choices[0].message.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantTurn,
}

/// HTTP client for chat completions.
pub struct LlmClient {
    client: reqwest::Client,
    inference_url: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    max_tokens: u32,
}

impl LlmClient {
    pub fn new(inference_url: String, model: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            inference_url,
            model,
            api_key,
            temperature: 0.7,
            max_tokens: 1000,
        }
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Per-call HTTP timeout; falls back to an untimed client if the builder fails.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        match reqwest::Client::builder().timeout(timeout).build() {
            Ok(client) => self.client = client,
            Err(error) => {
                tracing::warn!(error = %error, "failed to build timed llm http client; keeping default");
            }
        }
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<AssistantTurn, CompletionError> {
        let tools = tools.filter(|list| !list.is_empty());
        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
            tool_choice: tools.map(|_| "auto"),
            tools,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let mut req = self
            .client
            .post(&self.inference_url)
            .json(&body)
            .header("Content-Type", "application/json");
        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }
        tracing::debug!(
            model = %self.model,
            messages = messages.len(),
            with_tools = tools.is_some(),
            "llm request"
        );
        let res = req
            .send()
            .await
            .map_err(|error| CompletionError::Transport(error.to_string()))?;
        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|error| CompletionError::Transport(error.to_string()))?;
        if !status.is_success() {
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body: text.chars().take(500).collect(),
            });
        }
        let parsed: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|error| CompletionError::MalformedResponse(error.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or(CompletionError::EmptyChoices)
    }
}
