//! Agent configuration: inference API, model, sampling, search and session lifetimes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Groq's OpenAI-compatible chat completions endpoint.
pub const GROQ_DEFAULT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const TAVILY_DEFAULT_URL: &str = "https://api.tavily.com/search";

/// Built-in system message seeded into every new transcript.
pub const DEFAULT_SYSTEM_PROMPT: &str = include_str!("system_prompt.md").trim_ascii_end();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Chat completions endpoint.
    #[serde(default = "default_inference_url")]
    pub inference_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// API key; if None, read from env `GROQ_API_KEY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Completion calls allowed per user turn before the apology is returned.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Per-call HTTP timeout for the completion endpoint, in seconds.
    #[serde(default = "default_completion_timeout_secs")]
    pub completion_timeout_secs: u64,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Web search provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
    /// API key; if None, read from env `TAVILY_API_KEY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Snippets per query; clamped to 1..=3 by the client.
    #[serde(default = "default_search_max_results")]
    pub max_results: usize,
    #[serde(default = "default_search_depth")]
    pub search_depth: String,
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
}

/// Session lifetime settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Idle time after which a session is forgotten.
    #[serde(default = "default_session_ttl_secs")]
    pub ttl_secs: u64,
    /// Period of the background eviction sweep.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_inference_url() -> String {
    GROQ_DEFAULT_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_max_attempts() -> u32 {
    10
}

fn default_completion_timeout_secs() -> u64 {
    60
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_search_endpoint() -> String {
    TAVILY_DEFAULT_URL.to_string()
}

fn default_search_max_results() -> usize {
    3
}

fn default_search_depth() -> String {
    "basic".to_string()
}

fn default_search_timeout_secs() -> u64 {
    15
}

fn default_session_ttl_secs() -> u64 {
    3600
}

fn default_sweep_interval_secs() -> u64 {
    600
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            inference_url: default_inference_url(),
            model: default_model(),
            api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_attempts: default_max_attempts(),
            completion_timeout_secs: default_completion_timeout_secs(),
            system_prompt: default_system_prompt(),
            search: SearchConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            api_key: None,
            max_results: default_search_max_results(),
            search_depth: default_search_depth(),
            timeout_secs: default_search_timeout_secs(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_session_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl AgentConfig {
    /// Resolve API key: explicit config first, then `GROQ_API_KEY`.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref k) = self.api_key {
            return Some(k.clone());
        }
        if self.inference_url.contains("127.0.0.1") || self.inference_url.contains("localhost") {
            return None;
        }
        non_empty_env("GROQ_API_KEY")
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs.max(1))
    }
}

impl SearchConfig {
    /// Resolve API key: explicit config first, then `TAVILY_API_KEY`.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| non_empty_env("TAVILY_API_KEY"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
