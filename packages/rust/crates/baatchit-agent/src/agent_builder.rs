use std::sync::Arc;

use anyhow::{Result, bail};
use baatchit_agent::{
    Agent, AgentConfig, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT, GROQ_DEFAULT_URL, LlmClient,
    RuntimeSettings, SearchConfig, SessionConfig, SessionStore, TAVILY_DEFAULT_URL,
    TavilySearchClient,
};

use crate::resolve::{resolve_positive_u32, resolve_positive_u64, resolve_string};

/// Resolve config (env > settings > default) and wire store, completion and search clients.
pub(crate) fn build_agent(runtime_settings: &RuntimeSettings) -> Result<Agent> {
    let config = resolve_agent_config(runtime_settings);
    if !config.inference_url.starts_with("http://") && !config.inference_url.starts_with("https://")
    {
        bail!(
            "inference url must be http(s), got `{}` (BAATCHIT_INFERENCE_URL / inference.url)",
            config.inference_url
        );
    }

    let api_key = config.resolve_api_key();
    if api_key.is_none() {
        tracing::warn!("GROQ_API_KEY is not set; completion calls will be rejected upstream");
    }
    let search_key = config.search.resolve_api_key();
    if search_key.is_none() {
        tracing::warn!("TAVILY_API_KEY is not set; web_search will answer with the advisory text");
    }

    let llm = LlmClient::new(
        config.inference_url.clone(),
        config.model.clone(),
        api_key,
    )
    .with_sampling(config.temperature, config.max_tokens)
    .with_timeout(config.completion_timeout());
    let search = TavilySearchClient::new(config.search.endpoint.clone(), search_key)
        .with_max_results(config.search.max_results)
        .with_search_depth(config.search.search_depth.clone())
        .with_timeout(config.search.timeout());
    let store = SessionStore::new(config.session.ttl(), config.system_prompt.as_str());

    tracing::info!(
        inference_url = %config.inference_url,
        model = %config.model,
        max_attempts = config.max_attempts,
        session_ttl_secs = config.session.ttl_secs,
        sweep_interval_secs = config.session.sweep_interval_secs,
        "agent configured"
    );
    Ok(Agent::new(config, store, Arc::new(llm), Arc::new(search)))
}

fn resolve_agent_config(runtime_settings: &RuntimeSettings) -> AgentConfig {
    let inference = &runtime_settings.inference;
    let search = &runtime_settings.search;
    let session = &runtime_settings.session;
    let agent = &runtime_settings.agent;
    let defaults = AgentConfig::default();
    let search_defaults = SearchConfig::default();
    let session_defaults = SessionConfig::default();

    AgentConfig {
        inference_url: resolve_string(
            None,
            "BAATCHIT_INFERENCE_URL",
            inference.url.as_deref(),
            GROQ_DEFAULT_URL,
        ),
        model: resolve_string(None, "BAATCHIT_MODEL", inference.model.as_deref(), DEFAULT_MODEL),
        api_key: None,
        temperature: inference.temperature.unwrap_or(defaults.temperature),
        max_tokens: inference
            .max_tokens
            .filter(|v| *v > 0)
            .unwrap_or(defaults.max_tokens),
        max_attempts: resolve_positive_u32(
            "BAATCHIT_MAX_ATTEMPTS",
            agent.max_attempts,
            defaults.max_attempts,
        ),
        completion_timeout_secs: inference
            .timeout_secs
            .filter(|v| *v > 0)
            .unwrap_or(defaults.completion_timeout_secs),
        system_prompt: agent
            .system_prompt
            .clone()
            .filter(|prompt| !prompt.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        search: SearchConfig {
            endpoint: search
                .endpoint
                .clone()
                .unwrap_or_else(|| TAVILY_DEFAULT_URL.to_string()),
            api_key: None,
            max_results: search
                .max_results
                .unwrap_or(search_defaults.max_results),
            search_depth: search
                .search_depth
                .clone()
                .unwrap_or(search_defaults.search_depth),
            timeout_secs: search
                .timeout_secs
                .filter(|v| *v > 0)
                .unwrap_or(search_defaults.timeout_secs),
        },
        session: SessionConfig {
            ttl_secs: resolve_positive_u64(
                None,
                "BAATCHIT_SESSION_TTL_SECS",
                session.ttl_secs,
                session_defaults.ttl_secs,
            ),
            sweep_interval_secs: resolve_positive_u64(
                None,
                "BAATCHIT_SESSION_SWEEP_SECS",
                session.sweep_interval_secs,
                session_defaults.sweep_interval_secs,
            ),
        },
    }
}
