//! Config namespace: agent config and runtime settings loading.

mod agent;
mod settings;

pub use agent::{
    AgentConfig, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT, GROQ_DEFAULT_URL, SearchConfig,
    SessionConfig, TAVILY_DEFAULT_URL,
};
pub use settings::{
    AgentSettings, GatewaySettings, InferenceSettings, RuntimeSettings, SearchSettings,
    SessionSettings, load_runtime_settings, load_runtime_settings_from_paths,
    runtime_settings_paths, set_config_home_override,
};
