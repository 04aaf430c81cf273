//! BaatChit chat backend: bounded LLM tool loop with web search, behind an HTTP gateway.
//!
//! - Session store: in-memory transcripts with an idle TTL and a background sweeper.
//! - One turn: user message → completion (+ `web_search` schema) → tool answers → repeat
//!   until a final answer, a no-tools fallback, or the attempt budget runs out.

#![allow(missing_docs)]

mod agent;
mod config;
mod error;
mod gateway;
mod llm;
mod observability;
mod search;
mod session;
mod tools;

pub use agent::{
    APOLOGY_TEXT, Agent, MESSAGE_REQUIRED_TEXT, SEARCH_UNAVAILABLE_TEXT, TurnOutcome,
    TurnTerminal,
};
pub use config::{
    AgentConfig, AgentSettings, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT, GROQ_DEFAULT_URL,
    GatewaySettings, InferenceSettings, RuntimeSettings, SearchConfig, SearchSettings,
    SessionConfig, SessionSettings, TAVILY_DEFAULT_URL, load_runtime_settings,
    load_runtime_settings_from_paths, runtime_settings_paths, set_config_home_override,
};
pub use error::{
    ChatError, CompletionError, SERVICE_UNAVAILABLE_TEXT, SearchError, ToolArgumentError,
};
pub use gateway::{
    CacheStatsResponse, ChatRequest, ChatResponse, DEFAULT_REQUEST_TIMEOUT_SECS, ErrorResponse,
    GatewayState, HealthResponse, ResetResponse, router, run_http, run_stdio,
    validate_chat_request,
};
pub use llm::{AssistantTurn, CompletionBackend, LlmClient};
pub use observability::{SessionEvent, short_session_id};
pub use search::{MAX_SEARCH_RESULTS, SearchBackend, TavilySearchClient};
pub use session::{
    ChatMessage, FunctionCall, Session, SessionGate, SessionGuard, SessionStore,
    SessionStoreStats, SweeperHandle, ToolCallOut, new_session_id,
};
pub use tools::{
    FunctionDefinition, ToolDefinition, ToolInvocation, ToolKind, WEB_SEARCH_TOOL_NAME,
    WebSearchArgs, declared_tools, parse_invocation,
};
