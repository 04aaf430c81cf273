//! Gateway namespace: HTTP and stdio entrypoints.

mod http;
mod stdio;

pub use http::{
    CacheStatsResponse, ChatRequest, ChatResponse, DEFAULT_REQUEST_TIMEOUT_SECS, ErrorResponse,
    GatewayState, HealthResponse, ResetResponse, router, run_http, validate_chat_request,
};
pub use stdio::run_stdio;
