use baatchit_agent::{DEFAULT_REQUEST_TIMEOUT_SECS, RuntimeSettings, run_stdio};

use crate::agent_builder::build_agent;
use crate::resolve::resolve_positive_u64;

pub(crate) async fn run_stdio_mode(
    session_id: Option<String>,
    runtime_settings: &RuntimeSettings,
) -> anyhow::Result<()> {
    let request_timeout_secs = resolve_positive_u64(
        None,
        "BAATCHIT_REQUEST_TIMEOUT_SECS",
        runtime_settings.gateway.request_timeout_secs,
        DEFAULT_REQUEST_TIMEOUT_SECS,
    );
    let agent = build_agent(runtime_settings)?;
    run_stdio(agent, session_id, request_timeout_secs).await
}
