use baatchit_agent::{DEFAULT_REQUEST_TIMEOUT_SECS, RuntimeSettings, run_http};

use crate::agent_builder::build_agent;
use crate::resolve::{resolve_bind_addr, resolve_positive_u64};

pub(crate) async fn run_gateway_mode(
    bind: Option<String>,
    port: Option<u16>,
    request_timeout: Option<u64>,
    max_concurrent: Option<usize>,
    runtime_settings: &RuntimeSettings,
) -> anyhow::Result<()> {
    let gateway = &runtime_settings.gateway;
    let bind_addr = resolve_bind_addr(bind, port, gateway.bind.as_deref());
    let request_timeout_secs = resolve_positive_u64(
        request_timeout,
        "BAATCHIT_REQUEST_TIMEOUT_SECS",
        gateway.request_timeout_secs,
        DEFAULT_REQUEST_TIMEOUT_SECS,
    );
    let max_concurrent = max_concurrent.or(gateway.max_concurrent).filter(|n| *n > 0);
    let agent = build_agent(runtime_settings)?;
    run_http(agent, &bind_addr, Some(request_timeout_secs), max_concurrent).await
}
