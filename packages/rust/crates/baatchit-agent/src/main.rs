//! baatchit-agent CLI: HTTP gateway or stdio mode.
//!
//! Settings from `packages/conf/settings.yaml` merged with `<conf>/baatchit/settings.yaml`;
//! environment variables (`GROQ_API_KEY`, `TAVILY_API_KEY`, `BAATCHIT_*`, `PORT`) win over both.
//!
//! Logging: set `RUST_LOG=baatchit_agent=info` (or `warn`, `debug`) to see agent logs on stderr.

mod agent_builder;
mod cli;
mod nodes;
mod resolve;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use baatchit_agent::{load_runtime_settings, set_config_home_override};

use crate::cli::{Cli, Command};
use crate::nodes::{run_gateway_mode, run_stdio_mode};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG overrides; --verbose => debug; else info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "baatchit_agent=debug"
        } else {
            "baatchit_agent=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    if let Some(conf_dir) = cli.conf.clone() {
        set_config_home_override(conf_dir);
    }
    let runtime_settings = load_runtime_settings();

    match cli.command {
        Command::Gateway {
            bind,
            port,
            request_timeout,
            max_concurrent,
        } => {
            run_gateway_mode(
                bind,
                port,
                request_timeout,
                max_concurrent,
                &runtime_settings,
            )
            .await
        }
        Command::Stdio { session_id } => run_stdio_mode(session_id, &runtime_settings).await,
    }
}
