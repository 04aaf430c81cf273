use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "baatchit-agent")]
#[command(about = "BaatChit chat backend: LLM + web search tool loop. HTTP gateway or stdio.")]
pub(crate) struct Cli {
    /// Override config directory (user settings live in `<DIR>/baatchit/settings.yaml`).
    #[arg(long, global = true)]
    pub(crate) conf: Option<PathBuf>,

    /// Debug-level logs unless RUST_LOG is set.
    #[arg(long, global = true)]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run HTTP server (POST /chat, GET /health). Default bind: 0.0.0.0:8000
    Gateway {
        /// Listen address (e.g. 0.0.0.0:8000)
        #[arg(long, conflicts_with = "port")]
        bind: Option<String>,

        /// Listen port on all interfaces (env: PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Wall-clock budget per chat turn in seconds (default: 120)
        #[arg(long)]
        request_timeout: Option<u64>,

        /// Max concurrent chat turns (omit for no limit)
        #[arg(long)]
        max_concurrent: Option<usize>,
    },
    /// Read lines from stdin, run turn, print reply. Exit on EOF or Ctrl+C.
    Stdio {
        /// Session to resume; a new one is created when absent or expired.
        #[arg(long)]
        session_id: Option<String>,
    },
}
