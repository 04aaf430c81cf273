//! Stdio gateway: read line from stdin → run agent turn → print reply.

use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::agent::Agent;
use crate::error::ChatError;

/// Run stdio loop: read lines, run turn, print reply. Exits on EOF or Ctrl+C.
///
/// * `agent`: the agent instance
/// * `session_id`: session to resume (e.g. from `--session-id`); replaced by the
///   id the store hands back, so later lines continue the same conversation
/// * `request_timeout_secs`: wall-clock budget per line, same as one HTTP turn
pub async fn run_stdio(
    agent: Agent,
    session_id: Option<String>,
    request_timeout_secs: u64,
) -> Result<()> {
    let budget = Duration::from_secs(request_timeout_secs.max(1));
    let mut session_id = session_id;
    let mut reader = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = reader.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match agent
            .run_turn_within(session_id.as_deref(), line, budget)
            .await
        {
            Ok(outcome) => {
                if session_id.as_deref() != Some(outcome.session_id.as_str()) {
                    eprintln!("session: {}", outcome.session_id);
                }
                println!("{}", outcome.reply);
                session_id = Some(outcome.session_id);
            }
            Err(error @ ChatError::ServiceUnavailable(_)) => {
                eprintln!("{}", error.user_message());
            }
            Err(error) => return Err(error.into()),
        }
    }
    Ok(())
}
