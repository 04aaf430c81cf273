//! Tool dispatch for one assistant turn: every invocation is answered by exactly one
//! tool message, in the order the invocations were requested.

use futures::future::join_all;

use crate::observability::SessionEvent;
use crate::search::SearchBackend;
use crate::session::{ChatMessage, ToolCallOut};
use crate::tools::{ToolInvocation, ToolKind, parse_invocation};

/// Tool content substituted when the search capability fails.
pub const SEARCH_UNAVAILABLE_TEXT: &str =
    "Search is currently unavailable. I'll provide an answer based on my existing knowledge instead.";

const EMPTY_SEARCH_TEXT: &str = "No search results were found for this query.";

/// Answers for one batch of invocations.
pub(super) struct DispatchReport {
    pub messages: Vec<ChatMessage>,
    /// Registered capabilities that were invoked (deduplicated, registry order).
    pub used: Vec<ToolKind>,
}

pub(super) fn unsupported_capability_text(name: &str) -> String {
    format!("Capability `{name}` is not available. Answer from existing knowledge instead.")
}

fn invalid_arguments_text(kind: ToolKind, error: &impl std::fmt::Display) -> String {
    format!(
        "Invalid arguments for `{}`: {error}. Answer from existing knowledge instead.",
        kind.as_str()
    )
}

/// Run all invocations concurrently and join before returning.
pub(super) async fn dispatch_invocations(
    search: &dyn SearchBackend,
    session_id: &str,
    calls: &[ToolCallOut],
) -> DispatchReport {
    let answers = join_all(
        calls
            .iter()
            .map(|call| answer_invocation(search, session_id, call)),
    )
    .await;

    let mut used = Vec::new();
    let mut messages = Vec::with_capacity(answers.len());
    for (message, kind) in answers {
        if let Some(kind) = kind
            && !used.contains(&kind)
        {
            used.push(kind);
        }
        messages.push(message);
    }
    DispatchReport { messages, used }
}

async fn answer_invocation(
    search: &dyn SearchBackend,
    session_id: &str,
    call: &ToolCallOut,
) -> (ChatMessage, Option<ToolKind>) {
    let name = call.function.name.as_str();
    match parse_invocation(call) {
        ToolInvocation::WebSearch(args) => {
            tracing::debug!(
                event = SessionEvent::ToolDispatched.as_str(),
                session_id,
                tool_name = name,
                tool_call_id = %call.id,
                query = %args.query,
                "tool dispatched"
            );
            let content = match search.search(&args.query).await {
                Ok(digest) if digest.trim().is_empty() => EMPTY_SEARCH_TEXT.to_string(),
                Ok(digest) => {
                    tracing::debug!(
                        event = SessionEvent::ToolSucceeded.as_str(),
                        session_id,
                        tool_name = name,
                        tool_call_id = %call.id,
                        chars = digest.len(),
                        "tool succeeded"
                    );
                    digest
                }
                Err(error) => {
                    tracing::warn!(
                        event = SessionEvent::ToolFailed.as_str(),
                        session_id,
                        tool_name = name,
                        tool_call_id = %call.id,
                        error = %error,
                        "search failed; answering with advisory"
                    );
                    SEARCH_UNAVAILABLE_TEXT.to_string()
                }
            };
            (
                ChatMessage::tool_result(&call.id, ToolKind::WebSearch.as_str(), content),
                Some(ToolKind::WebSearch),
            )
        }
        ToolInvocation::InvalidArguments { kind, error } => {
            tracing::warn!(
                event = SessionEvent::ToolInvalidArguments.as_str(),
                session_id,
                tool_name = name,
                tool_call_id = %call.id,
                error = %error,
                "tool arguments rejected"
            );
            (
                ChatMessage::tool_result(&call.id, kind.as_str(), invalid_arguments_text(kind, &error)),
                Some(kind),
            )
        }
        ToolInvocation::Unsupported { name } => {
            tracing::warn!(
                event = SessionEvent::ToolUnsupported.as_str(),
                session_id,
                tool_name = %name,
                tool_call_id = %call.id,
                "unsupported capability requested"
            );
            let content = unsupported_capability_text(&name);
            (ChatMessage::tool_result(&call.id, name, content), None)
        }
    }
}
