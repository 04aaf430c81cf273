//! Conversation state owned by the session store.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use super::message::ChatMessage;

/// One conversation: transcript seeded with the system prompt plus bookkeeping.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub messages: Vec<ChatMessage>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    /// New session whose transcript holds exactly the system message.
    pub fn new(id: impl Into<String>, system_prompt: &str) -> Self {
        Self {
            id: id.into(),
            messages: vec![ChatMessage::system(system_prompt)],
            last_activity: Utc::now(),
        }
    }

    /// Transcript length excluding the system message.
    pub fn conversation_length(&self) -> usize {
        self.messages.len().saturating_sub(1)
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Structural check of the transcript:
    /// - `messages[0]` is the only system message;
    /// - every tool message answers the next outstanding invocation of the
    ///   closest preceding assistant message, in request order;
    /// - no invocation is left unanswered when a non-tool message follows.
    pub fn is_well_formed(&self) -> bool {
        let mut iter = self.messages.iter();
        if !matches!(iter.next(), Some(ChatMessage::System { .. })) {
            return false;
        }
        let mut pending: VecDeque<&str> = VecDeque::new();
        for message in iter {
            match message {
                ChatMessage::System { .. } => return false,
                ChatMessage::Tool { tool_call_id, .. } => {
                    if pending.pop_front() != Some(tool_call_id.as_str()) {
                        return false;
                    }
                }
                ChatMessage::User { .. } | ChatMessage::Assistant { .. } => {
                    if !pending.is_empty() {
                        return false;
                    }
                    pending.extend(message.tool_calls().iter().map(|call| call.id.as_str()));
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ToolCallOut;

    fn tool_request(ids: &[&str]) -> ChatMessage {
        ChatMessage::Assistant {
            content: None,
            tool_calls: Some(
                ids.iter()
                    .map(|id| ToolCallOut::function(*id, "web_search", "{}"))
                    .collect(),
            ),
        }
    }

    #[test]
    fn new_session_holds_only_system_message() {
        let session = Session::new("s", "be nice");
        assert_eq!(session.messages, vec![ChatMessage::system("be nice")]);
        assert_eq!(session.conversation_length(), 0);
        assert!(session.is_well_formed());
    }

    #[test]
    fn answered_invocations_in_order_are_well_formed() {
        let mut session = Session::new("s", "sys");
        session.push(ChatMessage::user("q"));
        session.push(tool_request(&["a", "b"]));
        session.push(ChatMessage::tool_result("a", "web_search", "x"));
        session.push(ChatMessage::tool_result("b", "web_search", "y"));
        session.push(ChatMessage::assistant("done"));
        assert!(session.is_well_formed());
        assert_eq!(session.conversation_length(), 5);
    }

    #[test]
    fn out_of_order_or_missing_answers_are_rejected() {
        let mut swapped = Session::new("s", "sys");
        swapped.push(ChatMessage::user("q"));
        swapped.push(tool_request(&["a", "b"]));
        swapped.push(ChatMessage::tool_result("b", "web_search", "y"));
        swapped.push(ChatMessage::tool_result("a", "web_search", "x"));
        assert!(!swapped.is_well_formed());

        let mut unanswered = Session::new("s", "sys");
        unanswered.push(ChatMessage::user("q"));
        unanswered.push(tool_request(&["a"]));
        unanswered.push(ChatMessage::assistant("skipped"));
        assert!(!unanswered.is_well_formed());
    }

    #[test]
    fn second_system_message_is_rejected() {
        let mut session = Session::new("s", "sys");
        session.push(ChatMessage::system("again"));
        assert!(!session.is_well_formed());
    }
}
