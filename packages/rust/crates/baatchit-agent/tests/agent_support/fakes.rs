use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use baatchit_agent::{
    Agent, AgentConfig, AssistantTurn, ChatMessage, CompletionBackend, CompletionError,
    SearchBackend, SearchError, SessionStore, ToolCallOut, ToolDefinition,
};

pub const TEST_SYSTEM_PROMPT: &str = "You are a test assistant.";

type Reply = Result<AssistantTurn, CompletionError>;
type ReplyFn = Box<dyn Fn(usize) -> Reply + Send + Sync>;
type SearchFn = Box<dyn Fn(&str) -> Result<String, SearchError> + Send + Sync>;

/// One observed completion request.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<ChatMessage>,
    pub with_tools: bool,
}

/// Completion backend that replays a script, then falls back to `after_script`.
pub struct ScriptedCompletion {
    script: Mutex<VecDeque<Reply>>,
    after_script: ReplyFn,
    calls: Mutex<Vec<RecordedCall>>,
    delay: Duration,
}

impl ScriptedCompletion {
    pub fn new(script: Vec<Reply>) -> Self {
        Self::with_tail(script, |_| {
            Err(CompletionError::Transport("script exhausted".to_string()))
        })
    }

    /// Replay `script`, then answer every further call with `tail(call_index)`.
    pub fn with_tail(
        script: Vec<Reply>,
        tail: impl Fn(usize) -> Reply + Send + Sync + 'static,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            after_script: Box::new(tail),
            calls: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    /// Every call returns `tail(call_index)`.
    pub fn always(tail: impl Fn(usize) -> Reply + Send + Sync + 'static) -> Self {
        Self::with_tail(Vec::new(), tail)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedCompletion {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<AssistantTurn, CompletionError> {
        let index = {
            let mut calls = self.calls.lock().expect("calls lock");
            calls.push(RecordedCall {
                messages: messages.to_vec(),
                with_tools: tools.is_some_and(|list| !list.is_empty()),
            });
            calls.len() - 1
        };
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let scripted = self.script.lock().expect("script lock").pop_front();
        scripted.unwrap_or_else(|| (self.after_script)(index))
    }
}

/// Search backend answering through a closure, with optional per-query delay.
pub struct ScriptedSearch {
    answer: SearchFn,
    delay_for: Box<dyn Fn(&str) -> Duration + Send + Sync>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedSearch {
    pub fn new(answer: impl Fn(&str) -> Result<String, SearchError> + Send + Sync + 'static) -> Self {
        Self {
            answer: Box::new(answer),
            delay_for: Box::new(|_| Duration::ZERO),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn echo() -> Self {
        Self::new(|query| Ok(format!("Result: snippet for {query}")))
    }

    pub fn failing() -> Self {
        Self::new(|_| Err(SearchError::Status { status: 432 }))
    }

    pub fn with_delay_for(
        mut self,
        delay_for: impl Fn(&str) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.delay_for = Box::new(delay_for);
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().expect("queries lock").clone()
    }
}

#[async_trait]
impl SearchBackend for ScriptedSearch {
    async fn search(&self, query: &str) -> Result<String, SearchError> {
        self.queries
            .lock()
            .expect("queries lock")
            .push(query.to_string());
        let delay = (self.delay_for)(query);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        (self.answer)(query)
    }
}

pub fn search_call(id: &str, query: &str) -> ToolCallOut {
    ToolCallOut::function(
        id,
        "web_search",
        serde_json::json!({ "query": query }).to_string(),
    )
}

pub fn store_with_ttl(ttl: Duration) -> SessionStore {
    SessionStore::new(ttl, TEST_SYSTEM_PROMPT)
}

pub fn agent_with(
    completion: &Arc<ScriptedCompletion>,
    search: &Arc<ScriptedSearch>,
    store: SessionStore,
) -> Agent {
    let config = AgentConfig {
        system_prompt: TEST_SYSTEM_PROMPT.to_string(),
        ..AgentConfig::default()
    };
    Agent::new(config, store, completion.clone(), search.clone())
}
