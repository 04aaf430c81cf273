//! Closed tool registry: declared schemas and argument validation.
//!
//! The model only ever sees [`declared_tools`]; whatever it asks for is routed
//! through [`parse_invocation`] so every request maps to exactly one branch.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ToolArgumentError;
use crate::session::ToolCallOut;

pub const WEB_SEARCH_TOOL_NAME: &str = "web_search";

const WEB_SEARCH_DESCRIPTION: &str = "Search the web for CURRENT, REAL-TIME information only. \
Use this tool ONLY when you need live data that changes frequently, such as: current weather \
conditions (today's actual weather), live stock/crypto prices, breaking news from the last few \
days, current sports scores. Do NOT use for general knowledge, historical data, programming \
questions, or information you can provide from training data.";

/// Capabilities the loop knows how to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    WebSearch,
}

impl ToolKind {
    pub const ALL: [Self; 1] = [Self::WebSearch];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::WebSearch => WEB_SEARCH_TOOL_NAME,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    pub fn definition(self) -> ToolDefinition {
        match self {
            Self::WebSearch => ToolDefinition::function(
                WEB_SEARCH_TOOL_NAME,
                WEB_SEARCH_DESCRIPTION,
                json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Specific search query for current/real-time information"
                        }
                    },
                    "required": ["query"]
                }),
            ),
        }
    }
}

/// Tool schema in chat-completions format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub typ: &'static str,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    fn function(
        name: &'static str,
        description: &'static str,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            typ: "function",
            function: FunctionDefinition {
                name,
                description,
                parameters,
            },
        }
    }
}

/// Every registered capability's schema, in registry order.
pub fn declared_tools() -> Vec<ToolDefinition> {
    ToolKind::ALL.into_iter().map(ToolKind::definition).collect()
}

/// Validated `web_search` arguments.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebSearchArgs {
    pub query: String,
}

impl WebSearchArgs {
    pub fn parse(raw: &str) -> Result<Self, ToolArgumentError> {
        let raw = if raw.trim().is_empty() { "{}" } else { raw };
        let args: RawWebSearchArgs = serde_json::from_str(raw)
            .map_err(|error| ToolArgumentError::InvalidJson(error.to_string()))?;
        let query = args
            .query
            .map(|query| query.trim().to_string())
            .filter(|query| !query.is_empty())
            .ok_or(ToolArgumentError::EmptyQuery)?;
        Ok(Self { query })
    }
}

#[derive(Deserialize)]
struct RawWebSearchArgs {
    #[serde(default)]
    query: Option<String>,
}

/// Routing decision for one requested invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInvocation {
    WebSearch(WebSearchArgs),
    InvalidArguments {
        kind: ToolKind,
        error: ToolArgumentError,
    },
    Unsupported {
        name: String,
    },
}

pub fn parse_invocation(call: &ToolCallOut) -> ToolInvocation {
    match ToolKind::from_name(&call.function.name) {
        Some(ToolKind::WebSearch) => match WebSearchArgs::parse(&call.function.arguments) {
            Ok(args) => ToolInvocation::WebSearch(args),
            Err(error) => ToolInvocation::InvalidArguments {
                kind: ToolKind::WebSearch,
                error,
            },
        },
        None => ToolInvocation::Unsupported {
            name: call.function.name.clone(),
        },
    }
}
