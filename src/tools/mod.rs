//! The closed tool set callable by the flows.
//!
//! Tool dispatch is a tagged enum over the three known tools, matched
//! exhaustively; an unknown tool name from the model is an input error, not a
//! lookup miss.

use crate::types::{AppError, Result, SearchTopic, ToolCall, ToolDefinition};
use serde::Deserialize;
use serde_json::json;

pub const WEB_SEARCH: &str = "web_search";
pub const REFLECT: &str = "reflect";
pub const DELEGATE_RESEARCH: &str = "delegate_research";

/// A parsed, validated tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    /// Record a strategic note; pure echo, always succeeds.
    Reflect { reflection: String },
    /// Dispatch one researcher on a sub-topic.
    DelegateResearch { research_topic: String },
    /// Run a batch of web queries through the aggregator.
    WebSearch {
        queries: Vec<String>,
        max_results: Option<usize>,
        topic: Option<SearchTopic>,
    },
}

#[derive(Deserialize)]
struct ReflectArgs {
    reflection: String,
}

#[derive(Deserialize)]
struct DelegateArgs {
    research_topic: String,
}

#[derive(Deserialize)]
struct WebSearchArgs {
    queries: Vec<String>,
    #[serde(default)]
    max_results: Option<usize>,
    #[serde(default)]
    topic: Option<SearchTopic>,
}

impl ToolRequest {
    /// Parse a model-emitted tool call into the closed set.
    pub fn parse(call: &ToolCall) -> Result<Self> {
        match call.name.as_str() {
            REFLECT => {
                let args: ReflectArgs = parse_args(call)?;
                Ok(ToolRequest::Reflect {
                    reflection: args.reflection,
                })
            }
            DELEGATE_RESEARCH => {
                let args: DelegateArgs = parse_args(call)?;
                if args.research_topic.trim().is_empty() {
                    return Err(AppError::InvalidInput(
                        "delegate_research requires a non-empty research_topic".to_string(),
                    ));
                }
                Ok(ToolRequest::DelegateResearch {
                    research_topic: args.research_topic,
                })
            }
            WEB_SEARCH => {
                let args: WebSearchArgs = parse_args(call)?;
                Ok(ToolRequest::WebSearch {
                    queries: args.queries,
                    max_results: args.max_results,
                    topic: args.topic,
                })
            }
            other => Err(AppError::InvalidInput(format!(
                "Unknown tool requested by model: {other}"
            ))),
        }
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(call: &ToolCall) -> Result<T> {
    serde_json::from_value(call.arguments.clone()).map_err(|e| {
        AppError::InvalidInput(format!("Bad arguments for tool '{}': {e}", call.name))
    })
}

/// Execute the reflect tool. Pure echo; never fails.
pub fn run_reflect(reflection: &str) -> String {
    format!("Reflection recorded: {reflection}")
}

/// Tool set bound to researcher model calls.
pub fn researcher_tools() -> Vec<ToolDefinition> {
    vec![web_search_definition(), reflect_definition()]
}

/// Tool set bound to supervisor model calls.
pub fn supervisor_tools() -> Vec<ToolDefinition> {
    vec![reflect_definition(), delegate_research_definition()]
}

fn reflect_definition() -> ToolDefinition {
    ToolDefinition {
        name: REFLECT.to_string(),
        description: "Record strategic reflection on research progress: what was found, \
                      what is missing, and whether to continue or stop."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "reflection": {
                    "type": "string",
                    "description": "Detailed analysis of findings, gaps, and next steps"
                }
            },
            "required": ["reflection"]
        }),
    }
}

fn delegate_research_definition() -> ToolDefinition {
    ToolDefinition {
        name: DELEGATE_RESEARCH.to_string(),
        description: "Delegate one research sub-topic to a researcher. The sub-topic must \
                      be a single topic, described in detail (at least a paragraph)."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "research_topic": {
                    "type": "string",
                    "description": "The sub-topic to research, described in detail"
                }
            },
            "required": ["research_topic"]
        }),
    }
}

fn web_search_definition() -> ToolDefinition {
    ToolDefinition {
        name: WEB_SEARCH.to_string(),
        description: "Search the web and receive a digest of summarized sources.".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "queries": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Search queries to run as one batch"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum results per query"
                },
                "topic": {
                    "type": "string",
                    "enum": ["general", "news", "finance"],
                    "description": "Search topic category"
                }
            },
            "required": ["queries"]
        }),
    }
}
