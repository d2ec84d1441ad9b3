//! Scribe core library.
//! Project state, phase personas, writing tools, and the agent that turns a chat message
//! into a reply plus an updated project.

pub mod agent;
pub mod config;
pub mod context;
pub mod error;
pub mod llm;
pub mod phase;
pub mod project;
pub mod tools;

pub use agent::{AgentOptions, WritingAgent, FALLBACK_REPLY, ITERATION_LIMIT_REPLY};
pub use config::{LlmMode, ScribeConfig};
pub use context::{build_context, full_context, summary_context, ContextMode};
pub use error::{AgentError, LlmError, ProjectError, ToolError};
pub use llm::{ChatModel, CompletionRequest, LlmMessage, MockChatModel, ModelTurn, OpenAiClient, ToolCall};
pub use phase::{Phase, PhasePrompts};
pub use project::{ChatMessage, IdeaRecord, Project, Role, SuggestionRecord};
pub use tools::{apply_invocations, ToolInvocation, ToolRegistry, WritingTool};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
