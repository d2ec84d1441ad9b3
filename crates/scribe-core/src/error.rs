//! Error types for the model client, tools, and orchestrator.

use thiserror::Error;

/// Failures talking to the hosted language model.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no API key configured (set SCRIBE_LLM_API_KEY or OPENAI_API_KEY)")]
    MissingApiKey,
    #[error("model request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("model API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("model response parse failed: {0}")]
    Parse(String),
    #[error("model returned no choices")]
    EmptyResponse,
}

/// Failures executing a writing tool. These go back to the model as observations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("missing required argument '{0}'")]
    MissingArgument(&'static str),
    #[error("unknown tool '{0}'")]
    UnknownTool(String),
}

/// Client project documents the agent cannot append to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectError {
    #[error("project must be a JSON object")]
    NotAnObject,
    #[error("'{0}' must be an object")]
    ExpectedObject(&'static str),
    #[error("'{0}' must be a list")]
    ExpectedList(&'static str),
}

/// Failures while orchestrating one chat turn.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("invalid project: {0}")]
    InvalidProject(#[from] ProjectError),
}
