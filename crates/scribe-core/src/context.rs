//! Project context text handed to the model alongside the user's message.

use serde::Deserialize;
use serde_json::Value;

use crate::project::Project;

pub const DEFAULT_CONTENT_PREVIEW_CHARS: usize = 1000;

/// Which context builder the agent uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextMode {
    /// Whole project as pretty JSON, minus chat history.
    #[default]
    Full,
    /// Labelled lines for the main fields with truncated content.
    Summary,
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

fn present<'a>(project: &'a Project, key: &str) -> Option<&'a Value> {
    project.field(key).filter(|v| !is_blank(v))
}

/// First `limit` characters, with `...` appended when anything was cut.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Labelled summary of the fields the model needs most.
pub fn summary_context(project: &Project, preview_chars: usize) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(title) = present(project, "title") {
        parts.push(format!("Project Title: {}", value_text(title)));
    }
    if let Some(description) = present(project, "description") {
        parts.push(format!("Project Description: {}", value_text(description)));
    }
    if let Some(Value::Array(ideas)) = present(project, "brainstormIdeas") {
        let joined = ideas.iter().map(value_text).collect::<Vec<_>>().join(", ");
        parts.push(format!("Current Brainstorm Ideas: {}", joined));
    }
    if let Some(outline) = present(project, "outline") {
        parts.push(format!("Current Outline: {}", value_text(outline)));
    }
    if let Some(content) = present(project, "content") {
        parts.push(format!("Current Content: {}", truncate_chars(&value_text(content), preview_chars)));
    }
    parts.push(format!("Current Phase: {}", project.phase().label()));

    parts.join("\n")
}

/// Entire project as JSON without `chatHistory`; falls back to the summary if it cannot
/// be serialized.
pub fn full_context(project: &Project, preview_chars: usize) -> String {
    match serde_json::to_string_pretty(&project.without_chat_history()) {
        Ok(json) => format!("Complete Project State (JSON):\n{}", json),
        Err(e) => {
            tracing::warn!(error = %e, "[SCRIBE] Project JSON context failed, using summary");
            summary_context(project, preview_chars)
        }
    }
}

pub fn build_context(project: &Project, mode: ContextMode, preview_chars: usize) -> String {
    match mode {
        ContextMode::Full => full_context(project, preview_chars),
        ContextMode::Summary => summary_context(project, preview_chars),
    }
}
