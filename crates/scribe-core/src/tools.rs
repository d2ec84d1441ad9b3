//! Writing tools the model may call during a turn.
//!
//! Tools only confirm intent; the project edits are folded in afterwards by
//! `apply_invocations`, in the order the model made the calls.

use std::sync::Arc;

use serde_json::Value;

use crate::error::ToolError;
use crate::project::Project;

pub const ADD_IDEA: &str = "add_idea";
pub const ADD_COMMENT: &str = "add_comment";

/// A tool exposed to the model.
#[async_trait::async_trait]
pub trait WritingTool: Send + Sync {
    fn name(&self) -> &str;

    /// Description shown to the model.
    fn description(&self) -> &str;

    /// JSON schema for the arguments object.
    fn parameters_schema(&self) -> Value;

    /// Returns the confirmation text fed back to the model.
    async fn execute(&self, args: &Value) -> Result<String, ToolError>;
}

/// A call the model made, with decoded arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub name: String,
    pub arguments: Value,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Non-empty string argument, or `None`.
fn str_arg<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// AddIdea: adds an idea to the brainstorm list.
pub struct AddIdea;

#[async_trait::async_trait]
impl WritingTool for AddIdea {
    fn name(&self) -> &str {
        ADD_IDEA
    }

    fn description(&self) -> &str {
        "Add a new idea to the brainstorm list when user mentions one."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "idea": {
                    "type": "string",
                    "description": "The idea to add to the brainstorm list"
                }
            },
            "required": ["idea"]
        })
    }

    async fn execute(&self, args: &Value) -> Result<String, ToolError> {
        let idea = str_arg(args, "idea").ok_or(ToolError::MissingArgument("idea"))?;
        Ok(format!("Added idea: {}", idea))
    }
}

/// AddComment: attaches a comment to the written content.
pub struct AddComment;

#[async_trait::async_trait]
impl WritingTool for AddComment {
    fn name(&self) -> &str {
        ADD_COMMENT
    }

    fn description(&self) -> &str {
        "Add a comment or suggestion to the written content."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "The quill editor content with HTML comment attributes added"
                },
                "comment_text": {
                    "type": "string",
                    "description": "The comment text to add"
                }
            },
            "required": ["content", "comment_text"]
        })
    }

    async fn execute(&self, args: &Value) -> Result<String, ToolError> {
        str_arg(args, "content").ok_or(ToolError::MissingArgument("content"))?;
        let comment = str_arg(args, "comment_text").ok_or(ToolError::MissingArgument("comment_text"))?;
        Ok(format!("Added comment: {}", comment))
    }
}

/// The tool set offered on every turn.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn WritingTool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self {
            tools: vec![Arc::new(AddIdea), Arc::new(AddComment)],
        }
    }
}

impl ToolRegistry {
    pub fn get(&self, name: &str) -> Option<Arc<dyn WritingTool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// Function definitions in chat-completions `tools` format.
    pub fn definitions(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|tool| {
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": tool.name(),
                        "description": tool.description(),
                        "parameters": tool.parameters_schema()
                    }
                })
            })
            .collect()
    }

    /// Run one call and produce the observation text for the model.
    pub async fn dispatch(&self, invocation: &ToolInvocation) -> Result<String, ToolError> {
        let tool = self
            .get(&invocation.name)
            .ok_or_else(|| ToolError::UnknownTool(invocation.name.clone()))?;
        tool.execute(&invocation.arguments).await
    }
}

/// Fold the recorded calls into the project. Calls with missing arguments or unknown
/// names are skipped; nothing is reported to the caller.
pub fn apply_invocations(project: &mut Project, invocations: &[ToolInvocation]) {
    for invocation in invocations {
        match invocation.name.as_str() {
            ADD_IDEA => {
                if let Some(idea) = str_arg(&invocation.arguments, "idea") {
                    let record = project.push_idea(idea);
                    tracing::info!(id = %record.id, "[SCRIBE] Idea added to plan");
                }
            }
            ADD_COMMENT => {
                let args = &invocation.arguments;
                if let (Some(_), Some(comment)) = (str_arg(args, "content"), str_arg(args, "comment_text")) {
                    let record = project.push_suggestion(comment);
                    tracing::info!(id = %record.id, "[SCRIBE] Comment added to edit suggestions");
                }
            }
            other => {
                tracing::debug!(tool = %other, "[SCRIBE] No project effect for tool");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn dispatch_confirms_and_rejects() {
        let registry = ToolRegistry::default();
        let ok = registry
            .dispatch(&ToolInvocation::new(ADD_IDEA, json!({ "idea": "heat waves" })))
            .await;
        assert_eq!(ok.unwrap(), "Added idea: heat waves");

        let ok = registry
            .dispatch(&ToolInvocation::new(
                ADD_COMMENT,
                json!({ "content": "<p>Intro</p>", "comment_text": "Cite a source" }),
            ))
            .await;
        assert_eq!(ok.unwrap(), "Added comment: Cite a source");

        let missing = registry
            .dispatch(&ToolInvocation::new(ADD_COMMENT, json!({ "comment_text": "x" })))
            .await;
        assert_eq!(missing, Err(ToolError::MissingArgument("content")));

        let unknown = registry
            .dispatch(&ToolInvocation::new("delete_everything", json!({})))
            .await;
        assert_eq!(unknown, Err(ToolError::UnknownTool("delete_everything".into())));
    }

    #[test]
    fn definitions_use_function_format() {
        let defs = ToolRegistry::default().definitions();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0]["type"], "function");
        assert_eq!(defs[0]["function"]["name"], ADD_IDEA);
        assert_eq!(defs[1]["function"]["parameters"]["required"], json!(["content", "comment_text"]));
    }

    #[test]
    fn apply_appends_in_call_order() {
        let mut project = Project::default();
        apply_invocations(
            &mut project,
            &[
                ToolInvocation::new(ADD_IDEA, json!({ "idea": "first" })),
                ToolInvocation::new(ADD_COMMENT, json!({ "content": "c", "comment_text": "fix typo" })),
                ToolInvocation::new(ADD_IDEA, json!({ "idea": "second" })),
            ],
        );
        let ideas: Vec<&Value> = project.ideas().iter().map(|i| &i["content"]).collect();
        assert_eq!(ideas, vec!["first", "second"]);
        assert_eq!(project.ideas()[1]["id"], "ai_idea_2");
        assert_eq!(project.suggestions().len(), 1);
        assert_eq!(project.suggestions()[0]["content"], "fix typo");
    }

    #[test]
    fn apply_ignores_incomplete_calls() {
        let mut project = Project::default();
        apply_invocations(
            &mut project,
            &[
                ToolInvocation::new(ADD_IDEA, json!({})),
                ToolInvocation::new(ADD_IDEA, json!({ "idea": "" })),
                ToolInvocation::new(ADD_COMMENT, json!({ "comment_text": "no content" })),
                ToolInvocation::new("rename_project", json!({ "title": "x" })),
            ],
        );
        assert_eq!(project, Project::default());
    }
}
