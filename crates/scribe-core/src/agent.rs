//! WritingAgent: one chat turn from user message + project to reply + updated project.
//!
//! Flow: history from `chatHistory` -> phase prompt -> project context -> model call with
//! tools -> (tool calls -> observations -> model call)* -> final text -> apply recorded
//! tool calls to a copy of the project -> append the exchange to its chat history.
//! Any failure hands back the untouched project and an apologetic reply with the cause.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::config::{LlmMode, ScribeConfig, DEFAULT_MAX_ITERATIONS};
use crate::context::{build_context, ContextMode, DEFAULT_CONTENT_PREVIEW_CHARS};
use crate::error::{AgentError, LlmError};
use crate::llm::{ChatModel, CompletionRequest, LlmMessage, MockChatModel, OpenAiClient};
use crate::phase::PhasePrompts;
use crate::project::{Project, Role};
use crate::tools::{apply_invocations, ToolInvocation, ToolRegistry};

pub const FALLBACK_REPLY: &str = "I'm sorry, I couldn't process your request.";
pub const ITERATION_LIMIT_REPLY: &str = "Agent stopped due to iteration limit or time limit.";
const ERROR_REPLY_PREFIX: &str = "I encountered an error while processing your request: ";
const RESPONSE_STYLE_DIRECTIVE: &str = "IMPORTANT: Keep your response concise and conversational (1-2 sentences max). Use a casual, friendly tone like you're texting a friend.";

/// Tunables for a `WritingAgent`.
#[derive(Debug, Clone, Copy)]
pub struct AgentOptions {
    pub max_iterations: usize,
    pub context_mode: ContextMode,
    pub content_preview_chars: usize,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            context_mode: ContextMode::Full,
            content_preview_chars: DEFAULT_CONTENT_PREVIEW_CHARS,
        }
    }
}

/// Result of the model loop before it is folded into the project.
struct AgentRun {
    output: String,
    invocations: Vec<ToolInvocation>,
}

/// Long-lived and shared across requests; holds only immutable configuration.
pub struct WritingAgent {
    model: Arc<dyn ChatModel>,
    prompts: PhasePrompts,
    tools: ToolRegistry,
    options: AgentOptions,
}

impl WritingAgent {
    pub fn new(
        model: Arc<dyn ChatModel>,
        prompts: PhasePrompts,
        tools: ToolRegistry,
        options: AgentOptions,
    ) -> Self {
        Self {
            model,
            prompts,
            tools,
            options,
        }
    }

    /// Build the agent the config describes. Live mode needs an API key; without one the
    /// backend is unavailable and this returns an error.
    pub fn from_config(config: &ScribeConfig, api_key: Option<&str>) -> Result<Self, AgentError> {
        let model: Arc<dyn ChatModel> = match config.llm_mode {
            LlmMode::Live => {
                let key = api_key.ok_or(LlmError::MissingApiKey)?;
                Arc::new(
                    OpenAiClient::new(key)?
                        .with_api_url(&config.api_url)
                        .with_model(&config.model)
                        .with_temperature(config.temperature)
                        .with_timeout(Duration::from_secs(config.request_timeout_secs)),
                )
            }
            LlmMode::Mock => Arc::new(MockChatModel::new()),
        };
        let options = AgentOptions {
            max_iterations: config.max_iterations.max(1),
            context_mode: config.context_mode,
            content_preview_chars: config.content_preview_chars,
        };
        Ok(Self::new(
            model,
            PhasePrompts::with_overrides(&config.prompt_overrides),
            ToolRegistry::default(),
            options,
        ))
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Project context text for this agent's configured mode.
    pub fn project_context(&self, project: &Project) -> String {
        build_context(
            project,
            self.options.context_mode,
            self.options.content_preview_chars,
        )
    }

    fn compose_input(&self, project: &Project, user_input: &str) -> String {
        format!(
            "Full Project State:\n{}\n\nUser Message: {}\n\n{}",
            self.project_context(project),
            user_input,
            RESPONSE_STYLE_DIRECTIVE
        )
    }

    fn initial_messages(&self, project: &Project, user_input: &str) -> Vec<LlmMessage> {
        let phase = project.phase();
        let mut messages = vec![LlmMessage::system(self.prompts.get(phase))];
        messages.extend(project.history().map(|m| match m.role {
            Role::Assistant => LlmMessage::assistant(m.content),
            Role::User => LlmMessage::user(m.content),
        }));
        messages.push(LlmMessage::user(self.compose_input(project, user_input)));
        messages
    }

    /// Call the model until it answers in text, executing tool calls in between.
    async fn run(&self, project: &Project, user_input: &str) -> Result<AgentRun, AgentError> {
        let mut request = CompletionRequest {
            messages: self.initial_messages(project, user_input),
            tools: self.tools.definitions(),
        };
        let mut invocations = Vec::new();

        for iteration in 1..=self.options.max_iterations {
            let turn = self.model.complete(&request).await?;

            if turn.tool_calls.is_empty() {
                let output = turn
                    .content
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| FALLBACK_REPLY.to_string());
                return Ok(AgentRun {
                    output,
                    invocations,
                });
            }

            tracing::info!(
                iteration,
                calls = turn.tool_calls.len(),
                "[SCRIBE] Model requested tools"
            );
            request.messages.push(LlmMessage::assistant_with_tool_calls(
                turn.content.clone(),
                turn.tool_calls.clone(),
            ));
            for call in &turn.tool_calls {
                let invocation = ToolInvocation::new(call.function.name.clone(), call.arguments());
                let observation = match self.tools.dispatch(&invocation).await {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(tool = %invocation.name, error = %e, "[SCRIBE] Tool call rejected");
                        format!("Error: {}", e)
                    }
                };
                request.messages.push(LlmMessage::tool(call.id.clone(), observation));
                invocations.push(invocation);
            }
        }

        tracing::warn!(
            max_iterations = self.options.max_iterations,
            "[SCRIBE] Agent hit iteration limit"
        );
        Ok(AgentRun {
            output: ITERATION_LIMIT_REPLY.to_string(),
            invocations,
        })
    }

    async fn try_process(&self, user_input: &str, project: &Project) -> Result<(String, Project), AgentError> {
        let run = self.run(project, user_input).await?;
        let mut updated = project.clone();
        apply_invocations(&mut updated, &run.invocations);
        updated.record_exchange(user_input, &run.output);
        Ok((run.output, updated))
    }

    /// Process one chat message. Never fails: on error the original project comes back
    /// unchanged with a reply describing the problem.
    pub async fn process_chat_message(&self, user_input: &str, project: &Project) -> (String, Project) {
        tracing::info!(
            phase = %project.phase(),
            history = project.chat_len(),
            model = %self.model_name(),
            "[SCRIBE] Processing chat message"
        );
        match self.try_process(user_input, project).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "[SCRIBE] Chat turn failed");
                (error_reply(&e), project.clone())
            }
        }
    }

    /// JSON boundary: validate the client document, process, and hand back the document.
    /// Any failure (including a malformed project) returns the original unchanged.
    pub async fn process_chat_value(&self, user_input: &str, project: &Value) -> (String, Value) {
        match Project::from_value(project) {
            Ok(typed) => {
                let (reply, updated) = self.process_chat_message(user_input, &typed).await;
                (reply, updated.into_value())
            }
            Err(e) => {
                let e = AgentError::from(e);
                tracing::warn!(error = %e, "[SCRIBE] Rejecting malformed project");
                (error_reply(&e), project.clone())
            }
        }
    }
}

fn error_reply(e: &AgentError) -> String {
    format!("{}{}", ERROR_REPLY_PREFIX, e)
}
