//! Chat and diagnostic endpoints under `/api`.
//!
//! Bodies are taken as raw bytes so that malformed JSON gets the same 400 payload as a
//! missing body instead of the framework's default rejection.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub assistant_reply: String,
    pub project: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RejectionBody {
    error: &'static str,
    assistant_reply: &'static str,
}

/// Reasons a chat request is refused before reaching the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRejection {
    NoData,
    NoUserInput,
    NoProject,
    AgentUnavailable,
}

impl ChatRejection {
    fn parts(self) -> (StatusCode, &'static str, &'static str) {
        match self {
            ChatRejection::NoData => (StatusCode::BAD_REQUEST, "No data provided", "Please provide a message."),
            ChatRejection::NoUserInput => (StatusCode::BAD_REQUEST, "No userInput provided", "Please provide a message."),
            ChatRejection::NoProject => (StatusCode::BAD_REQUEST, "No currentProject provided", "Project data is required."),
            ChatRejection::AgentUnavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AI service not available",
                "The AI Writing Assistant service is not properly configured. Please contact your administrator.",
            ),
        }
    }
}

impl IntoResponse for ChatRejection {
    fn into_response(self) -> Response {
        let (status, error, assistant_reply) = self.parts();
        tracing::warn!(status = status.as_u16(), error, "[SCRIBE] Chat request rejected");
        (status, Json(RejectionBody { error, assistant_reply })).into_response()
    }
}

/// Empty-ish values count as absent: null, false, 0, "", [], {}.
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Validation in order: body, userInput, currentProject. Returns the message and project.
fn validate(body: &[u8]) -> Result<(String, Value), ChatRejection> {
    let mut data: Value = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "[SCRIBE] Chat body is not JSON");
        ChatRejection::NoData
    })?;
    if is_empty_value(&data) {
        return Err(ChatRejection::NoData);
    }

    let user_input = data
        .get("userInput")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(ChatRejection::NoUserInput)?;

    let project = data
        .get_mut("currentProject")
        .filter(|p| p.as_object().is_some_and(|o| !o.is_empty()))
        .map(Value::take)
        .ok_or(ChatRejection::NoProject)?;

    Ok((user_input, project))
}

/// POST /api/chat: `{userInput, currentProject}` -> `{assistantReply, project}`.
pub async fn chat(State(state): State<AppState>, body: Bytes) -> Result<Json<ChatResponse>, ChatRejection> {
    tracing::info!(bytes = body.len(), "[SCRIBE] Chat endpoint called");
    tracing::debug!(raw = %String::from_utf8_lossy(&body), "[SCRIBE] Chat request body");

    let (user_input, project) = validate(&body)?;
    let agent = state.agent.as_ref().ok_or(ChatRejection::AgentUnavailable)?;

    tracing::info!(
        input_chars = user_input.chars().count(),
        project_keys = project.as_object().map_or(0, |o| o.len()),
        "[SCRIBE] Passing message to writing agent"
    );
    let (assistant_reply, project) = agent.process_chat_value(&user_input, &project).await;
    tracing::debug!(reply = %assistant_reply, "[SCRIBE] Agent reply");

    Ok(Json(ChatResponse {
        assistant_reply,
        project,
    }))
}

/// POST /api/test: echo the parsed body back for client debugging.
pub async fn test_echo(body: Bytes) -> Response {
    tracing::info!(bytes = body.len(), "[SCRIBE] Test endpoint called");
    let received: Result<Value, serde_json::Error> = if body.iter().all(u8::is_ascii_whitespace) {
        Ok(Value::Null)
    } else {
        serde_json::from_slice(&body)
    };
    match received {
        Ok(data) => Json(json!({
            "status": "success",
            "received_data": data,
            "message": "Test endpoint working"
        }))
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "[SCRIBE] Test endpoint could not parse body");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
