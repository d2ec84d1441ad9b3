//! Integration test: full chat turns through the public API with a scripted model.
//!
//! ## Scenarios
//! 1. Plain reply: chat history grows by exactly two entries (user, then assistant).
//! 2. Idea tool: `plan.ideas` grows by one with id `ai_idea_<new length>`.
//! 3. Comment tool: `edit.suggestions` grows by one with id `ai_comment_<new length>`.
//! 4. Unknown phase: Plan & Organize prompt is used, stored value untouched.
//! 5. Unknown top-level fields survive the round trip.
//! 6. Non-string phase: turn still succeeds, stored value untouched.
//! 7. Explicit nulls and schema-less records come back exactly as sent.

use std::sync::Arc;

use scribe_core::{
    AgentOptions, MockChatModel, ModelTurn, Phase, PhasePrompts, ToolCall, ToolRegistry,
    WritingAgent,
};
use serde_json::{json, Value};

fn agent(model: Arc<MockChatModel>) -> WritingAgent {
    WritingAgent::new(model, PhasePrompts::default(), ToolRegistry::default(), AgentOptions::default())
}

fn existing_project() -> Value {
    json!({
        "title": "Climate change",
        "currentPhase": "plan_organize",
        "chatHistory": [
            { "role": "user", "content": "hi" },
            { "role": "assistant", "content": "hey! what are we writing?" }
        ],
        "plan": { "ideas": [
            { "id": "ai_idea_1", "content": "sea level", "location": "brainstorm", "aiGenerated": true },
            { "id": 1712, "content": "my own idea", "location": "brainstorm" }
        ] },
        "edit": { "suggestions": [] },
        "settings": { "theme": "dark" }
    })
}

#[tokio::test]
async fn plain_reply_appends_user_then_assistant() {
    let model = Arc::new(MockChatModel::with_turns([ModelTurn::text("Love it. Which angle?")]));
    let (reply, project) = agent(model)
        .process_chat_value("I want to write about climate change", &json!({ "currentPhase": "plan_organize", "chatHistory": [] }))
        .await;

    assert_eq!(reply, "Love it. Which angle?");
    let history = project["chatHistory"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0], json!({ "role": "user", "content": "I want to write about climate change" }));
    assert_eq!(history[1], json!({ "role": "assistant", "content": "Love it. Which angle?" }));
}

#[tokio::test]
async fn idea_tool_extends_existing_list() {
    let model = Arc::new(MockChatModel::with_turns([
        ModelTurn::tools(vec![ToolCall::function("call_1", "add_idea", json!({ "idea": "climate refugees" }))]),
        ModelTurn::text("Added climate refugees to your list."),
    ]));
    let (_, project) = agent(model).process_chat_value("what about refugees?", &existing_project()).await;

    let ideas = project["plan"]["ideas"].as_array().unwrap();
    assert_eq!(ideas.len(), 3);
    assert_eq!(
        ideas[2],
        json!({ "id": "ai_idea_3", "content": "climate refugees", "location": "brainstorm", "aiGenerated": true })
    );
    assert_eq!(ideas[1]["id"], 1712);
    assert_eq!(project["chatHistory"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn comment_tool_extends_suggestions() {
    let model = Arc::new(MockChatModel::with_turns([
        ModelTurn::tools(vec![ToolCall::function(
            "call_1",
            "add_comment",
            json!({ "content": "<p data-comment=\"1\">Intro</p>", "comment_text": "Open with a statistic" }),
        )]),
        ModelTurn::text("Left you a note on the intro."),
    ]));
    let (_, project) = agent(model).process_chat_value("review my intro", &existing_project()).await;

    assert_eq!(
        project["edit"]["suggestions"],
        json!([{ "id": "ai_comment_1", "content": "Open with a statistic", "type": "comment", "aiGenerated": true }])
    );
}

#[tokio::test]
async fn unknown_phase_uses_plan_prompt_and_keeps_value() {
    let model = Arc::new(MockChatModel::with_turns([ModelTurn::text("ok")]));
    let (_, project) = agent(model.clone())
        .process_chat_value("hi", &json!({ "currentPhase": "publishing" }))
        .await;

    assert_eq!(project["currentPhase"], "publishing");
    let system = model.requests()[0].messages[0].content.clone().unwrap();
    assert_eq!(system, PhasePrompts::default().get(Phase::PlanOrganize));
}

#[tokio::test]
async fn passthrough_fields_survive() {
    let model = Arc::new(MockChatModel::with_turns([ModelTurn::text("ok")]));
    let input = existing_project();
    let (_, project) = agent(model).process_chat_value("hi", &input).await;

    assert_eq!(project["settings"], input["settings"]);
    assert_eq!(project["plan"], input["plan"]);
    assert_eq!(project["edit"], input["edit"]);
    assert_eq!(project["title"], "Climate change");
}

#[tokio::test]
async fn numeric_phase_resolves_to_plan_and_turn_succeeds() {
    let model = Arc::new(MockChatModel::with_turns([ModelTurn::text("Let's plan.")]));
    let (reply, project) = agent(model.clone())
        .process_chat_value("hi", &json!({ "currentPhase": 3, "chatHistory": [] }))
        .await;

    assert_eq!(reply, "Let's plan.");
    assert_eq!(project["currentPhase"], 3);
    assert_eq!(project["chatHistory"].as_array().unwrap().len(), 2);
    let system = model.requests()[0].messages[0].content.clone().unwrap();
    assert_eq!(system, PhasePrompts::default().get(Phase::PlanOrganize));
}

#[tokio::test]
async fn nulls_and_loose_records_pass_through() {
    let model = Arc::new(MockChatModel::with_turns([
        ModelTurn::tools(vec![ToolCall::function("call_1", "add_idea", json!({ "idea": "heat maps" }))]),
        ModelTurn::text("Noted."),
    ]));
    let input = json!({
        "title": null,
        "content": null,
        "plan": { "ideas": [{ "content": "user idea without id" }] },
        "chatHistory": [
            { "role": "user", "content": null },
            { "role": 5, "content": "odd role" }
        ]
    });
    let (reply, project) = agent(model).process_chat_value("add heat maps", &input).await;

    assert_eq!(reply, "Noted.");
    let fields = project.as_object().unwrap();
    assert_eq!(fields["title"], Value::Null);
    assert_eq!(fields["content"], Value::Null);
    let ideas = project["plan"]["ideas"].as_array().unwrap();
    assert_eq!(ideas[0], json!({ "content": "user idea without id" }));
    assert_eq!(ideas[1]["id"], "ai_idea_2");
    let history = project["chatHistory"].as_array().unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0], json!({ "role": "user", "content": null }));
    assert_eq!(history[1], json!({ "role": 5, "content": "odd role" }));
}
