//! Project state: the caller-owned writing project that round-trips through every chat turn.
//!
//! The document is held as the client's JSON object. Reads go through accessors, and the
//! only writes are appends to `chatHistory`, `plan.ideas` and `edit.suggestions`. Every
//! other key is written back exactly as received, including explicit nulls and values of
//! unexpected types.

use serde_json::{json, Map, Value};

use crate::error::ProjectError;
use crate::phase::Phase;

/// Location tag written on every AI-generated idea.
pub const IDEA_LOCATION_BRAINSTORM: &str = "brainstorm";
/// `type` tag written on every AI-generated suggestion.
pub const SUGGESTION_TYPE_COMMENT: &str = "comment";

const AI_IDEA_ID_PREFIX: &str = "ai_idea_";
const AI_COMMENT_ID_PREFIX: &str = "ai_comment_";

const CURRENT_PHASE: &str = "currentPhase";
const CHAT_HISTORY: &str = "chatHistory";
const PLAN: &str = "plan";
const IDEAS: &str = "ideas";
const EDIT: &str = "edit";
const SUGGESTIONS: &str = "suggestions";

/// Speaker of a chat turn the model gets to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// `None` for anything but the exact strings `user` and `assistant`.
    pub fn from_value(value: &Value) -> Option<Role> {
        match value.as_str()? {
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            _ => None,
        }
    }
}

/// A user or assistant turn, read from or appended to `chatHistory`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Typed view of a history entry. Entries that are not objects or carry any other
    /// role yield `None`; missing or null content reads as empty text.
    pub fn from_value(value: &Value) -> Option<Self> {
        let role = Role::from_value(value.get("role")?)?;
        let content = match value.get("content") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        Some(Self { role, content })
    }

    pub fn text(&self) -> &str {
        &self.content
    }
}

impl From<&ChatMessage> for Value {
    fn from(message: &ChatMessage) -> Self {
        json!({ "role": message.role.as_str(), "content": message.content })
    }
}

/// An AI-generated entry for `plan.ideas`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeaRecord {
    pub id: String,
    pub content: String,
}

impl IdeaRecord {
    /// Record for position `number` (1-based) in the list.
    pub fn generated(number: usize, content: &str) -> Self {
        Self {
            id: format!("{}{}", AI_IDEA_ID_PREFIX, number),
            content: content.to_string(),
        }
    }
}

impl From<&IdeaRecord> for Value {
    fn from(record: &IdeaRecord) -> Self {
        json!({
            "id": record.id,
            "content": record.content,
            "location": IDEA_LOCATION_BRAINSTORM,
            "aiGenerated": true
        })
    }
}

/// An AI-generated entry for `edit.suggestions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRecord {
    pub id: String,
    pub content: String,
}

impl SuggestionRecord {
    pub fn generated(number: usize, content: &str) -> Self {
        Self {
            id: format!("{}{}", AI_COMMENT_ID_PREFIX, number),
            content: content.to_string(),
        }
    }
}

impl From<&SuggestionRecord> for Value {
    fn from(record: &SuggestionRecord) -> Self {
        json!({
            "id": record.id,
            "content": record.content,
            "type": SUGGESTION_TYPE_COMMENT,
            "aiGenerated": true
        })
    }
}

fn check_list(value: Option<&Value>, field: &'static str) -> Result<(), ProjectError> {
    match value {
        None | Some(Value::Null) | Some(Value::Array(_)) => Ok(()),
        Some(_) => Err(ProjectError::ExpectedList(field)),
    }
}

fn check_section(
    value: Option<&Value>,
    section: &'static str,
    key: &str,
    list_field: &'static str,
) -> Result<(), ProjectError> {
    match value {
        None | Some(Value::Null) => Ok(()),
        Some(Value::Object(map)) => check_list(map.get(key), list_field),
        Some(_) => Err(ProjectError::ExpectedObject(section)),
    }
}

fn list<'a>(value: Option<&'a Value>) -> &'a [Value] {
    value
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Push onto the list at `key`, creating it when absent or null.
fn append(map: &mut Map<String, Value>, key: &str, entry: Value) {
    let slot = map.entry(key).or_insert(Value::Null);
    let mut items = match slot.take() {
        Value::Array(items) => items,
        _ => Vec::new(),
    };
    items.push(entry);
    *slot = Value::Array(items);
}

/// The whole writing project as sent by the client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    fields: Map<String, Value>,
}

impl Project {
    /// Accept a client document. The root must be an object, and the containers the agent
    /// appends to must be lists (inside objects, for `plan` and `edit`) when present and
    /// not null. Nothing else is checked.
    pub fn from_value(value: &Value) -> Result<Self, ProjectError> {
        let fields = value.as_object().ok_or(ProjectError::NotAnObject)?;
        check_list(fields.get(CHAT_HISTORY), "chatHistory")?;
        check_section(fields.get(PLAN), "plan", IDEAS, "plan.ideas")?;
        check_section(fields.get(EDIT), "edit", SUGGESTIONS, "edit.suggestions")?;
        Ok(Self {
            fields: fields.clone(),
        })
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// Raw top-level field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Phase used for prompt selection. Missing, non-string or unknown values resolve to
    /// Plan & Organize; the stored value is left alone.
    pub fn phase(&self) -> Phase {
        Phase::resolve(self.field(CURRENT_PHASE).and_then(Value::as_str))
    }

    /// User/assistant turns in chronological order; other entries are skipped.
    pub fn history(&self) -> impl Iterator<Item = ChatMessage> + '_ {
        list(self.field(CHAT_HISTORY))
            .iter()
            .filter_map(ChatMessage::from_value)
    }

    pub fn chat_len(&self) -> usize {
        list(self.field(CHAT_HISTORY)).len()
    }

    pub fn ideas(&self) -> &[Value] {
        list(self.field(PLAN).and_then(|plan| plan.get(IDEAS)))
    }

    pub fn suggestions(&self) -> &[Value] {
        list(self.field(EDIT).and_then(|edit| edit.get(SUGGESTIONS)))
    }

    fn append_in_section(&mut self, section: &str, key: &str, entry: Value) {
        let slot = self.fields.entry(section).or_insert(Value::Null);
        let mut map = match slot.take() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        append(&mut map, key, entry);
        *slot = Value::Object(map);
    }

    /// Append an AI idea to `plan.ideas`. The id is `ai_idea_{new length}`.
    pub fn push_idea(&mut self, idea: &str) -> IdeaRecord {
        let record = IdeaRecord::generated(self.ideas().len() + 1, idea);
        self.append_in_section(PLAN, IDEAS, Value::from(&record));
        record
    }

    /// Append an AI comment to `edit.suggestions`. The id is `ai_comment_{new length}`.
    pub fn push_suggestion(&mut self, comment: &str) -> SuggestionRecord {
        let record = SuggestionRecord::generated(self.suggestions().len() + 1, comment);
        self.append_in_section(EDIT, SUGGESTIONS, Value::from(&record));
        record
    }

    /// Append the user turn then the assistant turn to `chatHistory`.
    pub fn record_exchange(&mut self, user_input: &str, reply: &str) {
        append(&mut self.fields, CHAT_HISTORY, Value::from(&ChatMessage::user(user_input)));
        append(&mut self.fields, CHAT_HISTORY, Value::from(&ChatMessage::assistant(reply)));
    }

    /// Copy of the document without `chatHistory` (the model already receives it as messages).
    pub fn without_chat_history(&self) -> Map<String, Value> {
        let mut fields = self.fields.clone();
        fields.remove(CHAT_HISTORY);
        fields
    }
}
