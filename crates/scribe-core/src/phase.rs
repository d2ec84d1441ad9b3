//! Writing phases and their persona prompts.
//!
//! `PhasePrompts` is built once at startup (built-in text, optionally overridden from
//! configuration) and handed to the agent; nothing mutates it afterwards.

use std::collections::HashMap;
use std::fmt;

/// One of the three writing-process stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    PlanOrganize,
    Write,
    EditRevise,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::PlanOrganize, Phase::Write, Phase::EditRevise];

    fn index(self) -> usize {
        match self {
            Phase::PlanOrganize => 0,
            Phase::Write => 1,
            Phase::EditRevise => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::PlanOrganize => "plan_organize",
            Phase::Write => "write",
            Phase::EditRevise => "edit_revise",
        }
    }

    /// Exact key match only; `None` for anything else.
    pub fn from_key(key: &str) -> Option<Phase> {
        Phase::ALL.into_iter().find(|p| p.as_str() == key)
    }

    /// Missing or unrecognized keys resolve to Plan & Organize.
    pub fn resolve(key: Option<&str>) -> Phase {
        key.and_then(Phase::from_key).unwrap_or(Phase::PlanOrganize)
    }

    /// Human label used in context text, e.g. "Plan Organize".
    pub fn label(self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const PLAN_ORGANIZE_PROMPT: &str = "You are a helpful writing assistant in the Plan & Organize phase. Keep responses short and conversational.

**Your role:**
- Help brainstorm ideas
- Organize thoughts
- Create outlines
- Suggest when ready to write

**Response style:**
- Be concise (1-2 sentences max)
- Use casual, friendly tone
- Ask direct questions
- Give quick suggestions

**When to suggest moving to Write phase:**
- Clear outline exists
- Main ideas identified
- User feels ready

**When to revisit this phase:**
- Ideas scattered
- Need better organization";

const WRITE_PROMPT: &str = "You are a helpful writing assistant in the Write phase. Keep responses short and conversational.

**Your role:**
- Help develop content
- Maintain focus on outline
- Provide writing support
- Encourage progress

**Response style:**
- Be concise (1-2 sentences max)
- Use casual, friendly tone
- Give quick writing tips
- Stay encouraging

**When to suggest moving to Edit phase:**
- First draft complete
- All sections written
- Ready for revision

**When to revisit Plan phase:**
- Structure issues
- Need better organization";

const EDIT_REVISE_PROMPT: &str = "You are a helpful writing assistant in the Edit & Revise phase. Keep responses short and conversational.

**Your role:**
- Review content
- Suggest improvements
- Check clarity
- Polish writing

**Response style:**
- Be concise (1-2 sentences max)
- Use casual, friendly tone
- Give specific feedback
- Stay constructive

**When work is complete:**
- Content clear and organized
- Major issues addressed
- Ready for submission

**When to revisit Write phase:**
- Major gaps found
- Significant rewriting needed";

fn builtin_prompt(phase: Phase) -> &'static str {
    match phase {
        Phase::PlanOrganize => PLAN_ORGANIZE_PROMPT,
        Phase::Write => WRITE_PROMPT,
        Phase::EditRevise => EDIT_REVISE_PROMPT,
    }
}

/// Immutable phase -> system prompt mapping, one slot per phase.
#[derive(Debug, Clone)]
pub struct PhasePrompts {
    prompts: [String; 3],
}

impl Default for PhasePrompts {
    fn default() -> Self {
        Self {
            prompts: Phase::ALL.map(|phase| builtin_prompt(phase).to_string()),
        }
    }
}

impl PhasePrompts {
    /// Built-in prompts with per-phase overrides keyed by phase id (`write`, ...).
    /// Unknown keys and blank texts are skipped with a warning.
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut registry = Self::default();
        for (key, text) in overrides {
            match Phase::from_key(key.trim()) {
                Some(phase) if !text.trim().is_empty() => {
                    tracing::info!(phase = %phase, "[SCRIBE] Phase prompt overridden from config");
                    registry.prompts[phase.index()] = text.clone();
                }
                Some(phase) => {
                    tracing::warn!(phase = %phase, "[SCRIBE] Ignoring blank prompt override");
                }
                None => {
                    tracing::warn!(key = %key, "[SCRIBE] Ignoring prompt override for unknown phase");
                }
            }
        }
        registry
    }

    pub fn get(&self, phase: Phase) -> &str {
        &self.prompts[phase.index()]
    }

    /// Prompt for a raw stored phase key, applying the fallback rule.
    pub fn for_key(&self, key: Option<&str>) -> &str {
        self.get(Phase::resolve(key))
    }
}
