//! Scribe configuration: defaults, then an optional TOML file, then `SCRIBE__*` env vars.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | host | 0.0.0.0 | Gateway bind address. |
//! | port | 5002 | Gateway port. |
//! | llm_mode | live | "live" (hosted model) or "mock" (scripted replies, no network). |
//! | api_url | OpenAI chat completions | Any OpenAI-compatible endpoint. |
//! | model | gpt-4o-mini | Model id sent with each request. |
//! | temperature | 0.7 | Sampling temperature. |
//! | request_timeout_secs | 60 | HTTP timeout for model calls. |
//! | max_iterations | 15 | Model calls allowed per chat turn (tool loop bound). |
//! | context_mode | full | "full" (project JSON) or "summary" (labelled lines). |
//! | content_preview_chars | 1000 | Content truncation for the summary context. |
//! | prompt_overrides | {} | Phase id -> replacement system prompt. |
//!
//! The API key never lives in the config file: `SCRIBE_LLM_API_KEY`, else `OPENAI_API_KEY`.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::context::{ContextMode, DEFAULT_CONTENT_PREVIEW_CHARS};
use crate::llm::{DEFAULT_API_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE};

const ENV_CONFIG_PATH: &str = "SCRIBE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/scribe.toml";
const ENV_API_KEY: &str = "SCRIBE_LLM_API_KEY";
const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const DEFAULT_MAX_ITERATIONS: usize = 15;

/// Model backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmMode {
    #[default]
    Live,
    Mock,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScribeConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub llm_mode: LlmMode,
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub request_timeout_secs: u64,
    pub max_iterations: usize,
    #[serde(default)]
    pub context_mode: ContextMode,
    pub content_preview_chars: usize,
    #[serde(default)]
    pub prompt_overrides: HashMap<String, String>,
}

impl Default for ScribeConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5002,
            llm_mode: LlmMode::Live,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            request_timeout_secs: 60,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            context_mode: ContextMode::Full,
            content_preview_chars: DEFAULT_CONTENT_PREVIEW_CHARS,
            prompt_overrides: HashMap::new(),
        }
    }
}

impl ScribeConfig {
    /// Load from `SCRIBE_CONFIG` (or `config/scribe.toml` when present) and the environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let path = Path::new(&path);
        let file = if path.exists() {
            Some(config::File::from(path))
        } else {
            None
        };
        Self::build(file, Some(config::Environment::with_prefix("SCRIBE").separator("__")))
    }

    /// Parse a TOML document on top of the defaults (no environment).
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        Self::build(
            Some(config::File::from_str(toml, config::FileFormat::Toml)),
            None,
        )
    }

    fn build<F>(file: Option<F>, env: Option<config::Environment>) -> Result<Self, config::ConfigError>
    where
        F: config::Source + Send + Sync + 'static,
    {
        let d = Self::default();
        let mut builder = config::Config::builder()
            .set_default("host", d.host)?
            .set_default("port", i64::from(d.port))?
            .set_default("llm_mode", "live")?
            .set_default("api_url", d.api_url)?
            .set_default("model", d.model)?
            .set_default("temperature", f64::from(d.temperature))?
            .set_default("request_timeout_secs", d.request_timeout_secs as i64)?
            .set_default("max_iterations", d.max_iterations as i64)?
            .set_default("context_mode", "full")?
            .set_default("content_preview_chars", d.content_preview_chars as i64)?;

        if let Some(file) = file {
            builder = builder.add_source(file);
        }
        if let Some(env) = env {
            builder = builder.add_source(env);
        }

        let mut cfg: ScribeConfig = builder.build()?.try_deserialize()?;
        if cfg.max_iterations == 0 {
            tracing::warn!("[SCRIBE] max_iterations = 0 is not usable, using 1");
            cfg.max_iterations = 1;
        }
        Ok(cfg)
    }

    /// API key from `SCRIBE_LLM_API_KEY`, falling back to `OPENAI_API_KEY`. Blank counts as unset.
    pub fn api_key_from_env() -> Option<String> {
        [ENV_API_KEY, ENV_OPENAI_API_KEY]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = ScribeConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.port, 5002);
        assert_eq!(cfg.llm_mode, LlmMode::Live);
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.max_iterations, DEFAULT_MAX_ITERATIONS);
        assert_eq!(cfg.context_mode, ContextMode::Full);
        assert_eq!(cfg.content_preview_chars, 1000);
        assert!(cfg.prompt_overrides.is_empty());
        assert_eq!(cfg.bind_addr(), "0.0.0.0:5002");
    }

    #[test]
    fn file_values_override_defaults() {
        let cfg = ScribeConfig::from_toml_str(
            r#"
            port = 8080
            llm_mode = "mock"
            model = "openai/gpt-4o-mini"
            context_mode = "summary"
            max_iterations = 0

            [prompt_overrides]
            write = "Be a terse drafting coach."
            "#,
        )
        .unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.llm_mode, LlmMode::Mock);
        assert_eq!(cfg.model, "openai/gpt-4o-mini");
        assert_eq!(cfg.context_mode, ContextMode::Summary);
        assert_eq!(cfg.max_iterations, 1);
        assert_eq!(cfg.prompt_overrides["write"], "Be a terse drafting coach.");
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(ScribeConfig::from_toml_str(r#"llm_mode = "offline""#).is_err());
    }
}
