//! Settings shared by every demo: credential, model names, sampling and where the web form listens.
//!
//! Precedence, lowest first: built-in defaults, the optional TOML file, then environment variables (a `.env` file in
//! the working directory is loaded into the environment first).

use std::error::Error;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::Path;
use anyhow::{Context, Result};
use async_openai::config::OpenAIConfig;
use log::debug;
use serde::Deserialize;
use crate::utils::embedding::DEFAULT_EMBEDDING_MODEL;
use crate::utils::llm::openai::DEFAULT_CHAT_MODEL;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const MODEL_ENV: &str = "OPENAI_MODEL";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";
pub const ADDR_ENV: &str = "CHAINPROMPT_ADDR";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8501";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub openai_api_key: Option<String>,
    pub model: String,
    pub embedding_model: String,
    pub api_base: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u16>,
    pub bind_addr: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            api_base: None,
            temperature: None,
            max_tokens: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl Settings {
    /// Load `.env`, then the TOML file at `path` if given, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Ok(env_file) = dotenvy::dotenv() {
            debug!("loaded environment from {}", env_file.display());
        }
        let settings = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                Self::from_toml(&text).with_context(|| format!("parsing config file {}", path.display()))?
            }
            None => Self::default(),
        };
        Ok(settings.with_env_overrides(|key| std::env::var(key).ok()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Override fields from variables found by `lookup`. Empty values are ignored.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(api_key) = lookup(API_KEY_ENV) {
            self.openai_api_key = Some(api_key);
        }
        if let Some(model) = lookup(MODEL_ENV) {
            self.model = model;
        }
        if let Some(api_base) = lookup(BASE_URL_ENV) {
            self.api_base = Some(api_base);
        }
        if let Some(bind_addr) = lookup(ADDR_ENV) {
            self.bind_addr = bind_addr;
        }
        self
    }

    pub fn api_key(&self) -> Result<&str, MissingApiKey> {
        self.openai_api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(MissingApiKey)
    }

    /// Return the configured key, or ask for it on the terminal and remember it.
    pub fn api_key_or_prompt(&mut self) -> Result<String> {
        if let Ok(api_key) = self.api_key() {
            return Ok(api_key.to_string());
        }
        let stdin = io::stdin();
        let api_key = prompt_line(&mut stdin.lock(), &mut io::stderr(), "Enter API key for OpenAI: ")?;
        if api_key.is_empty() {
            return Err(MissingApiKey.into());
        }
        self.openai_api_key = Some(api_key.clone());
        Ok(api_key)
    }

    /// Client configuration for `async_openai`.
    pub fn openai_config(&self) -> Result<OpenAIConfig, MissingApiKey> {
        let config = OpenAIConfig::new().with_api_key(self.api_key()?);
        Ok(match &self.api_base {
            Some(api_base) => config.with_api_base(api_base),
            None => config,
        })
    }
}

fn prompt_line(input: &mut impl BufRead, output: &mut impl Write, prompt: &str) -> io::Result<String> {
    write!(output, "{}", prompt)?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Error when no OpenAI credential is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingApiKey;

impl fmt::Display for MissingApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Please set your OpenAI API key in the {} environment variable!", API_KEY_ENV)
    }
}

impl Error for MissingApiKey {}

#[cfg(test)]
mod test_config {
    use std::collections::HashMap;
    use std::io::Cursor;
    use super::{prompt_line, MissingApiKey, Settings, DEFAULT_BIND_ADDR};

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!("gpt-4o-mini", settings.model);
        assert_eq!("text-embedding-3-small", settings.embedding_model);
        assert_eq!(DEFAULT_BIND_ADDR, settings.bind_addr);
        assert_eq!(Err(MissingApiKey), settings.api_key());
    }

    #[test]
    fn test_file_then_env_precedence() {
        let settings = Settings::from_toml(r#"
            model = "gpt-4o"
            temperature = 0.2
            bind_addr = "0.0.0.0:9000"
        "#).unwrap();
        assert_eq!("gpt-4o", settings.model);
        assert_eq!(Some(0.2), settings.temperature);
        // untouched fields keep their defaults
        assert_eq!("text-embedding-3-small", settings.embedding_model);

        let settings = settings.with_env_overrides(env(&[
            ("OPENAI_MODEL", "gpt-4.1-mini"),
            ("OPENAI_API_KEY", "sk-env"),
            ("CHAINPROMPT_ADDR", ""),
        ]));
        assert_eq!("gpt-4.1-mini", settings.model);
        assert_eq!(Ok("sk-env"), settings.api_key());
        assert_eq!("0.0.0.0:9000", settings.bind_addr);
    }

    #[test]
    fn test_empty_key_is_missing() {
        let settings = Settings { openai_api_key: Some(String::new()), ..Default::default() };
        assert!(settings.api_key().is_err());
        assert!(settings.openai_config().is_err());
    }

    #[test]
    fn test_prompt_line() {
        let mut input = Cursor::new("sk-typed\n");
        let mut output = Vec::new();
        let line = prompt_line(&mut input, &mut output, "key: ").unwrap();
        assert_eq!("sk-typed", line);
        assert_eq!(b"key: ".to_vec(), output);
    }

    #[test]
    fn test_rejects_bad_toml() {
        assert!(Settings::from_toml("temperature = \"hot\"").is_err());
    }
}
