//! Role-tagged message templates.
//!
//! A [ChatPromptTemplate] is an ordered list of `(role, template)` pairs. Formatting it fills every message template
//! with the same variables and yields [ChatMessage]s, ready to be sent to a chat model as a [PromptValue].

use std::collections::BTreeSet;
use std::fmt;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::prompt::{PromptTemplate, Variables};
use crate::runnable::Runnable;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Human,
    Ai,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::System => "system",
            Role::Human => "human",
            Role::Ai => "ai",
        };
        f.write_str(name)
    }
}

/// A concrete chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self::new(Role::Human, content)
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(Role::Ai, content)
    }
}

/// What a prompt step hands to a model: either a bare string or a list of messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptValue {
    Text(String),
    Messages(Vec<ChatMessage>),
}

impl PromptValue {
    /// Messages to send to a chat model. Plain text becomes a single human message.
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        match self {
            PromptValue::Text(text) => vec![ChatMessage::human(text.clone())],
            PromptValue::Messages(messages) => messages.clone(),
        }
    }
}

impl fmt::Display for PromptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptValue::Text(text) => f.write_str(text),
            PromptValue::Messages(messages) => {
                let lines: Vec<String> = messages.iter()
                    .map(|m| format!("{}: {}", m.role, m.content))
                    .collect();
                f.write_str(&lines.join("\n"))
            }
        }
    }
}

impl From<&str> for PromptValue {
    fn from(text: &str) -> Self {
        PromptValue::Text(text.to_string())
    }
}

impl From<String> for PromptValue {
    fn from(text: String) -> Self {
        PromptValue::Text(text)
    }
}

impl From<Vec<ChatMessage>> for PromptValue {
    fn from(messages: Vec<ChatMessage>) -> Self {
        PromptValue::Messages(messages)
    }
}

/// One message of a chat template.
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    pub role: Role,
    pub template: PromptTemplate,
}

/// An ordered list of role-tagged templates.
#[derive(Debug, Clone)]
pub struct ChatPromptTemplate {
    messages: Vec<MessageTemplate>,
}

impl ChatPromptTemplate {
    /// Build from `(role, template)` pairs. Messages without placeholders, like most system messages, are fine.
    pub fn from_messages<S: Into<String>>(messages: impl IntoIterator<Item=(Role, S)>) -> Self {
        let messages = messages.into_iter()
            .map(|(role, template)| MessageTemplate { role, template: PromptTemplate::parse(template) })
            .collect();
        Self { messages }
    }

    /// A chat template holding a single human message.
    pub fn from_template(template: impl Into<String>) -> Self {
        Self::from_messages([(Role::Human, template.into())])
    }

    pub fn messages(&self) -> &[MessageTemplate] {
        &self.messages
    }

    /// Union of the input variables of all messages, sorted by name.
    pub fn input_variables(&self) -> Vec<String> {
        self.messages.iter()
            .flat_map(|m| m.template.input_variables())
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect()
    }

    /// Fill every message with `variables`.
    pub fn format_messages(&self, variables: &Variables) -> Result<Vec<ChatMessage>> {
        self.messages.iter()
            .map(|m| m.template.format(variables).map(|content| ChatMessage::new(m.role, content)))
            .collect()
    }
}

#[async_trait]
impl Runnable for ChatPromptTemplate {
    type Input = Variables;
    type Output = PromptValue;

    async fn invoke(&self, input: Variables) -> Result<PromptValue> {
        self.format_messages(&input).map(PromptValue::Messages)
    }
}
