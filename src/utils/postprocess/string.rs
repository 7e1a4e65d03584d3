use anyhow::Result;
use async_trait::async_trait;
use crate::runnable::Runnable;
use crate::utils::llm::AiMessage;

/// Extracts the text content of a model reply.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrOutputParser;

impl StrOutputParser {
    /// Text passes through untouched.
    pub fn parse(&self, text: &str) -> String {
        text.to_string()
    }
}

#[async_trait]
impl Runnable for StrOutputParser {
    type Input = AiMessage;
    type Output = String;

    async fn invoke(&self, input: AiMessage) -> Result<String> {
        Ok(input.content)
    }
}
