//! OpenAI chat completions through `async_openai`.

use anyhow::{anyhow, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
    CreateChatCompletionStreamResponse,
};
use async_openai::Client;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use log::debug;
use crate::config::Settings;
use crate::prompt::chat::{ChatMessage, PromptValue, Role};
use crate::runnable::Runnable;
use crate::utils::llm::AiMessage;

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Sampling settings sent with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationConfig {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u16>,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: None,
            max_tokens: None,
        }
    }
}

impl From<&Settings> for ConversationConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }
}

/// Chat model backed by the OpenAI chat completions API.
#[derive(Clone, Debug)]
pub struct ChatOpenAI {
    pub client: Client<OpenAIConfig>,
    pub config: ConversationConfig,
}

impl ChatOpenAI {
    pub fn new(api_key: impl Into<String>, config: ConversationConfig) -> Self {
        let api_key: String = api_key.into();
        Self::with_client(Client::with_config(OpenAIConfig::new().with_api_key(api_key)), config)
    }

    pub fn with_client(client: Client<OpenAIConfig>, config: ConversationConfig) -> Self {
        Self { client, config }
    }

    /// Fails with [MissingApiKey](crate::config::MissingApiKey) when no credential is configured.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = Client::with_config(settings.openai_config()?);
        Ok(Self::with_client(client, ConversationConfig::from(settings)))
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub(crate) fn build_request(&self, prompt: &PromptValue) -> Result<CreateChatCompletionRequest> {
        let messages = prompt.to_messages()
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.config.model.as_str()).messages(messages);
        if let Some(temperature) = self.config.temperature {
            args.temperature(temperature);
        }
        if let Some(max_tokens) = self.config.max_tokens {
            args.max_tokens(max_tokens);
        }
        Ok(args.build()?)
    }
}

fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let content = message.content.as_str();
    let request_message = match message.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        Role::Human => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        Role::Ai => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()?
            .into(),
    };
    Ok(request_message)
}

/// Content of the first choice of a stream chunk. `None` when the chunk carries no text.
fn delta_to_message(response: CreateChatCompletionStreamResponse) -> Option<AiMessage> {
    response.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty())
        .map(AiMessage::new)
}

#[async_trait]
impl Runnable for ChatOpenAI {
    type Input = PromptValue;
    type Output = AiMessage;

    async fn invoke(&self, input: PromptValue) -> Result<AiMessage> {
        let request = self.build_request(&input)?;
        debug!("sending chat completion request, model = {}", self.config.model);
        let response = self.client.chat().create(request).await?;
        response.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(AiMessage::new)
            .ok_or_else(|| anyhow!("empty response from model {}", self.config.model))
    }

    /// Yields the reply delta by delta. Deltas without content are skipped.
    fn stream(&self, input: PromptValue) -> BoxStream<'_, Result<AiMessage>> {
        let chunks = async move {
            let request = self.build_request(&input)?;
            debug!("opening chat completion stream, model = {}", self.config.model);
            let response_stream = self.client.chat().create_stream(request).await?;
            let chunks = response_stream
                .map_err(anyhow::Error::from)
                .try_filter_map(|response| async move { Ok(delta_to_message(response)) });
            Ok::<_, anyhow::Error>(chunks)
        };
        stream::once(chunks).try_flatten().boxed()
    }
}

#[cfg(test)]
mod test_openai {
    use async_openai::types::{ChatCompletionRequestMessage, CreateChatCompletionStreamResponse};
    use serde_json::json;
    use super::{delta_to_message, ChatOpenAI, ConversationConfig, DEFAULT_CHAT_MODEL};
    use crate::utils::llm::AiMessage;
    use crate::config::Settings;
    use crate::prompt::chat::{ChatMessage, PromptValue};

    #[test]
    fn test_build_request_maps_roles() {
        let model = ChatOpenAI::new("sk-test", ConversationConfig {
            temperature: Some(0.7),
            max_tokens: Some(50),
            ..Default::default()
        });
        let prompt = PromptValue::Messages(vec![
            ChatMessage::system("You are an expert in sports and general knowledge."),
            ChatMessage::human("What are the top 3 most popular sports played in India?"),
            ChatMessage::ai("Cricket"),
        ]);
        let request = model.build_request(&prompt).unwrap();
        assert_eq!(DEFAULT_CHAT_MODEL, request.model);
        assert_eq!(Some(0.7), request.temperature);
        assert_eq!(Some(50), request.max_tokens);
        assert_eq!(3, request.messages.len());
        assert!(matches!(request.messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(request.messages[1], ChatCompletionRequestMessage::User(_)));
        assert!(matches!(request.messages[2], ChatCompletionRequestMessage::Assistant(_)));
    }

    #[test]
    fn test_text_prompt_is_single_user_message() {
        let model = ChatOpenAI::new("sk-test", ConversationConfig::default());
        let request = model.build_request(&PromptValue::from("what is capital of India")).unwrap();
        assert_eq!(1, request.messages.len());
        assert!(matches!(request.messages[0], ChatCompletionRequestMessage::User(_)));
        assert_eq!(None, request.temperature);
    }

    #[test]
    fn test_from_settings_requires_key() {
        let settings = Settings::default();
        assert!(ChatOpenAI::from_settings(&settings).is_err());

        let settings = Settings {
            openai_api_key: Some("sk-test".to_string()),
            model: "gpt-4o".to_string(),
            ..Default::default()
        };
        assert_eq!("gpt-4o", ChatOpenAI::from_settings(&settings).unwrap().model());
    }

    fn stream_chunk(choices: serde_json::Value) -> CreateChatCompletionStreamResponse {
        serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "created": 1700000000,
            "model": "gpt-4o-mini",
            "choices": choices,
        })).unwrap()
    }

    #[test]
    fn test_delta_to_message() {
        let chunk = stream_chunk(json!([{"index": 0, "delta": {"content": "Cricket"}, "finish_reason": null}]));
        assert_eq!(Some(AiMessage::new("Cricket")), delta_to_message(chunk));

        // empty deltas are skipped
        let chunk = stream_chunk(json!([{"index": 0, "delta": {"content": ""}, "finish_reason": null}]));
        assert_eq!(None, delta_to_message(chunk));

        // the opening chunk only carries the role, the closing one only the finish reason
        let chunk = stream_chunk(json!([{"index": 0, "delta": {"role": "assistant"}, "finish_reason": null}]));
        assert_eq!(None, delta_to_message(chunk));
        let chunk = stream_chunk(json!([{"index": 0, "delta": {}, "finish_reason": "stop"}]));
        assert_eq!(None, delta_to_message(chunk));

        assert_eq!(None, delta_to_message(stream_chunk(json!([]))));
    }
}
