use anyhow::Result;
use async_openai::config::OpenAIConfig;
use async_openai::types::{CreateEmbeddingRequestArgs, CreateEmbeddingResponse, EmbeddingInput, EmbeddingUsage};
use async_openai::Client;
use async_trait::async_trait;
use log::debug;
use crate::config::Settings;

/// Vector of floats representing an embedding.
pub type EmbedVec = Vec<f32>;

/// Trait for getting the embedding dimension.
pub trait GetEmbedDim {
    fn embedding_dim(&self) -> Option<usize>;
}

/// Trait for embedding a string and outputting the embedding vector and extra info.
#[async_trait]
pub trait AsyncEmbed: GetEmbedDim {
    type OutputExtra;
    async fn embed(&self, string: &str) -> Result<(EmbedVec, Self::OutputExtra)>;
}

/// Trait for embedding a string and outputting the embedding vector.
#[async_trait]
pub trait AsyncSimplyEmbed: GetEmbedDim {
    async fn embed(&self, string: &str) -> Result<EmbedVec>;
}

/// Blanket impl of AsyncSimplyEmbed for AsyncEmbed trait.
#[async_trait]
impl<T: AsyncEmbed + Sync> AsyncSimplyEmbed for T {
    async fn embed(&self, string: &str) -> Result<EmbedVec> {
        AsyncEmbed::embed(self, string).await.map(|e| e.0)
    }
}

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Embedding model from OpenAI API.
#[derive(Clone, Debug)]
pub struct OpenAIEmbedding {
    pub client: Client<OpenAIConfig>,
    pub embedding_model: String,
}

impl GetEmbedDim for OpenAIEmbedding {
    fn embedding_dim(&self) -> Option<usize> {
        match self.embedding_model.as_str() {
            "text-embedding-3-small" | "text-embedding-ada-002" => Some(1536),
            "text-embedding-3-large" => Some(3072),
            _ => None,
        }
    }
}

impl OpenAIEmbedding {
    pub fn new(client: Client<OpenAIConfig>, embedding_model: impl Into<String>) -> Self {
        Self {
            client,
            embedding_model: embedding_model.into(),
        }
    }

    /// Fails with [MissingApiKey](crate::config::MissingApiKey) when no credential is configured.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = Client::with_config(settings.openai_config()?);
        Ok(Self::new(client, settings.embedding_model.clone()))
    }

    /// send a request to the OpenAI API to embed the input. Returns the embedding vectors in input order and embedding usage, or an error.
    async fn request_embed(&self, input: EmbeddingInput) -> Result<(Vec<EmbedVec>, EmbeddingUsage)> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(self.embedding_model.as_str())
            .input(input)
            .build()?;
        let response = self.client.embeddings().create(request).await?;
        let (vectors, usage) = into_ordered_vectors(response);
        debug!("embedded {} input(s) with {}, total tokens = {}", vectors.len(), self.embedding_model, usage.total_tokens);
        Ok((vectors, usage))
    }

    /// Embed many documents in one request. Vectors come back in document order.
    pub async fn embed_documents(&self, documents: Vec<String>) -> Result<Vec<EmbedVec>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }
        self.request_embed(EmbeddingInput::StringArray(documents))
            .await
            .map(|(vectors, _)| vectors)
    }

    /// Embed a single query string.
    pub async fn embed_query(&self, query: &str) -> Result<EmbedVec> {
        AsyncSimplyEmbed::embed(self, query).await
    }
}

/// The API tags each vector with the index of its input; the vectors are returned in that order.
fn into_ordered_vectors(response: CreateEmbeddingResponse) -> (Vec<EmbedVec>, EmbeddingUsage) {
    let CreateEmbeddingResponse { mut data, usage, .. } = response;
    data.sort_by_key(|embedding| embedding.index);
    (data.into_iter().map(|embedding| embedding.embedding).collect(), usage)
}

#[async_trait]
impl AsyncEmbed for OpenAIEmbedding {
    type OutputExtra = EmbeddingUsage;

    async fn embed(&self, string: &str) -> Result<(EmbedVec, EmbeddingUsage)> {
        let (mut vectors, usage) = self.request_embed(EmbeddingInput::String(string.to_string())).await?;
        let vector = vectors.pop().ok_or_else(|| anyhow::anyhow!("no embedding returned by {}", self.embedding_model))?;
        Ok((vector, usage))
    }
}

#[cfg(test)]
mod test_embedding {
    use async_openai::Client;
    use async_openai::types::CreateEmbeddingResponse;
    use serde_json::json;
    use super::{into_ordered_vectors, GetEmbedDim, OpenAIEmbedding};
    use crate::config::Settings;

    #[test]
    fn test_embedding_dim() {
        let embedding = OpenAIEmbedding::new(Client::new(), "text-embedding-3-small");
        assert_eq!(Some(1536), embedding.embedding_dim());
        let embedding = OpenAIEmbedding::new(Client::new(), "text-embedding-3-large");
        assert_eq!(Some(3072), embedding.embedding_dim());
        let embedding = OpenAIEmbedding::new(Client::new(), "my-local-embedder");
        assert_eq!(None, embedding.embedding_dim());
    }

    #[tokio::test]
    async fn test_empty_documents_skip_request() {
        let embedding = OpenAIEmbedding::new(Client::new(), "text-embedding-3-small");
        assert!(embedding.embed_documents(Vec::new()).await.unwrap().is_empty());
    }

    #[test]
    fn test_from_settings() {
        assert!(OpenAIEmbedding::from_settings(&Settings::default()).is_err());
        let settings = Settings { openai_api_key: Some("sk-test".to_string()), ..Default::default() };
        let embedding = OpenAIEmbedding::from_settings(&settings).unwrap();
        assert_eq!("text-embedding-3-small", embedding.embedding_model);
    }

    #[test]
    fn test_vectors_follow_input_order() {
        let response: CreateEmbeddingResponse = serde_json::from_value(json!({
            "object": "list",
            "model": "text-embedding-3-small",
            "data": [
                {"object": "embedding", "index": 1, "embedding": [0.5, 0.6]},
                {"object": "embedding", "index": 0, "embedding": [0.1, 0.2]},
            ],
            "usage": {"prompt_tokens": 8, "total_tokens": 8},
        })).unwrap();
        let (vectors, usage) = into_ordered_vectors(response);
        let expected: Vec<Vec<f32>> = vec![vec![0.1, 0.2], vec![0.5, 0.6]];
        assert_eq!(expected, vectors);
        assert_eq!(8, usage.total_tokens);
    }
}
