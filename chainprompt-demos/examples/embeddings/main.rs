use anyhow::Result;
use chainprompt::utils::embedding::{GetEmbedDim, OpenAIEmbedding};
use chainprompt_demos::{init_tracing, CommonArgs};
use clap::Parser;
use tracing::info;

const DOCUMENT: &str = "What are the top 2 most popular sports played in India";
const QUERY: &str = "What was the country name mentioned in the conversation?";

/// Embed a document and a query
#[derive(Parser)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// How many leading components of the query vector to print
    #[arg(long, default_value_t = 5)]
    head: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = cli.common.settings()?;
    let embedding = OpenAIEmbedding::from_settings(&settings)?;
    info!(model = %embedding.embedding_model, dim = ?embedding.embedding_dim(), "embedding model ready");

    let vectors = embedding.embed_documents(vec![DOCUMENT.to_string()]).await?;
    println!("{}", vectors.len());
    println!("{}", vectors.first().map_or(0, Vec::len));

    let embedded_query = embedding.embed_query(QUERY).await?;
    println!("{:?}", &embedded_query[..cli.head.min(embedded_query.len())]);
    Ok(())
}
