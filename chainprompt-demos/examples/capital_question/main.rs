use anyhow::Result;
use chainprompt::runnable::Runnable;
use chainprompt::utils::llm::openai::ChatOpenAI;
use chainprompt_demos::{init_tracing, CommonArgs};
use clap::Parser;

/// Ask the chat model one question and print the reply
#[derive(Parser)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[arg(short, long, default_value = "what is capital of India")]
    question: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut settings = cli.common.settings()?;
    settings.api_key_or_prompt()?;
    let model = ChatOpenAI::from_settings(&settings)?;

    let response = model.invoke(cli.question.into()).await?;
    println!("{}", response.content);
    Ok(())
}
