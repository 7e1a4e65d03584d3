use anyhow::Result;
use chainprompt::runnable::{Runnable, RunnableConfig, RunnableLambda};
use chainprompt_demos::init_tracing;
use clap::Parser;

/// Invoke a closure once, then on a batch of inputs
#[derive(Parser)]
struct Cli {
    /// Batch inputs
    #[arg(default_values_t = [2, 3])]
    inputs: Vec<i64>,

    /// Upper bound of concurrent invocations in the batch
    #[arg(long)]
    max_concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let sequence1 = RunnableLambda::new(|x: i64| Ok(x + 1));

    let result1 = sequence1.invoke(1).await?;
    let config = RunnableConfig {
        max_concurrency: cli.max_concurrency,
        ..Default::default()
    };
    // outputs keep the order of the inputs
    let batch_result = sequence1.batch_with_config(cli.inputs, &config).await?;
    println!("{}", result1);
    println!("{:?}", batch_result);
    Ok(())
}
