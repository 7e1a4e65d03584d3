use anyhow::Result;
use chainprompt::runnable::{Runnable, RunnableExt, RunnableLambda, RunnableParallel};
use chainprompt_demos::init_tracing;
use clap::Parser;

/// Compose closures into sequences and a parallel map
#[derive(Parser)]
struct Cli {
    /// Run only this snippet (1, 2 or 3)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=3))]
    snippet: Option<u8>,
}

fn add_one() -> RunnableLambda<impl Fn(i64) -> Result<i64> + Send + Sync, i64, i64> {
    RunnableLambda::new(|x: i64| Ok(x + 1))
}

fn multiply_by(factor: i64) -> RunnableLambda<impl Fn(i64) -> Result<i64> + Send + Sync, i64, i64> {
    RunnableLambda::new(move |x: i64| Ok(x * factor))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let enabled = |snippet: u8| cli.snippet.map_or(true, |only| only == snippet);

    if enabled(1) {
        let sequence1 = add_one();
        println!("{}", sequence1.invoke(1).await?);
    }
    if enabled(2) {
        let sequence2 = add_one().pipe(multiply_by(4));
        println!("{}", sequence2.invoke(1).await?);
    }
    if enabled(3) {
        // every branch gets the same input and runs concurrently
        let sequence3 = add_one().pipe(
            RunnableParallel::new()
                .with_branch("mulby2", multiply_by(2))
                .with_branch("mulby6", multiply_by(6))
        );
        println!("{:?}", sequence3.invoke(1).await?);
    }
    Ok(())
}
