use std::sync::Arc;
use anyhow::Result;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chainprompt::exemplars::sports_arena::GreetingRunnable;
use chainprompt::prompt::variables;
use chainprompt::runnable::Runnable;
use chainprompt_demos::web::{input, serve, Field, FormPage, FormQuery, Outcome};
use chainprompt_demos::{init_tracing, CommonArgs};
use clap::Parser;
use tracing::info;

/// A hand-written runnable that greets without calling a model
#[derive(Parser)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

struct App {
    page: FormPage,
    runnable: GreetingRunnable,
}

async fn index(State(app): State<Arc<App>>, Query(query): Query<FormQuery>) -> Response {
    let outcome = match input(&query, "country") {
        Some(country) => Outcome::text_or_error(app.runnable.invoke(variables([("country", country)])).await),
        None => Outcome::Empty,
    };
    app.page.respond(&query, outcome)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = cli.common.settings()?;
    let runnable = GreetingRunnable::default();
    info!(configurable = ?runnable.config.configurable, "greeting runnable ready");
    let app = App {
        page: FormPage::new("Sports-Arena")
            .field(Field::text("country", "Enter your country:")),
        runnable,
    };
    let router = Router::new()
        .route("/", get(index))
        .with_state(Arc::new(app));
    serve(router, &settings.bind_addr).await
}
