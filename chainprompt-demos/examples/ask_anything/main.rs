use std::sync::Arc;
use anyhow::Result;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chainprompt::runnable::Runnable;
use chainprompt::utils::llm::openai::ChatOpenAI;
use chainprompt_demos::web::{input, serve, Field, FormPage, FormQuery, Outcome};
use chainprompt_demos::{init_tracing, CommonArgs};
use clap::Parser;

/// A web form that sends any question to the chat model
#[derive(Parser)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Show only the reply text instead of the whole reply
    #[arg(long)]
    content: bool,
}

struct App {
    page: FormPage,
    model: ChatOpenAI,
    content_only: bool,
}

async fn index(State(app): State<Arc<App>>, Query(query): Query<FormQuery>) -> Response {
    let outcome = match input(&query, "prompt") {
        Some(prompt) => Outcome::text_or_error(ask(&app, prompt).await),
        None => Outcome::Empty,
    };
    app.page.respond(&query, outcome)
}

async fn ask(app: &App, prompt: &str) -> Result<String> {
    let response = app.model.invoke(prompt.into()).await?;
    Ok(if app.content_only {
        response.content
    } else {
        format!("{:?}", response)
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = cli.common.settings()?;
    let app = App {
        page: FormPage::new("Gen AI - Sample app")
            .field(Field::text("prompt", "Please ask your question")),
        model: ChatOpenAI::from_settings(&settings)?,
        content_only: cli.content,
    };
    let router = Router::new()
        .route("/", get(index))
        .with_state(Arc::new(app));
    serve(router, &settings.bind_addr).await
}
