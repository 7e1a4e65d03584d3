use std::sync::Arc;
use anyhow::Result;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chainprompt::exemplars::sports_arena::gk_sports_template;
use chainprompt::prompt::{variables, PromptTemplate};
use chainprompt::runnable::Runnable;
use chainprompt::utils::llm::openai::ChatOpenAI;
use chainprompt_demos::web::{input, serve, Field, FormPage, FormQuery, Outcome};
use chainprompt_demos::{init_tracing, CommonArgs};
use clap::Parser;
use tracing::debug;

/// Fill a prompt template with the submitted country and ask the chat model
#[derive(Parser)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

struct App {
    page: FormPage,
    template: PromptTemplate,
    model: ChatOpenAI,
}

async fn index(State(app): State<Arc<App>>, Query(query): Query<FormQuery>) -> Response {
    let outcome = match input(&query, "country") {
        Some(country) => Outcome::text_or_error(answer(&app, country).await),
        None => Outcome::Empty,
    };
    app.page.respond(&query, outcome)
}

async fn answer(app: &App, country: &str) -> Result<String> {
    let prompt = app.template.format(&variables([("country", country)]))?;
    debug!(%prompt, "formatted prompt");
    let response = app.model.invoke(prompt.into()).await?;
    Ok(response.content)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = cli.common.settings()?;
    let app = App {
        page: FormPage::new("Sports-Arena")
            .field(Field::text("country", "Enter the country name:")),
        template: gk_sports_template(),
        model: ChatOpenAI::from_settings(&settings)?,
    };
    let router = Router::new()
        .route("/", get(index))
        .with_state(Arc::new(app));
    serve(router, &settings.bind_addr).await
}
