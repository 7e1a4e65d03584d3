use std::sync::Arc;
use anyhow::Result;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chainprompt::exemplars::sports_arena::country_sports_template;
use chainprompt::prompt::chat::ChatPromptTemplate;
use chainprompt::prompt::variables;
use chainprompt::runnable::Runnable;
use chainprompt::utils::llm::openai::ChatOpenAI;
use chainprompt_demos::web::{input, serve, Field, FormPage, FormQuery, Outcome};
use chainprompt_demos::{init_tracing, CommonArgs};
use clap::Parser;

/// Format a system + human chat template and send the messages to the chat model
#[derive(Parser)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

struct App {
    page: FormPage,
    template: ChatPromptTemplate,
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
    let messages = app.template.format_messages(&variables([("country", country)]))?;
    let response = app.model.invoke(messages.into()).await?;
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
        template: country_sports_template(3),
        model: ChatOpenAI::from_settings(&settings)?,
    };
    let router = Router::new()
        .route("/", get(index))
        .with_state(Arc::new(app));
    serve(router, &settings.bind_addr).await
}
