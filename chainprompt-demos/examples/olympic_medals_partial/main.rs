use std::sync::Arc;
use anyhow::Result;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chainprompt::exemplars::sports_arena::olympic_medals_template;
use chainprompt::prompt::{variables, PromptTemplate};
use chainprompt::runnable::Runnable;
use chainprompt::utils::llm::openai::ChatOpenAI;
use chainprompt_demos::web::{input, serve, Field, FormPage, FormQuery, Outcome};
use chainprompt_demos::{init_tracing, CommonArgs};
use clap::Parser;
use tracing::info;

/// Compare olympic medals with India, which is bound ahead of time in the template
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
    let outcome = match (input(&query, "country2"), input(&query, "year")) {
        (Some(country2), Some(year)) => Outcome::text_or_error(answer(&app, country2, year).await),
        _ => Outcome::Empty,
    };
    app.page.respond(&query, outcome)
}

async fn answer(app: &App, country2: &str, year: &str) -> Result<String> {
    let prompt = app.template.format(&variables([("country2", country2), ("year", year)]))?;
    let response = app.model.invoke(prompt.into()).await?;
    Ok(response.content)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = cli.common.settings()?;
    let template = olympic_medals_template()?;
    info!(input_variables = ?template.input_variables(), "olympic medals template ready");
    let app = App {
        page: FormPage::new("Sports-Arena")
            .field(Field::text("country2", "Enter the country name that you compare with India:"))
            .field(Field::text("year", "Enter the year:")),
        template,
        model: ChatOpenAI::from_settings(&settings)?,
    };
    let router = Router::new()
        .route("/", get(index))
        .with_state(Arc::new(app));
    serve(router, &settings.bind_addr).await
}
