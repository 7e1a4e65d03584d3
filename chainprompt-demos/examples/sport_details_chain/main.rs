use std::sync::Arc;
use anyhow::Result;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chainprompt::exemplars::sports_arena::{SportDetailsPipeline, SELECT_SPORT_PROMPT, SPORTS_OPTIONS};
use chainprompt::utils::llm::openai::ChatOpenAI;
use chainprompt_demos::web::{input, serve, Field, FormPage, FormQuery, Outcome};
use chainprompt_demos::{init_tracing, CommonArgs};
use clap::Parser;
use tracing::warn;

/// Ask about a country's top sports and one chosen sport concurrently, then combine both answers
#[derive(Parser)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

struct App {
    page: FormPage,
    /// The error message when the model could not be set up, e.g. no API key.
    pipeline: Result<SportDetailsPipeline<ChatOpenAI>, String>,
}

async fn index(State(app): State<Arc<App>>, Query(query): Query<FormQuery>) -> Response {
    let pipeline = match &app.pipeline {
        Ok(pipeline) => pipeline,
        Err(message) => return app.page.respond(&query, Outcome::Error(message.clone())),
    };
    let sport = input(&query, "sport").filter(|sport| *sport != SELECT_SPORT_PROMPT);
    let outcome = match (input(&query, "country"), sport) {
        (Some(country), Some(sport)) => {
            Outcome::text_or_error(pipeline.run(country, sport).await.map(|reply| reply.content))
        }
        _ => Outcome::Empty,
    };
    app.page.respond(&query, outcome)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = cli.common.settings()?;
    let pipeline = ChatOpenAI::from_settings(&settings)
        .map(SportDetailsPipeline::new)
        .map_err(|err| {
            warn!("{}", err);
            err.to_string()
        });
    let app = App {
        page: FormPage::new("Sports Arena")
            .field(Field::text("country", "Enter a country name:"))
            .field(Field::select("sport", "Select a sport:", SPORTS_OPTIONS)),
        pipeline,
    };
    let router = Router::new()
        .route("/", get(index))
        .with_state(Arc::new(app));
    serve(router, &settings.bind_addr).await
}
