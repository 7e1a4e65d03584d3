use std::sync::Arc;
use anyhow::Result;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chainprompt::exemplars::sports_arena::{sports_json_chain, SportsJsonChain};
use chainprompt::prompt::variables;
use chainprompt::runnable::Runnable;
use chainprompt::utils::llm::openai::ChatOpenAI;
use chainprompt_demos::web::{input, serve, Field, FormPage, FormQuery, Outcome};
use chainprompt_demos::{init_tracing, CommonArgs};
use clap::Parser;
use tracing::error;

/// prompt | model | JSON parser into a typed sports report
#[derive(Parser)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

struct App {
    page: FormPage,
    chain: SportsJsonChain<ChatOpenAI>,
}

async fn index(State(app): State<Arc<App>>, Query(query): Query<FormQuery>) -> Response {
    let Some(country) = input(&query, "country") else {
        return app.page.respond(&query, Outcome::Empty);
    };
    let report = app.chain
        .invoke(variables([("country", country)]))
        .await
        .and_then(|report| Ok(serde_json::to_value(report)?));
    let outcome = match report {
        Ok(value) => Outcome::Json {
            heading: Some(format!("Popular Sports in {}", country)),
            value,
        },
        Err(err) => {
            error!("{:#}", err);
            Outcome::Error(format!("Error parsing response: {}", err))
        }
    };
    app.page.respond(&query, outcome)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = cli.common.settings()?;
    let app = App {
        page: FormPage::new("Sports-Arena with JSON Output")
            .field(Field::text("country", "Enter the country name:")),
        chain: sports_json_chain(ChatOpenAI::from_settings(&settings)?),
    };
    let router = Router::new()
        .route("/", get(index))
        .with_state(Arc::new(app));
    serve(router, &settings.bind_addr).await
}
