use std::sync::Arc;
use anyhow::Result;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chainprompt::exemplars::sports_arena::{sports_str_chain, SportsStrChain};
use chainprompt::prompt::variables;
use chainprompt::runnable::Runnable;
use chainprompt::utils::llm::openai::ChatOpenAI;
use chainprompt::utils::postprocess::StrOutputParser;
use chainprompt_demos::web::{input, serve, Field, FormPage, FormQuery, Outcome};
use chainprompt_demos::{init_tracing, CommonArgs};
use clap::Parser;

/// prompt | model | string parser
#[derive(Parser)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

struct App {
    page: FormPage,
    chain: SportsStrChain<ChatOpenAI>,
}

async fn index(State(app): State<Arc<App>>, Query(query): Query<FormQuery>) -> Response {
    let outcome = match input(&query, "country") {
        Some(country) => {
            let response = app.chain.invoke(variables([("country", country)])).await;
            Outcome::text_or_error(response.map(|text| StrOutputParser.parse(&text)))
        }
        None => Outcome::Empty,
    };
    app.page.respond(&query, outcome)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = cli.common.settings()?;
    let app = App {
        page: FormPage::new("Sports-Arena")
            .field(Field::text("country", "Enter the country name:")),
        chain: sports_str_chain(ChatOpenAI::from_settings(&settings)?),
    };
    let router = Router::new()
        .route("/", get(index))
        .with_state(Arc::new(app));
    serve(router, &settings.bind_addr).await
}
