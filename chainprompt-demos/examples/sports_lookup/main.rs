use std::sync::Arc;
use anyhow::Result;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chainprompt::exemplars::sports_arena::SportsRunnable;
use chainprompt::prompt::variables;
use chainprompt::runnable::Runnable;
use chainprompt_demos::web::{input, serve, Field, FormPage, FormQuery, Outcome};
use chainprompt_demos::{init_tracing, CommonArgs};
use clap::Parser;
use tracing::error;

/// Look up popular sports of a country from a built-in table
#[derive(Parser)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

struct App {
    page: FormPage,
    runnable: SportsRunnable,
}

async fn index(State(app): State<Arc<App>>, Query(query): Query<FormQuery>) -> Response {
    let outcome = match input(&query, "country") {
        Some(country) => match app.runnable.invoke(variables([("country", country)])).await {
            Ok(response) => Outcome::Success(response),
            Err(err) => {
                error!("Application error: {}", err);
                Outcome::Error(format!("An error occurred: {}", err))
            }
        },
        None => Outcome::Empty,
    };
    app.page.respond(&query, outcome)
}

fn about(runnable: &SportsRunnable) -> String {
    let mut about = String::from(
        "This app provides information about popular sports in different countries.\nCurrently supported countries:",
    );
    for country in runnable.supported_countries() {
        about.push_str("\n- ");
        about.push_str(country);
    }
    about
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = cli.common.settings()?;
    let runnable = SportsRunnable::default();
    let app = App {
        page: FormPage::new("🏆 Sports-Arena")
            .subtitle("Discover Popular Sports by Country")
            .about(&about(&runnable))
            .field(Field::text("country", "Enter your country:").placeholder("e.g., USA"))
            .footer("Built with ❤️ using chainprompt and axum"),
        runnable,
    };
    let router = Router::new()
        .route("/", get(index))
        .with_state(Arc::new(app));
    serve(router, &settings.bind_addr).await
}
