use std::convert::Infallible;
use std::io::stdout;
use std::sync::Arc;
use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chainprompt::exemplars::sports_arena::country_sports_template;
use chainprompt::prompt::chat::ChatPromptTemplate;
use chainprompt::prompt::variables;
use chainprompt::runnable::{Runnable, RunnableExt, RunnableSequence};
use chainprompt::utils::llm::openai::ChatOpenAI;
use chainprompt::utils::printing::IncrementalMarkdownPrinter;
use chainprompt_demos::web::{accumulate_replies, input, serve, Field, FormPage, FormQuery, Outcome};
use chainprompt_demos::{init_tracing, CommonArgs};
use clap::Parser;
use futures::{stream, Stream, StreamExt};
use termimad::crossterm::{cursor, ExecutableCommand};
use tokio::sync::mpsc;
use tracing::{error, info};

type SportsChain = RunnableSequence<ChatPromptTemplate, ChatOpenAI>;

/// Stream the model's reply as it is generated, to the browser or to the terminal
#[derive(Parser)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Print to the terminal instead of serving the web form
    #[arg(long, requires = "country")]
    terminal: bool,

    /// Country to ask about in terminal mode
    #[arg(long)]
    country: Option<String>,
}

struct App {
    page: FormPage,
    chain: SportsChain,
}

async fn index(State(app): State<Arc<App>>, Query(query): Query<FormQuery>) -> Response {
    let outcome = match input(&query, "country") {
        Some(_) => Outcome::Stream,
        None => Outcome::Empty,
    };
    app.page.respond(&query, outcome)
}

/// Server-sent events: every message carries the whole reply so far, then a `done` event. Failures are sent as a
/// `failure` event.
async fn stream_reply(
    State(app): State<Arc<App>>,
    Query(query): Query<FormQuery>,
) -> Sse<impl Stream<Item=Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<Event>(16);
    let country = input(&query, "country").map(str::to_string);
    tokio::spawn(async move {
        let Some(country) = country else {
            let _ = tx.send(Event::default().event("failure").data("Enter the country name")).await;
            return;
        };
        let mut replies = accumulate_replies(app.chain.stream(variables([("country", country.as_str())])));
        while let Some(reply) = replies.next().await {
            match reply {
                Ok(reply) => {
                    let event = Event::default().data(reply.replace('\r', ""));
                    if tx.send(event).await.is_err() {
                        info!("client of {} went away", country);
                        return;
                    }
                }
                Err(err) => {
                    error!("streaming failed: {:#}", err);
                    let message = format!("{:#}", err).replace('\r', "");
                    let _ = tx.send(Event::default().event("failure").data(message)).await;
                    return;
                }
            }
        }
        let _ = tx.send(Event::default().event("done").data("")).await;
    });
    let events = stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (Ok(event), rx))
    });
    Sse::new(events).keep_alive(KeepAlive::default())
}

async fn print_in_terminal(chain: &SportsChain, country: &str) -> Result<()> {
    // the printer hides the cursor while redrawing
    ctrlc::set_handler(|| {
        let _ = stdout().execute(cursor::Show);
        std::process::exit(130);
    }).context("installing Ctrl-C handler")?;
    let mut printer = IncrementalMarkdownPrinter::default();
    printer.activate(true)?;
    let mut chunks = chain.stream(variables([("country", country)]));
    while let Some(chunk) = chunks.next().await {
        printer.push_and_print(&chunk?.content)?;
    }
    printer.deactivate()?;
    println!();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = cli.common.settings()?;
    let chain = country_sports_template(2).pipe(ChatOpenAI::from_settings(&settings)?);

    if cli.terminal {
        let country = cli.country.as_deref().unwrap_or_default();
        return print_in_terminal(&chain, country).await;
    }

    let app = App {
        page: FormPage::new("Sports-Arena")
            .field(Field::text("country", "Enter the country name:")),
        chain,
    };
    let router = Router::new()
        .route("/", get(index))
        .route("/stream", get(stream_reply))
        .with_state(Arc::new(app));
    serve(router, &settings.bind_addr).await
}
