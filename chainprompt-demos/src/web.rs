//! A single-page web form: a title, a few input fields and the outcome of the last submission.
//!
//! The form submits with GET, so every demo handler is `Query<FormQuery> -> Response` and the submitted values are
//! echoed back into the fields.

use std::collections::HashMap;
use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Router;
use anyhow::{Context, Result};
use chainprompt::utils::llm::AiMessage;
use chrono::Local;
use futures::future;
use futures::stream::{BoxStream, StreamExt};
use tracing::{error, info};

pub type FormQuery = HashMap<String, String>;

/// The submitted value of `name`, trimmed. `None` when missing or blank.
pub fn input<'a>(query: &'a FormQuery, name: &str) -> Option<&'a str> {
    query.get(name).map(|value| value.trim()).filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub value: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub label: String,
    pub placeholder: String,
    pub value: String,
    /// Empty for a text box, otherwise a drop-down.
    pub options: Vec<SelectOption>,
}

impl Field {
    pub fn text(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            placeholder: String::new(),
            value: String::new(),
            options: Vec::new(),
        }
    }

    /// A drop-down; the first option is selected until the form is submitted.
    pub fn select(name: &str, label: &str, options: &[&str]) -> Self {
        let options = options.iter()
            .enumerate()
            .map(|(i, value)| SelectOption { value: value.to_string(), selected: i == 0 })
            .collect();
        Self {
            options,
            ..Self::text(name, label)
        }
    }

    pub fn placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    fn with_value(mut self, value: Option<&String>) -> Self {
        let Some(value) = value else {
            return self;
        };
        if self.options.is_empty() {
            self.value = value.clone();
        } else if self.options.iter().any(|option| &option.value == value) {
            for option in self.options.iter_mut() {
                option.selected = &option.value == value;
            }
        }
        self
    }
}

/// What to show under the form.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing submitted yet.
    Empty,
    Text(String),
    Json { heading: Option<String>, value: serde_json::Value },
    /// A success notice with a "last updated" caption.
    Success(String),
    Error(String),
    /// The page subscribes to `/stream` with the submitted fields and renders events as they arrive.
    Stream,
}

impl Outcome {
    pub fn text_or_error(result: Result<String>) -> Self {
        match result {
            Ok(text) => Self::Text(text),
            Err(err) => {
                let message = format!("{:#}", err);
                error!("{}", message);
                Self::Error(message)
            }
        }
    }
}

#[derive(Template)]
#[template(path = "form.html")]
struct FormView<'a> {
    title: &'a str,
    subtitle: Option<&'a str>,
    about: Option<&'a str>,
    footer: Option<&'a str>,
    fields: Vec<Field>,
    heading: Option<String>,
    result: Option<String>,
    result_class: &'static str,
    caption: Option<String>,
    streaming: bool,
}

#[derive(Debug, Clone)]
pub struct FormPage {
    pub title: String,
    pub subtitle: Option<String>,
    pub about: Option<String>,
    pub footer: Option<String>,
    pub fields: Vec<Field>,
}

impl FormPage {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            subtitle: None,
            about: None,
            footer: None,
            fields: Vec::new(),
        }
    }

    pub fn subtitle(mut self, subtitle: &str) -> Self {
        self.subtitle = Some(subtitle.to_string());
        self
    }

    pub fn about(mut self, about: &str) -> Self {
        self.about = Some(about.to_string());
        self
    }

    pub fn footer(mut self, footer: &str) -> Self {
        self.footer = Some(footer.to_string());
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn render(&self, query: &FormQuery, outcome: Outcome) -> Result<String, askama::Error> {
        let fields = self.fields.iter()
            .map(|field| field.clone().with_value(query.get(&field.name)))
            .collect();
        let mut view = FormView {
            title: &self.title,
            subtitle: self.subtitle.as_deref(),
            about: self.about.as_deref(),
            footer: self.footer.as_deref(),
            fields,
            heading: None,
            result: None,
            result_class: "",
            caption: None,
            streaming: false,
        };
        match outcome {
            Outcome::Empty => {}
            Outcome::Text(text) => {
                view.result = Some(text);
                view.result_class = "text";
            }
            Outcome::Json { heading, value } => {
                view.heading = heading;
                view.result = Some(serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()));
                view.result_class = "json";
            }
            Outcome::Success(text) => {
                view.result = Some(text);
                view.result_class = "success";
                view.caption = Some(format!("Last updated: {}", Local::now().format("%Y-%m-%d %H:%M:%S")));
            }
            Outcome::Error(text) => {
                view.result = Some(text);
                view.result_class = "error";
            }
            Outcome::Stream => view.streaming = true,
        }
        view.render()
    }

    pub fn respond(&self, query: &FormQuery, outcome: Outcome) -> Response {
        match self.render(query, outcome) {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                error!("failed to render page: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
            }
        }
    }
}

/// The reply so far after each streamed chunk. The first error is passed on and ends the stream.
pub fn accumulate_replies<'a>(chunks: BoxStream<'a, Result<AiMessage>>) -> BoxStream<'a, Result<String>> {
    chunks
        .scan((AiMessage::default(), false), |(full_reply, failed), chunk| {
            let next = if *failed {
                None
            } else {
                match chunk {
                    Ok(chunk) => {
                        full_reply.push(&chunk);
                        Some(Ok(full_reply.content.clone()))
                    }
                    Err(err) => {
                        *failed = true;
                        Some(Err(err))
                    }
                }
            };
            future::ready(next)
        })
        .boxed()
}

pub async fn serve(router: Router, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}

#[cfg(test)]
mod test_web {
    use anyhow::{anyhow, Result};
    use chainprompt::utils::llm::AiMessage;
    use futures::stream::{self, StreamExt};
    use serde_json::json;
    use super::{accumulate_replies, input, Field, FormPage, FormQuery, Outcome};

    fn query(pairs: &[(&str, &str)]) -> FormQuery {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn page() -> FormPage {
        FormPage::new("Sports-Arena")
            .subtitle("Discover Popular Sports by Country")
            .field(Field::text("country", "Enter the country name:").placeholder("e.g., USA"))
            .field(Field::select("sport", "Select a sport:", &["Select a sport", "Cricket", "Tennis"]))
    }

    #[test]
    fn test_input() {
        let query = query(&[("country", "  India "), ("blank", "   ")]);
        assert_eq!(Some("India"), input(&query, "country"));
        assert_eq!(None, input(&query, "blank"));
        assert_eq!(None, input(&query, "missing"));
    }

    #[test]
    fn test_render_empty_form() {
        let html = page().render(&FormQuery::new(), Outcome::Empty).unwrap();
        assert!(html.contains("<h1>Sports-Arena</h1>"));
        assert!(html.contains("Discover Popular Sports by Country"));
        assert!(html.contains("placeholder=\"e.g., USA\""));
        assert!(html.contains("<option value=\"Select a sport\" selected>"));
        assert!(!html.contains("class=\"result"));
        assert!(!html.contains("EventSource"));
    }

    #[test]
    fn test_render_echoes_values_and_escapes() {
        let query = query(&[("country", "<India>"), ("sport", "Tennis")]);
        let html = page().render(&query, Outcome::Text("1. Cricket & more".to_string())).unwrap();
        assert!(html.contains("value=\"&#60;India&#62;\"") || html.contains("value=\"&lt;India&gt;\""));
        assert!(html.contains("<option value=\"Tennis\" selected>"));
        assert!(!html.contains("<option value=\"Select a sport\" selected>"));
        assert!(html.contains("class=\"result text\""));
        assert!(html.contains("1. Cricket &#38; more") || html.contains("1. Cricket &amp; more"));
    }

    #[test]
    fn test_unknown_option_keeps_default() {
        let query = query(&[("sport", "Quidditch")]);
        let html = page().render(&query, Outcome::Empty).unwrap();
        assert!(html.contains("<option value=\"Select a sport\" selected>"));
    }

    #[test]
    fn test_render_outcomes() {
        let html = page().render(&FormQuery::new(), Outcome::Error("Sorry, no data".to_string())).unwrap();
        assert!(html.contains("class=\"result error\""));

        let html = page().render(&FormQuery::new(), Outcome::Success("Popular sports in USA".to_string())).unwrap();
        assert!(html.contains("class=\"result success\""));
        assert!(html.contains("Last updated: "));

        let value = json!({"sports": [{"name": "Cricket"}]});
        let heading = Some("Popular Sports in India".to_string());
        let html = page().render(&FormQuery::new(), Outcome::Json { heading, value }).unwrap();
        assert!(html.contains("class=\"result json\""));
        assert!(html.contains("Popular Sports in India"));
        assert!(html.contains("Cricket"));

        let html = page().render(&FormQuery::new(), Outcome::Stream).unwrap();
        assert!(html.contains("EventSource"));
    }

    #[test]
    fn test_text_or_error() {
        assert_eq!(Outcome::Text("ok".to_string()), Outcome::text_or_error(Ok("ok".to_string())));
        assert_eq!(Outcome::Error("boom".to_string()), Outcome::text_or_error(Err(anyhow!("boom"))));
        let err = anyhow!("connection reset").context("asking gpt-4o-mini");
        assert_eq!(Outcome::Error("asking gpt-4o-mini: connection reset".to_string()), Outcome::text_or_error(Err(err)));
    }

    /// Chunks as a chat model would stream them, spelling out `text`.
    fn spell(text: &str) -> Vec<Result<AiMessage>> {
        text.chars().map(|c| Ok(AiMessage::new(c.to_string()))).collect()
    }

    #[tokio::test]
    async fn test_accumulate_replies() {
        let replies: Vec<String> = accumulate_replies(stream::iter(spell("go!")).boxed())
            .map(Result::unwrap)
            .collect()
            .await;
        assert_eq!(vec!["g", "go", "go!"], replies);
    }

    #[tokio::test]
    async fn test_accumulate_stops_at_error() {
        let mut chunks = spell("go");
        chunks.push(Err(anyhow!("stream closed")));
        chunks.extend(spell("!"));
        let replies: Vec<Result<String>> = accumulate_replies(stream::iter(chunks).boxed()).collect().await;
        assert_eq!(3, replies.len());
        assert_eq!("go", replies[1].as_deref().unwrap());
        assert_eq!("stream closed", replies[2].as_ref().unwrap_err().to_string());
    }
}
