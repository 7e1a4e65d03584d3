//! # chainprompt
//!
//! Prompt templates, runnable chains and output parsers for hosted LLM chat APIs
//!
//! ## Usage
//! Add a dependency in `Cargo.toml`
//! ```toml
//! chainprompt = { path = "../chainprompt" }
//! ```
//!
//! and set `OPENAI_API_KEY` in the environment or in a `.env` file.
//!
//! ## Concepts and Design
//! Everything here is explicit and flat: a prompt is built from a template, handed to a model, and the reply is
//! optionally parsed. Each of those steps is a [`Runnable`](crate::runnable::Runnable), and steps compose with
//! [`pipe`](crate::runnable::RunnableExt::pipe).
//!
//! ### Prompt Template and Placeholder
//!
//! A template looks like
//!
//! ```text
//! What are the top 3 most popular sports played in {country}?
//! ```
//!
//! `{country}` is a placeholder named `"country"`. Literal braces are doubled: `{{` and `}}`.
//!
//! A template can bind some placeholders up front ([`PromptTemplate::partial`](crate::prompt::PromptTemplate::partial));
//! the rest must be supplied before it can be formatted, otherwise formatting fails with
//! [`UnfilledPlaceholders`](crate::prompt::errors::UnfilledPlaceholders).
//!
//! [`ChatPromptTemplate`](crate::prompt::chat::ChatPromptTemplate) is the role-tagged variant: a list of system, human
//! and ai message templates.
//!
//! ### Partial Prompt and Filler
//!
//! A [`PartialPrompt`](crate::prompt::PartialPrompt) is a template under construction. It records which placeholder got
//! which value. Fillers ([`filler`]) fill placeholders; when none is left, the prompt is complete.
//!
//! ### Chain
//!
//! ```text
//! template -> model -> output parser
//! ```
//!
//! ```no_run
//! use chainprompt::config::Settings;
//! use chainprompt::exemplars::sports_arena::country_sports_template;
//! use chainprompt::prompt::variables;
//! use chainprompt::runnable::{Runnable, RunnableExt};
//! use chainprompt::utils::llm::openai::ChatOpenAI;
//! use chainprompt::utils::postprocess::StrOutputParser;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let model = ChatOpenAI::from_settings(&Settings::load(None)?)?;
//! let chain = country_sports_template(3).pipe(model).pipe(StrOutputParser);
//! let reply = chain.invoke(variables([("country", "India")])).await?;
//! println!("{}", reply);
//! # Ok(())
//! # }
//! ```
//!
//! ### Output parsers
//!
//! See [`utils::postprocess`]. The JSON parser extracts an object from the reply and deserializes it into a typed
//! shape, so a reply of the wrong shape is reported as an error.
//!
//! ## Attribution
//! * `async_openai`: chat completions, streaming and embeddings go through this crate.
//! * `termimad`: [crate::utils::printing] renders streamed markdown with it.

pub mod config;
pub mod exemplars;
pub mod filler;
pub mod prompt;
pub mod runnable;
pub mod utils;
