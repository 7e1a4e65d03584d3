use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use anyhow::Result;
use async_trait::async_trait;
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::json;
use crate::prompt::chat::{ChatPromptTemplate, PromptValue, Role};
use crate::prompt::errors::PlaceholderNotExist;
use crate::prompt::{variables, PromptTemplate, Variables};
use crate::runnable::{Runnable, RunnableConfig, RunnableExt, RunnableSequence};
use crate::utils::llm::AiMessage;
use crate::utils::postprocess::{JsonOutputParser, StrOutputParser};
use crate::utils::JsonMap;

pub const SPORTS_EXPERT_SYSTEM: &str = "You are an expert in sports and general knowledge.";

const GK_SPORTS_TEMPLATE_STR: &str = r#"You are an expert in GK.
Answer the question: What are the three top sports played in {country}?"#;

const OLYMPIC_MEDALS_TEMPLATE_STR: &str = r#"You are an expert in GK.
Answer the question: How many medals in olympics won by the {country1} or {country2} in the year {year}?"#;

const SPORTS_JSON_SYSTEM: &str = r#"You are an expert in sports and general knowledge.
Provide information about sports in JSON format with the specified structure."#;

const SPORTS_JSON_HUMAN: &str = r#"What are the top 3 most popular sports played in {country}?
Return the response in the following JSON format:
{{
    "sports": [
        {{
            "name": "sport name",
            "popularity_rank": 1,
            "description": "brief description"
        }}
    ]
}}"#;

const SPORT_INFO_TEMPLATE_STR: &str = r#"Provide detailed information about {sport} in {country}, including:
1. Basic rules
2. Major competitions"#;

const FINAL_INFO_TEMPLATE_STR: &str = r#"For {country}:
First, list the top 3 sports: {country_sports}

Then, for each sport mentioned, provide details:
{sport_details}"#;

/// First entry of [SPORTS_OPTIONS]; selecting it means no sport was chosen.
pub const SELECT_SPORT_PROMPT: &str = "Select your sport";

pub const SPORTS_OPTIONS: &[&str] = &[
    SELECT_SPORT_PROMPT,
    "Football (Soccer)",
    "Basketball",
    "Tennis",
    "Cricket",
    "Rugby",
    "Baseball",
    "Volleyball",
    "Ice Hockey",
    "Golf",
    "Athletics",
];

/// System + human template asking for the `top_n` most popular sports of `{country}`.
pub fn country_sports_template(top_n: usize) -> ChatPromptTemplate {
    ChatPromptTemplate::from_messages([
        (Role::System, SPORTS_EXPERT_SYSTEM.to_string()),
        (Role::Human, format!("What are the top {} most popular sports played in {{country}}?", top_n)),
    ])
}

/// Plain single-string template with `{country}`.
pub fn gk_sports_template() -> PromptTemplate {
    PromptTemplate::new(GK_SPORTS_TEMPLATE_STR)
}

/// Medal question comparing against India, which is bound as a partial variable.
pub fn olympic_medals_template() -> Result<PromptTemplate, PlaceholderNotExist> {
    PromptTemplate::new(OLYMPIC_MEDALS_TEMPLATE_STR).partial("country1", "India")
}

/// Asks for a reply matching [SportsReport]. The JSON example in the human message uses escaped braces.
pub fn sports_json_template() -> ChatPromptTemplate {
    ChatPromptTemplate::from_messages([
        (Role::System, SPORTS_JSON_SYSTEM),
        (Role::Human, SPORTS_JSON_HUMAN),
    ])
}

pub fn sport_info_template() -> ChatPromptTemplate {
    ChatPromptTemplate::from_template(SPORT_INFO_TEMPLATE_STR)
}

pub fn final_info_template() -> ChatPromptTemplate {
    ChatPromptTemplate::from_template(FINAL_INFO_TEMPLATE_STR)
}

/// One ranked sport of a [SportsReport].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sport {
    pub name: String,
    pub popularity_rank: u32,
    pub description: String,
}

/// Expected shape of the JSON reply. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SportsReport {
    pub sports: Vec<Sport>,
}

pub type SportsStrChain<M> = RunnableSequence<RunnableSequence<ChatPromptTemplate, M>, StrOutputParser>;
pub type SportsJsonChain<M> = RunnableSequence<RunnableSequence<ChatPromptTemplate, M>, JsonOutputParser<SportsReport>>;

/// `top 3 sports template | model | StrOutputParser`
pub fn sports_str_chain<M>(model: M) -> SportsStrChain<M>
    where M: Runnable<Input=PromptValue, Output=AiMessage> {
    country_sports_template(3).pipe(model).pipe(StrOutputParser)
}

/// `JSON template | model | JsonOutputParser<SportsReport>`
pub fn sports_json_chain<M>(model: M) -> SportsJsonChain<M>
    where M: Runnable<Input=PromptValue, Output=AiMessage> {
    sports_json_template().pipe(model).pipe(JsonOutputParser::new())
}

/// Greets without calling any model.
#[derive(Debug, Clone)]
pub struct GreetingRunnable {
    pub config: RunnableConfig,
}

impl Default for GreetingRunnable {
    fn default() -> Self {
        Self {
            config: RunnableConfig {
                configurable: default_configurable(),
                ..Default::default()
            },
        }
    }
}

#[async_trait]
impl Runnable for GreetingRunnable {
    type Input = Variables;
    type Output = String;

    async fn invoke(&self, input: Variables) -> Result<String> {
        let country = input.get("country").map(String::as_str).unwrap_or("User");
        Ok(format!("You wish to check the sports of this, {}!", country))
    }
}

fn default_configurable() -> JsonMap {
    match json!({ "max_tokens": 50, "temperature": 0.7 }) {
        serde_json::Value::Object(map) => map,
        _ => JsonMap::new(),
    }
}

/// Sports facts of one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountrySports {
    pub sports: Vec<String>,
    pub national_sport: String,
    pub popular_leagues: Vec<String>,
}

impl CountrySports {
    fn new(sports: &[&str], national_sport: &str, popular_leagues: &[&str]) -> Self {
        Self {
            sports: sports.iter().map(|s| s.to_string()).collect(),
            national_sport: national_sport.to_string(),
            popular_leagues: popular_leagues.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Why a country could not be looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    MissingCountry,
    UnknownCountry(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::MissingCountry => write!(f, "Please provide a country name."),
            LookupError::UnknownCountry(country) => {
                write!(f, "No sports data available for {}. Please try another country.", country)
            }
        }
    }
}

impl Error for LookupError {}

/// Answers sports questions from a built-in table instead of a model.
///
/// Country names are matched exactly, e.g. `"USA"`, not `"usa"`. Lookup failures are answered with a friendly
/// message rather than an error so the reply can be shown as is.
#[derive(Debug, Clone)]
pub struct SportsRunnable {
    config: RunnableConfig,
    sports_data: BTreeMap<String, CountrySports>,
}

impl Default for SportsRunnable {
    fn default() -> Self {
        Self::new(None)
    }
}

impl SportsRunnable {
    /// `overrides` are merged over the defaults `max_tokens = 50` and `temperature = 0.7`.
    pub fn new(overrides: Option<JsonMap>) -> Self {
        let mut configurable = default_configurable();
        configurable.extend(overrides.unwrap_or_default());
        let sports_data = BTreeMap::from([
            ("USA".to_string(), CountrySports::new(
                &["Basketball", "American Football", "Baseball"],
                "Baseball",
                &["NBA", "NFL", "MLB"],
            )),
            ("India".to_string(), CountrySports::new(
                &["Cricket", "Hockey", "Football"],
                "Hockey",
                &["IPL", "ISL", "Hockey India League"],
            )),
            ("Brazil".to_string(), CountrySports::new(
                &["Football", "Volleyball", "Formula 1"],
                "Football",
                &["Brasileirão", "Superliga", "Stock Car Brasil"],
            )),
        ]);
        info!("SportsRunnable initialized with {} countries", sports_data.len());
        Self {
            config: RunnableConfig {
                configurable,
                ..Default::default()
            },
            sports_data,
        }
    }

    pub fn config(&self) -> &RunnableConfig {
        &self.config
    }

    pub fn supported_countries(&self) -> Vec<&str> {
        self.sports_data.keys().map(String::as_str).collect()
    }

    pub fn validate_input(&self, country: &str) -> Result<&CountrySports, LookupError> {
        if country.is_empty() {
            return Err(LookupError::MissingCountry);
        }
        self.sports_data
            .get(country)
            .ok_or_else(|| LookupError::UnknownCountry(country.to_string()))
    }
}

#[async_trait]
impl Runnable for SportsRunnable {
    type Input = Variables;
    type Output = String;

    async fn invoke(&self, input: Variables) -> Result<String> {
        let country = input.get("country").map(|c| c.trim()).unwrap_or_default();
        let data = match self.validate_input(country) {
            Ok(data) => data,
            Err(err) => {
                error!("Error processing request: {}", err);
                return Ok(err.to_string());
            }
        };
        let response = format!(
            "Popular sports in {}:\n• Main sports: {}\n• National sport: {}\n• Popular leagues: {}",
            country,
            data.sports.join(", "),
            data.national_sport,
            data.popular_leagues.join(", "),
        );
        info!("Successfully processed request for country: {}", country);
        Ok(response)
    }
}

/// Three chains sharing one model: the country's top sports and details about one sport are asked first, then a
/// final prompt combines both answers.
pub struct SportDetailsPipeline<M> {
    country_chain: RunnableSequence<ChatPromptTemplate, Arc<M>>,
    sport_chain: RunnableSequence<ChatPromptTemplate, Arc<M>>,
    final_chain: RunnableSequence<ChatPromptTemplate, Arc<M>>,
}

impl<M> SportDetailsPipeline<M>
    where M: Runnable<Input=PromptValue, Output=AiMessage> {
    pub fn new(model: M) -> Self {
        let model = Arc::new(model);
        Self {
            country_chain: country_sports_template(3).pipe(model.clone()),
            sport_chain: sport_info_template().pipe(model.clone()),
            final_chain: final_info_template().pipe(model),
        }
    }

    /// The first two chains do not depend on each other and run concurrently.
    pub async fn run(&self, country: &str, sport: &str) -> Result<AiMessage> {
        let (country_sports, sport_details) = futures::try_join!(
            self.country_chain.invoke(variables([("country", country)])),
            self.sport_chain.invoke(variables([("sport", sport), ("country", country)]))
        )?;
        self.final_chain.invoke(variables([
            ("country", country),
            ("country_sports", country_sports.content.as_str()),
            ("sport_details", sport_details.content.as_str()),
        ])).await
    }
}
