//! # Prompt
//! A prompt is simply a string
//! ## PromptTemplate
//! A prompt template is a string with placeholders. Placeholders are written as `{name}`, and literal braces are
//! written doubled, `{{` and `}}`, so a template can carry JSON examples.
//!
//! A template may bind some placeholders up front via [PromptTemplate::partial]. Those are its partial variables;
//! the remaining placeholders are its [input variables](PromptTemplate::input_variables).
//!
//! ## Placeholder
//! A placeholder is an identifier wrapped in single braces, e.g. `{country}`. It can be filled with a value.
//!
//! ## PartialPrompt
//! A partial prompt is a prompt template with some placeholders filled. A partial prompt can be only constructed from a prompt template via [PromptTemplate::construct_prompt].
//!
//! The placeholders in a partial prompt can be filled with values via [PartialPrompt::try_fill]. You can also use it to update the filling values of the placeholders.
//! When all placeholders are filled, the partial prompt can be completed via [PartialPrompt::complete], in which the placeholders in a template are **actually** replaced with the filling values.
//!
//! ## Chat templates
//! See [chat] for role-tagged message templates.

pub mod chat;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use anyhow::Result;
use async_trait::async_trait;
use log::warn;
use crate::filler::{Fill, VariablesFiller};
use crate::prompt::chat::PromptValue;
use crate::prompt::errors::{PlaceholderNotExist, UnfilledPlaceholders};
use crate::runnable::Runnable;
use crate::utils::prompt_processing::{get_placeholders, replace_all_placeholders};

/// Values for named placeholders.
pub type Variables = HashMap<String, String>;

/// Build [Variables] from pairs.
///
/// ```
/// use chainprompt::prompt::variables;
/// let vars = variables([("country", "India")]);
/// assert_eq!(vars["country"], "India");
/// ```
pub fn variables<K, V>(pairs: impl IntoIterator<Item=(K, V)>) -> Variables
    where K: Into<String>, V: Into<String> {
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

/// A prompt template with some placeholders filled. A partial prompt can be only constructed from a prompt template via [PromptTemplate::construct_prompt].
#[derive(Debug, Clone)]
#[readonly::make]
pub struct PartialPrompt {
    /// The template of the partial prompt, readonly
    #[readonly]
    pub template: PromptTemplate,

    /// Mapping from placeholder name to its filling value
    pub(crate) placeholder_to_vals: HashMap<String, Option<String>>,

    /// Record the placeholders that are not filled yet
    pub(crate) unfilled_placeholders: HashSet<String>,
}

impl PartialPrompt {
    /// Fill the placeholders in the partial prompt with the given values.
    /// Returns an error if the placeholder does not exist.
    pub fn try_fill(&mut self, placeholder: impl Into<String>, value: impl Into<String>) -> Result<&mut Self, PlaceholderNotExist> {
        let placeholder = placeholder.into();
        if self.placeholder_to_vals.contains_key(&placeholder) {
            self.unfilled_placeholders.remove(&placeholder);
            self.placeholder_to_vals.insert(placeholder, Some(value.into()));
            Ok(self)
        } else {
            Err(PlaceholderNotExist::new(placeholder, value, &self.template.placeholders))
        }
    }

    /// Like [PartialPrompt::try_fill], but a placeholder the template does not have is skipped with a warning.
    pub fn fill(&mut self, placeholder: impl Into<String>, value: impl Into<String>) -> &mut Self {
        if let Err(err) = self.try_fill(placeholder, value) {
            warn!("{}", err);
        }
        self
    }

    /// Whether every placeholder has a value.
    pub fn is_complete(&self) -> bool {
        self.unfilled_placeholders.is_empty()
    }

    /// Complete the partial prompt and return the completed prompt.
    /// Returns an error if there are still unfilled placeholders.
    pub fn complete(&self) -> Result<String, UnfilledPlaceholders> {
        if self.is_complete() {
            Ok(replace_all_placeholders(self.template.str(), &self.placeholder_to_vals))
        } else {
            let mut all_placeholders: Vec<String> = self.template.placeholders.iter().cloned().collect();
            let mut unfilled_placeholders: Vec<String> = self.unfilled_placeholders.iter().cloned().collect();
            all_placeholders.sort();
            unfilled_placeholders.sort();
            Err(UnfilledPlaceholders {
                all_placeholders,
                unfilled_placeholders,
            })
        }
    }
}

/// A prompt template with placeholders and, optionally, partial variables bound ahead of time.
#[derive(Debug, Clone)]
#[readonly::make]
pub struct PromptTemplate {
    /// The template of the partial prompt, immutable
    template: Arc<String>,

    /// The placeholders in the template, readonly
    #[readonly]
    pub placeholders: HashSet<String>,

    /// Placeholders bound when the template was defined, readonly
    #[readonly]
    pub partial_variables: Arc<Variables>,
}

impl PromptTemplate {
    /// Create a prompt template from a string. Warns if the template does not have any placeholder.
    pub fn new(template: impl Into<String>) -> Self {
        let template = Self::parse(template);
        if template.placeholders.is_empty() {
            warn!("Your prompt template does not have a placeholder. If this is intended, ignore this message. \
            Otherwise, check whether you have written placeholders correctly.\n\
            Got prompt template:\n\
            {}", template.str());
        }
        template
    }

    /// Same as [PromptTemplate::new] but silent about templates without placeholders.
    pub(crate) fn parse(template: impl Into<String>) -> Self {
        let template = template.into();
        let placeholders = get_placeholders(&template);
        Self {
            template: Arc::new(template),
            placeholders,
            partial_variables: Arc::new(Variables::new()),
        }
    }

    /// Bind a placeholder ahead of time. Every prompt constructed afterward starts with it filled.
    pub fn partial(mut self, placeholder: impl Into<String>, value: impl Into<String>) -> Result<Self, PlaceholderNotExist> {
        let placeholder = placeholder.into();
        if !self.placeholders.contains(&placeholder) {
            return Err(PlaceholderNotExist::new(placeholder, value, &self.placeholders));
        }
        Arc::make_mut(&mut self.partial_variables).insert(placeholder, value.into());
        Ok(self)
    }

    /// Placeholders that callers still have to supply, sorted by name.
    pub fn input_variables(&self) -> Vec<String> {
        let mut input_variables: Vec<String> = self.placeholders.iter()
            .filter(|p| !self.partial_variables.contains_key(*p))
            .cloned()
            .collect();
        input_variables.sort();
        input_variables
    }

    /// Get the prompt template as a string.
    #[inline]
    pub fn str(&self) -> &str {
        &self.template
    }

    /// Construct a partial prompt from the prompt template, with partial variables already filled.
    pub fn construct_prompt(&self) -> PartialPrompt {
        let placeholder_to_vals: HashMap<String, Option<String>> = self.placeholders.iter()
            .map(|p| (p.clone(), self.partial_variables.get(p).cloned()))
            .collect();
        let unfilled_placeholders = placeholder_to_vals.iter()
            .filter(|(_, v)| v.is_none())
            .map(|(p, _)| p.clone())
            .collect();
        PartialPrompt {
            template: self.clone(),
            placeholder_to_vals,
            unfilled_placeholders,
        }
    }

    /// Fill the template with `variables` and complete it. Variables the template does not use are ignored.
    pub fn format(&self, variables: &Variables) -> Result<String> {
        let mut partial_prompt = self.construct_prompt();
        VariablesFiller::new(variables.clone()).fill(&mut partial_prompt)?;
        Ok(partial_prompt.complete()?)
    }
}

#[async_trait]
impl Runnable for PromptTemplate {
    type Input = Variables;
    type Output = PromptValue;

    async fn invoke(&self, input: Variables) -> Result<PromptValue> {
        self.format(&input).map(PromptValue::Text)
    }
}

pub mod errors {
    use std::collections::HashSet;
    use std::error::Error;
    use std::fmt;
    use std::fmt::Formatter;

    /// Error when trying to complete a partial prompt but there are still unfilled placeholders.
    #[derive(Debug)]
    pub struct UnfilledPlaceholders {
        pub unfilled_placeholders: Vec<String>,
        pub all_placeholders: Vec<String>,
    }

    impl fmt::Display for UnfilledPlaceholders {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            write!(f, "UnfilledPlaceholders: to complete the prompt template,\n  Requires Placeholders:{:?}\n  Unfilled Placeholders:{:?}",
                   self.all_placeholders, self.unfilled_placeholders)
        }
    }

    impl Error for UnfilledPlaceholders {}

    /// Error when trying to fill a placeholder that does not exist in the prompt template of the partial prompt.
    #[derive(Debug)]
    pub struct PlaceholderNotExist {
        pub try_fill_placeholder: String,
        pub value: String,
        pub available_placeholders: Vec<String>,
    }

    impl PlaceholderNotExist {
        pub(crate) fn new(try_fill_placeholder: impl Into<String>,
                          value: impl Into<String>,
                          available_placeholders: &HashSet<String>) -> Self {
            let mut available_placeholders: Vec<String> = available_placeholders.iter().cloned().collect();
            available_placeholders.sort();
            PlaceholderNotExist {
                try_fill_placeholder: try_fill_placeholder.into(),
                value: value.into(),
                available_placeholders,
            }
        }
    }

    impl fmt::Display for PlaceholderNotExist {
        fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
            write!(f, "PlaceholderNotExist: try to fill placeholder = {} with value = {}, but available placeholders are {:?}",
                   self.try_fill_placeholder,
                   self.value,
                   self.available_placeholders)
        }
    }

    impl Error for PlaceholderNotExist {}
}

#[cfg(test)]
mod test_prompt {
    use super::errors::{PlaceholderNotExist, UnfilledPlaceholders};
    use super::{variables, PromptTemplate};
    use crate::prompt::chat::PromptValue;
    use crate::runnable::Runnable;

    #[test]
    fn test_format_fills_placeholders() {
        let template = PromptTemplate::new("What are the three top sports played in {country}?");
        let prompt = template.format(&variables([("country", "India")])).unwrap();
        assert_eq!("What are the three top sports played in India?", prompt);
    }

    #[test]
    fn test_format_ignores_extra_variables() {
        let template = PromptTemplate::new("Hello {name}");
        let prompt = template.format(&variables([("name", "Ada"), ("unused", "x")])).unwrap();
        assert_eq!("Hello Ada", prompt);
    }

    #[test]
    fn test_format_reports_missing_variables() {
        let template = PromptTemplate::new("{sport} in {country}");
        let err = template.format(&variables([("sport", "Cricket")])).unwrap_err();
        let err = err.downcast::<UnfilledPlaceholders>().unwrap();
        assert_eq!(vec!["country".to_string()], err.unfilled_placeholders);
        assert_eq!(vec!["country".to_string(), "sport".to_string()], err.all_placeholders);
    }

    #[test]
    fn test_partial_variables() {
        let template = PromptTemplate::new("Medals won by {country1} or {country2} in {year}?")
            .partial("country1", "India")
            .unwrap();
        assert_eq!(vec!["country2".to_string(), "year".to_string()], template.input_variables());

        let partial_prompt = template.construct_prompt();
        assert!(!partial_prompt.is_complete());

        let prompt = template.format(&variables([("country2", "Kenya"), ("year", "2016")])).unwrap();
        assert_eq!("Medals won by India or Kenya in 2016?", prompt);
    }

    #[test]
    fn test_partial_unknown_placeholder() {
        let err = PromptTemplate::new("{a}").partial("b", "x").unwrap_err();
        assert_eq!("b", err.try_fill_placeholder);
        assert_eq!(vec!["a".to_string()], err.available_placeholders);
    }

    #[test]
    fn test_try_fill() {
        let template = PromptTemplate::new("{a} and {b}");
        let mut partial_prompt = template.construct_prompt();
        partial_prompt.try_fill("a", "alice").unwrap();
        assert!(partial_prompt.complete().is_err());
        partial_prompt.try_fill("b", "bob").unwrap();
        // refilling overrides the previous value
        partial_prompt.try_fill("a", "ann").unwrap();
        assert_eq!("ann and bob", partial_prompt.complete().unwrap());

        let err: PlaceholderNotExist = partial_prompt.try_fill("c", "carol").unwrap_err();
        assert_eq!("c", err.try_fill_placeholder);
    }

    #[test]
    fn test_fill_skips_unknown() {
        let template = PromptTemplate::new("{a} and {b}");
        let mut partial_prompt = template.construct_prompt();
        partial_prompt.fill("a", "alice").fill("c", "carol").fill("b", "bob");
        assert_eq!("alice and bob", partial_prompt.complete().unwrap());
    }

    #[test]
    fn test_escaped_json_example() {
        let template = PromptTemplate::new("Sports in {country} as {{\"sports\": []}}");
        assert_eq!(vec!["country".to_string()], template.input_variables());
        let prompt = template.format(&variables([("country", "Brazil")])).unwrap();
        assert_eq!("Sports in Brazil as {\"sports\": []}", prompt);
    }

    #[tokio::test]
    async fn test_invoke_yields_text() {
        let template = PromptTemplate::new("capital of {country}");
        let value = template.invoke(variables([("country", "India")])).await.unwrap();
        assert_eq!(PromptValue::Text("capital of India".to_string()), value);
    }
}
