use std::error::Error;
use std::fmt;
use std::fmt::Formatter;
use std::marker::PhantomData;
use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{from_str, Value};
use crate::runnable::Runnable;
use crate::utils::llm::AiMessage;


/// Filters invalid content and tries to parse the valid json string.
///
/// A fenced block (```` ```json ```` or a bare fence holding an object) wins over surrounding prose; otherwise the
/// text between the first `{` and the last `}` is parsed.
///
/// Returns a [serde_json::Value] if the string is valid json else an [InvalidJSON] error.
///
/// # Example
/// ```
/// use chainprompt::utils::postprocess::json::filter_to_json;
/// let valid_str = "partially valid: {\"a\":\"alice\"}";
/// let json_value = filter_to_json(valid_str).expect("Expect to be fine but failed");
/// assert_eq!(json_value["a"], "alice");
///
/// let invalid_str = "partially valid: \"a\":\"alice\"}";
/// assert_eq!(filter_to_json(invalid_str).is_err(), true)
/// ```
pub fn filter_to_json(string: impl Into<String>) -> Result<Value> {
    let string = string.into();
    let candidate = strip_code_fence(&string).unwrap_or(&string);
    let left_brace_idx = candidate.find('{');
    let right_brace_idx = candidate.rfind('}');
    match (left_brace_idx, right_brace_idx) {
        (Some(lbi), Some(rbi)) if lbi < rbi => {
            let value = from_str(&candidate[lbi..=rbi])?;
            Ok(value)
        }
        _ => Err(InvalidJSON { invalid_string: string }.into())
    }
}

fn strip_code_fence(text: &str) -> Option<&str> {
    if let Some(start) = text.find("```json") {
        let content = &text[start + 7..];
        return content.find("```").map(|end| content[..end].trim());
    }
    let start = text.find("```")?;
    let content = &text[start + 3..];
    let end = content.find("```")?;
    let inner = content[..end].trim();
    inner.starts_with('{').then_some(inner)
}

/// Parses a model reply into `T`. The shape of `T` is the contract: a reply missing a required field is an error.
/// Use `T = serde_json::Value` to accept any JSON object.
#[derive(Debug, Clone, Copy)]
pub struct JsonOutputParser<T> {
    _shape: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> JsonOutputParser<T> {
    pub fn new() -> Self {
        Self { _shape: PhantomData }
    }

    pub fn parse(&self, text: &str) -> Result<T> {
        let value = filter_to_json(text)?;
        Ok(serde_json::from_value(value)?)
    }
}

impl<T: DeserializeOwned> Default for JsonOutputParser<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> Runnable for JsonOutputParser<T>
    where T: DeserializeOwned + Send + 'static {
    type Input = AiMessage;
    type Output = T;

    async fn invoke(&self, input: AiMessage) -> Result<T> {
        self.parse(&input.content)
    }
}

/// Error when the string is not a valid json.
#[derive(Debug, Clone)]
pub struct InvalidJSON {
    pub invalid_string: String,
}


impl fmt::Display for InvalidJSON {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid string to be parsed:\n{}", self.invalid_string)
    }
}

impl Error for InvalidJSON {}
