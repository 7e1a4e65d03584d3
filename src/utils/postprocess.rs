//! Output parsers: turn a model reply into a value the application can use.
//!
//! * [StrOutputParser](string::StrOutputParser) keeps the reply text.
//! * [JsonOutputParser](json::JsonOutputParser) digs a JSON object out of the reply and deserializes it into a typed
//!   shape, rejecting replies that do not match.

pub mod json;
pub mod string;

pub use json::JsonOutputParser;
pub use string::StrOutputParser;
