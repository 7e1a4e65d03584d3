//! # Application Samples
//!
//! Building blocks of the demos, kept in the library so they can be tested without a model endpoint:
//! * Sports Arena: prompt templates, typed JSON reply, local runnables and a multi-chain pipeline

pub mod sports_arena;
