//! LLM-backed decision source

pub mod client;
pub mod parser;
pub mod source;

pub use client::LlmClient;
pub use source::LlmDecisionSource;
