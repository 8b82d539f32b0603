//! Language service client.
//!
//! The resolver only sees the [`LlmClient`] trait; [`OpenAiClient`] is the
//! production implementation and tests substitute a scripted one.

mod client;
mod error;
mod openai;

pub use client::{LlmClient, ToolDefinition, ToolSelection};
pub use error::LlmError;
pub use openai::OpenAiClient;
