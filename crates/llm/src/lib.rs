//! LLM provider infrastructure adapter.
//!
//! Implements the [`pipeline::LlmProvider`] trait for OpenAI-compatible
//! chat-completions endpoints (OpenAI itself, Azure-style proxies, local
//! servers that speak the same protocol). Additional providers are added as
//! new modules in this crate without any changes to the `pipeline` crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** All HTTP transport, request formatting, response
//! parsing and status-code mapping live here. The [`pipeline`] crate sees only
//! [`pipeline::LlmProvider`] and [`pipeline::LlmError`].

pub mod openai;

pub use openai::{OpenAiConfig, OpenAiProvider, OPENAI_BASE_URL};
