//! Docsmith LLM - language model client
//!
//! This module integrates with siumai to provide the completion service used by
//! the summarizer and both generation passes.

pub mod client;

pub use client::*;
