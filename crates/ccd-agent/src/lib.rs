//! # ccd-agent
//!
//! Everything that talks to, or interprets, the generative text service:
//!
//! - [`TextGenerator`]: the seam the generation driver calls through
//! - [`GeminiClient`]: production implementation over the Gemini REST API
//! - [`MockGenerator`]: scripted implementation for tests
//! - [`PromptBuilder`]: turns a transcript into the request payload
//! - [`DocumentParser`] / [`JsonDocumentParser`]: raw text to typed document

mod client;
mod generator;
mod parser;
mod prompt;
mod types;

pub use client::GeminiClient;
pub use generator::{MockGenerator, TextGenerator};
pub use parser::{extract_json, CcdParser, DocumentParser, JsonDocumentParser};
pub use prompt::{PromptBuilder, CCD_FORMAT_INSTRUCTIONS, CCD_QUERY_PREAMBLE};
pub use types::*;
