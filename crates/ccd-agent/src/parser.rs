//! Structured parsing of raw model output

use ccd_core::{CcdError, CognitiveConceptualizationDiagram, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

const EXCERPT_CHARS: usize = 500;

/// Maps raw response text onto a typed document
pub trait DocumentParser: Send + Sync {
    /// Document type produced on success
    type Document: Serialize;

    /// Parse raw response text, failing with [`CcdError::Parse`]
    fn parse(&self, raw: &str) -> Result<Self::Document>;
}

/// Parser for JSON responses, tolerant of markdown code fences
pub struct JsonDocumentParser<D> {
    _document: PhantomData<fn() -> D>,
}

/// Parser producing Cognitive Conceptualization Diagrams
pub type CcdParser = JsonDocumentParser<CognitiveConceptualizationDiagram>;

impl<D> JsonDocumentParser<D> {
    pub fn new() -> Self {
        Self {
            _document: PhantomData,
        }
    }
}

impl<D> Default for JsonDocumentParser<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> DocumentParser for JsonDocumentParser<D>
where
    D: DeserializeOwned + Serialize,
{
    type Document = D;

    fn parse(&self, raw: &str) -> Result<D> {
        let json_text = extract_json(raw);

        serde_json::from_str(json_text).map_err(|e| {
            let excerpt: String = raw.chars().take(EXCERPT_CHARS).collect();
            CcdError::Parse(format!(
                "{} at line {}, column {}\n\nFirst {} chars: {}",
                e,
                e.line(),
                e.column(),
                EXCERPT_CHARS,
                excerpt
            ))
        })
    }
}

/// Markdown code fence delimiter
const FENCE: &str = "```";

/// Object or array openers that mark a fenced line as JSON rather than an info string
const JSON_OPENERS: [char; 2] = ['{', '['];

/// Body of the first fenced code block, or the trimmed text if there is none
///
/// The first line of a block is dropped when it is an info string such as
/// `json` or `JSON`. An unclosed fence leaves the text untouched.
pub fn extract_json(text: &str) -> &str {
    let text = text.trim();

    let Some(open) = text.find(FENCE) else {
        return text;
    };
    let rest = &text[open + FENCE.len()..];
    let Some(close) = rest.find(FENCE) else {
        return text;
    };
    let block = &rest[..close];

    let body = match block.split_once('\n') {
        Some((info, body)) if !info.trim_start().starts_with(JSON_OPENERS) => body,
        _ => block,
    };
    body.trim()
}
