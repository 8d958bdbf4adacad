//! Prompt builder for transcript summarization
//!
//! The prompt has two halves:
//! - format instructions describing the JSON document the model must return
//! - the query, which carries the transcript lines verbatim

use ccd_core::{RequestPayload, Transcript};

/// Opening instruction placed before the transcript lines
pub const CCD_QUERY_PREAMBLE: &str = "Based on the therapy session transcript, summarize the patient's personal history following the below instructions. Note that `Client` means the patient in the transcript.";

/// Output format instructions for the CCD document
pub const CCD_FORMAT_INSTRUCTIONS: &str = r#"The output should be formatted as a JSON instance that conforms to the JSON schema below.

As an example, for the schema {"properties": {"foo": {"title": "Foo", "description": "a list of strings", "type": "array", "items": {"type": "string"}}}, "required": ["foo"]}
the object {"foo": ["bar", "baz"]} is a well-formatted instance of the schema. The object {"properties": {"foo": ["bar", "baz"]}} is not well-formatted.

Here is the output schema:
```
{"title": "CognitiveConceptualizationDiagram", "type": "object", "properties": {"relevant_history": {"description": "Life history and childhood data relevant to the patient's presenting problem", "type": "string"}, "core_beliefs": {"description": "The patient's deepest beliefs about self, others and the world", "type": "array", "items": {"type": "string"}}, "intermediate_beliefs": {"type": "object", "properties": {"rules": {"type": "array", "items": {"type": "string"}}, "attitudes": {"type": "array", "items": {"type": "string"}}, "assumptions": {"type": "array", "items": {"type": "string"}}}}, "coping_strategies": {"description": "Behaviors the patient uses to cope with the core beliefs", "type": "array", "items": {"type": "string"}}, "situations": {"type": "array", "items": {"type": "object", "properties": {"situation": {"type": "string"}, "automatic_thought": {"type": "string"}, "meaning_of_automatic_thought": {"type": "string"}, "emotion": {"type": "string"}, "behavior": {"type": "string"}}, "required": ["situation", "automatic_thought", "meaning_of_automatic_thought", "emotion", "behavior"]}}}, "required": ["relevant_history", "core_beliefs"]}
```

Respond with the JSON object only."#;

/// Builds the request payload sent to the generative service
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    preamble: String,
    format_instructions: String,
}

impl PromptBuilder {
    /// Builder with custom query preamble and format instructions
    pub fn new(preamble: impl Into<String>, format_instructions: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
            format_instructions: format_instructions.into(),
        }
    }

    /// Builder for Cognitive Conceptualization Diagram extraction
    pub fn for_ccd() -> Self {
        Self::new(CCD_QUERY_PREAMBLE, CCD_FORMAT_INSTRUCTIONS)
    }

    /// Build the payload for a transcript
    ///
    /// Deterministic: identical transcripts yield identical payloads. An
    /// empty transcript is forwarded as an empty query body.
    pub fn build(&self, transcript: &Transcript) -> RequestPayload {
        let mut query = String::new();
        query.push_str(&self.preamble);
        query.push_str("\n\n");
        for line in transcript.lines() {
            query.push_str(line);
            query.push('\n');
        }

        let mut prompt = String::new();
        prompt.push_str("Answer the user query.\n");
        prompt.push_str(&self.format_instructions);
        prompt.push('\n');
        prompt.push_str(&query);

        RequestPayload::new(prompt)
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::for_ccd()
    }
}
