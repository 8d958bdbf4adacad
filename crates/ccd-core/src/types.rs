//! Domain types for transcript-to-CCD generation

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{CcdError, Result};

/// A recorded therapy session, one entry per line of the source file
///
/// Immutable once loaded. An empty file yields an empty transcript, which is
/// still a valid input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    lines: Vec<String>,
}

impl Transcript {
    /// Build a transcript from already-split lines
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Read a transcript file, splitting it into lines
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|source| CcdError::TranscriptRead {
                path: path.to_path_buf(),
                source,
            })?;

        let transcript = Self::from_lines(content.lines());
        tracing::debug!(
            "Loaded transcript {} ({} lines)",
            path.display(),
            transcript.len()
        );
        Ok(transcript)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// The single request sent to the generative service for a run
///
/// Built once from the transcript and reused verbatim on every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPayload {
    text: String,
}

impl RequestPayload {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Cognitive Conceptualization Diagram extracted from a session transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CognitiveConceptualizationDiagram {
    /// Life history and childhood data relevant to the presenting problem
    pub relevant_history: String,

    /// Deepest beliefs about self, others and the world
    pub core_beliefs: Vec<String>,

    #[serde(default)]
    pub intermediate_beliefs: IntermediateBeliefs,

    /// Behaviors the patient uses to cope with the core beliefs
    #[serde(default)]
    pub coping_strategies: Vec<String>,

    #[serde(default)]
    pub situations: Vec<Situation>,
}

/// Rules, attitudes and assumptions sitting between core beliefs and thoughts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntermediateBeliefs {
    #[serde(default)]
    pub rules: Vec<String>,
    #[serde(default)]
    pub attitudes: Vec<String>,
    #[serde(default)]
    pub assumptions: Vec<String>,
}

/// One triggering situation and the patient's reaction chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Situation {
    pub situation: String,
    pub automatic_thought: String,
    pub meaning_of_automatic_thought: String,
    pub emotion: String,
    pub behavior: String,
}
