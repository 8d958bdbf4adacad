//! Bounded-retry generation driver
//!
//! States: Building → Requesting → Parsing → Validating, ending in either
//! Persisted (success) or an exhaustion error. Every failed attempt, whatever
//! its kind, increments the same counter exactly once. The payload is built
//! once and resent unchanged; there is no backoff between attempts.

use crate::sink::{encode_pretty, DocumentSink};
use ccd_agent::{DocumentParser, PromptBuilder, TextGenerator};
use ccd_core::{CcdError, RequestPayload, Result, Transcript};
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Why a single attempt did not produce a persistable document
#[derive(Debug)]
pub enum AttemptFailure {
    /// The generative service call failed
    Service(CcdError),
    /// The response did not map onto the document type
    Parse(CcdError),
    /// The parsed document could not be encoded as JSON
    ///
    /// Always holds [`CcdError::Serialization`].
    NotSerializable(CcdError),
}

impl AttemptFailure {
    /// Short label used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            AttemptFailure::Service(_) => "service",
            AttemptFailure::Parse(_) => "parse",
            AttemptFailure::NotSerializable(_) => "serialization",
        }
    }

    /// Terminal error once the attempt budget is spent on this failure
    pub fn into_exhausted(self, attempts: u32) -> CcdError {
        match self {
            AttemptFailure::Service(last) | AttemptFailure::Parse(last) => {
                CcdError::ServiceExhausted {
                    attempts,
                    last: Box::new(last),
                }
            }
            AttemptFailure::NotSerializable(CcdError::Serialization(e)) => {
                CcdError::SerializationExhausted {
                    attempts,
                    reason: e.to_string(),
                }
            }
            AttemptFailure::NotSerializable(other) => CcdError::SerializationExhausted {
                attempts,
                reason: other.to_string(),
            },
        }
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Service(e)
            | AttemptFailure::Parse(e)
            | AttemptFailure::NotSerializable(e) => write!(f, "{}", e),
        }
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct GenerationReport<D> {
    /// The parsed document that was persisted
    pub document: D,
    /// Attempts used, including the successful one
    pub attempts: u32,
    /// Where the document was written
    pub location: PathBuf,
    /// Size of the written output
    pub bytes_written: usize,
    /// When the output was persisted
    pub completed_at: DateTime<Utc>,
}

/// Drives request → parse → encode → persist under a fixed attempt budget
pub struct GenerationDriver<G, P, S> {
    generator: G,
    parser: P,
    sink: S,
    prompt: PromptBuilder,
    max_attempts: u32,
}

impl<G, P, S> GenerationDriver<G, P, S>
where
    G: TextGenerator,
    P: DocumentParser,
    S: DocumentSink,
{
    /// Create a driver using the CCD prompt
    pub fn new(generator: G, parser: P, sink: S, max_attempts: u32) -> Self {
        Self {
            generator,
            parser,
            sink,
            prompt: PromptBuilder::for_ccd(),
            max_attempts,
        }
    }

    /// Replace the prompt builder
    pub fn with_prompt_builder(mut self, prompt: PromptBuilder) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run the attempt loop for a transcript
    ///
    /// Returns the persisted document, or an exhaustion error once
    /// `max_attempts` attempts have failed. Nothing is written unless an
    /// attempt both parses and encodes. A failed write is returned at once
    /// without consuming further attempts.
    pub async fn run(&self, transcript: &Transcript) -> Result<GenerationReport<P::Document>> {
        if self.max_attempts == 0 {
            return Err(CcdError::Config(
                "max attempts must be at least 1".to_string(),
            ));
        }

        let payload = self.prompt.build(transcript);
        info!(
            "Generating document from {} transcript lines (max {} attempts)",
            transcript.len(),
            self.max_attempts
        );

        let mut attempts: u32 = 0;
        loop {
            debug!("Attempt {}/{}", attempts + 1, self.max_attempts);

            let failure = match self.attempt(&payload).await {
                Ok((document, encoded)) => {
                    attempts += 1;
                    return self.persist(document, encoded, attempts);
                }
                Err(failure) => failure,
            };

            attempts += 1;
            if attempts >= self.max_attempts {
                error!(
                    "Max attempts reached ({}/{}), last {} failure: {}",
                    attempts,
                    self.max_attempts,
                    failure.kind(),
                    failure
                );
                return Err(failure.into_exhausted(attempts));
            }

            warn!(
                "Attempt {}/{} failed ({}): {}",
                attempts,
                self.max_attempts,
                failure.kind(),
                failure
            );
        }
    }

    async fn attempt(
        &self,
        payload: &RequestPayload,
    ) -> std::result::Result<(P::Document, Vec<u8>), AttemptFailure> {
        let raw = self
            .generator
            .generate(payload)
            .await
            .map_err(AttemptFailure::Service)?;

        let document = self.parser.parse(&raw).map_err(AttemptFailure::Parse)?;

        // Parser success alone does not guarantee the document encodes
        let encoded = encode_pretty(&document)
            .map_err(|e| AttemptFailure::NotSerializable(CcdError::from(e)))?;

        Ok((document, encoded))
    }

    fn persist(
        &self,
        document: P::Document,
        encoded: Vec<u8>,
        attempts: u32,
    ) -> Result<GenerationReport<P::Document>> {
        self.sink.persist(&encoded)?;

        let location = self.sink.location().to_path_buf();
        info!(
            "Output successfully written to {} after {} attempt(s)",
            location.display(),
            attempts
        );

        Ok(GenerationReport {
            document,
            attempts,
            location,
            bytes_written: encoded.len(),
            completed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::JsonFileSink;
    use ccd_agent::{CcdParser, MockGenerator};

    const VALID: &str = r#"{"relevant_history": "h", "core_beliefs": ["b"]}"#;

    fn driver(
        generator: MockGenerator,
        dir: &tempfile::TempDir,
        max_attempts: u32,
    ) -> GenerationDriver<MockGenerator, CcdParser, JsonFileSink> {
        GenerationDriver::new(
            generator,
            CcdParser::new(),
            JsonFileSink::new(dir.path().join("ccd.json")),
            max_attempts,
        )
    }

    #[test]
    fn test_exhaustion_mapping() {
        let service = AttemptFailure::Service(CcdError::Api("boom".to_string()));
        assert_eq!(service.kind(), "service");
        assert!(matches!(
            service.into_exhausted(3),
            CcdError::ServiceExhausted { attempts: 3, .. }
        ));

        let parse = AttemptFailure::Parse(CcdError::Parse("bad json".to_string()));
        match parse.into_exhausted(2) {
            CcdError::ServiceExhausted { attempts, last } => {
                assert_eq!(attempts, 2);
                assert!(matches!(*last, CcdError::Parse(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let encode_err = <serde_json::Error as serde::ser::Error>::custom("unencodable");
        let not_serializable = AttemptFailure::NotSerializable(CcdError::from(encode_err));
        assert_eq!(not_serializable.kind(), "serialization");
        assert!(not_serializable.to_string().starts_with("Serialization error"));
        match not_serializable.into_exhausted(1) {
            CcdError::SerializationExhausted { attempts, reason } => {
                assert_eq!(attempts, 1);
                assert_eq!(reason, "unencodable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_zero_attempts_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let driver = driver(MockGenerator::always_responding(VALID), &dir, 0);

        let err = driver.run(&Transcript::default()).await.unwrap_err();
        assert!(matches!(err, CcdError::Config(_)));
        assert_eq!(driver.generator().calls(), 0);
    }

    #[tokio::test]
    async fn test_parse_failure_then_success() {
        let dir = tempfile::tempdir().unwrap();
        let generator = MockGenerator::new()
            .with_response("not json at all")
            .with_response(VALID);
        let driver = driver(generator, &dir, 3);

        let report = driver.run(&Transcript::from_lines(["Client: hi"])).await.unwrap();
        assert_eq!(report.attempts, 2);
        assert_eq!(report.document.core_beliefs, vec!["b"]);
        assert_eq!(driver.generator().calls(), 2);
    }

    #[tokio::test]
    async fn test_persist_failure_is_not_retried() {
        let dir = tempfile::tempdir().unwrap();
        let driver = GenerationDriver::new(
            MockGenerator::always_responding(VALID),
            CcdParser::new(),
            JsonFileSink::new(dir.path()),
            5,
        );

        let err = driver.run(&Transcript::default()).await.unwrap_err();
        assert!(matches!(err, CcdError::Persist { .. }));
        assert_eq!(driver.generator().calls(), 1);
    }
}
