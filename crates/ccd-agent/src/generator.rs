//! Text generation abstraction

use async_trait::async_trait;
use ccd_core::{CcdError, RequestPayload, Result};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Trait for invoking a generative text service (allows mocking in tests)
///
/// Implementations perform exactly one service call per invocation and never
/// retry on their own; retry policy belongs to the caller.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send the payload and return the raw response text
    async fn generate(&self, payload: &RequestPayload) -> Result<String>;
}

/// Scripted generator for testing
///
/// Replays queued outcomes in order. Once the queue is drained every call
/// returns the fallback outcome, or an error if none was set.
#[derive(Default)]
pub struct MockGenerator {
    responses: Mutex<VecDeque<std::result::Result<String, String>>>,
    fallback: Option<std::result::Result<String, String>>,
    calls: AtomicUsize,
    payloads: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator that fails on every call
    pub fn always_failing(message: &str) -> Self {
        Self {
            fallback: Some(Err(message.to_string())),
            ..Self::default()
        }
    }

    /// Generator that returns the same text on every call
    pub fn always_responding(text: &str) -> Self {
        Self {
            fallback: Some(Ok(text.to_string())),
            ..Self::default()
        }
    }

    /// Queue a successful response
    pub fn with_response(self, text: &str) -> Self {
        self.push(Ok(text.to_string()));
        self
    }

    /// Queue a service failure
    pub fn with_failure(self, message: &str) -> Self {
        self.push(Err(message.to_string()));
        self
    }

    /// Number of times `generate` has been called
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Payload texts received, in call order
    pub fn payloads(&self) -> Vec<String> {
        self.payloads
            .lock()
            .map(|payloads| payloads.clone())
            .unwrap_or_default()
    }

    fn push(&self, outcome: std::result::Result<String, String>) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(outcome);
        }
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, payload: &RequestPayload) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut payloads) = self.payloads.lock() {
            payloads.push(payload.text().to_string());
        }

        let queued = self
            .responses
            .lock()
            .ok()
            .and_then(|mut responses| responses.pop_front());

        match queued.or_else(|| self.fallback.clone()) {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(CcdError::Api(message)),
            None => Err(CcdError::Api("No mock response queued".to_string())),
        }
    }
}
