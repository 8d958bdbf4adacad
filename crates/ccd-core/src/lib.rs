//! # ccd-core
//!
//! Core types for turning therapy-session transcripts into Cognitive
//! Conceptualization Diagrams (CCDs).
//!
//! ## Contents
//!
//! - [`Transcript`] and [`RequestPayload`], the input side of a run
//! - [`CognitiveConceptualizationDiagram`], the structured output document
//! - [`CcdError`], the unified error type shared by every crate
//! - [`GenerationConfig`], environment-sourced run configuration

mod config;
mod error;
mod types;

pub use config::{load_dotenv, GenerationConfig, DEFAULT_API_BASE, DEFAULT_MODEL};
pub use error::{CcdError, Result};
pub use types::*;
