//! # ccd-generation
//!
//! The bounded-retry generation driver and its persistence sink.
//!
//! A run builds one request payload from the transcript, then repeats
//! request → parse → encode until a document encodes cleanly or the attempt
//! budget is spent. Service failures, parse failures and encoding failures
//! all draw from the same budget. Output is written once, only on success.

mod driver;
mod sink;

pub use driver::{AttemptFailure, GenerationDriver, GenerationReport};
pub use sink::{encode_pretty, DocumentSink, JsonFileSink};
