//! Output encoding and persistence

use ccd_core::{CcdError, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::{Path, PathBuf};

/// Encode a value as pretty-printed JSON with 4-space indentation
///
/// The whole document is encoded into memory first, so an encoding failure
/// never leaves partial output behind.
pub fn encode_pretty<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Destination for an encoded document
pub trait DocumentSink: Send + Sync {
    /// Write the full contents, replacing anything already there
    fn persist(&self, contents: &[u8]) -> Result<()>;

    /// Where the contents end up, for logging and reporting
    fn location(&self) -> &Path;
}

/// Sink writing to a single file on disk
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DocumentSink for JsonFileSink {
    fn persist(&self, contents: &[u8]) -> Result<()> {
        let persist_err = |source: std::io::Error| CcdError::Persist {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(persist_err)?;
        }
        std::fs::write(&self.path, contents).map_err(persist_err)?;

        tracing::debug!("Wrote {} bytes to {}", contents.len(), self.path.display());
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.path
    }
}
