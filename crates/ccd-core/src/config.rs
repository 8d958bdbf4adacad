//! Run configuration sourced from the process environment
//!
//! The configuration is read once at startup and passed explicitly into the
//! generation wiring. Required variables:
//!
//! - `DATA_PATH`: base directory for transcript inputs
//! - `OUT_PATH`: base directory for generated documents
//! - `GOOGLE_API_KEY`: Gemini API credential
//! - `MAX_ATTEMPTS`: positive retry bound
//!
//! Optional overrides: `GOOGLE_MODEL`, `GOOGLE_API_BASE`.
//!
//! Any of these may come from a `.env` file, see [`load_dotenv`]. Variables
//! already present in the process environment take precedence.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::{CcdError, Result};

/// Default Gemini model used when `GOOGLE_MODEL` is unset
pub const DEFAULT_MODEL: &str = "gemini-2.0-pro-exp-02-05";

/// Default Gemini API endpoint used when `GOOGLE_API_BASE` is unset
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Load variables from the nearest `.env` file into the process environment
///
/// Searches the working directory and its ancestors. A missing or unreadable
/// file is not an error; the returned path is the file that was loaded.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!("Loaded environment from {}", path.display());
            Some(path)
        }
        Err(e) => {
            tracing::debug!("No .env file loaded: {}", e);
            None
        }
    }
}

/// Configuration for a single generation run
#[derive(Clone)]
pub struct GenerationConfig {
    /// Directory transcript files are read from
    pub data_path: PathBuf,
    /// Directory output documents are written to
    pub out_path: PathBuf,
    /// Credential for the generative service
    pub api_key: String,
    /// Maximum number of attempts before giving up (always >= 1)
    pub max_attempts: u32,
    /// Model name passed to the generative service
    pub model: String,
    /// Base URL of the generative service
    pub api_base: String,
}

impl GenerationConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Empty values count as missing. Fails before any network activity so a
    /// misconfigured run never reaches the service.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| {
                CcdError::Config(format!("{} is not set", key))
            })
        };

        let data_path = PathBuf::from(require("DATA_PATH")?);
        let out_path = PathBuf::from(require("OUT_PATH")?);
        let api_key = require("GOOGLE_API_KEY")?;
        let max_attempts = parse_max_attempts(&require("MAX_ATTEMPTS")?)?;

        let model = get("GOOGLE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_base = get("GOOGLE_API_BASE")
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Ok(Self {
            data_path,
            out_path,
            api_key,
            max_attempts,
            model,
            api_base,
        })
    }

    /// Location of a transcript file inside the data directory
    pub fn transcript_path(&self, file_name: impl AsRef<Path>) -> PathBuf {
        self.data_path.join(file_name)
    }

    /// Location of an output file inside the output directory
    pub fn output_path(&self, file_name: impl AsRef<Path>) -> PathBuf {
        self.out_path.join(file_name)
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("data_path", &self.data_path)
            .field("out_path", &self.out_path)
            .field("api_key", &"<redacted>")
            .field("max_attempts", &self.max_attempts)
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .finish()
    }
}

fn parse_max_attempts(raw: &str) -> Result<u32> {
    let value: u32 = raw.trim().parse().map_err(|e| {
        CcdError::Config(format!(
            "MAX_ATTEMPTS must be a positive integer, got {:?}: {}",
            raw, e
        ))
    })?;

    if value == 0 {
        return Err(CcdError::Config(
            "MAX_ATTEMPTS must be at least 1".to_string(),
        ));
    }

    Ok(value)
}
