//! Unified error types for CCD generation

use std::path::PathBuf;
use thiserror::Error;

/// Unified error type for all CCD generation operations
#[derive(Error, Debug)]
pub enum CcdError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Input errors
    #[error("Failed to read transcript {}: {source}", path.display())]
    TranscriptRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Service errors
    #[error("Generative API error: {0}")]
    Api(String),

    #[error("Response parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Output errors
    #[error("Failed to write output {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Exhaustion
    #[error("Generation failed after {attempts} attempts: {last}")]
    ServiceExhausted {
        attempts: u32,
        #[source]
        last: Box<CcdError>,
    },

    #[error("Could not produce a JSON serializable output after {attempts} attempts: {reason}")]
    SerializationExhausted { attempts: u32, reason: String },
}

impl CcdError {
    /// True for the terminal errors raised once the attempt budget is spent
    pub fn is_exhausted(&self) -> bool {
        matches!(
            self,
            CcdError::ServiceExhausted { .. } | CcdError::SerializationExhausted { .. }
        )
    }

    /// Number of attempts made, for exhaustion errors
    pub fn attempts(&self) -> Option<u32> {
        match self {
            CcdError::ServiceExhausted { attempts, .. }
            | CcdError::SerializationExhausted { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }
}

/// Result type alias using CcdError
pub type Result<T> = std::result::Result<T, CcdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhaustion_classification() {
        let service = CcdError::ServiceExhausted {
            attempts: 3,
            last: Box::new(CcdError::Api("503 Service Unavailable".to_string())),
        };
        assert!(service.is_exhausted());
        assert_eq!(service.attempts(), Some(3));

        let serialization = CcdError::SerializationExhausted {
            attempts: 2,
            reason: "key must be a string".to_string(),
        };
        assert!(serialization.is_exhausted());
        assert_eq!(serialization.attempts(), Some(2));

        let api = CcdError::Api("timeout".to_string());
        assert!(!api.is_exhausted());
        assert_eq!(api.attempts(), None);
    }

    #[test]
    fn test_service_exhausted_carries_last_error() {
        let err = CcdError::ServiceExhausted {
            attempts: 2,
            last: Box::new(CcdError::Parse("missing field `core_beliefs`".to_string())),
        };
        let message = err.to_string();
        assert!(message.contains("after 2 attempts"));
        assert!(message.contains("missing field `core_beliefs`"));
    }
}
