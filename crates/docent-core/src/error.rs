use thiserror::Error;

/// Top-level error type for the Docent system.
///
/// The retrieval core raises typed variants (`DimensionMismatch`, `InvalidK`,
/// `CorpusNotFound`, ...) so callers can distinguish expected, user-facing
/// conditions from internal faults. None of these are retried internally;
/// retry policy belongs to the calling layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid k: {0} (must be at least 1)")]
    InvalidK(usize),

    #[error("Corpus not found: {0}")]
    CorpusNotFound(String),

    #[error("Corpus corrupt: {0}")]
    CorpusCorrupt(String),

    #[error("Query is empty")]
    InvalidQuery,

    #[error("No relevant result for the query")]
    NoRelevantResult,

    #[error("Embedding gateway error: {0}")]
    EmbeddingGateway(String),

    #[error("Build error: {0}")]
    Build(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("API error: {0}")]
    Api(String),
}

impl DocentError {
    /// True for conditions a client caused or can recover from by changing
    /// its request; false for internal faults.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            DocentError::CorpusNotFound(_)
                | DocentError::NoRelevantResult
                | DocentError::InvalidQuery
        )
    }
}

impl From<toml::de::Error> for DocentError {
    fn from(err: toml::de::Error) -> Self {
        DocentError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for DocentError {
    fn from(err: toml::ser::Error) -> Self {
        DocentError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for DocentError {
    fn from(err: serde_json::Error) -> Self {
        DocentError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Docent operations.
pub type Result<T> = std::result::Result<T, DocentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DocentError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let err = DocentError::DimensionMismatch {
            expected: 384,
            actual: 512,
        };
        assert_eq!(err.to_string(), "Dimension mismatch: expected 384, got 512");
    }

    #[test]
    fn test_invalid_k_display() {
        let err = DocentError::InvalidK(0);
        assert_eq!(err.to_string(), "Invalid k: 0 (must be at least 1)");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DocentError = io_err.into();
        assert!(matches!(err, DocentError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let bad_toml = "invalid = [[[";
        let parsed: std::result::Result<toml::Value, _> = toml::from_str(bad_toml);
        let err: DocentError = parsed.unwrap_err().into();
        assert!(matches!(err, DocentError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let bad_json = "{ invalid json }";
        let parsed: std::result::Result<serde_json::Value, _> = serde_json::from_str(bad_json);
        let err: DocentError = parsed.unwrap_err().into();
        assert!(matches!(err, DocentError::Serialization(_)));
    }

    #[test]
    fn test_expected_vs_internal() {
        assert!(DocentError::CorpusNotFound("x".into()).is_expected());
        assert!(DocentError::NoRelevantResult.is_expected());
        assert!(DocentError::InvalidQuery.is_expected());
        assert!(!DocentError::CorpusCorrupt("x".into()).is_expected());
        assert!(!DocentError::Build("x".into()).is_expected());
        assert!(!DocentError::EmbeddingGateway("x".into()).is_expected());
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let _value = io_result?;
            Ok("success".to_string())
        }

        assert_eq!(inner().unwrap(), "success");
    }
}
