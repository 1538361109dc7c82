use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("empty or blank input")]
    EmptyInput,
    #[error("failed to parse input as JSON ({snippet}): {source}")]
    Parse {
        snippet: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid resource: {0}")]
    Schema(String),
    #[error("nothing mappable: {0}")]
    Transformation(String),
    #[error("all {failed} items failed; first error: {first}")]
    AllItemsFailed {
        failed: usize,
        #[source]
        first: Box<CoreError>,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Overrides(#[from] fhir::FhirError),
    #[error("failed to read {path}: {source}", path = path.display())]
    FileRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}", path = path.display())]
    FileWrite {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize aggregate: {0}")]
    Serialization(serde_json::Error),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Failure taxonomy used when recording outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    ParseError,
    ValidationError,
    SchemaError,
    TransformationError,
    SystemError,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::ParseError => "parse_error",
            ErrorCategory::ValidationError => "validation_error",
            ErrorCategory::SchemaError => "schema_error",
            ErrorCategory::TransformationError => "transformation_error",
            ErrorCategory::SystemError => "system_error",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CoreError {
    /// Category recorded for this error.
    ///
    /// An all-failed array takes the category of its first failure.
    pub fn category(&self) -> ErrorCategory {
        match self {
            CoreError::Parse { .. } => ErrorCategory::ParseError,
            CoreError::EmptyInput | CoreError::InvalidConfig(_) | CoreError::Overrides(_) => {
                ErrorCategory::ValidationError
            }
            CoreError::Schema(_) => ErrorCategory::SchemaError,
            CoreError::Transformation(_) => ErrorCategory::TransformationError,
            CoreError::AllItemsFailed { first, .. } => first.category(),
            CoreError::FileRead { .. }
            | CoreError::FileWrite { .. }
            | CoreError::Serialization(_) => ErrorCategory::SystemError,
        }
    }
}
