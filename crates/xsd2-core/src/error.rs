//! Error types for type-model transformation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable, machine-readable error codes.
///
/// Serialized as `snake_case` strings; once published the names must not
/// change, since tooling around the CLI matches on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorCode {
    /// Malformed IR or options JSON.
    JsonParseError,
    /// A literal was expected where an expression was found, or an option is
    /// out of its valid domain.
    ConfigurationOrSchemaMismatch,
    /// No unique name could be assigned after disambiguation.
    UniquenessViolation,
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration or schema mismatch at {node}: {message}")]
    ConfigurationOrSchemaMismatch { node: String, message: String },

    #[error("Cannot assign a unique name in {scope} for {}", .names.join(", "))]
    UniquenessViolation { scope: String, names: Vec<String> },
}

impl TransformError {
    pub(crate) fn mismatch(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigurationOrSchemaMismatch {
            node: node.into(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_option(option: &str, message: impl Into<String>) -> Self {
        Self::mismatch(format!("option `{option}`"), message)
    }

    /// Qualify the offending node with the node that contains it.
    pub(crate) fn within(self, parent: &str) -> Self {
        match self {
            Self::ConfigurationOrSchemaMismatch { node, message } => {
                Self::ConfigurationOrSchemaMismatch {
                    node: format!("{parent}, {node}"),
                    message,
                }
            }
            other => other,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Json(_) => ErrorCode::JsonParseError,
            Self::ConfigurationOrSchemaMismatch { .. } => ErrorCode::ConfigurationOrSchemaMismatch,
            Self::UniquenessViolation { .. } => ErrorCode::UniquenessViolation,
        }
    }
}
