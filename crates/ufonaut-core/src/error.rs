//! Error types for collection conversion and post-processing.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable, machine-readable error codes.
///
/// Variant names and their serialized `snake_case` strings are part of the
/// public contract and must not change across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorCode {
    /// JSON (de)serialization error.
    JsonParseError,
    /// The OpenAPI document could not be read as JSON or YAML.
    DocumentParseError,
    /// File system access failed.
    IoError,
    /// Order, scripts or sets configuration is missing or empty.
    ConfigError,
    /// An authorization descriptor lacks a required field or names an unknown scheme.
    AuthValidationError,
    /// The OpenAPI → collection backend failed or produced an unexpected output.
    ConversionError,
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("JSON (de)serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse OpenAPI document: {0}")]
    DocumentParse(String),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Order list not provided or provided config contains no order entries")]
    OrderListEmpty,

    #[error("Scripts not provided or provided config contains no script entries")]
    ScriptsEmpty,

    #[error("Sets config is undefined or is incorrect")]
    SetsConfigInvalid,

    #[error("Username or password is missing")]
    BasicCredentialsMissing,

    #[error("Bearer token is missing")]
    BearerTokenMissing,

    #[error("Api key, key value or key location is missing")]
    ApiKeyMissing,

    #[error("Unsupported auth type: {0}")]
    UnsupportedAuthType(String),

    #[error("{0}")]
    ConversionFailed(String),

    #[error("Error while getting results. Conversion output array is not equal to 1")]
    ConversionOutputCount { count: usize },
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns the stable error code for this error variant.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ConvertError::JsonError(_) => ErrorCode::JsonParseError,
            ConvertError::DocumentParse(_) => ErrorCode::DocumentParseError,
            ConvertError::Io { .. } => ErrorCode::IoError,
            ConvertError::OrderListEmpty
            | ConvertError::ScriptsEmpty
            | ConvertError::SetsConfigInvalid => ErrorCode::ConfigError,
            ConvertError::BasicCredentialsMissing
            | ConvertError::BearerTokenMissing
            | ConvertError::ApiKeyMissing
            | ConvertError::UnsupportedAuthType(_) => ErrorCode::AuthValidationError,
            ConvertError::ConversionFailed(_) | ConvertError::ConversionOutputCount { .. } => {
                ErrorCode::ConversionError
            }
        }
    }

    /// Produces a structured JSON error.
    ///
    /// Format: `{"code": "...", "message": "..."}`
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.error_code(),
            "message": self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_messages_are_fixed_literals() {
        assert_eq!(
            ConvertError::OrderListEmpty.to_string(),
            "Order list not provided or provided config contains no order entries"
        );
        assert_eq!(
            ConvertError::ScriptsEmpty.to_string(),
            "Scripts not provided or provided config contains no script entries"
        );
        assert_eq!(
            ConvertError::SetsConfigInvalid.to_string(),
            "Sets config is undefined or is incorrect"
        );
    }

    #[test]
    fn test_unsupported_auth_type_includes_literal() {
        let err = ConvertError::UnsupportedAuthType("undefined".to_string());
        assert_eq!(err.to_string(), "Unsupported auth type: undefined");
        assert_eq!(err.error_code(), ErrorCode::AuthValidationError);
    }

    #[test]
    fn test_output_count_message_is_fixed() {
        let err = ConvertError::ConversionOutputCount { count: 2 };
        assert_eq!(
            err.to_string(),
            "Error while getting results. Conversion output array is not equal to 1"
        );
    }

    #[test]
    fn test_error_code_serializes_snake_case() {
        let json = serde_json::to_value(ErrorCode::AuthValidationError).unwrap();
        assert_eq!(json, json!("auth_validation_error"));
    }

    #[test]
    fn test_to_json_shape() {
        let json = ConvertError::BearerTokenMissing.to_json();
        assert_eq!(json["code"], json!("auth_validation_error"));
        assert_eq!(json["message"], json!("Bearer token is missing"));
    }
}
