//! CLI-specific error types

use std::fmt;
use std::io;

use crate::decode::DecodeError;
use crate::schema::SchemaDefinitionError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (files, stdin/stdout)
    IoError,
    /// Schema could not be found or is malformed
    SchemaError,
    /// Document does not match the schema
    DocumentMismatch,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "STRICT_CLI_CONFIG_ERROR",
            Self::IoError => "STRICT_CLI_IO_ERROR",
            Self::SchemaError => "STRICT_CLI_SCHEMA_ERROR",
            Self::DocumentMismatch => "STRICT_CLI_DOCUMENT_MISMATCH",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn schema_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::SchemaError, msg)
    }

    /// Document rejected; the message carries the failing path
    pub fn mismatch(err: &DecodeError) -> Self {
        Self::new(
            CliErrorCode::DocumentMismatch,
            format!("{} at {}", err, err.path()),
        )
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<SchemaDefinitionError> for CliError {
    fn from(e: SchemaDefinitionError) -> Self {
        Self::schema_error(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message_has_path() {
        let err = DecodeError::MissingField {
            key: "struct_only_field".into(),
        }
        .nested("slice_of_structs", Some(0));

        let cli = CliError::mismatch(&err);
        assert_eq!(cli.code(), &CliErrorCode::DocumentMismatch);
        assert!(cli
            .message()
            .ends_with("at slice_of_structs[0].struct_only_field"));
    }

    #[test]
    fn test_display_has_code() {
        let err = CliError::config_error("max_document_bytes must be > 0");
        assert_eq!(
            err.to_string(),
            "STRICT_CLI_CONFIG_ERROR: max_document_bytes must be > 0"
        );
    }
}
