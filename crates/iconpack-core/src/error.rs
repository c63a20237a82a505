//! Error types for the icon pack catalog.
//!
//! Configuration problems are fatal and name the provider, the pack and the
//! offending field. Per-file parse problems (malformed SVG, unreadable
//! directories, disallowed extensions) are never errors: they are logged with
//! `tracing::warn!` where they occur and the file simply contributes nothing.

use crate::font::FontError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the icon pack library.
#[derive(Debug, Error)]
pub enum IconPackError {
    // Configuration errors
    #[error("Icon pack configuration error in {provider} pack '{pack_id}': {message}")]
    Config {
        provider: String,
        pack_id: String,
        message: String,
    },

    #[error("Invalid icon pack id '{pack_id}' from {provider}: only lowercase letters, digits and underscores are allowed")]
    InvalidPackId { provider: String, pack_id: String },

    #[error("Icon pack '{pack_id}' from {provider} failed schema validation: {}", errors.join("; "))]
    Validation {
        provider: String,
        pack_id: String,
        errors: Vec<String>,
    },

    #[error("Unknown extractor '{extractor}' for icon pack '{pack_id}'")]
    UnknownExtractor { pack_id: String, extractor: String },

    // Entry construction
    #[error("Invalid icon: {message}")]
    InvalidIcon { message: String },

    // Binary font parsing
    #[error("Font format error in {path:?}: {source}")]
    Font {
        path: PathBuf,
        #[source]
        source: FontError,
    },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("YAML error: {message}")]
    Yaml {
        message: String,
        #[source]
        source: Option<serde_yaml::Error>,
    },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for icon pack operations.
pub type Result<T> = std::result::Result<T, IconPackError>;

impl From<std::io::Error> for IconPackError {
    fn from(err: std::io::Error) -> Self {
        IconPackError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for IconPackError {
    fn from(err: serde_json::Error) -> Self {
        IconPackError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<serde_yaml::Error> for IconPackError {
    fn from(err: serde_yaml::Error) -> Self {
        IconPackError::Yaml {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl IconPackError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        IconPackError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create a configuration error for a pack.
    pub fn config(
        provider: impl Into<String>,
        pack_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        IconPackError::Config {
            provider: provider.into(),
            pack_id: pack_id.into(),
            message: message.into(),
        }
    }

    /// Whether this error comes from a pack declaration (including an
    /// unreadable definition file) rather than from the files it points at.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            IconPackError::Config { .. }
                | IconPackError::InvalidPackId { .. }
                | IconPackError::Validation { .. }
                | IconPackError::UnknownExtractor { .. }
                | IconPackError::InvalidIcon { .. }
                | IconPackError::Yaml { .. }
        )
    }
}
