//! Error types and handling for analysis and rewrite operations

use std::path::PathBuf;
use thiserror::Error;

use crate::syntax::SyntaxKind;

/// Main error type for REFIT operations
#[derive(Debug, Error)]
pub enum RefitError {
    /// Cooperative cancellation was requested
    #[error("Operation cancelled")]
    Cancelled,

    /// A deferred rewrite no longer matches the current snapshot
    #[error("Stale target: {message}")]
    StaleTarget { message: String },

    /// A provider was handed a node kind it has no branch for
    #[error("Unexpected node kind {kind:?} in '{provider}'")]
    UnexpectedKind { provider: String, kind: SyntaxKind },

    /// A semantic precondition re-checked at apply time no longer holds
    #[error("Precondition failed: {message}")]
    PreconditionFailed { message: String },

    /// Tree rewrite could not be performed
    #[error("Rewrite error: {message}")]
    RewriteError { message: String },

    /// An analyzer callback failed or panicked
    #[error("Analyzer error in '{analyzer}': {message}")]
    AnalyzerError { analyzer: String, message: String },

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source text failed to parse where a valid tree was required
    #[error("Parse error: {message}")]
    ParseError { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Cancelled,
    StaleTarget,
    UnexpectedKind,
    PreconditionFailed,
    Rewrite,
    Analyzer,
    Config,
    Io,
    Parse,
    Internal,
}

impl RefitError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RefitError::Cancelled => ErrorKind::Cancelled,
            RefitError::StaleTarget { .. } => ErrorKind::StaleTarget,
            RefitError::UnexpectedKind { .. } => ErrorKind::UnexpectedKind,
            RefitError::PreconditionFailed { .. } => ErrorKind::PreconditionFailed,
            RefitError::RewriteError { .. } => ErrorKind::Rewrite,
            RefitError::AnalyzerError { .. } => ErrorKind::Analyzer,
            RefitError::ConfigError { .. } => ErrorKind::Config,
            RefitError::IoError { .. } => ErrorKind::Io,
            RefitError::ParseError { .. } => ErrorKind::Parse,
            RefitError::InternalError { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error is recoverable (the caller can skip the item and go on)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::StaleTarget
                | ErrorKind::PreconditionFailed
                | ErrorKind::Analyzer
                | ErrorKind::Parse
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RefitError::Cancelled)
    }

    /// Create a stale target error
    pub fn stale_target(message: impl Into<String>) -> Self {
        Self::StaleTarget {
            message: message.into(),
        }
    }

    /// Create an unexpected kind error
    pub fn unexpected_kind(provider: impl Into<String>, kind: SyntaxKind) -> Self {
        Self::UnexpectedKind {
            provider: provider.into(),
            kind,
        }
    }

    /// Create a precondition failure
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::PreconditionFailed {
            message: message.into(),
        }
    }

    pub fn rewrite_error(message: impl Into<String>) -> Self {
        Self::RewriteError {
            message: message.into(),
        }
    }

    pub fn analyzer_error(analyzer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AnalyzerError {
            analyzer: analyzer.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for RefitError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_and_recoverability() {
        assert_eq!(RefitError::Cancelled.kind(), ErrorKind::Cancelled);
        assert!(!RefitError::Cancelled.is_recoverable());
        assert!(RefitError::stale_target("moved").is_recoverable());
        assert!(RefitError::precondition_failed("gone").is_recoverable());
        assert!(!RefitError::unexpected_kind("fix", SyntaxKind::Block).is_recoverable());
        assert!(!RefitError::config_error("bad").is_recoverable());
    }

    #[test]
    fn test_display() {
        let err = RefitError::unexpected_kind("replace-return", SyntaxKind::IfStmt);
        assert_eq!(
            err.to_string(),
            "Unexpected node kind IfStmt in 'replace-return'"
        );
        assert_eq!(
            RefitError::stale_target("snapshot 1 is not current").to_string(),
            "Stale target: snapshot 1 is not current"
        );
    }
}
