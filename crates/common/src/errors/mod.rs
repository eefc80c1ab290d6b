//! Error types for scasplens
//!
//! Provides a single error enum shared by the parser and the relevance
//! search, with:
//! - Distinct variants for each failure mode
//! - Machine-readable error codes
//! - Fatality classification for the relevance search

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using ScaspError
pub type Result<T> = std::result::Result<T, ScaspError>;

/// Maximum number of characters of a raw segment kept in error messages
const SEGMENT_PREVIEW_CHARS: usize = 200;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Solver output (1xxx)
    MalformedResponse,

    // Search (2xxx)
    UnexpectedAnswerCount,
    NestingDepthExceeded,

    // Solver process (3xxx)
    ProcessInvocationFailure,
    ProcessTimeout,

    // Input (4xxx)
    InvalidPredicate,

    // Internal (9xxx)
    ConfigurationError,
    IoError,
    SerializationError,
    InternalError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::MalformedResponse => 1001,

            ErrorCode::UnexpectedAnswerCount => 2001,
            ErrorCode::NestingDepthExceeded => 2002,

            ErrorCode::ProcessInvocationFailure => 3001,
            ErrorCode::ProcessTimeout => 3002,

            ErrorCode::InvalidPredicate => 4001,

            ErrorCode::ConfigurationError => 9001,
            ErrorCode::IoError => 9002,
            ErrorCode::SerializationError => 9003,
            ErrorCode::InternalError => 9999,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum ScaspError {
    // Solver output errors
    #[error("Malformed solver response: {message} (segment: {})", preview(.segment))]
    MalformedResponse { message: String, segment: String },

    // Search errors
    #[error("Unexpected answer count for {predicate}: asked for {expected}, solver returned {returned}")]
    UnexpectedAnswerCount {
        predicate: String,
        expected: usize,
        returned: usize,
    },

    #[error("Nesting depth {depth} exceeds the limit of {limit} index names")]
    NestingDepthExceeded { depth: usize, limit: usize },

    // Solver process errors
    #[error("Failed to invoke `{command} {}`: {message}", .args.join(" "))]
    ProcessInvocation {
        command: String,
        args: Vec<String>,
        message: String,
    },

    #[error("`{command} {}` timed out after {timeout_ms}ms", .args.join(" "))]
    ProcessTimeout {
        command: String,
        args: Vec<String>,
        timeout_ms: u64,
    },

    // Input errors
    #[error("Invalid predicate: {input}")]
    InvalidPredicate { input: String },

    // Internal errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl ScaspError {
    /// Build a malformed-response error for a raw output segment
    pub fn malformed(message: impl Into<String>, segment: impl Into<String>) -> Self {
        ScaspError::MalformedResponse {
            message: message.into(),
            segment: segment.into(),
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            ScaspError::MalformedResponse { .. } => ErrorCode::MalformedResponse,
            ScaspError::UnexpectedAnswerCount { .. } => ErrorCode::UnexpectedAnswerCount,
            ScaspError::NestingDepthExceeded { .. } => ErrorCode::NestingDepthExceeded,
            ScaspError::ProcessInvocation { .. } => ErrorCode::ProcessInvocationFailure,
            ScaspError::ProcessTimeout { .. } => ErrorCode::ProcessTimeout,
            ScaspError::InvalidPredicate { .. } => ErrorCode::InvalidPredicate,
            ScaspError::Configuration { .. } => ErrorCode::ConfigurationError,
            ScaspError::Io(_) => ErrorCode::IoError,
            ScaspError::Serialization(_) => ErrorCode::SerializationError,
            ScaspError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Whether a relevance search hitting this error must stop.
    ///
    /// Every error raised while a search is running is fatal: a partially
    /// computed relevance set would be unsound. Only input validation
    /// errors are raised before a search starts.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ScaspError::InvalidPredicate { .. })
    }

    /// Check if this error came from the external solver process
    pub fn is_process_error(&self) -> bool {
        matches!(
            self,
            ScaspError::ProcessInvocation { .. } | ScaspError::ProcessTimeout { .. }
        )
    }
}

impl From<config::ConfigError> for ScaspError {
    fn from(err: config::ConfigError) -> Self {
        ScaspError::Configuration {
            message: err.to_string(),
        }
    }
}

fn preview(segment: &str) -> String {
    let mut chars = segment.chars();
    let head: String = chars.by_ref().take(SEGMENT_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{:?}...", head)
    } else {
        format!("{:?}", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = ScaspError::UnexpectedAnswerCount {
            predicate: "mortal/1".into(),
            expected: 3,
            returned: 0,
        };
        assert_eq!(err.code(), ErrorCode::UnexpectedAnswerCount);
        assert_eq!(err.code().as_code(), 2001);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_malformed_keeps_segment() {
        let err = ScaspError::malformed("missing MODEL section", "\tANSWER:\t1 (in 0.1 ms)");
        match &err {
            ScaspError::MalformedResponse { segment, .. } => {
                assert_eq!(segment, "\tANSWER:\t1 (in 0.1 ms)");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
        assert!(err.to_string().contains("missing MODEL section"));
    }

    #[test]
    fn test_long_segment_is_truncated_in_message() {
        let segment = "x".repeat(1000);
        let err = ScaspError::malformed("bad", segment.clone());
        let message = err.to_string();
        assert!(message.len() < segment.len());
        assert!(message.ends_with("...)"));
    }

    #[test]
    fn test_process_error_message_includes_arguments() {
        let err = ScaspError::ProcessTimeout {
            command: "scasp".into(),
            args: vec!["--tree".into(), "-s1".into(), "probe.pl".into()],
            timeout_ms: 5000,
        };
        assert!(err.is_process_error());
        assert_eq!(err.to_string(), "`scasp --tree -s1 probe.pl` timed out after 5000ms");
    }

    #[test]
    fn test_invalid_predicate_is_not_fatal() {
        let err = ScaspError::InvalidPredicate { input: "Foo/x".into() };
        assert!(!err.is_fatal());
        assert_eq!(err.code(), ErrorCode::InvalidPredicate);
    }
}
