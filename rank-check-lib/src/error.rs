//! Error handling for ranking analysis operations.
//!
//! This module defines a single error type covering every way an analysis run
//! can fail, from malformed input lines to provider and transport failures.

use crate::types::QueryFailure;
use std::fmt;

/// Main error type for ranking analysis operations.
///
/// Input errors (`InvalidInput`, `InvalidLocation`, `NoValidLocations`) abort a
/// run before any provider call. Transport and provider errors are scoped to a
/// single query and are normally converted into warnings by the batch runner.
#[derive(Debug, Clone)]
pub enum RankCheckError {
    /// A required input (target domain, keyword list, API key) is missing or malformed
    InvalidInput { field: String, reason: String },

    /// A location line is neither `City, State` nor a 5-digit ZIP code
    InvalidLocation {
        line: usize,
        input: String,
        reason: String,
    },

    /// Every location failed address validation
    NoValidLocations { dropped: Vec<String> },

    /// Network-related errors (connection refused, DNS, reset, etc.)
    NetworkError {
        message: String,
        source: Option<String>,
    },

    /// The search provider answered with a non-success status
    ProviderError {
        query: String,
        message: String,
        status_code: Option<u16>,
    },

    /// The provider rejected the request because of its own rate limits
    RateLimited { service: String, message: String },

    /// JSON parsing errors for provider responses
    ParseError {
        message: String,
        content: Option<String>,
    },

    /// Timeout errors when operations take too long
    Timeout {
        operation: String,
        duration: std::time::Duration,
    },

    /// Configuration errors (invalid settings, unreadable TOML, etc.)
    ConfigError { message: String },

    /// File I/O errors when reading keyword or location lists
    FileError { path: String, message: String },

    /// The batch finished without a single successful record
    NoResults {
        attempted: usize,
        failures: Vec<QueryFailure>,
    },

    /// Generic internal errors that don't fit other categories
    Internal { message: String },
}

impl RankCheckError {
    /// Create a new invalid input error.
    pub fn invalid_input<F: Into<String>, R: Into<String>>(field: F, reason: R) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a new invalid location error for a 1-based input line.
    pub fn invalid_location<I: Into<String>, R: Into<String>>(
        line: usize,
        input: I,
        reason: R,
    ) -> Self {
        Self::InvalidLocation {
            line,
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a new network error.
    pub fn network<M: Into<String>>(message: M) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new network error with source information.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new provider error with HTTP status code.
    pub fn provider_with_status<Q: Into<String>, M: Into<String>>(
        query: Q,
        message: M,
        status_code: u16,
    ) -> Self {
        Self::ProviderError {
            query: query.into(),
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Create a new parse error.
    pub fn parse<M: Into<String>>(message: M) -> Self {
        Self::ParseError {
            message: message.into(),
            content: None,
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: std::time::Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error was raised while validating user input,
    /// i.e. before any query was dispatched.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. } | Self::InvalidLocation { .. } | Self::NoValidLocations { .. }
        )
    }
}

impl fmt::Display for RankCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput { field, reason } => {
                write!(f, "Invalid {}: {}", field, reason)
            }
            Self::InvalidLocation {
                line,
                input,
                reason,
            } => {
                write!(f, "Invalid location on line {} '{}': {}", line, input, reason)
            }
            Self::NoValidLocations { dropped } => {
                if dropped.is_empty() {
                    write!(f, "No valid locations provided")
                } else {
                    write!(
                        f,
                        "No valid locations provided (could not resolve: {})",
                        dropped.join("; ")
                    )
                }
            }
            Self::NetworkError { message, source } => {
                if let Some(source) = source {
                    write!(f, "Network error: {} (source: {})", message, source)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            Self::ProviderError {
                query,
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "Provider error for '{}' (HTTP {}): {}", query, code, message)
                } else {
                    write!(f, "Provider error for '{}': {}", query, message)
                }
            }
            Self::RateLimited { service, message } => {
                write!(f, "Rate limited by {}: {}", service, message)
            }
            Self::ParseError { message, content: _ } => {
                write!(f, "Parse error: {}", message)
            }
            Self::Timeout {
                operation,
                duration,
            } => {
                write!(f, "Timeout after {:?} during: {}", duration, operation)
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::NoResults {
                attempted,
                failures,
            } => {
                write!(f, "No results: all {} queries failed", attempted)?;
                for failure in failures {
                    write!(f, "\n  {}", failure)?;
                }
                Ok(())
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for RankCheckError {}

impl From<reqwest::Error> for RankCheckError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout("HTTP request", std::time::Duration::from_secs(30))
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err.to_string())
        } else if err.is_decode() {
            Self::parse(format!("Failed to decode response body: {}", err))
        } else {
            Self::network_with_source("HTTP request failed", err.to_string())
        }
    }
}

impl From<serde_json::Error> for RankCheckError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError {
            message: format!("JSON parsing failed: {}", err),
            content: None,
        }
    }
}

impl From<std::io::Error> for RankCheckError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

impl From<regex::Error> for RankCheckError {
    fn from(err: regex::Error) -> Self {
        Self::Internal {
            message: format!("Regex error: {}", err),
        }
    }
}
