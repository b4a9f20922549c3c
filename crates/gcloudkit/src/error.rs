//! Error types for gcloud operations.
//!
//! `gcloud` reports failures as free text on stderr, usually prefixed with a
//! gRPC status token (`ALREADY_EXISTS`, `NOT_FOUND`, ...) or an HTTP status
//! code. Errors are categorized from that output so callers can tell a
//! missing resource or a creation race apart from a real failure.

use std::path::PathBuf;
use thiserror::Error;

/// Categories of gcloud errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The queried resource does not exist
    NotFound,
    /// The resource already exists (creation race or stale check)
    AlreadyExists,
    /// Caller lacks IAM permission
    Permission,
    /// Network-related errors (transient)
    Network,
    /// gcloud not installed or not on PATH
    GcloudNotFound,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Whether a mutating call failing with this category left the resource in place.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyExists)
    }

    /// Whether a read failing with this category means "resource absent".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::Permission => "Permission denied",
            Self::Network => "Network connectivity issue",
            Self::GcloudNotFound => "gcloud not installed",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::NotFound => "Check the resource name and the active project",
            Self::AlreadyExists => "No action needed - the resource is already there",
            Self::Permission => {
                "Check the IAM roles of the active gcloud account (gcloud auth list)"
            }
            Self::Network => "Check your internet connection and try again",
            Self::GcloudNotFound => {
                "Install the Google Cloud SDK: https://cloud.google.com/sdk/docs/install"
            }
            Self::Other => "Check the error details for more information",
        }
    }
}

/// Errors that can occur while driving gcloud.
#[derive(Debug, Error)]
pub enum Error {
    /// The resource does not exist
    #[error("not found: {subject}")]
    NotFound {
        /// What was looked up (project ID, bucket URL, ...)
        subject: String,
    },

    /// The resource already exists
    #[error("already exists: {subject}")]
    AlreadyExists {
        /// What was being created
        subject: String,
    },

    /// Permission denied by the control plane
    #[error("permission denied: {message}")]
    Permission {
        /// Message reported by gcloud
        message: String,
    },

    /// Network-related error
    #[error("network error: {message}")]
    Network {
        /// Message reported by gcloud
        message: String,
    },

    /// gcloud is not installed or not found in PATH
    #[error(
        "'gcloud' command not found in PATH. Install the Google Cloud SDK: https://cloud.google.com/sdk/docs/install"
    )]
    GcloudNotFound,

    /// No active credentialed account
    #[error(
        "not authenticated to GCP via gcloud. Run 'gcloud auth login' and 'gcloud auth application-default login'"
    )]
    NotAuthenticated,

    /// Command exited unsuccessfully for an unclassified reason
    #[error("command failed: {command}: {stderr}")]
    CommandFailed {
        /// The command line that failed
        command: String,
        /// Standard error output from the failed command
        stderr: String,
    },

    /// Could not prepare a local path for gcloud output
    #[error("failed to prepare {}: {source}", .path.display())]
    LocalPath {
        /// Offending path
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::AlreadyExists { .. } => ErrorCategory::AlreadyExists,
            Error::Permission { .. } | Error::NotAuthenticated => ErrorCategory::Permission,
            Error::Network { .. } => ErrorCategory::Network,
            Error::GcloudNotFound => ErrorCategory::GcloudNotFound,
            _ => ErrorCategory::Other,
        }
    }

    /// Whether this error reports that the target already exists.
    pub fn is_conflict(&self) -> bool {
        self.category().is_conflict()
    }

    /// Whether this error reports that the target does not exist.
    pub fn is_not_found(&self) -> bool {
        self.category().is_not_found()
    }

    /// Create an error from gcloud command output.
    ///
    /// Structured status tokens are checked before free-text phrases.
    /// `subject` names the resource the command was about.
    pub fn from_gcloud_output(command: &str, stderr: &str, subject: Option<&str>) -> Self {
        let stderr_lower = stderr.to_lowercase();
        let subject = || subject.unwrap_or("unknown").to_string();

        // Network errors
        if stderr_lower.contains("unavailable:")
            || stderr_lower.contains("could not resolve")
            || stderr_lower.contains("connection refused")
            || stderr_lower.contains("connection reset")
            || stderr_lower.contains("timed out")
            || stderr_lower.contains("network is unreachable")
            || stderr_lower.contains("ssl")
        {
            return Error::Network {
                message: stderr.trim().to_string(),
            };
        }

        // Conflicts
        if stderr_lower.contains("already_exists")
            || stderr_lower.contains("httperror 409")
            || stderr_lower.contains("already exists")
            || stderr_lower.contains("already own it")
            || stderr_lower.contains("already associated")
        {
            return Error::AlreadyExists { subject: subject() };
        }

        // Not found
        if stderr_lower.contains("not_found")
            || stderr_lower.contains("httperror 404")
            || stderr_lower.contains("not found")
            || stderr_lower.contains("does not exist")
        {
            return Error::NotFound { subject: subject() };
        }

        // Permission errors
        if stderr_lower.contains("permission_denied")
            || stderr_lower.contains("httperror 403")
            || stderr_lower.contains("does not have permission")
            || stderr_lower.contains("permission denied")
        {
            return Error::Permission {
                message: stderr.trim().to_string(),
            };
        }

        Error::CommandFailed {
            command: command.to_string(),
            stderr: stderr.trim().to_string(),
        }
    }
}

/// Result type for gcloud operations.
pub type Result<T> = std::result::Result<T, Error>;
