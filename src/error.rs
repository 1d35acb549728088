//! # Error Handling
//!
//! This module defines the centralized error type for `tfmerge`. It uses the
//! `thiserror` library to build a single `Error` enum covering every failure
//! the merge engine and its collaborators can report.
//!
//! ## Error Classes
//!
//! Errors fall into three groups, and the engine treats them differently:
//!
//! - **Call-aborting**: `NoInputDocuments`, `ReadState`, `ParseState`,
//!   `InvalidResolution`, `Serialization` and `Cancelled`. These are returned
//!   as `Err` from `Merger::merge` and no output is produced.
//! - **Per-document**: `Normalize` and `TerraformCommand`. The document is
//!   left out of the merge and the error is accumulated in
//!   `MergeOutput::errors`.
//! - **Per-resource**: `ResourceConflict`, only raised when the active
//!   resolution strategy cannot settle a collision.
//!
//! `Aggregate` bundles several accumulated errors into one value for callers
//! that want a plain `Result`.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for tfmerge operations
#[derive(Error, Debug)]
pub enum Error {
    /// `merge` was called without any state files.
    #[error("No input documents: at least one state file is required")]
    NoInputDocuments,

    /// A state file could not be read from disk.
    #[error("Failed to read state file {}: {source}", path.display())]
    ReadState {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A state document is not valid JSON in the state file format.
    #[error("Failed to parse state document {origin}: {source}")]
    ParseState {
        origin: String,
        source: serde_json::Error,
    },

    /// The normalizer could not produce a module tree for a state file.
    #[error("Failed to normalize state file {}: {message}", path.display())]
    Normalize { path: PathBuf, message: String },

    /// The `terraform` executable failed or could not be started.
    #[error("Terraform command failed: {command} - {stderr}")]
    TerraformCommand { command: String, stderr: String },

    /// The same resource address was contributed by two documents and the
    /// active resolution strategy could not settle it.
    #[error("Resource {address} is defined in both {existing} and {incoming}")]
    ResourceConflict {
        address: String,
        existing: String,
        incoming: String,
    },

    /// An unknown resolution policy name was supplied.
    #[error("Invalid resolution policy '{value}'\n  hint: expected one of: overwrite, merge, skip, default")]
    InvalidResolution { value: String },

    /// An error occurred while parsing the configuration file.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// The merged document could not be serialized.
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// The merge was cancelled before the given document was normalized.
    #[error("Merge cancelled before processing {}", path.display())]
    Cancelled { path: PathBuf },

    /// Several accumulated errors reported together.
    #[error("{} errors occurred:{}", errors.len(), list_errors(errors))]
    Aggregate { errors: Vec<Error> },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Collapse accumulated errors into one.
    ///
    /// Returns `None` for an empty list, the error itself for a single entry
    /// and `Error::Aggregate` otherwise.
    pub fn from_many(mut errors: Vec<Error>) -> Option<Error> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Error::Aggregate { errors }),
        }
    }

    /// Whether this error is an unresolved resource collision.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::ResourceConflict { .. })
    }
}

fn list_errors(errors: &[Error]) -> String {
    errors.iter().map(|e| format!("\n  - {}", e)).collect()
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_no_input_documents() {
        let display = format!("{}", Error::NoInputDocuments);
        assert!(display.contains("No input documents"));
    }

    #[test]
    fn test_error_display_resource_conflict() {
        let error = Error::ResourceConflict {
            address: "null_resource.test1".to_string(),
            existing: "base state".to_string(),
            incoming: "states/a.tfstate".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("null_resource.test1"));
        assert!(display.contains("base state"));
        assert!(display.contains("states/a.tfstate"));
        assert!(error.is_conflict());
    }

    #[test]
    fn test_error_display_invalid_resolution() {
        let error = Error::InvalidResolution {
            value: "newest".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("'newest'"));
        assert!(display.contains("hint:"));
        assert!(!error.is_conflict());
    }

    #[test]
    fn test_error_display_config_parse_with_hint() {
        let error = Error::ConfigParse {
            message: "unknown field `resolve`".to_string(),
            hint: Some("Use 'resolution:' instead".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("Configuration parsing error"));
        assert!(display.contains("hint: Use 'resolution:'"));
    }

    #[test]
    fn test_error_display_read_state() {
        let error = Error::ReadState {
            path: PathBuf::from("missing.tfstate"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "File not found"),
        };
        let display = format!("{}", error);
        assert!(display.contains("missing.tfstate"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_from_many_empty_is_none() {
        assert!(Error::from_many(Vec::new()).is_none());
    }

    #[test]
    fn test_from_many_single_is_unwrapped() {
        let error = Error::from_many(vec![Error::NoInputDocuments]).unwrap();
        assert!(matches!(error, Error::NoInputDocuments));
    }

    #[test]
    fn test_from_many_lists_every_error() {
        let error = Error::from_many(vec![
            Error::Normalize {
                path: PathBuf::from("a.tfstate"),
                message: "bad".to_string(),
            },
            Error::ResourceConflict {
                address: "null_resource.x".to_string(),
                existing: "a.tfstate".to_string(),
                incoming: "b.tfstate".to_string(),
            },
        ])
        .unwrap();
        let display = format!("{}", error);
        assert!(display.starts_with("2 errors occurred:"));
        assert!(display.contains("\n  - Failed to normalize state file a.tfstate: bad"));
        assert!(display.contains("\n  - Resource null_resource.x"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        assert!(format!("{}", error).contains("I/O error"));
    }
}
