/*!
 * Error types for the submerge application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - some umbrella variants exist for library consumers
#![allow(dead_code)]

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while parsing ASS subtitle text
#[derive(Error, Debug)]
pub enum CodecError {
    /// Content appeared before the first section header
    #[error("line {line}: expected a section header, found: {content}")]
    ExpectedSectionHeader {
        /// 1-based line number in the input
        line: usize,
        /// The offending line content
        content: String,
    },

    /// A Style or event line appeared before the section's Format line
    #[error("line {line}: {entry} line before the section's Format line")]
    MissingFormat {
        /// 1-based line number in the input
        line: usize,
        /// Entry kind, e.g. "Style" or "Dialogue"
        entry: String,
    },

    /// The styles Format line does not declare a Name field
    #[error("line {line}: style entry has no Name field to bind to")]
    MissingNameField {
        /// 1-based line number in the input
        line: usize,
    },

    /// A numeric field failed to parse
    #[error("line {line}: invalid {field} value: {value}")]
    InvalidNumber {
        /// 1-based line number in the input
        line: usize,
        /// Field name from the Format line
        field: String,
        /// Raw value that failed to parse
        value: String,
    },

    /// An event timestamp failed to parse
    #[error("line {line}: invalid timestamp: {value}")]
    InvalidTimestamp {
        /// 1-based line number in the input
        line: usize,
        /// Raw value that failed to parse
        value: String,
    },
}

/// Errors that can occur while loading a subtitle file from disk
#[derive(Error, Debug)]
pub enum LoadError {
    /// The path does not refer to an existing regular file
    #[error("Invalid file: {}", .0.display())]
    InvalidFile(PathBuf),

    /// Every attempted text encoding failed to produce a parseable document
    #[error("Cannot find a suitable encoding for file {}. Last error: {last_error}", .path.display())]
    UnreadableEncoding {
        /// The file that could not be decoded
        path: PathBuf,
        /// Error from the last attempted encoding
        last_error: anyhow::Error,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// The exclude value is not a valid regular expression
    #[error("Invalid exclude pattern: {0}")]
    Pattern(String),

    /// Error from loading an input document
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Error from the subtitle codec
    #[error("Subtitle error: {0}")]
    Codec(#[from] CodecError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
