use anyhow::{Context, Result};
use log::LevelFilter;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::errors::AppError;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and compiling the style-exclusion pattern.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    /// Default style-exclusion pattern applied when the command line does not
    /// supply one. Case-insensitive, matched against whole style names.
    #[serde(default)]
    pub exclude: Option<String>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log level for the stderr logger
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    // @level: Errors only
    Error,
    // @level: Errors and warnings
    Warn,
    // @level: Default verbosity
    #[default]
    Info,
    // @level: Pipeline stage detail
    Debug,
    // @level: Everything
    Trace,
}

impl LogLevel {
    // @returns: The log crate's filter for this level
    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Validate the configuration after loading and overriding.
    /// A bad exclude pattern is reported here, before any file is opened.
    pub fn validate(&self) -> Result<()> {
        if let Some(pattern) = &self.exclude {
            compile_exclude(pattern)?;
        }
        Ok(())
    }

    /// Compile the configured exclusion pattern, if any
    pub fn compiled_exclude(&self) -> Result<Option<Regex>> {
        self.exclude
            .as_deref()
            .map(compile_exclude)
            .transpose()
    }
}

/// Compile a user-supplied exclusion pattern into the regex the Filter stage
/// runs: case-insensitive and anchored at both ends, so `A` matches style `A`
/// but never `Ax`.
pub fn compile_exclude(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(&format!(r"\A(?:{})\z", pattern))
        .case_insensitive(true)
        .build()
        .map_err(|e| AppError::Pattern(format!("{}: {}", pattern, e)).into())
}
