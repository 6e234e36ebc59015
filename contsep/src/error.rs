//! Error types for contour separation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to callers of the separation pipeline.
///
/// Degenerate contours, magnitude levels without a target polygon and
/// disagreeing heuristics are not errors; they are resolved silently.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid magnitude ladder [{start}, {end}, {count}]: {reason}")]
    InvalidLadder {
        start: f64,
        end: f64,
        count: usize,
        reason: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid night date '{0}': expected YYYYMMDD")]
    InvalidDate(String),

    #[error("Night directory '{path}' does not exist")]
    NightDirectoryMissing { path: PathBuf },

    #[error("No {kind} file for '{target}' in '{dir}'")]
    NoMatchingFile {
        kind: &'static str,
        target: String,
        dir: PathBuf,
    },

    #[error("Ambiguous {kind} file for '{target}': {} candidates ({matches:?})", .matches.len())]
    AmbiguousMatch {
        kind: &'static str,
        target: String,
        matches: Vec<PathBuf>,
    },

    #[error("Failed to read '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },

    #[error("Cube has no spaxels")]
    EmptyCube,

    #[error("No separating contour could be determined for the target")]
    UndeterminedSeparation,
}

pub type Result<T> = std::result::Result<T, Error>;
