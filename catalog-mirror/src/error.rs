//! Error types for catalog mirroring
//!
//! Only contract violations and infrastructure failures surface here. Unknown models
//! or unmatched text are handled as skips and no-ops.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MirrorError {
    /// A pattern failed to compile or a backtracking match gave up
    #[error("pattern error for '{source_text}': {reason}")]
    Pattern { source_text: String, reason: String },
    /// Reading or writing a file failed
    #[error("failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A JSON document could not be parsed or produced
    #[error("invalid JSON in '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Reference data has an unexpected layout
    #[error("invalid reference data in '{}': {reason}", path.display())]
    InvalidReference { path: PathBuf, reason: String },
    /// Required configuration is missing or inconsistent
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl MirrorError {
    pub(crate) fn pattern(source_text: &str, err: fancy_regex::Error) -> Self {
        MirrorError::Pattern {
            source_text: truncate_for_display(source_text),
            reason: err.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        MirrorError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        MirrorError::Json {
            path: path.into(),
            source,
        }
    }
}

// Union patterns can run to hundreds of kilobytes.
fn truncate_for_display(text: &str) -> String {
    const LIMIT: usize = 120;
    if text.chars().count() <= LIMIT {
        return text.to_string();
    }
    let head: String = text.chars().take(LIMIT).collect();
    format!("{}…", head)
}

/// Result type for mirroring operations
pub type MirrorResult<T> = Result<T, MirrorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_pattern_text_is_shortened() {
        let long = "x".repeat(500);
        let shortened = truncate_for_display(&long);
        assert_eq!(shortened.chars().count(), 121);
        assert!(shortened.ends_with('…'));
    }

    #[test]
    fn test_configuration_error_message() {
        let err = MirrorError::Configuration("keyword max_len must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "configuration error: keyword max_len must be positive"
        );
    }
}
