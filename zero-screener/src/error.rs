//! Error types for the screener.

use thiserror::Error;

/// Result type alias using the screener error type.
pub type Result<T> = std::result::Result<T, ScreenerError>;

/// Errors that abort a screening run.
///
/// Per-instrument fetch problems are not errors at this level; they are
/// reported as [`crate::data::FetchFailure`] and the instrument is skipped.
#[derive(Error, Debug)]
pub enum ScreenerError {
    /// The target date could not be parsed
    #[error("Invalid target date '{0}': expected 8 digits (YYYYMMDD)")]
    InvalidDate(String),

    /// The instrument universe could not be listed
    #[error("Instrument catalog unavailable: {0}")]
    Catalog(String),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Other error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ScreenerError>,
    },
}

impl ScreenerError {
    /// Create an error with additional context.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Check if the run failed because the universe could not be listed.
    pub fn is_catalog(&self) -> bool {
        match self {
            Self::Catalog(_) => true,
            Self::WithContext { source, .. } => source.is_catalog(),
            _ => false,
        }
    }
}

/// Extension trait for adding context to any error type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<ScreenerError>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }
}
