use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all arbor operations.
#[derive(Debug, Error, Diagnostic)]
pub enum ArborError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed input detected before any metadata was fetched.
    #[error("Invalid input: {message}")]
    #[diagnostic(help("Coordinates take the form group:artifact[:extension[:classifier]]:version"))]
    Validation { message: String },

    /// The dependency metadata of a coordinate could not be obtained.
    #[error("Metadata unavailable for {coordinate}: {message}")]
    MetadataUnavailable { coordinate: String, message: String },

    /// No available version satisfies a declared range.
    #[error("No version of {key} satisfies {range}")]
    VersionRangeUnsatisfiable { key: String, range: String },

    /// Conflict resolution reached a state the graph builder should never produce.
    #[error("Conflict resolution invariant violated: {message}")]
    #[diagnostic(help("This is a bug in arbor, please report it"))]
    ConflictInvariant { message: String },

    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check your arbor.toml for syntax errors"))]
    Config { message: String },

    /// A POM or maven-metadata.xml document could not be parsed.
    #[error("POM error: {message}")]
    Pom { message: String },
}

impl ArborError {
    /// Whether a failure of this kind only abandons one subtree instead of
    /// the whole collection.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MetadataUnavailable { .. } | Self::VersionRangeUnsatisfiable { .. }
        )
    }
}

/// Convenience alias used across arbor crates.
pub type ArborResult<T> = Result<T, ArborError>;
