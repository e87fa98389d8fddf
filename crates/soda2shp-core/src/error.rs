//! Custom error types for `soda2shp` operations.
//!
//! This module provides structured error handling using `thiserror`. Every
//! failure that aborts a conversion maps to one variant, so the CLI can print
//! a user-facing message and, where one exists, a recovery suggestion.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for `soda2shp` operations.
#[derive(Debug, Error)]
pub enum Soda2ShpError {
    /// Driver-related errors (not found, unsupported operations)
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// I/O errors (file read/write, existing outputs)
    #[error(transparent)]
    Io(#[from] IoError),

    /// Input document parsing errors
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Schema projection errors raised before any row is processed
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The output driver rejected a feature
    #[error("Failed to write row {row}: {cause}")]
    Feature {
        /// 0-based index of the row in the input `data` array
        row: usize,
        /// Error reported by the output driver
        cause: anyhow::Error,
    },

    /// Errors reported by an output driver outside of feature insertion
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Driver-related errors.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Driver was not found in the registry
    #[error("Driver '{name}' not found. Available drivers: {available}")]
    NotFound {
        /// The requested driver name
        name: String,
        /// Comma-separated list of available drivers
        available: String,
    },

    /// Driver does not support the requested operation
    #[error("Driver '{driver}' does not support {operation}")]
    OperationNotSupported {
        /// The driver name
        driver: String,
        /// The operation that's not supported (e.g., "reading", "writing")
        operation: String,
    },
}

/// I/O related errors.
#[derive(Debug, Error)]
pub enum IoError {
    /// Failed to read from a file
    #[error("Failed to read {format} file '{path}': {source}")]
    Read {
        /// The format being read
        format: String,
        /// The file path
        path: PathBuf,
        /// The underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to write to a file
    #[error("Failed to write {format} file '{path}': {source}")]
    Write {
        /// The format being written
        format: String,
        /// The file path
        path: PathBuf,
        /// The underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// File was not found
    #[error("File not found: '{path}'")]
    FileNotFound {
        /// The missing file path
        path: PathBuf,
    },

    /// Output exists and overwriting is disabled
    #[error("Output already exists: '{path}'")]
    AlreadyExists {
        /// The existing output path
        path: PathBuf,
    },
}

/// Input document parsing errors.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Failed to parse a format
    #[error("Failed to parse {format} at line {line}: {message}", line = line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    Parse {
        /// The format being parsed
        format: String,
        /// The line number where parsing failed (if available)
        line: Option<usize>,
        /// Description of the parse error
        message: String,
    },
}

/// Errors raised while projecting the input schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The geometry column could not be located in `meta.view.columns`
    #[error("Could not find geometry column {column} in the input schema")]
    MissingGeometryColumn {
        /// The requested column, quoted name or index
        column: String,
    },

    /// The sampled WKT is neither a point nor a polygon
    #[error("Unrecognized WKT geometry type: {sample}")]
    UnrecognizedGeometryKind {
        /// The first 40 characters of the sampled text
        sample: String,
    },
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid option value
    #[error("Invalid {option} option: {message}")]
    InvalidOption {
        /// The option name
        option: String,
        /// Why it's invalid
        message: String,
    },
}

/// Type alias for Results using `Soda2ShpError`.
pub type Result<T> = std::result::Result<T, Soda2ShpError>;

impl Soda2ShpError {
    /// Get a user-friendly error message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Driver(e) => e.user_message(),
            Self::Io(e) => e.user_message(),
            Self::Format(e) => e.to_string(),
            Self::Schema(e) => e.to_string(),
            Self::Config(e) => format!("Configuration error: {e}"),
            Self::Feature { row, cause } => format!("Row {row} could not be written: {cause}"),
            Self::Other(e) => format!("Error: {e}"),
        }
    }

    /// Get recovery suggestions if available.
    #[must_use]
    pub fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::Driver(e) => e.recovery_suggestion(),
            Self::Io(e) => e.recovery_suggestion(),
            Self::Format(_) => {
                Some("Check that the input is a Socrata rows.json view export.".to_string())
            },
            Self::Schema(e) => e.recovery_suggestion(),
            _ => None,
        }
    }
}

impl DriverError {
    fn user_message(&self) -> String {
        match self {
            Self::NotFound { name, available } => {
                format!(
                    "Driver '{name}' not found.\n\nAvailable drivers:\n{}",
                    available
                        .split(", ")
                        .map(|d| format!("  - {d}"))
                        .collect::<Vec<_>>()
                        .join("\n")
                )
            },
            Self::OperationNotSupported { driver, operation } => {
                format!("The '{driver}' driver does not support {operation}.")
            },
        }
    }

    fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::NotFound { .. } => {
                Some("Run 'soda2shp drivers' to see all available drivers.".to_string())
            },
            Self::OperationNotSupported { .. } => {
                Some("Try using a different driver that supports this operation.".to_string())
            },
        }
    }
}

impl IoError {
    fn user_message(&self) -> String {
        match self {
            Self::Read { format, path, .. } => {
                format!("Failed to read {} file: {}", format, path.display())
            },
            Self::Write { format, path, .. } => {
                format!("Failed to write {} file: {}", format, path.display())
            },
            Self::FileNotFound { path } => {
                format!("File not found: {}", path.display())
            },
            Self::AlreadyExists { .. } => self.to_string(),
        }
    }

    fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::FileNotFound { .. } => {
                Some("Check that the file path is correct and the file exists.".to_string())
            },
            Self::AlreadyExists { .. } => {
                Some("Remove the existing output or drop --no-overwrite.".to_string())
            },
            _ => None,
        }
    }
}

impl SchemaError {
    fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::MissingGeometryColumn { .. } => Some(
                "Run 'soda2shp columns <INPUT>' and pass the right --geometry-column.".to_string(),
            ),
            Self::UnrecognizedGeometryKind { .. } => {
                Some("Pass --geometry-type point or --geometry-type polygon.".to_string())
            },
        }
    }
}

/// Extension trait for adding I/O context to errors.
pub trait IoErrorExt<T> {
    /// Add read context to an error.
    ///
    /// # Errors
    ///
    /// Returns an [`IoError::Read`] if the underlying operation fails.
    fn with_read_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T>;

    /// Add write context to an error.
    ///
    /// # Errors
    ///
    /// Returns an [`IoError::Write`] if the underlying operation fails.
    fn with_write_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T, E> IoErrorExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_read_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| {
            Soda2ShpError::Io(IoError::Read {
                format: format.to_string(),
                path: path.into(),
                source: Box::new(e),
            })
        })
    }

    fn with_write_context(self, format: &str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| {
            Soda2ShpError::Io(IoError::Write {
                format: format.to_string(),
                path: path.into(),
                source: Box::new(e),
            })
        })
    }
}

/// Helper to create `DriverError::NotFound` with available drivers.
#[must_use]
pub fn driver_not_found(name: &str) -> DriverError {
    use crate::drivers::get_driver_names;

    let available = get_driver_names().join(", ");
    DriverError::NotFound {
        name: name.to_string(),
        available,
    }
}
