//! Helpers shared by the `soda2shp` output drivers.

pub mod geometry;

use std::error::Error as StdError;
use std::fmt;

pub use geometry::{ensure_kind, geometry_type_name, parse_wkt};

/// Errors that can occur when writing spatial data formats.
#[derive(Debug)]
pub enum SpatialFormatWriteError {
    /// An underlying I/O failure occurred.
    Io {
        /// The originating error.
        source: std::io::Error,
        /// Optional context describing what was being written.
        context: Option<String>,
    },
    /// A geometry could not be decoded or is not accepted by the dataset.
    Geometry {
        /// Human readable description of the failure.
        message: String,
        /// 1-based index of the feature within the dataset, if known.
        feature: Option<u64>,
        /// Optional context describing what was being written.
        context: Option<String>,
    },
    /// The attribute schema cannot be represented in the output format.
    Schema {
        /// Human readable description of the failure.
        message: String,
        /// Optional context describing what was being written.
        context: Option<String>,
    },
    /// Other error type not classified above.
    Other {
        /// Human readable description of the failure.
        message: String,
    },
}

impl SpatialFormatWriteError {
    fn fmt_context(context: Option<&str>) -> String {
        context
            .map(|c| format!(" while writing {c}"))
            .unwrap_or_default()
    }

    fn fmt_feature(feature: Option<u64>) -> String {
        feature.map(|f| format!(" at feature {f}")).unwrap_or_default()
    }

    /// Attach additional context to the error, returning the updated error.
    #[must_use]
    pub fn with_additional_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        match &mut self {
            SpatialFormatWriteError::Io {
                context: existing, ..
            }
            | SpatialFormatWriteError::Geometry {
                context: existing, ..
            }
            | SpatialFormatWriteError::Schema {
                context: existing, ..
            } => match existing {
                Some(existing) if !existing.is_empty() => {
                    existing.push_str("; ");
                    existing.push_str(&context);
                },
                _ => *existing = Some(context),
            },
            SpatialFormatWriteError::Other { message } => {
                message.push_str(" (");
                message.push_str(&context);
                message.push(')');
            },
        }
        self
    }

    /// Record the 1-based feature index on a geometry error.
    #[must_use]
    pub fn at_feature(mut self, index: u64) -> Self {
        if let SpatialFormatWriteError::Geometry { feature, .. } = &mut self {
            *feature = Some(index);
        }
        self
    }
}

impl fmt::Display for SpatialFormatWriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpatialFormatWriteError::Io { source, context } => {
                write!(
                    f,
                    "I/O error{}: {source}",
                    Self::fmt_context(context.as_deref())
                )
            },
            SpatialFormatWriteError::Geometry {
                message,
                feature,
                context,
            } => write!(
                f,
                "Geometry error{}{}: {message}",
                Self::fmt_context(context.as_deref()),
                Self::fmt_feature(*feature)
            ),
            SpatialFormatWriteError::Schema { message, context } => write!(
                f,
                "Schema error{}: {message}",
                Self::fmt_context(context.as_deref())
            ),
            SpatialFormatWriteError::Other { message } => f.write_str(message),
        }
    }
}

impl StdError for SpatialFormatWriteError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            SpatialFormatWriteError::Io { source, .. } => Some(source),
            SpatialFormatWriteError::Geometry { .. }
            | SpatialFormatWriteError::Schema { .. }
            | SpatialFormatWriteError::Other { .. } => None,
        }
    }
}

impl From<std::io::Error> for SpatialFormatWriteError {
    fn from(source: std::io::Error) -> Self {
        SpatialFormatWriteError::Io {
            source,
            context: None,
        }
    }
}

/// Result type alias that uses [`SpatialFormatWriteError`].
pub type SpatialFormatResult<T> = Result<T, SpatialFormatWriteError>;
