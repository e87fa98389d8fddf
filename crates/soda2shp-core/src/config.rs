//! Options for a single conversion run.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use soda2shp_core_common::GeometryKind;

use crate::error::ConfigError;
use crate::projector::RenameStrategy;

/// Column name Socrata uses for the geometry of map-enabled views.
pub const DEFAULT_GEOMETRY_COLUMN: &str = "the_geom";

/// Driver used when none is requested.
pub const DEFAULT_OUTPUT_DRIVER: &str = "ESRI Shapefile";

/// How the geometry column is selected from the input schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryColumn {
    /// First column with exactly this name
    Name(String),
    /// Column at this 0-based position
    Index(usize),
}

impl Default for GeometryColumn {
    fn default() -> Self {
        GeometryColumn::Name(DEFAULT_GEOMETRY_COLUMN.to_string())
    }
}

impl fmt::Display for GeometryColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryColumn::Name(name) => write!(f, "'{name}'"),
            GeometryColumn::Index(index) => write!(f, "at index {index}"),
        }
    }
}

impl FromStr for GeometryColumn {
    type Err = ConfigError;

    /// All-digit values select by index, anything else by name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ConfigError::InvalidOption {
                option: "geometry-column".to_string(),
                message: "column name or index must not be empty".to_string(),
            });
        }
        Ok(s.parse::<usize>()
            .map_or_else(|_| GeometryColumn::Name(s.to_string()), GeometryColumn::Index))
    }
}

/// Options for converting one Socrata export.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Path of the Socrata `rows.json` export
    pub input: PathBuf,
    /// Path of the output dataset
    pub output: PathBuf,
    /// Output driver short name (default: `ESRI Shapefile`)
    pub output_driver: String,
    /// Geometry column selector (default: `the_geom`)
    pub geometry_column: GeometryColumn,
    /// Field naming strategy (default: sanitize-and-truncate)
    pub rename_strategy: RenameStrategy,
    /// Geometry kind of the output; detected from the data when `None`
    pub geometry_kind: Option<GeometryKind>,
    /// Lookup file location for the opaque-indexed strategy
    pub lookup_path: Option<PathBuf>,
    /// Replace an existing output (default: true)
    pub overwrite: bool,
}

impl ConvertOptions {
    /// Create options with defaults for everything but the paths
    #[must_use]
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            output_driver: DEFAULT_OUTPUT_DRIVER.to_string(),
            geometry_column: GeometryColumn::default(),
            rename_strategy: RenameStrategy::default(),
            geometry_kind: None,
            lookup_path: None,
            overwrite: true,
        }
    }

    /// Set the output driver
    #[must_use]
    pub fn with_output_driver(mut self, driver: impl Into<String>) -> Self {
        self.output_driver = driver.into();
        self
    }

    /// Set the geometry column selector
    #[must_use]
    pub fn with_geometry_column(mut self, column: GeometryColumn) -> Self {
        self.geometry_column = column;
        self
    }

    /// Set the field naming strategy
    #[must_use]
    pub fn with_rename_strategy(mut self, strategy: RenameStrategy) -> Self {
        self.rename_strategy = strategy;
        self
    }

    /// Force the output geometry kind instead of detecting it
    #[must_use]
    pub fn with_geometry_kind(mut self, kind: GeometryKind) -> Self {
        self.geometry_kind = Some(kind);
        self
    }

    /// Set where the field lookup file is written
    #[must_use]
    pub fn with_lookup_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.lookup_path = Some(path.into());
        self
    }

    /// Set whether an existing output may be replaced
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Lookup file location: the configured path, or
    /// `{output_stem}_field_lookup.txt` next to the output.
    #[must_use]
    pub fn resolved_lookup_path(&self) -> PathBuf {
        if let Some(path) = &self.lookup_path {
            return path.clone();
        }
        let stem = self
            .output
            .file_stem()
            .map_or_else(|| "output".into(), |s| s.to_string_lossy());
        self.output
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(format!("{stem}_field_lookup.txt"))
    }
}
