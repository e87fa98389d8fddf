//! Data types for the schema projector and the convert pipeline.

use std::path::PathBuf;

use soda2shp_core_common::{DatasetSchema, GeometryKind};

/// A column of the input schema (`meta.view.columns`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Position of the column in every data row
    pub source_index: usize,
    /// Human-readable column name
    pub source_name: String,
    /// Socrata API field name, if present
    pub field_name: Option<String>,
    /// Socrata data type (e.g. `"text"`, `"point"`), if present
    pub data_type: Option<String>,
}

impl ColumnDescriptor {
    /// Creates a descriptor carrying only a position and a name.
    #[must_use]
    pub fn new(source_index: usize, source_name: impl Into<String>) -> Self {
        Self {
            source_index,
            source_name: source_name.into(),
            field_name: None,
            data_type: None,
        }
    }

    /// Builds descriptors for `names`, indexed by position.
    pub fn from_names<I, S>(names: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .enumerate()
            .map(|(index, name)| Self::new(index, name))
            .collect()
    }
}

/// One output field and the row position it is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    /// Output field name, at most 10 characters and unique within the mapping
    pub dest_name: String,
    /// Position of the source value in every data row
    pub source_index: usize,
    /// Original column name, or `col_{index}` beyond the known schema
    pub source_name: String,
}

/// Ordered field mappings for one run, geometry column excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaMapping {
    /// Mappings in source column order
    pub fields: Vec<FieldMapping>,
}

impl SchemaMapping {
    /// Destination names in output order.
    pub fn dest_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.dest_name.as_str())
    }

    /// `(dest_name, source_index)` pairs in output order.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&str, usize)> {
        self.fields
            .iter()
            .map(|f| (f.dest_name.as_str(), f.source_index))
            .collect()
    }

    /// The text-field schema handed to the output driver.
    #[must_use]
    pub fn dataset_schema(&self) -> DatasetSchema {
        DatasetSchema::from_names(self.dest_names())
    }

    /// Number of mapped fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when no field is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Geometry text and attribute values extracted from one data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedRow<'a> {
    /// WKT geometry, borrowed from the row
    pub geometry: &'a str,
    /// One value per mapped field, nulls and missing values as `""`
    pub attributes: Vec<String>,
}

/// Summary of a completed conversion.
#[derive(Debug, Clone)]
pub struct ConvertReport {
    /// Index of the geometry column in the input schema
    pub geometry_index: usize,
    /// Name of the geometry column
    pub geometry_column: String,
    /// Geometry kind of the output dataset
    pub geometry_kind: GeometryKind,
    /// Field mapping used for the attribute table
    pub mapping: SchemaMapping,
    /// Rows in the input `data` array
    pub rows_read: usize,
    /// Features written to the output dataset
    pub features_written: usize,
    /// Rows dropped for lacking a geometry
    pub rows_skipped: usize,
    /// Files written by the output driver
    pub output_files: Vec<PathBuf>,
    /// Lookup file, written for the opaque-indexed strategy only
    pub lookup_path: Option<PathBuf>,
}
