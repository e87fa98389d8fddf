//! Loader for Socrata `rows.json` view exports.
//!
//! An export carries its schema under `meta.view.columns` and its rows under
//! `data`, each row a JSON array aligned positionally with the columns.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::config::GeometryColumn;
use crate::error::{FormatError, IoError, IoErrorExt, Result, SchemaError, Soda2ShpError};
use crate::types::ColumnDescriptor;

const FORMAT_NAME: &str = "Socrata JSON";

/// A parsed Socrata view export.
#[derive(Debug, Clone, Deserialize)]
pub struct SocrataDocument {
    /// View metadata, including the column schema
    pub meta: Meta,
    /// Data rows, aligned positionally with `meta.view.columns`
    pub data: Vec<Vec<Value>>,
}

/// The `meta` object of an export.
#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    /// The exported view
    pub view: View,
}

/// The `meta.view` object of an export.
#[derive(Debug, Clone, Deserialize)]
pub struct View {
    /// Dataset title
    #[serde(default)]
    pub name: Option<String>,
    /// Column schema in row order
    pub columns: Vec<ColumnMeta>,
}

/// One entry of `meta.view.columns`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMeta {
    /// Display name
    pub name: String,
    /// API field name
    #[serde(default)]
    pub field_name: Option<String>,
    /// Socrata data type
    #[serde(default)]
    pub data_type_name: Option<String>,
}

impl SocrataDocument {
    /// Read an export from disk.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::FileNotFound`] if `path` does not exist,
    /// [`IoError::Read`] if it cannot be read, and [`FormatError::Parse`] if
    /// it is not a valid export.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(IoError::FileNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let file = File::open(path).with_read_context(FORMAT_NAME, path)?;
        let document = Self::from_reader(BufReader::new(file)).map_err(|err| match err {
            Soda2ShpError::Io(IoError::Read { source, .. }) => IoError::Read {
                format: FORMAT_NAME.to_string(),
                path: path.to_path_buf(),
                source,
            }
            .into(),
            other => other,
        })?;

        debug!(
            "Loaded {} with {} column(s) and {} row(s)",
            path.display(),
            document.meta.view.columns.len(),
            document.data.len()
        );
        Ok(document)
    }

    /// Parse an export from any reader.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Parse`] if the input is not a valid export.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).map_err(|err| {
            if err.is_io() {
                IoError::Read {
                    format: FORMAT_NAME.to_string(),
                    path: "<reader>".into(),
                    source: Box::new(err),
                }
                .into()
            } else {
                FormatError::Parse {
                    format: FORMAT_NAME.to_string(),
                    line: (err.line() > 0).then(|| err.line()),
                    message: err.to_string(),
                }
                .into()
            }
        })
    }

    /// Column descriptors in schema order.
    #[must_use]
    pub fn columns(&self) -> Vec<ColumnDescriptor> {
        self.meta
            .view
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| ColumnDescriptor {
                source_index: index,
                source_name: column.name.clone(),
                field_name: column.field_name.clone(),
                data_type: column.data_type_name.clone(),
            })
            .collect()
    }

    /// Locate the geometry column in the schema.
    ///
    /// A name selects the first column with exactly that name; an index must
    /// fall inside the schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MissingGeometryColumn`] if no column matches.
    pub fn resolve_geometry_column(
        &self,
        selector: &GeometryColumn,
    ) -> std::result::Result<usize, SchemaError> {
        let columns = &self.meta.view.columns;
        let found = match selector {
            GeometryColumn::Name(name) => columns.iter().position(|c| &c.name == name),
            GeometryColumn::Index(index) => (*index < columns.len()).then_some(*index),
        };
        found.ok_or_else(|| SchemaError::MissingGeometryColumn {
            column: selector.to_string(),
        })
    }

    /// The first non-blank WKT string in the geometry column.
    #[must_use]
    pub fn geometry_sample(&self, geom_index: usize) -> Option<&str> {
        self.data.iter().find_map(|row| match row.get(geom_index) {
            Some(Value::String(text)) if !text.trim().is_empty() => Some(text.as_str()),
            _ => None,
        })
    }

    /// Width of the first data row, or of the schema when there are no rows.
    #[must_use]
    pub fn row_width(&self) -> usize {
        self.data
            .first()
            .map_or(self.meta.view.columns.len(), Vec::len)
    }
}
