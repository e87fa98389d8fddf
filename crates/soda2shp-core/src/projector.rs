//! Schema projection from Socrata columns to shapefile-safe text fields.
//!
//! The projector turns the input schema into a [`SchemaMapping`] once per
//! run, then projects each data row onto it. It never touches geometry
//! beyond classifying a WKT sample; parsing and writing belong to the output
//! driver.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde_json::Value;
use soda2shp_core_common::GeometryKind;

use crate::error::{ConfigError, IoErrorExt, Result, SchemaError};
use crate::types::{ColumnDescriptor, FieldMapping, ProjectedRow, SchemaMapping};

/// Longest field name a dBase attribute table accepts, in bytes.
pub const MAX_FIELD_NAME_LEN: usize = 10;

/// Name used in place of `id`, which shapefile stores reserve for the row identifier.
pub const ID_REPLACEMENT: &str = "id_1";

/// Name used for columns whose name sanitizes to nothing.
pub const EMPTY_NAME_REPLACEMENT: &str = "_";

/// Number of characters of an unrecognized WKT sample kept for diagnostics.
pub const SAMPLE_PREVIEW_LEN: usize = 40;

/// How destination field names are derived from source column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenameStrategy {
    /// Replace non-alphanumerics with `_`, truncate to 10 characters and
    /// de-duplicate with `_N` suffixes.
    #[default]
    SanitizeTruncate,
    /// Name fields `f0`, `f1`, … and keep a lookup back to the original names.
    OpaqueIndexed,
}

impl RenameStrategy {
    /// Returns the name accepted on the command line.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RenameStrategy::SanitizeTruncate => "sanitize",
            RenameStrategy::OpaqueIndexed => "opaque",
        }
    }
}

impl fmt::Display for RenameStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenameStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sanitize" | "sanitize-and-truncate" => Ok(RenameStrategy::SanitizeTruncate),
            "opaque" | "opaque-indexed" => Ok(RenameStrategy::OpaqueIndexed),
            other => Err(ConfigError::InvalidOption {
                option: "rename-strategy".to_string(),
                message: format!("unknown strategy '{other}', expected 'sanitize' or 'opaque'"),
            }),
        }
    }
}

/// Build the ordered field mapping for every non-geometry column.
///
/// `row_width` is the width of the first data row. Only the opaque-indexed
/// strategy looks at it, mapping positions past the end of the schema as
/// `col_{index}`; sanitize-and-truncate maps schema columns only.
#[must_use]
pub fn build_field_mapping(
    columns: &[ColumnDescriptor],
    geom_index: usize,
    strategy: RenameStrategy,
    row_width: usize,
) -> SchemaMapping {
    let fields = match strategy {
        RenameStrategy::SanitizeTruncate => sanitized_fields(columns, geom_index),
        RenameStrategy::OpaqueIndexed => opaque_fields(columns, geom_index, row_width),
    };
    SchemaMapping { fields }
}

fn sanitized_fields(columns: &[ColumnDescriptor], geom_index: usize) -> Vec<FieldMapping> {
    let mut used = HashSet::new();
    columns
        .iter()
        .filter(|column| column.source_index != geom_index)
        .map(|column| {
            let base = sanitize_field_name(&column.source_name);
            let dest_name = dedupe_field_name(&base, &used);
            used.insert(dest_name.to_ascii_uppercase());
            FieldMapping {
                dest_name,
                source_index: column.source_index,
                source_name: column.source_name.clone(),
            }
        })
        .collect()
}

fn opaque_fields(
    columns: &[ColumnDescriptor],
    geom_index: usize,
    row_width: usize,
) -> Vec<FieldMapping> {
    (0..row_width)
        .filter(|&index| index != geom_index)
        .enumerate()
        .map(|(counter, index)| FieldMapping {
            dest_name: format!("f{counter}"),
            source_index: index,
            source_name: columns
                .get(index)
                .map_or_else(|| format!("col_{index}"), |c| c.source_name.clone()),
        })
        .collect()
}

/// Sanitize a column name into a field name of at most 10 bytes.
///
/// Every non-alphanumeric character becomes `_`; a result equal to `id`
/// (any case) becomes `id_1`, and an empty result becomes `_`.
#[must_use]
pub fn sanitize_field_name(name: &str) -> String {
    let clean: String = name
        .chars()
        .map(|ch| if ch.is_alphanumeric() { ch } else { '_' })
        .collect();
    let clean = truncate_name(&clean, MAX_FIELD_NAME_LEN);

    if clean.is_empty() {
        EMPTY_NAME_REPLACEMENT.to_string()
    } else if clean.eq_ignore_ascii_case("id") {
        ID_REPLACEMENT.to_string()
    } else {
        clean.to_string()
    }
}

/// Append `_1`, `_2`, … to `base` until it is not in `used`, cutting the
/// base short so the result stays within 10 bytes.
///
/// `used` holds ASCII-uppercased names; dBase tables compare field names
/// case-insensitively.
fn dedupe_field_name(base: &str, used: &HashSet<String>) -> String {
    let mut candidate = base.to_string();
    let mut count = 1usize;
    while used.contains(&candidate.to_ascii_uppercase()) {
        let suffix = format!("_{count}");
        let keep = MAX_FIELD_NAME_LEN.saturating_sub(suffix.len());
        candidate = format!("{}{suffix}", truncate_name(base, keep));
        count += 1;
    }
    candidate
}

/// Cut `name` to at most `max_bytes` without splitting a character.
fn truncate_name(name: &str, max_bytes: usize) -> &str {
    if name.len() <= max_bytes {
        return name;
    }
    let mut end = max_bytes;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

/// Project one data row onto the mapping.
///
/// Returns `None` when the geometry slot is missing, null, not a string, or
/// blank; such rows are dropped without raising an error.
#[must_use]
pub fn project_row<'a>(
    row: &'a [Value],
    mapping: &SchemaMapping,
    geom_index: usize,
) -> Option<ProjectedRow<'a>> {
    let geometry = match row.get(geom_index) {
        Some(Value::String(text)) if !text.trim().is_empty() => text.as_str(),
        _ => return None,
    };

    let attributes = mapping
        .fields
        .iter()
        .map(|field| attribute_text(row.get(field.source_index)))
        .collect();

    Some(ProjectedRow {
        geometry,
        attributes,
    })
}

/// Render a raw row value as attribute text.
///
/// Missing and null values become `""`; numbers and booleans use their JSON
/// text; arrays and objects are written as compact JSON.
#[must_use]
pub fn attribute_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Classify a WKT sample as a point or polygon dataset.
///
/// Any text containing `POLYGON` (including `MULTIPOLYGON`) is a polygon;
/// otherwise the text must start with `POINT`.
///
/// # Errors
///
/// Returns [`SchemaError::UnrecognizedGeometryKind`] with the first 40
/// characters of `sample` when neither rule matches.
pub fn detect_geometry_kind(sample: &str) -> std::result::Result<GeometryKind, SchemaError> {
    let normalized = sample.trim().to_uppercase();
    if normalized.contains("POLYGON") {
        Ok(GeometryKind::Polygon)
    } else if normalized.starts_with("POINT") {
        Ok(GeometryKind::Point)
    } else {
        Err(SchemaError::UnrecognizedGeometryKind {
            sample: sample.chars().take(SAMPLE_PREVIEW_LEN).collect(),
        })
    }
}

/// Lines of the field lookup file, `"{dest_name} = {source_name}"` each.
#[must_use]
pub fn field_lookup_lines(mapping: &SchemaMapping) -> Vec<String> {
    mapping
        .fields
        .iter()
        .map(|field| format!("{} = {}", field.dest_name, field.source_name))
        .collect()
}

/// Write the field lookup file next to an opaque-indexed dataset.
///
/// # Errors
///
/// Returns an [`crate::error::IoError::Write`] if the file cannot be written.
pub fn write_field_lookup(mapping: &SchemaMapping, path: &Path) -> Result<()> {
    let mut content = field_lookup_lines(mapping).join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    std::fs::write(path, content).with_write_context("field lookup", path)
}
