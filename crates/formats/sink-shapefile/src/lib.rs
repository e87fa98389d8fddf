//! ESRI Shapefile output driver for `soda2shp`.
//!
//! Features are written with the [`shapefile`] crate: geometry goes to the
//! `.shp`/`.shx` pair, attributes to the `.dbf` table (every field a 255-wide
//! character field), and the spatial reference to a `.prj` sidecar.

mod shapes;
pub mod writer;

use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use log::debug;
use shapefile::dbase::{FieldName, TableWriterBuilder};
use sink_shared::SpatialFormatWriteError;
use soda2shp_core_common::{
    DatasetSchema, FeatureDataset, GeometryEngine, GeometryKind, SpatialReference,
};

pub use writer::ShapefileDataset;

/// Longest field name a dBase table accepts, in bytes.
pub const MAX_FIELD_NAME_BYTES: usize = 10;

/// Geometry engine that writes ESRI Shapefiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapefileEngine;

impl ShapefileEngine {
    /// Create a new shapefile engine
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl GeometryEngine for ShapefileEngine {
    fn create_dataset(
        &self,
        path: &Path,
        schema: &DatasetSchema,
        kind: GeometryKind,
        spatial_ref: SpatialReference,
    ) -> Result<Box<dyn FeatureDataset>> {
        let shp_path = path.with_extension("shp");
        let context = shp_path.display().to_string();
        let table = build_table(schema).map_err(|e| e.with_additional_context(context))?;

        debug!(
            "Creating {kind} shapefile {} with {} field(s) in {spatial_ref}",
            shp_path.display(),
            schema.len()
        );

        let dataset = ShapefileDataset::create(shp_path, table, schema, kind, spatial_ref)?;
        Ok(Box::new(dataset))
    }
}

/// Translate the attribute schema into a dBase table definition
fn build_table(schema: &DatasetSchema) -> Result<TableWriterBuilder, SpatialFormatWriteError> {
    let mut seen = HashSet::new();
    let mut table = TableWriterBuilder::new();

    for field in &schema.fields {
        if field.name.is_empty() || field.name.len() > MAX_FIELD_NAME_BYTES {
            return Err(SpatialFormatWriteError::Schema {
                message: format!(
                    "field name '{}' must be between 1 and {MAX_FIELD_NAME_BYTES} bytes",
                    field.name
                ),
                context: None,
            });
        }
        // dBase readers compare field names case-insensitively.
        if !seen.insert(field.name.to_ascii_uppercase()) {
            return Err(SpatialFormatWriteError::Schema {
                message: format!("duplicate field name '{}'", field.name),
                context: None,
            });
        }

        let name = FieldName::try_from(field.name.as_str()).map_err(|err| {
            SpatialFormatWriteError::Schema {
                message: format!("invalid field name '{}': {err:?}", field.name),
                context: None,
            }
        })?;
        table = table.add_character_field(name, field.width);
    }

    Ok(table)
}
