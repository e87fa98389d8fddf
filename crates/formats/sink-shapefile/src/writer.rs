//! Shapefile dataset writer

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Result;
use log::{debug, warn};
use shapefile::Writer;
use shapefile::dbase::{FieldValue, Record, TableWriterBuilder};
use sink_shared::{SpatialFormatResult, SpatialFormatWriteError, ensure_kind, parse_wkt};
use soda2shp_core_common::{
    DatasetSchema, DatasetSummary, FeatureDataset, FieldDefinition, GeometryKind,
    SpatialReference,
};

use crate::shapes::{to_point, to_polygon};

/// An open shapefile accepting features of a single geometry kind
pub struct ShapefileDataset {
    path: PathBuf,
    kind: GeometryKind,
    fields: Vec<FieldDefinition>,
    writer: Writer<BufWriter<File>>,
    prj_path: Option<PathBuf>,
    features_written: usize,
}

impl ShapefileDataset {
    /// Create the `.shp`/`.shx`/`.dbf` files and the `.prj` sidecar
    ///
    /// Existing files at the same location are replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the files cannot be created.
    pub fn create(
        path: PathBuf,
        table: TableWriterBuilder,
        schema: &DatasetSchema,
        kind: GeometryKind,
        spatial_ref: SpatialReference,
    ) -> Result<Self> {
        let writer = Writer::from_path(&path, table).map_err(|err| {
            SpatialFormatWriteError::Other {
                message: format!("Failed to create shapefile '{}': {err}", path.display()),
            }
        })?;

        let prj_path = match spatial_ref.esri_wkt() {
            Some(wkt) => {
                let prj_path = path.with_extension("prj");
                fs::write(&prj_path, wkt).map_err(|source| SpatialFormatWriteError::Io {
                    source,
                    context: Some(prj_path.display().to_string()),
                })?;
                Some(prj_path)
            },
            None => {
                warn!("No ESRI WKT known for {spatial_ref}, skipping .prj sidecar");
                None
            },
        };

        Ok(Self {
            path,
            kind,
            fields: schema.fields.clone(),
            writer,
            prj_path,
            features_written: 0,
        })
    }

    fn build_record(&self, attributes: &[String]) -> SpatialFormatResult<Record> {
        if attributes.len() != self.fields.len() {
            return Err(SpatialFormatWriteError::Schema {
                message: format!(
                    "expected {} attribute value(s), got {}",
                    self.fields.len(),
                    attributes.len()
                ),
                context: Some(self.path.display().to_string()),
            });
        }

        let mut record = Record::default();
        for (field, value) in self.fields.iter().zip(attributes) {
            let value = truncate_to_width(value, usize::from(field.width));
            record.insert(field.name.clone(), FieldValue::Character(Some(value)));
        }
        Ok(record)
    }
}

impl FeatureDataset for ShapefileDataset {
    fn insert_feature(&mut self, wkt: &str, attributes: &[String]) -> Result<()> {
        let index = self.features_written as u64 + 1;
        let context = self.path.display().to_string();

        let geometry = parse_wkt(wkt)
            .and_then(|geometry| ensure_kind(&geometry, self.kind).map(|()| geometry))
            .map_err(|e| e.at_feature(index).with_additional_context(context.clone()))?;
        let record = self.build_record(attributes)?;

        let written = match self.kind {
            GeometryKind::Point => {
                let point = to_point(&geometry).map_err(|e| e.at_feature(index))?;
                self.writer.write_shape_and_record(&point, &record)
            },
            GeometryKind::Polygon => {
                let polygon = to_polygon(&geometry).map_err(|e| e.at_feature(index))?;
                self.writer.write_shape_and_record(&polygon, &record)
            },
        };
        written.map_err(|err| SpatialFormatWriteError::Other {
            message: format!("Failed to write feature {index} to '{context}': {err}"),
        })?;

        self.features_written += 1;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<DatasetSummary> {
        let Self {
            path,
            writer,
            prj_path,
            features_written,
            ..
        } = *self;

        // Headers and file lengths are finalized when the writer is dropped.
        // `shapefile` exposes no fallible close, so a failed header write
        // here is not reported.
        drop(writer);
        debug!(
            "Closed shapefile {} after {features_written} feature(s)",
            path.display()
        );

        let mut files = vec![
            path.clone(),
            path.with_extension("shx"),
            path.with_extension("dbf"),
        ];
        files.extend(prj_path);

        Ok(DatasetSummary {
            files,
            features_written,
        })
    }
}

/// Cut `value` to at most `width` bytes without splitting a character.
fn truncate_to_width(value: &str, width: usize) -> String {
    if value.len() <= width {
        return value.to_string();
    }
    let mut end = width;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}
