//! `GeoJSON` output driver for `soda2shp`.
//!
//! Features are buffered in memory and written as a single
//! `FeatureCollection` when the dataset is finished. Attribute values are
//! stored as string properties keyed by the projected field names.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject, JsonValue};
use log::{debug, warn};
use sink_shared::{SpatialFormatWriteError, ensure_kind, parse_wkt};
use soda2shp_core_common::{
    DatasetSchema, DatasetSummary, FeatureDataset, GeometryEngine, GeometryKind,
    SpatialReference,
};

/// Options for `GeoJSON` writing
#[derive(Debug, Clone, Default)]
pub struct GeoJsonWriterOptions {
    /// Indent the output (default: false)
    pub pretty: bool,
}

impl GeoJsonWriterOptions {
    /// Create new writer options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to pretty-print the output
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

/// Geometry engine that writes `GeoJSON` feature collections.
#[derive(Debug, Clone, Default)]
pub struct GeoJsonEngine {
    options: GeoJsonWriterOptions,
}

impl GeoJsonEngine {
    /// Create a new `GeoJSON` engine
    #[must_use]
    pub fn new(options: GeoJsonWriterOptions) -> Self {
        Self { options }
    }
}

impl GeometryEngine for GeoJsonEngine {
    fn create_dataset(
        &self,
        path: &Path,
        schema: &DatasetSchema,
        kind: GeometryKind,
        spatial_ref: SpatialReference,
    ) -> Result<Box<dyn FeatureDataset>> {
        // RFC 7946 coordinates are always WGS84.
        if spatial_ref != SpatialReference::WGS84 {
            warn!("GeoJSON output assumes EPSG:4326, coordinates are written as-is from {spatial_ref}");
        }

        // Create the file up front so path problems surface before any row is read.
        let file = File::create(path).map_err(|source| SpatialFormatWriteError::Io {
            source,
            context: Some(path.display().to_string()),
        })?;
        debug!("Creating {kind} GeoJSON {}", path.display());

        Ok(Box::new(GeoJsonDataset {
            path: path.to_path_buf(),
            kind,
            field_names: schema.fields.iter().map(|f| f.name.clone()).collect(),
            writer: BufWriter::new(file),
            options: self.options.clone(),
            features: Vec::new(),
        }))
    }
}

/// An open `GeoJSON` dataset buffering features until [`FeatureDataset::finish`].
pub struct GeoJsonDataset {
    path: PathBuf,
    kind: GeometryKind,
    field_names: Vec<String>,
    writer: BufWriter<File>,
    options: GeoJsonWriterOptions,
    features: Vec<Feature>,
}

impl FeatureDataset for GeoJsonDataset {
    fn insert_feature(&mut self, wkt: &str, attributes: &[String]) -> Result<()> {
        let index = self.features.len() as u64 + 1;
        let context = self.path.display().to_string();

        let geometry = parse_wkt(wkt)
            .and_then(|geometry| ensure_kind(&geometry, self.kind).map(|()| geometry))
            .map_err(|e| e.at_feature(index).with_additional_context(context.clone()))?;

        if attributes.len() != self.field_names.len() {
            return Err(SpatialFormatWriteError::Schema {
                message: format!(
                    "expected {} attribute value(s), got {}",
                    self.field_names.len(),
                    attributes.len()
                ),
                context: Some(context),
            }
            .into());
        }

        let properties: JsonObject = self
            .field_names
            .iter()
            .zip(attributes)
            .map(|(name, value)| (name.clone(), JsonValue::String(value.clone())))
            .collect();

        self.features.push(Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(&geometry))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<DatasetSummary> {
        let Self {
            path,
            mut writer,
            options,
            features,
            ..
        } = *self;
        let features_written = features.len();

        let collection = GeoJson::FeatureCollection(FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        });

        let serialized = if options.pretty {
            serde_json::to_writer_pretty(&mut writer, &collection)
        } else {
            serde_json::to_writer(&mut writer, &collection)
        };
        serialized.map_err(|err| SpatialFormatWriteError::Other {
            message: format!("Failed to serialize GeoJSON '{}': {err}", path.display()),
        })?;
        writer.flush().map_err(|source| SpatialFormatWriteError::Io {
            source,
            context: Some(path.display().to_string()),
        })?;

        debug!(
            "Wrote {features_written} feature(s) to GeoJSON {}",
            path.display()
        );
        Ok(DatasetSummary {
            files: vec![path],
            features_written,
        })
    }
}
