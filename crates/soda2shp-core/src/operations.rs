//! The convert pipeline: Socrata export in, feature dataset out.
//!
//! A run validates its options, loads the export, builds the field mapping
//! once, then streams every row through the output driver in input order.
//! The first error aborts the run; rows without a geometry are skipped.

use std::path::PathBuf;

use log::{debug, info};
use soda2shp_core_common::{GeometryEngine, SpatialReference};

use crate::config::ConvertOptions;
use crate::drivers::{Driver, SOCRATA_DRIVER, engine_for, find_driver};
use crate::error::{DriverError, IoError, Result, SchemaError, Soda2ShpError, driver_not_found};
use crate::projector::{
    RenameStrategy, build_field_mapping, detect_geometry_kind, project_row, write_field_lookup,
};
use crate::socrata::SocrataDocument;
use crate::types::ConvertReport;

/// Converts a Socrata export with the output driver named in `options`.
///
/// # Errors
///
/// Returns a [`DriverError`] if the output driver is unknown or cannot
/// write, and otherwise any error of [`convert_with_engine`].
pub fn convert(options: &ConvertOptions) -> Result<ConvertReport> {
    let driver = writable_driver(&options.output_driver)?;
    let engine = engine_for(&driver)?;
    convert_with_engine(options, &driver, engine.as_ref())
}

/// Converts a Socrata export, writing features through `engine`.
///
/// `driver` describes the output format; its extension decides the final
/// output path for shapefiles.
///
/// # Errors
///
/// Returns an error if:
/// - the input cannot be read or is not a Socrata export
/// - the output exists and `options.overwrite` is off
/// - the geometry column is missing or its kind cannot be detected
/// - the lookup file cannot be written
/// - the engine rejects the dataset or any feature
pub fn convert_with_engine(
    options: &ConvertOptions,
    driver: &Driver,
    engine: &dyn GeometryEngine,
) -> Result<ConvertReport> {
    info!("Starting conversion:");
    info!("Input: {} (Driver: {SOCRATA_DRIVER})", options.input.display());
    info!(
        "Output: {} (Driver: {})",
        options.output.display(),
        driver.short_name
    );

    let output = output_path(options, driver);
    if !options.overwrite && output.exists() {
        return Err(IoError::AlreadyExists { path: output }.into());
    }

    let document = SocrataDocument::from_path(&options.input)?;
    let columns = document.columns();
    info!(
        "Read {} column(s) and {} row(s)",
        columns.len(),
        document.data.len()
    );

    let geom_index = document.resolve_geometry_column(&options.geometry_column)?;
    let geometry_column = columns[geom_index].source_name.clone();

    let geometry_kind = match options.geometry_kind {
        Some(kind) => kind,
        None => {
            let sample = document.geometry_sample(geom_index).ok_or_else(|| {
                SchemaError::UnrecognizedGeometryKind {
                    sample: String::new(),
                }
            })?;
            detect_geometry_kind(sample)?
        },
    };
    info!("Geometry column '{geometry_column}' at index {geom_index} ({geometry_kind})");

    let mapping = build_field_mapping(
        &columns,
        geom_index,
        options.rename_strategy,
        document.row_width(),
    );
    info!(
        "Mapped {} attribute field(s) with the {} strategy",
        mapping.len(),
        options.rename_strategy
    );

    let lookup_path = if options.rename_strategy == RenameStrategy::OpaqueIndexed {
        let path = options.resolved_lookup_path();
        write_field_lookup(&mapping, &path)?;
        info!("Wrote field lookup {}", path.display());
        Some(path)
    } else {
        None
    };

    let mut dataset = engine.create_dataset(
        &output,
        &mapping.dataset_schema(),
        geometry_kind,
        SpatialReference::WGS84,
    )?;

    let mut rows_skipped = 0usize;
    let mut features_written = 0usize;
    for (row_index, row) in document.data.iter().enumerate() {
        let Some(projected) = project_row(row, &mapping, geom_index) else {
            debug!("Skipping row {row_index}: no geometry");
            rows_skipped += 1;
            continue;
        };
        dataset
            .insert_feature(projected.geometry, &projected.attributes)
            .map_err(|cause| Soda2ShpError::Feature {
                row: row_index,
                cause,
            })?;
        features_written += 1;
    }

    let summary = dataset.finish()?;
    info!(
        "Conversion completed: {features_written} feature(s) written, {rows_skipped} row(s) skipped"
    );

    Ok(ConvertReport {
        geometry_index: geom_index,
        geometry_column,
        geometry_kind,
        mapping,
        rows_read: document.data.len(),
        features_written,
        rows_skipped,
        output_files: summary.files,
        lookup_path,
    })
}

fn writable_driver(name: &str) -> Result<Driver> {
    let driver = find_driver(name).ok_or_else(|| driver_not_found(name))?;
    if !driver.capabilities.write.is_supported() {
        return Err(DriverError::OperationNotSupported {
            driver: driver.short_name.to_string(),
            operation: "writing".to_string(),
        }
        .into());
    }
    Ok(driver)
}

/// Shapefiles always land on a `.shp` path; other formats keep the path as given.
fn output_path(options: &ConvertOptions, driver: &Driver) -> PathBuf {
    if driver.extension == "shp" {
        options.output.with_extension("shp")
    } else {
        options.output.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeometryColumn;
    use crate::error::ConfigError;
    use soda2shp_core_common::{
        DatasetSchema, DatasetSummary, FeatureDataset, GeometryKind, SupportStatus,
    };
    use std::cell::RefCell;
    use std::fs;
    use std::path::Path;
    use std::rc::Rc;
    use tempfile::TempDir;

    #[derive(Debug, Default)]
    struct Recorded {
        path: Option<PathBuf>,
        field_names: Vec<String>,
        kind: Option<GeometryKind>,
        features: Vec<(String, Vec<String>)>,
        finished: bool,
    }

    /// Engine that records what the pipeline hands it.
    #[derive(Default)]
    struct RecordingEngine {
        recorded: Rc<RefCell<Recorded>>,
        reject_wkt_containing: Option<&'static str>,
    }

    struct RecordingDataset {
        recorded: Rc<RefCell<Recorded>>,
        reject_wkt_containing: Option<&'static str>,
    }

    impl GeometryEngine for RecordingEngine {
        fn create_dataset(
            &self,
            path: &Path,
            schema: &DatasetSchema,
            kind: GeometryKind,
            spatial_ref: SpatialReference,
        ) -> anyhow::Result<Box<dyn FeatureDataset>> {
            assert_eq!(spatial_ref, SpatialReference::WGS84);
            let mut recorded = self.recorded.borrow_mut();
            recorded.path = Some(path.to_path_buf());
            recorded.field_names = schema.fields.iter().map(|f| f.name.clone()).collect();
            recorded.kind = Some(kind);
            Ok(Box::new(RecordingDataset {
                recorded: Rc::clone(&self.recorded),
                reject_wkt_containing: self.reject_wkt_containing,
            }))
        }
    }

    impl FeatureDataset for RecordingDataset {
        fn insert_feature(&mut self, wkt: &str, attributes: &[String]) -> anyhow::Result<()> {
            if let Some(marker) = self.reject_wkt_containing
                && wkt.contains(marker)
            {
                anyhow::bail!("cannot store {marker}");
            }
            self.recorded
                .borrow_mut()
                .features
                .push((wkt.to_string(), attributes.to_vec()));
            Ok(())
        }

        fn finish(self: Box<Self>) -> anyhow::Result<DatasetSummary> {
            self.recorded.borrow_mut().finished = true;
            Ok(DatasetSummary {
                files: Vec::new(),
                features_written: self.recorded.borrow().features.len(),
            })
        }
    }

    fn shapefile_driver() -> Driver {
        find_driver("ESRI Shapefile").unwrap()
    }

    fn write_export(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("rows.json");
        fs::write(&path, body).unwrap();
        path
    }

    const POINT_EXPORT: &str = r#"{
  "meta": { "view": { "columns": [
    { "name": "Parcel ID" }, { "name": "the_geom" }, { "name": "Owner Name!" }
  ] } },
  "data": [
    ["A1", "POINT (1 2)", "Alice"],
    ["A2", null, "Bob"],
    ["A3", "POINT (3 4)", null]
  ]
}"#;

    #[test]
    fn test_convert_points_with_default_options() {
        let dir = TempDir::new().unwrap();
        let input = write_export(&dir, POINT_EXPORT);
        let options = ConvertOptions::new(&input, dir.path().join("parcels"));
        let engine = RecordingEngine::default();

        let report = convert_with_engine(&options, &shapefile_driver(), &engine).unwrap();

        assert_eq!(report.geometry_index, 1);
        assert_eq!(report.geometry_column, "the_geom");
        assert_eq!(report.geometry_kind, GeometryKind::Point);
        assert_eq!(report.mapping.pairs(), vec![("Parcel_ID", 0), ("Owner_Name", 2)]);
        assert_eq!(report.rows_read, 3);
        assert_eq!(report.features_written, 2);
        assert_eq!(report.rows_skipped, 1);
        assert!(report.lookup_path.is_none());

        let recorded = engine.recorded.borrow();
        assert_eq!(recorded.path, Some(dir.path().join("parcels.shp")));
        assert_eq!(recorded.field_names, vec!["Parcel_ID", "Owner_Name"]);
        assert_eq!(recorded.kind, Some(GeometryKind::Point));
        assert_eq!(
            recorded.features,
            vec![
                (
                    "POINT (1 2)".to_string(),
                    vec!["A1".to_string(), "Alice".to_string()]
                ),
                ("POINT (3 4)".to_string(), vec!["A3".to_string(), String::new()]),
            ]
        );
        assert!(recorded.finished);
    }

    #[test]
    fn test_convert_opaque_writes_lookup() {
        let dir = TempDir::new().unwrap();
        let input = write_export(&dir, POINT_EXPORT);
        let options = ConvertOptions::new(&input, dir.path().join("parcels.shp"))
            .with_rename_strategy(RenameStrategy::OpaqueIndexed);
        let engine = RecordingEngine::default();

        let report = convert_with_engine(&options, &shapefile_driver(), &engine).unwrap();

        assert_eq!(report.mapping.pairs(), vec![("f0", 0), ("f1", 2)]);
        let lookup = report.lookup_path.unwrap();
        assert_eq!(lookup, dir.path().join("parcels_field_lookup.txt"));
        assert_eq!(
            fs::read_to_string(lookup).unwrap(),
            "f0 = Parcel ID\nf1 = Owner Name!\n"
        );
    }

    #[test]
    fn test_convert_detects_polygons() {
        let dir = TempDir::new().unwrap();
        let input = write_export(
            &dir,
            r#"{"meta":{"view":{"columns":[{"name":"ward"},{"name":"the_geom"}]}},
                "data":[["1",""],["2","MULTIPOLYGON (((0 0, 1 1, 1 0, 0 0)))"]]}"#,
        );
        let options = ConvertOptions::new(&input, dir.path().join("wards.shp"));
        let engine = RecordingEngine::default();

        let report = convert_with_engine(&options, &shapefile_driver(), &engine).unwrap();
        assert_eq!(report.geometry_kind, GeometryKind::Polygon);
        assert_eq!(report.features_written, 1);
        assert_eq!(report.rows_skipped, 1);
    }

    #[test]
    fn test_convert_explicit_kind_skips_detection() {
        let dir = TempDir::new().unwrap();
        let input = write_export(
            &dir,
            r#"{"meta":{"view":{"columns":[{"name":"the_geom"}]}},
                "data":[["LINESTRING (0 0, 1 1)"]]}"#,
        );
        let options = ConvertOptions::new(&input, dir.path().join("lines.shp"))
            .with_geometry_kind(GeometryKind::Polygon);
        let engine = RecordingEngine::default();

        let report = convert_with_engine(&options, &shapefile_driver(), &engine).unwrap();
        assert_eq!(report.geometry_kind, GeometryKind::Polygon);
        assert!(report.mapping.is_empty());
    }

    #[test]
    fn test_convert_unrecognized_kind_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let input = write_export(
            &dir,
            r#"{"meta":{"view":{"columns":[{"name":"the_geom"}]}},
                "data":[["LINESTRING (0 0, 1 1)"]]}"#,
        );
        let options = ConvertOptions::new(&input, dir.path().join("lines.shp"));
        let engine = RecordingEngine::default();

        let err = convert_with_engine(&options, &shapefile_driver(), &engine).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unrecognized WKT geometry type: LINESTRING (0 0, 1 1)"
        );
        assert!(engine.recorded.borrow().path.is_none());
    }

    #[test]
    fn test_convert_without_any_geometry_is_unrecognized() {
        let dir = TempDir::new().unwrap();
        let input = write_export(
            &dir,
            r#"{"meta":{"view":{"columns":[{"name":"the_geom"}]}},"data":[[null]]}"#,
        );
        let options = ConvertOptions::new(&input, dir.path().join("empty.shp"));

        let err =
            convert_with_engine(&options, &shapefile_driver(), &RecordingEngine::default())
                .unwrap_err();
        assert!(matches!(
            err,
            Soda2ShpError::Schema(SchemaError::UnrecognizedGeometryKind { .. })
        ));
    }

    #[test]
    fn test_convert_missing_geometry_column() {
        let dir = TempDir::new().unwrap();
        let input = write_export(&dir, POINT_EXPORT);
        let options = ConvertOptions::new(&input, dir.path().join("out.shp"))
            .with_geometry_column(GeometryColumn::Name("location".to_string()));
        let engine = RecordingEngine::default();

        let err = convert_with_engine(&options, &shapefile_driver(), &engine).unwrap_err();
        assert!(matches!(
            err,
            Soda2ShpError::Schema(SchemaError::MissingGeometryColumn { .. })
        ));
        assert!(engine.recorded.borrow().path.is_none());
    }

    #[test]
    fn test_convert_feature_error_names_row() {
        let dir = TempDir::new().unwrap();
        let input = write_export(&dir, POINT_EXPORT);
        let options = ConvertOptions::new(&input, dir.path().join("out.shp"));
        let engine = RecordingEngine {
            reject_wkt_containing: Some("3 4"),
            ..RecordingEngine::default()
        };

        let err = convert_with_engine(&options, &shapefile_driver(), &engine).unwrap_err();
        let Soda2ShpError::Feature { row, .. } = &err else {
            panic!("expected a feature error, got {err:?}");
        };
        assert_eq!(*row, 2);
        assert!(!engine.recorded.borrow().finished);
    }

    #[test]
    fn test_convert_refuses_existing_output() {
        let dir = TempDir::new().unwrap();
        let input = write_export(&dir, POINT_EXPORT);
        fs::write(dir.path().join("out.shp"), b"").unwrap();
        let options = ConvertOptions::new(&input, dir.path().join("out")).with_overwrite(false);

        let err = convert_with_engine(&options, &shapefile_driver(), &RecordingEngine::default())
            .unwrap_err();
        assert!(matches!(err, Soda2ShpError::Io(IoError::AlreadyExists { .. })));
    }

    #[test]
    fn test_convert_missing_input() {
        let dir = TempDir::new().unwrap();
        let options = ConvertOptions::new(dir.path().join("nope.json"), dir.path().join("out"));

        let err = convert_with_engine(&options, &shapefile_driver(), &RecordingEngine::default())
            .unwrap_err();
        assert!(matches!(err, Soda2ShpError::Io(IoError::FileNotFound { .. })));
    }

    #[test]
    fn test_convert_rejects_unknown_and_read_only_drivers() {
        let options = ConvertOptions::new("in.json", "out.kml").with_output_driver("KML");
        let err = convert(&options).unwrap_err();
        assert!(matches!(err, Soda2ShpError::Driver(DriverError::NotFound { .. })));

        let options = ConvertOptions::new("in.json", "out.json").with_output_driver("socratajson");
        let err = convert(&options).unwrap_err();
        assert!(matches!(
            err,
            Soda2ShpError::Driver(DriverError::OperationNotSupported { .. })
        ));
    }

    #[test]
    fn test_output_path_normalizes_shapefile_extension() {
        let options = ConvertOptions::new("in.json", "out/parcels.json");
        assert_eq!(
            output_path(&options, &shapefile_driver()),
            PathBuf::from("out/parcels.shp")
        );

        let geojson = Driver::new(
            "GeoJSON",
            "GeoJSON",
            "geojson",
            SupportStatus::NotSupported,
            SupportStatus::NotSupported,
            SupportStatus::Supported,
        );
        assert_eq!(
            output_path(&options, &geojson),
            PathBuf::from("out/parcels.json")
        );
    }

    #[test]
    fn test_config_error_is_reported_as_configuration() {
        let err: Soda2ShpError = "bogus"
            .parse::<RenameStrategy>()
            .map_err(Soda2ShpError::from)
            .unwrap_err();
        assert!(matches!(err, Soda2ShpError::Config(ConfigError::InvalidOption { .. })));
        assert!(err.user_message().starts_with("Configuration error:"));
    }
}
