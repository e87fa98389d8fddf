//! Geometry engine traits for writing feature datasets.
//!
//! This module defines the capability interface that output drivers must
//! provide. The schema projector only ever talks to these traits, so it has
//! no dependency on any specific GIS engine or file format.

use anyhow::Result;
use std::path::Path;

use crate::types::{DatasetSchema, DatasetSummary, GeometryKind, SpatialReference};

/// Trait for creating feature datasets in a specific output format.
pub trait GeometryEngine {
    /// Creates (or replaces) a feature dataset at `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - Output path of the dataset's main file
    /// * `schema` - Text attribute fields, in output order
    /// * `kind` - Geometry kind every inserted feature must have
    /// * `spatial_ref` - Spatial reference the WKT coordinates are expressed in
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset cannot be created or the schema is not
    /// representable in the output format.
    fn create_dataset(
        &self,
        path: &Path,
        schema: &DatasetSchema,
        kind: GeometryKind,
        spatial_ref: SpatialReference,
    ) -> Result<Box<dyn FeatureDataset>>;
}

/// An open feature dataset accepting one feature at a time.
pub trait FeatureDataset {
    /// Parses `wkt` and appends it with its attribute values.
    ///
    /// `attributes` is aligned with the schema the dataset was created with.
    ///
    /// # Errors
    ///
    /// Returns an error if the WKT cannot be parsed, its geometry type does
    /// not match the dataset kind, or the feature cannot be written.
    fn insert_feature(&mut self, wkt: &str, attributes: &[String]) -> Result<()>;

    /// Flushes and closes the dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset cannot be finalized on disk.
    fn finish(self: Box<Self>) -> Result<DatasetSummary>;
}
