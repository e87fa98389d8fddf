//! Common types and traits shared across `soda2shp` crates.
//!
//! This crate provides the abstractions that are shared between
//! `soda2shp-core` and the output driver crates, preventing circular dependencies.

pub mod drivers;
pub mod io;
pub mod types;

// Re-export commonly used types
pub use drivers::{Driver, DriverCapabilities, SupportStatus};
pub use io::{FeatureDataset, GeometryEngine};
pub use types::{
    DatasetSchema, DatasetSummary, FieldDefinition, GeometryKind, SpatialReference,
    TEXT_FIELD_WIDTH,
};
