//! Format driver registry.
//!
//! `soda2shp` reads one input format (Socrata `rows.json` exports) and writes
//! features through the output drivers listed here. Each entry records what
//! the driver can do; [`engine_for`] hands out the geometry engine behind a
//! writable driver.

use sink_geojson::{GeoJsonEngine, GeoJsonWriterOptions};
use sink_shapefile::ShapefileEngine;
use soda2shp_core_common::GeometryEngine;

pub use soda2shp_core_common::{Driver, DriverCapabilities, SupportStatus};

use crate::error::{DriverError, Result};

/// Short name of the Socrata input driver.
pub const SOCRATA_DRIVER: &str = "SocrataJSON";

/// Returns the static list of known drivers.
///
/// Drivers marked [`SupportStatus::Planned`] are listed so the CLI can show
/// them, but they cannot be used yet.
#[must_use]
pub fn get_drivers() -> Vec<Driver> {
    use SupportStatus::{NotSupported, Planned, Supported};

    vec![
        Driver::new(
            SOCRATA_DRIVER,
            "Socrata Open Data API view export (rows.json)",
            "json",
            Supported,
            Supported,
            NotSupported,
        ),
        Driver::new(
            "ESRI Shapefile",
            "ESRI Shapefile",
            "shp",
            NotSupported,
            NotSupported,
            Supported,
        ),
        Driver::new(
            "GeoJSON",
            "GeoJSON",
            "geojson",
            NotSupported,
            NotSupported,
            Supported,
        ),
        Driver::new(
            "FileGDB",
            "ESRI File Geodatabase",
            "gdb",
            NotSupported,
            NotSupported,
            Planned,
        ),
    ]
}

/// Returns all drivers that have at least one fully supported operation.
#[must_use]
pub fn get_available_drivers() -> Vec<Driver> {
    get_drivers()
        .into_iter()
        .filter(|d| d.capabilities.has_supported_operation())
        .collect()
}

/// Finds a driver by its short name (case-insensitive).
///
/// # Examples
///
/// ```
/// use soda2shp_core::drivers::find_driver;
///
/// let driver = find_driver("esri shapefile").expect("shapefile driver should exist");
/// assert_eq!(driver.short_name, "ESRI Shapefile");
/// assert!(find_driver("KML").is_none());
/// ```
#[must_use]
pub fn find_driver(name: &str) -> Option<Driver> {
    get_drivers()
        .into_iter()
        .find(|d| d.short_name.eq_ignore_ascii_case(name))
}

/// Lists the drivers that fully support every requested operation.
///
/// A `false` argument leaves that operation unconstrained.
#[must_use]
pub fn list_drivers_with_capability(read: bool, write: bool, info: bool) -> Vec<Driver> {
    get_drivers()
        .into_iter()
        .filter(|d| {
            let read_ok = !read || d.capabilities.read.is_supported();
            let write_ok = !write || d.capabilities.write.is_supported();
            let info_ok = !info || d.capabilities.info.is_supported();
            read_ok && write_ok && info_ok
        })
        .collect()
}

/// Returns all driver short names, sorted.
#[must_use]
pub fn get_driver_names() -> Vec<&'static str> {
    let mut names: Vec<_> = get_drivers().iter().map(|d| d.short_name).collect();
    names.sort_unstable();
    names
}

/// Returns the geometry engine that writes `driver`'s format.
///
/// # Errors
///
/// Returns [`DriverError::OperationNotSupported`] if the driver cannot write.
pub fn engine_for(driver: &Driver) -> Result<Box<dyn GeometryEngine>> {
    let engine: Box<dyn GeometryEngine> = match driver.short_name {
        "ESRI Shapefile" if driver.capabilities.write.is_supported() => {
            Box::new(ShapefileEngine::new())
        },
        "GeoJSON" if driver.capabilities.write.is_supported() => {
            Box::new(GeoJsonEngine::new(GeoJsonWriterOptions::new()))
        },
        _ => {
            return Err(DriverError::OperationNotSupported {
                driver: driver.short_name.to_string(),
                operation: "writing".to_string(),
            }
            .into());
        },
    };
    Ok(engine)
}
