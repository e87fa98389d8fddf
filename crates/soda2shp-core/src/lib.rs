//! `soda2shp-core` turns Socrata open-data view exports into GIS feature datasets.
//!
//! This crate includes:
//! - **Schema Projector**: maps the export's columns onto short, unique
//!   attribute field names and projects each row onto that mapping.
//! - **Socrata loader**: parses `rows.json` exports into a schema and rows.
//! - **Driver Registry**: the input and output formats and their capabilities.
//! - **Convert pipeline**: runs a whole conversion through a geometry engine.
//!
//! # Example
//!
//! ```no_run
//! use soda2shp_core::config::ConvertOptions;
//! use soda2shp_core::operations::convert;
//!
//! let options = ConvertOptions::new("rows.json", "parcels.shp");
//! let report = convert(&options)?;
//! println!("{} feature(s) written", report.features_written);
//! # Ok::<(), soda2shp_core::error::Soda2ShpError>(())
//! ```

pub mod config;
pub mod drivers;
pub mod error;
pub mod operations;
pub mod projector;
pub mod socrata;
pub mod types;
