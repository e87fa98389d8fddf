//! Command-line interface for `soda2shp`, a converter from Socrata open-data
//! view exports to GIS feature datasets.
//!
//! This binary is a thin façade over [`soda2shp_core`]: it parses arguments
//! with [`clap`], configures [`tracing`] based logging, and delegates to the
//! command handlers below.
//!
//! # Available Commands
//!
//! - `convert` - Convert a Socrata `rows.json` export to a shapefile or `GeoJSON`
//! - `columns` - List the column schema of an export
//! - `drivers` - List the format drivers and their capabilities

mod display;

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_log::LogTracer;
use tracing_subscriber::FmtSubscriber;

use soda2shp_core::config::{
    ConvertOptions, DEFAULT_GEOMETRY_COLUMN, DEFAULT_OUTPUT_DRIVER, GeometryColumn,
};
use soda2shp_core::drivers::get_drivers;
use soda2shp_core::error::Soda2ShpError;
use soda2shp_core::operations;
use soda2shp_core::projector::RenameStrategy;
use soda2shp_core::socrata::SocrataDocument;
use soda2shp_core::types::ConvertReport;
use soda2shp_core_common::GeometryKind;

#[derive(Parser)]
#[command(
    name = "soda2shp",
    version,
    about = "Convert Socrata JSON view exports into shapefiles",
    long_about = "soda2shp reads a Socrata rows.json export, turns one WKT column into point or\n\
                  polygon geometry, and writes every other column as a text attribute."
)]
/// Command-line arguments and options for the `soda2shp` CLI.
struct Cli {
    /// Enable verbose (INFO level) logging output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug (DEBUG level) logging output with detailed diagnostics.
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the `soda2shp` CLI.
#[derive(Subcommand)]
enum Commands {
    /// Converts a Socrata export into a point or polygon dataset.
    Convert(ConvertArgs),

    /// Lists the columns of a Socrata export.
    ///
    /// Use it to find the geometry column before converting.
    Columns {
        /// Path to the Socrata `rows.json` export.
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },

    /// Lists the format drivers and their capabilities.
    Drivers,
}

/// Arguments of the `convert` subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    /// Path to the Socrata `rows.json` export.
    #[arg(short, long, value_name = "INPUT")]
    input: PathBuf,

    /// Path for the output dataset.
    #[arg(short, long, value_name = "DATASET")]
    output: PathBuf,

    /// The driver to use for writing the output (e.g., "ESRI Shapefile", "`GeoJSON`").
    #[arg(long, value_name = "DRIVER", default_value = DEFAULT_OUTPUT_DRIVER)]
    output_driver: String,

    /// Geometry column, by name or 0-based index.
    #[arg(long, value_name = "COLUMN", default_value = DEFAULT_GEOMETRY_COLUMN)]
    geometry_column: GeometryColumn,

    /// How output field names are derived: `sanitize` or `opaque`.
    #[arg(long, value_name = "STRATEGY", default_value = "sanitize")]
    rename_strategy: RenameStrategy,

    /// Geometry type of the output (`point` or `polygon`); detected when omitted.
    #[arg(long, value_name = "TYPE")]
    geometry_type: Option<GeometryKind>,

    /// Where to write the field lookup file for the `opaque` strategy.
    #[arg(long, value_name = "PATH")]
    lookup: Option<PathBuf>,

    /// Fail instead of replacing an existing output.
    #[arg(long)]
    no_overwrite: bool,
}

impl ConvertArgs {
    fn into_options(self) -> ConvertOptions {
        let mut options = ConvertOptions::new(self.input, self.output)
            .with_output_driver(self.output_driver)
            .with_geometry_column(self.geometry_column)
            .with_rename_strategy(self.rename_strategy)
            .with_overwrite(!self.no_overwrite);
        if let Some(kind) = self.geometry_type {
            options = options.with_geometry_kind(kind);
        }
        if let Some(lookup) = self.lookup {
            options = options.with_lookup_path(lookup);
        }
        options
    }
}

/// Entry point for the `soda2shp` command-line interface.
///
/// # Errors
///
/// Returns an error if command execution fails or if the logging system cannot be initialized.
fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity flags
    let log_level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    // Bridge logs from the `log` crate to the `tracing` ecosystem.
    LogTracer::init()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Convert(args) => {
            info!(
                "Converting {} to {}",
                args.input.display(),
                args.output.display()
            );
            let report = handle_convert(args.into_options())?;
            display::display_report(&report);
        },
        Commands::Columns { input } => {
            info!("Listing columns of {}", input.display());
            handle_columns(&input)?;
        },
        Commands::Drivers => {
            handle_drivers();
        },
    }

    Ok(())
}

fn handle_convert(options: ConvertOptions) -> Result<ConvertReport> {
    info!("Output driver: {}", options.output_driver);
    info!("Geometry column: {}", options.geometry_column);
    info!("Rename strategy: {}", options.rename_strategy);

    operations::convert(&options).map_err(cli_error)
}

fn handle_columns(input: &std::path::Path) -> Result<()> {
    let document = SocrataDocument::from_path(input).map_err(cli_error)?;
    display::display_columns(document.meta.view.name.as_deref(), &document.columns());
    Ok(())
}

fn handle_drivers() {
    display::display_drivers(&get_drivers());
}

/// Turn a library error into the message printed to the user.
fn cli_error(err: Soda2ShpError) -> anyhow::Error {
    match err.recovery_suggestion() {
        Some(hint) => anyhow!("{}\n\nHint: {hint}", err.user_message()),
        None => anyhow!(err.user_message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;
    use tempfile::TempDir;

    const EXPORT: &str = r#"{
  "meta": { "view": { "name": "Parcels", "columns": [
    { "name": "Parcel ID", "fieldName": "parcel_id", "dataTypeName": "text" },
    { "name": "the_geom", "fieldName": "the_geom", "dataTypeName": "point" }
  ] } },
  "data": [["A1", "POINT (1 2)"]]
}"#;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_convert_args_defaults() {
        let cli = Cli::try_parse_from(["soda2shp", "convert", "-i", "rows.json", "-o", "out.shp"])
            .unwrap();
        let Commands::Convert(args) = cli.command else {
            panic!("expected the convert command");
        };
        let options = args.into_options();
        assert_eq!(options.output_driver, "ESRI Shapefile");
        assert_eq!(
            options.geometry_column,
            GeometryColumn::Name("the_geom".to_string())
        );
        assert_eq!(options.rename_strategy, RenameStrategy::SanitizeTruncate);
        assert!(options.geometry_kind.is_none());
        assert!(options.overwrite);
    }

    #[test]
    fn test_convert_args_all_options() {
        let cli = Cli::try_parse_from([
            "soda2shp",
            "convert",
            "-i",
            "rows.json",
            "-o",
            "out.geojson",
            "--output-driver",
            "GeoJSON",
            "--geometry-column",
            "36",
            "--rename-strategy",
            "opaque",
            "--geometry-type",
            "polygon",
            "--lookup",
            "lookup.txt",
            "--no-overwrite",
        ])
        .unwrap();
        let Commands::Convert(args) = cli.command else {
            panic!("expected the convert command");
        };
        let options = args.into_options();
        assert_eq!(options.geometry_column, GeometryColumn::Index(36));
        assert_eq!(options.rename_strategy, RenameStrategy::OpaqueIndexed);
        assert_eq!(options.geometry_kind, Some(GeometryKind::Polygon));
        assert_eq!(options.lookup_path, Some(PathBuf::from("lookup.txt")));
        assert!(!options.overwrite);
    }

    #[test]
    fn test_convert_args_reject_bad_strategy() {
        let result = Cli::try_parse_from([
            "soda2shp",
            "convert",
            "-i",
            "rows.json",
            "-o",
            "out.shp",
            "--rename-strategy",
            "shorten",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_handle_convert_writes_shapefile() -> Result<()> {
        let dir = TempDir::new()?;
        let input = dir.path().join("rows.json");
        fs::write(&input, EXPORT)?;

        let report = handle_convert(ConvertOptions::new(&input, dir.path().join("parcels")))?;
        assert_eq!(report.features_written, 1);
        assert!(dir.path().join("parcels.shp").exists());
        assert!(dir.path().join("parcels.prj").exists());
        Ok(())
    }

    #[test]
    fn test_handle_convert_invalid_output_driver() {
        let options = ConvertOptions::new("rows.json", "out.kml").with_output_driver("KML");
        let err = handle_convert(options).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Driver 'KML' not found."));
        assert!(message.contains("Hint: Run 'soda2shp drivers'"));
    }

    #[test]
    fn test_handle_columns_missing_file() {
        let err = handle_columns(std::path::Path::new("/no/such/rows.json")).unwrap_err();
        assert!(err.to_string().starts_with("File not found: /no/such/rows.json"));
    }
}
