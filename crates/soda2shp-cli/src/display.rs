//! Display utilities for formatting CLI output.
//!
//! Table rows for the `columns`, `drivers` and `convert` commands, plus the
//! functions that print them.

use tabled::{Table, Tabled};

use soda2shp_core::drivers::Driver;
use soda2shp_core::types::{ColumnDescriptor, ConvertReport};

/// Table row for one column of a Socrata export.
#[derive(Tabled)]
pub struct ColumnRow {
    /// Position of the column in every data row.
    #[tabled(rename = "Index")]
    pub index: usize,
    /// Human-readable column name.
    #[tabled(rename = "Name")]
    pub name: String,
    /// Socrata API field name.
    #[tabled(rename = "Field Name")]
    pub field_name: String,
    /// Socrata data type.
    #[tabled(rename = "Type")]
    pub data_type: String,
}

impl From<&ColumnDescriptor> for ColumnRow {
    fn from(column: &ColumnDescriptor) -> Self {
        Self {
            index: column.source_index,
            name: column.source_name.clone(),
            field_name: column.field_name.clone().unwrap_or_else(|| "N/A".to_string()),
            data_type: column.data_type.clone().unwrap_or_else(|| "N/A".to_string()),
        }
    }
}

/// Table row for one output field and the column it was built from.
#[derive(Tabled)]
pub struct FieldMappingRow {
    /// Output field name.
    #[tabled(rename = "Field")]
    pub field: String,
    /// Source position in the data rows.
    #[tabled(rename = "Index")]
    pub index: usize,
    /// Source column name.
    #[tabled(rename = "Column")]
    pub column: String,
}

/// Table row representation for displaying driver information.
#[derive(Tabled)]
pub struct DriverRow {
    /// Short identifier for the driver (e.g., `GeoJSON`).
    #[tabled(rename = "Short Name")]
    pub short_name: String,
    /// Full descriptive name of the driver format.
    #[tabled(rename = "Long Name")]
    pub long_name: String,
    /// Support status for listing a dataset's columns.
    #[tabled(rename = "Info")]
    pub info: String,
    /// Support status for reading data from this format.
    #[tabled(rename = "Read")]
    pub read: String,
    /// Support status for writing data to this format.
    #[tabled(rename = "Write")]
    pub write: String,
}

impl From<&Driver> for DriverRow {
    fn from(driver: &Driver) -> Self {
        Self {
            short_name: driver.short_name.to_string(),
            long_name: driver.long_name.to_string(),
            info: driver.capabilities.info.as_str().to_string(),
            read: driver.capabilities.read.as_str().to_string(),
            write: driver.capabilities.write.as_str().to_string(),
        }
    }
}

/// Print the column schema of an export.
pub fn display_columns(title: Option<&str>, columns: &[ColumnDescriptor]) {
    if let Some(title) = title {
        println!("\nDataset: {title}");
    }
    println!("\nColumns ({} total):\n", columns.len());

    let rows: Vec<ColumnRow> = columns.iter().map(ColumnRow::from).collect();
    println!("{}", Table::new(rows));
}

/// Print the driver registry.
pub fn display_drivers(drivers: &[Driver]) {
    println!("\nAvailable Drivers ({} total):\n", drivers.len());

    let rows: Vec<DriverRow> = drivers.iter().map(DriverRow::from).collect();
    println!("{}", Table::new(rows));
}

/// Print the outcome of a conversion.
pub fn display_report(report: &ConvertReport) {
    println!(
        "\nGeometry: '{}' (index {}) as {}",
        report.geometry_column, report.geometry_index, report.geometry_kind
    );
    println!(
        "Rows: {} read, {} written, {} skipped",
        report.rows_read, report.features_written, report.rows_skipped
    );

    if !report.mapping.is_empty() {
        println!("\n=== Fields ===");
        let rows: Vec<FieldMappingRow> = report
            .mapping
            .fields
            .iter()
            .map(|f| FieldMappingRow {
                field: f.dest_name.clone(),
                index: f.source_index,
                column: f.source_name.clone(),
            })
            .collect();
        println!("{}", Table::new(rows));
    }

    if !report.output_files.is_empty() {
        println!("\n=== Files ===");
        for file in &report.output_files {
            println!("{}", file.display());
        }
    }
    if let Some(lookup) = &report.lookup_path {
        println!("Field lookup: {}", lookup.display());
    }
}
