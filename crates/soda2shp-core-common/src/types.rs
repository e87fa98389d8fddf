//! Types exchanged between the schema projector and the geometry engines.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::anyhow;

/// Width of every attribute field written to an output dataset.
pub const TEXT_FIELD_WIDTH: u8 = 255;

/// Geometry kind of an output dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    /// Single points.
    Point,
    /// Polygons, including multi-part polygons.
    Polygon,
}

impl GeometryKind {
    /// Returns the upper-case name used in diagnostics and reports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "POINT",
            GeometryKind::Polygon => "POLYGON",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeometryKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "point" => Ok(GeometryKind::Point),
            "polygon" => Ok(GeometryKind::Polygon),
            other => Err(anyhow!(
                "unknown geometry type '{other}', expected 'point' or 'polygon'"
            )),
        }
    }
}

/// Spatial reference of an output dataset, identified by EPSG code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpatialReference {
    /// EPSG code.
    pub epsg: u32,
}

impl SpatialReference {
    /// WGS84 geographic coordinates (EPSG:4326).
    pub const WGS84: SpatialReference = SpatialReference { epsg: 4326 };

    /// Returns the ESRI WKT used in `.prj` sidecar files, when known.
    #[must_use]
    pub fn esri_wkt(&self) -> Option<&'static str> {
        match self.epsg {
            4326 => Some(
                r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#,
            ),
            _ => None,
        }
    }
}

impl fmt::Display for SpatialReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

/// A single text attribute field of an output dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    /// Field name as written to the dataset.
    pub name: String,
    /// Maximum field width in bytes.
    pub width: u8,
}

impl FieldDefinition {
    /// Creates a text field with the default width.
    #[must_use]
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            width: TEXT_FIELD_WIDTH,
        }
    }
}

/// Attribute schema handed to a geometry engine when creating a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetSchema {
    /// Fields in output order.
    pub fields: Vec<FieldDefinition>,
}

impl DatasetSchema {
    /// Builds a schema of text fields from the given names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: names.into_iter().map(FieldDefinition::text).collect(),
        }
    }

    /// Number of attribute fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when the schema has no attribute fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Result of finishing a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSummary {
    /// Files written by the engine, main file first.
    pub files: Vec<PathBuf>,
    /// Number of features written.
    pub features_written: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_kind_from_str() {
        assert_eq!("point".parse::<GeometryKind>().unwrap(), GeometryKind::Point);
        assert_eq!(
            " Polygon ".parse::<GeometryKind>().unwrap(),
            GeometryKind::Polygon
        );
        let err = "line".parse::<GeometryKind>().unwrap_err();
        assert!(err.to_string().contains("unknown geometry type 'line'"));
    }

    #[test]
    fn test_spatial_reference_wkt() {
        assert_eq!(SpatialReference::WGS84.to_string(), "EPSG:4326");
        assert!(
            SpatialReference::WGS84
                .esri_wkt()
                .is_some_and(|wkt| wkt.starts_with("GEOGCS[\"GCS_WGS_1984\""))
        );
        assert!(SpatialReference { epsg: 3857 }.esri_wkt().is_none());
    }

    #[test]
    fn test_schema_from_names() {
        let schema = DatasetSchema::from_names(["a", "b"]);
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.fields[1], FieldDefinition::text("b"));
        assert_eq!(schema.fields[0].width, TEXT_FIELD_WIDTH);
    }
}
