//! WKT decoding for output drivers
//!
//! Output drivers receive geometries as Well-Known Text. This module decodes
//! them into `geo-types` geometries with `geozero` and checks them against the
//! geometry kind of the dataset being written.

use geo_types::Geometry;
use geozero::ToGeo;
use geozero::wkt::Wkt;
use soda2shp_core_common::GeometryKind;

use crate::{SpatialFormatResult, SpatialFormatWriteError};

/// Decode a WKT string into a `geo-types` geometry
///
/// Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns [`SpatialFormatWriteError::Geometry`] if the text is empty or is not valid WKT.
pub fn parse_wkt(text: &str) -> SpatialFormatResult<Geometry<f64>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(SpatialFormatWriteError::Geometry {
            message: "empty WKT geometry".to_string(),
            feature: None,
            context: None,
        });
    }

    Wkt(trimmed)
        .to_geo()
        .map_err(|err| SpatialFormatWriteError::Geometry {
            message: format!("Failed to decode WKT geometry '{}': {err}", preview(trimmed)),
            feature: None,
            context: None,
        })
}

/// Returns the WKT type name of a geometry (e.g. `"MultiPolygon"`).
#[must_use]
pub fn geometry_type_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// Check that a geometry can be stored in a dataset of the given kind
///
/// Point datasets accept `Point`; polygon datasets accept `Polygon` and
/// `MultiPolygon`.
///
/// # Errors
///
/// Returns [`SpatialFormatWriteError::Geometry`] naming both types on mismatch.
pub fn ensure_kind(geometry: &Geometry<f64>, kind: GeometryKind) -> SpatialFormatResult<()> {
    let accepted = match kind {
        GeometryKind::Point => matches!(geometry, Geometry::Point(_)),
        GeometryKind::Polygon => {
            matches!(geometry, Geometry::Polygon(_) | Geometry::MultiPolygon(_))
        },
    };

    if accepted {
        Ok(())
    } else {
        Err(SpatialFormatWriteError::Geometry {
            message: format!(
                "expected {kind} geometry, found {}",
                geometry_type_name(geometry)
            ),
            feature: None,
            context: None,
        })
    }
}

fn preview(text: &str) -> String {
    text.chars().take(40).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        let geometry = parse_wkt("  POINT (-90.07 29.95) ").unwrap();
        let Geometry::Point(point) = &geometry else {
            panic!("expected a point, got {geometry:?}");
        };
        assert!((point.x() - (-90.07)).abs() < 1e-9);
        assert!((point.y() - 29.95).abs() < 1e-9);
    }

    #[test]
    fn test_parse_multipolygon() {
        let geometry = parse_wkt("MULTIPOLYGON (((0 0, 1 1, 1 0, 0 0)))").unwrap();
        assert_eq!(geometry_type_name(&geometry), "MultiPolygon");
        assert!(ensure_kind(&geometry, GeometryKind::Polygon).is_ok());
    }

    #[test]
    fn test_parse_invalid_wkt() {
        let err = parse_wkt("INVALID WKT").unwrap_err();
        assert!(
            err.to_string().contains("Failed to decode WKT geometry"),
            "unexpected message: {err}"
        );
    }

    #[test]
    fn test_parse_empty_wkt() {
        let err = parse_wkt("   ").unwrap_err();
        assert!(err.to_string().contains("empty WKT geometry"));
    }

    #[test]
    fn test_kind_mismatch() {
        let geometry = parse_wkt("POLYGON ((0 0, 1 1, 1 0, 0 0))").unwrap();
        let err = ensure_kind(&geometry, GeometryKind::Point).unwrap_err();
        assert!(
            err.to_string()
                .contains("expected POINT geometry, found Polygon")
        );
    }
}
