//! Conversion from `geo-types` geometries to shapefile shapes.

use geo_types::{Geometry, LineString, Polygon};
use shapefile::{Point as ShapePoint, Polygon as ShapePolygon, PolygonRing};
use sink_shared::{SpatialFormatResult, SpatialFormatWriteError, geometry_type_name};

pub(crate) fn to_point(geometry: &Geometry<f64>) -> SpatialFormatResult<ShapePoint> {
    match geometry {
        Geometry::Point(point) => Ok(ShapePoint::new(point.x(), point.y())),
        other => Err(unsupported("Point", other)),
    }
}

/// Multi-part polygons become a single shape with several outer rings.
pub(crate) fn to_polygon(geometry: &Geometry<f64>) -> SpatialFormatResult<ShapePolygon> {
    let mut rings = Vec::new();
    match geometry {
        Geometry::Polygon(polygon) => push_rings(polygon, &mut rings),
        Geometry::MultiPolygon(multi) => {
            for polygon in &multi.0 {
                push_rings(polygon, &mut rings);
            }
        },
        other => return Err(unsupported("Polygon", other)),
    }

    if !rings.iter().any(|ring| matches!(ring, PolygonRing::Outer(_))) {
        return Err(SpatialFormatWriteError::Geometry {
            message: "polygon has no exterior ring".to_string(),
            feature: None,
            context: None,
        });
    }

    Ok(ShapePolygon::with_rings(rings))
}

fn push_rings(polygon: &Polygon<f64>, rings: &mut Vec<PolygonRing<ShapePoint>>) {
    let exterior = ring_points(polygon.exterior());
    if exterior.is_empty() {
        return;
    }
    rings.push(PolygonRing::Outer(exterior));
    rings.extend(
        polygon
            .interiors()
            .iter()
            .map(ring_points)
            .filter(|points| !points.is_empty())
            .map(PolygonRing::Inner),
    );
}

fn ring_points(ring: &LineString<f64>) -> Vec<ShapePoint> {
    ring.coords()
        .map(|coord| ShapePoint::new(coord.x, coord.y))
        .collect()
}

fn unsupported(expected: &str, geometry: &Geometry<f64>) -> SpatialFormatWriteError {
    SpatialFormatWriteError::Geometry {
        message: format!(
            "cannot store {} as a shapefile {expected}",
            geometry_type_name(geometry)
        ),
        feature: None,
        context: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sink_shared::parse_wkt;

    #[test]
    fn test_point_conversion() {
        let point = to_point(&parse_wkt("POINT (1.5 -2)").unwrap()).unwrap();
        assert!((point.x - 1.5).abs() < f64::EPSILON);
        assert!((point.y + 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_polygon_with_hole() {
        let geometry =
            parse_wkt("POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0), (2 2, 4 2, 4 4, 2 2))").unwrap();
        let polygon = to_polygon(&geometry).unwrap();
        assert_eq!(polygon.rings().len(), 2);
        assert!(matches!(polygon.rings()[0], PolygonRing::Outer(_)));
        assert!(matches!(polygon.rings()[1], PolygonRing::Inner(_)));
    }

    #[test]
    fn test_multipolygon_parts_become_outer_rings() {
        let geometry = parse_wkt(
            "MULTIPOLYGON (((0 0, 1 0, 1 1, 0 0)), ((5 5, 6 5, 6 6, 5 5)))",
        )
        .unwrap();
        let polygon = to_polygon(&geometry).unwrap();
        let outer = polygon
            .rings()
            .iter()
            .filter(|ring| matches!(ring, PolygonRing::Outer(_)))
            .count();
        assert_eq!(outer, 2);
    }

    #[test]
    fn test_linestring_is_rejected() {
        let geometry = parse_wkt("LINESTRING (0 0, 1 1)").unwrap();
        let err = to_polygon(&geometry).unwrap_err();
        assert!(
            err.to_string()
                .contains("cannot store LineString as a shapefile Polygon")
        );
    }
}
