//! Minimal GeoJSON geometry model, used to read provider isochrones and to
//! report the feasible polygon back to diagnostic consumers.

use crate::core::geometry::Region;
use geo::{Coord, LineString, MultiPolygon, Point, Polygon};
use serde::{Deserialize, Serialize};

/// `[lng, lat]`, optionally followed by an altitude which is ignored.
pub type Position = Vec<f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    GeometryCollection { geometries: Vec<GeoJsonGeometry> },
}

fn coord(position: &[f64]) -> Option<Coord<f64>> {
    match position {
        [x, y, ..] => Some(Coord { x: *x, y: *y }),
        _ => None,
    }
}

fn line(positions: &[Position]) -> Option<LineString<f64>> {
    positions
        .iter()
        .map(|p| coord(p))
        .collect::<Option<Vec<_>>>()
        .map(LineString::new)
}

fn polygon(rings: &[Vec<Position>]) -> Option<Polygon<f64>> {
    let mut rings = rings.iter().map(|r| line(r));
    let exterior = match rings.next() {
        Some(ring) => ring?,
        None => LineString::new(vec![]),
    };
    let interiors = rings.collect::<Option<Vec<_>>>()?;
    Some(Polygon::new(exterior, interiors))
}

fn positions(line: &LineString<f64>) -> Vec<Position> {
    line.coords().map(|c| vec![c.x, c.y]).collect()
}

impl GeoJsonGeometry {
    /// Converts to a [`Region`]; `None` when a position has fewer than two
    /// ordinates.
    pub fn to_region(&self) -> Option<Region> {
        let region = match self {
            GeoJsonGeometry::Point { coordinates } => Region::Point(Point::from(coord(coordinates)?)),
            GeoJsonGeometry::MultiPoint { coordinates } => Region::Collection(
                coordinates
                    .iter()
                    .map(|p| coord(p).map(|c| Region::Point(Point::from(c))))
                    .collect::<Option<Vec<_>>>()?,
            ),
            GeoJsonGeometry::LineString { coordinates } => Region::Line(line(coordinates)?),
            GeoJsonGeometry::MultiLineString { coordinates } => Region::Collection(
                coordinates
                    .iter()
                    .map(|l| line(l).map(Region::Line))
                    .collect::<Option<Vec<_>>>()?,
            ),
            GeoJsonGeometry::Polygon { coordinates } => Region::Polygon(polygon(coordinates)?),
            GeoJsonGeometry::MultiPolygon { coordinates } => Region::MultiPolygon(MultiPolygon::new(
                coordinates
                    .iter()
                    .map(|rings| polygon(rings))
                    .collect::<Option<Vec<_>>>()?,
            )),
            GeoJsonGeometry::GeometryCollection { geometries } => Region::Collection(
                geometries
                    .iter()
                    .map(GeoJsonGeometry::to_region)
                    .collect::<Option<Vec<_>>>()?,
            ),
        };
        Some(region)
    }
}

impl From<&Polygon<f64>> for GeoJsonGeometry {
    fn from(polygon: &Polygon<f64>) -> Self {
        let mut rings = vec![positions(polygon.exterior())];
        rings.extend(polygon.interiors().iter().map(positions));
        GeoJsonGeometry::Polygon { coordinates: rings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_polygon_with_altitude() {
        let geometry: GeoJsonGeometry = serde_json::from_value(json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0, 12.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
        }))
        .unwrap();

        let region = geometry.to_region().unwrap();
        assert!((region.area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_parse_geometry_collection() {
        let geometry: GeoJsonGeometry = serde_json::from_value(json!({
            "type": "GeometryCollection",
            "geometries": [
                {"type": "Point", "coordinates": [5.0, 5.0]},
                {"type": "LineString", "coordinates": [[0.0, 0.0], [2.0, 2.0]]},
                {"type": "Polygon", "coordinates": [[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0], [0.0, 0.0]]]}
            ]
        }))
        .unwrap();

        match geometry.to_region().unwrap() {
            Region::Collection(members) => {
                assert_eq!(members.len(), 3);
                assert!(matches!(members[2], Region::Polygon(_)));
            }
            other => panic!("expected collection, got {:?}", other),
        }
    }

    #[test]
    fn test_short_position_is_rejected() {
        let geometry = GeoJsonGeometry::Point {
            coordinates: vec![1.0],
        };
        assert!(geometry.to_region().is_none());
    }

    #[test]
    fn test_polygon_serializes_as_geojson() {
        let polygon = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]),
            vec![],
        );
        let value = serde_json::to_value(GeoJsonGeometry::from(&polygon)).unwrap();
        assert_eq!(value["type"], "Polygon");
        assert_eq!(value["coordinates"][0][1], json!([1.0, 0.0]));
        assert_eq!(value["coordinates"][0].as_array().unwrap().len(), 4);
    }
}
