//! Coordinate engine: tile positions to Cartesian points.
//!
//! This module provides the pure geometry the rest of the crate is built on:
//! - `HexPosition`: where a tile sits in the row-offset layout
//! - `Point` and `Edge`: Cartesian corners and sides, compared with a tolerance
//! - `hex_center`, `hex_vertices`, `hex_edges`: pointy-top hexagon geometry
//! - `PointKey`: grid bucket used to look points up without pairwise scans
//!
//! Nothing here holds state. Corners computed independently for two touching
//! tiles land within `DEFAULT_EPSILON` of each other, which is what the
//! topology builder relies on to merge them.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Tolerance under which two coordinates are treated as the same point.
pub const DEFAULT_EPSILON: f64 = 1e-3;

/// Hex circumradius used when the caller does not pick one.
pub const DEFAULT_HEX_SIZE: f64 = 50.0;

/// A point in the shared board plane (y grows downward, like screen space).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translate this point by another point taken as a vector
    pub fn offset_by(self, by: Point) -> Self {
        Self::new(self.x + by.x, self.y + by.y)
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// `epsilon` if it is a usable tolerance, otherwise [`DEFAULT_EPSILON`].
///
/// Zero, negative and non-finite tolerances would either never match or
/// break bucket arithmetic.
pub fn usable_epsilon(epsilon: f64) -> f64 {
    if epsilon.is_finite() && epsilon > 0.0 {
        epsilon
    } else {
        DEFAULT_EPSILON
    }
}

/// Tolerance-aware point equality.
///
/// Both coordinates must differ by strictly less than `epsilon`.
pub fn points_equal(a: Point, b: Point, epsilon: f64) -> bool {
    (a.x - b.x).abs() < epsilon && (a.y - b.y).abs() < epsilon
}

/// Position of a tile in the row-offset layout.
///
/// `row` counts rows top to bottom. Rows are centred against each other by
/// shifting them half a hex, so `col` is a multiple of 0.5 rather than an
/// integer. Two tiles touch when they share a row and their columns differ by
/// 1, or sit in neighbouring rows with columns 0.5 apart.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HexPosition {
    pub col: f64,
    pub row: f64,
}

impl HexPosition {
    /// Create a new tile position
    pub const fn new(col: f64, row: f64) -> Self {
        Self { col, row }
    }

    /// Whether two positions name the same slot
    pub fn same_slot(&self, other: &HexPosition) -> bool {
        (self.col - other.col).abs() < 0.25 && (self.row - other.row).abs() < 0.25
    }
}

/// Which side of a directed edge a point lies on.
///
/// "Right" means the point is on the right-hand side when walking from
/// `edge.from` to `edge.to` in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OceanSide {
    Left,
    Right,
}

/// A side of a hexagon, stored as the two corner points it joins.
///
/// Equality between edges is order-independent and tolerance-aware; use
/// [`Edge::same_as`] rather than `==`, which compares the raw floats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: Point,
    pub to: Point,
}

impl Edge {
    /// Create a new edge from `from` to `to`
    pub const fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    /// Same edge walked the other way
    pub fn reversed(&self) -> Self {
        Self::new(self.to, self.from)
    }

    /// Whether both edges join the same two points, in either order
    pub fn same_as(&self, other: &Edge, epsilon: f64) -> bool {
        (points_equal(self.from, other.from, epsilon) && points_equal(self.to, other.to, epsilon))
            || (points_equal(self.from, other.to, epsilon)
                && points_equal(self.to, other.from, epsilon))
    }

    /// Whether `point` is one of the two endpoints
    pub fn touches(&self, point: Point, epsilon: f64) -> bool {
        points_equal(self.from, point, epsilon) || points_equal(self.to, point, epsilon)
    }

    /// Midpoint of the edge
    pub fn midpoint(&self) -> Point {
        Point::new((self.from.x + self.to.x) / 2.0, (self.from.y + self.to.y) / 2.0)
    }

    /// Direction vector from `from` to `to`
    pub fn direction(&self) -> Point {
        Point::new(self.to.x - self.from.x, self.to.y - self.from.y)
    }
}

/// Centre of the tile at `position` for hexes of circumradius `size`.
pub fn hex_center(position: HexPosition, size: f64) -> Point {
    Point::new(
        position.col * size * 3.0_f64.sqrt(),
        position.row * size * 1.5,
    )
}

/// The six corners of a hexagon centred on the origin.
///
/// Corner `i` sits at angle `i·60° − 90°`, so corner 0 points straight up and
/// the rest follow clockwise in screen space.
pub fn hex_vertices(size: f64) -> [Point; 6] {
    std::array::from_fn(|i| {
        let angle = PI / 3.0 * i as f64 - PI / 2.0;
        Point::new(size * angle.cos(), size * angle.sin())
    })
}

/// Edge `i` joins corner `i` to corner `(i + 1) % 6`.
pub fn hex_edges(vertices: &[Point; 6]) -> [Edge; 6] {
    std::array::from_fn(|i| Edge::new(vertices[i], vertices[(i + 1) % 6]))
}

/// Corners of the tile at `position`, in board coordinates
pub fn tile_vertices(position: HexPosition, size: f64) -> [Point; 6] {
    let center = hex_center(position, size);
    hex_vertices(size).map(|v| v.offset_by(center))
}

/// Sides of the tile at `position`, in board coordinates
pub fn tile_edges(position: HexPosition, size: f64) -> [Edge; 6] {
    hex_edges(&tile_vertices(position, size))
}

/// Which side of `edge` the point `ocean_center` lies on.
///
/// The edge direction is rotated 90° to a normal `(-dy, dx)`; a positive dot
/// product between that normal and the vector from the midpoint to the ocean
/// centre means the ocean is on the right. Returns `None` when the point lies
/// on the edge's line.
pub fn compute_ocean_side(edge: &Edge, ocean_center: Point) -> Option<OceanSide> {
    let d = edge.direction();
    let normal = Point::new(-d.y, d.x);
    let mid = edge.midpoint();
    let dot = normal.x * (ocean_center.x - mid.x) + normal.y * (ocean_center.y - mid.y);

    if dot > 0.0 {
        Some(OceanSide::Right)
    } else if dot < 0.0 {
        Some(OceanSide::Left)
    } else {
        None
    }
}

/// Grid bucket for a point, with cells `cell` wide.
///
/// Two points within `cell` of each other always fall in the same or
/// neighbouring buckets, so a lookup checks [`PointKey::neighborhood`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointKey {
    pub x: i64,
    pub y: i64,
}

impl PointKey {
    /// Bucket holding `point`
    pub fn of(point: Point, cell: f64) -> Self {
        Self {
            x: (point.x / cell).floor() as i64,
            y: (point.y / cell).floor() as i64,
        }
    }

    /// This bucket and its eight neighbours
    pub fn neighborhood(&self) -> [PointKey; 9] {
        std::array::from_fn(|i| PointKey {
            x: self.x.saturating_sub(1).saturating_add((i % 3) as i64),
            y: self.y.saturating_sub(1).saturating_add((i / 3) as i64),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_center() {
        let c = hex_center(HexPosition::new(2.0, 1.0), 10.0);
        assert!((c.x - 20.0 * 3.0_f64.sqrt()).abs() < 1e-9);
        assert!((c.y - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_first_vertex_points_up() {
        let vertices = hex_vertices(50.0);
        assert!(points_equal(vertices[0], Point::new(0.0, -50.0), DEFAULT_EPSILON));
        for v in &vertices {
            assert!((v.distance_to(&Point::default()) - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_edges_wrap_around() {
        let vertices = hex_vertices(1.0);
        let edges = hex_edges(&vertices);
        assert_eq!(edges[5].from, vertices[5]);
        assert_eq!(edges[5].to, vertices[0]);
    }

    #[test]
    fn test_neighbouring_tiles_share_corners() {
        // Same row, columns one apart: the east side of one is the west side of the other
        let a = tile_vertices(HexPosition::new(0.0, 0.0), 50.0);
        let b = tile_vertices(HexPosition::new(1.0, 0.0), 50.0);
        let shared = a
            .iter()
            .filter(|p| b.iter().any(|q| points_equal(**p, *q, DEFAULT_EPSILON)))
            .count();
        assert_eq!(shared, 2);

        // Neighbouring rows, half a column apart
        let c = tile_vertices(HexPosition::new(0.5, 1.0), 50.0);
        let shared = a
            .iter()
            .filter(|p| c.iter().any(|q| points_equal(**p, *q, DEFAULT_EPSILON)))
            .count();
        assert_eq!(shared, 2);
    }

    #[test]
    fn test_edge_equality_ignores_direction() {
        let e = Edge::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0));
        let drifted = Edge::new(Point::new(1.0002, 0.9999), Point::new(0.0001, 0.0));
        assert!(e.same_as(&drifted, DEFAULT_EPSILON));
        assert!(e.same_as(&e.reversed(), DEFAULT_EPSILON));
        assert!(!e.same_as(&Edge::new(Point::new(0.0, 0.0), Point::new(1.0, 2.0)), DEFAULT_EPSILON));
    }

    #[test]
    fn test_ocean_side() {
        // Walking east in screen space, "down" (+y) is on the right
        let edge = Edge::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert_eq!(compute_ocean_side(&edge, Point::new(5.0, 8.0)), Some(OceanSide::Right));
        assert_eq!(compute_ocean_side(&edge, Point::new(5.0, -8.0)), Some(OceanSide::Left));
        assert_eq!(
            compute_ocean_side(&edge.reversed(), Point::new(5.0, 8.0)),
            Some(OceanSide::Left)
        );
        assert_eq!(compute_ocean_side(&edge, Point::new(20.0, 0.0)), None);
    }

    #[test]
    fn test_point_key_neighborhood_covers_boundary() {
        let cell = DEFAULT_EPSILON;
        let a = Point::new(10.0 - cell * 0.1, 3.0);
        let b = Point::new(10.0 + cell * 0.1, 3.0);
        let key_a = PointKey::of(a, cell);
        assert!(key_a.neighborhood().contains(&PointKey::of(b, cell)));
    }

    #[test]
    fn test_point_key_saturates_at_extremes() {
        let far = PointKey::of(Point::new(1.0, -1.0), 1e-300);
        assert_eq!(far, PointKey { x: i64::MAX, y: i64::MIN });
        let around = far.neighborhood();
        assert!(around.contains(&far));
        assert_eq!(PointKey::of(Point::new(f64::NAN, 0.0), 1.0).x, 0);
    }

    #[test]
    fn test_usable_epsilon() {
        assert_eq!(usable_epsilon(0.01), 0.01);
        assert_eq!(usable_epsilon(0.0), DEFAULT_EPSILON);
        assert_eq!(usable_epsilon(-1.0), DEFAULT_EPSILON);
        assert_eq!(usable_epsilon(f64::NAN), DEFAULT_EPSILON);
        assert_eq!(usable_epsilon(f64::INFINITY), DEFAULT_EPSILON);
    }
}
