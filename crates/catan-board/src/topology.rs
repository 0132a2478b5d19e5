//! Board topology: the vertex/edge graph derived from a tile list.
//!
//! Each tile contributes six corners and six sides. Corners that several
//! tiles share are merged into one vertex using tolerance-based equality, and
//! sides are then identified by their two (merged) endpoints. From that the
//! builder records which tiles touch each vertex and edge, which vertices are
//! one edge apart, and which edges can host a harbor.
//!
//! A topology is never persisted or patched; rebuild it from the current
//! tiles whenever they change.

use crate::board::{HexTile, TileKind};
use crate::geometry::{
    compute_ocean_side, hex_center, hex_vertices, points_equal, usable_epsilon, Edge, OceanSide,
    Point, PointKey, DEFAULT_EPSILON, DEFAULT_HEX_SIZE,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Index into [`Topology::vertices`]
pub type VertexId = usize;
/// Index into [`Topology::edges`]
pub type EdgeId = usize;
/// Index into [`Topology::tiles`] (same order as the input tiles)
pub type TileIndex = usize;

/// Parameters for building a topology
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopologyConfig {
    /// Hex circumradius in board units
    pub hex_size: f64,
    /// Distance under which two corners are merged; unusable values fall back
    /// to [`DEFAULT_EPSILON`]
    pub epsilon: f64,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            hex_size: DEFAULT_HEX_SIZE,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl TopologyConfig {
    /// Default tolerance with the given hex size
    pub fn with_size(hex_size: f64) -> Self {
        Self {
            hex_size,
            ..Self::default()
        }
    }
}

/// A tile placed in the topology
#[derive(Debug, Clone)]
pub struct TileNode {
    pub tile_id: String,
    pub kind: TileKind,
    pub center: Point,
    /// Corner ids in hexagon order (corner 0 at the top, then clockwise)
    pub vertices: [VertexId; 6],
    /// Side `i` joins `vertices[i]` and `vertices[(i + 1) % 6]`
    pub edges: [EdgeId; 6],
}

/// A merged corner
#[derive(Debug, Clone)]
pub struct VertexNode {
    pub point: Point,
    /// Tiles having this corner
    pub tiles: Vec<TileIndex>,
    /// Vertices one edge away
    pub adjacent: Vec<VertexId>,
    /// Edges ending here
    pub edges: Vec<EdgeId>,
}

/// A merged side
#[derive(Debug, Clone)]
pub struct EdgeNode {
    pub endpoints: [VertexId; 2],
    /// Tiles having this side (one on the board border, two inside)
    pub tiles: Vec<TileIndex>,
}

/// An edge where a harbor may be placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarborSite {
    pub edge: EdgeId,
    pub ocean_tile: TileIndex,
    pub land_tile: TileIndex,
    /// Side of the edge the ocean tile is on, walking from `endpoints[0]` to `endpoints[1]`
    pub ocean_side: OceanSide,
}

/// The derived vertex/edge graph of a board
#[derive(Debug, Clone)]
pub struct Topology {
    config: TopologyConfig,
    tiles: Vec<TileNode>,
    vertices: Vec<VertexNode>,
    edges: Vec<EdgeNode>,
    /// Spatial hash for corner lookup
    buckets: HashMap<PointKey, Vec<VertexId>>,
    /// Edge lookup by ordered endpoint pair
    edge_index: HashMap<(VertexId, VertexId), EdgeId>,
}

/// Build the topology of `tiles` for hexes of circumradius `size`
pub fn compute_topology(tiles: &[HexTile], size: f64) -> Topology {
    Topology::from_tiles(tiles, size)
}

impl Topology {
    /// Build with the default tolerance
    pub fn from_tiles(tiles: &[HexTile], hex_size: f64) -> Self {
        Self::build(tiles, TopologyConfig::with_size(hex_size))
    }

    /// Build the topology of `tiles`
    pub fn build(tiles: &[HexTile], config: TopologyConfig) -> Self {
        let config = TopologyConfig {
            epsilon: usable_epsilon(config.epsilon),
            ..config
        };
        let mut topology = Self {
            config,
            tiles: Vec::with_capacity(tiles.len()),
            vertices: Vec::new(),
            edges: Vec::new(),
            buckets: HashMap::new(),
            edge_index: HashMap::new(),
        };
        let corners = hex_vertices(config.hex_size);

        for (index, tile) in tiles.iter().enumerate() {
            let center = hex_center(tile.position, config.hex_size);
            let vertex_ids = corners.map(|corner| topology.intern_vertex(corner.offset_by(center)));

            for &v in &vertex_ids {
                let incident = &mut topology.vertices[v].tiles;
                if !incident.contains(&index) {
                    incident.push(index);
                }
            }

            let mut edge_ids = [0; 6];
            for i in 0..6 {
                let e = topology.intern_edge(vertex_ids[i], vertex_ids[(i + 1) % 6]);
                let incident = &mut topology.edges[e].tiles;
                if !incident.contains(&index) {
                    incident.push(index);
                }
                edge_ids[i] = e;
            }

            topology.tiles.push(TileNode {
                tile_id: tile.id.clone(),
                kind: tile.kind,
                center,
                vertices: vertex_ids,
                edges: edge_ids,
            });
        }

        debug!(
            tiles = topology.tiles.len(),
            vertices = topology.vertices.len(),
            edges = topology.edges.len(),
            "built board topology"
        );
        topology
    }

    /// Find the vertex at `point` or create it
    fn intern_vertex(&mut self, point: Point) -> VertexId {
        if let Some(id) = self.vertex_at(point) {
            return id;
        }
        let id = self.vertices.len();
        self.vertices.push(VertexNode {
            point,
            tiles: Vec::new(),
            adjacent: Vec::new(),
            edges: Vec::new(),
        });
        self.buckets
            .entry(PointKey::of(point, self.config.epsilon))
            .or_default()
            .push(id);
        id
    }

    /// Find the edge joining `a` and `b` or create it, linking the endpoints
    fn intern_edge(&mut self, a: VertexId, b: VertexId) -> EdgeId {
        let key = (a.min(b), a.max(b));
        if let Some(&id) = self.edge_index.get(&key) {
            return id;
        }
        let id = self.edges.len();
        self.edges.push(EdgeNode {
            endpoints: [a, b],
            tiles: Vec::new(),
        });
        self.edge_index.insert(key, id);

        self.vertices[a].adjacent.push(b);
        self.vertices[b].adjacent.push(a);
        self.vertices[a].edges.push(id);
        self.vertices[b].edges.push(id);
        id
    }

    // ==================== Accessors ====================

    pub fn tiles(&self) -> &[TileNode] {
        &self.tiles
    }

    pub fn vertices(&self) -> &[VertexNode] {
        &self.vertices
    }

    pub fn edges(&self) -> &[EdgeNode] {
        &self.edges
    }

    /// Coordinates of a vertex
    pub fn point(&self, vertex: VertexId) -> Option<Point> {
        self.vertices.get(vertex).map(|v| v.point)
    }

    /// Geometry of an edge, directed from `endpoints[0]` to `endpoints[1]`
    pub fn edge_geometry(&self, edge: EdgeId) -> Option<Edge> {
        let node = self.edges.get(edge)?;
        Some(Edge::new(
            self.vertices[node.endpoints[0]].point,
            self.vertices[node.endpoints[1]].point,
        ))
    }

    // ==================== Lookups ====================

    /// The vertex within tolerance of `point`, if any
    pub fn vertex_at(&self, point: Point) -> Option<VertexId> {
        let key = PointKey::of(point, self.config.epsilon);
        key.neighborhood()
            .iter()
            .filter_map(|k| self.buckets.get(k))
            .flatten()
            .copied()
            .find(|&id| points_equal(self.vertices[id].point, point, self.config.epsilon))
    }

    /// The edge joining two vertices, if they are adjacent
    pub fn edge_between(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.edge_index.get(&(a.min(b), a.max(b))).copied()
    }

    /// The edge matching `edge` in either direction, if any
    pub fn edge_at(&self, edge: &Edge) -> Option<EdgeId> {
        let a = self.vertex_at(edge.from)?;
        let b = self.vertex_at(edge.to)?;
        self.edge_between(a, b)
    }

    /// Tiles touching a vertex (empty for an unknown id)
    pub fn vertex_tiles(&self, vertex: VertexId) -> &[TileIndex] {
        self.vertices.get(vertex).map(|v| v.tiles.as_slice()).unwrap_or_default()
    }

    /// Vertices one edge away (empty for an unknown id)
    pub fn adjacent_vertices(&self, vertex: VertexId) -> &[VertexId] {
        self.vertices.get(vertex).map(|v| v.adjacent.as_slice()).unwrap_or_default()
    }

    /// Edges ending at a vertex (empty for an unknown id)
    pub fn vertex_edges(&self, vertex: VertexId) -> &[EdgeId] {
        self.vertices.get(vertex).map(|v| v.edges.as_slice()).unwrap_or_default()
    }

    /// Tiles sharing an edge (empty for an unknown id)
    pub fn edge_tiles(&self, edge: EdgeId) -> &[TileIndex] {
        self.edges.get(edge).map(|e| e.tiles.as_slice()).unwrap_or_default()
    }

    /// Tiles sharing a side with `tile`
    pub fn neighbor_tiles(&self, tile: TileIndex) -> Vec<TileIndex> {
        let Some(node) = self.tiles.get(tile) else {
            return Vec::new();
        };
        let mut neighbors: Vec<TileIndex> = node
            .edges
            .iter()
            .flat_map(|&e| self.edges[e].tiles.iter().copied())
            .filter(|&t| t != tile)
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    // ==================== Classification ====================

    /// Whether a vertex touches at least one non-ocean tile
    pub fn is_land_vertex(&self, vertex: VertexId) -> bool {
        self.vertex_tiles(vertex)
            .iter()
            .any(|&t| self.tiles[t].kind.is_land())
    }

    /// The harbor site on `edge`, if it borders exactly one ocean tile and one land tile
    pub fn harbor_site(&self, edge: EdgeId) -> Option<HarborSite> {
        let (ocean_tile, land_tile) = match *self.edge_tiles(edge) {
            [a, b] => match (self.tiles[a].kind.is_ocean(), self.tiles[b].kind.is_ocean()) {
                (true, false) => (a, b),
                (false, true) => (b, a),
                _ => return None,
            },
            _ => return None,
        };
        let geometry = self.edge_geometry(edge)?;
        let ocean_side = compute_ocean_side(&geometry, self.tiles[ocean_tile].center)?;
        Some(HarborSite {
            edge,
            ocean_tile,
            land_tile,
            ocean_side,
        })
    }

    /// Every edge that can host a harbor
    pub fn harbor_sites(&self) -> Vec<HarborSite> {
        (0..self.edges.len())
            .filter_map(|e| self.harbor_site(e))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::HexPosition;

    fn land(id: &str, col: f64, row: f64) -> HexTile {
        HexTile::new_resource(id, TileKind::Wheat, 8, HexPosition::new(col, row))
    }

    fn ocean(id: &str, col: f64, row: f64) -> HexTile {
        HexTile::ocean(id, HexPosition::new(col, row))
    }

    #[test]
    fn test_single_hex() {
        let topology = compute_topology(&[land("a", 0.0, 0.0)], 50.0);
        assert_eq!(topology.vertices().len(), 6);
        assert_eq!(topology.edges().len(), 6);
        for v in 0..6 {
            assert_eq!(topology.adjacent_vertices(v).len(), 2);
            assert_eq!(topology.vertex_tiles(v), &[0]);
        }
    }

    #[test]
    fn test_two_adjacent_hexes_share_two_vertices() {
        let topology = compute_topology(&[land("a", 0.0, 0.0), land("b", 1.0, 0.0)], 50.0);
        assert_eq!(topology.vertices().len(), 10);
        assert_eq!(topology.edges().len(), 11);

        let shared: Vec<_> = (0..topology.vertices().len())
            .filter(|&v| topology.vertex_tiles(v).len() == 2)
            .collect();
        assert_eq!(shared.len(), 2);
    }

    #[test]
    fn test_three_hexes_meet_in_one_vertex() {
        let tiles = [land("a", 0.0, 0.0), land("b", 1.0, 0.0), land("c", 0.5, 1.0)];
        let topology = compute_topology(&tiles, 50.0);

        assert_eq!(topology.vertices().len(), 13);
        let triple: Vec<_> = (0..topology.vertices().len())
            .filter(|&v| topology.vertex_tiles(v).len() == 3)
            .collect();
        assert_eq!(triple.len(), 1);
        assert_eq!(topology.adjacent_vertices(triple[0]).len(), 3);
    }

    #[test]
    fn test_adjacency_is_symmetric() {
        let tiles = [land("a", 0.0, 0.0), land("b", 1.0, 0.0), land("c", 0.5, 1.0)];
        let topology = compute_topology(&tiles, 50.0);
        for (a, node) in topology.vertices().iter().enumerate() {
            for &b in &node.adjacent {
                assert!(topology.adjacent_vertices(b).contains(&a));
            }
        }
    }

    #[test]
    fn test_lookup_tolerates_drift() {
        let topology = compute_topology(&[land("a", 0.0, 0.0)], 50.0);
        let p = topology.point(0).unwrap();
        let drifted = Point::new(p.x + 0.0004, p.y - 0.0004);
        assert_eq!(topology.vertex_at(drifted), Some(0));
        assert_eq!(topology.vertex_at(Point::new(1000.0, 1000.0)), None);

        let edge = topology.edge_geometry(3).unwrap();
        assert_eq!(topology.edge_at(&edge.reversed()), Some(3));
    }

    #[test]
    fn test_unusable_tolerance_falls_back_to_default() {
        let tiles = [land("a", 0.0, 0.0), land("b", 1.0, 0.0), land("c", 0.5, 1.0)];
        for epsilon in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let topology = Topology::build(&tiles, TopologyConfig { hex_size: 50.0, epsilon });
            assert_eq!(topology.vertices().len(), 13, "epsilon {epsilon}");
            assert_eq!(topology.vertex_at(topology.point(0).unwrap()), Some(0));
        }

        // Absurdly small but valid: nothing merges, nothing panics
        let topology = Topology::build(&tiles, TopologyConfig { hex_size: 50.0, epsilon: 1e-300 });
        assert!(topology.vertices().len() >= 13);
    }

    #[test]
    fn test_unknown_ids_are_empty() {
        let topology = compute_topology(&[land("a", 0.0, 0.0)], 50.0);
        assert!(topology.vertex_tiles(99).is_empty());
        assert!(topology.adjacent_vertices(99).is_empty());
        assert!(topology.edge_tiles(99).is_empty());
        assert!(topology.harbor_site(99).is_none());
        assert!(topology.neighbor_tiles(99).is_empty());
    }

    #[test]
    fn test_harbor_site_needs_one_ocean_and_one_land() {
        let tiles = [
            land("a", 0.0, 0.0),
            ocean("o", 1.0, 0.0),
            ocean("p", 0.5, 1.0),
            land("b", -1.0, 0.0),
        ];
        let topology = compute_topology(&tiles, 50.0);
        let sites = topology.harbor_sites();

        // a-o and a-p qualify; o-p is all water; a-b is all land; border edges touch one tile
        assert_eq!(sites.len(), 2);
        for site in &sites {
            assert_eq!(site.land_tile, 0);
            assert!(site.ocean_tile == 1 || site.ocean_tile == 2);
        }

        let between = |x: usize, y: usize| {
            topology.tiles()[x]
                .edges
                .iter()
                .copied()
                .find(|e| topology.tiles()[y].edges.contains(e))
                .unwrap()
        };
        assert!(topology.harbor_site(between(1, 2)).is_none());
        assert!(topology.harbor_site(between(0, 3)).is_none());
    }

    #[test]
    fn test_ocean_side_points_at_the_water() {
        let tiles = [land("a", 0.0, 0.0), ocean("o", 1.0, 0.0)];
        let topology = compute_topology(&tiles, 50.0);
        let site = topology.harbor_sites()[0];

        let edge = topology.edge_geometry(site.edge).unwrap();
        let ocean_center = topology.tiles()[site.ocean_tile].center;
        assert_eq!(compute_ocean_side(&edge, ocean_center), Some(site.ocean_side));
        assert_eq!(topology.harbor_site(site.edge), Some(site));

        let land_center = topology.tiles()[site.land_tile].center;
        assert_ne!(compute_ocean_side(&edge, land_center), Some(site.ocean_side));
    }

    #[test]
    fn test_neighbor_tiles() {
        let tiles = [land("a", 0.0, 0.0), land("b", 1.0, 0.0), land("c", 3.0, 0.0)];
        let topology = compute_topology(&tiles, 50.0);
        assert_eq!(topology.neighbor_tiles(0), vec![1]);
        assert!(topology.neighbor_tiles(2).is_empty());
    }
}
