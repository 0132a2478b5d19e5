//! Placement rules: where a player may legally build.
//!
//! Every function here is a pure predicate over a topology and the current
//! buildings and roads. They never fail; a query that cannot produce anything
//! returns an empty list. Buildings or roads that do not sit on the topology
//! (stale data from an older layout, say) are ignored when mapping occupancy,
//! but still count toward a player's building total.
//!
//! Results are topology ids in ascending order; use [`Topology::point`] and
//! [`Topology::edge_geometry`] to turn them back into coordinates.

use crate::board::{Building, BuildingKind, Road};
use crate::topology::{EdgeId, Topology, VertexId};
use std::collections::{HashMap, HashSet};

/// Buildings a player must own before new settlements need a road
const FREE_PLACEMENT_BUILDINGS: usize = 2;

/// Buildings and roads mapped onto topology ids
pub(crate) struct Occupancy<'a> {
    pub buildings: HashMap<VertexId, &'a Building>,
    pub roads: HashMap<EdgeId, &'a Road>,
}

impl<'a> Occupancy<'a> {
    pub fn new(topology: &Topology, buildings: &'a [Building], roads: &'a [Road]) -> Self {
        let buildings = buildings
            .iter()
            .filter_map(|b| topology.vertex_at(b.position).map(|v| (v, b)))
            .collect();
        let roads = roads
            .iter()
            .filter_map(|r| topology.edge_at(&r.edge).map(|e| (e, r)))
            .collect();
        Self { buildings, roads }
    }

    fn owner_at(&self, vertex: VertexId) -> Option<&str> {
        self.buildings.get(&vertex).map(|b| b.player.as_str())
    }

    /// Vertices that are an endpoint of one of `player`'s roads
    fn road_endpoints(&self, topology: &Topology, player: &str) -> HashSet<VertexId> {
        self.roads
            .iter()
            .filter(|(_, road)| road.player == player)
            .flat_map(|(&edge, _)| topology.edges()[edge].endpoints)
            .collect()
    }
}

/// Number of buildings `player` owns, on or off the topology
fn building_count(buildings: &[Building], player: &str) -> usize {
    buildings.iter().filter(|b| b.player == player).count()
}

/// Whether a vertex satisfies the distance rule (it and its neighbours are empty)
pub fn satisfies_distance_rule(topology: &Topology, buildings: &[Building], vertex: VertexId) -> bool {
    let occupied: HashSet<VertexId> = buildings
        .iter()
        .filter_map(|b| topology.vertex_at(b.position))
        .collect();
    vertex < topology.vertices().len()
        && !occupied.contains(&vertex)
        && topology
            .adjacent_vertices(vertex)
            .iter()
            .all(|adj| !occupied.contains(adj))
}

/// Vertices where `player` may put a new settlement.
///
/// A vertex qualifies when it and all its neighbours are empty, it touches a
/// non-ocean tile, and, once the player owns two or more buildings, it is an
/// endpoint of one of the player's roads.
pub fn legal_settlement_vertices(
    topology: &Topology,
    buildings: &[Building],
    roads: &[Road],
    player: &str,
) -> Vec<VertexId> {
    let occupancy = Occupancy::new(topology, buildings, roads);
    let needs_road = building_count(buildings, player) >= FREE_PLACEMENT_BUILDINGS;
    let endpoints = if needs_road {
        occupancy.road_endpoints(topology, player)
    } else {
        HashSet::new()
    };

    (0..topology.vertices().len())
        .filter(|&v| {
            occupancy.owner_at(v).is_none()
                && topology
                    .adjacent_vertices(v)
                    .iter()
                    .all(|adj| occupancy.owner_at(*adj).is_none())
                && topology.is_land_vertex(v)
                && (!needs_road || endpoints.contains(&v))
        })
        .collect()
}

/// Vertices holding one of `player`'s settlements, which may become cities
pub fn legal_city_vertices(topology: &Topology, buildings: &[Building], player: &str) -> Vec<VertexId> {
    let mut spots: Vec<VertexId> = buildings
        .iter()
        .filter(|b| b.player == player && b.kind == BuildingKind::Settlement)
        .filter_map(|b| topology.vertex_at(b.position))
        .collect();
    spots.sort_unstable();
    spots.dedup();
    spots
}

/// Edges where `player` may put a new road.
///
/// Nothing is legal before the player owns a building. Otherwise the edge
/// must be free and have an endpoint holding the player's building or
/// touching another of the player's roads. Edges between two ocean tiles
/// qualify too.
pub fn legal_road_edges(
    topology: &Topology,
    buildings: &[Building],
    roads: &[Road],
    player: &str,
) -> Vec<EdgeId> {
    if building_count(buildings, player) == 0 {
        return Vec::new();
    }
    let occupancy = Occupancy::new(topology, buildings, roads);
    let endpoints = occupancy.road_endpoints(topology, player);

    (0..topology.edges().len())
        .filter(|e| {
            !occupancy.roads.contains_key(e)
                && topology.edges()[*e].endpoints.iter().any(|v| {
                    occupancy.owner_at(*v) == Some(player) || endpoints.contains(v)
                })
        })
        .collect()
}
