//! Longest road, largest army and victory points.

use crate::board::{Building, PlayerId, Road};
use crate::rules::Occupancy;
use crate::topology::{EdgeId, Topology, VertexId};
use std::collections::HashSet;

/// Minimum road length for Longest Road
pub const MIN_LONGEST_ROAD: u32 = 5;

/// Minimum knights for Largest Army
pub const MIN_LARGEST_ARMY: u32 = 3;

/// Bonus points for each of Longest Road and Largest Army
const AWARD_POINTS: u32 = 2;

/// Length of `player`'s longest continuous road.
///
/// A road may not pass through a vertex holding another player's building.
pub fn longest_road(topology: &Topology, buildings: &[Building], roads: &[Road], player: &str) -> u32 {
    let occupancy = Occupancy::new(topology, buildings, roads);
    let own: HashSet<EdgeId> = occupancy
        .roads
        .iter()
        .filter(|(_, r)| r.player == player)
        .map(|(&e, _)| e)
        .collect();

    let blocked = |v: VertexId| {
        occupancy
            .buildings
            .get(&v)
            .is_some_and(|b| b.player != player)
    };

    let mut best = 0;
    for &start in &own {
        for &from in &topology.edges()[start].endpoints {
            let length = dfs_road_length(topology, &own, &blocked, start, from, &mut HashSet::new());
            best = best.max(length);
        }
    }
    best
}

/// DFS along `current`, entered from vertex `from`, returning the longest trail
fn dfs_road_length(
    topology: &Topology,
    own: &HashSet<EdgeId>,
    blocked: &impl Fn(VertexId) -> bool,
    current: EdgeId,
    from: VertexId,
    visited: &mut HashSet<EdgeId>,
) -> u32 {
    visited.insert(current);

    let [a, b] = topology.edges()[current].endpoints;
    let next = if a == from { b } else { a };

    let mut max_continuation = 0;
    if !blocked(next) {
        for &edge in topology.vertex_edges(next) {
            if own.contains(&edge) && !visited.contains(&edge) {
                let length = dfs_road_length(topology, own, blocked, edge, next, visited);
                max_continuation = max_continuation.max(length);
            }
        }
    }

    visited.remove(&current);
    1 + max_continuation
}

/// Who holds Largest Army given each player's played knights.
///
/// A player needs at least [`MIN_LARGEST_ARMY`] knights. The incumbent keeps
/// the card on a tie; a tie for the lead with no incumbent among the leaders
/// awards it to nobody.
pub fn largest_army(knights: &[(PlayerId, u32)], current_holder: Option<&str>) -> Option<PlayerId> {
    let top = knights.iter().map(|(_, k)| *k).max()?;
    if top < MIN_LARGEST_ARMY {
        return None;
    }

    let incumbent = current_holder.and_then(|h| knights.iter().find(|(p, _)| p == h));
    if let Some((holder, count)) = incumbent {
        if *count >= top {
            return Some(holder.clone());
        }
    }

    let mut leaders = knights.iter().filter(|(_, k)| *k == top);
    match (leaders.next(), leaders.next()) {
        (Some((player, _)), None) => Some(player.clone()),
        _ => None,
    }
}

/// Who holds Longest Road given each player's longest road.
///
/// Same policy as [`largest_army`] with a [`MIN_LONGEST_ROAD`] threshold.
pub fn longest_road_holder(lengths: &[(PlayerId, u32)], current_holder: Option<&str>) -> Option<PlayerId> {
    let top = lengths.iter().map(|(_, l)| *l).max()?;
    if top < MIN_LONGEST_ROAD {
        return None;
    }
    if let Some(holder) = current_holder {
        if lengths.iter().any(|(p, l)| p == holder && *l >= top) {
            return Some(holder.to_string());
        }
    }
    let mut leaders = lengths.iter().filter(|(_, l)| *l == top);
    match (leaders.next(), leaders.next()) {
        (Some((player, _)), None) => Some(player.clone()),
        _ => None,
    }
}

/// Victory points for `player`: buildings, point cards and awards
pub fn victory_points(
    buildings: &[Building],
    player: &str,
    point_cards: u32,
    has_longest_road: bool,
    has_largest_army: bool,
) -> u32 {
    let from_buildings: u32 = buildings
        .iter()
        .filter(|b| b.player == player)
        .map(|b| b.kind.victory_points())
        .sum();
    let awards = AWARD_POINTS * (has_longest_road as u32 + has_largest_army as u32);
    from_buildings + point_cards + awards
}
