//! Board records: tiles, harbors, buildings and roads.
//!
//! This module contains:
//! - Tile kinds and the hex tile record
//! - Harbor trade types and placements
//! - Buildings (settlements, cities) and roads
//! - `BoardSetup`, the snapshot a host keeps in its store, with the mutation
//!   API used by play and editor modes
//!
//! Mutators never check placement legality; callers consult [`crate::rules`]
//! first when they want gameplay rules. Editor mode writes freely and the last
//! write to a site wins.

use crate::geometry::{
    compute_ocean_side, points_equal, usable_epsilon, Edge, HexPosition, OceanSide, Point,
    DEFAULT_EPSILON,
};
use crate::topology::{Topology, TopologyConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Player identifier, as assigned by the host application
pub type PlayerId = String;

/// What a hex tile is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileKind {
    Wood,
    Brick,
    Sheep,
    Wheat,
    Ore,
    Desert,
    Ocean,
}

impl TileKind {
    /// The five producing kinds
    pub const RESOURCES: [TileKind; 5] = [
        TileKind::Wood,
        TileKind::Brick,
        TileKind::Sheep,
        TileKind::Wheat,
        TileKind::Ore,
    ];

    pub fn is_ocean(&self) -> bool {
        matches!(self, TileKind::Ocean)
    }

    /// Anything that is not water, desert included
    pub fn is_land(&self) -> bool {
        !self.is_ocean()
    }

    /// Whether tiles of this kind carry a number token
    pub fn produces(&self) -> bool {
        !matches!(self, TileKind::Desert | TileKind::Ocean)
    }
}

/// A single hex tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HexTile {
    pub id: String,
    pub kind: TileKind,
    /// Dice number (2-12, never 7), absent for desert and ocean
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u8>,
    pub position: HexPosition,
}

impl HexTile {
    /// Create a producing tile
    pub fn new_resource(id: impl Into<String>, kind: TileKind, number: u8, position: HexPosition) -> Self {
        Self {
            id: id.into(),
            kind,
            number: Some(number),
            position,
        }
    }

    /// Create a desert tile
    pub fn desert(id: impl Into<String>, position: HexPosition) -> Self {
        Self {
            id: id.into(),
            kind: TileKind::Desert,
            number: None,
            position,
        }
    }

    /// Create an ocean tile
    pub fn ocean(id: impl Into<String>, position: HexPosition) -> Self {
        Self {
            id: id.into(),
            kind: TileKind::Ocean,
            number: None,
            position,
        }
    }
}

/// What a harbor trades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HarborTrade {
    Wood,
    Brick,
    Sheep,
    Wheat,
    Ore,
    /// 3:1 for any resource
    Any,
}

impl HarborTrade {
    /// The exchange rate for this harbor
    pub fn rate(&self) -> u32 {
        match self {
            HarborTrade::Any => 3,
            _ => 2,
        }
    }
}

/// A harbor sitting on a coastal edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Harbor {
    pub trade: HarborTrade,
    pub edge: Edge,
    /// Side of `edge` the water is on, walking from `edge.from` to `edge.to`
    pub ocean_side: OceanSide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingKind {
    Settlement,
    City,
}

impl BuildingKind {
    /// Victory points provided by this building
    pub fn victory_points(&self) -> u32 {
        match self {
            BuildingKind::Settlement => 1,
            BuildingKind::City => 2,
        }
    }
}

/// A settlement or city on a vertex
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub kind: BuildingKind,
    pub position: Point,
    pub player: PlayerId,
}

/// A road on an edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Road {
    pub edge: Edge,
    pub player: PlayerId,
}

/// Outcome of [`BoardSetup::toggle_harbor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarborToggle {
    /// A harbor was added with the water on this side
    Added(OceanSide),
    /// The harbor already on that edge was removed
    Removed,
    /// The edge does not separate exactly one ocean tile from one land tile
    InvalidSite,
}

/// Problems found in a board's tile list
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum BoardError {
    #[error("Duplicate tile id {0}")]
    DuplicateTileId(String),

    #[error("No tile with id {0}")]
    UnknownTile(String),

    #[error("Tile {0} produces resources but has no number")]
    MissingNumber(String),

    #[error("Tile {id} is {kind:?} and cannot carry a number")]
    UnexpectedNumber { id: String, kind: TileKind },

    #[error("Number {number} is not a valid token")]
    InvalidNumber { number: u8 },

    #[error("Expected exactly one desert, found {0}")]
    DesertCount(usize),
}

/// Check that `number` is a dice token (2-12 without 7)
fn check_number(number: u8) -> Result<(), BoardError> {
    if (2..=12).contains(&number) && number != 7 {
        Ok(())
    } else {
        Err(BoardError::InvalidNumber { number })
    }
}

/// A complete board snapshot
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoardSetup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub is_template: bool,
    pub tiles: Vec<HexTile>,
    #[serde(default)]
    pub harbors: Vec<Harbor>,
    #[serde(default)]
    pub robber_position: Option<HexPosition>,
    #[serde(default)]
    pub buildings: Vec<Building>,
    #[serde(default)]
    pub roads: Vec<Road>,
    /// Point matching tolerance for lookups, mutators and [`topology`](Self::topology).
    /// Not saved; `None` means [`DEFAULT_EPSILON`].
    #[serde(skip)]
    pub tolerance: Option<f64>,
}

impl BoardSetup {
    /// Create a board from tiles; the robber starts on the first desert
    pub fn new(tiles: Vec<HexTile>) -> Self {
        let robber_position = tiles
            .iter()
            .find(|t| t.kind == TileKind::Desert)
            .map(|t| t.position);
        Self {
            tiles,
            robber_position,
            ..Self::default()
        }
    }

    /// Use a custom point matching tolerance
    pub fn with_tolerance(mut self, epsilon: f64) -> Self {
        self.tolerance = Some(epsilon);
        self
    }

    /// The tolerance shared by lookups, mutators and the topology
    pub fn epsilon(&self) -> f64 {
        usable_epsilon(self.tolerance.unwrap_or(DEFAULT_EPSILON))
    }

    // ==================== Query Methods ====================

    /// Get the tile occupying a layout slot
    pub fn tile_at(&self, position: HexPosition) -> Option<&HexTile> {
        self.tiles.iter().find(|t| t.position.same_slot(&position))
    }

    /// All non-ocean tiles
    pub fn land_tiles(&self) -> impl Iterator<Item = &HexTile> {
        self.tiles.iter().filter(|t| t.kind.is_land())
    }

    /// Building at a vertex, if any
    pub fn building_at(&self, position: Point) -> Option<&Building> {
        self.buildings
            .iter()
            .find(|b| points_equal(b.position, position, self.epsilon()))
    }

    /// Road on an edge, if any
    pub fn road_at(&self, edge: &Edge) -> Option<&Road> {
        self.roads.iter().find(|r| r.edge.same_as(edge, self.epsilon()))
    }

    /// Harbor on an edge, if any
    pub fn harbor_at(&self, edge: &Edge) -> Option<&Harbor> {
        self.harbors.iter().find(|h| h.edge.same_as(edge, self.epsilon()))
    }

    /// Build the topology for the current tiles
    pub fn topology(&self, hex_size: f64) -> Topology {
        Topology::build(
            &self.tiles,
            TopologyConfig {
                hex_size,
                epsilon: self.epsilon(),
            },
        )
    }

    // ==================== Validation Methods ====================

    /// Check tile ids and number tokens.
    ///
    /// A number must be present exactly on producing tiles and must be a valid
    /// dice token.
    pub fn validate(&self) -> Result<(), BoardError> {
        let mut seen = HashSet::new();
        for tile in &self.tiles {
            if !seen.insert(tile.id.as_str()) {
                return Err(BoardError::DuplicateTileId(tile.id.clone()));
            }
            match (tile.kind.produces(), tile.number) {
                (true, Some(n)) => check_number(n)?,
                (true, None) => return Err(BoardError::MissingNumber(tile.id.clone())),
                (false, Some(_)) => {
                    return Err(BoardError::UnexpectedNumber {
                        id: tile.id.clone(),
                        kind: tile.kind,
                    })
                }
                (false, None) => {}
            }
        }
        Ok(())
    }

    /// [`validate`](Self::validate) plus the one-desert rule of a standard board
    pub fn validate_standard(&self) -> Result<(), BoardError> {
        self.validate()?;
        let deserts = self.tiles.iter().filter(|t| t.kind == TileKind::Desert).count();
        if deserts != 1 {
            return Err(BoardError::DesertCount(deserts));
        }
        Ok(())
    }

    // ==================== Mutation Methods ====================

    /// Put a building on a vertex, replacing whatever stood there
    pub fn place_building(&mut self, kind: BuildingKind, position: Point, player: impl Into<PlayerId>) {
        let player = player.into();
        if self.remove_building(position).is_some() {
            debug!(x = position.x, y = position.y, "replacing building");
        }
        self.buildings.push(Building { kind, position, player });
    }

    /// Put a road on an edge, replacing whatever road was there
    pub fn place_road(&mut self, edge: Edge, player: impl Into<PlayerId>) {
        let player = player.into();
        if self.remove_road(&edge).is_some() {
            debug!("replacing road");
        }
        self.roads.push(Road { edge, player });
    }

    /// Remove the building on a vertex and return it
    pub fn remove_building(&mut self, position: Point) -> Option<Building> {
        let idx = self
            .buildings
            .iter()
            .position(|b| points_equal(b.position, position, self.epsilon()))?;
        Some(self.buildings.remove(idx))
    }

    /// Remove the road on an edge (either direction) and return it
    pub fn remove_road(&mut self, edge: &Edge) -> Option<Road> {
        let idx = self
            .roads
            .iter()
            .position(|r| r.edge.same_as(edge, self.epsilon()))?;
        Some(self.roads.remove(idx))
    }

    /// Add or remove a harbor on `edge`.
    ///
    /// The edge must border exactly one ocean tile and one land tile of
    /// `topology`. An existing harbor there is removed; otherwise a harbor of
    /// `trade` is added with its ocean side computed from the ocean tile.
    pub fn toggle_harbor(&mut self, topology: &Topology, edge: &Edge, trade: HarborTrade) -> HarborToggle {
        let site = match topology.edge_at(edge).and_then(|id| topology.harbor_site(id)) {
            Some(site) => site,
            None => {
                debug!("rejected harbor on invalid site");
                return HarborToggle::InvalidSite;
            }
        };

        if let Some(idx) = self
            .harbors
            .iter()
            .position(|h| h.edge.same_as(edge, self.epsilon()))
        {
            self.harbors.remove(idx);
            debug!(edge = site.edge, "removed harbor");
            return HarborToggle::Removed;
        }

        // Side is taken relative to the caller's edge direction, which is the
        // direction stored on the harbor.
        let ocean_center = topology.tiles()[site.ocean_tile].center;
        let side = compute_ocean_side(edge, ocean_center).unwrap_or(site.ocean_side);
        self.harbors.push(Harbor {
            trade,
            edge: *edge,
            ocean_side: side,
        });
        debug!(edge = site.edge, ?trade, ?side, "added harbor");
        HarborToggle::Added(side)
    }

    /// Move the robber onto an existing tile. Returns `false` if no tile is there.
    pub fn move_robber(&mut self, position: HexPosition) -> bool {
        match self.tile_at(position) {
            Some(tile) => {
                self.robber_position = Some(tile.position);
                true
            }
            None => false,
        }
    }

    /// Editor: change a tile's kind together with its number token.
    ///
    /// Producing kinds need a valid number and desert/ocean take none, so the
    /// tile never passes through a state [`validate`](Self::validate) rejects.
    /// Nothing changes on error.
    pub fn set_tile_kind(&mut self, id: &str, kind: TileKind, number: Option<u8>) -> Result<(), BoardError> {
        let tile = self
            .tiles
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| BoardError::UnknownTile(id.to_string()))?;
        match (kind.produces(), number) {
            (true, Some(n)) => check_number(n)?,
            (true, None) => return Err(BoardError::MissingNumber(id.to_string())),
            (false, Some(_)) => {
                return Err(BoardError::UnexpectedNumber {
                    id: id.to_string(),
                    kind,
                })
            }
            (false, None) => {}
        }
        tile.kind = kind;
        tile.number = number;
        Ok(())
    }

    /// Editor: set the number token on a producing tile
    pub fn set_tile_number(&mut self, id: &str, number: u8) -> Result<(), BoardError> {
        check_number(number)?;
        let tile = self
            .tiles
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| BoardError::UnknownTile(id.to_string()))?;
        if !tile.kind.produces() {
            return Err(BoardError::UnexpectedNumber {
                id: tile.id.clone(),
                kind: tile.kind,
            });
        }
        tile.number = Some(number);
        Ok(())
    }
}
