//! Saved board snapshots with versioning.
//!
//! Current snapshots are an envelope `{ "version": 2, "board": { .. } }`.
//!
//! Anything without a `version` is read as version 1: the board file exported
//! by the browser tracker. That format is camelCase (`hexTiles`, `playerId`,
//! `robberPosition`), names kinds `type`, stores tile slots as `{ x, y }` and
//! roads under `position`. Its harbors may lack an `edge` (template harbors
//! only carry a display position) or `oceanSide`, and may have type `none`.
//! Loading converts all of it, recomputes every harbor's ocean side from the
//! topology and drops harbors that cannot sit on the board.

use crate::board::{
    BoardError, BoardSetup, Building, BuildingKind, Harbor, HarborTrade, HexTile, Road, TileKind,
};
use crate::geometry::{compute_ocean_side, Edge, HexPosition, OceanSide, Point};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Version written by [`save_board`]
pub const CURRENT_VERSION: u64 = 2;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Invalid board JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported snapshot version {0}")]
    UnsupportedVersion(u64),

    #[error("Invalid board: {0}")]
    Board(#[from] BoardError),
}

/// Versioned snapshot envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedBoard {
    pub version: u64,
    pub board: BoardSetup,
}

/// `{ x, y }` pair used by version 1 for tile slots
#[derive(Debug, Deserialize)]
struct LegacySlot {
    x: f64,
    y: f64,
}

impl From<LegacySlot> for HexPosition {
    fn from(slot: LegacySlot) -> Self {
        HexPosition::new(slot.x, slot.y)
    }
}

#[derive(Debug, Deserialize)]
struct LegacyTile {
    id: String,
    #[serde(rename = "type")]
    kind: TileKind,
    #[serde(default)]
    number: Option<u8>,
    position: LegacySlot,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyHarbor {
    #[serde(rename = "type")]
    trade: String,
    #[serde(default)]
    edge: Option<Edge>,
    #[serde(default)]
    ocean_side: Option<OceanSide>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyBuilding {
    #[serde(rename = "type")]
    kind: BuildingKind,
    position: Point,
    player_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyRoad {
    position: Edge,
    player_id: String,
}

/// Version 1 board record
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyBoard {
    hex_tiles: Vec<LegacyTile>,
    #[serde(default)]
    harbors: Vec<LegacyHarbor>,
    #[serde(default)]
    robber_position: Option<LegacySlot>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    is_template: bool,
    #[serde(default)]
    buildings: Vec<LegacyBuilding>,
    #[serde(default)]
    roads: Vec<LegacyRoad>,
}

/// Serialize a board as a current-version snapshot
pub fn save_board(board: &BoardSetup) -> Result<String, SaveError> {
    let envelope = SavedBoard {
        version: CURRENT_VERSION,
        board: board.clone(),
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Load a snapshot of any supported version.
///
/// `hex_size` is only used to place version 1 harbors, whose edges are in
/// the pixel space of the board they were drawn on. The loaded board's tiles
/// are checked with [`BoardSetup::validate`].
pub fn load_board(json: &str, hex_size: f64) -> Result<BoardSetup, SaveError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let version = value
        .get("version")
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(1);

    let board = match version {
        1 => migrate_v1(serde_json::from_value(value)?, hex_size),
        CURRENT_VERSION => serde_json::from_value::<SavedBoard>(value)?.board,
        other => return Err(SaveError::UnsupportedVersion(other)),
    };
    board.validate()?;
    Ok(board)
}

/// Convert a version 1 board, recomputing harbor ocean sides
fn migrate_v1(legacy: LegacyBoard, hex_size: f64) -> BoardSetup {
    let mut board = BoardSetup {
        name: legacy.name,
        is_template: legacy.is_template,
        tiles: legacy
            .hex_tiles
            .into_iter()
            .map(|t| HexTile {
                id: t.id,
                kind: t.kind,
                number: t.number,
                position: t.position.into(),
            })
            .collect(),
        robber_position: legacy.robber_position.map(HexPosition::from),
        buildings: legacy
            .buildings
            .into_iter()
            .map(|b| Building {
                kind: b.kind,
                position: b.position,
                player: b.player_id,
            })
            .collect(),
        roads: legacy
            .roads
            .into_iter()
            .map(|r| Road {
                edge: r.position,
                player: r.player_id,
            })
            .collect(),
        ..BoardSetup::default()
    };

    let topology = board.topology(hex_size);
    board.harbors = legacy
        .harbors
        .into_iter()
        .filter_map(|h| {
            let trade = serde_json::Value::String(h.trade.clone());
            let Ok(trade) = serde_json::from_value::<HarborTrade>(trade) else {
                debug!(trade = %h.trade, "skipping harbor without a trade");
                return None;
            };
            let Some(edge) = h.edge else {
                warn!(?trade, "dropping harbor without an edge during migration");
                return None;
            };
            let site = topology.edge_at(&edge).and_then(|e| topology.harbor_site(e));
            let side = site.and_then(|s| {
                compute_ocean_side(&edge, topology.tiles()[s.ocean_tile].center)
            });
            let Some(ocean_side) = side else {
                warn!(?trade, "dropping harbor on invalid site during migration");
                return None;
            };
            if h.ocean_side.is_some_and(|stored| stored != ocean_side) {
                debug!(?trade, ?ocean_side, "correcting stored ocean side");
            }
            Some(Harbor {
                trade,
                edge,
                ocean_side,
            })
        })
        .collect();

    debug!(
        tiles = board.tiles.len(),
        harbors = board.harbors.len(),
        "migrated version 1 board"
    );
    board
}
