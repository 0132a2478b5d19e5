//! Board templates and editor randomization.
//!
//! Templates produce the initial tile list for a game type. Layouts are given
//! as row widths; rows are centred against the widest one, so a row one tile
//! narrower than its neighbour is shifted half a column.

use crate::board::{BoardSetup, HexTile, TileKind};
use crate::geometry::HexPosition;
use crate::topology::Topology;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Number tokens of the base game (one 2 and 12, two of everything else but 7)
pub const STANDARD_NUMBER_TOKENS: [u8; 18] = [2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

/// Land kinds of the base game: 4 wood, 3 brick, 4 sheep, 4 wheat, 3 ore
const STANDARD_RESOURCE_TILES: [TileKind; 18] = [
    TileKind::Wood,
    TileKind::Wood,
    TileKind::Wood,
    TileKind::Wood,
    TileKind::Brick,
    TileKind::Brick,
    TileKind::Brick,
    TileKind::Sheep,
    TileKind::Sheep,
    TileKind::Sheep,
    TileKind::Sheep,
    TileKind::Wheat,
    TileKind::Wheat,
    TileKind::Wheat,
    TileKind::Wheat,
    TileKind::Ore,
    TileKind::Ore,
    TileKind::Ore,
];

/// Hex size used to work out tile neighbours; any positive size gives the same graph
const NEIGHBOR_HEX_SIZE: f64 = 1.0;

/// Game variants with a preset layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Standard,
    Seafarers,
    Cities,
    Traders,
    America,
}

impl GameType {
    pub const ALL: [GameType; 5] = [
        GameType::Standard,
        GameType::Seafarers,
        GameType::Cities,
        GameType::Traders,
        GameType::America,
    ];

    /// Tiles per row, top to bottom
    pub fn layout(&self) -> &'static [usize] {
        match self {
            GameType::Seafarers => &[5, 6, 7, 8, 9, 8, 7, 6, 5],
            GameType::America => &[3, 4, 5, 6, 5, 4, 3],
            GameType::Standard | GameType::Cities | GameType::Traders => &[4, 5, 6, 7, 6, 5, 4],
        }
    }

    /// Tile indices (row-major) that are ocean
    pub fn ocean_indices(&self) -> &'static [usize] {
        match self {
            GameType::Seafarers => &[
                0, 1, 2, 3, 4, 5, 11, 12, 18, 19, 26, 27, 34, 35, 41, 42, 43, 44, 45, 46, 47,
            ],
            GameType::America => &[0, 1, 2, 3, 7, 8, 12, 13, 18, 19, 23, 24, 25, 26, 27],
            GameType::Standard | GameType::Cities | GameType::Traders => &[
                0, 1, 2, 3, 4, 8, 9, 14, 15, 21, 22, 27, 28, 32, 33, 34, 35, 36,
            ],
        }
    }
}

/// Positions for a layout, row-major, each row centred against the widest
pub fn layout_positions(rows: &[usize]) -> Vec<HexPosition> {
    let widest = rows.iter().copied().max().unwrap_or(0);
    rows.iter()
        .enumerate()
        .flat_map(|(row, &width)| {
            let offset = (widest - width) as f64 / 2.0;
            (0..width).map(move |col| HexPosition::new(col as f64 + offset, row as f64))
        })
        .collect()
}

/// The preset board for a game type.
///
/// Ocean tiles go where the game type lists them, the middle tile is the
/// desert, and the rest cycle through the resources and number tokens.
pub fn default_board(game_type: GameType) -> BoardSetup {
    let positions = layout_positions(game_type.layout());
    let oceans = game_type.ocean_indices();
    let desert = positions.len() / 2;

    let tiles = positions
        .into_iter()
        .enumerate()
        .map(|(i, position)| {
            let id = format!("hex-{i}");
            if oceans.contains(&i) {
                HexTile::ocean(id, position)
            } else if i == desert {
                HexTile::desert(id, position)
            } else {
                let kind = TileKind::RESOURCES[i % TileKind::RESOURCES.len()];
                let number = STANDARD_NUMBER_TOKENS[i % STANDARD_NUMBER_TOKENS.len()];
                HexTile::new_resource(id, kind, number, position)
            }
        })
        .collect();

    let mut board = BoardSetup::new(tiles);
    board.is_template = true;
    board
}

/// The 19-tile beginner layout (rows of 3, 4, 5, 4, 3) without surrounding water
pub fn standard_board() -> BoardSetup {
    use TileKind::*;
    let layout: [(TileKind, Option<u8>); 19] = [
        (Ore, Some(10)),
        (Sheep, Some(2)),
        (Wood, Some(9)),
        (Wheat, Some(12)),
        (Brick, Some(6)),
        (Sheep, Some(4)),
        (Brick, Some(10)),
        (Wheat, Some(9)),
        (Wood, Some(11)),
        (Desert, None),
        (Wood, Some(3)),
        (Ore, Some(8)),
        (Wood, Some(8)),
        (Ore, Some(3)),
        (Wheat, Some(4)),
        (Sheep, Some(5)),
        (Brick, Some(5)),
        (Wheat, Some(6)),
        (Sheep, Some(11)),
    ];

    let tiles = layout_positions(&[3, 4, 5, 4, 3])
        .into_iter()
        .zip(layout)
        .enumerate()
        .map(|(i, (position, (kind, number)))| HexTile {
            id: format!("hex-{i}"),
            kind,
            number,
            position,
        })
        .collect();

    let mut board = BoardSetup::new(tiles);
    board.name = Some("Standard Catan".to_string());
    board.is_template = true;
    board
}

/// Reshuffle land kinds and number tokens in place.
///
/// Ocean tiles are left alone. One land tile becomes the desert and the robber
/// moves there; the others draw from the base-game distribution, repeated as
/// needed for larger boards. Numbers are reshuffled until no 6 and 8 share a
/// side, giving up after a fixed number of attempts.
pub fn randomize_tiles<R: Rng>(board: &mut BoardSetup, rng: &mut R) {
    let land: Vec<usize> = board
        .tiles
        .iter()
        .enumerate()
        .filter(|(_, t)| t.kind.is_land())
        .map(|(i, _)| i)
        .collect();
    if land.is_empty() {
        return;
    }

    let mut kinds: Vec<TileKind> = std::iter::once(TileKind::Desert)
        .chain(STANDARD_RESOURCE_TILES.iter().copied().cycle().take(land.len() - 1))
        .collect();
    kinds.shuffle(rng);

    for (&tile, &kind) in land.iter().zip(&kinds) {
        board.tiles[tile].kind = kind;
        board.tiles[tile].number = None;
    }

    let producing: Vec<usize> = land
        .iter()
        .copied()
        .filter(|&t| board.tiles[t].kind.produces())
        .collect();
    let numbers: Vec<u8> = STANDARD_NUMBER_TOKENS
        .iter()
        .copied()
        .cycle()
        .take(producing.len())
        .collect();

    let topology = Topology::from_tiles(&board.tiles, NEIGHBOR_HEX_SIZE);
    let assignment = assign_numbers_avoiding_adjacent_68(&topology, &producing, &numbers, rng);
    for (&tile, &number) in producing.iter().zip(&assignment) {
        board.tiles[tile].number = Some(number);
    }

    board.robber_position = board
        .tiles
        .iter()
        .find(|t| t.kind == TileKind::Desert)
        .map(|t| t.position);
    debug!(land = land.len(), "randomized board tiles");
}

/// Shuffle `numbers` for the `producing` tiles, retrying while a 6 and an 8 touch
fn assign_numbers_avoiding_adjacent_68<R: Rng>(
    topology: &Topology,
    producing: &[usize],
    numbers: &[u8],
    rng: &mut R,
) -> Vec<u8> {
    const MAX_ATTEMPTS: usize = 100;

    let mut shuffled = numbers.to_vec();
    for _ in 0..MAX_ATTEMPTS {
        shuffled.shuffle(rng);
        if is_valid_number_placement(topology, producing, &shuffled) {
            return shuffled;
        }
    }

    debug!("no 6/8-separated number placement found, keeping last shuffle");
    shuffled
}

/// Check that no two tiles with a 6 or 8 share a side
fn is_valid_number_placement(topology: &Topology, producing: &[usize], numbers: &[u8]) -> bool {
    let by_tile: HashMap<usize, u8> = producing.iter().copied().zip(numbers.iter().copied()).collect();
    let hot = |n: u8| n == 6 || n == 8;

    by_tile.iter().filter(|(_, &n)| hot(n)).all(|(&tile, _)| {
        topology
            .neighbor_tiles(tile)
            .iter()
            .all(|neighbor| !by_tile.get(neighbor).is_some_and(|&n| hot(n)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_boards_are_valid() {
        for game_type in GameType::ALL {
            let board = default_board(game_type);
            let expected: usize = game_type.layout().iter().sum();
            assert_eq!(board.tiles.len(), expected, "{game_type:?}");
            board.validate_standard().unwrap();
            assert!(board.robber_position.is_some());
        }
    }

    #[test]
    fn test_standard_default_has_ocean_ring() {
        let board = default_board(GameType::Standard);
        assert_eq!(board.land_tiles().count(), 19);
        assert_eq!(board.tiles.iter().filter(|t| t.kind.is_ocean()).count(), 18);

        // Every land tile is fully surrounded
        let topology = board.topology(50.0);
        for (i, tile) in board.tiles.iter().enumerate() {
            if tile.kind.is_land() {
                assert_eq!(topology.neighbor_tiles(i).len(), 6);
            }
        }
    }

    #[test]
    fn test_standard_board_layout() {
        let board = standard_board();
        assert_eq!(board.tiles.len(), 19);
        board.validate_standard().unwrap();
        assert_eq!(board.robber_position, Some(HexPosition::new(2.0, 2.0)));
    }

    #[test]
    fn test_layout_positions_are_centred() {
        let positions = layout_positions(&[3, 4, 5]);
        assert_eq!(positions[0], HexPosition::new(1.0, 0.0));
        assert_eq!(positions[3], HexPosition::new(0.5, 1.0));
        assert_eq!(positions[7], HexPosition::new(0.0, 2.0));
    }

    #[test]
    fn test_randomize_keeps_board_valid() {
        let mut rng = StdRng::seed_from_u64(7);
        for game_type in GameType::ALL {
            let mut board = default_board(game_type);
            let oceans: Vec<_> = board.tiles.iter().map(|t| t.kind.is_ocean()).collect();

            randomize_tiles(&mut board, &mut rng);

            board.validate_standard().unwrap();
            let after: Vec<_> = board.tiles.iter().map(|t| t.kind.is_ocean()).collect();
            assert_eq!(oceans, after, "ocean tiles must stay put");
            let desert = board.tiles.iter().find(|t| t.kind == TileKind::Desert).unwrap();
            assert_eq!(board.robber_position, Some(desert.position));
        }
    }

    #[test]
    fn test_randomize_standard_distribution() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut board = standard_board();
        randomize_tiles(&mut board, &mut rng);

        let count = |kind| board.tiles.iter().filter(|t| t.kind == kind).count();
        assert_eq!(count(TileKind::Wood), 4);
        assert_eq!(count(TileKind::Brick), 3);
        assert_eq!(count(TileKind::Sheep), 4);
        assert_eq!(count(TileKind::Wheat), 4);
        assert_eq!(count(TileKind::Ore), 3);
        assert_eq!(count(TileKind::Desert), 1);

        let mut numbers: Vec<u8> = board.tiles.iter().filter_map(|t| t.number).collect();
        numbers.sort_unstable();
        assert_eq!(numbers, STANDARD_NUMBER_TOKENS.to_vec());
    }
}
