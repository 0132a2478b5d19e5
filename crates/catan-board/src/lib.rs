//! Catan Board - hex-grid core of a Catan game tracker
//!
//! This crate turns a list of hex tiles into a vertex/edge graph and answers
//! placement questions against it:
//! - Pixel geometry for pointy-top hexes with tolerance-based point equality
//! - Topology building with deduplicated shared corners and sides
//! - Settlement, city and road legality for any player
//! - Harbor placement on coastal edges, with the ocean side worked out
//! - Templates, randomization, versioned save files and award tracking
//!
//! # Architecture
//!
//! Everything is a pure computation over plain data. The board is serializable
//! as JSON and the topology is rebuilt from its tiles whenever needed. The
//! crate compiles to:
//! - Native Rust for tools such as the `catan-tracker` CLI
//! - WebAssembly for a browser board editor (`wasm` feature)
//!
//! # Modules
//!
//! - [`geometry`]: Points, edges and hex corner math
//! - [`topology`]: Vertex/edge graph built from tiles
//! - [`rules`]: Legal settlement, city and road spots
//! - [`board`]: Board data, validation and mutators
//! - [`templates`]: Preset layouts and randomization
//! - [`save`]: Versioned snapshots
//! - [`awards`]: Longest road, largest army and victory points

pub mod awards;
pub mod board;
pub mod geometry;
pub mod rules;
pub mod save;
pub mod templates;
pub mod topology;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use awards::{largest_army, longest_road, longest_road_holder, victory_points};
pub use board::{
    BoardError, BoardSetup, Building, BuildingKind, Harbor, HarborToggle, HarborTrade, HexTile,
    PlayerId, Road, TileKind,
};
pub use geometry::{
    compute_ocean_side, hex_center, hex_edges, hex_vertices, points_equal, Edge, HexPosition,
    OceanSide, Point, DEFAULT_EPSILON, DEFAULT_HEX_SIZE,
};
pub use rules::{legal_city_vertices, legal_road_edges, legal_settlement_vertices};
pub use save::{load_board, save_board, SaveError};
pub use templates::{default_board, randomize_tiles, standard_board, GameType};
pub use topology::{compute_topology, EdgeId, HarborSite, Topology, TopologyConfig, VertexId};
