//! Catan tracker command-line host.
//!
//! Commands:
//! - inspect: Load a saved board and report legal placements for a player
//! - template: Print a preset board as a snapshot, optionally randomized

use anyhow::Context;
use catan_board::{
    awards, default_board, legal_city_vertices, legal_road_edges, legal_settlement_vertices,
    load_board, randomize_tiles, save_board, Edge, GameType, OceanSide, Point, DEFAULT_HEX_SIZE,
};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "catan-tracker")]
#[command(about = "Inspect and generate Catan boards")]
struct Cli {
    /// Hex circumradius in pixels
    #[arg(long, global = true, env = "CATAN_HEX_SIZE", default_value_t = DEFAULT_HEX_SIZE)]
    size: f64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report legal placements and harbor sites for a saved board
    Inspect {
        path: PathBuf,
        #[arg(long)]
        player: String,
    },
    /// Print the preset board for a game type
    Template {
        #[arg(value_parser = parse_game_type)]
        game_type: GameType,
        #[arg(long)]
        randomize: bool,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn parse_game_type(s: &str) -> Result<GameType, String> {
    serde_json::from_value(serde_json::Value::String(s.to_lowercase()))
        .map_err(|_| format!("unknown game type '{s}'"))
}

#[derive(Serialize)]
struct HarborReport {
    edge: Edge,
    ocean_side: OceanSide,
}

#[derive(Serialize)]
struct InspectReport {
    player: String,
    tiles: usize,
    vertices: usize,
    edges: usize,
    legal_settlements: Vec<Point>,
    legal_cities: Vec<Point>,
    legal_roads: Vec<Edge>,
    harbor_sites: Vec<HarborReport>,
    longest_road: u32,
    victory_points: u32,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    anyhow::ensure!(cli.size > 0.0, "hex size must be positive, got {}", cli.size);

    match cli.command {
        Commands::Inspect { path, player } => inspect(&path, &player, cli.size),
        Commands::Template {
            game_type,
            randomize,
            seed,
        } => template(game_type, randomize, seed),
    }
}

fn inspect(path: &Path, player: &str, size: f64) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let board = load_board(&json, size).with_context(|| format!("loading {}", path.display()))?;
    let topology = board.topology(size);
    info!(
        tiles = topology.tiles().len(),
        vertices = topology.vertices().len(),
        edges = topology.edges().len(),
        "loaded board"
    );

    let points = |ids: Vec<usize>| -> Vec<Point> {
        ids.into_iter().filter_map(|v| topology.point(v)).collect()
    };

    let report = InspectReport {
        player: player.to_string(),
        tiles: topology.tiles().len(),
        vertices: topology.vertices().len(),
        edges: topology.edges().len(),
        legal_settlements: points(legal_settlement_vertices(
            &topology,
            &board.buildings,
            &board.roads,
            player,
        )),
        legal_cities: points(legal_city_vertices(&topology, &board.buildings, player)),
        legal_roads: legal_road_edges(&topology, &board.buildings, &board.roads, player)
            .into_iter()
            .filter_map(|e| topology.edge_geometry(e))
            .collect(),
        harbor_sites: topology
            .harbor_sites()
            .into_iter()
            .filter_map(|site| {
                Some(HarborReport {
                    edge: topology.edge_geometry(site.edge)?,
                    ocean_side: site.ocean_side,
                })
            })
            .collect(),
        longest_road: awards::longest_road(&topology, &board.buildings, &board.roads, player),
        victory_points: awards::victory_points(&board.buildings, player, 0, false, false),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn template(game_type: GameType, randomize: bool, seed: Option<u64>) -> anyhow::Result<()> {
    let mut board = default_board(game_type);
    if randomize {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        randomize_tiles(&mut board, &mut rng);
    }
    info!(?game_type, tiles = board.tiles.len(), randomize, "generated template");

    println!("{}", save_board(&board)?);
    Ok(())
}
