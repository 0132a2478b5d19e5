//! WebAssembly bindings for the board engine.
//!
//! This module exposes the board to JavaScript through wasm-bindgen. All
//! structured values cross the boundary as JSON strings.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
use crate::board::{BoardSetup, BuildingKind, HarborToggle, HarborTrade};
#[cfg(feature = "wasm")]
use crate::geometry::{Edge, Point};
#[cfg(feature = "wasm")]
use crate::rules;
#[cfg(feature = "wasm")]
use crate::save;
#[cfg(feature = "wasm")]
use crate::topology::Topology;

/// Initialize panic hook for better error messages in browser console
#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// WASM-exposed board wrapper.
///
/// Tiles are fixed for the lifetime of the wrapper, so the topology is built
/// once in `fromJson`.
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub struct WasmBoard {
    board: BoardSetup,
    topology: Topology,
}

#[cfg(feature = "wasm")]
#[wasm_bindgen]
impl WasmBoard {
    /// Load a board snapshot (any supported version)
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str, hex_size: f64) -> Result<WasmBoard, JsValue> {
        let board = save::load_board(json, hex_size)
            .map_err(|e| JsValue::from_str(&format!("Invalid board: {}", e)))?;
        let topology = board.topology(hex_size);
        Ok(WasmBoard { board, topology })
    }

    /// Serialize the board as a current-version snapshot
    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> Result<String, JsValue> {
        save::save_board(&self.board).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// All vertex coordinates, indexed by vertex id
    #[wasm_bindgen(js_name = vertices)]
    pub fn vertices(&self) -> String {
        let points: Vec<Point> = self.topology.vertices().iter().map(|v| v.point).collect();
        serde_json::to_string(&points).unwrap_or_else(|_| "[]".to_string())
    }

    /// Legal settlement points for a player as JSON array
    #[wasm_bindgen(js_name = legalSettlements)]
    pub fn legal_settlements(&self, player: &str) -> String {
        let ids = rules::legal_settlement_vertices(
            &self.topology,
            &self.board.buildings,
            &self.board.roads,
            player,
        );
        self.points_json(&ids)
    }

    /// Legal city upgrade points for a player as JSON array
    #[wasm_bindgen(js_name = legalCities)]
    pub fn legal_cities(&self, player: &str) -> String {
        let ids = rules::legal_city_vertices(&self.topology, &self.board.buildings, player);
        self.points_json(&ids)
    }

    /// Legal road edges for a player as JSON array
    #[wasm_bindgen(js_name = legalRoads)]
    pub fn legal_roads(&self, player: &str) -> String {
        let edges: Vec<Edge> = rules::legal_road_edges(
            &self.topology,
            &self.board.buildings,
            &self.board.roads,
            player,
        )
        .into_iter()
        .filter_map(|e| self.topology.edge_geometry(e))
        .collect();
        serde_json::to_string(&edges).unwrap_or_else(|_| "[]".to_string())
    }

    /// Every edge that can host a harbor, as JSON array of edges
    #[wasm_bindgen(js_name = harborSites)]
    pub fn harbor_sites(&self) -> String {
        let edges: Vec<Edge> = self
            .topology
            .harbor_sites()
            .into_iter()
            .filter_map(|s| self.topology.edge_geometry(s.edge))
            .collect();
        serde_json::to_string(&edges).unwrap_or_else(|_| "[]".to_string())
    }

    /// Place a building (`"settlement"` or `"city"`) at a point
    #[wasm_bindgen(js_name = placeBuilding)]
    pub fn place_building(&mut self, kind: &str, x: f64, y: f64, player: &str) -> Result<(), JsValue> {
        let kind: BuildingKind = serde_json::from_value(serde_json::Value::String(kind.to_string()))
            .map_err(|e| JsValue::from_str(&format!("Invalid building kind: {}", e)))?;
        self.board.place_building(kind, Point::new(x, y), player);
        Ok(())
    }

    /// Place a road from JSON edge `{ from, to }`
    #[wasm_bindgen(js_name = placeRoad)]
    pub fn place_road(&mut self, edge_json: &str, player: &str) -> Result<(), JsValue> {
        let edge = parse_edge(edge_json)?;
        self.board.place_road(edge, player);
        Ok(())
    }

    /// Remove the building at a point; returns whether one was there
    #[wasm_bindgen(js_name = removeBuilding)]
    pub fn remove_building(&mut self, x: f64, y: f64) -> bool {
        self.board.remove_building(Point::new(x, y)).is_some()
    }

    /// Remove the road on an edge; returns whether one was there
    #[wasm_bindgen(js_name = removeRoad)]
    pub fn remove_road(&mut self, edge_json: &str) -> Result<bool, JsValue> {
        let edge = parse_edge(edge_json)?;
        Ok(self.board.remove_road(&edge).is_some())
    }

    /// Toggle a harbor; returns "left"/"right" when added, "removed", or "invalid"
    #[wasm_bindgen(js_name = toggleHarbor)]
    pub fn toggle_harbor(&mut self, edge_json: &str, trade: &str) -> Result<String, JsValue> {
        let edge = parse_edge(edge_json)?;
        let trade: HarborTrade = serde_json::from_value(serde_json::Value::String(trade.to_string()))
            .map_err(|e| JsValue::from_str(&format!("Invalid harbor trade: {}", e)))?;

        let outcome = match self.board.toggle_harbor(&self.topology, &edge, trade) {
            HarborToggle::Added(side) => serde_json::to_value(side)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
            HarborToggle::Removed => "removed".to_string(),
            HarborToggle::InvalidSite => "invalid".to_string(),
        };
        Ok(outcome)
    }
}

#[cfg(feature = "wasm")]
impl WasmBoard {
    fn points_json(&self, ids: &[usize]) -> String {
        let points: Vec<Point> = ids.iter().filter_map(|&v| self.topology.point(v)).collect();
        serde_json::to_string(&points).unwrap_or_else(|_| "[]".to_string())
    }
}

#[cfg(feature = "wasm")]
fn parse_edge(json: &str) -> Result<Edge, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("Invalid edge JSON: {}", e)))
}
