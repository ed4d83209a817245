//! Game board representation including tiles, vertices, edges and ports.
//!
//! This module contains:
//! - Resource types and tile kinds
//! - Structures (settlements, cities) and roads
//! - Port placement for bank trades
//! - Board generation and the vertex/edge adjacency graph
//! - Board query methods used by the rules and scoring
//!
//! The board is an arena: tiles, vertices and edges live in ordered maps keyed
//! by their canonical ids, and every adjacency is stored as a list of ids.

use crate::hex::{Corner, EdgeId, HexCoord, TileId, VertexId};
use crate::player::ResourceCount;
use crate::random::RandomSource;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::warn;

/// Player identifier, equal to the seat index (0-3)
pub type PlayerId = u8;

/// Resource types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Wood,
    Brick,
    Sheep,
    Wheat,
    Ore,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Wood,
        Resource::Brick,
        Resource::Sheep,
        Resource::Wheat,
        Resource::Ore,
    ];

    /// Lowercase name, as used in messages and exports
    pub fn name(&self) -> &'static str {
        match self {
            Resource::Wood => "wood",
            Resource::Brick => "brick",
            Resource::Sheep => "sheep",
            Resource::Wheat => "wheat",
            Resource::Ore => "ore",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type of hex tile on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TileKind {
    /// Produces a resource when its number is rolled
    Resource(Resource),
    /// No production
    Desert,
}

/// A single hex tile on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub id: TileId,
    /// Position on the hex grid
    pub coord: HexCoord,
    pub kind: TileKind,
    /// Dice number that triggers production (2-12 but never 7, None for desert)
    pub number: Option<u8>,
    /// Whether the robber is currently on this tile
    pub has_robber: bool,
}

impl Tile {
    /// Create a new resource tile
    pub fn new_resource(coord: HexCoord, resource: Resource, number: u8) -> Self {
        Self {
            id: TileId(coord),
            coord,
            kind: TileKind::Resource(resource),
            number: Some(number),
            has_robber: false,
        }
    }

    /// Create a desert tile. The robber starts here.
    pub fn desert(coord: HexCoord) -> Self {
        Self {
            id: TileId(coord),
            coord,
            kind: TileKind::Desert,
            number: None,
            has_robber: true,
        }
    }

    /// Get the resource this tile produces, if any
    pub fn resource(&self) -> Option<Resource> {
        match self.kind {
            TileKind::Resource(r) => Some(r),
            TileKind::Desert => None,
        }
    }
}

/// Kind of structure standing on a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
    /// 1 VP, 1 resource per adjacent tile
    Settlement,
    /// 2 VP, 2 resources per adjacent tile
    City,
}

impl StructureKind {
    /// Victory points provided by this structure
    pub fn victory_points(&self) -> u32 {
        match self {
            StructureKind::Settlement => 1,
            StructureKind::City => 2,
        }
    }

    /// Resource multiplier (how many resources per production)
    pub fn resource_multiplier(&self) -> u32 {
        match self {
            StructureKind::Settlement => 1,
            StructureKind::City => 2,
        }
    }
}

/// What's built on a vertex (corner)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    pub owner: PlayerId,
    pub kind: StructureKind,
}

/// What's built on an edge (side)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Road {
    pub owner: PlayerId,
}

/// Port types for bank trading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PortKind {
    /// 3:1 trade any resource
    Generic,
    /// 2:1 trade for a specific resource
    Specific(Resource),
}

impl PortKind {
    /// The exchange ratio for this port
    pub fn ratio(&self) -> u32 {
        match self {
            PortKind::Generic => 3,
            PortKind::Specific(_) => 2,
        }
    }
}

/// A port and the two vertices that grant access to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub kind: PortKind,
    pub ratio: u32,
    pub vertices: [VertexId; 2],
}

/// A corner shared by up to three tiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vertex {
    pub id: VertexId,
    pub adjacent_tiles: Vec<TileId>,
    pub adjacent_vertices: Vec<VertexId>,
    pub adjacent_edges: Vec<EdgeId>,
    pub structure: Option<Structure>,
    pub port: Option<PortKind>,
}

impl Vertex {
    fn new(id: VertexId) -> Self {
        Self {
            id,
            adjacent_tiles: Vec::new(),
            adjacent_vertices: Vec::new(),
            adjacent_edges: Vec::new(),
            structure: None,
            port: None,
        }
    }

    /// Owner of the structure on this vertex, if any
    pub fn owner(&self) -> Option<PlayerId> {
        self.structure.map(|s| s.owner)
    }
}

/// A side shared by up to two tiles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub vertices: [VertexId; 2],
    pub adjacent_tiles: Vec<TileId>,
    pub adjacent_edges: Vec<EdgeId>,
    pub road: Option<Road>,
}

impl Edge {
    fn new(id: EdgeId) -> Self {
        Self {
            id,
            vertices: id.endpoints(),
            adjacent_tiles: Vec::new(),
            adjacent_edges: Vec::new(),
            road: None,
        }
    }
}

/// Land tiles, row by row from the top (r = -2 .. 2)
const LAYOUT: [(i32, i32); 19] = [
    (0, -2),
    (1, -2),
    (2, -2),
    (-1, -1),
    (0, -1),
    (1, -1),
    (2, -1),
    (-2, 0),
    (-1, 0),
    (0, 0),
    (1, 0),
    (2, 0),
    (-2, 1),
    (-1, 1),
    (0, 1),
    (1, 1),
    (-2, 2),
    (-1, 2),
    (0, 2),
];

/// Number tokens: single 2 and 12, doubled 3-6 and 8-11
const NUMBER_TOKENS: [u8; 18] = [2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

/// Coastal port locations: the tile and the two corners facing the sea
const PORT_LOCATIONS: [((i32, i32), Corner, Corner); 9] = [
    ((0, -2), Corner::SouthWest, Corner::NorthWest),
    ((2, -2), Corner::North, Corner::NorthEast),
    ((2, -1), Corner::NorthEast, Corner::SouthEast),
    ((2, 0), Corner::NorthEast, Corner::SouthEast),
    ((1, 1), Corner::SouthEast, Corner::South),
    ((-1, 2), Corner::South, Corner::SouthWest),
    ((-2, 2), Corner::South, Corner::SouthWest),
    ((-2, 1), Corner::SouthWest, Corner::NorthWest),
    ((-2, 0), Corner::SouthWest, Corner::NorthWest),
];

fn tile_deck() -> Vec<TileKind> {
    let counts = [
        (Resource::Wood, 4),
        (Resource::Brick, 3),
        (Resource::Sheep, 4),
        (Resource::Wheat, 4),
        (Resource::Ore, 3),
    ];
    let mut deck: Vec<TileKind> = counts
        .iter()
        .flat_map(|&(resource, n)| std::iter::repeat(TileKind::Resource(resource)).take(n))
        .collect();
    deck.push(TileKind::Desert);
    deck
}

fn port_deck() -> Vec<PortKind> {
    let mut deck: Vec<PortKind> = Resource::ALL.iter().map(|&r| PortKind::Specific(r)).collect();
    deck.extend(std::iter::repeat(PortKind::Generic).take(4));
    deck
}

/// The complete game board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    tiles: BTreeMap<TileId, Tile>,
    vertices: BTreeMap<VertexId, Vertex>,
    edges: BTreeMap<EdgeId, Edge>,
    ports: Vec<Port>,
}

impl Board {
    /// Generate the standard 19-tile board from the given random stream.
    ///
    /// Draw order: tile kinds, number tokens, port kinds. The same seed always
    /// yields the same board.
    pub fn generate(rng: &mut RandomSource) -> Self {
        let mut kinds = tile_deck();
        rng.shuffle(&mut kinds);

        let mut tokens = NUMBER_TOKENS.to_vec();
        rng.shuffle(&mut tokens);
        let mut tokens = tokens.into_iter();

        let mut tiles = BTreeMap::new();
        for (&(q, r), kind) in LAYOUT.iter().zip(kinds) {
            let coord = HexCoord::new(q, r);
            let tile = match kind {
                TileKind::Resource(resource) => match tokens.next() {
                    Some(number) => Tile::new_resource(coord, resource, number),
                    None => Tile::desert(coord),
                },
                TileKind::Desert => Tile::desert(coord),
            };
            tiles.insert(tile.id, tile);
        }

        let mut port_kinds = port_deck();
        rng.shuffle(&mut port_kinds);

        let mut board = Self {
            tiles,
            vertices: BTreeMap::new(),
            edges: BTreeMap::new(),
            ports: Vec::new(),
        };
        board.build_adjacency();
        board.attach_ports(&port_kinds);
        board
    }

    /// Derive the vertex/edge graph from the tile set.
    ///
    /// Corners shared between tiles resolve to one vertex because their ids
    /// come from the rounded pixel position.
    fn build_adjacency(&mut self) {
        let coords: Vec<HexCoord> = self.tiles.values().map(|t| t.coord).collect();

        for coord in coords {
            let tile_id = TileId(coord);
            let corners = coord.vertex_ids();

            for &vertex_id in &corners {
                let vertex = self
                    .vertices
                    .entry(vertex_id)
                    .or_insert_with(|| Vertex::new(vertex_id));
                push_unique(&mut vertex.adjacent_tiles, tile_id);
            }

            for i in 0..corners.len() {
                let a = corners[i];
                let b = corners[(i + 1) % corners.len()];
                let edge_id = EdgeId::new(a, b);

                let edge = self.edges.entry(edge_id).or_insert_with(|| Edge::new(edge_id));
                push_unique(&mut edge.adjacent_tiles, tile_id);

                for (from, to) in [(a, b), (b, a)] {
                    if let Some(vertex) = self.vertices.get_mut(&from) {
                        push_unique(&mut vertex.adjacent_vertices, to);
                        push_unique(&mut vertex.adjacent_edges, edge_id);
                    }
                }
            }
        }

        // Edges sharing an endpoint
        let mut edge_neighbors: BTreeMap<EdgeId, Vec<EdgeId>> = BTreeMap::new();
        for edge in self.edges.values() {
            let mut neighbors = Vec::new();
            for endpoint in &edge.vertices {
                if let Some(vertex) = self.vertices.get(endpoint) {
                    for &other in &vertex.adjacent_edges {
                        if other != edge.id {
                            push_unique(&mut neighbors, other);
                        }
                    }
                }
            }
            edge_neighbors.insert(edge.id, neighbors);
        }
        for (id, neighbors) in edge_neighbors {
            if let Some(edge) = self.edges.get_mut(&id) {
                edge.adjacent_edges = neighbors;
            }
        }
    }

    /// Attach port kinds, in order, to the fixed coastal locations
    fn attach_ports(&mut self, kinds: &[PortKind]) {
        for (&((q, r), c1, c2), &kind) in PORT_LOCATIONS.iter().zip(kinds) {
            let coord = HexCoord::new(q, r);
            let v1 = coord.vertex_id(c1);
            let v2 = coord.vertex_id(c2);

            if !self.vertices.contains_key(&v1) || !self.vertices.contains_key(&v2) {
                warn!(tile = %TileId(coord), "port location does not resolve to board vertices");
                continue;
            }

            for id in [v1, v2] {
                if let Some(vertex) = self.vertices.get_mut(&id) {
                    vertex.port = Some(kind);
                }
            }
            self.ports.push(Port {
                kind,
                ratio: kind.ratio(),
                vertices: [v1, v2],
            });
        }
    }

    // ==================== Query Methods ====================

    /// Get a tile by id
    pub fn tile(&self, id: &TileId) -> Option<&Tile> {
        self.tiles.get(id)
    }

    /// All tiles, ordered by id
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    /// Get a vertex by id
    pub fn vertex(&self, id: &VertexId) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    /// All vertices, ordered by id
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// Get an edge by id
    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// All edges, ordered by id
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// All ports
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// The tile currently holding the robber
    pub fn robber_tile(&self) -> Option<TileId> {
        self.tiles.values().find(|t| t.has_robber).map(|t| t.id)
    }

    /// Structure on a vertex, if any
    pub fn structure_at(&self, id: &VertexId) -> Option<Structure> {
        self.vertices.get(id).and_then(|v| v.structure)
    }

    /// Check if a vertex satisfies the distance rule (no structure on any adjacent vertex)
    pub fn satisfies_distance_rule(&self, id: &VertexId) -> bool {
        match self.vertices.get(id) {
            Some(vertex) => vertex
                .adjacent_vertices
                .iter()
                .all(|adj| self.structure_at(adj).is_none()),
            None => false,
        }
    }

    /// Vertices touching a tile
    pub fn tile_vertices(&self, id: &TileId) -> Vec<VertexId> {
        id.coord()
            .vertex_ids()
            .into_iter()
            .filter(|v| self.vertices.contains_key(v))
            .collect()
    }

    /// Players with a structure on a tile (robber targets)
    pub fn players_on_tile(&self, id: &TileId) -> BTreeSet<PlayerId> {
        self.tile_vertices(id)
            .iter()
            .filter_map(|v| self.structure_at(v))
            .map(|s| s.owner)
            .collect()
    }

    /// Best bank ratio available to a player for giving `resource`
    pub fn best_trade_ratio(&self, player: PlayerId, resource: Resource) -> u32 {
        let mut best = 4;
        for vertex in self.vertices.values() {
            if vertex.owner() != Some(player) {
                continue;
            }
            match vertex.port {
                Some(PortKind::Specific(r)) if r == resource => best = best.min(2),
                Some(PortKind::Generic) => best = best.min(3),
                _ => {}
            }
        }
        best
    }

    /// Whether an edge touches a player's structure, or a player's road through
    /// a vertex not occupied by an opponent
    pub fn is_connected_to_network(&self, id: &EdgeId, player: PlayerId) -> bool {
        let Some(edge) = self.edges.get(id) else {
            return false;
        };
        for endpoint in &edge.vertices {
            let Some(vertex) = self.vertices.get(endpoint) else {
                continue;
            };
            match vertex.owner() {
                Some(owner) if owner == player => return true,
                Some(_) => continue,
                None => {}
            }
            let has_road = vertex.adjacent_edges.iter().any(|adj| {
                *adj != *id
                    && self
                        .edges
                        .get(adj)
                        .and_then(|e| e.road)
                        .is_some_and(|road| road.owner == player)
            });
            if has_road {
                return true;
            }
        }
        false
    }

    /// Whether a player owns a road touching a vertex
    pub fn has_adjacent_road(&self, id: &VertexId, player: PlayerId) -> bool {
        self.vertices.get(id).is_some_and(|vertex| {
            vertex.adjacent_edges.iter().any(|edge| {
                self.edges
                    .get(edge)
                    .and_then(|e| e.road)
                    .is_some_and(|road| road.owner == player)
            })
        })
    }

    // ==================== Resource Distribution ====================

    /// Calculate resources produced for a dice roll.
    ///
    /// Tiles holding the robber produce nothing.
    pub fn production_for_roll(&self, roll: u8) -> BTreeMap<PlayerId, ResourceCount> {
        let mut distribution: BTreeMap<PlayerId, ResourceCount> = BTreeMap::new();

        for tile in self.tiles.values() {
            if tile.number != Some(roll) || tile.has_robber {
                continue;
            }
            let Some(resource) = tile.resource() else {
                continue;
            };

            for vertex in self.tile_vertices(&tile.id) {
                if let Some(structure) = self.structure_at(&vertex) {
                    distribution
                        .entry(structure.owner)
                        .or_default()
                        .add(resource, structure.kind.resource_multiplier());
                }
            }
        }

        distribution
    }

    // ==================== Mutation Methods ====================

    pub(crate) fn vertex_mut(&mut self, id: &VertexId) -> Option<&mut Vertex> {
        self.vertices.get_mut(id)
    }

    pub(crate) fn edge_mut(&mut self, id: &EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(id)
    }

    /// Move the robber. Returns false if the tile does not exist.
    pub(crate) fn move_robber(&mut self, to: &TileId) -> bool {
        if !self.tiles.contains_key(to) {
            return false;
        }
        for tile in self.tiles.values_mut() {
            tile.has_robber = tile.id == *to;
        }
        true
    }
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}
