//! Fixtures shared by unit tests.

use crate::board::{PlayerId, Road, Structure, StructureKind};
use crate::hex::{EdgeId, TileId, VertexId};
use crate::random::RandomSource;
use crate::state::{GameConfig, GameState, Phase};

pub fn new_state(players: usize, seed: u64) -> GameState {
    let names: Vec<String> = (0..players).map(|i| format!("Player {i}")).collect();
    let mut rng = RandomSource::from_seed(seed);
    GameState::new(&names, GameConfig::seeded(seed), &mut rng)
}

/// Skip setup: main phase, first seat to act, dice not yet rolled
pub fn start_main_phase(state: &mut GameState) {
    state.turn.phase = Phase::Main;
    state.turn.setup_round = 2;
    state.turn.current_player = 0;
    state.turn.has_rolled = false;
}

/// First vertex (by id) with three neighbors
pub fn first_vertex(state: &GameState) -> VertexId {
    state
        .board
        .vertices()
        .find(|v| v.adjacent_vertices.len() == 3)
        .map(|v| v.id)
        .unwrap()
}

/// An empty inland vertex that is neither in `avoid` nor next to any of them
pub fn far_vertex(state: &GameState, avoid: &[VertexId]) -> VertexId {
    state
        .board
        .vertices()
        .filter(|v| v.adjacent_vertices.len() == 3 && v.structure.is_none())
        .find(|v| {
            avoid.iter().all(|a| {
                *a != v.id && !v.adjacent_vertices.contains(a)
            })
        })
        .map(|v| v.id)
        .unwrap()
}

/// A tile without the robber
pub fn producing_tile(state: &GameState) -> TileId {
    state.board.tiles().find(|t| !t.has_robber).map(|t| t.id).unwrap()
}

pub fn put_settlement(state: &mut GameState, owner: PlayerId, vertex: VertexId) {
    state.board.vertex_mut(&vertex).unwrap().structure = Some(Structure {
        owner,
        kind: StructureKind::Settlement,
    });
    state.player_mut(owner).unwrap().settlements.push(vertex);
}

pub fn put_city(state: &mut GameState, owner: PlayerId, vertex: VertexId) {
    state.board.vertex_mut(&vertex).unwrap().structure = Some(Structure {
        owner,
        kind: StructureKind::City,
    });
    state.player_mut(owner).unwrap().cities.push(vertex);
}

pub fn put_road(state: &mut GameState, owner: PlayerId, edge: EdgeId) {
    state.board.edge_mut(&edge).unwrap().road = Some(Road { owner });
    state.player_mut(owner).unwrap().roads.push(edge);
}

/// Edges forming a simple path of `len` edges starting at `start`, never
/// revisiting a vertex
pub fn road_path(state: &GameState, start: VertexId, len: usize) -> Vec<EdgeId> {
    try_road_path(state, start, len).unwrap()
}

/// A simple path of `len` edges that shares no vertex with any existing road
/// or structure
pub fn free_road_path(state: &GameState, len: usize) -> Vec<EdgeId> {
    state
        .board
        .vertices()
        .filter(|v| is_untouched(state, v.id))
        .find_map(|v| try_road_path(state, v.id, len))
        .unwrap()
}

fn is_untouched(state: &GameState, vertex: VertexId) -> bool {
    let v = state.board.vertex(&vertex).unwrap();
    v.structure.is_none()
        && v
            .adjacent_edges
            .iter()
            .all(|e| state.board.edge(e).unwrap().road.is_none())
}

fn try_road_path(state: &GameState, start: VertexId, len: usize) -> Option<Vec<EdgeId>> {
    let mut path = Vec::new();
    let mut visited = vec![start];
    let mut at = start;
    while path.len() < len {
        let vertex = state.board.vertex(&at)?;
        let next = vertex.adjacent_edges.iter().copied().find(|e| {
            let other = e.other_end(at).unwrap();
            !visited.contains(&other) && is_untouched(state, other)
        })?;
        let other = next.other_end(at)?;
        path.push(next);
        visited.push(other);
        at = other;
    }
    Some(path)
}
