//! Victory points, longest road, largest army and the win check.

use crate::board::{Board, PlayerId};
use crate::events::{EventKind, FinalScore};
use crate::hex::{EdgeId, VertexId};
use crate::state::{GameState, Phase};
use std::collections::BTreeSet;

/// Minimum road length for Longest Road
pub const MIN_LONGEST_ROAD: u32 = 5;
/// Minimum knights played for Largest Army
pub const MIN_LARGEST_ARMY: u32 = 3;
/// Points awarded for each special title
pub const TITLE_POINTS: u32 = 2;

/// Total victory points for a player, including hidden VP cards
pub fn victory_points(state: &GameState, id: PlayerId) -> u32 {
    let Some(player) = state.player(id) else {
        return 0;
    };

    let mut vp = player.settlements.len() as u32;
    vp += 2 * player.cities.len() as u32;
    vp += player.victory_point_cards();
    if player.has_longest_road {
        vp += TITLE_POINTS;
    }
    if player.has_largest_army {
        vp += TITLE_POINTS;
    }
    vp
}

/// Longest trail of a player's roads. Opponent structures break the trail.
pub fn longest_road(board: &Board, player: PlayerId) -> u32 {
    let mut max_length = 0;

    // Try starting from each road, in both directions
    for edge in board.edges() {
        if edge.road.map(|r| r.owner) != Some(player) {
            continue;
        }
        for from in edge.vertices {
            let Some(to) = edge.id.other_end(from) else {
                continue;
            };
            let mut visited = BTreeSet::from([edge.id]);
            let length = 1 + dfs_road_length(board, player, to, &mut visited);
            max_length = max_length.max(length);
        }
    }

    max_length
}

/// Longest continuation from `at`, never reusing an edge on the current branch
fn dfs_road_length(
    board: &Board,
    player: PlayerId,
    at: VertexId,
    visited: &mut BTreeSet<EdgeId>,
) -> u32 {
    let Some(vertex) = board.vertex(&at) else {
        return 0;
    };
    // Can't pass through enemy building
    if vertex.owner().is_some_and(|o| o != player) {
        return 0;
    }

    let mut max_continuation = 0;
    for adj in &vertex.adjacent_edges {
        if visited.contains(adj) {
            continue;
        }
        let owned = board
            .edge(adj)
            .and_then(|e| e.road)
            .is_some_and(|road| road.owner == player);
        let Some(next) = adj.other_end(at) else {
            continue;
        };
        if !owned {
            continue;
        }

        visited.insert(*adj);
        let continuation = 1 + dfs_road_length(board, player, next, visited);
        visited.remove(adj);
        max_continuation = max_continuation.max(continuation);
    }

    max_continuation
}

/// Decide who holds a title given every player's value.
///
/// Only values at or above `threshold` qualify. A unique leader takes the
/// title (it necessarily exceeds the holder). A tie keeps the holder when the
/// holder is part of it and leaves the title vacant otherwise.
pub fn resolve_holder(
    current: Option<PlayerId>,
    values: &[(PlayerId, u32)],
    threshold: u32,
) -> Option<PlayerId> {
    let best = values
        .iter()
        .filter(|(_, v)| *v >= threshold)
        .map(|(_, v)| *v)
        .max()?;

    let leaders: Vec<PlayerId> = values
        .iter()
        .filter(|(_, v)| *v == best)
        .map(|(p, _)| *p)
        .collect();

    match leaders.as_slice() {
        [leader] => Some(*leader),
        tied if current.is_some_and(|holder| tied.contains(&holder)) => current,
        _ => None,
    }
}

fn value_of(values: &[(PlayerId, u32)], holder: Option<PlayerId>) -> u32 {
    holder
        .and_then(|h| values.iter().find(|(p, _)| *p == h))
        .map(|(_, v)| *v)
        .unwrap_or(0)
}

/// Recompute titles, points and the winner after a mutation.
///
/// Returns the events describing what changed.
pub fn settle(state: &mut GameState) -> Vec<EventKind> {
    let mut events = Vec::new();

    let lengths: Vec<(PlayerId, u32)> = state
        .players
        .iter()
        .map(|p| (p.id, longest_road(&state.board, p.id)))
        .collect();
    let road_holder = resolve_holder(state.longest_road_holder, &lengths, MIN_LONGEST_ROAD);
    if road_holder != state.longest_road_holder {
        state.longest_road_holder = road_holder;
        for player in &mut state.players {
            player.has_longest_road = Some(player.id) == road_holder;
        }
        events.push(EventKind::LongestRoadChanged {
            player_id: road_holder,
            road_length: value_of(&lengths, road_holder),
        });
    }

    let armies: Vec<(PlayerId, u32)> = state
        .players
        .iter()
        .map(|p| (p.id, p.knights_played))
        .collect();
    let army_holder = resolve_holder(state.largest_army_holder, &armies, MIN_LARGEST_ARMY);
    if army_holder != state.largest_army_holder {
        state.largest_army_holder = army_holder;
        for player in &mut state.players {
            player.has_largest_army = Some(player.id) == army_holder;
        }
        events.push(EventKind::LargestArmyChanged {
            player_id: army_holder,
            army_size: value_of(&armies, army_holder),
        });
    }

    for index in 0..state.players.len() {
        let id = state.players[index].id;
        let new_points = victory_points(state, id);
        let old_points = state.players[index].victory_points;
        if new_points != old_points {
            state.players[index].victory_points = new_points;
            events.push(EventKind::VictoryPointsChanged {
                player_id: id,
                old_points,
                new_points,
            });
        }
    }

    events.extend(check_win_condition(state));
    events
}

/// The current player is checked first, then everyone else in seat order
fn check_win_condition(state: &mut GameState) -> Option<EventKind> {
    if state.winner.is_some() {
        return None;
    }

    let target = state.config.victory_points_to_win;
    let current = state.current_player_id();
    let winner = std::iter::once(current)
        .chain(state.players.iter().map(|p| p.id).filter(|id| *id != current))
        .find(|id| state.player(*id).is_some_and(|p| p.victory_points >= target))?;

    state.winner = Some(winner);
    state.turn.phase = Phase::GameOver;
    Some(EventKind::GameEnded {
        winner_id: winner,
        final_scores: state
            .players
            .iter()
            .map(|p| FinalScore {
                player_id: p.id,
                victory_points: p.victory_points,
            })
            .collect(),
    })
}
