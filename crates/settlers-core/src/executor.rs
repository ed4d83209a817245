//! Action execution.
//!
//! Each function takes the current snapshot and returns a [`Transition`]: a new
//! snapshot plus the events describing the change. The input is never mutated.
//! Functions assume the matching validator in [`crate::rules`] already passed;
//! a missing id at this point is an invariant violation, not a rule violation.

use crate::actions::GameAction;
use crate::board::{PlayerId, Resource, Road, Structure, StructureKind};
use crate::events::{EventKind, GainReason, LossReason};
use crate::game::GameError;
use crate::hex::{EdgeId, TileId, VertexId};
use crate::player::{costs, DevCard, DevCardKind, PlayerState, ResourceCount};
use crate::player::{DISCARD_THRESHOLD, MAX_ROADS};
use crate::random::RandomSource;
use crate::state::{GameState, Phase, SetupStep};

/// Result of applying one action
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: GameState,
    pub events: Vec<EventKind>,
}

impl Transition {
    fn new(state: GameState) -> Self {
        Self {
            state,
            events: Vec::new(),
        }
    }
}

/// Apply an already-validated action
pub fn apply(
    state: &GameState,
    rng: &mut RandomSource,
    actor: PlayerId,
    action: &GameAction,
) -> Result<Transition, GameError> {
    match action {
        GameAction::RollDice => roll_dice(state, rng),
        GameAction::PlaceSettlement { vertex } => place_settlement(state, actor, *vertex),
        GameAction::PlaceCity { vertex } => place_city(state, actor, *vertex),
        GameAction::PlaceRoad { edge } => place_road(state, actor, *edge),
        GameAction::BuyDevCard => buy_dev_card(state, actor),
        GameAction::PlayKnight { tile, target } => play_knight(state, rng, actor, *tile, *target),
        GameAction::PlayRoadBuilding { first, second } => {
            play_road_building(state, actor, *first, *second)
        }
        GameAction::PlayYearOfPlenty { first, second } => {
            play_year_of_plenty(state, actor, *first, *second)
        }
        GameAction::PlayMonopoly { resource } => play_monopoly(state, actor, *resource),
        GameAction::Discard { player, resources } => discard(state, *player, resources),
        GameAction::MoveRobber { tile, target } => move_robber(state, rng, actor, *tile, *target),
        GameAction::TradeWithBank { give, get } => trade_with_bank(state, actor, give, get),
        GameAction::EndTurn => end_turn(state),
    }
}

// ==================== Helper Methods ====================

fn player_mut(state: &mut GameState, id: PlayerId) -> Result<&mut PlayerState, GameError> {
    state
        .player_mut(id)
        .ok_or_else(|| GameError::invariant(format!("player {id} disappeared")))
}

fn pay(
    state: &mut GameState,
    id: PlayerId,
    cost: &ResourceCount,
    reason: LossReason,
    events: &mut Vec<EventKind>,
) -> Result<(), GameError> {
    let player = player_mut(state, id)?;
    player.resources = player
        .resources
        .checked_sub(cost)
        .ok_or_else(|| GameError::invariant(format!("player {id} cannot cover {cost:?}")))?;
    if !cost.is_empty() {
        events.push(EventKind::ResourcesLost {
            player_id: id,
            resources: *cost,
            reason,
        });
    }
    Ok(())
}

fn gain(
    state: &mut GameState,
    id: PlayerId,
    resources: &ResourceCount,
    reason: GainReason,
    events: &mut Vec<EventKind>,
) -> Result<(), GameError> {
    player_mut(state, id)?.resources.add_count(resources);
    if !resources.is_empty() {
        events.push(EventKind::ResourcesGained {
            player_id: id,
            resources: *resources,
            reason,
        });
    }
    Ok(())
}

fn consume_card(state: &mut GameState, id: PlayerId, kind: DevCardKind) -> Result<(), GameError> {
    let player = player_mut(state, id)?;
    if !player.remove_playable(kind) {
        return Err(GameError::invariant(format!(
            "player {id} has no playable {} card",
            kind.name()
        )));
    }
    player.dev_cards_played_this_turn += 1;
    if kind == DevCardKind::Knight {
        player.knights_played += 1;
    }
    Ok(())
}

fn build_road(state: &mut GameState, id: PlayerId, edge_id: EdgeId) -> Result<(), GameError> {
    let edge = state
        .board
        .edge_mut(&edge_id)
        .ok_or_else(|| GameError::invariant(format!("edge {edge_id} disappeared")))?;
    edge.road = Some(Road { owner: id });
    player_mut(state, id)?.roads.push(edge_id);
    Ok(())
}

/// Move the robber and, if a victim is named, steal one random held unit
fn relocate_robber(
    state: &mut GameState,
    rng: &mut RandomSource,
    id: PlayerId,
    tile: TileId,
    target: Option<PlayerId>,
    events: &mut Vec<EventKind>,
) -> Result<(), GameError> {
    let from = state.board.robber_tile();
    if !state.board.move_robber(&tile) {
        return Err(GameError::invariant(format!("tile {tile} disappeared")));
    }
    events.push(EventKind::RobberMoved {
        player_id: id,
        from,
        to: tile,
    });

    let Some(victim) = target else {
        return Ok(());
    };
    let stolen = player_mut(state, victim)?.resources.take_random(rng);
    if let Some(resource) = stolen {
        player_mut(state, id)?.resources.add(resource, 1);
        let unit = ResourceCount::single(resource, 1);
        events.push(EventKind::PlayerStole {
            stealer_id: id,
            victim_id: victim,
            resource,
        });
        events.push(EventKind::ResourcesLost {
            player_id: victim,
            resources: unit,
            reason: LossReason::Robber,
        });
        events.push(EventKind::ResourcesGained {
            player_id: id,
            resources: unit,
            reason: GainReason::Stolen,
        });
    }
    Ok(())
}

// ==================== Dice Rolling ====================

pub fn roll_dice(state: &GameState, rng: &mut RandomSource) -> Result<Transition, GameError> {
    let mut t = Transition::new(state.clone());
    let (dice1, dice2) = rng.roll_dice();
    let total = dice1 + dice2;
    let roller = t.state.current_player_id();

    t.state.turn.dice = Some((dice1, dice2));
    t.state.turn.has_rolled = true;
    t.events.push(EventKind::DiceRolled {
        player_id: roller,
        dice1,
        dice2,
        total,
    });

    if total == 7 {
        let must_discard: Vec<PlayerId> = t
            .state
            .players
            .iter()
            .filter(|p| p.resources.total() > DISCARD_THRESHOLD)
            .map(|p| p.id)
            .collect();
        t.state.turn.phase = if must_discard.is_empty() {
            Phase::RobberPlacement
        } else {
            Phase::RobberDiscard
        };
        t.state.turn.must_discard = must_discard;
        return Ok(t);
    }

    let production = t.state.board.production_for_roll(total);
    for (owner, resources) in production {
        gain(&mut t.state, owner, &resources, GainReason::DiceRoll, &mut t.events)?;
    }
    Ok(t)
}

// ==================== Building ====================

pub fn place_settlement(
    state: &GameState,
    id: PlayerId,
    vertex_id: VertexId,
) -> Result<Transition, GameError> {
    let mut t = Transition::new(state.clone());
    let is_setup = t.state.is_setup();

    let vertex = t
        .state
        .board
        .vertex_mut(&vertex_id)
        .ok_or_else(|| GameError::invariant(format!("vertex {vertex_id} disappeared")))?;
    vertex.structure = Some(Structure {
        owner: id,
        kind: StructureKind::Settlement,
    });
    let adjacent_tiles = vertex.adjacent_tiles.clone();
    player_mut(&mut t.state, id)?.settlements.push(vertex_id);

    t.events.push(EventKind::SettlementBuilt {
        player_id: id,
        vertex_id,
        is_setup,
    });

    if !is_setup {
        pay(&mut t.state, id, &costs::settlement(), LossReason::Building, &mut t.events)?;
        return Ok(t);
    }

    if t.state.turn.setup_round == 2 {
        let mut grant = ResourceCount::new();
        for tile in adjacent_tiles
            .iter()
            .filter_map(|tile| t.state.board.tile(tile))
        {
            if let Some(resource) = tile.resource() {
                grant.add(resource, 1);
            }
        }
        gain(&mut t.state, id, &grant, GainReason::InitialPlacement, &mut t.events)?;
    }

    t.state.turn.setup_step = match t.state.turn.setup_step {
        SetupStep::FirstSettlement => SetupStep::FirstRoad,
        SetupStep::SecondSettlement => SetupStep::SecondRoad,
        step => step,
    };
    Ok(t)
}

pub fn place_city(
    state: &GameState,
    id: PlayerId,
    vertex_id: VertexId,
) -> Result<Transition, GameError> {
    let mut t = Transition::new(state.clone());

    let vertex = t
        .state
        .board
        .vertex_mut(&vertex_id)
        .ok_or_else(|| GameError::invariant(format!("vertex {vertex_id} disappeared")))?;
    vertex.structure = Some(Structure {
        owner: id,
        kind: StructureKind::City,
    });

    let player = player_mut(&mut t.state, id)?;
    player.settlements.retain(|v| *v != vertex_id);
    player.cities.push(vertex_id);

    t.events.push(EventKind::CityBuilt {
        player_id: id,
        vertex_id,
    });
    pay(&mut t.state, id, &costs::city(), LossReason::Building, &mut t.events)?;
    Ok(t)
}

pub fn place_road(state: &GameState, id: PlayerId, edge_id: EdgeId) -> Result<Transition, GameError> {
    let mut t = Transition::new(state.clone());
    let is_setup = t.state.is_setup();

    build_road(&mut t.state, id, edge_id)?;
    t.events.push(EventKind::RoadBuilt {
        player_id: id,
        edge_id,
        is_setup,
    });

    if !is_setup {
        pay(&mut t.state, id, &costs::road(), LossReason::Building, &mut t.events)?;
        return Ok(t);
    }

    advance_setup(&mut t);
    Ok(t)
}

/// Snake draft: forward through the seats, then back to the first seat
fn advance_setup(t: &mut Transition) {
    let turn = &mut t.state.turn;
    let last_seat = t.state.players.len().saturating_sub(1);

    match turn.setup_step {
        SetupStep::FirstRoad if turn.current_player == last_seat => {
            turn.setup_round = 2;
            turn.setup_step = SetupStep::SecondSettlement;
        }
        SetupStep::FirstRoad => {
            turn.current_player += 1;
            turn.setup_step = SetupStep::FirstSettlement;
        }
        SetupStep::SecondRoad if turn.current_player == 0 => {
            turn.phase = Phase::Main;
            t.events.push(EventKind::TurnStarted { player_id: 0 });
        }
        SetupStep::SecondRoad => {
            turn.current_player -= 1;
            turn.setup_step = SetupStep::SecondSettlement;
        }
        SetupStep::FirstSettlement | SetupStep::SecondSettlement => {}
    }
}

// ==================== Development Cards ====================

pub fn buy_dev_card(state: &GameState, id: PlayerId) -> Result<Transition, GameError> {
    let mut t = Transition::new(state.clone());

    let kind = t
        .state
        .dev_card_deck
        .pop()
        .ok_or_else(|| GameError::invariant("development card deck is empty"))?;
    player_mut(&mut t.state, id)?.dev_cards.push(DevCard {
        kind,
        bought_this_turn: true,
    });

    t.events.push(EventKind::DevCardBought {
        player_id: id,
        card_type: kind,
    });
    pay(
        &mut t.state,
        id,
        &costs::development_card(),
        LossReason::Building,
        &mut t.events,
    )?;
    Ok(t)
}

pub fn play_knight(
    state: &GameState,
    rng: &mut RandomSource,
    id: PlayerId,
    tile: TileId,
    target: Option<PlayerId>,
) -> Result<Transition, GameError> {
    let mut t = Transition::new(state.clone());
    consume_card(&mut t.state, id, DevCardKind::Knight)?;
    t.events.push(EventKind::DevCardPlayed {
        player_id: id,
        card_type: DevCardKind::Knight,
    });
    relocate_robber(&mut t.state, rng, id, tile, target, &mut t.events)?;
    Ok(t)
}

/// Place up to two free roads; connectivity is not required
pub fn play_road_building(
    state: &GameState,
    id: PlayerId,
    first: EdgeId,
    second: Option<EdgeId>,
) -> Result<Transition, GameError> {
    let mut t = Transition::new(state.clone());
    consume_card(&mut t.state, id, DevCardKind::RoadBuilding)?;
    t.events.push(EventKind::DevCardPlayed {
        player_id: id,
        card_type: DevCardKind::RoadBuilding,
    });

    for edge_id in std::iter::once(first).chain(second) {
        let free = t.state.board.edge(&edge_id).is_some_and(|e| e.road.is_none());
        let pieces_left = t
            .state
            .player(id)
            .is_some_and(|p| p.roads.len() < MAX_ROADS);
        if !(free && pieces_left) {
            continue;
        }
        build_road(&mut t.state, id, edge_id)?;
        t.events.push(EventKind::RoadBuilt {
            player_id: id,
            edge_id,
            is_setup: false,
        });
    }
    Ok(t)
}

pub fn play_year_of_plenty(
    state: &GameState,
    id: PlayerId,
    first: Resource,
    second: Resource,
) -> Result<Transition, GameError> {
    let mut t = Transition::new(state.clone());
    consume_card(&mut t.state, id, DevCardKind::YearOfPlenty)?;
    t.events.push(EventKind::DevCardPlayed {
        player_id: id,
        card_type: DevCardKind::YearOfPlenty,
    });

    let mut grant = ResourceCount::single(first, 1);
    grant.add(second, 1);
    gain(&mut t.state, id, &grant, GainReason::DevCard, &mut t.events)?;
    Ok(t)
}

pub fn play_monopoly(
    state: &GameState,
    id: PlayerId,
    resource: Resource,
) -> Result<Transition, GameError> {
    let mut t = Transition::new(state.clone());
    consume_card(&mut t.state, id, DevCardKind::Monopoly)?;
    t.events.push(EventKind::DevCardPlayed {
        player_id: id,
        card_type: DevCardKind::Monopoly,
    });

    let mut taken = 0;
    for other in t.state.players.iter_mut().filter(|p| p.id != id) {
        let amount = other.resources.get(resource);
        if amount == 0 {
            continue;
        }
        other.resources.set(resource, 0);
        taken += amount;
        t.events.push(EventKind::ResourcesLost {
            player_id: other.id,
            resources: ResourceCount::single(resource, amount),
            reason: LossReason::DevCard,
        });
    }

    gain(
        &mut t.state,
        id,
        &ResourceCount::single(resource, taken),
        GainReason::DevCard,
        &mut t.events,
    )?;
    Ok(t)
}

// ==================== Robber ====================

pub fn discard(
    state: &GameState,
    id: PlayerId,
    resources: &ResourceCount,
) -> Result<Transition, GameError> {
    let mut t = Transition::new(state.clone());
    let player = player_mut(&mut t.state, id)?;
    player.resources = player
        .resources
        .checked_sub(resources)
        .ok_or_else(|| GameError::invariant(format!("player {id} discards more than held")))?;

    t.events.push(EventKind::ResourcesDiscarded {
        player_id: id,
        resources: *resources,
    });

    t.state.turn.must_discard.retain(|p| *p != id);
    if t.state.turn.must_discard.is_empty() {
        t.state.turn.phase = Phase::RobberPlacement;
    }
    Ok(t)
}

pub fn move_robber(
    state: &GameState,
    rng: &mut RandomSource,
    id: PlayerId,
    tile: TileId,
    target: Option<PlayerId>,
) -> Result<Transition, GameError> {
    let mut t = Transition::new(state.clone());
    relocate_robber(&mut t.state, rng, id, tile, target, &mut t.events)?;
    if t.state.turn.phase == Phase::RobberPlacement {
        t.state.turn.phase = Phase::Main;
    }
    Ok(t)
}

// ==================== Trading ====================

pub fn trade_with_bank(
    state: &GameState,
    id: PlayerId,
    give: &ResourceCount,
    get: &ResourceCount,
) -> Result<Transition, GameError> {
    let mut t = Transition::new(state.clone());
    t.events.push(EventKind::TradeWithBank {
        player_id: id,
        gave: *give,
        received: *get,
    });
    pay(&mut t.state, id, give, LossReason::Trade, &mut t.events)?;
    gain(&mut t.state, id, get, GainReason::Trade, &mut t.events)?;
    Ok(t)
}

// ==================== Turn Management ====================

pub fn end_turn(state: &GameState) -> Result<Transition, GameError> {
    let mut t = Transition::new(state.clone());
    let ending = t.state.current_player_id();

    let player = player_mut(&mut t.state, ending)?;
    player.dev_cards_played_this_turn = 0;
    player.ready_new_cards();

    let turn = &mut t.state.turn;
    turn.has_rolled = false;
    turn.dice = None;
    turn.current_player = (turn.current_player + 1) % t.state.players.len().max(1);
    if turn.current_player == 0 {
        turn.round += 1;
    }

    t.events.push(EventKind::TurnEnded { player_id: ending });
    t.events.push(EventKind::TurnStarted {
        player_id: t.state.current_player_id(),
    });
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{self, RuleViolation};
    use crate::testing::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_input_state_is_untouched() {
        let state = new_state(3, 1);
        let v = first_vertex(&state);
        let before = state.clone();
        let t = place_settlement(&state, 0, v).unwrap();

        assert_eq!(state, before);
        assert!(t.state.board.structure_at(&v).is_some());
    }

    #[test]
    fn test_setup_settlement_is_free_and_main_costs() {
        let state = new_state(3, 2);
        let v = first_vertex(&state);
        let t = place_settlement(&state, 0, v).unwrap();
        assert!(t.state.players[0].resources.is_empty());
        assert_eq!(t.state.turn.setup_step, SetupStep::FirstRoad);

        let mut state = new_state(3, 2);
        start_main_phase(&mut state);
        state.players[0].resources = ResourceCount::with_amounts(2, 2, 2, 2, 2);
        let t = place_settlement(&state, 0, v).unwrap();
        assert_eq!(
            t.state.players[0].resources,
            ResourceCount::with_amounts(1, 1, 1, 1, 2)
        );
    }

    #[test]
    fn test_second_setup_settlement_grants_adjacent_resources() {
        let mut state = new_state(3, 3);
        state.turn.setup_round = 2;
        state.turn.setup_step = SetupStep::SecondSettlement;
        let v = first_vertex(&state);

        let mut expected = ResourceCount::new();
        for tile in &state.board.vertex(&v).unwrap().adjacent_tiles {
            if let Some(r) = state.board.tile(tile).unwrap().resource() {
                expected.add(r, 1);
            }
        }

        let t = place_settlement(&state, 0, v).unwrap();
        assert_eq!(t.state.players[0].resources, expected);
        assert_eq!(t.state.turn.setup_step, SetupStep::SecondRoad);
    }

    #[test]
    fn test_snake_order_for_three_players() {
        let mut state = new_state(3, 4);
        let mut order = Vec::new();
        let mut avoid = Vec::new();

        while state.turn.phase == Phase::Setup {
            let seat = state.current_player_id();
            order.push(seat);
            let v = far_vertex(&state, &avoid);
            avoid.push(v);
            state = place_settlement(&state, seat, v).unwrap().state;
            let edge = state.board.vertex(&v).unwrap().adjacent_edges[0];
            let t = place_road(&state, seat, edge).unwrap();
            state = t.state;
        }

        assert_eq!(order, vec![0, 1, 2, 2, 1, 0]);
        assert_eq!(state.turn.phase, Phase::Main);
        assert_eq!(state.turn.current_player, 0);
        assert_eq!(state.turn.round, 1);
    }

    #[test]
    fn test_seven_flags_discards() {
        let mut state = new_state(3, 5);
        start_main_phase(&mut state);
        state.players[1].resources = ResourceCount::with_amounts(2, 2, 2, 2, 0);
        state.players[2].resources = ResourceCount::with_amounts(2, 2, 2, 1, 0);

        // Find a seed position that rolls a 7
        let mut rng = RandomSource::from_seed(0);
        let t = loop {
            let t = roll_dice(&state, &mut rng).unwrap();
            if t.state.turn.dice_total() == Some(7) {
                break t;
            }
        };

        assert_eq!(t.state.turn.phase, Phase::RobberDiscard);
        assert_eq!(t.state.turn.must_discard, vec![1]);

        let after = discard(&t.state, 1, &ResourceCount::with_amounts(2, 2, 0, 0, 0)).unwrap();
        assert_eq!(after.state.turn.phase, Phase::RobberPlacement);
        assert!(after.state.turn.must_discard.is_empty());
        assert_eq!(after.state.players[1].resources.total(), 4);
    }

    #[test]
    fn test_monopoly_takes_everything() {
        let mut state = new_state(4, 6);
        start_main_phase(&mut state);
        state.turn.has_rolled = true;
        state.players[0].dev_cards.push(DevCard {
            kind: DevCardKind::Monopoly,
            bought_this_turn: false,
        });
        state.players[0].resources.add(Resource::Wheat, 1);
        state.players[1].resources.add(Resource::Wheat, 3);
        state.players[2].resources.add(Resource::Wheat, 2);
        state.players[3].resources.add(Resource::Ore, 2);

        let t = play_monopoly(&state, 0, Resource::Wheat).unwrap();
        assert_eq!(t.state.players[0].resources.get(Resource::Wheat), 6);
        for p in &t.state.players[1..] {
            assert_eq!(p.resources.get(Resource::Wheat), 0);
        }
        assert_eq!(t.state.players[3].resources.get(Resource::Ore), 2);
        assert!(t.state.players[0].dev_cards.is_empty());
        assert_eq!(t.state.players[0].dev_cards_played_this_turn, 1);
    }

    #[test]
    fn test_knight_moves_robber_and_steals_one_unit() {
        let mut state = new_state(3, 7);
        start_main_phase(&mut state);
        state.turn.has_rolled = true;
        state.players[0].dev_cards.push(DevCard {
            kind: DevCardKind::Knight,
            bought_this_turn: false,
        });
        let tile = producing_tile(&state);
        let v = state.board.tile_vertices(&tile)[0];
        put_settlement(&mut state, 1, v);
        state.players[1].resources = ResourceCount::with_amounts(0, 1, 0, 0, 2);

        let mut rng = RandomSource::from_seed(1);
        let t = play_knight(&state, &mut rng, 0, tile, Some(1)).unwrap();

        assert_eq!(t.state.board.robber_tile(), Some(tile));
        assert_eq!(t.state.players[0].knights_played, 1);
        assert_eq!(t.state.players[0].resources.total(), 1);
        assert_eq!(t.state.players[1].resources.total(), 2);
        assert!(t
            .events
            .iter()
            .any(|e| matches!(e, EventKind::PlayerStole { victim_id: 1, .. })));
    }

    #[test]
    fn test_road_building_places_two_free_roads() {
        let mut state = new_state(3, 8);
        start_main_phase(&mut state);
        state.turn.has_rolled = true;
        state.players[0].dev_cards.push(DevCard {
            kind: DevCardKind::RoadBuilding,
            bought_this_turn: false,
        });
        let edges: Vec<EdgeId> = state.board.edges().map(|e| e.id).take(2).collect();

        let t = play_road_building(&state, 0, edges[0], Some(edges[1])).unwrap();
        assert_eq!(t.state.players[0].roads, edges);
        assert!(t.state.players[0].resources.is_empty());
    }

    #[test]
    fn test_end_turn_advances_seat_and_round() {
        let mut state = new_state(3, 9);
        start_main_phase(&mut state);
        state.turn.has_rolled = true;
        state.players[0].dev_cards.push(DevCard {
            kind: DevCardKind::Knight,
            bought_this_turn: true,
        });

        let mut rounds = Vec::new();
        for _ in 0..3 {
            state.turn.has_rolled = true;
            state = end_turn(&state).unwrap().state;
            rounds.push((state.turn.current_player, state.turn.round));
        }
        assert_eq!(rounds, vec![(1, 1), (2, 1), (0, 2)]);
        assert!(!state.turn.has_rolled);
        assert!(state.players[0].has_playable(DevCardKind::Knight));
    }

    #[test]
    fn test_bank_trade_reports_both_sides() {
        let mut state = new_state(3, 11);
        start_main_phase(&mut state);
        state.turn.has_rolled = true;
        state.players[0].resources = ResourceCount::single(Resource::Wood, 4);
        let give = ResourceCount::single(Resource::Wood, 4);
        let get = ResourceCount::single(Resource::Ore, 1);

        let t = trade_with_bank(&state, 0, &give, &get).unwrap();
        assert_eq!(t.state.players[0].resources, get);
        assert_eq!(
            t.events,
            vec![
                EventKind::TradeWithBank {
                    player_id: 0,
                    gave: give,
                    received: get
                },
                EventKind::ResourcesLost {
                    player_id: 0,
                    resources: give,
                    reason: LossReason::Trade
                },
                EventKind::ResourcesGained {
                    player_id: 0,
                    resources: get,
                    reason: GainReason::Trade
                },
            ]
        );
    }

    #[test]
    fn test_one_dev_card_per_turn() {
        let mut state = new_state(3, 12);
        start_main_phase(&mut state);
        state.turn.has_rolled = true;
        for kind in [DevCardKind::Monopoly, DevCardKind::YearOfPlenty] {
            state.players[0].dev_cards.push(DevCard {
                kind,
                bought_this_turn: false,
            });
        }

        state = play_monopoly(&state, 0, Resource::Wheat).unwrap().state;
        assert_eq!(
            rules::can_play_dev_card(&state, 0, DevCardKind::YearOfPlenty),
            Err(RuleViolation::DevCardAlreadyPlayed)
        );

        // Back to the same seat a rotation later
        for _ in 0..3 {
            state.turn.has_rolled = true;
            state = end_turn(&state).unwrap().state;
        }
        state.turn.has_rolled = true;
        assert_eq!(state.players[0].dev_cards_played_this_turn, 0);
        assert_eq!(
            rules::can_play_dev_card(&state, 0, DevCardKind::YearOfPlenty),
            Ok(())
        );
    }

    #[test]
    fn test_missing_vertex_is_invariant_violation() {
        let state = new_state(3, 10);
        let err = place_settlement(&state, 0, VertexId::new(5, 5)).unwrap_err();
        assert!(matches!(err, GameError::Invariant(_)));
    }
}
