//! Rule validation.
//!
//! Every `can_*` function is a pure predicate over a state snapshot: it returns
//! `Ok(())` when the action is legal and a [`RuleViolation`] naming the reason
//! otherwise. Validators never mutate; executors assume their validator passed.

use crate::actions::{ActionKind, GameAction};
use crate::board::{PlayerId, Resource, StructureKind};
use crate::hex::{EdgeId, TileId, VertexId};
use crate::machine::MachineState;
use crate::player::{costs, DevCardKind, PlayerState, ResourceCount};
use crate::player::{MAX_CITIES, MAX_ROADS, MAX_SETTLEMENTS};
use crate::state::{GameState, Phase};
use thiserror::Error;

/// Why an action was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("Player not found")]
    PlayerNotFound,

    #[error("Target player not found")]
    TargetNotFound,

    #[error("Invalid vertex")]
    InvalidVertex,

    #[error("Invalid edge")]
    InvalidEdge,

    #[error("Invalid hex for robber")]
    InvalidTile,

    #[error("Not your turn")]
    NotYourTurn,

    #[error("Cannot {action} while {state}")]
    ActionNotAllowed {
        action: ActionKind,
        state: MachineState,
    },

    #[error("Cannot {0} during setup")]
    DuringSetup(&'static str),

    #[error("Insufficient resources for {0}")]
    InsufficientResources(&'static str),

    // ==================== Building ====================
    #[error("Vertex is already occupied")]
    VertexOccupied,

    #[error("Too close to another settlement (distance rule)")]
    DistanceRule,

    #[error("Already placed settlement for this setup round")]
    SetupSettlementPlaced,

    #[error("Place a road next, not a settlement")]
    SetupRoadExpected,

    #[error("Place a settlement next, not a road")]
    SetupSettlementExpected,

    #[error("No connecting road to this vertex")]
    NoConnectingRoad,

    #[error("Maximum settlements reached")]
    MaxSettlements,

    #[error("Maximum cities reached")]
    MaxCities,

    #[error("Maximum roads reached")]
    MaxRoads,

    #[error("No settlement at this vertex")]
    NoSettlement,

    #[error("Settlement belongs to another player")]
    NotYourSettlement,

    #[error("Edge already has a road")]
    EdgeOccupied,

    #[error("Already placed road for this setup round")]
    SetupRoadPlaced,

    #[error("Road must connect to your settlement")]
    RoadNotAtSettlement,

    #[error("Road must connect to your network")]
    RoadNotConnected,

    // ==================== Development Cards ====================
    #[error("Development card deck is empty")]
    DeckEmpty,

    #[error("You don't have a {} card", .0.name())]
    MissingDevCard(DevCardKind),

    #[error("Already played a development card this turn")]
    DevCardAlreadyPlayed,

    #[error("Road Building needs two different edges")]
    SameEdgeTwice,

    // ==================== Dice & Robber ====================
    #[error("Must roll dice first")]
    MustRollFirst,

    #[error("Dice already rolled this turn")]
    AlreadyRolled,

    #[error("Robber can only be moved after rolling a 7")]
    NotRobberPlacement,

    #[error("Robber is already on this hex")]
    RobberAlreadyThere,

    #[error("Cannot steal from yourself")]
    StealFromSelf,

    #[error("Target player has no resources")]
    TargetHasNoResources,

    #[error("Target player has no structures on this hex")]
    TargetNotOnTile,

    #[error("Not in discard phase")]
    NotDiscardPhase,

    #[error("You do not need to discard")]
    NoDiscardOwed,

    #[error("Must discard exactly {0} resources")]
    WrongDiscardAmount(u32),

    #[error("Trying to discard resources you don't have")]
    DiscardExceedsHand,

    // ==================== Trading ====================
    #[error("Bank trades must be single resource type for single type")]
    TradeShape,

    #[error("Bank trades give you exactly 1 resource")]
    TradeGetAmount,

    #[error("Cannot trade a resource for itself")]
    TradeSameResource,

    #[error("Invalid trade ratio. You need {0}:1 for this resource")]
    TradeRatio(u32),

    // ==================== Turn Management ====================
    #[error("Cannot end turn during robber discard phase")]
    EndTurnDuringDiscard,

    #[error("Cannot end turn during robber placement phase")]
    EndTurnDuringPlacement,

    #[error("Must roll dice before ending turn")]
    MustRollBeforeEnd,
}

fn player(state: &GameState, id: PlayerId) -> Result<&PlayerState, RuleViolation> {
    state.player(id).ok_or(RuleViolation::PlayerNotFound)
}

fn ensure_current(state: &GameState, id: PlayerId) -> Result<(), RuleViolation> {
    if state.current_player_id() != id {
        return Err(RuleViolation::NotYourTurn);
    }
    Ok(())
}

fn ensure_affordable(
    player: &PlayerState,
    cost: &ResourceCount,
    item: &'static str,
) -> Result<(), RuleViolation> {
    if !player.resources.can_afford(cost) {
        return Err(RuleViolation::InsufficientResources(item));
    }
    Ok(())
}

/// Validate any action for `actor`
pub fn check(state: &GameState, actor: PlayerId, action: &GameAction) -> Result<(), RuleViolation> {
    match action {
        GameAction::RollDice => can_roll_dice(state, actor),
        GameAction::PlaceSettlement { vertex } => can_place_settlement(state, actor, vertex),
        GameAction::PlaceCity { vertex } => can_place_city(state, actor, vertex),
        GameAction::PlaceRoad { edge } => can_place_road(state, actor, edge),
        GameAction::BuyDevCard => can_buy_dev_card(state, actor),
        GameAction::PlayKnight { tile, target } => can_play_knight(state, actor, tile, *target),
        GameAction::PlayRoadBuilding { first, second } => {
            can_play_road_building(state, actor, first, second.as_ref())
        }
        GameAction::PlayYearOfPlenty { .. } => {
            can_play_dev_card(state, actor, DevCardKind::YearOfPlenty)
        }
        GameAction::PlayMonopoly { .. } => can_play_dev_card(state, actor, DevCardKind::Monopoly),
        GameAction::Discard { player, resources } => can_discard(state, *player, resources),
        GameAction::MoveRobber { tile, target } => can_move_robber(state, actor, tile, *target),
        GameAction::TradeWithBank { give, get } => can_trade_with_bank(state, actor, give, get),
        GameAction::EndTurn => can_end_turn(state, actor),
    }
}

// ==================== Dice ====================

pub fn can_roll_dice(state: &GameState, id: PlayerId) -> Result<(), RuleViolation> {
    player(state, id)?;
    if state.is_setup() {
        return Err(RuleViolation::DuringSetup("roll dice"));
    }
    ensure_current(state, id)?;
    if state.turn.has_rolled {
        return Err(RuleViolation::AlreadyRolled);
    }
    Ok(())
}

// ==================== Building ====================

pub fn can_place_settlement(
    state: &GameState,
    id: PlayerId,
    vertex_id: &VertexId,
) -> Result<(), RuleViolation> {
    let player = player(state, id)?;
    let vertex = state
        .board
        .vertex(vertex_id)
        .ok_or(RuleViolation::InvalidVertex)?;

    if vertex.structure.is_some() {
        return Err(RuleViolation::VertexOccupied);
    }
    if !state.board.satisfies_distance_rule(vertex_id) {
        return Err(RuleViolation::DistanceRule);
    }

    if state.is_setup() {
        if !state.turn.setup_step.places_settlement() {
            return Err(RuleViolation::SetupRoadExpected);
        }
        if player.structure_count() >= state.turn.setup_round as usize {
            return Err(RuleViolation::SetupSettlementPlaced);
        }
        return Ok(());
    }

    if !state.board.has_adjacent_road(vertex_id, id) {
        return Err(RuleViolation::NoConnectingRoad);
    }
    ensure_affordable(player, &costs::settlement(), "settlement")?;
    if player.settlements.len() >= MAX_SETTLEMENTS {
        return Err(RuleViolation::MaxSettlements);
    }
    Ok(())
}

pub fn can_place_city(
    state: &GameState,
    id: PlayerId,
    vertex_id: &VertexId,
) -> Result<(), RuleViolation> {
    let player = player(state, id)?;
    if state.is_setup() {
        return Err(RuleViolation::DuringSetup("build cities"));
    }
    let vertex = state
        .board
        .vertex(vertex_id)
        .ok_or(RuleViolation::InvalidVertex)?;

    match vertex.structure {
        Some(s) if s.kind == StructureKind::Settlement && s.owner == id => {}
        Some(s) if s.kind == StructureKind::Settlement => {
            return Err(RuleViolation::NotYourSettlement)
        }
        _ => return Err(RuleViolation::NoSettlement),
    }

    ensure_affordable(player, &costs::city(), "city")?;
    if player.cities.len() >= MAX_CITIES {
        return Err(RuleViolation::MaxCities);
    }
    Ok(())
}

pub fn can_place_road(
    state: &GameState,
    id: PlayerId,
    edge_id: &EdgeId,
) -> Result<(), RuleViolation> {
    let player = player(state, id)?;
    let edge = state.board.edge(edge_id).ok_or(RuleViolation::InvalidEdge)?;

    if edge.road.is_some() {
        return Err(RuleViolation::EdgeOccupied);
    }

    if state.is_setup() {
        if state.turn.setup_step.places_settlement() {
            return Err(RuleViolation::SetupSettlementExpected);
        }
        if player.roads.len() >= state.turn.setup_round as usize {
            return Err(RuleViolation::SetupRoadPlaced);
        }
        let touches_last = player
            .settlements
            .last()
            .is_some_and(|last| edge.vertices.contains(last));
        if !touches_last {
            return Err(RuleViolation::RoadNotAtSettlement);
        }
        return Ok(());
    }

    if !state.board.is_connected_to_network(edge_id, id) {
        return Err(RuleViolation::RoadNotConnected);
    }
    ensure_affordable(player, &costs::road(), "road")?;
    if player.roads.len() >= MAX_ROADS {
        return Err(RuleViolation::MaxRoads);
    }
    Ok(())
}

// ==================== Development Cards ====================

pub fn can_buy_dev_card(state: &GameState, id: PlayerId) -> Result<(), RuleViolation> {
    let player = player(state, id)?;
    if state.is_setup() {
        return Err(RuleViolation::DuringSetup("buy development cards"));
    }
    if state.dev_card_deck.is_empty() {
        return Err(RuleViolation::DeckEmpty);
    }
    ensure_affordable(player, &costs::development_card(), "development card")
}

/// Checks shared by every played card
pub fn can_play_dev_card(
    state: &GameState,
    id: PlayerId,
    kind: DevCardKind,
) -> Result<(), RuleViolation> {
    let player = player(state, id)?;
    if state.is_setup() {
        return Err(RuleViolation::DuringSetup("play development cards"));
    }
    ensure_current(state, id)?;
    if !player.has_playable(kind) {
        return Err(RuleViolation::MissingDevCard(kind));
    }
    if kind != DevCardKind::VictoryPoint && player.dev_cards_played_this_turn > 0 {
        return Err(RuleViolation::DevCardAlreadyPlayed);
    }
    if !state.turn.has_rolled {
        return Err(RuleViolation::MustRollFirst);
    }
    Ok(())
}

pub fn can_play_knight(
    state: &GameState,
    id: PlayerId,
    tile: &TileId,
    target: Option<PlayerId>,
) -> Result<(), RuleViolation> {
    can_play_dev_card(state, id, DevCardKind::Knight)?;
    check_robber_move(state, id, tile, target)
}

pub fn can_play_road_building(
    state: &GameState,
    id: PlayerId,
    first: &EdgeId,
    second: Option<&EdgeId>,
) -> Result<(), RuleViolation> {
    can_play_dev_card(state, id, DevCardKind::RoadBuilding)?;
    let player = player(state, id)?;

    let edge = state.board.edge(first).ok_or(RuleViolation::InvalidEdge)?;
    if edge.road.is_some() {
        return Err(RuleViolation::EdgeOccupied);
    }
    if let Some(second) = second {
        if second == first {
            return Err(RuleViolation::SameEdgeTwice);
        }
        let edge = state.board.edge(second).ok_or(RuleViolation::InvalidEdge)?;
        if edge.road.is_some() {
            return Err(RuleViolation::EdgeOccupied);
        }
    }
    if player.roads.len() >= MAX_ROADS {
        return Err(RuleViolation::MaxRoads);
    }
    Ok(())
}

// ==================== Robber ====================

fn check_robber_move(
    state: &GameState,
    id: PlayerId,
    tile_id: &TileId,
    target: Option<PlayerId>,
) -> Result<(), RuleViolation> {
    let tile = state.board.tile(tile_id).ok_or(RuleViolation::InvalidTile)?;
    if tile.has_robber {
        return Err(RuleViolation::RobberAlreadyThere);
    }

    let Some(target) = target else {
        return Ok(());
    };
    let victim = state.player(target).ok_or(RuleViolation::TargetNotFound)?;
    if target == id {
        return Err(RuleViolation::StealFromSelf);
    }
    if victim.resources.is_empty() {
        return Err(RuleViolation::TargetHasNoResources);
    }
    if !state.board.players_on_tile(tile_id).contains(&target) {
        return Err(RuleViolation::TargetNotOnTile);
    }
    Ok(())
}

pub fn can_move_robber(
    state: &GameState,
    id: PlayerId,
    tile: &TileId,
    target: Option<PlayerId>,
) -> Result<(), RuleViolation> {
    player(state, id)?;
    if state.turn.phase != Phase::RobberPlacement {
        return Err(RuleViolation::NotRobberPlacement);
    }
    ensure_current(state, id)?;
    check_robber_move(state, id, tile, target)
}

pub fn can_discard(
    state: &GameState,
    id: PlayerId,
    resources: &ResourceCount,
) -> Result<(), RuleViolation> {
    let player = player(state, id)?;
    if state.turn.phase != Phase::RobberDiscard {
        return Err(RuleViolation::NotDiscardPhase);
    }
    if !state.turn.must_discard.contains(&id) {
        return Err(RuleViolation::NoDiscardOwed);
    }

    let required = player.resources.total() / 2;
    if resources.total() != required {
        return Err(RuleViolation::WrongDiscardAmount(required));
    }
    if !player.resources.can_afford(resources) {
        return Err(RuleViolation::DiscardExceedsHand);
    }
    Ok(())
}

// ==================== Trading ====================

pub fn can_trade_with_bank(
    state: &GameState,
    id: PlayerId,
    give: &ResourceCount,
    get: &ResourceCount,
) -> Result<(), RuleViolation> {
    let player = player(state, id)?;
    if state.is_setup() {
        return Err(RuleViolation::DuringSetup("trade"));
    }
    ensure_current(state, id)?;
    if !state.turn.has_rolled {
        return Err(RuleViolation::MustRollFirst);
    }
    ensure_affordable(player, give, "trade")?;

    let (give_kinds, get_kinds) = (give.kinds(), get.kinds());
    let ([give_resource], [get_resource]) = (give_kinds.as_slice(), get_kinds.as_slice()) else {
        return Err(RuleViolation::TradeShape);
    };
    if get.get(*get_resource) != 1 {
        return Err(RuleViolation::TradeGetAmount);
    }
    if give_resource == get_resource {
        return Err(RuleViolation::TradeSameResource);
    }

    let ratio = best_trade_ratio(state, id, *give_resource);
    if give.get(*give_resource) != ratio {
        return Err(RuleViolation::TradeRatio(ratio));
    }
    Ok(())
}

/// Best bank ratio for giving `resource`: 2 with a matching port, 3 with a
/// generic port, 4 otherwise
pub fn best_trade_ratio(state: &GameState, id: PlayerId, resource: Resource) -> u32 {
    state.board.best_trade_ratio(id, resource)
}

// ==================== Turn Management ====================

pub fn can_end_turn(state: &GameState, id: PlayerId) -> Result<(), RuleViolation> {
    player(state, id)?;
    ensure_current(state, id)?;
    match state.turn.phase {
        Phase::Setup => Err(RuleViolation::DuringSetup("end turn")),
        Phase::RobberDiscard => Err(RuleViolation::EndTurnDuringDiscard),
        Phase::RobberPlacement => Err(RuleViolation::EndTurnDuringPlacement),
        Phase::Main | Phase::GameOver if !state.turn.has_rolled => {
            Err(RuleViolation::MustRollBeforeEnd)
        }
        Phase::Main | Phase::GameOver => Ok(()),
    }
}
