//! Game actions that players can take.
//!
//! `GameAction` is the closed set of commands accepted by the engine;
//! `ActionKind` is its field-less discriminant, used by the phase table and
//! by `available_actions`.

use crate::board::{PlayerId, Resource};
use crate::hex::{EdgeId, TileId, VertexId};
use crate::player::{DevCardKind, ResourceCount};
use serde::{Deserialize, Serialize};
use std::fmt;

/// All possible actions a player can take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameAction {
    // ==================== Turn Actions ====================
    /// Roll the dice (must be done at start of turn)
    RollDice,

    // ==================== Building Actions ====================
    /// Place a settlement; free during setup
    PlaceSettlement { vertex: VertexId },
    /// Upgrade own settlement to a city
    PlaceCity { vertex: VertexId },
    /// Place a road; free during setup
    PlaceRoad { edge: EdgeId },
    /// Buy a development card from the deck
    BuyDevCard,

    // ==================== Development Card Actions ====================
    /// Move the robber and optionally steal, counts toward largest army
    PlayKnight {
        tile: TileId,
        target: Option<PlayerId>,
    },
    /// Place up to two free roads
    PlayRoadBuilding {
        first: EdgeId,
        second: Option<EdgeId>,
    },
    /// Take two resources from the bank
    PlayYearOfPlenty { first: Resource, second: Resource },
    /// Take all of one resource from every other player
    PlayMonopoly { resource: Resource },

    // ==================== Robber Actions ====================
    /// Discard half a hand after a 7; may be sent by any flagged player
    Discard {
        player: PlayerId,
        resources: ResourceCount,
    },
    /// Move the robber after a 7 and optionally steal
    MoveRobber {
        tile: TileId,
        target: Option<PlayerId>,
    },

    // ==================== Trading Actions ====================
    /// Trade with the bank at 4:1 or a port ratio
    TradeWithBank {
        give: ResourceCount,
        get: ResourceCount,
    },

    // ==================== Turn Management ====================
    EndTurn,
}

impl GameAction {
    /// The action's discriminant
    pub fn kind(&self) -> ActionKind {
        match self {
            GameAction::RollDice => ActionKind::RollDice,
            GameAction::PlaceSettlement { .. } => ActionKind::PlaceSettlement,
            GameAction::PlaceCity { .. } => ActionKind::PlaceCity,
            GameAction::PlaceRoad { .. } => ActionKind::PlaceRoad,
            GameAction::BuyDevCard => ActionKind::BuyDevCard,
            GameAction::PlayKnight { .. } => ActionKind::PlayKnight,
            GameAction::PlayRoadBuilding { .. } => ActionKind::PlayRoadBuilding,
            GameAction::PlayYearOfPlenty { .. } => ActionKind::PlayYearOfPlenty,
            GameAction::PlayMonopoly { .. } => ActionKind::PlayMonopoly,
            GameAction::Discard { .. } => ActionKind::Discard,
            GameAction::MoveRobber { .. } => ActionKind::MoveRobber,
            GameAction::TradeWithBank { .. } => ActionKind::TradeWithBank,
            GameAction::EndTurn => ActionKind::EndTurn,
        }
    }
}

/// Field-less action discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    RollDice,
    PlaceSettlement,
    PlaceCity,
    PlaceRoad,
    BuyDevCard,
    PlayKnight,
    PlayRoadBuilding,
    PlayYearOfPlenty,
    PlayMonopoly,
    Discard,
    MoveRobber,
    TradeWithBank,
    EndTurn,
}

impl ActionKind {
    /// The dev card consumed by this action, if any
    pub fn dev_card(&self) -> Option<DevCardKind> {
        match self {
            ActionKind::PlayKnight => Some(DevCardKind::Knight),
            ActionKind::PlayRoadBuilding => Some(DevCardKind::RoadBuilding),
            ActionKind::PlayYearOfPlenty => Some(DevCardKind::YearOfPlenty),
            ActionKind::PlayMonopoly => Some(DevCardKind::Monopoly),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::RollDice => "rollDice",
            ActionKind::PlaceSettlement => "placeSettlement",
            ActionKind::PlaceCity => "placeCity",
            ActionKind::PlaceRoad => "placeRoad",
            ActionKind::BuyDevCard => "buyDevCard",
            ActionKind::PlayKnight => "playKnight",
            ActionKind::PlayRoadBuilding => "playRoadBuilding",
            ActionKind::PlayYearOfPlenty => "playYearOfPlenty",
            ActionKind::PlayMonopoly => "playMonopoly",
            ActionKind::Discard => "discardResources",
            ActionKind::MoveRobber => "moveRobber",
            ActionKind::TradeWithBank => "tradeWithBank",
            ActionKind::EndTurn => "endTurn",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
