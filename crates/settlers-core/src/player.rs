//! Player state and resource management.
//!
//! This module contains:
//! - `PlayerState` with pieces, development cards, and titles
//! - `ResourceCount` for managing resource counts
//! - Development card types and the standard deck
//! - Building costs and piece limits

use crate::board::{PlayerId, Resource};
use crate::hex::{EdgeId, VertexId};
use crate::random::RandomSource;
use serde::{Deserialize, Serialize};

/// Settlements a player may own at once
pub const MAX_SETTLEMENTS: usize = 5;
/// Cities a player may own at once
pub const MAX_CITIES: usize = 4;
/// Roads a player may own at once
pub const MAX_ROADS: usize = 15;
/// Players holding more than this many cards discard half on a 7
pub const DISCARD_THRESHOLD: u32 = 7;

/// Player color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    Red,
    Blue,
    White,
    Orange,
}

impl PlayerColor {
    /// Get color for a seat
    pub fn for_player(id: PlayerId) -> Self {
        match id % 4 {
            0 => PlayerColor::Red,
            1 => PlayerColor::Blue,
            2 => PlayerColor::White,
            _ => PlayerColor::Orange,
        }
    }
}

/// Development card types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DevCardKind {
    /// Move robber and steal, counts toward Largest Army
    Knight,
    /// Worth 1 VP while held
    VictoryPoint,
    /// Build 2 roads for free
    RoadBuilding,
    /// Take any 2 resources from the bank
    YearOfPlenty,
    /// All players must give you all of one resource type
    Monopoly,
}

impl DevCardKind {
    /// Create the standard development card deck (25 cards), unshuffled
    pub fn standard_deck() -> Vec<DevCardKind> {
        let mut deck = Vec::with_capacity(25);
        deck.extend(std::iter::repeat(DevCardKind::Knight).take(14));
        deck.extend(std::iter::repeat(DevCardKind::VictoryPoint).take(5));
        deck.extend(std::iter::repeat(DevCardKind::RoadBuilding).take(2));
        deck.extend(std::iter::repeat(DevCardKind::YearOfPlenty).take(2));
        deck.extend(std::iter::repeat(DevCardKind::Monopoly).take(2));
        deck
    }

    /// Standard deck shuffled with the game's random stream
    pub fn shuffled_deck(rng: &mut RandomSource) -> Vec<DevCardKind> {
        let mut deck = Self::standard_deck();
        rng.shuffle(&mut deck);
        deck
    }

    /// Name used in rejection messages
    pub fn name(&self) -> &'static str {
        match self {
            DevCardKind::Knight => "knight",
            DevCardKind::VictoryPoint => "victoryPoint",
            DevCardKind::RoadBuilding => "roadBuilding",
            DevCardKind::YearOfPlenty => "yearOfPlenty",
            DevCardKind::Monopoly => "monopoly",
        }
    }
}

/// A development card in a player's hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevCard {
    pub kind: DevCardKind,
    /// Cards bought this turn cannot be played until the owner's next turn
    pub bought_this_turn: bool,
}

/// A count of each resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCount {
    pub wood: u32,
    pub brick: u32,
    pub sheep: u32,
    pub wheat: u32,
    pub ore: u32,
}

impl ResourceCount {
    /// Create an empty count
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a count with specific amounts
    pub fn with_amounts(wood: u32, brick: u32, sheep: u32, wheat: u32, ore: u32) -> Self {
        Self {
            wood,
            brick,
            sheep,
            wheat,
            ore,
        }
    }

    /// Create a count with a single resource
    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut count = Self::new();
        count.add(resource, amount);
        count
    }

    /// Total number of resource cards
    pub fn total(&self) -> u32 {
        self.wood + self.brick + self.sheep + self.wheat + self.ore
    }

    /// Check if the count is empty
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Brick => self.brick,
            Resource::Sheep => self.sheep,
            Resource::Wheat => self.wheat,
            Resource::Ore => self.ore,
        }
    }

    /// Set count of a specific resource
    pub fn set(&mut self, resource: Resource, count: u32) {
        match resource {
            Resource::Wood => self.wood = count,
            Resource::Brick => self.brick = count,
            Resource::Sheep => self.sheep = count,
            Resource::Wheat => self.wheat = count,
            Resource::Ore => self.ore = count,
        }
    }

    /// Add resources
    pub fn add(&mut self, resource: Resource, amount: u32) {
        self.set(resource, self.get(resource) + amount);
    }

    /// Add another count to this one
    pub fn add_count(&mut self, other: &ResourceCount) {
        for resource in Resource::ALL {
            self.add(resource, other.get(resource));
        }
    }

    /// Check if this count covers a cost
    pub fn can_afford(&self, cost: &ResourceCount) -> bool {
        Resource::ALL.iter().all(|&r| self.get(r) >= cost.get(r))
    }

    /// Subtract a cost, or `None` if any resource would go negative
    pub fn checked_sub(&self, cost: &ResourceCount) -> Option<ResourceCount> {
        let mut result = *self;
        for resource in Resource::ALL {
            result.set(resource, self.get(resource).checked_sub(cost.get(resource))?);
        }
        Some(result)
    }

    /// Resources with a non-zero count, in `Resource::ALL` order
    pub fn kinds(&self) -> Vec<Resource> {
        Resource::ALL
            .into_iter()
            .filter(|&r| self.get(r) > 0)
            .collect()
    }

    /// Remove one unit drawn uniformly from the multiset of held units
    pub fn take_random(&mut self, rng: &mut RandomSource) -> Option<Resource> {
        let mut available: Vec<Resource> = Vec::with_capacity(self.total() as usize);
        for resource in Resource::ALL {
            available.extend(std::iter::repeat(resource).take(self.get(resource) as usize));
        }

        let resource = *rng.choose(&available)?;
        self.set(resource, self.get(resource) - 1);
        Some(resource)
    }
}

/// Building costs
pub mod costs {
    use super::ResourceCount;

    /// Cost to build a road: 1 wood, 1 brick
    pub fn road() -> ResourceCount {
        ResourceCount::with_amounts(1, 1, 0, 0, 0)
    }

    /// Cost to build a settlement: 1 wood, 1 brick, 1 sheep, 1 wheat
    pub fn settlement() -> ResourceCount {
        ResourceCount::with_amounts(1, 1, 1, 1, 0)
    }

    /// Cost to upgrade to city: 2 wheat, 3 ore
    pub fn city() -> ResourceCount {
        ResourceCount::with_amounts(0, 0, 0, 2, 3)
    }

    /// Cost to buy a development card: 1 sheep, 1 wheat, 1 ore
    pub fn development_card() -> ResourceCount {
        ResourceCount::with_amounts(0, 0, 1, 1, 1)
    }
}

/// A single player's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    pub color: PlayerColor,
    pub resources: ResourceCount,
    /// Vertices holding this player's settlements, in build order
    pub settlements: Vec<VertexId>,
    pub cities: Vec<VertexId>,
    pub roads: Vec<EdgeId>,
    pub dev_cards: Vec<DevCard>,
    /// Knights played (for Largest Army)
    pub knights_played: u32,
    pub dev_cards_played_this_turn: u32,
    pub victory_points: u32,
    pub has_longest_road: bool,
    pub has_largest_army: bool,
}

impl PlayerState {
    /// Create a new player
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: PlayerColor::for_player(id),
            resources: ResourceCount::new(),
            settlements: Vec::new(),
            cities: Vec::new(),
            roads: Vec::new(),
            dev_cards: Vec::new(),
            knights_played: 0,
            dev_cards_played_this_turn: 0,
            victory_points: 0,
            has_longest_road: false,
            has_largest_army: false,
        }
    }

    /// Number of victory point cards held
    pub fn victory_point_cards(&self) -> u32 {
        self.dev_cards
            .iter()
            .filter(|c| c.kind == DevCardKind::VictoryPoint)
            .count() as u32
    }

    /// Whether the player holds a card of this kind that may be played now
    pub fn has_playable(&self, kind: DevCardKind) -> bool {
        self.dev_cards
            .iter()
            .any(|c| c.kind == kind && !c.bought_this_turn)
    }

    /// Remove one playable card of this kind from the hand
    pub fn remove_playable(&mut self, kind: DevCardKind) -> bool {
        match self
            .dev_cards
            .iter()
            .position(|c| c.kind == kind && !c.bought_this_turn)
        {
            Some(index) => {
                self.dev_cards.remove(index);
                true
            }
            None => false,
        }
    }

    /// Called at end of turn: cards bought this turn become playable
    pub fn ready_new_cards(&mut self) {
        for card in &mut self.dev_cards {
            card.bought_this_turn = false;
        }
    }

    /// Settlements plus cities
    pub fn structure_count(&self) -> usize {
        self.settlements.len() + self.cities.len()
    }
}
