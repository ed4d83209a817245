//! Domain events and the append-only event log.
//!
//! Executors and scoring describe what happened as [`EventKind`] values; the
//! log stamps each one with an id, a timestamp and the round number, stores it,
//! and hands it to every live subscriber.

use crate::board::{PlayerId, Resource};
use crate::hex::{EdgeId, TileId, VertexId};
use crate::player::{DevCardKind, ResourceCount};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Why a player received resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GainReason {
    DiceRoll,
    InitialPlacement,
    Trade,
    DevCard,
    Stolen,
}

/// Why a player lost resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LossReason {
    Building,
    Trade,
    Robber,
    DevCard,
}

/// What happened, with kind-specific fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EventKind {
    GameStarted {
        player_ids: Vec<PlayerId>,
        seed: u64,
    },
    TurnStarted {
        player_id: PlayerId,
    },
    TurnEnded {
        player_id: PlayerId,
    },
    DiceRolled {
        player_id: PlayerId,
        dice1: u8,
        dice2: u8,
        total: u8,
    },
    ResourcesGained {
        player_id: PlayerId,
        resources: ResourceCount,
        reason: GainReason,
    },
    ResourcesLost {
        player_id: PlayerId,
        resources: ResourceCount,
        reason: LossReason,
    },
    ResourcesDiscarded {
        player_id: PlayerId,
        resources: ResourceCount,
    },
    SettlementBuilt {
        player_id: PlayerId,
        vertex_id: VertexId,
        is_setup: bool,
    },
    CityBuilt {
        player_id: PlayerId,
        vertex_id: VertexId,
    },
    RoadBuilt {
        player_id: PlayerId,
        edge_id: EdgeId,
        is_setup: bool,
    },
    DevCardBought {
        player_id: PlayerId,
        card_type: DevCardKind,
    },
    DevCardPlayed {
        player_id: PlayerId,
        card_type: DevCardKind,
    },
    RobberMoved {
        player_id: PlayerId,
        from: Option<TileId>,
        to: TileId,
    },
    PlayerStole {
        stealer_id: PlayerId,
        victim_id: PlayerId,
        resource: Resource,
    },
    TradeWithBank {
        player_id: PlayerId,
        gave: ResourceCount,
        received: ResourceCount,
    },
    VictoryPointsChanged {
        player_id: PlayerId,
        old_points: u32,
        new_points: u32,
    },
    LongestRoadChanged {
        player_id: Option<PlayerId>,
        road_length: u32,
    },
    LargestArmyChanged {
        player_id: Option<PlayerId>,
        army_size: u32,
    },
    GameEnded {
        winner_id: PlayerId,
        final_scores: Vec<FinalScore>,
    },
}

/// One player's points when the game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalScore {
    pub player_id: PlayerId,
    pub victory_points: u32,
}

/// A stamped, immutable log record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEvent {
    /// `evt_<n>`, sequential from 1
    pub id: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    /// Round in which the event happened
    pub turn_number: u32,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Handle returned by [`EventLog::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&GameEvent)>;

/// Append-only event history with live subscribers
#[derive(Default)]
pub struct EventLog {
    events: Vec<GameEvent>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp, store and deliver an event
    pub fn record(&mut self, turn_number: u32, kind: EventKind) -> &GameEvent {
        let event = GameEvent {
            id: format!("evt_{}", self.events.len() + 1),
            timestamp: now_millis(),
            turn_number,
            kind,
        };
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&event);
        }
        self.events.push(event);
        &self.events[self.events.len() - 1]
    }

    /// Register a callback for every future event
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Stop delivery to a subscriber. Returns false if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// All events so far, oldest first
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl fmt::Debug for EventLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLog")
            .field("events", &self.events.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}
