//! Settlers - a rules engine for a hex-board settlement and trading game
//!
//! This crate provides the core game logic for 3-4 players, including:
//! - Hex geometry and board topology with vertex/edge adjacency
//! - Rule validation for every player action
//! - Pure state transitions with a seeded random stream
//! - Victory points, longest road and largest army scoring
//! - An append-only event log with subscriptions
//!
//! # Architecture
//!
//! Every accepted action produces a fresh [`GameState`] snapshot. A seed plus
//! the sequence of actions reproduces a game exactly.
//!
//! # Modules
//!
//! - [`hex`]: Axial coordinates and the canonical vertex, edge and tile ids
//! - [`board`]: Board generation, adjacency and production
//! - [`player`]: Player state, resources and development cards
//! - [`state`]: Configuration and the full state snapshot
//! - [`rules`]: Rule validation
//! - [`executor`]: State transitions
//! - [`scoring`]: Victory points and special titles
//! - [`machine`]: Turn phases and action dispatch
//! - [`events`]: Event records and the event log
//! - [`game`]: The game facade
//! - [`stats`]: Statistics over the event log

pub mod actions;
pub mod board;
pub mod events;
pub mod executor;
pub mod game;
pub mod hex;
pub mod machine;
pub mod player;
pub mod random;
pub mod rules;
pub mod scoring;
pub mod state;
pub mod stats;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use actions::{ActionKind, GameAction};
pub use board::{Board, Edge, Port, PortKind, PlayerId, Resource, Tile, TileKind, Vertex};
pub use events::{EventKind, GainReason, GameEvent, LossReason, SubscriptionId};
pub use game::{Game, GameError};
pub use hex::{EdgeId, HexCoord, TileId, VertexId};
pub use machine::MachineState;
pub use player::{DevCard, DevCardKind, PlayerColor, PlayerState, ResourceCount};
pub use rules::RuleViolation;
pub use state::{GameConfig, GameState, Phase, SetupStep};
pub use stats::{GameStatistics, PlayerStatistics, StatsError};
