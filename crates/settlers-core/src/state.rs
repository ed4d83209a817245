//! Game configuration and the complete state snapshot.
//!
//! A `GameState` is a plain value. Every accepted action produces a new one
//! (see [`crate::executor`]); nothing mutates a state in place once published.

use crate::board::{Board, PlayerId};
use crate::player::{DevCardKind, PlayerState};
use crate::random::RandomSource;
use serde::{Deserialize, Serialize};

/// Victory points needed to win by default
pub const DEFAULT_VICTORY_POINTS: u32 = 10;
/// Smallest supported table
pub const MIN_PLAYERS: usize = 3;
/// Largest supported table
pub const MAX_PLAYERS: usize = 4;

/// Game configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameConfig {
    pub player_count: usize,
    pub victory_points_to_win: u32,
    /// Seed for all randomness; resolved to a concrete value at game creation
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_count: MAX_PLAYERS,
            victory_points_to_win: DEFAULT_VICTORY_POINTS,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Config with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Initial placement (snake draft)
    Setup,
    /// Normal turns: roll, build, trade, play cards
    Main,
    /// A 7 was rolled and some players must discard half their hand
    RobberDiscard,
    /// The current player must move the robber
    RobberPlacement,
    GameOver,
}

/// What the current player places next during setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SetupStep {
    FirstSettlement,
    FirstRoad,
    SecondSettlement,
    SecondRoad,
}

impl SetupStep {
    pub fn places_settlement(self) -> bool {
        matches!(self, SetupStep::FirstSettlement | SetupStep::SecondSettlement)
    }
}

/// Turn bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnState {
    /// Seat index of the player to act
    pub current_player: usize,
    /// Full rotations completed plus one
    pub round: u32,
    pub phase: Phase,
    pub setup_step: SetupStep,
    /// 1 while placing forward, 2 while placing in reverse
    pub setup_round: u8,
    pub dice: Option<(u8, u8)>,
    pub has_rolled: bool,
    pub must_discard: Vec<PlayerId>,
}

impl Default for TurnState {
    fn default() -> Self {
        Self {
            current_player: 0,
            round: 1,
            phase: Phase::Setup,
            setup_step: SetupStep::FirstSettlement,
            setup_round: 1,
            dice: None,
            has_rolled: false,
            must_discard: Vec::new(),
        }
    }
}

impl TurnState {
    /// Sum of the last roll
    pub fn dice_total(&self) -> Option<u8> {
        self.dice.map(|(a, b)| a + b)
    }
}

/// The complete game state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub config: GameConfig,
    pub board: Board,
    pub players: Vec<PlayerState>,
    pub turn: TurnState,
    /// Remaining development cards; the next card bought is the last element
    pub dev_card_deck: Vec<DevCardKind>,
    pub longest_road_holder: Option<PlayerId>,
    pub largest_army_holder: Option<PlayerId>,
    pub winner: Option<PlayerId>,
}

impl GameState {
    /// Create the initial state. Board, then deck, are drawn from `rng`.
    ///
    /// The caller validates the player count.
    pub fn new(names: &[String], config: GameConfig, rng: &mut RandomSource) -> Self {
        let board = Board::generate(rng);
        let dev_card_deck = DevCardKind::shuffled_deck(rng);
        let players = names
            .iter()
            .enumerate()
            .map(|(i, name)| PlayerState::new(i as PlayerId, name.clone()))
            .collect();

        Self {
            config: GameConfig {
                player_count: names.len(),
                seed: Some(rng.seed()),
                ..config
            },
            board,
            players,
            turn: TurnState::default(),
            dev_card_deck,
            longest_road_holder: None,
            largest_army_holder: None,
            winner: None,
        }
    }

    /// Number of players at the table
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Get a player by id
    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.get(id as usize)
    }

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerState> {
        self.players.get_mut(id as usize)
    }

    /// The player whose turn it is
    pub fn current_player(&self) -> Option<&PlayerState> {
        self.players.get(self.turn.current_player)
    }

    /// Id of the player whose turn it is
    pub fn current_player_id(&self) -> PlayerId {
        self.turn.current_player as PlayerId
    }

    pub fn is_setup(&self) -> bool {
        self.turn.phase == Phase::Setup
    }

    pub fn is_game_over(&self) -> bool {
        self.turn.phase == Phase::GameOver
    }
}
