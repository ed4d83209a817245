//! The game facade.
//!
//! [`Game`] owns the canonical [`GameState`], the seeded [`RandomSource`] and the
//! [`EventLog`]. Every command funnels through [`Game::apply`]: the machine
//! validates and produces the next snapshot, its events are recorded, and only
//! then does the snapshot replace the current one. A rejected command leaves
//! everything untouched.

use crate::actions::{ActionKind, GameAction};
use crate::board::{PlayerId, Resource};
use crate::events::{EventKind, EventLog, GameEvent, SubscriptionId};
use crate::hex::{EdgeId, TileId, VertexId};
use crate::machine;
use crate::player::{PlayerState, ResourceCount};
use crate::random::RandomSource;
use crate::rules::RuleViolation;
use crate::state::{GameConfig, GameState, Phase, MAX_PLAYERS, MIN_PLAYERS};
use crate::stats::{self, GameStatistics, StatsError};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info};

/// Errors surfaced by the game facade
#[derive(Debug, Error)]
pub enum GameError {
    /// The action broke a game rule; nothing changed
    #[error(transparent)]
    Rule(#[from] RuleViolation),

    /// Internal inconsistency; indicates a bug in the engine
    #[error("Invariant violated: {0}")]
    Invariant(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Export failed: {0}")]
    Export(#[from] serde_json::Error),
}

impl GameError {
    pub(crate) fn invariant(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        error!(%detail, "invariant violated");
        GameError::Invariant(detail)
    }

    /// The rule violation behind this error, if any
    pub fn rule(&self) -> Option<&RuleViolation> {
        match self {
            GameError::Rule(violation) => Some(violation),
            _ => None,
        }
    }
}

/// Full game record: seed, every event and the final snapshot
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GameExport<'a> {
    seed: u64,
    events: &'a [GameEvent],
    final_state: &'a GameState,
}

/// A running game
#[derive(Debug)]
pub struct Game {
    state: GameState,
    rng: RandomSource,
    log: EventLog,
}

impl Game {
    /// Start a new game for 3 or 4 named players
    pub fn new(player_names: Vec<String>, config: GameConfig) -> Result<Self, GameError> {
        let count = player_names.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&count) {
            return Err(GameError::Config(format!(
                "{count} players; a game needs {MIN_PLAYERS} to {MAX_PLAYERS}"
            )));
        }
        if config.victory_points_to_win == 0 {
            return Err(GameError::Config(
                "victory point target must be positive".into(),
            ));
        }

        let mut rng = RandomSource::new(config.seed);
        let state = GameState::new(&player_names, config, &mut rng);
        let mut log = EventLog::new();
        log.record(
            state.turn.round,
            EventKind::GameStarted {
                player_ids: state.players.iter().map(|p| p.id).collect(),
                seed: rng.seed(),
            },
        );

        info!(seed = rng.seed(), players = count, "game created");
        Ok(Self { state, rng, log })
    }

    // ==================== Commands ====================

    /// Apply any action. The acting player is the current player, except for
    /// discards, which name their own player.
    pub fn apply(&mut self, action: GameAction) -> Result<(), GameError> {
        let actor = self.actor_for(&action);

        let transition = match machine::dispatch(&self.state, &mut self.rng, actor, &action) {
            Ok(transition) => transition,
            Err(err) => {
                debug!(player = actor, action = %action.kind(), %err, "action rejected");
                return Err(err);
            }
        };

        let was_over = self.state.is_game_over();
        let turn_number = transition.state.turn.round;
        for kind in transition.events {
            self.log.record(turn_number, kind);
        }
        self.state = transition.state;

        debug!(player = actor, action = %action.kind(), "action applied");
        if let (false, Some(winner)) = (was_over, self.state.winner) {
            info!(winner, round = turn_number, "game over");
        }
        Ok(())
    }

    pub fn roll_dice(&mut self) -> Result<(), GameError> {
        self.apply(GameAction::RollDice)
    }

    pub fn place_settlement(&mut self, vertex: VertexId) -> Result<(), GameError> {
        self.apply(GameAction::PlaceSettlement { vertex })
    }

    pub fn place_city(&mut self, vertex: VertexId) -> Result<(), GameError> {
        self.apply(GameAction::PlaceCity { vertex })
    }

    pub fn place_road(&mut self, edge: EdgeId) -> Result<(), GameError> {
        self.apply(GameAction::PlaceRoad { edge })
    }

    pub fn buy_dev_card(&mut self) -> Result<(), GameError> {
        self.apply(GameAction::BuyDevCard)
    }

    pub fn play_knight(&mut self, tile: TileId, target: Option<PlayerId>) -> Result<(), GameError> {
        self.apply(GameAction::PlayKnight { tile, target })
    }

    pub fn play_road_building(
        &mut self,
        first: EdgeId,
        second: Option<EdgeId>,
    ) -> Result<(), GameError> {
        self.apply(GameAction::PlayRoadBuilding { first, second })
    }

    pub fn play_year_of_plenty(
        &mut self,
        first: Resource,
        second: Resource,
    ) -> Result<(), GameError> {
        self.apply(GameAction::PlayYearOfPlenty { first, second })
    }

    pub fn play_monopoly(&mut self, resource: Resource) -> Result<(), GameError> {
        self.apply(GameAction::PlayMonopoly { resource })
    }

    pub fn discard_resources(
        &mut self,
        player: PlayerId,
        resources: ResourceCount,
    ) -> Result<(), GameError> {
        self.apply(GameAction::Discard { player, resources })
    }

    pub fn move_robber(&mut self, tile: TileId, target: Option<PlayerId>) -> Result<(), GameError> {
        self.apply(GameAction::MoveRobber { tile, target })
    }

    pub fn trade_with_bank(
        &mut self,
        give: ResourceCount,
        get: ResourceCount,
    ) -> Result<(), GameError> {
        self.apply(GameAction::TradeWithBank { give, get })
    }

    pub fn end_turn(&mut self) -> Result<(), GameError> {
        self.apply(GameAction::EndTurn)
    }

    // ==================== Queries ====================

    /// Read-only snapshot of the current state
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn current_player(&self) -> Option<&PlayerState> {
        self.state.current_player()
    }

    pub fn current_phase(&self) -> Phase {
        self.state.turn.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.state.winner
    }

    /// The seed that reproduces this game
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Check an action against the current state without applying it
    pub fn can_perform(&self, action: &GameAction) -> Result<(), RuleViolation> {
        machine::check(&self.state, self.actor_for(action), action)
    }

    /// Action kinds the current player may attempt, or the discard when the
    /// current player owes one
    pub fn available_actions(&self) -> Vec<ActionKind> {
        machine::available_actions(&self.state, self.state.current_player_id())
    }

    pub fn players_who_must_discard(&self) -> &[PlayerId] {
        &self.state.turn.must_discard
    }

    /// Whether the engine is waiting on this player
    pub fn player_needs_to_act(&self, player: PlayerId) -> bool {
        match self.state.turn.phase {
            Phase::GameOver => false,
            Phase::RobberDiscard => self.state.turn.must_discard.contains(&player),
            _ => self.state.current_player_id() == player,
        }
    }

    /// Every event recorded so far, oldest first
    pub fn history(&self) -> &[GameEvent] {
        self.log.events()
    }

    pub fn statistics(&self) -> Result<GameStatistics, StatsError> {
        stats::calculate(self.log.events())
    }

    // ==================== Events ====================

    /// Deliver every future event to `callback`
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.log.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.log.unsubscribe(id)
    }

    /// Render the seed, the full event log and the final state as pretty JSON
    pub fn export(&self) -> Result<String, GameError> {
        let export = GameExport {
            seed: self.seed(),
            events: self.log.events(),
            final_state: &self.state,
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    // ==================== Helper Methods ====================

    fn actor_for(&self, action: &GameAction) -> PlayerId {
        match action {
            GameAction::Discard { player, .. } => *player,
            _ => self.state.current_player_id(),
        }
    }
}
