//! Turn and phase control.
//!
//! The machine state is derived from [`TurnState`]; the table below lists the
//! action kinds each state accepts. [`dispatch`] is the single path from an
//! action to the next state: validate, consult the table, execute, score.

use crate::actions::{ActionKind, GameAction};
use crate::board::PlayerId;
use crate::executor::{self, Transition};
use crate::game::GameError;
use crate::random::RandomSource;
use crate::rules::{self, RuleViolation};
use crate::scoring;
use crate::state::{GameState, Phase, TurnState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the turn currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MachineState {
    Setup,
    WaitingForRoll,
    RobberDiscard,
    RobberPlacement,
    Playing,
    GameOver,
}

impl MachineState {
    pub fn of(turn: &TurnState) -> Self {
        match turn.phase {
            Phase::Setup => MachineState::Setup,
            Phase::Main if turn.has_rolled => MachineState::Playing,
            Phase::Main => MachineState::WaitingForRoll,
            Phase::RobberDiscard => MachineState::RobberDiscard,
            Phase::RobberPlacement => MachineState::RobberPlacement,
            Phase::GameOver => MachineState::GameOver,
        }
    }

    /// Action kinds this state accepts
    pub fn accepted(self) -> &'static [ActionKind] {
        use ActionKind::*;
        match self {
            MachineState::Setup => &[PlaceSettlement, PlaceRoad],
            MachineState::WaitingForRoll => &[RollDice],
            MachineState::RobberDiscard => &[Discard],
            MachineState::RobberPlacement => &[MoveRobber],
            MachineState::Playing => &[
                PlaceSettlement,
                PlaceCity,
                PlaceRoad,
                BuyDevCard,
                PlayKnight,
                PlayRoadBuilding,
                PlayYearOfPlenty,
                PlayMonopoly,
                TradeWithBank,
                EndTurn,
            ],
            MachineState::GameOver => &[],
        }
    }

    pub fn accepts(self, kind: ActionKind) -> bool {
        self.accepted().contains(&kind)
    }
}

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MachineState::Setup => "in setup",
            MachineState::WaitingForRoll => "waiting for the dice roll",
            MachineState::RobberDiscard => "waiting for discards",
            MachineState::RobberPlacement => "placing the robber",
            MachineState::Playing => "playing",
            MachineState::GameOver => "the game is over",
        };
        f.write_str(text)
    }
}

/// Validate an action for `actor` without applying it.
///
/// The rule validator runs first so its specific reasons take precedence over
/// the generic table rejection.
pub fn check(state: &GameState, actor: PlayerId, action: &GameAction) -> Result<(), RuleViolation> {
    rules::check(state, actor, action)?;

    let machine = MachineState::of(&state.turn);
    let kind = action.kind();
    if !machine.accepts(kind) {
        return Err(RuleViolation::ActionNotAllowed {
            action: kind,
            state: machine,
        });
    }
    Ok(())
}

/// Validate, execute and score one action
pub fn dispatch(
    state: &GameState,
    rng: &mut RandomSource,
    actor: PlayerId,
    action: &GameAction,
) -> Result<Transition, GameError> {
    check(state, actor, action)?;

    let mut transition = executor::apply(state, rng, actor, action)?;
    let scored = scoring::settle(&mut transition.state);
    transition.events.extend(scored);
    Ok(transition)
}

/// Action kinds `player` may attempt right now
pub fn available_actions(state: &GameState, player: PlayerId) -> Vec<ActionKind> {
    let machine = MachineState::of(&state.turn);
    match machine {
        MachineState::RobberDiscard if state.turn.must_discard.contains(&player) => {
            vec![ActionKind::Discard]
        }
        MachineState::RobberDiscard => Vec::new(),
        _ if state.current_player_id() != player => Vec::new(),
        MachineState::Setup if state.turn.setup_step.places_settlement() => {
            vec![ActionKind::PlaceSettlement]
        }
        MachineState::Setup => vec![ActionKind::PlaceRoad],
        _ => machine.accepted().to_vec(),
    }
}
