//! Scripted driver that plays every seat.
//!
//! At each step it walks a fixed priority list and submits the first action
//! the engine accepts: roll, resolve the robber, upgrade, settle, build a road,
//! buy a card, end the turn. There is no lookahead and no randomness of its
//! own, so a seed fully determines the game.

use settlers_core::{Game, GameAction, GameError, Phase, PlayerId, Resource, ResourceCount};
use tracing::{debug, warn};

pub struct Driver {
    max_turns: u32,
}

impl Driver {
    pub fn new(max_turns: u32) -> Self {
        Self { max_turns }
    }

    /// Play until someone wins or the turn limit is hit. Returns turns played.
    pub fn run(&self, game: &mut Game) -> Result<u32, GameError> {
        let mut turns = 0;
        // Generous cap on single actions so a stuck position cannot loop forever
        let max_steps = (self.max_turns as usize + 10) * 200;

        for _ in 0..max_steps {
            if game.is_game_over() || turns >= self.max_turns {
                break;
            }

            if game.current_phase() == Phase::RobberDiscard {
                for player in game.players_who_must_discard().to_vec() {
                    let discard = discard_for(game, player);
                    game.discard_resources(player, discard)?;
                }
                continue;
            }

            let Some(action) = self.next_action(game) else {
                warn!(phase = ?game.current_phase(), "no legal action found");
                break;
            };
            if action == GameAction::EndTurn {
                turns += 1;
            }
            debug!(?action, "driver action");
            game.apply(action)?;
        }

        Ok(turns)
    }

    /// First legal action in priority order
    pub fn next_action(&self, game: &Game) -> Option<GameAction> {
        candidates(game)
            .into_iter()
            .find(|action| game.can_perform(action).is_ok())
    }
}

fn candidates(game: &Game) -> Vec<GameAction> {
    let state = game.state();
    let mut actions = vec![GameAction::RollDice];

    // Robber: prefer a tile where someone can be robbed
    for tile in state.board.tiles().filter(|t| !t.has_robber) {
        for victim in state.board.players_on_tile(&tile.id) {
            actions.push(GameAction::MoveRobber {
                tile: tile.id,
                target: Some(victim),
            });
        }
    }
    actions.extend(
        state
            .board
            .tiles()
            .filter(|t| !t.has_robber)
            .map(|t| GameAction::MoveRobber {
                tile: t.id,
                target: None,
            }),
    );

    if let Some(player) = state.current_player() {
        actions.extend(
            player
                .settlements
                .iter()
                .map(|v| GameAction::PlaceCity { vertex: *v }),
        );
    }
    actions.extend(
        state
            .board
            .vertices()
            .map(|v| GameAction::PlaceSettlement { vertex: v.id }),
    );
    actions.extend(
        state
            .board
            .edges()
            .map(|e| GameAction::PlaceRoad { edge: e.id }),
    );
    actions.push(GameAction::BuyDevCard);
    actions.push(GameAction::EndTurn);
    actions
}

fn discard_for(game: &Game, player: PlayerId) -> ResourceCount {
    game.state()
        .player(player)
        .map(|p| half_from_largest(&p.resources))
        .unwrap_or_default()
}

/// Half of a hand, taken from the largest piles first
fn half_from_largest(hand: &ResourceCount) -> ResourceCount {
    let mut remaining = *hand;
    let mut discard = ResourceCount::new();
    for _ in 0..hand.total() / 2 {
        let Some(resource) = Resource::ALL
            .into_iter()
            .filter(|r| remaining.get(*r) > 0)
            .max_by_key(|r| remaining.get(*r))
        else {
            break;
        };
        remaining.set(resource, remaining.get(resource) - 1);
        discard.add(resource, 1);
    }
    discard
}

#[cfg(test)]
mod tests {
    use super::*;
    use settlers_core::GameConfig;

    fn new_game(seed: u64) -> Game {
        let names = vec!["A".into(), "B".into(), "C".into()];
        Game::new(names, GameConfig::seeded(seed)).unwrap()
    }

    #[test]
    fn test_driver_finishes_setup() {
        let mut game = new_game(1);
        Driver::new(0).run(&mut game).unwrap();
        assert_eq!(game.current_phase(), Phase::Setup);

        let driver = Driver::new(1);
        driver.run(&mut game).unwrap();
        assert_ne!(game.current_phase(), Phase::Setup);
        assert!(game.state().players.iter().all(|p| p.structure_count() >= 2));
    }

    #[test]
    fn test_driver_is_deterministic() {
        let mut a = new_game(9);
        let mut b = new_game(9);
        let turns_a = Driver::new(40).run(&mut a).unwrap();
        let turns_b = Driver::new(40).run(&mut b).unwrap();

        assert_eq!(turns_a, turns_b);
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn test_discard_takes_half_from_largest_piles() {
        let discard = half_from_largest(&ResourceCount::with_amounts(6, 1, 0, 1, 0));
        assert_eq!(discard, ResourceCount::single(Resource::Wood, 4));

        let discard = half_from_largest(&ResourceCount::with_amounts(2, 2, 2, 2, 1));
        assert_eq!(discard.total(), 4);
    }
}
