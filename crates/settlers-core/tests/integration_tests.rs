//! Integration tests for the settlers game engine.
//!
//! These tests drive complete games through the public facade, from setup
//! through many turns, and check the rules that span several actions.

use pretty_assertions::assert_eq;
use settlers_core::*;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

fn new_game(players: usize, seed: u64) -> Game {
    let names = (0..players).map(|i| format!("Player {}", i + 1)).collect();
    Game::new(names, GameConfig::seeded(seed)).unwrap()
}

/// Run through the complete setup phase with the first legal placements.
/// Returns the seat order in which settlements were placed.
fn complete_setup(game: &mut Game) -> Vec<PlayerId> {
    let mut order = Vec::new();
    let mut iterations = 0;
    let max_iterations = 100;

    while game.current_phase() == Phase::Setup && iterations < max_iterations {
        let state = game.state();
        let action = match state.turn.setup_step {
            SetupStep::FirstSettlement | SetupStep::SecondSettlement => {
                order.push(state.current_player_id());
                state
                    .board
                    .vertices()
                    .map(|v| GameAction::PlaceSettlement { vertex: v.id })
                    .find(|a| game.can_perform(a).is_ok())
            }
            SetupStep::FirstRoad | SetupStep::SecondRoad => state
                .board
                .edges()
                .map(|e| GameAction::PlaceRoad { edge: e.id })
                .find(|a| game.can_perform(a).is_ok()),
        };

        let action = action.expect("a legal setup placement exists");
        game.apply(action).unwrap();
        iterations += 1;
    }

    assert_eq!(
        game.current_phase(),
        Phase::Main,
        "Game should complete setup within {} iterations",
        max_iterations
    );
    order
}

/// Discard half of a hand, taking resources in a fixed order
fn half_hand(hand: &ResourceCount) -> ResourceCount {
    let mut discard = ResourceCount::new();
    let mut remaining = hand.total() / 2;
    for r in Resource::ALL {
        let take = hand.get(r).min(remaining);
        discard.add(r, take);
        remaining -= take;
    }
    discard
}

/// Resolve discards and robber placement until the turn is back to normal play
fn handle_special_phases(game: &mut Game) {
    let mut iterations = 0;

    while iterations < 20 {
        match game.current_phase() {
            Phase::RobberDiscard => {
                for player in game.players_who_must_discard().to_vec() {
                    let before = game.state().player(player).unwrap().resources;
                    game.discard_resources(player, half_hand(&before)).unwrap();

                    let after = game.state().player(player).unwrap().resources;
                    assert_eq!(after.total(), before.total() - before.total() / 2);
                }
            }
            Phase::RobberPlacement => {
                let candidates: Vec<GameAction> = game
                    .state()
                    .board
                    .tiles()
                    .filter(|t| !t.has_robber)
                    .flat_map(|t| {
                        (0..4u8)
                            .map(Some)
                            .chain([None])
                            .map(move |target| GameAction::MoveRobber { tile: t.id, target })
                    })
                    .collect();
                let action = candidates
                    .into_iter()
                    .find(|a| game.can_perform(a).is_ok())
                    .expect("some robber move is legal");
                game.apply(action).unwrap();
            }
            _ => break,
        }
        iterations += 1;
    }
}

/// Try one of each build, cheapest legal location first
fn try_build(game: &mut Game) {
    let state = game.state();
    let mut candidates = Vec::new();

    if let Some(player) = state.current_player() {
        candidates.extend(
            player
                .settlements
                .iter()
                .map(|v| GameAction::PlaceCity { vertex: *v }),
        );
    }
    candidates.extend(
        state
            .board
            .vertices()
            .map(|v| GameAction::PlaceSettlement { vertex: v.id }),
    );
    candidates.extend(
        state
            .board
            .edges()
            .map(|e| GameAction::PlaceRoad { edge: e.id }),
    );
    candidates.push(GameAction::BuyDevCard);

    let mut done = Vec::new();
    for action in candidates {
        if game.is_game_over() {
            return;
        }
        if done.contains(&action.kind()) {
            continue;
        }
        if game.can_perform(&action).is_ok() {
            done.push(action.kind());
            game.apply(action).unwrap();
        }
    }
}

fn play_turn(game: &mut Game) {
    game.roll_dice().unwrap();
    handle_special_phases(game);
    if game.is_game_over() {
        return;
    }
    try_build(game);
    if !game.is_game_over() {
        game.end_turn().unwrap();
    }
}

fn assert_board_invariants(state: &GameState) {
    for vertex in state.board.vertices() {
        assert!(vertex.adjacent_vertices.len() <= 3);
        if vertex.structure.is_some() {
            for adj in &vertex.adjacent_vertices {
                assert!(
                    state.board.structure_at(adj).is_none(),
                    "structures at {} and {} are adjacent",
                    vertex.id,
                    adj
                );
            }
        }
    }
    for player in &state.players {
        assert!(player.settlements.len() <= 5);
        assert!(player.cities.len() <= 4);
        assert!(player.roads.len() <= 15);
        assert_eq!(
            player.victory_points,
            scoring::victory_points(state, player.id)
        );
    }
}

#[test]
fn test_same_seed_generates_same_board() {
    let a = new_game(4, 1234);
    let b = new_game(4, 1234);
    assert_eq!(a.state().board, b.state().board);
    assert_eq!(a.state().dev_card_deck, b.state().dev_card_deck);
}

#[test]
fn test_board_composition() {
    let game = new_game(4, 99);
    let board = &game.state().board;

    let mut kinds: BTreeMap<String, usize> = BTreeMap::new();
    for tile in board.tiles() {
        let name = match tile.kind {
            TileKind::Resource(r) => r.name().to_string(),
            TileKind::Desert => "desert".to_string(),
        };
        *kinds.entry(name).or_default() += 1;
    }
    let expected: BTreeMap<String, usize> = [
        ("wood", 4),
        ("brick", 3),
        ("sheep", 4),
        ("wheat", 4),
        ("ore", 3),
        ("desert", 1),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    assert_eq!(kinds, expected);

    let mut tokens: Vec<u8> = board.tiles().filter_map(|t| t.number).collect();
    tokens.sort_unstable();
    assert_eq!(
        tokens,
        vec![2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12]
    );

    let robber = board.robber_tile().unwrap();
    assert_eq!(board.tile(&robber).unwrap().kind, TileKind::Desert);
    assert_eq!(board.vertices().count(), 54);
    assert_eq!(board.edges().count(), 72);
}

#[test]
fn test_nine_ports() {
    let game = new_game(3, 5);
    let ports = game.state().board.ports();
    assert_eq!(ports.len(), 9);

    let generic = ports
        .iter()
        .filter(|p| p.kind == PortKind::Generic)
        .count();
    assert_eq!(generic, 4);

    let mut specific: Vec<Resource> = ports
        .iter()
        .filter_map(|p| match p.kind {
            PortKind::Specific(r) => Some(r),
            PortKind::Generic => None,
        })
        .collect();
    specific.sort();
    assert_eq!(specific, Resource::ALL.to_vec());
}

#[test]
fn test_setup_snake_order_and_initial_resources() {
    let mut game = new_game(3, 2024);
    let order = complete_setup(&mut game);
    assert_eq!(order, vec![0, 1, 2, 2, 1, 0]);

    let state = game.state();
    assert_eq!(state.current_player_id(), 0);
    assert_eq!(state.turn.round, 1);
    for player in &state.players {
        assert_eq!(player.settlements.len(), 2);
        assert_eq!(player.roads.len(), 2);
        assert_eq!(player.victory_points, 2);

        // Only the second settlement pays out, one per adjacent resource tile
        let second = state.board.vertex(&player.settlements[1]).unwrap();
        let expected = second
            .adjacent_tiles
            .iter()
            .filter_map(|t| state.board.tile(t).unwrap().resource())
            .count() as u32;
        assert_eq!(player.resources.total(), expected);
    }
    assert_board_invariants(state);
}

#[test]
fn test_setup_rejects_adjacent_settlement() {
    let mut game = new_game(4, 31);
    let vertex = game.state().board.vertices().next().unwrap().id;
    game.place_settlement(vertex).unwrap();

    let neighbor = game.state().board.vertex(&vertex).unwrap().adjacent_vertices[0];
    assert_eq!(
        game.can_perform(&GameAction::PlaceSettlement { vertex }),
        Err(RuleViolation::VertexOccupied)
    );

    let edge = game.state().board.vertex(&vertex).unwrap().adjacent_edges[0];
    game.place_road(edge).unwrap();
    assert_eq!(
        game.can_perform(&GameAction::PlaceSettlement { vertex: neighbor }),
        Err(RuleViolation::DistanceRule)
    );
}

#[test]
fn test_rejected_commands_change_nothing() {
    let mut game = new_game(3, 8);
    let before = game.state().clone();
    let events = game.history().len();

    let err = game.roll_dice().unwrap_err();
    assert!(matches!(
        err,
        GameError::Rule(RuleViolation::DuringSetup("roll dice"))
    ));
    let err = game.end_turn().unwrap_err();
    assert_eq!(err.to_string(), "Cannot end turn during setup");

    assert_eq!(game.state(), &before);
    assert_eq!(game.history().len(), events);
}

#[test]
fn test_end_turn_is_blocked_until_turn_is_resolved() {
    let mut game = new_game(4, 77);
    complete_setup(&mut game);

    assert!(matches!(
        game.end_turn(),
        Err(GameError::Rule(RuleViolation::MustRollBeforeEnd))
    ));

    let mut saw_robber_phase = false;
    for _ in 0..200 {
        game.roll_dice().unwrap();
        match game.current_phase() {
            Phase::RobberDiscard => {
                saw_robber_phase = true;
                assert!(matches!(
                    game.end_turn(),
                    Err(GameError::Rule(RuleViolation::EndTurnDuringDiscard))
                ));
            }
            Phase::RobberPlacement => {
                saw_robber_phase = true;
                assert!(matches!(
                    game.end_turn(),
                    Err(GameError::Rule(RuleViolation::EndTurnDuringPlacement))
                ));
            }
            _ => {}
        }
        handle_special_phases(&mut game);
        game.end_turn().unwrap();
        if saw_robber_phase {
            break;
        }
    }
    assert!(saw_robber_phase, "a 7 should come up within 200 rolls");
}

#[test]
fn test_round_advances_once_per_rotation() {
    let mut game = new_game(3, 11);
    complete_setup(&mut game);

    for expected_round in 1..=3 {
        for seat in 0..3 {
            assert_eq!(game.state().turn.round, expected_round);
            assert_eq!(game.state().current_player_id(), seat);
            game.roll_dice().unwrap();
            handle_special_phases(&mut game);
            game.end_turn().unwrap();
        }
    }
    assert_eq!(game.state().turn.round, 4);
}

#[test]
fn test_bank_trade_uses_best_ratio() {
    let mut game = new_game(3, 404);
    complete_setup(&mut game);

    let mut traded = false;
    for _ in 0..300 {
        game.roll_dice().unwrap();
        handle_special_phases(&mut game);

        let hand = game.current_player().unwrap().resources;
        let trade = Resource::ALL.iter().find_map(|give| {
            let get = Resource::ALL.iter().find(|r| *r != give)?;
            [2, 3, 4].into_iter().find_map(|ratio| {
                let give = ResourceCount::single(*give, ratio);
                let get = ResourceCount::single(*get, 1);
                game.can_perform(&GameAction::TradeWithBank { give, get })
                    .ok()
                    .map(|_| (give, get))
            })
        });

        if let Some((give, get)) = trade {
            // A worse ratio than the best one is refused
            let mut overpay = give;
            for r in Resource::ALL {
                if give.get(r) > 0 {
                    overpay.add(r, 1);
                }
            }
            if hand.can_afford(&overpay) {
                assert!(game
                    .can_perform(&GameAction::TradeWithBank { give: overpay, get })
                    .is_err());
            }

            game.trade_with_bank(give, get).unwrap();
            let after = game.current_player().unwrap().resources;
            assert_eq!(after.total(), hand.total() - give.total() + 1);
            traded = true;
            break;
        }
        game.end_turn().unwrap();
    }
    assert!(traded, "someone should afford a bank trade within 300 turns");
}

#[test]
fn test_subscription_stops_after_unsubscribe() {
    let mut game = new_game(3, 3);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let id = game.subscribe(move |event| sink.borrow_mut().push(event.id.clone()));

    let vertex = game.state().board.vertices().next().unwrap().id;
    game.place_settlement(vertex).unwrap();
    let delivered = seen.borrow().len();
    assert!(delivered > 0);

    assert!(game.unsubscribe(id));
    let edge = game.state().board.vertex(&vertex).unwrap().adjacent_edges[0];
    game.place_road(edge).unwrap();

    assert_eq!(seen.borrow().len(), delivered);
    assert!(game.history().len() > delivered + 1);
}

#[test]
fn test_random_game_simulation() {
    let mut game = new_game(3, 2);
    complete_setup(&mut game);

    let mut turns = 0;
    while !game.is_game_over() && turns < 400 {
        play_turn(&mut game);
        assert_board_invariants(game.state());
        turns += 1;
    }

    let stats = game.statistics().unwrap();
    assert_eq!(stats.total_events, game.history().len());
    assert_eq!(stats.winner, game.winner());
    let built: u32 = stats.player_stats.values().map(|p| p.settlements_built).sum();
    let on_board: usize = game
        .state()
        .players
        .iter()
        .map(|p| p.settlements.len() + p.cities.len())
        .sum();
    assert_eq!(built as usize, on_board);

    if game.is_game_over() {
        let winner = game.winner().unwrap();
        let points = game.state().player(winner).unwrap().victory_points;
        assert!(points >= game.state().config.victory_points_to_win);
        assert!(matches!(
            game.history().last().unwrap().kind,
            EventKind::GameEnded { .. }
        ));
        assert!(game.available_actions().is_empty());
    }
}

#[test]
fn test_same_seed_replays_identically() {
    let run = || {
        let mut game = new_game(4, 555);
        complete_setup(&mut game);
        for _ in 0..60 {
            if game.is_game_over() {
                break;
            }
            play_turn(&mut game);
        }
        let kinds: Vec<EventKind> = game.history().iter().map(|e| e.kind.clone()).collect();
        (game.state().clone(), kinds)
    };

    let (state_a, events_a) = run();
    let (state_b, events_b) = run();
    assert_eq!(state_a, state_b);
    assert_eq!(events_a, events_b);
}

#[test]
fn test_export_is_json_with_seed() {
    let mut game = new_game(3, 77);
    complete_setup(&mut game);

    let json = game.export().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["seed"], 77);
    assert_eq!(
        value["events"].as_array().unwrap().len(),
        game.history().len()
    );
    assert_eq!(value["events"][0]["type"], "gameStarted");
    assert_eq!(value["finalState"]["turn"]["phase"], "main");
}
