//! Post-game statistics folded from the event log.

use crate::board::PlayerId;
use crate::events::{EventKind, GainReason, GameEvent, LossReason};
use crate::player::{DevCardKind, ResourceCount};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("No game started event found")]
    MissingGameStarted,
}

/// Per-player totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatistics {
    pub player_id: PlayerId,
    pub total_resources_gained: u32,
    pub total_resources_lost: u32,
    pub resources_gained: ResourceCount,
    pub resources_lost: ResourceCount,
    pub settlements_built: u32,
    pub cities_built: u32,
    pub roads_built: u32,
    pub dev_cards_bought: u32,
    pub dev_cards_played: u32,
    pub dev_cards_by_type: BTreeMap<DevCardKind, u32>,
    pub times_rolled: u32,
    pub total_dice_value: u32,
    pub average_dice_roll: f64,
    pub times_stolen: u32,
    pub times_stole_from_others: u32,
    pub resources_stolen: u32,
    pub resources_lost_to_robber: u32,
    pub bank_trades: u32,
    pub turns_played: u32,
    pub final_victory_points: u32,
}

impl PlayerStatistics {
    fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            ..Self::default()
        }
    }
}

/// Whole-game summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatistics {
    pub total_turns: u32,
    pub winner: Option<PlayerId>,
    pub player_stats: BTreeMap<PlayerId, PlayerStatistics>,
    pub longest_road_holder: Option<PlayerId>,
    pub largest_army_holder: Option<PlayerId>,
    pub total_events: usize,
    /// Milliseconds from game start to game end, or to now if still running
    pub game_duration_ms: u64,
}

impl GameStatistics {
    /// Players ordered by final points, highest first
    pub fn ranking(&self) -> Vec<(PlayerId, u32)> {
        let mut ranking: Vec<(PlayerId, u32)> = self
            .player_stats
            .values()
            .map(|p| (p.player_id, p.final_victory_points))
            .collect();
        ranking.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranking
    }
}

/// Fold an event log into statistics.
///
/// Events naming players absent from `GameStarted` are ignored.
pub fn calculate(events: &[GameEvent]) -> Result<GameStatistics, StatsError> {
    let start = events
        .iter()
        .find(|e| matches!(e.kind, EventKind::GameStarted { .. }))
        .ok_or(StatsError::MissingGameStarted)?;
    let EventKind::GameStarted { player_ids, .. } = &start.kind else {
        return Err(StatsError::MissingGameStarted);
    };

    let mut players: BTreeMap<PlayerId, PlayerStatistics> = player_ids
        .iter()
        .map(|id| (*id, PlayerStatistics::new(*id)))
        .collect();

    let mut total_turns = 0;
    let mut winner = None;
    let mut end_timestamp = None;
    let mut longest_road_holder = None;
    let mut largest_army_holder = None;

    for event in events {
        total_turns = total_turns.max(event.turn_number);

        match &event.kind {
            EventKind::TurnStarted { player_id } => {
                if let Some(p) = players.get_mut(player_id) {
                    p.turns_played += 1;
                }
            }
            EventKind::DiceRolled {
                player_id, total, ..
            } => {
                if let Some(p) = players.get_mut(player_id) {
                    p.times_rolled += 1;
                    p.total_dice_value += u32::from(*total);
                    p.average_dice_roll = f64::from(p.total_dice_value) / f64::from(p.times_rolled);
                }
            }
            EventKind::ResourcesGained {
                player_id,
                resources,
                reason,
            } => {
                if let Some(p) = players.get_mut(player_id) {
                    p.total_resources_gained += resources.total();
                    p.resources_gained.add_count(resources);
                    if *reason == GainReason::Stolen {
                        p.resources_stolen += resources.total();
                    }
                }
            }
            EventKind::ResourcesLost {
                player_id,
                resources,
                reason,
            } => {
                if let Some(p) = players.get_mut(player_id) {
                    p.total_resources_lost += resources.total();
                    p.resources_lost.add_count(resources);
                    if *reason == LossReason::Robber {
                        p.resources_lost_to_robber += resources.total();
                    }
                }
            }
            EventKind::SettlementBuilt { player_id, .. } => {
                if let Some(p) = players.get_mut(player_id) {
                    p.settlements_built += 1;
                }
            }
            EventKind::CityBuilt { player_id, .. } => {
                if let Some(p) = players.get_mut(player_id) {
                    p.cities_built += 1;
                }
            }
            EventKind::RoadBuilt { player_id, .. } => {
                if let Some(p) = players.get_mut(player_id) {
                    p.roads_built += 1;
                }
            }
            EventKind::DevCardBought {
                player_id,
                card_type,
            } => {
                if let Some(p) = players.get_mut(player_id) {
                    p.dev_cards_bought += 1;
                    *p.dev_cards_by_type.entry(*card_type).or_default() += 1;
                }
            }
            EventKind::DevCardPlayed { player_id, .. } => {
                if let Some(p) = players.get_mut(player_id) {
                    p.dev_cards_played += 1;
                }
            }
            EventKind::PlayerStole {
                stealer_id,
                victim_id,
                ..
            } => {
                if let Some(p) = players.get_mut(stealer_id) {
                    p.times_stole_from_others += 1;
                }
                if let Some(p) = players.get_mut(victim_id) {
                    p.times_stolen += 1;
                }
            }
            EventKind::TradeWithBank { player_id, .. } => {
                if let Some(p) = players.get_mut(player_id) {
                    p.bank_trades += 1;
                }
            }
            EventKind::LongestRoadChanged { player_id, .. } => longest_road_holder = *player_id,
            EventKind::LargestArmyChanged { player_id, .. } => largest_army_holder = *player_id,
            EventKind::GameEnded {
                winner_id,
                final_scores,
            } => {
                winner = Some(*winner_id);
                end_timestamp = Some(event.timestamp);
                for score in final_scores {
                    if let Some(p) = players.get_mut(&score.player_id) {
                        p.final_victory_points = score.victory_points;
                    }
                }
            }
            _ => {}
        }
    }

    let end = end_timestamp.unwrap_or_else(now_millis);

    Ok(GameStatistics {
        total_turns,
        winner,
        player_stats: players,
        longest_road_holder,
        largest_army_holder,
        total_events: events.len(),
        game_duration_ms: end.saturating_sub(start.timestamp),
    })
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Resource;
    use crate::events::{EventLog, FinalScore};
    use pretty_assertions::assert_eq;

    fn started_log() -> EventLog {
        let mut log = EventLog::new();
        log.record(
            1,
            EventKind::GameStarted {
                player_ids: vec![0, 1, 2],
                seed: 5,
            },
        );
        log
    }

    #[test]
    fn test_missing_game_started() {
        let mut log = EventLog::new();
        log.record(1, EventKind::TurnStarted { player_id: 0 });
        assert_eq!(calculate(log.events()), Err(StatsError::MissingGameStarted));
    }

    #[test]
    fn test_dice_and_theft_totals() {
        let mut log = started_log();
        log.record(
            1,
            EventKind::DiceRolled {
                player_id: 0,
                dice1: 3,
                dice2: 4,
                total: 7,
            },
        );
        log.record(
            2,
            EventKind::DiceRolled {
                player_id: 0,
                dice1: 1,
                dice2: 1,
                total: 2,
            },
        );
        log.record(
            2,
            EventKind::PlayerStole {
                stealer_id: 0,
                victim_id: 2,
                resource: Resource::Ore,
            },
        );
        log.record(
            2,
            EventKind::ResourcesGained {
                player_id: 0,
                resources: ResourceCount::single(Resource::Ore, 1),
                reason: GainReason::Stolen,
            },
        );

        let stats = calculate(log.events()).unwrap();
        let p0 = &stats.player_stats[&0];
        assert_eq!(p0.times_rolled, 2);
        assert_eq!(p0.total_dice_value, 9);
        assert_eq!(p0.average_dice_roll, 4.5);
        assert_eq!(p0.resources_stolen, 1);
        assert_eq!(p0.times_stole_from_others, 1);
        assert_eq!(stats.player_stats[&2].times_stolen, 1);
        assert_eq!(stats.total_turns, 2);
        assert_eq!(stats.total_events, 5);
        assert_eq!(stats.winner, None);
    }

    #[test]
    fn test_game_end_sets_scores_and_ranking() {
        let mut log = started_log();
        log.record(
            9,
            EventKind::GameEnded {
                winner_id: 2,
                final_scores: vec![
                    FinalScore {
                        player_id: 0,
                        victory_points: 6,
                    },
                    FinalScore {
                        player_id: 1,
                        victory_points: 8,
                    },
                    FinalScore {
                        player_id: 2,
                        victory_points: 10,
                    },
                ],
            },
        );

        let stats = calculate(log.events()).unwrap();
        assert_eq!(stats.winner, Some(2));
        assert_eq!(stats.ranking(), vec![(2, 10), (1, 8), (0, 6)]);
    }
}
