//! Headless settlers game runner.
//!
//! Plays a seeded game with a scripted driver and writes the JSON export.

use anyhow::Context;
use settlers_core::{Game, GameConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod driver;

use driver::Driver;

/// Runner settings read from the environment
struct Settings {
    seed: Option<u64>,
    players: usize,
    max_turns: u32,
    victory_points: Option<u32>,
    output: Option<String>,
}

impl Settings {
    fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            seed: parse_var("SETTLERS_SEED")?,
            players: parse_var("SETTLERS_PLAYERS")?.unwrap_or(4),
            max_turns: parse_var("SETTLERS_TURNS")?.unwrap_or(500),
            victory_points: parse_var("SETTLERS_VP_TARGET")?,
            output: std::env::var("SETTLERS_OUTPUT").ok(),
        })
    }
}

fn parse_var<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .with_context(|| format!("invalid {name}: {value:?}")),
        Err(_) => Ok(None),
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;

    let mut config = GameConfig {
        seed: settings.seed,
        ..GameConfig::default()
    };
    if let Some(target) = settings.victory_points {
        config.victory_points_to_win = target;
    }

    let names = (1..=settings.players).map(|i| format!("Player {i}")).collect();
    let mut game = Game::new(names, config)?;
    info!(seed = game.seed(), "Starting settlers simulation...");

    let turns = Driver::new(settings.max_turns).run(&mut game)?;

    let stats = game.statistics()?;
    for (player, points) in stats.ranking() {
        info!(player, points, "final score");
    }
    info!(
        turns,
        rounds = stats.total_turns,
        events = stats.total_events,
        winner = ?game.winner(),
        "simulation finished"
    );

    let export = game.export()?;
    match settings.output {
        Some(path) => {
            std::fs::write(&path, export).with_context(|| format!("writing {path}"))?;
            info!(%path, "export written");
        }
        None => println!("{export}"),
    }
    Ok(())
}
