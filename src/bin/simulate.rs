use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use maze_muncher_core::collisions::{DefaultHealthPolicy, DefaultScorePolicy, PlayerCollisions};
use maze_muncher_core::constants::{DEFAULT_MAP, TICK_MS};
use maze_muncher_core::game::Game;
use maze_muncher_core::level::Level;
use maze_muncher_core::player::Player;
use maze_muncher_core::types::{Cell, Direction, LevelEvent, UnitKind};
use maze_muncher_core::world::parse_map;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde_json::json;

const PLAYER_ID: &str = "p1";
const PLAYER_MOVE_DELAY_MS: u64 = 200;
const DEATH_ANIMATION_MS: u64 = 240;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    minutes: Option<u64>,
    #[arg(long)]
    map: Option<PathBuf>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let seed = cli.seed.unwrap_or_else(|| rand::rng().random());
    let map_text = match &cli.map {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read map {}", path.display()))?,
        None => DEFAULT_MAP.to_string(),
    };
    let map = parse_map(&map_text)?;

    let collisions =
        PlayerCollisions::new(Box::new(DefaultScorePolicy), Box::new(DefaultHealthPolicy));
    let level = Level::from_map(map, collisions, seed)?;
    let mut game = Game::single_player(
        Player::new(PLAYER_ID),
        level,
        Box::new(DefaultScorePolicy),
    )?;

    println!("[simulate] seed={seed}");
    game.start();

    let mut driver_rng = Pcg32::seed_from_u64(seed.wrapping_add(0x9e37_79b9));
    let time_limit_ms = cli.minutes.unwrap_or(2) * 60 * 1000;
    let mut clock_ms = 0u64;
    let mut next_player_move_ms = 0u64;

    while clock_ms < time_limit_ms {
        if game.outcome().is_some() {
            break;
        }
        if !game.is_in_progress() {
            // paused without an outcome: a revivable death
            if !ride_out_death(&mut game).await {
                break;
            }
            game.start();
            continue;
        }

        if clock_ms >= next_player_move_ms {
            next_player_move_ms = clock_ms + PLAYER_MOVE_DELAY_MS;
            if let Some(direction) = choose_player_direction(&game, &mut driver_rng) {
                game.move_player(PLAYER_ID, direction);
            }
        }
        game.step(TICK_MS);
        clock_ms += TICK_MS;

        for event in game.level_mut().drain_events() {
            log_event(&event);
        }
    }

    let report = json!({
        "seed": seed,
        "finishedAt": Utc::now().to_rfc3339(),
        "summary": game.summary(),
    });
    let rendered = serde_json::to_string_pretty(&report)?;
    match &cli.summary_out {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("failed to write summary {}", path.display()))?;
            println!("[simulate] summary written to {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

/// Plays the death animation off-task, awaits its completion signal and
/// revives the player. Returns false when there is no health left to revive.
async fn ride_out_death(game: &mut Game) -> bool {
    let Some(player) = game.level_mut().player_mut(PLAYER_ID) else {
        return false;
    };
    if player.hp() <= 0 {
        return false;
    }
    println!(
        "[simulate] player down (hp={}, killer={})",
        player.hp(),
        player.killer().unwrap_or("?")
    );
    let Some(completer) = player.death_animation_mut().take_completer() else {
        return false;
    };
    let signal = player.death_animation().signal();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(DEATH_ANIMATION_MS)).await;
        completer.finish();
    });
    signal.wait().await;

    let Some(player) = game.level_mut().player_mut(PLAYER_ID) else {
        return false;
    };
    player.revive();
    println!("[simulate] player revived (hp={})", player.hp());
    player.is_alive()
}

/// Greedy pellet-seeking driver: prefer squares holding a pellet, close the
/// gap to the nearest one, keep a little distance from ghosts, jitter ties.
fn choose_player_direction(game: &Game, rng: &mut Pcg32) -> Option<Direction> {
    let level = game.level();
    let world = level.world();
    let me = level.players().iter().find(|p| p.id() == PLAYER_ID)?;
    if !me.is_alive() {
        return None;
    }

    let nearest_pellet: Option<Cell> = level
        .pellets()
        .keys()
        .min_by_key(|cell| world.distance(me.cell(), **cell))
        .copied();

    let mut best: Option<(Direction, f32)> = None;
    for direction in Direction::ALL {
        let next = world.neighbor(me.cell(), direction);
        if !world.is_accessible(next, UnitKind::Player) {
            continue;
        }
        let mut score = 0.0f32;
        if level.pellets().contains_key(&next) {
            score += 12.0;
        }
        if let Some(pellet) = nearest_pellet {
            score += (world.distance(me.cell(), pellet) - world.distance(next, pellet)) as f32 * 0.9;
        }
        if let Some(ghost_distance) = level
            .ghosts()
            .iter()
            .map(|ghost| world.distance(next, ghost.cell()))
            .min()
        {
            score += ghost_distance as f32 * 0.15;
        }
        score += rng.random::<f32>() * 0.4;

        if best.map(|(_, s)| score > s).unwrap_or(true) {
            best = Some((direction, score));
        }
    }
    best.map(|(direction, _)| direction)
}

fn log_event(event: &LevelEvent) {
    match event {
        LevelEvent::PelletEaten { x, y, by, points } => {
            println!("[simulate] {by} ate a pellet at ({x},{y}) for {points}");
        }
        LevelEvent::PlayerDowned { player_id, by } => {
            println!("[simulate] {player_id} downed by {by}");
        }
    }
}
