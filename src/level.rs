use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::collisions::PlayerCollisions;
use crate::constants::PELLET_VALUE;
use crate::game::GameError;
use crate::ghosts::{random_move, Ghost, GhostRoster};
use crate::player::Player;
use crate::types::{Cell, Direction, LevelEvent, UnitKind};
use crate::world::{ParsedMap, World};

/// Owns the board, the ghost roster, the pellets and the registered players,
/// and drives per-tick movement and collision resolution. Every move and its
/// collision fallout complete before the next agent is processed, in roster
/// order, so simultaneous co-locations resolve deterministically.
pub struct Level {
    world: World,
    ghosts: Vec<Ghost>,
    pellets: BTreeMap<Cell, i32>,
    start_cells: Vec<Cell>,
    players: Vec<Player>,
    collisions: PlayerCollisions,
    rng: Pcg32,
    events: Vec<LevelEvent>,
    in_progress: bool,
    elapsed_ms: u64,
    registered: usize,
}

impl std::fmt::Debug for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Level")
            .field("world", &self.world)
            .field("ghosts", &self.ghosts)
            .field("pellets", &self.pellets)
            .field("start_cells", &self.start_cells)
            .field("players", &self.players)
            .field("rng", &self.rng)
            .field("events", &self.events)
            .field("in_progress", &self.in_progress)
            .field("elapsed_ms", &self.elapsed_ms)
            .field("registered", &self.registered)
            .finish_non_exhaustive()
    }
}

impl Level {
    pub fn new(
        world: World,
        ghosts: Vec<Ghost>,
        pellet_cells: Vec<Cell>,
        start_cells: Vec<Cell>,
        collisions: PlayerCollisions,
        seed: u64,
    ) -> Result<Self, GameError> {
        if start_cells.is_empty() {
            return Err(GameError::NoStartSquares);
        }
        let pellets = pellet_cells
            .into_iter()
            .map(|cell| (cell, PELLET_VALUE))
            .collect();
        Ok(Self {
            world,
            ghosts,
            pellets,
            start_cells,
            players: Vec::new(),
            collisions,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            in_progress: false,
            elapsed_ms: 0,
            registered: 0,
        })
    }

    /// Builds a level straight from a parsed map, cycling the default ghost
    /// roster over the map's ghost start squares.
    pub fn from_map(
        map: ParsedMap,
        collisions: PlayerCollisions,
        seed: u64,
    ) -> Result<Self, GameError> {
        let mut roster = GhostRoster::new();
        let ghosts = map
            .ghost_starts
            .iter()
            .map(|&cell| roster.spawn(cell))
            .collect();
        Self::new(
            map.world,
            ghosts,
            map.pellet_cells,
            map.player_starts,
            collisions,
            seed,
        )
    }

    /// Places the player on the next start square, cycling through them in
    /// registration order.
    pub(crate) fn register_player(&mut self, mut player: Player) {
        let cell = self.start_cells[self.registered % self.start_cells.len()];
        self.registered += 1;
        player.set_cell(cell);
        self.players.push(player);
    }

    pub fn start(&mut self) {
        self.in_progress = true;
    }

    pub fn stop(&mut self) {
        self.in_progress = false;
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player_mut(&mut self, player_id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id() == player_id)
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn pellets(&self) -> &BTreeMap<Cell, i32> {
        &self.pellets
    }

    pub fn remaining_pellets(&self) -> usize {
        self.pellets.len()
    }

    pub fn is_any_player_alive(&self) -> bool {
        self.players.iter().any(Player::is_alive)
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn drain_events(&mut self) -> Vec<LevelEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advances every ghost on its own cadence. A ghost with a 175 ms delay
    /// and a 250 ms delay ghost accumulate independently, so a single tick
    /// may move one, both or neither.
    pub fn tick(&mut self, dt_ms: u64) {
        if !self.in_progress {
            return;
        }
        self.elapsed_ms += dt_ms;
        for idx in 0..self.ghosts.len() {
            self.ghosts[idx].move_buffer += dt_ms as f32 / self.ghosts[idx].move_delay_ms() as f32;
            let mut safety = 0;
            while self.ghosts[idx].move_buffer >= 1.0 {
                self.ghosts[idx].move_buffer -= 1.0;
                safety += 1;
                if safety > 4 {
                    break;
                }
                self.advance_ghost(idx);
            }
        }
    }

    fn advance_ghost(&mut self, idx: usize) {
        let ghost = self.ghosts[idx].clone();
        let direction = ghost
            .suggested_move(&self.world, &self.players, &mut self.rng)
            .or_else(|| random_move(&ghost, &self.world, &mut self.rng));
        let Some(direction) = direction else {
            return;
        };
        let next = self.world.neighbor(ghost.cell(), direction);
        if !self.world.is_accessible(next, UnitKind::Ghost) {
            return;
        }
        self.ghosts[idx].set_cell(next);
        self.ghosts[idx].set_direction(direction);
        self.resolve_ghost_entry(idx);
    }

    fn resolve_ghost_entry(&mut self, ghost_idx: usize) {
        let cell = self.ghosts[ghost_idx].cell();
        for player_idx in 0..self.players.len() {
            if !self.players[player_idx].is_alive() {
                continue;
            }
            if self.players[player_idx].cell() != cell {
                continue;
            }
            let ghost = self.ghosts[ghost_idx].clone();
            self.collisions
                .player_versus_ghost(&mut self.players[player_idx], &ghost);
            if !self.players[player_idx].is_alive() {
                self.events.push(LevelEvent::PlayerDowned {
                    player_id: self.players[player_idx].id().to_string(),
                    by: ghost.id().to_string(),
                });
            }
        }
    }

    /// Externally driven player move. Facing always updates; the position
    /// only changes when the target square admits the player, and the entry
    /// is resolved immediately.
    pub fn move_player(&mut self, player_id: &str, direction: Direction) {
        if !self.in_progress {
            return;
        }
        let Some(idx) = self.players.iter().position(|p| p.id() == player_id) else {
            return;
        };
        if !self.players[idx].is_alive() {
            return;
        }
        self.players[idx].set_direction(direction);
        let next = self.world.neighbor(self.players[idx].cell(), direction);
        if !self.world.is_accessible(next, UnitKind::Player) {
            return;
        }
        self.players[idx].set_cell(next);
        self.resolve_player_entry(idx);
    }

    fn resolve_player_entry(&mut self, idx: usize) {
        let cell = self.players[idx].cell();
        if let Some(value) = self.pellets.remove(&cell) {
            self.collisions
                .player_versus_pellet(&mut self.players[idx], value);
            self.events.push(LevelEvent::PelletEaten {
                x: cell.x,
                y: cell.y,
                by: self.players[idx].id().to_string(),
                points: value,
            });
        }
        for ghost_idx in 0..self.ghosts.len() {
            if !self.players[idx].is_alive() {
                break;
            }
            if self.ghosts[ghost_idx].cell() != cell {
                continue;
            }
            let ghost = self.ghosts[ghost_idx].clone();
            self.collisions
                .player_versus_ghost(&mut self.players[idx], &ghost);
            if !self.players[idx].is_alive() {
                self.events.push(LevelEvent::PlayerDowned {
                    player_id: self.players[idx].id().to_string(),
                    by: ghost.id().to_string(),
                });
            }
        }
    }
}
