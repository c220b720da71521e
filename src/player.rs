use crate::animation::AnimationHandle;
use crate::constants::STARTING_HP;
use crate::types::{Cell, Direction, PlayerView};

/// The externally controlled unit.
///
/// Health and the alive flag are independent: `death` forces the flag down
/// even at positive health, and crossing zero health never flips the flag by
/// itself. Only the collision policy decides when a hit is lethal.
#[derive(Debug)]
pub struct Player {
    id: String,
    cell: Cell,
    direction: Direction,
    hp: i32,
    alive: bool,
    score: i32,
    killer: Option<String>,
    death_animation: AnimationHandle,
}

impl Player {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cell: Cell { x: 0, y: 0 },
            direction: Direction::West,
            hp: STARTING_HP,
            alive: true,
            score: 0,
            killer: None,
            death_animation: AnimationHandle::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn cell(&self) -> Cell {
        self.cell
    }

    pub(crate) fn set_cell(&mut self, cell: Cell) {
        self.cell = cell;
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub(crate) fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    /// The unit that caused the most recent death, if any.
    pub fn killer(&self) -> Option<&str> {
        self.killer.as_deref()
    }

    pub fn set_killer(&mut self, killer: Option<String>) {
        self.killer = killer;
    }

    /// Marks the player dead and restarts the death animation. May re-trigger
    /// on an already dead player; each call begins a fresh animation run.
    pub fn death(&mut self) {
        self.alive = false;
        self.death_animation.restart();
    }

    /// Brings the player back while there is health left to play with; a
    /// no-op at zero or negative health. The killer attribution is left in
    /// place.
    pub fn revive(&mut self) {
        if self.hp > 0 {
            self.alive = true;
        }
    }

    pub fn add_points(&mut self, points: i32) {
        self.score += points;
    }

    /// Plain subtraction; health has no floor and may go negative.
    pub fn remove_hp(&mut self, amount: i32) {
        self.hp -= amount;
    }

    /// Alive players show the directional walk cycle; dead players show the
    /// death animation.
    pub fn uses_death_animation(&self) -> bool {
        !self.alive
    }

    pub fn death_animation(&self) -> &AnimationHandle {
        &self.death_animation
    }

    pub fn death_animation_mut(&mut self) -> &mut AnimationHandle {
        &mut self.death_animation
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id.clone(),
            x: self.cell.x,
            y: self.cell.y,
            dir: self.direction,
            hp: self.hp,
            alive: self.alive,
            score: self.score,
            killer: self.killer.clone(),
        }
    }
}
