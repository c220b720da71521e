use crate::constants::GHOST_DAMAGE;
use crate::ghosts::Ghost;
use crate::player::Player;
use crate::types::Direction;

/// Scoring strategy applied on collisions and player moves.
pub trait ScorePolicy: Send + Sync {
    fn pellet_points(&self, pellet_value: i32) -> i32;

    fn ghost_points(&self, ghost: &Ghost) -> i32;

    /// Hook invoked by the match layer after every player move.
    fn player_moved(&self, _player: &mut Player, _direction: Direction) {}
}

/// Health-adjustment strategy applied when a hostile unit hits the player.
pub trait HealthPolicy: Send + Sync {
    fn ghost_damage(&self, ghost: &Ghost) -> i32;

    /// Whether the hit that left the player at `hp` was lethal.
    fn lethal_after(&self, hp: i32) -> bool {
        hp <= 0
    }
}

pub struct DefaultScorePolicy;

impl ScorePolicy for DefaultScorePolicy {
    fn pellet_points(&self, pellet_value: i32) -> i32 {
        pellet_value
    }

    fn ghost_points(&self, ghost: &Ghost) -> i32 {
        ghost.score_impact()
    }
}

pub struct DefaultHealthPolicy;

impl HealthPolicy for DefaultHealthPolicy {
    fn ghost_damage(&self, _ghost: &Ghost) -> i32 {
        GHOST_DAMAGE
    }
}

/// Resolves what happens when two units share a square. One resolution per
/// square-entry event; staying co-located does not re-trigger it.
pub struct PlayerCollisions {
    scoring: Box<dyn ScorePolicy>,
    health: Box<dyn HealthPolicy>,
}

impl PlayerCollisions {
    pub fn new(scoring: Box<dyn ScorePolicy>, health: Box<dyn HealthPolicy>) -> Self {
        Self { scoring, health }
    }

    /// The player stepped onto a pellet; the caller removes it from the board.
    pub fn player_versus_pellet(&self, player: &mut Player, pellet_value: i32) {
        player.add_points(self.scoring.pellet_points(pellet_value));
    }

    /// The player and a hostile unit share a square, in either move order.
    pub fn player_versus_ghost(&self, player: &mut Player, ghost: &Ghost) {
        let points = self.scoring.ghost_points(ghost);
        if points != 0 {
            player.add_points(points);
        }
        player.remove_hp(self.health.ghost_damage(ghost));
        player.set_killer(Some(ghost.id().to_string()));
        if self.health.lethal_after(player.hp()) {
            player.death();
        }
    }
}
