use thiserror::Error;

use crate::collisions::ScorePolicy;
use crate::level::Level;
use crate::player::Player;
use crate::types::{Direction, MatchOutcome, MatchSummary};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("a match needs at least one registered player")]
    EmptyRoster,
    #[error("a level needs at least one player start square")]
    NoStartSquares,
}

/// A match: one level plus a fixed, non-empty player roster and the
/// match-owned scoring policy.
///
/// The roster never changes after construction. A death leaving health on
/// the table pauses the level so the controller can await the death
/// animation, revive and resume; the match is only lost once every player is
/// out of health.
pub struct Game {
    level: Level,
    scoring: Box<dyn ScorePolicy>,
    outcome: Option<MatchOutcome>,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("level", &self.level)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

impl Game {
    pub fn new(
        players: Vec<Player>,
        mut level: Level,
        scoring: Box<dyn ScorePolicy>,
    ) -> Result<Self, GameError> {
        if players.is_empty() {
            return Err(GameError::EmptyRoster);
        }
        for player in players {
            level.register_player(player);
        }
        Ok(Self {
            level,
            scoring,
            outcome: None,
        })
    }

    pub fn single_player(
        player: Player,
        level: Level,
        scoring: Box<dyn ScorePolicy>,
    ) -> Result<Self, GameError> {
        Self::new(vec![player], level, scoring)
    }

    pub fn players(&self) -> &[Player] {
        self.level.players()
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn level_mut(&mut self) -> &mut Level {
        &mut self.level
    }

    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.outcome
    }

    pub fn is_in_progress(&self) -> bool {
        self.level.is_in_progress()
    }

    /// Starts or resumes play, provided the match is undecided, someone is
    /// alive and there are pellets left to win.
    pub fn start(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        if self.level.is_any_player_alive() && self.level.remaining_pellets() > 0 {
            self.level.start();
        }
    }

    pub fn stop(&mut self) {
        self.level.stop();
    }

    pub fn move_player(&mut self, player_id: &str, direction: Direction) {
        if !self.level.is_in_progress() {
            return;
        }
        self.level.move_player(player_id, direction);
        if let Some(player) = self.level.player_mut(player_id) {
            self.scoring.player_moved(player, direction);
        }
        self.update_outcome();
    }

    pub fn step(&mut self, dt_ms: u64) {
        if !self.level.is_in_progress() {
            return;
        }
        self.level.tick(dt_ms);
        self.update_outcome();
    }

    fn update_outcome(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        if self.level.remaining_pellets() == 0 {
            self.outcome = Some(MatchOutcome::Won);
            self.level.stop();
            return;
        }
        if self.level.is_any_player_alive() {
            return;
        }
        if self.level.players().iter().all(|p| p.hp() <= 0) {
            self.outcome = Some(MatchOutcome::Lost);
        }
        // paused, not lost: the controller awaits the death animation and
        // revives whoever still has health
        self.level.stop();
    }

    pub fn summary(&self) -> MatchSummary {
        MatchSummary {
            outcome: self.outcome,
            elapsed_ms: self.level.elapsed_ms(),
            remaining_pellets: self.level.remaining_pellets(),
            players: self.level.players().iter().map(Player::view).collect(),
            ghosts: self.level.ghosts().iter().map(|g| g.view()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::collisions::{
        DefaultHealthPolicy, DefaultScorePolicy, HealthPolicy, PlayerCollisions, ScorePolicy,
    };
    use crate::ghosts::Ghost;
    use crate::level::Level;
    use crate::player::Player;
    use crate::types::{Cell, Direction, GhostType, MatchOutcome};
    use crate::world::parse_map;

    use super::{Game, GameError};

    const STATIONARY_DELAY_MS: u64 = 1_000_000;

    fn collisions() -> PlayerCollisions {
        PlayerCollisions::new(Box::new(DefaultScorePolicy), Box::new(DefaultHealthPolicy))
    }

    fn level_from(map_text: &str, ghosts: Vec<Ghost>) -> Level {
        let map = parse_map(map_text).expect("valid map");
        Level::new(
            map.world,
            ghosts,
            map.pellet_cells,
            map.player_starts,
            collisions(),
            42,
        )
        .expect("level builds")
    }

    fn stationary_ghost(cell: Cell) -> Ghost {
        Ghost::with_cadence("ghost_1", GhostType::Wanderer, cell, STATIONARY_DELAY_MS, 0)
    }

    #[test]
    fn empty_roster_is_rejected() {
        let level = level_from("####\n#P.#\n####", Vec::new());
        let error = Game::new(Vec::new(), level, Box::new(DefaultScorePolicy))
            .expect_err("no players");
        assert_eq!(error, GameError::EmptyRoster);
    }

    #[test]
    fn single_player_roster_is_fixed() {
        let level = level_from("####\n#P.#\n####", Vec::new());
        let game = Game::single_player(Player::new("p1"), level, Box::new(DefaultScorePolicy))
            .expect("game builds");
        assert_eq!(game.players().len(), 1);
        assert_eq!(game.players()[0].id(), "p1");
        assert_eq!(game.players().len(), 1);
        assert_eq!(game.players()[0].id(), "p1");
    }

    #[test]
    fn eating_the_last_pellet_wins() {
        let level = level_from("####\n#P.#\n####", Vec::new());
        let mut game = Game::single_player(Player::new("p1"), level, Box::new(DefaultScorePolicy))
            .expect("game builds");
        game.start();
        assert!(game.is_in_progress());
        game.move_player("p1", Direction::East);
        assert_eq!(game.outcome(), Some(MatchOutcome::Won));
        assert!(!game.is_in_progress());
        assert_eq!(game.players()[0].score(), 10);
    }

    #[test]
    fn won_match_does_not_restart() {
        let level = level_from("####\n#P.#\n####", Vec::new());
        let mut game = Game::single_player(Player::new("p1"), level, Box::new(DefaultScorePolicy))
            .expect("game builds");
        game.start();
        game.move_player("p1", Direction::East);
        game.start();
        assert!(!game.is_in_progress());
    }

    #[test]
    fn lethal_collisions_drive_the_full_death_flow() {
        let ghost = stationary_ghost(Cell { x: 3, y: 1 });
        let level = level_from("######\n#P G.#\n######", vec![ghost]);
        let mut game = Game::single_player(Player::new("p1"), level, Box::new(DefaultScorePolicy))
            .expect("game builds");
        game.start();

        game.move_player("p1", Direction::East);
        game.move_player("p1", Direction::East);
        assert_eq!(game.players()[0].hp(), 2);
        assert!(game.players()[0].is_alive());

        game.move_player("p1", Direction::West);
        game.move_player("p1", Direction::East);
        assert_eq!(game.players()[0].hp(), 1);

        game.move_player("p1", Direction::West);
        game.move_player("p1", Direction::East);
        let player = &game.players()[0];
        assert_eq!(player.hp(), 0);
        assert!(!player.is_alive());
        assert_eq!(player.killer(), Some("ghost_1"));
        assert!(!player.death_animation().is_finished());
        assert_eq!(game.outcome(), Some(MatchOutcome::Lost));
        assert!(!game.is_in_progress());
    }

    #[test]
    fn death_with_remaining_hp_pauses_for_revive() {
        struct SuddenDeath;
        impl HealthPolicy for SuddenDeath {
            fn ghost_damage(&self, _ghost: &Ghost) -> i32 {
                1
            }
            fn lethal_after(&self, _hp: i32) -> bool {
                true
            }
        }

        let map = parse_map("######\n#P G.#\n######").expect("valid map");
        let level = Level::new(
            map.world,
            vec![stationary_ghost(Cell { x: 3, y: 1 })],
            map.pellet_cells,
            map.player_starts,
            PlayerCollisions::new(Box::new(DefaultScorePolicy), Box::new(SuddenDeath)),
            42,
        )
        .expect("level builds");
        let mut game = Game::single_player(Player::new("p1"), level, Box::new(DefaultScorePolicy))
            .expect("game builds");
        game.start();

        game.move_player("p1", Direction::East);
        game.move_player("p1", Direction::East);
        assert!(!game.players()[0].is_alive());
        assert_eq!(game.players()[0].hp(), 2);
        assert!(game.outcome().is_none());
        assert!(!game.is_in_progress());

        game.level_mut()
            .player_mut("p1")
            .expect("registered player")
            .revive();
        game.start();
        assert!(game.is_in_progress());
        assert!(game.players()[0].is_alive());
    }

    #[tokio::test]
    async fn controller_awaits_the_death_animation() {
        let ghost = stationary_ghost(Cell { x: 2, y: 1 });
        let level = level_from("#####\n#PG.#\n#####", vec![ghost]);
        let mut game = Game::single_player(Player::new("p1"), level, Box::new(DefaultScorePolicy))
            .expect("game builds");
        game.start();

        for _ in 0..3 {
            game.move_player("p1", Direction::East);
            game.move_player("p1", Direction::West);
        }
        let player = game.level_mut().player_mut("p1").expect("registered player");
        assert!(!player.is_alive());
        let completer = player.death_animation_mut().take_completer().expect("pending run");
        let signal = player.death_animation().signal();

        let finisher = tokio::spawn(async move {
            completer.finish();
        });
        assert!(signal.wait().await);
        finisher.await.expect("finisher task");

        let player = game.level_mut().player_mut("p1").expect("registered player");
        player.revive();
        assert!(!player.is_alive());
    }

    #[test]
    fn move_hook_routes_through_match_scoring_policy() {
        struct StepBonus;
        impl ScorePolicy for StepBonus {
            fn pellet_points(&self, pellet_value: i32) -> i32 {
                pellet_value
            }
            fn ghost_points(&self, _ghost: &Ghost) -> i32 {
                0
            }
            fn player_moved(&self, player: &mut Player, _direction: Direction) {
                player.add_points(1);
            }
        }

        let level = level_from("#####\n#P..#\n#####", Vec::new());
        let mut game = Game::single_player(Player::new("p1"), level, Box::new(StepBonus))
            .expect("game builds");
        game.start();
        game.move_player("p1", Direction::East);
        // pellet value plus the per-move bonus
        assert_eq!(game.players()[0].score(), 11);
    }
}
