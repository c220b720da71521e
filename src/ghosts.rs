use rand::seq::IndexedRandom;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::constants::{
    AMBUSHER_MOVE_DELAY_MS, AMBUSH_LOOKAHEAD, CHASER_MOVE_DELAY_MS, PATROL_KEEP_HEADING_CHANCE,
    PATROL_MOVE_DELAY_MS, PINCER_MOVE_DELAY_MS, WANDERER_MOVE_DELAY_MS,
};
use crate::player::Player;
use crate::types::{Cell, Direction, GhostType, GhostView, UnitKind};
use crate::world::World;

impl GhostType {
    pub fn move_delay_ms(self) -> u64 {
        match self {
            GhostType::Chaser => CHASER_MOVE_DELAY_MS,
            GhostType::Ambusher => AMBUSHER_MOVE_DELAY_MS,
            GhostType::Patrol => PATROL_MOVE_DELAY_MS,
            GhostType::Pincer => PINCER_MOVE_DELAY_MS,
            GhostType::Wanderer => WANDERER_MOVE_DELAY_MS,
        }
    }

    pub fn score_impact(self) -> i32 {
        0
    }
}

#[derive(Clone, Debug)]
pub struct Ghost {
    id: String,
    ghost_type: GhostType,
    cell: Cell,
    direction: Direction,
    move_delay_ms: u64,
    score_impact: i32,
    pub(crate) move_buffer: f32,
}

impl Ghost {
    pub fn new(id: impl Into<String>, ghost_type: GhostType, cell: Cell) -> Self {
        Self::with_cadence(
            id,
            ghost_type,
            cell,
            ghost_type.move_delay_ms(),
            ghost_type.score_impact(),
        )
    }

    /// Identity, cadence and score impact are fixed for the ghost's lifetime.
    pub fn with_cadence(
        id: impl Into<String>,
        ghost_type: GhostType,
        cell: Cell,
        move_delay_ms: u64,
        score_impact: i32,
    ) -> Self {
        Self {
            id: id.into(),
            ghost_type,
            cell,
            direction: Direction::East,
            move_delay_ms,
            score_impact,
            move_buffer: 0.0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn ghost_type(&self) -> GhostType {
        self.ghost_type
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

    pub fn move_delay_ms(&self) -> u64 {
        self.move_delay_ms
    }

    pub fn score_impact(&self) -> i32 {
        self.score_impact
    }

    /// The archetype's own idea of the next step. `None` hands control to
    /// the constrained-random fallback.
    pub fn suggested_move(
        &self,
        world: &World,
        players: &[Player],
        rng: &mut Pcg32,
    ) -> Option<Direction> {
        match self.ghost_type {
            GhostType::Wanderer => None,
            GhostType::Patrol => {
                let ahead = world.neighbor(self.cell, self.direction);
                if world.is_accessible(ahead, UnitKind::Ghost)
                    && rng.random_bool(PATROL_KEEP_HEADING_CHANCE)
                {
                    Some(self.direction)
                } else {
                    None
                }
            }
            GhostType::Chaser => {
                let target = nearest_alive(world, self.cell, players)?;
                toward(world, self.cell, target.cell())
            }
            GhostType::Ambusher => {
                let target = nearest_alive(world, self.cell, players)?;
                let mut aim = target.cell();
                for _ in 0..AMBUSH_LOOKAHEAD {
                    aim = world.neighbor(aim, target.direction());
                }
                toward(world, self.cell, aim)
            }
            GhostType::Pincer => {
                let mut alive: Vec<&Player> =
                    players.iter().filter(|p| p.is_alive()).collect();
                if alive.is_empty() {
                    return None;
                }
                alive.sort_by_key(|p| world.distance(self.cell, p.cell()));
                let aim = if alive.len() >= 2 {
                    Cell {
                        x: (alive[0].cell().x + alive[1].cell().x) / 2,
                        y: (alive[0].cell().y + alive[1].cell().y) / 2,
                    }
                } else {
                    let back = alive[0].direction().opposite();
                    let behind = world.neighbor(alive[0].cell(), back);
                    world.neighbor(behind, back)
                };
                toward(world, self.cell, aim)
            }
        }
    }

    pub fn view(&self) -> GhostView {
        GhostView {
            id: self.id.clone(),
            x: self.cell.x,
            y: self.cell.y,
            dir: self.direction,
            ghost_type: self.ghost_type,
        }
    }
}

fn nearest_alive<'a>(world: &World, from: Cell, players: &'a [Player]) -> Option<&'a Player> {
    players
        .iter()
        .filter(|p| p.is_alive())
        .min_by_key(|p| world.distance(from, p.cell()))
}

fn toward(world: &World, from: Cell, target: Cell) -> Option<Direction> {
    let mut candidates: Vec<(Direction, i32)> = Direction::ALL
        .iter()
        .map(|&direction| {
            (
                direction,
                world.distance(world.neighbor(from, direction), target),
            )
        })
        .collect();
    candidates.sort_by_key(|(_, dist)| *dist);
    candidates
        .into_iter()
        .map(|(direction, _)| direction)
        .find(|&direction| world.is_accessible(world.neighbor(from, direction), UnitKind::Ghost))
}

/// Constrained-random movement: enumerate directions in declaration order,
/// keep those whose adjacent square admits the ghost, pick uniformly among
/// them. `None` means the ghost is shut in, which is not an error.
pub fn random_move(ghost: &Ghost, world: &World, rng: &mut Pcg32) -> Option<Direction> {
    let mut open = Vec::new();
    for direction in Direction::ALL {
        if world.is_accessible(world.neighbor(ghost.cell(), direction), UnitKind::Ghost) {
            open.push(direction);
        }
    }
    open.choose(rng).copied()
}

/// Hands out ghost archetypes in strict round-robin order and builds ghosts
/// with the archetype's cadence. A roster with no archetypes wired yields the
/// wanderer fallback instead of failing. One roster per level build; not
/// synchronized, so serialize access externally if shared across threads.
#[derive(Clone, Debug)]
pub struct GhostRoster {
    archetypes: Vec<GhostType>,
    cursor: i32,
    next_id: u64,
}

impl GhostRoster {
    pub fn new() -> Self {
        Self::with_archetypes(vec![
            GhostType::Chaser,
            GhostType::Ambusher,
            GhostType::Patrol,
            GhostType::Pincer,
        ])
    }

    pub fn with_archetypes(archetypes: Vec<GhostType>) -> Self {
        Self {
            archetypes,
            cursor: -1,
            next_id: 1,
        }
    }

    pub fn next_archetype(&mut self) -> GhostType {
        if self.archetypes.is_empty() {
            return GhostType::Wanderer;
        }
        self.cursor = (self.cursor + 1) % self.archetypes.len() as i32;
        self.archetypes[self.cursor as usize]
    }

    pub fn spawn(&mut self, cell: Cell) -> Ghost {
        let ghost_type = self.next_archetype();
        let id = format!("ghost_{}", self.next_id);
        self.next_id += 1;
        Ghost::new(id, ghost_type, cell)
    }
}

impl Default for GhostRoster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use crate::player::Player;
    use crate::types::{Cell, Direction, GhostType};
    use crate::world::parse_map;

    use super::{random_move, Ghost, GhostRoster};

    #[test]
    fn roster_cycles_archetypes_in_order() {
        let mut roster = GhostRoster::new();
        let expected = [
            GhostType::Chaser,
            GhostType::Ambusher,
            GhostType::Patrol,
            GhostType::Pincer,
            GhostType::Chaser,
            GhostType::Ambusher,
            GhostType::Patrol,
            GhostType::Pincer,
            GhostType::Chaser,
        ];
        for archetype in expected {
            assert_eq!(roster.next_archetype(), archetype);
        }
    }

    #[test]
    fn spawn_assigns_ids_and_archetype_cadence() {
        let mut roster = GhostRoster::new();
        let cell = Cell { x: 1, y: 1 };
        let first = roster.spawn(cell);
        assert_eq!(first.id(), "ghost_1");
        assert_eq!(first.ghost_type(), GhostType::Chaser);
        assert_eq!(first.move_delay_ms(), GhostType::Chaser.move_delay_ms());

        let second = roster.spawn(cell);
        assert_eq!(second.id(), "ghost_2");
        assert_eq!(second.ghost_type(), GhostType::Ambusher);
    }

    #[test]
    fn empty_roster_falls_back_to_wanderer() {
        let mut roster = GhostRoster::with_archetypes(Vec::new());
        assert_eq!(roster.next_archetype(), GhostType::Wanderer);
        let ghost = roster.spawn(Cell { x: 1, y: 1 });
        assert_eq!(ghost.ghost_type(), GhostType::Wanderer);
        assert_eq!(ghost.move_delay_ms(), 175);
        assert_eq!(ghost.score_impact(), 0);
    }

    #[test]
    fn wanderer_never_suggests() {
        let map = parse_map("#####\n#.G.#\n#####").expect("corridor");
        let ghost = Ghost::new("ghost_1", GhostType::Wanderer, map.ghost_starts[0]);
        let mut rng = Pcg32::seed_from_u64(7);
        let player = Player::new("p1");
        assert!(ghost
            .suggested_move(&map.world, &[player], &mut rng)
            .is_none());
    }

    #[test]
    fn trapped_ghost_has_no_random_move() {
        let map = parse_map("###\n#G#\n###").expect("sealed cell");
        let ghost = Ghost::new("ghost_1", GhostType::Wanderer, map.ghost_starts[0]);
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..50 {
            assert!(random_move(&ghost, &map.world, &mut rng).is_none());
        }
    }

    #[test]
    fn random_move_covers_exactly_the_open_directions() {
        let map = parse_map("#####\n#.G.#\n#####").expect("corridor");
        let ghost = Ghost::new("ghost_1", GhostType::Wanderer, map.ghost_starts[0]);
        let mut rng = Pcg32::seed_from_u64(11);
        let mut seen_east = false;
        let mut seen_west = false;
        for _ in 0..200 {
            let direction = random_move(&ghost, &map.world, &mut rng).expect("open corridor");
            match direction {
                Direction::East => seen_east = true,
                Direction::West => seen_west = true,
                other => panic!("inaccessible direction picked: {other:?}"),
            }
        }
        assert!(seen_east && seen_west);
    }

    #[test]
    fn chaser_closes_in_on_the_player() {
        let map = parse_map("#####\n#G.P#\n#####").expect("corridor");
        let ghost = Ghost::new("ghost_1", GhostType::Chaser, map.ghost_starts[0]);
        let mut player = Player::new("p1");
        player.set_cell(map.player_starts[0]);
        let mut rng = Pcg32::seed_from_u64(3);
        assert_eq!(
            ghost.suggested_move(&map.world, &[player], &mut rng),
            Some(Direction::East)
        );
    }

    #[test]
    fn chaser_ignores_dead_players() {
        let map = parse_map("#####\n#G.P#\n#####").expect("corridor");
        let ghost = Ghost::new("ghost_1", GhostType::Chaser, map.ghost_starts[0]);
        let mut player = Player::new("p1");
        player.set_cell(map.player_starts[0]);
        player.death();
        let mut rng = Pcg32::seed_from_u64(3);
        assert!(ghost
            .suggested_move(&map.world, &[player], &mut rng)
            .is_none());
    }
}
