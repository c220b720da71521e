pub const TICK_RATE: u32 = 20;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

pub const STARTING_HP: i32 = 3;
pub const PELLET_VALUE: i32 = 10;
pub const GHOST_DAMAGE: i32 = 1;

pub const CHASER_MOVE_DELAY_MS: u64 = 250;
pub const AMBUSHER_MOVE_DELAY_MS: u64 = 200;
pub const PATROL_MOVE_DELAY_MS: u64 = 250;
pub const PINCER_MOVE_DELAY_MS: u64 = 250;
pub const WANDERER_MOVE_DELAY_MS: u64 = 175;

pub const AMBUSH_LOOKAHEAD: i32 = 4;
pub const PATROL_KEEP_HEADING_CHANCE: f64 = 0.7;

/// Built-in board for the headless harness and quick experiments.
/// `#` wall, `.` pellet, space bare floor, `-` ghost door,
/// `P` player start, `G` ghost start.
pub const DEFAULT_MAP: &str = "\
###################
#P.......#.......P#
#.##.###.#.###.##.#
#.................#
#.###.##---##.###.#
#.....##GGG##.....#
#.....#######.....#
#.................#
#.##.###.#.###.##.#
#........#........#
###################";
