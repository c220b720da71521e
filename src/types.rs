use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Declaration order; movement policies enumerate candidates in this order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostType {
    Chaser,
    Ambusher,
    Patrol,
    Pincer,
    Wanderer,
}

/// Which kind of unit is asking the board for access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitKind {
    Player,
    Ghost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    Won,
    Lost,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    pub hp: i32,
    pub alive: bool,
    pub score: i32,
    pub killer: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    #[serde(rename = "type")]
    pub ghost_type: GhostType,
}

#[derive(Clone, Debug, Serialize)]
pub struct MatchSummary {
    pub outcome: Option<MatchOutcome>,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
    #[serde(rename = "remainingPellets")]
    pub remaining_pellets: usize,
    pub players: Vec<PlayerView>,
    pub ghosts: Vec<GhostView>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LevelEvent {
    PelletEaten {
        x: i32,
        y: i32,
        by: String,
        points: i32,
    },
    PlayerDowned {
        #[serde(rename = "playerId")]
        player_id: String,
        by: String,
    },
}
