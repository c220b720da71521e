use thiserror::Error;

use crate::types::{Cell, Direction, UnitKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Floor,
    /// Ghost-house gate: ghosts pass, players do not.
    Door,
}

/// The tile board. Navigation wraps at the edges, so every square has a
/// neighbor in every direction.
#[derive(Clone, Debug)]
pub struct World {
    width: i32,
    height: i32,
    tiles: Vec<Vec<Tile>>,
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("map has no rows")]
    Empty,
    #[error("row {line} is {found} tiles wide, expected {expected}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown tile {glyph:?} at line {line}, column {column}")]
    UnknownTile {
        glyph: char,
        line: usize,
        column: usize,
    },
}

#[derive(Clone, Debug)]
pub struct ParsedMap {
    pub world: World,
    pub pellet_cells: Vec<Cell>,
    pub player_starts: Vec<Cell>,
    pub ghost_starts: Vec<Cell>,
}

impl World {
    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn tile(&self, cell: Cell) -> Tile {
        let x = cell.x.rem_euclid(self.width);
        let y = cell.y.rem_euclid(self.height);
        self.tiles[y as usize][x as usize]
    }

    pub fn neighbor(&self, cell: Cell, direction: Direction) -> Cell {
        let (dx, dy) = direction.delta();
        Cell {
            x: (cell.x + dx).rem_euclid(self.width),
            y: (cell.y + dy).rem_euclid(self.height),
        }
    }

    pub fn is_accessible(&self, cell: Cell, unit: UnitKind) -> bool {
        match self.tile(cell) {
            Tile::Floor => true,
            Tile::Door => unit == UnitKind::Ghost,
            Tile::Wall => false,
        }
    }

    /// Manhattan distance on the wrapping board.
    pub fn distance(&self, a: Cell, b: Cell) -> i32 {
        let dx = (a.x - b.x).abs();
        let dy = (a.y - b.y).abs();
        dx.min(self.width - dx) + dy.min(self.height - dy)
    }
}

pub fn parse_map(text: &str) -> Result<ParsedMap, MapError> {
    let rows: Vec<&str> = text.lines().filter(|line| !line.is_empty()).collect();
    if rows.is_empty() {
        return Err(MapError::Empty);
    }

    let expected = rows[0].chars().count();
    let mut tiles = Vec::with_capacity(rows.len());
    let mut pellet_cells = Vec::new();
    let mut player_starts = Vec::new();
    let mut ghost_starts = Vec::new();

    for (y, row) in rows.iter().enumerate() {
        let glyphs: Vec<char> = row.chars().collect();
        if glyphs.len() != expected {
            return Err(MapError::RaggedRow {
                line: y + 1,
                expected,
                found: glyphs.len(),
            });
        }
        let mut tile_row = Vec::with_capacity(expected);
        for (x, glyph) in glyphs.iter().enumerate() {
            let cell = Cell {
                x: x as i32,
                y: y as i32,
            };
            let tile = match glyph {
                '#' => Tile::Wall,
                ' ' => Tile::Floor,
                '-' => Tile::Door,
                '.' => {
                    pellet_cells.push(cell);
                    Tile::Floor
                }
                'P' => {
                    player_starts.push(cell);
                    Tile::Floor
                }
                'G' => {
                    ghost_starts.push(cell);
                    Tile::Floor
                }
                _ => {
                    return Err(MapError::UnknownTile {
                        glyph: *glyph,
                        line: y + 1,
                        column: x + 1,
                    })
                }
            };
            tile_row.push(tile);
        }
        tiles.push(tile_row);
    }

    Ok(ParsedMap {
        world: World {
            width: expected as i32,
            height: rows.len() as i32,
            tiles,
        },
        pellet_cells,
        player_starts,
        ghost_starts,
    })
}
