/// Maze boards: parsing, the embedded default board and the wall oracle.
///
/// ## Sources (priority order):
///   1. Board file named by `[game] board` in config.toml
///   2. Built-in embedded board
///
/// ## Board format (`.txt`):
///   Optional line 1: `# Board Name` (a `#` followed by text outside the legend)
///   Lines: board rows, one character per 8 x 8 px tile, all the same length
///
/// Rows are taken verbatim: leading and trailing spaces are open tiles, which
/// is how tunnel rows reach the arena edge.
///
/// ## Tile legend:
///   '#' = Wall                   ' ' = Open
///   '.' = Small pellet           'o' = Large pellet
///   'P' = Player spawn           'G' = Ghost spawn

use std::path::Path;

use thiserror::Error;

use crate::domain::entity::Grade;
use crate::domain::grid::{Extent, Point, WallOracle, SPRITE, TILE};
use crate::domain::tile::{decode, Marker, Tile};

#[derive(Debug, Error)]
pub enum MazeError {
    #[error("board has no rows")]
    Empty,

    #[error("row {row} is {found} tiles wide, expected {expected}")]
    Ragged { row: usize, found: usize, expected: usize },

    #[error("unknown tile {ch:?} at column {col}, row {row}")]
    UnknownTile { ch: char, col: usize, row: usize },

    #[error("board has no player spawn")]
    MissingPlayer,

    #[error("second player spawn on row {0}")]
    DuplicatePlayer(usize),

    #[error("board has no ghost spawn")]
    MissingGhost,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A parsed board. Immutable once built: pellets live in the arena, the
/// board only remembers where they started.
#[derive(Clone, Debug)]
pub struct Maze {
    pub name: String,
    tiles: Vec<Vec<Tile>>,
    width: usize,
    height: usize,
    player_spawn: (usize, usize),
    ghost_spawns: Vec<(usize, usize)>,
    pellets: Vec<(Grade, (usize, usize))>,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

impl Maze {
    /// Parse a board from text. See the module docs for the format.
    pub fn parse(content: &str) -> Result<Maze, MazeError> {
        let mut name = String::new();
        let mut rows: Vec<&str> = vec![];

        for line in content.lines() {
            if rows.is_empty() && name.is_empty() && is_name_line(line) {
                name = line[1..].trim().to_string();
            } else {
                rows.push(line);
            }
        }

        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }

        if name.is_empty() {
            name = "Unnamed Board".to_string();
        }

        Maze::from_rows(name, &rows[..])
    }

    /// Read and parse a board file.
    pub fn load(path: &Path) -> Result<Maze, MazeError> {
        let content = std::fs::read_to_string(path)?;
        Maze::parse(&content)
    }

    /// The board shipped with the game.
    pub fn builtin() -> Maze {
        match Maze::from_rows("Classic".to_string(), BUILTIN) {
            Ok(maze) => maze,
            Err(e) => unreachable!("embedded board is invalid: {e}"),
        }
    }

    /// Board size in tiles.
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Arena size in pixels.
    pub fn extent(&self) -> Extent {
        (self.width as i32 * TILE, self.height as i32 * TILE)
    }

    /// Tile at `(col, row)`. Anything off the board is open.
    pub fn tile(&self, col: i32, row: i32) -> Tile {
        if col < 0 || row < 0 {
            return Tile::Open;
        }
        self.tiles
            .get(row as usize)
            .and_then(|r| r.get(col as usize))
            .copied()
            .unwrap_or_default()
    }

    /// Pixel position of the player spawn.
    pub fn player_spawn(&self) -> Point {
        to_px(self.player_spawn)
    }

    /// Pixel positions of the ghost spawns, in board order.
    pub fn ghost_spawns(&self) -> Vec<Point> {
        self.ghost_spawns.iter().map(|&t| to_px(t)).collect()
    }

    /// Pellet markers in board order (row-major).
    pub fn pellets(&self) -> &[(Grade, (usize, usize))] {
        &self.pellets
    }
}

impl WallOracle for Maze {
    /// A sprite footprint at `(x, y)` touches a wall tile.
    fn is_blocked(&self, x: i32, y: i32) -> bool {
        let cols = x.div_euclid(TILE)..=(x + SPRITE - 1).div_euclid(TILE);
        let rows = y.div_euclid(TILE)..=(y + SPRITE - 1).div_euclid(TILE);
        rows.into_iter()
            .any(|row| cols.clone().any(|col| self.tile(col, row).is_solid()))
    }
}

// ══════════════════════════════════════════════════════════════
// Internal
// ══════════════════════════════════════════════════════════════

impl Maze {
    fn from_rows<S: AsRef<str>>(name: String, rows: &[S]) -> Result<Maze, MazeError> {
        let width = rows.first().ok_or(MazeError::Empty)?.as_ref().chars().count();
        let height = rows.len();

        let mut tiles = Vec::with_capacity(height);
        let mut player_spawn = None;
        let mut ghost_spawns = vec![];
        let mut pellets = vec![];

        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != width {
                return Err(MazeError::Ragged { row, found, expected: width });
            }

            let mut cells = Vec::with_capacity(width);
            for (col, ch) in line.chars().enumerate() {
                let (tile, marker) = decode(ch).ok_or(MazeError::UnknownTile { ch, col, row })?;
                match marker {
                    Some(Marker::Pellet) => pellets.push((Grade::Small, (col, row))),
                    Some(Marker::PowerPellet) => pellets.push((Grade::Large, (col, row))),
                    Some(Marker::PlayerSpawn) => {
                        if player_spawn.replace((col, row)).is_some() {
                            return Err(MazeError::DuplicatePlayer(row));
                        }
                    }
                    Some(Marker::GhostSpawn) => ghost_spawns.push((col, row)),
                    None => {}
                }
                cells.push(tile);
            }
            tiles.push(cells);
        }

        let player_spawn = player_spawn.ok_or(MazeError::MissingPlayer)?;
        if ghost_spawns.is_empty() {
            return Err(MazeError::MissingGhost);
        }

        Ok(Maze {
            name,
            tiles,
            width,
            height,
            player_spawn,
            ghost_spawns,
            pellets,
        })
    }
}

fn to_px((col, row): (usize, usize)) -> Point {
    (col as i32 * TILE, row as i32 * TILE)
}

/// Distinguish `# Classic` from `#P..G#` (board data): a name line carries
/// at least one character the legend does not know.
fn is_name_line(line: &str) -> bool {
    line.strip_prefix('#')
        .is_some_and(|rest| rest.chars().any(|c| decode(c).is_none()))
}

// ══════════════════════════════════════════════════════════════
// Embedded board
// ══════════════════════════════════════════════════════════════

/// 29 x 32 tiles, corridors two tiles wide. Rows 15 and 16 are a tunnel.
const BUILTIN: &[&str] = &[
    "#############################",
    "#P    .    .    .    .    . #",
    "#                           #",
    "#o ###. ###. ###. ###. ###o #",
    "#  ###  ###  ###  ###  ###  #",
    "#. ###. ###. ###. ###. ###. #",
    "#  ###  ###  ###  ###  ###  #",
    "#.    .    .    .    .    . #",
    "#                           #",
    "#. ###. #############. ###. #",
    "#  ###  #############  ###  #",
    "#. ###.    G    .    . ###. #",
    "#  ###                 ###  #",
    "#. ###. ###. ###. ###. ###. #",
    "#  ###  ###  ###  ###  ###  #",
    " .    .    .    .    .    .  ",
    "                             ",
    "#. ###. ###. ###. ###. ###. #",
    "#  ###  ###  ###  ###  ###  #",
    "#. ###. ###. ###. ###. ###. #",
    "#  ###  ###  ###  ###  ###  #",
    "#. ###.    .    .    . ###. #",
    "#  ###                 ###  #",
    "#. ###. #############. ###. #",
    "#  ###  #############  ###  #",
    "#.    .    .    .    .    . #",
    "#                           #",
    "#o ###. ###. ###. ###. ###o #",
    "#  ###  ###  ###  ###  ###  #",
    "#.    .    .    .    .    . #",
    "#                           #",
    "#############################",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn count(maze: &Maze, grade: Grade) -> usize {
        maze.pellets().iter().filter(|(g, _)| *g == grade).count()
    }

    #[test]
    fn builtin_board_layout() {
        let maze = Maze::builtin();
        assert_eq!(maze.dims(), (29, 32));
        assert_eq!(maze.extent(), (232, 256));
        assert_eq!(maze.player_spawn(), (8, 8));
        assert_eq!(maze.ghost_spawns(), vec![(88, 88)]);
        assert_eq!(count(&maze, Grade::Small), 80);
        assert_eq!(count(&maze, Grade::Large), 4);
    }

    #[test]
    fn pellets_come_in_board_order() {
        let maze = Maze::builtin();
        assert_eq!(maze.pellets()[0], (Grade::Small, (6, 1)));
        assert_eq!(maze.pellets()[5], (Grade::Large, (1, 3)));
    }

    #[test]
    fn footprint_oracle() {
        let maze = Maze::builtin();
        assert!(!maze.is_blocked(8, 8), "spawn is free");
        assert!(maze.is_blocked(6, 8), "left border wall");
        assert!(maze.is_blocked(8, 6), "top border wall");
        assert!(!maze.is_blocked(208, 8));
        assert!(maze.is_blocked(210, 8), "right border wall");
        assert!(maze.is_blocked(16, 24), "footprint reaches the first block");
    }

    #[test]
    fn tunnel_is_open_past_the_edges() {
        let maze = Maze::builtin();
        assert!(!maze.is_blocked(0, 120));
        assert!(!maze.is_blocked(-4, 120));
        assert!(!maze.is_blocked(220, 120));
        assert!(!maze.is_blocked(232, 120));
        assert!(maze.is_blocked(-4, 112), "tunnel is exactly two rows high");
    }

    #[test]
    fn parse_reads_name_and_keeps_edge_spaces() {
        let maze = Maze::parse("# Tiny\n#####\n P G \n#####\n").unwrap();
        assert_eq!(maze.name, "Tiny");
        assert_eq!(maze.dims(), (5, 3));
        assert_eq!(maze.tile(0, 1), Tile::Open);
        assert_eq!(maze.tile(0, 0), Tile::Wall);
        assert_eq!(maze.tile(-1, 1), Tile::Open);
        assert_eq!(maze.tile(9, 9), Tile::Open);
        assert_eq!(maze.player_spawn(), (8, 8));
    }

    #[test]
    fn parse_without_name_line() {
        let maze = Maze::parse("####\n#PG#\n####").unwrap();
        assert_eq!(maze.name, "Unnamed Board");
        assert_eq!(maze.dims(), (4, 3));
        assert!(maze.pellets().is_empty());
    }

    #[test]
    fn parse_rejects_bad_boards() {
        assert!(matches!(Maze::parse(""), Err(MazeError::Empty)));
        assert!(matches!(Maze::parse("# Only a name\n"), Err(MazeError::Empty)));
        assert!(matches!(
            Maze::parse("####\n#PG\n"),
            Err(MazeError::Ragged { row: 1, found: 3, expected: 4 })
        ));
        assert!(matches!(
            Maze::parse("####\n#PGx"),
            Err(MazeError::UnknownTile { ch: 'x', col: 3, row: 1 })
        ));
        assert!(matches!(Maze::parse("#.G#"), Err(MazeError::MissingPlayer)));
        assert!(matches!(Maze::parse("#PG#\n#P #"), Err(MazeError::DuplicatePlayer(1))));
        assert!(matches!(Maze::parse("#P.#"), Err(MazeError::MissingGhost)));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = Maze::load(Path::new("/nonexistent/board.txt")).unwrap_err();
        assert!(matches!(err, MazeError::Io(_)));
    }
}
