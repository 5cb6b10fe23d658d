/// Grid geometry shared by the maze, the steering policy and the actors.
///
/// Positions are in pixels, top-left corner of the actor. The maze is a grid
/// of `TILE` x `TILE` pixel cells; moving actors occupy a `SPRITE` x `SPRITE`
/// footprint (2 x 2 tiles when aligned).

/// Edge length of one maze tile in pixels.
pub const TILE: i32 = 8;

/// Edge length of a moving actor's footprint in pixels.
pub const SPRITE: i32 = 16;

/// Pixel position (top-left corner).
pub type Point = (i32, i32);

/// Pixel extent (width, height).
pub type Extent = (i32, i32);

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Down,
        Direction::Up,
        Direction::Right,
        Direction::Left,
    ];

    /// Velocity vector for this heading at `speed` px/tick.
    pub fn velocity(self, speed: i32) -> Point {
        match self {
            Direction::Up => (0, -speed),
            Direction::Down => (0, speed),
            Direction::Left => (-speed, 0),
            Direction::Right => (speed, 0),
        }
    }

    /// Heading of a velocity vector. Zero velocity has none.
    /// Horizontal motion wins when both components are set.
    pub fn of(velocity: Point) -> Option<Direction> {
        let (dx, dy) = velocity;
        if dx > 0 {
            Some(Direction::Right)
        } else if dx < 0 {
            Some(Direction::Left)
        } else if dy < 0 {
            Some(Direction::Up)
        } else if dy > 0 {
            Some(Direction::Down)
        } else {
            None
        }
    }
}

/// Maze geometry query: is a footprint with its top-left at `(x, y)` blocked?
///
/// Implemented by the board (`sim::maze::Maze`) and by plain closures, which
/// is how tests describe open fields or single walls.
pub trait WallOracle {
    fn is_blocked(&self, x: i32, y: i32) -> bool;
}

impl<F> WallOracle for F
where
    F: Fn(i32, i32) -> bool,
{
    fn is_blocked(&self, x: i32, y: i32) -> bool {
        self(x, y)
    }
}

/// Is the position exactly on a tile corner?
#[inline]
pub fn aligned((x, y): Point) -> bool {
    x.rem_euclid(TILE) == 0 && y.rem_euclid(TILE) == 0
}

/// Strict axis-aligned bounding box overlap. Touching edges do not count.
#[inline]
pub fn overlaps(a: Point, a_size: Extent, b: Point, b_size: Extent) -> bool {
    let (x1, y1) = a;
    let (w1, h1) = a_size;
    let (x2, y2) = b;
    let (w2, h2) = b_size;
    y2 < y1 + h1 && y1 < y2 + h2 && x2 < x1 + w1 && x1 < x2 + w2
}
