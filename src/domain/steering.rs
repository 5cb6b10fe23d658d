/// Grid-aligned steering shared by the player-controlled actors.
///
/// Two halves, called at different points of a frame:
///   1. `steer`:  control step, before the arena tick. Turns the held
///      direction into a velocity, gated by grid alignment and walls.
///   2. `travel`: movement step, inside the arena tick. Applies the
///      velocity if the next position is free, then wraps or clamps.
///
/// ## Control truth table
///
/// | Current heading blocked | Aligned | Intent target blocked | Result        |
/// |-------------------------|---------|-----------------------|---------------|
/// | yes                     | any     | any                   | stop          |
/// | no                      | no      | any                   | keep velocity |
/// | no                      | yes     | no                    | turn          |
/// | no                      | yes     | yes                   | keep velocity |

use super::actor::Field;
use super::grid::{aligned, Direction, Extent, Point, WallOracle};

/// What happens at the arena border.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Edges {
    /// Leave one side, re-enter on the other horizontally; clamp vertically.
    WrapX,
    /// Clamp on both axes.
    Clamp,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Steering {
    pub pos: Point,
    pub vel: Point,
    pub speed: i32,
}

impl Steering {
    pub fn new(pos: Point, speed: i32) -> Self {
        Steering { pos, vel: (0, 0), speed }
    }

    fn ahead(&self) -> Point {
        (self.pos.0 + self.vel.0, self.pos.1 + self.vel.1)
    }

    /// Control step. See the truth table above.
    pub fn steer(&mut self, intent: Option<Direction>, oracle: &dyn WallOracle) {
        let prior = self.vel;
        let on_grid = aligned(self.pos);

        let (ax, ay) = self.ahead();
        if oracle.is_blocked(ax, ay) {
            self.vel = (0, 0);
        } else if on_grid {
            if let Some(dir) = intent {
                self.vel = dir.velocity(self.speed);
            }
        }

        let (ax, ay) = self.ahead();
        if on_grid && oracle.is_blocked(ax, ay) {
            self.vel = prior;
        }
    }

    /// Movement step. Returns true if the position changed.
    pub fn travel(&mut self, field: &Field<'_>, size: Extent, edges: Edges) -> bool {
        let before = self.pos;
        let next = self.ahead();
        if field.blocked(next) {
            return false;
        }

        let (arena_w, arena_h) = field.bounds;
        let (w, h) = size;
        let (nx, ny) = next;

        let y = ny.clamp(0, (arena_h - h).max(0));
        let x = match edges {
            Edges::WrapX if nx < 0 => arena_w,
            Edges::WrapX if nx > arena_w => 0,
            Edges::WrapX => nx,
            Edges::Clamp => nx.clamp(0, (arena_w - w).max(0)),
        };

        self.pos = (x, y);
        self.pos != before
    }

    pub fn halt_at(&mut self, pos: Point) {
        self.pos = pos;
        self.vel = (0, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::{SPRITE, TILE};

    const ARENA: Extent = (232, 280);

    fn open(_x: i32, _y: i32) -> bool {
        false
    }

    /// One tile of wall along the top and left border.
    fn corner(x: i32, y: i32) -> bool {
        x < TILE || y < TILE
    }

    #[test]
    fn corner_start_turns_only_into_open_space() {
        let mut s = Steering::new((8, 8), 2);

        s.steer(Some(Direction::Down), &corner);
        assert_eq!(s.vel, (0, 2));

        s.steer(Some(Direction::Right), &corner);
        assert_eq!(s.vel, (2, 0));

        s.steer(Some(Direction::Left), &corner);
        assert_eq!(s.vel, (2, 0), "left is a wall, keep heading right");

        s.steer(Some(Direction::Up), &corner);
        assert_eq!(s.vel, (2, 0), "up is a wall, keep heading right");
    }

    #[test]
    fn unaligned_position_ignores_turns() {
        let mut s = Steering::new((10, 8), 2);
        s.vel = (2, 0);
        s.steer(Some(Direction::Down), &open);
        assert_eq!(s.vel, (2, 0));
        s.steer(Some(Direction::Left), &open);
        assert_eq!(s.vel, (2, 0));
    }

    #[test]
    fn aligned_position_accepts_turns() {
        let mut s = Steering::new((16, 24), 2);
        s.vel = (2, 0);
        s.steer(Some(Direction::Up), &open);
        assert_eq!(s.vel, (0, -2));
    }

    #[test]
    fn no_intent_keeps_velocity() {
        let mut s = Steering::new((16, 24), 2);
        s.vel = (0, 2);
        s.steer(None, &open);
        assert_eq!(s.vel, (0, 2));
    }

    #[test]
    fn heading_into_wall_stops() {
        let mut s = Steering::new((8, 8), 2);
        s.vel = (-2, 0);
        s.steer(None, &corner);
        assert_eq!(s.vel, (0, 0));
    }

    #[test]
    fn travel_refuses_blocked_step() {
        let field = Field::new(ARENA, &corner);
        let mut s = Steering::new((8, 8), 2);
        s.vel = (0, -2);
        assert!(!s.travel(&field, (SPRITE, SPRITE), Edges::WrapX));
        assert_eq!(s.pos, (8, 8));
    }

    #[test]
    fn wrap_x_leaves_right_enters_left() {
        let field = Field::new(ARENA, &open);
        let mut s = Steering::new((232, 40), 2);
        s.vel = (2, 0);
        assert!(s.travel(&field, (SPRITE, SPRITE), Edges::WrapX));
        assert_eq!(s.pos, (0, 40));

        s.vel = (-2, 0);
        s.travel(&field, (SPRITE, SPRITE), Edges::WrapX);
        assert_eq!(s.pos, (232, 40));
    }

    #[test]
    fn wrap_x_still_clamps_vertically() {
        let field = Field::new(ARENA, &open);
        let mut s = Steering::new((40, 262), 2);
        s.vel = (0, 2);
        for _ in 0..10 {
            s.travel(&field, (SPRITE, SPRITE), Edges::WrapX);
            assert!(s.pos.1 <= ARENA.1 - SPRITE);
        }
        assert_eq!(s.pos.1, 264);
        assert!(!s.travel(&field, (SPRITE, SPRITE), Edges::WrapX));
    }

    #[test]
    fn clamp_holds_both_axes() {
        let field = Field::new(ARENA, &open);
        let mut s = Steering::new((214, 0), 2);
        s.vel = (2, 0);
        for _ in 0..5 {
            s.travel(&field, (SPRITE, SPRITE), Edges::Clamp);
        }
        assert_eq!(s.pos, (216, 0));

        s.vel = (0, -2);
        assert!(!s.travel(&field, (SPRITE, SPRITE), Edges::Clamp));
        assert_eq!(s.pos, (216, 0));
    }
}
