/// Entities: Pacman (player), Ghost (random-turn enemy), Rival (second
/// player's ghost), Pellet (small or large collectible).
///
/// `Critter` closes the set so an arena can hold all of them in one slot
/// table; it implements `Actor` by delegating to the variant.

use log::{debug, trace};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::actor::{Actor, ActorKind, Contact, Field, Sprite, Stage};
use super::event::GameEvent;
use super::grid::{aligned, Direction, Extent, Point, WallOracle, SPRITE, TILE};
use super::steering::{Edges, Steering};

// ── Pacman ──

#[derive(Clone, Debug)]
pub struct Pacman {
    motion: Steering,
    spawn: Point,
    lives: u32,
    /// Tick of the last collision that passed the cooldown gate.
    last_hit: u64,
    cooldown: u64,
    facing: Direction,
}

impl Pacman {
    pub fn new(spawn: Point, lives: u32, speed: i32, cooldown: u64) -> Self {
        Pacman {
            motion: Steering::new(spawn, speed),
            spawn,
            lives,
            last_hit: 0,
            cooldown,
            facing: Direction::Right,
        }
    }

    /// Control step: feed the held direction before the arena tick.
    pub fn control(&mut self, intent: Option<Direction>, oracle: &dyn WallOracle) {
        self.motion.steer(intent, oracle);
        self.face();
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn velocity(&self) -> Point {
        self.motion.vel
    }

    /// Last non-zero heading.
    pub fn facing(&self) -> Direction {
        self.facing
    }

    fn face(&mut self) {
        if let Some(dir) = Direction::of(self.motion.vel) {
            self.facing = dir;
        }
    }
}

impl Actor for Pacman {
    fn kind(&self) -> ActorKind {
        ActorKind::Player
    }

    fn step(&mut self, field: &Field<'_>) {
        self.motion.travel(field, (SPRITE, SPRITE), Edges::WrapX);
        self.face();
    }

    fn collide(&mut self, other: &Contact, stage: &mut Stage<'_>) {
        let now = stage.tick_count();
        if now.saturating_sub(self.last_hit) < self.cooldown {
            return;
        }
        self.last_hit = now;

        if other.kind == ActorKind::Enemy && self.lives > 0 {
            self.lives -= 1;
            self.motion.halt_at(self.spawn);
            debug!("player hit by {:?} at tick {now}, {} lives left", other.id, self.lives);
            stage.emit(GameEvent::PlayerHit { lives: self.lives });
        }
    }

    fn position(&self) -> Point {
        self.motion.pos
    }

    fn size(&self) -> Extent {
        (SPRITE, SPRITE)
    }

    fn symbol(&self) -> Option<Sprite> {
        let row = match self.facing {
            Direction::Right => 0,
            Direction::Left => 16,
            Direction::Up => 32,
            Direction::Down => 48,
        };
        Some((16, row))
    }
}

// ── Ghost ──

/// Autonomous enemy. Runs straight until blocked, then turns at random.
/// Moves on a torus: leaving any edge re-enters on the opposite one.
#[derive(Clone, Debug)]
pub struct Ghost {
    pos: Point,
    vel: Point,
    speed: i32,
    /// Sprite-sheet row selector, 0..=3.
    color: u8,
    rng: Pcg32,
}

impl Ghost {
    pub fn new(pos: Point, color: u8, speed: i32, seed: u64) -> Self {
        Ghost {
            pos,
            vel: Direction::Down.velocity(speed),
            speed,
            color,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn velocity(&self) -> Point {
        self.vel
    }

    pub fn color(&self) -> u8 {
        self.color
    }

    /// Pick a new heading among the ones other than the blocked current one.
    fn turn(&mut self) {
        let heading = Direction::of(self.vel);
        let options: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|&d| Some(d) != heading)
            .collect();
        let pick = options[self.rng.random_range(0..options.len())];
        trace!("ghost at {:?} turns {:?} -> {:?}", self.pos, heading, pick);
        self.vel = pick.velocity(self.speed);
    }
}

impl Actor for Ghost {
    fn kind(&self) -> ActorKind {
        ActorKind::Enemy
    }

    fn step(&mut self, field: &Field<'_>) {
        let next = (self.pos.0 + self.vel.0, self.pos.1 + self.vel.1);
        if field.blocked(next) {
            if aligned(self.pos) {
                self.turn();
            }
            return;
        }
        let (w, h) = field.bounds;
        self.pos = (next.0.rem_euclid(w), next.1.rem_euclid(h));
    }

    fn collide(&mut self, _other: &Contact, _stage: &mut Stage<'_>) {}

    fn position(&self) -> Point {
        self.pos
    }

    fn size(&self) -> Extent {
        (SPRITE, SPRITE)
    }

    fn symbol(&self) -> Option<Sprite> {
        let row = 64 + 16 * self.color as i32;
        let col = match Direction::of(self.vel)? {
            Direction::Right => 16,
            Direction::Left => 48,
            Direction::Up => 80,
            Direction::Down => 112,
        };
        Some((col, row))
    }
}

// ── Rival ──

/// Ghost steered by a second player. Same control policy as Pacman,
/// clamped to the arena instead of wrapping.
#[derive(Clone, Debug)]
pub struct Rival {
    motion: Steering,
}

impl Rival {
    pub fn new(pos: Point, speed: i32) -> Self {
        Rival { motion: Steering::new(pos, speed) }
    }

    pub fn control(&mut self, intent: Option<Direction>, oracle: &dyn WallOracle) {
        self.motion.steer(intent, oracle);
    }

    pub fn velocity(&self) -> Point {
        self.motion.vel
    }
}

impl Actor for Rival {
    fn kind(&self) -> ActorKind {
        ActorKind::Enemy
    }

    fn step(&mut self, field: &Field<'_>) {
        self.motion.travel(field, (SPRITE, SPRITE), Edges::Clamp);
    }

    fn collide(&mut self, _other: &Contact, _stage: &mut Stage<'_>) {}

    fn position(&self) -> Point {
        self.motion.pos
    }

    fn size(&self) -> Extent {
        (SPRITE, SPRITE)
    }

    fn symbol(&self) -> Option<Sprite> {
        let col = match Direction::of(self.motion.vel) {
            Some(Direction::Right) | None => 16,
            Some(Direction::Left) => 48,
            Some(Direction::Up) => 80,
            Some(Direction::Down) => 112,
        };
        Some((col, 64))
    }
}

// ── Pellet ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Grade {
    /// 4 x 4 px, centred in its tile.
    Small,
    /// 16 x 16 px, top-left on its tile.
    Large,
}

/// Static collectible. Leaves the arena when the player touches it.
#[derive(Clone, Debug)]
pub struct Pellet {
    pos: Point,
    grade: Grade,
    points: u32,
}

impl Pellet {
    /// Place a pellet on board tile `(col, row)`.
    pub fn on_tile(grade: Grade, (col, row): (usize, usize), points: u32) -> Self {
        let (x, y) = (col as i32 * TILE, row as i32 * TILE);
        let pos = match grade {
            Grade::Small => (x + 2, y + 2),
            Grade::Large => (x, y),
        };
        Pellet { pos, grade, points }
    }

    pub fn grade(&self) -> Grade {
        self.grade
    }

}

impl Actor for Pellet {
    fn kind(&self) -> ActorKind {
        ActorKind::Collectible
    }

    fn step(&mut self, _field: &Field<'_>) {}

    fn collide(&mut self, other: &Contact, stage: &mut Stage<'_>) {
        let me = stage.me();
        if other.kind != ActorKind::Player || !stage.is_registered(me) {
            return;
        }
        stage.remove(me);
        debug!("{:?} pellet {me:?} eaten for {} points", self.grade, self.points);
        stage.emit(GameEvent::PelletEaten { id: me, points: self.points });
    }

    fn position(&self) -> Point {
        self.pos
    }

    fn size(&self) -> Extent {
        match self.grade {
            Grade::Small => (4, 4),
            Grade::Large => (SPRITE, SPRITE),
        }
    }

    fn symbol(&self) -> Option<Sprite> {
        match self.grade {
            Grade::Small => Some((36, 92)),
            Grade::Large => Some((176, 48)),
        }
    }
}

// ── Closed set ──

#[derive(Clone, Debug)]
pub enum Critter {
    Pacman(Pacman),
    Ghost(Ghost),
    Rival(Rival),
    Pellet(Pellet),
}

impl From<Pacman> for Critter {
    fn from(p: Pacman) -> Self {
        Critter::Pacman(p)
    }
}

impl From<Ghost> for Critter {
    fn from(g: Ghost) -> Self {
        Critter::Ghost(g)
    }
}

impl From<Rival> for Critter {
    fn from(r: Rival) -> Self {
        Critter::Rival(r)
    }
}

impl From<Pellet> for Critter {
    fn from(p: Pellet) -> Self {
        Critter::Pellet(p)
    }
}

impl Critter {
    fn inner(&self) -> &dyn Actor {
        match self {
            Critter::Pacman(a) => a,
            Critter::Ghost(a) => a,
            Critter::Rival(a) => a,
            Critter::Pellet(a) => a,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Actor {
        match self {
            Critter::Pacman(a) => a,
            Critter::Ghost(a) => a,
            Critter::Rival(a) => a,
            Critter::Pellet(a) => a,
        }
    }
}

impl Actor for Critter {
    fn kind(&self) -> ActorKind {
        self.inner().kind()
    }

    fn step(&mut self, field: &Field<'_>) {
        self.inner_mut().step(field)
    }

    fn collide(&mut self, other: &Contact, stage: &mut Stage<'_>) {
        self.inner_mut().collide(other, stage)
    }

    fn position(&self) -> Point {
        self.inner().position()
    }

    fn size(&self) -> Extent {
        self.inner().size()
    }

    fn symbol(&self) -> Option<Sprite> {
        self.inner().symbol()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actor::ActorId;

    const ARENA: Extent = (232, 280);

    fn open(_x: i32, _y: i32) -> bool {
        false
    }

    fn ghost_contact() -> Contact {
        Contact { id: ActorId(9), kind: ActorKind::Enemy, position: (8, 8), size: (16, 16) }
    }

    fn player_contact() -> Contact {
        Contact { id: ActorId(0), kind: ActorKind::Player, position: (8, 8), size: (16, 16) }
    }

    /// Run one collision callback at `tick` with `me` registered.
    fn hit<A: Actor>(actor: &mut A, me: ActorId, other: &Contact, tick: u64) -> (Vec<ActorId>, Vec<GameEvent>) {
        let mut roster = vec![me, other.id];
        let mut events = vec![];
        let mut stage = Stage::new(me, tick, &mut roster, &mut events);
        actor.collide(other, &mut stage);
        (roster, events)
    }

    // ── Pacman ──

    #[test]
    fn pacman_faces_last_heading() {
        let mut p = Pacman::new((8, 8), 3, 2, 30);
        assert_eq!(p.symbol(), Some((16, 0)));
        p.control(Some(Direction::Down), &open);
        assert_eq!(p.symbol(), Some((16, 48)));
        p.control(Some(Direction::Left), &open);
        assert_eq!(p.symbol(), Some((16, 16)));
    }

    #[test]
    fn pacman_hit_resets_to_spawn() {
        let mut p = Pacman::new((8, 8), 3, 2, 30);
        p.control(Some(Direction::Right), &open);
        let field = Field::new(ARENA, &open);
        for _ in 0..5 {
            p.step(&field);
        }
        assert_eq!(p.position(), (18, 8));

        let (_, events) = hit(&mut p, ActorId(0), &ghost_contact(), 40);
        assert_eq!(p.lives(), 2);
        assert_eq!(p.position(), (8, 8));
        assert_eq!(p.velocity(), (0, 0));
        assert_eq!(events, vec![GameEvent::PlayerHit { lives: 2 }]);
    }

    #[test]
    fn pacman_ignores_hits_inside_cooldown() {
        let mut p = Pacman::new((8, 8), 3, 2, 30);
        // Spawn grace: last_hit starts at tick 0
        hit(&mut p, ActorId(0), &ghost_contact(), 29);
        assert_eq!(p.lives(), 3);

        hit(&mut p, ActorId(0), &ghost_contact(), 30);
        assert_eq!(p.lives(), 2);
        hit(&mut p, ActorId(0), &ghost_contact(), 59);
        assert_eq!(p.lives(), 2);
        hit(&mut p, ActorId(0), &ghost_contact(), 60);
        assert_eq!(p.lives(), 1);
    }

    #[test]
    fn pacman_lives_floor_at_zero() {
        let mut p = Pacman::new((8, 8), 1, 2, 30);
        hit(&mut p, ActorId(0), &ghost_contact(), 30);
        assert_eq!(p.lives(), 0);
        let (_, events) = hit(&mut p, ActorId(0), &ghost_contact(), 90);
        assert_eq!(p.lives(), 0);
        assert!(events.is_empty());
    }

    #[test]
    fn pacman_pellet_contact_does_not_cost_lives() {
        let mut p = Pacman::new((8, 8), 3, 2, 30);
        let pellet = Contact { id: ActorId(4), kind: ActorKind::Collectible, position: (10, 10), size: (4, 4) };
        let (_, events) = hit(&mut p, ActorId(0), &pellet, 100);
        assert_eq!(p.lives(), 3);
        assert!(events.is_empty());
    }

    // ── Ghost ──

    #[test]
    fn ghost_starts_downward_and_wraps_toroidally() {
        let field = Field::new(ARENA, &open);
        let mut g = Ghost::new((88, 276), 0, 2, 7);
        assert_eq!(g.velocity(), (0, 2));
        g.step(&field);
        assert_eq!(g.position(), (88, 278));
        g.step(&field);
        assert_eq!(g.position(), (88, 0));
    }

    #[test]
    fn ghost_wraps_horizontally() {
        let field = Field::new(ARENA, &open);
        let mut g = Ghost::new((230, 88), 0, 2, 7);
        g.vel = Direction::Right.velocity(2);
        g.step(&field);
        assert_eq!(g.position(), (0, 88));

        g.vel = Direction::Left.velocity(2);
        g.step(&field);
        assert_eq!(g.position(), (230, 88));
    }

    #[test]
    fn ghost_turns_away_from_blocked_heading() {
        // Wall below y = 96: heading down is blocked at (88, 80)
        let floor = |_x: i32, y: i32| y + SPRITE > 96;
        let field = Field::new(ARENA, &floor);
        for seed in 0..32 {
            let mut g = Ghost::new((88, 80), 1, 2, seed);
            g.step(&field);
            assert_eq!(g.position(), (88, 80), "blocked step does not move");
            assert_ne!(g.velocity(), (0, 2), "seed {seed} kept the blocked heading");
            assert_ne!(g.velocity(), (0, 0));
        }
    }

    #[test]
    fn ghost_same_seed_same_turns() {
        let floor = |_x: i32, y: i32| y + SPRITE > 96;
        let field = Field::new(ARENA, &floor);
        let mut a = Ghost::new((88, 80), 0, 2, 1234);
        let mut b = Ghost::new((88, 80), 0, 2, 1234);
        for _ in 0..20 {
            a.step(&field);
            b.step(&field);
            assert_eq!(a.position(), b.position());
            assert_eq!(a.velocity(), b.velocity());
        }
    }

    #[test]
    fn ghost_waits_when_blocked_off_grid() {
        let floor = |_x: i32, y: i32| y + SPRITE > 96;
        let field = Field::new(ARENA, &floor);
        let mut g = Ghost::new((90, 80), 0, 2, 3);
        g.step(&field);
        assert_eq!(g.velocity(), (0, 2));
        assert_eq!(g.position(), (90, 80));
    }

    #[test]
    fn ghost_sprite_row_follows_color() {
        let g = Ghost::new((0, 0), 2, 2, 0);
        assert_eq!(g.symbol(), Some((112, 96)));
    }

    // ── Rival ──

    #[test]
    fn rival_clamps_and_ignores_collisions() {
        let field = Field::new(ARENA, &open);
        let mut r = Rival::new((8, 8), 2);
        r.control(Some(Direction::Left), &open);
        for _ in 0..10 {
            r.step(&field);
        }
        assert_eq!(r.position(), (0, 8));
        assert_eq!(r.symbol(), Some((48, 64)));

        let (roster, events) = hit(&mut r, ActorId(1), &player_contact(), 50);
        assert_eq!(roster.len(), 2);
        assert!(events.is_empty());
    }

    // ── Pellet ──

    #[test]
    fn pellet_geometry() {
        let small = Pellet::on_tile(Grade::Small, (3, 1), 100);
        assert_eq!(small.position(), (26, 10));
        assert_eq!(small.size(), (4, 4));
        let large = Pellet::on_tile(Grade::Large, (26, 29), 200);
        assert_eq!(large.position(), (208, 232));
        assert_eq!(large.size(), (16, 16));
    }

    #[test]
    fn pellet_leaves_on_player_contact_once() {
        let mut pellet = Pellet::on_tile(Grade::Small, (3, 1), 100);
        let me = ActorId(5);
        let mut roster = vec![ActorId(0), me];
        let mut events = vec![];
        {
            let mut stage = Stage::new(me, 3, &mut roster, &mut events);
            pellet.collide(&player_contact(), &mut stage);
            pellet.collide(&player_contact(), &mut stage);
        }
        assert_eq!(roster, vec![ActorId(0)]);
        assert_eq!(events, vec![GameEvent::PelletEaten { id: me, points: 100 }]);
    }

    #[test]
    fn pellet_ignores_enemies() {
        let mut pellet = Pellet::on_tile(Grade::Large, (1, 29), 200);
        let (roster, events) = hit(&mut pellet, ActorId(5), &ghost_contact(), 3);
        assert_eq!(roster.len(), 2);
        assert!(events.is_empty());
    }

    #[test]
    fn critter_delegates() {
        let c: Critter = Pellet::on_tile(Grade::Small, (1, 1), 100).into();
        assert_eq!(c.kind(), ActorKind::Collectible);
        assert_eq!(c.position(), (10, 10));
        let c: Critter = Ghost::new((88, 88), 0, 2, 1).into();
        assert_eq!(c.kind(), ActorKind::Enemy);
    }
}
