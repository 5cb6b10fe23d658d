/// The actor contract: every object simulated by the arena implements it.
///
/// The arena calls `step` once per tick and `collide` on both parties of
/// every overlap it detects. Actors never see each other directly; a
/// collision hands over a `Contact` (a read-only snapshot of the other
/// party) and a `Stage` through which the callback may deregister actors
/// or raise events.

use super::event::GameEvent;
use super::grid::{Extent, Point, WallOracle};

/// Handle of an actor stored in an arena. Stable for the arena's lifetime,
/// including after the actor has been deregistered.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ActorId(pub(crate) usize);

/// Stable tag that collision reactions switch on.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ActorKind {
    Player,
    Enemy,
    Collectible,
}

/// Top-left corner of a sub-region of the shared sprite sheet.
/// Actors without a sprite are drawn as filled rectangles.
pub type Sprite = (i32, i32);

/// Snapshot of the other party in a collision.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Contact {
    pub id: ActorId,
    pub kind: ActorKind,
    pub position: Point,
    pub size: Extent,
}

/// What an actor may consult while moving.
pub struct Field<'a> {
    /// Arena size in pixels.
    pub bounds: Extent,
    pub oracle: &'a dyn WallOracle,
}

impl<'a> Field<'a> {
    pub fn new(bounds: Extent, oracle: &'a dyn WallOracle) -> Self {
        Field { bounds, oracle }
    }

    #[inline]
    pub fn blocked(&self, (x, y): Point) -> bool {
        self.oracle.is_blocked(x, y)
    }
}

/// What a collision callback may do to the arena.
///
/// Removal is applied immediately to the registration list, so the rest of
/// the tick no longer sees the removed actor.
pub struct Stage<'a> {
    me: ActorId,
    tick: u64,
    roster: &'a mut Vec<ActorId>,
    events: &'a mut Vec<GameEvent>,
}

impl<'a> Stage<'a> {
    pub(crate) fn new(
        me: ActorId,
        tick: u64,
        roster: &'a mut Vec<ActorId>,
        events: &'a mut Vec<GameEvent>,
    ) -> Self {
        Stage { me, tick, roster, events }
    }

    /// Id of the actor whose callback is running.
    pub fn me(&self) -> ActorId {
        self.me
    }

    /// Arena tick counter at the time of the collision.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn is_registered(&self, id: ActorId) -> bool {
        self.roster.contains(&id)
    }

    /// Deregister `id`. No-op if it is not registered.
    pub fn remove(&mut self, id: ActorId) {
        if let Some(idx) = self.roster.iter().position(|&r| r == id) {
            self.roster.remove(idx);
        }
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

pub trait Actor {
    fn kind(&self) -> ActorKind;

    /// Advance one tick. Mutates only this actor.
    fn step(&mut self, field: &Field<'_>);

    /// React to an overlap with `other`.
    fn collide(&mut self, other: &Contact, stage: &mut Stage<'_>);

    fn position(&self) -> Point;

    fn size(&self) -> Extent;

    fn symbol(&self) -> Option<Sprite>;

    fn contact(&self, id: ActorId) -> Contact {
        Contact {
            id,
            kind: self.kind(),
            position: self.position(),
            size: self.size(),
        }
    }
}
