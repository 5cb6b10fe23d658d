/// Arena: fixed-size simulation space, actor registry and tick protocol.
///
/// ## Storage vs. registration
///
/// Actors live in a slot table addressed by `ActorId`; slots are never
/// freed. The registration list (`roster`) is a separate ordered sequence of
/// ids. Removing an actor only drops it from the roster, so its owner can
/// still inspect it afterwards (final lives, final position).
///
/// ## Tick protocol (`advance`)
///
///   1. Snapshot the roster, reversed: last registered moves first, so
///      actors drawn on top are checked first.
///   2. For each id still registered: remember its position, step it.
///   3. If it moved, test it against every other still-registered id in
///      the same order. On overlap call `a.collide(b)` then `b.collide(a)`.
///      A pair is dispatched at most once per tick.
///   4. Bump the tick counter.
///
/// Collision callbacks may deregister actors through their `Stage`; the
/// change is visible to every later check of the same tick.

use std::collections::HashSet;

use crate::domain::actor::{Actor, ActorId, Field, Stage};
use crate::domain::event::GameEvent;
use crate::domain::grid::{overlaps, Extent, WallOracle};

pub struct Arena<A> {
    width: i32,
    height: i32,
    slots: Vec<A>,
    roster: Vec<ActorId>,
    count: u64,
}

impl<A: Actor> Arena<A> {
    pub fn new((width, height): Extent) -> Self {
        Arena {
            width,
            height,
            slots: Vec::new(),
            roster: Vec::new(),
            count: 0,
        }
    }

    /// Store a new actor and register it at the end of the roster.
    pub fn spawn(&mut self, actor: impl Into<A>) -> ActorId {
        let id = ActorId(self.slots.len());
        self.slots.push(actor.into());
        self.roster.push(id);
        id
    }

    /// Register a stored actor. No-op if already registered or unknown.
    pub fn add(&mut self, id: ActorId) {
        if id.0 < self.slots.len() && !self.roster.contains(&id) {
            self.roster.push(id);
        }
    }

    /// Deregister an actor. No-op if it is not registered.
    pub fn remove(&mut self, id: ActorId) {
        if let Some(idx) = self.roster.iter().position(|&r| r == id) {
            self.roster.remove(idx);
        }
    }

    pub fn is_registered(&self, id: ActorId) -> bool {
        self.roster.contains(&id)
    }

    /// Copy of the roster in registration order.
    pub fn actors(&self) -> Vec<ActorId> {
        self.roster.clone()
    }

    /// Stored actor, registered or not.
    pub fn get(&self, id: ActorId) -> Option<&A> {
        self.slots.get(id.0)
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut A> {
        self.slots.get_mut(id.0)
    }

    pub fn size(&self) -> Extent {
        (self.width, self.height)
    }

    pub fn tick_count(&self) -> u64 {
        self.count
    }

    /// Bounding boxes overlap and both actors are registered.
    pub fn check_collision(&self, a: ActorId, b: ActorId) -> bool {
        let (Some(x), Some(y)) = (self.get(a), self.get(b)) else {
            return false;
        };
        overlaps(x.position(), x.size(), y.position(), y.size())
            && self.is_registered(a)
            && self.is_registered(b)
    }

    /// Run one tick. Returns the events raised by collision callbacks.
    pub fn advance(&mut self, oracle: &dyn WallOracle) -> Vec<GameEvent> {
        let field = Field::new(self.size(), oracle);
        let order: Vec<ActorId> = self.roster.iter().rev().copied().collect();
        let mut dispatched: HashSet<(ActorId, ActorId)> = HashSet::new();
        let mut events = Vec::new();

        for &id in &order {
            if !self.is_registered(id) {
                continue;
            }

            let before = self.slots[id.0].position();
            self.slots[id.0].step(&field);
            if self.slots[id.0].position() == before {
                continue;
            }

            for &other in &order {
                if other == id || !self.check_collision(id, other) {
                    continue;
                }
                let pair = if id < other { (id, other) } else { (other, id) };
                if !dispatched.insert(pair) {
                    continue;
                }
                self.dispatch(id, other, &mut events);
            }
        }

        self.count += 1;
        events
    }

    /// Both callbacks of one overlapping pair. `b` sees `a` as it is after
    /// `a` has reacted.
    fn dispatch(&mut self, a: ActorId, b: ActorId, events: &mut Vec<GameEvent>) {
        let tick = self.count;

        let b_view = self.slots[b.0].contact(b);
        {
            let mut stage = Stage::new(a, tick, &mut self.roster, events);
            self.slots[a.0].collide(&b_view, &mut stage);
        }

        let a_view = self.slots[a.0].contact(a);
        {
            let mut stage = Stage::new(b, tick, &mut self.roster, events);
            self.slots[b.0].collide(&a_view, &mut stage);
        }
    }
}
