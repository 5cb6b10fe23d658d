/// Events raised by collision callbacks during a tick.
/// The session applies them to its counters; the driver may log them.

use super::actor::ActorId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// A pellet was consumed and left the arena.
    PelletEaten { id: ActorId, points: u32 },
    /// The player lost a life and went back to its spawn point.
    PlayerHit { lives: u32 },
}
