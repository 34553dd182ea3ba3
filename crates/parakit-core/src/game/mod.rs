//! Typed entities reconstructed from target memory.
//!
//! Every value here is built fresh per snapshot and never mutated after
//! being returned. `id` fields hold the record's address in target memory,
//! which stays stable for the lifetime of the entity in game.

mod bullet;
mod enemy;
mod item;
mod laser;
mod specific;
mod state;

pub use bullet::*;
pub use enemy::*;
pub use item::*;
pub use laser::*;
pub use specific::*;
pub use state::*;

/// An `(x, y)` pair in game field coordinates.
pub type Vec2 = (f32, f32);
