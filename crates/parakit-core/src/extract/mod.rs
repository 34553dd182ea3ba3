//! Decoding of target memory into [`crate::game`] values.
//!
//! Entity decoders take a reader, the active [`GameSchema`](crate::schema::GameSchema)
//! and a record address. Collection extractors walk a manager's list or slot
//! array and skip (with a debug log) any record that fails to decode.

mod bullet;
mod enemy;
mod item;
mod laser;
pub mod list;
mod snapshot;
mod specific;
mod untracked;

pub use bullet::{decode_bullet, extract_bullets};
pub use enemy::{decode_enemy, extract_enemies};
pub use item::{decode_item, extract_items};
pub use laser::{decode_laser, extract_lasers};
pub use list::ListWalker;
pub use snapshot::{ExtractionFlags, SnapshotBuilder};
pub use specific::decode_specific;
pub use untracked::read_untracked;
