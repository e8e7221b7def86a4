//! Deterministic v2 state resolution for a federated, eventually-consistent
//! room-based messaging protocol.
//!
//! Given several candidate views of a room's state, [`resolve::resolve`]
//! computes the single view every honest participant following this
//! algorithm will agree on. The hard part is not any individual step but
//! making every tie-break bit-for-bit reproducible across implementations;
//! see `SPEC_FULL.md` for the full algorithm write-up.
//!
//! The core takes two narrow collaborators as generic parameters:
//! [`Store`] (persistence) and [`RoomVersion`] (authorization rules). This
//! crate ships one concrete [`rules::StandardRoomVersion`] but callers are
//! expected to supply their own for anything beyond the representative rule
//! set it implements.

pub mod cooperative;
mod error;
mod loader;
pub mod matrix;
pub mod resolve;
pub mod room_version;
pub mod rules;
mod store;

pub use error::{Result, StateResError};
pub use loader::EventLoader;
pub use resolve::resolve;
pub use room_version::{AuthContext, RoomVersion};
pub use store::Store;

#[cfg(test)]
pub mod test_utils;
