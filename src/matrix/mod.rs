//! Event and state-key types shared by every stage of resolution.

mod event;
pub mod state_key;

pub use event::{Event, Membership};
pub use state_key::{EventType, StateKey, TypeStateKey};
