//! A concrete, representative [`RoomVersion`] implementation.
//!
//! Grounded on the homeserver's own `event_auth` module, trimmed to a single
//! rule generation (no per-room-version "since vN" deltas — see
//! `SPEC_FULL.md` §9) and adapted from its `ruma`-typed wrappers to the
//! plain [`Event`](crate::matrix::Event) this crate uses.

mod auth_types;
mod check;

use crate::{
	error::Result,
	matrix::{Event, TypeStateKey},
	room_version::{AuthContext, RoomVersion},
};

/// The one rule generation this crate ships: `m.room.create`,
/// `m.room.power_levels`, `m.room.join_rules`, and `m.room.member`
/// (join/invite/leave/ban/knock).
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardRoomVersion;

impl RoomVersion for StandardRoomVersion {
	fn auth_types_for_event(&self, event: &Event) -> Vec<TypeStateKey> {
		auth_types::auth_types_for_event(event)
	}

	fn check(&self, event: &Event, auth_context: &AuthContext) -> Result<()> {
		check::check(event, auth_context)
	}
}
