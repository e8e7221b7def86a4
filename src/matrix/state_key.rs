//! The (event type, state key) addressing scheme used by [`StateMap`](crate::resolve::StateMap).

/// An event's `type` field. Matrix types are short, namespaced strings
/// (`"m.room.create"`); there is no closed enumeration of them, so this is a
/// plain owned string rather than an enum.
pub type EventType = String;

/// An event's `state_key` field. Present (possibly empty) on state events,
/// absent on timeline events.
pub type StateKey = String;

/// The pair that addresses one slot of room state.
pub type TypeStateKey = (EventType, StateKey);

/// Well-known event types the resolution algorithm treats specially.
///
/// These are the only types the core cares about by name; everything else
/// flows through generically.
pub mod event_type {
	pub const ROOM_CREATE: &str = "m.room.create";
	pub const ROOM_POWER_LEVELS: &str = "m.room.power_levels";
	pub const ROOM_JOIN_RULES: &str = "m.room.join_rules";
	pub const ROOM_MEMBER: &str = "m.room.member";
	pub const ROOM_THIRD_PARTY_INVITE: &str = "m.room.third_party_invite";
}

/// Construct the `(type, "")` key for a singleton state event.
#[inline]
#[must_use]
pub fn singleton(event_type: &str) -> TypeStateKey {
	(event_type.to_owned(), String::new())
}
