//! The concrete event record the resolver operates on.
//!
//! The larger system this algorithm was extracted from abstracts events
//! behind a trait so callers can plug in their own PDU representation. That
//! flexibility is not a seam this specification calls for: the event shape is
//! fixed, so this crate uses one concrete struct and reserves trait-based
//! polymorphism for [`Store`](crate::Store) and [`RoomVersion`](crate::RoomVersion),
//! the two collaborators the algorithm is actually parameterized over.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::matrix::state_key::{EventType, StateKey};

/// A membership discriminant, present on `m.room.member` events.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Membership {
	Invite,
	Join,
	Knock,
	Leave,
	Ban,
}

/// A room event, in the shape the resolution algorithm requires (§3 of the
/// specification this crate implements).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
	pub event_id: String,
	pub room_id: String,
	#[serde(rename = "type")]
	pub event_type: EventType,
	pub state_key: Option<StateKey>,
	pub sender: String,
	pub origin_server_ts: i64,
	#[serde(default)]
	pub content: JsonValue,
	#[serde(default)]
	pub auth_events: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub rejected_reason: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub membership: Option<Membership>,
}

impl Event {
	/// The `(type, state_key)` this event addresses, if it is a state event.
	#[must_use]
	pub fn type_state_key(&self) -> Option<(EventType, StateKey)> {
		self.state_key
			.clone()
			.map(|state_key| (self.event_type.clone(), state_key))
	}

	/// Whether the store marked this event as rejected (failed auth at the
	/// time it was originally processed). Rejected events still appear in
	/// the event memo — their auth-event pointers remain traversable — but
	/// are never used as auth-context entries (§9).
	#[must_use]
	pub fn is_rejected(&self) -> bool {
		self.rejected_reason.is_some()
	}

	#[must_use]
	pub fn is_type(&self, event_type: &str) -> bool {
		self.event_type == event_type
	}

	#[must_use]
	pub fn is_type_and_state_key(&self, event_type: &str, state_key: &str) -> bool {
		self.is_type(event_type) && self.state_key.as_deref() == Some(state_key)
	}
}
