//! `auth_types_for_event`: the set of state keys an event's auth context
//! must contain before [`super::check`] can evaluate it.

use crate::matrix::{
	state_key::{event_type, singleton},
	Event, Membership, TypeStateKey,
};

/// Get the list of relevant auth types required to authorize `event`,
/// following the [auth-events selection] rules.
///
/// [auth-events selection]: https://spec.matrix.org/latest/server-server-api/#auth-events-selection
#[must_use]
pub fn auth_types_for_event(event: &Event) -> Vec<TypeStateKey> {
	let mut auth_types = Vec::new();

	// The auth_events for the m.room.create event in a room is empty.
	if !event.is_type(event_type::ROOM_CREATE) {
		auth_types.push(singleton(event_type::ROOM_CREATE));
		auth_types.push(singleton(event_type::ROOM_POWER_LEVELS));
		auth_types.push((event_type::ROOM_MEMBER.to_owned(), event.sender.clone()));
	}

	if event.is_type(event_type::ROOM_MEMBER) {
		auth_types_for_member_event(&mut auth_types, event);
	}

	auth_types
}

fn auth_types_for_member_event(auth_types: &mut Vec<TypeStateKey>, event: &Event) {
	let Some(state_key) = event.state_key.as_deref() else {
		return;
	};

	push_unique(auth_types, (event_type::ROOM_MEMBER.to_owned(), state_key.to_owned()));

	let Some(membership) = event.membership else {
		return;
	};

	if matches!(membership, Membership::Join | Membership::Invite | Membership::Knock) {
		push_unique(auth_types, singleton(event_type::ROOM_JOIN_RULES));
	}

	if membership == Membership::Invite {
		if let Some(token) = event
			.content
			.get("third_party_invite")
			.and_then(|v| v.get("signed"))
			.and_then(|v| v.get("token"))
			.and_then(|v| v.as_str())
		{
			push_unique(
				auth_types,
				(event_type::ROOM_THIRD_PARTY_INVITE.to_owned(), token.to_owned()),
			);
		}
	}
}

fn push_unique(auth_types: &mut Vec<TypeStateKey>, key: TypeStateKey) {
	if !auth_types.contains(&key) {
		auth_types.push(key);
	}
}
