//! The authorization predicate itself.
//!
//! Trimmed, single-generation version of the Matrix auth rules: covers
//! `m.room.create`, `m.room.power_levels`, `m.room.join_rules`, and
//! `m.room.member`, the four types the iterative authorizer actually needs
//! to resolve conflicts over (§4.4's definition of a power event names
//! exactly these plus a generic "send this event" fallback). Signature,
//! size, and federation-domain checks are out of scope (§1, §6) and are not
//! performed here.

use serde_json::Value as JsonValue;

use crate::{
	error::{Err, Result},
	matrix::{state_key::event_type, Event, Membership},
	room_version::AuthContext,
};

/// Evaluate `event` against `auth_context`.
pub fn check(event: &Event, auth_context: &AuthContext) -> Result<()> {
	if event.is_type(event_type::ROOM_CREATE) {
		return Ok(());
	}

	if event.is_type(event_type::ROOM_MEMBER) {
		return check_membership(event, auth_context);
	}

	check_can_send_event(event, auth_context)?;

	if event.is_type(event_type::ROOM_POWER_LEVELS) {
		check_power_levels(event, auth_context)?;
	}

	Ok(())
}

fn get(auth_context: &AuthContext, event_type: &str, state_key: &str) -> Option<&Event> {
	auth_context.get(&(event_type.to_owned(), state_key.to_owned()))
}

fn as_int(value: &JsonValue) -> Option<i64> {
	value
		.as_i64()
		.or_else(|| value.as_f64().map(|n| n as i64))
		.or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

/// The power level of `user`, per the current `m.room.power_levels` event in
/// `auth_context`, falling back to the `m.room.create` creator rule (§4.5).
fn user_power_level(auth_context: &AuthContext, user: &str) -> i64 {
	if let Some(power_levels) = get(auth_context, event_type::ROOM_POWER_LEVELS, "") {
		let default = power_levels
			.content
			.get("users_default")
			.and_then(as_int)
			.unwrap_or(0);

		return power_levels
			.content
			.get("users")
			.and_then(JsonValue::as_object)
			.and_then(|users| users.get(user))
			.and_then(as_int)
			.unwrap_or(default);
	}

	get(auth_context, event_type::ROOM_CREATE, "")
		.and_then(|create| create.content.get("creator"))
		.and_then(JsonValue::as_str)
		.map_or(0, |creator| if creator == user { 100 } else { 0 })
}

fn named_level(auth_context: &AuthContext, name: &str, default: i64) -> i64 {
	get(auth_context, event_type::ROOM_POWER_LEVELS, "")
		.and_then(|power_levels| power_levels.content.get(name))
		.and_then(as_int)
		.unwrap_or(default)
}

fn send_level(auth_context: &AuthContext, event_type: &str, is_state: bool) -> i64 {
	let Some(power_levels) = get(auth_context, event_type::ROOM_POWER_LEVELS, "") else {
		return 0;
	};

	let default = if is_state {
		power_levels
			.content
			.get("state_default")
			.and_then(as_int)
			.unwrap_or(50)
	} else {
		power_levels
			.content
			.get("events_default")
			.and_then(as_int)
			.unwrap_or(0)
	};

	power_levels
		.content
		.get("events")
		.and_then(JsonValue::as_object)
		.and_then(|events| events.get(event_type))
		.and_then(as_int)
		.unwrap_or(default)
}

fn check_can_send_event(event: &Event, auth_context: &AuthContext) -> Result<()> {
	let required = send_level(auth_context, &event.event_type, event.state_key.is_some());
	let sender_level = user_power_level(auth_context, &event.sender);

	if sender_level < required {
		Err!(Authorization(
			"sender {} has power {sender_level}, needs {required} to send {}",
			event.sender,
			event.event_type
		));
	}

	if let Some(state_key) = &event.state_key {
		if state_key.starts_with('@') && state_key != &event.sender {
			Err!(Authorization("state_key {state_key} names a different user than the sender"));
		}
	}

	Ok(())
}

fn check_power_levels(event: &Event, auth_context: &AuthContext) -> Result<()> {
	let Some(current) = get(auth_context, event_type::ROOM_POWER_LEVELS, "") else {
		return Ok(());
	};

	let sender_level = user_power_level(auth_context, &event.sender);

	for field in ["users_default", "events_default", "state_default", "ban", "kick", "redact", "invite"] {
		let old = current.content.get(field).and_then(as_int);
		let new = event.content.get(field).and_then(as_int);
		if old == new {
			continue;
		}
		if old.is_some_and(|l| l > sender_level) || new.is_some_and(|l| l > sender_level) {
			Err!(Authorization("{field} change exceeds sender's own power level"));
		}
	}

	check_power_level_map(current, event, "users", sender_level, true)?;
	check_power_level_map(current, event, "events", sender_level, false)?;

	Ok(())
}

fn check_power_level_map(
	current: &Event,
	event: &Event,
	field: &str,
	sender_level: i64,
	strictly_below_for_old: bool,
) -> Result<()> {
	let old_map = current.content.get(field).and_then(JsonValue::as_object);
	let new_map = event.content.get(field).and_then(JsonValue::as_object);

	let keys = old_map
		.into_iter()
		.chain(new_map)
		.flat_map(serde_json::Map::keys)
		.cloned()
		.collect::<std::collections::BTreeSet<_>>();

	for key in keys {
		let old = old_map.and_then(|m| m.get(&key)).and_then(as_int);
		let new = new_map.and_then(|m| m.get(&key)).and_then(as_int);
		if old == new {
			continue;
		}

		// Raising your own `users` entry above your current level, or touching
		// someone else's entry that is already >= your level, is forbidden.
		// `events`/`notifications` entries use a non-strict bound instead since
		// there is no "someone else's" entry to protect.
		if let Some(l) = old {
			let forbidden = if strictly_below_for_old { l >= sender_level } else { l > sender_level };
			if forbidden {
				Err!(Authorization("cannot change {field}.{key}: current value {l} is not below sender's power {sender_level}"));
			}
		}
		if let Some(l) = new {
			if l > sender_level {
				Err!(Authorization("cannot set {field}.{key} to {l}, above sender's power {sender_level}"));
			}
		}
	}

	Ok(())
}

fn check_membership(event: &Event, auth_context: &AuthContext) -> Result<()> {
	let Some(membership) = event.membership else {
		Err!(Authorization("m.room.member event missing membership"));
	};
	let Some(target) = event.state_key.as_deref() else {
		Err!(Authorization("m.room.member event missing state_key"));
	};

	// The room creator's own join, directly off the create event, always
	// succeeds: there is no power-levels event yet to consult.
	if membership == Membership::Join && event.auth_events.len() <= 1 {
		if let Some(create) = get(auth_context, event_type::ROOM_CREATE, "") {
			if create
				.content
				.get("creator")
				.and_then(JsonValue::as_str)
				== Some(target)
			{
				return Ok(());
			}
		}
	}

	let sender_membership = get(auth_context, event_type::ROOM_MEMBER, &event.sender).and_then(|e| e.membership);
	let sender_in_room = sender_membership == Some(Membership::Join);
	let sender_invited = sender_membership == Some(Membership::Invite);

	let target_membership = get(auth_context, event_type::ROOM_MEMBER, target).and_then(|e| e.membership);
	let target_in_room = target_membership == Some(Membership::Join);
	let target_banned = target_membership == Some(Membership::Ban);

	let join_rule = get(auth_context, event_type::ROOM_JOIN_RULES, "")
		.and_then(|e| e.content.get("join_rule"))
		.and_then(JsonValue::as_str)
		.unwrap_or("invite");

	let sender_level = user_power_level(auth_context, &event.sender);
	let target_level = user_power_level(auth_context, target);
	let ban_level = named_level(auth_context, "ban", 50);

	if membership != Membership::Join {
		let self_leave = sender_invited && membership == Membership::Leave && target == event.sender;
		if !self_leave && !sender_in_room {
			Err!(Authorization("sender {} is not joined to the room", event.sender));
		}
	}

	match membership {
		| Membership::Invite => {
			if target_banned {
				Err!(Authorization("target {target} is banned"));
			}
			if target_in_room {
				Err!(Authorization("target {target} is already in the room"));
			}
			let invite_level = named_level(auth_context, "invite", 0);
			if sender_level < invite_level {
				Err!(Authorization("sender power {sender_level} is below invite level {invite_level}"));
			}
		},
		| Membership::Join => {
			if target_banned {
				Err!(Authorization("target {target} is banned"));
			}
			if target != event.sender {
				Err!(Authorization("join event's state_key must match its sender"));
			}
			match join_rule {
				| "public" => {},
				| "invite" => {
					if !sender_in_room && !sender_invited {
						Err!(Authorization("sender {} was not invited", event.sender));
					}
				},
				| other => Err!(Authorization("unsupported join_rule {other}")),
			}
		},
		| Membership::Leave => {
			if target_banned && sender_level < ban_level {
				Err!(Authorization("sender power {sender_level} cannot unban (needs {ban_level})"));
			}
			if target != event.sender {
				let kick_level = named_level(auth_context, "kick", 50);
				if sender_level < kick_level || sender_level <= target_level {
					Err!(Authorization("sender power {sender_level} cannot kick target at power {target_level}"));
				}
			}
		},
		| Membership::Ban => {
			if sender_level < ban_level || sender_level <= target_level {
				Err!(Authorization("sender power {sender_level} cannot ban target at power {target_level}"));
			}
		},
		| Membership::Knock => {
			if join_rule != "knock" {
				Err!(Authorization("join_rule {join_rule} does not permit knocking"));
			}
		},
	}

	Ok(())
}
