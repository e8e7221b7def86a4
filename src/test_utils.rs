//! In-memory test harness: a literal event graph plus a [`Store`] over it.
//!
//! Mirrors the shape of the homeserver's own `state_res::test_utils`
//! (`INITIAL_EVENTS`/`TestStore`/`do_check`), trimmed to this crate's
//! concrete [`Event`] type and used both by the scenario tests in
//! `resolve::tests` and by downstream consumers of this crate.

use std::collections::{HashMap, HashSet};

use serde_json::json;

use crate::{
	error::Result,
	matrix::{Event, Membership},
	store::Store,
};

/// A fixed in-memory room: every event it was constructed with, queryable
/// the way a real store would be.
pub struct TestStore(pub HashMap<String, Event>);

impl TestStore {
	#[must_use]
	pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
		Self(events.into_iter().map(|event| (event.event_id.clone(), event)).collect())
	}

	/// The full transitive auth chain of `event_id`, including itself.
	fn auth_chain(&self, event_id: &str) -> HashSet<String> {
		let mut seen = HashSet::new();
		let mut stack = vec![event_id.to_owned()];
		while let Some(id) = stack.pop() {
			if !seen.insert(id.clone()) {
				continue;
			}
			if let Some(event) = self.0.get(&id) {
				stack.extend(event.auth_events.iter().cloned());
			}
		}
		seen
	}
}

impl Store for TestStore {
	async fn get_events(
		&self,
		event_ids: &[String],
		_allow_rejected: bool,
	) -> Result<HashMap<String, Event>> {
		Ok(event_ids
			.iter()
			.filter_map(|id| self.0.get(id).map(|event| (id.clone(), event.clone())))
			.collect())
	}

	async fn get_auth_chain_difference(
		&self,
		event_id_sets: Vec<HashSet<String>>,
	) -> Result<HashSet<String>> {
		let chains: Vec<HashSet<String>> = event_id_sets
			.into_iter()
			.map(|ids| ids.iter().flat_map(|id| self.auth_chain(id)).collect())
			.collect();

		let Some(all) = chains.iter().cloned().reduce(|mut acc, chain| {
			acc.extend(chain);
			acc
		}) else {
			return Ok(HashSet::new());
		};

		Ok(all
			.into_iter()
			.filter(|id| !chains.iter().all(|chain| chain.contains(id)))
			.collect())
	}
}

/// Build a literal event for tests. `auth_events` and `origin_server_ts` are
/// the only fields tests usually need to set explicitly beyond identity.
pub fn event(
	event_id: &str,
	room_id: &str,
	sender: &str,
	event_type: &str,
	state_key: Option<&str>,
	content: serde_json::Value,
	auth_events: &[&str],
	origin_server_ts: i64,
) -> Event {
	let membership = (event_type == "m.room.member")
		.then(|| content.get("membership").and_then(|v| v.as_str()))
		.flatten()
		.and_then(|m| match m {
			| "join" => Some(Membership::Join),
			| "invite" => Some(Membership::Invite),
			| "leave" => Some(Membership::Leave),
			| "ban" => Some(Membership::Ban),
			| "knock" => Some(Membership::Knock),
			| _ => None,
		});

	Event {
		event_id: event_id.to_owned(),
		room_id: room_id.to_owned(),
		event_type: event_type.to_owned(),
		state_key: state_key.map(ToOwned::to_owned),
		sender: sender.to_owned(),
		origin_server_ts,
		content,
		auth_events: auth_events.iter().map(|&id| id.to_owned()).collect(),
		rejected_reason: None,
		membership,
	}
}

/// A minimal three-event room: create, the creator's join, and a
/// power-levels event granting the creator 100 and defaulting others to 0.
#[must_use]
pub fn minimal_room(room_id: &str, creator: &str) -> Vec<Event> {
	let create = event(
		"$create",
		room_id,
		creator,
		"m.room.create",
		Some(""),
		json!({ "creator": creator }),
		&[],
		0,
	);
	let join = event(
		"$join",
		room_id,
		creator,
		"m.room.member",
		Some(creator),
		json!({ "membership": "join" }),
		&["$create"],
		1,
	);
	let power_levels = event(
		"$power_levels",
		room_id,
		creator,
		"m.room.power_levels",
		Some(""),
		json!({ "users": { creator: 100 }, "users_default": 0 }),
		&["$create", "$join"],
		2,
	);
	vec![create, join, power_levels]
}
