//! Power-event predicate (§4.4), sender power level (§4.5), and the
//! reverse-topological power sort (§4.6).

use std::collections::{HashMap, HashSet};

use crate::{
	cooperative::maybe_yield,
	error::Result,
	loader::EventLoader,
	matrix::{state_key::event_type, Event, Membership},
	store::Store,
};

use super::{topological_sort::topological_sort, AuthSet};

/// Whether `event` is a power event (§4.4): it changes power levels, join
/// rules, room creation, or kicks/bans someone other than itself.
#[must_use]
pub fn is_power_event(event: &Event) -> bool {
	let is_singleton_power_type = event.state_key.as_deref() == Some("")
		&& matches!(
			event.event_type.as_str(),
			t if t == event_type::ROOM_POWER_LEVELS
				|| t == event_type::ROOM_JOIN_RULES
				|| t == event_type::ROOM_CREATE
		);

	if is_singleton_power_type {
		return true;
	}

	if event.is_type(event_type::ROOM_MEMBER) {
		if let Some(target) = event.state_key.as_deref() {
			return matches!(event.membership, Some(Membership::Leave | Membership::Ban)) && target != event.sender;
		}
	}

	false
}

/// Find the power level of `event`'s sender (§4.5), by walking its
/// `auth_events` for the nearest `m.room.power_levels` or `m.room.create`.
pub async fn power_level_for_sender<S: Store>(
	loader: &mut EventLoader<'_, S>,
	event_id: &str,
) -> Result<i64> {
	let Some(event) = loader.load(event_id, true).await? else {
		return Ok(0);
	};

	let mut power_levels = None;
	let mut create = None;

	for auth_event_id in &event.auth_events {
		let Some(auth_event) = loader.load(auth_event_id, true).await? else {
			continue;
		};
		if auth_event.is_type_and_state_key(event_type::ROOM_POWER_LEVELS, "") {
			power_levels = Some(auth_event);
		} else if auth_event.is_type_and_state_key(event_type::ROOM_CREATE, "") {
			create = Some(auth_event);
		}
		if power_levels.is_some() && create.is_some() {
			break;
		}
	}

	if let Some(power_levels) = power_levels {
		let default = power_levels
			.content
			.get("users_default")
			.and_then(serde_json::Value::as_i64)
			.unwrap_or(0);
		return Ok(power_levels
			.content
			.get("users")
			.and_then(|v| v.get(&event.sender))
			.and_then(serde_json::Value::as_i64)
			.unwrap_or(default));
	}

	if let Some(create) = create {
		let creator = create.content.get("creator").and_then(serde_json::Value::as_str);
		return Ok(if creator == Some(event.sender.as_str()) { 100 } else { 0 });
	}

	Ok(0)
}

/// Enlarge the power events found in `full_conflicted_set` by their auth
/// chains (restricted to the full conflicted set) and sort the result using
/// reverse-topological power ordering (§4.6).
#[tracing::instrument(level = "debug", skip_all, fields(full_conflicted = full_conflicted_set.len()))]
pub async fn power_sort<S: Store>(
	loader: &mut EventLoader<'_, S>,
	full_conflicted_set: &AuthSet,
) -> Result<Vec<String>> {
	let mut graph: HashMap<String, HashSet<String>> = HashMap::new();
	let mut yield_counter = 0;

	for event_id in full_conflicted_set {
		let Some(event) = loader.load(event_id, true).await? else {
			continue;
		};
		if is_power_event(&event) {
			add_event_auth_chain(loader, &mut graph, full_conflicted_set, event_id).await?;
		}
		maybe_yield(&mut yield_counter).await;
	}

	let mut info = HashMap::with_capacity(graph.len());
	for event_id in graph.keys() {
		let power_level = power_level_for_sender(loader, event_id).await?;
		let origin_server_ts = loader
			.load(event_id, false)
			.await?
			.expect("graph nodes were loaded while building the graph")
			.origin_server_ts;
		info.insert(event_id.clone(), (power_level, origin_server_ts));
		maybe_yield(&mut yield_counter).await;
	}

	Ok(topological_sort(&graph, |event_id| {
		*info
			.get(event_id)
			.expect("every graph node has a computed (power_level, origin_server_ts)")
	}))
}

/// Add `event_id` and every ancestor in its auth chain that also belongs to
/// `full_conflicted_set` to `graph`, as an iterative (non-recursive) DFS.
async fn add_event_auth_chain<S: Store>(
	loader: &mut EventLoader<'_, S>,
	graph: &mut HashMap<String, HashSet<String>>,
	full_conflicted_set: &AuthSet,
	event_id: &str,
) -> Result<()> {
	let mut stack = vec![event_id.to_owned()];
	let mut yield_counter = 0;

	while let Some(event_id) = stack.pop() {
		let event = loader.load(&event_id, true).await?;
		graph.entry(event_id.clone()).or_default();

		let Some(event) = event else {
			maybe_yield(&mut yield_counter).await;
			continue;
		};

		for auth_event_id in &event.auth_events {
			if !full_conflicted_set.contains(auth_event_id) {
				continue;
			}
			if !graph.contains_key(auth_event_id) {
				stack.push(auth_event_id.clone());
			}
			graph
				.get_mut(&event_id)
				.expect("just inserted above")
				.insert(auth_event_id.clone());
		}

		maybe_yield(&mut yield_counter).await;
	}

	Ok(())
}
