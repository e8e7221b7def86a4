//! The state resolution pipeline (§2, §4.10): separator → auth difference →
//! power sort → iterative auth → mainline sort → iterative auth.

mod auth_difference;
mod iterative_auth;
mod mainline_sort;
mod power_sort;
mod separator;
mod topological_sort;

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::{
	error::Result,
	loader::EventLoader,
	matrix::{state_key, Event, TypeStateKey},
	room_version::RoomVersion,
	store::Store,
};

pub use topological_sort::topological_sort;

/// A mapping of `(type, state_key)` to some value, usually an event id.
pub type StateMap<Id> = BTreeMap<TypeStateKey, Id>;

/// The conflicted state set: keys mapped to every candidate event id seen
/// for them across the input state sets (§3).
pub type ConflictMap = StateMap<Vec<String>>;

/// A set of event ids, e.g. the full conflicted set (§3).
pub type AuthSet = BTreeSet<String>;

/// Resolve the state of a room given several candidate views of it.
///
/// `event_map` seeds the event loader's memo (the caller may already have
/// some of these events in hand); the loader's final memo is discarded, since
/// nothing downstream of this call needs it. See [`crate::loader::EventLoader`]
/// to keep the memo across calls instead.
#[tracing::instrument(level = "debug", skip_all, fields(room_id, inputs = state_sets.len()))]
pub async fn resolve<S, R>(
	room_id: &str,
	room_version: &R,
	state_sets: &[StateMap<String>],
	event_map: Option<HashMap<String, Event>>,
	store: &S,
) -> Result<StateMap<String>>
where
	S: Store,
	R: RoomVersion,
{
	let mut loader = EventLoader::new(room_id, store, event_map.unwrap_or_default());

	let (unconflicted, conflicted) = separator::split(state_sets);
	debug!(unconflicted = unconflicted.len(), conflicted = conflicted.len(), "split state");

	if conflicted.is_empty() {
		return Ok(unconflicted);
	}

	let event_id_sets: Vec<HashSet<String>> =
		state_sets.iter().map(|state_set| state_set.values().cloned().collect()).collect();
	let auth_diff = auth_difference::auth_difference(store, event_id_sets).await?;

	let mut candidate_ids: AuthSet = conflicted.values().flatten().cloned().collect();
	candidate_ids.extend(auth_diff);

	let candidate_ids: Vec<String> = candidate_ids.into_iter().collect();
	let loaded = loader.load_many(&candidate_ids).await?;
	let full_conflicted_set: AuthSet = candidate_ids.into_iter().filter(|id| loaded.contains_key(id)).collect();
	debug!(count = full_conflicted_set.len(), "full conflicted set");

	// 1. Select power events, enlarge by their auth chains, sort.
	let sorted_power_events = power_sort::power_sort(&mut loader, &full_conflicted_set).await?;
	let sorted_power_events_set: HashSet<&str> =
		sorted_power_events.iter().map(String::as_str).collect();

	// 2. Iterative auth check on the power events, from the unconflicted state.
	let partially_resolved_state = iterative_auth::iterative_auth_check(
		&mut loader,
		room_version,
		sorted_power_events.iter().map(String::as_str),
		unconflicted.clone(),
	)
	.await?;

	let power_event_id = partially_resolved_state
		.get(&state_key::singleton(state_key::event_type::ROOM_POWER_LEVELS))
		.cloned();
	debug!(?power_event_id, "resolved power-levels event for mainline ordering");

	// 3. Mainline-sort the non-power leftovers.
	let remaining_events: Vec<String> = full_conflicted_set
		.into_iter()
		.filter(|id| !sorted_power_events_set.contains(id.as_str()))
		.collect();
	debug!(count = remaining_events.len(), "remaining events");

	let sorted_remaining_events =
		mainline_sort::mainline_sort(&mut loader, power_event_id.as_deref(), &remaining_events).await?;

	// 4. Iterative auth check on the leftovers, from the partially resolved state.
	let mut resolved_state = iterative_auth::iterative_auth_check(
		&mut loader,
		room_version,
		sorted_remaining_events.iter().map(String::as_str),
		partially_resolved_state,
	)
	.await?;

	// 5. Unconflicted state always wins.
	resolved_state.extend(unconflicted);

	debug!(count = resolved_state.len(), "resolved state");
	Ok(resolved_state)
}
