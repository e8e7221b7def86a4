//! The iterative authorizer (§4.8): applies candidate events one at a time
//! to a running state, keeping each only if it authorizes.

use tracing::{debug, warn};

use crate::{
	cooperative::maybe_yield,
	error::{Result, StateResError},
	loader::EventLoader,
	matrix::Event,
	room_version::{AuthContext, RoomVersion},
	store::Store,
};

use super::StateMap;

/// Fold `event_ids`, in order, into `resolved_state`, dropping any event
/// that fails authorization against the state as it stood when that event
/// was reached.
#[tracing::instrument(level = "debug", skip(loader, room_version, event_ids, resolved_state))]
pub async fn iterative_auth_check<'a, S, R>(
	loader: &mut EventLoader<'_, S>,
	room_version: &R,
	event_ids: impl IntoIterator<Item = &'a str>,
	mut resolved_state: StateMap<String>,
) -> Result<StateMap<String>>
where
	S: Store,
	R: RoomVersion,
{
	let mut yield_counter = 0;

	for event_id in event_ids {
		let Some(event) = loader.load(event_id, true).await? else {
			warn!(event_id, "candidate event missing from store, skipping");
			continue;
		};

		let auth_context = build_auth_context(loader, room_version, &event, &resolved_state).await?;

		match room_version.check(&event, &auth_context) {
			| Ok(()) => {
				if let Some(key) = event.type_state_key() {
					resolved_state.insert(key, event.event_id.clone());
				}
			},
			| Err(StateResError::Authorization(reason)) => {
				debug!(event_id, reason, "event failed authorization, dropping");
			},
			| Err(other) => return Err(other),
		}

		maybe_yield(&mut yield_counter).await;
	}

	Ok(resolved_state)
}

/// Build the auth-context for `event` (§4.8 step 1): its own non-rejected
/// auth events, overlaid with whatever `auth_types_for_event` says is
/// currently resolved for the relevant keys.
async fn build_auth_context<S: Store, R: RoomVersion>(
	loader: &mut EventLoader<'_, S>,
	room_version: &R,
	event: &Event,
	resolved_state: &StateMap<String>,
) -> Result<AuthContext> {
	let mut auth_context = AuthContext::new();

	for auth_event_id in &event.auth_events {
		let Some(auth_event) = loader.load(auth_event_id, true).await? else {
			debug!(auth_event_id, "missing auth event, proceeding without it");
			continue;
		};
		if auth_event.is_rejected() {
			continue;
		}
		if let Some(key) = auth_event.type_state_key() {
			auth_context.insert(key, auth_event);
		}
	}

	for key in room_version.auth_types_for_event(event) {
		let Some(event_id) = resolved_state.get(&key) else {
			continue;
		};
		let Some(candidate) = loader.load(event_id, true).await? else {
			continue;
		};
		if !candidate.is_rejected() {
			auth_context.insert(key, candidate);
		}
	}

	Ok(auth_context)
}
