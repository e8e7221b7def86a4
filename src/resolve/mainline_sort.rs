//! The mainline sorter (§4.9): orders non-power events relative to the
//! canonical chain of `m.room.power_levels` events.

use std::collections::HashMap;

use crate::{cooperative::maybe_yield, error::Result, loader::EventLoader, matrix::state_key::event_type, store::Store};

/// Sort `event_ids` by their position relative to the mainline anchored at
/// `power_event_id` (the power-levels event resolved by the power-event
/// pass), then by `origin_server_ts`, then by event id.
pub async fn mainline_sort<S: Store>(
	loader: &mut EventLoader<'_, S>,
	power_event_id: Option<&str>,
	event_ids: &[String],
) -> Result<Vec<String>> {
	let depth_of = build_mainline_depths(loader, power_event_id).await?;

	let mut keyed = Vec::with_capacity(event_ids.len());
	let mut yield_counter = 0;
	for event_id in event_ids {
		let depth = mainline_depth(loader, &depth_of, event_id).await?;
		let origin_server_ts = loader
			.load(event_id, true)
			.await?
			.map_or(0, |event| event.origin_server_ts);
		keyed.push((depth, origin_server_ts, event_id.clone()));
		maybe_yield(&mut yield_counter).await;
	}

	keyed.sort();
	Ok(keyed.into_iter().map(|(_, _, event_id)| event_id).collect())
}

/// Walk the chain of `m.room.power_levels` events reachable from
/// `power_event_id` by repeatedly following the first power-levels
/// auth-event, and assign each a depth (oldest = 1).
async fn build_mainline_depths<S: Store>(
	loader: &mut EventLoader<'_, S>,
	power_event_id: Option<&str>,
) -> Result<HashMap<String, usize>> {
	let mut mainline = Vec::new();
	let mut current = power_event_id.map(str::to_owned);
	let mut yield_counter = 0;

	while let Some(event_id) = current {
		let Some(event) = loader.load(&event_id, true).await? else {
			break;
		};
		mainline.push(event_id);
		current = first_power_levels_auth_event(loader, &event.auth_events).await?;
		maybe_yield(&mut yield_counter).await;
	}

	Ok(mainline
		.into_iter()
		.rev()
		.enumerate()
		.map(|(i, event_id)| (event_id, i + 1))
		.collect())
}

async fn first_power_levels_auth_event<S: Store>(
	loader: &mut EventLoader<'_, S>,
	auth_event_ids: &[String],
) -> Result<Option<String>> {
	for auth_event_id in auth_event_ids {
		if let Some(auth_event) = loader.load(auth_event_id, true).await? {
			if auth_event.is_type_and_state_key(event_type::ROOM_POWER_LEVELS, "") {
				return Ok(Some(auth_event_id.clone()));
			}
		}
	}
	Ok(None)
}

/// The mainline depth of `event_id`: its own depth if it is on the
/// mainline, otherwise the depth reached by following its first
/// power-levels auth event; `0` if the mainline is never reached.
async fn mainline_depth<S: Store>(
	loader: &mut EventLoader<'_, S>,
	depth_of: &HashMap<String, usize>,
	event_id: &str,
) -> Result<usize> {
	let mut current = event_id.to_owned();
	let mut yield_counter = 0;

	loop {
		if let Some(&depth) = depth_of.get(&current) {
			return Ok(depth);
		}
		let Some(event) = loader.load(&current, true).await? else {
			return Ok(0);
		};
		match first_power_levels_auth_event(loader, &event.auth_events).await? {
			Some(next) => current = next,
			None => return Ok(0),
		}
		maybe_yield(&mut yield_counter).await;
	}
}
