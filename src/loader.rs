//! The memoizing event loader (§4.3, §9).
//!
//! Every other stage of resolution goes through this loader rather than
//! calling the [`Store`] directly, so that repeated lookups of the same
//! event — and there are many, since auth chains overlap heavily — cost one
//! store round trip instead of many.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::{
	error::{err, Result},
	matrix::Event,
	store::Store,
};

/// Resolves event ids to [`Event`]s, backed by a caller-seedable memo map.
///
/// The memo is owned for the duration of one resolution call but may be
/// pre-populated by the caller with events it already has in hand, avoiding
/// a round trip for events the caller loaded for some other reason.
pub struct EventLoader<'a, S> {
	room_id: String,
	store: &'a S,
	memo: HashMap<String, Event>,
}

impl<'a, S: Store> EventLoader<'a, S> {
	/// Construct a loader for the given room, seeded with `memo`.
	pub fn new(room_id: impl Into<String>, store: &'a S, memo: HashMap<String, Event>) -> Self {
		Self { room_id: room_id.into(), store, memo }
	}

	/// Consume the loader, returning the accumulated memo so the caller can
	/// reuse it for a later call.
	#[must_use]
	pub fn into_memo(self) -> HashMap<String, Event> {
		self.memo
	}

	/// Load a single event, consulting the memo before the store.
	///
	/// If `allow_absent` is false and the event cannot be found, or if the
	/// event belongs to a different room, this returns a fatal error (§4.3).
	#[tracing::instrument(level = "trace", skip(self))]
	pub async fn load(&mut self, event_id: &str, allow_absent: bool) -> Result<Option<Event>> {
		if let Some(event) = self.memo.get(event_id) {
			trace!(event_id, "loader memo hit");
			return Ok(Some(event.clone()));
		}

		self.fetch_batch(std::slice::from_ref(&event_id.to_owned()))
			.await?;

		match self.memo.get(event_id) {
			Some(event) => Ok(Some(event.clone())),
			None if allow_absent => Ok(None),
			None => Err(err!(NotFound("event {event_id}"))),
		}
	}

	/// Load several events at once, returning only the ones that exist.
	/// Missing ids are silently dropped (callers that require every id to
	/// resolve should use [`Self::load`] per id).
	#[tracing::instrument(level = "debug", skip(self), fields(requested = event_ids.len()))]
	pub async fn load_many(&mut self, event_ids: &[String]) -> Result<HashMap<String, Event>> {
		let missing: Vec<String> = event_ids
			.iter()
			.filter(|id| !self.memo.contains_key(*id))
			.cloned()
			.collect();

		if !missing.is_empty() {
			self.fetch_batch(&missing).await?;
		}

		Ok(event_ids
			.iter()
			.filter_map(|id| self.memo.get(id).map(|event| (id.clone(), event.clone())))
			.collect())
	}

	async fn fetch_batch(&mut self, event_ids: &[String]) -> Result<()> {
		let fetched = self.store.get_events(event_ids, true).await?;
		debug!(requested = event_ids.len(), fetched = fetched.len(), "loader fetched batch");

		for (id, event) in fetched {
			if event.room_id != self.room_id {
				return Err(err!(WrongRoom(self.room_id, event.event_id)));
			}
			self.memo.insert(id, event);
		}

		Ok(())
	}
}
