//! The storage collaborator the algorithm is parameterized over (§6).
//!
//! `Store` is deliberately narrow: two operations, both read-only. Anything
//! about how events are persisted, indexed, or queried is the caller's
//! concern; the resolver only ever asks for events by id or for the
//! auth-chain difference of a handful of id sets.

use std::{
	collections::{HashMap, HashSet},
	future::Future,
};

use crate::{error::Result, matrix::Event};

/// Backing storage for state resolution.
///
/// Implementations are free to batch, cache, or fan out however they like;
/// the only contract is that `get_events` may omit ids it cannot find rather
/// than erroring, and that both methods only ever see ids belonging to the
/// room currently being resolved.
pub trait Store: Send + Sync {
	/// Fetch a batch of events by id.
	///
	/// `allow_rejected` controls whether events that failed authorization
	/// when they were originally processed are included in the result;
	/// the event loader still needs to traverse a rejected event's
	/// `auth_events`, even though the event itself is never used as an
	/// auth-context entry.
	fn get_events(
		&self,
		event_ids: &[String],
		allow_rejected: bool,
	) -> impl Future<Output = Result<HashMap<String, Event>>> + Send;

	/// Compute the auth-chain difference (§4.2) of the given per-state-set
	/// id collections: the set of event ids that appear in the auth chain
	/// of at least one collection but not all of them.
	fn get_auth_chain_difference(
		&self,
		event_id_sets: Vec<HashSet<String>>,
	) -> impl Future<Output = Result<HashSet<String>>> + Send;
}

// Note: expressed as `-> impl Future<...> + Send` rather than `async fn`
// so the returned future's `Send`-ness is spelled out explicitly; with a
// plain `async fn` that bound is inferred and can silently fail to hold for
// some implementations, which only shows up at the `resolve()` call site.
