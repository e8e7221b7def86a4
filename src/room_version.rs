//! The room-version collaborator the algorithm is parameterized over (§6).

use std::collections::HashMap;

use crate::{
	error::Result,
	matrix::{Event, TypeStateKey},
};

/// The auth-context a [`RoomVersion::check`] call is given: the resolved
/// value, if any, for each `(type, state_key)` the event's auth rules
/// depend on.
pub type AuthContext = HashMap<TypeStateKey, Event>;

/// Room-version-specific authorization rules (§6).
///
/// This is the one seam this specification places out of scope for the core
/// algorithm (§1) — the full versioned Matrix rule matrix is an external
/// collaborator the resolver consumes, not something it reimplements.
/// Callers supply their own implementation; this crate ships one concrete,
/// representative implementation ([`crate::rules::StandardRoomVersion`])
/// covering the event types the §8 scenarios exercise.
pub trait RoomVersion: Send + Sync {
	/// The set of `(type, state_key)` pairs whose current value must be
	/// present in `event`'s auth context for [`Self::check`] to evaluate it.
	fn auth_types_for_event(&self, event: &Event) -> Vec<TypeStateKey>;

	/// Whether `event` is authorized given `auth_context`.
	///
	/// Signature and size checks are out of scope (§1, §6) — the caller is
	/// assumed to have performed or waived them already. A failure here
	/// should be signalled as `Err(StateResError::Authorization(_))`; any
	/// other error kind is treated as fatal to the whole resolution.
	fn check(&self, event: &Event, auth_context: &AuthContext) -> Result<()>;
}
