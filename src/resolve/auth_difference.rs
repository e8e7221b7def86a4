//! The auth-difference finder (§4.2): delegates to the store.

use std::collections::HashSet;

use crate::{error::Result, store::Store};

/// Compute the auth-chain difference of the given per-input-state-set id
/// collections, by delegating to the store (§6). The store receives raw
/// event-id sets, not pre-walked chains; walking the chains is its problem.
pub async fn auth_difference<S: Store>(
	store: &S,
	event_id_sets: Vec<HashSet<String>>,
) -> Result<HashSet<String>> {
	store.get_auth_chain_difference(event_id_sets).await
}
