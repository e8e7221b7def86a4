//! The separator (§4.1): partitions keyed state entries into unconflicted
//! and conflicted subsets.

use std::collections::HashMap;

use super::{ConflictMap, StateMap};

/// Split `state_sets` into unconflicted state and a conflicted multimap.
///
/// Definition: if a key _K_ is present with the same value _V_ in every
/// input, the pair (_K_, _V_) belongs to the unconflicted state map.
/// Otherwise the distinct values seen for _K_ (absence does not count as a
/// value) belong to the conflicted state set.
pub fn split(state_sets: &[StateMap<String>]) -> (StateMap<String>, ConflictMap) {
	let state_set_count = state_sets.len();
	let mut occurrences: HashMap<(String, String), HashMap<String, usize>> = HashMap::new();

	for state_set in state_sets {
		for (key, event_id) in state_set {
			*occurrences
				.entry(key.clone())
				.or_default()
				.entry(event_id.clone())
				.or_default() += 1;
		}
	}

	let mut unconflicted = StateMap::new();
	let mut conflicted = ConflictMap::new();

	for (key, candidates) in occurrences {
		for (event_id, count) in candidates {
			if count == state_set_count {
				unconflicted.insert(key.clone(), event_id);
			} else {
				conflicted.entry(key.clone()).or_default().push(event_id);
			}
		}
	}

	(unconflicted, conflicted)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn key(t: &str, k: &str) -> (String, String) {
		(t.to_owned(), k.to_owned())
	}

	#[test]
	fn single_set_is_fully_unconflicted() {
		let mut set = StateMap::new();
		set.insert(key("m.room.member", "@a"), "e1".to_owned());
		let (unconflicted, conflicted) = split(&[set.clone()]);
		assert_eq!(unconflicted, set);
		assert!(conflicted.is_empty());
	}

	#[test]
	fn agreeing_sets_are_unconflicted() {
		let mut a = StateMap::new();
		a.insert(key("m.room.member", "@a"), "e1".to_owned());
		a.insert(key("m.room.member", "@b"), "e2".to_owned());
		let (unconflicted, conflicted) = split(&[a.clone(), a.clone()]);
		assert_eq!(unconflicted, a);
		assert!(conflicted.is_empty());
	}

	#[test]
	fn disjoint_keys_are_conflicted_with_one_candidate_each() {
		let mut a = StateMap::new();
		a.insert(key("m.room.member", "@a"), "e1".to_owned());
		let mut b = StateMap::new();
		b.insert(key("m.room.member", "@b"), "e2".to_owned());

		let (unconflicted, conflicted) = split(&[a, b]);
		assert!(unconflicted.is_empty());
		assert_eq!(conflicted.get(&key("m.room.member", "@a")), Some(&vec!["e1".to_owned()]));
		assert_eq!(conflicted.get(&key("m.room.member", "@b")), Some(&vec!["e2".to_owned()]));
	}
}
