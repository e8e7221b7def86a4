//! The lexicographic topological sort (§4.7): a reusable Kahn's-algorithm
//! primitive used by [`super::power_sort`].

use std::{
	cmp::{Ordering, Reverse},
	collections::{BinaryHeap, HashMap, HashSet},
};

struct TieBreaker<'a> {
	power_level: i64,
	origin_server_ts: i64,
	event_id: &'a str,
}

impl PartialEq for TieBreaker<'_> {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}
impl Eq for TieBreaker<'_> {}

// Power level comparison is intentionally reversed: a *higher* power level
// should sort *earlier*, i.e. compare as "smaller".
impl Ord for TieBreaker<'_> {
	fn cmp(&self, other: &Self) -> Ordering {
		other
			.power_level
			.cmp(&self.power_level)
			.then(self.origin_server_ts.cmp(&other.origin_server_ts))
			.then(self.event_id.cmp(other.event_id))
	}
}

impl PartialOrd for TieBreaker<'_> {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

/// Sort `graph` (event id → its out-edges, i.e. auth events in scope) into
/// reverse topological order, breaking ties using `key` — a lookup of
/// `(power_level, origin_server_ts)` for an event id, expected to be total
/// over every key of `graph`.
///
/// Mutates nothing in `graph` itself; the internal adjacency copy is
/// consumed as nodes are emitted.
pub fn topological_sort(
	graph: &HashMap<String, HashSet<String>>,
	key: impl Fn(&str) -> (i64, i64),
) -> Vec<String> {
	let mut incoming_edges: HashMap<&str, HashSet<&str>> = HashMap::new();
	let mut zero_outdeg = Vec::new();

	for (event_id, out_edges) in graph {
		incoming_edges.entry(event_id).or_default();
		if out_edges.is_empty() {
			let (power_level, origin_server_ts) = key(event_id);
			zero_outdeg.push(Reverse(TieBreaker { power_level, origin_server_ts, event_id }));
		}
		for auth_event_id in out_edges {
			incoming_edges.entry(auth_event_id).or_default().insert(event_id);
		}
	}

	let mut out_edges: HashMap<&str, HashSet<&str>> =
		graph.iter().map(|(k, v)| (k.as_str(), v.iter().map(String::as_str).collect())).collect();

	let mut heap = BinaryHeap::from(zero_outdeg);
	let mut sorted = Vec::with_capacity(graph.len());

	while let Some(Reverse(item)) = heap.pop() {
		for &parent_id in incoming_edges
			.get(item.event_id)
			.expect("every emitted id was added to incoming_edges above")
		{
			let parent_out = out_edges
				.get_mut(parent_id)
				.expect("out_edges contains every graph key");
			parent_out.remove(item.event_id);
			if parent_out.is_empty() {
				let (power_level, origin_server_ts) = key(parent_id);
				heap.push(Reverse(TieBreaker { power_level, origin_server_ts, event_id: parent_id }));
			}
		}
		sorted.push(item.event_id.to_owned());
	}

	sorted
}

#[cfg(test)]
mod tests {
	use super::*;
	use maplit::{hashmap, hashset};

	#[test]
	fn linear_chain_sorts_oldest_first() {
		let graph = hashmap! {
			"c".to_owned() => hashset!{"b".to_owned()},
			"b".to_owned() => hashset!{"a".to_owned()},
			"a".to_owned() => hashset!{},
		};
		let ts = hashmap! { "a" => 1_i64, "b" => 2, "c" => 3 };
		let sorted = topological_sort(&graph, |id| (0, ts[id]));
		assert_eq!(sorted, vec!["a", "b", "c"]);
	}

	#[test]
	fn ties_break_on_power_then_ts_then_id() {
		let graph = hashmap! {
			"x".to_owned() => hashset!{},
			"y".to_owned() => hashset!{},
		};
		// same power level and ts, "x" < "y" lexicographically
		let sorted = topological_sort(&graph, |_| (10, 100));
		assert_eq!(sorted, vec!["x", "y"]);
	}
}
