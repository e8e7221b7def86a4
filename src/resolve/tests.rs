//! The concrete scenarios from §8 of the specification.

use std::collections::HashMap;

use serde_json::json;

use crate::{
	resolve::{resolve, StateMap},
	rules::StandardRoomVersion,
	test_utils::{event, minimal_room, TestStore},
};

fn state_map(pairs: &[(&str, &str, &str)]) -> StateMap<String> {
	pairs
		.iter()
		.map(|&(ty, sk, id)| ((ty.to_owned(), sk.to_owned()), id.to_owned()))
		.collect()
}

#[tokio::test]
async fn single_state_set_passes_through_unchanged() {
	let room_id = "!room:example.org";
	let events = minimal_room(room_id, "@creator:example.org");
	let store = TestStore::new(events);

	let set = state_map(&[
		("m.room.create", "", "$create"),
		("m.room.member", "@creator:example.org", "$join"),
		("m.room.power_levels", "", "$power_levels"),
	]);

	let resolved = resolve(room_id, &StandardRoomVersion, &[set.clone()], None, &store)
		.await
		.unwrap();

	assert_eq!(resolved, set);
}

#[tokio::test]
async fn agreeing_state_sets_pass_through_unchanged() {
	let room_id = "!room:example.org";
	let events = minimal_room(room_id, "@creator:example.org");
	let store = TestStore::new(events);

	let set = state_map(&[
		("m.room.create", "", "$create"),
		("m.room.member", "@creator:example.org", "$join"),
		("m.room.power_levels", "", "$power_levels"),
	]);

	let resolved = resolve(room_id, &StandardRoomVersion, &[set.clone(), set.clone()], None, &store)
		.await
		.unwrap();

	assert_eq!(resolved, set);
}

/// Two conflicting `m.room.power_levels` events: `$pl_a`, authored earlier by
/// the (power-100) creator, must win over `$pl_b`, authored later by a
/// power-50 user.
#[tokio::test]
async fn higher_power_sender_wins_power_level_conflict() {
	let room_id = "!room:example.org";
	let creator = "@creator:example.org";
	let mut events = minimal_room(room_id, creator);

	let pl_a = event(
		"$pl_a",
		room_id,
		creator,
		"m.room.power_levels",
		Some(""),
		json!({ "users": { creator: 100 }, "users_default": 0, "ban": 50 }),
		&["$create", "$join", "$power_levels"],
		10,
	);
	let pl_b = event(
		"$pl_b",
		room_id,
		creator,
		"m.room.power_levels",
		Some(""),
		json!({ "users": { creator: 100 }, "users_default": 0, "ban": 75 }),
		&["$create", "$join", "$power_levels"],
		20,
	);
	events.push(pl_a);
	events.push(pl_b);
	let store = TestStore::new(events);

	let base = state_map(&[
		("m.room.create", "", "$create"),
		("m.room.member", creator, "$join"),
	]);
	let mut set_a = base.clone();
	set_a.insert(("m.room.power_levels".to_owned(), String::new()), "$pl_a".to_owned());
	let mut set_b = base;
	set_b.insert(("m.room.power_levels".to_owned(), String::new()), "$pl_b".to_owned());

	let resolved = resolve(room_id, &StandardRoomVersion, &[set_a, set_b], None, &store)
		.await
		.unwrap();

	assert_eq!(
		resolved.get(&("m.room.power_levels".to_owned(), String::new())),
		Some(&"$pl_a".to_owned())
	);
}

/// One state set bans `@x`, the other has `@x` still joined. The ban,
/// issued by the power-100 creator, must be authorized and win.
#[tokio::test]
async fn ban_by_higher_power_sender_wins_over_stale_join() {
	let room_id = "!room:example.org";
	let creator = "@creator:example.org";
	let target = "@x:example.org";
	let mut events = minimal_room(room_id, creator);

	let target_join = event(
		"$x_join",
		room_id,
		target,
		"m.room.member",
		Some(target),
		json!({ "membership": "join" }),
		&["$create", "$power_levels", "$join"],
		10,
	);
	let ban = event(
		"$x_ban",
		room_id,
		creator,
		"m.room.member",
		Some(target),
		json!({ "membership": "ban" }),
		&["$create", "$power_levels", "$join", "$x_join"],
		20,
	);
	events.push(target_join.clone());
	events.push(ban.clone());
	let store = TestStore::new(events);

	let base = state_map(&[
		("m.room.create", "", "$create"),
		("m.room.member", creator, "$join"),
		("m.room.power_levels", "", "$power_levels"),
	]);
	let mut set_joined = base.clone();
	set_joined.insert(("m.room.member".to_owned(), target.to_owned()), "$x_join".to_owned());
	let mut set_banned = base;
	set_banned.insert(("m.room.member".to_owned(), target.to_owned()), "$x_ban".to_owned());

	let resolved = resolve(room_id, &StandardRoomVersion, &[set_joined, set_banned], None, &store)
		.await
		.unwrap();

	assert_eq!(
		resolved.get(&("m.room.member".to_owned(), target.to_owned())),
		Some(&"$x_ban".to_owned())
	);
}

#[tokio::test]
async fn seeded_event_map_avoids_extra_store_round_trips() {
	let room_id = "!room:example.org";
	let events = minimal_room(room_id, "@creator:example.org");
	let store = TestStore::new(events.clone());
	let seed: HashMap<String, _> = events.into_iter().map(|e| (e.event_id.clone(), e)).collect();

	let set = state_map(&[
		("m.room.create", "", "$create"),
		("m.room.member", "@creator:example.org", "$join"),
		("m.room.power_levels", "", "$power_levels"),
	]);

	let resolved = resolve(room_id, &StandardRoomVersion, &[set.clone()], Some(seed), &store)
		.await
		.unwrap();

	assert_eq!(resolved, set);
}

/// Set A has only `@a`'s join, set B has only `@b`'s join: both keys are
/// "conflicted" (present in one input, absent in the other) with a single
/// candidate each. Both should survive into the resolved state once their
/// events authorize, and unconflicted state covers only what both sets agree
/// on (create, the creator's own join, power levels, join rules).
#[tokio::test]
async fn disjoint_keys_both_survive_resolution() {
	let room_id = "!room:example.org";
	let creator = "@creator:example.org";
	let a = "@a:example.org";
	let b = "@b:example.org";
	let mut events = minimal_room(room_id, creator);

	let join_rules = event(
		"$join_rules",
		room_id,
		creator,
		"m.room.join_rules",
		Some(""),
		json!({ "join_rule": "public" }),
		&["$create", "$join", "$power_levels"],
		3,
	);
	let a_join = event(
		"$a_join",
		room_id,
		a,
		"m.room.member",
		Some(a),
		json!({ "membership": "join" }),
		&["$create", "$power_levels", "$join_rules"],
		10,
	);
	let b_join = event(
		"$b_join",
		room_id,
		b,
		"m.room.member",
		Some(b),
		json!({ "membership": "join" }),
		&["$create", "$power_levels", "$join_rules"],
		11,
	);
	events.push(join_rules);
	events.push(a_join);
	events.push(b_join);
	let store = TestStore::new(events);

	let base = state_map(&[
		("m.room.create", "", "$create"),
		("m.room.member", creator, "$join"),
		("m.room.power_levels", "", "$power_levels"),
		("m.room.join_rules", "", "$join_rules"),
	]);
	let mut set_a = base.clone();
	set_a.insert(("m.room.member".to_owned(), a.to_owned()), "$a_join".to_owned());
	let mut set_b = base;
	set_b.insert(("m.room.member".to_owned(), b.to_owned()), "$b_join".to_owned());

	let resolved = resolve(room_id, &StandardRoomVersion, &[set_a, set_b], None, &store)
		.await
		.unwrap();

	assert_eq!(resolved.get(&("m.room.member".to_owned(), a.to_owned())), Some(&"$a_join".to_owned()));
	assert_eq!(resolved.get(&("m.room.member".to_owned(), b.to_owned())), Some(&"$b_join".to_owned()));
}

/// `$topic_low` is anchored (via its own `auth_events`) on the room's
/// original power-levels event, mainline depth 1; `$topic_high` is anchored
/// on that event's successor, depth 2. Despite an earlier `origin_server_ts`,
/// the depth-2 event is processed after the depth-1 one and so wins the
/// conflict: mainline depth dominates the timestamp tie-break, not the
/// other way around.
#[tokio::test]
async fn mainline_depth_orders_before_timestamp() {
	let room_id = "!room:example.org";
	let creator = "@creator:example.org";
	let mut events = minimal_room(room_id, creator);

	let power_levels_v2 = event(
		"$power_levels_v2",
		room_id,
		creator,
		"m.room.power_levels",
		Some(""),
		json!({ "users": { creator: 100 }, "users_default": 0 }),
		&["$create", "$join", "$power_levels"],
		5,
	);
	let topic_low = event(
		"$topic_low",
		room_id,
		creator,
		"m.room.topic",
		Some(""),
		json!({ "topic": "low" }),
		&["$create", "$power_levels", "$join"],
		100,
	);
	let topic_high = event(
		"$topic_high",
		room_id,
		creator,
		"m.room.topic",
		Some(""),
		json!({ "topic": "high" }),
		&["$create", "$power_levels_v2", "$join"],
		50,
	);
	events.push(power_levels_v2);
	events.push(topic_low);
	events.push(topic_high);
	let store = TestStore::new(events);

	let base = state_map(&[
		("m.room.create", "", "$create"),
		("m.room.member", creator, "$join"),
		("m.room.power_levels", "", "$power_levels_v2"),
	]);
	let mut set_low = base.clone();
	set_low.insert(("m.room.topic".to_owned(), String::new()), "$topic_low".to_owned());
	let mut set_high = base;
	set_high.insert(("m.room.topic".to_owned(), String::new()), "$topic_high".to_owned());

	let resolved = resolve(room_id, &StandardRoomVersion, &[set_low, set_high], None, &store)
		.await
		.unwrap();

	assert_eq!(
		resolved.get(&("m.room.topic".to_owned(), String::new())),
		Some(&"$topic_high".to_owned())
	);
}
