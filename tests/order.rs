use core::cmp::Ordering;
use fact_dom::{
	error::MissingSide,
	host::{memory::MemoryHost, DomHost},
	order::natural_cmp,
	tuple, Diff, Engine, ProtocolError, Value,
};

fn apply(engine: &mut Engine<MemoryHost>, adds: Vec<Vec<Value>>, removes: Vec<Vec<Value>>) -> Result<(), ProtocolError> {
	engine.handle_diff(&Diff { adds, removes })
}

/// A root `list` with children `a`…`e` of one element each.
fn list() -> Engine<MemoryHost> {
	let mut engine = Engine::new(MemoryHost::new());
	let mut adds = vec![tuple!["html/export instances", "list", "list", "ul"], tuple!["html/export roots", "list"]];
	for child in ["a", "b", "c", "d", "e"] {
		adds.push(tuple!["html/export instances", child, child, "li"]);
		adds.push(tuple!["html/export parents", child, "list"]);
	}
	apply(&mut engine, adds, vec![]).unwrap();
	engine
}

fn children(engine: &Engine<MemoryHost>) -> Vec<String> {
	let list = engine.instances().get(&"list".into()).unwrap().node;
	engine.host().child_instances(list).iter().map(ToString::to_string).collect()
}

#[test]
fn natural_comparison() {
	assert_eq!(natural_cmp("2", "10"), Ordering::Less);
	assert_eq!(natural_cmp("item 9", "Item 10"), Ordering::Less);
	assert_eq!(natural_cmp("b", "A"), Ordering::Greater);
	assert_eq!(natural_cmp("a", "A"), Ordering::Less);
	assert_eq!(natural_cmp("x", "x"), Ordering::Equal);
	assert_eq!(natural_cmp("", "a"), Ordering::Less);
	assert_eq!(natural_cmp("a2b", "a10a"), Ordering::Less);
}

#[test]
fn numeric_values_sort_numerically() {
	let mut engine = list();
	apply(
		&mut engine,
		vec![
			tuple!["html/export attributes", "a", "sort", 10],
			tuple!["html/export attributes", "b", "sort", 2],
			tuple!["html/export attributes", "c", "sort", 1],
			tuple!["html/export attributes", "d", "sort", "9"],
			tuple!["html/export attributes", "e", "sort", 2.5],
		],
		vec![],
	)
	.unwrap();
	assert_eq!(children(&engine), ["c", "b", "e", "d", "a"]);
}

#[test]
fn reinserting_a_sort_key_restores_order() {
	let mut engine = list();
	let sorts = [("a", 3), ("b", 1), ("c", 4), ("d", 2), ("e", 5)];
	apply(
		&mut engine,
		sorts.iter().map(|&(child, sort)| tuple!["html/export attributes", child, "sort", sort]).collect(),
		vec![],
	)
	.unwrap();
	let ordered = children(&engine);
	assert_eq!(ordered, ["b", "d", "a", "c", "e"]);

	// Move `d` away, then give it back its key.
	apply(&mut engine, vec![tuple!["html/export attributes", "d", "sort", 99]], vec![tuple!["html/export attributes", "d", "sort", 2]]).unwrap();
	assert_eq!(children(&engine), ["b", "a", "c", "e", "d"]);
	apply(&mut engine, vec![tuple!["html/export attributes", "d", "sort", 2]], vec![tuple!["html/export attributes", "d", "sort", 99]]).unwrap();
	assert_eq!(children(&engine), ordered);
}

#[test]
fn auto_index_only_applies_without_sort() {
	let mut engine = list();
	apply(
		&mut engine,
		vec![
			tuple!["html/export attributes", "a", "eve-auto-index", 5],
			tuple!["html/export attributes", "b", "eve-auto-index", 4],
			tuple!["html/export attributes", "c", "eve-auto-index", 3],
			tuple!["html/export attributes", "d", "eve-auto-index", 2],
			tuple!["html/export attributes", "e", "eve-auto-index", 1],
		],
		vec![],
	)
	.unwrap();
	assert_eq!(children(&engine), ["e", "d", "c", "b", "a"]);

	// An explicit key wins over later auto-index changes.
	apply(&mut engine, vec![tuple!["html/export attributes", "e", "sort", 6]], vec![]).unwrap();
	assert_eq!(children(&engine), ["d", "c", "b", "a", "e"]);
	apply(&mut engine, vec![tuple!["html/export attributes", "e", "eve-auto-index", 0]], vec![]).unwrap();
	assert_eq!(children(&engine), ["d", "c", "b", "a", "e"]);
	assert_eq!(engine.instances().get(&"e".into()).unwrap().effective_sort(), Some(&Value::from(6)));
}

#[test]
fn sorted_children_keep_position_when_reparented() {
	let mut engine = Engine::new(MemoryHost::new());
	apply(
		&mut engine,
		vec![
			tuple!["html/export instances", "p", "p", "div"],
			tuple!["html/export instances", "x", "x", "span"],
			tuple!["html/export instances", "y", "y", "span"],
			tuple!["html/export attributes", "x", "sort", "b"],
			tuple!["html/export attributes", "y", "sort", "a"],
			tuple!["html/export parents", "x", "p"],
			tuple!["html/export parents", "y", "p"],
		],
		vec![],
	)
	.unwrap();
	let p = engine.instances().get(&"p".into()).unwrap().node;
	assert_eq!(engine.host().child_instances(p), vec![Value::from("y"), "x".into()]);
}

#[test]
fn keyless_children_are_appended() {
	let mut engine = list();
	apply(&mut engine, vec![tuple!["html/export attributes", "a", "sort", 1], tuple!["html/export attributes", "b", "sort", 2]], vec![]).unwrap();
	apply(
		&mut engine,
		vec![tuple!["html/export instances", "z", "z", "li"], tuple!["html/export parents", "z", "list"]],
		vec![],
	)
	.unwrap();
	assert_eq!(children(&engine).last().map(String::as_str), Some("z"));
}

#[test]
fn keyed_children_stay_ordered_among_keyless_ones() {
	let mut engine = list();
	apply(&mut engine, vec![tuple!["html/export attributes", "e", "sort", 1]], vec![]).unwrap();
	assert_eq!(children(&engine), ["a", "b", "c", "d", "e"]);

	// Keyless siblings don't bound the search, so `a` lands after `e` instead of in front of `b`.
	apply(&mut engine, vec![tuple!["html/export attributes", "a", "sort", 2]], vec![]).unwrap();
	assert_eq!(children(&engine), ["b", "c", "d", "e", "a"]);

	apply(&mut engine, vec![tuple!["html/export attributes", "c", "sort", 0]], vec![]).unwrap();
	assert_eq!(children(&engine), ["b", "d", "c", "e", "a"]);
}

#[test]
fn roots_are_ordered_in_the_container() {
	let mut engine = Engine::new(MemoryHost::new());
	apply(
		&mut engine,
		vec![
			tuple!["html/export instances", "r1", "r1", "div"],
			tuple!["html/export instances", "r2", "r2", "div"],
			tuple!["html/export attributes", "r1", "sort", 2],
			tuple!["html/export attributes", "r2", "sort", 1],
			tuple!["html/export roots", "r1"],
			tuple!["html/export roots", "r2"],
		],
		vec![],
	)
	.unwrap();
	let host = engine.host();
	assert_eq!(host.child_instances(host.container()), vec![Value::from("r2"), "r1".into()]);
}

#[test]
fn reparenting_reports_the_missing_side() {
	let mut engine = list();
	let missing = |engine: &mut Engine<MemoryHost>, instance: &str, parent: &str| match apply(engine, vec![tuple!["html/export parents", instance, parent]], vec![]) {
		Err(ProtocolError::Reparent { missing, .. }) => missing,
		other => panic!("Expected a reparenting error, got {:?}", other),
	};
	assert_eq!(missing(&mut engine, "ghost", "list"), MissingSide::Instance);
	assert_eq!(missing(&mut engine, "a", "ghost"), MissingSide::Parent);
	assert_eq!(missing(&mut engine, "ghost", "phantom"), MissingSide::Both);
}

#[test]
fn parent_removal_detaches_only_from_that_parent() {
	let mut engine = list();
	apply(&mut engine, vec![tuple!["html/export instances", "other", "other", "ul"]], vec![]).unwrap();

	// Stale edge: `a` isn't a child of `other`.
	apply(&mut engine, vec![], vec![tuple!["html/export parents", "a", "other"]]).unwrap();
	assert_eq!(children(&engine), ["a", "b", "c", "d", "e"]);

	apply(&mut engine, vec![], vec![tuple!["html/export parents", "a", "list"]]).unwrap();
	assert_eq!(children(&engine), ["b", "c", "d", "e"]);
}
