use fact_dom::{
	host::memory::MemoryHost,
	styles::class_name,
	tuple, Diff, Engine, ProtocolError, Value,
};

fn apply(engine: &mut Engine<MemoryHost>, adds: Vec<Vec<Value>>, removes: Vec<Vec<Value>>) -> Result<(), ProtocolError> {
	engine.handle_diff(&Diff { adds, removes })
}

fn style(id: &str, property: &str, value: impl Into<Value>) -> Vec<Value> {
	let value: Value = value.into();
	tuple!["html/export styles", id, property, value]
}

#[test]
fn class_names_are_stable() {
	let class = class_name("s-", &"s1".into());
	assert!(class.starts_with("s-"));
	assert_eq!(class.len(), 2 + 16);
	assert!(class[2..].chars().all(|c| c.is_ascii_hexdigit()));
	assert_eq!(class, class_name("s-", &"s1".into()));
	assert_ne!(class, class_name("s-", &"s2".into()));
	assert_ne!(class_name("s-", &1.into()), class_name("s-", &2.into()));
}

#[test]
fn declaration_block_ignores_insertion_order() {
	let mut forward = Engine::new(MemoryHost::new());
	apply(&mut forward, vec![style("s1", "color", "red"), style("s1", "margin", 0)], vec![]).unwrap();

	let mut backward = Engine::new(MemoryHost::new());
	apply(&mut backward, vec![style("s1", "margin", 0)], vec![]).unwrap();
	apply(&mut backward, vec![style("s1", "color", "red")], vec![]).unwrap();

	let class = forward.styles().class_of(&"s1".into());
	let expected = format!(".{} {{color: red; margin: 0;}}", class);
	assert_eq!(forward.host().rules(), [expected.as_str()]);
	assert_eq!(backward.host().rules(), forward.host().rules());
	assert_eq!(forward.styles().get(&"s1".into()).unwrap().to_declaration_block(), "color: red; margin: 0;");
}

#[test]
fn second_value_for_a_property_is_an_overwrite() {
	let mut engine = Engine::new(MemoryHost::new());
	apply(&mut engine, vec![style("s1", "color", "red")], vec![]).unwrap();

	let error = apply(&mut engine, vec![style("s1", "color", "blue")], vec![]).unwrap_err();
	assert_eq!(
		error,
		ProtocolError::StyleOverwrite {
			style: "s1".into(),
			property: "color".into(),
		}
	);
	assert_eq!(error.name(), "OverwriteError");

	// The first value survives.
	let class = engine.styles().class_of(&"s1".into());
	assert_eq!(engine.host().rules(), [format!(".{} {{color: red;}}", class).as_str()]);
}

#[test]
fn replacing_a_value_within_one_batch_is_fine() {
	let mut engine = Engine::new(MemoryHost::new());
	apply(&mut engine, vec![style("s1", "color", "red")], vec![]).unwrap();
	apply(&mut engine, vec![style("s1", "color", "blue")], vec![style("s1", "color", "red")]).unwrap();

	let class = engine.styles().class_of(&"s1".into());
	assert_eq!(engine.host().rules(), [format!(".{} {{color: blue;}}", class).as_str()]);
}

#[test]
fn removing_from_unknown_style_fails() {
	let mut engine = Engine::new(MemoryHost::new());
	let error = apply(&mut engine, vec![], vec![style("ghost", "color", "red")]).unwrap_err();
	assert_eq!(error, ProtocolError::UnknownStyle("ghost".into()));
}

#[test]
fn emptied_style_releases_its_rule() {
	let mut engine = Engine::new(MemoryHost::new());
	apply(&mut engine, vec![style("s1", "color", "red"), style("s1", "margin", 0)], vec![]).unwrap();
	assert_eq!(engine.host().rules().len(), 1);

	apply(&mut engine, vec![], vec![style("s1", "color", "red")]).unwrap();
	assert_eq!(engine.host().rules().len(), 1);
	assert!(engine.styles().get(&"s1".into()).is_some());

	apply(&mut engine, vec![], vec![style("s1", "margin", 0)]).unwrap();
	assert!(engine.host().rules().is_empty());
	assert!(engine.styles().get(&"s1".into()).is_none());

	// Gone for good now.
	let error = apply(&mut engine, vec![], vec![style("s1", "margin", 0)]).unwrap_err();
	assert_eq!(error.name(), "UnknownStyle");
}

#[test]
fn style_attribute_applies_the_synthetic_class() {
	let mut engine = Engine::new(MemoryHost::new());
	apply(
		&mut engine,
		vec![
			tuple!["html/export instances", "i1", "e1", "div"],
			style("s1", "color", "red"),
			tuple!["html/export attributes", "i1", "style", "s1"],
		],
		vec![],
	)
	.unwrap();
	let node = engine.instances().get(&"i1".into()).unwrap().node;
	let class = engine.styles().class_of(&"s1".into());
	assert_eq!(engine.host().node(node).classes, [class]);

	apply(&mut engine, vec![], vec![tuple!["html/export attributes", "i1", "style", "s1"]]).unwrap();
	assert!(engine.host().node(node).classes.is_empty());
}

#[test]
fn custom_class_prefix() {
	let mut engine = Engine::with_options(MemoryHost::new(), fact_dom::EngineOptions::default().with_class_prefix("style-"));
	apply(&mut engine, vec![style("s1", "color", "red")], vec![]).unwrap();
	assert!(engine.styles().class_of(&"s1".into()).starts_with("style-"));
	assert!(engine.host().rules()[0].starts_with(".style-"));
}
