use core::f64::consts::PI;
use fact_dom::{
	canvas::{FlushReport, Operation, OperationKind, PaintStyle},
	host::memory::{Draw, MemoryHost, NodeId},
	tuple, Diff, Engine, ProtocolError, Value,
};

fn apply(engine: &mut Engine<MemoryHost>, adds: Vec<Vec<Value>>, removes: Vec<Vec<Value>>) -> Result<(), ProtocolError> {
	engine.handle_diff(&Diff { adds, removes })
}

fn operation(id: &str, kind: &str) -> Vec<Value> {
	tuple!["canvas/export operations", id, kind]
}

fn argument(id: &str, field: &str, value: impl Into<Value>) -> Vec<Value> {
	let value: Value = value.into();
	tuple!["canvas/export operation attributes", id, field, value]
}

fn step(path: &str, operation: &str, index: i32) -> Vec<Value> {
	tuple!["canvas/export path operations", path, operation, index]
}

/// Canvas `C` rendered as instance `cv`, drawing path `p` first.
fn canvas() -> (Engine<MemoryHost>, NodeId) {
	let mut engine = Engine::new(MemoryHost::new());
	apply(
		&mut engine,
		vec![
			tuple!["html/export instances", "cv", "C", "canvas"],
			tuple!["html/export roots", "cv"],
			tuple!["canvas/export instances", "C", "cv"],
			tuple!["canvas/export paths", "p"],
			tuple!["canvas/export canvas paths", "C", "p", 1],
		],
		vec![],
	)
	.unwrap();
	let node = engine.instances().get(&"cv".into()).unwrap().node;
	engine.flush();
	engine.host_mut().take_draws();
	(engine, node)
}

fn compiled(engine: &Engine<MemoryHost>, path: &str) -> Vec<Operation> {
	engine.canvases().compiled(&path.into()).map(|compiled| compiled.operations.clone()).unwrap_or_default()
}

#[test]
fn line_compiles_and_paints() {
	let (mut engine, node) = canvas();
	apply(
		&mut engine,
		vec![
			operation("o1", "moveTo"),
			operation("o2", "lineTo"),
			argument("o1", "x", 0),
			argument("o1", "y", 0),
			argument("o2", "x", 10),
			argument("o2", "y", 10),
			step("p", "o1", 1),
			step("p", "o2", 2),
		],
		vec![],
	)
	.unwrap();
	assert!(engine.canvases().is_dirty(&"p".into()));

	assert_eq!(engine.flush(), FlushReport { compiled: 1, painted: 1 });
	let line = vec![Operation::MoveTo { x: 0.0, y: 0.0 }, Operation::LineTo { x: 10.0, y: 10.0 }];
	assert_eq!(
		engine.host_mut().take_draws(),
		[
			Draw::Clear(node),
			Draw::Paint {
				canvas: node,
				operations: line,
				style: PaintStyle::default(),
			},
		]
	);

	// Dropping the second operation leaves a hole.
	apply(&mut engine, vec![], vec![operation("o2", "lineTo"), step("p", "o2", 2)]).unwrap();
	engine.flush();
	assert_eq!(compiled(&engine, "p"), [Operation::MoveTo { x: 0.0, y: 0.0 }]);
}

#[test]
fn arguments_may_arrive_later() {
	let (mut engine, _) = canvas();
	apply(&mut engine, vec![operation("o1", "rect"), step("p", "o1", 1), argument("o1", "x", 1), argument("o1", "y", 2)], vec![]).unwrap();
	engine.flush();
	assert!(compiled(&engine, "p").is_empty());

	apply(&mut engine, vec![argument("o1", "width", 3), argument("o1", "height", "4")], vec![]).unwrap();
	assert!(engine.canvases().is_dirty(&"p".into()));
	engine.flush();
	assert_eq!(
		compiled(&engine, "p"),
		[Operation::Rect {
			x: 1.0,
			y: 2.0,
			width: 3.0,
			height: 4.0,
		}]
	);
}

#[test]
fn arc_defaults() {
	let (mut engine, _) = canvas();
	apply(
		&mut engine,
		vec![
			operation("a", "arc"),
			argument("a", "x", 5),
			argument("a", "y", 5),
			argument("a", "radius", 3),
			step("p", "a", 1),
		],
		vec![],
	)
	.unwrap();
	engine.flush();
	assert_eq!(
		compiled(&engine, "p"),
		[Operation::Arc {
			x: 5.0,
			y: 5.0,
			radius: 3.0,
			start_angle: 0.0,
			end_angle: 2.0 * PI,
			anticlockwise: false,
		}]
	);
}

#[test]
fn incomplete_operations_are_skipped() {
	let (mut engine, _) = canvas();
	apply(
		&mut engine,
		vec![
			operation("m", "moveTo"),
			argument("m", "x", 1),
			argument("m", "y", 1),
			operation("a", "arc"),
			argument("a", "x", 5),
			argument("a", "y", 5),
			argument("a", "anticlockwise", "true"),
			step("p", "m", 1),
			step("p", "a", 2),
		],
		vec![],
	)
	.unwrap();
	engine.flush();
	assert_eq!(compiled(&engine, "p"), [Operation::MoveTo { x: 1.0, y: 1.0 }]);
}

#[test]
fn dirty_marks_coalesce_into_one_flush() {
	let (mut engine, node) = canvas();
	let before = engine.host().scheduled_flushes();
	apply(&mut engine, vec![operation("r", "rect"), step("p", "r", 1)], vec![]).unwrap();
	apply(&mut engine, vec![argument("r", "x", 0), argument("r", "y", 0)], vec![]).unwrap();
	apply(&mut engine, vec![argument("r", "width", 5)], vec![]).unwrap();
	apply(&mut engine, vec![argument("r", "height", 5)], vec![]).unwrap();
	apply(&mut engine, vec![tuple!["canvas/export path styles", "p", "fillStyle", "red"]], vec![]).unwrap();
	assert_eq!(engine.host().scheduled_flushes(), before + 1);

	assert_eq!(engine.flush(), FlushReport { compiled: 1, painted: 1 });
	let draws = engine.host_mut().take_draws();
	assert_eq!(draws.len(), 2);
	assert_eq!(draws[0], Draw::Clear(node));

	// Nothing left to do.
	assert_eq!(engine.flush(), FlushReport::default());
	assert!(engine.host().draws().is_empty());
}

#[test]
fn unsupported_kinds_are_skipped() {
	let (mut engine, _) = canvas();
	engine.host_mut().unsupport(OperationKind::Ellipse);
	apply(
		&mut engine,
		vec![
			operation("e", "ellipse"),
			argument("e", "x", 0),
			argument("e", "y", 0),
			argument("e", "radiusX", 2),
			argument("e", "radiusY", 1),
			operation("c", "closePath"),
			step("p", "e", 1),
			step("p", "c", 2),
		],
		vec![],
	)
	.unwrap();
	engine.flush();
	assert_eq!(compiled(&engine, "p"), [Operation::ClosePath]);
}

#[test]
fn bezier_alias() {
	assert_eq!(OperationKind::parse("bezierQuadraticCurveTo"), Some(OperationKind::BezierCurveTo));
	assert_eq!(OperationKind::parse("fillText"), None);
	for kind in OperationKind::ALL {
		assert_eq!(OperationKind::parse(kind.name()), Some(kind));
	}
}

#[test]
fn path_styles() {
	let (mut engine, node) = canvas();
	let style = |property: &str, value: &str| tuple!["canvas/export path styles", "p", property, value];
	apply(&mut engine, vec![style("strokeStyle", "red"), style("lineWidth", "3"), style("lineCap", "round")], vec![]).unwrap();
	engine.flush();
	let painted = engine.host_mut().take_draws().into_iter().find_map(|draw| match draw {
		Draw::Paint { canvas, style, .. } if canvas == node => Some(style),
		_ => None,
	});
	assert_eq!(
		painted,
		Some(PaintStyle {
			fill_style: PaintStyle::DEFAULT_COLOR.to_owned(),
			stroke_style: "red".to_owned(),
			line_width: 3.0,
			line_cap: "round".to_owned(),
			line_join: "miter".to_owned(),
			stroke: true,
			fill: false,
		})
	);

	apply(&mut engine, vec![style("fillStyle", "blue")], vec![style("lineCap", "round")]).unwrap();
	engine.flush();
	let resolved = engine.canvases().path_style(&"p".into()).unwrap().resolve();
	assert!(resolved.stroke && resolved.fill);
	assert_eq!(resolved.line_cap, "butt");
}

#[test]
fn protocol_errors() {
	let (mut engine, _) = canvas();

	let error = apply(&mut engine, vec![operation("o", "fillText")], vec![]).unwrap_err();
	assert_eq!(error.name(), "UnknownOperationKind");

	let error = apply(&mut engine, vec![tuple!["canvas/export paths", "p"]], vec![]).unwrap_err();
	assert_eq!(error, ProtocolError::DuplicatePath("p".into()));

	apply(&mut engine, vec![operation("o", "moveTo"), argument("o", "x", 1)], vec![]).unwrap();
	let error = apply(&mut engine, vec![operation("o", "lineTo")], vec![]).unwrap_err();
	assert_eq!(error, ProtocolError::DuplicateOperation("o".into()));
	let error = apply(&mut engine, vec![argument("o", "x", 2)], vec![]).unwrap_err();
	assert_eq!(error.name(), "OverwriteError");

	let error = apply(&mut engine, vec![step("nowhere", "o", 1)], vec![]).unwrap_err();
	assert_eq!(error, ProtocolError::UnknownPath("nowhere".into()));
	let error = apply(&mut engine, vec![step("p", "nothing", 1)], vec![]).unwrap_err();
	assert_eq!(error, ProtocolError::UnknownOperation("nothing".into()));

	let error = apply(&mut engine, vec![], vec![tuple!["canvas/export paths", "nowhere"]]).unwrap_err();
	assert_eq!(error.name(), "UnknownPath");
	let error = apply(&mut engine, vec![], vec![operation("nothing", "moveTo")]).unwrap_err();
	assert_eq!(error.name(), "UnknownOperation");

	// Tolerated.
	apply(&mut engine, vec![], vec![argument("nothing", "x", 1), tuple!["canvas/export path styles", "nowhere", "fillStyle", "red"]]).unwrap();
}

#[test]
fn removed_path_is_no_longer_drawn() {
	let (mut engine, node) = canvas();
	apply(&mut engine, vec![operation("c", "closePath"), step("p", "c", 1)], vec![]).unwrap();
	engine.flush();
	assert!(engine.canvases().compiled(&"p".into()).is_some());
	engine.host_mut().take_draws();

	apply(&mut engine, vec![], vec![tuple!["canvas/export paths", "p"], tuple!["canvas/export canvas paths", "C", "p", 1]]).unwrap();
	engine.flush();
	assert!(engine.canvases().compiled(&"p".into()).is_none());
	assert_eq!(engine.host().draws(), [Draw::Clear(node)]);
}

#[test]
fn late_surface_is_painted() {
	let mut engine = Engine::new(MemoryHost::new());
	apply(
		&mut engine,
		vec![
			tuple!["canvas/export paths", "p"],
			operation("c", "closePath"),
			step("p", "c", 1),
			tuple!["canvas/export canvas paths", "C", "p", 1],
		],
		vec![],
	)
	.unwrap();
	assert_eq!(engine.flush(), FlushReport { compiled: 1, painted: 0 });

	apply(
		&mut engine,
		vec![tuple!["html/export instances", "cv", "C", "canvas"], tuple!["canvas/export instances", "C", "cv"]],
		vec![],
	)
	.unwrap();
	let report = engine.flush();
	assert_eq!(report.painted, 1);
	assert_eq!(engine.canvases().surfaces_of(&"C".into()), [Value::from("cv")]);
	assert!(matches!(engine.host().draws().last(), Some(Draw::Paint { operations, .. }) if operations == &[Operation::ClosePath]));
}

#[test]
fn invalid_indices_are_ignored() {
	let (mut engine, _) = canvas();
	apply(&mut engine, vec![operation("c", "closePath"), step("p", "c", 0), tuple!["canvas/export path operations", "p", "c", "first"]], vec![]).unwrap();
	engine.flush();
	assert!(compiled(&engine, "p").is_empty());
}

#[test]
fn far_indices_leave_holes() {
	let (mut engine, node) = canvas();
	apply(
		&mut engine,
		vec![
			operation("m", "moveTo"),
			argument("m", "x", 1),
			argument("m", "y", 1),
			operation("c", "closePath"),
			step("p", "m", 1),
			tuple!["canvas/export path operations", "p", "c", 1e300],
			tuple!["canvas/export canvas paths", "C", "p", 1e9],
		],
		vec![],
	)
	.unwrap();
	assert_eq!(engine.flush(), FlushReport { compiled: 1, painted: 1 });
	assert_eq!(compiled(&engine, "p"), [Operation::MoveTo { x: 1.0, y: 1.0 }, Operation::ClosePath]);

	// `p` now sits in two slots of `C`, so it is painted twice.
	let draws = engine.host_mut().take_draws();
	assert_eq!(draws.len(), 3);
	assert_eq!(draws[0], Draw::Clear(node));

	apply(&mut engine, vec![], vec![tuple!["canvas/export path operations", "p", "c", 1e300]]).unwrap();
	engine.flush();
	assert_eq!(compiled(&engine, "p"), [Operation::MoveTo { x: 1.0, y: 1.0 }]);
}

#[test]
fn recreated_operations_keep_dirtying_their_paths() {
	let (mut engine, _) = canvas();
	apply(&mut engine, vec![operation("o", "moveTo"), argument("o", "x", 2), argument("o", "y", 2), step("p", "o", 1)], vec![]).unwrap();
	engine.flush();

	// Re-create `o` while `p` keeps referencing it.
	apply(
		&mut engine,
		vec![operation("o", "moveTo"), argument("o", "x", 2), argument("o", "y", 2)],
		vec![operation("o", "moveTo"), argument("o", "x", 2), argument("o", "y", 2)],
	)
	.unwrap();
	engine.flush();
	assert_eq!(compiled(&engine, "p"), [Operation::MoveTo { x: 2.0, y: 2.0 }]);

	apply(&mut engine, vec![argument("o", "x", 9)], vec![argument("o", "x", 2)]).unwrap();
	assert!(engine.canvases().is_dirty(&"p".into()));
	engine.flush();
	assert_eq!(compiled(&engine, "p"), [Operation::MoveTo { x: 9.0, y: 2.0 }]);
}
