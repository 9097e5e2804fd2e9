use fact_dom::{
	events::{MouseKind, NativeEvent, LEFT_BUTTON},
	host::memory::{Draw, MemoryHost},
	tuple, Diff, Engine, Inbound, Outbound, Runtime, Value,
};
use serde_json::json;
use std::{
	cell::RefCell,
	rc::{Rc, Weak},
};

fn diff(json: &str) -> Diff {
	serde_json::from_str(json).unwrap()
}

#[test]
fn wire_diffs_decode() {
	let decoded = diff(r#"{"adds": [["html/export instances", 1, "e1", "div"], ["html/export roots", 1]], "removes": []}"#);
	assert_eq!(decoded.adds[0], tuple!["html/export instances", 1, "e1", "div"]);
	assert_eq!(decoded.adds[1][1], Value::Number(1.0));
	assert!(decoded.removes.is_empty());

	// Both halves are optional.
	assert!(diff("{}").is_empty());
}

#[test]
fn outbound_wire_format() {
	let transaction = Outbound::Transaction(vec![["|1".into(), "tag".into(), "html/event".into()]]);
	assert_eq!(serde_json::to_value(&transaction).unwrap(), json!({ "transaction": [["|1", "tag", "html/event"]] }));

	let mut engine = Engine::new(MemoryHost::new());
	engine.handle_diff(&diff(r#"{"removes": [["html/export instances", "ghost", "e", "div"]]}"#)).unwrap_err();
	let notice = engine.take_outbound().pop().unwrap();
	assert_eq!(
		serde_json::to_value(&notice).unwrap(),
		json!({ "notice": {
			"type": "error",
			"name": "UnknownInstance",
			"message": "Unable to clear nonexistent instance 'ghost'"
		} })
	);
}

#[test]
fn reentrant_messages_are_queued() {
	let log = Rc::new(RefCell::new(Vec::new()));
	let handle: Rc<RefCell<Weak<Runtime<MemoryHost>>>> = Rc::default();

	let runtime = Rc::new(Runtime::new(Engine::new(MemoryHost::new()), {
		let log = Rc::clone(&log);
		let handle = Rc::clone(&handle);
		move |message: Outbound| {
			let answer = log.borrow().is_empty();
			log.borrow_mut().push(message);
			if !answer {
				return;
			}

			// Upstream answers synchronously.
			let runtime = handle.borrow().upgrade().unwrap();
			runtime.push(Inbound::Diff(Diff {
				adds: vec![tuple!["html/export instances", "answer", "A", "p"], tuple!["html/export roots", "answer"]],
				removes: vec![],
			}));
			runtime.push(Inbound::Diff(Diff {
				adds: vec![],
				removes: vec![tuple!["html/export instances", "ghost", "G", "p"]],
			}));
			assert!(!runtime.is_idle());
			assert!(!runtime.engine().instances().contains(&"answer".into()));
		}
	}));
	*handle.borrow_mut() = Rc::downgrade(&runtime);

	runtime.push(Inbound::Diff(Diff {
		adds: vec![tuple!["html/export instances", "btn", "B", "button"], tuple!["html/export roots", "btn"]],
		removes: vec![],
	}));
	assert!(log.borrow().is_empty());

	let target = runtime.engine().instances().get(&"btn".into()).unwrap().node;
	runtime.push(Inbound::Event(NativeEvent::Mouse {
		kind: MouseKind::Click,
		button: LEFT_BUTTON,
		page_x: 0.0,
		page_y: 0.0,
		window_x: 0.0,
		window_y: 0.0,
		target: Some(target),
	}));

	assert!(runtime.is_idle());
	assert!(runtime.engine().instances().contains(&"answer".into()));
	let log = log.borrow();
	assert_eq!(log.len(), 2);
	assert!(log[0].eavs().unwrap().iter().any(|[_, attribute, value]| attribute == &Value::from("element") && value == &Value::from("B")));
	assert!(matches!(&log[1], Outbound::Notice(notice) if notice.name == "UnknownInstance"));
}

#[test]
fn flush_messages_paint() {
	let runtime = Runtime::new(Engine::new(MemoryHost::new()), |_| ());
	runtime.push(Inbound::Diff(diff(
		r#"{"adds": [
			["html/export instances", "cv", "C", "canvas"],
			["canvas/export instances", "C", "cv"],
			["canvas/export paths", "p"],
			["canvas/export operations", "o", "rect"],
			["canvas/export operation attributes", "o", "x", 0],
			["canvas/export operation attributes", "o", "y", 0],
			["canvas/export operation attributes", "o", "width", 4],
			["canvas/export operation attributes", "o", "height", 4],
			["canvas/export path operations", "p", "o", 1],
			["canvas/export canvas paths", "C", "p", 1]
		]}"#,
	)));
	assert_eq!(runtime.engine().host().scheduled_flushes(), 1);
	assert!(runtime.engine().host().draws().is_empty());

	runtime.push(Inbound::Flush);
	let engine = runtime.engine();
	assert!(matches!(engine.host().draws(), [Draw::Clear(_), Draw::Paint { .. }]));
	assert!(!engine.scheduler().is_scheduled());
}

#[test]
fn console_and_unknown_relations_leave_the_document_alone() {
	let mut engine = Engine::new(MemoryHost::new());
	engine
		.handle_diff(&diff(
			r#"{
				"adds": [
					["console/log", "hello", 1],
					["console/warn", "careful"],
					["console/error", "broken"],
					["console/diff", "html/export roots", "x"],
					["somewhere/else", "ignored"]
				],
				"removes": [["console/diff", "html/export roots", "y"]]
			}"#,
		))
		.unwrap();
	assert!(engine.take_outbound().is_empty());
	assert!(engine.host().draws().is_empty());
	assert!(!engine.scheduler().is_scheduled());
}
