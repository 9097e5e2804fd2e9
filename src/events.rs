//! Translation of native UI events into fact batches.
//!
//! Every record gets a fresh id, is tagged `html/event` and `html/event/<kind>`,
//! and names each instance's element from the event target up to the render root.

use crate::{
	host::{ControlKind, DomHost},
	instances::Instances,
	value::{Eav, Value},
};
use core::fmt::{self, Debug, Formatter};
use hashbrown::HashMap;
use tracing::{instrument, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseKind {
	Click,
	DoubleClick,
	Down,
	Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
	Down,
	Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusKind {
	Focus,
	Blur,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverKind {
	In,
	Out,
}

/// The primary pointer button numbers reported by native mouse events.
pub const LEFT_BUTTON: i16 = 0;
pub const MIDDLE_BUTTON: i16 = 1;
pub const RIGHT_BUTTON: i16 = 2;

/// A native event, reduced to what translation needs.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeEvent<N> {
	Mouse {
		kind: MouseKind,
		button: i16,
		page_x: f64,
		page_y: f64,
		window_x: f64,
		window_y: f64,
		/// `None` if the target isn't a node.
		target: Option<N>,
	},
	/// A form control's value changed.
	Input { target: N },
	Key {
		kind: KeyKind,
		key_code: u32,
		repeat: bool,
		target: Option<N>,
	},
	Focus { kind: FocusKind, target: N },
	Hover { kind: HoverKind, target: N },
}

impl<N> NativeEvent<N> {
	/// The kind suffix of the `html/event/<kind>` tag.
	#[must_use]
	pub fn tag(&self) -> &'static str {
		match self {
			Self::Mouse { kind: MouseKind::Click, .. } => "click",
			Self::Mouse { kind: MouseKind::DoubleClick, .. } => "double-click",
			Self::Mouse { kind: MouseKind::Down, .. } => "mouse-down",
			Self::Mouse { kind: MouseKind::Up, .. } => "mouse-up",
			Self::Input { .. } => "change",
			Self::Key { kind: KeyKind::Down, .. } => "key-down",
			Self::Key { kind: KeyKind::Up, .. } => "key-up",
			Self::Focus { kind: FocusKind::Focus, .. } => "focus",
			Self::Focus { kind: FocusKind::Blur, .. } => "blur",
			Self::Hover { kind: HoverKind::In, .. } => "hover-in",
			Self::Hover { kind: HoverKind::Out, .. } => "hover-out",
		}
	}
}

/// Readable names for common control key codes.
#[must_use]
pub fn key_name(key_code: u32) -> Option<&'static str> {
	Some(match key_code {
		9 => "tab",
		13 => "enter",
		16 => "shift",
		17 => "control",
		18 => "alt",
		27 => "escape",
		37 => "left",
		38 => "up",
		39 => "right",
		40 => "down",
		91 => "meta",
		_ => return None,
	})
}

#[must_use]
pub fn button_value(button: i16) -> Value {
	match button {
		LEFT_BUTTON => "left".into(),
		MIDDLE_BUTTON => "middle".into(),
		RIGHT_BUTTON => "right".into(),
		other => Value::Number(other.into()),
	}
}

/// Instance ids from `node` up to (excluding) the first ancestor that isn't a live instance.
pub fn instance_chain<H: DomHost>(host: &H, instances: &Instances<H::Node>, node: &H::Node) -> Vec<Value> {
	let mut chain = Vec::new();
	let mut current = Some(node.clone());
	while let Some(node) = current {
		match host.instance_of(&node) {
			Some(id) if instances.contains(&id) => chain.push(id),
			_ => break,
		}
		current = host.parent(&node);
	}
	chain
}

/// Whether the instance chain starting at `target` opted into capturing the context menu.
pub fn captures_context_menu<H: DomHost>(host: &H, instances: &Instances<H::Node>, target: &H::Node) -> bool {
	instance_chain(host, instances, target)
		.iter()
		.filter_map(|id| instances.get(id))
		.any(|instance| instance.listens("context-menu"))
}

/// Builds the records of one event.
struct Record {
	id: Value,
	eavs: Vec<Eav>,
}

impl Record {
	fn new(id: Value, tag: &str) -> Self {
		let mut record = Self { id, eavs: Vec::new() };
		record.push("tag", "html/event");
		record.push("tag", format!("html/event/{}", tag));
		record
	}

	fn push(&mut self, attribute: &str, value: impl Into<Value>) {
		self.eavs.push([self.id.clone(), attribute.into(), value.into()]);
	}

	fn push_elements<N>(&mut self, instances: &Instances<N>, chain: &[Value]) {
		for id in chain {
			if let Some(instance) = instances.get(id) {
				self.push("element", instance.element.clone());
			}
		}
	}
}

/// Stateful translator. Remembers the checked radio button of each group.
pub struct EventTranslator {
	next_id: Box<dyn FnMut() -> Value>,
	autosize_class: String,
	/// Radio group name to the instance last checked in it.
	radio_groups: HashMap<String, Value>,
}

impl Debug for EventTranslator {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("EventTranslator")
			.field("autosize_class", &self.autosize_class)
			.field("radio_groups", &self.radio_groups)
			.finish_non_exhaustive()
	}
}

impl EventTranslator {
	pub fn new(next_id: Box<dyn FnMut() -> Value>, autosize_class: impl Into<String>) -> Self {
		Self {
			next_id,
			autosize_class: autosize_class.into(),
			radio_groups: HashMap::new(),
		}
	}

	/// A fresh fact id.
	pub fn next_id(&mut self) -> Value {
		(self.next_id)()
	}

	/// Translates one native event. `None` means nothing is sent upstream.
	///
	/// Input events may resize their target as a side effect.
	#[instrument(skip_all, fields(kind = event.tag()))]
	pub fn translate<H: DomHost>(&mut self, host: &mut H, instances: &Instances<H::Node>, event: &NativeEvent<H::Node>) -> Option<Vec<Eav>> {
		let eavs = match event {
			NativeEvent::Mouse {
				button,
				page_x,
				page_y,
				window_x,
				window_y,
				target,
				..
			} => {
				let chain = target.as_ref().map(|target| instance_chain(host, instances, target)).unwrap_or_default();
				let captured = chain.iter().filter_map(|id| instances.get(id)).any(|instance| instance.listens("context-menu"));
				if *button == RIGHT_BUTTON && !captured {
					// A right mouse-down without its mouse-up would confuse upstream.
					trace!("Dropping uncaptured right button event.");
					return None;
				}

				let mut record = Record::new(self.next_id(), event.tag());
				record.push("page-x", *page_x);
				record.push("page-y", *page_y);
				record.push("window-x", *window_x);
				record.push("window-y", *window_y);
				record.push("button", button_value(*button));
				if let Some(target) = chain.first().and_then(|id| instances.get(id)) {
					record.push("target", target.element.clone());
				}
				record.push_elements(instances, &chain);
				record.eavs
			}

			NativeEvent::Input { target } => {
				let chain = instance_chain(host, instances, target);
				if chain.is_empty() {
					return None;
				}
				let control = host.form_control(target);

				if host.has_class(target, &self.autosize_class) {
					if let Some(control) = &control {
						let length = u32::try_from(control.value.chars().count()).unwrap_or(u32::MAX);
						host.set_size(target, length.max(1));
					}
				}

				let mut record = Record::new(self.next_id(), event.tag());
				record.push_elements(instances, &chain);
				let mut extra = None;
				if let Some(control) = control {
					record.push("value", control.value);
					if matches!(control.kind, ControlKind::Checkbox | ControlKind::Radio) {
						record.push("checked", control.checked);
					}
					if control.kind == ControlKind::Radio && control.checked {
						if let Some(group) = control.name {
							extra = self.uncheck_previous(instances, group, &chain[0]);
						}
					}
				}
				let mut eavs = record.eavs;
				eavs.extend(extra.into_iter().flatten());
				eavs
			}

			NativeEvent::Key { key_code, repeat, target, .. } => {
				if *repeat {
					return None;
				}
				let mut record = Record::new(self.next_id(), event.tag());
				record.push("key-code", *key_code);
				if let Some(key) = key_name(*key_code) {
					record.push("key", key);
				}
				if let Some(target) = target {
					let chain = instance_chain(host, instances, target);
					record.push_elements(instances, &chain);
				}
				record.eavs
			}

			NativeEvent::Focus { target, .. } => {
				let chain = instance_chain(host, instances, target);
				if chain.is_empty() {
					return None;
				}
				let mut record = Record::new(self.next_id(), event.tag());
				record.push_elements(instances, &chain);
				if let Some(control) = host.form_control(target) {
					record.push("value", control.value);
				}
				record.eavs
			}

			NativeEvent::Hover { target, .. } => {
				let instance = host.instance_of(target).and_then(|id| instances.get(&id))?;
				if !instance.listens("hover") {
					return None;
				}
				let mut record = Record::new(self.next_id(), event.tag());
				record.push("element", instance.element.clone());
				record.eavs
			}
		};
		Some(eavs)
	}

	/// Records `checked` as the checked radio of `group` and builds the unchecking record of its predecessor, if any.
	fn uncheck_previous<N>(&mut self, instances: &Instances<N>, group: String, checked: &Value) -> Option<Vec<Eav>> {
		let previous = self.radio_groups.insert(group, checked.clone())?;
		if &previous == checked {
			return None;
		}
		let element = instances.get(&previous)?.element.clone();
		let mut record = Record::new(self.next_id(), "change");
		record.push("element", element);
		record.push("checked", false);
		Some(record.eavs)
	}
}
