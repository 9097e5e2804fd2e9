//! The seam between reconciliation and whatever actually renders.
//!
//! [`crate::web::WebHost`] drives a browser document through `web_sys`,
//! [`memory::MemoryHost`] is a headless arena document that records what would have been drawn.

use crate::{
	canvas::{Operation, OperationKind, PaintStyle},
	error::HostError,
	value::Value,
};
use core::fmt::Debug;

pub mod memory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
	Checkbox,
	Radio,
	Other,
}

/// Snapshot of a form control's state, as read during event translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormControl {
	pub kind: ControlKind,
	pub value: String,
	pub checked: bool,
	/// The grouping name, used to keep radio groups mutually exclusive.
	pub name: Option<String>,
}

/// Document tree operations.
///
/// Nodes are handles: cloning one must not clone the rendered node, and equality is identity.
pub trait DomHost {
	type Node: Clone + PartialEq + Debug;
	/// A synthetic stylesheet rule.
	type Rule;

	/// The top-level container roots are inserted into.
	fn container(&self) -> Self::Node;

	fn create_element(&mut self, tag: &str, namespace: Option<&str>) -> Result<Self::Node, HostError>;

	/// Marks `node` as the rendered node of `instance`, so that [`DomHost::instance_of`] can find it again.
	fn bind_instance(&mut self, node: &Self::Node, instance: &Value);
	fn instance_of(&self, node: &Self::Node) -> Option<Value>;

	fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
	fn children(&self, parent: &Self::Node) -> Vec<Self::Node>;

	/// Moves `child` under `parent`, before `before` or at the end.
	fn insert_before(&mut self, parent: &Self::Node, child: &Self::Node, before: Option<&Self::Node>) -> Result<(), HostError>;
	/// Removes `node` from its parent, if it has one.
	fn detach(&mut self, node: &Self::Node) -> Result<(), HostError>;

	fn set_text(&mut self, node: &Self::Node, text: Option<&str>);
	fn add_class(&mut self, node: &Self::Node, class: &str) -> Result<(), HostError>;
	fn remove_class(&mut self, node: &Self::Node, class: &str) -> Result<(), HostError>;
	fn has_class(&self, node: &Self::Node, class: &str) -> bool;
	fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str) -> Result<(), HostError>;
	fn remove_attribute(&mut self, node: &Self::Node, name: &str) -> Result<(), HostError>;

	/// Sets the value of a form control. Does nothing for other nodes.
	fn set_value(&mut self, node: &Self::Node, value: &str);
	/// `None` unless `node` is a form control.
	fn form_control(&self, node: &Self::Node) -> Option<FormControl>;
	/// Sets the `size` (in characters) of a text input.
	fn set_size(&mut self, node: &Self::Node, size: u32);

	fn is_focusable(&self, node: &Self::Node) -> bool;
	fn focus(&mut self, node: &Self::Node);
	fn blur(&mut self, node: &Self::Node);

	fn create_rule(&mut self) -> Result<Self::Rule, HostError>;
	fn set_rule_text(&mut self, rule: &Self::Rule, css: &str);
	fn remove_rule(&mut self, rule: Self::Rule);

	/// Requests one call of [`crate::Engine::flush`] at the end of the current turn.
	///
	/// The engine never calls this again before that flush ran.
	fn schedule_flush(&mut self);
}

/// 2D drawing on canvas surfaces.
pub trait CanvasHost: DomHost {
	/// A compiled, reusable drawable.
	type Path;

	fn new_path(&mut self) -> Result<Self::Path, HostError>;
	/// Whether [`CanvasHost::trace`] can draw operations of this kind.
	fn supports(&self, kind: OperationKind) -> bool;
	fn trace(&mut self, path: &mut Self::Path, operation: &Operation);

	fn clear_surface(&mut self, canvas: &Self::Node);
	fn paint(&mut self, canvas: &Self::Node, path: &Self::Path, style: &PaintStyle);
}
