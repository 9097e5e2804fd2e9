//! A headless document.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Canvas drawing is recorded into a log of [`Draw`]s.

use super::{CanvasHost, ControlKind, DomHost, FormControl};
use crate::{
	canvas::{Operation, OperationKind, PaintStyle},
	error::HostError,
	value::Value,
};
use hashbrown::{HashMap, HashSet};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId(usize);

#[derive(Debug, Default, Clone)]
pub struct MemoryNode {
	pub tag: String,
	pub namespace: Option<String>,
	pub parent: Option<NodeId>,
	pub children: Vec<NodeId>,
	pub text: Option<String>,
	/// Class tokens in insertion order, without duplicates.
	pub classes: Vec<String>,
	pub attributes: BTreeMap<String, String>,
	pub instance: Option<Value>,
	/// Form control value, set either by facts or by simulated user input.
	pub value: Option<String>,
	pub checked: bool,
	pub size: Option<u32>,
}

/// A compiled path: just the operations traced into it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryPath {
	pub operations: Vec<Operation>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Draw {
	Clear(NodeId),
	Paint { canvas: NodeId, operations: Vec<Operation>, style: PaintStyle },
}

#[derive(Debug)]
pub struct MemoryHost {
	nodes: Vec<MemoryNode>,
	container: NodeId,
	rules: HashMap<RuleId, String>,
	next_rule: usize,
	unsupported: HashSet<OperationKind>,
	draws: Vec<Draw>,
	scheduled: usize,
	focused: Option<NodeId>,
}

impl Default for MemoryHost {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryHost {
	#[must_use]
	pub fn new() -> Self {
		Self {
			nodes: vec![MemoryNode {
				tag: "body".to_owned(),
				..MemoryNode::default()
			}],
			container: NodeId(0),
			rules: HashMap::new(),
			next_rule: 0,
			unsupported: HashSet::new(),
			draws: Vec::new(),
			scheduled: 0,
			focused: None,
		}
	}

	/// # Panics
	///
	/// Iff `id` wasn't allocated by this host.
	#[must_use]
	pub fn node(&self, id: NodeId) -> &MemoryNode {
		&self.nodes[id.0]
	}

	/// # Panics
	///
	/// Iff `id` wasn't allocated by this host.
	pub fn node_mut(&mut self, id: NodeId) -> &mut MemoryNode {
		&mut self.nodes[id.0]
	}

	/// Allocates a node that no instance is bound to, like one created by third-party code.
	pub fn create_detached(&mut self, tag: &str) -> NodeId {
		self.nodes.push(MemoryNode {
			tag: tag.to_owned(),
			..MemoryNode::default()
		});
		NodeId(self.nodes.len() - 1)
	}

	/// Instance ids of `parent`'s children, in document order. Children that aren't instances are left out.
	#[must_use]
	pub fn child_instances(&self, parent: NodeId) -> Vec<Value> {
		self.node(parent).children.iter().filter_map(|&child| self.node(child).instance.clone()).collect()
	}

	/// Texts of all live rules, in allocation order.
	#[must_use]
	pub fn rules(&self) -> Vec<&str> {
		let mut rules: Vec<_> = self.rules.iter().collect();
		rules.sort_by_key(|(id, _)| id.0);
		rules.into_iter().map(|(_, text)| text.as_str()).collect()
	}

	/// Makes [`CanvasHost::supports`] report `kind` as unavailable.
	pub fn unsupport(&mut self, kind: OperationKind) {
		self.unsupported.insert(kind);
	}

	#[must_use]
	pub fn draws(&self) -> &[Draw] {
		&self.draws
	}

	pub fn take_draws(&mut self) -> Vec<Draw> {
		core::mem::take(&mut self.draws)
	}

	/// How often [`DomHost::schedule_flush`] was called.
	#[must_use]
	pub fn scheduled_flushes(&self) -> usize {
		self.scheduled
	}

	#[must_use]
	pub fn focused(&self) -> Option<NodeId> {
		self.focused
	}

	fn get(&self, id: NodeId) -> Result<&MemoryNode, HostError> {
		self.nodes.get(id.0).ok_or_else(|| HostError(format!("Unknown node {:?}", id)))
	}
}

impl DomHost for MemoryHost {
	type Node = NodeId;
	type Rule = RuleId;

	fn container(&self) -> NodeId {
		self.container
	}

	fn create_element(&mut self, tag: &str, namespace: Option<&str>) -> Result<NodeId, HostError> {
		if tag.is_empty() || tag.contains(char::is_whitespace) {
			return Err(HostError(format!("Invalid tag name {:?}", tag)));
		}
		let id = self.create_detached(tag);
		self.node_mut(id).namespace = namespace.map(ToOwned::to_owned);
		Ok(id)
	}

	fn bind_instance(&mut self, node: &NodeId, instance: &Value) {
		self.node_mut(*node).instance = Some(instance.clone());
	}

	fn instance_of(&self, node: &NodeId) -> Option<Value> {
		self.nodes.get(node.0)?.instance.clone()
	}

	fn parent(&self, node: &NodeId) -> Option<NodeId> {
		self.nodes.get(node.0)?.parent
	}

	fn children(&self, parent: &NodeId) -> Vec<NodeId> {
		self.nodes.get(parent.0).map_or_else(Vec::new, |node| node.children.clone())
	}

	fn insert_before(&mut self, parent: &NodeId, child: &NodeId, before: Option<&NodeId>) -> Result<(), HostError> {
		self.get(*parent)?;
		self.get(*child)?;
		if parent == child {
			return Err(HostError("Cannot insert a node into itself".to_owned()));
		}
		self.detach(child)?;
		let siblings = &mut self.nodes[parent.0].children;
		match before {
			None => siblings.push(*child),
			Some(before) => {
				let position = siblings
					.iter()
					.position(|sibling| sibling == before)
					.ok_or_else(|| HostError(format!("{:?} is not a child of {:?}", before, parent)))?;
				siblings.insert(position, *child);
			}
		}
		self.nodes[child.0].parent = Some(*parent);
		Ok(())
	}

	fn detach(&mut self, node: &NodeId) -> Result<(), HostError> {
		if let Some(parent) = self.get(*node)?.parent {
			self.nodes[parent.0].children.retain(|child| child != node);
			self.nodes[node.0].parent = None;
		}
		Ok(())
	}

	fn set_text(&mut self, node: &NodeId, text: Option<&str>) {
		self.node_mut(*node).text = text.map(ToOwned::to_owned);
	}

	fn add_class(&mut self, node: &NodeId, class: &str) -> Result<(), HostError> {
		if class.is_empty() || class.contains(char::is_whitespace) {
			return Err(HostError(format!("Invalid class token {:?}", class)));
		}
		let classes = &mut self.node_mut(*node).classes;
		if !classes.iter().any(|existing| existing == class) {
			classes.push(class.to_owned());
		}
		Ok(())
	}

	fn remove_class(&mut self, node: &NodeId, class: &str) -> Result<(), HostError> {
		self.node_mut(*node).classes.retain(|existing| existing != class);
		Ok(())
	}

	fn has_class(&self, node: &NodeId, class: &str) -> bool {
		self.node(*node).classes.iter().any(|existing| existing == class)
	}

	fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) -> Result<(), HostError> {
		if name.is_empty() || name.contains(char::is_whitespace) {
			return Err(HostError(format!("Invalid attribute name {:?}", name)));
		}
		self.node_mut(*node).attributes.insert(name.to_owned(), value.to_owned());
		Ok(())
	}

	fn remove_attribute(&mut self, node: &NodeId, name: &str) -> Result<(), HostError> {
		self.node_mut(*node).attributes.remove(name);
		Ok(())
	}

	fn set_value(&mut self, node: &NodeId, value: &str) {
		let node = self.node_mut(*node);
		if matches!(node.tag.as_str(), "input" | "textarea" | "select") {
			node.value = Some(value.to_owned());
		}
	}

	fn form_control(&self, node: &NodeId) -> Option<FormControl> {
		let node = self.nodes.get(node.0)?;
		let kind = match node.tag.as_str() {
			"input" => match node.attributes.get("type").map(String::as_str) {
				Some("checkbox") => ControlKind::Checkbox,
				Some("radio") => ControlKind::Radio,
				_ => ControlKind::Other,
			},
			"textarea" | "select" => ControlKind::Other,
			_ => return None,
		};
		Some(FormControl {
			kind,
			value: node.value.clone().unwrap_or_default(),
			checked: node.checked,
			name: node.attributes.get("name").cloned(),
		})
	}

	fn set_size(&mut self, node: &NodeId, size: u32) {
		self.node_mut(*node).size = Some(size);
	}

	fn is_focusable(&self, node: &NodeId) -> bool {
		self.nodes.get(node.0).map_or(false, |node| matches!(node.tag.as_str(), "input" | "textarea"))
	}

	fn focus(&mut self, node: &NodeId) {
		self.focused = Some(*node);
	}

	fn blur(&mut self, node: &NodeId) {
		if self.focused == Some(*node) {
			self.focused = None;
		}
	}

	fn create_rule(&mut self) -> Result<RuleId, HostError> {
		let id = RuleId(self.next_rule);
		self.next_rule += 1;
		self.rules.insert(id, String::new());
		Ok(id)
	}

	fn set_rule_text(&mut self, rule: &RuleId, css: &str) {
		if let Some(text) = self.rules.get_mut(rule) {
			css.clone_into(text);
		}
	}

	fn remove_rule(&mut self, rule: RuleId) {
		self.rules.remove(&rule);
	}

	fn schedule_flush(&mut self) {
		self.scheduled += 1;
	}
}

impl CanvasHost for MemoryHost {
	type Path = MemoryPath;

	fn new_path(&mut self) -> Result<MemoryPath, HostError> {
		Ok(MemoryPath::default())
	}

	fn supports(&self, kind: OperationKind) -> bool {
		!self.unsupported.contains(&kind)
	}

	fn trace(&mut self, path: &mut MemoryPath, operation: &Operation) {
		path.operations.push(*operation);
	}

	fn clear_surface(&mut self, canvas: &NodeId) {
		self.draws.push(Draw::Clear(*canvas));
	}

	fn paint(&mut self, canvas: &NodeId, path: &MemoryPath, style: &PaintStyle) {
		self.draws.push(Draw::Paint {
			canvas: *canvas,
			operations: path.operations.clone(),
			style: style.clone(),
		});
	}
}
