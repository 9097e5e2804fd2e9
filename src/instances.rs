//! The registry of rendered node instances and the logical elements they belong to.

use crate::{error::ProtocolError, host::DomHost, value::Value};
use hashbrown::{hash_map::Entry, HashMap};
use tracing::{instrument, trace};

/// A rendered node bound to one logical element.
#[derive(Debug)]
pub struct Instance<N> {
	pub element: Value,
	pub node: N,
	/// Explicit sort key.
	pub sort: Option<Value>,
	/// Fallback sort key, only used while `sort` is `None`.
	pub auto_sort: Option<Value>,
	listeners: HashMap<String, bool>,
	listeners_touched: bool,
}

impl<N> Instance<N> {
	fn new(element: Value, node: N) -> Self {
		Self {
			element,
			node,
			sort: None,
			auto_sort: None,
			listeners: HashMap::new(),
			listeners_touched: false,
		}
	}

	/// The key this instance is ordered by among its siblings.
	#[must_use]
	pub fn effective_sort(&self) -> Option<&Value> {
		self.sort.as_ref().or(self.auto_sort.as_ref())
	}

	/// Whether this instance opted into capturing events of the given kind.
	#[must_use]
	pub fn listens(&self, listener: &str) -> bool {
		self.listeners.get(listener).copied().unwrap_or(false)
	}

	pub(crate) fn set_listener(&mut self, listener: &str, on: bool) {
		self.listeners_touched = true;
		self.listeners.insert(listener.to_owned(), on);
	}

	/// Whether any listener flag was ever set, even if all are off again.
	pub(crate) fn has_listeners(&self) -> bool {
		self.listeners_touched
	}
}

/// Owns all live instances.
///
/// Elements are only known through their instances: An element without any live instance has no entry at all.
#[derive(Debug)]
pub struct Instances<N> {
	instances: HashMap<Value, Instance<N>>,
	element_instances: HashMap<Value, Vec<Value>>,
}

impl<N> Default for Instances<N> {
	fn default() -> Self {
		Self::new()
	}
}

impl<N> Instances<N> {
	#[must_use]
	pub fn new() -> Self {
		Self {
			instances: HashMap::new(),
			element_instances: HashMap::new(),
		}
	}

	#[must_use]
	pub fn get(&self, id: &Value) -> Option<&Instance<N>> {
		self.instances.get(id)
	}

	pub fn get_mut(&mut self, id: &Value) -> Option<&mut Instance<N>> {
		self.instances.get_mut(id)
	}

	#[must_use]
	pub fn contains(&self, id: &Value) -> bool {
		self.instances.contains_key(id)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.instances.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.instances.is_empty()
	}

	/// Ids of the live instances of `element`, in no particular order.
	#[must_use]
	pub fn ids_for(&self, element: &Value) -> &[Value] {
		self.element_instances.get(element).map_or(&[], Vec::as_slice)
	}

	/// Live instances of `element`. Empty if the element isn't mounted anywhere (yet).
	pub fn instances_for<'a>(&'a self, element: &Value) -> impl Iterator<Item = &'a Instance<N>> + 'a {
		let ids = self.element_instances.get(element).map_or(&[][..], Vec::as_slice);
		ids.iter().filter_map(move |id| self.instances.get(id))
	}

	/// Registers an already created node.
	pub(crate) fn adopt(&mut self, id: Value, element: Value, node: N) -> Result<&mut Instance<N>, ProtocolError> {
		match self.instances.entry(id.clone()) {
			Entry::Occupied(_) => Err(ProtocolError::DuplicateInstance(id)),
			Entry::Vacant(vacant) => {
				self.element_instances.entry(element.clone()).or_default().push(id);
				Ok(vacant.insert(Instance::new(element, node)))
			}
		}
	}
}

impl<N: Clone> Instances<N> {
	/// Creates the node for a new instance. It stays detached until it is parented or made a root.
	#[instrument(skip_all, fields(%id, %element, %tag))]
	pub fn add<H>(&mut self, host: &mut H, id: Value, element: Value, tag: &str, namespace: Option<&str>) -> Result<&mut Instance<N>, ProtocolError>
	where
		H: DomHost<Node = N>,
	{
		if self.instances.contains_key(&id) {
			return Err(ProtocolError::DuplicateInstance(id));
		}
		let node = host.create_element(tag, namespace)?;
		host.bind_instance(&node, &id);
		trace!("Created instance.");
		self.adopt(id, element, node)
	}

	/// Detaches and forgets an instance.
	#[instrument(skip_all, fields(%id))]
	pub fn remove<H>(&mut self, host: &mut H, id: &Value) -> Result<Instance<N>, ProtocolError>
	where
		H: DomHost<Node = N>,
	{
		let instance = self.instances.remove(id).ok_or_else(|| ProtocolError::UnknownInstance(id.clone()))?;

		if let Entry::Occupied(mut siblings) = self.element_instances.entry(instance.element.clone()) {
			let ids = siblings.get_mut();
			if let Some(position) = ids.iter().position(|sibling| sibling == id) {
				ids.swap_remove(position);
			}
			if ids.is_empty() {
				siblings.remove();
			}
		}

		if host.parent(&instance.node).is_some() {
			host.detach(&instance.node)?;
		}
		trace!("Removed instance.");
		Ok(instance)
	}
}
