//! Sibling ordering by sort key.

use crate::{
	error::{MissingSide, ProtocolError},
	host::DomHost,
	instances::Instances,
	value::Value,
};
use core::{cmp::Ordering, iter::Peekable, str::Chars};
use tracing::{instrument, trace};

/// Compares sort keys the way a numeric-aware collator would: `"2" < "10"`, `"item 9" < "Item 10"`.
///
/// Runs of ASCII digits compare by numeric value, everything else case-insensitively.
/// Ties are broken by putting lowercase first, then by the raw text.
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
	fn digits(chars: &mut Peekable<Chars<'_>>) -> String {
		let mut run = String::new();
		while let Some(&c) = chars.peek() {
			if !c.is_ascii_digit() {
				break;
			}
			run.push(c);
			chars.next();
		}
		run
	}

	fn numeric(a: &str, b: &str) -> Ordering {
		let a = a.trim_start_matches('0');
		let b = b.trim_start_matches('0');
		a.len().cmp(&b.len()).then_with(|| a.cmp(b))
	}

	let primary = {
		let mut a_chars = a.chars().peekable();
		let mut b_chars = b.chars().peekable();
		loop {
			match (a_chars.peek().copied(), b_chars.peek().copied()) {
				(None, None) => break Ordering::Equal,
				(None, Some(_)) => break Ordering::Less,
				(Some(_), None) => break Ordering::Greater,
				(Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
					let ordering = numeric(&digits(&mut a_chars), &digits(&mut b_chars));
					if ordering != Ordering::Equal {
						break ordering;
					}
				}
				(Some(x), Some(y)) => {
					let ordering = x.to_lowercase().cmp(y.to_lowercase());
					if ordering != Ordering::Equal {
						break ordering;
					}
					a_chars.next();
					b_chars.next();
				}
			}
		}
	};

	primary
		.then_with(|| {
			// Lowercase before uppercase at the first difference in case only.
			a.chars()
				.zip(b.chars())
				.find(|(x, y)| x != y)
				.map_or(Ordering::Equal, |(x, y)| y.is_lowercase().cmp(&x.is_lowercase()))
		})
		.then_with(|| a.cmp(b))
}

/// [`natural_cmp`] on the textual form of two values.
#[must_use]
pub fn key_cmp(a: &Value, b: &Value) -> Ordering {
	natural_cmp(&a.to_string(), &b.to_string())
}

/// (Re)inserts `child` under `parent` before the first sibling whose effective sort key is strictly greater than `key`.
///
/// Siblings that aren't instances or have no key are skipped over. Without `key`, `child` is appended.
#[instrument(skip_all, fields(?key))]
pub fn insert_child<H: DomHost>(host: &mut H, instances: &Instances<H::Node>, parent: &H::Node, child: &H::Node, key: Option<&Value>) -> Result<(), ProtocolError> {
	let before = match key {
		None => None,
		Some(key) => host.children(parent).into_iter().filter(|sibling| sibling != child).find(|sibling| {
			host.instance_of(sibling)
				.and_then(|id| instances.get(&id))
				.and_then(|instance| instance.effective_sort())
				.map_or(false, |sibling_key| key_cmp(sibling_key, key) == Ordering::Greater)
		}),
	};
	trace!(appending = before.is_none());
	host.insert_before(parent, child, before.as_ref())?;
	Ok(())
}

/// Sets the explicit sort key of `instance` and repositions it within its current parent, if any.
pub fn insert_sorted<H: DomHost>(host: &mut H, instances: &mut Instances<H::Node>, instance: &Value, sort: Value) -> Result<(), ProtocolError> {
	let node = match instances.get_mut(instance) {
		Some(entry) => {
			entry.sort = Some(sort.clone());
			entry.node.clone()
		}
		None => {
			return Err(ProtocolError::MissingInstance {
				instance: instance.clone(),
				during: "sort",
			})
		}
	};
	if let Some(parent) = host.parent(&node) {
		insert_child(host, instances, &parent, &node, Some(&sort))?;
	}
	Ok(())
}

/// Sets the fallback sort key of `instance`. It is only repositioned if it has no explicit key.
pub fn insert_auto_sorted<H: DomHost>(host: &mut H, instances: &mut Instances<H::Node>, instance: &Value, auto_sort: Value) -> Result<(), ProtocolError> {
	let (node, explicit) = match instances.get_mut(instance) {
		Some(entry) => {
			entry.auto_sort = Some(auto_sort.clone());
			(entry.node.clone(), entry.sort.is_some())
		}
		None => {
			return Err(ProtocolError::MissingInstance {
				instance: instance.clone(),
				during: "auto-sort",
			})
		}
	};
	if !explicit {
		if let Some(parent) = host.parent(&node) {
			insert_child(host, instances, &parent, &node, Some(&auto_sort))?;
		}
	}
	Ok(())
}

/// Moves `instance` under `parent` at the position its effective sort key calls for.
pub fn reparent<H: DomHost>(host: &mut H, instances: &Instances<H::Node>, instance: &Value, parent: &Value) -> Result<(), ProtocolError> {
	match (instances.get(instance), instances.get(parent)) {
		(Some(child), Some(new_parent)) => {
			let child_node = child.node.clone();
			let parent_node = new_parent.node.clone();
			insert_child(host, instances, &parent_node, &child_node, child.effective_sort())
		}
		(child, new_parent) => Err(ProtocolError::Reparent {
			instance: instance.clone(),
			parent: parent.clone(),
			missing: match (child, new_parent) {
				(None, None) => MissingSide::Both,
				(None, Some(_)) => MissingSide::Instance,
				_ => MissingSide::Parent,
			},
		}),
	}
}

/// Inserts `instance` into the host's top-level container.
pub fn insert_root<H: DomHost>(host: &mut H, instances: &Instances<H::Node>, instance: &Value) -> Result<(), ProtocolError> {
	let root = instances.get(instance).ok_or_else(|| ProtocolError::MissingInstance {
		instance: instance.clone(),
		during: "insert root",
	})?;
	let node = root.node.clone();
	let container = host.container();
	insert_child(host, instances, &container, &node, root.effective_sort())
}
