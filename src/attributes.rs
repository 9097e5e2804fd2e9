//! Attribute facts on instances.
//!
//! A handful of attribute names have dedicated meaning, see [`Attribute`]. Everything else becomes a plain markup attribute.

use crate::{error::ProtocolError, host::DomHost, instances::Instances, order, styles::StyleSheet, value::Value};
use tracing::{instrument, trace};

/// How an attribute name is reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute<'a> {
	/// Text content.
	Text,
	/// One class token.
	Class,
	/// A style id, applied through its synthetic class.
	Style,
	/// Form control value. Removing it does nothing, so that a replacement doesn't flicker through an empty value.
	Value,
	/// Explicit sort key.
	Sort,
	/// Fallback sort key.
	AutoIndex,
	/// Structural, handled by other relations.
	Ignored,
	Markup(&'a str),
}

impl<'a> Attribute<'a> {
	#[must_use]
	pub fn classify(name: &'a str) -> Self {
		match name {
			"text" => Self::Text,
			"class" => Self::Class,
			"style" => Self::Style,
			"value" => Self::Value,
			"sort" => Self::Sort,
			"eve-auto-index" => Self::AutoIndex,
			"tagname" | "children" | "tag" | "ns" => Self::Ignored,
			markup => Self::Markup(markup),
		}
	}
}

/// Applies one attribute. The instance must exist.
#[instrument(skip_all, fields(%instance, %name))]
pub fn add<H: DomHost>(host: &mut H, instances: &mut Instances<H::Node>, styles: &StyleSheet<H::Rule>, instance: &Value, name: &Value, value: &Value) -> Result<(), ProtocolError> {
	let node = match instances.get(instance) {
		Some(live) => live.node.clone(),
		None => {
			return Err(ProtocolError::MissingInstance {
				instance: instance.clone(),
				during: "add attribute",
			})
		}
	};

	let name = name.to_string();
	match Attribute::classify(&name) {
		Attribute::Ignored => trace!("Ignoring structural attribute."),
		Attribute::Text => host.set_text(&node, Some(&value.to_string())),
		Attribute::Class => host.add_class(&node, &value.to_string())?,
		Attribute::Style => host.add_class(&node, &styles.class_of(value))?,
		Attribute::Value => host.set_value(&node, &value.to_string()),
		Attribute::Sort => order::insert_sorted(host, instances, instance, value.clone())?,
		Attribute::AutoIndex => order::insert_auto_sorted(host, instances, instance, value.clone())?,
		Attribute::Markup(markup) => host.set_attribute(&node, markup, &value.to_string())?,
	}
	Ok(())
}

/// Reverts one attribute. Removing from an instance that's already gone does nothing,
/// since removes may race the instance's teardown.
#[instrument(skip_all, fields(%instance, %name))]
pub fn remove<H: DomHost>(host: &mut H, instances: &Instances<H::Node>, styles: &StyleSheet<H::Rule>, instance: &Value, name: &Value, value: &Value) -> Result<(), ProtocolError> {
	let node = match instances.get(instance) {
		Some(live) => &live.node,
		None => {
			trace!("Instance already gone.");
			return Ok(());
		}
	};

	let name = name.to_string();
	match Attribute::classify(&name) {
		Attribute::Ignored | Attribute::Sort | Attribute::AutoIndex | Attribute::Value => (),
		Attribute::Text => host.set_text(node, None),
		Attribute::Class => host.remove_class(node, &value.to_string())?,
		Attribute::Style => host.remove_class(node, &styles.class_of(value))?,
		Attribute::Markup(markup) => host.remove_attribute(node, markup)?,
	}
	Ok(())
}
