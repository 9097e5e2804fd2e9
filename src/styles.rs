//! Synthesized stylesheets: style facts become one class-scoped rule per style id.

use crate::{
	error::ProtocolError,
	host::DomHost,
	rc_hash_map::RcHashMap,
	temp_set::TempSet,
	value::Value,
};
use core::fmt::Write as _;
use hashbrown::HashMap;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use tracing::{info, instrument, trace, warn};

/// One style's properties and its synthetic rule.
#[derive(Debug)]
pub struct Style<R> {
	properties: BTreeMap<String, Value>,
	class: String,
	rule: R,
}

impl<R> Style<R> {
	#[must_use]
	pub fn class(&self) -> &str {
		&self.class
	}

	#[must_use]
	pub fn properties(&self) -> &BTreeMap<String, Value> {
		&self.properties
	}

	/// Serializes the properties as `name: value;` pairs.
	///
	/// The output doesn't depend on the order properties were added in.
	#[must_use]
	pub fn to_declaration_block(&self) -> String {
		to_declaration_block(&self.properties)
	}
}

#[must_use]
pub fn to_declaration_block(properties: &BTreeMap<String, Value>) -> String {
	let mut block = String::new();
	for (name, value) in properties {
		if !block.is_empty() {
			block.push(' ');
		}
		// Writing into a `String` can't fail.
		let _ = write!(block, "{}: {};", name, value);
	}
	block
}

/// The class name a style's rule is scoped to: `prefix` followed by 16 hex digits of the SHA-256 of the style id.
#[must_use]
pub fn class_name(prefix: &str, style: &Value) -> String {
	let digest = Sha256::digest(style.to_string().as_bytes());
	let mut class = String::with_capacity(prefix.len() + 16);
	class.push_str(prefix);
	for byte in &digest[..8] {
		let _ = write!(class, "{:02x}", byte);
	}
	class
}

/// All live styles, reference-counted by their number of properties.
pub struct StyleSheet<R> {
	prefix: String,
	styles: RcHashMap<Value, u32, Style<R>>,
	touched: TempSet<Value>,
	/// Class name to owning style, for collision detection.
	classes: HashMap<String, Value>,
}

impl<R> StyleSheet<R> {
	#[must_use]
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
			styles: RcHashMap::new(),
			touched: TempSet::new(),
			classes: HashMap::new(),
		}
	}

	/// The class the rule of `style` is (or would be) scoped to.
	#[must_use]
	pub fn class_of(&self, style: &Value) -> String {
		match self.styles.get(style) {
			Some(live) => live.class.clone(),
			None => class_name(&self.prefix, style),
		}
	}

	/// A live style. Styles whose last property was removed in the current batch aren't live.
	#[must_use]
	pub fn get(&self, style: &Value) -> Option<&Style<R>> {
		if self.styles.count(style) == 0 {
			None
		} else {
			self.styles.get(style)
		}
	}

	/// Adds one property. The first property of a style allocates its rule.
	#[instrument(skip_all, fields(%style, %property))]
	pub fn add<H>(&mut self, host: &mut H, style: Value, property: &Value, value: Value) -> Result<(), ProtocolError>
	where
		H: DomHost<Rule = R>,
	{
		let property_name = property.to_string();
		if self.styles.count(&style) > 0 && self.styles.get(&style).map_or(false, |live| live.properties.contains_key(&property_name)) {
			return Err(ProtocolError::StyleOverwrite { style, property: property.clone() });
		}

		let prefix = &self.prefix;
		let classes = &mut self.classes;
		let live = self.styles.increment_or_try_insert_with(style.clone(), || -> Result<_, ProtocolError> {
			let class = class_name(prefix, &style);
			match classes.get(&class) {
				Some(other) if other != &style => warn!("Synthetic class {} of style {} collides with style {}.", class, style, other),
				_ => {
					classes.insert(class.clone(), style.clone());
				}
			}
			trace!(%class, "Allocating rule.");
			Ok(Style {
				properties: BTreeMap::new(),
				class,
				rule: host.create_rule()?,
			})
		})?;
		live.properties.insert(property_name, value);
		self.touched.insert(style);
		Ok(())
	}

	/// Removes one property. The rule of a style without properties is released by [`StyleSheet::compile`].
	#[instrument(skip_all, fields(%style, %property))]
	pub fn remove(&mut self, style: Value, property: &Value) -> Result<(), ProtocolError> {
		let property_name = property.to_string();
		if self.styles.count(&style) == 0 {
			return Err(ProtocolError::UnknownStyle(style));
		}
		let live = match self.styles.get_mut(&style) {
			Some(live) => live,
			None => return Err(ProtocolError::UnknownStyle(style)),
		};
		if live.properties.remove(&property_name).is_none() {
			warn!("Removing absent property.");
			return Ok(());
		}
		self.styles.weak_decrement(&style)?;
		self.touched.insert(style);
		Ok(())
	}

	/// Writes each style touched since the last call into its rule and releases the rules of emptied styles.
	#[instrument(skip_all)]
	pub fn compile<H>(&mut self, host: &mut H)
	where
		H: DomHost<Rule = R>,
	{
		for (style, released) in self.styles.drain_weak() {
			trace!(%style, "Releasing rule.");
			if self.classes.get(&released.class) == Some(&style) {
				self.classes.remove(&released.class);
			}
			host.remove_rule(released.rule);
		}

		let mut recompiled = 0_usize;
		for style in self.touched.drain() {
			if let Some(live) = self.styles.get(&style) {
				let css = format!(".{} {{{}}}", live.class, live.to_declaration_block());
				host.set_rule_text(&live.rule, &css);
				recompiled += 1;
			}
		}
		if recompiled > 0 {
			info!("Recompiled {} style(s); {} live, cached capacity {}.", recompiled, self.styles.len(), self.styles.capacity());
		}
	}
}
