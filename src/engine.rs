//! The reconciler: applies fact diffs to a host and translates its events back.

use crate::{
	attributes,
	canvas::{Canvases, FlushReport},
	console::{self, Level},
	diff::{field, Diff, Notice, Outbound},
	error::ProtocolError,
	events::{self, EventTranslator, NativeEvent},
	host::CanvasHost,
	instances::{Instance, Instances},
	order,
	scheduler::Scheduler,
	styles::StyleSheet,
	value::{Eav, Value},
};
use core::fmt::{self, Debug, Formatter};
use tracing::{error, instrument, trace, trace_span, warn};
use uuid::Uuid;

/// Inbound relations, in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
	Instances,
	Roots,
	Parents,
	Styles,
	Attributes,
	Triggers,
	Listeners,
	CanvasInstances,
	Paths,
	Operations,
	OperationAttributes,
	PathOperations,
	CanvasPaths,
	PathStyles,
	Log,
	Warn,
	Error,
	ConsoleDiff,
}

impl Relation {
	/// Every relation, in the order they are applied within one diff.
	pub const ALL: [Self; 18] = [
		Self::Instances,
		Self::Roots,
		Self::Parents,
		Self::Styles,
		Self::Attributes,
		Self::Triggers,
		Self::Listeners,
		Self::CanvasInstances,
		Self::Paths,
		Self::Operations,
		Self::OperationAttributes,
		Self::PathOperations,
		Self::CanvasPaths,
		Self::PathStyles,
		Self::Log,
		Self::Warn,
		Self::Error,
		Self::ConsoleDiff,
	];

	/// The wire name.
	#[must_use]
	pub fn name(self) -> &'static str {
		match self {
			Self::Instances => "html/export instances",
			Self::Roots => "html/export roots",
			Self::Parents => "html/export parents",
			Self::Styles => "html/export styles",
			Self::Attributes => "html/export attributes",
			Self::Triggers => "html/export triggers",
			Self::Listeners => "html/export listeners",
			Self::CanvasInstances => "canvas/export instances",
			Self::Paths => "canvas/export paths",
			Self::Operations => "canvas/export operations",
			Self::OperationAttributes => "canvas/export operation attributes",
			Self::PathOperations => "canvas/export path operations",
			Self::CanvasPaths => "canvas/export canvas paths",
			Self::PathStyles => "canvas/export path styles",
			Self::Log => "console/log",
			Self::Warn => "console/warn",
			Self::Error => "console/error",
			Self::ConsoleDiff => "console/diff",
		}
	}

	#[must_use]
	pub fn parse(name: &str) -> Option<Self> {
		Self::ALL.iter().copied().find(|relation| relation.name() == name)
	}
}

/// Imperative actions on instances, run at the next flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
	Focus,
	Blur,
}

impl Trigger {
	#[must_use]
	pub fn parse(name: &str) -> Option<Self> {
		match name {
			"html/trigger/focus" => Some(Self::Focus),
			"html/trigger/blur" => Some(Self::Blur),
			_ => None,
		}
	}
}

/// Engine configuration.
///
/// ```
/// use fact_dom::{EngineOptions, Value};
///
/// let mut next = 0;
/// let options = EngineOptions::default()
/// 	.with_class_prefix("style-")
/// 	.with_id_generator(move || {
/// 		next += 1;
/// 		Value::from(format!("event-{}", next))
/// 	});
/// assert_eq!(options.class_prefix(), "style-");
/// ```
pub struct EngineOptions {
	class_prefix: String,
	autosize_class: String,
	id_generator: Box<dyn FnMut() -> Value>,
}

impl Default for EngineOptions {
	fn default() -> Self {
		Self {
			class_prefix: "s-".to_owned(),
			autosize_class: "html-autosize-input".to_owned(),
			id_generator: Box::new(|| Value::Text(format!("|{}", Uuid::new_v4()))),
		}
	}
}

impl Debug for EngineOptions {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("EngineOptions")
			.field("class_prefix", &self.class_prefix)
			.field("autosize_class", &self.autosize_class)
			.finish_non_exhaustive()
	}
}

impl EngineOptions {
	/// Prefix of the synthetic class names style rules are scoped to.
	#[must_use]
	pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.class_prefix = prefix.into();
		self
	}

	/// Class that makes text inputs resize to their content.
	#[must_use]
	pub fn with_autosize_class(mut self, class: impl Into<String>) -> Self {
		self.autosize_class = class.into();
		self
	}

	/// Source of ids for facts created by this side: events and external roots.
	#[must_use]
	pub fn with_id_generator(mut self, generator: impl FnMut() -> Value + 'static) -> Self {
		self.id_generator = Box::new(generator);
		self
	}

	#[must_use]
	pub fn class_prefix(&self) -> &str {
		&self.class_prefix
	}

	#[must_use]
	pub fn autosize_class(&self) -> &str {
		&self.autosize_class
	}
}

pub struct Engine<H: CanvasHost> {
	host: H,
	instances: Instances<H::Node>,
	styles: StyleSheet<H::Rule>,
	canvases: Canvases<H::Path>,
	events: EventTranslator,
	scheduler: Scheduler,
	triggers: Vec<(Value, Trigger)>,
	outbound: Vec<Outbound>,
}

impl<H: CanvasHost> Engine<H> {
	pub fn new(host: H) -> Self {
		Self::with_options(host, EngineOptions::default())
	}

	pub fn with_options(host: H, options: EngineOptions) -> Self {
		Self {
			host,
			instances: Instances::new(),
			styles: StyleSheet::new(options.class_prefix),
			canvases: Canvases::new(),
			events: EventTranslator::new(options.id_generator, options.autosize_class),
			scheduler: Scheduler::Idle,
			triggers: Vec::new(),
			outbound: Vec::new(),
		}
	}

	pub fn host(&self) -> &H {
		&self.host
	}

	pub fn host_mut(&mut self) -> &mut H {
		&mut self.host
	}

	pub fn instances(&self) -> &Instances<H::Node> {
		&self.instances
	}

	pub fn styles(&self) -> &StyleSheet<H::Rule> {
		&self.styles
	}

	pub fn canvases(&self) -> &Canvases<H::Path> {
		&self.canvases
	}

	pub fn scheduler(&self) -> Scheduler {
		self.scheduler
	}

	/// Live instances of `element`.
	pub fn instances_for<'a>(&'a self, element: &Value) -> impl Iterator<Item = &'a Instance<H::Node>> + 'a {
		self.instances.instances_for(element)
	}

	/// Takes the messages for upstream queued so far.
	pub fn take_outbound(&mut self) -> Vec<Outbound> {
		core::mem::take(&mut self.outbound)
	}

	fn send(&mut self, eavs: Vec<Eav>) {
		if !eavs.is_empty() {
			self.outbound.push(Outbound::Transaction(eavs));
		}
	}

	/// Applies a whole diff, relation by relation.
	///
	/// The first error abandons the rest of the diff and queues an error [`Notice`]. Facts applied before it stay applied.
	#[instrument(skip_all, fields(adds = diff.adds.len(), removes = diff.removes.len()))]
	pub fn handle_diff(&mut self, diff: &Diff) -> Result<(), ProtocolError> {
		let relations = diff.by_relation();
		for name in relations.keys() {
			if Relation::parse(name).is_none() {
				warn!(relation = name, "Ignoring unknown relation.");
			}
		}

		for relation in Relation::ALL {
			let Some(part) = relations.get(relation.name()) else { continue };
			if let Err(error) = self.apply(relation, &part.adds, &part.removes) {
				error!(relation = relation.name(), name = error.name(), "{}", error);
				self.outbound.push(Outbound::Notice(Notice::from(&error)));
				return Err(error);
			}
		}
		Ok(())
	}

	/// Applies the tuples of one relation, without its name. Unknown relations are ignored.
	pub fn handle(&mut self, relation: &str, adds: &[&[Value]], removes: &[&[Value]]) -> Result<(), ProtocolError> {
		match Relation::parse(relation) {
			Some(relation) => self.apply(relation, adds, removes),
			None => {
				warn!(relation, "Ignoring unknown relation.");
				Ok(())
			}
		}
	}

	fn apply(&mut self, relation: Relation, adds: &[&[Value]], removes: &[&[Value]]) -> Result<(), ProtocolError> {
		let _span = trace_span!("relation", name = relation.name(), adds = adds.len(), removes = removes.len()).entered();
		let name = relation.name();
		match relation {
			Relation::Instances => {
				for tuple in removes {
					self.instances.remove(&mut self.host, field(tuple, 0, name)?)?;
				}
				for tuple in adds {
					let namespace = tuple.get(3).map(ToString::to_string).filter(|namespace| !namespace.is_empty());
					self.instances.add(
						&mut self.host,
						field(tuple, 0, name)?.clone(),
						field(tuple, 1, name)?.clone(),
						&field(tuple, 2, name)?.to_string(),
						namespace.as_deref(),
					)?;
				}
			}

			Relation::Roots => {
				if !removes.is_empty() {
					trace!("Ignoring root removes, instance removal detaches.");
				}
				for tuple in adds {
					order::insert_root(&mut self.host, &self.instances, field(tuple, 0, name)?)?;
				}
			}

			Relation::Parents => {
				for tuple in removes {
					let (instance, parent) = (field(tuple, 0, name)?, field(tuple, 1, name)?);
					if let (Some(instance), Some(parent)) = (self.instances.get(instance), self.instances.get(parent)) {
						if self.host.parent(&instance.node).as_ref() == Some(&parent.node) {
							self.host.detach(&instance.node)?;
						}
					}
				}
				for tuple in adds {
					order::reparent(&mut self.host, &self.instances, field(tuple, 0, name)?, field(tuple, 1, name)?)?;
				}
			}

			Relation::Styles => {
				let result = (|| {
					for tuple in removes {
						self.styles.remove(field(tuple, 0, name)?.clone(), field(tuple, 1, name)?)?;
					}
					for tuple in adds {
						self.styles
							.add(&mut self.host, field(tuple, 0, name)?.clone(), field(tuple, 1, name)?, field(tuple, 2, name)?.clone())?;
					}
					Ok::<_, ProtocolError>(())
				})();
				self.styles.compile(&mut self.host);
				result?;
			}

			Relation::Attributes => {
				for tuple in removes {
					attributes::remove(
						&mut self.host,
						&self.instances,
						&self.styles,
						field(tuple, 0, name)?,
						field(tuple, 1, name)?,
						field(tuple, 2, name)?,
					)?;
				}
				for tuple in adds {
					attributes::add(
						&mut self.host,
						&mut self.instances,
						&self.styles,
						field(tuple, 0, name)?,
						field(tuple, 1, name)?,
						field(tuple, 2, name)?,
					)?;
				}
			}

			Relation::Triggers => {
				for tuple in adds {
					let (instance, trigger) = (field(tuple, 0, name)?, field(tuple, 1, name)?);
					if !self.instances.contains(instance) {
						return Err(ProtocolError::MissingInstance {
							instance: instance.clone(),
							during: "trigger",
						});
					}
					match trigger.as_str().and_then(Trigger::parse) {
						Some(trigger) => self.triggers.push((instance.clone(), trigger)),
						None => warn!(%trigger, "Ignoring unknown trigger."),
					}
				}
				if !self.triggers.is_empty() {
					self.scheduler.request(&mut self.host);
				}
			}

			Relation::Listeners => {
				for tuple in removes {
					let (instance, listener) = (field(tuple, 0, name)?, field(tuple, 1, name)?);
					let Some(live) = self.instances.get_mut(instance) else { continue };
					if !live.has_listeners() {
						return Err(ProtocolError::ListenerNeverAdded {
							instance: instance.clone(),
							listener: listener.clone(),
						});
					}
					live.set_listener(&listener.to_string(), false);
				}
				for tuple in adds {
					let (instance, listener) = (field(tuple, 0, name)?, field(tuple, 1, name)?);
					let live = self.instances.get_mut(instance).ok_or_else(|| ProtocolError::MissingInstance {
						instance: instance.clone(),
						during: "add listener",
					})?;
					live.set_listener(&listener.to_string(), true);
				}
			}

			Relation::CanvasInstances
			| Relation::Paths
			| Relation::Operations
			| Relation::OperationAttributes
			| Relation::PathOperations
			| Relation::CanvasPaths
			| Relation::PathStyles => {
				let result = self.apply_canvas(relation, adds, removes);
				if self.canvases.needs_flush() {
					self.scheduler.request(&mut self.host);
				}
				result?;
			}

			Relation::Log => console::print(Level::Log, adds),
			Relation::Warn => console::print(Level::Warn, adds),
			Relation::Error => console::print(Level::Error, adds),
			Relation::ConsoleDiff => console::print_diff(adds, removes),
		}
		Ok(())
	}

	fn apply_canvas(&mut self, relation: Relation, adds: &[&[Value]], removes: &[&[Value]]) -> Result<(), ProtocolError> {
		let name = relation.name();
		let canvases = &mut self.canvases;
		match relation {
			Relation::CanvasInstances => {
				for tuple in removes {
					canvases.remove_instance(field(tuple, 0, name)?, field(tuple, 1, name)?);
				}
				for tuple in adds {
					canvases.add_instance(field(tuple, 0, name)?.clone(), field(tuple, 1, name)?.clone());
				}
			}
			Relation::Paths => {
				for tuple in removes {
					canvases.remove_path(field(tuple, 0, name)?)?;
				}
				for tuple in adds {
					canvases.add_path(field(tuple, 0, name)?.clone())?;
				}
			}
			Relation::Operations => {
				for tuple in removes {
					canvases.remove_operation(field(tuple, 0, name)?)?;
				}
				for tuple in adds {
					canvases.add_operation(field(tuple, 0, name)?.clone(), field(tuple, 1, name)?)?;
				}
			}
			Relation::OperationAttributes => {
				for tuple in removes {
					canvases.remove_operation_argument(field(tuple, 0, name)?, field(tuple, 1, name)?);
				}
				for tuple in adds {
					canvases.add_operation_argument(field(tuple, 0, name)?, field(tuple, 1, name)?, field(tuple, 2, name)?.clone())?;
				}
			}
			Relation::PathOperations => {
				for tuple in removes {
					canvases.remove_path_operation(field(tuple, 0, name)?, field(tuple, 1, name)?, field(tuple, 2, name)?);
				}
				for tuple in adds {
					canvases.add_path_operation(field(tuple, 0, name)?.clone(), field(tuple, 1, name)?.clone(), field(tuple, 2, name)?)?;
				}
			}
			Relation::CanvasPaths => {
				for tuple in removes {
					canvases.remove_canvas_path(field(tuple, 0, name)?, field(tuple, 1, name)?, field(tuple, 2, name)?);
				}
				for tuple in adds {
					canvases.add_canvas_path(field(tuple, 0, name)?.clone(), field(tuple, 1, name)?.clone(), field(tuple, 2, name)?);
				}
			}
			Relation::PathStyles => {
				for tuple in removes {
					canvases.remove_path_style(field(tuple, 0, name)?, field(tuple, 1, name)?);
				}
				for tuple in adds {
					canvases.add_path_style(field(tuple, 0, name)?, field(tuple, 1, name)?, field(tuple, 2, name)?)?;
				}
			}
			_ => unreachable!("not a canvas relation"),
		}
		Ok(())
	}

	/// Runs pending triggers and redraws dirty canvases.
	///
	/// Called by the host's flush callback after [`crate::host::DomHost::schedule_flush`].
	#[instrument(skip_all)]
	pub fn flush(&mut self) -> FlushReport {
		if !self.scheduler.begin_flush() {
			trace!("Flushing without a scheduled flush.");
		}

		for (instance, trigger) in core::mem::take(&mut self.triggers) {
			let Some(live) = self.instances.get(&instance) else {
				trace!(%instance, "Trigger target is gone.");
				continue;
			};
			if !self.host.is_focusable(&live.node) {
				trace!(%instance, "Trigger target isn't focusable.");
				continue;
			}
			match trigger {
				Trigger::Focus => self.host.focus(&live.node),
				Trigger::Blur => self.host.blur(&live.node),
			}
		}

		self.canvases.flush(&mut self.host, &self.instances)
	}

	/// Adopts a node that was created outside of this engine as the sole instance of a fresh element.
	///
	/// Upstream learns about it through `[id, "tag", tag]` and `[id, "tag", "html/root/external"]`.
	#[instrument(skip(self, node))]
	pub fn add_external_root(&mut self, tag: &str, node: H::Node) -> Result<Value, ProtocolError> {
		let id = self.events.next_id();
		self.host.bind_instance(&node, &id);
		self.instances.adopt(id.clone(), id.clone(), node)?;
		self.send(vec![
			[id.clone(), "tag".into(), tag.into()],
			[id.clone(), "tag".into(), "html/root/external".into()],
		]);
		Ok(id)
	}

	/// Translates a native event and queues the resulting facts.
	pub fn dispatch_event(&mut self, event: &NativeEvent<H::Node>) {
		if let Some(eavs) = self.events.translate(&mut self.host, &self.instances, event) {
			self.send(eavs);
		}
	}

	/// Whether a native context menu at `target` should be suppressed.
	pub fn captures_context_menu(&self, target: &H::Node) -> bool {
		events::captures_context_menu(&self.host, &self.instances, target)
	}
}

impl<H: CanvasHost> Debug for Engine<H>
where
	H: Debug,
{
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Engine")
			.field("host", &self.host)
			.field("instances", &self.instances.len())
			.field("scheduler", &self.scheduler)
			.field("triggers", &self.triggers)
			.finish_non_exhaustive()
	}
}
