//! Vector paths drawn onto canvas surfaces.
//!
//! Facts only ever mark paths dirty. [`Canvases::flush`] then recompiles each dirty path once
//! and repaints exactly the surfaces that draw one of them.

use crate::{
	error::ProtocolError,
	host::CanvasHost,
	instances::Instances,
	temp_set::TempSet,
	value::Value,
};
use hashbrown::{hash_map::Entry, HashMap, HashSet};
use std::collections::BTreeMap;
use tracing::{error, info, instrument, level_filters::STATIC_MAX_LEVEL, trace, warn, Level};

mod operation;
mod paint;

pub use operation::{default_argument, Argument, Operation, OperationKind, OperationRecord};
pub use paint::{PaintStyle, PathStyle};

/// A path's resolved operations and the host drawable traced from them.
#[derive(Debug)]
pub struct CompiledPath<P> {
	pub operations: Vec<Operation>,
	pub native: P,
}

/// What one [`Canvases::flush`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
	/// Paths recompiled.
	pub compiled: usize,
	/// Canvas instances cleared and redrawn.
	pub painted: usize,
}

/// Converts a 1-based index fact into a slot. Only positive integral numbers are indices.
fn slot(index: &Value) -> Option<usize> {
	match index.as_number() {
		#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
		Some(number) if number >= 1.0 && number.fract() == 0.0 => Some(number as usize - 1),
		_ => None,
	}
}

/// Sparse 1-based sequence, keyed by slot. Holes are simply absent.
type Slots = BTreeMap<usize, Value>;

fn remove_one(ids: &mut Vec<Value>, id: &Value) {
	if let Some(position) = ids.iter().position(|x| x == id) {
		ids.remove(position);
	}
}

/// All canvas state: surfaces, paths, operations and the compiled path cache.
pub struct Canvases<P> {
	/// Canvas id to the instances it is rendered as.
	surfaces: HashMap<Value, Vec<Value>>,
	/// Path id to its sparse operation sequence.
	paths: HashMap<Value, Slots>,
	path_styles: HashMap<Value, PathStyle>,
	operations: HashMap<Value, OperationRecord>,
	/// Operation id to the paths including it, once per occurrence.
	/// Outlives the operation itself, so that a re-created operation still dirties its paths.
	operation_paths: HashMap<Value, Vec<Value>>,
	/// Canvas id to its sparse path sequence.
	canvas_paths: HashMap<Value, Slots>,
	/// Path id to the canvases drawing it, once per occurrence.
	path_canvases: HashMap<Value, Vec<Value>>,
	cache: HashMap<Value, CompiledPath<P>>,
	dirty: TempSet<Value>,
	/// Surfaces to repaint regardless of their paths, e.g. after gaining an instance.
	dirty_surfaces: HashSet<Value>,
	repaint: TempSet<Value>,
}

impl<P> Default for Canvases<P> {
	fn default() -> Self {
		Self::new()
	}
}

impl<P> Canvases<P> {
	#[must_use]
	pub fn new() -> Self {
		Self {
			surfaces: HashMap::new(),
			paths: HashMap::new(),
			path_styles: HashMap::new(),
			operations: HashMap::new(),
			operation_paths: HashMap::new(),
			canvas_paths: HashMap::new(),
			path_canvases: HashMap::new(),
			cache: HashMap::new(),
			dirty: TempSet::new(),
			dirty_surfaces: HashSet::new(),
			repaint: TempSet::new(),
		}
	}

	/// Whether anything awaits the next [`Canvases::flush`].
	#[must_use]
	pub fn needs_flush(&self) -> bool {
		!self.dirty.is_empty() || !self.dirty_surfaces.is_empty()
	}

	#[must_use]
	pub fn is_dirty(&self, path: &Value) -> bool {
		self.dirty.contains(path)
	}

	/// The compiled form of `path`, as of the last flush.
	#[must_use]
	pub fn compiled(&self, path: &Value) -> Option<&CompiledPath<P>> {
		self.cache.get(path)
	}

	#[must_use]
	pub fn path_style(&self, path: &Value) -> Option<&PathStyle> {
		self.path_styles.get(path)
	}

	#[must_use]
	pub fn operation(&self, operation: &Value) -> Option<&OperationRecord> {
		self.operations.get(operation)
	}

	/// Instance ids `canvas` is rendered as.
	#[must_use]
	pub fn surfaces_of(&self, canvas: &Value) -> &[Value] {
		self.surfaces.get(canvas).map_or(&[], Vec::as_slice)
	}

	fn mark_canvas(&mut self, canvas: &Value) {
		self.dirty_surfaces.insert(canvas.clone());
		if let Some(paths) = self.canvas_paths.get(canvas) {
			for path in paths.values() {
				self.dirty.insert(path.clone());
			}
		}
	}

	fn mark_operation_paths(&mut self, operation: &Value) {
		if let Some(paths) = self.operation_paths.get(operation) {
			for path in paths {
				self.dirty.insert(path.clone());
			}
		}
	}

	pub fn add_instance(&mut self, canvas: Value, instance: Value) {
		self.surfaces.entry(canvas.clone()).or_default().push(instance);
		self.mark_canvas(&canvas);
	}

	/// Tolerates unknown pairs.
	pub fn remove_instance(&mut self, canvas: &Value, instance: &Value) {
		match self.surfaces.entry(canvas.clone()) {
			Entry::Occupied(mut occupied) => {
				remove_one(occupied.get_mut(), instance);
				if occupied.get().is_empty() {
					occupied.remove();
				}
			}
			Entry::Vacant(_) => warn!(%canvas, "Removing instance from unknown canvas."),
		}
		self.mark_canvas(canvas);
	}

	#[instrument(skip_all, fields(%path))]
	pub fn add_path(&mut self, path: Value) -> Result<(), ProtocolError> {
		match self.paths.entry(path.clone()) {
			Entry::Occupied(_) => Err(ProtocolError::DuplicatePath(path)),
			Entry::Vacant(vacant) => {
				vacant.insert(Slots::new());
				self.path_styles.insert(path.clone(), PathStyle::default());
				self.dirty.insert(path);
				Ok(())
			}
		}
	}

	#[instrument(skip_all, fields(%path))]
	pub fn remove_path(&mut self, path: &Value) -> Result<(), ProtocolError> {
		if self.paths.remove(path).is_none() {
			return Err(ProtocolError::UnknownPath(path.clone()));
		}
		self.path_styles.remove(path);
		self.dirty.insert(path.clone());
		Ok(())
	}

	#[instrument(skip_all, fields(%operation, %kind))]
	pub fn add_operation(&mut self, operation: Value, kind: &Value) -> Result<(), ProtocolError> {
		let parsed = match kind.as_str().and_then(OperationKind::parse) {
			Some(parsed) => parsed,
			None => {
				return Err(ProtocolError::UnknownOperationKind {
					operation,
					kind: kind.clone(),
				})
			}
		};
		match self.operations.entry(operation.clone()) {
			Entry::Occupied(_) => return Err(ProtocolError::DuplicateOperation(operation)),
			Entry::Vacant(vacant) => {
				vacant.insert(OperationRecord::new(parsed));
			}
		}
		// Paths that kept referencing an earlier operation with this id pick up the new one.
		self.mark_operation_paths(&operation);
		Ok(())
	}

	/// Forgets an operation. Paths that still reference it skip it from their next compilation on.
	#[instrument(skip_all, fields(%operation))]
	pub fn remove_operation(&mut self, operation: &Value) -> Result<(), ProtocolError> {
		self.mark_operation_paths(operation);
		match self.operations.remove(operation) {
			Some(_) => Ok(()),
			None => Err(ProtocolError::UnknownOperation(operation.clone())),
		}
	}

	pub fn add_operation_argument(&mut self, operation: &Value, field: &Value, value: Value) -> Result<(), ProtocolError> {
		let record = self.operations.get_mut(operation).ok_or_else(|| ProtocolError::UnknownOperation(operation.clone()))?;
		match record.arguments.entry(field.to_string()) {
			Entry::Occupied(_) => {
				return Err(ProtocolError::OperationArgumentOverwrite {
					operation: operation.clone(),
					field: field.clone(),
				})
			}
			Entry::Vacant(vacant) => {
				vacant.insert(value);
			}
		}
		self.mark_operation_paths(operation);
		Ok(())
	}

	/// Tolerates unknown operations.
	pub fn remove_operation_argument(&mut self, operation: &Value, field: &Value) {
		match self.operations.get_mut(operation) {
			Some(record) => {
				record.arguments.remove(field.to_string().as_str());
			}
			None => {
				trace!(%operation, "Operation already gone.");
				return;
			}
		}
		self.mark_operation_paths(operation);
	}

	#[instrument(skip_all, fields(%path, %operation, %index))]
	pub fn add_path_operation(&mut self, path: Value, operation: Value, index: &Value) -> Result<(), ProtocolError> {
		let Some(at) = slot(index) else {
			warn!("Ignoring path operation without a valid index.");
			return Ok(());
		};
		let sequence = self.paths.get_mut(&path).ok_or_else(|| ProtocolError::UnknownPath(path.clone()))?;
		if !self.operations.contains_key(&operation) {
			return Err(ProtocolError::UnknownOperation(operation));
		}
		sequence.insert(at, operation.clone());
		self.operation_paths.entry(operation).or_default().push(path.clone());
		self.dirty.insert(path);
		Ok(())
	}

	/// Leaves a hole. Tolerates unknown paths and operations.
	pub fn remove_path_operation(&mut self, path: &Value, operation: &Value, index: &Value) {
		let Some(at) = slot(index) else {
			warn!(%path, "Ignoring path operation without a valid index.");
			return;
		};
		if let Some(sequence) = self.paths.get_mut(path) {
			sequence.remove(&at);
		}
		if let Entry::Occupied(mut paths) = self.operation_paths.entry(operation.clone()) {
			remove_one(paths.get_mut(), path);
			if paths.get().is_empty() {
				paths.remove();
			}
		}
		self.dirty.insert(path.clone());
	}

	pub fn add_canvas_path(&mut self, canvas: Value, path: Value, index: &Value) {
		let Some(at) = slot(index) else {
			warn!(%canvas, "Ignoring canvas path without a valid index.");
			return;
		};
		self.canvas_paths.entry(canvas.clone()).or_default().insert(at, path.clone());
		self.path_canvases.entry(path.clone()).or_default().push(canvas.clone());
		self.dirty_surfaces.insert(canvas);
		self.dirty.insert(path);
	}

	/// Leaves a hole. Tolerates unknown canvases.
	pub fn remove_canvas_path(&mut self, canvas: &Value, path: &Value, index: &Value) {
		let Some(at) = slot(index) else {
			warn!(%canvas, "Ignoring canvas path without a valid index.");
			return;
		};
		let Some(paths) = self.canvas_paths.get_mut(canvas) else {
			trace!(%canvas, "Canvas has no paths.");
			return;
		};
		paths.remove(&at);
		if let Entry::Occupied(mut canvases) = self.path_canvases.entry(path.clone()) {
			remove_one(canvases.get_mut(), canvas);
			if canvases.get().is_empty() {
				canvases.remove();
			}
		}
		// The path may no longer be drawn by this canvas, so it needs a repaint on its own account.
		self.dirty_surfaces.insert(canvas.clone());
		self.dirty.insert(path.clone());
	}

	pub fn add_path_style(&mut self, path: &Value, property: &Value, value: &Value) -> Result<(), ProtocolError> {
		let style = self.path_styles.get_mut(path).ok_or_else(|| ProtocolError::UnknownPath(path.clone()))?;
		style.set(&property.to_string(), value);
		self.dirty.insert(path.clone());
		Ok(())
	}

	/// Tolerates unknown paths.
	pub fn remove_path_style(&mut self, path: &Value, property: &Value) {
		if let Some(style) = self.path_styles.get_mut(path) {
			style.unset(&property.to_string());
			self.dirty.insert(path.clone());
		}
	}
}

impl<P> Canvases<P> {
	/// Recompiles dirty paths and repaints the surfaces drawing them.
	#[instrument(skip_all, fields(dirty = self.dirty.len()))]
	pub fn flush<H>(&mut self, host: &mut H, instances: &Instances<H::Node>) -> FlushReport
	where
		H: CanvasHost<Path = P>,
	{
		let mut report = FlushReport::default();
		let dirty: Vec<Value> = self.dirty.drain().collect();

		for path in &dirty {
			let Some(sequence) = self.paths.get(path) else {
				if self.cache.remove(path).is_some() {
					trace!(%path, "Dropped compiled path.");
				}
				continue;
			};

			let mut native = match host.new_path() {
				Ok(native) => native,
				Err(error) => {
					error!(%path, %error, "Failed to allocate path.");
					continue;
				}
			};
			let mut operations = Vec::with_capacity(sequence.len());
			for id in sequence.values() {
				let Some(record) = self.operations.get(id) else {
					warn!(%path, operation = %id, "Skipping removed operation.");
					continue;
				};
				let Some(operation) = record.resolve_or_warn(id) else { continue };
				if !host.supports(operation.kind()) {
					warn!("Skipping unavailable operation type {}.", operation.kind().name());
					continue;
				}
				host.trace(&mut native, &operation);
				operations.push(operation);
			}
			self.cache.insert(path.clone(), CompiledPath { operations, native });
			report.compiled += 1;
		}

		let repaint = self.repaint.temp();
		for path in &dirty {
			if let Some(canvases) = self.path_canvases.get(path) {
				repaint.extend(canvases.iter().cloned());
			}
		}
		repaint.extend(self.dirty_surfaces.drain());

		for canvas in repaint.iter() {
			if STATIC_MAX_LEVEL >= Level::WARN {
				if let Some(paths) = self.canvas_paths.get(canvas) {
					let span = paths.keys().next_back().map_or(0, |last| last.saturating_add(1));
					let holes = span - paths.len();
					if holes >= 100 && holes > span / 2 {
						warn!(
							"Canvas {} has {} empty path slot(s) out of {}.\n\
							This may point to indices that keep growing instead of being reused.",
							canvas,
							holes,
							span
						);
					}
				}
			}
			let Some(surfaces) = self.surfaces.get(canvas) else {
				trace!(%canvas, "Canvas has no instances to paint.");
				continue;
			};
			for surface in surfaces {
				let Some(instance) = instances.get(surface) else {
					warn!(%canvas, instance = %surface, "Skipping missing canvas instance.");
					continue;
				};
				host.clear_surface(&instance.node);
				report.painted += 1;
				for path in self.canvas_paths.get(canvas).into_iter().flat_map(BTreeMap::values) {
					// Not a path (yet?).
					let Some(compiled) = self.cache.get(path) else { continue };
					let style = self.path_styles.get(path).map(PathStyle::resolve).unwrap_or_default();
					host.paint(&instance.node, &compiled.native, &style);
				}
			}
		}

		if report != FlushReport::default() {
			info!(
				"Flushed canvases: {} path(s) compiled, {} surface(s) painted, {} cached, repaint set capacity {}.",
				report.compiled,
				report.painted,
				self.cache.len(),
				self.repaint.capacity()
			);
		}
		report
	}
}
