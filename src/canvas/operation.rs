//! Drawing operations: their kinds, argument lists and defaults.

use crate::value::Value;
use core::f64::consts::PI;
use hashbrown::HashMap;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
	MoveTo,
	LineTo,
	BezierCurveTo,
	QuadraticCurveTo,
	Arc,
	ArcTo,
	Ellipse,
	Rect,
	ClosePath,
}

impl OperationKind {
	pub const ALL: [Self; 9] = [
		Self::MoveTo,
		Self::LineTo,
		Self::BezierCurveTo,
		Self::QuadraticCurveTo,
		Self::Arc,
		Self::ArcTo,
		Self::Ellipse,
		Self::Rect,
		Self::ClosePath,
	];

	/// Parses the kind name used in facts. `None` for unknown kinds.
	#[must_use]
	pub fn parse(name: &str) -> Option<Self> {
		Some(match name {
			"moveTo" => Self::MoveTo,
			"lineTo" => Self::LineTo,
			"bezierCurveTo" | "bezierQuadraticCurveTo" => Self::BezierCurveTo,
			"quadraticCurveTo" => Self::QuadraticCurveTo,
			"arc" => Self::Arc,
			"arcTo" => Self::ArcTo,
			"ellipse" => Self::Ellipse,
			"rect" => Self::Rect,
			"closePath" => Self::ClosePath,
			_ => return None,
		})
	}

	#[must_use]
	pub fn name(self) -> &'static str {
		match self {
			Self::MoveTo => "moveTo",
			Self::LineTo => "lineTo",
			Self::BezierCurveTo => "bezierCurveTo",
			Self::QuadraticCurveTo => "quadraticCurveTo",
			Self::Arc => "arc",
			Self::ArcTo => "arcTo",
			Self::Ellipse => "ellipse",
			Self::Rect => "rect",
			Self::ClosePath => "closePath",
		}
	}

	/// Argument names in call order.
	#[must_use]
	pub fn fields(self) -> &'static [&'static str] {
		match self {
			Self::MoveTo | Self::LineTo => &["x", "y"],
			Self::BezierCurveTo => &["cp1x", "cp1y", "cp2x", "cp2y", "x", "y"],
			Self::QuadraticCurveTo => &["cpx", "cpy", "x", "y"],
			Self::Arc => &["x", "y", "radius", "startAngle", "endAngle", "anticlockwise"],
			Self::ArcTo => &["x1", "y1", "x2", "y2", "radius"],
			Self::Ellipse => &["x", "y", "radiusX", "radiusY", "rotation", "startAngle", "endAngle", "anticlockwise"],
			Self::Rect => &["x", "y", "width", "height"],
			Self::ClosePath => &[],
		}
	}
}

/// A resolved argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Argument {
	Number(f64),
	Flag(bool),
}

/// The value used for an optional field that has no argument.
///
/// Fields without a default are required.
#[must_use]
pub fn default_argument(field: &str) -> Option<Argument> {
	match field {
		"rotation" | "startAngle" => Some(Argument::Number(0.0)),
		"endAngle" => Some(Argument::Number(2.0 * PI)),
		"anticlockwise" => Some(Argument::Flag(false)),
		_ => None,
	}
}

/// A fully resolved drawing primitive, ready to be traced into a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
	MoveTo { x: f64, y: f64 },
	LineTo { x: f64, y: f64 },
	BezierCurveTo { cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64 },
	QuadraticCurveTo { cpx: f64, cpy: f64, x: f64, y: f64 },
	Arc { x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64, anticlockwise: bool },
	ArcTo { x1: f64, y1: f64, x2: f64, y2: f64, radius: f64 },
	Ellipse { x: f64, y: f64, radius_x: f64, radius_y: f64, rotation: f64, start_angle: f64, end_angle: f64, anticlockwise: bool },
	Rect { x: f64, y: f64, width: f64, height: f64 },
	ClosePath,
}

impl Operation {
	#[must_use]
	pub fn kind(&self) -> OperationKind {
		match self {
			Self::MoveTo { .. } => OperationKind::MoveTo,
			Self::LineTo { .. } => OperationKind::LineTo,
			Self::BezierCurveTo { .. } => OperationKind::BezierCurveTo,
			Self::QuadraticCurveTo { .. } => OperationKind::QuadraticCurveTo,
			Self::Arc { .. } => OperationKind::Arc,
			Self::ArcTo { .. } => OperationKind::ArcTo,
			Self::Ellipse { .. } => OperationKind::Ellipse,
			Self::Rect { .. } => OperationKind::Rect,
			Self::ClosePath => OperationKind::ClosePath,
		}
	}
}

fn argument(value: &Value) -> Option<Argument> {
	match value {
		Value::Number(number) => Some(Argument::Number(*number)),
		text => text.as_bool().map(Argument::Flag).or_else(|| text.as_str()?.trim().parse().ok().map(Argument::Number)),
	}
}

/// An operation as declared by facts: a kind and its (possibly incomplete) arguments.
#[derive(Debug)]
pub struct OperationRecord {
	pub kind: OperationKind,
	pub arguments: HashMap<String, Value>,
}

impl OperationRecord {
	#[must_use]
	pub fn new(kind: OperationKind) -> Self {
		Self {
			kind,
			arguments: HashMap::new(),
		}
	}

	/// Resolves the arguments in field order, substituting defaults.
	///
	/// Returns `None` if a required field is missing or an argument has the wrong type.
	#[must_use]
	pub fn resolve(&self) -> Option<Operation> {
		let mut resolved = [Argument::Number(0.0); 8];
		for (slot, &field) in resolved.iter_mut().zip(self.kind.fields()) {
			*slot = match self.arguments.get(field) {
				Some(value) => argument(value)?,
				None => default_argument(field)?,
			};
		}

		let number = |i: usize| match resolved[i] {
			Argument::Number(number) => Some(number),
			Argument::Flag(_) => None,
		};
		let flag = |i: usize| match resolved[i] {
			Argument::Flag(flag) => Some(flag),
			Argument::Number(_) => None,
		};

		Some(match self.kind {
			OperationKind::MoveTo => Operation::MoveTo { x: number(0)?, y: number(1)? },
			OperationKind::LineTo => Operation::LineTo { x: number(0)?, y: number(1)? },
			OperationKind::BezierCurveTo => Operation::BezierCurveTo {
				cp1x: number(0)?,
				cp1y: number(1)?,
				cp2x: number(2)?,
				cp2y: number(3)?,
				x: number(4)?,
				y: number(5)?,
			},
			OperationKind::QuadraticCurveTo => Operation::QuadraticCurveTo {
				cpx: number(0)?,
				cpy: number(1)?,
				x: number(2)?,
				y: number(3)?,
			},
			OperationKind::Arc => Operation::Arc {
				x: number(0)?,
				y: number(1)?,
				radius: number(2)?,
				start_angle: number(3)?,
				end_angle: number(4)?,
				anticlockwise: flag(5)?,
			},
			OperationKind::ArcTo => Operation::ArcTo {
				x1: number(0)?,
				y1: number(1)?,
				x2: number(2)?,
				y2: number(3)?,
				radius: number(4)?,
			},
			OperationKind::Ellipse => Operation::Ellipse {
				x: number(0)?,
				y: number(1)?,
				radius_x: number(2)?,
				radius_y: number(3)?,
				rotation: number(4)?,
				start_angle: number(5)?,
				end_angle: number(6)?,
				anticlockwise: flag(7)?,
			},
			OperationKind::Rect => Operation::Rect {
				x: number(0)?,
				y: number(1)?,
				width: number(2)?,
				height: number(3)?,
			},
			OperationKind::ClosePath => Operation::ClosePath,
		})
	}

	/// Like [`OperationRecord::resolve`], but warns about the skipped operation.
	pub(crate) fn resolve_or_warn(&self, id: &Value) -> Option<Operation> {
		let resolved = self.resolve();
		if resolved.is_none() {
			if cfg!(feature = "dangerous-logging") {
				warn!("Skipping incomplete or invalid operation {} ({}): {:?}", id, self.kind.name(), self.arguments);
			} else {
				warn!("Skipping incomplete or invalid operation {} ({}).", id, self.kind.name());
			}
		}
		resolved
	}
}
