use crate::value::Value;
use tracing::warn;

/// Style facts of one path. Unset properties fall back to the defaults of [`PaintStyle`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathStyle {
	pub fill_style: Option<String>,
	pub stroke_style: Option<String>,
	pub line_width: Option<f64>,
	pub line_cap: Option<String>,
	pub line_join: Option<String>,
}

impl PathStyle {
	/// Sets one property by its fact name. Unknown names are ignored with a warning.
	pub fn set(&mut self, property: &str, value: &Value) {
		match property {
			"fillStyle" => self.fill_style = Some(value.to_string()),
			"strokeStyle" => self.stroke_style = Some(value.to_string()),
			"lineWidth" => match value.as_number().or_else(|| value.as_str()?.trim().parse().ok()) {
				Some(width) => self.line_width = Some(width),
				None => warn!("Ignoring non-numeric lineWidth."),
			},
			"lineCap" => self.line_cap = Some(value.to_string()),
			"lineJoin" => self.line_join = Some(value.to_string()),
			other => warn!(property = other, "Ignoring unknown path style property."),
		}
	}

	pub fn unset(&mut self, property: &str) {
		match property {
			"fillStyle" => self.fill_style = None,
			"strokeStyle" => self.stroke_style = None,
			"lineWidth" => self.line_width = None,
			"lineCap" => self.line_cap = None,
			"lineJoin" => self.line_join = None,
			_ => (),
		}
	}

	/// Fills in defaults and decides which of stroke and fill are painted.
	#[must_use]
	pub fn resolve(&self) -> PaintStyle {
		PaintStyle {
			fill_style: self.fill_style.clone().unwrap_or_else(|| PaintStyle::DEFAULT_COLOR.to_owned()),
			stroke_style: self.stroke_style.clone().unwrap_or_else(|| PaintStyle::DEFAULT_COLOR.to_owned()),
			line_width: self.line_width.unwrap_or(1.0),
			line_cap: self.line_cap.clone().unwrap_or_else(|| "butt".to_owned()),
			line_join: self.line_join.clone().unwrap_or_else(|| "miter".to_owned()),
			stroke: self.stroke_style.is_some(),
			fill: self.fill_style.is_some() || self.stroke_style.is_none(),
		}
	}
}

/// Everything needed to paint one path onto a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintStyle {
	pub fill_style: String,
	pub stroke_style: String,
	pub line_width: f64,
	pub line_cap: String,
	pub line_join: String,
	/// Only when a stroke style is set.
	pub stroke: bool,
	/// When a fill style is set, or when neither is.
	pub fill: bool,
}

impl PaintStyle {
	pub const DEFAULT_COLOR: &'static str = "#000000";
}

impl Default for PaintStyle {
	fn default() -> Self {
		PathStyle::default().resolve()
	}
}
