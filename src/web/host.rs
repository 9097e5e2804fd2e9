//! [`DomHost`] and [`CanvasHost`] on a browser document.

use crate::{
	canvas::{Operation, OperationKind, PaintStyle},
	error::HostError,
	host::{CanvasHost, ControlKind, DomHost, FormControl},
	value::Value,
};
use hashbrown::HashSet;
use js_sys::{Function, Reflect};
use tracing::{error, instrument, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlElement, HtmlInputElement, HtmlStyleElement, HtmlTextAreaElement, Path2d};

/// Property the instance id is stored in on rendered elements.
const INSTANCE_KEY: &str = "__instance";

pub(crate) fn host_error(error: JsValue) -> HostError {
	HostError(format!("{:?}", error))
}

fn to_js(value: &Value) -> JsValue {
	match value {
		Value::Number(number) => JsValue::from_f64(*number),
		Value::Text(text) => JsValue::from_str(text),
	}
}

fn from_js(value: &JsValue) -> Option<Value> {
	value.as_f64().map(Value::Number).or_else(|| value.as_string().map(Value::Text))
}

#[derive(Debug)]
pub struct WebHost {
	document: Document,
	container: Element,
	/// Hidden element holding one `<style>` per synthetic style.
	style_container: Element,
	available: HashSet<OperationKind>,
	flush: Option<Function>,
}

impl WebHost {
	/// Renders roots into `container` and allocates the hidden style container inside it.
	#[instrument(skip_all)]
	pub fn new(document: Document, container: Element) -> Result<Self, HostError> {
		let style_container: HtmlElement = document.create_element("div").map_err(host_error)?.dyn_into().map_err(|element| host_error(element.into()))?;
		let style = style_container.style();
		style.set_property("display", "none").map_err(host_error)?;
		style.set_property("visibility", "hidden").map_err(host_error)?;
		container.append_child(&style_container).map_err(host_error)?;

		let probe = Path2d::new().map_err(host_error)?;
		let available = OperationKind::ALL
			.iter()
			.copied()
			.filter(|kind| Reflect::has(&probe, &JsValue::from_str(kind.name())).unwrap_or(false))
			.collect::<HashSet<_>>();
		if available.len() < OperationKind::ALL.len() {
			warn!("Path2D lacks some operations. Check your browser's Path2D compatibility.");
		}

		Ok(Self {
			document,
			container,
			style_container: style_container.into(),
			available,
			flush: None,
		})
	}

	/// The callback queued as microtask by [`DomHost::schedule_flush`].
	pub fn set_flush_callback(&mut self, callback: Function) {
		self.flush = Some(callback);
	}

	#[must_use]
	pub fn document(&self) -> &Document {
		&self.document
	}

	fn context(canvas: &Element) -> Option<(HtmlCanvasElement, CanvasRenderingContext2d)> {
		let canvas = canvas.dyn_ref::<HtmlCanvasElement>()?.clone();
		let context = canvas.get_context("2d").ok().flatten()?.dyn_into::<CanvasRenderingContext2d>().ok()?;
		Some((canvas, context))
	}
}

impl DomHost for WebHost {
	type Node = Element;
	type Rule = HtmlStyleElement;

	fn container(&self) -> Element {
		self.container.clone()
	}

	fn create_element(&mut self, tag: &str, namespace: Option<&str>) -> Result<Element, HostError> {
		match namespace {
			Some(namespace) => self.document.create_element_ns(Some(namespace), tag),
			None => self.document.create_element(tag),
		}
		.map_err(host_error)
	}

	fn bind_instance(&mut self, node: &Element, instance: &Value) {
		if let Err(error) = Reflect::set(node, &JsValue::from_str(INSTANCE_KEY), &to_js(instance)) {
			error!("Failed to bind instance {}: {:?}", instance, error);
		}
	}

	fn instance_of(&self, node: &Element) -> Option<Value> {
		from_js(&Reflect::get(node, &JsValue::from_str(INSTANCE_KEY)).ok()?)
	}

	fn parent(&self, node: &Element) -> Option<Element> {
		node.parent_element()
	}

	fn children(&self, parent: &Element) -> Vec<Element> {
		let children = parent.children();
		(0..children.length()).filter_map(|i| children.item(i)).collect()
	}

	fn insert_before(&mut self, parent: &Element, child: &Element, before: Option<&Element>) -> Result<(), HostError> {
		parent.insert_before(child, before.map(|before| &**before)).map(drop).map_err(host_error)
	}

	fn detach(&mut self, node: &Element) -> Result<(), HostError> {
		node.remove();
		Ok(())
	}

	fn set_text(&mut self, node: &Element, text: Option<&str>) {
		node.set_text_content(text);
	}

	fn add_class(&mut self, node: &Element, class: &str) -> Result<(), HostError> {
		node.class_list().add_1(class).map_err(host_error)
	}

	fn remove_class(&mut self, node: &Element, class: &str) -> Result<(), HostError> {
		node.class_list().remove_1(class).map_err(host_error)
	}

	fn has_class(&self, node: &Element, class: &str) -> bool {
		node.class_list().contains(class)
	}

	fn set_attribute(&mut self, node: &Element, name: &str, value: &str) -> Result<(), HostError> {
		node.set_attribute(name, value).map_err(host_error)
	}

	fn remove_attribute(&mut self, node: &Element, name: &str) -> Result<(), HostError> {
		node.remove_attribute(name).map_err(host_error)
	}

	fn set_value(&mut self, node: &Element, value: &str) {
		if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
			input.set_value(value);
		} else if let Some(text_area) = node.dyn_ref::<HtmlTextAreaElement>() {
			text_area.set_value(value);
		}
	}

	fn form_control(&self, node: &Element) -> Option<FormControl> {
		if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
			let name = input.name();
			Some(FormControl {
				kind: match input.type_().as_str() {
					"checkbox" => ControlKind::Checkbox,
					"radio" => ControlKind::Radio,
					_ => ControlKind::Other,
				},
				value: input.value(),
				checked: input.checked(),
				name: if name.is_empty() { None } else { Some(name) },
			})
		} else {
			node.dyn_ref::<HtmlTextAreaElement>().map(|text_area| FormControl {
				kind: ControlKind::Other,
				value: text_area.value(),
				checked: false,
				name: None,
			})
		}
	}

	fn set_size(&mut self, node: &Element, size: u32) {
		if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
			input.set_size(size);
		}
	}

	fn is_focusable(&self, node: &Element) -> bool {
		node.is_instance_of::<HtmlInputElement>() || node.is_instance_of::<HtmlTextAreaElement>()
	}

	fn focus(&mut self, node: &Element) {
		if let Some(Err(error)) = node.dyn_ref::<HtmlElement>().map(HtmlElement::focus) {
			error!("Failed to focus: {:?}", error);
		}
	}

	fn blur(&mut self, node: &Element) {
		if let Some(Err(error)) = node.dyn_ref::<HtmlElement>().map(HtmlElement::blur) {
			error!("Failed to blur: {:?}", error);
		}
	}

	fn create_rule(&mut self) -> Result<HtmlStyleElement, HostError> {
		let rule: HtmlStyleElement = self.document.create_element("style").map_err(host_error)?.dyn_into().map_err(|element| host_error(element.into()))?;
		self.style_container.append_child(&rule).map_err(host_error)?;
		Ok(rule)
	}

	fn set_rule_text(&mut self, rule: &HtmlStyleElement, css: &str) {
		rule.set_text_content(Some(css));
	}

	fn remove_rule(&mut self, rule: HtmlStyleElement) {
		rule.remove();
	}

	fn schedule_flush(&mut self) {
		let Some(callback) = &self.flush else {
			warn!("No flush callback installed, canvases won't redraw.");
			return;
		};
		match web_sys::window() {
			Some(window) => window.queue_microtask(callback),
			None => error!("No window to schedule a flush on."),
		}
	}
}

impl CanvasHost for WebHost {
	type Path = Path2d;

	fn new_path(&mut self) -> Result<Path2d, HostError> {
		Path2d::new().map_err(host_error)
	}

	fn supports(&self, kind: OperationKind) -> bool {
		self.available.contains(&kind)
	}

	fn trace(&mut self, path: &mut Path2d, operation: &Operation) {
		let result = match *operation {
			Operation::MoveTo { x, y } => {
				path.move_to(x, y);
				Ok(())
			}
			Operation::LineTo { x, y } => {
				path.line_to(x, y);
				Ok(())
			}
			Operation::BezierCurveTo { cp1x, cp1y, cp2x, cp2y, x, y } => {
				path.bezier_curve_to(cp1x, cp1y, cp2x, cp2y, x, y);
				Ok(())
			}
			Operation::QuadraticCurveTo { cpx, cpy, x, y } => {
				path.quadratic_curve_to(cpx, cpy, x, y);
				Ok(())
			}
			Operation::Arc {
				x,
				y,
				radius,
				start_angle,
				end_angle,
				anticlockwise,
			} => path.arc_with_anticlockwise(x, y, radius, start_angle, end_angle, anticlockwise),
			Operation::ArcTo { x1, y1, x2, y2, radius } => path.arc_to(x1, y1, x2, y2, radius),
			Operation::Ellipse {
				x,
				y,
				radius_x,
				radius_y,
				rotation,
				start_angle,
				end_angle,
				anticlockwise,
			} => path.ellipse_with_anticlockwise(x, y, radius_x, radius_y, rotation, start_angle, end_angle, anticlockwise),
			Operation::Rect { x, y, width, height } => {
				path.rect(x, y, width, height);
				Ok(())
			}
			Operation::ClosePath => {
				path.close_path();
				Ok(())
			}
		};
		if let Err(error) = result {
			warn!("Skipping rejected {} operation: {:?}", operation.kind().name(), error);
		}
	}

	fn clear_surface(&mut self, canvas: &Element) {
		match Self::context(canvas) {
			Some((canvas, context)) => context.clear_rect(0.0, 0.0, canvas.width().into(), canvas.height().into()),
			None => warn!("Not a 2D canvas, skipping clear."),
		}
	}

	fn paint(&mut self, canvas: &Element, path: &Path2d, style: &PaintStyle) {
		let Some((_, context)) = Self::context(canvas) else {
			warn!("Not a 2D canvas, skipping paint.");
			return;
		};
		context.set_fill_style_str(&style.fill_style);
		context.set_stroke_style_str(&style.stroke_style);
		context.set_line_width(style.line_width);
		context.set_line_cap(&style.line_cap);
		context.set_line_join(&style.line_join);
		if style.stroke {
			context.stroke_with_path(path);
		}
		if style.fill {
			context.fill_with_path_2d(path);
		}
	}
}
