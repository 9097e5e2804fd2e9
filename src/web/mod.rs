//! Browser glue: a [`WebHost`] and the window listeners feeding native events into a [`Runtime`].

use crate::{
	diff::Outbound,
	engine::{Engine, EngineOptions},
	error::HostError,
	events::{FocusKind, HoverKind, KeyKind, MouseKind, NativeEvent, RIGHT_BUTTON},
	runtime::{Inbound, Runtime},
};
use std::rc::{Rc, Weak};
use tracing::{instrument, trace};
use wasm_bindgen::{closure::Closure, JsCast, UnwrapThrowExt};
use web_sys::{Element, Event, EventTarget, FocusEvent, KeyboardEvent, MouseEvent};

mod closure_map;
mod host;

pub use closure_map::ClosureMap;
pub use host::WebHost;

/// A running engine together with the listeners feeding it. Dropping this removes the listeners.
pub struct Mount {
	pub runtime: Rc<Runtime<WebHost>>,
	listeners: ClosureMap,
	_flush: Closure<dyn FnMut()>,
}

impl Mount {
	/// Number of installed window and body listeners.
	#[must_use]
	pub fn listener_count(&self) -> usize {
		self.listeners.len()
	}
}

fn target_element(event: &Event) -> Option<Element> {
	event.target()?.dyn_into::<Element>().ok()
}

fn mouse_event(kind: MouseKind, event: &Event) -> Option<NativeEvent<Element>> {
	let mouse = event.dyn_ref::<MouseEvent>()?;
	Some(NativeEvent::Mouse {
		kind,
		button: mouse.button(),
		page_x: mouse.page_x().into(),
		page_y: mouse.page_y().into(),
		window_x: mouse.client_x().into(),
		window_y: mouse.client_y().into(),
		target: target_element(event),
	})
}

fn key_event(kind: KeyKind, event: &Event) -> Option<NativeEvent<Element>> {
	let key = event.dyn_ref::<KeyboardEvent>()?;
	Some(NativeEvent::Key {
		kind,
		key_code: key.key_code(),
		repeat: key.repeat(),
		target: target_element(event),
	})
}

fn focus_event(kind: FocusKind, event: &Event) -> Option<NativeEvent<Element>> {
	event.dyn_ref::<FocusEvent>()?;
	Some(NativeEvent::Focus { kind, target: target_element(event)? })
}

fn hover_event(kind: HoverKind, event: &Event) -> Option<NativeEvent<Element>> {
	Some(NativeEvent::Hover { kind, target: target_element(event)? })
}

/// Renders into the document body and listens for user input on the window.
///
/// `upstream` receives transactions and error notices.
///
/// # Panics
///
/// Iff there is no window with a document body.
#[instrument(skip_all)]
pub fn mount(options: EngineOptions, upstream: impl FnMut(Outbound) + 'static) -> Result<Mount, HostError> {
	let window = web_sys::window().expect_throw("fact-dom: No window.");
	let document = window.document().expect_throw("fact-dom: No document.");
	let body = document.body().expect_throw("fact-dom: No document body.");

	let host = WebHost::new(document, body.clone().into())?;
	let runtime = Rc::new(Runtime::new(Engine::with_options(host, options), upstream));

	let flush = {
		let runtime = Rc::downgrade(&runtime);
		Closure::wrap(Box::new(move || {
			if let Some(runtime) = runtime.upgrade() {
				runtime.push(Inbound::Flush);
			}
		}) as Box<dyn FnMut()>)
	};
	runtime.engine().host_mut().set_flush_callback(flush.as_ref().unchecked_ref::<js_sys::Function>().clone());

	let mut listeners = ClosureMap::new();
	let window: &EventTarget = window.as_ref();
	let body: &EventTarget = body.as_ref();

	let forward = |translate: fn(&Event) -> Option<NativeEvent<Element>>| {
		let runtime: Weak<Runtime<WebHost>> = Rc::downgrade(&runtime);
		move |event: Event| {
			let Some(runtime) = runtime.upgrade() else { return };
			match translate(&event) {
				Some(native) => runtime.push(Inbound::Event(native)),
				None => trace!(kind = %event.type_(), "Ignoring event without usable target."),
			}
		}
	};

	listeners.publish(window, "click", false, forward(|event| mouse_event(MouseKind::Click, event)));
	listeners.publish(window, "dblclick", false, forward(|event| mouse_event(MouseKind::DoubleClick, event)));
	listeners.publish(window, "mousedown", false, forward(|event| mouse_event(MouseKind::Down, event)));
	listeners.publish(window, "mouseup", false, forward(|event| mouse_event(MouseKind::Up, event)));
	listeners.publish(window, "input", false, forward(|event| Some(NativeEvent::Input { target: target_element(event)? })));
	listeners.publish(window, "keydown", false, forward(|event| key_event(KeyKind::Down, event)));
	listeners.publish(window, "keyup", false, forward(|event| key_event(KeyKind::Up, event)));
	listeners.publish(window, "focus", true, forward(|event| focus_event(FocusKind::Focus, event)));
	listeners.publish(window, "blur", true, forward(|event| focus_event(FocusKind::Blur, event)));
	listeners.publish(body, "mouseenter", true, forward(|event| hover_event(HoverKind::In, event)));
	listeners.publish(body, "mouseleave", true, forward(|event| hover_event(HoverKind::Out, event)));

	{
		let runtime = Rc::downgrade(&runtime);
		listeners.publish(window, "contextmenu", false, move |event: Event| {
			let (Some(runtime), Some(mouse), Some(target)) = (runtime.upgrade(), event.dyn_ref::<MouseEvent>(), target_element(&event)) else {
				return;
			};
			if mouse.button() != RIGHT_BUTTON {
				return;
			}
			let captured = match runtime.try_engine() {
				Some(engine) => engine.captures_context_menu(&target),
				None => false,
			};
			if captured {
				event.prevent_default();
			}
		});
	}

	Ok(Mount {
		runtime,
		listeners,
		_flush: flush,
	})
}
