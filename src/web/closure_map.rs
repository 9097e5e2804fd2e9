use tracing::{error, trace};
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{AddEventListenerOptions, Event, EventTarget};

struct Published {
	target: EventTarget,
	name: &'static str,
	capture: bool,
	closure: Closure<dyn Fn(Event)>,
}

/// Owns the closures of installed event listeners and removes the listeners again when dropped.
#[derive(Default)]
pub struct ClosureMap {
	published: Vec<Published>,
}

impl ClosureMap {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds `handler` as listener for `name` events on `target`.
	pub fn publish(&mut self, target: &EventTarget, name: &'static str, capture: bool, handler: impl Fn(Event) + 'static) {
		let closure = Closure::wrap(Box::new(handler) as Box<dyn Fn(Event)>);
		let options = AddEventListenerOptions::new();
		options.set_capture(capture);
		if let Err(error) = target.add_event_listener_with_callback_and_add_event_listener_options(name, closure.as_ref().unchecked_ref(), &options) {
			error!("Failed to add event listener {:?}: {:?}", name, error);
			return;
		}
		trace!(name, capture, "Published closure.");
		self.published.push(Published {
			target: target.clone(),
			name,
			capture,
			closure,
		});
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.published.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.published.is_empty()
	}
}

impl Drop for ClosureMap {
	fn drop(&mut self) {
		for Published { target, name, capture, closure } in self.published.drain(..) {
			if let Err(error) = target.remove_event_listener_with_callback_and_bool(name, closure.as_ref().unchecked_ref(), capture) {
				error!("Failed to remove event listener {:?}: {:?}", name, error);
			}
		}
		trace!("Unpublished closures.");
	}
}
