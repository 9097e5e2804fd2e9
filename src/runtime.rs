//! Message loop around an [`Engine`].
//!
//! Diffs, native events and flushes all enter through [`Runtime::push`].
//! A message pushed while another is being processed (for example by an upstream sink that answers synchronously)
//! is queued and processed afterwards, never nested.

use crate::{
	diff::{Diff, Outbound},
	engine::Engine,
	events::NativeEvent,
	host::CanvasHost,
};
use core::cell::{Cell, RefCell};
use std::collections::VecDeque;
use tracing::{instrument, trace};

pub enum Inbound<N> {
	Diff(Diff),
	Event(NativeEvent<N>),
	/// The flush scheduled through the host is due.
	Flush,
}

pub struct Runtime<H: CanvasHost> {
	engine: RefCell<Engine<H>>,
	inbox: RefCell<VecDeque<Inbound<H::Node>>>,
	draining: Cell<bool>,
	upstream: RefCell<Box<dyn FnMut(Outbound)>>,
}

impl<H: CanvasHost> Runtime<H> {
	/// `upstream` receives every outbound message, in order.
	pub fn new(engine: Engine<H>, upstream: impl FnMut(Outbound) + 'static) -> Self {
		Self {
			engine: RefCell::new(engine),
			inbox: RefCell::new(VecDeque::new()),
			draining: Cell::new(false),
			upstream: RefCell::new(Box::new(upstream)),
		}
	}

	/// Queues `message` and, unless already doing so further up the stack, processes the queue.
	#[instrument(skip_all)]
	pub fn push(&self, message: Inbound<H::Node>) {
		self.inbox.borrow_mut().push_back(message);
		if self.draining.replace(true) {
			trace!("Queued re-entrant message.");
			return;
		}

		loop {
			let Some(message) = self.inbox.borrow_mut().pop_front() else { break };
			let outbound = {
				let mut engine = self.engine.borrow_mut();
				match message {
					Inbound::Diff(diff) => {
						// Errors are reported upstream as notices.
						let _ = engine.handle_diff(&diff);
					}
					Inbound::Event(event) => engine.dispatch_event(&event),
					Inbound::Flush => {
						let report = engine.flush();
						trace!(?report);
					}
				}
				engine.take_outbound()
			};
			let mut upstream = self.upstream.borrow_mut();
			for message in outbound {
				upstream(message);
			}
		}

		self.draining.set(false);
	}

	/// Direct access to the engine, e.g. for adapters that need [`Engine::instances_for`].
	///
	/// # Panics
	///
	/// Iff called while a message is being processed.
	pub fn engine(&self) -> core::cell::RefMut<'_, Engine<H>> {
		self.engine.borrow_mut()
	}

	/// Like [`Runtime::engine`], but `None` while a message is being processed.
	pub fn try_engine(&self) -> Option<core::cell::RefMut<'_, Engine<H>>> {
		self.engine.try_borrow_mut().ok()
	}

	/// Whether messages are waiting.
	pub fn is_idle(&self) -> bool {
		self.inbox.borrow().is_empty() && !self.draining.get()
	}
}
