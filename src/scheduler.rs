use crate::host::DomHost;
use tracing::trace;

/// Coalesces flush requests into at most one pending flush.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Scheduler {
	#[default]
	Idle,
	Scheduled,
}

impl Scheduler {
	/// Schedules a flush through `host` unless one is already pending.
	pub fn request<H: DomHost + ?Sized>(&mut self, host: &mut H) {
		if *self == Self::Idle {
			trace!("Scheduling flush.");
			*self = Self::Scheduled;
			host.schedule_flush();
		}
	}

	/// Returns to idle. Returns whether a flush was pending.
	pub fn begin_flush(&mut self) -> bool {
		core::mem::take(self) == Self::Scheduled
	}

	#[must_use]
	pub fn is_scheduled(self) -> bool {
		self == Self::Scheduled
	}
}
