//! Log relations, printed through `tracing` under the `fact_dom::console` target.

use crate::value::Value;
use core::fmt::{self, Display, Formatter};
use tracing::{error, info, warn};

/// Space-separated tuple fields.
pub struct Fields<'a>(pub &'a [Value]);

impl Display for Fields<'_> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		for (i, value) in self.0.iter().enumerate() {
			if i > 0 {
				f.write_str(" ")?;
			}
			write!(f, "{}", value)?;
		}
		Ok(())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
	Log,
	Warn,
	Error,
}

/// Prints each added tuple. Removes are ignored.
pub fn print(level: Level, adds: &[&[Value]]) {
	for add in adds {
		match level {
			Level::Log => info!(target: "fact_dom::console", "{}", Fields(add)),
			Level::Warn => warn!(target: "fact_dom::console", "{}", Fields(add)),
			Level::Error => error!(target: "fact_dom::console", "{}", Fields(add)),
		}
	}
}

/// Prints removes prefixed with `- `, then adds prefixed with `+ `.
pub fn print_diff(adds: &[&[Value]], removes: &[&[Value]]) {
	for remove in removes {
		info!(target: "fact_dom::console", "- {}", Fields(remove));
	}
	for add in adds {
		info!(target: "fact_dom::console", "+ {}", Fields(add));
	}
}
