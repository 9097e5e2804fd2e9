//! Errors that abort the batch they occur in.
//!
//! Anything listed here means the upstream fact store and this reconciler have diverged.
//! Tolerated inconsistencies (removes racing teardown, drawing not-yet-compiled paths, missing optional arguments)
//! are logged instead and never surface as an error.

use crate::{rc_hash_map::CountSaturatedError, value::Value};
use core::fmt::{self, Display, Formatter};

/// A failure reported by the rendering host, e.g. a rejected DOM mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostError(pub String);

impl Display for HostError {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}
impl std::error::Error for HostError {}

/// Which side of a reparenting fact could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingSide {
	Instance,
	Parent,
	Both,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolError {
	/// An instance id was created again while still live.
	DuplicateInstance(Value),
	/// An instance that doesn't exist was removed.
	UnknownInstance(Value),
	/// A fact that requires an existing instance referenced one that doesn't exist.
	MissingInstance { instance: Value, during: &'static str },
	Reparent { instance: Value, parent: Value, missing: MissingSide },
	/// A second value was added for a style property before the first was removed.
	StyleOverwrite { style: Value, property: Value },
	UnknownStyle(Value),
	ListenerNeverAdded { instance: Value, listener: Value },
	DuplicatePath(Value),
	UnknownPath(Value),
	DuplicateOperation(Value),
	UnknownOperation(Value),
	UnknownOperationKind { operation: Value, kind: Value },
	OperationArgumentOverwrite { operation: Value, field: Value },
	/// More references to one style than can be counted.
	CountSaturated,
	/// A tuple had fewer fields than its relation requires.
	MalformedTuple { relation: &'static str, arity: usize, expected: usize },
	Host(HostError),
}

impl ProtocolError {
	/// Stable name reported upstream in error notices.
	#[must_use]
	pub fn name(&self) -> &'static str {
		match self {
			Self::DuplicateInstance(_) => "DuplicateInstance",
			Self::UnknownInstance(_) => "UnknownInstance",
			Self::MissingInstance { .. } => "MissingInstance",
			Self::Reparent { .. } => "ReparentError",
			Self::StyleOverwrite { .. } => "OverwriteError",
			Self::UnknownStyle(_) => "UnknownStyle",
			Self::ListenerNeverAdded { .. } => "ListenerNeverAdded",
			Self::DuplicatePath(_) => "DuplicatePath",
			Self::UnknownPath(_) => "UnknownPath",
			Self::DuplicateOperation(_) => "DuplicateOperation",
			Self::UnknownOperation(_) => "UnknownOperation",
			Self::UnknownOperationKind { .. } => "UnknownOperationKind",
			Self::OperationArgumentOverwrite { .. } => "OverwriteError",
			Self::CountSaturated => "CountSaturated",
			Self::MalformedTuple { .. } => "MalformedTuple",
			Self::Host(_) => "HostError",
		}
	}
}

impl Display for ProtocolError {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Self::DuplicateInstance(id) => write!(f, "Recreating existing instance '{}'", id),
			Self::UnknownInstance(id) => write!(f, "Unable to clear nonexistent instance '{}'", id),
			Self::MissingInstance { instance, during } => write!(f, "Unable to {} on nonexistent instance '{}'", during, instance),
			Self::Reparent { instance, parent, missing } => {
				let what = match missing {
					MissingSide::Instance => "could not find instance",
					MissingSide::Parent => "could not find parent",
					MissingSide::Both => "could not find either instance or parent",
				};
				write!(f, "Unable to reparent instance '{}' to '{}', {}.", instance, parent, what)
			}
			Self::StyleOverwrite { style, property } => {
				write!(f, "Cannot store multiple values per style '{}' property '{}'", style, property)
			}
			Self::UnknownStyle(id) => write!(f, "Cannot remove property of nonexistent style '{}'", id),
			Self::ListenerNeverAdded { instance, listener } => {
				write!(f, "Cannot remove never-added listener '{}' on instance '{}'", listener, instance)
			}
			Self::DuplicatePath(id) => write!(f, "Recreating path instance '{}'", id),
			Self::UnknownPath(id) => write!(f, "Missing path instance '{}'", id),
			Self::DuplicateOperation(id) => write!(f, "Recreating operation instance '{}'", id),
			Self::UnknownOperation(id) => write!(f, "Missing operation instance '{}'", id),
			Self::UnknownOperationKind { operation, kind } => write!(f, "Invalid operation type '{}' for operation '{}'", kind, operation),
			Self::OperationArgumentOverwrite { operation, field } => {
				write!(f, "Attempting to overwrite existing argument '{}' of operation '{}'", field, operation)
			}
			Self::CountSaturated => f.write_str("Reference count saturated"),
			Self::MalformedTuple { relation, arity, expected } => {
				write!(f, "Tuple of relation '{}' has {} field(s) but at least {} are required", relation, arity, expected)
			}
			Self::Host(error) => write!(f, "Host failure: {}", error),
		}
	}
}

impl std::error::Error for ProtocolError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Host(error) => Some(error),
			_ => None,
		}
	}
}

impl From<HostError> for ProtocolError {
	fn from(error: HostError) -> Self {
		Self::Host(error)
	}
}

impl From<CountSaturatedError> for ProtocolError {
	fn from(_: CountSaturatedError) -> Self {
		Self::CountSaturated
	}
}
