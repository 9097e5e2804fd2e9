//! Batches of facts as they cross the transport boundary, in both directions.

use crate::{
	error::ProtocolError,
	value::{Eav, Tuple, Value},
};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// One batch of added and removed tuples.
///
/// Inbound diffs carry the relation name in the first slot of each tuple.
/// Order within `adds` and within `removes` carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diff {
	#[serde(default)]
	pub adds: Vec<Tuple>,
	#[serde(default)]
	pub removes: Vec<Tuple>,
}

/// The part of a [`Diff`] addressed to one relation, with the relation name stripped.
#[derive(Debug, Default)]
pub struct RelationDiff<'a> {
	pub adds: Vec<&'a [Value]>,
	pub removes: Vec<&'a [Value]>,
}

impl Diff {
	/// Splits the batch by relation name. Tuples without a textual relation name are dropped with a warning.
	#[must_use]
	pub fn by_relation(&self) -> HashMap<&str, RelationDiff<'_>> {
		let mut relations: HashMap<&str, RelationDiff<'_>> = HashMap::new();
		for (tuples, is_add) in [(&self.removes, false), (&self.adds, true)] {
			for tuple in tuples {
				match tuple.split_first() {
					Some((Value::Text(relation), rest)) => {
						let entry = relations.entry(relation.as_str()).or_default();
						if is_add {
							entry.adds.push(rest)
						} else {
							entry.removes.push(rest)
						}
					}
					_ => tracing::warn!("Dropping tuple without relation name ({} field(s)).", tuple.len()),
				}
			}
		}
		relations
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.adds.is_empty() && self.removes.is_empty()
	}
}

/// Returns the field at `index`, or [`ProtocolError::MalformedTuple`] naming the relation.
pub(crate) fn field<'a>(tuple: &'a [Value], index: usize, relation: &'static str) -> Result<&'a Value, ProtocolError> {
	tuple.get(index).ok_or(ProtocolError::MalformedTuple {
		relation,
		arity: tuple.len(),
		expected: index + 1,
	})
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
	Error,
}

/// Structured report of a failed batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
	#[serde(rename = "type")]
	pub kind: NoticeKind,
	pub name: String,
	pub message: String,
}

impl From<&ProtocolError> for Notice {
	fn from(error: &ProtocolError) -> Self {
		Self {
			kind: NoticeKind::Error,
			name: error.name().to_owned(),
			message: error.to_string(),
		}
	}
}

/// Messages for the transport collaborator. Delivery is fire-and-forget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outbound {
	/// New facts, always additions.
	Transaction(Vec<Eav>),
	Notice(Notice),
}

impl Outbound {
	/// The EAVs of a transaction, if this is one.
	#[must_use]
	pub fn eavs(&self) -> Option<&[Eav]> {
		match self {
			Self::Transaction(eavs) => Some(eavs),
			Self::Notice(_) => None,
		}
	}
}
