//! Primitive fact values and tuples.

use core::{
	fmt::{self, Display, Formatter},
	hash::{Hash, Hasher},
};
use serde::{Deserialize, Serialize};

/// One slot of a fact tuple.
///
/// On the wire, this is either a JSON string or a JSON number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
	Number(f64),
	Text(String),
}

/// An ordered row of [`Value`]s. The first slot is the identifier of the fact.
pub type Tuple = Vec<Value>;

/// An entity-attribute-value triple, the shape of every fact sent upstream.
pub type Eav = [Value; 3];

impl Value {
	#[must_use]
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Text(text) => Some(text),
			Self::Number(_) => None,
		}
	}

	#[must_use]
	pub fn as_number(&self) -> Option<f64> {
		match *self {
			Self::Number(number) => Some(number),
			Self::Text(_) => None,
		}
	}

	/// Reads `"true"` and `"false"` as booleans. Everything else isn't one.
	#[must_use]
	pub fn as_bool(&self) -> Option<bool> {
		match self.as_str() {
			Some("true") => Some(true),
			Some("false") => Some(false),
			_ => None,
		}
	}

	/// `-0.0` and `0.0` share one key, as do all NaNs.
	fn normalized_bits(number: f64) -> u64 {
		if number == 0.0 {
			0.0_f64.to_bits()
		} else if number.is_nan() {
			f64::NAN.to_bits()
		} else {
			number.to_bits()
		}
	}
}

/// Numbers are only equal to numbers and texts only to texts, so `1` and `"1"` are distinct ids.
impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Number(a), Self::Number(b)) => Self::normalized_bits(*a) == Self::normalized_bits(*b),
			(Self::Text(a), Self::Text(b)) => a == b,
			_ => false,
		}
	}
}
impl Eq for Value {}

impl Hash for Value {
	fn hash<H: Hasher>(&self, state: &mut H) {
		match self {
			Self::Number(number) => {
				0_u8.hash(state);
				Self::normalized_bits(*number).hash(state);
			}
			Self::Text(text) => {
				1_u8.hash(state);
				text.hash(state);
			}
		}
	}
}

impl Display for Value {
	/// Formats like the upstream engine does: integral numbers without a fractional part.
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Self::Text(text) => f.write_str(text),
			#[allow(clippy::cast_possible_truncation)]
			Self::Number(number) if number.fract() == 0.0 && number.abs() < 1e15 => write!(f, "{}", *number as i64),
			Self::Number(number) => write!(f, "{}", number),
		}
	}
}

impl From<&str> for Value {
	fn from(text: &str) -> Self {
		Self::Text(text.to_owned())
	}
}

impl From<String> for Value {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

impl From<f64> for Value {
	fn from(number: f64) -> Self {
		Self::Number(number)
	}
}

impl From<i32> for Value {
	fn from(number: i32) -> Self {
		Self::Number(number.into())
	}
}

impl From<u32> for Value {
	fn from(number: u32) -> Self {
		Self::Number(number.into())
	}
}

impl From<bool> for Value {
	fn from(flag: bool) -> Self {
		Self::Text(if flag { "true" } else { "false" }.to_owned())
	}
}

/// Builds a [`Tuple`] from heterogeneous literals.
///
/// ```
/// use fact_dom::{tuple, Value};
///
/// let t = tuple!["html/export instances", "i1", "e1", "div"];
/// assert_eq!(t[3], Value::from("div"));
/// ```
#[macro_export]
macro_rules! tuple {
	($($value:expr),* $(,)?) => {
		::std::vec![$($crate::Value::from($value)),*]
	};
}
