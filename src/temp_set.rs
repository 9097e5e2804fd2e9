use core::hash::Hash;
use hashbrown::{hash_set::Drain, HashSet};

/// A reusable set that keeps its allocation between batches.
pub struct TempSet<T>(HashSet<T>);
impl<T: Eq + Hash> TempSet<T> {
	pub fn new() -> Self {
		Self(HashSet::new())
	}

	/// Borrows the set for scratch use.
	///
	/// It is cleared before each borrow, so nothing left over from an aborted use can leak into the next one.
	pub fn temp(&mut self) -> &mut HashSet<T> {
		self.0.clear();
		&mut self.0
	}

	/// Accumulates `value` until the next [`TempSet::drain`]. Returns whether it was new.
	pub fn insert(&mut self, value: T) -> bool {
		self.0.insert(value)
	}

	pub fn contains(&self, value: &T) -> bool {
		self.0.contains(value)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn drain(&mut self) -> Drain<'_, T> {
		self.0.drain()
	}

	/// Retrieves the set's capacity without clearing it first.
	pub fn capacity(&self) -> usize {
		self.0.capacity()
	}
}

impl<T: Eq + Hash> Default for TempSet<T> {
	fn default() -> Self {
		Self::new()
	}
}
