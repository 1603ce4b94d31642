use std::hash::{BuildHasher, Hash, RandomState};

use hashbrown::HashTable;

/// Set of buffer offsets identified by the value they point to.
///
/// The index never stores keys. Every operation takes a `resolve`
/// function turning an offset into its comparable form (a token's
/// bytes, a prefix's word ids), so a raw candidate and a stored offset
/// are hashed and compared the same way.
///
/// # Invariants
/// - No two stored offsets resolve to equal values
/// - `resolve` must be the same function for the whole life of the index
#[derive(Debug, Default)]
pub(crate) struct OffsetIndex {
	table: HashTable<usize>,
	state: RandomState,
}

impl OffsetIndex {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn len(&self) -> usize {
		self.table.len()
	}

	/// Returns the offset whose resolved value equals `key`.
	pub(crate) fn find<'a, K, F>(&self, key: &K, resolve: F) -> Option<usize>
	where
		K: Hash + Eq + ?Sized + 'a,
		F: Fn(usize) -> &'a K,
	{
		let hash = self.state.hash_one(key);
		self.table.find(hash, |&offset| resolve(offset) == key).copied()
	}

	/// Stores an offset the caller knows is not indexed yet.
	pub(crate) fn insert_new<'a, K, F>(&mut self, offset: usize, resolve: F)
	where
		K: Hash + ?Sized + 'a,
		F: Fn(usize) -> &'a K,
	{
		let state = &self.state;
		let hash = state.hash_one(resolve(offset));
		self.table.insert_unique(hash, offset, |&stored| state.hash_one(resolve(stored)));
	}

	/// Stores an offset unless an equal value is already indexed.
	///
	/// Returns `false` if the value was already present.
	pub(crate) fn insert<'a, K, F>(&mut self, offset: usize, resolve: F) -> bool
	where
		K: Hash + Eq + ?Sized + 'a,
		F: Fn(usize) -> &'a K,
	{
		if self.find(resolve(offset), &resolve).is_some() {
			return false;
		}
		self.insert_new(offset, resolve);
		true
	}

	/// Returns all offsets in ascending order of their resolved values.
	pub(crate) fn sorted<'a, K, F>(&self, resolve: F) -> Vec<usize>
	where
		K: Ord + ?Sized + 'a,
		F: Fn(usize) -> &'a K,
	{
		let mut offsets: Vec<usize> = self.table.iter().copied().collect();
		offsets.sort_unstable_by(|&l, &r| resolve(l).cmp(resolve(r)));
		offsets
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn slot(data: &[&'static str], offset: usize) -> &'static str {
		data[offset]
	}

	#[test]
	fn raw_and_stored_lookups_agree() {
		let data = ["pear", "apple", "fig"];
		let mut index = OffsetIndex::new();
		for offset in 0..data.len() {
			assert!(index.insert(offset, |o| slot(&data, o)));
		}

		assert_eq!(index.len(), 3);
		assert_eq!(index.find("fig", |o| slot(&data, o)), Some(2));
		assert_eq!(index.find("kiwi", |o| slot(&data, o)), None);
	}

	#[test]
	fn duplicate_values_are_rejected() {
		let data = ["fig", "fig"];
		let mut index = OffsetIndex::new();
		assert!(index.insert(0, |o| slot(&data, o)));
		assert!(!index.insert(1, |o| slot(&data, o)));
		assert_eq!(index.len(), 1);
	}

	#[test]
	fn sorted_follows_resolved_order() {
		let data = ["pear", "apple", "fig"];
		let mut index = OffsetIndex::new();
		for offset in 0..data.len() {
			index.insert_new(offset, |o| slot(&data, o));
		}
		assert_eq!(index.sorted(|o| slot(&data, o)), vec![1, 2, 0]);
	}
}
