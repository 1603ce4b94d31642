use super::index::OffsetIndex;
use super::{PrefixId, WordId};
use crate::error::{ModelError, Result};

/// Dictionary interning sequences of exactly `pref_size` word ids.
///
/// Sequences are concatenated in one buffer and a prefix id is the
/// offset of the sequence's first element. Stored sequences may
/// overlap: when a new sequence starts with the last `pref_size - 1`
/// elements of the buffer, only its final element is appended.
/// Sliding a window over a token stream hits this case on almost
/// every step.
///
/// # Invariants
/// - `pref_size` never changes
/// - The buffer is append-only; ids are never reused or invalidated
/// - Each distinct sequence is indexed once, whichever path stored it
#[derive(Debug)]
pub struct PrefixDictionary {
	pref_size: usize,
	/// Concatenated, possibly overlapping sequences.
	data: Vec<WordId>,
	/// Offsets of the sequences in `data`, looked up by sequence.
	index: OffsetIndex,
}

fn resolve(data: &[WordId], pref_size: usize, offset: usize) -> &[WordId] {
	&data[offset..offset + pref_size]
}

impl PrefixDictionary {
	/// Creates an empty dictionary for sequences of `pref_size` words.
	pub fn new(pref_size: usize) -> Self {
		Self { pref_size, data: Vec::new(), index: OffsetIndex::new() }
	}

	/// Number of word ids in every prefix.
	pub fn pref_size(&self) -> usize {
		self.pref_size
	}

	/// Returns the id of `sequence`, storing it first if it is new.
	///
	/// # Panics
	/// Panics if `sequence.len() != pref_size`.
	pub fn intern(&mut self, sequence: &[WordId]) -> PrefixId {
		assert_eq!(sequence.len(), self.pref_size, "prefix length mismatch");
		let size = self.pref_size;
		if let Some(offset) = self.index.find(sequence, |o| resolve(&self.data, size, o)) {
			return PrefixId(offset);
		}

		let offset = match sequence.split_last() {
			Some((last, head)) if self.data.ends_with(head) => {
				self.data.push(*last);
				self.data.len() - size
			}
			_ => {
				let offset = self.data.len();
				self.data.extend_from_slice(sequence);
				offset
			}
		};
		let data = &self.data;
		self.index.insert_new(offset, |o| resolve(data, size, o));
		PrefixId(offset)
	}

	/// Returns the id of `sequence`, or `None` if it was never interned.
	pub fn lookup(&self, sequence: &[WordId]) -> Option<PrefixId> {
		if sequence.len() != self.pref_size {
			return None;
		}
		self.index.find(sequence, |o| resolve(&self.data, self.pref_size, o)).map(PrefixId)
	}

	/// Returns the word ids of a prefix id, `None` if out of range.
	pub fn sequence(&self, id: PrefixId) -> Option<&[WordId]> {
		self.data.get(id.0..id.0.checked_add(self.pref_size)?)
	}

	/// Number of distinct prefixes.
	pub fn len(&self) -> usize {
		self.index.len()
	}

	pub fn is_empty(&self) -> bool {
		self.index.len() == 0
	}

	/// Length of the prefix buffer in elements.
	pub fn buffer_len(&self) -> usize {
		self.data.len()
	}

	pub(crate) fn buffer(&self) -> &[WordId] {
		&self.data
	}

	/// Prefix offsets in ascending lexicographic order of their sequences.
	pub(crate) fn sorted_offsets(&self) -> Vec<usize> {
		self.index.sorted(|o| resolve(&self.data, self.pref_size, o))
	}

	/// Starts a dictionary from a loaded buffer, with an empty index.
	pub(crate) fn from_buffer(pref_size: usize, data: Vec<WordId>) -> Self {
		Self { pref_size, data, index: OffsetIndex::new() }
	}

	/// Indexes a loaded prefix offset.
	///
	/// # Errors
	/// Returns `CorruptFormat` if the sequence at `offset` runs past the
	/// buffer or is already indexed.
	pub(crate) fn restore(&mut self, offset: usize) -> Result<()> {
		let size = self.pref_size;
		if offset.checked_add(size).is_none_or(|end| end > self.data.len()) {
			return Err(ModelError::corrupt(format!(
				"prefix offset {offset} outside buffer of {} elements",
				self.data.len()
			)));
		}
		let data = &self.data;
		if !self.index.insert(offset, |o| resolve(data, size, o)) {
			return Err(ModelError::corrupt(format!("duplicate prefix at offset {offset}")));
		}
		Ok(())
	}
}
