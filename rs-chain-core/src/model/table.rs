use std::collections::BTreeMap;

use super::{PrefixId, WordId};
use crate::error::{ModelError, Result};

/// What training knows about one successor of a prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tally {
	/// Number of times the word followed the prefix (always >= 1).
	pub count: usize,
	/// Prefix ending with the word.
	pub next: PrefixId,
}

/// Training shape of a frequency table row.
///
/// Successors are keyed by word id, so iteration is in ascending word id
/// order. `save` writes them in that order and `load` relies on it.
#[derive(Clone, Debug, Default)]
pub struct TrainingRow {
	successors: BTreeMap<WordId, Tally>,
}

impl TrainingRow {
	/// Records one more occurrence of `word` after this row's prefix.
	///
	/// The successor prefix is overwritten on every call; for a given
	/// (prefix, word) pair it is always the same value.
	pub fn record(&mut self, word: WordId, next: PrefixId) {
		let tally = self.successors.entry(word).or_insert(Tally { count: 0, next });
		tally.count += 1;
		tally.next = next;
	}

	pub fn get(&self, word: WordId) -> Option<&Tally> {
		self.successors.get(&word)
	}

	/// Successors in ascending word id order.
	pub fn iter(&self) -> impl Iterator<Item = (WordId, Tally)> + '_ {
		self.successors.iter().map(|(word, tally)| (*word, *tally))
	}

	pub fn len(&self) -> usize {
		self.successors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.successors.is_empty()
	}
}

/// One successor of a sampling row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bound {
	/// Running sum of the counts of this successor and those before it.
	pub upper: usize,
	pub word: WordId,
	pub next: PrefixId,
}

/// Sampling shape of a frequency table row: a cumulative distribution.
///
/// Drawing `r` uniformly in `1..=total()` and taking the first bound
/// with `upper >= r` selects each word with probability proportional
/// to its count.
///
/// # Invariants
/// - `upper` values are strictly increasing
#[derive(Clone, Debug, Default)]
pub struct SamplingRow {
	bounds: Vec<Bound>,
}

impl SamplingRow {
	/// Builds the cumulative distribution from absolute counts.
	///
	/// This is the only conversion from counts to bounds. Entries must
	/// come in strictly ascending word id order and every count must be
	/// at least 1; these are preconditions of the binary format, which
	/// `save` always meets.
	///
	/// # Errors
	/// Returns `CorruptFormat` if a precondition does not hold or the
	/// running sum overflows.
	pub fn from_counts<I>(successors: I) -> Result<Self>
	where
		I: IntoIterator<Item = (WordId, usize, PrefixId)>,
	{
		let mut bounds: Vec<Bound> = Vec::new();
		let mut sum: usize = 0;
		for (word, count, next) in successors {
			if count == 0 {
				return Err(ModelError::corrupt(format!("zero count for word {}", word.0)));
			}
			if bounds.last().is_some_and(|last| last.word >= word) {
				return Err(ModelError::corrupt(format!("successor {} out of order", word.0)));
			}
			sum = sum.checked_add(count).ok_or_else(|| ModelError::corrupt("successor counts overflow"))?;
			bounds.push(Bound { upper: sum, word, next });
		}
		Ok(Self { bounds })
	}

	/// Sum of all counts (the largest bound), `None` for an empty row.
	pub fn total(&self) -> Option<usize> {
		self.bounds.last().map(|bound| bound.upper)
	}

	/// First successor whose bound is `>= r`.
	pub fn find(&self, r: usize) -> Option<&Bound> {
		let position = self.bounds.partition_point(|bound| bound.upper < r);
		self.bounds.get(position)
	}

	pub fn iter(&self) -> impl Iterator<Item = &Bound> {
		self.bounds.iter()
	}

	pub fn len(&self) -> usize {
		self.bounds.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bounds.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn record_counts_and_keeps_successor() {
		let mut row = TrainingRow::default();
		row.record(WordId(4), PrefixId(1));
		row.record(WordId(0), PrefixId(2));
		row.record(WordId(4), PrefixId(1));

		assert_eq!(row.get(WordId(4)), Some(&Tally { count: 2, next: PrefixId(1) }));
		let words: Vec<_> = row.iter().map(|(word, _)| word).collect();
		assert_eq!(words, vec![WordId(0), WordId(4)]);
	}

	#[test]
	fn counts_become_cumulative_bounds() {
		let row = SamplingRow::from_counts([
			(WordId(0), 1, PrefixId(0)),
			(WordId(2), 3, PrefixId(1)),
			(WordId(7), 2, PrefixId(2)),
		])
		.unwrap();

		let uppers: Vec<_> = row.iter().map(|bound| bound.upper).collect();
		assert_eq!(uppers, vec![1, 4, 6]);
		assert_eq!(row.total(), Some(6));
		assert_eq!(row.find(1).map(|b| b.word), Some(WordId(0)));
		assert_eq!(row.find(2).map(|b| b.word), Some(WordId(2)));
		assert_eq!(row.find(4).map(|b| b.word), Some(WordId(2)));
		assert_eq!(row.find(5).map(|b| b.word), Some(WordId(7)));
		assert_eq!(row.find(7), None);
	}

	#[test]
	fn format_preconditions_are_checked() {
		let zero = SamplingRow::from_counts([(WordId(0), 0, PrefixId(0))]);
		assert!(matches!(zero, Err(ModelError::CorruptFormat(_))));

		let unordered = SamplingRow::from_counts([(WordId(3), 1, PrefixId(0)), (WordId(1), 1, PrefixId(0))]);
		assert!(matches!(unordered, Err(ModelError::CorruptFormat(_))));

		let repeated = SamplingRow::from_counts([(WordId(3), 1, PrefixId(0)), (WordId(3), 1, PrefixId(0))]);
		assert!(matches!(repeated, Err(ModelError::CorruptFormat(_))));

		let overflow = SamplingRow::from_counts([(WordId(0), usize::MAX, PrefixId(0)), (WordId(1), 1, PrefixId(0))]);
		assert!(matches!(overflow, Err(ModelError::CorruptFormat(_))));
	}

	#[test]
	fn empty_row_has_no_total() {
		let row = SamplingRow::from_counts(std::iter::empty()).unwrap();
		assert!(row.is_empty());
		assert_eq!(row.total(), None);
	}
}
