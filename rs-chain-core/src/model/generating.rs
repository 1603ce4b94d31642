use std::collections::HashMap;
use std::io::Read;

use rand::Rng;

use super::prefixes::PrefixDictionary;
use super::table::SamplingRow;
use super::words::WordDictionary;
use super::{ModelStats, PrefixId, Vocabulary};
use crate::codec;
use crate::error::{ModelError, Result};

/// Generation state: the id of the current prefix.
///
/// A cursor only moves forward. Once its prefix has no successors the
/// text is over; start again with a new cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
	prefix: PrefixId,
}

impl Cursor {
	pub fn prefix(&self) -> PrefixId {
		self.prefix
	}
}

/// Immutable model loaded from the binary model format.
///
/// Every table row is a cumulative distribution, so one draw costs a
/// binary search. The model is never mutated after `load`: any number
/// of threads may generate from a shared reference.
#[derive(Debug)]
pub struct GeneratingModel {
	pub(crate) vocab: Vocabulary,
	pub(crate) table: HashMap<PrefixId, SamplingRow>,
}

impl GeneratingModel {
	/// Reads a model written by `TrainingModel::save`.
	///
	/// The prefix length comes from the stream header.
	///
	/// # Errors
	/// - `CorruptFormat` if the header checksum or any stored offset is invalid
	/// - `Io` if the reader fails or ends early
	pub fn load<R: Read>(reader: R) -> Result<Self> {
		codec::load(reader)
	}

	pub fn pref_size(&self) -> usize {
		self.vocab.pref_size()
	}

	pub fn words(&self) -> &WordDictionary {
		&self.vocab.words
	}

	pub fn prefixes(&self) -> &PrefixDictionary {
		&self.vocab.prefixes
	}

	pub fn row(&self, prefix: PrefixId) -> Option<&SamplingRow> {
		self.table.get(&prefix)
	}

	pub fn rows(&self) -> impl Iterator<Item = (PrefixId, &SamplingRow)> {
		self.table.iter().map(|(prefix, row)| (*prefix, row))
	}

	/// Starts a cursor at the prefix made of the seed tokens.
	///
	/// An empty seed means the start of a text. The seed is fitted to
	/// `pref_size` tokens the same way training fits it. Returns `None`
	/// if a seed token or the seed prefix is unknown.
	pub fn cursor<S: AsRef<str>>(&self, seed: &[S]) -> Option<Cursor> {
		self.vocab.find_prefix(seed).map(|prefix| Cursor { prefix })
	}

	/// Draws the next word after the cursor's prefix and advances it.
	///
	/// Returns `Ok(None)` when the prefix has no table row: there is no
	/// data for this context and the text ends.
	///
	/// # Errors
	/// Returns `MalformedTable` if the row is empty, the drawn key has no
	/// successor, or the successor's word is outside the word buffer or
	/// not valid UTF-8.
	pub fn generate<R: Rng + ?Sized>(&self, cursor: &mut Cursor, rng: &mut R) -> Result<Option<&str>> {
		let Some(row) = self.table.get(&cursor.prefix) else {
			return Ok(None);
		};
		let total = row
			.total()
			.ok_or_else(|| ModelError::malformed(format!("empty row for prefix {}", cursor.prefix.0)))?;

		let key = rng.random_range(1..=total);
		let bound = row
			.find(key)
			.ok_or_else(|| ModelError::malformed(format!("no successor for key {key}")))?;
		let bytes = self
			.vocab
			.words
			.bytes(bound.word)
			.ok_or_else(|| ModelError::malformed(format!("word offset {} out of range", bound.word.0)))?;
		let word = std::str::from_utf8(bytes)
			.map_err(|_| ModelError::malformed(format!("word at offset {} is not UTF-8", bound.word.0)))?;

		cursor.prefix = bound.next;
		Ok(Some(word))
	}

	/// Returns an iterator of generated words starting from `seed`.
	///
	/// The iterator ends when the context has no data, right away if the
	/// seed is unknown, and after yielding the first error.
	pub fn generator<S: AsRef<str>, R: Rng>(&self, seed: &[S], rng: R) -> Generator<'_, R> {
		Generator { model: self, cursor: self.cursor(seed), rng }
	}

	/// Successors of a prefix with their cumulative bounds.
	///
	/// Returns `None` if the prefix is unknown or has no row.
	pub fn distribution<S: AsRef<str>>(&self, prefix: &[S]) -> Option<Vec<(&str, usize)>> {
		let row = self.row(self.vocab.find_prefix(prefix)?)?;
		row.iter()
			.map(|bound| Some((self.vocab.words.word(bound.word)?, bound.upper)))
			.collect()
	}

	pub fn stats(&self) -> ModelStats {
		self.vocab.stats(self.table.len())
	}
}

/// Lazily generated text.
///
/// Owns its random generator, so a seeded generator gives the same text
/// for the same model every time.
#[derive(Debug)]
pub struct Generator<'m, R> {
	model: &'m GeneratingModel,
	cursor: Option<Cursor>,
	rng: R,
}

impl<'m, R: Rng> Iterator for Generator<'m, R> {
	type Item = Result<&'m str>;

	fn next(&mut self) -> Option<Self::Item> {
		let model = self.model;
		let cursor = self.cursor.as_mut()?;
		match model.generate(cursor, &mut self.rng) {
			Ok(Some(word)) => Some(Ok(word)),
			Ok(None) => {
				self.cursor = None;
				None
			}
			Err(e) => {
				self.cursor = None;
				Some(Err(e))
			}
		}
	}
}
