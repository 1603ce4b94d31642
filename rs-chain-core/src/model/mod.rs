//! Model store of the word-level Markov chain.
//!
//! The store is made of:
//! - A word dictionary (`WordDictionary`) interning tokens
//! - A prefix dictionary (`PrefixDictionary`) interning fixed-length
//!   sequences of word ids
//! - A frequency table, in training shape (`TrainingRow`) or in
//!   sampling shape (`SamplingRow`)
//!
//! Two models wrap those parts: `TrainingModel` grows them and saves,
//! `GeneratingModel` is loaded once and then only read.

use serde::Serialize;

use prefixes::PrefixDictionary;
use words::WordDictionary;

/// Transparent offset index shared by both dictionaries.
///
/// Not exposed
pub(crate) mod index;

/// Interned tokens in a NUL-separated byte buffer.
pub mod words;

/// Interned fixed-length word id sequences with suffix sharing.
pub mod prefixes;

/// Frequency table rows in training and sampling shape.
pub mod table;

/// Mutable model and its training windows.
pub mod training;

/// Immutable loaded model and weighted generation.
pub mod generating;

/// Identifier of an interned word.
///
/// Equal ids mean byte-equal tokens. An id stays valid for the whole
/// life of the model that produced it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WordId(pub(crate) usize);

impl WordId {
	/// Byte offset of the word in the word buffer.
	pub fn offset(self) -> usize {
		self.0
	}
}

/// Identifier of an interned prefix (sequence of `pref_size` word ids).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrefixId(pub(crate) usize);

impl PrefixId {
	/// Element offset of the sequence in the prefix buffer.
	pub fn offset(self) -> usize {
		self.0
	}
}

/// Sizes describing a model, as stored in the binary header.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelStats {
	/// Number of words in every prefix.
	pub pref_size: usize,
	/// Length of the word buffer in bytes.
	pub word_bytes: usize,
	/// Number of distinct words.
	pub words: usize,
	/// Length of the prefix buffer in elements.
	pub prefix_len: usize,
	/// Number of distinct prefixes.
	pub prefixes: usize,
	/// Number of prefixes with a frequency table row.
	pub rows: usize,
}

/// Dictionaries common to both model shapes.
#[derive(Debug)]
pub(crate) struct Vocabulary {
	pub(crate) words: WordDictionary,
	pub(crate) prefixes: PrefixDictionary,
}

impl Vocabulary {
	pub(crate) fn new(pref_size: usize) -> Self {
		Self { words: WordDictionary::new(), prefixes: PrefixDictionary::new(pref_size) }
	}

	pub(crate) fn pref_size(&self) -> usize {
		self.prefixes.pref_size()
	}

	/// Resolves seed tokens to an existing prefix, without interning.
	///
	/// Returns `None` if a token or the resulting sequence is unknown.
	pub(crate) fn find_prefix<S: AsRef<str>>(&self, seed: &[S]) -> Option<PrefixId> {
		// No stored sequence can be longer than the prefix buffer.
		if self.pref_size() > self.prefixes.buffer_len() {
			return None;
		}
		let sequence = fit_seed(seed, self.pref_size())
			.into_iter()
			.map(|token| self.words.lookup(token))
			.collect::<Option<Vec<_>>>()?;
		self.prefixes.lookup(&sequence)
	}

	pub(crate) fn stats(&self, rows: usize) -> ModelStats {
		ModelStats {
			pref_size: self.pref_size(),
			word_bytes: self.words.byte_len(),
			words: self.words.len(),
			prefix_len: self.prefixes.buffer_len(),
			prefixes: self.prefixes.len(),
			rows,
		}
	}
}

/// Fits seed tokens to exactly `pref_size` tokens.
///
/// An empty seed becomes `pref_size` empty tokens (start of text).
/// A longer seed keeps its trailing tokens, a shorter one is padded
/// on the left with empty tokens.
pub(crate) fn fit_seed<S: AsRef<str>>(seed: &[S], pref_size: usize) -> Vec<&str> {
	let tail = &seed[seed.len().saturating_sub(pref_size)..];
	let mut fitted = vec![""; pref_size - tail.len()];
	fitted.extend(tail.iter().map(AsRef::as_ref));
	fitted
}
