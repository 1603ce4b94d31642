use std::collections::{HashMap, VecDeque};
use std::io::Write;

use super::prefixes::PrefixDictionary;
use super::table::TrainingRow;
use super::words::WordDictionary;
use super::{fit_seed, ModelStats, PrefixId, Vocabulary, WordId};
use crate::codec;
use crate::error::Result;

/// Sliding state of one training session.
///
/// A window holds the last `pref_size` word ids seen in its token
/// stream and the id of that prefix. Windows share nothing with each
/// other: several of them can train the same model, as long as calls
/// into the model are made one at a time.
///
/// # Invariants
/// - `words.len() == pref_size`
/// - `prefix` is the id of `words` in the model that created the window
#[derive(Clone, Debug)]
pub struct Window {
	words: VecDeque<WordId>,
	prefix: PrefixId,
}

impl Window {
	/// Id of the current prefix.
	pub fn prefix(&self) -> PrefixId {
		self.prefix
	}

	/// Word ids of the current prefix, oldest first.
	pub fn words(&self) -> impl Iterator<Item = WordId> + '_ {
		self.words.iter().copied()
	}
}

/// Mutable model built from token streams.
///
/// # Responsibilities
/// - Intern words and prefixes as tokens arrive
/// - Count, for each prefix, which words follow it
/// - Save itself in the binary model format
///
/// Nothing is ever removed: dictionaries and table only grow.
#[derive(Debug)]
pub struct TrainingModel {
	pub(crate) vocab: Vocabulary,
	/// Successor counts, keyed by the prefix they follow.
	pub(crate) table: HashMap<PrefixId, TrainingRow>,
}

impl TrainingModel {
	/// Creates an empty model whose prefixes hold `pref_size` words.
	pub fn new(pref_size: usize) -> Self {
		Self { vocab: Vocabulary::new(pref_size), table: HashMap::new() }
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

	/// Opens a window seeded with the given tokens.
	///
	/// The seed is fitted to `pref_size` tokens: missing leading tokens
	/// are empty, extra leading tokens are dropped. Seed tokens and
	/// their prefix are interned.
	pub fn window<S: AsRef<str>>(&mut self, seed: &[S]) -> Window {
		let words: Vec<WordId> = fit_seed(seed, self.pref_size())
			.into_iter()
			.map(|token| self.vocab.words.intern(token))
			.collect();
		let prefix = self.vocab.prefixes.intern(&words);
		Window { words: words.into(), prefix }
	}

	/// Opens a window at the start of a text (`pref_size` empty tokens).
	pub fn start(&mut self) -> Window {
		self.window::<&str>(&[])
	}

	/// Feeds one token through `window`.
	///
	/// The token becomes the newest word of the window, the shifted
	/// window is interned as the new prefix, and the table row of the
	/// previous prefix counts one more occurrence of the token.
	pub fn train(&mut self, window: &mut Window, token: &str) {
		let word = self.vocab.words.intern(token);
		let previous = window.prefix;
		if window.words.pop_front().is_some() {
			window.words.push_back(word);
		}
		window.prefix = self.vocab.prefixes.intern(window.words.make_contiguous());
		self.table.entry(previous).or_default().record(word, window.prefix);
	}

	/// Returns a handle training this model through a fresh start window.
	pub fn trainer(&mut self) -> Trainer<'_> {
		let window = self.start();
		Trainer { model: self, window }
	}

	/// Row of the frequency table for a prefix id.
	pub fn row(&self, prefix: PrefixId) -> Option<&TrainingRow> {
		self.table.get(&prefix)
	}

	/// All table rows, in no particular order.
	pub fn rows(&self) -> impl Iterator<Item = (PrefixId, &TrainingRow)> {
		self.table.iter().map(|(prefix, row)| (*prefix, row))
	}

	/// Words seen after a prefix, with their counts, in ascending word
	/// id order.
	///
	/// The prefix tokens are fitted like a seed. Returns `None` if the
	/// prefix is unknown or has no row.
	pub fn successors<S: AsRef<str>>(&self, prefix: &[S]) -> Option<Vec<(&str, usize)>> {
		let row = self.row(self.vocab.find_prefix(prefix)?)?;
		row.iter()
			.map(|(word, tally)| Some((self.vocab.words.word(word)?, tally.count)))
			.collect()
	}

	pub fn stats(&self) -> ModelStats {
		self.vocab.stats(self.table.len())
	}

	/// Writes the whole model in the binary model format.
	///
	/// # Errors
	/// Returns `Io` if the writer fails.
	pub fn save<W: Write>(&self, writer: W) -> Result<()> {
		codec::save(self, writer)
	}
}

/// A training model paired with one window.
///
/// Convenient when a single token stream trains the model.
#[derive(Debug)]
pub struct Trainer<'m> {
	model: &'m mut TrainingModel,
	window: Window,
}

impl Trainer<'_> {
	/// Feeds one token.
	pub fn feed(&mut self, token: &str) {
		self.model.train(&mut self.window, token);
	}

	pub fn window(&self) -> &Window {
		&self.window
	}
}
