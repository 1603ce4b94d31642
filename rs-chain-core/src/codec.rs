//! Binary model format.
//!
//! All integers are 8-byte words in native byte order:
//!
//! ```text
//! [header][word buffer][word offsets][prefix buffer][prefix offsets][rows]
//! ```
//!
//! - header: prefix length, word buffer bytes, word count, prefix buffer
//!   elements, prefix count, row count, checksum
//! - word offsets: one per word, in ascending byte order of the words
//! - prefix offsets: one per prefix, in ascending order of the sequences
//! - rows: prefix id, successor count, then per successor in strictly
//!   ascending word id order: word id, occurrence count (>= 1), next
//!   prefix id
//!
//! The checksum is the XOR of the six size fields. It detects a damaged
//! header only: the payload is not covered.

use std::collections::HashMap;
use std::io::{BufReader, BufWriter, Read, Write};

use log::debug;

use crate::error::{ModelError, Result};
use crate::io::{read_bytes, read_word, write_word, write_words, WORD_SIZE};
use crate::model::generating::GeneratingModel;
use crate::model::prefixes::PrefixDictionary;
use crate::model::table::SamplingRow;
use crate::model::training::TrainingModel;
use crate::model::words::WordDictionary;
use crate::model::{ModelStats, PrefixId, Vocabulary, WordId};

/// Number of words in the header.
const HEADER_WORDS: usize = 7;

/// Length of the header in bytes.
pub const HEADER_LEN: usize = HEADER_WORDS * WORD_SIZE;

/// Fixed-size header at the start of a model stream.
#[derive(Debug, PartialEq, Eq)]
struct Header {
	stats: ModelStats,
	checksum: usize,
}

/// Hash of one size field.
fn hash_size(size: usize) -> usize {
	size
}

impl Header {
	fn new(stats: ModelStats) -> Self {
		let mut header = Self { stats, checksum: 0 };
		header.checksum = header.hash();
		header
	}

	fn sizes(&self) -> [usize; HEADER_WORDS - 1] {
		let s = &self.stats;
		[s.pref_size, s.word_bytes, s.words, s.prefix_len, s.prefixes, s.rows]
	}

	fn hash(&self) -> usize {
		self.sizes().into_iter().fold(0, |acc, size| acc ^ hash_size(size))
	}

	fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
		write_words(writer, self.sizes())?;
		write_word(writer, self.checksum)?;
		Ok(())
	}

	/// Reads a header and verifies its checksum.
	fn read<R: Read>(reader: &mut R) -> Result<Self> {
		let mut words = [0usize; HEADER_WORDS];
		for word in &mut words {
			*word = read_word(reader)?;
		}
		let [pref_size, word_bytes, words_len, prefix_len, prefixes, rows, checksum] = words;
		let header = Self {
			stats: ModelStats { pref_size, word_bytes, words: words_len, prefix_len, prefixes, rows },
			checksum,
		};
		if header.hash() != header.checksum {
			return Err(ModelError::corrupt("header checksum mismatch"));
		}
		Ok(header)
	}
}

/// Writes a training model in the binary model format.
///
/// Rows are written in ascending prefix id order, so saving the same
/// model twice gives the same bytes.
pub fn save<W: Write>(model: &TrainingModel, writer: W) -> Result<()> {
	let mut writer = BufWriter::new(writer);
	let words = &model.vocab.words;
	let prefixes = &model.vocab.prefixes;

	let header = Header::new(model.stats());
	header.write(&mut writer)?;

	writer.write_all(words.buffer())?;
	write_words(&mut writer, words.sorted_offsets())?;
	write_words(&mut writer, prefixes.buffer().iter().map(|id| id.0))?;
	write_words(&mut writer, prefixes.sorted_offsets())?;

	let mut rows: Vec<_> = model.table.iter().collect();
	rows.sort_unstable_by_key(|(prefix, _)| **prefix);
	for (prefix, row) in rows {
		write_words(&mut writer, [prefix.0, row.len()])?;
		for (word, tally) in row.iter() {
			write_words(&mut writer, [word.0, tally.count, tally.next.0])?;
		}
	}
	writer.flush()?;

	debug!("saved model {:?}", header.stats);
	Ok(())
}

/// Reads a model written by `save` into its generating shape.
///
/// Each row's absolute counts are turned into cumulative bounds as the
/// row is read.
pub fn load<R: Read>(reader: R) -> Result<GeneratingModel> {
	let mut reader = BufReader::new(reader);
	let header = Header::read(&mut reader)?;
	let stats = header.stats;
	if stats.prefixes > 0 && stats.pref_size > stats.prefix_len {
		return Err(ModelError::corrupt(format!(
			"prefix size {} exceeds the prefix buffer length {}",
			stats.pref_size, stats.prefix_len
		)));
	}

	let mut words = WordDictionary::from_buffer(read_bytes(&mut reader, stats.word_bytes)?)?;
	for _ in 0..stats.words {
		words.restore(read_word(&mut reader)?)?;
	}

	let prefix_bytes = stats
		.prefix_len
		.checked_mul(WORD_SIZE)
		.ok_or_else(|| ModelError::corrupt("prefix buffer too large"))?;
	let data = read_bytes(&mut reader, prefix_bytes)?
		.chunks_exact(WORD_SIZE)
		.map(|chunk| {
			let mut bytes = [0u8; WORD_SIZE];
			bytes.copy_from_slice(chunk);
			let value = u64::from_ne_bytes(bytes);
			usize::try_from(value)
				.map(WordId)
				.map_err(|_| ModelError::corrupt(format!("word id {value} does not fit in usize")))
		})
		.collect::<Result<Vec<_>>>()?;
	let mut prefixes = PrefixDictionary::from_buffer(stats.pref_size, data);
	for _ in 0..stats.prefixes {
		prefixes.restore(read_word(&mut reader)?)?;
	}

	let mut table = HashMap::new();
	for _ in 0..stats.rows {
		let prefix = PrefixId(read_word(&mut reader)?);
		let len = read_word(&mut reader)?;
		let mut successors = Vec::new();
		for _ in 0..len {
			let word = WordId(read_word(&mut reader)?);
			let count = read_word(&mut reader)?;
			let next = PrefixId(read_word(&mut reader)?);
			successors.push((word, count, next));
		}
		if table.insert(prefix, SamplingRow::from_counts(successors)?).is_some() {
			return Err(ModelError::corrupt(format!("duplicate row for prefix {}", prefix.0)));
		}
	}

	debug!("loaded model {stats:?}");
	Ok(GeneratingModel { vocab: Vocabulary { words, prefixes }, table })
}
