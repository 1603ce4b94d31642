use super::WordId;
use super::index::OffsetIndex;
use crate::error::{ModelError, Result};

/// Byte ending every word in the buffer.
pub const TERMINATOR: u8 = 0;

/// Dictionary interning tokens into a single byte buffer.
///
/// Each distinct token is stored once, followed by `TERMINATOR`. A
/// word id is the offset of the token's first byte. Tokens are
/// compared byte-wise, never with locale collation.
///
/// # Invariants
/// - The buffer is append-only; ids are never reused or invalidated
/// - Each distinct token appears in the buffer at most once
/// - The buffer is empty or ends with `TERMINATOR`
#[derive(Debug, Default)]
pub struct WordDictionary {
	/// NUL-separated unique words.
	data: Vec<u8>,
	/// Offsets of the words in `data`, looked up by word bytes.
	index: OffsetIndex,
}

/// Bytes of the word starting at `offset`, without its terminator.
fn resolve(data: &[u8], offset: usize) -> &[u8] {
	let tail = &data[offset..];
	let end = tail.iter().position(|&b| b == TERMINATOR).unwrap_or(tail.len());
	&tail[..end]
}

/// Bytes of a token as they are stored (up to the first NUL).
fn token_bytes(token: &str) -> &[u8] {
	let bytes = token.as_bytes();
	match bytes.iter().position(|&b| b == TERMINATOR) {
		Some(end) => &bytes[..end],
		None => bytes,
	}
}

impl WordDictionary {
	/// Creates an empty dictionary.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the id of `token`, storing it first if it is new.
	///
	/// Repeated calls with byte-equal tokens return the same id and do
	/// not grow the buffer.
	pub fn intern(&mut self, token: &str) -> WordId {
		let bytes = token_bytes(token);
		if let Some(offset) = self.index.find(bytes, |o| resolve(&self.data, o)) {
			return WordId(offset);
		}

		let offset = self.data.len();
		self.data.extend_from_slice(bytes);
		self.data.push(TERMINATOR);
		let data = &self.data;
		self.index.insert_new(offset, |o| resolve(data, o));
		WordId(offset)
	}

	/// Returns the id of `token`, or `None` if it was never interned.
	pub fn lookup(&self, token: &str) -> Option<WordId> {
		self.index.find(token_bytes(token), |o| resolve(&self.data, o)).map(WordId)
	}

	/// Returns the token of a word id.
	///
	/// Returns `None` if the id is outside the buffer or its bytes are
	/// not valid UTF-8.
	pub fn word(&self, id: WordId) -> Option<&str> {
		std::str::from_utf8(self.bytes(id)?).ok()
	}

	/// Raw bytes of a word id, `None` if the id is outside the buffer.
	pub(crate) fn bytes(&self, id: WordId) -> Option<&[u8]> {
		(id.0 < self.data.len()).then(|| resolve(&self.data, id.0))
	}

	/// Number of distinct words.
	pub fn len(&self) -> usize {
		self.index.len()
	}

	pub fn is_empty(&self) -> bool {
		self.index.len() == 0
	}

	/// Length of the word buffer in bytes (terminators included).
	pub fn byte_len(&self) -> usize {
		self.data.len()
	}

	pub(crate) fn buffer(&self) -> &[u8] {
		&self.data
	}

	/// Word offsets in ascending byte order of their words.
	pub(crate) fn sorted_offsets(&self) -> Vec<usize> {
		self.index.sorted(|o| resolve(&self.data, o))
	}

	/// Starts a dictionary from a loaded buffer, with an empty index.
	///
	/// # Errors
	/// Returns `CorruptFormat` if the buffer does not end with a terminator.
	pub(crate) fn from_buffer(data: Vec<u8>) -> Result<Self> {
		if data.last().is_some_and(|&b| b != TERMINATOR) {
			return Err(ModelError::corrupt("word buffer is not terminated"));
		}
		Ok(Self { data, index: OffsetIndex::new() })
	}

	/// Indexes a loaded word offset.
	///
	/// Since the buffer ends with a terminator, any offset inside it
	/// addresses a terminated word.
	///
	/// # Errors
	/// Returns `CorruptFormat` if the offset is outside the buffer or
	/// its word is already indexed.
	pub(crate) fn restore(&mut self, offset: usize) -> Result<()> {
		if offset >= self.data.len() {
			return Err(ModelError::corrupt(format!(
				"word offset {offset} outside buffer of {} bytes",
				self.data.len()
			)));
		}
		let data = &self.data;
		if !self.index.insert(offset, |o| resolve(data, o)) {
			return Err(ModelError::corrupt(format!("duplicate word at offset {offset}")));
		}
		Ok(())
	}
}
