use std::collections::VecDeque;
use std::io::{self, BufRead};

use regex::Regex;

/// Default word regex used for training text and seeds alike.
pub const DEFAULT_WORD_REGEX: &str = r"\w+";

/// Lowercase words matched by `regex` in `text`.
///
/// Seed text must go through the same regex as the training text,
/// otherwise a known context may not be found.
pub fn tokenize(text: &str, regex: &Regex) -> Vec<String> {
	regex.find_iter(text).map(|m| m.as_str().to_lowercase()).collect()
}

/// Lowercase words matched by a regex in a line-oriented byte stream.
///
/// The stream is read one line at a time, so it never needs to be
/// held in memory as a whole. Invalid UTF-8 is replaced lossily.
pub struct WordStream<'r, R> {
	reader: R,
	regex: &'r Regex,
	pending: VecDeque<String>,
	line: Vec<u8>,
}

impl<'r, R: BufRead> WordStream<'r, R> {
	pub fn new(reader: R, regex: &'r Regex) -> Self {
		Self { reader, regex, pending: VecDeque::new(), line: Vec::new() }
	}
}

impl<R: BufRead> Iterator for WordStream<'_, R> {
	type Item = io::Result<String>;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			if let Some(word) = self.pending.pop_front() {
				return Some(Ok(word));
			}
			self.line.clear();
			match self.reader.read_until(b'\n', &mut self.line) {
				Ok(0) => return None,
				Ok(_) => {
					let text = String::from_utf8_lossy(&self.line);
					self.pending.extend(self.regex.find_iter(&text).map(|m| m.as_str().to_lowercase()));
				}
				Err(e) => return Some(Err(e)),
			}
		}
	}
}
