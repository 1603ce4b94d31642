use std::io::{self, Read, Write};

use crate::error::{ModelError, Result};

/// Size in bytes of every integer in the model format.
pub(crate) const WORD_SIZE: usize = size_of::<u64>();

/// Writes one integer as an 8-byte native-endian word.
pub(crate) fn write_word<W: Write>(writer: &mut W, value: usize) -> io::Result<()> {
	writer.write_all(&(value as u64).to_ne_bytes())
}

/// Writes a slice of integers as consecutive 8-byte words.
pub(crate) fn write_words<W, I>(writer: &mut W, values: I) -> io::Result<()>
where
	W: Write,
	I: IntoIterator<Item = usize>,
{
	for value in values {
		write_word(writer, value)?;
	}
	Ok(())
}

/// Reads one 8-byte native-endian word.
///
/// Fails with `CorruptFormat` if the value does not fit in `usize`.
pub(crate) fn read_word<R: Read>(reader: &mut R) -> Result<usize> {
	let mut bytes = [0u8; WORD_SIZE];
	reader.read_exact(&mut bytes)?;
	let value = u64::from_ne_bytes(bytes);
	usize::try_from(value).map_err(|_| ModelError::corrupt(format!("value {value} does not fit in usize")))
}

/// Reads exactly `len` raw bytes.
///
/// The buffer grows with the data actually read, so a lying length
/// fails with `UnexpectedEof` instead of allocating up front.
pub(crate) fn read_bytes<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
	let mut bytes = Vec::new();
	reader.take(len as u64).read_to_end(&mut bytes)?;
	if bytes.len() != len {
		return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated byte buffer").into());
	}
	Ok(bytes)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn words_are_native_endian() {
		let mut out = Vec::new();
		write_words(&mut out, [1, 258]).unwrap();
		assert_eq!(out.len(), 2 * WORD_SIZE);
		assert_eq!(&out[..WORD_SIZE], &1u64.to_ne_bytes());

		let mut input = out.as_slice();
		assert_eq!(read_word(&mut input).unwrap(), 1);
		assert_eq!(read_word(&mut input).unwrap(), 258);
		assert!(matches!(read_word(&mut input), Err(ModelError::Io(_))));
	}

	#[test]
	fn short_byte_buffer_is_eof() {
		let data = [1u8, 2, 3];
		let err = read_bytes(&mut data.as_slice(), 4).unwrap_err();
		match err {
			ModelError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
			other => panic!("unexpected error {other:?}"),
		}
	}
}
