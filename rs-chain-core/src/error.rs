use thiserror::Error;

/// Errors raised by the model store.
///
/// A missing word or prefix is not an error: lookups return `None`,
/// and generation reports it as the end of the text.
#[derive(Error, Debug)]
pub enum ModelError {
	/// The byte stream does not describe a well-formed model.
	///
	/// Raised by `load` only; no partial model is returned.
	#[error("Corrupt model format: {0}")]
	CorruptFormat(String),

	/// The loaded frequency table contradicts what `save` guarantees.
	#[error("Malformed table: {0}")]
	MalformedTable(String),

	/// Failure of the underlying byte stream, including truncated input.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

impl ModelError {
	/// Create a corrupt format error
	pub fn corrupt(msg: impl Into<String>) -> Self {
		Self::CorruptFormat(msg.into())
	}

	/// Create a malformed table error
	pub fn malformed(msg: impl Into<String>) -> Self {
		Self::MalformedTable(msg.into())
	}
}
