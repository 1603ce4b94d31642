//! Word-level Markov chain text model.
//!
//! This crate provides the model store of a word-level text generator:
//! - Interned word and prefix dictionaries with transparent lookup
//! - A frequency table in a training shape (counters) and a sampling
//!   shape (cumulative distribution)
//! - Training over any number of independent windows sharing one model
//! - Weighted generation driven by a caller-supplied random generator
//! - A compact native-endian binary format guarded by a size checksum
//!
//! Text retrieval is left to the caller. Training consumes lowercase
//! word tokens, generation produces them; `tokenizer` extracts them
//! with a word regex so every front end splits text the same way.

/// Error taxonomy shared by the whole crate.
pub mod error;

/// Dictionaries, frequency table, training and generating models.
pub mod model;

/// Binary model format (header, checksum, save and load).
pub mod codec;

/// Regex word extraction shared by training and seeding.
pub mod tokenizer;

/// Native-endian word stream primitives.
///
/// Not exposed
pub(crate) mod io;

pub use error::{ModelError, Result};
pub use model::generating::{Cursor, GeneratingModel, Generator};
pub use model::training::{Trainer, TrainingModel, Window};
pub use model::{ModelStats, PrefixId, WordId};
