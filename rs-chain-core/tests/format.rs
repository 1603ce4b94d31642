use std::io::ErrorKind;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rs_chain_core::codec::HEADER_LEN;
use rs_chain_core::{GeneratingModel, ModelError, TrainingModel};

fn saved(text: &str) -> (TrainingModel, Vec<u8>) {
	let mut model = TrainingModel::new(1);
	let mut trainer = model.trainer();
	for token in text.split_whitespace() {
		trainer.feed(token);
	}
	let mut bytes = Vec::new();
	model.save(&mut bytes).unwrap();
	(model, bytes)
}

fn put_word(bytes: &mut [u8], at: usize, value: u64) {
	bytes[at..at + 8].copy_from_slice(&value.to_ne_bytes());
}

#[test]
fn any_header_byte_flip_is_corruption() {
	let (_, bytes) = saved("a b a b a");
	for at in 0..HEADER_LEN {
		let mut damaged = bytes.clone();
		damaged[at] ^= 0xff;
		let result = GeneratingModel::load(damaged.as_slice());
		assert!(
			matches!(result, Err(ModelError::CorruptFormat(_))),
			"flipping header byte {at} was not detected"
		);
	}
}

/// The checksum covers the header sizes only.
#[test]
fn payload_flip_passes_checksum() {
	let (_, mut bytes) = saved("a b a b a");
	// Word buffer is "\0a\0b\0": the second byte is the letter 'a'.
	assert_eq!(bytes[HEADER_LEN + 1], b'a');
	bytes[HEADER_LEN + 1] ^= 0x01;

	let loaded = GeneratingModel::load(bytes.as_slice()).unwrap();
	assert!(loaded.words().lookup("a").is_none());
	assert!(loaded.words().lookup("`").is_some());
}

#[test]
fn truncated_stream_is_an_io_error() {
	let (_, bytes) = saved("a b a b a");
	match GeneratingModel::load(&bytes[..bytes.len() - 1]) {
		Err(ModelError::Io(e)) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
		other => panic!("unexpected result {other:?}"),
	}
}

#[test]
fn word_offset_outside_buffer_is_corruption() {
	let (model, mut bytes) = saved("a b a b a");
	let word_offsets = HEADER_LEN + model.stats().word_bytes;
	put_word(&mut bytes, word_offsets, 1000);
	assert!(matches!(GeneratingModel::load(bytes.as_slice()), Err(ModelError::CorruptFormat(_))));
}

#[test]
fn prefix_offset_outside_buffer_is_corruption() {
	let (model, mut bytes) = saved("a b a b a");
	let stats = model.stats();
	let prefix_offsets = HEADER_LEN + stats.word_bytes + 8 * stats.words + 8 * stats.prefix_len;
	// With one word per prefix, the last valid offset is prefix_len - 1.
	put_word(&mut bytes, prefix_offsets, stats.prefix_len as u64);
	assert!(matches!(GeneratingModel::load(bytes.as_slice()), Err(ModelError::CorruptFormat(_))));
}

#[test]
fn empty_model_round_trips() {
	let model = TrainingModel::new(3);
	let mut bytes = Vec::new();
	model.save(&mut bytes).unwrap();
	assert_eq!(bytes.len(), HEADER_LEN);

	let loaded = GeneratingModel::load(bytes.as_slice()).unwrap();
	assert_eq!(loaded.pref_size(), 3);
	assert!(loaded.words().is_empty());
	assert!(loaded.cursor(&["", "", ""]).is_none());
}

fn header(sizes: [u64; 6]) -> Vec<u8> {
	let checksum = sizes.iter().fold(0, |acc, size| acc ^ size);
	sizes.iter().chain([&checksum]).flat_map(|word| word.to_ne_bytes()).collect()
}

#[test]
fn oversized_prefix_size_of_empty_model_generates_nothing() {
	let bytes = header([1 << 60, 0, 0, 0, 0, 0]);
	assert_eq!(bytes.len(), HEADER_LEN);

	let loaded = GeneratingModel::load(bytes.as_slice()).unwrap();
	let empty: [&str; 0] = [];
	assert!(loaded.cursor(&empty).is_none());
	assert!(loaded.distribution(&["a"]).is_none());
	assert_eq!(loaded.generator(&empty, StdRng::seed_from_u64(1)).count(), 0);
}

#[test]
fn prefix_size_beyond_prefix_buffer_is_corruption() {
	let bytes = header([1 << 60, 0, 0, 0, 1, 0]);
	let result = GeneratingModel::load(bytes.as_slice());
	assert!(matches!(result, Err(ModelError::CorruptFormat(_))), "{result:?}");

	let bytes = header([3, 0, 0, 2, 1, 0]);
	let result = GeneratingModel::load(bytes.as_slice());
	assert!(matches!(result, Err(ModelError::CorruptFormat(_))), "{result:?}");
}
