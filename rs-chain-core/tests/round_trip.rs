use rand::SeedableRng;
use rand::rngs::StdRng;
use rs_chain_core::{GeneratingModel, TrainingModel};

const TEXT: &str = "the cat sat on the mat and the cat ran to the dog \
	and the dog sat on the cat while the mat sat still";

fn trained(pref_size: usize, text: &str) -> TrainingModel {
	let mut model = TrainingModel::new(pref_size);
	let mut trainer = model.trainer();
	for token in text.split_whitespace() {
		trainer.feed(token);
	}
	model
}

fn reload(model: &TrainingModel) -> GeneratingModel {
	let mut bytes = Vec::new();
	model.save(&mut bytes).unwrap();
	GeneratingModel::load(bytes.as_slice()).unwrap()
}

/// Every training row survives the round trip with bounds whose
/// differences are the training counts.
#[test]
fn saved_counts_become_cumulative_bounds() {
	for pref_size in 0..4 {
		let model = trained(pref_size, TEXT);
		let loaded = reload(&model);
		assert_eq!(loaded.stats(), model.stats());

		for (prefix, row) in model.rows() {
			let sampling = loaded.row(prefix).expect("row is missing after load");
			assert_eq!(sampling.len(), row.len());

			let mut previous = 0;
			for ((word, tally), bound) in row.iter().zip(sampling.iter()) {
				assert_eq!(bound.word, word);
				assert_eq!(bound.next, tally.next);
				assert_eq!(bound.upper - previous, tally.count);
				previous = bound.upper;
			}
		}
	}
}

#[test]
fn dictionaries_survive_round_trip() {
	let model = trained(2, TEXT);
	let loaded = reload(&model);

	for token in TEXT.split_whitespace() {
		let id = model.words().lookup(token);
		assert!(id.is_some());
		assert_eq!(loaded.words().lookup(token), id);
	}
	assert_eq!(loaded.pref_size(), 2);
	assert_eq!(loaded.prefixes().len(), model.prefixes().len());
}

#[test]
fn saving_twice_gives_same_bytes() {
	let model = trained(2, TEXT);
	let mut first = Vec::new();
	let mut second = Vec::new();
	model.save(&mut first).unwrap();
	model.save(&mut second).unwrap();
	assert_eq!(first, second);
}

#[test]
fn alternating_text_example() {
	let model = trained(1, "a b a b a");
	assert_eq!(model.successors(&[""]), Some(vec![("a", 1)]));
	assert_eq!(model.successors(&["a"]), Some(vec![("b", 2)]));
	assert_eq!(model.successors(&["b"]), Some(vec![("a", 2)]));

	let loaded = reload(&model);
	assert_eq!(loaded.distribution(&[""]), Some(vec![("a", 1)]));
	assert_eq!(loaded.distribution(&["a"]), Some(vec![("b", 2)]));
	assert_eq!(loaded.distribution(&["b"]), Some(vec![("a", 2)]));

	let empty: [&str; 0] = [];
	let text: Vec<&str> = loaded
		.generator(&empty, StdRng::seed_from_u64(1))
		.take(10)
		.collect::<Result<_, _>>()
		.unwrap();
	assert_eq!(text, ["a", "b", "a", "b", "a", "b", "a", "b", "a", "b"]);
}

#[test]
fn unknown_seed_generates_nothing() {
	let loaded = reload(&trained(2, TEXT));
	assert_eq!(loaded.generator(&["zebra"], StdRng::seed_from_u64(1)).count(), 0);
	// Both words are known, but never in this order.
	assert_eq!(loaded.generator(&["mat", "cat"], StdRng::seed_from_u64(1)).count(), 0);
	assert!(loaded.cursor(&["zebra"]).is_none());
}

#[test]
fn text_ends_when_context_has_no_data() {
	let loaded = reload(&trained(1, "one two three"));
	let text: Vec<&str> = loaded
		.generator(&["one"], StdRng::seed_from_u64(3))
		.collect::<Result<_, _>>()
		.unwrap();
	assert_eq!(text, ["two", "three"]);
}

#[test]
fn seeded_generation_is_reproducible() {
	let loaded = reload(&trained(1, TEXT));
	let empty: [&str; 0] = [];
	let run = |seed| {
		loaded
			.generator(&empty, StdRng::seed_from_u64(seed))
			.take(50)
			.collect::<Result<Vec<_>, _>>()
			.unwrap()
	};
	assert_eq!(run(42), run(42));
}

#[test]
fn seed_longer_than_prefix_keeps_last_words() {
	let loaded = reload(&trained(1, "x y z"));
	let text: Vec<&str> = loaded
		.generator(&["z", "x"], StdRng::seed_from_u64(0))
		.collect::<Result<_, _>>()
		.unwrap();
	assert_eq!(text, ["y", "z"]);
}

#[test]
fn one_model_serves_many_threads() {
	let loaded = reload(&trained(2, TEXT));
	let empty: [&str; 0] = [];
	let text = |seed: u64| {
		loaded
			.generator(&empty, StdRng::seed_from_u64(seed))
			.take(40)
			.collect::<Result<Vec<_>, _>>()
			.unwrap()
	};
	let expected: Vec<Vec<&str>> = (0..8).map(text).collect();

	let generated: Vec<Vec<&str>> = std::thread::scope(|scope| {
		let handles: Vec<_> = (0..8).map(|seed| scope.spawn(move || text(seed))).collect();
		handles.into_iter().map(|handle| handle.join().unwrap()).collect()
	});
	assert_eq!(generated, expected);
}
