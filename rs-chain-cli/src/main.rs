//! Command-line front end of the word-level Markov chain model.
//!
//! Trains a model from text sources (files, standard input or URLs),
//! writes it in the binary model format, and generates text from it.
//! With both `-t` and `-g`, the model is trained, saved to memory and
//! loaded back before generating.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use regex::Regex;
use rs_chain_core::tokenizer::{self, DEFAULT_WORD_REGEX, WordStream};
use rs_chain_core::{GeneratingModel, TrainingModel};

mod sources;

use sources::{Fetcher, STDIN};

/// Largest accepted prefix length.
const MAX_PREFIX_LEN: u64 = 4096;

/// Default number of sources fetched in parallel.
fn default_concurrency() -> usize {
	num_cpus::get() * 8
}

#[derive(Parser, Debug)]
#[command(name = "rs-chain", about = "Word-level Markov chain text generator")]
struct Args {
	/// Train a model from the sources
	#[arg(short, long)]
	train: bool,

	/// Generate text from a model
	#[arg(short, long)]
	generate: bool,

	/// Model input file for generation (stdin by default)
	#[arg(short, long)]
	input: Option<PathBuf>,

	/// Output file (stdout by default)
	#[arg(short, long)]
	output: Option<PathBuf>,

	/// Word regex
	#[arg(short, long, default_value = DEFAULT_WORD_REGEX)]
	regex: String,

	/// Text prefix length
	#[arg(short = 'n', long, default_value_t = 1,
		value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(0..=MAX_PREFIX_LEN))]
	prefix_len: usize,

	/// Number of sources fetched in parallel
	#[arg(short, long, default_value_t = default_concurrency())]
	concurrency: usize,

	/// Generated text size, in words
	#[arg(short, long, default_value_t = 1_000_000)]
	words: usize,

	/// Generated text prefix
	#[arg(short, long, default_value = "")]
	prefix: String,

	/// Random generator seed, for reproducible text
	#[arg(long)]
	seed: Option<u64>,

	/// Training sources: files, "-" for stdin, or http(s) URLs (stdin by default)
	sources: Vec<String>,
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
	Ok(match path {
		Some(path) => Box::new(File::open(path).with_context(|| format!("cannot open {}", path.display()))?),
		None => Box::new(io::stdin().lock()),
	})
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
	Ok(match path {
		Some(path) => Box::new(File::create(path).with_context(|| format!("cannot create {}", path.display()))?),
		None => Box::new(io::stdout().lock()),
	})
}

/// Trains a new model, one fresh window per source.
///
/// Sources that cannot be read are logged and skipped.
fn train(sources: &[String], regex: &Regex, pref_size: usize, concurrency: usize) -> Result<TrainingModel> {
	let mut model = TrainingModel::new(pref_size);
	let mut tokens: usize = 0;
	for source in Fetcher::new(sources, concurrency)? {
		let (name, body) = match source {
			Ok(source) => source,
			Err(e) => {
				warn!("skipping source: {e:#}");
				continue;
			}
		};
		let mut trainer = model.trainer();
		for word in WordStream::new(body.as_slice(), regex) {
			trainer.feed(&word.with_context(|| format!("cannot tokenize {name}"))?);
			tokens += 1;
		}
	}
	info!("trained on {tokens} tokens: {:?}", model.stats());
	Ok(model)
}

/// Writes up to `words` generated words, separated by spaces.
fn generate<W: Write>(model: &GeneratingModel, prefix: &str, regex: &Regex, words: usize, seed: Option<u64>, output: &mut W) -> Result<()> {
	let seed_words = tokenizer::tokenize(prefix, regex);
	let rng = match seed {
		Some(seed) => StdRng::seed_from_u64(seed),
		None => StdRng::from_os_rng(),
	};

	let mut written: usize = 0;
	for word in model.generator(&seed_words, rng).take(words) {
		if written > 0 {
			output.write_all(b" ")?;
		}
		output.write_all(word?.as_bytes())?;
		written += 1;
	}
	if written == 0 {
		warn!("no text generated: the prefix {prefix:?} is unknown to the model");
	} else {
		output.write_all(b"\n")?;
	}
	Ok(())
}

/// Runs the command described by `args`, writing the model or the
/// generated text to `output`.
fn run<W: Write>(mut args: Args, output: &mut W) -> Result<()> {
	if args.sources.is_empty() {
		args.sources.push(STDIN.to_owned());
	}

	let regex = Regex::new(&args.regex).with_context(|| format!("invalid word regex {:?}", args.regex))?;
	let mut memory = Vec::new();

	if args.train {
		let model = train(&args.sources, &regex, args.prefix_len, args.concurrency)?;
		if args.generate {
			model.save(&mut memory)?;
		} else {
			model.save(&mut *output)?;
		}
	}

	if args.generate {
		let model = if args.train {
			GeneratingModel::load(memory.as_slice())?
		} else {
			GeneratingModel::load(open_input(args.input.as_deref())?).context("cannot load model")?
		};
		info!("loaded model: {:?}", model.stats());
		generate(&model, &args.prefix, &regex, args.words, args.seed, output)?;
	}
	Ok(())
}

fn main() -> Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
	let args = Args::parse();

	if !(args.train || args.generate) {
		eprintln!("{}", Args::command().render_help());
		return Ok(());
	}

	let mut output = BufWriter::new(open_output(args.output.as_deref())?);
	run(args, &mut output)?;
	output.flush()?;
	Ok(())
}
