use std::fs::File;
use std::io;
use std::path::PathBuf;

use actix_cors::Cors;
use actix_web::{get, middleware, web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use regex::Regex;
use serde::Deserialize;

use rs_chain_core::GeneratingModel;
use rs_chain_core::tokenizer::{self, DEFAULT_WORD_REGEX};

#[derive(Parser, Debug)]
#[command(name = "rs-chain-server", about = "Serves text generated from a saved model")]
struct Args {
	/// Model file written by `rs-chain -t`
	#[arg(long)]
	model: PathBuf,

	#[arg(long, default_value = "127.0.0.1")]
	host: String,

	#[arg(long, default_value_t = 5000)]
	port: u16,

	/// Upper bound on the words generated by one request
	#[arg(long, default_value_t = 10_000)]
	max_words: usize,

	/// Word regex applied to seeds, the one the model was trained with
	#[arg(long, default_value = DEFAULT_WORD_REGEX)]
	regex: String,
}

/// Query parameters of the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	words: Option<usize>,
	seed: Option<String>,
	rng: Option<u64>,
}

/// The model is only read after loading, so requests share it without a lock.
struct SharedData {
	model: GeneratingModel,
	regex: Regex,
	max_words: usize,
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates up to `words` words (100 by default) following `seed`.
/// Returns 404 if the seed is unknown to the model.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<SharedData>, query: web::Query<GenerateParams>) -> impl Responder {
	let words = query.words.unwrap_or(100).min(data.max_words);
	let seed = query.seed.as_deref().map(|text| tokenizer::tokenize(text, &data.regex)).unwrap_or_default();
	if data.model.cursor(&seed).is_none() {
		return HttpResponse::NotFound().body("Unknown seed");
	}

	let rng = match query.rng {
		Some(value) => StdRng::seed_from_u64(value),
		None => StdRng::from_os_rng(),
	};
	match data.model.generator(&seed, rng).take(words).collect::<Result<Vec<_>, _>>() {
		Ok(text) => HttpResponse::Ok().body(text.join(" ")),
		Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
	}
}

/// HTTP GET endpoint `/v1/stats`, model sizes as JSON
#[get("/v1/stats")]
async fn get_stats(data: web::Data<SharedData>) -> impl Responder {
	HttpResponse::Ok().json(data.model.stats())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
	let args = Args::parse();

	let regex = Regex::new(&args.regex).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
	let model = GeneratingModel::load(File::open(&args.model)?).map_err(io::Error::other)?;
	info!("loaded {}: {:?}", args.model.display(), model.stats());

	let shared_data = web::Data::new(SharedData { model, regex, max_words: args.max_words });
	info!("listening on {}:{}", args.host, args.port);

	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.wrap(middleware::Logger::default())
			.app_data(shared_data.clone())
			.service(get_generated)
			.service(get_stats)
	})
		.bind((args.host.as_str(), args.port))?
		.run()
		.await
}
