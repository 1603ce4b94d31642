use std::collections::VecDeque;
use std::io::{self, Read};
use std::thread::{self, JoinHandle};
use std::{fs, slice};

use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use reqwest::blocking::Client;

/// Name of the source reading standard input.
pub const STDIN: &str = "-";

/// Where the text of a source comes from.
#[derive(Debug, PartialEq)]
enum Origin<'a> {
	Stdin,
	Url(&'a str),
	File(&'a str),
}

impl<'a> Origin<'a> {
	fn of(source: &'a str) -> Self {
		if source == STDIN {
			Origin::Stdin
		} else if source.starts_with("http://") || source.starts_with("https://") {
			Origin::Url(source)
		} else {
			Origin::File(source)
		}
	}
}

/// Reads the whole content of one source.
fn fetch(client: &Client, source: &str) -> Result<Vec<u8>> {
	match Origin::of(source) {
		Origin::Stdin => {
			let mut body = Vec::new();
			io::stdin().lock().read_to_end(&mut body)?;
			Ok(body)
		}
		Origin::Url(url) => {
			let response = client.get(url).send()?.error_for_status()?;
			Ok(response.bytes()?.to_vec())
		}
		Origin::File(path) => Ok(fs::read(path)?),
	}
}

/// Fetches sources in parallel and yields them in argument order.
///
/// At most `concurrency` sources are in flight (fetched or waiting to be
/// consumed) at any time; a new fetch starts each time one is consumed.
pub struct Fetcher<'a> {
	client: Client,
	queue: slice::Iter<'a, String>,
	pending: VecDeque<(String, JoinHandle<Result<Vec<u8>>>)>,
	concurrency: usize,
}

impl<'a> Fetcher<'a> {
	pub fn new(sources: &'a [String], concurrency: usize) -> Result<Self> {
		let client = Client::builder().build().context("cannot create HTTP client")?;
		Ok(Self { client, queue: sources.iter(), pending: VecDeque::new(), concurrency: concurrency.max(1) })
	}
}

impl Iterator for Fetcher<'_> {
	type Item = Result<(String, Vec<u8>)>;

	fn next(&mut self) -> Option<Self::Item> {
		while self.pending.len() < self.concurrency {
			let Some(source) = self.queue.next() else { break };
			let client = self.client.clone();
			let name = source.clone();
			let handle = thread::spawn(move || fetch(&client, &name));
			self.pending.push_back((source.clone(), handle));
		}

		let (source, handle) = self.pending.pop_front()?;
		let body = handle
			.join()
			.map_err(|_| anyhow!("fetch thread panicked"))
			.and_then(|result| result)
			.with_context(|| format!("cannot read source {source}"));
		if let Ok(bytes) = &body {
			info!("fetched {source} ({} bytes)", bytes.len());
		}
		Some(body.map(|bytes| (source, bytes)))
	}
}

impl Drop for Fetcher<'_> {
	/// Waits for fetches still in flight, so none outlives the fetcher.
	fn drop(&mut self) {
		for (source, handle) in self.pending.drain(..) {
			if handle.join().is_err() {
				warn!("fetch thread for {source} panicked");
			}
		}
	}
}
