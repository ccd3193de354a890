// Copyright 2025 Irreducible Inc.

mod check;

use std::{
	fs::{self, File},
	io::{self, BufReader},
	path::PathBuf,
	process::ExitCode,
};

use anyhow::{ensure, Context, Result};
use check::{parse_expected, use_color, Verdict};
use clap::Parser;
use fips256_hash::{
	consts::DIGEST_LEN, digest_bulk, digest_reader, frame_and_digest, parallel::digest_many,
	ByteSource,
};
use fips256_utils::{rayon::adjust_thread_pool, tracing::init_tracing};

#[derive(Debug, Parser)]
#[command(version, about = "Compute SHA-256 digests (FIPS 180-4)")]
struct Args {
	/// Message to hash, taken as its UTF-8 bytes.
	///
	/// Standard input is hashed when neither a message nor files are given.
	#[arg(conflicts_with = "files")]
	message: Option<String>,
	/// Files to hash.
	#[arg(short, long = "file", value_name = "PATH")]
	files: Vec<PathBuf>,
	/// Expected digest as 64 hex digits. Prints OK or BAD and exits non-zero on mismatch.
	#[arg(short, long, value_name = "HEX")]
	check: Option<String>,
	/// Load each input completely before hashing instead of streaming it.
	#[arg(long)]
	bulk: bool,
}

/// One computed digest, labelled with its file when there is one.
struct Entry {
	label: Option<String>,
	digest: [u8; DIGEST_LEN],
}

fn hash_stdin(bulk: bool) -> Result<[u8; DIGEST_LEN]> {
	let mut stdin = io::stdin().lock();
	let digest = if bulk {
		let mut message = Vec::new();
		io::Read::read_to_end(&mut stdin, &mut message).context("failed to read stdin")?;
		digest_bulk(&message)?
	} else {
		frame_and_digest(ByteSource::Reader(&mut stdin))?
	};
	Ok(digest)
}

fn hash_files(files: &[PathBuf], bulk: bool) -> Result<Vec<[u8; DIGEST_LEN]>> {
	if bulk {
		let contents = files
			.iter()
			.map(|path| fs::read(path).with_context(|| format!("failed to read {}", path.display())))
			.collect::<Result<Vec<_>>>()?;
		return Ok(digest_many(&contents)?);
	}

	files
		.iter()
		.map(|path| {
			let file =
				File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
			digest_reader(&mut BufReader::new(file))
				.with_context(|| format!("failed to hash {}", path.display()))
		})
		.collect()
}

/// Hashes the requested inputs and prints them, returning the verdict if a check was requested.
fn run(args: Args) -> Result<Option<Verdict>> {
	let expected = args.check.as_deref().map(parse_expected).transpose()?;
	ensure!(
		expected.is_none() || args.files.len() <= 1,
		"--check needs exactly one input, got {} files",
		args.files.len()
	);

	let entries = if let Some(message) = &args.message {
		vec![Entry {
			label: None,
			digest: digest_bulk(message.as_bytes())?,
		}]
	} else if !args.files.is_empty() {
		let digests = hash_files(&args.files, args.bulk)?;
		args.files
			.iter()
			.zip(digests)
			.map(|(path, digest)| Entry {
				label: Some(path.display().to_string()),
				digest,
			})
			.collect()
	} else {
		vec![Entry {
			label: None,
			digest: hash_stdin(args.bulk)?,
		}]
	};

	for entry in &entries {
		match &entry.label {
			Some(label) => println!("{}  {label}", hex::encode(entry.digest)),
			None => println!("{}", hex::encode(entry.digest)),
		}
	}

	let Some(expected) = expected else {
		return Ok(None);
	};

	let verdict = Verdict::compare(&entries[0].digest, &expected);
	tracing::debug!(?verdict, "compared against expected digest");
	println!("{}", verdict.render(use_color(&io::stdout())));

	Ok(Some(verdict))
}

fn main() -> Result<ExitCode> {
	adjust_thread_pool()
		.as_ref()
		.expect("failed to init thread pool");

	let args = Args::parse();

	init_tracing();

	Ok(match run(args)? {
		Some(verdict) if !verdict.is_match() => ExitCode::FAILURE,
		_ => ExitCode::SUCCESS,
	})
}
