// Copyright 2025 Irreducible Inc.

//! Hashing of many independent messages on the rayon thread pool.
//!
//! Parallelism is only across messages: every message owns its own state, and the blocks
//! of a single message are always compressed in order on one thread.

use digest::{Digest, Output};
use rayon::prelude::*;
use tracing::info_span;

use crate::{consts::DIGEST_LEN, error::HashError, framer::digest_bulk};

pub trait ParallelDigest: Send {
	/// The corresponding non-parallelized hash function.
	type Digest: Digest + Send;

	/// Create new hasher instance with empty state.
	fn new() -> Self;

	/// Create new hasher instance which has processed the provided data.
	fn new_with_prefix(data: impl AsRef<[u8]>) -> Self;

	/// Calculate the digest of every message in `source`, each prefixed by whatever this
	/// instance has already absorbed, and write them to `out` in order.
	///
	/// # Panics
	/// Panics if `out` is shorter than `source`.
	fn digest(
		&self,
		source: impl IndexedParallelIterator<Item: AsRef<[u8]>>,
		out: &mut [Output<Self::Digest>],
	);
}

impl<D: Digest + Send + Sync + Clone> ParallelDigest for D {
	type Digest = D;

	fn new() -> Self {
		Digest::new()
	}

	fn new_with_prefix(data: impl AsRef<[u8]>) -> Self {
		Digest::new_with_prefix(data)
	}

	fn digest(
		&self,
		source: impl IndexedParallelIterator<Item: AsRef<[u8]>>,
		out: &mut [Output<Self::Digest>],
	) {
		assert!(out.len() >= source.len(), "output buffer is too short");
		source
			.zip(out.par_iter_mut())
			.for_each(|(data, out)| {
				let mut hasher = self.clone();
				hasher.update(data.as_ref());
				*out = hasher.finalize();
			});
	}
}

/// Hashes each message independently with the bulk strategy, preserving order.
pub fn digest_many<M: AsRef<[u8]> + Sync>(
	messages: &[M],
) -> Result<Vec<[u8; DIGEST_LEN]>, HashError> {
	let _span = info_span!("digest_many", n_messages = messages.len()).entered();
	messages
		.par_iter()
		.map(|message| digest_bulk(message.as_ref()))
		.collect()
}
