// Copyright 2024 Irreducible Inc.

use std::sync::OnceLock;

use crate::env::count_env_var;

/// Environment variable that caps the number of threads used for batch hashing.
pub const THREADS_ENV_VAR: &str = "FIPS256_THREADS";

/// Configures the global rayon pool from the environment, once per process.
///
/// `FIPS256_THREADS` (or else `RAYON_NUM_THREADS`) sets the pool size. A size of one runs
/// batch hashing on the calling thread via `use_current_thread`, which keeps traces and
/// profiles free of worker-thread noise. Without either variable rayon's defaults apply.
///
/// NOTE: rayon doesn't allow initializing the global thread pool several times, so this must
/// run before anything else touches rayon, typically first thing in `main`. The result is
/// returned by reference because `ThreadPoolBuildError` doesn't implement `Clone`.
pub fn adjust_thread_pool() -> &'static Result<(), rayon::ThreadPoolBuildError> {
	static ONCE_GUARD: OnceLock<Result<(), rayon::ThreadPoolBuildError>> = OnceLock::new();

	ONCE_GUARD.get_or_init(|| {
		// `rayon::current_num_threads` would force the global pool to initialize.
		let threads = count_env_var(THREADS_ENV_VAR).or_else(|| count_env_var("RAYON_NUM_THREADS"));
		match threads {
			Some(1) => rayon::ThreadPoolBuilder::new()
				.num_threads(1)
				.use_current_thread()
				.build_global(),
			Some(n) => rayon::ThreadPoolBuilder::new().num_threads(n).build_global(),
			None => Ok(()),
		}
	})
}
