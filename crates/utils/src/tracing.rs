// Copyright 2023 Ulvetanna Inc.

use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Directive used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_LOG_DIRECTIVE: &str = "warn";

/// Installs the global `tracing` subscriber for binaries.
///
/// Log output goes to stderr so that digests written to stdout stay machine-readable.
/// Setting `FIPS256_LOG_SPANS` additionally reports span close events with their timings.
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_tracing() {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE));

	let span_events = if crate::env::boolean_env_flag_set("FIPS256_LOG_SPANS") {
		FmtSpan::CLOSE
	} else {
		FmtSpan::NONE
	};

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_span_events(span_events)
		.with_writer(std::io::stderr)
		.try_init();
}
