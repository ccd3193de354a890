// Copyright 2025 Irreducible Inc.

use std::{fmt, io::IsTerminal};

use anyhow::{Context, Result};
use fips256_hash::consts::DIGEST_LEN;
use fips256_utils::env::boolean_env_flag_set;

/// Environment switch that disables ANSI colors even on a terminal.
pub const NO_COLOR_FLAG: &str = "FIPS256_NO_COLOR";

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Outcome of comparing a computed digest against an expected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
	Match,
	Mismatch,
}

impl Verdict {
	pub fn compare(actual: &[u8; DIGEST_LEN], expected: &[u8; DIGEST_LEN]) -> Self {
		if actual == expected {
			Self::Match
		} else {
			Self::Mismatch
		}
	}

	pub fn is_match(self) -> bool {
		self == Self::Match
	}

	/// Renders the verdict, wrapped in ANSI color codes when `color` is set.
	pub fn render(self, color: bool) -> String {
		let (label, code) = match self {
			Self::Match => ("OK", GREEN),
			Self::Mismatch => ("BAD", RED),
		};
		if color {
			format!("{code}{label}{RESET}")
		} else {
			label.to_string()
		}
	}
}

impl fmt::Display for Verdict {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.render(false))
	}
}

/// Parses an expected digest given as 64 hex digits in either case.
pub fn parse_expected(hex_digest: &str) -> Result<[u8; DIGEST_LEN]> {
	let mut out = [0u8; DIGEST_LEN];
	hex::decode_to_slice(hex_digest.trim(), &mut out)
		.with_context(|| format!("invalid expected digest {hex_digest:?}"))?;
	Ok(out)
}

/// Colors are used only on a terminal and only if not disabled through the environment.
pub fn use_color(stream: &impl IsTerminal) -> bool {
	stream.is_terminal() && !boolean_env_flag_set(NO_COLOR_FLAG)
}
