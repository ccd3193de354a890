// Copyright 2025 Irreducible Inc.

#[derive(Debug, thiserror::Error)]
pub enum HashError {
	#[error("message too long: {consumed} bytes hashed, {requested} more would overflow the 64-bit bit length")]
	MessageTooLong { consumed: u64, requested: u64 },
	#[error("failed to read message: {0}")]
	Io(#[from] std::io::Error),
}
