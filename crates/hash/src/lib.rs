// Copyright 2023 Ulvetanna Inc.

//! SHA-256 (FIPS 180-4) built from a block compressor and a message framer.

pub mod compress;
pub mod consts;
pub mod core_api;
mod error;
pub mod framer;
pub mod parallel;


pub use core_api::{Sha256, Sha256Core};
pub use digest::{self, Digest};
pub use error::HashError;
pub use framer::{digest_bulk, digest_reader, frame_and_digest, ByteSource, Completion, Framer};
