// Copyright 2025 Irreducible Inc.

//! Integration with the RustCrypto [`digest`] traits, so the engine can be used wherever a
//! [`digest::Digest`] is expected.

use core::fmt;

use digest::{
	block_buffer::Eager,
	core_api::{
		AlgorithmName, Block, BlockSizeUser, Buffer, BufferKindUser, CoreWrapper,
		FixedOutputCore, OutputSizeUser, UpdateCore,
	},
	typenum::{U32, U64},
	HashMarker, Output, Reset,
};

use crate::{
	compress::{compress_bytes, State},
	consts::{BLOCK_LEN, IV},
	framer::Framer,
};

/// Lowest-level core hasher state of SHA-256.
#[derive(Clone)]
pub struct Sha256Core {
	state: State,
	blocks_len: u64,
}

/// SHA-256 hasher state.
pub type Sha256 = CoreWrapper<Sha256Core>;

impl HashMarker for Sha256Core {}

impl BlockSizeUser for Sha256Core {
	type BlockSize = U64;
}

impl BufferKindUser for Sha256Core {
	type BufferKind = Eager;
}

impl OutputSizeUser for Sha256Core {
	type OutputSize = U32;
}

impl UpdateCore for Sha256Core {
	#[inline]
	fn update_blocks(&mut self, blocks: &[Block<Self>]) {
		self.blocks_len += blocks.len() as u64;
		for block in blocks {
			let block: &[u8; BLOCK_LEN] = block
				.as_slice()
				.try_into()
				.expect("block size is BLOCK_LEN");
			self.state = compress_bytes(self.state, block);
		}
	}
}

impl FixedOutputCore for Sha256Core {
	/// # Panics
	/// Panics if the total message length does not fit the 64-bit bit-length field.
	#[inline]
	fn finalize_fixed_core(&mut self, buffer: &mut Buffer<Self>, out: &mut Output<Self>) {
		let framer = Framer::resume(self.state, self.blocks_len, buffer.get_data())
			.expect("message length must fit the 64-bit length field");
		out.copy_from_slice(&framer.finalize());
	}
}

impl Default for Sha256Core {
	#[inline]
	fn default() -> Self {
		Self {
			state: IV,
			blocks_len: 0,
		}
	}
}

impl Reset for Sha256Core {
	#[inline]
	fn reset(&mut self) {
		*self = Self::default();
	}
}

impl AlgorithmName for Sha256Core {
	#[inline]
	fn write_alg_name(f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Sha256")
	}
}

impl fmt::Debug for Sha256Core {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Sha256Core { ... }")
	}
}
