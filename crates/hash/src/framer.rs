// Copyright 2025 Irreducible Inc.

//! Message framing: splitting a message into blocks and applying the FIPS 180-4 §5.1.1
//! padding before driving the compression function.
//!
//! Two interchangeable strategies are provided. [`digest_bulk`] works on a message that is
//! entirely in memory and pads its tail analytically. [`Framer`] accepts the message
//! incrementally, compressing each 64-byte working block as soon as it fills. Both produce
//! identical digests for identical input.

use std::{
	cmp::min,
	io::{ErrorKind, Read},
};

use fips256_utils::ensure;
use tracing::{debug, instrument, trace};

use crate::{
	compress::{compress_bytes, state_to_bytes, State},
	consts::{BLOCK_LEN, DIGEST_LEN, IV, LENGTH_OFFSET, PADDING_TERMINATOR},
	error::HashError,
};

/// The longest message, in bytes, whose bit length fits the 64-bit length field.
pub const MAX_MESSAGE_LEN: u64 = u64::MAX / 8;

/// Chunk size used when pulling bytes from a reader.
const READ_CHUNK_LEN: usize = 8 * 1024;

/// Where the framer is in the lifetime of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
	/// Message bytes are still being accepted.
	Streaming,
	/// The terminator byte has been placed and the length field fits in the same block.
	PaddingFitsHere,
	/// The terminator byte has been placed but the length field does not fit; one more
	/// all-zero block carrying only the length must follow.
	PaddingSpillsOver,
}

impl Completion {
	/// Decides the padding layout for a final block that holds `index` message bytes,
	/// i.e. whose terminator byte lands at `index`.
	pub const fn after_terminator(index: usize) -> Self {
		if index < LENGTH_OFFSET {
			Self::PaddingFitsHere
		} else {
			Self::PaddingSpillsOver
		}
	}

	/// The padding layout of a complete message of `message_len` bytes.
	pub const fn for_message_len(message_len: u64) -> Self {
		Self::after_terminator((message_len % BLOCK_LEN as u64) as usize)
	}

	/// Number of blocks compressed at finalization, counting the partially filled one.
	pub const fn final_blocks(self) -> usize {
		match self {
			Self::Streaming => 0,
			Self::PaddingFitsHere => 1,
			Self::PaddingSpillsOver => 2,
		}
	}
}

/// The origin of the bytes to be hashed.
pub enum ByteSource<'a> {
	/// The whole message is available up front.
	Buffer(&'a [u8]),
	/// Bytes are pulled until the reader reports end of input.
	Reader(&'a mut dyn Read),
}

impl<'a> From<&'a [u8]> for ByteSource<'a> {
	fn from(buffer: &'a [u8]) -> Self {
		Self::Buffer(buffer)
	}
}

/// Hashes a message from either kind of source.
pub fn frame_and_digest(source: ByteSource<'_>) -> Result<[u8; DIGEST_LEN], HashError> {
	match source {
		ByteSource::Buffer(message) => digest_bulk(message),
		ByteSource::Reader(reader) => digest_reader(reader),
	}
}

/// Hashes a message that is fully in memory.
///
/// Whole blocks are compressed straight from `message`; the remaining bytes and the padding
/// are laid out in a one- or two-block tail whose size is known before it is written.
#[instrument(skip_all, fields(message_len = message.len()), level = "debug")]
pub fn digest_bulk(message: &[u8]) -> Result<[u8; DIGEST_LEN], HashError> {
	let message_len = message.len() as u64;
	ensure!(
		message_len <= MAX_MESSAGE_LEN,
		HashError::MessageTooLong {
			consumed: 0,
			requested: message_len,
		}
	);

	let mut state = IV;
	let mut blocks = message.chunks_exact(BLOCK_LEN);
	for block in &mut blocks {
		state = compress_bytes(state, block.try_into().expect("chunk size is correct"));
	}

	let remainder = blocks.remainder();
	let completion = Completion::after_terminator(remainder.len());
	let tail_len = completion.final_blocks() * BLOCK_LEN;

	let mut tail = [0u8; 2 * BLOCK_LEN];
	tail[..remainder.len()].copy_from_slice(remainder);
	tail[remainder.len()] = PADDING_TERMINATOR;
	tail[tail_len - 8..tail_len].copy_from_slice(&(message_len * 8).to_be_bytes());

	for block in tail[..tail_len].chunks_exact(BLOCK_LEN) {
		state = compress_bytes(state, block.try_into().expect("chunk size is correct"));
	}
	debug!(?completion, "padded message tail");

	Ok(state_to_bytes(&state))
}

/// Hashes everything `reader` yields until it reports end of input.
///
/// Interrupted reads are retried; any other read error aborts hashing.
#[instrument(skip_all, level = "debug")]
pub fn digest_reader<R: Read + ?Sized>(reader: &mut R) -> Result<[u8; DIGEST_LEN], HashError> {
	let mut framer = Framer::new();
	let mut chunk = vec![0u8; READ_CHUNK_LEN];
	loop {
		match reader.read(&mut chunk) {
			Ok(0) => break,
			Ok(n) => framer.update(&chunk[..n])?,
			Err(err) if err.kind() == ErrorKind::Interrupted => continue,
			Err(err) => return Err(err.into()),
		}
	}
	Ok(framer.finalize())
}

/// Incremental framer: accepts message bytes in arbitrary pieces.
#[derive(Debug, Clone)]
pub struct Framer {
	state: State,
	block: [u8; BLOCK_LEN],
	/// Invariant: `index` is always strictly less than `BLOCK_LEN` between calls.
	index: usize,
	message_len: u64,
	blocks_compressed: u64,
}

impl Default for Framer {
	fn default() -> Self {
		Self {
			state: IV,
			block: [0; BLOCK_LEN],
			index: 0,
			message_len: 0,
			blocks_compressed: 0,
		}
	}
}

impl Framer {
	pub fn new() -> Self {
		Self::default()
	}

	/// Rebuilds a framer whose `state` has absorbed `blocks` whole blocks, with `pending`
	/// bytes of a partial block not yet compressed.
	pub(crate) fn resume(state: State, blocks: u64, pending: &[u8]) -> Result<Self, HashError> {
		debug_assert!(pending.len() < BLOCK_LEN);
		let consumed = blocks.saturating_mul(BLOCK_LEN as u64);
		let requested = pending.len() as u64;
		ensure!(
			consumed <= MAX_MESSAGE_LEN && requested <= MAX_MESSAGE_LEN - consumed,
			HashError::MessageTooLong {
				consumed,
				requested,
			}
		);

		let mut block = [0; BLOCK_LEN];
		block[..pending.len()].copy_from_slice(pending);
		Ok(Self {
			state,
			block,
			index: pending.len(),
			message_len: consumed + requested,
			blocks_compressed: blocks,
		})
	}

	/// Number of message bytes accepted so far.
	pub fn message_len(&self) -> u64 {
		self.message_len
	}

	/// Feeds more message bytes.
	///
	/// Fails without consuming anything if the total message length would no longer be
	/// representable in bits as a `u64`.
	pub fn update(&mut self, data: impl AsRef<[u8]>) -> Result<(), HashError> {
		let mut data = data.as_ref();
		let requested = data.len() as u64;
		ensure!(
			requested <= MAX_MESSAGE_LEN - self.message_len,
			HashError::MessageTooLong {
				consumed: self.message_len,
				requested,
			}
		);
		self.message_len += requested;

		if self.index > 0 {
			let to_copy = min(BLOCK_LEN - self.index, data.len());
			self.block[self.index..self.index + to_copy].copy_from_slice(&data[..to_copy]);
			self.index += to_copy;
			data = &data[to_copy..];

			if self.index < BLOCK_LEN {
				return Ok(());
			}
			self.compress_working_block();
		}

		let mut blocks = data.chunks_exact(BLOCK_LEN);
		for block in &mut blocks {
			self.state =
				compress_bytes(self.state, block.try_into().expect("chunk size is correct"));
			self.blocks_compressed += 1;
		}

		let remainder = blocks.remainder();
		self.block[..remainder.len()].copy_from_slice(remainder);
		self.index = remainder.len();

		Ok(())
	}

	/// Feeds more message bytes in a chained manner.
	pub fn chain_update(mut self, data: impl AsRef<[u8]>) -> Result<Self, HashError> {
		self.update(data)?;
		Ok(self)
	}

	/// Pads the message, compresses the final block(s) and returns the digest.
	pub fn finalize(self) -> [u8; DIGEST_LEN] {
		let mut out = [0u8; DIGEST_LEN];
		self.finalize_into(&mut out);
		out
	}

	/// Writes the digest into `out`, returning the padding layout the final block needed.
	pub fn finalize_into(mut self, out: &mut [u8; DIGEST_LEN]) -> Completion {
		let completion = self.pad_and_compress();
		*out = state_to_bytes(&self.state);
		completion
	}

	/// Returns the digest and resets the framer to accept a new message.
	pub fn finalize_reset(&mut self) -> [u8; DIGEST_LEN] {
		let framer = std::mem::take(self);
		framer.finalize()
	}

	pub fn reset(&mut self) {
		*self = Self::default();
	}

	fn compress_working_block(&mut self) {
		self.state = compress_bytes(self.state, &self.block);
		self.blocks_compressed += 1;
		self.index = 0;
	}

	/// Drives the end-of-input state machine from `Streaming` to the compressed
	/// length-bearing block, returning the layout decided when the terminator was placed.
	fn pad_and_compress(&mut self) -> Completion {
		let mut step = Completion::Streaming;
		let mut decided = step;
		loop {
			step = match step {
				Completion::Streaming => {
					self.block[self.index] = PADDING_TERMINATOR;
					self.block[self.index + 1..].fill(0);
					decided = Completion::after_terminator(self.index);
					decided
				}
				Completion::PaddingSpillsOver => {
					trace!(index = self.index, "length field spills into an extra block");
					self.compress_working_block();
					self.block = [0; BLOCK_LEN];
					Completion::PaddingFitsHere
				}
				Completion::PaddingFitsHere => {
					self.block[LENGTH_OFFSET..]
						.copy_from_slice(&(self.message_len * 8).to_be_bytes());
					self.compress_working_block();
					break;
				}
			};
		}

		debug!(
			message_len = self.message_len,
			blocks = self.blocks_compressed,
			completion = ?decided,
			"finalized message"
		);
		decided
	}
}

#[cfg(test)]
mod tests {
	use std::io::{self, Cursor};

	use hex_literal::hex;
	use rand::{rngs::StdRng, RngCore, SeedableRng};

	use super::*;

	fn random_message(len: usize, seed: u64) -> Vec<u8> {
		let mut rng = StdRng::seed_from_u64(seed);
		let mut message = vec![0u8; len];
		rng.fill_bytes(&mut message);
		message
	}

	fn reference(message: &[u8]) -> [u8; DIGEST_LEN] {
		use sha2::Digest;
		sha2::Sha256::digest(message).into()
	}

	fn incremental(message: &[u8], piece_len: usize) -> [u8; DIGEST_LEN] {
		let mut framer = Framer::new();
		for piece in message.chunks(piece_len.max(1)) {
			framer.update(piece).unwrap();
		}
		framer.finalize()
	}

	#[test]
	fn test_empty_message() {
		let expected = hex!("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
		assert_eq!(digest_bulk(b"").unwrap(), expected);
		assert_eq!(Framer::new().finalize(), expected);
	}

	#[test]
	fn test_abc() {
		let expected = hex!("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
		assert_eq!(digest_bulk(b"abc").unwrap(), expected);
		assert_eq!(incremental(b"abc", 1), expected);
	}

	#[test]
	fn test_two_block_vector() {
		// FIPS 180-4 example: 56 bytes, forces the length field into a second block.
		let message = b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq";
		assert_eq!(message.len(), 56);
		let expected = hex!("248d6a61d20638b8e5c026930c3e6039a33ce45964ff2167f6ecedd419db06c1");
		assert_eq!(digest_bulk(message).unwrap(), expected);
		assert_eq!(incremental(message, 7), expected);
	}

	#[test]
	fn test_completion_boundary() {
		assert_eq!(Completion::for_message_len(0), Completion::PaddingFitsHere);
		assert_eq!(Completion::for_message_len(55), Completion::PaddingFitsHere);
		assert_eq!(Completion::for_message_len(56), Completion::PaddingSpillsOver);
		assert_eq!(Completion::for_message_len(63), Completion::PaddingSpillsOver);
		assert_eq!(Completion::for_message_len(64), Completion::PaddingFitsHere);
		assert_eq!(Completion::for_message_len(64 + 55), Completion::PaddingFitsHere);
		assert_eq!(Completion::for_message_len(64 + 56), Completion::PaddingSpillsOver);
	}

	#[test]
	fn test_padding_boundary_lengths() {
		for base in [0, 64, 640] {
			for len in [55, 56, 57, 63, 64] {
				let message = random_message(base + len, len as u64);
				let expected = reference(&message);
				assert_eq!(digest_bulk(&message).unwrap(), expected, "bulk, len {}", base + len);
				assert_eq!(incremental(&message, 13), expected, "incremental, len {}", base + len);
			}
		}
	}

	#[test]
	fn test_bulk_and_incremental_agree() {
		for len in [0, 1, 55, 56, 64, 65, 1000] {
			let message = random_message(len, 42);
			let bulk = digest_bulk(&message).unwrap();
			for piece_len in [1, 3, 63, 64, 65, 4096] {
				assert_eq!(incremental(&message, piece_len), bulk, "len {len}, pieces {piece_len}");
			}
		}
	}

	#[test]
	fn test_deterministic() {
		let message = random_message(777, 7);
		assert_eq!(digest_bulk(&message).unwrap(), digest_bulk(&message).unwrap());
	}

	#[test]
	fn test_framer_state_between_updates() {
		let mut framer = Framer::new();
		framer.update([0u8; 10]).unwrap();
		assert_eq!(framer.message_len(), 10);
		assert_eq!(framer.index, 10);
		assert_eq!(framer.blocks_compressed, 0);

		framer.update([0u8; 54]).unwrap();
		assert_eq!(framer.index, 0);
		assert_eq!(framer.blocks_compressed, 1);

		framer.update([0u8; 130]).unwrap();
		assert_eq!(framer.index, 2);
		assert_eq!(framer.blocks_compressed, 3);
	}

	#[test]
	fn test_finalize_into_reports_padding_layout() {
		for (len, expected_layout, expected_blocks) in [
			(0, Completion::PaddingFitsHere, 1),
			(55, Completion::PaddingFitsHere, 1),
			(56, Completion::PaddingSpillsOver, 2),
			(63, Completion::PaddingSpillsOver, 2),
			(64, Completion::PaddingFitsHere, 2),
			(120, Completion::PaddingSpillsOver, 3),
		] {
			let message = random_message(len, 5);
			let framer = Framer::new().chain_update(&message).unwrap();

			let mut padded = framer.clone();
			padded.pad_and_compress();
			assert_eq!(padded.blocks_compressed, expected_blocks, "len {len}");

			let mut out = [0u8; DIGEST_LEN];
			assert_eq!(framer.finalize_into(&mut out), expected_layout, "len {len}");
			assert_eq!(out, reference(&message), "len {len}");
		}
	}

	#[test]
	fn test_resume_checks_length() {
		let max_blocks = MAX_MESSAGE_LEN / BLOCK_LEN as u64;

		let framer = Framer::resume(IV, max_blocks, &[0u8; 63]).unwrap();
		assert_eq!(framer.message_len(), MAX_MESSAGE_LEN);
		assert_eq!(framer.index, 63);

		let err = Framer::resume(IV, max_blocks + 1, &[]).unwrap_err();
		assert!(matches!(err, HashError::MessageTooLong { requested: 0, .. }));
		assert!(Framer::resume(IV, u64::MAX, &[1]).is_err());
	}

	#[test]
	fn test_resume_matches_streaming() {
		let message = random_message(64 * 3 + 10, 11);
		let mut state = IV;
		for block in message.chunks_exact(BLOCK_LEN) {
			state = compress_bytes(state, block.try_into().unwrap());
		}
		let framer = Framer::resume(state, 3, &message[64 * 3..]).unwrap();
		assert_eq!(framer.finalize(), reference(&message));
	}

	#[test]
	fn test_finalize_reset() {
		let mut framer = Framer::new().chain_update(b"abc").unwrap();
		let first = framer.finalize_reset();
		assert_eq!(framer.message_len(), 0);
		framer.update(b"abc").unwrap();
		assert_eq!(framer.finalize_reset(), first);
		assert_eq!(framer.finalize(), digest_bulk(b"").unwrap());
	}

	#[test]
	fn test_length_overflow_is_rejected() {
		let mut framer = Framer::new().chain_update([1u8; 100]).unwrap();
		framer.message_len = MAX_MESSAGE_LEN - 3;
		let before = framer.clone();

		let err = framer.update([0u8; 4]).unwrap_err();
		assert!(matches!(err, HashError::MessageTooLong { requested: 4, .. }));
		assert_eq!(framer.message_len(), before.message_len());
		assert_eq!(framer.index, before.index);
		assert_eq!(framer.state, before.state);

		framer.update([0u8; 3]).unwrap();
		assert_eq!(framer.message_len(), MAX_MESSAGE_LEN);
	}

	#[test]
	fn test_reader_source() {
		let message = random_message(10_000, 3);
		let mut cursor = Cursor::new(message.clone());
		let from_reader = frame_and_digest(ByteSource::Reader(&mut cursor)).unwrap();
		let from_buffer = frame_and_digest(message.as_slice().into()).unwrap();
		assert_eq!(from_reader, from_buffer);
		assert_eq!(from_buffer, reference(&message));
	}

	struct FlakyReader<'a> {
		data: &'a [u8],
		calls: usize,
	}

	impl Read for FlakyReader<'_> {
		fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
			self.calls += 1;
			if self.calls % 2 == 1 {
				return Err(io::Error::new(ErrorKind::Interrupted, "try again"));
			}
			let n = min(buf.len(), min(self.data.len(), 5));
			buf[..n].copy_from_slice(&self.data[..n]);
			self.data = &self.data[n..];
			Ok(n)
		}
	}

	#[test]
	fn test_reader_retries_interrupted_reads() {
		let message = random_message(200, 9);
		let mut reader = FlakyReader {
			data: &message,
			calls: 0,
		};
		assert_eq!(digest_reader(&mut reader).unwrap(), reference(&message));
	}

	struct BrokenReader;

	impl Read for BrokenReader {
		fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
			Err(io::Error::new(ErrorKind::BrokenPipe, "gone"))
		}
	}

	#[test]
	fn test_reader_error_is_propagated() {
		let err = digest_reader(&mut BrokenReader).unwrap_err();
		assert!(matches!(err, HashError::Io(ref e) if e.kind() == ErrorKind::BrokenPipe));
	}
}
