// Copyright 2025 Irreducible Inc.

//! The SHA-256 block compression function, FIPS 180-4 §6.2.2.

use crate::consts::{BLOCK_LEN, BLOCK_WORDS, DIGEST_LEN, K, ROUNDS};

/// Running hash state: eight 32-bit words.
pub type State = [u32; 8];

/// One message block as big-endian decoded words.
pub type BlockWords = [u32; BLOCK_WORDS];

#[inline]
const fn ch(x: u32, y: u32, z: u32) -> u32 {
	(x & y) ^ (!x & z)
}

#[inline]
const fn maj(x: u32, y: u32, z: u32) -> u32 {
	(x & y) ^ (x & z) ^ (y & z)
}

#[inline]
const fn bsig0(x: u32) -> u32 {
	x.rotate_right(2) ^ x.rotate_right(13) ^ x.rotate_right(22)
}

#[inline]
const fn bsig1(x: u32) -> u32 {
	x.rotate_right(6) ^ x.rotate_right(11) ^ x.rotate_right(25)
}

#[inline]
const fn ssig0(x: u32) -> u32 {
	x.rotate_right(7) ^ x.rotate_right(18) ^ (x >> 3)
}

#[inline]
const fn ssig1(x: u32) -> u32 {
	x.rotate_right(17) ^ x.rotate_right(19) ^ (x >> 10)
}

/// Decodes a 64-byte block into sixteen big-endian words.
pub fn block_from_bytes(bytes: &[u8; BLOCK_LEN]) -> BlockWords {
	let mut words = [0u32; BLOCK_WORDS];
	for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
		*word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
	}
	words
}

/// Serializes the state words in big-endian order, which is the digest encoding.
pub fn state_to_bytes(state: &State) -> [u8; DIGEST_LEN] {
	let mut out = [0u8; DIGEST_LEN];
	for (chunk, word) in out.chunks_exact_mut(4).zip(state) {
		chunk.copy_from_slice(&word.to_be_bytes());
	}
	out
}

/// Expands a block into the 64-word message schedule.
pub fn message_schedule(block: &BlockWords) -> [u32; ROUNDS] {
	let mut w = [0u32; ROUNDS];
	w[..BLOCK_WORDS].copy_from_slice(block);
	for i in BLOCK_WORDS..ROUNDS {
		w[i] = ssig1(w[i - 2])
			.wrapping_add(w[i - 7])
			.wrapping_add(ssig0(w[i - 15]))
			.wrapping_add(w[i - 16]);
	}
	w
}

/// Applies the compression function to `state` with one message block.
///
/// This is a pure function: every state and block pair is valid input.
pub fn compress(state: State, block: &BlockWords) -> State {
	let w = message_schedule(block);

	let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = state;
	for (&k, &w) in K.iter().zip(w.iter()) {
		let t1 = h
			.wrapping_add(bsig1(e))
			.wrapping_add(ch(e, f, g))
			.wrapping_add(k)
			.wrapping_add(w);
		let t2 = bsig0(a).wrapping_add(maj(a, b, c));
		h = g;
		g = f;
		f = e;
		e = d.wrapping_add(t1);
		d = c;
		c = b;
		b = a;
		a = t1.wrapping_add(t2);
	}

	let mut out = state;
	for (word, v) in out.iter_mut().zip([a, b, c, d, e, f, g, h]) {
		*word = word.wrapping_add(v);
	}
	out
}

/// Compresses a block given as raw bytes.
#[inline]
pub fn compress_bytes(state: State, block: &[u8; BLOCK_LEN]) -> State {
	compress(state, &block_from_bytes(block))
}
