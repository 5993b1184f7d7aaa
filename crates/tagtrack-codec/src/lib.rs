//! Error-correcting identity codec for 6×6 tag bit matrices.
//!
//! A tag carries a 10-bit identifier spread over 36 cells with enough
//! redundancy that up to 2 misread cells still decode to the original
//! identifier. The codeword construction is: XOR-whiten the identifier,
//! append a CRC-16, run the result through a rate-1/2 convolutional encoder
//! and keep the first 36 output bits. The resulting 1024-word code has a
//! minimum pairwise Hamming distance of at least 5, which makes 2-bit
//! correction unambiguous.
//!
//! This crate is independent of the detection pipeline: it consumes the bit
//! matrix sampled from a candidate quadrilateral and nothing else.

mod bits;
mod codec;

pub use bits::{TagBits, BIT_COUNT, SIDE};
pub use codec::{Codec, MAX_CORRECTION_BITS, TAG_COUNT};
