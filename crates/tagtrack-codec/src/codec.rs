use tagtrack_core::TagId;

use crate::bits::{TagBits, BIT_COUNT};

/// Number of identifier bits.
const BITS_ID: u32 = 10;

/// Number of CRC bits appended to the whitened identifier.
const BITS_CRC: u32 = 16;

/// Whitening mask applied to the identifier before encoding, so that tag 0
/// does not produce an all-white matrix.
const XOR_MASK: u64 = 0b10_1010_1010;

/// CRC-16 generator polynomial, `x^16 + x^12 + x^5 + 1` (CCITT).
const CRC_POLY: u64 = 0b1_0001_0000_0010_0001;

/// Number of encodable tag identifiers.
pub const TAG_COUNT: usize = 1 << BITS_ID;

/// Maximum number of misread cells the decoder corrects.
pub const MAX_CORRECTION_BITS: u32 = 2;

/// Rate-1/2 convolutional encoder, 4 states: output symbol (2 bits) and next
/// state, indexed by `[state][input bit]`.
const FEC_OUTPUT: [[u8; 2]; 4] = [[0, 3], [1, 2], [3, 0], [2, 1]];
const FEC_NEXT: [[usize; 2]; 4] = [[0, 2], [0, 2], [1, 3], [1, 3]];

/// Stateless translator between tag identifiers and 36-bit codewords.
///
/// The full 1024-entry codeword table is computed once at construction;
/// encoding is a table lookup and decoding a minimum-Hamming-distance scan
/// over the table. For a table this small the brute-force scan is fast
/// enough and keeps the decoder trivially correct.
#[derive(Clone, Debug)]
pub struct Codec {
    codes: Vec<TagBits>,
}

impl Codec {
    /// Builds the codec, precomputing all 1024 codewords.
    pub fn new() -> Self {
        let codes = (0..TAG_COUNT as u64).map(encode_word).collect();
        Self { codes }
    }

    /// Returns the unique codeword for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not in `0..1024`.
    pub fn encode(&self, id: TagId) -> TagBits {
        self.codes[id as usize]
    }

    /// Decodes a sampled bit matrix, correcting up to
    /// [`MAX_CORRECTION_BITS`] misread cells.
    ///
    /// Returns `None` if the matrix is too far from every codeword, which
    /// the detection pipeline treats as "not a tag". Never panics.
    pub fn decode(&self, bits: TagBits) -> Option<TagId> {
        let mut best_id = 0usize;
        let mut best_distance = u32::MAX;
        for (id, &code) in self.codes.iter().enumerate() {
            let distance = bits.hamming(code);
            if distance < best_distance {
                best_distance = distance;
                best_id = id;
                if distance == 0 {
                    break;
                }
            }
        }
        (best_distance <= MAX_CORRECTION_BITS).then_some(best_id as TagId)
    }

    /// Number of distinct tag identifiers this codec can produce.
    pub fn tag_count(&self) -> usize {
        self.codes.len()
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

/// Encodes one identifier into its codeword.
fn encode_word(id: u64) -> TagBits {
    let whitened = id ^ XOR_MASK;
    convolve(crc_append(whitened))
}

/// Appends the CRC-16 of `data` (10 bits) below it, producing the 26-bit
/// systematic word `data << 16 | crc`.
fn crc_append(data: u64) -> u64 {
    let shifted = data << BITS_CRC;
    let mut remainder = shifted;
    let mut poly = CRC_POLY << BITS_ID;
    let mut bit = 1u64 << (BITS_ID + BITS_CRC);
    for _ in 0..=BITS_ID {
        if remainder & bit != 0 {
            remainder ^= poly;
        }
        bit >>= 1;
        poly >>= 1;
    }
    shifted | remainder
}

/// Runs the 26-bit word (plus two zero tail bits to flush the encoder)
/// through the convolutional encoder, MSB first, keeping the first 36 of the
/// 56 output bits.
fn convolve(word: u64) -> TagBits {
    let sequence = word << 2;
    let input_bits = BITS_ID + BITS_CRC + 2;

    let mut state = 0usize;
    let mut out = 0u64;
    let mut emitted = 0usize;
    for i in (0..input_bits).rev() {
        let input = ((sequence >> i) & 1) as usize;
        let symbol = FEC_OUTPUT[state][input];
        for bit in [(symbol >> 1) & 1, symbol & 1] {
            if emitted < BIT_COUNT {
                out |= (bit as u64) << emitted;
                emitted += 1;
            }
        }
        state = FEC_NEXT[state][input];
    }
    TagBits::from_raw(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_total_over_valid_ids() {
        let codec = Codec::new();
        assert_eq!(codec.tag_count(), 1024);
        for id in 0..codec.tag_count() as TagId {
            codec.encode(id);
        }
    }

    #[test]
    fn codewords_are_distinct() {
        let codec = Codec::new();
        let mut raws: Vec<u64> = (0..TAG_COUNT as TagId)
            .map(|id| codec.encode(id).raw())
            .collect();
        raws.sort_unstable();
        raws.dedup();
        assert_eq!(raws.len(), TAG_COUNT);
    }

    #[test]
    fn minimum_pairwise_distance_supports_two_bit_correction() {
        let codec = Codec::new();
        let codes: Vec<TagBits> = (0..TAG_COUNT as TagId).map(|id| codec.encode(id)).collect();
        let mut min_distance = u32::MAX;
        for (i, &a) in codes.iter().enumerate() {
            for &b in &codes[i + 1..] {
                min_distance = min_distance.min(a.hamming(b));
            }
        }
        assert!(
            min_distance >= 2 * MAX_CORRECTION_BITS + 1,
            "minimum pairwise distance {min_distance} is too small"
        );
    }

    #[test]
    fn round_trip_all_ids() {
        let codec = Codec::new();
        for id in 0..TAG_COUNT as TagId {
            assert_eq!(codec.decode(codec.encode(id)), Some(id));
        }
    }

    #[test]
    fn three_errors_never_yield_the_original_id() {
        let codec = Codec::new();
        let id = 42;
        let code = codec.encode(id);
        let corrupted = code
            .with_bit_flipped(0)
            .with_bit_flipped(17)
            .with_bit_flipped(35);
        assert_ne!(codec.decode(corrupted), Some(id));
    }
}
